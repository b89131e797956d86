//! In-memory product inventory.
//!
//! A single stock level shared by every request. Each mutation is mirrored
//! into the `product_inventory` gauge.
//!
//! # Commit modes
//!
//! The order handler checks stock before calling the dependency and only
//! commits the sale afterwards. [`InventoryMode`] decides how the commit is
//! performed:
//!
//! - `Atomic`: a checked decrement that refuses to go below zero. A sale
//!   whose stock was taken by a concurrent order fails as out of stock.
//! - `Unsynchronized`: an unconditional decrement. The earlier stock check
//!   and this write are not tied together, so concurrent orders can sell
//!   stock that is already gone and drive the level negative. Kept for
//!   demonstrating overselling under load.

use crate::models::DEFAULT_INVENTORY;
use metrics::Gauge;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// How a successful order commits its inventory decrement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InventoryMode {
    #[default]
    Atomic,
    Unsynchronized,
}

impl InventoryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryMode::Atomic => "atomic",
            InventoryMode::Unsynchronized => "unsynchronized",
        }
    }
}

impl fmt::Display for InventoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "atomic" => Ok(InventoryMode::Atomic),
            "unsynchronized" => Ok(InventoryMode::Unsynchronized),
            other => Err(format!("unknown inventory mode '{}'", other)),
        }
    }
}

/// Process-wide stock level.
///
/// The level and the `product_inventory` gauge are written under the same
/// lock, so the gauge always shows a level the inventory actually held.
pub struct Inventory {
    level: Mutex<i64>,
    mode: InventoryMode,
    gauge: Gauge,
}

impl Inventory {
    /// Create an inventory holding [`DEFAULT_INVENTORY`] units.
    pub fn new(mode: InventoryMode, gauge: Gauge) -> Self {
        Self::with_level(DEFAULT_INVENTORY, mode, gauge)
    }

    /// Create an inventory with an explicit starting level.
    pub fn with_level(level: i64, mode: InventoryMode, gauge: Gauge) -> Self {
        gauge.set(level as f64);
        Self {
            level: Mutex::new(level),
            mode,
            gauge,
        }
    }

    pub fn mode(&self) -> InventoryMode {
        self.mode
    }

    // The critical sections below cannot panic, so a poisoned lock still
    // holds a consistent level.
    fn lock(&self) -> MutexGuard<'_, i64> {
        self.level.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current level, no side effect.
    pub fn get(&self) -> i64 {
        *self.lock()
    }

    /// Reduce the level by one without checking it.
    pub fn decrement(&self) {
        let mut level = self.lock();
        *level -= 1;
        self.gauge.set(*level as f64);
    }

    /// Reduce the level by one if it is positive.
    ///
    /// Returns `false`, leaving the level untouched, when no stock is left.
    pub fn try_decrement(&self) -> bool {
        let mut level = self.lock();
        if *level <= 0 {
            return false;
        }
        *level -= 1;
        self.gauge.set(*level as f64);
        true
    }

    /// Commit one sale according to the configured [`InventoryMode`].
    ///
    /// Returns `false` only in `Atomic` mode, when stock ran out after the
    /// order's initial check.
    pub fn commit_sale(&self) -> bool {
        match self.mode {
            InventoryMode::Atomic => self.try_decrement(),
            InventoryMode::Unsynchronized => {
                self.decrement();
                true
            }
        }
    }

    /// Restore the level to [`DEFAULT_INVENTORY`] and return it.
    pub fn reset(&self) -> i64 {
        let mut level = self.lock();
        *level = DEFAULT_INVENTORY;
        self.gauge.set(DEFAULT_INVENTORY as f64);
        DEFAULT_INVENTORY
    }
}

impl fmt::Debug for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inventory")
            .field("level", &self.get())
            .field("mode", &self.mode)
            .finish()
    }
}
