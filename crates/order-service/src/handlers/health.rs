//! Health check handler.
//!
//! `/health` is a liveness check: it returns OK while the process is able to
//! serve requests and checks nothing else.

/// Liveness check handler.
///
/// Returns a simple "OK" response to indicate the process is running.
pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        assert_eq!(health_check().await, "OK");
    }
}
