//! Prometheus text exposition parsing for test assertions.

/// Value of one series in a Prometheus text exposition.
///
/// `series` is the metric name plus its rendered label set, exactly as it
/// appears in the output, e.g. `orders_total{result="success"}` or
/// `http_request_latency_seconds_count`. Comment lines are ignored.
pub fn metric_value(exposition: &str, series: &str) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (name, value) = line.rsplit_once(' ')?;
            if name == series {
                value.parse().ok()
            } else {
                None
            }
        })
}

/// Value of the series named `name` whose label set is exactly `labels`,
/// in any order.
pub fn labelled_value(exposition: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            let rendered = series.strip_prefix(name)?;
            let found = parse_labels(rendered)?;
            let matches = found.len() == labels.len()
                && labels
                    .iter()
                    .all(|(k, v)| found.iter().any(|(fk, fv)| fk == k && fv == v));
            if matches {
                value.parse().ok()
            } else {
                None
            }
        })
}

/// Split `{a="1",b="2"}` into pairs. An empty string is an empty set;
/// anything else that is not a brace-delimited list is rejected.
fn parse_labels(rendered: &str) -> Option<Vec<(&str, &str)>> {
    if rendered.is_empty() {
        return Some(Vec::new());
    }
    let inner = rendered.strip_prefix('{')?.strip_suffix('}')?;
    inner
        .split("\",")
        .map(|pair| {
            let (key, value) = pair.split_once("=\"")?;
            Some((key, value.trim_end_matches('"')))
        })
        .collect()
}
