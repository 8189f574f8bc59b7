use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to seconds multiplier (order matters: `ms` before `m` and `s`)
const UNITS: &[(&str, f64)] = &[
    ("ms", 0.001),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
];

/// Parse refresh intervals like "60s", "5m", "1.5h", "500ms"
pub fn parse_interval(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            if !val.is_finite() || val <= 0.0 {
                bail!("Interval must be positive: {}", s);
            }
            return Ok(Duration::from_secs_f64(val * multiplier));
        }
    }

    bail!("Unknown interval format: {} (use ms, s, m or h)", s)
}

/// Format the age of a check for display ("just now", "42s ago", "3h ago")
pub fn format_ago(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 5 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

/// Format a response time in milliseconds
pub fn format_millis(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{:.0}ms", ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_interval("60s").unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn test_parse_minutes_and_hours() {
        assert_eq!(parse_interval("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_interval("1.5h").unwrap(), Duration::from_secs(5400));
    }

    #[test]
    fn test_parse_milliseconds() {
        assert_eq!(parse_interval("500ms").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("10").is_err());
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("-5m").is_err());
    }

    #[test]
    fn test_format_ago() {
        assert_eq!(format_ago(Duration::from_secs(2)), "just now");
        assert_eq!(format_ago(Duration::from_secs(42)), "42s ago");
        assert_eq!(format_ago(Duration::from_secs(3 * 60 + 5)), "3m ago");
        assert_eq!(format_ago(Duration::from_secs(5 * 3600)), "5h ago");
        assert_eq!(format_ago(Duration::from_secs(3 * 86_400)), "3d ago");
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(123.4), "123ms");
        assert_eq!(format_millis(3250.0), "3.25s");
    }
}
