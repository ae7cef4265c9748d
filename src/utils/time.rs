//! Time and number formatting for encoder arguments and display

/// Seconds as an encoder argument, millisecond precision
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

/// Ratio as a filter argument: at most six decimals, trailing zeros trimmed
pub fn format_factor(value: f64) -> String {
    let rendered = format!("{:.6}", value);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Whole-second clock string, HH:MM:SS
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(5.0), "5.000");
        assert_eq!(format_seconds(12.3456), "12.346");
    }

    #[test]
    fn test_format_factor() {
        assert_eq!(format_factor(2.0), "2");
        assert_eq!(format_factor(0.5), "0.5");
        assert_eq!(format_factor(0.8000000000000002), "0.8");
        assert_eq!(format_factor(1.0 / 3.0), "0.333333");
        assert_eq!(format_factor(0.0), "0");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00:00");
        assert_eq!(format_clock(90.7), "00:01:30");
        assert_eq!(format_clock(3723.0), "01:02:03");
        assert_eq!(format_clock(f64::NAN), "00:00:00");
    }
}
