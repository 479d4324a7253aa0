/// Time utilities shared by every service.
///
/// Stored timestamps are Unix epoch values; message and aula ids reuse the
/// millisecond timestamp the same way the stored format does.

/// Returns the current Unix timestamp in seconds.
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Returns the current Unix timestamp in milliseconds.
pub fn now_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Returns the current local date-time formatted for display
/// (`DD/MM/YYYY HH:MM`, the format lesson comments are stored with).
pub fn now_display_datetime() -> String {
    chrono::Local::now().format("%d/%m/%Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_timestamp_is_reasonable() {
        let ts = now_timestamp();
        // Should be after 2024-01-01 (1704067200)
        assert!(ts > 1704067200, "Timestamp {} is too old", ts);
        // Should be before 2100-01-01 (4102444800)
        assert!(ts < 4102444800, "Timestamp {} is too far in future", ts);
    }

    #[test]
    fn test_now_timestamp_millis_is_reasonable() {
        let ts = now_timestamp_millis();
        assert!(ts > 1704067200_000, "Timestamp {} is too old", ts);
    }

    #[test]
    fn test_display_datetime_shape() {
        let s = now_display_datetime();
        // DD/MM/YYYY HH:MM
        assert_eq!(s.len(), 16);
        assert_eq!(&s[2..3], "/");
        assert_eq!(&s[5..6], "/");
    }
}
