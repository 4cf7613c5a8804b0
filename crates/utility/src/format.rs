use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// 12-hour clock rendering, e.g. "09:00 AM".
pub fn format_time_12h(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant
        .with_timezone(&timezone)
        .format("%I:%M %p")
        .to_string()
}

/// Full local timestamp rendering, e.g. "2025-01-15 09:00:00".
pub fn format_local(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant
        .with_timezone(&timezone)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_in_the_target_zone() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 14, 0, 0).unwrap();
        assert_eq!(format_time_12h(instant, Tz::America__New_York), "09:00 AM");
        assert_eq!(
            format_local(instant, Tz::America__New_York),
            "2025-01-15 09:00:00"
        );
    }

    #[test]
    fn afternoon_times_render_with_pm() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 22, 30, 0).unwrap();
        assert_eq!(format_time_12h(instant, Tz::America__New_York), "05:30 PM");
    }
}
