/// Format a millisecond duration as `H:MM:SS`, or `MM:SS` under an hour.
///
/// Hours are never zero-padded; minutes and seconds always are. Sub-second
/// remainders are floored away.
pub fn format_duration(milliseconds: u64) -> String {
    let total_seconds = milliseconds / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(format_duration(0), "00:00");
    }

    #[test]
    fn test_sub_second_floors_to_zero() {
        assert_eq!(format_duration(999), "00:00");
    }

    #[test]
    fn test_minutes_and_seconds_padded() {
        assert_eq!(format_duration(61_000), "01:01");
        assert_eq!(format_duration(59_000), "00:59");
    }

    #[test]
    fn test_just_under_an_hour() {
        assert_eq!(format_duration(3_599_000), "59:59");
    }

    #[test]
    fn test_hours_unpadded() {
        assert_eq!(format_duration(3_661_000), "1:01:01");
        assert_eq!(format_duration(36_000_000), "10:00:00");
    }

    #[test]
    fn test_hours_segment_present_iff_at_least_one_hour() {
        assert_eq!(format_duration(3_600_000).matches(':').count(), 2);
        assert_eq!(format_duration(3_599_999).matches(':').count(), 1);
    }

    #[test]
    fn test_shape_over_a_sweep() {
        for ms in (0..8_000_000).step_by(137_777) {
            let formatted = format_duration(ms);
            let parts: Vec<&str> = formatted.split(':').collect();
            let (minutes, seconds) = match parts.as_slice() {
                [m, s] => (*m, *s),
                [h, m, s] => {
                    assert!(!h.starts_with('0'));
                    (*m, *s)
                }
                other => panic!("unexpected shape {other:?} for {ms}"),
            };
            assert_eq!(minutes.len(), 2);
            assert_eq!(seconds.len(), 2);
            assert!(minutes.parse::<u32>().unwrap() < 60);
            assert!(seconds.parse::<u32>().unwrap() < 60);
        }
    }
}
