use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_format_millis_boundaries() {
    assert_eq!(format_millis(0), "0ms");
    assert_eq!(format_millis(999), "999ms");
    assert_eq!(format_millis(1_000), "1.00s");
    assert_eq!(format_millis(1_500), "1.50s");
    assert_eq!(format_millis(59_999), "60.00s");
    assert_eq!(format_millis(60_000), "1m 00s");
    assert_eq!(format_millis(75_000), "1m 15s");
    assert_eq!(format_millis(3_599_999), "59m 59s");
    assert_eq!(format_millis(3_600_000), "1h 00m");
    assert_eq!(format_millis(5_430_000), "1h 30m");
}
