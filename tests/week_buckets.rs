// tests/week_buckets.rs
use chrono::NaiveDate;
use signal_radar::week::{iso_week_bucket, week_label};

#[test]
fn monday_dec_30_2024_is_week_one_of_2025() {
    assert_eq!(week_label("2024-12-30T00:00:00Z").as_deref(), Some("2025-W01"));
}

#[test]
fn sunday_jan_1_2023_is_last_week_of_2022() {
    assert_eq!(week_label("2023-01-01T12:00:00Z").as_deref(), Some("2022-W52"));
}

#[test]
fn every_day_of_a_week_shares_one_bucket() {
    // 2024-01-15 (Mon) .. 2024-01-21 (Sun)
    for day in 15..=21 {
        let d = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        assert_eq!(iso_week_bucket(d).to_string(), "2024-W03", "{d}");
    }
    let next_monday = NaiveDate::from_ymd_opt(2024, 1, 22).unwrap();
    assert_eq!(iso_week_bucket(next_monday).to_string(), "2024-W04");
}

#[test]
fn iso_year_differs_from_calendar_year_only_at_edges() {
    let d = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(); // Friday
    let b = iso_week_bucket(d);
    assert_eq!((b.year, b.week), (2026, 53));
}
