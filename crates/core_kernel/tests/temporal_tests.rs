//! Tests for calendar years and clocks

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{CalendarYear, Clock, FixedClock, Timezone};

#[test]
fn test_calendar_year_of_date() {
    let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    assert_eq!(CalendarYear::of(date).value(), 2024);
    assert_eq!(CalendarYear::of(date).next().value(), 2025);
}

#[test]
fn test_calendar_year_ordering() {
    let a = CalendarYear::new(2024).unwrap();
    let b = CalendarYear::new(2025).unwrap();
    assert!(a < b);
}

#[test]
fn test_fixed_clock_is_stable() {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap());
    let tz = Timezone::default();
    assert_eq!(clock.today_in(&tz), clock.today_in(&tz));
    assert_eq!(clock.today_in(&tz), NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
}

#[test]
fn test_timezone_serde() {
    let tz: Timezone = serde_json::from_str("\"America/Bogota\"").unwrap();
    assert_eq!(tz, Timezone::default());
    assert_eq!(serde_json::to_string(&tz).unwrap(), "\"America/Bogota\"");
    assert!(serde_json::from_str::<Timezone>("\"Nowhere/Land\"").is_err());
}
