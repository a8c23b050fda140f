// Date utility functions

use chrono::{Datelike, NaiveDate, Weekday};

/// Every calendar day from `start` to `end`, both inclusive.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Column header text, e.g. `12/25` and `Wed`.
pub fn day_header(date: NaiveDate) -> (String, String) {
    let number = format!("{}/{}", date.month(), date.day());
    let name = match date.weekday() {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    };
    (number, name.to_string())
}
