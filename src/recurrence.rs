// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar rules shared by recurring-instance generation, skipping, and
//! the forecast's day matchers.

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{Frequency, RecurringTransaction};
use crate::utils::days_in_month;

/// Next occurrence after `from`.
///
/// Monthly dates land on `day_of_month` (or `from`'s day when unanchored),
/// clamped to the last day of shorter months. Yearly dates keep month/day,
/// with Feb 29 falling back to Feb 28 in common years.
pub fn advance(from: NaiveDate, frequency: Frequency, day_of_month: Option<u32>) -> NaiveDate {
    match frequency {
        Frequency::Weekly => from + Duration::days(7),
        Frequency::Monthly => {
            let (year, month) = if from.month() == 12 {
                (from.year() + 1, 1)
            } else {
                (from.year(), from.month() + 1)
            };
            let anchor = day_of_month.unwrap_or(from.day());
            clamped(year, month, anchor)
        }
        Frequency::Yearly => clamped(from.year() + 1, from.month(), from.day()),
    }
}

fn clamped(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.clamp(1, days_in_month(year, month));
    // day is within the month by construction
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Day of week with Sunday as 0.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Whether a template's day matcher fires on `date` for forecasting.
///
/// Yearly templates never match: the forecast horizon is short-range.
pub fn matches_day(template: &RecurringTransaction, date: NaiveDate) -> bool {
    match template.frequency {
        Frequency::Monthly => template.day_of_month == Some(date.day()),
        Frequency::Weekly => template.day_of_week == Some(weekday_index(date)),
        Frequency::Yearly => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekly_adds_seven_days() {
        assert_eq!(advance(d(2025, 2, 26), Frequency::Weekly, None), d(2025, 3, 5));
    }

    #[test]
    fn monthly_clamps_to_short_months() {
        assert_eq!(advance(d(2025, 3, 31), Frequency::Monthly, Some(31)), d(2025, 4, 30));
        assert_eq!(advance(d(2025, 1, 31), Frequency::Monthly, Some(31)), d(2025, 2, 28));
        assert_eq!(advance(d(2024, 1, 31), Frequency::Monthly, Some(31)), d(2024, 2, 29));
        // the anchor, not the clamped day, drives the following month
        assert_eq!(advance(d(2025, 4, 30), Frequency::Monthly, Some(31)), d(2025, 5, 31));
    }

    #[test]
    fn monthly_rolls_the_year() {
        assert_eq!(advance(d(2025, 12, 15), Frequency::Monthly, Some(15)), d(2026, 1, 15));
        assert_eq!(advance(d(2025, 12, 15), Frequency::Monthly, None), d(2026, 1, 15));
    }

    #[test]
    fn yearly_keeps_month_and_day() {
        assert_eq!(advance(d(2025, 6, 1), Frequency::Yearly, None), d(2026, 6, 1));
        assert_eq!(advance(d(2024, 2, 29), Frequency::Yearly, None), d(2025, 2, 28));
    }

    #[test]
    fn sunday_is_zero() {
        assert_eq!(weekday_index(d(2025, 2, 23)), 0);
        assert_eq!(weekday_index(d(2025, 2, 25)), 2);
    }
}
