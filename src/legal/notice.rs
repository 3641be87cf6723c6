//! Notice periods and effective move-out dates for tenancy terminations.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which party terminates the tenancy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TerminatingParty {
    Tenant,
    Landlord,
}

/// Statutory notice period in months.
///
/// Tenants always have 3 months. Landlords have 3 months under 5 years of
/// tenancy, 6 months from 5 years, and 9 months from 8 years — an exact
/// boundary goes to the higher tier.
pub fn notice_period_months(party: TerminatingParty, tenancy_duration_years: u32) -> u32 {
    match party {
        TerminatingParty::Tenant => 3,
        TerminatingParty::Landlord => match tenancy_duration_years {
            0..=4 => 3,
            5..=7 => 6,
            _ => 9,
        },
    }
}

/// Effective move-out date for a notice delivered on `delivery`.
///
/// A notice delivered by the 3rd of a month counts that month as the first
/// of the notice period; later deliveries count from the following month.
/// The move-out date is the last day of the month `notice_months` months
/// after the first counted month.
///
/// The cutoff is applied to calendar days: the statutory "3rd working day"
/// rule is simplified here and weekends/holidays are not excluded.
pub fn move_out_date(delivery: NaiveDate, notice_months: u32) -> NaiveDate {
    let (mut year, mut month) = (delivery.year(), delivery.month());
    if delivery.day() > 3 {
        advance_month(&mut year, &mut month);
    }
    for _ in 0..notice_months {
        advance_month(&mut year, &mut month);
    }
    last_day_of_month(year, month)
}

fn advance_month(year: &mut i32, month: &mut u32) {
    if *month == 12 {
        *year += 1;
        *month = 1;
    } else {
        *month += 1;
    }
}

/// Last calendar day of the given month.
fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // The 1st of every in-range month exists, so construction cannot fail.
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tenant_always_three_months() {
        for years in [0, 1, 4, 5, 8, 30] {
            assert_eq!(notice_period_months(TerminatingParty::Tenant, years), 3);
        }
    }

    #[test]
    fn test_landlord_tiers() {
        assert_eq!(notice_period_months(TerminatingParty::Landlord, 0), 3);
        assert_eq!(notice_period_months(TerminatingParty::Landlord, 4), 3);
        assert_eq!(notice_period_months(TerminatingParty::Landlord, 5), 6);
        assert_eq!(notice_period_months(TerminatingParty::Landlord, 7), 6);
        assert_eq!(notice_period_months(TerminatingParty::Landlord, 8), 9);
        assert_eq!(notice_period_months(TerminatingParty::Landlord, 10), 9);
    }

    #[test]
    fn test_landlord_period_monotonically_non_decreasing() {
        let mut prev = 0;
        for years in 0..40 {
            let p = notice_period_months(TerminatingParty::Landlord, years);
            assert!(p >= prev);
            assert!(matches!(p, 3 | 6 | 9));
            prev = p;
        }
    }

    #[test]
    fn test_delivery_by_third_counts_delivery_month() {
        // Delivered Jan 3rd, 3 months: Jan counts, move-out end of April.
        assert_eq!(move_out_date(date(2026, 1, 3), 3), date(2026, 4, 30));
    }

    #[test]
    fn test_delivery_after_third_counts_next_month() {
        // Delivered Jan 4th: Feb is the first counted month.
        assert_eq!(move_out_date(date(2026, 1, 4), 3), date(2026, 5, 31));
    }

    #[test]
    fn test_move_out_crosses_year_boundary() {
        assert_eq!(move_out_date(date(2026, 11, 2), 3), date(2027, 2, 28));
    }

    #[test]
    fn test_move_out_into_leap_february() {
        assert_eq!(move_out_date(date(2027, 11, 2), 3), date(2028, 2, 29));
    }
}
