//! Security deposit (Kaution) cap and installment schedule.

use chrono::{Datelike, NaiveDate};

use crate::error::MietwerkError;

/// Legal maximum deposit: three times the monthly base rent (Kaltmiete).
pub fn max_deposit(base_rent: f64) -> f64 {
    base_rent * 3.0
}

/// Check an entered deposit against the legal cap.
///
/// Exceeding the cap is a validation error surfaced to the caller, never a
/// silent clamp. Exactly the cap is accepted. Comparison happens on whole
/// cents so that `2250.00` against a cap of `3 × 750` is not rejected by
/// float noise.
pub fn validate_deposit(base_rent: f64, deposit: f64) -> Result<(), MietwerkError> {
    let cap = max_deposit(base_rent);
    let deposit_cents = (deposit * 100.0).round() as i64;
    let cap_cents = (cap * 100.0).round() as i64;
    if deposit_cents > cap_cents {
        return Err(MietwerkError::validation(format!(
            "deposit of {:.2} exceeds the legal maximum of {:.2} (3 x base rent {:.2})",
            deposit, cap, base_rent
        )));
    }
    Ok(())
}

/// Split a deposit into three installments.
///
/// The total is divided into three cent-rounded parts; the remainder cents
/// (0, 1 or 2) are added to the first installment, so the parts always sum
/// to the entered total.
pub fn installments(total: f64) -> [f64; 3] {
    let total_cents = (total * 100.0).round() as i64;
    let part = total_cents / 3;
    let remainder = total_cents - part * 3;
    [
        (part + remainder) as f64 / 100.0,
        part as f64 / 100.0,
        part as f64 / 100.0,
    ]
}

/// Due dates for the three installments: at move-in, and at the start of
/// the 2nd and 3rd months of the tenancy.
pub fn installment_due_dates(move_in: NaiveDate) -> [NaiveDate; 3] {
    [move_in, first_of_offset(move_in, 1), first_of_offset(move_in, 2)]
}

fn first_of_offset(date: NaiveDate, months_ahead: u32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month();
    for _ in 0..months_ahead {
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Validated deposit split into a cent-exact schedule.
pub fn installment_schedule(
    base_rent: f64,
    deposit: f64,
    move_in: NaiveDate,
) -> Result<[(NaiveDate, f64); 3], MietwerkError> {
    validate_deposit(base_rent, deposit)?;
    let amounts = installments(deposit);
    let dates = installment_due_dates(move_in);
    Ok([
        (dates[0], amounts[0]),
        (dates[1], amounts[1]),
        (dates[2], amounts[2]),
    ])
}
