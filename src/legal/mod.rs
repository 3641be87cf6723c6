//! # Legal Calculation Rules
//!
//! Pure, deterministic functions for German tenancy law: statutory notice
//! periods (Kündigungsfrist), deposit caps and installment schedules
//! (Kaution), mutually exclusive rent escalation (Staffelmiete/Indexmiete),
//! and proportional utility-cost allocation (Betriebskosten).
//!
//! All functions here are total over their documented domains: every valid
//! input has exactly one defined result, nothing panics, and the only
//! `Result` in the module is deposit validation, where exceeding the legal
//! cap is a caller-visible error rather than a silent clamp.

pub mod costs;
pub mod deposit;
pub mod escalation;
pub mod notice;

/// Round a currency amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(78.004), 78.0);
        assert_eq!(round_cents(97.496), 97.5);
        assert_eq!(round_cents(0.0), 0.0);
    }
}
