//! Rent escalation: Staffelmiete (stepped) XOR Indexmiete (index-linked).
//!
//! German law allows at most one escalation scheme per agreement. Instead of
//! two booleans that could both be true, the scheme is a single enum, so the
//! invalid state is unrepresentable. The only mutations live on `RentTerms`;
//! enabling one scheme structurally replaces the other.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One pre-agreed rent step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RentStep {
    pub effective: NaiveDate,
    pub monthly_rent: f64,
}

/// Parameters of a stepped-rent agreement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SteppedRent {
    pub steps: Vec<RentStep>,
}

/// Parameters of an index-linked rent agreement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedRent {
    /// Name of the published consumer price index.
    pub index_name: String,
    /// First day of the base month of the index reading.
    pub base_month: NaiveDate,
}

/// The escalation scheme of an agreement. At most one of the two schemes
/// can be active.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RentEscalation {
    #[default]
    None,
    Stepped(SteppedRent),
    Indexed(IndexedRent),
}

/// Rent-related terms of a tenancy agreement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RentTerms {
    /// Monthly base rent (Kaltmiete).
    pub base_rent: f64,
    /// Monthly utilities prepayment (Nebenkostenvorauszahlung).
    pub utilities_prepayment: f64,
    escalation: RentEscalation,
}

impl RentTerms {
    pub fn new(base_rent: f64, utilities_prepayment: f64) -> Self {
        Self {
            base_rent,
            utilities_prepayment,
            escalation: RentEscalation::None,
        }
    }

    pub fn escalation(&self) -> &RentEscalation {
        &self.escalation
    }

    /// Enable stepped rent. Any active index-linked scheme is replaced.
    pub fn enable_stepped(&mut self, params: SteppedRent) {
        self.escalation = RentEscalation::Stepped(params);
    }

    /// Enable index-linked rent. Any active stepped scheme is replaced.
    pub fn enable_indexed(&mut self, params: IndexedRent) {
        self.escalation = RentEscalation::Indexed(params);
    }

    pub fn clear_escalation(&mut self) {
        self.escalation = RentEscalation::None;
    }

    pub fn is_stepped(&self) -> bool {
        matches!(self.escalation, RentEscalation::Stepped(_))
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.escalation, RentEscalation::Indexed(_))
    }

    /// Total monthly payment: base rent plus utilities prepayment.
    pub fn total_monthly(&self) -> f64 {
        self.base_rent + self.utilities_prepayment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stepped() -> SteppedRent {
        SteppedRent {
            steps: vec![RentStep {
                effective: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
                monthly_rent: 800.0,
            }],
        }
    }

    fn indexed() -> IndexedRent {
        IndexedRent {
            index_name: "Verbraucherpreisindex (Destatis)".to_string(),
            base_month: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_default_has_no_escalation() {
        let terms = RentTerms::new(750.0, 180.0);
        assert!(!terms.is_stepped());
        assert!(!terms.is_indexed());
    }

    #[test]
    fn test_enabling_stepped_replaces_indexed() {
        let mut terms = RentTerms::new(750.0, 180.0);
        terms.enable_indexed(indexed());
        assert!(terms.is_indexed());

        terms.enable_stepped(stepped());
        assert!(terms.is_stepped());
        assert!(!terms.is_indexed());
    }

    #[test]
    fn test_enabling_indexed_replaces_stepped() {
        let mut terms = RentTerms::new(750.0, 180.0);
        terms.enable_stepped(stepped());
        terms.enable_indexed(indexed());
        assert!(terms.is_indexed());
        assert!(!terms.is_stepped());
    }

    #[test]
    fn test_exactly_one_scheme_after_any_toggle_sequence() {
        let mut terms = RentTerms::new(750.0, 180.0);
        for i in 0..6 {
            if i % 2 == 0 {
                terms.enable_stepped(stepped());
            } else {
                terms.enable_indexed(indexed());
            }
            let active = [terms.is_stepped(), terms.is_indexed()]
                .iter()
                .filter(|b| **b)
                .count();
            assert_eq!(active, 1);
        }
        terms.clear_escalation();
        assert_eq!(*terms.escalation(), RentEscalation::None);
    }

    #[test]
    fn test_total_monthly() {
        assert_eq!(RentTerms::new(750.0, 180.0).total_monthly(), 930.0);
    }
}
