//! Proportional allocation of utility/operating costs (Betriebskosten).
//!
//! A cost statement owns its allocation basis (areas, headcounts, unit
//! count) and a list of cost lines. Any change to the basis recomputes every
//! derived tenant share in place, preserving the entered totals — the share
//! is an invariant maintained by the statement, not a one-time calculation.

use serde::{Deserialize, Serialize};

use super::round_cents;

/// How a cost category is distributed across the building.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AllocationKey {
    /// By tenant floor area over total floor area.
    FloorArea,
    /// By tenant occupant headcount over total occupants.
    Occupants,
    /// Evenly per residential unit.
    Units,
    /// By metered consumption: the share is entered manually, no formula.
    Consumption,
}

/// The ratios the proportional formulas draw from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationBasis {
    pub tenant_area_sqm: f64,
    pub total_area_sqm: f64,
    pub tenant_occupants: u32,
    pub total_occupants: u32,
    pub unit_count: u32,
}

impl AllocationBasis {
    /// Tenant share of `total` under `key`.
    ///
    /// Returns `None` for consumption-based keys, which have no formula.
    /// A zero denominator yields a share of 0.00 so the function stays
    /// total over all numeric inputs.
    pub fn tenant_share(&self, total: f64, key: AllocationKey) -> Option<f64> {
        let share = match key {
            AllocationKey::FloorArea => {
                if self.total_area_sqm <= 0.0 {
                    0.0
                } else {
                    total * (self.tenant_area_sqm / self.total_area_sqm)
                }
            }
            AllocationKey::Occupants => {
                if self.total_occupants == 0 {
                    0.0
                } else {
                    total * (self.tenant_occupants as f64 / self.total_occupants as f64)
                }
            }
            AllocationKey::Units => {
                if self.unit_count == 0 {
                    0.0
                } else {
                    total / self.unit_count as f64
                }
            }
            AllocationKey::Consumption => return None,
        };
        Some(round_cents(share))
    }
}

/// One cost category with its entered total and derived tenant share.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    pub category: String,
    pub total: f64,
    pub allocation: AllocationKey,
    /// Derived for formula-based keys; entered manually for consumption.
    pub tenant_share: f64,
}

/// A utility-cost statement: an allocation basis plus cost lines whose
/// shares are kept consistent with the basis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostStatement {
    basis: AllocationBasis,
    lines: Vec<CostLine>,
}

impl CostStatement {
    pub fn new(basis: AllocationBasis) -> Self {
        Self {
            basis,
            lines: Vec::new(),
        }
    }

    pub fn basis(&self) -> &AllocationBasis {
        &self.basis
    }

    pub fn lines(&self) -> &[CostLine] {
        &self.lines
    }

    /// Add a formula-allocated cost line; the share is computed immediately.
    pub fn add_line(&mut self, category: impl Into<String>, total: f64, key: AllocationKey) {
        let tenant_share = self.basis.tenant_share(total, key).unwrap_or(0.0);
        self.lines.push(CostLine {
            category: category.into(),
            total,
            allocation: key,
            tenant_share,
        });
    }

    /// Add a consumption-based line with a manually entered share.
    pub fn add_consumption_line(
        &mut self,
        category: impl Into<String>,
        total: f64,
        entered_share: f64,
    ) {
        self.lines.push(CostLine {
            category: category.into(),
            total,
            allocation: AllocationKey::Consumption,
            tenant_share: round_cents(entered_share),
        });
    }

    /// Replace the allocation basis and recompute every formula-based line
    /// in place. Entered totals and consumption shares are preserved.
    pub fn set_basis(&mut self, basis: AllocationBasis) {
        self.basis = basis;
        for line in &mut self.lines {
            if let Some(share) = self.basis.tenant_share(line.total, line.allocation) {
                line.tenant_share = share;
            }
        }
    }

    /// Sum of all tenant shares, in cents-exact currency.
    pub fn tenant_total(&self) -> f64 {
        round_cents(self.lines.iter().map(|l| l.tenant_share).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basis() -> AllocationBasis {
        AllocationBasis {
            tenant_area_sqm: 65.0,
            total_area_sqm: 1000.0,
            tenant_occupants: 2,
            total_occupants: 8,
            unit_count: 10,
        }
    }

    #[test]
    fn test_area_share() {
        // €1200 by floor area, 65m² of 1000m² -> €78.00
        assert_eq!(basis().tenant_share(1200.0, AllocationKey::FloorArea), Some(78.0));
    }

    #[test]
    fn test_occupant_share() {
        assert_eq!(basis().tenant_share(400.0, AllocationKey::Occupants), Some(100.0));
    }

    #[test]
    fn test_unit_share() {
        assert_eq!(basis().tenant_share(250.0, AllocationKey::Units), Some(25.0));
    }

    #[test]
    fn test_consumption_has_no_formula() {
        assert_eq!(basis().tenant_share(999.0, AllocationKey::Consumption), None);
    }

    #[test]
    fn test_zero_denominator_yields_zero_share() {
        let empty = AllocationBasis {
            tenant_area_sqm: 65.0,
            total_area_sqm: 0.0,
            tenant_occupants: 2,
            total_occupants: 0,
            unit_count: 0,
        };
        assert_eq!(empty.tenant_share(1200.0, AllocationKey::FloorArea), Some(0.0));
        assert_eq!(empty.tenant_share(1200.0, AllocationKey::Occupants), Some(0.0));
        assert_eq!(empty.tenant_share(1200.0, AllocationKey::Units), Some(0.0));
    }

    #[test]
    fn test_basis_change_recomputes_lines_in_place() {
        let mut statement = CostStatement::new(basis());
        statement.add_line("Grundsteuer", 1200.0, AllocationKey::FloorArea);
        assert_eq!(statement.lines()[0].tenant_share, 78.0);

        // Shrinking the building to 800m² raises the tenant's ratio.
        let mut smaller = basis();
        smaller.total_area_sqm = 800.0;
        statement.set_basis(smaller);

        let line = &statement.lines()[0];
        assert_eq!(line.total, 1200.0, "entered total must be preserved");
        assert_eq!(line.tenant_share, 97.5);
    }

    #[test]
    fn test_basis_change_preserves_consumption_lines() {
        let mut statement = CostStatement::new(basis());
        statement.add_consumption_line("Wasser", 600.0, 142.37);
        statement.set_basis(AllocationBasis {
            total_area_sqm: 500.0,
            ..basis()
        });
        assert_eq!(statement.lines()[0].tenant_share, 142.37);
    }

    #[test]
    fn test_tenant_total_sums_shares() {
        let mut statement = CostStatement::new(basis());
        statement.add_line("Grundsteuer", 1200.0, AllocationKey::FloorArea);
        statement.add_line("Hausmeister", 250.0, AllocationKey::Units);
        statement.add_consumption_line("Heizung", 900.0, 210.55);
        assert_eq!(statement.tenant_total(), 313.55);
    }

    #[test]
    fn test_zero_cost_category() {
        assert_eq!(basis().tenant_share(0.0, AllocationKey::FloorArea), Some(0.0));
    }
}
