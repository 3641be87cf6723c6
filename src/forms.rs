//! # Form Records
//!
//! The structured input records for the four rental document types. The
//! composition layer consumes these read-only; nothing in here is persisted
//! by this crate. All records round-trip through JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::legal::costs::{AllocationBasis, AllocationKey};
use crate::legal::escalation::RentTerms;
use crate::legal::notice::TerminatingParty;

/// A contracting party: landlord or tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
}

impl Party {
    /// "Name, Street, PLZ City" on one line.
    pub fn address_line(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.name, self.street, self.postal_code, self.city
        )
    }
}

/// The rented property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAddress {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    /// Floor / unit designation ("2. OG links").
    #[serde(default)]
    pub unit: String,
    pub floor_area_sqm: f64,
    pub room_count: f64,
}

/// Input record for a tenancy agreement (Mietvertrag).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenancyAgreementData {
    pub landlord: Party,
    pub tenant: Party,
    pub property: PropertyAddress,
    pub start_date: NaiveDate,
    pub rent: RentTerms,
    pub deposit: f64,
    /// Pay the deposit in three statutory installments.
    #[serde(default)]
    pub deposit_in_installments: bool,
    /// Free-text additional clauses, one paragraph each.
    #[serde(default)]
    pub additional_clauses: Vec<String>,
    /// Optional captured signature images (PNG/JPEG bytes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landlord_signature: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_signature: Option<Vec<u8>>,
}

/// Input record for a termination notice (Kündigung).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TerminationNoticeData {
    pub sender: Party,
    pub recipient: Party,
    pub property: PropertyAddress,
    pub terminating_party: TerminatingParty,
    /// Date the notice is delivered.
    pub delivery_date: NaiveDate,
    pub tenancy_start: NaiveDate,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Vec<u8>>,
}

/// Condition of a single room at handover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomCondition {
    pub room: String,
    pub condition: String,
    #[serde(default)]
    pub defects: String,
}

/// One utility meter reading at handover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    pub meter: String,
    pub number: String,
    pub reading: String,
}

/// Input record for a handover protocol (Übergabeprotokoll).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HandoverProtocolData {
    pub landlord: Party,
    pub tenant: Party,
    pub property: PropertyAddress,
    pub handover_date: NaiveDate,
    pub rooms: Vec<RoomCondition>,
    #[serde(default)]
    pub meters: Vec<MeterReading>,
    /// Keys handed over, as "kind -> count" lines.
    #[serde(default)]
    pub keys: Vec<(String, u32)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landlord_signature: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_signature: Option<Vec<u8>>,
}

/// One entered cost category of a utility statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostEntry {
    pub category: String,
    pub total: f64,
    pub allocation: AllocationKey,
    /// Required for consumption-based entries; ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entered_share: Option<f64>,
}

/// Input record for a utility-cost statement (Betriebskostenabrechnung).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UtilityStatementData {
    pub landlord: Party,
    pub tenant: Party,
    pub property: PropertyAddress,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub basis: AllocationBasis,
    pub entries: Vec<CostEntry>,
    /// Prepayments already made by the tenant over the period.
    pub prepayments: f64,
}
