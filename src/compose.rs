//! # Document Composition
//!
//! One builder per document type: runs the legal calculations, validates the
//! inputs, and interpolates the derived values into a sequential content
//! plan for the pagination renderer. Validation failures abort composition
//! before any layout work happens.

use chrono::NaiveDate;

use crate::error::MietwerkError;
use crate::forms::{
    HandoverProtocolData, TenancyAgreementData, TerminationNoticeData, UtilityStatementData,
};
use crate::legal::costs::{AllocationKey, CostStatement};
use crate::legal::deposit;
use crate::legal::escalation::RentEscalation;
use crate::legal::notice::{self, TerminatingParty};
use crate::legal::round_cents;
use crate::plan::{ContentOp, ContentPlan};

/// Format a currency amount in German convention: `1.234,56 €`.
pub fn format_eur(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let (whole, frac) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{}{},{:02} €", sign, grouped, frac)
}

/// Format a date in German convention: `01.04.2026`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

fn allocation_label(key: AllocationKey) -> &'static str {
    match key {
        AllocationKey::FloorArea => "nach Wohnfläche",
        AllocationKey::Occupants => "nach Personenzahl",
        AllocationKey::Units => "nach Wohneinheiten",
        AllocationKey::Consumption => "nach Verbrauch",
    }
}

/// Compose a tenancy agreement (Mietvertrag).
///
/// Validates the deposit against the legal cap before emitting anything.
pub fn tenancy_agreement_plan(data: &TenancyAgreementData) -> Result<ContentPlan, MietwerkError> {
    deposit::validate_deposit(data.rent.base_rent, data.deposit)?;

    let mut plan: ContentPlan = vec![
        ContentOp::title("Mietvertrag"),
        ContentOp::subtitle("über Wohnraum"),
        ContentOp::heading("§ 1 Vertragsparteien"),
        ContentOp::paragraph(format!("Vermieter: {}", data.landlord.address_line())),
        ContentOp::paragraph(format!("Mieter: {}", data.tenant.address_line())),
        ContentOp::heading("§ 2 Mietobjekt"),
        ContentOp::label_value(
            "Anschrift",
            format!(
                "{}, {} {}",
                data.property.street, data.property.postal_code, data.property.city
            ),
        ),
    ];
    if !data.property.unit.is_empty() {
        plan.push(ContentOp::label_value("Lage", data.property.unit.clone()));
    }
    plan.push(ContentOp::label_value(
        "Wohnfläche",
        format!("ca. {} m²", data.property.floor_area_sqm),
    ));
    plan.push(ContentOp::label_value(
        "Zimmer",
        data.property.room_count.to_string(),
    ));
    plan.push(ContentOp::label_value(
        "Mietbeginn",
        format_date(data.start_date),
    ));

    plan.push(ContentOp::heading("§ 3 Miete und Nebenkosten"));
    plan.push(ContentOp::label_value(
        "Kaltmiete",
        format_eur(data.rent.base_rent),
    ));
    plan.push(ContentOp::label_value(
        "Nebenkostenvorauszahlung",
        format_eur(data.rent.utilities_prepayment),
    ));
    plan.push(ContentOp::label_value(
        "Gesamtmiete",
        format_eur(data.rent.total_monthly()),
    ));
    match data.rent.escalation() {
        RentEscalation::None => {}
        RentEscalation::Stepped(stepped) => {
            plan.push(ContentOp::paragraph(
                "Es wird eine Staffelmiete gemäß § 557a BGB vereinbart. \
                 Die Miete erhöht sich zu den folgenden Terminen:",
            ));
            for step in &stepped.steps {
                plan.push(ContentOp::LabelValue {
                    label: format!("ab {}", format_date(step.effective)),
                    value: format_eur(step.monthly_rent),
                    indent_mm: 5.0,
                });
            }
        }
        RentEscalation::Indexed(indexed) => {
            plan.push(ContentOp::paragraph(format!(
                "Es wird eine Indexmiete gemäß § 557b BGB vereinbart. Maßgeblich ist \
                 der {} mit Basismonat {}.",
                indexed.index_name,
                format_date(indexed.base_month)
            )));
        }
    }

    plan.push(ContentOp::heading("§ 4 Kaution"));
    plan.push(ContentOp::label_value("Kaution", format_eur(data.deposit)));
    if data.deposit_in_installments {
        plan.push(ContentOp::paragraph(
            "Der Mieter ist berechtigt, die Kaution in drei gleichen monatlichen \
             Teilzahlungen zu erbringen (§ 551 Abs. 2 BGB):",
        ));
        let schedule = deposit::installment_schedule(data.rent.base_rent, data.deposit, data.start_date)?;
        for (i, (due, amount)) in schedule.iter().enumerate() {
            plan.push(ContentOp::LabelValue {
                label: format!("{}. Rate, fällig {}", i + 1, format_date(*due)),
                value: format_eur(*amount),
                indent_mm: 5.0,
            });
        }
    }

    plan.push(ContentOp::heading("§ 5 Kündigung"));
    plan.push(ContentOp::paragraph(
        "Für die Kündigung gelten die gesetzlichen Fristen des § 573c BGB. Für den \
         Mieter beträgt die Kündigungsfrist drei Monate; für den Vermieter verlängert \
         sie sich nach fünf und acht Jahren Mietdauer auf sechs bzw. neun Monate.",
    ));

    if !data.additional_clauses.is_empty() {
        plan.push(ContentOp::heading("§ 6 Weitere Vereinbarungen"));
        for clause in &data.additional_clauses {
            plan.push(ContentOp::paragraph(clause.clone()));
        }
    }

    plan.push(ContentOp::Separator);
    plan.push(ContentOp::SignatureBlock {
        label: "Ort, Datum, Unterschrift Vermieter".to_string(),
        name: data.landlord.name.clone(),
        image: data.landlord_signature.clone(),
    });
    plan.push(ContentOp::SignatureBlock {
        label: "Ort, Datum, Unterschrift Mieter".to_string(),
        name: data.tenant.name.clone(),
        image: data.tenant_signature.clone(),
    });

    Ok(plan)
}

/// Compose a termination notice (Kündigung).
pub fn termination_notice_plan(data: &TerminationNoticeData) -> Result<ContentPlan, MietwerkError> {
    if data.delivery_date < data.tenancy_start {
        return Err(MietwerkError::validation(
            "delivery date lies before the start of the tenancy",
        ));
    }
    let duration_years = data.delivery_date.years_since(data.tenancy_start).unwrap_or(0);
    let months = notice::notice_period_months(data.terminating_party, duration_years);
    let move_out = notice::move_out_date(data.delivery_date, months);

    let mut plan: ContentPlan = vec![
        ContentOp::title("Kündigung des Mietverhältnisses"),
        ContentOp::label_value("Absender", data.sender.address_line()),
        ContentOp::label_value("Empfänger", data.recipient.address_line()),
        ContentOp::label_value(
            "Mietobjekt",
            format!(
                "{}, {} {}",
                data.property.street, data.property.postal_code, data.property.city
            ),
        ),
        ContentOp::label_value("Datum", format_date(data.delivery_date)),
        ContentOp::Separator,
        ContentOp::paragraph(format!(
            "hiermit kündige ich das oben bezeichnete Mietverhältnis ordentlich und \
             fristgerecht. Die gesetzliche Kündigungsfrist beträgt bei einer Mietdauer \
             von {} Jahren {} Monate. Das Mietverhältnis endet damit zum {}.",
            duration_years,
            months,
            format_date(move_out)
        )),
    ];
    if !data.reason.is_empty() {
        plan.push(ContentOp::paragraph(data.reason.clone()));
    }
    if data.terminating_party == TerminatingParty::Tenant {
        plan.push(ContentOp::paragraph(
            "Ich bitte um eine schriftliche Bestätigung der Kündigung und um einen \
             Termin zur Wohnungsübergabe.",
        ));
    }
    plan.push(ContentOp::SignatureBlock {
        label: "Ort, Datum, Unterschrift".to_string(),
        name: data.sender.name.clone(),
        image: data.signature.clone(),
    });
    Ok(plan)
}

/// Compose a handover protocol (Übergabeprotokoll).
pub fn handover_protocol_plan(data: &HandoverProtocolData) -> Result<ContentPlan, MietwerkError> {
    let mut plan: ContentPlan = vec![
        ContentOp::title("Übergabeprotokoll"),
        ContentOp::label_value(
            "Mietobjekt",
            format!(
                "{}, {} {}",
                data.property.street, data.property.postal_code, data.property.city
            ),
        ),
        ContentOp::label_value("Vermieter", data.landlord.name.clone()),
        ContentOp::label_value("Mieter", data.tenant.name.clone()),
        ContentOp::label_value("Übergabedatum", format_date(data.handover_date)),
        ContentOp::heading("Zustand der Räume"),
    ];
    for room in &data.rooms {
        let value = if room.defects.is_empty() {
            room.condition.clone()
        } else {
            format!("{} — Mängel: {}", room.condition, room.defects)
        };
        plan.push(ContentOp::label_value(room.room.clone(), value));
    }
    if !data.meters.is_empty() {
        plan.push(ContentOp::heading("Zählerstände"));
        for meter in &data.meters {
            plan.push(ContentOp::label_value(
                format!("{} (Nr. {})", meter.meter, meter.number),
                meter.reading.clone(),
            ));
        }
    }
    if !data.keys.is_empty() {
        plan.push(ContentOp::heading("Übergebene Schlüssel"));
        for (kind, count) in &data.keys {
            plan.push(ContentOp::label_value(kind.clone(), format!("{} Stück", count)));
        }
    }
    plan.push(ContentOp::Separator);
    plan.push(ContentOp::SignatureBlock {
        label: "Unterschrift Vermieter".to_string(),
        name: data.landlord.name.clone(),
        image: data.landlord_signature.clone(),
    });
    plan.push(ContentOp::SignatureBlock {
        label: "Unterschrift Mieter".to_string(),
        name: data.tenant.name.clone(),
        image: data.tenant_signature.clone(),
    });
    Ok(plan)
}

/// Compose a utility-cost statement (Betriebskostenabrechnung).
///
/// Consumption-based entries must carry an entered share; formula-based
/// shares are derived from the allocation basis.
pub fn utility_statement_plan(data: &UtilityStatementData) -> Result<ContentPlan, MietwerkError> {
    if data.period_end < data.period_start {
        return Err(MietwerkError::validation(
            "billing period end lies before its start",
        ));
    }

    let mut statement = CostStatement::new(data.basis);
    for entry in &data.entries {
        if entry.allocation == AllocationKey::Consumption {
            let share = entry.entered_share.ok_or_else(|| {
                MietwerkError::validation(format!(
                    "cost category {:?} is allocated by consumption but has no entered share",
                    entry.category
                ))
            })?;
            statement.add_consumption_line(entry.category.clone(), entry.total, share);
        } else {
            statement.add_line(entry.category.clone(), entry.total, entry.allocation);
        }
    }

    let mut plan: ContentPlan = vec![
        ContentOp::title("Betriebskostenabrechnung"),
        ContentOp::label_value(
            "Abrechnungszeitraum",
            format!(
                "{} bis {}",
                format_date(data.period_start),
                format_date(data.period_end)
            ),
        ),
        ContentOp::label_value(
            "Mietobjekt",
            format!(
                "{}, {} {}",
                data.property.street, data.property.postal_code, data.property.city
            ),
        ),
        ContentOp::label_value("Mieter", data.tenant.name.clone()),
        ContentOp::label_value(
            "Wohnfläche",
            format!(
                "{} m² von {} m² Gesamtfläche",
                data.basis.tenant_area_sqm, data.basis.total_area_sqm
            ),
        ),
        ContentOp::heading("Kostenaufstellung"),
    ];
    for line in statement.lines() {
        plan.push(ContentOp::label_value(
            format!("{} ({})", line.category, allocation_label(line.allocation)),
            format!(
                "{} von {}",
                format_eur(line.tenant_share),
                format_eur(line.total)
            ),
        ));
    }
    plan.push(ContentOp::Separator);

    let total = statement.tenant_total();
    let balance = round_cents(total - data.prepayments);
    plan.push(ContentOp::label_value("Summe Ihrer Anteile", format_eur(total)));
    plan.push(ContentOp::label_value(
        "Geleistete Vorauszahlungen",
        format_eur(data.prepayments),
    ));
    if balance >= 0.0 {
        plan.push(ContentOp::label_value("Nachzahlung", format_eur(balance)));
    } else {
        plan.push(ContentOp::label_value("Guthaben", format_eur(-balance)));
    }
    plan.push(ContentOp::SignatureBlock {
        label: "Unterschrift Vermieter".to_string(),
        name: data.landlord.name.clone(),
        image: None,
    });
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::*;
    use crate::legal::costs::AllocationBasis;
    use crate::legal::escalation::RentTerms;

    fn party(name: &str) -> Party {
        Party {
            name: name.to_string(),
            street: "Hauptstraße 1".to_string(),
            postal_code: "10115".to_string(),
            city: "Berlin".to_string(),
        }
    }

    fn property() -> PropertyAddress {
        PropertyAddress {
            street: "Gartenweg 4".to_string(),
            postal_code: "50667".to_string(),
            city: "Köln".to_string(),
            unit: String::new(),
            floor_area_sqm: 65.0,
            room_count: 2.5,
        }
    }

    fn agreement(deposit: f64) -> TenancyAgreementData {
        TenancyAgreementData {
            landlord: party("Anna Ardelt"),
            tenant: party("Jonas Brand"),
            property: property(),
            start_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            rent: RentTerms::new(750.0, 180.0),
            deposit,
            deposit_in_installments: false,
            additional_clauses: vec![],
            landlord_signature: None,
            tenant_signature: None,
        }
    }

    #[test]
    fn test_format_eur() {
        assert_eq!(format_eur(750.0), "750,00 €");
        assert_eq!(format_eur(2250.5), "2.250,50 €");
        assert_eq!(format_eur(1234567.89), "1.234.567,89 €");
        assert_eq!(format_eur(-78.0), "-78,00 €");
        assert_eq!(format_eur(0.0), "0,00 €");
    }

    #[test]
    fn test_overcap_deposit_aborts_composition() {
        let err = tenancy_agreement_plan(&agreement(2251.0)).unwrap_err();
        assert!(matches!(err, MietwerkError::Validation { .. }));
    }

    #[test]
    fn test_deposit_at_cap_composes() {
        let plan = tenancy_agreement_plan(&agreement(2250.0)).unwrap();
        assert!(matches!(plan[0], ContentOp::Title { .. }));
        assert!(plan
            .iter()
            .any(|op| matches!(op, ContentOp::LabelValue { value, .. } if value == "2.250,00 €")));
    }

    #[test]
    fn test_installments_appear_as_three_equal_rates() {
        let mut data = agreement(2250.0);
        data.deposit_in_installments = true;
        let plan = tenancy_agreement_plan(&data).unwrap();
        let rates: Vec<&str> = plan
            .iter()
            .filter_map(|op| match op {
                ContentOp::LabelValue { label, value, .. } if label.contains("Rate") => {
                    Some(value.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(rates, vec!["750,00 €", "750,00 €", "750,00 €"]);
    }

    #[test]
    fn test_notice_after_ten_years_is_nine_months() {
        let data = TerminationNoticeData {
            sender: party("Anna Ardelt"),
            recipient: party("Jonas Brand"),
            property: property(),
            terminating_party: TerminatingParty::Landlord,
            delivery_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            tenancy_start: NaiveDate::from_ymd_opt(2016, 3, 1).unwrap(),
            reason: String::new(),
            signature: None,
        };
        let plan = termination_notice_plan(&data).unwrap();
        let body = plan
            .iter()
            .find_map(|op| match op {
                ContentOp::Paragraph { text, .. } => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        assert!(body.contains("9 Monate"), "ten-year tenancy: {}", body);
        // Delivered March 2nd: March counts, move-out end of December.
        assert!(body.contains("31.12.2026"), "{}", body);
    }

    #[test]
    fn test_notice_rejects_delivery_before_start() {
        let data = TerminationNoticeData {
            sender: party("A"),
            recipient: party("B"),
            property: property(),
            terminating_party: TerminatingParty::Tenant,
            delivery_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            tenancy_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            reason: String::new(),
            signature: None,
        };
        assert!(termination_notice_plan(&data).is_err());
    }

    #[test]
    fn test_utility_statement_shares_and_balance() {
        let data = UtilityStatementData {
            landlord: party("Anna Ardelt"),
            tenant: party("Jonas Brand"),
            property: property(),
            period_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            basis: AllocationBasis {
                tenant_area_sqm: 65.0,
                total_area_sqm: 1000.0,
                tenant_occupants: 2,
                total_occupants: 8,
                unit_count: 10,
            },
            entries: vec![CostEntry {
                category: "Grundsteuer".to_string(),
                total: 1200.0,
                allocation: AllocationKey::FloorArea,
                entered_share: None,
            }],
            prepayments: 50.0,
        };
        let plan = utility_statement_plan(&data).unwrap();
        assert!(plan
            .iter()
            .any(|op| matches!(op, ContentOp::LabelValue { value, .. } if value.starts_with("78,00 €"))));
        assert!(plan.iter().any(
            |op| matches!(op, ContentOp::LabelValue { label, value, .. } if label == "Nachzahlung" && value == "28,00 €")
        ));
    }

    #[test]
    fn test_consumption_entry_without_share_is_rejected() {
        let data = UtilityStatementData {
            landlord: party("A"),
            tenant: party("B"),
            property: property(),
            period_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            basis: AllocationBasis {
                tenant_area_sqm: 65.0,
                total_area_sqm: 1000.0,
                tenant_occupants: 2,
                total_occupants: 8,
                unit_count: 10,
            },
            entries: vec![CostEntry {
                category: "Wasser".to_string(),
                total: 600.0,
                allocation: AllocationKey::Consumption,
                entered_share: None,
            }],
            prepayments: 0.0,
        };
        assert!(matches!(
            utility_statement_plan(&data),
            Err(MietwerkError::Validation { .. })
        ));
    }
}
