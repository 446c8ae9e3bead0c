//! Renewal scheduling from a rules document.
//!
//! Resolution order:
//! 1. the first medication rule whose `atcPrefix` prefixes one of the ATC codes
//! 2. the first condition, when the treatment is chronic
//! 3. the longest item duration, else `maxDispenseDaysIfUnknown`

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::rules::{RenewalSpec, RulesDocument};

/// Days between the appointment and the end of the dispensed supply.
const APPOINTMENT_MARGIN_DAYS: u32 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenewalRequest {
    pub is_chronic: bool,
    pub atc_codes: Vec<String>,
    pub duration_days: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalReason {
    AtcMatch(String),
    ChronicDefault,
    InferredFromDurations,
    FallbackDefault,
}

impl fmt::Display for RenewalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtcMatch(prefix) => write!(f, "ATC match: {prefix}"),
            Self::ChronicDefault => f.write_str("Chronic default"),
            Self::InferredFromDurations => f.write_str("Infer from item durations"),
            Self::FallbackDefault => f.write_str("Fallback default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalDecision {
    pub dispense_days: u32,
    pub appointment_offset_days: u32,
    pub lead_days: u32,
    pub reason: RenewalReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalDates {
    pub renewal_due: DateTime<Utc>,
    pub next_appointment: DateTime<Utc>,
    pub remind_at: DateTime<Utc>,
}

fn appointment_offset(dispense_days: u32) -> u32 {
    dispense_days.saturating_sub(APPOINTMENT_MARGIN_DAYS).max(1)
}

fn renewal_spacing(spec: Option<&RenewalSpec>, fallback_days: u32) -> (u32, u32) {
    let dispense = spec
        .and_then(|s| s.dispense_days)
        .unwrap_or(fallback_days);
    // Offset default follows the rule's own dispense days (30 when absent),
    // not the fallback.
    let offset = spec
        .and_then(|s| s.appointment_offset_days)
        .unwrap_or_else(|| {
            appointment_offset(spec.and_then(|s| s.dispense_days).unwrap_or(30))
        });
    (dispense, offset)
}

/// Picks dispense and appointment spacing for a prescription renewal.
pub fn compute_renewal(rules: &RulesDocument, request: &RenewalRequest) -> RenewalDecision {
    let lead_days = rules.default.renewal_lead_days;
    let unknown_days = rules.default.max_dispense_days_if_unknown;

    for rule in &rules.medication_rules {
        let Some(prefix) = rule.atc_prefix.as_deref() else {
            continue;
        };
        if request.atc_codes.iter().any(|atc| atc.starts_with(prefix)) {
            let (dispense_days, appointment_offset_days) =
                renewal_spacing(rule.renewal.as_ref(), unknown_days);
            return RenewalDecision {
                dispense_days,
                appointment_offset_days,
                lead_days,
                reason: RenewalReason::AtcMatch(prefix.to_string()),
            };
        }
    }

    if request.is_chronic
        && let Some(condition) = rules.conditions.first()
    {
        let (dispense_days, appointment_offset_days) =
            renewal_spacing(condition.renewal.as_ref(), unknown_days);
        return RenewalDecision {
            dispense_days,
            appointment_offset_days,
            lead_days,
            reason: RenewalReason::ChronicDefault,
        };
    }

    let inferred = request.duration_days.iter().copied().filter(|d| *d > 0).max();
    let (dispense_days, reason) = match inferred {
        Some(days) => (days, RenewalReason::InferredFromDurations),
        None => (unknown_days, RenewalReason::FallbackDefault),
    };
    RenewalDecision {
        dispense_days,
        appointment_offset_days: appointment_offset(dispense_days),
        lead_days,
        reason,
    }
}

fn days(count: u32) -> Duration {
    Duration::days(i64::from(count))
}

/// Turns a decision into calendar dates relative to `now`.
///
/// Returns `None` when a date falls outside the supported calendar range.
pub fn compute_dates(now: DateTime<Utc>, decision: &RenewalDecision) -> Option<RenewalDates> {
    let renewal_due = now.checked_add_signed(days(decision.dispense_days))?;
    Some(RenewalDates {
        renewal_due,
        next_appointment: now.checked_add_signed(days(decision.appointment_offset_days))?,
        remind_at: renewal_due.checked_sub_signed(days(decision.lead_days))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Condition, MedicationRule, RenewalDefaults};
    use chrono::TimeZone;

    fn rules(medication_rules: Vec<MedicationRule>) -> RulesDocument {
        RulesDocument {
            country: "TN".to_string(),
            payer: "CNAM".to_string(),
            version: "0.2.0".to_string(),
            generated_at: "2024-01-01T00:00:00Z".to_string(),
            sources: vec![],
            disclaimer: String::new(),
            default: RenewalDefaults::default(),
            prior_agreement: None,
            conditions: vec![Condition::chronic_generic()],
            medication_rules,
        }
    }

    fn atc_rule(prefix: &str, spec: Option<RenewalSpec>) -> MedicationRule {
        MedicationRule {
            dci_contains: None,
            atc_prefix: Some(prefix.to_string()),
            label: prefix.to_string(),
            tags: vec![],
            renewal: spec,
        }
    }

    #[test]
    fn test_atc_rule_wins() {
        let doc = rules(vec![atc_rule(
            "A10",
            Some(RenewalSpec {
                dispense_days: Some(90),
                appointment_offset_days: None,
            }),
        )]);
        let decision = compute_renewal(
            &doc,
            &RenewalRequest {
                is_chronic: true,
                atc_codes: vec!["A10BA02".to_string()],
                duration_days: vec![],
            },
        );
        assert_eq!(decision.dispense_days, 90);
        assert_eq!(decision.appointment_offset_days, 83);
        assert_eq!(decision.lead_days, 7);
        assert_eq!(decision.reason, RenewalReason::AtcMatch("A10".to_string()));
    }

    #[test]
    fn test_atc_rule_without_renewal_uses_defaults() {
        let doc = rules(vec![atc_rule("C09", None)]);
        let decision = compute_renewal(
            &doc,
            &RenewalRequest {
                atc_codes: vec!["C09AA05".to_string()],
                ..RenewalRequest::default()
            },
        );
        assert_eq!(decision.dispense_days, 30);
        assert_eq!(decision.appointment_offset_days, 23);
    }

    #[test]
    fn test_chronic_uses_first_condition() {
        let doc = rules(vec![]);
        let decision = compute_renewal(
            &doc,
            &RenewalRequest {
                is_chronic: true,
                ..RenewalRequest::default()
            },
        );
        assert_eq!(decision.dispense_days, 30);
        assert_eq!(decision.appointment_offset_days, 23);
        assert_eq!(decision.reason.to_string(), "Chronic default");
    }

    #[test]
    fn test_durations_then_fallback() {
        let doc = rules(vec![]);
        let inferred = compute_renewal(
            &doc,
            &RenewalRequest {
                duration_days: vec![0, 14, 5],
                ..RenewalRequest::default()
            },
        );
        assert_eq!(inferred.dispense_days, 14);
        assert_eq!(inferred.appointment_offset_days, 7);
        assert_eq!(inferred.reason, RenewalReason::InferredFromDurations);

        let short = compute_renewal(
            &doc,
            &RenewalRequest {
                duration_days: vec![3],
                ..RenewalRequest::default()
            },
        );
        assert_eq!(short.appointment_offset_days, 1);

        let fallback = compute_renewal(&doc, &RenewalRequest::default());
        assert_eq!(fallback.dispense_days, 30);
        assert_eq!(fallback.reason, RenewalReason::FallbackDefault);
    }

    #[test]
    fn test_compute_dates() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let decision = RenewalDecision {
            dispense_days: 30,
            appointment_offset_days: 23,
            lead_days: 7,
            reason: RenewalReason::ChronicDefault,
        };
        let dates = compute_dates(now, &decision).unwrap();
        assert_eq!(dates.renewal_due, Utc.with_ymd_and_hms(2024, 3, 31, 8, 0, 0).unwrap());
        assert_eq!(
            dates.next_appointment,
            Utc.with_ymd_and_hms(2024, 3, 24, 8, 0, 0).unwrap()
        );
        assert_eq!(dates.remind_at, Utc.with_ymd_and_hms(2024, 3, 24, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_compute_dates_out_of_range() {
        let doc = rules(vec![]);
        let decision = compute_renewal(
            &doc,
            &RenewalRequest {
                duration_days: vec![u32::MAX],
                ..RenewalRequest::default()
            },
        );
        assert_eq!(decision.dispense_days, u32::MAX);
        assert_eq!(compute_dates(Utc::now(), &decision), None);
    }
}
