use chrono::{DateTime, Duration, Utc};

use crate::models::FraudCase;

pub const ESCALATION_RISK_SCORE: u8 = 80;
pub const DOCUMENT_DUE_DAYS: i64 = 7;
pub const CARD_FLAG_PREVIEW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

pub fn confidence_tier(confidence: f64) -> ConfidenceTier {
    if confidence > 0.8 {
        ConfidenceTier::High
    } else if confidence > 0.6 {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence * 100.0).round() as u32
}

pub fn recommended_action(risk_score: u8) -> &'static str {
    if risk_score > ESCALATION_RISK_SCORE {
        "Immediate escalation"
    } else {
        "Standard review process"
    }
}

/// Templated stand-in for a model-generated analysis.
pub fn ai_summary(case: &FraudCase) -> String {
    format!(
        "AI-generated analysis: Case {} shows {} risk patterns. {} flags detected. Recommended action: {}.",
        case.id,
        case.severity.as_str(),
        case.flags.len(),
        recommended_action(case.risk_score)
    )
}

pub fn document_due_date(requested_at: DateTime<Utc>) -> DateTime<Utc> {
    requested_at + Duration::days(DOCUMENT_DUE_DAYS)
}

pub fn hidden_flag_count(case: &FraudCase) -> usize {
    case.flags.len().saturating_sub(CARD_FLAG_PREVIEW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::seed;

    #[test]
    fn confidence_follows_expected_tiers() {
        assert_eq!(confidence_tier(0.92), ConfidenceTier::High);
        assert_eq!(confidence_tier(0.8), ConfidenceTier::Medium);
        assert_eq!(confidence_tier(0.65), ConfidenceTier::Medium);
        assert_eq!(confidence_tier(0.6), ConfidenceTier::Low);
        assert_eq!(confidence_percent(0.875), 88);
    }

    #[test]
    fn recommendation_escalates_above_eighty() {
        assert_eq!(recommended_action(92), "Immediate escalation");
        assert_eq!(recommended_action(80), "Standard review process");
    }

    #[test]
    fn summary_reflects_severity_score_and_flags() {
        let mut case = seed::dataset().unwrap().cases.remove(1);
        assert_eq!(
            ai_summary(&case),
            "AI-generated analysis: Case CASE002 shows medium risk patterns. 1 flags detected. Recommended action: Standard review process."
        );

        case.severity = Severity::Critical;
        case.risk_score = 95;
        let summary = ai_summary(&case);
        assert!(summary.contains("critical risk patterns"));
        assert!(summary.ends_with("Immediate escalation."));
    }

    #[test]
    fn due_date_is_a_week_out() {
        let requested = Utc::now();
        assert_eq!(document_due_date(requested) - requested, Duration::days(7));
    }
}
