use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    Active,
    Suspended,
    Graduated,
    Withdrawn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub enrollment_date: NaiveDate,
    pub program: String,
    pub status: StudentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pending,
    Reviewed,
    Escalated,
    Resolved,
    Dismissed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Reviewed => "reviewed",
            CaseStatus::Escalated => "escalated",
            CaseStatus::Resolved => "resolved",
            CaseStatus::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Admissions,
    FinancialAid,
    Enrollment,
    LmsActivity,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Admissions => "admissions",
            Stage::FinancialAid => "financial_aid",
            Stage::Enrollment => "enrollment",
            Stage::LmsActivity => "lms_activity",
        }
    }

    pub fn label(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum AgentType {
    ApplicationAgent,
    MemoryAgent,
    EscalationAgent,
    ExplainerAgent,
}

impl AgentType {
    pub const ALL: [AgentType; 4] = [
        AgentType::ApplicationAgent,
        AgentType::MemoryAgent,
        AgentType::EscalationAgent,
        AgentType::ExplainerAgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::ApplicationAgent => "ApplicationAgent",
            AgentType::MemoryAgent => "MemoryAgent",
            AgentType::EscalationAgent => "EscalationAgent",
            AgentType::ExplainerAgent => "ExplainerAgent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    VpnIp,
    EssaySimilarity,
    EmailAge,
    NoLmsActivity,
    DuplicateDocuments,
    SuspiciousTiming,
}

impl FlagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagType::VpnIp => "vpn_ip",
            FlagType::EssaySimilarity => "essay_similarity",
            FlagType::EmailAge => "email_age",
            FlagType::NoLmsActivity => "no_lms_activity",
            FlagType::DuplicateDocuments => "duplicate_documents",
            FlagType::SuspiciousTiming => "suspicious_timing",
        }
    }
}

/// Evidence carried by a flag. The variant is the flag's type; each type
/// carries its own metadata shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlagEvidence {
    VpnIp {
        #[serde(default)]
        locations: Vec<String>,
        #[serde(default, rename = "ipAddress")]
        ip_address: Option<String>,
    },
    EssaySimilarity {
        #[serde(default, rename = "similarityScore")]
        similarity_score: Option<f64>,
        #[serde(default)]
        source: Option<String>,
    },
    EmailAge {
        #[serde(default, rename = "emailCreationDate")]
        email_creation_date: Option<NaiveDate>,
        #[serde(default, rename = "daysDifference")]
        days_difference: Option<u32>,
    },
    NoLmsActivity {
        #[serde(default, rename = "lastLogin")]
        last_login: Option<NaiveDate>,
        #[serde(default, rename = "daysSinceLogin")]
        days_since_login: Option<u32>,
    },
    DuplicateDocuments {
        #[serde(default, rename = "duplicateCount")]
        duplicate_count: Option<u32>,
        #[serde(default, rename = "matchingStudents")]
        matching_students: Vec<String>,
    },
    SuspiciousTiming {
        #[serde(default, rename = "documentCount")]
        document_count: Option<u32>,
        #[serde(default, rename = "timeWindow")]
        time_window: Option<String>,
    },
}

impl FlagEvidence {
    pub fn flag_type(&self) -> FlagType {
        match self {
            FlagEvidence::VpnIp { .. } => FlagType::VpnIp,
            FlagEvidence::EssaySimilarity { .. } => FlagType::EssaySimilarity,
            FlagEvidence::EmailAge { .. } => FlagType::EmailAge,
            FlagEvidence::NoLmsActivity { .. } => FlagType::NoLmsActivity,
            FlagEvidence::DuplicateDocuments { .. } => FlagType::DuplicateDocuments,
            FlagEvidence::SuspiciousTiming { .. } => FlagType::SuspiciousTiming,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudFlag {
    pub id: String,
    #[serde(flatten)]
    pub evidence: FlagEvidence,
    pub description: String,
    pub severity: Severity,
    pub confidence: f64,
    pub triggered_by: AgentType,
    pub triggered_at: DateTime<Utc>,
}

impl FraudFlag {
    pub fn flag_type(&self) -> FlagType {
        self.evidence.flag_type()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineDetail {
    ApplicationSubmitted {
        #[serde(default, rename = "applicationId")]
        application_id: Option<String>,
        #[serde(default, rename = "aidAmountUsd")]
        aid_amount_usd: Option<u32>,
    },
    DocumentUploaded {
        #[serde(default, rename = "documentType")]
        document_type: Option<DocumentType>,
    },
    FlagTriggered {
        #[serde(default, rename = "flagType")]
        flag_type: Option<FlagType>,
    },
    AiAnalysis {
        #[serde(default, rename = "matchConfidence")]
        match_confidence: Option<f64>,
    },
    HumanReview {
        #[serde(default)]
        reviewer: Option<String>,
    },
    Escalation {
        #[serde(default)]
        reason: Option<String>,
    },
    Resolution {
        #[serde(default)]
        outcome: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: String,
    #[serde(flatten)]
    pub detail: TimelineDetail,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentType>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskPattern {
    RepeatOffender,
    Escalating,
    SimilarBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentOutcome {
    Dismissed,
    Warning,
    Suspended,
    Expelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousIncident {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub severity: Severity,
    pub outcome: IncidentOutcome,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEcho {
    pub id: String,
    pub student_id: String,
    pub previous_incidents: Vec<PreviousIncident>,
    pub risk_pattern: RiskPattern,
    pub confidence: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Transcript,
    IdVerification,
    FinancialRecords,
    EssayVerification,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Transcript => "transcript",
            DocumentType::IdVerification => "id_verification",
            DocumentType::FinancialRecords => "financial_records",
            DocumentType::EssayVerification => "essay_verification",
            DocumentType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Sent,
    AwaitingResponse,
    Received,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub description: String,
    pub requested_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: DocumentStatus,
    pub email_subject: String,
    pub email_body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudCase {
    pub id: String,
    pub student_id: String,
    pub student: Student,
    pub risk_score: u8,
    pub status: CaseStatus,
    pub severity: Severity,
    pub flagged_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub stage: Stage,
    #[serde(default)]
    pub flags: Vec<FraudFlag>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_echo: Option<MemoryEcho>,
    #[serde(default)]
    pub documents_requested: Vec<DocumentRequest>,
}

impl FraudCase {
    pub fn is_pending(&self) -> bool {
        self.status == CaseStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
            NotificationKind::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationToast {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiData {
    pub total_flags: u32,
    pub financial_aid_flags: u32,
    pub ghost_students: u32,
    pub escalated_cases: u32,
    pub trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    #[serde(rename = "type")]
    pub rule_type: FlagType,
    pub threshold: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeSetting {
    Light,
    Dark,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub new_flags: bool,
    pub escalations: bool,
    pub document_updates: bool,
    pub email_notifications: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub theme: ThemeSetting,
    pub notifications: NotificationSettings,
    pub risk_threshold: u8,
    pub enabled_agents: BTreeMap<AgentType, bool>,
    pub detection_rules: Vec<DetectionRule>,
}

impl UserSettings {
    pub fn agent_enabled(&self, agent: AgentType) -> bool {
        self.enabled_agents.get(&agent).copied().unwrap_or(false)
    }

    pub fn set_agent_enabled(&mut self, agent: AgentType, enabled: bool) {
        self.enabled_agents.insert(agent, enabled);
    }

    pub fn enabled_rules(&self) -> impl Iterator<Item = &DetectionRule> {
        self.detection_rules.iter().filter(|rule| rule.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_evidence_reads_type_tag_and_metadata() {
        let raw = r#"{
            "id": "CASE009-flag-1",
            "type": "no_lms_activity",
            "lastLogin": "2024-01-15",
            "daysSinceLogin": 14,
            "description": "No LMS login activity for 14 days",
            "severity": "medium",
            "confidence": 0.82,
            "triggeredBy": "ApplicationAgent",
            "triggeredAt": "2024-01-29T10:20:00Z"
        }"#;

        let flag: FraudFlag = serde_json::from_str(raw).unwrap();
        assert_eq!(flag.flag_type(), FlagType::NoLmsActivity);
        match flag.evidence {
            FlagEvidence::NoLmsActivity {
                days_since_login, ..
            } => assert_eq!(days_since_login, Some(14)),
            other => panic!("unexpected evidence {other:?}"),
        }
    }

    #[test]
    fn agent_toggle_updates_existing_entry() {
        let mut settings = UserSettings {
            theme: ThemeSetting::Dark,
            notifications: NotificationSettings {
                new_flags: true,
                escalations: true,
                document_updates: true,
                email_notifications: false,
            },
            risk_threshold: 70,
            enabled_agents: BTreeMap::from([(AgentType::MemoryAgent, true)]),
            detection_rules: Vec::new(),
        };

        settings.set_agent_enabled(AgentType::MemoryAgent, false);
        assert!(!settings.agent_enabled(AgentType::MemoryAgent));
        assert_eq!(settings.enabled_agents.len(), 1);
        assert!(!settings.agent_enabled(AgentType::ExplainerAgent));
    }

    #[test]
    fn settings_read_agents_keyed_by_name() {
        let raw = r#"{
            "theme": "dark",
            "notifications": {"newFlags": true, "escalations": true, "documentUpdates": false, "emailNotifications": true},
            "riskThreshold": 70,
            "enabledAgents": {"ApplicationAgent": true, "MemoryAgent": true, "EscalationAgent": false, "ExplainerAgent": true},
            "detectionRules": []
        }"#;

        let settings: UserSettings = serde_json::from_str(raw).unwrap();
        assert!(settings.agent_enabled(AgentType::ApplicationAgent));
        assert!(!settings.agent_enabled(AgentType::EscalationAgent));
        assert_eq!(settings.enabled_agents.len(), 4);

        let encoded = serde_json::to_value(&settings).unwrap();
        assert_eq!(encoded["enabledAgents"]["EscalationAgent"], false);
    }
}
