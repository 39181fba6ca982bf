use std::fmt::Write;

use serde::Serialize;

use crate::dashboard::DashboardSnapshot;
use crate::models::{FraudCase, NotificationToast, RiskPattern, TimelineDetail};
use crate::queue::SessionSummary;
use crate::risk;

pub fn build_report(snapshot: &DashboardSnapshot, notifications: &[NotificationToast]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Fraud Review Dashboard");
    let _ = writeln!(
        output,
        "Filter: status {} / search \"{}\" ({} pending cases)",
        snapshot.filter_status.as_str(),
        snapshot.search_query,
        snapshot.pending_count
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");

    for card in snapshot.kpi_cards.iter() {
        let marker = if card.active { " (active)" } else { "" };
        let _ = writeln!(
            output,
            "- {}: {} ({:+}%){}",
            card.title, card.value, card.trend_percent, marker
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## 7-Day Fraud Risk Trend");

    if snapshot.trend.is_empty() {
        let _ = writeln!(output, "No trend data available.");
    } else {
        let peak = snapshot.trend.iter().map(|p| p.value).max().unwrap_or(0).max(1);
        for point in snapshot.trend.iter() {
            let width = (point.value as usize * 20) / peak as usize;
            let _ = writeln!(
                output,
                "- {} {:>3} {}",
                point.date,
                point.value,
                "#".repeat(width)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent High-Risk Alerts");

    if snapshot.cases.is_empty() {
        let _ = writeln!(output, "No cases match the current filter.");
    } else {
        for case in snapshot.cases.iter() {
            let agent = primary_agent(case).unwrap_or("-");
            let _ = writeln!(
                output,
                "- {} {} ({}) {} risk {}% [{}] via {}",
                case.id,
                case.student.name,
                case.student.id,
                case.stage.label(),
                case.risk_score,
                case.status.as_str(),
                agent
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Agent Status");
    for status in snapshot.agents.iter() {
        let _ = writeln!(output, "- {}: {}", status.agent.as_str(), status.label());
    }
    if !snapshot.enabled_rules.is_empty() {
        let _ = writeln!(output, "Enabled rules: {}", snapshot.enabled_rules.join(", "));
    }

    let unread: Vec<&NotificationToast> = notifications.iter().filter(|n| !n.read).collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Unread Notifications");

    if unread.is_empty() {
        let _ = writeln!(output, "Nothing unread.");
    } else {
        for notification in unread.iter() {
            let _ = writeln!(
                output,
                "- [{}] {}: {} ({})",
                notification.kind.as_str(),
                notification.title,
                notification.message,
                notification.timestamp.format("%b %d, %H:%M")
            );
        }
    }

    output
}

pub fn render_card(case: &FraudCase) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{} - {} • {}",
        case.student.name, case.student.id, case.student.program
    );
    let echo = if case.memory_echo.is_some() {
        " • memory echo"
    } else {
        ""
    };
    let _ = writeln!(
        output,
        "{}% risk ({}){} • {} • flagged {}",
        case.risk_score,
        case.severity.as_str(),
        echo,
        case.stage.label(),
        case.flagged_at.format("%b %d, %H:%M")
    );

    for flag in case.flags.iter().take(risk::CARD_FLAG_PREVIEW) {
        let _ = writeln!(
            output,
            "  * {} [{}, {}% confidence, {}]",
            flag.description,
            flag.triggered_by.as_str(),
            risk::confidence_percent(flag.confidence),
            risk::confidence_tier(flag.confidence).as_str()
        );
    }
    let hidden = risk::hidden_flag_count(case);
    if hidden > 0 {
        let _ = writeln!(output, "  +{hidden} more flags");
    }

    match case.ai_summary.as_deref() {
        Some(summary) => {
            let _ = writeln!(output, "AI Analysis: {summary}");
        }
        None => {
            let _ = writeln!(output, "AI Analysis: not generated (type `summary`)");
        }
    }

    output
}

/// Expanded view of one case: every flag, the timeline, prior incidents and
/// outstanding document requests.
pub fn render_detail(case: &FraudCase) -> String {
    let mut output = render_card(case);

    let _ = writeln!(output, "Recommended action: {}", risk::recommended_action(case.risk_score));
    let _ = writeln!(output, "Timeline:");
    for event in case.timeline.iter() {
        let agent = event.agent.map(|agent| agent.as_str()).unwrap_or("reviewer");
        let _ = write!(
            output,
            "  {} {} ({}) {}",
            event.timestamp.format("%b %d, %H:%M"),
            timeline_kind(&event.detail),
            agent,
            event.description
        );
        if let Some(score) = event.risk_score {
            let _ = write!(output, " [risk {score}%]");
        }
        let _ = writeln!(output);
    }

    if let Some(echo) = case.memory_echo.as_ref() {
        let _ = writeln!(
            output,
            "Memory echo ({} pattern, {}% confidence):",
            risk_pattern(echo.risk_pattern),
            risk::confidence_percent(echo.confidence)
        );
        for incident in echo.previous_incidents.iter() {
            let _ = writeln!(
                output,
                "  {} {} ({}): {}",
                incident.date,
                incident.incident_type,
                incident.severity.as_str(),
                incident.description
            );
        }
    }

    for request in case.documents_requested.iter() {
        let _ = writeln!(
            output,
            "Documents requested: {} due {}",
            request.document_type.as_str(),
            request.due_date.format("%b %d")
        );
    }

    output
}

fn timeline_kind(detail: &TimelineDetail) -> &'static str {
    match detail {
        TimelineDetail::ApplicationSubmitted { .. } => "application_submitted",
        TimelineDetail::DocumentUploaded { .. } => "document_uploaded",
        TimelineDetail::FlagTriggered { .. } => "flag_triggered",
        TimelineDetail::AiAnalysis { .. } => "ai_analysis",
        TimelineDetail::HumanReview { .. } => "human_review",
        TimelineDetail::Escalation { .. } => "escalation",
        TimelineDetail::Resolution { .. } => "resolution",
    }
}

fn risk_pattern(pattern: RiskPattern) -> &'static str {
    match pattern {
        RiskPattern::RepeatOffender => "repeat offender",
        RiskPattern::Escalating => "escalating",
        RiskPattern::SimilarBehavior => "similar behavior",
    }
}

pub fn render_session(summary: &SessionSummary, exhausted: bool) -> String {
    let mut output = String::new();
    if exhausted {
        let _ = writeln!(output, "All Cases Reviewed!");
    }
    let _ = writeln!(
        output,
        "Session: {} approved, {} escalated, {} total processed",
        summary.approved, summary.escalated, summary.total
    );
    output
}

fn primary_agent(case: &FraudCase) -> Option<&'static str> {
    case.flags.first().map(|flag| flag.triggered_by.as_str())
}

#[derive(Debug, Serialize)]
struct CaseRow<'a> {
    case_id: &'a str,
    student_id: &'a str,
    student_name: &'a str,
    stage: &'static str,
    risk_score: u8,
    severity: &'static str,
    status: &'static str,
    flagged_at: String,
    flag_count: usize,
    agent: &'static str,
}

pub fn write_cases_csv<W: std::io::Write>(writer: W, cases: &[FraudCase]) -> anyhow::Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for case in cases {
        csv_writer.serialize(CaseRow {
            case_id: &case.id,
            student_id: &case.student.id,
            student_name: &case.student.name,
            stage: case.stage.as_str(),
            risk_score: case.risk_score,
            severity: case.severity.as_str(),
            status: case.status.as_str(),
            flagged_at: case.flagged_at.to_rfc3339(),
            flag_count: case.flags.len(),
            agent: primary_agent(case).unwrap_or(""),
        })?;
    }

    csv_writer.flush()?;
    Ok(cases.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardViewModel, KpiCategory};
    use crate::seed;
    use crate::state::{AppHandle, AppState};

    fn view_model() -> DashboardViewModel {
        DashboardViewModel::new(AppHandle::new(AppState::bootstrap(seed::dataset().unwrap())))
    }

    #[test]
    fn report_lists_filtered_cases_and_unread_notes() {
        let mut view = view_model();
        view.select_kpi(KpiCategory::Escalated);
        let notifications = seed::dataset().unwrap().notifications;

        let report = build_report(&view.snapshot(), &notifications);
        assert!(report.contains("# Fraud Review Dashboard"));
        assert!(report.contains("- Escalated Cases: 23 (+18%) (active)"));
        assert!(report.contains("CASE004 Emma Davis"));
        assert!(!report.contains("CASE001 Alex Johnson"));
        assert!(report.contains("Critical Fraud Alert"));
        assert!(!report.contains("Case Resolved"));
        assert!(report.contains("- ApplicationAgent: Active"));
    }

    #[test]
    fn card_shows_three_flags_and_overflow() {
        let mut case = seed::dataset().unwrap().cases.remove(0);
        let extra = case.flags[0].clone();
        case.flags.push(extra);

        let card = render_card(&case);
        assert!(card.starts_with("Alex Johnson - STU001 • Computer Science"));
        assert!(card.contains("89% confidence, high"));
        assert!(card.contains("+1 more flags"));
        assert!(card.contains("memory echo"));
    }

    #[test]
    fn detail_lists_timeline_and_history() {
        let case = seed::dataset().unwrap().cases.remove(0);
        let detail = render_detail(&case);
        assert!(detail.contains("Recommended action: Immediate escalation"));
        assert!(detail.contains("Timeline:"));
        assert!(detail.contains("application_submitted"));
        assert!(detail.contains("Memory echo ("));
    }

    #[test]
    fn finished_session_reports_all_cases_reviewed() {
        let summary = SessionSummary {
            approved: 1,
            escalated: 1,
            total: 2,
        };
        assert_eq!(
            render_session(&summary, true),
            "All Cases Reviewed!\nSession: 1 approved, 1 escalated, 2 total processed\n"
        );
        assert!(!render_session(&summary, false).contains("All Cases Reviewed!"));
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let cases = seed::dataset().unwrap().cases;
        let mut buffer = Vec::new();
        let written = write_cases_csv(&mut buffer, &cases).unwrap();
        assert_eq!(written, 4);

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("case_id,student_id,student_name,stage,risk_score,severity,status,flagged_at,flag_count,agent")
        );
        assert!(text.contains("CASE002,STU002,Sarah Williams,financial_aid,68,medium,pending"));
        assert_eq!(text.lines().count(), 5);
    }
}
