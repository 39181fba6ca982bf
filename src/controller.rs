use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SummaryError;
use crate::gesture::{classify, Action, DragOffset, KeyCode};
use crate::models::{CaseStatus, DocumentRequest, DocumentStatus, DocumentType, FraudCase};
use crate::notifications;
use crate::queue::{ReviewQueue, SessionSummary};
use crate::risk;
use crate::state::{AppHandle, Command};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Applied,
    NotFound,
    InvalidTransition,
    NoCurrentCase,
    SnappedBack,
}

impl ReviewOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewOutcome::Applied => "applied",
            ReviewOutcome::NotFound => "not_found",
            ReviewOutcome::InvalidTransition => "invalid_transition",
            ReviewOutcome::NoCurrentCase => "no_current_case",
            ReviewOutcome::SnappedBack => "snapped_back",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Approve,
    Escalate,
}

impl Verdict {
    fn status(self) -> CaseStatus {
        match self {
            Verdict::Approve => CaseStatus::Dismissed,
            Verdict::Escalate => CaseStatus::Escalated,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Verdict::Approve => "approve",
            Verdict::Escalate => "escalate",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewTimings {
    pub summary_latency: Duration,
    pub summary_deadline: Duration,
}

impl Default for ReviewTimings {
    fn default() -> Self {
        Self {
            summary_latency: Duration::from_millis(2000),
            summary_deadline: Duration::from_secs(30),
        }
    }
}

/// Fake AI summary writer. Cloneable so several generations can be in
/// flight for the same case; there is no per-case guard and the last one to
/// finish wins.
#[derive(Debug, Clone)]
pub struct SummaryGenerator {
    app: AppHandle,
    timings: ReviewTimings,
}

impl SummaryGenerator {
    pub fn new(app: AppHandle, timings: ReviewTimings) -> Self {
        Self { app, timings }
    }

    /// Captures the case before the simulated latency and writes the summary
    /// onto that snapshot afterwards, overwriting anything that changed on
    /// the case in between.
    pub async fn generate(&self, case_id: &str) -> Result<String, SummaryError> {
        let snapshot = self
            .app
            .find_case(case_id)
            .ok_or_else(|| SummaryError::NotFound(case_id.to_string()))?;

        let started = Instant::now();
        tokio::time::timeout(
            self.timings.summary_deadline,
            tokio::time::sleep(self.timings.summary_latency),
        )
        .await
        .map_err(|_| SummaryError::TimedOut {
            case_id: case_id.to_string(),
            elapsed: started.elapsed(),
        })?;

        let summary = risk::ai_summary(&snapshot);
        let updated = FraudCase {
            ai_summary: Some(summary.clone()),
            ..snapshot
        };
        self.app.dispatch(Command::UpdateCase(updated));
        info!(case_id, "ai summary written");
        Ok(summary)
    }
}

pub struct ReviewController {
    app: AppHandle,
    queue: ReviewQueue,
    summaries: SummaryGenerator,
}

impl ReviewController {
    pub fn new(app: AppHandle, timings: ReviewTimings) -> Self {
        Self {
            summaries: SummaryGenerator::new(app.clone(), timings),
            app,
            queue: ReviewQueue::new(),
        }
    }

    pub fn app(&self) -> &AppHandle {
        &self.app
    }

    pub fn approve(&mut self, case_id: &str) -> ReviewOutcome {
        self.resolve(case_id, Verdict::Approve)
    }

    pub fn escalate(&mut self, case_id: &str) -> ReviewOutcome {
        self.resolve(case_id, Verdict::Escalate)
    }

    fn resolve(&mut self, case_id: &str, verdict: Verdict) -> ReviewOutcome {
        let outcome = self.app.write(|state| {
            let Some(case) = state.cases().find_by_id(case_id).cloned() else {
                return ReviewOutcome::NotFound;
            };
            if !case.is_pending() {
                return ReviewOutcome::InvalidTransition;
            }

            let unseen_before = self.queue.unseen(state.cases()).len();
            let updated = FraudCase {
                status: verdict.status(),
                reviewed_at: Some(Utc::now()),
                ..case
            };
            state.dispatch(Command::UpdateCase(updated));
            self.queue
                .mark_processed(case_id, unseen_before, state.cases());

            let notification = match verdict {
                Verdict::Approve => notifications::case_approved(case_id),
                Verdict::Escalate => notifications::case_escalated(case_id),
            };
            state.dispatch(Command::AddNotification(notification));
            ReviewOutcome::Applied
        });

        info!(
            case_id,
            action = verdict.name(),
            outcome = outcome.as_str(),
            "review action"
        );
        outcome
    }

    pub fn expand(&mut self, case_id: &str) -> ReviewOutcome {
        let outcome = self.app.write(|state| {
            if state.cases().find_by_id(case_id).is_none() {
                return ReviewOutcome::NotFound;
            }
            state.dispatch(Command::SelectCase(Some(case_id.to_string())));
            ReviewOutcome::Applied
        });
        debug!(case_id, outcome = outcome.as_str(), "expand");
        outcome
    }

    /// Closes a pending case as legitimate outside the swipe flow: no
    /// notification, and the review queue is left alone.
    pub fn dismiss(&mut self, case_id: &str) -> ReviewOutcome {
        let outcome = self.app.write(|state| {
            let Some(case) = state.cases().find_by_id(case_id).cloned() else {
                return ReviewOutcome::NotFound;
            };
            if !case.is_pending() {
                return ReviewOutcome::InvalidTransition;
            }
            state.dispatch(Command::UpdateCase(FraudCase {
                status: CaseStatus::Dismissed,
                reviewed_at: Some(Utc::now()),
                ..case
            }));
            ReviewOutcome::Applied
        });
        info!(case_id, action = "dismiss", outcome = outcome.as_str(), "review action");
        outcome
    }

    pub fn request_documents(
        &mut self,
        case_id: &str,
        document_type: DocumentType,
        email_body: &str,
    ) -> ReviewOutcome {
        let outcome = self.app.write(|state| {
            let Some(mut case) = state.cases().find_by_id(case_id).cloned() else {
                return ReviewOutcome::NotFound;
            };

            let requested_at = Utc::now();
            case.documents_requested.push(DocumentRequest {
                id: format!("DOC-{}", Uuid::new_v4().simple()),
                document_type,
                description: format!(
                    "Additional {} verification requested",
                    document_type.as_str()
                ),
                requested_at,
                due_date: risk::document_due_date(requested_at),
                status: DocumentStatus::Sent,
                email_subject: format!("Document Verification Required - Case {case_id}"),
                email_body: email_body.to_string(),
            });
            state.dispatch(Command::UpdateCase(case));
            state.dispatch(Command::AddNotification(notifications::documents_requested(
                case_id,
            )));
            ReviewOutcome::Applied
        });
        info!(
            case_id,
            document_type = document_type.as_str(),
            outcome = outcome.as_str(),
            "documents requested"
        );
        outcome
    }

    pub fn summaries(&self) -> SummaryGenerator {
        self.summaries.clone()
    }

    pub async fn generate_ai_summary(&self, case_id: &str) -> Result<String, SummaryError> {
        self.summaries.generate(case_id).await
    }

    /// Applies a classified gesture to the card on top of the stack.
    pub fn apply(&mut self, action: Action) -> ReviewOutcome {
        let Some(case_id) = self.current_case().map(|case| case.id) else {
            return ReviewOutcome::NoCurrentCase;
        };
        match action {
            Action::Approve => self.approve(&case_id),
            Action::Escalate => self.escalate(&case_id),
            Action::Expand => self.expand(&case_id),
            Action::None => ReviewOutcome::SnappedBack,
        }
    }

    pub fn handle_drag_end(&mut self, offset: DragOffset) -> ReviewOutcome {
        self.apply(classify(offset))
    }

    pub fn handle_key(&mut self, key: KeyCode) -> ReviewOutcome {
        self.apply(key.action())
    }

    pub fn reset_session(&mut self) {
        self.queue.reset_session();
        info!("review session reset");
    }

    pub fn current_case(&self) -> Option<FraudCase> {
        self.app
            .read(|state| self.queue.current(state.cases()).cloned())
    }

    pub fn stack(&self) -> Vec<FraudCase> {
        self.app.read(|state| {
            self.queue
                .stack(state.cases())
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn unseen_ids(&self) -> Vec<String> {
        self.app.read(|state| {
            self.queue
                .unseen(state.cases())
                .into_iter()
                .map(|case| case.id.clone())
                .collect()
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.app.read(|state| self.queue.is_exhausted(state.cases()))
    }

    pub fn processed_count(&self) -> usize {
        self.queue.processed_count()
    }

    pub fn session_summary(&self) -> SessionSummary {
        self.app.read(|state| self.queue.session_summary(state.cases()))
    }

    pub fn progress_percent(&self) -> u32 {
        self.app.read(|state| self.queue.progress_percent(state.cases()))
    }

    pub fn position_label(&self) -> String {
        self.app.read(|state| self.queue.position_label(state.cases()))
    }
}
