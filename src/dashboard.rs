use clap::ValueEnum;

use crate::models::{AgentType, CaseStatus, FraudCase, KpiData, TrendPoint};
use crate::state::{AppHandle, AppState, Command};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Reviewed,
    Escalated,
    Resolved,
    Dismissed,
}

impl StatusFilter {
    pub fn admits(&self, status: CaseStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == CaseStatus::Pending,
            StatusFilter::Reviewed => status == CaseStatus::Reviewed,
            StatusFilter::Escalated => status == CaseStatus::Escalated,
            StatusFilter::Resolved => status == CaseStatus::Resolved,
            StatusFilter::Dismissed => status == CaseStatus::Dismissed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Reviewed => "reviewed",
            StatusFilter::Escalated => "escalated",
            StatusFilter::Resolved => "resolved",
            StatusFilter::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KpiCategory {
    Total,
    Financial,
    Ghost,
    Escalated,
}

impl KpiCategory {
    pub fn preset(&self) -> (StatusFilter, &'static str) {
        match self {
            KpiCategory::Total => (StatusFilter::All, ""),
            KpiCategory::Financial => (StatusFilter::Pending, "financial_aid"),
            KpiCategory::Ghost => (StatusFilter::All, "no_lms_activity"),
            KpiCategory::Escalated => (StatusFilter::Escalated, ""),
        }
    }
}

pub fn matches_search(case: &FraudCase, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    case.student.name.to_lowercase().contains(&needle)
        || case.student.id.to_lowercase().contains(&needle)
        || case.stage.as_str().contains(&needle)
        || case
            .flags
            .iter()
            .any(|flag| flag.flag_type().as_str().contains(&needle))
}

pub fn filter_cases<'a>(
    cases: &'a [FraudCase],
    status: StatusFilter,
    query: &str,
) -> Vec<&'a FraudCase> {
    cases
        .iter()
        .filter(|case| status.admits(case.status) && matches_search(case, query))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub category: KpiCategory,
    pub title: &'static str,
    pub value: u32,
    pub trend_percent: i32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStatus {
    pub agent: AgentType,
    pub enabled: bool,
}

impl AgentStatus {
    pub fn label(&self) -> &'static str {
        if self.enabled {
            "Active"
        } else {
            "Disabled"
        }
    }
}

/// Everything the dashboard renders, captured from one read of the state.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub kpi_cards: Vec<KpiCard>,
    pub trend: Vec<TrendPoint>,
    pub cases: Vec<FraudCase>,
    pub filter_status: StatusFilter,
    pub search_query: String,
    pub agents: Vec<AgentStatus>,
    pub enabled_rules: Vec<String>,
    pub pending_count: usize,
    pub unread_badge: Option<String>,
}

pub struct DashboardViewModel {
    app: AppHandle,
    active_kpi: Option<KpiCategory>,
}

impl DashboardViewModel {
    pub fn new(app: AppHandle) -> Self {
        Self {
            app,
            active_kpi: None,
        }
    }

    pub fn active_kpi(&self) -> Option<KpiCategory> {
        self.active_kpi
    }

    /// Applies the category's filter preset; picking the active category a
    /// second time clears the filter back to defaults.
    pub fn select_kpi(&mut self, category: KpiCategory) {
        let (status, query) = if self.active_kpi == Some(category) {
            self.active_kpi = None;
            (StatusFilter::All, "")
        } else {
            self.active_kpi = Some(category);
            category.preset()
        };

        self.app.write(|state| {
            state.dispatch(Command::SetFilterStatus(status));
            state.dispatch(Command::SetSearchQuery(query.to_string()));
        });
    }

    pub fn set_filter_status(&self, status: StatusFilter) {
        self.app.dispatch(Command::SetFilterStatus(status));
    }

    pub fn set_search_query(&self, query: &str) {
        self.app.dispatch(Command::SetSearchQuery(query.to_string()));
    }

    pub fn filtered_cases(&self) -> Vec<FraudCase> {
        self.app.read(|state| {
            filter_cases(
                state.cases().get_all(),
                state.filter_status(),
                state.search_query(),
            )
            .into_iter()
            .cloned()
            .collect()
        })
    }

    pub fn kpis(&self) -> KpiData {
        self.app.read(|state| state.kpis().clone())
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.app.read(|state| DashboardSnapshot {
            kpi_cards: kpi_cards(state.kpis(), self.active_kpi),
            trend: state.kpis().trend.clone(),
            cases: filter_cases(
                state.cases().get_all(),
                state.filter_status(),
                state.search_query(),
            )
            .into_iter()
            .cloned()
            .collect(),
            filter_status: state.filter_status(),
            search_query: state.search_query().to_string(),
            agents: agent_statuses(state),
            enabled_rules: state
                .settings()
                .enabled_rules()
                .map(|rule| rule.name.clone())
                .collect(),
            pending_count: state.cases().pending_count(),
            unread_badge: state.notifications().badge_label(),
        })
    }
}

fn kpi_cards(kpis: &KpiData, active: Option<KpiCategory>) -> Vec<KpiCard> {
    // Trend percentages are fixed display values on the cards.
    [
        (KpiCategory::Total, "Total Flags", kpis.total_flags, 12),
        (KpiCategory::Financial, "Financial Aid Flags", kpis.financial_aid_flags, -5),
        (KpiCategory::Ghost, "Ghost Students", kpis.ghost_students, 8),
        (KpiCategory::Escalated, "Escalated Cases", kpis.escalated_cases, 18),
    ]
    .into_iter()
    .map(|(category, title, value, trend_percent)| KpiCard {
        category,
        title,
        value,
        trend_percent,
        active: active == Some(category),
    })
    .collect()
}

fn agent_statuses(state: &AppState) -> Vec<AgentStatus> {
    AgentType::ALL
        .iter()
        .map(|agent| AgentStatus {
            agent: *agent,
            enabled: state.settings().agent_enabled(*agent),
        })
        .collect()
}
