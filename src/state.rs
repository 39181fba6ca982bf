use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::dashboard::StatusFilter;
use crate::models::{AgentType, FraudCase, KpiData, NotificationToast, ThemeSetting, UserSettings};
use crate::notifications::NotificationFeed;
use crate::seed::Dataset;
use crate::store::{CaseStore, UpdateOutcome};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub theme: Option<ThemeSetting>,
    pub risk_threshold: Option<u8>,
    pub agents: Vec<(AgentType, bool)>,
}

#[derive(Debug, Clone)]
pub enum Command {
    SetLoading(bool),
    SetCases(Vec<FraudCase>),
    SelectCase(Option<String>),
    UpdateCase(FraudCase),
    AddNotification(NotificationToast),
    MarkNotificationRead(String),
    UpdateSettings(SettingsPatch),
    SetFilterStatus(StatusFilter),
    SetSearchQuery(String),
    UpdateKpiData(KpiData),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::SetLoading(_) => "set_loading",
            Command::SetCases(_) => "set_cases",
            Command::SelectCase(_) => "select_case",
            Command::UpdateCase(_) => "update_case",
            Command::AddNotification(_) => "add_notification",
            Command::MarkNotificationRead(_) => "mark_notification_read",
            Command::UpdateSettings(_) => "update_settings",
            Command::SetFilterStatus(_) => "set_filter_status",
            Command::SetSearchQuery(_) => "set_search_query",
            Command::UpdateKpiData(_) => "update_kpi_data",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    cases: CaseStore,
    notifications: NotificationFeed,
    settings: UserSettings,
    kpis: KpiData,
    is_loading: bool,
    selected_case: Option<String>,
    filter_status: StatusFilter,
    search_query: String,
}

impl AppState {
    pub fn new(settings: UserSettings, kpis: KpiData) -> Self {
        Self {
            cases: CaseStore::default(),
            notifications: NotificationFeed::default(),
            settings,
            kpis,
            is_loading: false,
            selected_case: None,
            filter_status: StatusFilter::All,
            search_query: String::new(),
        }
    }

    /// Builds the initial state the way the dashboard boots: cases are
    /// installed under the loading flag, then the first two seed
    /// notifications land in the feed.
    pub fn bootstrap(dataset: Dataset) -> Self {
        let Dataset {
            cases,
            notifications,
            settings,
            kpis,
        } = dataset;

        let mut state = Self::new(settings, kpis);
        state.dispatch(Command::SetLoading(true));
        state.dispatch(Command::SetCases(cases));
        for notification in notifications.into_iter().take(2) {
            state.dispatch(Command::AddNotification(notification));
        }
        state.dispatch(Command::SetLoading(false));
        state
    }

    /// Single mutation entry point. Returns whether the state changed.
    pub fn dispatch(&mut self, command: Command) -> bool {
        debug!(command = command.name(), "dispatch");
        match command {
            Command::SetLoading(loading) => {
                self.is_loading = loading;
                true
            }
            Command::SetCases(cases) => {
                self.cases.replace_all(cases);
                true
            }
            Command::SelectCase(case_id) => {
                self.selected_case = case_id;
                true
            }
            Command::UpdateCase(case) => self.cases.update(case) == UpdateOutcome::Replaced,
            Command::AddNotification(notification) => {
                self.notifications.push(notification);
                true
            }
            Command::MarkNotificationRead(id) => self.notifications.mark_read(&id),
            Command::UpdateSettings(patch) => {
                if let Some(theme) = patch.theme {
                    self.settings.theme = theme;
                }
                if let Some(threshold) = patch.risk_threshold {
                    self.settings.risk_threshold = threshold;
                }
                for (agent, enabled) in patch.agents {
                    self.settings.set_agent_enabled(agent, enabled);
                }
                true
            }
            Command::SetFilterStatus(status) => {
                self.filter_status = status;
                true
            }
            Command::SetSearchQuery(query) => {
                self.search_query = query;
                true
            }
            Command::UpdateKpiData(kpis) => {
                self.kpis = kpis;
                true
            }
        }
    }

    pub fn cases(&self) -> &CaseStore {
        &self.cases
    }

    pub fn notifications(&self) -> &NotificationFeed {
        &self.notifications
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn kpis(&self) -> &KpiData {
        &self.kpis
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn filter_status(&self) -> StatusFilter {
        self.filter_status
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Resolved against the store on every read, so it reflects the latest
    /// update of that case.
    pub fn selected_case(&self) -> Option<&FraudCase> {
        self.selected_case
            .as_deref()
            .and_then(|id| self.cases.find_by_id(id))
    }

    /// Marks the notification read and selects its linked case, if that case
    /// still exists.
    pub fn open_notification(&mut self, id: &str) -> Option<FraudCase> {
        let case_id = self.notifications.find(id)?.case_id.clone();
        self.dispatch(Command::MarkNotificationRead(id.to_string()));

        let case = case_id.and_then(|case_id| self.cases.find_by_id(&case_id).cloned())?;
        self.dispatch(Command::SelectCase(Some(case.id.clone())));
        Some(case)
    }
}

/// Shared handle every component is constructed from. The lock is only held
/// for synchronous reads and dispatches, never across an await point.
#[derive(Debug, Clone)]
pub struct AppHandle {
    inner: Arc<Mutex<AppState>>,
}

impl AppHandle {
    pub fn new(state: AppState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        // Mutations are whole-value replacements, so a poisoned lock still
        // guards a consistent state.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn read<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        f(&self.lock())
    }

    pub fn write<T>(&self, f: impl FnOnce(&mut AppState) -> T) -> T {
        f(&mut self.lock())
    }

    pub fn dispatch(&self, command: Command) -> bool {
        self.lock().dispatch(command)
    }

    pub fn find_case(&self, id: &str) -> Option<FraudCase> {
        self.read(|state| state.cases().find_by_id(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications;
    use crate::seed;

    #[test]
    fn bootstrap_loads_cases_and_first_two_notifications() {
        let state = AppState::bootstrap(seed::dataset().unwrap());

        assert!(!state.is_loading());
        assert_eq!(state.cases().len(), 4);
        assert_eq!(state.notifications().len(), 2);
        assert_eq!(state.notifications().all()[0].id, "NOT002");
        assert_eq!(state.notifications().all()[1].id, "NOT001");
    }

    #[test]
    fn selected_case_follows_updates() {
        let mut state = AppState::bootstrap(seed::dataset().unwrap());
        state.dispatch(Command::SelectCase(Some("CASE002".to_string())));

        let mut case = state.cases().find_by_id("CASE002").cloned().unwrap();
        case.ai_summary = Some("refreshed".to_string());
        assert!(state.dispatch(Command::UpdateCase(case)));

        assert_eq!(
            state.selected_case().and_then(|c| c.ai_summary.as_deref()),
            Some("refreshed")
        );
    }

    #[test]
    fn update_for_unknown_case_reports_no_change() {
        let mut state = AppState::bootstrap(seed::dataset().unwrap());
        let mut case = state.cases().get_all()[0].clone();
        case.id = "CASE999".to_string();
        assert!(!state.dispatch(Command::UpdateCase(case)));
    }

    #[test]
    fn opening_notification_marks_read_and_selects_case() {
        let mut state = AppState::bootstrap(seed::dataset().unwrap());
        let toast = notifications::documents_requested("CASE002");
        let id = toast.id.clone();
        state.dispatch(Command::AddNotification(toast));

        let opened = state.open_notification(&id);
        assert_eq!(opened.map(|c| c.id), Some("CASE002".to_string()));
        assert!(state.notifications().find(&id).unwrap().read);
        assert_eq!(state.selected_case().map(|c| c.id.as_str()), Some("CASE002"));
    }

    #[test]
    fn settings_patch_toggles_agents() {
        let mut state = AppState::bootstrap(seed::dataset().unwrap());
        state.dispatch(Command::UpdateSettings(SettingsPatch {
            agents: vec![(AgentType::ExplainerAgent, false)],
            risk_threshold: Some(80),
            ..SettingsPatch::default()
        }));

        assert!(!state.settings().agent_enabled(AgentType::ExplainerAgent));
        assert!(state.settings().agent_enabled(AgentType::MemoryAgent));
        assert_eq!(state.settings().risk_threshold, 80);
    }
}
