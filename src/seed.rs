use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DatasetError;
use crate::models::{FraudCase, KpiData, NotificationToast, UserSettings};

const BUILT_IN: &str = include_str!("../data/seed.json");

/// Everything the review desk needs at startup. The upstream provider is
/// trusted to hand over well-formed records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub cases: Vec<FraudCase>,
    #[serde(default)]
    pub notifications: Vec<NotificationToast>,
    pub settings: UserSettings,
    pub kpis: KpiData,
}

pub fn dataset() -> Result<Dataset, DatasetError> {
    serde_json::from_str(BUILT_IN).map_err(|source| DatasetError::Json {
        path: "<built-in>".into(),
        source,
    })
}

pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset: Dataset = serde_json::from_str(&raw).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        cases = dataset.cases.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseStatus, FlagType, Stage};

    #[test]
    fn built_in_dataset_matches_expected_shape() {
        let dataset = dataset().unwrap();
        let ids: Vec<&str> = dataset.cases.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["CASE001", "CASE002", "CASE003", "CASE004"]);

        let first = &dataset.cases[0];
        assert_eq!(first.status, CaseStatus::Pending);
        assert_eq!(first.flags.len(), 3);
        assert_eq!(first.flags[1].flag_type(), FlagType::EssaySimilarity);
        assert_eq!(first.timeline.len(), 5);
        assert_eq!(first.memory_echo.as_ref().map(|m| m.previous_incidents.len()), Some(2));

        assert_eq!(dataset.cases[1].stage, Stage::FinancialAid);
        assert!(dataset.cases[2].reviewed_at.is_some());
        assert_eq!(dataset.notifications.len(), 4);
        assert_eq!(dataset.kpis.total_flags, 127);
        assert_eq!(dataset.settings.detection_rules.len(), 4);
    }

    #[test]
    fn load_dataset_round_trips_through_a_file() {
        let path = std::env::temp_dir().join(format!("fraud-review-{}.json", uuid::Uuid::new_v4()));
        let original = dataset().unwrap();
        std::fs::write(&path, serde_json::to_string(&original).unwrap()).unwrap();

        let loaded = load_dataset(&path).unwrap();
        assert_eq!(loaded.cases, original.cases);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_dataset_reports_missing_file() {
        let path = std::env::temp_dir().join("fraud-review-does-not-exist.json");
        assert!(matches!(load_dataset(&path), Err(DatasetError::Io { .. })));
    }
}
