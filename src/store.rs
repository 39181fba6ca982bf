use crate::models::{CaseStatus, FraudCase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Replaced,
    Missing,
}

/// Authoritative, insertion-ordered collection of fraud cases. Every view
/// reads through it on demand, so there is nothing to invalidate.
#[derive(Debug, Clone, Default)]
pub struct CaseStore {
    cases: Vec<FraudCase>,
}

impl CaseStore {
    pub fn new(cases: Vec<FraudCase>) -> Self {
        Self { cases }
    }

    pub fn get_all(&self) -> &[FraudCase] {
        &self.cases
    }

    pub fn find_by_id(&self, id: &str) -> Option<&FraudCase> {
        self.cases.iter().find(|case| case.id == id)
    }

    pub fn update(&mut self, case: FraudCase) -> UpdateOutcome {
        match self.cases.iter_mut().find(|existing| existing.id == case.id) {
            Some(slot) => {
                *slot = case;
                UpdateOutcome::Replaced
            }
            None => UpdateOutcome::Missing,
        }
    }

    pub fn replace_all(&mut self, cases: Vec<FraudCase>) {
        self.cases = cases;
    }

    pub fn with_status(&self, status: CaseStatus) -> impl Iterator<Item = &FraudCase> {
        self.cases.iter().filter(move |case| case.status == status)
    }

    pub fn pending_count(&self) -> usize {
        self.with_status(CaseStatus::Pending).count()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
