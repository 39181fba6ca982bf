use std::collections::HashSet;

use crate::models::{CaseStatus, FraudCase};
use crate::store::CaseStore;

pub const STACK_DEPTH: usize = 3;

/// Outcome tally for the cases processed this session, read back from the
/// store so later status changes are reflected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub approved: usize,
    pub escalated: usize,
    pub total: usize,
}

/// Session-local review queue over the case store. A case is unseen while it
/// is pending and has not been swiped this session.
#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    processed: HashSet<String>,
    current_index: usize,
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unseen<'a>(&self, store: &'a CaseStore) -> Vec<&'a FraudCase> {
        store
            .get_all()
            .iter()
            .filter(|case| case.is_pending() && !self.processed.contains(&case.id))
            .collect()
    }

    pub fn current<'a>(&self, store: &'a CaseStore) -> Option<&'a FraudCase> {
        let unseen = self.unseen(store);
        unseen.get(self.cursor(unseen.len())).copied()
    }

    /// The current card followed by the ones stacked behind it.
    pub fn stack<'a>(&self, store: &'a CaseStore) -> Vec<&'a FraudCase> {
        let unseen = self.unseen(store);
        let cursor = self.cursor(unseen.len());
        unseen
            .into_iter()
            .skip(cursor)
            .take(STACK_DEPTH)
            .collect()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    // Cases can leave the unseen sequence outside the swipe flow (a dismiss,
    // an update from elsewhere), so the stored index is read modulo that.
    fn cursor(&self, unseen_len: usize) -> usize {
        if self.current_index < unseen_len {
            self.current_index
        } else {
            0
        }
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn is_exhausted(&self, store: &CaseStore) -> bool {
        self.unseen(store).is_empty()
    }

    /// Marks a case processed and moves the cursor. `unseen_before` is the
    /// length of the unseen sequence as it was when the case was acted on.
    pub fn mark_processed(&mut self, case_id: &str, unseen_before: usize, store: &CaseStore) {
        self.processed.insert(case_id.to_string());

        self.current_index = if self.current_index + 1 < unseen_before {
            self.current_index + 1
        } else {
            0
        };

        // The processed case has left the sequence, which can strand the
        // cursor past its end.
        if self.current_index >= self.unseen(store).len() {
            self.current_index = 0;
        }
    }

    pub fn session_summary(&self, store: &CaseStore) -> SessionSummary {
        let mut summary = SessionSummary {
            total: self.processed.len(),
            ..SessionSummary::default()
        };
        for case_id in self.processed.iter() {
            match store.find_by_id(case_id).map(|case| case.status) {
                Some(CaseStatus::Dismissed) => summary.approved += 1,
                Some(CaseStatus::Escalated) => summary.escalated += 1,
                _ => {}
            }
        }
        summary
    }

    pub fn reset_session(&mut self) {
        self.processed.clear();
        self.current_index = 0;
    }

    /// Percentage of the session's work that is behind the cursor.
    pub fn progress_percent(&self, store: &CaseStore) -> u32 {
        let remaining = self.unseen(store).len();
        let total = remaining + self.processed.len();
        if total == 0 {
            return 100;
        }
        let done = self.cursor(remaining) + self.processed.len();
        ((done as f64 / total as f64) * 100.0).round() as u32
    }

    pub fn position_label(&self, store: &CaseStore) -> String {
        let remaining = self.unseen(store).len();
        format!(
            "{remaining} pending cases • Case {} of {remaining}",
            self.cursor(remaining) + 1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn pending_store(count: usize) -> CaseStore {
        let template = seed::dataset().unwrap().cases.remove(0);
        let cases = (0..count)
            .map(|index| {
                let mut case = template.clone();
                case.id = format!("CASE{index:03}");
                case.status = CaseStatus::Pending;
                case
            })
            .collect();
        CaseStore::new(cases)
    }

    fn ids(cases: &[&FraudCase]) -> Vec<String> {
        cases.iter().map(|case| case.id.clone()).collect()
    }

    #[test]
    fn unseen_keeps_store_order_and_skips_non_pending() {
        let store = CaseStore::new(seed::dataset().unwrap().cases);
        let queue = ReviewQueue::new();
        assert_eq!(ids(&queue.unseen(&store)), vec!["CASE001", "CASE002"]);
        assert_eq!(queue.current(&store).map(|c| c.id.as_str()), Some("CASE001"));
    }

    #[test]
    fn processing_shrinks_unseen_without_reordering() {
        let store = pending_store(5);
        let mut queue = ReviewQueue::new();
        let mut previous = ids(&queue.unseen(&store));

        while let Some(case) = queue.current(&store).cloned() {
            let before = queue.unseen(&store).len();
            queue.mark_processed(&case.id, before, &store);
            let now = ids(&queue.unseen(&store));

            assert_eq!(now.len(), previous.len() - 1);
            let expected: Vec<String> = previous.iter().filter(|id| **id != case.id).cloned().collect();
            assert_eq!(now, expected);
            previous = now;
        }
        assert!(queue.is_exhausted(&store));
        assert_eq!(queue.processed_count(), 5);
    }

    #[test]
    fn cursor_wraps_after_last_index() {
        let store = pending_store(3);
        let mut queue = ReviewQueue::new();
        queue.mark_processed("CASE000", 3, &store);
        assert_eq!(queue.current_index(), 1);
        assert_eq!(queue.current(&store).map(|c| c.id.as_str()), Some("CASE002"));

        queue.mark_processed("CASE002", 2, &store);
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.current(&store).map(|c| c.id.as_str()), Some("CASE001"));
    }

    #[test]
    fn cursor_never_points_past_the_sequence() {
        let store = pending_store(2);
        let mut queue = ReviewQueue::new();
        queue.mark_processed("CASE000", 2, &store);
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.current(&store).map(|c| c.id.as_str()), Some("CASE001"));
    }

    #[test]
    fn case_leaving_outside_the_queue_does_not_hide_the_rest() {
        let mut store = pending_store(2);
        let mut queue = ReviewQueue::new();
        queue.mark_processed("CASE000", 2, &store);
        assert_eq!(queue.current(&store).map(|c| c.id.as_str()), Some("CASE001"));

        let mut store2 = pending_store(3);
        let mut queue2 = ReviewQueue::new();
        queue2.mark_processed("CASE000", 3, &store2);
        assert_eq!(queue2.current_index(), 1);

        let mut dismissed = store2.find_by_id("CASE002").cloned().unwrap();
        dismissed.status = CaseStatus::Dismissed;
        store2.update(dismissed);
        assert_eq!(queue2.current(&store2).map(|c| c.id.as_str()), Some("CASE001"));
        assert_eq!(queue2.position_label(&store2), "1 pending cases • Case 1 of 1");

        let mut gone = store.find_by_id("CASE001").cloned().unwrap();
        gone.status = CaseStatus::Escalated;
        store.update(gone);
        assert!(queue.current(&store).is_none());
        assert!(queue.is_exhausted(&store));
    }

    #[test]
    fn reset_restores_every_still_pending_case() {
        let mut store = pending_store(3);
        let mut queue = ReviewQueue::new();
        while let Some(case) = queue.current(&store).cloned() {
            let before = queue.unseen(&store).len();
            queue.mark_processed(&case.id, before, &store);
        }

        let mut dismissed = store.find_by_id("CASE001").cloned().unwrap();
        dismissed.status = CaseStatus::Dismissed;
        store.update(dismissed);

        queue.reset_session();
        assert_eq!(ids(&queue.unseen(&store)), vec!["CASE000", "CASE002"]);
        assert_eq!(queue.current_index(), 0);
    }

    #[test]
    fn session_summary_counts_current_store_status() {
        let mut store = pending_store(3);
        let mut queue = ReviewQueue::new();
        assert_eq!(queue.session_summary(&store), SessionSummary::default());

        for (case_id, status) in [
            ("CASE000", CaseStatus::Dismissed),
            ("CASE001", CaseStatus::Escalated),
            ("CASE002", CaseStatus::Escalated),
        ] {
            let mut case = store.find_by_id(case_id).cloned().unwrap();
            case.status = status;
            let before = queue.unseen(&store).len();
            store.update(case);
            queue.mark_processed(case_id, before, &store);
        }

        assert_eq!(
            queue.session_summary(&store),
            SessionSummary {
                approved: 1,
                escalated: 2,
                total: 3,
            }
        );
    }

    #[test]
    fn progress_and_stack_reflect_cursor() {
        let store = pending_store(4);
        let mut queue = ReviewQueue::new();
        assert_eq!(queue.progress_percent(&store), 0);
        assert_eq!(queue.stack(&store).len(), STACK_DEPTH);

        queue.mark_processed("CASE000", 4, &store);
        assert_eq!(queue.progress_percent(&store), 50);
        assert_eq!(queue.position_label(&store), "3 pending cases • Case 2 of 3");
        assert_eq!(ids(&queue.stack(&store)), vec!["CASE002", "CASE003"]);
    }
}
