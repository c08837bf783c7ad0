use crate::session::{EditSession, Filter};
use crate::state::TodoState;
use crate::task::Task;

/// Everything a renderer needs, derived from [`TodoState`] and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoView {
    pub visible: Vec<Task>,
    pub total: usize,
    pub active_count: usize,
    pub completed_count: usize,
    pub all_completed: bool,
    pub filter: Filter,
    pub search: String,
    pub edit: EditSession,
}

impl TodoView {
    pub fn derive(state: &TodoState) -> Self {
        let completed_count = state.tasks.iter().filter(|t| t.completed).count();
        let total = state.tasks.len();

        Self {
            visible: visible_tasks(&state.tasks, state.filter, &state.search),
            total,
            active_count: total - completed_count,
            completed_count,
            all_completed: total > 0 && completed_count == total,
            filter: state.filter,
            search: state.search.clone(),
            edit: state.edit.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn count_for(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.total,
            Filter::Active => self.active_count,
            Filter::Completed => self.completed_count,
        }
    }

    /// Bulk actions only make sense once there is more than one task.
    pub fn show_bulk_actions(&self) -> bool {
        self.total > 1
    }

    pub fn toggle_all_label(&self) -> &'static str {
        if self.all_completed {
            "Uncheck All"
        } else {
            "Check All"
        }
    }

    pub fn no_search_results(&self) -> bool {
        self.total > 0 && self.visible.is_empty() && !self.search.is_empty()
    }
}

pub fn visible_tasks(tasks: &[Task], filter: Filter, search: &str) -> Vec<Task> {
    let needle = search.to_lowercase();
    tasks
        .iter()
        .filter(|task| filter.matches(task) && task.matches_search(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn two_tasks() -> TodoState {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let mut state = TodoState::default()
            .add("Buy eggs", now)
            .add("Buy milk", now);
        state.tasks[1].completed = true;
        state
    }

    fn visible_texts(view: &TodoView) -> Vec<&str> {
        view.visible.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn filter_and_search_compose() {
        let state = two_tasks()
            .set_filter(Filter::Active)
            .set_search("milk".to_string());
        assert_eq!(visible_texts(&state.view()), vec!["Buy milk"]);

        let state = state.set_filter(Filter::Completed);
        assert!(state.view().visible.is_empty());
        assert!(state.view().no_search_results());
    }

    #[test]
    fn search_ignores_case() {
        let state = two_tasks().set_search("BUY".to_string());
        assert_eq!(visible_texts(&state.view()), vec!["Buy milk", "Buy eggs"]);

        let state = state.set_search("EgGs".to_string());
        assert_eq!(visible_texts(&state.view()), vec!["Buy eggs"]);
    }

    #[test]
    fn counts_and_labels() {
        let view = two_tasks().view();
        assert_eq!(view.total, 2);
        assert_eq!(view.active_count, 1);
        assert_eq!(view.completed_count, 1);
        assert_eq!(view.count_for(Filter::Completed), 1);
        assert!(!view.all_completed);
        assert!(view.show_bulk_actions());
        assert_eq!(view.toggle_all_label(), "Check All");

        let view = two_tasks().toggle_all().view();
        assert!(view.all_completed);
        assert_eq!(view.toggle_all_label(), "Uncheck All");
    }

    #[test]
    fn empty_list_is_not_all_completed() {
        let view = TodoState::default().view();
        assert!(view.is_empty());
        assert!(!view.all_completed);
        assert!(!view.show_bulk_actions());
        assert!(!view.no_search_results());
    }
}
