use chrono::{DateTime, Utc};
use tracing::warn;

use crate::command::Command;
use crate::session::{EditSession, Filter};
use crate::task::{Task, normalize_text};
use crate::view::TodoView;

/// The whole in-memory model: persisted tasks plus per-session UI state.
///
/// Every transition consumes the state and returns the next one. None of them
/// fail: blank text, unknown ids and empty lists leave the state unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoState {
    pub tasks: Vec<Task>,
    pub filter: Filter,
    pub search: String,
    pub edit: EditSession,
    next_id: u64,
}

impl Default for TodoState {
    fn default() -> Self {
        Self::from_tasks(Vec::new())
    }
}

impl TodoState {
    /// Wraps a loaded task list, continuing ids after the largest one present.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let next_id = next_id(&tasks);
        Self {
            tasks,
            filter: Filter::default(),
            search: String::new(),
            edit: EditSession::Idle,
            next_id,
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn find(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn view(&self) -> TodoView {
        TodoView::derive(self)
    }

    pub fn apply(self, cmd: Command, now: DateTime<Utc>) -> Self {
        match cmd {
            Command::Add { text } => self.add(&text, now),
            Command::Toggle { id } => self.toggle(id),
            Command::Remove { id } => self.remove(id),
            Command::BeginEdit { id, text } => self.begin_edit(id, text),
            Command::UpdateEditDraft { text } => self.update_edit_draft(text),
            Command::CommitEdit => self.commit_edit(),
            Command::CancelEdit => self.cancel_edit(),
            Command::ClearCompleted => self.clear_completed(),
            Command::ToggleAll => self.toggle_all(),
            Command::SetFilter(filter) => self.set_filter(filter),
            Command::SetSearch(search) => self.set_search(search),
        }
    }

    pub fn add(mut self, raw: &str, now: DateTime<Utc>) -> Self {
        let Some(text) = normalize_text(raw) else {
            return self;
        };
        let Some(following) = self.next_id.checked_add(1) else {
            warn!(next_id = self.next_id, "task ids exhausted; not adding");
            return self;
        };
        let task = Task::new(self.next_id, text, now);
        self.next_id = following;
        self.tasks.insert(0, task);
        self
    }

    pub fn toggle(mut self, id: u64) -> Self {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.completed = !task.completed;
        }
        self
    }

    pub fn remove(mut self, id: u64) -> Self {
        self.tasks.retain(|t| t.id != id);
        if self.edit.is_editing(id) {
            self.edit = EditSession::Idle;
        }
        self
    }

    pub fn begin_edit(mut self, id: u64, current_text: String) -> Self {
        self.edit = EditSession::Editing {
            task_id: id,
            draft: current_text,
        };
        self
    }

    pub fn update_edit_draft(mut self, text: String) -> Self {
        if let EditSession::Editing { draft, .. } = &mut self.edit {
            *draft = text;
        }
        self
    }

    pub fn commit_edit(mut self) -> Self {
        let EditSession::Editing { task_id, draft } = std::mem::take(&mut self.edit) else {
            return self;
        };
        if let Some(text) = normalize_text(&draft)
            && let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id)
        {
            task.text = text;
        }
        self
    }

    pub fn cancel_edit(mut self) -> Self {
        self.edit = EditSession::Idle;
        self
    }

    pub fn clear_completed(mut self) -> Self {
        self.tasks.retain(|t| !t.completed);
        if let Some(id) = self.edit.task_id()
            && self.find(id).is_none()
        {
            self.edit = EditSession::Idle;
        }
        self
    }

    pub fn toggle_all(mut self) -> Self {
        if self.tasks.is_empty() {
            return self;
        }
        let target = !self.tasks.iter().all(|t| t.completed);
        for task in &mut self.tasks {
            task.completed = target;
        }
        self
    }

    pub fn set_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn set_search(mut self, search: String) -> Self {
        self.search = search;
        self
    }
}

fn next_id(tasks: &[Task]) -> u64 {
    tasks
        .iter()
        .map(|t| t.id)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 16, 5, 0, 0).unwrap()
    }

    fn texts(state: &TodoState) -> Vec<&str> {
        state.tasks.iter().map(|t| t.text.as_str()).collect()
    }

    fn seeded(items: &[(&str, bool)]) -> TodoState {
        let mut state = TodoState::default();
        for (idx, (text, _)) in items.iter().enumerate().rev() {
            state = state.add(text, now() + Duration::seconds(idx as i64));
        }
        for (task, (_, done)) in state.tasks.iter_mut().zip(items) {
            task.completed = *done;
        }
        state
    }

    #[test]
    fn add_prepends_trimmed_open_task() {
        for raw in ["a", "  padded  ", "Buy milk", "ünïcødé ✓"] {
            let before = seeded(&[("first", false), ("second", true)]);
            let len = before.tasks.len();
            let after = before.add(raw, now());

            assert_eq!(after.tasks.len(), len + 1);
            let first = &after.tasks[0];
            assert_eq!(first.text, raw.trim());
            assert!(!first.completed);
            assert_eq!(first.created_at, now());
        }
    }

    #[test]
    fn add_ignores_blank_text() {
        for raw in ["", "   ", "\t", "\n \r"] {
            let before = seeded(&[("keep", false)]);
            let after = before.clone().add(raw, now());
            assert_eq!(after, before, "{raw:?}");
        }
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let state = TodoState::default()
            .add("one", now())
            .add("two", now())
            .add("three", now());
        let ids: Vec<u64> = state.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(state.next_id(), 4);
    }

    #[test]
    fn add_stops_when_ids_run_out() {
        let top = Task::new(u64::MAX, "last".to_string(), now());
        let state = TodoState::from_tasks(vec![top]);
        assert_eq!(state.next_id(), u64::MAX);

        let after = state.clone().add("one more", now());
        assert_eq!(after, state);

        let near = Task::new(u64::MAX - 2, "near".to_string(), now());
        let state = TodoState::from_tasks(vec![near]).add("fits", now()).add("full", now());
        let ids: Vec<u64> = state.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![u64::MAX - 1, u64::MAX - 2]);
    }

    #[test]
    fn ids_continue_after_loaded_maximum() {
        let loaded = vec![
            Task::new(1_717_171_717_171, "legacy".to_string(), now()),
            Task::new(5, "older".to_string(), now()),
        ];
        let state = TodoState::from_tasks(loaded).add("fresh", now());
        assert_eq!(state.tasks[0].id, 1_717_171_717_172);
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let before = seeded(&[("a", false), ("b", true), ("c", false)]);
        for task in &before.tasks {
            let once = before.clone().toggle(task.id);
            let flipped = once.find(task.id).unwrap();
            assert_eq!(flipped.completed, !task.completed);

            let twice = once.toggle(task.id);
            assert_eq!(twice, before);
        }
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let before = seeded(&[("a", false)]);
        assert_eq!(before.clone().toggle(999), before);
    }

    #[test]
    fn remove_is_idempotent() {
        let before = seeded(&[("a", false), ("b", false), ("c", true)]);
        let id = before.tasks[1].id;

        let once = before.remove(id);
        assert_eq!(texts(&once), vec!["a", "c"]);
        let twice = once.clone().remove(id);
        assert_eq!(twice, once);
    }

    #[test]
    fn remove_closes_edit_on_that_task() {
        let state = seeded(&[("a", false), ("b", false)]);
        let id = state.tasks[0].id;
        let state = state.begin_edit(id, "a".to_string()).remove(id);
        assert_eq!(state.edit, EditSession::Idle);
    }

    #[test]
    fn commit_edit_trims_draft() {
        let state = seeded(&[("milk", false)]);
        let id = state.tasks[0].id;
        let state = state
            .begin_edit(id, "milk".to_string())
            .update_edit_draft("  Buy milk  ".to_string())
            .commit_edit();

        assert_eq!(state.tasks[0].text, "Buy milk");
        assert_eq!(state.edit, EditSession::Idle);
    }

    #[test]
    fn commit_edit_with_blank_draft_keeps_text() {
        for draft in ["", "   ", "\t\n"] {
            let state = seeded(&[("keep me", true)]);
            let id = state.tasks[0].id;
            let state = state
                .begin_edit(id, "keep me".to_string())
                .update_edit_draft(draft.to_string())
                .commit_edit();

            assert_eq!(state.tasks[0].text, "keep me");
            assert!(state.tasks[0].completed);
            assert_eq!(state.edit, EditSession::Idle);
        }
    }

    #[test]
    fn begin_edit_replaces_previous_session() {
        let state = seeded(&[("a", false), ("b", false)]);
        let (a, b) = (state.tasks[0].id, state.tasks[1].id);
        let state = state
            .begin_edit(a, "a".to_string())
            .begin_edit(b, "b".to_string());
        assert_eq!(
            state.edit,
            EditSession::Editing {
                task_id: b,
                draft: "b".to_string()
            }
        );
    }

    #[test]
    fn draft_updates_require_open_session() {
        let before = seeded(&[("a", false)]);
        let after = before.clone().update_edit_draft("ignored".to_string());
        assert_eq!(after, before);
        assert_eq!(before.clone().commit_edit(), before);
    }

    #[test]
    fn cancel_edit_discards_draft() {
        let before = seeded(&[("a", false)]);
        let id = before.tasks[0].id;
        let after = before
            .clone()
            .begin_edit(id, "a".to_string())
            .update_edit_draft("changed".to_string())
            .cancel_edit();
        assert_eq!(after, before);
    }

    #[test]
    fn commit_on_vanished_task_only_closes_session() {
        let before = seeded(&[("a", false)]);
        let after = before
            .clone()
            .begin_edit(42, "ghost".to_string())
            .update_edit_draft("still ghost".to_string())
            .commit_edit();
        assert_eq!(after, before);
    }

    #[test]
    fn clear_completed_preserves_remaining_order() {
        let state = seeded(&[
            ("a", false),
            ("b", true),
            ("c", false),
            ("d", true),
            ("e", false),
        ]);
        let state = state.clear_completed();
        assert_eq!(texts(&state), vec!["a", "c", "e"]);
        assert!(state.tasks.iter().all(|t| !t.completed));
    }

    #[test]
    fn toggle_all_completes_unless_everything_done() {
        let mixed = seeded(&[("a", true), ("b", false)]).toggle_all();
        assert!(mixed.tasks.iter().all(|t| t.completed));

        let none_done = seeded(&[("a", false), ("b", false)]).toggle_all();
        assert!(none_done.tasks.iter().all(|t| t.completed));

        let all_done = seeded(&[("a", true), ("b", true)]).toggle_all();
        assert!(all_done.tasks.iter().all(|t| !t.completed));

        let empty = TodoState::default();
        assert_eq!(empty.clone().toggle_all(), empty);
    }

    #[test]
    fn toggle_and_edit_keep_order() {
        let state = seeded(&[("a", false), ("b", false), ("c", false)]);
        let id = state.tasks[1].id;
        let state = state
            .toggle(id)
            .begin_edit(id, "b".to_string())
            .update_edit_draft("B".to_string())
            .commit_edit();
        assert_eq!(texts(&state), vec!["a", "B", "c"]);
    }

    #[test]
    fn apply_routes_commands() {
        let state = TodoState::default()
            .apply(
                Command::Add {
                    text: "Write spec".to_string(),
                },
                now(),
            )
            .apply(Command::SetFilter(Filter::Completed), now())
            .apply(Command::SetSearch("SPEC".to_string()), now());

        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.filter, Filter::Completed);
        assert_eq!(state.search, "SPEC");
    }
}
