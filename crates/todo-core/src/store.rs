use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::command::Command;
use crate::session::Filter;
use crate::state::TodoState;
use crate::storage::{Storage, load_tasks, save_tasks};
use crate::task::Task;
use crate::view::TodoView;

type Observer = Box<dyn FnMut(&TodoView)>;

/// Owns the task list, writes it through to storage after every change and
/// notifies observers with a freshly derived view.
pub struct TodoStore<S: Storage> {
    state: TodoState,
    storage: S,
    observers: Vec<Observer>,
}

impl<S: Storage> TodoStore<S> {
    #[tracing::instrument(skip(storage))]
    pub fn open(storage: S) -> Self {
        let state = TodoState::from_tasks(load_tasks(&storage));
        info!(
            count = state.tasks.len(),
            next_id = state.next_id(),
            "opened todo store"
        );
        Self {
            state,
            storage,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> &TodoState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn view(&self) -> TodoView {
        self.state.view()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&TodoView) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn dispatch(&mut self, cmd: Command) -> anyhow::Result<()> {
        self.dispatch_at(cmd, Utc::now())
    }

    /// Applies `cmd`, persists the list if it changed, then notifies.
    ///
    /// A failed write is reported only after the new state is in place and
    /// observers have seen it, so nothing held in memory is lost.
    #[tracing::instrument(skip(self, cmd, now), fields(command = cmd.name()))]
    pub fn dispatch_at(&mut self, cmd: Command, now: DateTime<Utc>) -> anyhow::Result<()> {
        debug!(?cmd, "dispatching command");
        let touches_tasks = cmd.touches_tasks();
        let before = touches_tasks.then(|| self.state.tasks.clone());

        let state = std::mem::take(&mut self.state);
        self.state = state.apply(cmd, now);

        let saved = match before {
            Some(before) if before != self.state.tasks => {
                persist_tasks(&mut self.storage, &self.state.tasks)
            }
            _ => Ok(()),
        };

        let view = self.state.view();
        for observer in &mut self.observers {
            observer(&view);
        }

        saved
    }

    pub fn add(&mut self, text: &str) -> anyhow::Result<()> {
        self.dispatch(Command::Add {
            text: text.to_string(),
        })
    }

    pub fn toggle(&mut self, id: u64) -> anyhow::Result<()> {
        self.dispatch(Command::Toggle { id })
    }

    pub fn remove(&mut self, id: u64) -> anyhow::Result<()> {
        self.dispatch(Command::Remove { id })
    }

    pub fn begin_edit(&mut self, id: u64, current_text: &str) -> anyhow::Result<()> {
        self.dispatch(Command::BeginEdit {
            id,
            text: current_text.to_string(),
        })
    }

    pub fn update_edit_draft(&mut self, text: &str) -> anyhow::Result<()> {
        self.dispatch(Command::UpdateEditDraft {
            text: text.to_string(),
        })
    }

    pub fn commit_edit(&mut self) -> anyhow::Result<()> {
        self.dispatch(Command::CommitEdit)
    }

    pub fn cancel_edit(&mut self) -> anyhow::Result<()> {
        self.dispatch(Command::CancelEdit)
    }

    pub fn clear_completed(&mut self) -> anyhow::Result<()> {
        self.dispatch(Command::ClearCompleted)
    }

    pub fn toggle_all(&mut self) -> anyhow::Result<()> {
        self.dispatch(Command::ToggleAll)
    }

    pub fn set_filter(&mut self, filter: Filter) -> anyhow::Result<()> {
        self.dispatch(Command::SetFilter(filter))
    }

    pub fn set_search(&mut self, search: &str) -> anyhow::Result<()> {
        self.dispatch(Command::SetSearch(search.to_string()))
    }
}

/// Writes `tasks` if they differ from `before`. Returns whether a write happened.
///
/// Front-ends that drive [`TodoState`] themselves (e.g. a reducer hook) use
/// this to keep the same write-through rule as [`TodoStore`].
pub fn persist_if_changed<S: Storage + ?Sized>(
    storage: &mut S,
    before: &[Task],
    after: &[Task],
) -> anyhow::Result<bool> {
    if before == after {
        return Ok(false);
    }
    persist_tasks(storage, after)?;
    Ok(true)
}

fn persist_tasks<S: Storage + ?Sized>(storage: &mut S, tasks: &[Task]) -> anyhow::Result<()> {
    save_tasks(storage, tasks).context("failed to persist todo list")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::anyhow;

    use super::*;
    use crate::storage::{MemoryStorage, TODOS_KEY};

    #[derive(Default)]
    struct CountingStorage {
        inner: MemoryStorage,
        writes: usize,
        fail_writes: bool,
    }

    impl Storage for CountingStorage {
        fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
            if self.fail_writes {
                return Err(anyhow!("quota exceeded"));
            }
            self.writes += 1;
            self.inner.set_item(key, value)
        }
    }

    fn texts<S: Storage>(store: &TodoStore<S>) -> Vec<String> {
        store.tasks().iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn end_to_end_scenario() {
        let mut store = TodoStore::open(MemoryStorage::new());
        store.add("Write spec").unwrap();
        store.add("Review spec").unwrap();
        assert_eq!(texts(&store), vec!["Review spec", "Write spec"]);

        let write_id = store.tasks()[1].id;
        store.toggle(write_id).unwrap();
        let view = store.view();
        assert_eq!(view.active_count, 1);
        assert_eq!(view.completed_count, 1);

        store.clear_completed().unwrap();
        assert_eq!(texts(&store), vec!["Review spec"]);

        let reopened = TodoStore::open(store.into_storage());
        assert_eq!(texts(&reopened), vec!["Review spec"]);
    }

    #[test]
    fn writes_only_when_tasks_change() {
        let mut store = TodoStore::open(CountingStorage::default());
        store.add("   ").unwrap();
        store.set_filter(Filter::Active).unwrap();
        store.set_search("x").unwrap();
        store.toggle(99).unwrap();
        assert_eq!(store.storage().writes, 0);

        store.add("real").unwrap();
        assert_eq!(store.storage().writes, 1);

        let id = store.tasks()[0].id;
        store.begin_edit(id, "real").unwrap();
        store.update_edit_draft("renamed").unwrap();
        assert_eq!(store.storage().writes, 1);
        store.commit_edit().unwrap();
        assert_eq!(store.storage().writes, 2);
    }

    #[test]
    fn observers_see_every_dispatch() {
        let seen: Rc<RefCell<Vec<usize>>> = Rc::default();
        let mut store = TodoStore::open(MemoryStorage::new());
        let sink = Rc::clone(&seen);
        store.subscribe(move |view| sink.borrow_mut().push(view.visible.len()));

        store.add("a").unwrap();
        store.add("b").unwrap();
        store.set_filter(Filter::Completed).unwrap();
        store.toggle_all().unwrap();

        assert_eq!(*seen.borrow(), vec![1, 2, 0, 2]);
    }

    #[test]
    fn failed_write_keeps_state() {
        let storage = CountingStorage {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = TodoStore::open(storage);
        let notified = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&notified);
        store.subscribe(move |_| *sink.borrow_mut() += 1);

        let err = store.add("survives").unwrap_err();
        assert!(format!("{err:#}").contains("quota exceeded"));
        assert_eq!(texts(&store), vec!["survives"]);
        assert_eq!(*notified.borrow(), 1);
    }

    #[test]
    fn open_recovers_from_corrupt_storage() {
        let mut storage = MemoryStorage::new();
        storage.set_item(TODOS_KEY, "{{{").unwrap();
        let mut store = TodoStore::open(storage);
        assert!(store.tasks().is_empty());

        store.add("fresh start").unwrap();
        assert_eq!(store.tasks()[0].id, 1);
    }

    #[test]
    fn persist_if_changed_skips_identical_lists() {
        let mut storage = CountingStorage::default();
        let state = TodoState::default().add("a", Utc::now());
        assert!(!persist_if_changed(&mut storage, &state.tasks, &state.tasks).unwrap());
        assert!(persist_if_changed(&mut storage, &[], &state.tasks).unwrap());
        assert_eq!(storage.writes, 1);
    }
}
