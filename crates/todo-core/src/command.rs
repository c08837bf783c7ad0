use crate::session::Filter;

/// One user action, routed to exactly one state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { text: String },
    Toggle { id: u64 },
    Remove { id: u64 },
    BeginEdit { id: u64, text: String },
    UpdateEditDraft { text: String },
    CommitEdit,
    CancelEdit,
    ClearCompleted,
    ToggleAll,
    SetFilter(Filter),
    SetSearch(String),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Toggle { .. } => "toggle",
            Command::Remove { .. } => "remove",
            Command::BeginEdit { .. } => "begin_edit",
            Command::UpdateEditDraft { .. } => "update_edit_draft",
            Command::CommitEdit => "commit_edit",
            Command::CancelEdit => "cancel_edit",
            Command::ClearCompleted => "clear_completed",
            Command::ToggleAll => "toggle_all",
            Command::SetFilter(_) => "set_filter",
            Command::SetSearch(_) => "set_search",
        }
    }

    /// Whether this command may change the persisted task list.
    pub fn touches_tasks(&self) -> bool {
        matches!(
            self,
            Command::Add { .. }
                | Command::Toggle { .. }
                | Command::Remove { .. }
                | Command::CommitEdit
                | Command::ClearCompleted
                | Command::ToggleAll
        )
    }
}
