pub mod command;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod task;
pub mod view;

pub use command::Command;
pub use session::{EditSession, Filter};
pub use state::TodoState;
pub use storage::{MemoryStorage, Storage, TODOS_KEY, load_tasks, save_tasks};
pub use store::{TodoStore, persist_if_changed};
pub use task::{Task, normalize_text};
pub use view::TodoView;
