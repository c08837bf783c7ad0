use std::rc::Rc;

use chrono::Utc;
use todo_core::{
  Command,
  TodoState,
  load_tasks,
  normalize_text,
  persist_if_changed
};
use web_sys::HtmlInputElement;
use yew::{
  Callback,
  Html,
  InputEvent,
  MouseEvent,
  Reducible,
  SubmitEvent,
  TargetCast,
  function_component,
  html,
  use_reducer,
  use_state
};

use crate::components::{
  FilterBar,
  TodoItem
};
use crate::storage::LocalStorage;

#[derive(Clone, PartialEq)]
struct TodoModel {
  state: TodoState
}

impl TodoModel {
  fn load() -> Self {
    Self {
      state: TodoState::from_tasks(
        load_tasks(&LocalStorage)
      )
    }
  }
}

impl Reducible for TodoModel {
  type Action = Command;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    tracing::debug!(
      command = action.name(),
      "reducing command"
    );
    let before = &self.state;
    let next = before
      .clone()
      .apply(action, Utc::now());

    if let Err(error) =
      persist_if_changed(
        &mut LocalStorage,
        &before.tasks,
        &next.tasks
      )
    {
      tracing::error!(
        error = %format!("{error:#}"),
        "failed saving todos to \
         local storage"
      );
    }

    Rc::new(Self { state: next })
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let model = use_reducer(
    TodoModel::load
  );
  let input = use_state(String::new);
  let view = model.state.view();

  let on_command = {
    let model = model.clone();
    Callback::from(
      move |cmd: Command| {
        model.dispatch(cmd)
      }
    )
  };

  let on_input = {
    let input = input.clone();
    Callback::from(
      move |e: InputEvent| {
        let el: HtmlInputElement =
          e.target_unchecked_into();
        input.set(el.value());
      }
    )
  };

  let on_add = {
    let input = input.clone();
    let on_command =
      on_command.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        if normalize_text(
          input.as_str()
        )
        .is_some()
        {
          on_command.emit(
            Command::Add {
              text: (*input).clone()
            }
          );
          input.set(String::new());
        }
      }
    )
  };

  let on_search = on_command.reform(
    |e: InputEvent| {
      let el: HtmlInputElement =
        e.target_unchecked_into();
      Command::SetSearch(el.value())
    }
  );
  let on_clear_search = on_command
    .reform(|_: MouseEvent| {
      Command::SetSearch(String::new())
    });
  let on_toggle_all = on_command
    .reform(|_: MouseEvent| {
      Command::ToggleAll
    });
  let on_clear_completed = on_command
    .reform(|_: MouseEvent| {
      Command::ClearCompleted
    });

  let bulk_actions =
    if view.show_bulk_actions() {
      html! {
          <div class="bulk-actions">
              <button class="toggle-all-btn" onclick={on_toggle_all}>
                  { view.toggle_all_label() }
              </button>
              {
                  if view.completed_count > 0 {
                      html! {
                          <button class="clear-completed-btn" onclick={on_clear_completed}>
                              { format!("Clear Completed ({})", view.completed_count) }
                          </button>
                      }
                  } else {
                      html! {}
                  }
              }
          </div>
      }
    } else {
      html! {}
    };

  let no_results =
    if view.no_search_results() {
      html! {
          <div class="no-results">
              <p>{ format!("No todos found matching \"{}\"", view.search) }</p>
              <button class="clear-search-btn" onclick={on_clear_search}>
                  { "Clear search" }
              </button>
          </div>
      }
    } else {
      html! {}
    };

  let list = if view.is_empty() {
    html! {
        <div class="empty-state">
            <h3>{ "No todos yet!" }</h3>
            <p>{ "Add your first todo above to get started." }</p>
        </div>
    }
  } else {
    html! {
        <div class="todo-list-container">
            { bulk_actions }
            <ul class="todo-list">
                {
                    for view.visible.iter().map(|task| {
                        let draft = if view.edit.is_editing(task.id) {
                            view.edit.draft().map(str::to_string)
                        } else {
                            None
                        };
                        html! {
                            <TodoItem
                                key={task.id.to_string()}
                                task={task.clone()}
                                {draft}
                                on_command={on_command.clone()}
                            />
                        }
                    })
                }
            </ul>
            { no_results }
        </div>
    }
  };

  html! {
      <div class="app">
          <header class="app-header">
              <h1>{ "📝 Todo App" }</h1>
              <p>{ "Stay organized and get things done!" }</p>
          </header>

          <main class="app-main">
              <form class="add-todo-form" onsubmit={on_add}>
                  <div class="input-group">
                      <input
                          type="text"
                          class="todo-input"
                          placeholder="What needs to be done?"
                          value={(*input).clone()}
                          oninput={on_input}
                      />
                      <button type="submit" class="add-button">{ "Add" }</button>
                  </div>
              </form>

              <div class="controls">
                  <div class="search-group">
                      <input
                          type="text"
                          class="search-input"
                          placeholder="Search todos..."
                          value={view.search.clone()}
                          oninput={on_search}
                      />
                  </div>
                  <FilterBar view={view.clone()} on_command={on_command.clone()} />
              </div>

              { list }
          </main>

          <footer class="app-footer">
              <div class="keyboard-shortcuts">
                  <small>
                      <strong>{ "Shortcuts:" }</strong>
                      { " Enter to add • Escape to cancel edit" }
                  </small>
              </div>
          </footer>
      </div>
  }
}
