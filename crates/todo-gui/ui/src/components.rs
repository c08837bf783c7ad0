use chrono::Local;
use todo_core::{Command, Filter, Task, TodoView};
use web_sys::HtmlInputElement;
use yew::{
    Callback, Event, FocusEvent, Html, InputEvent, KeyboardEvent, MouseEvent, Properties,
    SubmitEvent, TargetCast, classes, function_component, html, use_effect_with, use_node_ref,
};

#[derive(Properties, PartialEq)]
pub struct FilterBarProps {
    pub view: TodoView,
    pub on_command: Callback<Command>,
}

#[function_component(FilterBar)]
pub fn filter_bar(props: &FilterBarProps) -> Html {
    html! {
        <div class="filter-group">
            {
                for Filter::ALL.iter().copied().map(|filter| {
                    let class = classes!("filter-btn", (props.view.filter == filter).then_some("active"));
                    let onclick = props.on_command.reform(move |_: MouseEvent| Command::SetFilter(filter));
                    html! {
                        <button {class} {onclick}>
                            { format!("{} ({})", filter.label(), props.view.count_for(filter)) }
                        </button>
                    }
                })
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TodoItemProps {
    pub task: Task,
    /// Present while this row is being edited.
    pub draft: Option<String>,
    pub on_command: Callback<Command>,
}

#[function_component(TodoItem)]
pub fn todo_item(props: &TodoItemProps) -> Html {
    let id = props.task.id;
    let class = classes!("todo-item", props.task.completed.then_some("completed"));
    let edit_ref = use_node_ref();

    {
        let edit_ref = edit_ref.clone();
        use_effect_with(props.draft.is_some(), move |editing| {
            if *editing
                && let Some(input) = edit_ref.cast::<HtmlInputElement>()
                && let Err(err) = input.focus()
            {
                tracing::warn!(?err, "could not focus edit input");
            }
        });
    }

    if let Some(draft) = &props.draft {
        let on_submit = {
            let on_command = props.on_command.clone();
            Callback::from(move |e: SubmitEvent| {
                e.prevent_default();
                on_command.emit(Command::CommitEdit);
            })
        };
        let on_input = props.on_command.reform(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Command::UpdateEditDraft { text: input.value() }
        });
        let on_blur = props.on_command.reform(|_: FocusEvent| Command::CommitEdit);
        let on_keydown = {
            let on_command = props.on_command.clone();
            Callback::from(move |e: KeyboardEvent| {
                if e.key() == "Escape" {
                    on_command.emit(Command::CancelEdit);
                }
            })
        };
        let on_cancel = props.on_command.reform(|_: MouseEvent| Command::CancelEdit);
        // Keeps focus in the input so the blur handler does not commit first.
        let keep_focus = Callback::from(|e: MouseEvent| e.prevent_default());

        return html! {
            <li {class}>
                <form class="edit-form" onsubmit={on_submit}>
                    <input
                        type="text"
                        class="edit-input"
                        ref={edit_ref}
                        value={draft.clone()}
                        oninput={on_input}
                        onblur={on_blur}
                        onkeydown={on_keydown}
                    />
                    <div class="edit-buttons">
                        <button type="submit" class="save-btn">{ "Save" }</button>
                        <button
                            type="button"
                            class="cancel-btn"
                            onmousedown={keep_focus}
                            onclick={on_cancel}
                        >
                            { "Cancel" }
                        </button>
                    </div>
                </form>
            </li>
        };
    }

    let on_toggle = props.on_command.reform(move |_: Event| Command::Toggle { id });
    let on_edit = {
        let text = props.task.text.clone();
        props.on_command.reform(move |_: MouseEvent| Command::BeginEdit {
            id,
            text: text.clone(),
        })
    };
    let on_delete = props.on_command.reform(move |_: MouseEvent| Command::Remove { id });
    let created = props
        .task
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d")
        .to_string();

    html! {
        <li {class}>
            <div class="todo-content">
                <input
                    type="checkbox"
                    class="todo-checkbox"
                    checked={props.task.completed}
                    onchange={on_toggle}
                />
                <span class="todo-text">{ &props.task.text }</span>
                <span class="todo-date">{ created }</span>
            </div>
            <div class="todo-actions">
                <button class="edit-btn" title="Edit todo" onclick={on_edit}>{ "✏️" }</button>
                <button class="delete-btn" title="Delete todo" onclick={on_delete}>{ "🗑️" }</button>
            </div>
        </li>
    }
}
