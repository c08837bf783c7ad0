use std::io::Write;

use anyhow::Context;
use todo_core::{Command, Filter, Storage, TodoStore, normalize_text};
use tracing::{debug, info, instrument};

use crate::cli::{CliCommand, join_words};
use crate::config::Config;
use crate::render::Renderer;

/// Runs one CLI command against the store, writing user-facing output to `out`.
#[instrument(skip(store, cfg, renderer, command, out))]
pub fn dispatch<S: Storage, W: Write>(
    store: &mut TodoStore<S>,
    cfg: &Config,
    renderer: &Renderer,
    command: Option<CliCommand>,
    mut out: W,
) -> anyhow::Result<()> {
    let command = match command {
        Some(command) => command,
        None => CliCommand::List {
            filter: None,
            search: None,
        },
    };
    debug!(?command, "dispatching command");

    match command {
        CliCommand::Add { words } => cmd_add(store, &join_words(&words), &mut out),
        CliCommand::Toggle { id } => cmd_toggle(store, id, &mut out),
        CliCommand::Delete { id } => cmd_delete(store, id, &mut out),
        CliCommand::Edit { id, words } => cmd_edit(store, id, &join_words(&words), &mut out),
        CliCommand::ClearCompleted => cmd_clear_completed(store, &mut out),
        CliCommand::ToggleAll => cmd_toggle_all(store, &mut out),
        CliCommand::List { filter, search } => {
            let filter = match filter {
                Some(filter) => filter,
                None => cfg.default_filter()?,
            };
            cmd_list(store, renderer, filter, search, &mut out)
        }
    }
}

fn cmd_add<S: Storage, W: Write>(
    store: &mut TodoStore<S>,
    text: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command add");
    if normalize_text(text).is_none() {
        writeln!(out, "Nothing to add.")?;
        return Ok(());
    }

    store.add(text)?;
    let id = store
        .tasks()
        .first()
        .map(|t| t.id)
        .context("added task missing from list")?;
    writeln!(out, "Created task {id}.")?;
    Ok(())
}

fn cmd_toggle<S: Storage, W: Write>(
    store: &mut TodoStore<S>,
    id: u64,
    out: &mut W,
) -> anyhow::Result<()> {
    info!(id, "command toggle");
    store.toggle(id)?;
    match store.state().find(id) {
        Some(task) if task.completed => writeln!(out, "Completed task {id} '{}'.", task.text)?,
        Some(task) => writeln!(out, "Reopened task {id} '{}'.", task.text)?,
        None => writeln!(out, "No task with id {id}.")?,
    }
    Ok(())
}

fn cmd_delete<S: Storage, W: Write>(
    store: &mut TodoStore<S>,
    id: u64,
    out: &mut W,
) -> anyhow::Result<()> {
    info!(id, "command delete");
    let Some(text) = store.state().find(id).map(|t| t.text.clone()) else {
        writeln!(out, "No task with id {id}.")?;
        return Ok(());
    };
    store.remove(id)?;
    writeln!(out, "Deleted task {id} '{text}'.")?;
    Ok(())
}

fn cmd_edit<S: Storage, W: Write>(
    store: &mut TodoStore<S>,
    id: u64,
    text: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    info!(id, "command edit");
    let Some(current) = store.state().find(id).map(|t| t.text.clone()) else {
        writeln!(out, "No task with id {id}.")?;
        return Ok(());
    };

    store.begin_edit(id, &current)?;
    store.update_edit_draft(text)?;
    store.commit_edit()?;

    match normalize_text(text) {
        Some(updated) => writeln!(out, "Modified task {id} '{updated}'.")?,
        None => writeln!(out, "Text cannot be empty; task {id} unchanged.")?,
    }
    Ok(())
}

fn cmd_clear_completed<S: Storage, W: Write>(
    store: &mut TodoStore<S>,
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command clear-completed");
    let before = store.tasks().len();
    store.clear_completed()?;
    let removed = before - store.tasks().len();
    writeln!(out, "Cleared {removed} completed task(s).")?;
    Ok(())
}

fn cmd_toggle_all<S: Storage, W: Write>(
    store: &mut TodoStore<S>,
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command toggle-all");
    if store.tasks().is_empty() {
        writeln!(out, "No tasks.")?;
        return Ok(());
    }
    store.toggle_all()?;
    if store.view().all_completed {
        writeln!(out, "Completed all {} task(s).", store.tasks().len())?;
    } else {
        writeln!(out, "Reopened all {} task(s).", store.tasks().len())?;
    }
    Ok(())
}

fn cmd_list<S: Storage, W: Write>(
    store: &mut TodoStore<S>,
    renderer: &Renderer,
    filter: Filter,
    search: Option<String>,
    out: &mut W,
) -> anyhow::Result<()> {
    info!(%filter, ?search, "command list");
    store.dispatch(Command::SetFilter(filter))?;
    if let Some(search) = search {
        store.dispatch(Command::SetSearch(search))?;
    }
    renderer.write_view(out, &store.view())
}
