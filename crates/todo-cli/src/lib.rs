pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod render;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting todo CLI");
    debug!(?cli.rc_overrides, "rc overrides");

    let mut cfg = config::Config::load(cli.todorc.as_deref())?;
    cfg.apply_overrides(cli.rc_overrides.into_iter().map(|kv| (kv.key, kv.value)));

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let storage = datastore::FileStorage::open(&data_dir)
        .with_context(|| format!("failed to open datastore at {}", data_dir.display()))?;
    let mut store = todo_core::TodoStore::open(storage);

    let renderer = render::Renderer::new(&cfg)?;

    commands::dispatch(&mut store, &cfg, &renderer, cli.command, std::io::stdout().lock())?;

    info!("done");
    Ok(())
}
