use std::time::Duration;

use anyhow::{Context, Result};
use pager_cli::session::{Action, SessionOptions, SessionOutcome, run_session};
use pager_cli::settings::Settings;
use pager_core::SortOrder;

use crate::cli::{Cli, Command, SortOrderArg};

pub fn run(cli: &Cli) -> Result<SessionOutcome> {
    let rows = cli
        .rows
        .clone()
        .context("--rows <FILE> is required")?;
    let settings = cli
        .config
        .as_deref()
        .map(Settings::load_from)
        .unwrap_or_default();
    let options = SessionOptions {
        rows,
        query: cli.query.clone(),
        state: cli.state.clone(),
        settings,
        latency: Duration::from_millis(cli.latency_ms),
    };
    let action = action_from_command(&cli.command);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(run_session(&options, &action))
}

fn action_from_command(command: &Command) -> Action {
    match command {
        Command::Show => Action::Show,
        Command::Page { index } => Action::Page(*index),
        Command::Size { size } => Action::Size(*size),
        Command::Sort { key, order } => Action::Sort {
            key: key.clone(),
            order: match order {
                SortOrderArg::Ascend => SortOrder::Ascending,
                SortOrderArg::Descend => SortOrder::Descending,
                SortOrderArg::None => SortOrder::Unsorted,
            },
        },
        Command::Filter { key, values } => Action::Filter {
            key: key.clone(),
            values: values.clone(),
        },
        Command::Forget => Action::Forget,
    }
}
