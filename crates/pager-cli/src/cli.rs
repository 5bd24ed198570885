//! CLI argument definitions for the pager.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "pager",
    version,
    about = "Page, sort and filter a JSON rows file",
    long_about = "Drive a paged list view over a JSON rows file.\n\n\
                  The query string stands in for the address bar and the state file for\n\
                  persisted storage, so consecutive runs behave like reloads of one page."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON file with an array of row objects (or an object with `items`).
    #[arg(long = "rows", value_name = "FILE", global = true)]
    pub rows: Option<PathBuf>,

    /// Current address bar query, e.g. `page=2&size=10`.
    #[arg(long = "query", value_name = "QS", default_value = "", global = true)]
    pub query: String,

    /// File used as persisted storage. Persistence is off without it.
    #[arg(long = "state", value_name = "FILE", global = true)]
    pub state: Option<PathBuf>,

    /// TOML settings file with `[pager]` and `[view]` tables.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Simulated latency of the rows source, in milliseconds.
    #[arg(long = "latency-ms", value_name = "N", default_value_t = 0, global = true)]
    pub latency_ms: u64,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the page the current query and stored state lead to.
    Show,

    /// Go to a 1-based page.
    Page {
        #[arg(value_name = "N")]
        index: usize,
    },

    /// Change the page size (returns to page 1).
    Size {
        #[arg(value_name = "N")]
        size: usize,
    },

    /// Sort by a field. `none` clears the sort.
    Sort {
        #[arg(value_name = "KEY")]
        key: String,

        #[arg(value_enum, value_name = "ORDER", default_value = "ascend")]
        order: SortOrderArg,
    },

    /// Filter a field by one or more values. No values clears the filter.
    Filter {
        #[arg(value_name = "KEY")]
        key: String,

        #[arg(value_name = "VALUES")]
        values: Vec<String>,
    },

    /// Clear the persisted state.
    Forget,
}

/// CLI sort order choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum SortOrderArg {
    Ascend,
    Descend,
    None,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
