/*!
# j - A Plain-Text Journal

This file contains the main application flow: logging setup, configuration,
and dispatch of the CLI commands to the journal operations.

## Usage

```
j [OPTIONS] [COMMAND]

Commands:
  show  List entries (default) [aliases: s]
  new   Write a new entry [aliases: n]
  edit  Edit existing entries [aliases: e]

Options:
  -v, --verbose  Enable debug logging
  -h, --help     Print help
  -V, --version  Print version
```

## Configuration

- `J_JOURNAL_DIR`: The journal directory (required)
- `J_EDITOR` or `EDITOR`: The editor used for entries (defaults to "vi")
- `J_WRAP`, `J_RULE_WIDTH`: Display widths
- `J_CASE_SENSITIVE`, `J_TIME_FILTER`: Default filter settings
- `J_LOG_FORMAT`: `text` (default) or `json` log output on stderr
- `RUST_LOG`: Log filter directives
*/

use clap::Parser;
use j::cli::{CliArgs, Command, ShowArgs};
use j::config::Config;
use j::constants::{
    DEFAULT_LOG_LEVEL, ENV_VAR_LOG_FORMAT, LOG_FORMAT_JSON, TRACING_ROOT_SPAN_NAME,
    TRACING_SERVICE_NAME,
};
use j::editor::SystemEditor;
use j::errors::{AppError, AppResult};
use j::format::{Formatter, Theme};
use j::journal_core::time_filter::{Clock, SystemClock};
use j::journal_io::{Journal, MalformedEntry};
use j::ops::{self, StdinPrompt, View};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, info_span};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Logs always go to stderr so stdout carries
/// only entry output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    };

    let json = std::env::var(ENV_VAR_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case(LOG_FORMAT_JSON))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .init();
    }
}

fn report_malformed(malformed: Vec<MalformedEntry>) -> AppResult<()> {
    if malformed.is_empty() {
        return Ok(());
    }
    let count = malformed.len();
    for entry in malformed {
        eprintln!("{}", entry.into_error());
    }
    Err(AppError::MalformedEntries { count })
}

fn run_show(journal: &Journal, config: &Config, clock: Arc<dyn Clock>, args: ShowArgs) -> AppResult<()> {
    let settings = args.filter.to_settings(config, clock)?;
    let formatter = Formatter {
        wrap_column: args.wrap.unwrap_or(config.wrap_column),
        rule_width: config.rule_width,
        theme: args.colour.then(Theme::ansi),
    };

    let listing = ops::show_entries(journal, &formatter, &settings, View::new(args.json, args.list))?;
    io::stdout().lock().write_all(listing.output.as_bytes())?;
    report_malformed(listing.malformed)
}

fn system_editor(config: &Config) -> AppResult<SystemEditor> {
    Ok(SystemEditor {
        editor_cmd: config.editor_command()?.to_string(),
    })
}

fn run(args: CliArgs) -> AppResult<()> {
    let config = Config::load()?;
    config.validate()?;
    debug!(config = ?config, "Configuration loaded");

    let journal = Journal::open(&config.journal_dir)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match args.command() {
        Command::Show(show) => run_show(&journal, &config, clock, show),
        Command::New => {
            let editor = system_editor(&config)?;
            if let Some(path) = ops::new_entry(&journal, &editor, &mut StdinPrompt, clock.as_ref())? {
                info!(path = %path.display(), "Entry saved");
            }
            Ok(())
        }
        Command::Edit(filter) => {
            let editor = system_editor(&config)?;
            let settings = filter.to_settings(&config, clock)?;
            let outcome = ops::edit_entries(&journal, &editor, &mut StdinPrompt, &settings)?;
            info!(saved = outcome.saved.len(), "Edit finished");
            report_malformed(outcome.malformed)
        }
    }
}

/// The main entry point for the j application.
///
/// Errors are printed on stderr and turned into exit status 1.
fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service = TRACING_SERVICE_NAME,
        correlation_id = %uuid::Uuid::new_v4()
    );
    let _guard = span.enter();
    debug!(args = ?args, "Starting");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = %e, "Command failed");
            match &e {
                AppError::Config(message) => eprintln!("{}", message),
                other => eprintln!("Error: {}", other),
            }
            ExitCode::FAILURE
        }
    }
}
