//! Command-line interface.
//!
//! ```text
//! j [OPTIONS] [COMMAND]
//!
//! Commands:
//!   show  List entries (default) [aliases: s]
//!   new   Write a new entry [aliases: n]
//!   edit  Edit existing entries [aliases: e]
//! ```

use crate::config::Config;
use crate::constants::{APP_DESCRIPTION, APP_NAME};
use crate::errors::AppResult;
use crate::journal_core::filter::FilterSettings;
use crate::journal_core::time_filter::{Clock, TimeFilter};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, version, long_about = None)]
pub struct CliArgs {
    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List entries
    #[command(visible_alias = "s")]
    Show(ShowArgs),

    /// Write a new entry
    #[command(visible_alias = "n")]
    New,

    /// Edit existing entries
    #[command(visible_alias = "e")]
    Edit(FilterArgs),
}

/// Entry selection flags shared by `show` and `edit`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Only entries carrying this tag (repeatable; all must match)
    #[arg(short = 'T', long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Only entries containing this text (repeatable; all must match)
    #[arg(short = 't', long = "text", value_name = "TERM")]
    pub text: Vec<String>,

    /// Match text case sensitively
    #[arg(short = 'c', long)]
    pub case_sensitive: bool,

    /// Time range, e.g. `1w`, `2y:1y` or `2017-01-01:2017-02-01`
    #[arg(short = 'w', long, value_name = "EXPR")]
    pub when: Option<String>,

    /// Only the entry with this identifier (repeatable)
    #[arg(short = 'i', long = "id", value_name = "ID")]
    pub ids: Vec<String>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print entries as JSON
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Print headers only
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Wrap bodies at this column; zero or negative disables wrapping
    #[arg(short = 'W', long, value_name = "COL", allow_negative_numbers = true)]
    pub wrap: Option<i32>,

    /// Colour the output
    #[arg(long)]
    pub colour: bool,
}

impl CliArgs {
    /// The command to run; `show` with no flags when none was given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Show(ShowArgs::default()))
    }
}

impl FilterArgs {
    /// Builds filter settings, falling back to configured defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::TimeFilter` if the time expression is malformed.
    pub fn to_settings(&self, config: &Config, clock: Arc<dyn Clock>) -> AppResult<FilterSettings> {
        let when = self.when.as_deref().or(config.time_filter.as_deref());
        let time = when.map(|expr| TimeFilter::from_arg(expr, clock)).transpose()?;

        Ok(FilterSettings::new()
            .with_tags(self.tags.iter().cloned())
            .with_text(self.text.iter().cloned())
            .case_sensitive(self.case_sensitive || config.case_sensitive)
            .with_time(time)
            .with_ids(self.ids.iter().cloned()))
    }
}
