use crate::pool::PoolFilter;
use crate::session::InputMode;
use crate::settings::Settings;
use clap::{Parser, ValueEnum};

/// Chatterdle CLI options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Channel whose chat supplies the candidate chatters
    /// (defaults to the last-used channel)
    #[arg(short, long)]
    pub channel: Option<String>,

    /// Seed for target selection, for reproducible rounds
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only pick targets from moderators
    #[arg(long)]
    pub moderators_only: bool,

    /// Only pick targets from subscribers
    #[arg(long)]
    pub subscribers_only: bool,

    /// Show joined chatter names on the home screen
    #[arg(long, overrides_with = "hide_names")]
    pub reveal_names: bool,

    /// Hide chatter names on the home screen (show only the count)
    #[arg(long)]
    pub hide_names: bool,

    /// Show letter-count hints on colored keyboard keys
    #[arg(long)]
    pub hints: bool,

    /// How letter entry interacts with the cursor
    #[arg(long, value_enum, default_value = "auto-advance")]
    pub input_mode: InputModeArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputModeArg {
    /// Letters fill left to right, backspace pops
    AutoAdvance,
    /// Letters overwrite the active cell, arrows move the cursor
    FixedCursor,
}

impl From<InputModeArg> for InputMode {
    fn from(arg: InputModeArg) -> Self {
        match arg {
            InputModeArg::AutoAdvance => Self::AutoAdvance,
            InputModeArg::FixedCursor => Self::FixedCursor,
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

impl Cli {
    pub fn filter(&self) -> PoolFilter {
        if self.moderators_only || self.subscribers_only {
            PoolFilter::Roles {
                moderators: self.moderators_only,
                subscribers: self.subscribers_only,
            }
        } else {
            PoolFilter::All
        }
    }

    /// Fold command-line overrides into the persisted settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(channel) = &self.channel {
            settings.channel = Some(channel.clone());
        }
        if self.reveal_names {
            settings.reveal_names_before_start = true;
        }
        if self.hide_names {
            settings.reveal_names_before_start = false;
        }
        if self.hints {
            settings.reveal_occurrence_hints = true;
        }
    }
}
