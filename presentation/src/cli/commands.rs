//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How a finished session is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full transcript with decisions and votes
    Text,
    /// Session snapshot as JSON
    Json,
    /// Counts, decisions and tallies only
    Summary,
}

/// CLI arguments for council
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(author, version, about = "Moderated council sessions between configured participants")]
#[command(long_about = r#"
Council runs a moderated discussion between the participants configured in
council.toml. You act as the Chair: the session is convened on TOPIC, the
configured participants take turns, and you may call an advisory vote and
record a decision before the session adjourns.

Participants steer the discussion with bracketed markers such as
[QUESTION: name], [REQUEST FLOOR] and [CONSULT: name | question].

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/council/config.toml   Global config

Example:
  council "Which storage engine should we adopt?" --turns 6
  council "Adopt X?" --vote "Adopt X?" --option yes --option no --decide "Adopt X"
"#)]
pub struct Cli {
    /// What the council is convened to discuss
    #[arg(required_unless_present = "show_config")]
    pub topic: Option<String>,

    /// Session title (defaults to the topic)
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Agenda items (can be specified multiple times)
    #[arg(short, long, value_name = "ITEM")]
    pub agenda: Vec<String>,

    /// Number of main turns to run
    #[arg(short, long, default_value_t = 6)]
    pub turns: usize,

    /// Opening remarks by the Chair
    #[arg(long, value_name = "TEXT")]
    pub opening: Option<String>,

    /// Participant who speaks first
    #[arg(long, value_name = "ID")]
    pub first: Option<String>,

    /// Reserve to summon before the turns start
    #[arg(long, value_name = "ID")]
    pub summon: Option<String>,

    /// Question put to the summoned participant (defaults to the topic)
    #[arg(long, value_name = "QUESTION", requires = "summon")]
    pub summon_question: Option<String>,

    /// Call an advisory vote after the turns
    #[arg(long, value_name = "QUESTION")]
    pub vote: Option<String>,

    /// Vote options (can be specified multiple times)
    #[arg(long = "option", value_name = "OPTION", requires = "vote")]
    pub options: Vec<String>,

    /// Record a decision before adjourning
    #[arg(long, value_name = "TEXT")]
    pub decide: Option<String>,

    /// Closing remarks by the Chair
    #[arg(long, value_name = "TEXT")]
    pub closing: Option<String>,

    /// Output format (defaults to [output] format, then text)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Do not print turns as they happen
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Log filter matching the `-v` count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_run() {
        let cli = Cli::try_parse_from([
            "council",
            "Pick an engine",
            "--turns",
            "3",
            "--vote",
            "X or Y?",
            "--option",
            "X",
            "--option",
            "Y",
            "--decide",
            "Use X",
            "-o",
            "summary",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.topic.as_deref(), Some("Pick an engine"));
        assert_eq!(cli.turns, 3);
        assert_eq!(cli.options, vec!["X", "Y"]);
        assert_eq!(cli.output, Some(OutputFormat::Summary));
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn test_topic_required_unless_show_config() {
        assert!(Cli::try_parse_from(["council"]).is_err());
        let cli = Cli::try_parse_from(["council", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.topic.is_none());
    }

    #[test]
    fn test_options_require_vote() {
        assert!(Cli::try_parse_from(["council", "t", "--option", "X"]).is_err());
    }
}
