pub mod toml_config;

use crate::core::classifier::{ClassificationRules, NoSeparatorPolicy};
use crate::core::monitor::DEFAULT_COMMAND_TIMEOUT;
use crate::core::runner::DEFAULT_POLL_INTERVAL;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_range, Validate,
};
use std::time::Duration;
use toml_config::{
    LogFormat, TomlConfig, COMMAND_TIMEOUT_RANGE_MS, MIN_TITLE_LEN_RANGE, POLL_INTERVAL_RANGE_MS,
};

pub const DEFAULT_PROCESS_NAME: &str = "spotify";

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "admute")]
#[command(about = "Mutes a music player while it plays advertisements")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Process name of the player (matched case-insensitively)
    #[arg(long)]
    pub process_name: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Upper bound for a single mute/unmute call in milliseconds
    #[arg(long)]
    pub command_timeout_ms: Option<u64>,

    /// How to treat titles without an "Artist - Track" separator
    #[arg(long, value_enum)]
    pub no_separator: Option<NoSeparatorPolicy>,

    /// Start with ad muting switched off
    #[arg(long)]
    pub disabled: bool,

    /// Log mute/unmute commands instead of touching audio
    #[arg(long)]
    pub dry_run: bool,

    /// Read titles from a file, one per poll tick, instead of the player window
    #[arg(long)]
    pub replay: Option<String>,

    /// Mute the player, wait two seconds, unmute it, then exit
    #[arg(long)]
    pub self_test: bool,

    /// Print monitor events to stdout as JSON lines
    #[arg(long)]
    pub emit_events: bool,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Effective settings after merging defaults, the TOML file and CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub process_name: String,
    pub rules: ClassificationRules,
    pub poll_interval: Duration,
    pub command_timeout: Duration,
    pub start_enabled: bool,
    pub verbose: bool,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_toml(&TomlConfig::default())
    }
}

impl Settings {
    pub fn from_toml(config: &TomlConfig) -> Self {
        let process_name = config
            .process_name()
            .unwrap_or(DEFAULT_PROCESS_NAME)
            .to_string();

        Self {
            rules: build_rules(&process_name, config),
            poll_interval: config
                .poll_interval_ms()
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            command_timeout: config
                .command_timeout_ms()
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_COMMAND_TIMEOUT),
            start_enabled: config.start_enabled(),
            verbose: config.verbose(),
            log_format: config.log_format().unwrap_or_default(),
            process_name,
        }
    }

    /// 命令列參數優先於 TOML 設定
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let mut toml = match &cli.config {
            Some(path) => {
                crate::utils::validation::validate_path("config", path)?;
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        toml.validate()?;

        if let Some(name) = &cli.process_name {
            toml.player.get_or_insert_with(Default::default).process_name = Some(name.clone());
        }
        if let Some(policy) = cli.no_separator {
            toml.classifier
                .get_or_insert_with(Default::default)
                .no_separator = Some(policy);
        }

        let mut settings = Self::from_toml(&toml);
        if let Some(ms) = cli.interval_ms {
            settings.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = cli.command_timeout_ms {
            settings.command_timeout = Duration::from_millis(ms);
        }
        if cli.disabled {
            settings.start_enabled = false;
        }
        if cli.verbose {
            settings.verbose = true;
        }
        if let Some(format) = cli.log_format {
            settings.log_format = format;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn build_rules(process_name: &str, config: &TomlConfig) -> ClassificationRules {
    let mut rules = ClassificationRules::for_player(process_name);

    if let Some(player) = &config.player {
        if let Some(placeholders) = &player.placeholders {
            rules.placeholders = placeholders.clone();
        }
    }

    if let Some(classifier) = &config.classifier {
        if let Some(separators) = &classifier.separators {
            rules.separators = separators.clone();
        }
        if let Some(keywords) = &classifier.keywords {
            rules.keywords = keywords.clone();
        }
        if let Some(extra) = &classifier.extra_keywords {
            rules.keywords.extend(extra.iter().cloned());
        }
        if let Some(len) = classifier.min_title_len {
            rules.min_title_len = len;
        }
        if let Some(policy) = classifier.no_separator {
            rules.no_separator = policy;
        }
    }

    rules
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("process_name", &self.process_name)?;
        validate_non_empty_list("classifier.separators", &self.rules.separators)?;
        validate_range(
            "classifier.min_title_len",
            self.rules.min_title_len,
            MIN_TITLE_LEN_RANGE.0,
            MIN_TITLE_LEN_RANGE.1,
        )?;
        validate_range(
            "poll_interval_ms",
            self.poll_interval.as_millis() as u64,
            POLL_INTERVAL_RANGE_MS.0,
            POLL_INTERVAL_RANGE_MS.1,
        )?;
        validate_range(
            "command_timeout_ms",
            self.command_timeout.as_millis() as u64,
            COMMAND_TIMEOUT_RANGE_MS.0,
            COMMAND_TIMEOUT_RANGE_MS.1,
        )?;
        Ok(())
    }
}
