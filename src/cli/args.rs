//! CLI argument definitions using clap derive

use crate::config::{Config, Grouping, PlotKind};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// stmbench - Structural topic model workbench
///
/// Builds a document corpus from a paragraph database, fits a structural
/// topic model on it and renders plots, caching every step under a
/// directory named after its settings.
#[derive(Parser, Debug)]
#[command(name = "stmbench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STMBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local stmbench.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    #[command(flatten)]
    pub overrides: SettingsOverrides,
}

/// Per-invocation settings that take precedence over the config files
#[derive(Args, Debug, Default)]
pub struct SettingsOverrides {
    /// Document grouping: paragraph, work, author, work-letters
    #[arg(long, global = true, value_parser = parse_grouping)]
    pub grouping: Option<Grouping>,

    /// Use lemmatized paragraphs
    #[arg(long, global = true, overrides_with = "no_lemmatize")]
    pub lemmatize: bool,

    /// Use raw paragraphs
    #[arg(long, global = true, overrides_with = "lemmatize")]
    pub no_lemmatize: bool,

    /// Minimum token length
    #[arg(long, global = true)]
    pub min_length: Option<u32>,

    /// Stopword directive, repeatable (`word` adds, `-word` removes)
    #[arg(long = "stopword", global = true, allow_hyphen_values = true)]
    pub stopwords: Vec<String>,

    /// Number of topics
    #[arg(long, global = true)]
    pub topics: Option<u32>,

    /// Maximum EM iterations
    #[arg(long, global = true)]
    pub iterations: Option<u32>,

    /// Topic prevalence by author (true|false)
    #[arg(long, global = true, value_name = "BOOL")]
    pub by_author: Option<bool>,

    /// Topic prevalence by work (true|false)
    #[arg(long, global = true, value_name = "BOOL")]
    pub by_work: Option<bool>,

    /// Topic prevalence by letter flag (true|false)
    #[arg(long, global = true, value_name = "BOOL")]
    pub letters: Option<bool>,

    /// Plot kind: default, hist, perspectives, labels, topic-corr
    #[arg(long, global = true, value_parser = parse_plot_kind)]
    pub plot_kind: Option<PlotKind>,

    /// Topic number to plot, repeatable
    #[arg(long = "plot-topic", global = true)]
    pub plot_topics: Vec<u32>,
}

impl SettingsOverrides {
    /// Write every given override into the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(grouping) = self.grouping {
            config.corpus.grouping = grouping;
        }
        if self.lemmatize {
            config.corpus.lemmatize = true;
        }
        if self.no_lemmatize {
            config.corpus.lemmatize = false;
        }
        if let Some(min_length) = self.min_length {
            config.corpus.min_length = min_length;
        }
        config
            .corpus
            .user_stopwords
            .extend(self.stopwords.iter().cloned());

        if let Some(topics) = self.topics {
            config.model.topics = topics;
        }
        if let Some(iterations) = self.iterations {
            config.model.iterations = iterations;
        }
        if let Some(flag) = self.by_author {
            config.model.by_author = flag;
        }
        if let Some(flag) = self.by_work {
            config.model.by_work = flag;
        }
        if let Some(flag) = self.letters {
            config.model.letters = flag;
        }

        if let Some(kind) = self.plot_kind {
            config.plot.kind = kind;
        }
        if !self.plot_topics.is_empty() {
            config.plot.topics = self.plot_topics.clone();
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the corpus CSV and the prepared corpus
    Corpus(CorpusArgs),

    /// Fit the topic model on the prepared corpus
    Fit,

    /// Render a plot of the fitted model
    Plot,

    /// Show cache directories and artifacts for the current settings
    Status,

    /// Inspect the cache tree
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the corpus command
#[derive(Parser, Debug)]
pub struct CorpusArgs {
    /// Rebuild the corpus even if it exists
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List all unit cache directories
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

fn parse_grouping(s: &str) -> Result<Grouping, String> {
    match s {
        "paragraph" => Ok(Grouping::Paragraph),
        "work" => Ok(Grouping::Work),
        "author" => Ok(Grouping::Author),
        "work-letters" => Ok(Grouping::WorkLetters),
        _ => Err(format!(
            "unknown grouping '{s}' (expected paragraph, work, author or work-letters)"
        )),
    }
}

fn parse_plot_kind(s: &str) -> Result<PlotKind, String> {
    match s {
        "default" => Ok(PlotKind::Default),
        "hist" => Ok(PlotKind::Hist),
        "perspectives" => Ok(PlotKind::Perspectives),
        "labels" => Ok(PlotKind::Labels),
        "topic-corr" | "topicCorr" => Ok(PlotKind::TopicCorr),
        _ => Err(format!("unknown plot kind '{s}'")),
    }
}
