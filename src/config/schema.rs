//! Configuration schema for stmbench
//!
//! User configuration lives at `~/.config/stmbench/config.toml`; a project
//! may add a `stmbench.toml` that is merged on top.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Data locations
    pub data: DataConfig,

    /// Corpus settings
    pub corpus: CorpusConfig,

    /// Topic model settings
    pub model: ModelConfig,

    /// Plot settings
    pub plot: PlotConfig,

    /// R runtime settings
    pub r: RConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Where the source data lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root data directory; caches go under `<root>/corpora`
    pub root: PathBuf,

    /// SQLite database file name inside the root
    pub database: String,

    /// Table holding the raw paragraphs
    pub table: String,

    /// Base stopword list, one word per line, `#` comments
    pub stopwords: Option<PathBuf>,
}

impl DataConfig {
    pub fn database_path(&self) -> PathBuf {
        self.root.join(&self.database)
    }

    pub fn corpora_dir(&self) -> PathBuf {
        self.root.join("corpora")
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
            database: "corpus.sqlite3".to_string(),
            table: "corpus_raw".to_string(),
            stopwords: Some(PathBuf::from("stopwords_latin.txt")),
        }
    }
}

/// How paragraphs are grouped into documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Grouping {
    Paragraph,
    #[default]
    Work,
    Author,
    /// Works, with letters kept as separate documents
    WorkLetters,
}

impl Grouping {
    /// Label stored in the settings record
    pub fn label(&self) -> &'static str {
        match self {
            Self::Paragraph => "Paragraph",
            Self::Work => "Work",
            Self::Author => "Author",
            Self::WorkLetters => "Work w/ letters separated",
        }
    }

    /// Column the export query groups by
    pub fn group_field(&self) -> &'static str {
        match self {
            Self::Paragraph => "par_id",
            Self::Work => "source",
            Self::Author => "author",
            Self::WorkLetters => "title",
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Corpus construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub grouping: Grouping,

    /// Use lemmatized text instead of raw text
    pub lemmatize: bool,

    /// Minimum token length kept in documents
    pub min_length: u32,

    /// Stopword directives: `word` adds, `-word` removes
    pub user_stopwords: Vec<String>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            grouping: Grouping::Work,
            lemmatize: true,
            min_length: 1,
            user_stopwords: vec![],
        }
    }
}

/// Topic model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of topics
    pub topics: u32,

    /// Maximum EM iterations
    pub iterations: u32,

    /// Topic prevalence by author
    pub by_author: bool,

    /// Topic prevalence by work
    pub by_work: bool,

    /// Topic prevalence by letter flag
    pub letters: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            topics: 3,
            iterations: 1,
            by_author: false,
            by_work: true,
            letters: false,
        }
    }
}

/// Kind of plot to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlotKind {
    #[default]
    Default,
    Hist,
    Perspectives,
    Labels,
    TopicCorr,
}

impl PlotKind {
    /// Name passed to R's `plot.STM(type = ...)`, also used in file names
    pub fn r_name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Hist => "hist",
            Self::Perspectives => "perspectives",
            Self::Labels => "labels",
            Self::TopicCorr => "topicCorr",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.r_name())
    }
}

/// Plot settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub kind: PlotKind,

    /// Topic numbers (1-based) to include; empty means all
    pub topics: Vec<u32>,
}

/// R runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RConfig {
    /// Rscript executable
    pub rscript: String,

    /// Install stm, igraph and tm when missing
    pub install_missing_packages: bool,

    /// CRAN mirror used for installs
    pub cran_mirror: String,
}

impl Default for RConfig {
    fn default() -> Self {
        Self {
            rscript: "Rscript".to_string(),
            install_missing_packages: true,
            cran_mirror: "https://cloud.r-project.org".to_string(),
        }
    }
}
