//! Settings fingerprinting and cache-directory management
//!
//! Every configurable unit (corpus, stm, plot) derives a fingerprint from its
//! options and keeps its artifacts in a directory named after it. The
//! directory doubles as a memoization flag: if it exists, this exact
//! configuration has been seen before.
//!
//! # Layout
//!
//! ```text
//! <root>/corpora/corpus_<fp>/setting.txt
//!                           /corpus.csv
//!                           /stm_<fp>/setting.txt
//!                                    /stm.RData
//!                                    /plot_<fp>/setting.txt
//!                                              /<kind>_topics_<n>.jpeg
//! ```
//!
//! # Unit States
//!
//! | State | Meaning |
//! |-------|---------|
//! | Unconfigured | Options or parent directory changed since the last cycle |
//! | Validated | Fingerprint and directory computed, record verified |
//!
//! Directories are never removed here; cleanup is manual.

pub mod cascade;
pub mod fingerprint;
pub mod options;
pub mod record;
pub mod resolver;
pub mod unit;

pub use cascade::{revalidate, revalidate_children, revalidate_observed};
pub use fingerprint::Fingerprint;
pub use options::{OptionDescriptor, OptionKind, OptionValue, Options, Schema};
pub use record::{RecordStatus, SETTINGS_RECORD};
pub use resolver::{resolve, ResolvedDirectory};
pub use unit::{ConfigurableUnit, Unit, UnitKind, UnitState};
