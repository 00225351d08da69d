//! Settings-addressed cache tree
//!
//! Every unit keeps its artifacts in a directory named after its settings
//! fingerprint, nested inside its parent's directory. This module only
//! inspects that tree; cleanup is manual.
//!
//! # Entry States
//!
//! | State | Description |
//! |-------|-------------|
//! | Recorded | `setting.txt` present, directory usable as a cache hit |
//! | Incomplete | Created but never recorded; completed on next use |

pub mod entry;

pub use entry::{format_bytes, parse_dir_name, scan, CacheEntry, EntryState};
