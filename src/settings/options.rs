//! Option schemas and typed option values
//!
//! A unit declares its options once, as a static [`Schema`]. The schema fixes
//! both the set of accepted keys and their rendering order, so the canonical
//! string never depends on the order in which values were assigned.

use crate::error::{BenchError, BenchResult};
use crate::settings::fingerprint::Fingerprint;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Kind of value an option holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Free or enumerated text
    Text,
    /// Signed integer
    Integer,
    /// Boolean switch
    Flag,
    /// Set of strings, rendered sorted
    Set,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Flag => "flag",
            Self::Set => "set",
        };
        write!(f, "{}", name)
    }
}

/// Static description of one option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub key: &'static str,
    pub kind: OptionKind,
    /// Excluded options are accepted but never reach the canonical string
    pub include_in_fingerprint: bool,
}

impl OptionDescriptor {
    /// An option that takes part in fingerprinting
    pub const fn new(key: &'static str, kind: OptionKind) -> Self {
        Self {
            key,
            kind,
            include_in_fingerprint: true,
        }
    }

    /// An option carried for display or bookkeeping only
    pub const fn excluded(key: &'static str, kind: OptionKind) -> Self {
        Self {
            key,
            kind,
            include_in_fingerprint: false,
        }
    }
}

/// Ordered option declarations for one unit kind
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    unit: &'static str,
    descriptors: &'static [OptionDescriptor],
}

impl Schema {
    pub const fn new(unit: &'static str, descriptors: &'static [OptionDescriptor]) -> Self {
        Self { unit, descriptors }
    }

    /// Name of the unit this schema belongs to
    pub fn unit(&self) -> &'static str {
        self.unit
    }

    /// Descriptors in declaration order
    pub fn descriptors(&self) -> &'static [OptionDescriptor] {
        self.descriptors
    }

    fn descriptor(&self, key: &str) -> Option<&'static OptionDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }
}

/// A single option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Text(String),
    Integer(i64),
    Flag(bool),
    Set(BTreeSet<String>),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Text(_) => OptionKind::Text,
            Self::Integer(_) => OptionKind::Integer,
            Self::Flag(_) => OptionKind::Flag,
            Self::Set(_) => OptionKind::Set,
        }
    }

    /// Render the value on a single line.
    ///
    /// Text is quoted with escapes so embedded newlines cannot split a record
    /// line.
    pub fn canonical(&self) -> String {
        match self {
            Self::Text(s) => format!("{:?}", s),
            Self::Integer(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
            Self::Set(items) => {
                let rendered: Vec<String> = items.iter().map(|s| format!("{:?}", s)).collect();
                format!("{{{}}}", rendered.join(", "))
            }
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<BTreeSet<String>> for OptionValue {
    fn from(value: BTreeSet<String>) -> Self {
        Self::Set(value)
    }
}

/// Current option values of a unit, checked against its schema
#[derive(Debug, Clone)]
pub struct Options {
    schema: Schema,
    values: BTreeMap<&'static str, OptionValue>,
}

impl Options {
    /// Create an empty option set for a schema
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    /// Assign a value, rejecting undeclared keys and mismatched kinds
    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) -> BenchResult<()> {
        let descriptor = self
            .schema
            .descriptor(key)
            .ok_or_else(|| BenchError::UnknownOption {
                unit: self.schema.unit().to_string(),
                key: key.to_string(),
            })?;

        let value = value.into();
        if value.kind() != descriptor.kind {
            return Err(BenchError::OptionKindMismatch {
                unit: self.schema.unit().to_string(),
                key: key.to_string(),
                expected: descriptor.kind,
            });
        }

        self.values.insert(descriptor.key, value);
        Ok(())
    }

    /// Builder form of [`Options::set`]
    pub fn with(mut self, key: &str, value: impl Into<OptionValue>) -> BenchResult<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Canonical serialization: one `("key", value)` line per included
    /// option, in schema declaration order.
    pub fn canonical_string(&self) -> BenchResult<String> {
        let mut lines = Vec::new();

        for descriptor in self.schema.descriptors() {
            if !descriptor.include_in_fingerprint {
                continue;
            }
            let value = self
                .values
                .get(descriptor.key)
                .ok_or_else(|| BenchError::MissingOption {
                    unit: self.schema.unit().to_string(),
                    key: descriptor.key.to_string(),
                })?;
            lines.push(format!("({:?}, {})", descriptor.key, value.canonical()));
        }

        Ok(lines.join("\n"))
    }

    /// Fingerprint of the canonical serialization
    pub fn fingerprint(&self) -> BenchResult<Fingerprint> {
        Ok(Fingerprint::of(&self.canonical_string()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTORS: &[OptionDescriptor] = &[
        OptionDescriptor::new("grouping", OptionKind::Text),
        OptionDescriptor::new("lemmatize", OptionKind::Flag),
        OptionDescriptor::new("min_length", OptionKind::Integer),
        OptionDescriptor::excluded("note", OptionKind::Text),
    ];
    const SCHEMA: Schema = Schema::new("corpus", DESCRIPTORS);

    fn scenario() -> Options {
        Options::new(SCHEMA)
            .with("grouping", "Work")
            .unwrap()
            .with("lemmatize", true)
            .unwrap()
            .with("min_length", 1i64)
            .unwrap()
    }

    #[test]
    fn canonical_string_follows_declaration_order() {
        let options = Options::new(SCHEMA)
            .with("min_length", 1i64)
            .unwrap()
            .with("lemmatize", true)
            .unwrap()
            .with("grouping", "Work")
            .unwrap();

        assert_eq!(
            options.canonical_string().unwrap(),
            "(\"grouping\", \"Work\")\n(\"lemmatize\", true)\n(\"min_length\", 1)"
        );
        assert_eq!(
            options.fingerprint().unwrap(),
            scenario().fingerprint().unwrap()
        );
    }

    #[test]
    fn excluded_option_does_not_change_fingerprint() {
        let plain = scenario();
        let noted = scenario().with("note", "anything at all").unwrap();

        assert_eq!(
            plain.canonical_string().unwrap(),
            noted.canonical_string().unwrap()
        );
    }

    #[test]
    fn changed_value_changes_fingerprint() {
        let base = scenario().fingerprint().unwrap();

        let variants = [
            scenario().with("grouping", "Author").unwrap(),
            scenario().with("lemmatize", false).unwrap(),
            scenario().with("min_length", 2i64).unwrap(),
        ];

        let mut seen = vec![base];
        for variant in variants {
            let fp = variant.fingerprint().unwrap();
            assert!(!seen.contains(&fp));
            seen.push(fp);
        }
    }

    #[test]
    fn set_renders_sorted() {
        const SET_ONLY: &[OptionDescriptor] = &[OptionDescriptor::new("sw", OptionKind::Set)];
        let a: BTreeSet<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
        let options = Options::new(Schema::new("corpus", SET_ONLY))
            .with("sw", a)
            .unwrap();

        assert_eq!(options.canonical_string().unwrap(), "(\"sw\", {\"a\", \"b\"})");
    }

    #[test]
    fn text_with_newline_stays_on_one_line() {
        let value = OptionValue::from("a\nb");
        assert_eq!(value.canonical(), "\"a\\nb\"");
    }

    #[test]
    fn unknown_key_rejected() {
        let err = Options::new(SCHEMA).with("colour", "red").unwrap_err();
        assert!(matches!(err, BenchError::UnknownOption { .. }));
    }

    #[test]
    fn kind_mismatch_rejected() {
        let err = Options::new(SCHEMA).with("lemmatize", "yes").unwrap_err();
        assert!(matches!(
            err,
            BenchError::OptionKindMismatch {
                expected: OptionKind::Flag,
                ..
            }
        ));
    }

    #[test]
    fn missing_included_option_rejected() {
        let options = Options::new(SCHEMA).with("grouping", "Work").unwrap();
        let err = options.canonical_string().unwrap_err();
        assert!(matches!(err, BenchError::MissingOption { ref key, .. } if key == "lemmatize"));
    }
}
