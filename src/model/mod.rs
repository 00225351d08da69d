//! Topic model unit
//!
//! Lives inside a corpus cache directory. Fitting itself is done by the
//! statistics backend; this unit only decides where the fit goes and with
//! which parameters.

use crate::config::schema::ModelConfig;
use crate::corpus::Categories;
use crate::error::BenchResult;
use crate::settings::{OptionDescriptor, OptionKind, Options, Schema, UnitKind};
use crate::stats::FitRequest;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Fitted model inside an stm cache directory
pub const MODEL_FILE: &str = "stm.RData";

const DESCRIPTORS: &[OptionDescriptor] = &[
    OptionDescriptor::new("topics", OptionKind::Integer),
    OptionDescriptor::new("iterations", OptionKind::Integer),
    OptionDescriptor::new("by_author", OptionKind::Flag),
    OptionDescriptor::new("by_work", OptionKind::Flag),
    OptionDescriptor::new("letters", OptionKind::Flag),
];

pub const SCHEMA: Schema = Schema::new("stm", DESCRIPTORS);

#[derive(Debug, Clone)]
pub struct ModelUnit {
    settings: ModelConfig,
    categories: Categories,
}

impl ModelUnit {
    pub fn new(settings: ModelConfig, categories: Categories) -> Self {
        Self {
            settings,
            categories,
        }
    }

    pub fn settings(&self) -> &ModelConfig {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ModelConfig {
        &mut self.settings
    }

    /// Right-hand side of the prevalence formula, if any covariate is enabled
    pub fn prevalence_formula(&self) -> Option<String> {
        let mut variables: Vec<&str> = Vec::new();
        if self.settings.by_author {
            variables.extend(self.categories.author_headers());
        }
        if self.settings.by_work {
            variables.extend(self.categories.work_headers());
        }
        if self.settings.letters {
            variables.push("letter");
        }

        if variables.is_empty() {
            None
        } else {
            Some(variables.join(" + "))
        }
    }

    pub fn fit_request(&self) -> FitRequest {
        FitRequest {
            topics: self.settings.topics,
            iterations: self.settings.iterations,
            prevalence: self.prevalence_formula(),
        }
    }

    pub fn model_path(cache_directory: &Path) -> PathBuf {
        cache_directory.join(MODEL_FILE)
    }
}

#[async_trait]
impl UnitKind for ModelUnit {
    fn name(&self) -> &'static str {
        SCHEMA.unit()
    }

    fn options(&self) -> BenchResult<Options> {
        Options::new(SCHEMA)
            .with("topics", self.settings.topics)?
            .with("iterations", self.settings.iterations)?
            .with("by_author", self.settings.by_author)?
            .with("by_work", self.settings.by_work)?
            .with("letters", self.settings.letters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Categories {
        Categories::from_values(
            &["cicero-m".to_string(), "seneca".to_string()],
            &["Epistulae".to_string()],
        )
    }

    fn model(by_author: bool, by_work: bool, letters: bool) -> ModelUnit {
        ModelUnit::new(
            ModelConfig {
                by_author,
                by_work,
                letters,
                ..ModelConfig::default()
            },
            categories(),
        )
    }

    #[test]
    fn prevalence_follows_flags() {
        assert_eq!(model(false, false, false).prevalence_formula(), None);
        assert_eq!(
            model(false, true, false).prevalence_formula().as_deref(),
            Some("wrk_Epistulae")
        );
        assert_eq!(
            model(true, true, true).prevalence_formula().as_deref(),
            Some("auth_cicero + auth_seneca + wrk_Epistulae + letter")
        );
        assert_eq!(
            model(false, false, true).prevalence_formula().as_deref(),
            Some("letter")
        );
    }

    #[test]
    fn fit_request_carries_settings() {
        let mut unit = model(false, false, false);
        unit.settings_mut().topics = 12;
        unit.settings_mut().iterations = 40;

        assert_eq!(
            unit.fit_request(),
            FitRequest {
                topics: 12,
                iterations: 40,
                prevalence: None,
            }
        );
    }

    #[test]
    fn canonical_form() {
        let canonical = model(false, true, false)
            .options()
            .unwrap()
            .canonical_string()
            .unwrap();
        assert_eq!(
            canonical,
            "(\"topics\", 3)\n(\"iterations\", 1)\n(\"by_author\", false)\n(\"by_work\", true)\n(\"letters\", false)"
        );
    }

    #[test]
    fn topic_count_changes_fingerprint() {
        let a = model(false, true, false);
        let mut b = a.clone();
        b.settings_mut().topics = 4;

        assert_ne!(
            a.options().unwrap().fingerprint().unwrap(),
            b.options().unwrap().fingerprint().unwrap()
        );
    }
}
