//! Plot unit
//!
//! Only the plot kind is part of the fingerprint. The topic selection is
//! carried in the image file name instead, so one plot directory holds
//! every selection rendered for a kind.

use crate::config::schema::PlotConfig;
use crate::config::PlotKind;
use crate::error::{BenchError, BenchResult};
use crate::settings::{OptionDescriptor, OptionKind, Options, Schema, UnitKind};
use crate::stats::PlotRequest;
use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::warn;

const DESCRIPTORS: &[OptionDescriptor] = &[
    OptionDescriptor::new("kind", OptionKind::Text),
    OptionDescriptor::excluded("topics", OptionKind::Text),
];

pub const SCHEMA: Schema = Schema::new("plot", DESCRIPTORS);

/// Resolve the topics to plot.
///
/// Out-of-range topics are dropped, but a selection with none in range is
/// invalid. An empty selection means every topic (the first two for
/// `perspectives`). `topicCorr` always covers every
/// topic, so its selection is empty.
pub fn select_topics(kind: PlotKind, requested: &[u32], available: u32) -> BenchResult<Vec<u32>> {
    if kind == PlotKind::TopicCorr {
        return Ok(Vec::new());
    }

    let cap = if kind == PlotKind::Perspectives {
        if available < 2 {
            return Err(BenchError::InvalidSelection(format!(
                "perspectives needs two topics but the model has {}",
                available
            )));
        }
        2
    } else {
        available as usize
    };

    let mut selected: BTreeSet<u32> = BTreeSet::new();
    for &topic in requested {
        if (1..=available).contains(&topic) {
            selected.insert(topic);
        } else {
            warn!("Ignoring topic {}: model has {} topics", topic, available);
        }
    }

    if !requested.is_empty() && selected.is_empty() {
        return Err(BenchError::InvalidSelection(format!(
            "none of the requested topics {:?} exist in a {}-topic model",
            requested, available
        )));
    }

    let mut topics: Vec<u32> = if selected.is_empty() {
        (1..=available).collect()
    } else {
        selected.into_iter().collect()
    };
    topics.truncate(cap);

    if kind == PlotKind::Perspectives && topics.len() != 2 {
        return Err(BenchError::InvalidSelection(
            "perspectives compares exactly two topics".to_string(),
        ));
    }

    Ok(topics)
}

/// File name of a rendered plot
pub fn image_name(kind: PlotKind, topics: &[u32]) -> String {
    if kind == PlotKind::TopicCorr {
        return "topicCorr.jpeg".to_string();
    }
    let numbers: Vec<String> = topics.iter().map(u32::to_string).collect();
    format!("{}_topics_{}.jpeg", kind.r_name(), numbers.join("-"))
}

#[derive(Debug, Clone)]
pub struct PlotUnit {
    settings: PlotConfig,
}

impl PlotUnit {
    pub fn new(settings: PlotConfig) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PlotConfig {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut PlotConfig {
        &mut self.settings
    }

    /// Plot request against a model with `available` topics
    pub fn request(&self, available: u32) -> BenchResult<PlotRequest> {
        let topics = select_topics(self.settings.kind, &self.settings.topics, available)?;
        Ok(PlotRequest {
            kind: self.settings.kind,
            topics,
        })
    }
}

#[async_trait]
impl UnitKind for PlotUnit {
    fn name(&self) -> &'static str {
        SCHEMA.unit()
    }

    fn options(&self) -> BenchResult<Options> {
        let topics: Vec<String> = self.settings.topics.iter().map(u32::to_string).collect();
        Options::new(SCHEMA)
            .with("kind", self.settings.kind.r_name())?
            .with("topics", topics.join(","))
    }
}
