//! Chapter frontmatter - the metadata block at the top of a manuscript

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ChapterId;

/// Contents of the `storyteller` key of a manuscript's frontmatter
///
/// `chapter_id`, `title` and `order` are mandatory; the parser rejects a
/// block missing any of them instead of defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontmatterData {
    pub chapter_id: ChapterId,
    pub title: String,
    /// Any non-zero number; kept as written so `1.5` or `-1` round-trip
    pub order: serde_yaml::Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreshadowings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_events: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timelines: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Keys this tool does not interpret, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl FrontmatterData {
    pub fn new(
        chapter_id: impl Into<ChapterId>,
        title: impl Into<String>,
        order: impl Into<serde_yaml::Number>,
    ) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            title: title.into(),
            order: order.into(),
            characters: None,
            settings: None,
            foreshadowings: None,
            timeline_events: None,
            phases: None,
            timelines: None,
            plot_points: None,
            summary: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_characters(mut self, characters: Vec<String>) -> Self {
        self.characters = Some(characters);
        self
    }

    pub fn with_settings(mut self, settings: Vec<String>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn declared_characters(&self) -> &[String] {
        self.characters.as_deref().unwrap_or_default()
    }

    pub fn declared_settings(&self) -> &[String] {
        self.settings.as_deref().unwrap_or_default()
    }
}
