//! Items flowing through the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{MEDIA_STREAM, WEBPAGE_STREAM};

/// Raw item as delivered by the upstream producer.
///
/// Either a bare URL line or a JSON object with `url` and an optional pre-known
/// `domain`; any other fields are carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InputItem {
    pub fn from_url(url: impl Into<String>) -> Self {
        InputItem {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Parses one input line.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments. Lines starting with `{`
    /// are decoded as JSON objects; anything else is taken as a bare URL.
    pub fn parse_line(line: &str) -> Result<Option<InputItem>, serde_json::Error> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        if trimmed.starts_with('{') {
            return serde_json::from_str(trimmed).map(Some);
        }
        Ok(Some(InputItem::from_url(trimmed)))
    }
}

/// Routing tag assigned by the domain classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Media,
    Article,
}

impl Classification {
    /// Name of the output stream this classification is emitted on.
    pub fn stream(&self) -> &'static str {
        match self {
            Classification::Media => MEDIA_STREAM,
            Classification::Article => WEBPAGE_STREAM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionOutcome {
    #[default]
    Pending,
    Success,
    Failure,
}

/// An item being expanded, enriched in place as it moves through the stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub original_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub outcome: ResolutionOutcome,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkItem {
    pub fn new(original_url: impl Into<String>) -> Self {
        WorkItem {
            original_url: original_url.into(),
            canonical_url: None,
            domain: None,
            classification: None,
            outcome: ResolutionOutcome::Pending,
            extra: Map::new(),
        }
    }

    /// Builds a work item from an input record; `None` when the record has no URL.
    pub fn from_input(input: InputItem) -> Option<Self> {
        let url = input.url.filter(|u| !u.trim().is_empty())?;
        Some(WorkItem {
            domain: input.domain,
            extra: input.extra,
            ..WorkItem::new(url.trim())
        })
    }

    /// Marks the item resolved to `canonical_url` on `domain`.
    pub fn resolved(&mut self, canonical_url: String, domain: String, class: Classification) {
        self.canonical_url = Some(canonical_url);
        self.domain = Some(domain);
        self.classification = Some(class);
        self.outcome = ResolutionOutcome::Success;
    }

    /// Marks the item as unresolvable. Fields set by an earlier resolution are kept.
    pub fn failed(&mut self) {
        self.outcome = ResolutionOutcome::Failure;
    }
}
