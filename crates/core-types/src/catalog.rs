use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The cheap listing form of a story; full bodies are loaded only by slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryIndexEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryVisualization {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub viz_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A full story document. Fields the pipeline does not interpret are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    #[serde(flatten)]
    pub entry: StoryIndexEntry,
    #[serde(default)]
    pub narrative: Option<Value>,
    #[serde(default)]
    pub visualizations: Vec<StoryVisualization>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationEntry {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub tool: Option<String>,
    #[serde(rename = "type")]
    pub viz_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Any other fields of the index entry or story visualization, passed through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Exact-match filters for the visualization listing. Unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VisualizationFilter {
    pub domain: Option<String>,
    pub tool: Option<String>,
    #[serde(rename = "type", alias = "viz_type")]
    pub viz_type: Option<String>,
}

impl VisualizationFilter {
    pub fn matches(&self, entry: &VisualizationEntry) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
            wanted.as_ref().is_none_or(|w| actual.as_deref() == Some(w.as_str()))
        }
        field_matches(&self.domain, &entry.domain)
            && field_matches(&self.tool, &entry.tool)
            && field_matches(&self.viz_type, &entry.viz_type)
    }
}
