use crate::error::ArtifactError;
use crate::store::read_json;
use core_types::{Story, StoryIndexEntry, VisualizationEntry, VisualizationFilter};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const VIZ_INDEX_FILE: &str = "viz_index.json";
const DEFAULT_TOOL: &str = "plotly";
const STATIC_FORMATS: [(&str, &str); 3] =
    [("png", "image/png"), ("svg", "image/svg+xml"), ("jpg", "image/jpeg")];

/// A pre-rendered image ready to be streamed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAsset {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Story index entries for every `*.json` in `stories_dir`, in file-name order.
///
/// Only the index fields are decoded. Files that cannot be read are skipped with a warning
/// so one broken story never hides the others.
pub fn list_stories(stories_dir: &Path) -> Vec<StoryIndexEntry> {
    json_files(stories_dir)
        .into_iter()
        .filter_map(|path| match read_typed::<StoryIndexEntry>(&path) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable story.");
                None
            }
        })
        .collect()
}

pub fn load_story(stories_dir: &Path, slug: &str) -> Result<Story, ArtifactError> {
    let not_found = || ArtifactError::NotFound(format!("Story '{slug}'"));
    if !is_safe_file_stem(slug) {
        return Err(not_found());
    }
    let path = stories_dir.join(format!("{slug}.json"));
    if !path.is_file() {
        return Err(not_found());
    }
    read_typed(&path)
}

/// The visualization listing: `viz_index.json` when present and readable, otherwise entries
/// derived from the stories' own visualization lists.
pub fn list_visualizations(
    viz_data_dir: Option<&Path>,
    stories_dir: Option<&Path>,
    filter: &VisualizationFilter,
) -> Vec<VisualizationEntry> {
    let from_index = viz_data_dir
        .map(|dir| dir.join(VIZ_INDEX_FILE))
        .filter(|path| path.is_file())
        .and_then(|path| match read_typed::<Vec<VisualizationEntry>>(&path) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Visualization index unreadable, deriving from stories.");
                None
            }
        })
        .unwrap_or_default();

    let entries = if from_index.is_empty() {
        stories_dir.map(visualizations_from_stories).unwrap_or_default()
    } else {
        from_index
    };

    entries.into_iter().filter(|entry| filter.matches(entry)).collect()
}

fn visualizations_from_stories(stories_dir: &Path) -> Vec<VisualizationEntry> {
    let mut entries = Vec::new();
    for path in json_files(stories_dir) {
        let story = match read_typed::<Story>(&path) {
            Ok(story) => story,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable story.");
                continue;
            }
        };
        for mut viz in story.visualizations {
            let description = viz.extra.remove("description").as_ref().and_then(Value::as_str).map(str::to_string);
            // The story's own domain and slug, and the default tool, take precedence.
            for key in ["domain", "slug", "tool"] {
                viz.extra.remove(key);
            }
            entries.push(VisualizationEntry {
                id: viz.id,
                title: viz.title,
                description,
                domain: story.entry.domain.clone(),
                tool: Some(DEFAULT_TOOL.to_string()),
                viz_type: viz.viz_type,
                slug: story.entry.slug.clone(),
                extra: viz.extra,
            });
        }
    }
    entries
}

/// `<id>.json` from the visualization data directory.
pub fn load_viz_data(viz_data_dir: &Path, viz_id: &str) -> Result<Value, ArtifactError> {
    first_json(viz_data_dir, viz_id, &[""], "Visualization data")
}

/// The Plotly figure: `<id>.json`, then `<id>_plotly.json`.
pub fn load_viz_plotly(viz_data_dir: &Path, viz_id: &str) -> Result<Value, ArtifactError> {
    first_json(viz_data_dir, viz_id, &["", "_plotly"], "Plotly visualization")
}

pub fn load_static(viz_static_dir: &Path, viz_id: &str, format: &str) -> Result<StaticAsset, ArtifactError> {
    let not_found = || ArtifactError::NotFound(format!("Static visualization '{viz_id}.{format}'"));
    let Some((_, content_type)) = STATIC_FORMATS.iter().find(|(ext, _)| *ext == format) else {
        return Err(not_found());
    };
    if !is_safe_file_stem(viz_id) {
        return Err(not_found());
    }
    let file_name = format!("{viz_id}.{format}");
    let path = viz_static_dir.join(&file_name);
    if !path.is_file() {
        return Err(not_found());
    }
    let bytes = fs::read(&path).map_err(|source| ArtifactError::Io { path, source })?;
    Ok(StaticAsset { file_name, content_type: *content_type, bytes })
}

fn first_json(dir: &Path, viz_id: &str, suffixes: &[&str], what: &str) -> Result<Value, ArtifactError> {
    if is_safe_file_stem(viz_id) {
        let existing = suffixes
            .iter()
            .map(|suffix| dir.join(format!("{viz_id}{suffix}.json")))
            .find(|path| path.is_file());
        if let Some(path) = existing {
            return read_json(&path);
        }
    }
    Err(ArtifactError::NotFound(format!("{what} '{viz_id}'")))
}

fn read_typed<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let value = read_json(path)?;
    serde_json::from_value(value)
        .map_err(|source| ArtifactError::Malformed { path: path.to_path_buf(), source })
}

fn json_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// Identifiers taken from a URL must name a file directly inside the catalog directory.
fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\']) && !id.contains("..") && !id.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_vec(value).unwrap()).unwrap();
    }

    fn story_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "b-housing.json",
            &json!({
                "id": "housing", "title": "Housing", "description": "Prices", "domain": "social",
                "slug": "b-housing", "narrative": "Long text...",
                "visualizations": [
                    {"id": "rent_map", "title": "Rent", "type": "geospatial"},
                    {"id": "rent_trend", "title": "Trend", "type": "interactive", "description": "Rent over time",
                     "height": 420, "tool": "d3"}
                ]
            }),
        );
        write(
            dir.path(),
            "a-climate.json",
            &json!({
                "id": "climate", "title": "Climate", "description": "Temps", "domain": "climate",
                "slug": "a-climate", "narrative": {"sections": []},
                "visualizations": [{"id": "temp_anomaly", "title": "Anomaly", "type": "static"}],
                "author": "team"
            }),
        );
        fs::write(dir.path().join("broken.json"), "not json").unwrap();
        dir
    }

    #[test]
    fn stories_are_listed_in_file_order_skipping_broken_files() {
        let dir = story_dir();
        let stories = list_stories(dir.path());
        let slugs: Vec<_> = stories.iter().filter_map(|s| s.slug.as_deref()).collect();
        assert_eq!(slugs, vec!["a-climate", "b-housing"]);
        assert_eq!(stories[0].title.as_deref(), Some("Climate"));
    }

    #[test]
    fn story_by_slug_keeps_unknown_fields() {
        let dir = story_dir();
        let story = load_story(dir.path(), "a-climate").unwrap();
        assert_eq!(story.entry.id.as_deref(), Some("climate"));
        assert_eq!(story.visualizations.len(), 1);
        assert_eq!(story.extra.get("author"), Some(&json!("team")));

        assert!(matches!(load_story(dir.path(), "missing"), Err(ArtifactError::NotFound(_))));
        assert!(matches!(load_story(dir.path(), "../etc/passwd"), Err(ArtifactError::NotFound(_))));
    }

    #[test]
    fn visualizations_fall_back_to_story_lists_and_filter() {
        let stories = story_dir();
        let data = tempfile::tempdir().unwrap();

        let all = list_visualizations(Some(data.path()), Some(stories.path()), &VisualizationFilter::default());
        let ids: Vec<_> = all.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["temp_anomaly", "rent_map", "rent_trend"]);
        assert!(all.iter().all(|v| v.tool.as_deref() == Some("plotly")));
        assert_eq!(all[2].description.as_deref(), Some("Rent over time"));
        assert_eq!(all[1].slug.as_deref(), Some("b-housing"));
        assert_eq!(all[2].extra.get("height"), Some(&json!(420)));
        assert!(!all[2].extra.contains_key("description"));
        assert!(!all[2].extra.contains_key("tool"));

        let shown = serde_json::to_value(&all[2]).unwrap();
        assert_eq!(shown["height"], 420);
        assert_eq!(shown["tool"], "plotly");

        let filter = VisualizationFilter { domain: Some("social".into()), viz_type: Some("geospatial".into()), ..Default::default() };
        let filtered = list_visualizations(Some(data.path()), Some(stories.path()), &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "rent_map");
    }

    #[test]
    fn visualization_index_takes_precedence() {
        let stories = story_dir();
        let data = tempfile::tempdir().unwrap();
        write(
            data.path(),
            VIZ_INDEX_FILE,
            &json!([{"id": "gdp", "title": "GDP", "description": "d", "domain": "financial", "tool": "matplotlib", "type": "static", "source": "FRED"}]),
        );
        let all = list_visualizations(Some(data.path()), Some(stories.path()), &VisualizationFilter::default());
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].tool.as_deref(), Some("matplotlib"));
        assert_eq!(all[0].extra.get("source"), Some(&json!("FRED")));
    }

    #[test]
    fn plotly_payload_falls_back_to_the_suffixed_file() {
        let data = tempfile::tempdir().unwrap();
        write(data.path(), "returns_plotly.json", &json!({"data": [], "layout": {}}));
        write(data.path(), "volume.json", &json!({"rows": [1, 2]}));

        assert_eq!(load_viz_plotly(data.path(), "returns").unwrap()["layout"], json!({}));
        assert_eq!(load_viz_plotly(data.path(), "volume").unwrap()["rows"][1], 2);
        assert!(matches!(load_viz_data(data.path(), "returns"), Err(ArtifactError::NotFound(_))));
    }

    #[test]
    fn static_assets_carry_their_content_type() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("heatmap.svg"), "<svg/>").unwrap();

        let asset = load_static(dir.path(), "heatmap", "svg").unwrap();
        assert_eq!(asset.content_type, "image/svg+xml");
        assert_eq!(asset.bytes, b"<svg/>");
        assert!(load_static(dir.path(), "heatmap", "gif").is_err());
        assert!(load_static(dir.path(), "heatmap", "png").is_err());
    }
}
