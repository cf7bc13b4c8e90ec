use crate::enums::{Horizon, SourceFamily};
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

const BACKTEST_PREFIX: &str = "backtest";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The logical identity of a result artifact, independent of where it lives on disk.
///
/// Every name has a stable textual key (see [`ArtifactName::key`]) which doubles as the
/// `reportId` handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactName {
    Simulation(Horizon),
    Backtest { start: NaiveDate, end: NaiveDate },
    LatestBacktest,
}

impl ArtifactName {
    pub fn key(&self) -> String {
        match self {
            ArtifactName::Simulation(horizon) => horizon.key().to_string(),
            ArtifactName::Backtest { start, end } => format!(
                "{BACKTEST_PREFIX}_{}_{}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            ),
            ArtifactName::LatestBacktest => BACKTEST_PREFIX.to_string(),
        }
    }

    /// The exact file name a backtest over this range is written to.
    pub fn backtest_file_name(start: NaiveDate, end: NaiveDate) -> String {
        format!("{}.json", ArtifactName::Backtest { start, end }.key())
    }

    /// The payload family the artifact is expected to contain.
    pub fn expected_family(&self) -> SourceFamily {
        match self {
            ArtifactName::Simulation(Horizon::Live) => SourceFamily::Live,
            ArtifactName::Simulation(horizon) => SourceFamily::Horizon(*horizon),
            ArtifactName::Backtest { .. } | ArtifactName::LatestBacktest => SourceFamily::Backtest,
        }
    }

    pub fn is_backtest(&self) -> bool {
        matches!(self, ArtifactName::Backtest { .. } | ArtifactName::LatestBacktest)
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for ArtifactName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().trim_end_matches(".json");
        if key == BACKTEST_PREFIX || key == "latest-backtest" {
            return Ok(ArtifactName::LatestBacktest);
        }
        if let Some(range) = key.strip_prefix("backtest_") {
            let (start, end) = range
                .split_once('_')
                .ok_or_else(|| CoreError::InvalidArtifactKey(s.to_string()))?;
            let parse = |d: &str| {
                NaiveDate::parse_from_str(d, DATE_FORMAT)
                    .map_err(|_| CoreError::InvalidArtifactKey(s.to_string()))
            };
            return Ok(ArtifactName::Backtest { start: parse(start)?, end: parse(end)? });
        }
        key.parse::<Horizon>()
            .map(ArtifactName::Simulation)
            .map_err(|_| CoreError::InvalidArtifactKey(s.to_string()))
    }
}

impl Serialize for ArtifactName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

/// How a found artifact was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    /// The lexicographically-last backtest file stood in for a missing exact match.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Found { path: PathBuf, via: MatchKind },
    NotFound { searched: Vec<PathBuf> },
}

/// The outcome of locating one logical artifact. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    pub name: ArtifactName,
    pub candidates: Vec<PathBuf>,
    pub resolution: Resolution,
}

impl ArtifactDescriptor {
    pub fn found_path(&self) -> Option<&Path> {
        match &self.resolution {
            Resolution::Found { path, .. } => Some(path.as_path()),
            Resolution::NotFound { .. } => None,
        }
    }

    /// Searched paths rendered relative to `base` where possible, for diagnostics that
    /// should not leak the absolute filesystem layout.
    pub fn searched_display(&self, base: &Path) -> Vec<String> {
        match &self.resolution {
            Resolution::Found { .. } => Vec::new(),
            Resolution::NotFound { searched } => {
                searched.iter().map(|p| display_relative(p, base)).collect()
            }
        }
    }
}

/// Renders `path` relative to `base`, or just its trailing components when it lies elsewhere.
pub fn display_relative(path: &Path, base: &Path) -> String {
    if let Ok(relative) = path.strip_prefix(base) {
        return relative.display().to_string();
    }
    let tail: Vec<_> = path
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .rev()
        .take(3)
        .collect();
    let tail: PathBuf = tail.into_iter().rev().collect();
    format!(".../{}", tail.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn artifact_keys_parse_back_to_the_same_name() {
        let names = [
            ArtifactName::Simulation(Horizon::Live),
            ArtifactName::Simulation(Horizon::ThirtyMinutes),
            ArtifactName::Simulation(Horizon::OneHour),
            ArtifactName::LatestBacktest,
            ArtifactName::Backtest { start: date("2019-01-01"), end: date("2024-01-01") },
        ];
        for name in names {
            assert_eq!(name.key().parse::<ArtifactName>().unwrap(), name);
        }
    }

    #[test]
    fn backtest_file_name_follows_the_chronological_convention() {
        assert_eq!(
            ArtifactName::backtest_file_name(date("2019-01-01"), date("2023-01-01")),
            "backtest_2019-01-01_2023-01-01.json"
        );
    }

    #[test]
    fn malformed_backtest_key_is_rejected() {
        assert!("backtest_2019-01-01".parse::<ArtifactName>().is_err());
        assert!("backtest_2019-13-01_2020-01-01".parse::<ArtifactName>().is_err());
        assert!("weekly".parse::<ArtifactName>().is_err());
    }

    #[test]
    fn searched_paths_are_shown_relative_to_the_working_directory() {
        let descriptor = ArtifactDescriptor {
            name: ArtifactName::Simulation(Horizon::OneHour),
            candidates: vec![],
            resolution: Resolution::NotFound {
                searched: vec![
                    PathBuf::from("/srv/app/results/1hour/simulation_report.json"),
                    PathBuf::from("/srv/results/1hour/simulation_report.json"),
                ],
            },
        };
        assert_eq!(
            descriptor.searched_display(Path::new("/srv/app")),
            vec![
                "results/1hour/simulation_report.json".to_string(),
                ".../results/1hour/simulation_report.json".to_string(),
            ]
        );
    }
}
