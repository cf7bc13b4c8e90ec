use crate::error::ArtifactError;
use crate::probe::{FsProbe, RealFs};
use core_types::{ArtifactDescriptor, ArtifactName, Horizon, MatchKind, Resolution};
use std::path::{Component, Path, PathBuf};

const BACKTESTS_DIR: &str = "backtests";
const LIVE_FILE: &str = "simulation_results.json";
const HORIZON_FILE: &str = "simulation_report.json";

/// Where the service is running from, threaded in explicitly instead of read from
/// process state so resolution stays testable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorContext {
    pub current_dir: PathBuf,
    /// An explicit project root; when `None` the nearest ancestor holding a root marker is used.
    pub project_root: Option<PathBuf>,
    pub root_markers: Vec<String>,
}

impl LocatorContext {
    pub fn new(current_dir: impl Into<PathBuf>) -> Self {
        Self { current_dir: current_dir.into(), project_root: None, root_markers: Vec::new() }
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn with_root_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.root_markers = markers.into_iter().map(Into::into).collect();
        self
    }
}

/// Resolves logical artifact names to files through a fixed, ordered list of candidates.
///
/// For every relative artifact path the candidate bases are, in priority order: the current
/// directory, two levels up, three levels up, and the project root. The first existing
/// file wins; nothing is merged across candidates.
#[derive(Debug, Clone)]
pub struct ArtifactLocator<P: FsProbe = RealFs> {
    probe: P,
    results_dir: PathBuf,
}

impl ArtifactLocator<RealFs> {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self::with_probe(RealFs, results_dir)
    }
}

impl<P: FsProbe> ArtifactLocator<P> {
    pub fn with_probe(probe: P, results_dir: impl Into<PathBuf>) -> Self {
        Self { probe, results_dir: results_dir.into() }
    }

    /// The artifact's path relative to a candidate base, or `None` for names that are only
    /// ever resolved through the backtest fallback.
    pub fn relative_path(&self, name: &ArtifactName) -> Option<PathBuf> {
        match name {
            ArtifactName::Simulation(Horizon::Live) => Some(self.results_dir.join(LIVE_FILE)),
            ArtifactName::Simulation(horizon) => {
                Some(self.results_dir.join(horizon.key()).join(HORIZON_FILE))
            }
            ArtifactName::Backtest { start, end } => Some(
                self.results_dir
                    .join(BACKTESTS_DIR)
                    .join(ArtifactName::backtest_file_name(*start, *end)),
            ),
            ArtifactName::LatestBacktest => None,
        }
    }

    /// Candidate base directories in priority order, normalized and de-duplicated.
    pub fn base_dirs(&self, ctx: &LocatorContext) -> Vec<PathBuf> {
        let cwd = &ctx.current_dir;
        let mut bases = vec![
            normalize_lexically(cwd),
            normalize_lexically(&cwd.join("..").join("..")),
            normalize_lexically(&cwd.join("..").join("..").join("..")),
        ];
        if let Some(root) = self.project_root(ctx) {
            bases.push(normalize_lexically(&root));
        }
        dedup_preserving_order(bases)
    }

    /// Every candidate location for `relative`, in search order.
    pub fn candidates(&self, relative: &Path, ctx: &LocatorContext) -> Vec<PathBuf> {
        let joined = self
            .base_dirs(ctx)
            .into_iter()
            .map(|base| normalize_lexically(&base.join(relative)))
            .collect();
        dedup_preserving_order(joined)
    }

    pub fn locate(&self, name: &ArtifactName, ctx: &LocatorContext) -> ArtifactDescriptor {
        let descriptor = match name {
            ArtifactName::Simulation(_) | ArtifactName::Backtest { .. } => {
                let relative = self.relative_path(name).unwrap_or_default();
                let candidates = self.candidates(&relative, ctx);
                match candidates.iter().find(|c| self.probe.is_file(c)) {
                    Some(path) => ArtifactDescriptor {
                        name: *name,
                        resolution: Resolution::Found { path: path.clone(), via: MatchKind::Exact },
                        candidates,
                    },
                    None if name.is_backtest() => self.latest_backtest(*name, candidates, ctx),
                    None => ArtifactDescriptor {
                        name: *name,
                        resolution: Resolution::NotFound { searched: candidates.clone() },
                        candidates,
                    },
                }
            }
            ArtifactName::LatestBacktest => self.latest_backtest(*name, Vec::new(), ctx),
        };

        match &descriptor.resolution {
            Resolution::Found { path, via } => {
                tracing::debug!(artifact = %name, path = %path.display(), via = ?via, "Artifact located.");
            }
            Resolution::NotFound { searched } => {
                tracing::info!(artifact = %name, searched = searched.len(), "Artifact not found in any candidate location.");
            }
        }
        descriptor
    }

    /// Falls back to the lexicographically-last `backtest_*.json` in the first candidate
    /// backtests directory holding any. File names sort chronologically, so this is the
    /// most recent run.
    fn latest_backtest(
        &self,
        name: ArtifactName,
        exact_candidates: Vec<PathBuf>,
        ctx: &LocatorContext,
    ) -> ArtifactDescriptor {
        let dirs = self.candidates(&self.results_dir.join(BACKTESTS_DIR), ctx);
        let mut searched = exact_candidates.clone();

        for dir in &dirs {
            searched.push(dir.clone());
            if !self.probe.is_dir(dir) {
                continue;
            }
            let latest = self
                .probe
                .list_files(dir)
                .into_iter()
                .filter(|file| is_backtest_file_name(file))
                .max();
            if let Some(file) = latest {
                let candidates = if exact_candidates.is_empty() { dirs.clone() } else { exact_candidates };
                return ArtifactDescriptor {
                    name,
                    candidates,
                    resolution: Resolution::Found { path: dir.join(file), via: MatchKind::Fallback },
                };
            }
        }

        let candidates = if exact_candidates.is_empty() { dirs } else { exact_candidates };
        ArtifactDescriptor { name, candidates, resolution: Resolution::NotFound { searched } }
    }

    /// Resolves a directory (story or visualization roots) with the same candidate order.
    pub fn locate_dir(&self, relative: &Path, ctx: &LocatorContext) -> Result<PathBuf, ArtifactError> {
        let candidates = self.candidates(relative, ctx);
        if let Some(dir) = candidates.iter().find(|c| self.probe.is_dir(c)) {
            return Ok(dir.clone());
        }
        Err(ArtifactError::DirectoryNotFound { relative: relative.to_path_buf(), searched: candidates })
    }

    fn project_root(&self, ctx: &LocatorContext) -> Option<PathBuf> {
        if let Some(root) = &ctx.project_root {
            return Some(root.clone());
        }
        ctx.current_dir
            .ancestors()
            .find(|dir| ctx.root_markers.iter().any(|marker| self.probe.exists(&dir.join(marker))))
            .map(Path::to_path_buf)
    }
}

/// The naming convention backtest artifacts follow: `backtest_<start>_<end>.json`.
pub fn is_backtest_file_name(file_name: &str) -> bool {
    file_name.starts_with("backtest_") && file_name.ends_with(".json")
}

/// Resolves `.` and `..` without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

fn dedup_preserving_order(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut unique: Vec<PathBuf> = Vec::with_capacity(paths.len());
    for path in paths {
        if !unique.contains(&path) {
            unique.push(path);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::MemoryFs;
    use chrono::NaiveDate;

    fn ctx() -> LocatorContext {
        LocatorContext::new("/home/dev/portfolio/frontend/app/server")
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn found(descriptor: &ArtifactDescriptor) -> (&Path, MatchKind) {
        match &descriptor.resolution {
            Resolution::Found { path, via } => (path.as_path(), *via),
            other => panic!("expected a found artifact, got {other:?}"),
        }
    }

    #[test]
    fn candidates_follow_the_fixed_priority_order() {
        let locator = ArtifactLocator::with_probe(MemoryFs::new(), "results");
        let ctx = ctx().with_project_root("/home/dev/portfolio");
        let candidates = locator.candidates(Path::new("results/30min/simulation_report.json"), &ctx);
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/home/dev/portfolio/frontend/app/server/results/30min/simulation_report.json"),
                PathBuf::from("/home/dev/portfolio/frontend/results/30min/simulation_report.json"),
                PathBuf::from("/home/dev/portfolio/results/30min/simulation_report.json"),
            ]
        );
    }

    #[test]
    fn first_existing_candidate_wins() {
        let fs = MemoryFs::with_files([
            "/home/dev/portfolio/results/1hour/simulation_report.json",
            "/home/dev/portfolio/frontend/results/1hour/simulation_report.json",
        ]);
        let locator = ArtifactLocator::with_probe(fs, "results");
        let descriptor = locator.locate(&ArtifactName::Simulation(Horizon::OneHour), &ctx());
        assert_eq!(
            found(&descriptor),
            (
                Path::new("/home/dev/portfolio/frontend/results/1hour/simulation_report.json"),
                MatchKind::Exact
            )
        );
    }

    #[test]
    fn not_found_lists_every_candidate() {
        let locator = ArtifactLocator::with_probe(MemoryFs::new(), "results");
        let descriptor = locator.locate(&ArtifactName::Simulation(Horizon::Live), &ctx());
        match descriptor.resolution {
            Resolution::NotFound { searched } => {
                assert_eq!(searched, descriptor.candidates);
                assert_eq!(searched.len(), 3);
                assert!(searched.iter().all(|p| p.ends_with("results/simulation_results.json")));
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn project_root_is_discovered_from_markers() {
        let fs = MemoryFs::with_files([
            "/home/dev/Cargo.toml",
            "/home/dev/results/30min/simulation_report.json",
        ]);
        let locator = ArtifactLocator::with_probe(fs, "results");
        let ctx = LocatorContext::new("/home/dev/a/b/c/d").with_root_markers(["Cargo.toml"]);
        let descriptor = locator.locate(&ArtifactName::Simulation(Horizon::ThirtyMinutes), &ctx);
        assert_eq!(found(&descriptor).0, Path::new("/home/dev/results/30min/simulation_report.json"));
    }

    #[test]
    fn exact_backtest_range_beats_the_fallback() {
        let fs = MemoryFs::with_files([
            "/p/results/backtests/backtest_2019-01-01_2023-01-01.json",
            "/p/results/backtests/backtest_2019-01-01_2024-01-01.json",
            "/p/results/backtests/backtest_2020-01-01_2024-06-01.json",
        ]);
        let locator = ArtifactLocator::with_probe(fs, "results");
        let name = ArtifactName::Backtest { start: date("2019-01-01"), end: date("2024-01-01") };
        let descriptor = locator.locate(&name, &LocatorContext::new("/p"));
        assert_eq!(
            found(&descriptor),
            (Path::new("/p/results/backtests/backtest_2019-01-01_2024-01-01.json"), MatchKind::Exact)
        );
    }

    #[test]
    fn missing_backtest_range_falls_back_to_the_last_file_name() {
        let fs = MemoryFs::with_files([
            "/p/results/backtests/backtest_2019-01-01_2023-01-01.json",
            "/p/results/backtests/backtest_2020-01-01_2024-06-01.json",
            "/p/results/backtests/backtest_2019-06-01_2024-01-01.json",
            "/p/results/backtests/notes.txt",
            "/p/results/backtests/zz_summary.json",
        ]);
        let locator = ArtifactLocator::with_probe(fs, "results");
        let name = ArtifactName::Backtest { start: date("2018-01-01"), end: date("2018-12-31") };
        let descriptor = locator.locate(&name, &LocatorContext::new("/p"));
        assert_eq!(
            found(&descriptor),
            (Path::new("/p/results/backtests/backtest_2020-01-01_2024-06-01.json"), MatchKind::Fallback)
        );
    }

    #[test]
    fn fallback_uses_the_first_directory_with_any_match() {
        let fs = MemoryFs::with_files([
            "/p/a/b/results/backtests/readme.md",
            "/p/results/backtests/backtest_2019-01-01_2020-01-01.json",
        ]);
        let locator = ArtifactLocator::with_probe(fs, "results");
        let descriptor = locator.locate(&ArtifactName::LatestBacktest, &LocatorContext::new("/p/a/b"));
        assert_eq!(
            found(&descriptor).0,
            Path::new("/p/results/backtests/backtest_2019-01-01_2020-01-01.json")
        );
    }

    #[test]
    fn backtest_not_found_reports_files_and_directories_searched() {
        let locator = ArtifactLocator::with_probe(MemoryFs::new(), "results");
        let name = ArtifactName::Backtest { start: date("2019-01-01"), end: date("2024-01-01") };
        let descriptor = locator.locate(&name, &LocatorContext::new("/x/y/z/w"));
        match descriptor.resolution {
            Resolution::NotFound { searched } => {
                assert_eq!(searched.len(), 6);
                assert!(searched[..3].iter().all(|p| p.extension().is_some()));
                assert!(searched[3..].iter().all(|p| p.ends_with("results/backtests")));
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn locate_dir_reports_searched_candidates() {
        let fs = MemoryFs::with_files(["/srv/data/viz/stories/climate.json"]);
        let locator = ArtifactLocator::with_probe(fs, "results");
        let ctx = LocatorContext::new("/srv/web/app");
        assert_eq!(
            locator.locate_dir(Path::new("data/viz/stories"), &ctx).unwrap(),
            PathBuf::from("/srv/data/viz/stories")
        );
        let err = locator.locate_dir(Path::new("data/viz/static"), &ctx).unwrap_err();
        assert!(matches!(err, ArtifactError::DirectoryNotFound { searched, .. } if searched.len() == 3));
    }

    #[test]
    fn lexical_normalization_never_climbs_above_the_root() {
        assert_eq!(normalize_lexically(Path::new("/a/../../b/./c")), PathBuf::from("/b/c"));
        assert_eq!(normalize_lexically(Path::new("a/b/../../..")), PathBuf::from(".."));
        assert_eq!(normalize_lexically(Path::new("./")), PathBuf::from("."));
    }
}
