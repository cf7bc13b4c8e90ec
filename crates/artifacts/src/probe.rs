use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The filesystem questions the locator is allowed to ask.
///
/// Injecting this keeps path resolution a pure function of its inputs: tests answer from
/// an in-memory set instead of touching the real disk.
pub trait FsProbe: Send + Sync {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    /// File names (not paths) of the regular files directly inside `dir`.
    fn list_files(&self, dir: &Path) -> Vec<String>;

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }
}

/// The production probe backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FsProbe for RealFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> Vec<String> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect()
    }
}

/// An in-memory probe: a set of file paths whose parents count as directories.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeSet<PathBuf>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathBuf>,
    {
        Self { files: files.into_iter().map(Into::into).collect() }
    }
}

impl FsProbe for MemoryFs {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.starts_with(path) && f != path)
    }

    fn list_files(&self, dir: &Path) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| f.parent() == Some(dir))
            .filter_map(|f| f.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fs_derives_directories_from_files() {
        let fs = MemoryFs::with_files(["/p/results/30min/simulation_report.json"]);
        assert!(fs.is_dir(Path::new("/p/results")));
        assert!(fs.is_dir(Path::new("/p/results/30min")));
        assert!(!fs.is_dir(Path::new("/p/results/30min/simulation_report.json")));
        assert!(fs.exists(Path::new("/p/results/30min/simulation_report.json")));
        assert_eq!(
            fs.list_files(Path::new("/p/results/30min")),
            vec!["simulation_report.json".to_string()]
        );
        assert!(fs.list_files(Path::new("/p/results")).is_empty());
    }

    #[test]
    fn real_fs_lists_only_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        assert_eq!(RealFs.list_files(dir.path()), vec!["a.json".to_string()]);
        assert!(RealFs.is_dir(dir.path()));
        assert!(!RealFs.is_file(&dir.path().join("missing.json")));
    }
}
