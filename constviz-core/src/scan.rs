//! Parallel, deterministic discovery and loading of C# and Visual Basic
//! source files.
//!
//! - Early directory pruning via `WalkDir::filter_entry`
//! - Parallel filtering and reading via Rayon
//! - Sorted output, so a rebuild visits units in the same order every run

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{ConstvizResult, IoResultExt};
use crate::extract::{DeclarationSource, SourceUnit};

/// Directories never scanned (build output, VCS and IDE state).
const EXCLUDED_DIRS: &[&str] = &["bin", "obj", ".git", ".vs", "node_modules"];

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// Gathers all `.cs` and `.vb` files under `root`, skipping the default
/// excluded directories and any directory named in `excludes`.
pub fn gather_source_files(root: &Path, excludes: &[&str]) -> Result<Vec<PathBuf>> {
    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().copied())
        .collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if e.file_type().is_file() && DeclarationSource::from_path(path).is_some() {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather source files from {}", root.display()))?;

    files.sort();
    Ok(files)
}

/// Reads every path into a [`SourceUnit`], in input order.
///
/// Unreadable or non-UTF-8 files are logged and left out.
pub fn load_units(paths: &[PathBuf]) -> Vec<SourceUnit> {
    paths
        .par_iter()
        .filter_map(|path| match load_unit(path) {
            Ok(unit) => unit,
            Err(err) => {
                warn!(
                    event = "unit_unreadable",
                    path = %path.display(),
                    error = %err,
                    "skipping unreadable source file"
                );
                None
            }
        })
        .collect()
}

/// Reads one file. `Ok(None)` when the extension names no supported language.
pub fn load_unit(path: &Path) -> ConstvizResult<Option<SourceUnit>> {
    if DeclarationSource::from_path(path).is_none() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).with_path(path)?;
    Ok(SourceUnit::from_path(path, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_project() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "constviz_scan_test_{}_{}",
            std::process::id(),
            id
        ));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(dir: &Path, rel: &str, content: &[u8]) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_gathers_sorted_sources_and_prunes() {
        let dir = temp_project();
        write(&dir, "b/Keys.cs", b"class K {}");
        write(&dir, "a/Module1.vb", b"Module M\nEnd Module\n");
        write(&dir, "README.md", b"# readme");
        write(&dir, "bin/Debug/Out.cs", b"class O {}");
        write(&dir, "obj/App.g.cs", b"class G {}");
        write(&dir, ".git/x.cs", b"class X {}");
        write(&dir, "Generated/Gen.cs", b"class Gen {}");

        let all = gather_source_files(&dir, &[]).unwrap();
        assert_eq!(
            names(&dir, &all),
            vec!["Generated/Gen.cs", "a/Module1.vb", "b/Keys.cs"]
        );

        let pruned = gather_source_files(&dir, &["Generated"]).unwrap();
        assert_eq!(names(&dir, &pruned), vec!["a/Module1.vb", "b/Keys.cs"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_units_skips_unreadable() {
        let dir = temp_project();
        write(&dir, "Good.cs", b"class G { const int X = 1; }");
        write(&dir, "Bad.cs", &[0xff, 0xfe, 0x00, 0x41]);

        let paths = vec![dir.join("Good.cs"), dir.join("Bad.cs"), dir.join("Missing.cs")];
        let units = load_units(&paths);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].language, DeclarationSource::CSharp);
        assert!(units[0].id.ends_with("Good.cs"));

        fs::remove_dir_all(&dir).ok();
    }
}
