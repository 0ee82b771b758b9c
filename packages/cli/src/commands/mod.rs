pub mod check;
pub mod normalize;
pub mod types;

pub use check::{check, CheckArgs};
pub use normalize::{normalize, NormalizeArgs};
pub use types::{types, TypesArgs};

use crate::config::Config;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Posts to process: the given file, every post under the given directory,
/// or the configured source directory
pub(crate) fn collect_posts(input: Option<&Path>, config: &Config, cwd: &str) -> Result<Vec<PathBuf>> {
    let root = match input {
        Some(path) => path.to_path_buf(),
        None => config.get_src_dir(cwd),
    };

    if root.is_file() {
        return Ok(vec![root]);
    }
    if !root.is_dir() {
        return Err(anyhow::anyhow!("Input path does not exist: {}", root.display()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(&root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|e| e == config.extension.as_str())
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
