use std::path::{Path, PathBuf};

use async_trait::async_trait;
use async_walkdir::WalkDir;
use futures::StreamExt;
use miette::{Context, IntoDiagnostic, Result};
use tokio::fs;

use crate::pipeline::ProcessingStep;

/// Lists the regular files of a directory as names relative to it
pub struct ListDir {
    pub recursive: bool,
}

#[async_trait]
impl ProcessingStep for ListDir {
    type Input = PathBuf;
    type Output = Vec<String>;

    #[tracing::instrument(name = "list dir", level = "trace", skip(self))]
    async fn process(&self, dir: Self::Input) -> Result<Self::Output> {
        list_files(&dir, self.recursive)
            .await
            .wrap_err_with(|| format!("listing {}", dir.display()))
    }
}

/// Returns the sorted names of all files in `dir`.
/// Names of nested files are joined with `/`.
pub async fn list_files(dir: &Path, recursive: bool) -> Result<Vec<String>> {
    let mut names = if recursive {
        walk_files(dir).await?
    } else {
        read_files(dir).await?
    };
    names.sort();

    Ok(names)
}

async fn read_files(dir: &Path) -> Result<Vec<String>> {
    let mut read_dir = fs::read_dir(dir).await.into_diagnostic()?;
    let mut names = Vec::new();

    while let Some(entry) = read_dir.next_entry().await.into_diagnostic()? {
        if entry.file_type().await.into_diagnostic()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    Ok(names)
}

async fn walk_files(dir: &Path) -> Result<Vec<String>> {
    // the walker silently yields nothing for a missing root
    fs::metadata(dir).await.into_diagnostic()?;

    let mut entries = WalkDir::new(dir);
    let mut names = Vec::new();

    while let Some(res) = entries.next().await {
        let entry_path = res.into_diagnostic()?.path();

        if entry_path.is_file() {
            let rel_path = entry_path.strip_prefix(dir).into_diagnostic()?;
            names.push(relative_name(rel_path));
        }
    }

    Ok(names)
}

fn relative_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
