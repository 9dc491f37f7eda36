use std::path::PathBuf;

use async_trait::async_trait;
use miette::{Context, IntoDiagnostic, Result};
use tokio::fs;

use crate::pipeline::ProcessingStep;

pub struct SaveFile;

pub struct SaveFileParams {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

#[async_trait]
impl ProcessingStep for SaveFile {
    type Input = SaveFileParams;
    type Output = PathBuf;

    #[tracing::instrument(name = "save file", level = "trace", skip_all)]
    async fn process(
        &self,
        SaveFileParams { path, contents }: Self::Input,
    ) -> Result<Self::Output> {
        let result = write_file(&path, contents)
            .await
            .wrap_err_with(|| format!("writing {}", path.display()));

        match result {
            Ok(()) => {
                tracing::info!("{} written", path.display());
                Ok(path)
            }
            Err(e) => {
                tracing::error!("{e:?}");
                Err(e)
            }
        }
    }
}

async fn write_file(path: &std::path::Path, contents: Vec<u8>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await.into_diagnostic()?;
        }
    }

    fs::write(path, contents).await.into_diagnostic()
}
