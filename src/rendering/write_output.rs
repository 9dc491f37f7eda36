use std::path::PathBuf;

use async_trait::async_trait;
use futures::future;
use miette::Result;

use crate::{
    common::{SaveFile, SaveFileParams},
    config::{Suffixes, WriteFailurePolicy},
    pipeline::ProcessingStep,
};

use super::TemplateRecord;

/// Replaces the first occurrence of the source suffix in `name`.
/// Names without it are returned unchanged.
pub fn output_file_name(name: &str, suffix: &Suffixes) -> String {
    if suffix.source.is_empty() {
        return name.to_owned();
    }
    name.replacen(&suffix.source, &suffix.target, 1)
}

/// Writes rendered templates below the output directory
pub struct WriteTemplates {
    pub out_dir: PathBuf,
    pub suffix: Suffixes,
    pub on_write_error: WriteFailurePolicy,
}

#[async_trait]
impl ProcessingStep for WriteTemplates {
    type Input = Vec<TemplateRecord>;
    type Output = Vec<PathBuf>;

    #[tracing::instrument(name = "write templates", level = "trace", skip_all)]
    async fn process(&self, records: Self::Input) -> Result<Self::Output> {
        let save = SaveFile;
        let writes = records.into_iter().map(|TemplateRecord { name, html }| {
            save.process(SaveFileParams {
                path: self.out_dir.join(output_file_name(&name, &self.suffix)),
                contents: html.into_bytes(),
            })
        });
        let results = future::join_all(writes).await;

        let mut written = Vec::with_capacity(results.len());
        let mut first_error = None;

        for res in results {
            match res {
                Ok(path) => written.push(path),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(_) => {}
            }
        }

        match (first_error, self.on_write_error) {
            (Some(e), WriteFailurePolicy::Fail) => Err(e),
            _ => Ok(written),
        }
    }
}
