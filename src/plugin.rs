use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use miette::Result;

use crate::{
    config::Options,
    context::BuildContext,
    data::{list_files, ListDir, MatchFiles},
    host::BuildHook,
    pipeline::{
        IntoPipeline, ProcessingPipeline, ProcessingStep, ProcessingStepChain,
        ProcessingStepParallel,
    },
    rendering::{find_partials, TemplateRenderer, WriteTemplates},
};

/// Renders the templates of the context directory after every build
#[derive(Clone, Debug)]
pub struct TemplatePlugin {
    options: Arc<Options>,
}

impl TemplatePlugin {
    pub fn new(options: Options) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// listing -> matcher -> renderer -> writer
    async fn pipeline(&self) -> Result<ProcessingPipeline<PathBuf, Vec<PathBuf>>> {
        let options = &self.options;
        let renderer = TemplateRenderer::load(options).await?;

        Ok(ListDir {
            recursive: options.recursive,
        }
        .chain(MatchFiles::new(options.test.clone()))
        .chain(renderer.parallel())
        .chain(WriteTemplates {
            out_dir: options.output.to_owned(),
            suffix: options.suffix.clone(),
            on_write_error: options.on_write_error,
        })
        .into_pipeline())
    }

    async fn dependencies(&self) -> Result<Vec<PathBuf>> {
        let context = &self.options.context;
        let mut names = list_files(context, self.options.recursive).await?;
        names.extend(find_partials(context, &self.options.include).await?);
        names.sort();
        names.dedup();

        Ok(names.into_iter().map(|n| context.join(n)).collect())
    }
}

#[async_trait]
impl BuildHook for TemplatePlugin {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn on_prepare(&self, _ctx: &BuildContext) -> Result<Vec<PathBuf>> {
        let mut paths = vec![self.options.context.to_owned()];

        match self.dependencies().await {
            Ok(files) => paths.extend(files),
            Err(e) => tracing::warn!("could not list template dependencies: {e:?}"),
        }

        Ok(paths)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn on_finalize(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>> {
        let written = self
            .pipeline()
            .await?
            .process(self.options.context.to_owned())
            .await?;
        tracing::debug!("pass {} wrote {} files", ctx.pass, written.len());

        Ok(written)
    }
}
