use std::path::PathBuf;

use async_trait::async_trait;
use miette::{Context, IntoDiagnostic, Result};
use tera::{Context as TeraContext, Tera};
use tokio::fs;

use crate::{config::Options, pipeline::ProcessingStep};

mod engine;
mod write_output;

pub use engine::*;
pub use write_output::*;

/// Directory prefix of the names templates are compiled under.
/// It shows up in engine diagnostics.
const LOGICAL_TEMPLATE_DIR: &str = "src/templates";

/// A rendered template and the name of the file it came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateRecord {
    pub name: String,
    pub html: String,
}

/// Renders files of the context directory with the configured data
pub struct TemplateRenderer {
    context_dir: PathBuf,
    engine: Tera,
    data: TeraContext,
}

impl TemplateRenderer {
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn load(options: &Options) -> Result<Self> {
        let engine = load_engine(&options.context, &options.include).await?;
        let data = TeraContext::from_serialize(&options.data)
            .into_diagnostic()
            .wrap_err("converting template data")?;

        Ok(Self {
            context_dir: options.context.to_owned(),
            engine,
            data,
        })
    }

    /// Compiles and renders the file `name` relative to the context directory
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn render(&self, name: &str) -> Result<String> {
        let path = self.context_dir.join(name);
        let contents = fs::read_to_string(&path)
            .await
            .into_diagnostic()
            .wrap_err_with(|| format!("reading template {}", path.display()))?;
        let logical_name = format!("{LOGICAL_TEMPLATE_DIR}/{name}");

        let mut tera = self.engine.clone();
        tera.add_raw_template(&logical_name, &contents)
            .into_diagnostic()
            .wrap_err_with(|| format!("compiling {name}"))?;

        tera.render(&logical_name, &self.data)
            .into_diagnostic()
            .wrap_err_with(|| format!("rendering {name}"))
    }
}

#[async_trait]
impl ProcessingStep for TemplateRenderer {
    type Input = String;
    type Output = TemplateRecord;

    #[tracing::instrument(name = "render template", level = "trace", skip(self))]
    async fn process(&self, name: Self::Input) -> Result<Self::Output> {
        let html = self.render(&name).await?;

        Ok(TemplateRecord { name, html })
    }
}
