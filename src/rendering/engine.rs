use std::path::Path;

use futures::future;
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::{Context, IntoDiagnostic, Result};
use tera::Tera;
use tokio::fs;

use crate::{data::list_files, processors};

/// Builds the template engine with every partial below `context_dir` registered
/// under its `/`-joined path relative to that directory
#[tracing::instrument(level = "trace")]
pub async fn load_engine(context_dir: &Path, include: &[String]) -> Result<Tera> {
    let partials = find_partials(context_dir, include).await?;
    tracing::debug!("partials = {partials:?}");

    let sources = future::join_all(partials.iter().map(|name| async move {
        fs::read_to_string(context_dir.join(name))
            .await
            .into_diagnostic()
            .wrap_err_with(|| format!("reading partial {name}"))
    }))
    .await
    .into_iter()
    .collect::<Result<Vec<_>>>()?;

    let mut tera = Tera::default();
    processors::register_all(&mut tera);
    tera.add_raw_templates(partials.iter().zip(sources.iter()))
        .into_diagnostic()
        .wrap_err("compiling partials")?;

    Ok(tera)
}

/// Names of all files below `context_dir` matching one of the include globs
#[tracing::instrument(level = "trace")]
pub async fn find_partials(context_dir: &Path, include: &[String]) -> Result<Vec<String>> {
    if include.is_empty() {
        return Ok(Vec::new());
    }
    let include_set = build_glob_set(include)?;
    let names = list_files(context_dir, true).await?;

    Ok(names
        .into_iter()
        .filter(|name| include_set.is_match(name))
        .collect())
}

fn build_glob_set(globs: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for glob in globs {
        builder.add(
            Glob::new(glob)
                .into_diagnostic()
                .wrap_err_with(|| format!("invalid include glob `{glob}`"))?,
        );
    }

    builder.build().into_diagnostic()
}
