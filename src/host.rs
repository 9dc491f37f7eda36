use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use miette::Result;

use crate::context::BuildContext;

/// The two phases a plugin takes part in during a build pass
#[async_trait]
pub trait BuildHook: Send + Sync {
    /// Runs before anything is emitted.
    /// Returns the paths the host should watch for changes.
    async fn on_prepare(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>>;

    /// Runs once the build emitted its output.
    /// Returns the files written by the hook.
    async fn on_finalize(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub file_dependencies: Vec<PathBuf>,
    pub written: Vec<PathBuf>,
}

/// Runs registered hooks in registration order
#[derive(Clone, Default)]
pub struct Build {
    hooks: Vec<Arc<dyn BuildHook>>,
}

impl Build {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook<H: BuildHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    #[tracing::instrument(level = "trace", skip_all, fields(pass = ctx.pass))]
    pub async fn prepare(&self, ctx: &mut BuildContext) -> Result<()> {
        for hook in &self.hooks {
            let paths = hook.on_prepare(ctx).await?;
            ctx.file_dependencies.extend(paths);
        }

        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all, fields(pass = ctx.pass))]
    pub async fn finalize(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        for hook in &self.hooks {
            written.extend(hook.on_finalize(ctx).await?);
        }

        Ok(written)
    }

    /// Runs a single pass: every prepare phase, then every finalize phase
    pub async fn run(&self) -> Result<BuildReport> {
        let mut ctx = BuildContext::new(0);
        self.prepare(&mut ctx).await?;
        let written = self.finalize(&ctx).await?;

        Ok(BuildReport {
            file_dependencies: ctx.file_dependencies,
            written,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl BuildHook for Recorder {
        async fn on_prepare(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>> {
            self.log.lock().unwrap().push(format!(
                "prepare {} after {}",
                self.name,
                ctx.file_dependencies.len()
            ));
            Ok(vec![PathBuf::from(self.name)])
        }

        async fn on_finalize(&self, _ctx: &BuildContext) -> Result<Vec<PathBuf>> {
            self.log
                .lock()
                .unwrap()
                .push(format!("finalize {}", self.name));
            Ok(vec![PathBuf::from(format!("{}.html", self.name))])
        }
    }

    #[tokio::test]
    async fn runs_all_prepares_before_finalizes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let report = Build::new()
            .with_hook(Recorder {
                name: "a",
                log: log.clone(),
            })
            .with_hook(Recorder {
                name: "b",
                log: log.clone(),
            })
            .run()
            .await
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["prepare a after 0", "prepare b after 1", "finalize a", "finalize b"]
        );
        assert_eq!(
            report,
            BuildReport {
                file_dependencies: vec!["a".into(), "b".into()],
                written: vec!["a.html".into(), "b.html".into()],
            }
        );
    }
}
