use async_trait::async_trait;
use globset::{Glob, GlobMatcher};
use miette::{Context, IntoDiagnostic, Result};
use regex::Regex;

use crate::{config::TestPattern, pipeline::ProcessingStep};

/// A test pattern ready for matching
#[derive(Clone, Debug)]
pub enum FileMatcher {
    Glob(GlobMatcher),
    Regex(Regex),
}

impl FileMatcher {
    pub fn compile(pattern: &TestPattern) -> Result<Self> {
        match pattern {
            TestPattern::Glob(glob) => Ok(Self::Glob(
                Glob::new(glob)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("invalid test glob `{glob}`"))?
                    .compile_matcher(),
            )),
            TestPattern::Regex { regex } => Ok(Self::Regex(
                Regex::new(regex)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("invalid test regex `{regex}`"))?,
            )),
        }
    }

    pub fn is_match(&self, name: &str) -> bool {
        match self {
            Self::Glob(glob) => glob.is_match(name),
            Self::Regex(regex) => regex.is_match(name),
        }
    }
}

/// Keeps the names the matcher accepts, in their original order
pub fn match_files(matcher: &FileMatcher, files: Vec<String>) -> Vec<String> {
    files.into_iter().filter(|f| matcher.is_match(f)).collect()
}

pub struct MatchFiles {
    pattern: TestPattern,
}

impl MatchFiles {
    pub fn new(pattern: TestPattern) -> Self {
        Self { pattern }
    }
}

#[async_trait]
impl ProcessingStep for MatchFiles {
    type Input = Vec<String>;
    type Output = Vec<String>;

    #[tracing::instrument(name = "match files", level = "trace", skip_all)]
    async fn process(&self, files: Self::Input) -> Result<Self::Output> {
        let matcher = FileMatcher::compile(&self.pattern)?;
        let matched = match_files(&matcher, files);
        tracing::debug!("matched {matched:?}");

        Ok(matched)
    }
}
