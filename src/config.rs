use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;
use tokio::fs;

pub const CONFIG_FILE_NAME: &str = "prerender.toml";

const DEFAULT_CONTEXT: &str = "templates";
const DEFAULT_OUTPUT: &str = "public";
const DEFAULT_SOURCE_SUFFIX: &str = ".tera";
const DEFAULT_TARGET_SUFFIX: &str = ".html";

/// Every shape the plugin options may be given in.
/// A bare array is shorthand for `{ include = [...] }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum OptionsInput {
    Includes(Vec<String>),
    Table(RawOptions),
}

impl From<Vec<String>> for OptionsInput {
    fn from(includes: Vec<String>) -> Self {
        Self::Includes(includes)
    }
}

impl From<RawOptions> for OptionsInput {
    fn from(raw: RawOptions) -> Self {
        Self::Table(raw)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOptions {
    pub context: Option<PathBuf>,
    pub test: Option<TestPattern>,
    pub data: Option<toml::Table>,
    pub output: Option<PathBuf>,
    pub include: Option<OneOrMany<String>>,
    #[serde(default)]
    pub recursive: bool,
    pub suffix: Option<Suffixes>,
    pub on_write_error: Option<WriteFailurePolicy>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Pattern a filename has to satisfy to be rendered
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TestPattern {
    /// matched against the whole filename
    Glob(String),
    /// searched for anywhere in the filename
    Regex { regex: String },
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawSuffixes")]
pub struct Suffixes {
    pub source: String,
    pub target: String,
}

#[derive(Deserialize)]
struct RawSuffixes {
    source: String,
    target: String,
}

impl TryFrom<RawSuffixes> for Suffixes {
    type Error = String;

    fn try_from(RawSuffixes { source, target }: RawSuffixes) -> Result<Self, Self::Error> {
        if source.is_empty() {
            return Err("suffix.source must not be empty".into());
        }

        Ok(Self { source, target })
    }
}

impl Default for Suffixes {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_SUFFIX.into(),
            target: DEFAULT_TARGET_SUFFIX.into(),
        }
    }
}

/// What happens to the pass when writing a rendered file fails
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WriteFailurePolicy {
    /// log every failure and fail the pass with the first one
    #[default]
    Fail,
    /// log the failure and carry on
    Log,
}

/// Normalized plugin options
#[derive(Clone, Debug)]
pub struct Options {
    pub context: PathBuf,
    pub test: TestPattern,
    pub data: toml::Table,
    pub output: PathBuf,
    pub include: Vec<String>,
    pub recursive: bool,
    pub suffix: Suffixes,
    pub on_write_error: WriteFailurePolicy,
}

impl From<OptionsInput> for Options {
    fn from(input: OptionsInput) -> Self {
        let raw = match input {
            OptionsInput::Includes(include) => RawOptions {
                include: Some(OneOrMany::Many(include)),
                ..Default::default()
            },
            OptionsInput::Table(raw) => raw,
        };
        let suffix = raw.suffix.unwrap_or_default();

        Self {
            context: raw.context.unwrap_or(DEFAULT_CONTEXT.into()),
            test: raw
                .test
                .unwrap_or_else(|| TestPattern::Glob(format!("*{}", suffix.source))),
            data: raw.data.unwrap_or_default(),
            output: raw.output.unwrap_or(DEFAULT_OUTPUT.into()),
            include: raw.include.map(Vec::from).unwrap_or_default(),
            recursive: raw.recursive,
            suffix,
            on_write_error: raw.on_write_error.unwrap_or_default(),
        }
    }
}

impl Options {
    /// Resolves relative context and output directories against `base_dir`
    pub fn with_base_dir(mut self, base_dir: &Path) -> Self {
        self.context = base_dir.join(&self.context);
        self.output = base_dir.join(&self.output);

        self
    }
}

/// Reads and normalizes the options file in the given project directory
#[tracing::instrument(level = "trace")]
pub async fn read_config(dir: &Path) -> Result<Options> {
    let path = dir.join(CONFIG_FILE_NAME);
    let cfg_string = fs::read_to_string(&path)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("reading config file {}", path.display()))?;
    let input: OptionsInput = toml::from_str(&cfg_string)
        .into_diagnostic()
        .wrap_err_with(|| format!("parsing config file {}", path.display()))?;

    Ok(Options::from(input).with_base_dir(dir))
}
