//! Renders a directory of tera templates into html files at the end of a build.

pub mod common;
pub mod config;
pub mod context;
pub mod data;
pub mod host;
pub mod pipeline;
pub mod plugin;
pub mod processors;
pub mod rendering;
pub mod watch;

pub use config::{read_config, Options, OptionsInput};
pub use context::BuildContext;
pub use host::{Build, BuildHook, BuildReport};
pub use plugin::TemplatePlugin;
pub use rendering::TemplateRecord;
