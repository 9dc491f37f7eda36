use std::path::PathBuf;

/// State of one build pass as seen by the hooks
#[derive(Clone, Debug, Default)]
pub struct BuildContext {
    /// number of the pass, starting at 0 and counting watch rebuilds
    pub pass: usize,
    /// files and directories a change of which triggers a rebuild
    pub file_dependencies: Vec<PathBuf>,
}

impl BuildContext {
    pub fn new(pass: usize) -> Self {
        Self {
            pass,
            file_dependencies: Vec::new(),
        }
    }
}
