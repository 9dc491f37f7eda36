mod dir_listing;
mod matcher;

pub use dir_listing::*;
pub use matcher::*;
