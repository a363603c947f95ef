use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Anything here aborts the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("posts directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("no posts loaded from {}", .0.display())]
    NoPosts(PathBuf),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid exclude pattern: {0}")]
    InvalidGlob(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single post file was left out of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("unreadable: {0}")]
    Unreadable(String),

    #[error("no frontmatter block")]
    MissingFrontmatter,

    #[error("frontmatter is not terminated")]
    UnterminatedFrontmatter,

    #[error("invalid YAML: {0}")]
    InvalidYaml(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}
