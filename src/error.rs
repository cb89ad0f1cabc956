use thiserror::Error;

/// Failures surfaced by the session plumbing. Scanning, rewriting and cache
/// maintenance never produce these; they degrade to "no result" instead.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid plugin configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to watch {dir}: {source}")]
    Watch {
        dir: String,
        #[source]
        source: notify::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the refactor edit computation. These abort one edit request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefactorError {
    #[error("Assertion error: {0}")]
    Assertion(&'static str),

    #[error("Module declaration must have exactly two expressions.")]
    ArgumentCount,

    #[error("failed to parse {0}")]
    Parse(String),

    #[error("no top-level statement at the requested position")]
    NoStatement,

    #[error("Unknown action {0}")]
    UnknownAction(String),
}
