use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("parsing hook {path:?}: unrecognized hook version: {version:?}")]
    UnsupportedVersion { path: PathBuf, version: String },
    #[error("parsing hook {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("validating hook {path:?}: {reason}")]
    MalformedDefinition { path: PathBuf, reason: String },
    #[error("reading hook {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reading hook directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("loading hooks cancelled")]
    Cancelled,
    #[error("matching hook {name:?}: {source}")]
    Match {
        name: String,
        #[source]
        source: MatchError,
    },
    #[error("hook {name:?}: unknown stage {stage:?}")]
    UnknownStage { name: String, stage: String },
    #[error("invalid language tag {0:?}")]
    Language(String),
}

/// Failures evaluating a when-predicate against one container.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("command: {0}")]
    Command(#[source] regex::Error),
    #[error("annotation {key:?}: {source}")]
    Annotation {
        key: String,
        #[source]
        source: regex::Error,
    },
    #[error("process.args must have at least one entry")]
    EmptyArgs,
}
