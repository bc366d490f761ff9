//! # Host Error Types

use std::io;
use std::path::PathBuf;

use simbridge_engine::LifecycleError;
use simbridge_sims::InterpretError;
use thiserror::Error;

/// Result type for session operations.
pub type HostResult<T> = Result<T, HostError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for replay files.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Problems with the host configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The TOML did not parse.
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Problems reading, writing or verifying a replay.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Filesystem failure.
    #[error("replay I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The file does not start with the replay magic.
    #[error("not a replay file")]
    BadMagic,

    /// Written by a newer format.
    #[error("unsupported replay version {0}")]
    UnsupportedVersion(u32),

    /// Stored and computed checksums differ.
    #[error("replay checksum mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    ChecksumMismatch {
        /// Checksum in the file.
        stored: u32,
        /// Checksum of the body as read.
        computed: u32,
    },

    /// The body did not decompress or decode.
    #[error("replay body is corrupt: {0}")]
    Corrupt(String),

    /// The engine named in the replay is unknown.
    #[error(transparent)]
    UnknownEngine(#[from] simbridge_sims::UnknownEngine),

    /// Re-running the lineage failed.
    #[error("replay lineage failed: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Re-running the lineage produced a different final state.
    #[error("replay diverged: expected fingerprint {expected:#018x}, got {actual:#018x}")]
    Diverged {
        /// Fingerprint recorded in the file.
        expected: u64,
        /// Fingerprint of the re-run.
        actual: u64,
    },
}

/// Everything a host session can fail with.
#[derive(Error, Debug)]
pub enum HostError {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Engine lifecycle failure.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// A state could not be drawn.
    #[error("cannot draw frame: {0}")]
    Interpret(#[from] InterpretError),

    /// Replay problem.
    #[error(transparent)]
    Replay(#[from] ReplayError),

    /// Recovery was requested but no state is retained.
    #[error("no retained state to recover from")]
    NothingRetained,

    /// Recovery was requested for a healthy lineage.
    #[error("lineage is not faulted")]
    NotFaulted,
}
