//! # Lifecycle Error Types

use std::fmt;

use simbridge_core::ProtocolError;
use thiserror::Error;

/// Where a lineage currently stands.
///
/// ```text
/// NoConfig ──configure──► Configured ──start──► Running{0} ──step──► Running{1} ...
///                                                   │
///                                          fatal ───┴──► Faulted{n} ──restore──► Running{m}
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No configuration yet.
    NoConfig,
    /// Configuration present, no state yet.
    Configured,
    /// A state exists at `step`.
    Running {
        /// Step index of the current state.
        step: u64,
    },
    /// A transition failed fatally; the lineage is unusable.
    Faulted {
        /// Step of the last good state, if one existed.
        step: Option<u64>,
    },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConfig => write!(f, "unconfigured"),
            Self::Configured => write!(f, "configured"),
            Self::Running { step } => write!(f, "running at step {step}"),
            Self::Faulted { step: Some(step) } => write!(f, "faulted after step {step}"),
            Self::Faulted { step: None } => write!(f, "faulted before the first state"),
        }
    }
}

/// The three boundary operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `starting_config`.
    StartingConfig,
    /// `starting_state`.
    StartingState,
    /// `state_step`.
    StateStep,
    /// Installing a retained state or configuration.
    Restore,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartingConfig => "starting_config",
            Self::StartingState => "starting_state",
            Self::StateStep => "state_step",
            Self::Restore => "restore",
        };
        f.write_str(name)
    }
}

/// Errors raised by the lifecycle state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The operation is not allowed in the current phase.
    #[error("cannot run {operation} while {phase}")]
    InvalidTransition {
        /// Operation attempted.
        operation: Operation,
        /// Phase at the time.
        phase: Phase,
    },

    /// The lineage faulted earlier and has not been restored.
    #[error("lineage is {phase}; restore a retained state or reset")]
    Faulted {
        /// The faulted phase.
        phase: Phase,
    },

    /// The boundary call itself failed.
    #[error("{operation} failed: {source}")]
    Protocol {
        /// Operation that failed.
        operation: Operation,
        /// Underlying protocol error.
        #[source]
        source: ProtocolError,
    },
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
