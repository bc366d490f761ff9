//! # Simulation Engine Contract
//!
//! Three operations, all speaking the negotiation protocol:
//!
//! ```text
//! starting_config()                     ──► Configuration
//! starting_state(config)                ──► State₀
//! state_step(input, config, stateₙ)     ──► Stateₙ₊₁
//! ```
//!
//! The host never looks inside configuration or state bytes. Everything it
//! learns about them comes from [`Outcome`]s.

use simbridge_core::Outcome;

/// One interchangeable simulation.
///
/// Implementations must be deterministic: identical inputs produce
/// byte-identical outputs. Methods take `&self` because an engine has no
/// mutable context of its own; everything it needs travels in the buffers.
///
/// No thread-safety is promised. Hosts that share an engine across threads
/// serialize the calls themselves.
pub trait SimulationEngine {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Writes the default configuration into `out`.
    fn starting_config(&self, out: &mut [u8]) -> Outcome;

    /// Derives the initial state from `config`.
    ///
    /// Returns [`Outcome::Fatal`] when `config` is not structurally valid
    /// for this engine.
    fn starting_state(&self, config: &[u8], out: &mut [u8]) -> Outcome;

    /// Advances `state` by one step.
    ///
    /// `config` must be the configuration that started the lineage of
    /// `state`; what happens otherwise is up to the engine.
    fn state_step(&self, input: &[u8], config: &[u8], state: &[u8], out: &mut [u8]) -> Outcome;
}

impl<E: SimulationEngine + ?Sized> SimulationEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn starting_config(&self, out: &mut [u8]) -> Outcome {
        (**self).starting_config(out)
    }

    fn starting_state(&self, config: &[u8], out: &mut [u8]) -> Outcome {
        (**self).starting_state(config, out)
    }

    fn state_step(&self, input: &[u8], config: &[u8], state: &[u8], out: &mut [u8]) -> Outcome {
        (**self).state_step(input, config, state, out)
    }
}

impl<E: SimulationEngine + ?Sized> SimulationEngine for &E {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn starting_config(&self, out: &mut [u8]) -> Outcome {
        (**self).starting_config(out)
    }

    fn starting_state(&self, config: &[u8], out: &mut [u8]) -> Outcome {
        (**self).starting_state(config, out)
    }

    fn state_step(&self, input: &[u8], config: &[u8], state: &[u8], out: &mut [u8]) -> Outcome {
        (**self).state_step(input, config, state, out)
    }
}
