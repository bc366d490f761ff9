//! # Simulation Lifecycle
//!
//! Drives one engine through config → initial state → successive states.
//!
//! Each transition runs under the [`Negotiator`], so growth requests are
//! absorbed transparently. A fatal failure marks the lineage as faulted:
//! stepping stops until the host restores a state it retained earlier or
//! resets back to no configuration.
//!
//! All calls share one scratch buffer. Once the engine grew it for the
//! largest state it has produced, later steps fit on the first attempt.

use simbridge_core::{ByteBuffer, NegotiationLimits, NegotiationStats, Negotiator};

use crate::engine::SimulationEngine;
use crate::error::{LifecycleError, LifecycleResult, Operation, Phase};
use crate::payload::{Configuration, State};

/// State machine around a single engine.
pub struct Lifecycle<E> {
    engine: E,
    negotiator: Negotiator,
    scratch: ByteBuffer,
    config: Option<Configuration>,
    state: Option<State>,
    phase: Phase,
}

impl<E: SimulationEngine> Lifecycle<E> {
    /// Creates an unconfigured lifecycle.
    #[must_use]
    pub fn new(engine: E, limits: NegotiationLimits) -> Self {
        let negotiator = Negotiator::new(limits);
        let scratch = negotiator.buffer();
        Self {
            engine,
            negotiator,
            scratch,
            config: None,
            state: None,
            phase: Phase::NoConfig,
        }
    }

    /// Returns the engine.
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the current phase.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> Option<&Configuration> {
        self.config.as_ref()
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    /// Returns negotiation statistics for every call made so far.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> NegotiationStats {
        self.negotiator.stats()
    }

    /// Asks the engine for its default configuration.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless unconfigured; `Protocol` if the call fails.
    /// A failed call leaves the lifecycle unconfigured.
    pub fn configure(&mut self) -> LifecycleResult<&Configuration> {
        self.require_phase(Operation::StartingConfig, Phase::NoConfig)?;

        let engine = &self.engine;
        let len = self
            .negotiator
            .negotiate(&mut self.scratch, |out| engine.starting_config(out))
            .map_err(|source| {
                tracing::warn!(engine = engine.name(), %source, "starting_config failed");
                LifecycleError::Protocol {
                    operation: Operation::StartingConfig,
                    source,
                }
            })?;

        tracing::info!(engine = self.engine.name(), bytes = len, "configuration produced");
        self.phase = Phase::Configured;
        Ok(&*self.config.insert(Configuration::new(self.scratch.to_payload())))
    }

    /// Installs a configuration the host kept from an earlier run.
    ///
    /// The engine is not consulted; an invalid configuration surfaces as a
    /// fatal `starting_state`.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless unconfigured.
    pub fn adopt_config(&mut self, config: Configuration) -> LifecycleResult<()> {
        self.require_phase(Operation::Restore, Phase::NoConfig)?;
        tracing::info!(engine = self.engine.name(), bytes = config.len(), "configuration adopted");
        self.config = Some(config);
        self.phase = Phase::Configured;
        Ok(())
    }

    /// Derives the initial state from the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless configured; `Protocol` if the call fails,
    /// which also faults the lifecycle.
    pub fn start(&mut self) -> LifecycleResult<&State> {
        self.require_phase(Operation::StartingState, Phase::Configured)?;
        let Some(config) = self.config.as_ref() else {
            return Err(self.invalid(Operation::StartingState));
        };

        let engine = &self.engine;
        let result = self
            .negotiator
            .negotiate(&mut self.scratch, |out| engine.starting_state(config.as_bytes(), out));

        match result {
            Ok(len) => {
                tracing::info!(engine = self.engine.name(), bytes = len, "initial state derived");
                self.phase = Phase::Running { step: 0 };
                Ok(&*self.state.insert(State::new(0, self.scratch.to_payload())))
            }
            Err(source) => Err(self.fault(Operation::StartingState, source)),
        }
    }

    /// Advances the current state by one step with `input`.
    ///
    /// # Errors
    ///
    /// `Faulted` after an earlier fatal failure, `InvalidTransition` when no
    /// state exists, `Protocol` if this step fails (which faults the
    /// lifecycle).
    pub fn step(&mut self, input: &[u8]) -> LifecycleResult<&State> {
        let step = match self.phase {
            Phase::Running { step } => step,
            Phase::Faulted { .. } => return Err(LifecycleError::Faulted { phase: self.phase }),
            Phase::NoConfig | Phase::Configured => {
                return Err(self.invalid(Operation::StateStep));
            }
        };
        let (Some(config), Some(state)) = (self.config.as_ref(), self.state.as_ref()) else {
            return Err(self.invalid(Operation::StateStep));
        };

        let engine = &self.engine;
        let result = self.negotiator.negotiate(&mut self.scratch, |out| {
            engine.state_step(input, config.as_bytes(), state.as_bytes(), out)
        });

        match result {
            Ok(len) => {
                let next = step.wrapping_add(1);
                tracing::trace!(step = next, bytes = len, "state advanced");
                self.phase = Phase::Running { step: next };
                Ok(&*self.state.insert(State::new(next, self.scratch.to_payload())))
            }
            Err(source) => Err(self.fault(Operation::StateStep, source)),
        }
    }

    /// Resumes the lineage from a state retained earlier.
    ///
    /// Works while configured, running or faulted; the state must come from
    /// the same configuration.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` when unconfigured.
    pub fn restore(&mut self, state: State) -> LifecycleResult<()> {
        if self.config.is_none() {
            return Err(self.invalid(Operation::Restore));
        }
        tracing::info!(
            engine = self.engine.name(),
            step = state.step(),
            from = %self.phase,
            "lineage restored"
        );
        self.phase = Phase::Running { step: state.step() };
        self.state = Some(state);
        Ok(())
    }

    /// Drops configuration and state.
    pub fn reset(&mut self) {
        tracing::info!(engine = self.engine.name(), from = %self.phase, "lifecycle reset");
        self.config = None;
        self.state = None;
        self.scratch.clear();
        self.phase = Phase::NoConfig;
    }

    fn require_phase(&self, operation: Operation, expected: Phase) -> LifecycleResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: Operation) -> LifecycleError {
        LifecycleError::InvalidTransition {
            operation,
            phase: self.phase,
        }
    }

    fn fault(&mut self, operation: Operation, source: simbridge_core::ProtocolError) -> LifecycleError {
        let last_good = self.state.as_ref().map(State::step);
        tracing::warn!(
            engine = self.engine.name(),
            %operation,
            %source,
            last_good,
            "lineage faulted"
        );
        self.phase = Phase::Faulted { step: last_good };
        LifecycleError::Protocol { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockEngine, MOCK_CONFIG};
    use simbridge_core::{Delivery, ProtocolError};

    fn lifecycle(engine: MockEngine) -> Lifecycle<MockEngine> {
        Lifecycle::new(
            engine,
            NegotiationLimits {
                initial_capacity: 0,
                max_capacity: 4096,
            },
        )
    }

    #[test]
    fn test_full_lineage() {
        let mut lc = lifecycle(MockEngine::default());
        assert_eq!(lc.phase(), Phase::NoConfig);

        assert_eq!(lc.configure().unwrap().as_bytes(), MOCK_CONFIG);
        assert_eq!(lc.phase(), Phase::Configured);

        assert_eq!(lc.start().unwrap().step(), 0);
        for expected in 1..=5 {
            assert_eq!(lc.step(&[1]).unwrap().step(), expected);
        }
        assert_eq!(lc.phase(), Phase::Running { step: 5 });
        assert_eq!(MockEngine::total(lc.state().unwrap().as_bytes()), Some(5));
    }

    #[test]
    fn test_out_of_order_calls_are_rejected() {
        let mut lc = lifecycle(MockEngine::default());
        assert!(matches!(
            lc.step(&[]),
            Err(LifecycleError::InvalidTransition { operation: Operation::StateStep, .. })
        ));
        assert!(matches!(
            lc.start(),
            Err(LifecycleError::InvalidTransition { .. })
        ));
        lc.configure().unwrap();
        assert!(matches!(
            lc.configure(),
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_fault_blocks_stepping_until_restore() {
        let mut lc = lifecycle(MockEngine {
            fail_at_step: Some(3),
            ..MockEngine::default()
        });
        lc.configure().unwrap();
        lc.start().unwrap();
        lc.step(&[]).unwrap();
        let retained = lc.step(&[]).unwrap().clone();

        let err = lc.step(&[]).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::Protocol {
                operation: Operation::StateStep,
                source: ProtocolError::Fatal
            }
        );
        assert_eq!(lc.phase(), Phase::Faulted { step: Some(2) });
        assert!(matches!(lc.step(&[]), Err(LifecycleError::Faulted { .. })));

        lc.restore(retained).unwrap();
        assert_eq!(lc.phase(), Phase::Running { step: 2 });
    }

    #[test]
    fn test_adopted_config_that_engine_rejects_faults_start() {
        let mut lc = lifecycle(MockEngine::default());
        lc.adopt_config(Configuration::new(b"garbage".to_vec())).unwrap();
        assert!(lc.start().is_err());
        assert_eq!(lc.phase(), Phase::Faulted { step: None });

        lc.reset();
        assert_eq!(lc.phase(), Phase::NoConfig);
        assert!(lc.config().is_none());
    }

    #[test]
    fn test_announce_delivery_is_retried_transparently() {
        let mut lc = lifecycle(MockEngine {
            delivery: Delivery::Announce,
            ..MockEngine::default()
        });
        lc.configure().unwrap();
        lc.start().unwrap();
        lc.step(&[2]).unwrap();
        assert!(lc.stats().growth_retries >= 1);
        assert_eq!(lc.stats().failures, 0);
    }
}
