//! # Session
//!
//! Drives one lineage from configuration to the last requested step:
//!
//! ```text
//! boot ──► advance ──► advance ──► ... ──► (fault) ──► recover ──► advance
//!            │            │
//!            ▼            ▼
//!       history.push  interpreter.draw(sink)
//! ```
//!
//! Every produced state is retained in a bounded [`StateHistory`]. After a
//! fatal step, [`Session::recover`] resumes from the newest retained state.

use simbridge_core::{NegotiationLimits, NegotiationStats};
use simbridge_engine::{Lifecycle, Phase, SimulationEngine, State};
use simbridge_render::RenderSink;
use simbridge_sims::{EngineKind, FrameSummary, SimulationPlugin, StateInterpreter};

use crate::config::{HostConfig, InputConfig};
use crate::error::{HostError, HostResult};
use crate::history::StateHistory;
use crate::input::{InputSource, ScriptedInput, SilentInput};
use crate::replay::Replay;

/// Totals for a [`Session::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Steps completed by this run.
    pub steps: u64,
    /// Summary of the last drawn frame.
    pub last_frame: FrameSummary,
}

/// A host session over one engine.
pub struct Session {
    kind: EngineKind,
    lifecycle: Lifecycle<Box<dyn SimulationEngine>>,
    interpreter: Box<dyn StateInterpreter>,
    history: StateHistory,
    input: Box<dyn InputSource>,
    replay: Option<Replay>,
    recording: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("kind", &self.kind)
            .field("phase", &self.lifecycle.phase())
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Builds a session from host settings.
    ///
    /// Recording is enabled when `config.replay` is set.
    ///
    /// # Errors
    ///
    /// `Config` if the input script does not decode.
    pub fn from_config(config: &HostConfig) -> HostResult<Self> {
        let input: Box<dyn InputSource> = match &config.input {
            InputConfig::Silent => Box::new(SilentInput),
            scripted @ InputConfig::Scripted { .. } => {
                Box::new(ScriptedInput::new(scripted.decode_frames()?))
            }
        };
        let mut session = Self::new(
            config.engine.build(),
            config.negotiation.into(),
            config.history_depth,
            input,
        );
        session.recording = config.replay.is_some();
        Ok(session)
    }

    /// Builds a session around an already constructed plugin.
    #[must_use]
    pub fn new(
        plugin: SimulationPlugin,
        limits: NegotiationLimits,
        history_depth: usize,
        input: Box<dyn InputSource>,
    ) -> Self {
        Self {
            kind: plugin.kind,
            lifecycle: Lifecycle::new(plugin.engine, limits),
            interpreter: plugin.interpreter,
            history: StateHistory::new(history_depth),
            input,
            replay: None,
            recording: false,
        }
    }

    /// Engine in use.
    #[must_use]
    pub const fn kind(&self) -> EngineKind {
        self.kind
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    /// Current state, if any.
    #[must_use]
    pub fn state(&self) -> Option<&State> {
        self.lifecycle.state()
    }

    /// Retained states.
    #[must_use]
    pub const fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Negotiation counters.
    #[must_use]
    pub fn stats(&self) -> NegotiationStats {
        self.lifecycle.stats()
    }

    /// Replay recorded so far.
    #[must_use]
    pub fn replay(&self) -> Option<&Replay> {
        self.replay.as_ref()
    }

    /// Obtains the default configuration and derives the initial state.
    ///
    /// Booting again discards the previous lineage.
    ///
    /// # Errors
    ///
    /// `Lifecycle` if either call fails.
    pub fn boot(&mut self) -> HostResult<()> {
        self.lifecycle.reset();
        self.history.clear();
        self.replay = None;

        self.lifecycle.configure()?;
        let initial = self.lifecycle.start()?.clone();
        if self.recording {
            let config = self
                .lifecycle
                .config()
                .map(|c| c.as_bytes().to_vec())
                .unwrap_or_default();
            self.replay = Some(Replay::new(self.kind, config, initial.as_bytes()));
        }
        tracing::info!(engine = %self.kind, bytes = initial.len(), "session booted");
        self.history.push(initial);
        Ok(())
    }

    /// Runs one step and draws the resulting state on `sink`.
    ///
    /// # Errors
    ///
    /// `Lifecycle` if the step fails (the lineage is then faulted),
    /// `Interpret` if the new state cannot be drawn. A state that fails to
    /// draw is still retained and recorded.
    pub fn advance(&mut self, sink: &mut dyn RenderSink) -> HostResult<FrameSummary> {
        let next_step = match self.lifecycle.phase() {
            Phase::Running { step } => step.wrapping_add(1),
            _ => 0,
        };
        let input = self.input.next_input(next_step);
        let state = self.lifecycle.step(&input)?.clone();
        if let Some(replay) = self.replay.as_mut() {
            replay.record(input, state.as_bytes());
        }
        self.history.push(state);
        let summary = self.draw(sink)?;
        tracing::debug!(
            step = summary.step,
            population = summary.population,
            primitives = summary.primitives,
            "frame drawn"
        );
        Ok(summary)
    }

    /// Draws the current state without stepping.
    ///
    /// # Errors
    ///
    /// `Interpret` if the state cannot be drawn; `NothingRetained` if there
    /// is no state yet.
    pub fn draw(&self, sink: &mut dyn RenderSink) -> HostResult<FrameSummary> {
        let state = self.lifecycle.state().ok_or(HostError::NothingRetained)?;
        self.draw_state(state, sink)
    }

    fn draw_state(&self, state: &State, sink: &mut dyn RenderSink) -> HostResult<FrameSummary> {
        let config = self
            .lifecycle
            .config()
            .ok_or(HostError::NothingRetained)?;
        Ok(self
            .interpreter
            .draw(config.as_bytes(), state.as_bytes(), sink)?)
    }

    /// Advances `steps` times, drawing each frame.
    ///
    /// Stops at the first failure.
    ///
    /// # Errors
    ///
    /// As [`Self::advance`].
    pub fn run(&mut self, steps: u64, sink: &mut dyn RenderSink) -> HostResult<RunSummary> {
        let span = tracing::info_span!("run", engine = %self.kind, steps);
        let _guard = span.enter();

        let mut summary = RunSummary::default();
        for _ in 0..steps {
            summary.last_frame = self.advance(sink)?;
            summary.steps += 1;
        }
        let stats = self.stats();
        tracing::info!(
            completed = summary.steps,
            calls = stats.calls,
            growth_retries = stats.growth_retries,
            bytes = stats.bytes_delivered,
            "run finished"
        );
        Ok(summary)
    }

    /// Resumes a faulted lineage from the newest retained state.
    ///
    /// Returns the step resumed from. The replay, if any, is rewound to
    /// match.
    ///
    /// # Errors
    ///
    /// `NotFaulted` for a healthy lineage, `NothingRetained` when the
    /// history is empty, `Lifecycle` if the state cannot be installed.
    pub fn recover(&mut self) -> HostResult<u64> {
        let Phase::Faulted { step } = self.lifecycle.phase() else {
            return Err(HostError::NotFaulted);
        };
        let state = self
            .history
            .latest()
            .cloned()
            .ok_or(HostError::NothingRetained)?;
        let resumed = state.step();
        if let Some(replay) = self.replay.as_mut() {
            replay.rewind(resumed, state.as_bytes());
        }
        self.lifecycle.restore(state)?;
        tracing::warn!(
            engine = %self.kind,
            faulted_after = ?step,
            resumed,
            "lineage recovered"
        );
        Ok(resumed)
    }
}
