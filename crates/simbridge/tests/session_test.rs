//! # Session Tests
//!
//! End-to-end host behaviour: booting, running real engines into a canvas,
//! bounded retention, and recovery after a fatal step.

use simbridge::{HostConfig, HostError, ScriptedInput, Session, SilentInput};
use simbridge_core::NegotiationLimits;
use simbridge_engine::mock::MockEngine;
use simbridge_engine::{LifecycleError, Phase};
use simbridge_render::{Canvas, Color, CommandRecorder, RenderSink};
use simbridge_sims::{
    EngineKind, FrameSummary, InterpretError, InterpretResult, SimulationPlugin, StateInterpreter,
};

/// Draws a mock state as one rectangle per step.
struct MockView;

impl StateInterpreter for MockView {
    fn draw(
        &self,
        _config: &[u8],
        state: &[u8],
        sink: &mut dyn RenderSink,
    ) -> InterpretResult<FrameSummary> {
        let step = u64::from_le_bytes(state[..8].try_into().unwrap());
        sink.clear_background(Color::BLACK);
        sink.draw_rect(0, 0, step as i32, 1, Color::WHITE);
        Ok(FrameSummary {
            step,
            primitives: 2,
            population: 0,
        })
    }
}

/// [`MockView`] that refuses to draw one step.
struct UndrawableStep(u64);

impl StateInterpreter for UndrawableStep {
    fn draw(
        &self,
        config: &[u8],
        state: &[u8],
        sink: &mut dyn RenderSink,
    ) -> InterpretResult<FrameSummary> {
        if state[..8] == self.0.to_le_bytes() {
            return Err(InterpretError::InvalidState {
                engine: "mock",
                reason: "undrawable",
            });
        }
        MockView.draw(config, state, sink)
    }
}

fn mock_session(fail_at_step: Option<u64>, history_depth: usize) -> Session {
    let plugin = SimulationPlugin {
        kind: EngineKind::Bounce,
        engine: Box::new(MockEngine {
            fail_at_step,
            ..MockEngine::default()
        }),
        interpreter: Box::new(MockView),
    };
    Session::new(
        plugin,
        NegotiationLimits::default(),
        history_depth,
        Box::new(SilentInput),
    )
}

#[test]
fn test_sample_config_runs() {
    let config =
        HostConfig::from_toml_str(include_str!("../../../config/headless.toml")).unwrap();
    assert_eq!(config.engine, EngineKind::Life);

    let mut session = Session::from_config(&config).unwrap();
    let mut canvas = Canvas::new(config.viewport.width, config.viewport.height);
    session.boot().unwrap();
    let summary = session.run(20, &mut canvas).unwrap();

    assert_eq!(summary.steps, 20);
    assert_eq!(summary.last_frame.step, 20);
    assert_eq!(session.phase(), Phase::Running { step: 20 });
    assert_eq!(session.history().len(), config.history_depth);
    assert_eq!(
        canvas.count(Color::NEON_GREEN),
        summary.last_frame.population * 16
    );
}

#[test]
fn test_every_engine_boots_with_zero_initial_capacity() {
    for engine in EngineKind::ALL {
        let config = HostConfig {
            engine,
            negotiation: simbridge::NegotiationConfig {
                initial_capacity: 0,
                max_capacity: 1 << 20,
            },
            ..HostConfig::default()
        };
        let mut session = Session::from_config(&config).unwrap();
        session.boot().unwrap();
        let mut recorder = CommandRecorder::new();
        session.run(3, &mut recorder).unwrap();
        assert!(session.stats().growth_retries >= 2, "{engine}");
        assert!(!recorder.is_empty());
    }
}

#[test]
fn test_advance_before_boot_fails() {
    let mut session = mock_session(None, 4);
    let err = session.advance(&mut CommandRecorder::new()).unwrap_err();
    assert!(matches!(
        err,
        HostError::Lifecycle(LifecycleError::InvalidTransition { .. })
    ));
}

#[test]
fn test_recover_after_fatal_step() {
    let mut session = mock_session(Some(4), 2);
    let mut sink = CommandRecorder::new();
    session.boot().unwrap();
    session.run(3, &mut sink).unwrap();

    let err = session.advance(&mut sink).unwrap_err();
    assert!(matches!(err, HostError::Lifecycle(LifecycleError::Protocol { .. })));
    assert_eq!(session.phase(), Phase::Faulted { step: Some(3) });

    // Further steps are refused until recovery.
    assert!(matches!(
        session.advance(&mut sink),
        Err(HostError::Lifecycle(LifecycleError::Faulted { .. }))
    ));

    assert_eq!(session.recover().unwrap(), 3);
    assert_eq!(session.phase(), Phase::Running { step: 3 });
    // The mock fails at step 4 deterministically.
    assert!(session.advance(&mut sink).is_err());
}

#[test]
fn test_recover_requires_fault_and_history() {
    let mut session = mock_session(None, 2);
    assert!(matches!(session.recover(), Err(HostError::NotFaulted)));
    session.boot().unwrap();
    assert!(matches!(session.recover(), Err(HostError::NotFaulted)));
}

#[test]
fn test_draw_current_state() {
    let mut session = mock_session(None, 2);
    let mut sink = CommandRecorder::new();
    assert!(matches!(session.draw(&mut sink), Err(HostError::NothingRetained)));
    session.boot().unwrap();
    session.run(2, &mut sink).unwrap();
    sink.clear();
    assert_eq!(session.draw(&mut sink).unwrap().step, 2);
    assert_eq!(sink.len(), 2);
}

#[test]
fn test_draw_failure_keeps_lineage_contiguous() {
    let plugin = SimulationPlugin {
        kind: EngineKind::Bounce,
        engine: Box::new(MockEngine::default()),
        interpreter: Box::new(UndrawableStep(2)),
    };
    let mut session = Session::new(plugin, NegotiationLimits::default(), 8, Box::new(SilentInput));
    let mut sink = CommandRecorder::new();
    session.boot().unwrap();
    session.advance(&mut sink).unwrap();

    assert!(matches!(
        session.advance(&mut sink),
        Err(HostError::Interpret(InterpretError::InvalidState { .. }))
    ));
    assert_eq!(session.phase(), Phase::Running { step: 2 });
    assert_eq!(session.history().len(), 3);
    assert_eq!(session.history().latest().map(|s| s.step()), Some(2));

    assert_eq!(session.advance(&mut sink).unwrap().step, 3);
    assert_eq!(session.history().len(), 4);
}

#[test]
fn test_scripted_input_reaches_engine() {
    let plugin = SimulationPlugin {
        kind: EngineKind::Bounce,
        engine: Box::new(MockEngine::default()),
        interpreter: Box::new(MockView),
    };
    let mut session = Session::new(
        plugin,
        NegotiationLimits::default(),
        4,
        Box::new(ScriptedInput::new(vec![vec![1], vec![2, 3]])),
    );
    session.boot().unwrap();
    session.run(4, &mut CommandRecorder::new()).unwrap();
    // 1 + 5 + 1 + 5
    let state = session.state().unwrap();
    assert_eq!(MockEngine::total(state.as_bytes()), Some(12));
}
