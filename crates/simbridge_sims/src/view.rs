//! # State Interpreters
//!
//! The host treats states as opaque. Drawing one needs code that knows the
//! layout, so every engine ships an interpreter next to it.
//!
//! Interpreters only read. They never advance a state and never keep the
//! bytes they were given.

use simbridge_render::{Color, RenderSink};

use crate::bounce::{BounceConfig, BounceState};
use crate::error::InterpretResult;
use crate::life::{LifeConfig, LifeGrid};

/// What one drawn frame contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSummary {
    /// Step recorded in the state header.
    pub step: u64,
    /// Sink calls issued.
    pub primitives: usize,
    /// Particles or live cells.
    pub population: usize,
}

/// Draws an engine's state onto a sink.
pub trait StateInterpreter {
    /// Renders `state`, which must belong to `config`'s lineage.
    ///
    /// # Errors
    ///
    /// Returns an error without touching `sink` when the bytes do not
    /// decode.
    fn draw(
        &self,
        config: &[u8],
        state: &[u8],
        sink: &mut dyn RenderSink,
    ) -> InterpretResult<FrameSummary>;
}

/// Counts calls on the way to the real sink.
struct Counting<'a> {
    inner: &'a mut dyn RenderSink,
    calls: usize,
}

impl RenderSink for Counting<'_> {
    fn clear_background(&mut self, color: Color) {
        self.calls += 1;
        self.inner.clear_background(color);
    }

    fn set_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.calls += 1;
        self.inner.set_clip(x, y, w, h);
    }

    fn reset_clip(&mut self) {
        self.calls += 1;
        self.inner.reset_clip();
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.calls += 1;
        self.inner.draw_rect(x, y, w, h, color);
    }

    fn draw_circ(&mut self, x: i32, y: i32, r: f32, color: Color) {
        self.calls += 1;
        self.inner.draw_circ(x, y, r, color);
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.calls += 1;
        self.inner.draw_line(x0, y0, x1, y1, color);
    }
}

/// Interpreter for [`crate::bounce::BounceEngine`] states.
#[derive(Debug, Clone, Copy)]
pub struct BounceView {
    /// Background fill.
    pub background: Color,
    /// Box outline.
    pub frame: Color,
}

impl Default for BounceView {
    fn default() -> Self {
        Self {
            background: Color::MIDNIGHT,
            frame: Color::NEON_CYAN.with_alpha(160),
        }
    }
}

impl StateInterpreter for BounceView {
    fn draw(
        &self,
        config: &[u8],
        state: &[u8],
        sink: &mut dyn RenderSink,
    ) -> InterpretResult<FrameSummary> {
        let parsed = BounceConfig::parse(config)?;
        let decoded = BounceState::parse(config, &parsed, state)?;
        let (w, h) = (parsed.width as i32, parsed.height as i32);

        let mut sink = Counting {
            inner: sink,
            calls: 0,
        };
        sink.clear_background(self.background);
        sink.set_clip(0, 0, w, h);
        sink.draw_line(0, 0, w - 1, 0, self.frame);
        sink.draw_line(w - 1, 0, w - 1, h - 1, self.frame);
        sink.draw_line(w - 1, h - 1, 0, h - 1, self.frame);
        sink.draw_line(0, h - 1, 0, 0, self.frame);
        for particle in &decoded.particles {
            let (x, y) = particle.pixel_position();
            let [r, g, b, a] = particle.color;
            sink.draw_circ(x, y, particle.radius as f32, Color::rgba(r, g, b, a));
        }
        sink.reset_clip();

        Ok(FrameSummary {
            step: decoded.header.step,
            primitives: sink.calls,
            population: decoded.particles.len(),
        })
    }
}

/// Interpreter for [`crate::life::LifeEngine`] states.
#[derive(Debug, Clone, Copy)]
pub struct LifeView {
    /// Side of one cell in pixels.
    pub cell_size: i32,
    /// Dead cell color.
    pub background: Color,
    /// Live cell color.
    pub alive: Color,
}

impl Default for LifeView {
    fn default() -> Self {
        Self {
            cell_size: 4,
            background: Color::BLACK,
            alive: Color::NEON_GREEN,
        }
    }
}

impl StateInterpreter for LifeView {
    fn draw(
        &self,
        config: &[u8],
        state: &[u8],
        sink: &mut dyn RenderSink,
    ) -> InterpretResult<FrameSummary> {
        let parsed = LifeConfig::parse(config)?;
        let grid = LifeGrid::parse(config, &parsed, state)?;
        let cell = self.cell_size.max(1);

        let mut sink = Counting {
            inner: sink,
            calls: 0,
        };
        sink.clear_background(self.background);
        sink.set_clip(
            0,
            0,
            (parsed.width as i32).saturating_mul(cell),
            (parsed.height as i32).saturating_mul(cell),
        );
        let mut population = 0;
        for (x, y) in grid.live_cells() {
            population += 1;
            sink.draw_rect(x as i32 * cell, y as i32 * cell, cell, cell, self.alive);
        }
        sink.reset_clip();

        Ok(FrameSummary {
            step: grid.header.step,
            primitives: sink.calls,
            population,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simbridge_core::Outcome;
    use simbridge_engine::SimulationEngine;
    use simbridge_render::{Canvas, CommandRecorder, DrawCommand};

    use crate::bounce::BounceEngine;
    use crate::error::InterpretError;
    use crate::life::LifeEngine;

    fn initial_state(engine: &dyn SimulationEngine, config: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; 1 << 16];
        match engine.starting_state(config, &mut out) {
            Outcome::Complete { len } => out.truncate(len as usize),
            other => panic!("unexpected {other:?}"),
        }
        out
    }

    #[test]
    fn test_bounce_view_draws_every_particle() {
        let config = BounceConfig {
            particle_count: 5,
            ..BounceConfig::default()
        };
        let bytes = config.to_bytes();
        let state = initial_state(&BounceEngine, &bytes);

        let mut recorder = CommandRecorder::new();
        let summary = BounceView::default()
            .draw(&bytes, &state, &mut recorder)
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(summary.population, 5);
        assert_eq!(summary.primitives, recorder.len());
        let circles = recorder
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count();
        assert_eq!(circles, 5);
        assert_eq!(recorder.commands().last(), Some(&DrawCommand::ResetClip));
    }

    #[test]
    fn test_life_view_on_canvas() {
        let config = LifeConfig {
            width: 8,
            height: 8,
            density_pct: 100,
            ..LifeConfig::default()
        };
        let bytes = config.to_bytes();
        let state = initial_state(&LifeEngine, &bytes);

        let view = LifeView {
            cell_size: 2,
            ..LifeView::default()
        };
        let mut canvas = Canvas::new(20, 20);
        let summary = view
            .draw(&bytes, &state, &mut canvas)
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(summary.population, 64);
        assert_eq!(canvas.count(Color::NEON_GREEN), 256);
    }

    #[test]
    fn test_foreign_state_draws_nothing() {
        let bytes = LifeConfig::default().to_bytes();
        let other = LifeConfig {
            seed: 99,
            ..LifeConfig::default()
        }
        .to_bytes();
        let state = initial_state(&LifeEngine, &other);

        let mut recorder = CommandRecorder::new();
        assert_eq!(
            LifeView::default().draw(&bytes, &state, &mut recorder),
            Err(InterpretError::LineageMismatch { engine: "life" })
        );
        assert!(recorder.is_empty());
    }
}
