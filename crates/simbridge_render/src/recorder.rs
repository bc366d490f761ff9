//! Command recording.
//!
//! [`CommandRecorder`] is a sink that remembers what it was asked to draw,
//! so a frame can be inspected, compared, or replayed onto another sink.

use crate::color::Color;
use crate::sink::RenderSink;

/// One recorded sink call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// `clear_background`.
    Clear(Color),
    /// `set_clip`.
    SetClip {
        /// Left edge.
        x: i32,
        /// Top edge.
        y: i32,
        /// Width.
        w: i32,
        /// Height.
        h: i32,
    },
    /// `reset_clip`.
    ResetClip,
    /// `draw_rect`.
    Rect {
        /// Left edge.
        x: i32,
        /// Top edge.
        y: i32,
        /// Width.
        w: i32,
        /// Height.
        h: i32,
        /// Fill.
        color: Color,
    },
    /// `draw_circ`.
    Circle {
        /// Centre x.
        x: i32,
        /// Centre y.
        y: i32,
        /// Radius.
        r: f32,
        /// Fill.
        color: Color,
    },
    /// `draw_line`.
    Line {
        /// Start x.
        x0: i32,
        /// Start y.
        y0: i32,
        /// End x.
        x1: i32,
        /// End y.
        y1: i32,
        /// Stroke.
        color: Color,
    },
}

impl DrawCommand {
    /// Issues this command on `sink`.
    pub fn apply<S: RenderSink + ?Sized>(&self, sink: &mut S) {
        match *self {
            Self::Clear(color) => sink.clear_background(color),
            Self::SetClip { x, y, w, h } => sink.set_clip(x, y, w, h),
            Self::ResetClip => sink.reset_clip(),
            Self::Rect { x, y, w, h, color } => sink.draw_rect(x, y, w, h, color),
            Self::Circle { x, y, r, color } => sink.draw_circ(x, y, r, color),
            Self::Line {
                x0,
                y0,
                x1,
                y1,
                color,
            } => sink.draw_line(x0, y0, x1, y1, color),
        }
    }
}

/// A sink that stores every call in order.
#[derive(Debug, Default, Clone)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Takes the recorded commands, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Re-issues every recorded command on `sink`, in order.
    pub fn replay<S: RenderSink + ?Sized>(&self, sink: &mut S) {
        for command in &self.commands {
            command.apply(sink);
        }
    }
}

impl RenderSink for CommandRecorder {
    fn clear_background(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.commands.push(DrawCommand::SetClip { x, y, w, h });
    }

    fn reset_clip(&mut self) {
        self.commands.push(DrawCommand::ResetClip);
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.commands.push(DrawCommand::Rect { x, y, w, h, color });
    }

    fn draw_circ(&mut self, x: i32, y: i32, r: f32, color: Color) {
        self.commands.push(DrawCommand::Circle { x, y, r, color });
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.commands.push(DrawCommand::Line {
            x0,
            y0,
            x1,
            y1,
            color,
        });
    }
}
