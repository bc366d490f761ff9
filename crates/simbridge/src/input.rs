//! Step input sources.

/// Supplies the input bytes for each step.
pub trait InputSource {
    /// Input for the step that will produce state `step`.
    fn next_input(&mut self, step: u64) -> Vec<u8>;
}

/// Empty input on every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentInput;

impl InputSource for SilentInput {
    fn next_input(&mut self, _step: u64) -> Vec<u8> {
        Vec::new()
    }
}

/// Cycles through a fixed list of frames.
///
/// Step `n` (1-based) gets frame `(n - 1) % len`, so the same step always
/// gets the same frame, even after a recovery rewinds the lineage.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: Vec<Vec<u8>>,
}

impl ScriptedInput {
    /// Creates a script. An empty script behaves like [`SilentInput`].
    #[must_use]
    pub fn new(frames: Vec<Vec<u8>>) -> Self {
        Self { frames }
    }

    /// Number of frames in the script.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the script has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn next_input(&mut self, step: u64) -> Vec<u8> {
        if self.frames.is_empty() {
            return Vec::new();
        }
        let index = step.saturating_sub(1) % self.frames.len() as u64;
        self.frames[index as usize].clone()
    }
}

impl<I: InputSource + ?Sized> InputSource for Box<I> {
    fn next_input(&mut self, step: u64) -> Vec<u8> {
        (**self).next_input(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_cycles_by_step() {
        let mut script = ScriptedInput::new(vec![vec![1], vec![2], vec![3]]);
        let seen: Vec<_> = (1..=5).map(|step| script.next_input(step)).collect();
        assert_eq!(seen, vec![vec![1], vec![2], vec![3], vec![1], vec![2]]);
        // Rewinding replays the same frames.
        assert_eq!(script.next_input(2), vec![2]);
    }

    #[test]
    fn test_silent_and_empty_script() {
        assert!(SilentInput.next_input(9).is_empty());
        assert!(ScriptedInput::default().next_input(9).is_empty());
    }
}
