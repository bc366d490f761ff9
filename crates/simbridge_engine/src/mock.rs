//! # Mock Engine (For Testing)
//!
//! A deliberately tiny engine with a known layout, used to exercise the
//! lifecycle and the C boundary without pulling in a real simulation.
//!
//! State layout:
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────────────┐
//! │ step (u64 LE)│ total (u64 LE)│ config bytes (copy) │
//! └──────────────┴──────────────┴──────────────────────┘
//! ```
//!
//! Each step adds the sum of the input bytes to `total`. Carrying the
//! config inside the state lets the engine detect a mismatched lineage.

use simbridge_core::{deliver, deliver_with, Delivery, Outcome};

use crate::engine::SimulationEngine;

/// Configuration produced by [`MockEngine::starting_config`].
pub const MOCK_CONFIG: &[u8] = b"mock:v1";

/// Prefix every accepted configuration must carry.
const CONFIG_PREFIX: &[u8] = b"mock:";

/// Bytes before the embedded config.
const HEADER_LEN: usize = 16;

/// Engine with a trivial, fully transparent layout.
#[derive(Clone, Debug, Default)]
pub struct MockEngine {
    /// How shortfalls are reported.
    pub delivery: Delivery,
    /// Step whose production fails fatally.
    pub fail_at_step: Option<u64>,
}

impl MockEngine {
    /// Reads the accumulated total from a mock state.
    #[must_use]
    pub fn total(state: &[u8]) -> Option<u64> {
        let bytes = state.get(8..HEADER_LEN)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }

    fn write_state(out: &mut [u8], step: u64, total: u64, config: &[u8]) {
        out[..8].copy_from_slice(&step.to_le_bytes());
        out[8..HEADER_LEN].copy_from_slice(&total.to_le_bytes());
        out[HEADER_LEN..].copy_from_slice(config);
    }
}

impl SimulationEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn starting_config(&self, out: &mut [u8]) -> Outcome {
        deliver(MOCK_CONFIG, out, self.delivery)
    }

    fn starting_state(&self, config: &[u8], out: &mut [u8]) -> Outcome {
        if !config.starts_with(CONFIG_PREFIX) {
            return Outcome::Fatal;
        }
        deliver_with(HEADER_LEN + config.len(), out, self.delivery, |dst| {
            Self::write_state(dst, 0, 0, config);
        })
    }

    fn state_step(&self, input: &[u8], config: &[u8], state: &[u8], out: &mut [u8]) -> Outcome {
        if state.len() < HEADER_LEN || &state[HEADER_LEN..] != config {
            return Outcome::Fatal;
        }
        let mut step_bytes = [0u8; 8];
        step_bytes.copy_from_slice(&state[..8]);
        let Some(step) = u64::from_le_bytes(step_bytes).checked_add(1) else {
            return Outcome::Fatal;
        };
        if self.fail_at_step == Some(step) {
            return Outcome::Fatal;
        }
        let Some(total) = Self::total(state) else {
            return Outcome::Fatal;
        };
        let total = input
            .iter()
            .fold(total, |acc, &b| acc.wrapping_add(u64::from(b)));

        deliver_with(state.len(), out, self.delivery, |dst| {
            Self::write_state(dst, step, total, config);
        })
    }
}
