//! # Life Engine
//!
//! Conway's Game of Life (B3/S23) on a torus.
//!
//! ```text
//! config (24 bytes)
//! ┌───────┬───────┬────────┬─────────┬──────┐
//! │ magic │ width │ height │ density │ seed │
//! │ LIF1  │  u32  │  u32   │ u32 pct │ u64  │
//! └───────┴───────┴────────┴─────────┴──────┘
//!
//! state = StateHeader (24) + width × height cells, one byte each (0 or 1)
//! ```
//!
//! Input is a list of `(x: u32, y: u32)` toggles, 8 bytes each, applied
//! before the generation update. Coordinates wrap around the torus. A
//! trailing partial pair is an error.
//!
//! Shortfalls are reported with [`Delivery::Announce`]: the engine claims
//! success and lets the oversize length tell the host to retry.

use bytemuck::{Pod, Zeroable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use simbridge_core::{deliver, deliver_with, Delivery, Outcome};
use simbridge_engine::SimulationEngine;

use crate::error::{InterpretError, InterpretResult};
use crate::layout::{
    read_config, read_pod, to_wire, write_pod, StateHeader, WireOrder, STATE_HEADER_LEN,
};

/// Config and state magic.
pub const LIFE_MAGIC: [u8; 4] = *b"LIF1";

/// Largest accepted `width * height`.
pub const MAX_CELLS: u64 = 1 << 22;

/// Bytes per toggle in the step input.
pub const TOGGLE_LEN: usize = 8;

const ENGINE: &str = "life";

/// Life configuration.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct LifeConfig {
    /// Always [`LIFE_MAGIC`].
    pub magic: [u8; 4],
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Chance in percent that a cell starts alive.
    pub density_pct: u32,
    /// Seed for the initial grid.
    pub seed: u64,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            magic: LIFE_MAGIC,
            width: 96,
            height: 64,
            density_pct: 30,
            seed: 0x11FE_0000_C0DE_0001,
        }
    }
}

impl LifeConfig {
    /// Serialized form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        to_wire(self)
    }

    /// Decodes and range-checks configuration bytes.
    ///
    /// # Errors
    ///
    /// Returns [`InterpretError::InvalidConfig`] for anything this engine
    /// cannot run.
    pub fn parse(config: &[u8]) -> InterpretResult<Self> {
        let parsed: Self = read_config(config, LIFE_MAGIC, ENGINE)?;
        let invalid = |reason| InterpretError::InvalidConfig {
            engine: ENGINE,
            reason,
        };
        if parsed.width == 0 || parsed.height == 0 {
            return Err(invalid("empty grid"));
        }
        if u64::from(parsed.width) * u64::from(parsed.height) > MAX_CELLS {
            return Err(invalid("grid too large"));
        }
        if parsed.density_pct > 100 {
            return Err(invalid("density above 100%"));
        }
        Ok(parsed)
    }

    /// Number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Exact state size for this configuration.
    #[must_use]
    pub fn state_len(&self) -> usize {
        STATE_HEADER_LEN + self.cell_count()
    }
}

impl WireOrder for LifeConfig {
    fn swap_le(self) -> Self {
        Self {
            magic: self.magic,
            width: self.width.to_le(),
            height: self.height.to_le(),
            density_pct: self.density_pct.to_le(),
            seed: self.seed.to_le(),
        }
    }
}

/// A borrowed view of a life state's cells.
#[derive(Debug, Clone, Copy)]
pub struct LifeGrid<'a> {
    /// Shared header.
    pub header: StateHeader,
    width: usize,
    height: usize,
    cells: &'a [u8],
}

impl<'a> LifeGrid<'a> {
    /// Validates `state` against `config` and borrows its cells.
    ///
    /// # Errors
    ///
    /// Fails on a truncated or foreign state, or on cell bytes other than
    /// 0 and 1.
    pub fn parse(config_bytes: &[u8], config: &LifeConfig, state: &'a [u8]) -> InterpretResult<Self> {
        let header = StateHeader::read(state, LIFE_MAGIC, config_bytes, ENGINE)?;
        if state.len() != config.state_len() {
            return Err(InterpretError::InvalidState {
                engine: ENGINE,
                reason: "length does not match grid size",
            });
        }
        let cells = &state[STATE_HEADER_LEN..];
        if cells.iter().any(|&c| c > 1) {
            return Err(InterpretError::InvalidState {
                engine: ENGINE,
                reason: "cell byte other than 0 or 1",
            });
        }
        Ok(Self {
            header,
            width: config.width as usize,
            height: config.height as usize,
            cells,
        })
    }

    /// Whether the cell at `(x, y)` is alive.
    #[must_use]
    pub fn alive(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x] == 1
    }

    /// Number of live cells.
    #[must_use]
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c == 1).count()
    }

    /// Iterates `(x, y)` of every live cell in row-major order.
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == 1)
            .map(move |(i, _)| (i % width, i / width))
    }

    /// Grid width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }
}

/// Decodes toggle pairs.
fn parse_toggles(input: &[u8]) -> InterpretResult<Vec<(u32, u32)>> {
    if input.len() % TOGGLE_LEN != 0 {
        return Err(InterpretError::InvalidInput {
            engine: ENGINE,
            len: input.len(),
        });
    }
    Ok(input
        .chunks_exact(TOGGLE_LEN)
        .map(|pair| {
            (
                read_pod::<u32>(pair, 0).unwrap_or_default(),
                read_pod::<u32>(pair, 4).unwrap_or_default(),
            )
        })
        .collect())
}

/// Encodes toggles for [`LifeEngine`].
#[must_use]
pub fn toggle_input(toggles: &[(u32, u32)]) -> Vec<u8> {
    let mut bytes = vec![0u8; toggles.len() * TOGGLE_LEN];
    for (i, (x, y)) in toggles.iter().enumerate() {
        write_pod(&mut bytes, i * TOGGLE_LEN, x);
        write_pod(&mut bytes, i * TOGGLE_LEN + 4, y);
    }
    bytes
}

/// Writes the next generation of `cells` into `next`.
fn generation(width: usize, height: usize, cells: &[u8], next: &mut [u8]) {
    for y in 0..height {
        let up = (y + height - 1) % height;
        let down = (y + 1) % height;
        for x in 0..width {
            let left = (x + width - 1) % width;
            let right = (x + 1) % width;
            let neighbours = [
                (left, up),
                (x, up),
                (right, up),
                (left, y),
                (right, y),
                (left, down),
                (x, down),
                (right, down),
            ]
            .iter()
            .map(|&(nx, ny)| cells[ny * width + nx])
            .sum::<u8>();
            let alive = cells[y * width + x] == 1;
            next[y * width + x] = u8::from(neighbours == 3 || (alive && neighbours == 2));
        }
    }
}

/// The life simulation. Reports shortfalls with [`Delivery::Announce`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LifeEngine;

impl LifeEngine {
    /// Computes the next state bytes.
    ///
    /// # Errors
    ///
    /// Fails on invalid input, config, or state.
    pub fn next_state(input: &[u8], config: &[u8], state: &[u8]) -> InterpretResult<Vec<u8>> {
        let parsed = LifeConfig::parse(config)?;
        let grid = LifeGrid::parse(config, &parsed, state)?;
        let toggles = parse_toggles(input)?;

        let (width, height) = (grid.width(), grid.height());
        let mut current = grid.cells.to_vec();
        for (x, y) in toggles {
            let i = (y as usize % height) * width + (x as usize % width);
            current[i] ^= 1;
        }

        let mut out = vec![0u8; state.len()];
        write_pod(&mut out, 0, &grid.header.next());
        generation(width, height, &current, &mut out[STATE_HEADER_LEN..]);
        Ok(out)
    }
}

impl SimulationEngine for LifeEngine {
    fn name(&self) -> &str {
        ENGINE
    }

    fn starting_config(&self, out: &mut [u8]) -> Outcome {
        deliver(&LifeConfig::default().to_bytes(), out, Delivery::Announce)
    }

    fn starting_state(&self, config: &[u8], out: &mut [u8]) -> Outcome {
        let parsed = match LifeConfig::parse(config) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(%err, "life rejected config");
                return Outcome::Fatal;
            }
        };
        deliver_with(parsed.state_len(), out, Delivery::Announce, |dst| {
            write_pod(dst, 0, &StateHeader::new(LIFE_MAGIC, 0, config));
            let mut rng = ChaCha8Rng::seed_from_u64(parsed.seed);
            for cell in &mut dst[STATE_HEADER_LEN..] {
                *cell = u8::from(rng.gen_range(0..100) < parsed.density_pct);
            }
        })
    }

    fn state_step(&self, input: &[u8], config: &[u8], state: &[u8], out: &mut [u8]) -> Outcome {
        match Self::next_state(input, config, state) {
            Ok(next) => deliver(&next, out, Delivery::Announce),
            Err(err) => {
                tracing::debug!(%err, "life step rejected");
                Outcome::Fatal
            }
        }
    }
}
