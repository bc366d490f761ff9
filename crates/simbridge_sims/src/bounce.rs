//! # Bounce Engine
//!
//! Particles falling under gravity inside a box, losing a little energy at
//! every wall hit. Positions and velocities are fixed point with 8
//! fractional bits, so a step is pure integer arithmetic and replays
//! bit-exactly on every platform.
//!
//! ## Layouts
//!
//! ```text
//! config (32 bytes)
//! ┌───────┬───────┬────────┬───────┬──────┬─────────┬─────────────┐
//! │ magic │ width │ height │ count │ seed │ gravity │ restitution │
//! │ BNC1  │  u32  │  u32   │  u32  │ u64  │   i32   │  u32 (pct)  │
//! └───────┴───────┴────────┴───────┴──────┴─────────┴─────────────┘
//!
//! state = StateHeader (24) + count × Particle (24)
//! ```
//!
//! ## Input
//!
//! Empty, or exactly 8 bytes: an impulse `(dx: i32, dy: i32)` in fixed
//! point added to every particle's velocity before gravity.

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
pub const BOUNCE_MAGIC: [u8; 4] = *b"BNC1";

/// Fractional bits of every position and velocity.
pub const FIXED_SHIFT: u32 = 8;

/// One pixel in fixed point.
pub const FIXED_ONE: i32 = 1 << FIXED_SHIFT;

/// Largest accepted `particle_count`.
pub const MAX_PARTICLES: u32 = 4096;

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// Speeds are clamped to this many pixels per step.
const MAX_SPEED: i64 = 64 * FIXED_ONE as i64;

const ENGINE: &str = "bounce";

/// Bounce configuration.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BounceConfig {
    /// Always [`BOUNCE_MAGIC`].
    pub magic: [u8; 4],
    /// Box width in pixels.
    pub width: u32,
    /// Box height in pixels.
    pub height: u32,
    /// Number of particles.
    pub particle_count: u32,
    /// Seed for initial positions, velocities and colors.
    pub seed: u64,
    /// Downward acceleration, fixed point per step.
    pub gravity: i32,
    /// Percentage of speed kept after a wall hit.
    pub restitution_pct: u32,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            magic: BOUNCE_MAGIC,
            width: 320,
            height: 200,
            particle_count: 48,
            seed: 0x0B0B_1E5E_ED00_0001,
            gravity: 24,
            restitution_pct: 88,
        }
    }
}

impl BounceConfig {
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
        let parsed: Self = read_config(config, BOUNCE_MAGIC, ENGINE)?;
        let invalid = |reason| InterpretError::InvalidConfig {
            engine: ENGINE,
            reason,
        };
        if parsed.width == 0 || parsed.height == 0 {
            return Err(invalid("zero-sized box"));
        }
        if parsed.width > MAX_DIMENSION || parsed.height > MAX_DIMENSION {
            return Err(invalid("box too large"));
        }
        if parsed.particle_count > MAX_PARTICLES {
            return Err(invalid("too many particles"));
        }
        if parsed.restitution_pct > 100 {
            return Err(invalid("restitution above 100%"));
        }
        Ok(parsed)
    }

    /// Exact state size for this configuration.
    #[must_use]
    pub fn state_len(&self) -> usize {
        STATE_HEADER_LEN + self.particle_count as usize * PARTICLE_LEN
    }

    /// Largest particle radius this box allows, in pixels.
    #[must_use]
    pub fn max_radius(&self) -> u32 {
        (self.width.min(self.height) / 4).clamp(1, 8)
    }
}

impl WireOrder for BounceConfig {
    fn swap_le(self) -> Self {
        Self {
            magic: self.magic,
            width: self.width.to_le(),
            height: self.height.to_le(),
            particle_count: self.particle_count.to_le(),
            seed: self.seed.to_le(),
            gravity: self.gravity.to_le(),
            restitution_pct: self.restitution_pct.to_le(),
        }
    }
}

/// Size of one [`Particle`] on the wire.
pub const PARTICLE_LEN: usize = std::mem::size_of::<Particle>();

/// One particle.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Particle {
    /// Centre x, fixed point.
    pub x: i32,
    /// Centre y, fixed point.
    pub y: i32,
    /// Velocity x, fixed point per step.
    pub vx: i32,
    /// Velocity y, fixed point per step.
    pub vy: i32,
    /// Radius in whole pixels.
    pub radius: u32,
    /// RGBA.
    pub color: [u8; 4],
}

impl WireOrder for Particle {
    fn swap_le(self) -> Self {
        Self {
            x: self.x.to_le(),
            y: self.y.to_le(),
            vx: self.vx.to_le(),
            vy: self.vy.to_le(),
            radius: self.radius.to_le(),
            color: self.color,
        }
    }
}

impl Particle {
    /// Centre in whole pixels.
    #[must_use]
    pub const fn pixel_position(&self) -> (i32, i32) {
        (self.x >> FIXED_SHIFT, self.y >> FIXED_SHIFT)
    }
}

/// Decoded bounce state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BounceState {
    /// Shared header.
    pub header: StateHeader,
    /// All particles, in creation order.
    pub particles: Vec<Particle>,
}

impl BounceState {
    /// Decodes `state` and checks it against `config`.
    ///
    /// # Errors
    ///
    /// Fails on a truncated or foreign state, or on a particle whose
    /// radius the box cannot hold.
    pub fn parse(config_bytes: &[u8], config: &BounceConfig, state: &[u8]) -> InterpretResult<Self> {
        let header = StateHeader::read(state, BOUNCE_MAGIC, config_bytes, ENGINE)?;
        let invalid = |reason| InterpretError::InvalidState {
            engine: ENGINE,
            reason,
        };
        if state.len() != config.state_len() {
            return Err(invalid("length does not match particle count"));
        }
        let radii = 1..=config.max_radius();
        let particles = state[STATE_HEADER_LEN..]
            .chunks_exact(PARTICLE_LEN)
            .map(|chunk| read_pod::<Particle>(chunk, 0).ok_or_else(|| invalid("truncated particle")))
            .map(|particle| match particle {
                Ok(p) if !radii.contains(&p.radius) => {
                    Err(invalid("particle radius out of range"))
                }
                other => other,
            })
            .collect::<InterpretResult<Vec<_>>>()?;
        Ok(Self { header, particles })
    }

    fn write(&self, dst: &mut [u8]) {
        write_pod(dst, 0, &self.header);
        for (i, particle) in self.particles.iter().enumerate() {
            write_pod(dst, STATE_HEADER_LEN + i * PARTICLE_LEN, particle);
        }
    }
}

/// Seeds the initial particles.
fn spawn(config: &BounceConfig) -> Vec<Particle> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let max_radius = config.max_radius();
    (0..config.particle_count)
        .map(|_| {
            let radius = rng.gen_range(1..=max_radius);
            let (lo_x, hi_x) = axis_bounds(config.width, radius);
            let (lo_y, hi_y) = axis_bounds(config.height, radius);
            Particle {
                x: rng.gen_range(lo_x..=hi_x),
                y: rng.gen_range(lo_y..=lo_y + (hi_y - lo_y) / 2),
                vx: rng.gen_range(-3 * FIXED_ONE..=3 * FIXED_ONE),
                vy: rng.gen_range(-2 * FIXED_ONE..=FIXED_ONE),
                radius,
                color: [
                    rng.gen_range(64..=255),
                    rng.gen_range(64..=255),
                    rng.gen_range(64..=255),
                    255,
                ],
            }
        })
        .collect()
}

/// Lowest and highest legal centre coordinate along one axis.
fn axis_bounds(extent: u32, radius: u32) -> (i32, i32) {
    let extent = extent as i32 * FIXED_ONE;
    let radius = radius as i32 * FIXED_ONE;
    let lo = radius.min(extent / 2);
    (lo, (extent - radius).max(lo))
}

/// Integrates one axis and reflects off the walls.
fn integrate(pos: i32, vel: i32, accel: i32, lo: i32, hi: i32, restitution: i64) -> (i32, i32) {
    let vel = (i64::from(vel) + i64::from(accel)).clamp(-MAX_SPEED, MAX_SPEED);
    let mut pos = i64::from(pos) + vel;
    let mut vel = vel;
    let (lo, hi) = (i64::from(lo), i64::from(hi));
    if pos < lo {
        pos = (2 * lo - pos).min(hi);
        vel = -vel * restitution / 100;
    } else if pos > hi {
        pos = (2 * hi - pos).max(lo);
        vel = -vel * restitution / 100;
    }
    (pos as i32, vel as i32)
}

/// Applies one step to `particles` in place.
fn advance(config: &BounceConfig, particles: &mut [Particle], impulse: (i32, i32)) {
    let restitution = i64::from(config.restitution_pct);
    for p in particles {
        let (lo_x, hi_x) = axis_bounds(config.width, p.radius);
        let (lo_y, hi_y) = axis_bounds(config.height, p.radius);
        let (x, vx) = integrate(p.x, p.vx, impulse.0, lo_x, hi_x, restitution);
        let (y, vy) = integrate(
            p.y,
            p.vy,
            impulse.1.saturating_add(config.gravity),
            lo_y,
            hi_y,
            restitution,
        );
        *p = Particle { x, y, vx, vy, ..*p };
    }
}

fn parse_impulse(input: &[u8]) -> InterpretResult<(i32, i32)> {
    match input.len() {
        0 => Ok((0, 0)),
        8 => {
            let dx = read_pod::<i32>(input, 0).unwrap_or_default();
            let dy = read_pod::<i32>(input, 4).unwrap_or_default();
            Ok((dx, dy))
        }
        len => Err(InterpretError::InvalidInput {
            engine: ENGINE,
            len,
        }),
    }
}

/// Encodes an impulse input for [`BounceEngine`].
#[must_use]
pub fn impulse_input(dx: i32, dy: i32) -> Vec<u8> {
    let mut bytes = vec![0u8; 8];
    write_pod(&mut bytes, 0, &dx);
    write_pod(&mut bytes, 4, &dy);
    bytes
}

/// The bounce simulation. Reports shortfalls with [`Delivery::Strict`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BounceEngine;

impl BounceEngine {
    /// Computes the next state, or the reason there is none.
    ///
    /// # Errors
    ///
    /// Fails on invalid input, config, or state.
    pub fn next_state(input: &[u8], config: &[u8], state: &[u8]) -> InterpretResult<BounceState> {
        let parsed = BounceConfig::parse(config)?;
        let mut current = BounceState::parse(config, &parsed, state)?;
        let impulse = parse_impulse(input)?;
        advance(&parsed, &mut current.particles, impulse);
        current.header = current.header.next();
        Ok(current)
    }
}

impl SimulationEngine for BounceEngine {
    fn name(&self) -> &str {
        ENGINE
    }

    fn starting_config(&self, out: &mut [u8]) -> Outcome {
        deliver(&BounceConfig::default().to_bytes(), out, Delivery::Strict)
    }

    fn starting_state(&self, config: &[u8], out: &mut [u8]) -> Outcome {
        let parsed = match BounceConfig::parse(config) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(%err, "bounce rejected config");
                return Outcome::Fatal;
            }
        };
        deliver_with(parsed.state_len(), out, Delivery::Strict, |dst| {
            BounceState {
                header: StateHeader::new(BOUNCE_MAGIC, 0, config),
                particles: spawn(&parsed),
            }
            .write(dst);
        })
    }

    fn state_step(&self, input: &[u8], config: &[u8], state: &[u8], out: &mut [u8]) -> Outcome {
        match Self::next_state(input, config, state) {
            Ok(next) => deliver_with(state.len(), out, Delivery::Strict, |dst| next.write(dst)),
            Err(err) => {
                tracing::debug!(%err, "bounce step rejected");
                Outcome::Fatal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(config: &BounceConfig) -> Vec<u8> {
        let bytes = config.to_bytes();
        let mut out = vec![0u8; config.state_len()];
        let outcome = BounceEngine.starting_state(&bytes, &mut out);
        assert_eq!(
            outcome,
            Outcome::Complete {
                len: config.state_len() as u64
            }
        );
        out
    }

    #[test]
    fn test_config_is_32_bytes() {
        assert_eq!(std::mem::size_of::<BounceConfig>(), 32);
        assert_eq!(PARTICLE_LEN, 24);
    }

    #[test]
    fn test_default_config_parses() {
        let config = BounceConfig::default();
        assert_eq!(BounceConfig::parse(&config.to_bytes()), Ok(config));
    }

    #[test]
    fn test_invalid_configs() {
        let cases = [
            BounceConfig {
                width: 0,
                ..BounceConfig::default()
            },
            BounceConfig {
                particle_count: MAX_PARTICLES + 1,
                ..BounceConfig::default()
            },
            BounceConfig {
                restitution_pct: 101,
                ..BounceConfig::default()
            },
            BounceConfig {
                magic: *b"NOPE",
                ..BounceConfig::default()
            },
        ];
        for config in cases {
            assert!(BounceConfig::parse(&config.to_bytes()).is_err(), "{config:?}");
            assert_eq!(
                BounceEngine.starting_state(&config.to_bytes(), &mut [0u8; 4096]),
                Outcome::Fatal
            );
        }
        assert!(BounceConfig::parse(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_particles_stay_in_box() {
        let config = BounceConfig {
            width: 40,
            height: 30,
            particle_count: 64,
            gravity: 200,
            ..BounceConfig::default()
        };
        let bytes = config.to_bytes();
        let mut state = start(&config);
        for _ in 0..500 {
            let next = BounceEngine::next_state(&impulse_input(90, -40), &bytes, &state)
                .unwrap_or_else(|err| panic!("{err}"));
            let mut out = vec![0u8; state.len()];
            next.write(&mut out);
            for p in &next.particles {
                let (x, y) = p.pixel_position();
                assert!((0..=40).contains(&x) && (0..=30).contains(&y), "{p:?}");
            }
            state = out;
        }
    }

    #[test]
    fn test_step_counts_up() {
        let config = BounceConfig::default();
        let state = start(&config);
        let next = BounceEngine::next_state(&[], &config.to_bytes(), &state)
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(next.header.step, 1);
    }

    #[test]
    fn test_bad_input_length_is_fatal() {
        let config = BounceConfig::default();
        let state = start(&config);
        let mut out = vec![0u8; state.len()];
        assert_eq!(
            BounceEngine.state_step(&[1, 2, 3], &config.to_bytes(), &state, &mut out),
            Outcome::Fatal
        );
    }

    #[test]
    fn test_oversized_radius_is_fatal() {
        let config = BounceConfig::default();
        let bytes = config.to_bytes();
        let mut out = vec![0u8; config.state_len()];
        for radius in [0, config.max_radius() + 1, 1 << 24, u32::MAX] {
            let mut state = start(&config);
            let radius_at = STATE_HEADER_LEN + 16;
            state[radius_at..radius_at + 4].copy_from_slice(&radius.to_le_bytes());
            assert!(matches!(
                BounceState::parse(&bytes, &config, &state),
                Err(InterpretError::InvalidState { .. })
            ));
            assert_eq!(
                BounceEngine.state_step(&[], &bytes, &state, &mut out),
                Outcome::Fatal,
                "radius {radius}"
            );
        }
    }

    #[test]
    fn test_config_bytes_are_little_endian() {
        let bytes = BounceConfig::default().to_bytes();
        assert_eq!(&bytes[..4], b"BNC1");
        assert_eq!(&bytes[4..8], &320u32.to_le_bytes());
        assert_eq!(&bytes[24..28], &24i32.to_le_bytes());
    }

    #[test]
    fn test_zero_particles() {
        let config = BounceConfig {
            particle_count: 0,
            ..BounceConfig::default()
        };
        let state = start(&config);
        assert_eq!(state.len(), STATE_HEADER_LEN);
    }
}
