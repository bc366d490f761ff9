//! # Shared Binary Layout
//!
//! Every state produced by the reference engines starts with the same
//! fixed header:
//!
//! ```text
//! ┌─────────┬──────────┬───────────┬──────────────────┐
//! │ magic 4 │ rsvd u32 │ step u64  │ config fp u64    │  24 bytes
//! └─────────┴──────────┴───────────┴──────────────────┘
//! ```
//!
//! The fingerprint is SipHash-2-4 over the exact configuration bytes, so a
//! state handed back with a different configuration is caught before any
//! arithmetic runs.
//!
//! Multi-byte fields are little-endian on every target: values pass
//! through [`WireOrder::swap_le`] on the way in and out. Buffers coming
//! from the host carry no alignment guarantee; all reads go through
//! `pod_read_unaligned`.

use std::hash::Hasher;

use bytemuck::{Pod, Zeroable};
use siphasher::sip::SipHasher24;

use crate::error::{InterpretError, InterpretResult};

/// Fingerprint keys. Changing them invalidates every stored state.
const FINGERPRINT_KEYS: (u64, u64) = (0x5349_4D42_5249_4447, 0x4C49_4E45_4147_4521);

/// Size of [`StateHeader`] on the wire.
pub const STATE_HEADER_LEN: usize = std::mem::size_of::<StateHeader>();

/// Hashes configuration bytes into the lineage fingerprint.
#[must_use]
pub fn fingerprint(config: &[u8]) -> u64 {
    let mut hasher = SipHasher24::new_with_keys(FINGERPRINT_KEYS.0, FINGERPRINT_KEYS.1);
    hasher.write(config);
    hasher.finish()
}

/// A [`Pod`] value whose wire form is little-endian.
pub trait WireOrder: Pod {
    /// Converts between native and little-endian order, field by field.
    /// Applying it twice gives back the original value.
    #[must_use]
    fn swap_le(self) -> Self;
}

macro_rules! wire_order_int {
    ($($ty:ty),*) => {
        $(impl WireOrder for $ty {
            #[inline]
            fn swap_le(self) -> Self {
                self.to_le()
            }
        })*
    };
}

wire_order_int!(u32, i32, u64);

/// Wire bytes of `value`.
#[must_use]
pub fn to_wire<T: WireOrder>(value: &T) -> Vec<u8> {
    bytemuck::bytes_of(&value.swap_le()).to_vec()
}

/// Reads a `T` at `offset`, or `None` if it runs past the end.
#[inline]
#[must_use]
pub fn read_pod<T: WireOrder>(bytes: &[u8], offset: usize) -> Option<T> {
    let end = offset.checked_add(std::mem::size_of::<T>())?;
    bytes
        .get(offset..end)
        .and_then(|slice| bytemuck::try_pod_read_unaligned::<T>(slice).ok())
        .map(WireOrder::swap_le)
}

/// Writes `value` at `offset`. The caller sizes `dst`.
#[inline]
pub fn write_pod<T: WireOrder>(dst: &mut [u8], offset: usize, value: &T) {
    let wire = value.swap_le();
    let bytes = bytemuck::bytes_of(&wire);
    dst[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Decodes a fixed-size configuration and checks its magic.
///
/// # Errors
///
/// Returns [`InterpretError::InvalidConfig`] on a size or magic mismatch.
pub fn read_config<T: WireOrder>(
    config: &[u8],
    magic: [u8; 4],
    engine: &'static str,
) -> InterpretResult<T> {
    if config.len() != std::mem::size_of::<T>() {
        return Err(InterpretError::InvalidConfig {
            engine,
            reason: "wrong length",
        });
    }
    if config[..4] != magic {
        return Err(InterpretError::InvalidConfig {
            engine,
            reason: "wrong magic",
        });
    }
    read_pod(config, 0).ok_or(InterpretError::InvalidConfig {
        engine,
        reason: "unreadable",
    })
}

/// Common prefix of every reference state.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct StateHeader {
    /// Engine magic, same as its configuration.
    pub magic: [u8; 4],
    /// Always zero.
    pub reserved: u32,
    /// Number of steps since the initial state.
    pub step: u64,
    /// [`fingerprint`] of the configuration.
    pub config_fingerprint: u64,
}

impl WireOrder for StateHeader {
    fn swap_le(self) -> Self {
        Self {
            magic: self.magic,
            reserved: self.reserved.to_le(),
            step: self.step.to_le(),
            config_fingerprint: self.config_fingerprint.to_le(),
        }
    }
}

impl StateHeader {
    /// Header for a state of `config`'s lineage at `step`.
    #[must_use]
    pub fn new(magic: [u8; 4], step: u64, config: &[u8]) -> Self {
        Self {
            magic,
            reserved: 0,
            step,
            config_fingerprint: fingerprint(config),
        }
    }

    /// Decodes and validates the header of `state` against `config`.
    ///
    /// # Errors
    ///
    /// - [`InterpretError::InvalidState`] if the header is truncated or has
    ///   the wrong magic
    /// - [`InterpretError::LineageMismatch`] if the fingerprint differs
    pub fn read(
        state: &[u8],
        magic: [u8; 4],
        config: &[u8],
        engine: &'static str,
    ) -> InterpretResult<Self> {
        let header: Self = read_pod(state, 0).ok_or(InterpretError::InvalidState {
            engine,
            reason: "truncated header",
        })?;
        if header.magic != magic || header.reserved != 0 {
            return Err(InterpretError::InvalidState {
                engine,
                reason: "wrong magic",
            });
        }
        if header.config_fingerprint != fingerprint(config) {
            return Err(InterpretError::LineageMismatch { engine });
        }
        Ok(header)
    }

    /// Header of the following step.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            step: self.step.wrapping_add(1),
            ..self
        }
    }
}
