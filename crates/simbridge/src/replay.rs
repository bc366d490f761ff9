//! # Replay Files
//!
//! A replay is everything needed to rebuild a lineage: the engine, the
//! configuration bytes, and the input of every step. The fingerprint of the
//! final state is stored alongside so a re-run can prove it ended in the
//! same place.
//!
//! ## File Format
//!
//! ```text
//! ┌───────────┬─────────────┬──────────────┬──────────────────────────┐
//! │ "SBRP" 4  │ version u32 │ crc32 u32    │ lz4 body (size-prepended)│
//! └───────────┴─────────────┴──────────────┴──────────────────────────┘
//!
//! body (little-endian):
//!   name_len u8 │ engine name │ config_len u32 │ config
//!   input_count u32 │ { len u32 │ bytes } × input_count
//!   final_fingerprint u64
//! ```
//!
//! The checksum covers the compressed body exactly as stored.

use std::path::Path;

use simbridge_core::NegotiationLimits;
use simbridge_engine::{Configuration, Lifecycle, SimulationEngine};
use simbridge_sims::layout::fingerprint;
use simbridge_sims::EngineKind;

use crate::error::{ReplayError, ReplayResult};

/// File magic.
pub const REPLAY_MAGIC: [u8; 4] = *b"SBRP";

/// Current format version.
pub const REPLAY_VERSION: u32 = 1;

const PREAMBLE_LEN: usize = 12;

/// A recorded lineage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    /// Engine that produced the lineage.
    pub engine: EngineKind,
    /// Configuration bytes.
    pub config: Vec<u8>,
    /// Input of step `i + 1` at index `i`.
    pub inputs: Vec<Vec<u8>>,
    /// Fingerprint of the state after the last input.
    pub final_fingerprint: u64,
}

impl Replay {
    /// Starts an empty recording.
    #[must_use]
    pub fn new(engine: EngineKind, config: Vec<u8>, initial_state: &[u8]) -> Self {
        Self {
            engine,
            config,
            inputs: Vec::new(),
            final_fingerprint: fingerprint(initial_state),
        }
    }

    /// Appends one step.
    pub fn record(&mut self, input: Vec<u8>, resulting_state: &[u8]) {
        self.inputs.push(input);
        self.final_fingerprint = fingerprint(resulting_state);
    }

    /// Rewinds the recording to `step`, whose state is `state`.
    pub fn rewind(&mut self, step: u64, state: &[u8]) {
        self.inputs
            .truncate(usize::try_from(step).unwrap_or(usize::MAX));
        self.final_fingerprint = fingerprint(state);
    }

    /// Number of recorded steps.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.inputs.len() as u64
    }

    /// Serializes into the file format.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let name = self.engine.name().as_bytes();
        let mut body = Vec::with_capacity(32 + self.config.len());
        body.push(name.len() as u8);
        body.extend_from_slice(name);
        body.extend_from_slice(&(self.config.len() as u32).to_le_bytes());
        body.extend_from_slice(&self.config);
        body.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            body.extend_from_slice(&(input.len() as u32).to_le_bytes());
            body.extend_from_slice(input);
        }
        body.extend_from_slice(&self.final_fingerprint.to_le_bytes());

        let compressed = lz4_flex::compress_prepend_size(&body);
        let mut out = Vec::with_capacity(PREAMBLE_LEN + compressed.len());
        out.extend_from_slice(&REPLAY_MAGIC);
        out.extend_from_slice(&REPLAY_VERSION.to_le_bytes());
        out.extend_from_slice(&crc32fast::hash(&compressed).to_le_bytes());
        out.extend_from_slice(&compressed);
        out
    }

    /// Parses the file format.
    ///
    /// # Errors
    ///
    /// `BadMagic`, `UnsupportedVersion`, `ChecksumMismatch`, `Corrupt` or
    /// `UnknownEngine` depending on what is wrong.
    pub fn from_bytes(bytes: &[u8]) -> ReplayResult<Self> {
        if bytes.len() < PREAMBLE_LEN || bytes[..4] != REPLAY_MAGIC {
            return Err(ReplayError::BadMagic);
        }
        let mut preamble = Reader::new(&bytes[4..PREAMBLE_LEN]);
        let version = preamble.u32().unwrap_or_default();
        if version != REPLAY_VERSION {
            return Err(ReplayError::UnsupportedVersion(version));
        }
        let stored = preamble.u32().unwrap_or_default();
        let compressed = &bytes[PREAMBLE_LEN..];
        let computed = crc32fast::hash(compressed);
        if stored != computed {
            return Err(ReplayError::ChecksumMismatch { stored, computed });
        }

        let body = lz4_flex::decompress_size_prepended(compressed)
            .map_err(|e| ReplayError::Corrupt(e.to_string()))?;
        let truncated = || ReplayError::Corrupt("truncated body".to_owned());
        let mut reader = Reader::new(&body);

        let name_len = reader.u8().ok_or_else(truncated)?;
        let name = reader.take(usize::from(name_len)).ok_or_else(truncated)?;
        let name = std::str::from_utf8(name)
            .map_err(|_| ReplayError::Corrupt("engine name is not UTF-8".to_owned()))?;
        let engine: EngineKind = name.parse()?;

        let config_len = reader.u32().ok_or_else(truncated)?;
        let config = reader.take(config_len as usize).ok_or_else(truncated)?.to_vec();

        let count = reader.u32().ok_or_else(truncated)?;
        let mut inputs = Vec::new();
        for _ in 0..count {
            let len = reader.u32().ok_or_else(truncated)?;
            inputs.push(reader.take(len as usize).ok_or_else(truncated)?.to_vec());
        }
        let final_fingerprint = reader.u64().ok_or_else(truncated)?;
        if !reader.is_done() {
            return Err(ReplayError::Corrupt("trailing bytes".to_owned()));
        }

        Ok(Self {
            engine,
            config,
            inputs,
            final_fingerprint,
        })
    }

    /// Writes the replay to `path`.
    ///
    /// # Errors
    ///
    /// Propagates filesystem errors.
    pub fn save(&self, path: impl AsRef<Path>) -> ReplayResult<()> {
        let bytes = self.to_bytes();
        std::fs::write(path.as_ref(), &bytes)?;
        tracing::info!(
            path = %path.as_ref().display(),
            steps = self.steps(),
            bytes = bytes.len(),
            "replay written"
        );
        Ok(())
    }

    /// Reads a replay from `path`.
    ///
    /// # Errors
    ///
    /// Filesystem errors, or anything [`Self::from_bytes`] rejects.
    pub fn load(path: impl AsRef<Path>) -> ReplayResult<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    /// Re-runs the lineage on `engine` and checks the final fingerprint.
    ///
    /// # Errors
    ///
    /// `Lifecycle` if any step fails, `Diverged` if the end state differs.
    pub fn verify<E: SimulationEngine>(&self, engine: E) -> ReplayResult<()> {
        let mut lifecycle = Lifecycle::new(engine, NegotiationLimits::default());
        lifecycle.adopt_config(Configuration::new(self.config.clone()))?;
        let mut actual = fingerprint(lifecycle.start()?.as_bytes());
        for input in &self.inputs {
            actual = fingerprint(lifecycle.step(input)?.as_bytes());
        }
        if actual != self.final_fingerprint {
            return Err(ReplayError::Diverged {
                expected: self.final_fingerprint,
                actual,
            });
        }
        tracing::info!(engine = %self.engine, steps = self.steps(), "replay verified");
        Ok(())
    }

    /// [`Self::verify`] against a fresh instance of the recorded engine.
    ///
    /// # Errors
    ///
    /// As [`Self::verify`].
    pub fn verify_recorded_engine(&self) -> ReplayResult<()> {
        self.verify(self.engine.build().engine)
    }
}

/// Little-endian cursor over a byte slice.
struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.position.checked_add(len)?;
        let slice = self.bytes.get(self.position..end)?;
        self.position = end;
        Some(slice)
    }

    fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn u32(&mut self) -> Option<u32> {
        self.take(4)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> Option<u64> {
        self.take(8)
            .and_then(|b| b.try_into().ok())
            .map(u64::from_le_bytes)
    }

    fn is_done(&self) -> bool {
        self.position == self.bytes.len()
    }
}
