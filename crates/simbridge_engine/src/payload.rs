//! Opaque payloads handed between host and engine.

/// Static parameters of a simulation run.
///
/// Immutable once produced. Hosts may persist and replay it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Configuration(Vec<u8>);

impl Configuration {
    /// Wraps raw configuration bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the configuration, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the configuration is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Configuration {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// One snapshot of a simulation, tagged with the step that produced it.
///
/// Step 0 is the output of `starting_state`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct State {
    step: u64,
    bytes: Vec<u8>,
}

impl State {
    /// Wraps raw state bytes produced at `step`.
    #[must_use]
    pub fn new(step: u64, bytes: Vec<u8>) -> Self {
        Self { step, bytes }
    }

    /// Returns the step index.
    #[inline]
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the state, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns the length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the state is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for State {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
