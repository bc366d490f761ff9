//! # Host Configuration
//!
//! Loaded once at startup from TOML. Every key is optional; missing keys
//! take the values of [`HostConfig::default`].
//!
//! ```toml
//! engine = "life"
//! steps = 600
//! history_depth = 8
//! replay = "runs/life.sbrp"
//!
//! [viewport]
//! width = 384
//! height = 256
//!
//! [negotiation]
//! initial_capacity = 0
//! max_capacity = 16777216
//!
//! [input]
//! mode = "scripted"
//! frames = ["", "0100000002000000"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use simbridge_core::{NegotiationLimits, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_CAPACITY};
use simbridge_sims::EngineKind;

use crate::error::{ConfigError, ConfigResult};

/// Largest accepted viewport side.
pub const MAX_VIEWPORT: u32 = 8192;

/// Top-level host settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Which simulation to run.
    pub engine: EngineKind,
    /// Steps to run after the initial state.
    pub steps: u64,
    /// Render target size.
    pub viewport: ViewportConfig,
    /// Buffer negotiation limits.
    pub negotiation: NegotiationConfig,
    /// Retained states for recovery.
    pub history_depth: usize,
    /// Where step inputs come from.
    pub input: InputConfig,
    /// Replay output file.
    pub replay: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            steps: 300,
            viewport: ViewportConfig::default(),
            negotiation: NegotiationConfig::default(),
            history_depth: 16,
            input: InputConfig::default(),
            replay: None,
        }
    }
}

impl HostConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed TOML, `Invalid` for out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), engine = %config.engine, "host config loaded");
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_owned(),
            })
        };
        let ViewportConfig { width, height } = self.viewport;
        if width == 0 || height == 0 {
            return invalid("viewport", "width and height must be positive");
        }
        if width > MAX_VIEWPORT || height > MAX_VIEWPORT {
            return invalid("viewport", "side exceeds 8192 pixels");
        }
        if self.negotiation.max_capacity == 0 {
            return invalid("negotiation.max_capacity", "must be positive");
        }
        if self.negotiation.initial_capacity > self.negotiation.max_capacity {
            return invalid(
                "negotiation.initial_capacity",
                "must not exceed max_capacity",
            );
        }
        if self.history_depth == 0 {
            return invalid("history_depth", "must retain at least one state");
        }
        self.input.decode_frames().map(drop)
    }
}

/// Render target size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportConfig {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
        }
    }
}

/// Negotiation limits as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NegotiationConfig {
    /// First capacity offered.
    pub initial_capacity: usize,
    /// Largest capacity ever allocated.
    pub max_capacity: usize,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

impl From<NegotiationConfig> for NegotiationLimits {
    fn from(config: NegotiationConfig) -> Self {
        Self {
            initial_capacity: config.initial_capacity,
            max_capacity: config.max_capacity,
        }
    }
}

/// Input source selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InputConfig {
    /// Every step gets an empty input.
    #[default]
    Silent,
    /// Steps cycle through fixed frames.
    Scripted {
        /// Hex-encoded input frames.
        frames: Vec<String>,
    },
}

impl InputConfig {
    /// Decodes scripted frames; empty for [`InputConfig::Silent`].
    ///
    /// # Errors
    ///
    /// `Invalid` when a frame is not hex or the script is empty.
    pub fn decode_frames(&self) -> ConfigResult<Vec<Vec<u8>>> {
        match self {
            Self::Silent => Ok(Vec::new()),
            Self::Scripted { frames } if frames.is_empty() => Err(ConfigError::Invalid {
                field: "input.frames",
                reason: "scripted input needs at least one frame".to_owned(),
            }),
            Self::Scripted { frames } => frames
                .iter()
                .enumerate()
                .map(|(i, frame)| {
                    decode_hex(frame).ok_or_else(|| ConfigError::Invalid {
                        field: "input.frames",
                        reason: format!("frame {i} is not an even-length hex string"),
                    })
                })
                .collect(),
        }
    }
}

/// Decodes `"0aff"` into `[0x0a, 0xff]`. Underscores are ignored.
fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|&b| b != b'_').collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let hi = char::from(pair[0]).to_digit(16)?;
            let lo = char::from(pair[1]).to_digit(16)?;
            u8::try_from(hi << 4 | lo).ok()
        })
        .collect()
}
