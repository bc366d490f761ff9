//! Engine selection by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use simbridge_engine::SimulationEngine;

use crate::bounce::BounceEngine;
use crate::life::LifeEngine;
use crate::view::{BounceView, LifeView, StateInterpreter};

/// The simulations this crate ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// [`BounceEngine`].
    #[default]
    Bounce,
    /// [`LifeEngine`].
    Life,
}

impl EngineKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 2] = [Self::Bounce, Self::Life];

    /// Name used in configuration files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bounce => "bounce",
            Self::Life => "life",
        }
    }

    /// Instantiates the engine together with its interpreter.
    #[must_use]
    pub fn build(self) -> SimulationPlugin {
        tracing::debug!(engine = self.name(), "building simulation plugin");
        match self {
            Self::Bounce => SimulationPlugin {
                kind: self,
                engine: Box::new(BounceEngine),
                interpreter: Box::new(BounceView::default()),
            },
            Self::Life => SimulationPlugin {
                kind: self,
                engine: Box::new(LifeEngine),
                interpreter: Box::new(LifeView::default()),
            },
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown engine name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown engine `{0}`")]
pub struct UnknownEngine(pub String);

impl FromStr for EngineKind {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownEngine(s.to_owned()))
    }
}

/// An engine paired with the interpreter that can draw its states.
pub struct SimulationPlugin {
    /// Which engine this is.
    pub kind: EngineKind,
    /// The engine.
    pub engine: Box<dyn SimulationEngine>,
    /// Its interpreter.
    pub interpreter: Box<dyn StateInterpreter>,
}

impl fmt::Debug for SimulationPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationPlugin")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        engine: EngineKind,
    }

    #[test]
    fn test_serde_names() {
        let parsed: Wrapper = toml::from_str("engine = \"life\"").unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(parsed.engine, EngineKind::Life);
        assert!(toml::from_str::<Wrapper>("engine = \"Life\"").is_err());
    }

    #[test]
    fn test_from_str_and_display_agree() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.to_string().parse::<EngineKind>(), Ok(kind));
        }
        assert_eq!(
            "pong".parse::<EngineKind>(),
            Err(UnknownEngine("pong".to_owned()))
        );
    }

    #[test]
    fn test_build_names_match() {
        for kind in EngineKind::ALL {
            let plugin = kind.build();
            assert_eq!(plugin.engine.name(), kind.name());
            assert_eq!(plugin.kind, kind);
        }
    }
}
