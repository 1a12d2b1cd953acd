//! Effects shipped with the engine.

use std::str::FromStr;

use crate::foundation::error::RasterFxError;
use crate::fx::contract::Effect;
use crate::render::plugin::{EffectFactory, FxPlugin, PluginInfo};

pub mod bloom;
pub mod blur;
pub mod noise;
pub mod snp;

pub use bloom::Bloom;
pub use blur::Blur;
pub use noise::OctaveNoise;
pub use snp::SaltAndPepper;

/// Vendor string of every built-in plugin.
pub const VENDOR: &str = "rasterfx";

fn make<E: Effect + Default + 'static>() -> Box<dyn Effect> {
    Box::new(E::default())
}

/// A built-in effect type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// Gaussian blur of the input.
    Blur,
    /// Inverts random pixels of the input.
    SaltAndPepper,
    /// Multi-scale glow around bright areas.
    Bloom,
    /// Gray multi-octave noise without inputs.
    OctaveNoise,
}

impl Builtin {
    /// Every built-in, in registration order.
    pub const ALL: [Self; 4] = [
        Self::Blur,
        Self::SaltAndPepper,
        Self::Bloom,
        Self::OctaveNoise,
    ];

    /// Name used on the command line and in plugin identifiers.
    pub fn name(self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::SaltAndPepper => "salt-and-pepper",
            Self::Bloom => "bloom",
            Self::OctaveNoise => "noise",
        }
    }

    /// Look a built-in up by [`Builtin::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    fn note(self) -> &'static str {
        match self {
            Self::Blur => "gaussian blur",
            Self::SaltAndPepper => "salt and pepper noise",
            Self::Bloom => "multi-scale glow",
            Self::OctaveNoise => "multi-octave value noise",
        }
    }

    fn factory(self) -> EffectFactory {
        match self {
            Self::Blur => make::<Blur>,
            Self::SaltAndPepper => make::<SaltAndPepper>,
            Self::Bloom => make::<Bloom>,
            Self::OctaveNoise => make::<OctaveNoise>,
        }
    }

    /// Plugin exposing this effect to a host.
    pub fn plugin(self) -> FxPlugin {
        FxPlugin::new(PluginInfo::new(self.name(), VENDOR, self.note()), self.factory())
    }
}

impl FromStr for Builtin {
    type Err = RasterFxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            let known: Vec<_> = Self::ALL.iter().map(|b| b.name()).collect();
            RasterFxError::validation(format!(
                "unknown effect '{s}' (expected one of: {})",
                known.join(", ")
            ))
        })
    }
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/fx/builtin/mod.rs"]
mod tests;
