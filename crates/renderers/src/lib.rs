//! The closed set of renderer descriptors Glowpane ships with.
//!
//! Each renderer lives in its own module with its own parameter record and
//! WGSL fragment shader; [`RendererKind`] is the registry, resolving an
//! identifier to a descriptor through an exhaustive match so an unknown
//! selection is a compile-time (or CLI-parse-time) error, never a runtime
//! lookup failure.

use std::fmt;
use std::str::FromStr;

use engine::RendererDescriptor;

mod aurora;
mod plasma;
mod ripple;

pub use aurora::Aurora;
pub use plasma::Plasma;
pub use ripple::Ripple;

/// Every renderer this build knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    Aurora,
    Plasma,
    Ripple,
}

/// All registered kinds, in presentation order.
pub const ALL: [RendererKind; 3] = [
    RendererKind::Aurora,
    RendererKind::Plasma,
    RendererKind::Ripple,
];

impl RendererKind {
    /// Resolves the kind to its descriptor.
    pub fn descriptor(self) -> Box<dyn RendererDescriptor> {
        match self {
            RendererKind::Aurora => Box::new(Aurora),
            RendererKind::Plasma => Box::new(Plasma),
            RendererKind::Ripple => Box::new(Ripple),
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            RendererKind::Aurora => "aurora",
            RendererKind::Plasma => "plasma",
            RendererKind::Ripple => "ripple",
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned when an identifier does not name a registered renderer.
#[derive(Debug)]
pub struct UnknownRenderer(pub String);

impl std::error::Error for UnknownRenderer {}

impl fmt::Display for UnknownRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = ALL.iter().map(|kind| kind.id()).collect();
        write!(
            f,
            "unknown renderer '{}'; known renderers: {}",
            self.0,
            known.join(", ")
        )
    }
}

impl FromStr for RendererKind {
    type Err = UnknownRenderer;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .copied()
            .find(|kind| kind.id() == value)
            .ok_or_else(|| UnknownRenderer(value.to_string()))
    }
}
