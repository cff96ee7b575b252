/// Adapter power profile requested at initialization.
///
/// The engine drives an ambient visual, so it defaults to the low-power
/// profile; callers that want the discrete GPU must opt in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerPreference {
    LowPower,
    HighPerformance,
}

impl Default for PowerPreference {
    fn default() -> Self {
        Self::LowPower
    }
}

impl PowerPreference {
    pub(crate) fn to_wgpu(self) -> wgpu::PowerPreference {
        match self {
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
        }
    }
}

impl std::fmt::Display for PowerPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerPreference::LowPower => f.write_str("low-power"),
            PowerPreference::HighPerformance => f.write_str("high-performance"),
        }
    }
}

/// Immutable options accepted by [`Engine::create`](crate::Engine::create).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Adapter selection hint forwarded to the GPU backend.
    pub power_preference: PowerPreference,
    /// When true and the platform signals a reduced-motion preference, the
    /// engine renders a single still frame per `start()` instead of looping.
    pub respect_reduced_motion: bool,
    /// Upper bound applied to the device pixel ratio hint before sizing the
    /// backing buffer. Bounds swapchain memory on very dense displays.
    pub max_dpr: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            power_preference: PowerPreference::default(),
            respect_reduced_motion: true,
            max_dpr: 3.0,
        }
    }
}

/// Backing-buffer geometry currently applied to the presentation surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    /// Backing-buffer width in physical pixels, never zero.
    pub width: u32,
    /// Backing-buffer height in physical pixels, never zero.
    pub height: u32,
    /// Clamped device pixel ratio the dimensions were derived with.
    pub dpr: f32,
}
