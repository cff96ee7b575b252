/// Failures that can surface while bringing an [`Engine`](crate::Engine) up.
///
/// All variants are fatal at initialization; the engine never retries them.
/// Faults that occur after a successful `create` (a lost swapchain image,
/// device removal) are reported per tick as [`wgpu::SurfaceError`] and are
/// deliberately not folded into this taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The host has a GPU API but could not hand us a usable device.
    #[error("platform cannot provide a usable GPU device: {0}")]
    UnsupportedPlatform(String),
    /// Adapter negotiation yielded nothing compatible with the surface.
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    /// A presentable surface could not be obtained from the target handle.
    #[error("could not obtain a presentable surface: {0}")]
    SurfaceUnavailable(String),
    /// The renderer descriptor violates the uniform layout contract.
    #[error("renderer descriptor '{id}' violates the uniform layout contract: {reason}")]
    DescriptorContract { id: String, reason: String },
}
