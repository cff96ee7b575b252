use std::borrow::Cow;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::descriptor::{FrameContext, RendererDescriptor};
use crate::error::EngineError;
use crate::params::ParamSet;
use crate::types::{PowerPreference, SurfaceGeometry};

/// Fullscreen covering triangle; positions derived from the vertex index,
/// no vertex buffer involved.
const FULLSCREEN_VERTEX_SHADER: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> @builtin(position) vec4<f32> {
    let uv = vec2<f32>(f32((vertex_index << 1u) & 2u), f32(vertex_index & 2u));
    return vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
}
"#;

/// Derives backing-buffer geometry from a logical layout size and the
/// platform's pixel-ratio hint.
///
/// The hint is clamped to `[1, max_dpr]`, each pixel dimension is floored
/// and then raised to at least 1 so a collapsed layout never produces a
/// zero-sized swapchain allocation.
pub fn backing_geometry(
    logical_size: (f64, f64),
    scale_hint: f64,
    max_dpr: f64,
) -> SurfaceGeometry {
    let dpr = scale_hint.clamp(1.0, max_dpr.max(1.0));
    let width = ((logical_size.0.max(0.0) * dpr).floor() as u32).max(1);
    let height = ((logical_size.1.max(0.0) * dpr).floor() as u32).max(1);
    SurfaceGeometry {
        width,
        height,
        dpr: dpr as f32,
    }
}

/// Owns every GPU resource needed to present frames for one descriptor.
///
/// Created once per engine, mutated in place by configure/render, released
/// as a unit. Nothing here is shared: the scratch buffer and all handles
/// are touched only from the engine's own tick timeline.
pub(crate) struct GpuState {
    _instance: wgpu::Instance,
    limits: wgpu::Limits,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    geometry: SurfaceGeometry,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    /// Host-side staging area for the uniform block, length
    /// `uniform_float_count`, overwritten every frame and never reallocated.
    scratch: Vec<f32>,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        descriptor: &dyn RendererDescriptor,
        power_preference: PowerPreference,
        initial: SurfaceGeometry,
    ) -> Result<Self, EngineError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::default();
        let window_handle = target.window_handle().map_err(|err| {
            EngineError::SurfaceUnavailable(format!("failed to acquire window handle: {err}"))
        })?;
        let display_handle = target.display_handle().map_err(|err| {
            EngineError::SurfaceUnavailable(format!("failed to acquire display handle: {err}"))
        })?;
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .map_err(|err| EngineError::SurfaceUnavailable(err.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: power_preference.to_wgpu(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| {
            tracing::debug!(error = %err, "adapter negotiation failed");
            EngineError::NoAdapter
        })?;

        let limits = adapter.limits();
        let max_dimension = limits.max_texture_dimension_2d;
        if initial.width > max_dimension || initial.height > max_dimension {
            return Err(EngineError::SurfaceUnavailable(format!(
                "requested surface {}x{} exceeds GPU max texture dimension {max_dimension}",
                initial.width, initial.height
            )));
        }

        let surface_caps = surface.get_capabilities(&adapter);
        if surface_caps.formats.is_empty() {
            return Err(EngineError::SurfaceUnavailable(
                "surface reports no supported formats".to_string(),
            ));
        }
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let alpha_mode = if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            tracing::debug!(
                available = ?surface_caps.alpha_modes,
                "premultiplied alpha not supported; using first advertised mode"
            );
            surface_caps.alpha_modes[0]
        };

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("glowpane device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| EngineError::UnsupportedPlatform(err.to_string()))?;

        let adapter_info = adapter.get_info();
        tracing::info!(
            adapter = %adapter_info.name,
            backend = ?adapter_info.backend,
            ?surface_format,
            ?alpha_mode,
            power = %power_preference,
            "initialized GPU device"
        );

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: initial.width,
            height: initial.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        let uniform_float_count = descriptor.uniform_float_count();
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: (uniform_float_count * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("renderer pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fullscreen triangle vertex shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(FULLSCREEN_VERTEX_SHADER)),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(descriptor.id()),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(descriptor.shader_source())),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("renderer pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            _instance: instance,
            limits,
            surface,
            device,
            queue,
            config,
            geometry: initial,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            scratch: vec![0.0; uniform_float_count],
        })
    }

    pub(crate) fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    /// Applies new backing-buffer geometry and reconfigures the surface.
    /// A no-op when nothing changed; a request beyond the adapter's texture
    /// limits keeps the previous size.
    pub(crate) fn apply_geometry(&mut self, geometry: SurfaceGeometry) {
        if geometry == self.geometry {
            tracing::trace!("geometry unchanged; skipping surface reconfigure");
            return;
        }

        let max_dimension = self.limits.max_texture_dimension_2d;
        if geometry.width > max_dimension || geometry.height > max_dimension {
            tracing::warn!(
                width = geometry.width,
                height = geometry.height,
                max_dimension,
                "requested geometry exceeds GPU limits; keeping previous size"
            );
            return;
        }

        self.geometry = geometry;
        self.config.width = geometry.width;
        self.config.height = geometry.height;
        self.surface.configure(&self.device, &self.config);
        tracing::info!(
            width = geometry.width,
            height = geometry.height,
            dpr = geometry.dpr,
            "reconfigured surface"
        );
    }

    /// Renders one frame: serialize uniforms into the scratch buffer, upload,
    /// record a single clear-and-draw pass over the covering triangle, submit.
    pub(crate) fn render(
        &mut self,
        time: f32,
        descriptor: &dyn RendererDescriptor,
        params: &ParamSet,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame_context = FrameContext {
            time,
            width: self.geometry.width,
            height: self.geometry.height,
            dpr: self.geometry.dpr,
        };
        descriptor.write_uniforms(&mut self.scratch, &frame_context, params);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&self.scratch));

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        tracing::trace!(
            time,
            width = self.geometry.width,
            height = self.geometry.height,
            "presented frame"
        );
        Ok(())
    }

    /// Releases the uniform buffer ahead of drop. Must run at most once;
    /// the engine facade guards re-entry.
    pub(crate) fn release(&self) {
        self.uniform_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_floors_and_clamps() {
        let geometry = backing_geometry((1024.5, 768.25), 2.0, 3.0);
        assert_eq!(geometry.width, 2049);
        assert_eq!(geometry.height, 1536);
        assert_eq!(geometry.dpr, 2.0);
    }

    #[test]
    fn dpr_hint_is_clamped_to_bounds() {
        assert_eq!(backing_geometry((100.0, 100.0), 0.5, 3.0).dpr, 1.0);
        assert_eq!(backing_geometry((100.0, 100.0), 4.5, 3.0).dpr, 3.0);
        assert_eq!(backing_geometry((100.0, 100.0), 2.5, 2.0).dpr, 2.0);
    }

    #[test]
    fn degenerate_layouts_never_collapse_to_zero() {
        let geometry = backing_geometry((0.0, 0.0), 2.0, 3.0);
        assert_eq!((geometry.width, geometry.height), (1, 1));

        let tiny = backing_geometry((0.25, 0.25), 1.0, 3.0);
        assert_eq!((tiny.width, tiny.height), (1, 1));
    }

    #[test]
    fn max_dpr_below_one_still_yields_a_valid_ratio() {
        let geometry = backing_geometry((100.0, 100.0), 2.0, 0.0);
        assert_eq!(geometry.dpr, 1.0);
        assert_eq!(geometry.width, 100);
    }
}
