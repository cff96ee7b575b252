use engine::{
    write_params_in_order, write_standard_fields, FrameContext, ParamSet, RendererDescriptor,
};

const SHADER: &str = include_str!("../shaders/ripple.wgsl");

const PARAMS: &[(&str, f32)] = &[
    ("speed", 1.0),
    ("frequency", 18.0),
    ("amplitude", 0.6),
    ("decay", 2.4),
    ("hue_shift", 0.62),
    ("center_glow", 0.5),
];

/// Concentric rings radiating from the surface center.
pub struct Ripple;

impl RendererDescriptor for Ripple {
    fn id(&self) -> &'static str {
        "ripple"
    }

    fn default_params(&self) -> ParamSet {
        ParamSet::from_pairs(PARAMS)
    }

    fn shader_source(&self) -> &'static str {
        SHADER
    }

    fn uniform_float_count(&self) -> usize {
        // 4 standard fields + 6 params + 2 floats of padding.
        12
    }

    fn write_uniforms(&self, out: &mut [f32], frame: &FrameContext, params: &ParamSet) {
        write_standard_fields(out, frame);
        write_params_in_order(out, params);
    }
}
