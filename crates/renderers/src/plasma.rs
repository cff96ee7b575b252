use engine::{
    write_params_in_order, write_standard_fields, FrameContext, ParamSet, RendererDescriptor,
};

const SHADER: &str = include_str!("../shaders/plasma.wgsl");

const PARAMS: &[(&str, f32)] = &[
    ("speed", 0.8),
    ("scale", 3.0),
    ("hue_shift", 0.0),
    ("contrast", 1.2),
];

/// Additive-sine plasma, the ambient classic.
pub struct Plasma;

impl RendererDescriptor for Plasma {
    fn id(&self) -> &'static str {
        "plasma"
    }

    fn default_params(&self) -> ParamSet {
        ParamSet::from_pairs(PARAMS)
    }

    fn shader_source(&self) -> &'static str {
        SHADER
    }

    fn uniform_float_count(&self) -> usize {
        // 4 standard fields + 4 params, no padding needed.
        8
    }

    fn write_uniforms(&self, out: &mut [f32], frame: &FrameContext, params: &ParamSet) {
        write_standard_fields(out, frame);
        write_params_in_order(out, params);
    }
}
