use engine::{
    write_params_in_order, write_standard_fields, FrameContext, ParamSet, RendererDescriptor,
};

const SHADER: &str = include_str!("../shaders/aurora.wgsl");

/// Parameter declarations, in uniform layout order.
const PARAMS: &[(&str, f32)] = &[
    ("speed", 0.6),
    ("scale", 1.6),
    ("drift", 0.4),
    ("hue_shift", 0.55),
    ("band_count", 5.0),
    ("glow", 0.8),
    ("warp", 0.35),
    ("contrast", 1.1),
    ("vignette", 0.45),
    ("grain", 0.03),
];

/// Drifting curtains of light over a dark sky.
pub struct Aurora;

impl RendererDescriptor for Aurora {
    fn id(&self) -> &'static str {
        "aurora"
    }

    fn default_params(&self) -> ParamSet {
        ParamSet::from_pairs(PARAMS)
    }

    fn shader_source(&self) -> &'static str {
        SHADER
    }

    fn uniform_float_count(&self) -> usize {
        // 4 standard fields + 10 params + 2 floats of padding.
        16
    }

    fn write_uniforms(&self, out: &mut [f32], frame: &FrameContext, params: &ParamSet) {
        write_standard_fields(out, frame);
        write_params_in_order(out, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_writer_fills_header_then_params_in_declared_order() {
        let descriptor = Aurora;
        let mut out = vec![0.0_f32; descriptor.uniform_float_count()];
        let frame = FrameContext {
            time: 1.0,
            width: 800,
            height: 600,
            dpr: 2.0,
        };

        descriptor.write_uniforms(&mut out, &frame, &descriptor.default_params());

        assert_eq!(&out[0..4], &[1.0, 800.0, 600.0, 2.0]);
        let expected: Vec<f32> = PARAMS.iter().map(|(_, value)| *value).collect();
        assert_eq!(&out[4..14], expected.as_slice());
        assert_eq!(&out[14..16], &[0.0, 0.0], "padding floats stay zero");
    }
}
