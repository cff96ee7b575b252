use crate::error::EngineError;
use crate::params::ParamSet;

/// Standard uniform fields preceding the parameter block: time, width,
/// height, device pixel ratio.
pub const STANDARD_FIELD_COUNT: usize = 4;

/// Per-frame inputs handed to a descriptor's uniform writer.
///
/// `width`/`height` are the backing-buffer pixel dimensions, not logical
/// display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub time: f32,
    pub width: u32,
    pub height: u32,
    pub dpr: f32,
}

/// A renderer the engine can drive: shader program plus a typed set of
/// numeric parameters and the function that serializes them.
///
/// The uniform byte layout is fixed:
///
/// ```text
///   [time, width, height, dpr, param_0 .. param_k, pad ..]   (all f32)
/// ```
///
/// with the total byte length a multiple of 16. The shader-side struct must
/// mirror this field order exactly. The engine can only length-check the
/// contract at construction time; field-order agreement between
/// `default_params` and the shader source is the descriptor author's
/// precondition and is not verifiable at runtime.
pub trait RendererDescriptor {
    /// Stable identifier, unique across the registered descriptor set.
    fn id(&self) -> &'static str;

    /// Parameter names and defaults, in uniform layout order.
    fn default_params(&self) -> ParamSet;

    /// WGSL fragment program with an `fs_main` entry point reading the
    /// uniform struct at group 0, binding 0.
    fn shader_source(&self) -> &'static str;

    /// Total uniform length in floats; a positive multiple of 4 equal to
    /// `4 + param_count` rounded up to the next multiple of 4.
    fn uniform_float_count(&self) -> usize;

    /// Fills `out[0..uniform_float_count())` for one frame. Must be pure and
    /// must not retain `out` beyond the call; the engine reuses the slice
    /// every tick. Padding floats should be left untouched (they stay zero).
    fn write_uniforms(&self, out: &mut [f32], frame: &FrameContext, params: &ParamSet);
}

/// Writes the four standard fields into `out[0..4]`.
pub fn write_standard_fields(out: &mut [f32], frame: &FrameContext) {
    out[0] = frame.time;
    out[1] = frame.width as f32;
    out[2] = frame.height as f32;
    out[3] = frame.dpr;
}

/// Writes the parameter values in declaration order starting at `out[4]`.
pub fn write_params_in_order(out: &mut [f32], params: &ParamSet) {
    for (index, value) in params.values().enumerate() {
        out[STANDARD_FIELD_COUNT + index] = value;
    }
}

/// Checks the construction-time half of the uniform contract.
///
/// Rejects float counts that are zero, not a multiple of 4, too small for
/// the declared parameters, or padded by a full 16-byte row (the count must
/// be exactly `4 + param_count` rounded up to the next multiple of 4).
pub fn validate_layout(descriptor: &dyn RendererDescriptor) -> Result<(), EngineError> {
    let count = descriptor.uniform_float_count();
    let param_count = descriptor.default_params().len();
    let contract = |reason: String| EngineError::DescriptorContract {
        id: descriptor.id().to_string(),
        reason,
    };

    if count == 0 {
        return Err(contract("uniform float count is zero".to_string()));
    }
    if count % 4 != 0 {
        return Err(contract(format!(
            "uniform float count {count} is not a multiple of 4"
        )));
    }
    let required = (STANDARD_FIELD_COUNT + param_count).next_multiple_of(4);
    if count != required {
        return Err(contract(format!(
            "uniform float count {count} does not match {required} \
             (4 standard fields + {param_count} params + minimal padding)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        params: &'static [(&'static str, f32)],
        count: usize,
    }

    impl RendererDescriptor for Fake {
        fn id(&self) -> &'static str {
            "fake"
        }

        fn default_params(&self) -> ParamSet {
            ParamSet::from_pairs(self.params)
        }

        fn shader_source(&self) -> &'static str {
            ""
        }

        fn uniform_float_count(&self) -> usize {
            self.count
        }

        fn write_uniforms(&self, out: &mut [f32], frame: &FrameContext, params: &ParamSet) {
            write_standard_fields(out, frame);
            write_params_in_order(out, params);
        }
    }

    const TEN: &[(&str, f32)] = &[
        ("a", 1.0),
        ("b", 2.0),
        ("c", 3.0),
        ("d", 4.0),
        ("e", 5.0),
        ("f", 6.0),
        ("g", 7.0),
        ("h", 8.0),
        ("i", 9.0),
        ("j", 10.0),
    ];

    #[test]
    fn accepts_minimally_padded_layouts() {
        assert!(validate_layout(&Fake {
            params: TEN,
            count: 16,
        })
        .is_ok());
        assert!(validate_layout(&Fake {
            params: &[("a", 0.0), ("b", 0.0), ("c", 0.0), ("d", 0.0)],
            count: 8,
        })
        .is_ok());
    }

    #[test]
    fn rejects_zero_and_non_multiple_of_four_counts() {
        assert!(validate_layout(&Fake {
            params: &[],
            count: 0,
        })
        .is_err());
        assert!(validate_layout(&Fake {
            params: &[("a", 0.0)],
            count: 6,
        })
        .is_err());
    }

    #[test]
    fn rejects_counts_too_small_for_params() {
        let err = validate_layout(&Fake {
            params: TEN,
            count: 12,
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::DescriptorContract { .. }));
    }

    #[test]
    fn rejects_a_full_row_of_padding() {
        // 4 + 10 params rounds up to 16; 20 would carry a dead 16-byte row.
        assert!(validate_layout(&Fake {
            params: TEN,
            count: 20,
        })
        .is_err());
    }

    #[test]
    fn writer_places_header_and_params_leaving_padding_zero() {
        let fake = Fake {
            params: TEN,
            count: 16,
        };
        let mut out = vec![0.0_f32; 16];
        let frame = FrameContext {
            time: 1.0,
            width: 800,
            height: 600,
            dpr: 2.0,
        };
        fake.write_uniforms(&mut out, &frame, &fake.default_params());

        assert_eq!(&out[0..4], &[1.0, 800.0, 600.0, 2.0]);
        assert_eq!(
            &out[4..14],
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
        );
        assert_eq!(&out[14..16], &[0.0, 0.0]);
    }
}
