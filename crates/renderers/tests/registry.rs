use engine::{validate_layout, FrameContext};
use renderers::ALL;

#[test]
fn every_registered_descriptor_satisfies_the_uniform_contract() {
    for kind in ALL {
        let descriptor = kind.descriptor();
        validate_layout(descriptor.as_ref())
            .unwrap_or_else(|err| panic!("{kind} violates the layout contract: {err}"));
    }
}

#[test]
fn descriptor_ids_match_their_registry_keys() {
    for kind in ALL {
        assert_eq!(kind.descriptor().id(), kind.id());
    }
}

#[test]
fn writers_cover_header_and_params_for_every_descriptor() {
    let frame = FrameContext {
        time: 2.5,
        width: 1920,
        height: 1080,
        dpr: 1.5,
    };

    for kind in ALL {
        let descriptor = kind.descriptor();
        let params = descriptor.default_params();
        let mut out = vec![0.0_f32; descriptor.uniform_float_count()];
        descriptor.write_uniforms(&mut out, &frame, &params);

        assert_eq!(&out[0..4], &[2.5, 1920.0, 1080.0, 1.5], "{kind} header");
        let written: Vec<f32> = out[4..4 + params.len()].to_vec();
        let expected: Vec<f32> = params.values().collect();
        assert_eq!(written, expected, "{kind} params in declared order");
    }
}

#[test]
fn shader_sources_declare_the_expected_entry_point() {
    for kind in ALL {
        let descriptor = kind.descriptor();
        assert!(
            descriptor.shader_source().contains("fn fs_main"),
            "{kind} shader lacks an fs_main entry point"
        );
    }
}
