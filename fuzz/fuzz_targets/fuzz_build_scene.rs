#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use threemf_scene::{SceneConfig, build_render_model, parser::parse_3mf};

fuzz_target!(|data: &[u8]| {
    // ZIP extraction -> XML parsing -> scene assembly, sequential and parallel
    let Ok(model) = parse_3mf(Cursor::new(data)) else {
        return;
    };

    let _ = build_render_model(&model, &SceneConfig::new().with_parallel(false));
    let _ = build_render_model(
        &model,
        &SceneConfig::new()
            .with_specular_glossiness(true)
            .with_boundary_edges(threemf_scene::BoundaryEdgePolicy::Sharp),
    );
});
