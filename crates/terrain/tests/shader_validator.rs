//! Parse and validate every WGSL module the pipelines compile, using the
//! exact embedded sources, so a shader typo fails here instead of at
//! device-side pipeline creation.

const SHADERS: [(&str, &str); 5] = [
    (
        "terrain_generate.wgsl",
        include_str!("../src/gpu/shaders/terrain_generate.wgsl"),
    ),
    (
        "terrain_normals.wgsl",
        include_str!("../src/gpu/shaders/terrain_normals.wgsl"),
    ),
    (
        "height_kernels.wgsl",
        include_str!("../src/gpu/shaders/height_kernels.wgsl"),
    ),
    (
        "normal_lines.wgsl",
        include_str!("../src/gpu/shaders/normal_lines.wgsl"),
    ),
    (
        "terrain_shade.wgsl",
        include_str!("../src/gpu/shaders/terrain_shade.wgsl"),
    ),
];

#[test]
fn all_pipeline_shaders_validate() {
    let mut errors = Vec::new();

    for (name, source) in SHADERS {
        let module = match naga::front::wgsl::parse_str(source) {
            Ok(module) => module,
            Err(e) => {
                errors.push(format!("{name} failed to parse:\n{}", e.emit_to_string(source)));
                continue;
            }
        };

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        if let Err(e) = validator.validate(&module) {
            errors.push(format!("{name} failed to validate:\n{e:?}"));
        }
    }

    assert!(errors.is_empty(), "shader validation failed:\n{}", errors.join("\n"));
}

#[test]
fn no_shader_is_missing_from_the_manifest() {
    // Every .wgsl file under src/gpu/shaders must be in the embedded list
    // above; a new shader that is not validated here is a gap.
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("src/gpu/shaders");
    let mut on_disk: Vec<String> = std::fs::read_dir(&dir)
        .expect("shader directory must exist")
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension()? != "wgsl" {
                return None;
            }
            Some(path.file_name()?.to_str()?.to_owned())
        })
        .collect();
    on_disk.sort();

    let mut listed: Vec<String> = SHADERS.iter().map(|(name, _)| name.to_string()).collect();
    listed.sort();

    assert_eq!(on_disk, listed);
}
