//! WGSL validation for every shader the crate ships.
//!
//! Shaders are only compiled by the driver at runtime, so these parse and
//! validate them with naga and check that the WGSL struct layouts match the
//! Rust `Pod` types uploaded into them.

use fluidbox::gpu::{kernel_source, RenderUniforms, RENDER_WGSL, WORKGROUP_SIZE};
use fluidbox::{Particle, Stage, StageParams};

fn parse(code: &str) -> Result<naga::Module, String> {
    naga::front::wgsl::parse_str(code).map_err(|e| format!("WGSL parse error: {:?}", e))
}

fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
    let module = parse(code)?;
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;
    Ok(module)
}

/// Size in bytes of the named struct as WGSL lays it out.
fn struct_size(module: &naga::Module, name: &str) -> u32 {
    let mut layouter = naga::proc::Layouter::default();
    layouter.update(module.to_ctx()).expect("layout");
    let (handle, _) = module
        .types
        .iter()
        .find(|(_, ty)| ty.name.as_deref() == Some(name))
        .unwrap_or_else(|| panic!("struct {} not found", name));
    layouter[handle].size
}

fn entry_points(module: &naga::Module) -> Vec<(&str, naga::ShaderStage)> {
    module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect()
}

#[test]
fn test_density_kernel_validates() {
    let source = kernel_source(Stage::Density).unwrap();
    let module = validate_wgsl(&source).unwrap();
    assert_eq!(entry_points(&module), vec![("main", naga::ShaderStage::Compute)]);
    assert_eq!(module.entry_points[0].workgroup_size, [WORKGROUP_SIZE, 1, 1]);
}

#[test]
fn test_force_kernel_validates() {
    let source = kernel_source(Stage::Force).unwrap();
    let module = validate_wgsl(&source).unwrap();
    assert_eq!(entry_points(&module), vec![("main", naga::ShaderStage::Compute)]);
    assert_eq!(module.entry_points[0].workgroup_size, [WORKGROUP_SIZE, 1, 1]);
}

#[test]
fn test_impulse_has_no_kernel() {
    assert!(kernel_source(Stage::Impulse).is_none());
}

#[test]
fn test_render_shader_validates() {
    let module = validate_wgsl(RENDER_WGSL).unwrap();
    let entries = entry_points(&module);
    for expected in [
        ("vs_main", naga::ShaderStage::Vertex),
        ("fs_main", naga::ShaderStage::Fragment),
        ("vs_floor", naga::ShaderStage::Vertex),
        ("fs_floor", naga::ShaderStage::Fragment),
    ] {
        assert!(entries.contains(&expected), "missing {:?}", expected);
    }
}

#[test]
fn test_kernel_structs_match_host_layout() {
    let module = validate_wgsl(&kernel_source(Stage::Force).unwrap()).unwrap();
    assert_eq!(struct_size(&module, "Particle") as usize, std::mem::size_of::<Particle>());
    assert_eq!(struct_size(&module, "StageParams") as usize, std::mem::size_of::<StageParams>());
}

#[test]
fn test_render_uniforms_match_host_layout() {
    let module = validate_wgsl(RENDER_WGSL).unwrap();
    assert_eq!(
        struct_size(&module, "RenderUniforms") as usize,
        std::mem::size_of::<RenderUniforms>()
    );
}

#[test]
fn test_broken_kernel_is_rejected() {
    let source = kernel_source(Stage::Density).unwrap().replace("poly6(dot(r, r)", "poly7(dot(r, r)");
    assert!(validate_wgsl(&source).is_err());
}
