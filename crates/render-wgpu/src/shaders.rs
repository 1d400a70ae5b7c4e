/// WGSL shader for instanced box meshes.
///
/// `params.x` selects the material: 0 shades by view-space normal, 1 uses the
/// instance color lit by the ambient term and the key light.
pub const MESH_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    ambient: vec4<f32>,
    // xyz: direction towards the light, w: intensity.
    key_light: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) view_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) @interpolate(flat) material: f32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = world_normal;
    out.view_normal = (uniforms.view * vec4<f32>(world_normal, 0.0)).xyz;
    out.color = instance.color;
    out.material = instance.params.x;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if (in.material < 0.5) {
        return vec4<f32>(normalize(in.view_normal) * 0.5 + 0.5, 1.0);
    }
    let light_dir = normalize(uniforms.key_light.xyz);
    let diffuse = max(dot(normalize(in.world_normal), light_dir), 0.0) * uniforms.key_light.w;
    let lighting = uniforms.ambient.rgb + vec3<f32>(diffuse);
    return vec4<f32>(in.color.rgb * lighting, in.color.a);
}
"#;
