/// WGSL for the whole scene. Both pipelines share the `Globals` block:
/// `vs_mesh`/`fs_mesh` shade the instanced box with ambient plus one
/// directional light, `vs_line`/`fs_line` draw the helpers in vertex color.
pub const SCENE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    ambient: vec4<f32>,
    sun_direction: vec4<f32>,
    sun_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct MeshIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) albedo: vec4<f32>,
};

struct MeshOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) albedo: vec4<f32>,
};

@vertex
fn vs_mesh(in: MeshIn) -> MeshOut {
    let model = mat4x4<f32>(in.model_0, in.model_1, in.model_2, in.model_3);
    // Uniform scale only, so the model matrix is fine for normals.
    let n = (model * vec4<f32>(in.normal, 0.0)).xyz;

    var out: MeshOut;
    out.clip = globals.view_proj * model * vec4<f32>(in.position, 1.0);
    out.normal = n;
    out.albedo = in.albedo;
    return out;
}

@fragment
fn fs_mesh(in: MeshOut) -> @location(0) vec4<f32> {
    let lambert = max(dot(normalize(in.normal), globals.sun_direction.xyz), 0.0);
    let light = globals.ambient.rgb + globals.sun_color.rgb * lambert;
    return vec4<f32>(in.albedo.rgb * light, in.albedo.a);
}

struct LineIn {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(in: LineIn) -> LineOut {
    var out: LineOut;
    out.clip = globals.view_proj * vec4<f32>(in.position, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_line(in: LineOut) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
