/// Forward shading for meshes and polylines.
///
/// Group 0 holds per-frame data and the shadow map, group 1 the material,
/// group 2 the object.
pub const SCENE_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // xyz direction, w intensity
    hemi_dir: vec4<f32>,
    hemi_sky: vec4<f32>,
    hemi_ground: vec4<f32>,
    // xyz direction, w intensity
    sun_dir: vec4<f32>,
    sun_diffuse: vec4<f32>,
    sun_specular: vec4<f32>,
    // x enabled, y depth scale, z darkness, w filter (0 hard, 1 exponential)
    shadow: vec4<f32>,
};

struct Material {
    diffuse: vec4<f32>,
    emissive: vec4<f32>,
    // rgb colour, w specular power
    specular: vec4<f32>,
    // x diffuse texture, y bump texture, z unlit
    flags: vec4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    // x receives shadows
    flags: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;
@group(0) @binding(1) var shadow_map: texture_2d<f32>;

@group(1) @binding(0) var<uniform> material: Material;
@group(1) @binding(1) var diffuse_tex: texture_2d<f32>;
@group(1) @binding(2) var bump_tex: texture_2d<f32>;
@group(1) @binding(3) var tex_sampler: sampler;

@group(2) @binding(0) var<uniform> object: Object;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) world_tangent: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = object.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = (object.model * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.world_tangent = (object.model * vec4<f32>(vertex.tangent, 0.0)).xyz;
    out.uv = vertex.uv;
    return out;
}

fn shadow_visibility(world_pos: vec3<f32>) -> f32 {
    if (frame.shadow.x < 0.5 || object.flags.x < 0.5) {
        return 1.0;
    }
    let clip = frame.light_view_proj * vec4<f32>(world_pos, 1.0);
    let ndc = clip.xyz / clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
    if (any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0)) || ndc.z > 1.0) {
        return 1.0;
    }

    let dims = vec2<f32>(textureDimensions(shadow_map));
    let texel = vec2<i32>(clamp(uv * dims, vec2<f32>(0.0), dims - vec2<f32>(1.0)));
    let stored = textureLoad(shadow_map, texel, 0).r;
    let scale = frame.shadow.y;

    var visibility: f32;
    if (frame.shadow.w < 0.5) {
        let occluder = log(max(stored, 1e-30)) / scale;
        visibility = select(0.0, 1.0, ndc.z - 0.002 <= occluder);
    } else {
        visibility = clamp(stored * exp(-scale * ndc.z), 0.0, 1.0);
    }
    return mix(frame.shadow.z, 1.0, visibility);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let diffuse_sample = textureSample(diffuse_tex, tex_sampler, in.uv);
    let bump_sample = textureSample(bump_tex, tex_sampler, in.uv);

    let base = material.diffuse.rgb
        * select(vec3<f32>(1.0), diffuse_sample.rgb, material.flags.x > 0.5);

    if (material.flags.z > 0.5) {
        return vec4<f32>(base + material.emissive.rgb, 1.0);
    }

    var n = normalize(in.world_normal);
    if (material.flags.y > 0.5) {
        let t = normalize(in.world_tangent - n * dot(n, in.world_tangent));
        let b = cross(n, t);
        let ts = bump_sample.xyz * 2.0 - vec3<f32>(1.0);
        n = normalize(t * ts.x + b * ts.y + n * ts.z);
    }

    let hemi_t = dot(n, normalize(frame.hemi_dir.xyz)) * 0.5 + 0.5;
    let hemi = mix(frame.hemi_ground.rgb, frame.hemi_sky.rgb, hemi_t) * frame.hemi_dir.w;

    let l = -normalize(frame.sun_dir.xyz);
    let v = normalize(frame.camera_pos.xyz - in.world_pos);
    let h = normalize(l + v);
    let visibility = shadow_visibility(in.world_pos);
    let ndl = max(dot(n, l), 0.0);
    let sun = frame.sun_diffuse.rgb * ndl * frame.sun_dir.w * visibility;
    let spec_term = pow(max(dot(n, h), 0.0), max(material.specular.w, 1.0));
    let specular = material.specular.rgb * frame.sun_specular.rgb * spec_term
        * frame.sun_dir.w * visibility * select(0.0, 1.0, ndl > 0.0);

    let color = base * (hemi + sun) + specular + material.emissive.rgb;
    return vec4<f32>(color, 1.0);
}

@fragment
fn fs_line(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(material.diffuse.rgb, 1.0);
}
"#;

/// Shadow caster pass: writes `exp(scale * depth)` from the light's view.
pub const SHADOW_SHADER: &str = r#"
struct ShadowPass {
    light_view_proj: mat4x4<f32>,
    // x depth scale
    params: vec4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    flags: vec4<f32>,
};

@group(0) @binding(0) var<uniform> pass_data: ShadowPass;
@group(1) @binding(0) var<uniform> object: Object;

struct ShadowOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) depth: f32,
};

@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> ShadowOutput {
    let clip = pass_data.light_view_proj * object.model * vec4<f32>(position, 1.0);
    var out: ShadowOutput;
    out.clip_position = clip;
    out.depth = clip.z / clip.w;
    return out;
}

@fragment
fn fs_shadow(in: ShadowOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(exp(pass_data.params.x * clamp(in.depth, 0.0, 1.0)), 0.0, 0.0, 1.0);
}
"#;

/// Separable box blur over an unfilterable single-channel texture.
pub const BLUR_SHADER: &str = r#"
struct Blur {
    // xy step direction in texels, z kernel half width
    params: vec4<f32>,
};

@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var<uniform> blur: Blur;

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    return vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
}

@fragment
fn fs_blur(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
    let dims = vec2<i32>(textureDimensions(source));
    let center = vec2<i32>(frag.xy);
    let dir = vec2<i32>(blur.params.xy);
    let radius = i32(blur.params.z);

    var sum = 0.0;
    for (var i = -radius; i <= radius; i = i + 1) {
        let coord = clamp(center + dir * i, vec2<i32>(0), dims - vec2<i32>(1));
        sum = sum + textureLoad(source, coord, 0).r;
    }
    return vec4<f32>(sum / f32(2 * radius + 1), 0.0, 0.0, 1.0);
}
"#;
