pub const ALLEY_SHADER: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    model: mat4x4<f32>,
    light_space: array<mat4x4<f32>, 3>,
    light_pos: array<vec4<f32>, 3>,
    light_color: array<vec4<f32>, 3>,
    view_pos: vec4<f32>,
    // use_textures, use_normal_map, use_fog, use_shadows
    toggles: vec4<f32>,
    // exposure, gamma, time_sec, unused
    params: vec4<f32>,
}

struct VertexInput {
    @location(0) position: vec4<f32>,
    @location(1) color: vec3<f32>,
    @location(2) normal: vec3<f32>,
    @location(3) uv: vec2<f32>,
    @location(4) tex_id: f32,
    @location(5) tangent: vec3<f32>,
    @location(6) bitangent: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) normal: vec3<f32>,
    @location(3) uv: vec2<f32>,
    @location(4) tex_id: f32,
    @location(5) tangent: vec3<f32>,
    @location(6) bitangent: vec3<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;

@group(0) @binding(1) var tex_asphalt: texture_2d<f32>;
@group(0) @binding(2) var tex_wall: texture_2d<f32>;
@group(0) @binding(3) var tex_sign: texture_2d<f32>;
@group(0) @binding(4) var tex_asphalt_n: texture_2d<f32>;
@group(0) @binding(5) var tex_wall_n: texture_2d<f32>;
@group(0) @binding(6) var albedo_sampler: sampler;

@group(0) @binding(7) var shadow_map0: texture_depth_2d;
@group(0) @binding(8) var shadow_map1: texture_depth_2d;
@group(0) @binding(9) var shadow_map2: texture_depth_2d;
@group(0) @binding(10) var shadow_sampler: sampler_comparison;

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    let world_pos = uniforms.model * vec4<f32>(input.position.xyz, 1.0);
    output.clip_position = uniforms.proj * uniforms.view * world_pos;
    output.world_pos = world_pos.xyz;
    output.color = input.color;
    output.normal = normalize((uniforms.model * vec4<f32>(input.normal, 0.0)).xyz);
    output.uv = input.uv;
    output.tex_id = input.tex_id;
    output.tangent = normalize((uniforms.model * vec4<f32>(input.tangent, 0.0)).xyz);
    output.bitangent = normalize((uniforms.model * vec4<f32>(input.bitangent, 0.0)).xyz);
    return output;
}

// PCF shadow lookup in one light's depth space. Fragments outside the
// light's ortho volume count as lit, mirroring a white border color.
fn shadow_factor(map: texture_depth_2d, world_pos: vec3<f32>, idx: i32) -> f32 {
    let clip = uniforms.light_space[idx] * vec4<f32>(world_pos, 1.0);
    let ndc = clip.xyz / clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
    if (uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 || ndc.z > 1.0 || ndc.z < 0.0) {
        return 1.0;
    }

    let texel = 1.0 / 2048.0;
    var sum = 0.0;
    for (var dy = -1; dy <= 1; dy = dy + 1) {
        for (var dx = -1; dx <= 1; dx = dx + 1) {
            let offset = vec2<f32>(f32(dx), f32(dy)) * texel;
            sum = sum + textureSampleCompareLevel(map, shadow_sampler, uv + offset, ndc.z);
        }
    }
    return sum / 9.0;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    // Sample every slot up front so control flow stays uniform.
    let asphalt = textureSample(tex_asphalt, albedo_sampler, input.uv).rgb;
    let wall = textureSample(tex_wall, albedo_sampler, input.uv).rgb;
    let sign_tex = textureSample(tex_sign, albedo_sampler, input.uv);
    let asphalt_n = textureSample(tex_asphalt_n, albedo_sampler, input.uv).rgb;
    let wall_n = textureSample(tex_wall_n, albedo_sampler, input.uv).rgb;

    let id = i32(round(input.tex_id));
    let time_sec = uniforms.params.z;

    var albedo: vec3<f32>;
    var normal_sample: vec3<f32>;
    var has_normal_map = false;
    switch id {
        case 0: {
            albedo = asphalt;
            normal_sample = asphalt_n;
            has_normal_map = true;
        }
        case 1: {
            albedo = wall;
            normal_sample = wall_n;
            has_normal_map = true;
        }
        case 2: {
            albedo = sign_tex.rgb;
            normal_sample = vec3<f32>(0.5, 0.5, 1.0);
        }
        default: {
            albedo = vec3<f32>(1.0);
            normal_sample = vec3<f32>(0.5, 0.5, 1.0);
        }
    }
    if (uniforms.toggles.x < 0.5) {
        albedo = vec3<f32>(0.8);
    }

    var n = normalize(input.normal);
    if (uniforms.toggles.y > 0.5 && has_normal_map) {
        let tbn = mat3x3<f32>(
            normalize(input.tangent),
            normalize(input.bitangent),
            n,
        );
        n = normalize(tbn * (normal_sample * 2.0 - 1.0));
    }

    let s0 = shadow_factor(shadow_map0, input.world_pos, 0);
    let s1 = shadow_factor(shadow_map1, input.world_pos, 1);
    let s2 = shadow_factor(shadow_map2, input.world_pos, 2);
    var shadow = array<f32, 3>(s0, s1, s2);

    let view_dir = normalize(uniforms.view_pos.xyz - input.world_pos);

    var lit = albedo * input.color * 0.06;
    for (var i = 0; i < 3; i = i + 1) {
        let to_light = uniforms.light_pos[i].xyz - input.world_pos;
        let dist = length(to_light);
        let l = to_light / max(dist, 1e-4);

        let atten = 1.0 / (1.0 + 0.12 * dist * dist);
        let diff = max(dot(n, l), 0.0);

        let h = normalize(l + view_dir);
        let spec = pow(max(dot(n, h), 0.0), 32.0) * 0.35;

        var occ = 1.0;
        if (uniforms.toggles.w > 0.5) {
            occ = shadow[i];
        }

        lit = lit
            + uniforms.light_color[i].rgb * (albedo * input.color * diff + vec3<f32>(spec))
            * atten * occ;
    }

    var out_color = lit;
    var out_alpha = 1.0;

    // Steam billboards: animated procedural puff, emissive, intensity in the
    // vertex color channel.
    if (id == 3) {
        let intensity = input.color.r;
        let sway = sin(time_sec * 1.7 + input.uv.y * 6.0) * 0.08;
        let dx = abs(input.uv.x - 0.5 + sway * input.uv.y);
        let core = 1.0 - smoothstep(0.05, 0.45, dx);
        let rise = fract(input.uv.y - time_sec * 0.12);
        let streaks = 0.75 + 0.25 * sin(rise * 12.566);
        let fade = (1.0 - input.uv.y) * smoothstep(0.0, 0.12, input.uv.y);
        out_color = vec3<f32>(0.75, 0.8, 0.85) * intensity;
        out_alpha = core * fade * streaks * intensity * 0.55;
    }

    // Distance fog toward the clear color.
    if (uniforms.toggles.z > 0.5) {
        let d = length(uniforms.view_pos.xyz - input.world_pos);
        let fog = clamp(exp(-0.08 * d), 0.0, 1.0);
        out_color = mix(vec3<f32>(0.02, 0.02, 0.03), out_color, fog);
    }

    // Exposure + gamma.
    let exposure = uniforms.params.x;
    let gamma = uniforms.params.y;
    var mapped = vec3<f32>(1.0) - exp(-out_color * exposure);
    mapped = pow(mapped, vec3<f32>(1.0 / gamma));

    return vec4<f32>(mapped, out_alpha);
}
"#;

pub const SHADOW_DEPTH_SHADER: &str = r#"
struct ShadowUniforms {
    light_space: mat4x4<f32>,
    model: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: ShadowUniforms;

@vertex
fn vs_main(@location(0) position: vec4<f32>) -> @builtin(position) vec4<f32> {
    return uniforms.light_space * uniforms.model * vec4<f32>(position.xyz, 1.0);
}
"#;
