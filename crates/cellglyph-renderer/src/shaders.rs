// WGSL source of the text program.
//
// Interface: uniforms `projection` (offset.xy, scale.zw), `cell_dim` and
// `foreground` at group 0; the atlas `mask` and its sampler at group 1;
// per-instance attributes 0 (grid coords), 1 (glyph box), 2 (UV box).
// The fragment stage writes a color and a per-channel coverage mask that the
// blend unit combines as `color * mask + dst * (1 - mask)`.

pub const TEXT_SHADER: &str = r#"
struct Uniforms {
    projection: vec4<f32>,
    cell_dim: vec2<f32>,
    foreground: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var mask: texture_2d<f32>;
@group(1) @binding(1)
var mask_sampler: sampler;

struct InstanceInput {
    @location(0) grid_coords: vec2<u32>,
    @location(1) glyph: vec4<i32>,
    @location(2) uv: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, in: InstanceInput) -> VertexOutput {
    // Unit quad corner for indices {0, 1, 3, 1, 2, 3}.
    var position: vec2<f32>;
    position.x = select(0.0, 1.0, vertex_index == 0u || vertex_index == 1u);
    position.y = select(1.0, 0.0, vertex_index == 0u || vertex_index == 3u);

    let projection_offset = uniforms.projection.xy;
    let projection_scale = uniforms.projection.zw;

    let cell_position = uniforms.cell_dim * vec2<f32>(in.grid_coords);

    // Glyph top is baseline-relative; flip it against the cell height.
    var glyph_offset = vec2<f32>(in.glyph.xy);
    glyph_offset.y = uniforms.cell_dim.y - glyph_offset.y;
    let glyph_size = vec2<f32>(in.glyph.zw);

    let final_position = cell_position + glyph_size * position + glyph_offset;

    var out: VertexOutput;
    out.clip_position = vec4<f32>(projection_offset + projection_scale * final_position, 0.0, 1.0);
    out.tex_coords = in.uv.xy + position * in.uv.zw;
    return out;
}

struct FragmentOutput {
    @location(0) color: vec4<f32>,
    @location(0) @second_blend_source mask: vec4<f32>,
};

@fragment
fn fs_main(in: VertexOutput) -> FragmentOutput {
    let coverage = textureSample(mask, mask_sampler, in.tex_coords).rgb;

    var out: FragmentOutput;
    out.color = vec4<f32>(uniforms.foreground.rgb, 1.0);
    out.mask = vec4<f32>(coverage, coverage.r);
    return out;
}
"#;
