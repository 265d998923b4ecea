// Cell grid → pixel → clip space.
//
// The vertex stage of the text shader performs exactly these steps; the CPU
// versions here pin the numeric contract down for tests and for hosts that
// need to hit-test glyph boxes.

use crate::{InstanceRecord, Size, Vec2};

/// Index order of the shared unit quad (two triangles).
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Corner of the unit quad addressed by a vertex index from [`QUAD_INDICES`].
///
/// 0 = top right, 1 = bottom right, 2 = bottom left, 3 = top left
/// (pixel space, y grows downward).
pub fn quad_corner(vertex_index: u32) -> Vec2 {
    let right = matches!(vertex_index, 0 | 1);
    let bottom = matches!(vertex_index, 1 | 2);
    Vec2::new(right as u32 as f32, bottom as u32 as f32)
}

/// Per-frame uniform values: pixel → clip affine map plus cell size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionState {
    pub offset: [f32; 2],
    /// Negative y flips top-left pixel space into bottom-left clip space.
    pub scale: [f32; 2],
    pub cell_dim: [f32; 2],
}

impl ProjectionState {
    pub fn new(viewport: Size, cell: Size) -> Self {
        if viewport.width < 1.0 || viewport.height < 1.0 {
            log::warn!(
                "degenerate viewport {}x{}, clamping to 1px",
                viewport.width,
                viewport.height
            );
        }
        let width = viewport.width.max(1.0);
        let height = viewport.height.max(1.0);

        Self {
            offset: [-1.0, 1.0],
            scale: [2.0 / width, -2.0 / height],
            cell_dim: [cell.width, cell.height],
        }
    }

    /// Offset and scale packed as the `projection` uniform: `(offset.xy, scale.xy)`.
    pub fn projection(&self) -> [f32; 4] {
        let [offset_x, offset_y] = self.offset;
        let [scale_x, scale_y] = self.scale;
        [offset_x, offset_y, scale_x, scale_y]
    }

    pub fn to_clip(&self, pixel: Vec2) -> Vec2 {
        Vec2::new(
            self.offset[0] + self.scale[0] * pixel.x,
            self.offset[1] + self.scale[1] * pixel.y,
        )
    }

    /// Top-left pixel of a grid cell.
    pub fn cell_origin(&self, col: u16, row: u16) -> Vec2 {
        let [width, height] = self.cell_dim;
        Vec2::new(width * col as f32, height * row as f32)
    }

    /// Pixel position of one corner of an instance's glyph box.
    ///
    /// `top` is baseline-relative, so it is flipped against the cell height
    /// before being added to the cell's top-left origin.
    pub fn glyph_pixel_position(&self, record: &InstanceRecord, corner: Vec2) -> Vec2 {
        let origin = self.cell_origin(record.col, record.row);
        let offset_x = record.left as f32;
        let offset_y = self.cell_dim[1] - record.top as f32;

        Vec2::new(
            origin.x + record.width as f32 * corner.x + offset_x,
            origin.y + record.height as f32 * corner.y + offset_y,
        )
    }

    /// Clip-space output of the vertex stage for one vertex of one instance.
    pub fn clip_position(&self, record: &InstanceRecord, vertex_index: u32) -> Vec2 {
        let corner = quad_corner(vertex_index);
        self.to_clip(self.glyph_pixel_position(record, corner))
    }

    /// Atlas coordinates interpolated for one vertex of one instance.
    pub fn tex_coords(record: &InstanceRecord, vertex_index: u32) -> Vec2 {
        let corner = quad_corner(vertex_index);
        Vec2::new(
            record.uv_left + corner.x * record.uv_width,
            record.uv_bot + corner.y * record.uv_height,
        )
    }
}
