use std::collections::HashSet;

use glam::Mat4;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use crate::assets::{AssetLoader, TextureHandle, TextureStore};
use crate::error::RenderError;
use crate::geometry::Mesh;
use crate::grid::Grid;
use crate::registry::ObjectType;

/// Opaque handle to uploaded mesh buffers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct MeshHandle(pub u32);

/// How a drawable is coloured.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Shading {
    Flat([u8; 3]),
    Textured { texture: TextureHandle, layer: u8 },
}

/// Geometry plus shading, handed to [`Renderer::upload`] once per object.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub mesh: Mesh,
    pub shading: Shading,
}

/// One object to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshHandle,
    pub model: Mat4,
    pub shading: Shading,
    pub object_type: ObjectType,
}

/// Drawing backend seam.
///
/// The game uploads each object once, draws every live object once per
/// frame in registry order, and releases the buffers when the object goes.
pub trait Renderer {
    fn upload(&mut self, drawable: &Drawable) -> Result<MeshHandle, RenderError>;

    fn release(&mut self, handle: MeshHandle);

    fn begin_frame(&mut self) {}

    fn draw(&mut self, call: &DrawCall, view_projection: &Mat4);
}

/// Rejects meshes that no backend could draw.
pub fn validate_mesh(mesh: &Mesh) -> Result<(), RenderError> {
    if mesh.positions.is_empty() {
        return Err(RenderError::EmptyMesh);
    }
    if let Some(index) = mesh
        .indices
        .iter()
        .copied()
        .find(|index| usize::from(*index) >= mesh.positions.len())
    {
        return Err(RenderError::IndexOutOfRange {
            index,
            vertices: mesh.positions.len(),
        });
    }
    Ok(())
}

/// Fixed top-down orthographic view of the whole board, wall ring included.
#[must_use]
pub fn board_view_projection(grid: &Grid) -> Mat4 {
    let (min, max) = grid.bounds();
    Mat4::orthographic_rh(min.x, max.x, min.y, max.y, -100.0, 100.0)
}

/// Renderer without output. Tracks live buffers and records the last frame.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    textures: TextureStore,
    next_mesh: u32,
    live: HashSet<MeshHandle>,
    frame: Vec<DrawCall>,
    /// Makes every upload fail, to exercise undrawable objects.
    pub reject_uploads: bool,
}

impl HeadlessRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn live_meshes(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_live(&self, handle: MeshHandle) -> bool {
        self.live.contains(&handle)
    }

    /// Draw calls since the last [`Renderer::begin_frame`].
    #[must_use]
    pub fn frame(&self) -> &[DrawCall] {
        &self.frame
    }

    #[must_use]
    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }
}

impl Renderer for HeadlessRenderer {
    fn upload(&mut self, drawable: &Drawable) -> Result<MeshHandle, RenderError> {
        if self.reject_uploads {
            return Err(RenderError::EmptyMesh);
        }
        validate_mesh(&drawable.mesh)?;

        let handle = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        self.live.insert(handle);
        Ok(handle)
    }

    fn release(&mut self, handle: MeshHandle) {
        self.live.remove(&handle);
    }

    fn begin_frame(&mut self) {
        self.frame.clear();
    }

    fn draw(&mut self, call: &DrawCall, _view_projection: &Mat4) {
        self.frame.push(*call);
    }
}

impl AssetLoader for HeadlessRenderer {
    fn load_texture(&mut self, url: &str) -> TextureHandle {
        self.textures.load_texture(url)
    }
}

const GLYPH_SOLID: &str = "██";
const GLYPH_FOOD: &str = "◆ ";
const GLYPH_LAND: &str = "··";

#[derive(Debug, Clone, Copy)]
struct Plot {
    col: u16,
    row: u16,
    glyph: &'static str,
    color: [u8; 3],
}

/// Draws the board into a ratatui frame, two terminal columns per cell.
///
/// Draw calls are projected and collected; [`TerminalRenderer::present`]
/// writes them into the frame buffer. Later calls overwrite earlier ones.
#[derive(Debug)]
pub struct TerminalRenderer {
    textures: TextureStore,
    columns: u16,
    rows: u16,
    next_mesh: u32,
    live: HashSet<MeshHandle>,
    plots: Vec<Plot>,
}

impl TerminalRenderer {
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self {
            textures: TextureStore::new(),
            columns: grid.columns(),
            rows: grid.rows(),
            next_mesh: 0,
            live: HashSet::new(),
            plots: Vec::new(),
        }
    }

    pub fn textures_mut(&mut self) -> &mut TextureStore {
        &mut self.textures
    }

    /// Terminal area the board occupies, centred in `area`.
    #[must_use]
    pub fn board_area(&self, area: Rect) -> Rect {
        let width = (self.columns * 2).min(area.width);
        let height = self.rows.min(area.height);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }

    /// Writes the collected frame into `frame`.
    pub fn present(&self, frame: &mut Frame<'_>, area: Rect) {
        let board = self.board_area(area);
        let buffer = frame.buffer_mut();

        for plot in &self.plots {
            let x = board.x.saturating_add(plot.col * 2);
            let y = board.y.saturating_add(plot.row);
            if x + 1 >= board.right() || y >= board.bottom() {
                continue;
            }
            let [r, g, b] = plot.color;
            buffer.set_string(x, y, plot.glyph, Style::new().fg(Color::Rgb(r, g, b)));
        }
    }

    fn color_of(&self, shading: Shading) -> [u8; 3] {
        match shading {
            Shading::Flat(color) => color,
            Shading::Textured { texture, layer } => self.textures.layer_color(texture, layer),
        }
    }
}

impl Renderer for TerminalRenderer {
    fn upload(&mut self, drawable: &Drawable) -> Result<MeshHandle, RenderError> {
        validate_mesh(&drawable.mesh)?;

        let handle = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        self.live.insert(handle);
        Ok(handle)
    }

    fn release(&mut self, handle: MeshHandle) {
        self.live.remove(&handle);
    }

    fn begin_frame(&mut self) {
        self.plots.clear();
    }

    fn draw(&mut self, call: &DrawCall, view_projection: &Mat4) {
        if !self.live.contains(&call.mesh) {
            tracing::warn!(mesh = ?call.mesh, "draw call for released mesh skipped");
            return;
        }

        let ndc = view_projection.project_point3(call.model.w_axis.truncate());
        let col = ((ndc.x + 1.0) / 2.0 * f32::from(self.columns)).floor();
        let row = ((1.0 - ndc.y) / 2.0 * f32::from(self.rows)).floor();
        if col < 0.0 || row < 0.0 || col >= f32::from(self.columns) || row >= f32::from(self.rows) {
            return;
        }

        let glyph = match call.object_type {
            ObjectType::Food => GLYPH_FOOD,
            ObjectType::Solid => GLYPH_SOLID,
            ObjectType::Land => GLYPH_LAND,
        };
        self.plots.push(Plot {
            col: col as u16,
            row: row as u16,
            glyph,
            color: self.color_of(call.shading),
        });
    }
}

impl AssetLoader for TerminalRenderer {
    fn load_texture(&mut self, url: &str) -> TextureHandle {
        self.textures.load_texture(url)
    }
}
