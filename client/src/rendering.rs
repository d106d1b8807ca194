use crate::config::{FOOD_PULSE_PERIOD_MS, MAX_CELL, MIN_CELL};
use crate::game::SessionView;
use macroquad::prelude::*;
use shared::Snapshot;
use std::time::Instant;

const BACKGROUND: Color = Color::new(2.0 / 255.0, 2.0 / 255.0, 20.0 / 255.0, 1.0);
const GRID_LINE: Color = Color::new(1.0, 1.0, 1.0, 0.03);
const FOOD: Color = Color::new(1.0, 107.0 / 255.0, 107.0 / 255.0, 1.0);
const FOOD_GLOW: (u8, u8, u8) = (255, 106, 106);
const HEAD_GLOW: Color = Color::new(2.0 / 255.0, 132.0 / 255.0, 199.0 / 255.0, 0.55);
const SNAKE_HEAD_RGB: (f32, f32, f32) = (0.0, 132.0, 199.0);
const SNAKE_TAIL_RGB: (f32, f32, f32) = (125.0, 211.0, 252.0);

// Page layout around the board
const PAGE_PADDING: f32 = 36.0;
const SIDE_PANEL_WIDTH: f32 = 320.0;
const SIDE_PANEL_BREAKPOINT: f32 = 920.0;
const MAX_BOARD_WIDTH: f32 = 920.0;
const MAX_BOARD_HEIGHT: f32 = 720.0;
const VERTICAL_CHROME: f32 = 240.0;

const GLOW_STEPS: usize = 12;

/// Largest board surface side in pixels. Grids wider than this are cropped.
pub const MAX_SURFACE_SIDE: u32 = 4096;

/// Window area available for layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn has_side_panel(&self) -> bool {
        self.width > SIDE_PANEL_BREAKPOINT
    }
}

/// Pixel size of one grid cell for a `grid_w` x `grid_h` board, clamped to
/// [`MIN_CELL`, `MAX_CELL`].
pub fn compute_cell_size(grid_w: u32, grid_h: u32, viewport: Viewport) -> u32 {
    let side_panel = if viewport.has_side_panel() {
        SIDE_PANEL_WIDTH
    } else {
        0.0
    };
    let available_w = (viewport.width - side_panel - PAGE_PADDING).min(MAX_BOARD_WIDTH);
    let available_h = (viewport.height - VERTICAL_CHROME).min(MAX_BOARD_HEIGHT);

    let base_w = (available_w / grid_w.max(1) as f32).floor() as i64;
    let base_h = (available_h / grid_h.max(1) as f32).floor() as i64;
    let base = base_w.min(base_h).max(1);

    base.clamp(MIN_CELL as i64, MAX_CELL as i64) as u32
}

/// Color of a snake segment; `pct` is 1.0 at the head and approaches 0.0 at the tail.
pub fn snake_color(pct: f32) -> Color {
    let p = pct.clamp(0.0, 1.0);
    let mix = |head: f32, tail: f32| (head * p + tail * (1.0 - p)).round() as u8;
    Color::from_rgba(
        mix(SNAKE_HEAD_RGB.0, SNAKE_TAIL_RGB.0),
        mix(SNAKE_HEAD_RGB.1, SNAKE_TAIL_RGB.1),
        mix(SNAKE_HEAD_RGB.2, SNAKE_TAIL_RGB.2),
        255,
    )
}

/// Scale factor of the food glow at wall-clock `ms`.
pub fn food_pulse(ms: f64) -> f32 {
    (0.9 + 0.12 * (ms / FOOD_PULSE_PERIOD_MS).sin()) as f32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowStop {
    pub offset: f32,
    pub color: Color,
}

impl GlowStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

fn glow_color_at(stops: &[GlowStop], t: f32) -> Color {
    let Some(first) = stops.first() else {
        return Color::new(0.0, 0.0, 0.0, 0.0);
    };
    if t <= first.offset {
        return first.color;
    }

    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            let k = (t - a.offset) / span;
            return Color::new(
                a.color.r + (b.color.r - a.color.r) * k,
                a.color.g + (b.color.g - a.color.g) * k,
                a.color.b + (b.color.b - a.color.b) * k,
                a.color.a + (b.color.a - a.color.a) * k,
            );
        }
    }

    stops[stops.len() - 1].color
}

/// A drawing surface with its own pixel dimensions.
pub trait Surface {
    fn size(&self) -> (u32, u32);
    /// Reallocates the surface; previous contents are lost.
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self, color: Color);
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32, color: Color);
    fn radial_glow(&mut self, cx: f32, cy: f32, radius: f32, stops: &[GlowStop]);
    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color);
}

/// Surface that only tracks its size and how much was drawn on it.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    pub resizes: u32,
    pub draw_calls: u64,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.resizes += 1;
    }

    fn clear(&mut self, _color: Color) {
        self.draw_calls += 1;
    }

    fn line(&mut self, _x1: f32, _y1: f32, _x2: f32, _y2: f32, _thickness: f32, _color: Color) {
        self.draw_calls += 1;
    }

    fn radial_glow(&mut self, _cx: f32, _cy: f32, _radius: f32, _stops: &[GlowStop]) {
        self.draw_calls += 1;
    }

    fn rounded_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _radius: f32, _color: Color) {
        self.draw_calls += 1;
    }
}

/// Off-screen render target drawn to the window with [`MacroquadSurface::present`].
pub struct MacroquadSurface {
    target: Option<RenderTarget>,
    width: u32,
    height: u32,
}

impl MacroquadSurface {
    pub fn new() -> Self {
        Self {
            target: None,
            width: 0,
            height: 0,
        }
    }

    /// Routes subsequent draw calls into this surface.
    pub fn begin(&self) {
        if let Some(target) = &self.target {
            let mut camera = Camera2D::from_display_rect(Rect::new(
                0.0,
                0.0,
                self.width as f32,
                self.height as f32,
            ));
            camera.render_target = Some(target.clone());
            set_camera(&camera);
        }
    }

    pub fn end(&self) {
        set_default_camera();
    }

    pub fn present(&self, x: f32, y: f32) {
        if let Some(target) = &self.target {
            draw_texture_ex(
                &target.texture,
                x,
                y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(self.width as f32, self.height as f32)),
                    ..Default::default()
                },
            );
        }
    }
}

impl Default for MacroquadSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for MacroquadSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        let width = width.min(MAX_SURFACE_SIDE);
        let height = height.min(MAX_SURFACE_SIDE);
        let target = render_target(width.max(1), height.max(1));
        target.texture.set_filter(FilterMode::Linear);
        self.target = Some(target);
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self, color: Color) {
        self.begin();
        clear_background(color);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32, color: Color) {
        draw_line(x1, y1, x2, y2, thickness, color);
    }

    fn radial_glow(&mut self, cx: f32, cy: f32, radius: f32, stops: &[GlowStop]) {
        // Concentric discs, outermost first, approximate the gradient
        for step in (1..=GLOW_STEPS).rev() {
            let t = step as f32 / GLOW_STEPS as f32;
            let mut color = glow_color_at(stops, t);
            color.a = (color.a * 2.0 / GLOW_STEPS as f32).min(1.0);
            draw_circle(cx, cy, radius * t, color);
        }
    }

    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        let r = radius.max(0.0).min(w / 2.0).min(h / 2.0);
        draw_rectangle(x + r, y, w - 2.0 * r, h, color);
        draw_rectangle(x, y + r, r, h - 2.0 * r, color);
        draw_rectangle(x + w - r, y + r, r, h - 2.0 * r, color);
        draw_circle(x + r, y + r, r, color);
        draw_circle(x + w - r, y + r, r, color);
        draw_circle(x + r, y + h - r, r, color);
        draw_circle(x + w - r, y + h - r, r, color);
    }
}

/// Text fields shown next to the board. Rewritten on every render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub score: String,
    pub high_score: String,
    pub state: String,
    pub grid: String,
    pub final_score: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub resized: bool,
    pub ate: bool,
}

pub struct Renderer {
    epoch: Instant,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Draws `snapshot` and updates the HUD and eat detection state in `view`.
    pub fn render(
        &self,
        view: &mut SessionView,
        snapshot: &Snapshot,
        surface: &mut dyn Surface,
        hud: &mut Hud,
    ) -> FrameOutcome {
        let resized = self.ensure_layout(view, snapshot.w, snapshot.h, surface);
        self.draw(snapshot, view.cell_size, surface);

        hud.score = snapshot.score.to_string();
        hud.state = if snapshot.alive { "running" } else { "dead" }.to_string();
        hud.grid = format!("{} x {}", snapshot.w, snapshot.h);

        let length = snapshot.snake.len();
        let ate = matches!(view.last_snake_len, Some(last) if length > last);
        view.last_snake_len = Some(length);

        FrameOutcome { resized, ate }
    }

    /// Re-fits the surface to the current viewport and redraws the last snapshot.
    pub fn relayout(&self, view: &mut SessionView, surface: &mut dyn Surface) -> bool {
        let Some(snapshot) = view.last_snapshot.clone() else {
            return false;
        };

        let resized = self.ensure_layout(view, snapshot.w, snapshot.h, surface);
        if resized {
            self.draw(&snapshot, view.cell_size, surface);
        }
        resized
    }

    fn ensure_layout(
        &self,
        view: &mut SessionView,
        grid_w: u32,
        grid_h: u32,
        surface: &mut dyn Surface,
    ) -> bool {
        let cell = compute_cell_size(grid_w, grid_h, view.viewport);
        let wanted = (
            grid_w.saturating_mul(cell).min(MAX_SURFACE_SIDE),
            grid_h.saturating_mul(cell).min(MAX_SURFACE_SIDE),
        );

        if view.rendered_grid == Some((grid_w, grid_h))
            && view.cell_size == cell
            && surface.size() == wanted
        {
            return false;
        }

        view.cell_size = cell;
        view.rendered_grid = Some((grid_w, grid_h));
        surface.resize(wanted.0, wanted.1);
        true
    }

    fn draw(&self, snapshot: &Snapshot, cell_size: u32, surface: &mut dyn Surface) {
        let cell = cell_size as f32;
        let (width, height) = surface.size();
        let columns = snapshot.w.min(width / cell_size.max(1));
        let rows = snapshot.h.min(height / cell_size.max(1));
        let (width, height) = (width as f32, height as f32);

        surface.clear(BACKGROUND);

        for x in 0..=columns {
            let px = x as f32 * cell + 0.5;
            surface.line(px, 0.0, px, height, 1.0, GRID_LINE);
        }
        for y in 0..=rows {
            let py = y as f32 * cell + 0.5;
            surface.line(0.0, py, width, py, 1.0, GRID_LINE);
        }

        if let Some(food) = snapshot.food {
            let pulse = food_pulse(self.epoch.elapsed().as_secs_f64() * 1000.0);
            let (fx, fy) = (food.x as f32 * cell, food.y as f32 * cell);
            let (r, g, b) = FOOD_GLOW;
            surface.radial_glow(
                fx + cell / 2.0,
                fy + cell / 2.0,
                cell * 1.8 * pulse,
                &[
                    GlowStop::new(0.0, Color::from_rgba(r, g, b, 250)),
                    GlowStop::new(0.5, Color::from_rgba(r, g, b, 56)),
                    GlowStop::new(1.0, Color::from_rgba(r, g, b, 0)),
                ],
            );
            surface.rounded_rect(fx + 2.0, fy + 2.0, cell - 4.0, cell - 4.0, 6.0, FOOD);
        }

        // Tail first so the head ends up on top
        let length = snapshot.snake.len();
        for (i, segment) in snapshot.snake.iter().enumerate().rev() {
            let (px, py) = (segment.x as f32 * cell, segment.y as f32 * cell);
            let color = snake_color((length - i) as f32 / length.max(1) as f32);

            if i == 0 {
                surface.radial_glow(
                    px + cell / 2.0,
                    py + cell / 2.0,
                    cell,
                    &[
                        GlowStop::new(0.0, HEAD_GLOW),
                        GlowStop::new(1.0, Color::new(HEAD_GLOW.r, HEAD_GLOW.g, HEAD_GLOW.b, 0.0)),
                    ],
                );
                surface.rounded_rect(px + 1.0, py + 1.0, cell - 2.0, cell - 2.0, 7.0, color);
            } else {
                surface.rounded_rect(px + 2.0, py + 2.0, cell - 6.0, cell - 6.0, 4.0, color);
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
