//! Pseudocolour map rendering of a 2D field over its coordinate mesh.
//!
//! Cells are filled as rectangles whose edges sit halfway between
//! neighbouring cell centres, like a pcolormesh. Longitude is taken to vary
//! along columns and latitude along rows, which holds for the regular
//! lat/lon grids of Level-3 products.

use crate::coastline::Coastline;
use crate::errors::{AirsError, Result};
use crate::grid::Grid;
use crate::mask::MaskedGrid;
use crate::output::ensure_dir;
use crate::region::BoundingBox;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;
use ndarray::ArrayView2;
use rusttype::{point, Font, Scale};
use std::fs;
use std::path::{Path, PathBuf};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FOREGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const GRIDLINE: Rgb<u8> = Rgb([150, 150, 150]);
const COASTLINE: Rgb<u8> = Rgb([20, 20, 20]);

const MARGIN_LEFT: u32 = 70;
const MARGIN_RIGHT: u32 = 120;
const MARGIN_TOP: u32 = 50;
const MARGIN_BOTTOM: u32 = 60;
const COLORBAR_GAP: u32 = 20;
const COLORBAR_WIDTH: u32 = 20;

/// Upper bound on gridlines per axis
const MAX_TICKS: usize = 1000;

const TITLE_SIZE: f32 = 18.0;
const LABEL_SIZE: f32 = 14.0;
const TICK_SIZE: f32 = 12.0;

/// Fonts tried when no font path is configured
const SYSTEM_FONTS: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Colour ramp stop, position in [0, 1]
#[derive(Debug, Clone, Copy)]
struct ColorStop {
    position: f32,
    color: [u8; 3],
}

/// Approximation of the viridis ramp
const RAMP: [ColorStop; 5] = [
    ColorStop { position: 0.0, color: [68, 1, 84] },
    ColorStop { position: 0.25, color: [59, 82, 139] },
    ColorStop { position: 0.5, color: [33, 145, 140] },
    ColorStop { position: 0.75, color: [94, 201, 98] },
    ColorStop { position: 1.0, color: [253, 231, 37] },
];

/// Map frame with gridline spacing and an optional coastline overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Basemap {
    pub bounds: BoundingBox,
    /// Degrees between parallels
    pub parallel_spacing: f64,
    /// Degrees between meridians
    pub meridian_spacing: f64,
    pub coastline: Option<Coastline>,
}

impl Basemap {
    /// Equidistant cylindrical world map, parallels every 30°, meridians every 45°.
    pub fn world() -> Self {
        Self {
            bounds: BoundingBox::WORLD,
            parallel_spacing: 30.0,
            meridian_spacing: 45.0,
            coastline: None,
        }
    }

    pub fn with_coastline(mut self, coastline: Coastline) -> Self {
        self.coastline = Some(coastline.clipped_to(&self.bounds));
        self
    }

    /// Checks that both gridline spacings are positive and yield at most
    /// 1000 lines per axis over the map bounds.
    pub fn validate(&self) -> Result<()> {
        let axes = [
            ("parallel", self.parallel_spacing, self.bounds.lat_span()),
            ("meridian", self.meridian_spacing, self.bounds.lon_span()),
        ];
        for (what, spacing, span) in axes {
            if !(spacing.is_finite() && spacing > 0.0) {
                return Err(AirsError::InvalidArgument {
                    message: format!("{} spacing must be positive, got {}", what, spacing),
                });
            }
            if span / spacing > MAX_TICKS as f64 {
                return Err(AirsError::InvalidArgument {
                    message: format!(
                        "{} spacing {} gives more than {} gridlines over {} degrees",
                        what, spacing, MAX_TICKS, span
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Figure settings
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    pub x_label: String,
    pub y_label: String,
    pub colorbar_label: String,
    pub title: String,
    /// Without a basemap the view spans the grid's coordinate extrema
    pub basemap: Option<Basemap>,
    pub font_path: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            x_label: "longitude".to_string(),
            y_label: "latitude".to_string(),
            colorbar_label: "Unit".to_string(),
            title: String::new(),
            basemap: None,
            font_path: None,
        }
    }
}

/// Pixel rectangle of the data area plus the lon/lat range it shows
struct Frame {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    view: BoundingBox,
}

impl Frame {
    fn x(&self, lon: f64) -> f32 {
        self.left + ((lon - self.view.lon_min) / self.view.lon_span()) as f32 * self.width
    }

    fn y(&self, lat: f64) -> f32 {
        self.top + ((self.view.lat_max - lat) / self.view.lat_span()) as f32 * self.height
    }

    fn right(&self) -> f32 {
        self.left + self.width
    }

    fn bottom(&self) -> f32 {
        self.top + self.height
    }

    fn rect(&self) -> Rect {
        Rect::at(self.left as i32, self.top as i32).of_size(self.width as u32, self.height as u32)
    }
}

/// Optional TrueType font; text is skipped when none could be loaded.
struct TextPainter {
    font: Option<Font<'static>>,
}

impl TextPainter {
    fn load(font_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = font_path {
            let bytes = fs::read(path)?;
            let font = Font::try_from_vec(bytes).ok_or_else(|| AirsError::InvalidArgument {
                message: format!("'{}' is not a usable TrueType font", path.display()),
            })?;
            return Ok(Self { font: Some(font) });
        }

        let font = SYSTEM_FONTS
            .iter()
            .filter_map(|candidate| fs::read(candidate).ok())
            .find_map(Font::try_from_vec);
        if font.is_none() {
            tracing::warn!("no TrueType font found, rendering map without text");
        }
        Ok(Self { font })
    }

    fn width(&self, text: &str, size: f32) -> f32 {
        let Some(font) = &self.font else {
            return 0.0;
        };
        font.layout(text, Scale::uniform(size), point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn draw(&self, img: &mut RgbImage, text: &str, x: f32, y: f32, size: f32) {
        if let Some(font) = &self.font {
            draw_text_mut(img, FOREGROUND, x as i32, y as i32, Scale::uniform(size), font, text);
        }
    }

    fn draw_centered(&self, img: &mut RgbImage, text: &str, cx: f32, y: f32, size: f32) {
        let x = cx - self.width(text, size) / 2.0;
        self.draw(img, text, x, y, size);
    }

    fn draw_right_aligned(&self, img: &mut RgbImage, text: &str, right: f32, y: f32, size: f32) {
        let x = right - self.width(text, size);
        self.draw(img, text, x, y, size);
    }
}

fn ramp_color(t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    for pair in RAMP.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.position {
            let f = (t - a.position) / (b.position - a.position);
            let mix = |i: usize| {
                (f32::from(a.color[i]) + (f32::from(b.color[i]) - f32::from(a.color[i])) * f)
                    .round() as u8
            };
            return Rgb([mix(0), mix(1), mix(2)]);
        }
    }
    Rgb(RAMP[RAMP.len() - 1].color)
}

/// Lower and upper edge of a cell from its centre and its neighbours' centres.
fn cell_edges(center: f64, prev: Option<f64>, next: Option<f64>) -> (f64, f64) {
    match (prev, next) {
        (Some(p), Some(n)) => ((p + center) / 2.0, (center + n) / 2.0),
        (None, Some(n)) => {
            let half = (n - center) / 2.0;
            (center - half, center + half)
        }
        (Some(p), None) => {
            let half = (center - p) / 2.0;
            (center - half, center + half)
        }
        (None, None) => (center - 0.5, center + 0.5),
    }
}

/// Step giving roughly five ticks over `span`, from the 1-2-5 series.
fn nice_step(span: f64) -> f64 {
    if span <= 0.0 || !span.is_finite() {
        return 1.0;
    }
    let raw = span / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized < 1.5 {
        1.0
    } else if normalized < 3.5 {
        2.0
    } else if normalized < 7.5 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    let mut out = Vec::new();
    if !(step.is_finite() && step > 0.0) {
        return out;
    }
    let mut v = (min / step).ceil() * step;
    while v <= max + step * 1e-9 && out.len() < MAX_TICKS {
        out.push(if v.abs() < step * 1e-9 { 0.0 } else { v });
        v += step;
    }
    out
}

fn format_degrees(value: f64, positive: char, negative: char) -> String {
    let magnitude = if value.fract() == 0.0 {
        format!("{}", value.abs())
    } else {
        format!("{:.1}", value.abs())
    };
    if value > 0.0 {
        format!("{}{}", magnitude, positive)
    } else if value < 0.0 {
        format!("{}{}", magnitude, negative)
    } else {
        magnitude
    }
}

fn format_value(value: f32) -> String {
    if value.abs() >= 1000.0 || (value != 0.0 && value.abs() < 0.01) {
        format!("{:.2e}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn view_bounds(
    longitude: &ArrayView2<f64>,
    latitude: &ArrayView2<f64>,
    basemap: Option<&Basemap>,
) -> Result<BoundingBox> {
    if let Some(basemap) = basemap {
        return Ok(basemap.bounds);
    }
    let extrema = |a: &ArrayView2<f64>| {
        a.iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    };
    let (mut lon_min, mut lon_max) = extrema(longitude);
    let (mut lat_min, mut lat_max) = extrema(latitude);
    if lon_min > lon_max || lat_min > lat_max {
        return Err(AirsError::EmptySelection {
            what: "grid coordinates (no finite longitude/latitude)".to_string(),
        });
    }
    if lon_max - lon_min < f64::EPSILON {
        lon_min -= 0.5;
        lon_max += 0.5;
    }
    if lat_max - lat_min < f64::EPSILON {
        lat_min -= 0.5;
        lat_max += 0.5;
    }
    BoundingBox::new(lon_min, lon_max, lat_min, lat_max)
}

fn fill_cells(
    img: &mut RgbImage,
    frame: &Frame,
    longitude: &ArrayView2<f64>,
    latitude: &ArrayView2<f64>,
    values: &MaskedGrid,
    range: (f32, f32),
) {
    let (rows, cols) = values.dim();
    let (lo, hi) = range;
    let span = if hi > lo { hi - lo } else { 1.0 };

    for r in 0..rows {
        for c in 0..cols {
            let Some(value) = values.get(r, c) else {
                continue;
            };
            if !value.is_finite() {
                continue;
            }

            let (lon_a, lon_b) = cell_edges(
                longitude[[r, c]],
                c.checked_sub(1).map(|p| longitude[[r, p]]),
                (c + 1 < cols).then(|| longitude[[r, c + 1]]),
            );
            let (lat_a, lat_b) = cell_edges(
                latitude[[r, c]],
                r.checked_sub(1).map(|p| latitude[[p, c]]),
                (r + 1 < rows).then(|| latitude[[r + 1, c]]),
            );
            // Edges mix the centre with its neighbours, so one bad coordinate spoils them
            if ![lon_a, lon_b, lat_a, lat_b].iter().all(|e| e.is_finite()) {
                continue;
            }

            let (x0, x1) = ordered(frame.x(lon_a), frame.x(lon_b));
            let (y0, y1) = ordered(frame.y(lat_a), frame.y(lat_b));
            let x0 = x0.max(frame.left);
            let x1 = x1.min(frame.right());
            let y0 = y0.max(frame.top);
            let y1 = y1.min(frame.bottom());
            if !(x0.is_finite() && y0.is_finite()) || x1 <= x0 || y1 <= y0 {
                continue;
            }

            let x = x0.floor() as i32;
            let y = y0.floor() as i32;
            let w = ((x1.ceil() as i32) - x).max(1) as u32;
            let h = ((y1.ceil() as i32) - y).max(1) as u32;
            let color = ramp_color((value - lo) / span);
            draw_filled_rect_mut(img, Rect::at(x, y).of_size(w, h), color);
        }
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn draw_axes(
    img: &mut RgbImage,
    frame: &Frame,
    basemap: Option<&Basemap>,
    text: &TextPainter,
) {
    let view = frame.view;
    let (lat_step, lon_step) = match basemap {
        Some(b) => (b.parallel_spacing, b.meridian_spacing),
        None => (nice_step(view.lat_span()), nice_step(view.lon_span())),
    };

    for lat in ticks(view.lat_min, view.lat_max, lat_step) {
        let y = frame.y(lat);
        if basemap.is_some() {
            draw_line_segment_mut(img, (frame.left, y), (frame.right(), y), GRIDLINE);
        } else {
            draw_line_segment_mut(img, (frame.left - 5.0, y), (frame.left, y), FOREGROUND);
        }
        let label = format_degrees(lat, 'N', 'S');
        text.draw_right_aligned(img, &label, frame.left - 8.0, y - TICK_SIZE / 2.0, TICK_SIZE);
    }

    for lon in ticks(view.lon_min, view.lon_max, lon_step) {
        let x = frame.x(lon);
        if basemap.is_some() {
            draw_line_segment_mut(img, (x, frame.top), (x, frame.bottom()), GRIDLINE);
        } else {
            draw_line_segment_mut(img, (x, frame.bottom()), (x, frame.bottom() + 5.0), FOREGROUND);
        }
        let label = format_degrees(lon, 'E', 'W');
        text.draw_centered(img, &label, x, frame.bottom() + 8.0, TICK_SIZE);
    }

    draw_hollow_rect_mut(img, frame.rect(), FOREGROUND);
}

fn draw_coastline(img: &mut RgbImage, frame: &Frame, coastline: &Coastline) {
    let view = frame.view;
    for line in coastline.lines() {
        for pair in line.windows(2) {
            let ((lon_a, lat_a), (lon_b, lat_b)) = (pair[0], pair[1]);
            if !view.contains(lon_a, lat_a) || !view.contains(lon_b, lat_b) {
                continue;
            }
            // Segments crossing the antimeridian would span the whole map.
            if (lon_b - lon_a).abs() > 180.0 {
                continue;
            }
            draw_line_segment_mut(
                img,
                (frame.x(lon_a), frame.y(lat_a)),
                (frame.x(lon_b), frame.y(lat_b)),
                COASTLINE,
            );
        }
    }
}

fn draw_colorbar(
    img: &mut RgbImage,
    frame: &Frame,
    range: (f32, f32),
    label: &str,
    text: &TextPainter,
) {
    let left = frame.right() as u32 + COLORBAR_GAP;
    let top = frame.top as u32;
    let height = frame.height as u32;

    for dy in 0..height {
        let t = 1.0 - dy as f32 / (height.max(2) - 1) as f32;
        draw_filled_rect_mut(
            img,
            Rect::at(left as i32, (top + dy) as i32).of_size(COLORBAR_WIDTH, 1),
            ramp_color(t),
        );
    }
    draw_hollow_rect_mut(
        img,
        Rect::at(left as i32, top as i32).of_size(COLORBAR_WIDTH, height.max(1)),
        FOREGROUND,
    );

    let (lo, hi) = range;
    let label_x = (left + COLORBAR_WIDTH + 4) as f32;
    for (fraction, value) in [(0.0, hi), (0.5, (lo + hi) / 2.0), (1.0, lo)] {
        let y = top as f32 + fraction * height as f32 - TICK_SIZE / 2.0;
        text.draw(img, &format_value(value), label_x, y, TICK_SIZE);
    }

    let cx = (left + COLORBAR_WIDTH / 2) as f32;
    text.draw_centered(img, label, cx, frame.top - LABEL_SIZE - 6.0, LABEL_SIZE);
}

/// Draws `values` over its coordinate mesh.
///
/// # Errors
///
/// - [`AirsError::EmptySelection`] for a grid without cells
/// - [`AirsError::ShapeMismatch`] if the arrays disagree in shape
/// - [`AirsError::InvalidArgument`] for an image too small to hold the frame
/// - [`AirsError::IoError`] if a configured font cannot be read
pub fn render(
    longitude: ArrayView2<f64>,
    latitude: ArrayView2<f64>,
    values: &MaskedGrid,
    options: &RenderOptions,
) -> Result<RgbImage> {
    if values.is_empty() {
        return Err(AirsError::EmptySelection {
            what: format!("grid to render for '{}'", options.title),
        });
    }
    let expected = longitude.dim();
    for found in [latitude.dim(), values.dim()] {
        if found != expected {
            return Err(AirsError::ShapeMismatch { expected, found });
        }
    }
    let min_width = MARGIN_LEFT + MARGIN_RIGHT + 50;
    let min_height = MARGIN_TOP + MARGIN_BOTTOM + 50;
    if options.width < min_width || options.height < min_height {
        return Err(AirsError::InvalidArgument {
            message: format!(
                "image size {}x{} is below the minimum {}x{}",
                options.width, options.height, min_width, min_height
            ),
        });
    }

    let basemap = options.basemap.as_ref();
    if let Some(basemap) = basemap {
        basemap.validate()?;
    }
    let text = TextPainter::load(options.font_path.as_deref())?;
    let frame = Frame {
        left: MARGIN_LEFT as f32,
        top: MARGIN_TOP as f32,
        width: (options.width - MARGIN_LEFT - MARGIN_RIGHT) as f32,
        height: (options.height - MARGIN_TOP - MARGIN_BOTTOM) as f32,
        view: view_bounds(&longitude, &latitude, basemap)?,
    };

    let range = values
        .summary()
        .map(|s| (s.min, s.max))
        .unwrap_or((0.0, 1.0));

    let mut img = RgbImage::from_pixel(options.width, options.height, BACKGROUND);
    fill_cells(&mut img, &frame, &longitude, &latitude, values, range);

    if let Some(coastline) = basemap.and_then(|b| b.coastline.as_ref()) {
        draw_coastline(&mut img, &frame, coastline);
    }
    draw_axes(&mut img, &frame, basemap, &text);
    draw_colorbar(&mut img, &frame, range, &options.colorbar_label, &text);

    let center_x = frame.left + frame.width / 2.0;
    text.draw_centered(&mut img, &options.title, center_x, 12.0, TITLE_SIZE);
    text.draw_centered(
        &mut img,
        &options.x_label,
        center_x,
        frame.bottom() + TICK_SIZE + 16.0,
        LABEL_SIZE,
    );
    text.draw(&mut img, &options.y_label, 8.0, frame.top - LABEL_SIZE - 6.0, LABEL_SIZE);

    tracing::debug!(
        width = options.width,
        height = options.height,
        "rendered map '{}'",
        options.title
    );
    Ok(img)
}

/// Renders a [`Grid`] with its own coordinates.
pub fn render_grid(grid: &Grid, options: &RenderOptions) -> Result<RgbImage> {
    render(
        grid.longitude.view(),
        grid.latitude.view(),
        &grid.values,
        options,
    )
}

/// Writes an image, creating the parent directory first. The format follows
/// the file extension.
pub fn save_image(img: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    img.save(path)?;
    tracing::info!("saved {}", path.display());
    Ok(())
}

/// Renders a grid and writes it to `path`.
pub fn render_to_file(grid: &Grid, options: &RenderOptions, path: &Path) -> Result<()> {
    let img = render_grid(grid, options)?;
    save_image(&img, path)
}
