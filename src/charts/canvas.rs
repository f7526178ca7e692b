//! Minimal SVG drawing surface used by every chart.
//!
//! Charts are built as plain SVG markup and rasterized on write. The canvas
//! only knows pixels; `Axes` maps data coordinates onto a plot area.

use std::fmt::Write as _;

const FONT_FAMILY: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";

/// Text placement options
#[derive(Debug, Clone, Copy)]
pub struct TextStyle<'a> {
    pub size: f64,
    pub anchor: &'a str,
    pub fill: &'a str,
    pub bold: bool,
    /// Clockwise rotation in degrees around the anchor point
    pub rotate: f64,
}

impl Default for TextStyle<'_> {
    fn default() -> Self {
        Self {
            size: 12.0,
            anchor: "middle",
            fill: "#222222",
            bold: false,
            rotate: 0.0,
        }
    }
}

impl<'a> TextStyle<'a> {
    pub fn sized(size: f64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn anchor(mut self, anchor: &'a str) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn fill(mut self, fill: &'a str) -> Self {
        self.fill = fill;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn rotate(mut self, degrees: f64) -> Self {
        self.rotate = degrees;
        self
    }
}

/// Stroke options for lines and outlines
#[derive(Debug, Clone, Copy)]
pub struct Stroke<'a> {
    pub color: &'a str,
    pub width: f64,
    pub dashed: bool,
    pub opacity: f64,
}

impl<'a> Stroke<'a> {
    pub fn solid(color: &'a str, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: false,
            opacity: 1.0,
        }
    }

    pub fn dashed(color: &'a str, width: f64) -> Self {
        Self {
            dashed: true,
            ..Self::solid(color, width)
        }
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    fn attrs(&self) -> String {
        let mut attrs = format!(
            r#"stroke="{}" stroke-width="{:.1}" stroke-opacity="{:.2}""#,
            self.color, self.width, self.opacity
        );
        if self.dashed {
            attrs.push_str(r#" stroke-dasharray="8,5""#);
        }
        attrs
    }
}

/// An SVG document under construction
pub struct SvgCanvas {
    width: usize,
    height: usize,
    body: String,
}

impl SvgCanvas {
    /// Create a canvas with a white background
    pub fn new(width: usize, height: usize) -> Self {
        let mut canvas = Self {
            width,
            height,
            body: String::new(),
        };
        canvas.rect(0.0, 0.0, width as f64, height as f64, "white", 1.0);
        canvas
    }

    pub fn width(&self) -> f64 {
        self.width as f64
    }

    pub fn height(&self) -> f64 {
        self.height as f64
    }

    /// Centered bold title along the top edge
    pub fn title(&mut self, text: &str) {
        let x = self.width() / 2.0;
        self.text(x, 36.0, text, TextStyle::sized(22.0).bold());
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, opacity: f64) {
        let _ = write!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="{:.2}"/>"#,
            x,
            y,
            w.max(0.0),
            h.max(0.0),
            fill,
            opacity
        );
    }

    pub fn outlined_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Stroke) {
        let _ = write!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" {}/>"#,
            x,
            y,
            w.max(0.0),
            h.max(0.0),
            fill,
            stroke.attrs()
        );
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Stroke) {
        let _ = write!(
            self.body,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" {}/>"#,
            x1,
            y1,
            x2,
            y2,
            stroke.attrs()
        );
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: Stroke) {
        if points.is_empty() {
            return;
        }
        let _ = write!(
            self.body,
            r#"<polyline points="{}" fill="none" {}/>"#,
            format_points(points),
            stroke.attrs()
        );
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], fill: &str, opacity: f64) {
        if points.len() < 3 {
            return;
        }
        let _ = write!(
            self.body,
            r#"<polygon points="{}" fill="{}" fill-opacity="{:.2}" stroke="none"/>"#,
            format_points(points),
            fill,
            opacity
        );
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        let _ = write!(
            self.body,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
            cx, cy, r, fill
        );
    }

    /// "x" marker
    pub fn cross(&mut self, cx: f64, cy: f64, r: f64, color: &str) {
        let stroke = Stroke::solid(color, 2.0);
        self.line(cx - r, cy - r, cx + r, cy + r, stroke);
        self.line(cx - r, cy + r, cx + r, cy - r, stroke);
    }

    /// Pie wedge between two angles (degrees, counter-clockwise from 3 o'clock)
    pub fn wedge(&mut self, cx: f64, cy: f64, r: f64, start_deg: f64, end_deg: f64, fill: &str) {
        let sweep = end_deg - start_deg;
        if sweep >= 359.999 {
            self.circle(cx, cy, r, fill);
            return;
        }
        if sweep <= 0.0 {
            return;
        }

        let (x0, y0) = polar(cx, cy, r, start_deg);
        let (x1, y1) = polar(cx, cy, r, end_deg);
        let large_arc = if sweep > 180.0 { 1 } else { 0 };

        // sweep-flag 0: counter-clockwise on screen
        let _ = write!(
            self.body,
            r#"<path d="M {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {} 0 {:.2} {:.2} Z" fill="{}" stroke="white" stroke-width="1.5"/>"#,
            cx, cy, x0, y0, r, r, large_arc, x1, y1, fill
        );
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: TextStyle) {
        let weight = if style.bold { "bold" } else { "normal" };
        let transform = if style.rotate != 0.0 {
            format!(r#" transform="rotate({:.1} {:.2} {:.2})""#, style.rotate, x, y)
        } else {
            String::new()
        };

        let _ = write!(
            self.body,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" font-weight="{}" text-anchor="{}" fill="{}"{}>{}</text>"#,
            x,
            y,
            FONT_FAMILY,
            style.size,
            weight,
            style.anchor,
            style.fill,
            transform,
            escape_xml(content)
        );
    }

    /// Text on a white rounded box, used for figure captions
    pub fn boxed_text(&mut self, x: f64, y: f64, content: &str, size: f64) {
        let w = estimate_text_width(content, size) + 16.0;
        let h = size + 12.0;
        let _ = write!(
            self.body,
            r##"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="4" fill="white" fill-opacity="0.8" stroke="#999999"/>"##,
            x - w / 2.0,
            y - size - 4.0,
            w,
            h
        );
        self.text(x, y, content, TextStyle::sized(size));
    }

    /// Legend box anchored at its top-right corner
    pub fn legend(&mut self, right: f64, top: f64, entries: &[LegendEntry]) {
        if entries.is_empty() {
            return;
        }

        let size = 13.0;
        let row_h = 22.0;
        let text_w = entries
            .iter()
            .map(|e| estimate_text_width(e.label, size))
            .fold(0.0, f64::max);
        let w = text_w + 56.0;
        let h = row_h * entries.len() as f64 + 10.0;
        let left = right - w;

        self.outlined_rect(left, top, w, h, "white", Stroke::solid("#cccccc", 1.0));

        for (i, entry) in entries.iter().enumerate() {
            let y = top + 5.0 + row_h * i as f64 + row_h / 2.0;
            match entry.mark {
                LegendMark::Line { dashed } => {
                    let stroke = if dashed {
                        Stroke::dashed(entry.color, 2.0)
                    } else {
                        Stroke::solid(entry.color, 2.0)
                    };
                    self.line(left + 8.0, y, left + 36.0, y, stroke);
                }
                LegendMark::Patch { opacity } => {
                    self.rect(left + 10.0, y - 7.0, 24.0, 14.0, entry.color, opacity);
                }
            }
            self.text(
                left + 44.0,
                y + size * 0.35,
                entry.label,
                TextStyle::sized(size).anchor("start"),
            );
        }
    }

    /// Close the document
    pub fn finish(self) -> String {
        let mut svg = String::with_capacity(self.body.len() + 256);
        svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        svg.push('\n');
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }
}

/// How a legend entry is drawn
#[derive(Debug, Clone, Copy)]
pub enum LegendMark {
    Line { dashed: bool },
    Patch { opacity: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct LegendEntry<'a> {
    pub label: &'a str,
    pub color: &'a str,
    pub mark: LegendMark,
}

/// Tick labelling on the horizontal axis
pub enum XTicks<'a> {
    Numeric,
    /// One label per integer position 1..=n
    Categories { labels: &'a [String], rotate: f64 },
}

/// Which grid lines to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grid {
    Both,
    YOnly,
}

/// Plot area with a linear data-to-pixel mapping
#[derive(Debug, Clone, Copy)]
pub struct Axes {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl Axes {
    /// Plot area inset from the canvas edges, leaving room for title and labels
    pub fn new(canvas: &SvgCanvas, x_range: (f64, f64), y_range: (f64, f64), bottom_margin: f64) -> Self {
        let left = 110.0;
        let top = 70.0;
        Self {
            left,
            top,
            width: canvas.width() - left - 40.0,
            height: canvas.height() - top - bottom_margin,
            x_range,
            y_range,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn px(&self, x: f64) -> f64 {
        let (lo, hi) = self.x_range;
        self.left + (x - lo) / (hi - lo) * self.width
    }

    pub fn py(&self, y: f64) -> f64 {
        let (lo, hi) = self.y_range;
        self.bottom() - (y - lo) / (hi - lo) * self.height
    }

    pub fn point(&self, x: f64, y: f64) -> (f64, f64) {
        (self.px(x), self.py(y))
    }

    /// Frame, grid, ticks and axis labels
    pub fn draw(&self, canvas: &mut SvgCanvas, x_label: &str, y_label: &str, x_ticks: XTicks, grid: Grid) {
        let grid_stroke = Stroke::solid("#b0b0b0", 1.0).opacity(0.3);
        let axis_stroke = Stroke::solid("#333333", 1.2);
        let tick_style = TextStyle::sized(11.0);

        for y in nice_ticks(self.y_range.0, self.y_range.1, 8) {
            let py = self.py(y);
            canvas.line(self.left, py, self.right(), py, grid_stroke);
            canvas.line(self.left - 5.0, py, self.left, py, axis_stroke);
            canvas.text(
                self.left - 8.0,
                py + 4.0,
                &format_tick(y),
                tick_style.anchor("end"),
            );
        }

        match x_ticks {
            XTicks::Numeric => {
                for x in nice_ticks(self.x_range.0, self.x_range.1, 10) {
                    let px = self.px(x);
                    if grid == Grid::Both {
                        canvas.line(px, self.top, px, self.bottom(), grid_stroke);
                    }
                    canvas.line(px, self.bottom(), px, self.bottom() + 5.0, axis_stroke);
                    canvas.text(px, self.bottom() + 20.0, &format_tick(x), tick_style);
                }
            }
            XTicks::Categories { labels, rotate } => {
                for (i, label) in labels.iter().enumerate() {
                    let px = self.px((i + 1) as f64);
                    canvas.line(px, self.bottom(), px, self.bottom() + 5.0, axis_stroke);
                    if rotate != 0.0 {
                        canvas.text(
                            px,
                            self.bottom() + 16.0,
                            label,
                            tick_style.anchor("end").rotate(rotate),
                        );
                    } else {
                        canvas.text(px, self.bottom() + 20.0, label, tick_style);
                    }
                }
            }
        }

        canvas.outlined_rect(self.left, self.top, self.width, self.height, "none", axis_stroke);

        canvas.text(
            self.left + self.width / 2.0,
            canvas.height() - 18.0,
            x_label,
            TextStyle::sized(15.0),
        );
        let y_mid = self.top + self.height / 2.0;
        canvas.text(30.0, y_mid, y_label, TextStyle::sized(15.0).rotate(-90.0));
    }
}

/// Evenly spaced "round" tick values covering `[min, max]`
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || max <= min {
        return vec![min];
    }

    let raw = (max - min) / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Data range padded by 5% on each side; degenerate ranges widen by one unit
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Tick label: integers without decimals, everything else to two places
pub fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Rough rendered width; SVG has no text metrics without a font engine
pub fn estimate_text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * 0.6
}

/// Escape the five XML special characters
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn polar(cx: f64, cy: f64, r: f64, degrees: f64) -> (f64, f64) {
    let rad = degrees.to_radians();
    (cx + r * rad.cos(), cy - r * rad.sin())
}

fn format_points(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}
