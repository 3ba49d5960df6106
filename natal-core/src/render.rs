//! SVG chart rendering.
//!
//! Pure string building. The wheel is drawn counter-clockwise with the
//! Ascendant at nine o'clock; a side panel lists positions in the chosen
//! language. Output depends only on its inputs (no timestamps or ids).

use std::fmt::{self, Write};

use crate::i18n::{Labels, Language};
use crate::model::{Aspect, BodyPosition, ChartData};
use crate::theme::{Palette, Theme};
use crate::zodiac::{AspectKind, Sign, normalize_degrees, separation};

pub const WIDTH: f64 = 820.0;
pub const HEIGHT: f64 = 600.0;

const CENTER_X: f64 = 300.0;
const CENTER_Y: f64 = 300.0;
const R_OUTER: f64 = 270.0;
const R_ZODIAC_INNER: f64 = 230.0;
const R_PLANETS: f64 = 190.0;
const R_HOUSES_INNER: f64 = 125.0;
const R_HOUSE_NUMBERS: f64 = 138.0;

/// Minimum angular spacing between body glyphs on the planet ring.
const GLYPH_GAP: f64 = 8.0;

/// Line height of the aspect list in the side panel.
const ASPECT_LINE: f64 = 16.0;

const FONT_FAMILY: &str = "'DejaVu Sans', 'Segoe UI Symbol', sans-serif";

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // not allowed anywhere in an XML 1.0 document
            c if (c < ' ' && !matches!(c, '\t' | '\n' | '\r')) || matches!(c, '\u{fffe}' | '\u{ffff}') => {
                out.push('\u{fffd}')
            }
            c => out.push(c),
        }
    }
    out
}

fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    // avoid "-0.00" flicker from rounding noise
    if s == "-0.00" { "0.00".to_string() } else { s }
}

/// Degrees and minutes within a sign, e.g. `24°32'`.
pub fn format_degree(degree_in_sign: f64) -> String {
    let total_minutes = (degree_in_sign * 60.0).floor() as i64;
    format!("{:02}°{:02}'", total_minutes / 60, total_minutes % 60)
}

/// Minimal element writer that keeps open/close tags balanced.
struct SvgWriter {
    out: String,
    stack: Vec<&'static str>,
}

impl SvgWriter {
    fn new() -> Self {
        Self {
            out: String::with_capacity(32 * 1024),
            stack: Vec::new(),
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.stack.len() {
            self.out.push_str("  ");
        }
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, String)]) -> fmt::Result {
        self.indent();
        write!(self.out, "<{tag}")?;
        for (name, value) in attrs {
            write!(self.out, " {name}=\"{}\"", escape(value))?;
        }
        Ok(())
    }

    fn open(&mut self, tag: &'static str, attrs: &[(&str, String)]) -> fmt::Result {
        self.start_tag(tag, attrs)?;
        self.out.push_str(">\n");
        self.stack.push(tag);
        Ok(())
    }

    fn close(&mut self) -> fmt::Result {
        if let Some(tag) = self.stack.pop() {
            self.indent();
            writeln!(self.out, "</{tag}>")?;
        }
        Ok(())
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, String)]) -> fmt::Result {
        self.start_tag(tag, attrs)?;
        self.out.push_str("/>\n");
        Ok(())
    }

    fn text(&mut self, tag: &str, attrs: &[(&str, String)], content: &str) -> fmt::Result {
        self.start_tag(tag, attrs)?;
        writeln!(self.out, ">{}</{tag}>", escape(content))
    }

    fn finish(mut self) -> Result<String, fmt::Error> {
        while !self.stack.is_empty() {
            self.close()?;
        }
        Ok(self.out)
    }
}

/// Maps ecliptic longitudes to wheel coordinates.
struct Wheel {
    ascendant: f64,
}

impl Wheel {
    fn angle(&self, longitude: f64) -> f64 {
        (longitude - self.ascendant + 180.0).to_radians()
    }

    fn point(&self, longitude: f64, radius: f64) -> (f64, f64) {
        let a = self.angle(longitude);
        (CENTER_X + radius * a.cos(), CENTER_Y - radius * a.sin())
    }
}

fn line(svg: &mut SvgWriter, from: (f64, f64), to: (f64, f64), stroke: &str, width: f64) -> fmt::Result {
    svg.empty(
        "line",
        &[
            ("x1", num(from.0)),
            ("y1", num(from.1)),
            ("x2", num(to.0)),
            ("y2", num(to.1)),
            ("stroke", stroke.to_string()),
            ("stroke-width", num(width)),
        ],
    )
}

fn circle(svg: &mut SvgWriter, radius: f64, fill: &str, stroke: &str) -> fmt::Result {
    svg.empty(
        "circle",
        &[
            ("cx", num(CENTER_X)),
            ("cy", num(CENTER_Y)),
            ("r", num(radius)),
            ("fill", fill.to_string()),
            ("stroke", stroke.to_string()),
            ("stroke-width", "1".to_string()),
        ],
    )
}

fn centered_text(svg: &mut SvgWriter, at: (f64, f64), size: f64, fill: &str, content: &str) -> fmt::Result {
    svg.text(
        "text",
        &[
            ("x", num(at.0)),
            ("y", num(at.1)),
            ("font-size", num(size)),
            ("fill", fill.to_string()),
            ("text-anchor", "middle".to_string()),
            ("dominant-baseline", "central".to_string()),
        ],
        content,
    )
}

fn draw_zodiac(svg: &mut SvgWriter, wheel: &Wheel, palette: &Palette, labels: &Labels) -> fmt::Result {
    svg.open("g", &[("id", "zodiac".to_string())])?;

    for sign in Sign::all() {
        let start = sign.start();
        let end = start + 30.0;
        let colour = palette.element(sign.element());

        let (ox1, oy1) = wheel.point(start, R_OUTER);
        let (ox2, oy2) = wheel.point(end, R_OUTER);
        let (ix2, iy2) = wheel.point(end, R_ZODIAC_INNER);
        let (ix1, iy1) = wheel.point(start, R_ZODIAC_INNER);

        // screen y grows downward, so counter-clockwise on the chart is sweep-flag 0
        let d = format!(
            "M {} {} A {r} {r} 0 0 0 {} {} L {} {} A {ri} {ri} 0 0 1 {} {} Z",
            num(ox1),
            num(oy1),
            num(ox2),
            num(oy2),
            num(ix2),
            num(iy2),
            num(ix1),
            num(iy1),
            r = num(R_OUTER),
            ri = num(R_ZODIAC_INNER),
        );

        svg.open("g", &[("class", format!("sign {}", sign.as_str()))])?;
        svg.text("title", &[], labels.sign(*sign))?;
        svg.empty(
            "path",
            &[
                ("d", d),
                ("fill", colour.to_string()),
                ("fill-opacity", "0.18".to_string()),
                ("stroke", palette.muted.to_string()),
                ("stroke-width", "1".to_string()),
            ],
        )?;
        let glyph_at = wheel.point(start + 15.0, (R_OUTER + R_ZODIAC_INNER) / 2.0);
        centered_text(svg, glyph_at, 22.0, colour, sign.glyph())?;
        svg.close()?;
    }

    for tick in (0..360).step_by(5) {
        let longitude = f64::from(tick);
        let length = if tick % 10 == 0 { 8.0 } else { 4.0 };
        line(
            svg,
            wheel.point(longitude, R_ZODIAC_INNER),
            wheel.point(longitude, R_ZODIAC_INNER - length),
            palette.muted,
            0.6,
        )?;
    }

    svg.close()
}

fn draw_houses(svg: &mut SvgWriter, wheel: &Wheel, chart: &ChartData, palette: &Palette) -> fmt::Result {
    svg.open("g", &[("id", "houses".to_string())])?;
    circle(svg, R_ZODIAC_INNER, "none", palette.muted)?;
    circle(svg, R_HOUSES_INNER, palette.inner, palette.muted)?;

    for (i, cusp) in chart.houses.iter().enumerate() {
        let angular = matches!(cusp.number, 1 | 4 | 7 | 10);
        let (stroke, width) = if angular {
            (palette.accent, 1.8)
        } else {
            (palette.muted, 0.8)
        };
        line(
            svg,
            wheel.point(cusp.longitude, R_HOUSES_INNER),
            wheel.point(cusp.longitude, R_ZODIAC_INNER),
            stroke,
            width,
        )?;

        let next = chart.houses[(i + 1) % chart.houses.len()].longitude;
        let middle = cusp.longitude + normalize_degrees(next - cusp.longitude) / 2.0;
        centered_text(
            svg,
            wheel.point(middle, R_HOUSE_NUMBERS),
            11.0,
            palette.muted,
            &cusp.number.to_string(),
        )?;
    }

    let asc = chart.angles.ascendant;
    let mc = chart.angles.midheaven;
    centered_text(svg, wheel.point(asc, R_OUTER + 14.0), 12.0, palette.accent, "AC")?;
    centered_text(svg, wheel.point(mc, R_OUTER + 14.0), 12.0, palette.accent, "MC")?;

    svg.close()
}

fn draw_aspects(svg: &mut SvgWriter, wheel: &Wheel, chart: &ChartData, palette: &Palette) -> fmt::Result {
    svg.open("g", &[("id", "aspects".to_string()), ("stroke-opacity", "0.8".to_string())])?;

    for aspect in &chart.aspects {
        let (Some(a), Some(b)) = (chart.body(aspect.first), chart.body(aspect.second)) else {
            continue;
        };
        // conjunctions would collapse to a point
        if aspect.kind == AspectKind::Conjunction {
            continue;
        }
        line(
            svg,
            wheel.point(a.longitude, R_HOUSES_INNER),
            wheel.point(b.longitude, R_HOUSES_INNER),
            palette.aspect(aspect.kind),
            if aspect.orb < 2.0 { 1.4 } else { 0.8 },
        )?;
    }

    svg.close()
}

/// Display longitudes for body glyphs, pushed apart so none overlap.
///
/// Runs of bodies closer than [`GLYPH_GAP`] are laid out evenly around the
/// mean of their true positions (pool-adjacent-violators on the unwrapped circle).
fn spread_glyphs(bodies: &[BodyPosition]) -> Vec<f64> {
    let n = bodies.len();
    if n < 2 {
        return bodies.iter().map(|b| b.longitude).collect();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| bodies[a].longitude.total_cmp(&bodies[b].longitude));

    // start just after the widest empty arc so no run straddles the seam
    let widest = (0..n)
        .max_by(|&a, &b| {
            let gap = |k: usize| {
                normalize_degrees(bodies[order[(k + 1) % n]].longitude - bodies[order[k]].longitude)
            };
            gap(a).total_cmp(&gap(b))
        })
        .map_or(0, |k| (k + 1) % n);
    order.rotate_left(widest);

    let first = bodies[order[0]].longitude;
    let targets: Vec<f64> = order
        .iter()
        .map(|&i| first + normalize_degrees(bodies[i].longitude - first))
        .collect();

    // (first index, length, sum of target - offset)
    let mut runs: Vec<(usize, usize, f64)> = Vec::new();
    for (k, &t) in targets.iter().enumerate() {
        runs.push((k, 1, t));
        while runs.len() > 1 {
            let (_, cur_len, cur_sum) = runs[runs.len() - 1];
            let (prev_start, prev_len, prev_sum) = runs[runs.len() - 2];
            let prev_end = prev_sum / prev_len as f64 + prev_len as f64 * GLYPH_GAP;
            if prev_end <= cur_sum / cur_len as f64 {
                break;
            }
            runs.pop();
            runs.pop();
            let shifted = cur_sum - (cur_len * prev_len) as f64 * GLYPH_GAP;
            runs.push((prev_start, prev_len + cur_len, prev_sum + shifted));
        }
    }

    let mut result = vec![0.0; n];
    for (start, len, sum) in runs {
        let base = sum / len as f64;
        for offset in 0..len {
            result[order[start + offset]] = normalize_degrees(base + offset as f64 * GLYPH_GAP);
        }
    }
    result
}

fn draw_bodies(
    svg: &mut SvgWriter,
    wheel: &Wheel,
    chart: &ChartData,
    palette: &Palette,
    labels: &Labels,
) -> fmt::Result {
    svg.open("g", &[("id", "bodies".to_string())])?;
    let shown = spread_glyphs(&chart.bodies);

    for (position, display) in chart.bodies.iter().zip(shown) {
        let colour = palette.body(position.body);
        svg.open("g", &[("class", format!("body {}", position.body.as_str()))])?;
        svg.text(
            "title",
            &[],
            &format!(
                "{} {} {}",
                labels.body(position.body),
                format_degree(position.degree_in_sign),
                labels.sign(position.sign)
            ),
        )?;

        line(
            svg,
            wheel.point(position.longitude, R_ZODIAC_INNER),
            wheel.point(position.longitude, R_ZODIAC_INNER - 10.0),
            colour,
            1.5,
        )?;
        if separation(display, position.longitude) > 0.5 {
            line(
                svg,
                wheel.point(position.longitude, R_ZODIAC_INNER - 10.0),
                wheel.point(display, R_PLANETS + 12.0),
                palette.muted,
                0.5,
            )?;
        }

        centered_text(svg, wheel.point(display, R_PLANETS), 18.0, colour, position.body.glyph())?;
        if position.retrograde {
            centered_text(svg, wheel.point(display, R_PLANETS - 17.0), 9.0, palette.muted, "℞")?;
        }
        svg.close()?;
    }

    svg.close()
}

fn left_text(svg: &mut SvgWriter, x: f64, y: f64, size: f64, fill: &str, content: &str) -> fmt::Result {
    svg.text(
        "text",
        &[
            ("x", num(x)),
            ("y", num(y)),
            ("font-size", num(size)),
            ("fill", fill.to_string()),
        ],
        content,
    )
}

/// Localized aspect caption, e.g. `Sol Trígono Lua 02°13'`.
fn aspect_line(aspect: &Aspect, labels: &Labels) -> String {
    format!(
        "{} {} {} {}",
        labels.body(aspect.first),
        labels.aspect(aspect.kind),
        labels.body(aspect.second),
        format_degree(aspect.orb)
    )
}

fn draw_panel(svg: &mut SvgWriter, chart: &ChartData, palette: &Palette, labels: &Labels) -> fmt::Result {
    const X: f64 = 600.0;
    let subject = &chart.subject;

    svg.open("g", &[("id", "panel".to_string())])?;

    svg.text(
        "text",
        &[
            ("x", num(X)),
            ("y", "36".to_string()),
            ("font-size", "18".to_string()),
            ("font-weight", "bold".to_string()),
            ("fill", palette.foreground.to_string()),
        ],
        &subject.name,
    )?;
    left_text(svg, X, 56.0, 12.0, palette.muted, labels.title)?;
    left_text(
        svg,
        X,
        74.0,
        11.0,
        palette.foreground,
        &format!("{} ({})", subject.local.format("%d/%m/%Y %H:%M"), subject.timezone.name()),
    )?;
    left_text(
        svg,
        X,
        90.0,
        11.0,
        palette.foreground,
        &format!(
            "{} {:.2}° · {} {:.2}°",
            labels.latitude, subject.latitude, labels.longitude, subject.longitude
        ),
    )?;
    left_text(
        svg,
        X,
        106.0,
        11.0,
        palette.muted,
        &format!("{}: {}", labels.houses, labels.house_system(chart.house_system)),
    )?;

    left_text(svg, X, 140.0, 13.0, palette.accent, labels.planets)?;
    let mut y = 160.0;
    for position in &chart.bodies {
        let colour = palette.element(position.sign.element());
        left_text(svg, X, y, 14.0, palette.body(position.body), position.body.glyph())?;
        left_text(svg, X + 20.0, y, 11.0, palette.foreground, labels.body(position.body))?;
        left_text(svg, X + 88.0, y, 11.0, palette.foreground, &format_degree(position.degree_in_sign))?;
        left_text(svg, X + 130.0, y, 13.0, colour, position.sign.glyph())?;
        left_text(svg, X + 146.0, y, 11.0, palette.foreground, labels.sign(position.sign))?;
        if position.retrograde {
            left_text(svg, X + 206.0, y, 11.0, palette.muted, "℞")?;
        }
        y += 20.0;
    }

    y += 10.0;
    for (label, longitude) in [
        (labels.ascendant, chart.angles.ascendant),
        (labels.midheaven, chart.angles.midheaven),
    ] {
        let sign = Sign::from_longitude(longitude);
        left_text(svg, X, y, 11.0, palette.accent, label)?;
        left_text(
            svg,
            X + 88.0,
            y,
            11.0,
            palette.foreground,
            &format_degree(longitude - sign.start()),
        )?;
        left_text(svg, X + 130.0, y, 13.0, palette.element(sign.element()), sign.glyph())?;
        left_text(svg, X + 146.0, y, 11.0, palette.foreground, labels.sign(sign))?;
        y += 20.0;
    }

    y += 10.0;
    left_text(
        svg,
        X,
        y,
        11.0,
        palette.muted,
        &format!("{}: {}", labels.aspects, chart.aspects.len()),
    )?;

    // tightest first, as many as fit above the bottom edge
    let mut listed: Vec<&Aspect> = chart.aspects.iter().collect();
    listed.sort_by(|a, b| a.orb.total_cmp(&b.orb));
    let room = ((HEIGHT - ASPECT_LINE - y) / ASPECT_LINE).floor().max(0.0) as usize;
    for aspect in listed.into_iter().take(room) {
        y += ASPECT_LINE;
        left_text(svg, X, y, 10.0, palette.aspect(aspect.kind), aspect.kind.glyph())?;
        left_text(svg, X + 16.0, y, 10.0, palette.foreground, &aspect_line(aspect, labels))?;
    }

    svg.close()
}

/// Render `chart` as a standalone SVG document.
pub fn render_chart(chart: &ChartData, theme: Theme, language: Language) -> Result<String, fmt::Error> {
    let palette = theme.palette();
    let labels = language.labels();
    let wheel = Wheel {
        ascendant: chart.angles.ascendant,
    };

    let mut svg = SvgWriter::new();
    svg.out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.open(
        "svg",
        &[
            ("xmlns", "http://www.w3.org/2000/svg".to_string()),
            ("version", "1.1".to_string()),
            ("width", num(WIDTH)),
            ("height", num(HEIGHT)),
            ("viewBox", format!("0 0 {} {}", num(WIDTH), num(HEIGHT))),
            ("xml:lang", language.tag().to_string()),
            ("font-family", FONT_FAMILY.to_string()),
            ("class", format!("natal-chart theme-{}", theme.as_str())),
        ],
    )?;
    svg.text("title", &[], &format!("{} - {}", labels.title, chart.subject.name))?;
    svg.empty(
        "rect",
        &[
            ("width", "100%".to_string()),
            ("height", "100%".to_string()),
            ("fill", palette.background.to_string()),
        ],
    )?;
    circle(&mut svg, R_OUTER, palette.ring, palette.muted)?;

    draw_zodiac(&mut svg, &wheel, &palette, labels)?;
    draw_houses(&mut svg, &wheel, chart, &palette)?;
    draw_aspects(&mut svg, &wheel, chart, &palette)?;
    draw_bodies(&mut svg, &wheel, chart, &palette, labels)?;
    draw_panel(&mut svg, chart, &palette, labels)?;

    let mut out = svg.finish()?;
    out.truncate(out.trim_end().len());
    tracing::trace!(bytes = out.len(), theme = %theme, language = %language, "rendered chart");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zodiac::{Body, signed_delta};

    fn body_at(body: Body, longitude: f64) -> BodyPosition {
        let sign = Sign::from_longitude(longitude);
        BodyPosition {
            body,
            longitude,
            latitude: 0.0,
            speed: 1.0,
            retrograde: false,
            sign,
            degree_in_sign: longitude - sign.start(),
            house: 1,
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape("<a & 'b'>"), "&lt;a &amp; &apos;b&apos;&gt;");
    }

    #[test]
    fn escape_replaces_characters_xml_forbids() {
        assert_eq!(escape("a\u{1}b\u{1b}c"), "a\u{fffd}b\u{fffd}c");
        assert_eq!(escape("tab\tline\nret\r"), "tab\tline\nret\r");
        assert_eq!(escape("Joao Sao"), "Joao Sao");
    }

    #[test]
    fn aspect_caption_uses_localized_names() {
        let aspect = Aspect {
            first: Body::Sun,
            second: Body::Moon,
            kind: AspectKind::Trine,
            separation: 122.25,
            orb: 2.25,
        };
        assert_eq!(aspect_line(&aspect, Language::Pt.labels()), "Sol Trígono Lua 02°15'");
        assert_eq!(aspect_line(&aspect, Language::En.labels()), "Sun Trine Moon 02°15'");
    }

    #[test]
    fn degree_formatting_truncates_to_minutes() {
        assert_eq!(format_degree(24.5333), "24°31'");
        assert_eq!(format_degree(0.0), "00°00'");
        assert_eq!(format_degree(29.9999), "29°59'");
    }

    #[test]
    fn writer_balances_open_elements() {
        let mut svg = SvgWriter::new();
        svg.open("svg", &[]).unwrap();
        svg.open("g", &[("id", "x".to_string())]).unwrap();
        svg.empty("circle", &[("r", "1".to_string())]).unwrap();
        let out = svg.finish().unwrap();
        assert!(out.trim_end().ends_with("</svg>"));
        assert_eq!(out.matches("<g").count(), out.matches("</g>").count());
    }

    #[test]
    fn ascendant_sits_at_nine_oclock() {
        let wheel = Wheel { ascendant: 123.0 };
        let (x, y) = wheel.point(123.0, 100.0);
        assert!((x - (CENTER_X - 100.0)).abs() < 1e-9);
        assert!((y - CENTER_Y).abs() < 1e-9);
        // ten degrees later in the zodiac is below the horizon line (counter-clockwise)
        let (_, y_later) = wheel.point(133.0, 100.0);
        assert!(y_later > CENTER_Y);
    }

    #[test]
    fn stacked_bodies_are_spread_apart() {
        let bodies = vec![
            body_at(Body::Sun, 100.0),
            body_at(Body::Mercury, 101.0),
            body_at(Body::Venus, 102.0),
            body_at(Body::Mars, 250.0),
        ];
        let shown = spread_glyphs(&bodies);
        assert!(signed_delta(shown[0], shown[1]) >= GLYPH_GAP - 1e-6);
        assert!(signed_delta(shown[1], shown[2]) >= GLYPH_GAP - 1e-6);
        assert!((shown[3] - 250.0).abs() < 1e-9);
    }
}
