use rayon::prelude::*;

use crate::analysis::HeadingCounts;
use crate::error::{Error, Result};
use crate::grid::{Color, Grid};
use crate::history::History;
use crate::rule::Heading;

/// Largest side, in pixels, of an upscaled plate image.
pub const MAX_IMAGE_EDGE: usize = 16_384;

/// Largest accepted pixels-per-cell factor.
pub const MAX_SCALE: usize = 8;

const CELL_WHITE: [u8; 4] = [255, 255, 255, 255];
const CELL_BLACK: [u8; 4] = [0, 0, 0, 255];

/// Ant marker color per heading, N E S O.
const ANT: [[u8; 4]; 4] = [
    [220, 30, 30, 255],
    [30, 160, 30, 255],
    [30, 80, 220, 255],
    [230, 150, 20, 255],
];

/// Below this many pixels per cell the ant is a solid tinted block.
const GLYPH_MIN_SCALE: usize = 3;

// Chart colors
const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const AXIS: [u8; 4] = [190, 190, 190, 255];
const SERIES_WHITE: [u8; 4] = [31, 119, 180, 255];
const SERIES_BLACK: [u8; 4] = [255, 127, 14, 255];
const BAR: [u8; 4] = [40, 40, 40, 255];

/// Jet colormap stops: dark blue -> blue -> cyan -> yellow -> red -> dark red.
const JET: [(f32, [u8; 4]); 6] = [
    (0.0, [0, 0, 143, 255]),
    (0.125, [0, 0, 255, 255]),
    (0.375, [0, 255, 255, 255]),
    (0.625, [255, 255, 0, 255]),
    (0.875, [255, 0, 0, 255]),
    (1.0, [128, 0, 0, 255]),
];

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

fn jet(t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    for pair in JET.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            return lerp_color(c0, c1, (t - t0) / (t1 - t0));
        }
    }
    JET[JET.len() - 1].1
}

#[inline]
fn put(rgba: &mut [u8], w: usize, x: usize, y: usize, color: [u8; 4]) {
    let i = (y * w + x) * 4;
    rgba[i..i + 4].copy_from_slice(&color);
}

/// Side of a plate image with `scale` pixels per cell, if it fits the limits.
pub fn scaled_edge(edge: usize, scale: usize) -> Result<usize> {
    let too_large = Error::ImageTooLarge {
        edge,
        scale,
        max: MAX_IMAGE_EDGE,
    };
    if scale == 0 || scale > MAX_SCALE {
        return Err(too_large);
    }
    match edge.checked_mul(scale) {
        Some(px) if px <= MAX_IMAGE_EDGE => Ok(px),
        _ => Err(too_large),
    }
}

/// Largest scale up to `want` whose image still fits; at least 1.
pub fn fit_scale(edge: usize, want: usize) -> usize {
    (1..=want.clamp(1, MAX_SCALE))
        .rev()
        .find(|&s| scaled_edge(edge, s).is_ok())
        .unwrap_or(1)
}

#[inline]
fn ant_color(heading: Heading) -> [u8; 4] {
    match heading {
        Heading::North => ANT[0],
        Heading::East => ANT[1],
        Heading::South => ANT[2],
        Heading::West => ANT[3],
    }
}

/// Whether pixel `(dx, dy)` of a `scale`-sized block lies inside a triangle
/// whose tip points along `heading`.
fn in_glyph(dx: usize, dy: usize, scale: usize, heading: Heading) -> bool {
    let x = (dx as f32 + 0.5) / scale as f32;
    let y = (dy as f32 + 0.5) / scale as f32;
    // depth from the tip and offset from the center line
    let (depth, side) = match heading {
        Heading::North => (y, x - 0.5),
        Heading::South => (1.0 - y, x - 0.5),
        Heading::East => (1.0 - x, y - 0.5),
        Heading::West => (x, y - 0.5),
    };
    side.abs() <= depth / 2.0
}

/// Plate in black and white, `scale` pixels per cell, with the ant drawn
/// as a triangle pointing along its heading and tinted per heading.
pub fn render_plate(
    plate: &Grid<Color>,
    ant: Option<(usize, usize, Heading)>,
    scale: usize,
) -> Vec<u8> {
    let w = plate.edge;
    let scale = scale.max(1);
    let mut rgba = vec![0u8; w * w * 4];

    rgba.par_chunks_mut(w.max(1) * 4)
        .enumerate()
        .for_each(|(row, out)| {
            for col in 0..w {
                let color = match plate.get(row, col) {
                    Color::White => CELL_WHITE,
                    Color::Black => CELL_BLACK,
                };
                out[col * 4..col * 4 + 4].copy_from_slice(&color);
            }
        });

    let mut rgba = upscale(&rgba, w, w, scale);
    let px = w * scale;

    if let Some((row, col, heading)) = ant {
        if row < w && col < w {
            let tint = ant_color(heading);
            for dy in 0..scale {
                for dx in 0..scale {
                    if scale < GLYPH_MIN_SCALE || in_glyph(dx, dy, scale, heading) {
                        put(&mut rgba, px, col * scale + dx, row * scale + dy, tint);
                    }
                }
            }
        }
    }
    rgba
}

/// Visit counts through a jet colormap scaled to the busiest cell.
pub fn render_visits(visits: &Grid<u32>) -> Vec<u8> {
    let w = visits.edge;
    let max_v = visits.data.iter().copied().max().unwrap_or(0).max(1) as f32;
    let mut rgba = vec![0u8; w * w * 4];

    rgba.par_chunks_mut(w.max(1) * 4)
        .enumerate()
        .for_each(|(row, out)| {
            for col in 0..w {
                let color = jet(visits.get(row, col) as f32 / max_v);
                out[col * 4..col * 4 + 4].copy_from_slice(&color);
            }
        });

    rgba
}

/// Straight segment between two pixels (DDA), clipped to the image.
fn draw_line(rgba: &mut [u8], w: usize, h: usize, a: (f32, f32), b: (f32, f32), color: [u8; 4]) {
    let n = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0) as usize;
    for i in 0..=n {
        let t = i as f32 / n as f32;
        let x = (a.0 + (b.0 - a.0) * t).round();
        let y = (a.1 + (b.1 - a.1) * t).round();
        if x >= 0.0 && y >= 0.0 && (x as usize) < w && (y as usize) < h {
            put(rgba, w, x as usize, y as usize, color);
        }
    }
}

/// White and black fractions over the step index, on a [0, 1] vertical scale.
pub fn render_fractions(history: &History, w: usize, h: usize) -> Vec<u8> {
    let mut rgba = BACKGROUND.repeat(w * h);
    if w < 3 || h < 3 || history.is_empty() {
        return rgba;
    }

    let margin = 2.0;
    let plot_w = (w - 1) as f32 - 2.0 * margin;
    let plot_h = (h - 1) as f32 - 2.0 * margin;
    let last = (history.len() - 1).max(1) as f32;

    // 0 and 1 guide lines
    draw_line(&mut rgba, w, h, (margin, margin), (margin + plot_w, margin), AXIS);
    let bottom = margin + plot_h;
    draw_line(&mut rgba, w, h, (margin, bottom), (margin + plot_w, bottom), AXIS);

    let point = |i: usize, v: f64| -> (f32, f32) {
        let x = margin + plot_w * i as f32 / last;
        let y = margin + plot_h * (1.0 - v as f32);
        (x, y)
    };

    let records = history.records();
    if records.len() == 1 {
        let r = records[0];
        draw_line(&mut rgba, w, h, point(0, r.white), point(0, r.white), SERIES_WHITE);
        draw_line(&mut rgba, w, h, point(0, r.black), point(0, r.black), SERIES_BLACK);
        return rgba;
    }
    for (i, pair) in records.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        draw_line(&mut rgba, w, h, point(i, a.white), point(i + 1, b.white), SERIES_WHITE);
        draw_line(&mut rgba, w, h, point(i, a.black), point(i + 1, b.black), SERIES_BLACK);
    }
    rgba
}

/// Bar chart of heading counts, N E S O from left to right.
pub fn render_headings(counts: &HeadingCounts, w: usize, h: usize) -> Vec<u8> {
    let mut rgba = BACKGROUND.repeat(w * h);
    let max_c = counts.max();
    if max_c == 0 || w < 4 || h == 0 {
        return rgba;
    }

    let slot = w / 4;
    let bar_w = (slot / 2).max(1);
    for (k, (_, count)) in counts.iter().enumerate() {
        let bar_h = (count as f64 / max_c as f64 * h as f64).round() as usize;
        let x0 = k * slot + (slot - bar_w) / 2;
        for y in h - bar_h..h {
            for x in x0..x0 + bar_w {
                put(&mut rgba, w, x, y, BAR);
            }
        }
    }
    rgba
}

/// Nearest-neighbor upscale so each cell becomes a `factor` x `factor` block.
pub fn upscale(rgba: &[u8], w: usize, h: usize, factor: usize) -> Vec<u8> {
    let factor = factor.max(1);
    if factor == 1 {
        return rgba.to_vec();
    }
    let dw = w * factor;
    let mut out = vec![0u8; dw * h * factor * 4];

    out.par_chunks_mut(dw.max(1) * 4)
        .enumerate()
        .for_each(|(dy, row)| {
            let sy = dy / factor;
            for dx in 0..dw {
                let si = (sy * w + dx / factor) * 4;
                row[dx * 4..dx * 4 + 4].copy_from_slice(&rgba[si..si + 4]);
            }
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::heading_counts;
    use crate::config::AntConfig;
    use crate::rule::Rule;
    use crate::sim::Simulation;

    fn pixel(rgba: &[u8], w: usize, x: usize, y: usize) -> [u8; 4] {
        let i = (y * w + x) * 4;
        [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
    }

    #[test]
    fn plate_marks_cells_and_ant() {
        let mut plate = Grid::<Color>::new(3);
        plate.set(0, 1, Color::Black);
        let rgba = render_plate(&plate, Some((2, 0, Heading::East)), 1);
        assert_eq!(rgba.len(), 3 * 3 * 4);
        assert_eq!(pixel(&rgba, 3, 0, 0), CELL_WHITE);
        assert_eq!(pixel(&rgba, 3, 1, 0), CELL_BLACK);
        // ant at row 2, col 0
        assert_eq!(pixel(&rgba, 3, 0, 2), ant_color(Heading::East));
    }

    #[test]
    fn ant_tint_depends_on_heading() {
        let plate = Grid::<Color>::new(2);
        let tints: Vec<[u8; 4]> = Heading::ALL
            .iter()
            .map(|&h| pixel(&render_plate(&plate, Some((0, 0, h)), 1), 2, 0, 0))
            .collect();
        for i in 0..4 {
            for j in i + 1..4 {
                assert_ne!(tints[i], tints[j]);
            }
        }
    }

    #[test]
    fn ant_glyph_points_along_heading() {
        // one cell at 5 px: the glyph fills the block's base and narrows to the tip
        let plate = Grid::<Color>::new(1);
        let tint = |h| ant_color(h);

        let north = render_plate(&plate, Some((0, 0, Heading::North)), 5);
        assert_eq!(pixel(&north, 5, 2, 0), tint(Heading::North));
        assert_eq!(pixel(&north, 5, 0, 0), CELL_WHITE);
        assert_eq!(pixel(&north, 5, 4, 0), CELL_WHITE);
        assert!((0..5).all(|x| pixel(&north, 5, x, 4) == tint(Heading::North)));

        let east = render_plate(&plate, Some((0, 0, Heading::East)), 5);
        assert_eq!(pixel(&east, 5, 4, 2), tint(Heading::East));
        assert_eq!(pixel(&east, 5, 4, 0), CELL_WHITE);
        assert!((0..5).all(|y| pixel(&east, 5, 0, y) == tint(Heading::East)));

        let south = render_plate(&plate, Some((0, 0, Heading::South)), 5);
        assert_eq!(pixel(&south, 5, 2, 4), tint(Heading::South));
        assert_eq!(pixel(&south, 5, 0, 4), CELL_WHITE);

        let west = render_plate(&plate, Some((0, 0, Heading::West)), 5);
        assert_eq!(pixel(&west, 5, 0, 2), tint(Heading::West));
        assert_eq!(pixel(&west, 5, 0, 4), CELL_WHITE);
    }

    #[test]
    fn image_size_is_bounded() {
        assert_eq!(scaled_edge(400, 2), Ok(800));
        assert!(matches!(scaled_edge(16_384, 8), Err(Error::ImageTooLarge { .. })));
        assert!(matches!(scaled_edge(10, 0), Err(Error::ImageTooLarge { .. })));
        assert!(matches!(scaled_edge(10, MAX_SCALE + 1), Err(Error::ImageTooLarge { .. })));
        assert!(matches!(scaled_edge(usize::MAX, 2), Err(Error::ImageTooLarge { .. })));

        assert_eq!(fit_scale(400, 2), 2);
        assert_eq!(fit_scale(16_384, 2), 1);
        assert_eq!(fit_scale(4_000, 8), 4);
        assert_eq!(fit_scale(10, 100), MAX_SCALE);
    }

    #[test]
    fn jet_endpoints() {
        assert_eq!(jet(0.0), JET[0].1);
        assert_eq!(jet(1.0), JET[5].1);
        assert_eq!(jet(0.5), [128, 255, 128, 255]);
    }

    #[test]
    fn visits_hottest_cell_is_dark_red() {
        let mut visits = Grid::<u32>::new(2);
        visits.set(1, 1, 4);
        visits.set(0, 0, 0);
        let rgba = render_visits(&visits);
        assert_eq!(pixel(&rgba, 2, 1, 1), JET[5].1);
        assert_eq!(pixel(&rgba, 2, 0, 0), JET[0].1);
    }

    #[test]
    fn charts_have_requested_size() {
        let run = Simulation::new(AntConfig::new(Rule::WhiteRight, 10, 10))
            .unwrap()
            .run();
        let rgba = render_fractions(&run.history, 64, 32);
        assert_eq!(rgba.len(), 64 * 32 * 4);
        assert!(rgba.chunks(4).any(|p| p == SERIES_WHITE));
        assert!(rgba.chunks(4).any(|p| p == SERIES_BLACK));

        let rgba = render_headings(&heading_counts(&run.history), 40, 20);
        assert_eq!(rgba.len(), 40 * 20 * 4);
        // tallest bars reach the top row
        assert!(rgba[..40 * 4].chunks(4).any(|p| p == BAR));
    }

    #[test]
    fn upscale_repeats_pixels() {
        let rgba = [1, 2, 3, 255, 4, 5, 6, 255];
        let out = upscale(&rgba, 2, 1, 2);
        assert_eq!(out.len(), 4 * 2 * 4);
        assert_eq!(pixel(&out, 4, 1, 1), [1, 2, 3, 255]);
        assert_eq!(pixel(&out, 4, 2, 0), [4, 5, 6, 255]);
    }
}
