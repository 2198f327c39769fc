//! Stroke, fill and text primitives layered on top of imageproc.
//!
//! Outlines follow the raster conventions of the layouts we reproduce: shape
//! outlines grow inward from the bounding box, and strokes are a square pen
//! stamped along the path.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Pixel, Rgb, Rgba, RgbaImage};
use imageproc::drawing::{
    BresenhamLineIter, draw_filled_ellipse_mut, draw_filled_rect_mut, draw_polygon_mut,
    draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;

pub(crate) const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub(crate) const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Extra gap between wrapped lines, in pixels.
const LINE_SPACING: i32 = 4;

/// Paints one full-width solid line per row, top to bottom.
pub(crate) fn fill_rows(canvas: &mut RgbaImage, rows: impl Iterator<Item = Rgb<u8>>) {
    let width = canvas.width();
    for (y, color) in rows.enumerate() {
        let Ok(y) = i32::try_from(y) else {
            return;
        };
        draw_filled_rect_mut(canvas, Rect::at(0, y).of_size(width, 1), color.to_rgba());
    }
}

/// Square pen of side `width` centred on `at`; clipped to the canvas.
pub(crate) fn stamp(canvas: &mut RgbaImage, at: (i32, i32), width: u32, color: Rgba<u8>) {
    if width == 0 {
        return;
    }
    let half = (width / 2) as i32;
    let rect = Rect::at(at.0 - half, at.1 - half).of_size(width, width);
    draw_filled_rect_mut(canvas, rect, color);
}

pub(crate) fn stroke_segment(
    canvas: &mut RgbaImage,
    from: (i32, i32),
    to: (i32, i32),
    width: u32,
    color: Rgba<u8>,
) {
    let start = (from.0 as f32, from.1 as f32);
    let end = (to.0 as f32, to.1 as f32);
    for point in BresenhamLineIter::new(start, end) {
        stamp(canvas, point, width, color);
    }
}

/// Closed outline through `points`.
pub(crate) fn stroke_polygon(
    canvas: &mut RgbaImage,
    points: &[(i32, i32)],
    width: u32,
    color: Rgba<u8>,
) {
    for (index, from) in points.iter().enumerate() {
        let to = points[(index + 1) % points.len()];
        stroke_segment(canvas, *from, to, width, color);
    }
}

/// Circular arc; angles in degrees, clockwise from 3 o'clock (y grows down).
pub(crate) fn stroke_arc(
    canvas: &mut RgbaImage,
    center: (i32, i32),
    radius: i32,
    degrees: std::ops::RangeInclusive<i32>,
    width: u32,
    color: Rgba<u8>,
) {
    let point_at = |degree: i32| {
        let theta = (degree as f32).to_radians();
        (
            center.0 + (radius as f32 * theta.cos()).round() as i32,
            center.1 + (radius as f32 * theta.sin()).round() as i32,
        )
    };
    let mut previous = point_at(*degrees.start());
    for degree in degrees {
        let next = point_at(degree);
        stroke_segment(canvas, previous, next, width, color);
        previous = next;
    }
}

/// Filled polygon. Needs at least three distinct vertices with the first
/// and last differing.
pub(crate) fn fill_polygon(canvas: &mut RgbaImage, points: &[(i32, i32)], color: Rgba<u8>) {
    let vertices: Vec<Point<i32>> = points.iter().map(|(x, y)| Point::new(*x, *y)).collect();
    if vertices.len() < 3 || vertices.first() == vertices.last() {
        return;
    }
    draw_polygon_mut(canvas, &vertices, color);
}

/// Filled ellipse with an inward outline of `outline` pixels.
pub(crate) fn outlined_ellipse(
    canvas: &mut RgbaImage,
    center: (i32, i32),
    radii: (i32, i32),
    outline: i32,
    fill: Rgba<u8>,
    outline_color: Rgba<u8>,
) {
    draw_filled_ellipse_mut(canvas, center, radii.0, radii.1, outline_color);
    let inner = (radii.0 - outline, radii.1 - outline);
    if inner.0 > 0 && inner.1 > 0 {
        draw_filled_ellipse_mut(canvas, center, inner.0, inner.1, fill);
    }
}

/// Frame of `width` pixels along the inside of the canvas edge.
pub(crate) fn frame(canvas: &mut RgbaImage, width: u32, color: Rgba<u8>) {
    let (canvas_width, canvas_height) = canvas.dimensions();
    let width = width.min(canvas_width).min(canvas_height);
    if width == 0 {
        return;
    }
    let far_x = (canvas_width - width) as i32;
    let far_y = (canvas_height - width) as i32;
    for rect in [
        Rect::at(0, 0).of_size(canvas_width, width),
        Rect::at(0, far_y).of_size(canvas_width, width),
        Rect::at(0, 0).of_size(width, canvas_height),
        Rect::at(far_x, 0).of_size(width, canvas_height),
    ] {
        draw_filled_rect_mut(canvas, rect, color);
    }
}

pub(crate) fn line_height(font: &impl Font, scale: PxScale) -> i32 {
    font.as_scaled(scale).height().ceil() as i32 + LINE_SPACING
}

/// Width and height of a block of lines drawn with [`draw_lines`].
pub(crate) fn measure_lines(font: &impl Font, scale: PxScale, lines: &[String]) -> (i32, i32) {
    let Some(last) = lines.last() else {
        return (0, 0);
    };
    let width = lines
        .iter()
        .map(|line| text_size(scale, font, line).0)
        .max()
        .unwrap_or(0);
    let advance = line_height(font, scale) * (lines.len() as i32 - 1);
    let last_height = text_size(scale, font, last).1;
    (width as i32, advance + last_height as i32)
}

pub(crate) fn draw_lines(
    canvas: &mut RgbaImage,
    color: Rgba<u8>,
    origin: (i32, i32),
    font: &impl Font,
    scale: PxScale,
    lines: &[String],
) {
    let step = line_height(font, scale);
    for (index, line) in lines.iter().enumerate() {
        let y = origin.1 + step * index as i32;
        draw_text_mut(canvas, color, origin.0, y, scale, font, line);
    }
}

/// Draws `lines` in `outline` at every offset of a `(2r+1)²` grid except the
/// centre, then once in `fill` at `origin`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_outlined_lines(
    canvas: &mut RgbaImage,
    origin: (i32, i32),
    font: &impl Font,
    scale: PxScale,
    lines: &[String],
    fill: Rgba<u8>,
    outline: Rgba<u8>,
    radius: i32,
) {
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            if dx != 0 || dy != 0 {
                draw_lines(canvas, outline, (origin.0 + dx, origin.1 + dy), font, scale, lines);
            }
        }
    }
    draw_lines(canvas, fill, origin, font, scale, lines);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> RgbaImage {
        RgbaImage::from_pixel(40, 40, WHITE)
    }

    #[test]
    fn frame_paints_edges_only() {
        let mut canvas = blank();
        frame(&mut canvas, 3, BLACK);
        assert_eq!(*canvas.get_pixel(0, 0), BLACK);
        assert_eq!(*canvas.get_pixel(2, 20), BLACK);
        assert_eq!(*canvas.get_pixel(37, 20), BLACK);
        assert_eq!(*canvas.get_pixel(20, 39), BLACK);
        assert_eq!(*canvas.get_pixel(3, 3), WHITE);
        assert_eq!(*canvas.get_pixel(36, 36), WHITE);
    }

    #[test]
    fn zero_width_frame_is_a_no_op() {
        let mut canvas = blank();
        frame(&mut canvas, 0, BLACK);
        assert!(canvas.pixels().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn outlined_ellipse_keeps_fill_inside() {
        let mut canvas = blank();
        let fill = Rgba([200, 10, 10, 255]);
        outlined_ellipse(&mut canvas, (20, 20), (15, 10), 3, fill, BLACK);
        assert_eq!(*canvas.get_pixel(20, 20), fill);
        assert_eq!(*canvas.get_pixel(34, 20), BLACK);
        assert_eq!(*canvas.get_pixel(20, 29), BLACK);
        assert_eq!(*canvas.get_pixel(1, 1), WHITE);
    }

    #[test]
    fn lower_arc_leaves_upper_half_untouched() {
        let mut canvas = blank();
        stroke_arc(&mut canvas, (20, 20), 10, 0..=180, 3, BLACK);
        assert_eq!(*canvas.get_pixel(20, 30), BLACK);
        assert_eq!(*canvas.get_pixel(20, 10), WHITE);
        assert_eq!(*canvas.get_pixel(20, 20), WHITE);
    }

    #[test]
    fn degenerate_polygon_is_ignored() {
        let mut canvas = blank();
        fill_polygon(&mut canvas, &[(1, 1), (5, 5), (1, 1)], BLACK);
        fill_polygon(&mut canvas, &[(1, 1), (5, 5)], BLACK);
        assert!(canvas.pixels().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn measuring_no_lines_is_empty() {
        let fonts = crate::render::fonts::Fonts::builtin().expect("builtin fonts");
        assert_eq!(measure_lines(fonts.regular(), PxScale::from(24.0), &[]), (0, 0));
        let one = measure_lines(fonts.regular(), PxScale::from(24.0), &["Wow".to_string()]);
        let two = measure_lines(
            fonts.regular(),
            PxScale::from(24.0),
            &["Wow".to_string(), "Wow".to_string()],
        );
        assert!(one.0 > 0 && one.1 > 0);
        assert_eq!(two.0, one.0);
        assert!(two.1 > one.1);
    }
}
