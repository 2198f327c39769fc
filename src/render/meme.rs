//! Template-driven meme compositing.

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbaImage};

use super::color::gradient_rows;
use super::draw::{BLACK, WHITE, draw_outlined_lines, fill_rows, measure_lines};
use super::encode_opaque_png;
use super::fonts::Fonts;
use crate::error::DuckgenError;

/// Meme canvas width in pixels.
pub const MEME_WIDTH: u32 = 500;
/// Meme canvas height in pixels.
pub const MEME_HEIGHT: u32 = 400;

/// Captions up to this many characters use the large face.
const SHORT_CAPTION_CHARS: usize = 15;
const LARGE_SIZE: f32 = 32.0;
const SMALL_SIZE: f32 = 24.0;
/// Captions are wrapped at this many characters per line.
pub const WRAP_COLUMNS: usize = 20;
const OUTLINE_RADIUS: i32 = 2;

/// Region of the canvas a caption is centred in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TextArea {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

const fn area(x: i32, y: i32, width: i32, height: i32) -> TextArea {
    TextArea {
        x,
        y,
        width,
        height,
    }
}

/// A named layout with its caption slots in drawing order.
#[derive(Debug, Eq, PartialEq)]
pub struct MemeTemplate {
    /// Identifier used in requests and storage keys.
    pub id: &'static str,
    /// Display name, also used when asking for captions.
    pub name: &'static str,
    /// Caption slots.
    pub text_areas: &'static [TextArea],
}

/// Two stacked panels on the right-hand side.
pub static DRAKE: MemeTemplate = MemeTemplate {
    id: "drake",
    name: "Drake Pointing",
    text_areas: &[area(220, 80, 200, 100), area(220, 230, 200, 100)],
};

/// Three labels along the bottom edge.
pub static DISTRACTED_BOYFRIEND: MemeTemplate = MemeTemplate {
    id: "distracted_boyfriend",
    name: "Distracted Boyfriend",
    text_areas: &[
        area(50, 400, 150, 50),
        area(200, 400, 150, 50),
        area(350, 400, 150, 50),
    ],
};

/// Four scattered captions; also the layout for unknown template ids.
pub static DOGE: MemeTemplate = MemeTemplate {
    id: "doge",
    name: "Doge",
    text_areas: &[
        area(50, 50, 100, 30),
        area(300, 100, 100, 30),
        area(100, 200, 100, 30),
        area(250, 250, 100, 30),
    ],
};

/// Every known template.
pub static TEMPLATES: [&MemeTemplate; 3] = [&DRAKE, &DISTRACTED_BOYFRIEND, &DOGE];

/// Looks a template up by id; unknown ids get [`DOGE`].
pub fn resolve_template(id: &str) -> &'static MemeTemplate {
    TEMPLATES
        .iter()
        .copied()
        .find(|template| template.id == id)
        .unwrap_or(&DOGE)
}

/// Background fill, one per known layout family.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Background {
    /// Yellow to orange-yellow, top to bottom.
    WarmGradient,
    /// Solid blue.
    FlatBlue,
    /// Lavender to white, top to bottom.
    CoolGradient,
}

impl Background {
    /// Background for a resolved template.
    pub fn for_template(template: &MemeTemplate) -> Self {
        match template.id {
            "doge" => Self::WarmGradient,
            "drake" => Self::FlatBlue,
            _ => Self::CoolGradient,
        }
    }

    fn paint(self, canvas: &mut RgbaImage) {
        let height = canvas.height();
        match self {
            Self::WarmGradient => {
                fill_rows(canvas, gradient_rows(height, Rgb([255, 200, 100]), [0, 55, 0]));
            }
            Self::FlatBlue => {
                fill_rows(canvas, std::iter::repeat_n(Rgb([64, 128, 255]), height as usize));
            }
            Self::CoolGradient => {
                fill_rows(canvas, gradient_rows(height, Rgb([150, 150, 255]), [105, 105, 0]));
            }
        }
    }
}

/// A caption after wrapping and centring.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlacedCaption {
    pub(crate) origin: (i32, i32),
    pub(crate) lines: Vec<String>,
    pub(crate) large: bool,
}

fn face(fonts: &Fonts, large: bool) -> (&FontArc, PxScale) {
    if large {
        (fonts.bold(), PxScale::from(LARGE_SIZE))
    } else {
        (fonts.regular(), PxScale::from(SMALL_SIZE))
    }
}

pub(crate) fn place_caption(area: &TextArea, caption: &str, fonts: &Fonts) -> PlacedCaption {
    let large = caption.chars().count() <= SHORT_CAPTION_CHARS;
    let lines = wrap_text(caption, WRAP_COLUMNS);
    let (font, scale) = face(fonts, large);
    let (text_width, text_height) = measure_lines(font, scale, &lines);
    let origin = (
        area.x + (area.width - text_width).div_euclid(2),
        area.y + (area.height - text_height).div_euclid(2),
    );
    PlacedCaption {
        origin,
        lines,
        large,
    }
}

/// Greedy word wrap at `width` characters. Runs of whitespace collapse to a
/// single space and words longer than a line are broken across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        let mut rest = chars.as_slice();
        while !rest.is_empty() {
            let separator = usize::from(current_len > 0);
            let room = width.saturating_sub(current_len + separator);
            let take = if rest.len() <= room {
                rest.len()
            } else if rest.len() > width && room > 0 {
                room
            } else {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            };
            if separator == 1 {
                current.push(' ');
            }
            current.extend(&rest[..take]);
            current_len += separator + take;
            rest = &rest[take..];
            if !rest.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Composites captions onto the template and encodes an opaque PNG.
///
/// Captions pair up with text areas in order; extra captions are dropped and
/// areas without a caption stay empty.
pub fn render_meme(
    template_id: &str,
    captions: &[String],
    fonts: &Fonts,
) -> Result<Vec<u8>, DuckgenError> {
    let canvas = draw_meme(resolve_template(template_id), captions, fonts);
    encode_opaque_png(&canvas)
}

pub(crate) fn draw_meme(template: &MemeTemplate, captions: &[String], fonts: &Fonts) -> RgbaImage {
    let mut canvas = RgbaImage::new(MEME_WIDTH, MEME_HEIGHT);
    Background::for_template(template).paint(&mut canvas);

    for (area, caption) in template.text_areas.iter().zip(captions) {
        let placed = place_caption(area, caption, fonts);
        let (font, scale) = face(fonts, placed.large);
        draw_outlined_lines(
            &mut canvas,
            placed.origin,
            font,
            scale,
            &placed.lines,
            WHITE,
            BLACK,
            OUTLINE_RADIUS,
        );
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn fonts() -> Fonts {
        Fonts::builtin().expect("builtin fonts")
    }

    fn captions(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|text| text.to_string()).collect()
    }

    #[test]
    fn unknown_template_resolves_to_doge() {
        assert_eq!(resolve_template("unknown_xyz").id, "doge");
        assert_eq!(resolve_template("").id, "doge");
        assert_eq!(resolve_template("Drake").id, "doge");
        assert_eq!(resolve_template("drake").id, "drake");
        assert_eq!(resolve_template("distracted_boyfriend").text_areas.len(), 3);
    }

    #[test]
    fn backgrounds_follow_the_resolved_template() {
        assert_eq!(Background::for_template(&DOGE), Background::WarmGradient);
        assert_eq!(Background::for_template(&DRAKE), Background::FlatBlue);
        assert_eq!(
            Background::for_template(&DISTRACTED_BOYFRIEND),
            Background::CoolGradient
        );
        assert_eq!(
            Background::for_template(resolve_template("nope")),
            Background::WarmGradient
        );
    }

    #[test]
    fn unknown_template_renders_exactly_like_doge() {
        let fonts = fonts();
        let texts = captions(&["hi"]);
        let unknown = render_meme("unknown_xyz", &texts, &fonts).expect("render unknown");
        let doge = render_meme("doge", &texts, &fonts).expect("render doge");
        assert_eq!(unknown, doge);
    }

    #[test]
    fn single_caption_is_centred_in_the_first_area() {
        let fonts = fonts();
        let placed = place_caption(&DOGE.text_areas[0], "hi", &fonts);
        let (font, scale) = face(&fonts, true);
        let (width, height) = measure_lines(font, scale, &placed.lines);
        assert!(placed.large);
        assert_eq!(placed.lines, vec!["hi".to_string()]);
        assert_eq!(placed.origin.0, 50 + (100 - width).div_euclid(2));
        assert_eq!(placed.origin.1, 50 + (30 - height).div_euclid(2));
    }

    #[test]
    fn long_captions_use_the_small_face() {
        let fonts = fonts();
        let area = &DRAKE.text_areas[0];
        assert!(place_caption(area, "fifteen chars!!", &fonts).large);
        assert!(!place_caption(area, "sixteen chars!!!", &fonts).large);
    }

    #[test]
    fn missing_captions_leave_areas_untouched() {
        let canvas = draw_meme(&DRAKE, &captions(&["Only the top"]), &fonts());
        let blue = Rgba([64, 128, 255, 255]);
        let lower = DRAKE.text_areas[1];
        for y in lower.y..lower.y + lower.height {
            for x in lower.x..lower.x + lower.width {
                assert_eq!(*canvas.get_pixel(x as u32, y as u32), blue);
            }
        }
        let upper = DRAKE.text_areas[0];
        let upper_touched = (upper.y..upper.y + upper.height).any(|y| {
            (upper.x..upper.x + upper.width).any(|x| *canvas.get_pixel(x as u32, y as u32) == WHITE)
        });
        assert!(upper_touched);
    }

    #[test]
    fn extra_captions_are_ignored() {
        let fonts = fonts();
        let two = draw_meme(&DRAKE, &captions(&["No", "Yes"]), &fonts);
        let three = draw_meme(&DRAKE, &captions(&["No", "Yes", "Maybe"]), &fonts);
        assert_eq!(two, three);
    }

    #[test]
    fn outline_surrounds_the_white_text() {
        let fonts = fonts();
        let canvas = draw_meme(&DRAKE, &captions(&["WOW"]), &fonts);
        assert!(canvas.pixels().any(|pixel| *pixel == WHITE));
        assert!(canvas.pixels().any(|pixel| *pixel == BLACK));

        let png = render_meme("drake", &captions(&["WOW"]), &fonts).expect("render");
        let decoded = image::load_from_memory(&png).expect("decode");
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("The quick brown fox jumps over the lazy dog", 20),
            vec!["The quick brown fox", "jumps over the lazy", "dog"]
        );
        assert_eq!(wrap_text("  Much   meme  ", 20), vec!["Much meme"]);
        assert!(wrap_text("", 20).is_empty());
        assert!(wrap_text("   ", 20).is_empty());
    }

    #[test]
    fn breaks_words_longer_than_a_line() {
        assert_eq!(
            wrap_text("abcdefghijklmnopqrstuvwxyz", 20),
            vec!["abcdefghijklmnopqrst", "uvwxyz"]
        );
        assert_eq!(
            wrap_text("hello abcdefghijklmnopqrstuvwxyz", 20),
            vec!["hello abcdefghijklmn", "opqrstuvwxyz"]
        );
        assert_eq!(
            wrap_text("twenty characters ok", 20),
            vec!["twenty characters ok"]
        );
    }
}
