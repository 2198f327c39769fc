//! Procedural duck avatars.

use ab_glyph::PxScale;
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use serde::Deserialize;

use super::color::{gradient_rows, hex_to_rgb, one_based_lookup, palette_lookup};
use super::draw::{
    BLACK, WHITE, draw_outlined_lines, fill_polygon, fill_rows, frame, outlined_ellipse,
    stroke_arc, stroke_polygon, stroke_segment,
};
use super::fonts::Fonts;
use super::encode_png;
use crate::error::DuckgenError;

/// Avatar canvas width in pixels.
pub const DUCK_WIDTH: u32 = 400;
/// Avatar canvas height in pixels.
pub const DUCK_HEIGHT: u32 = 400;

/// Border/background colors for rarity 1 (common) through 5 (legendary).
pub static RARITY_COLORS: [&str; 5] = ["#8B4513", "#32CD32", "#4169E1", "#9932CC", "#FFD700"];

/// Species names, addressed with the 1-based `species` trait.
pub static SPECIES_NAMES: [&str; 10] = [
    "Mallard",
    "Teal",
    "Canvasback",
    "Pintail",
    "Gadwall",
    "Wigeon",
    "Shoveler",
    "Redhead",
    "Scaup",
    "Bufflehead",
];

/// Body colors, addressed with the 0-based `color` trait.
pub static BODY_COLORS: [&str; 20] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8E8", "#F7DC6F",
    "#BB8FCE", "#85C1E9", "#F8C471", "#82E0AA", "#F1948A", "#85C1E9", "#D7BDE2", "#A9CCE3",
    "#AED6F1", "#A3E4D7", "#D5F3FE", "#FADBD8",
];

const GRADIENT_DELTA: [u8; 3] = [30, 20, 10];
const BEAK: Rgba<u8> = Rgba([255, 165, 0, 255]);
const LABEL_SIZE: f32 = 24.0;
const LABEL_OUTLINE: i32 = 2;
const EYE_SIZE: i32 = 12;

fn one() -> i64 {
    1
}

/// Visual traits of a duck. Every field defaults to 1 when absent.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
pub struct DuckTraits {
    /// 1..=5; anything else renders with the rarity 1 color.
    #[serde(default = "one")]
    pub rarity: i64,
    /// 1-based species index, wraps.
    #[serde(default = "one")]
    pub species: i64,
    /// Body palette index, wraps.
    #[serde(default = "one")]
    pub color: i64,
    /// Selects the eye expression.
    #[serde(default = "one")]
    pub personality: i64,
}

impl Default for DuckTraits {
    fn default() -> Self {
        Self {
            rarity: 1,
            species: 1,
            color: 1,
            personality: 1,
        }
    }
}

/// Token identifiers arrive as either JSON strings or integers.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TokenId {
    /// Numeric token id.
    Number(i64),
    /// Free-form token id.
    Text(String),
}

impl Default for TokenId {
    fn default() -> Self {
        Self::Text("unknown".to_string())
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// The duck being drawn.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuckProfile {
    /// Used in the storage key.
    #[serde(default)]
    pub token_id: TokenId,
    /// Shown as `Lv.N`.
    #[serde(default = "one")]
    pub level: i64,
    /// Appearance.
    #[serde(default)]
    pub traits: DuckTraits,
}

/// Eye expression, derived once from the personality trait.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EyeStyle {
    /// Personality 2 and below: closed happy arcs.
    Happy,
    /// Personality 3 and 4: round pupils.
    Open,
    /// Personality 5 and above: one pupil, one wink.
    Wink,
}

impl EyeStyle {
    /// Buckets a personality value; every integer lands in exactly one style.
    pub fn from_personality(personality: i64) -> Self {
        if personality <= 2 {
            Self::Happy
        } else if personality <= 4 {
            Self::Open
        } else {
            Self::Wink
        }
    }
}

/// Rarity color, falling back to rarity 1 outside 1..=5.
pub fn rarity_color(rarity: i64) -> &'static str {
    usize::try_from(rarity)
        .ok()
        .and_then(|rarity| rarity.checked_sub(1))
        .and_then(|slot| RARITY_COLORS.get(slot))
        .copied()
        .unwrap_or(RARITY_COLORS[0])
}

/// Border width for a rarity: twice the rarity, at most 5, never negative.
pub fn border_width(rarity: i64) -> u32 {
    rarity.saturating_mul(2).clamp(0, 5) as u32
}

/// Species label for the 1-based species trait.
pub fn species_name(species: i64) -> &'static str {
    one_based_lookup(&SPECIES_NAMES, species).copied().unwrap_or(SPECIES_NAMES[0])
}

/// Renders the avatar and encodes it as PNG.
pub fn render_duck(profile: &DuckProfile, fonts: &Fonts) -> Result<Vec<u8>, DuckgenError> {
    let canvas = draw_duck(profile, fonts)?;
    encode_png(&canvas)
}

pub(crate) fn draw_duck(profile: &DuckProfile, fonts: &Fonts) -> Result<RgbaImage, DuckgenError> {
    let traits = &profile.traits;
    let mut canvas = RgbaImage::new(DUCK_WIDTH, DUCK_HEIGHT);

    let rarity = hex_to_rgb(rarity_color(traits.rarity))?;
    fill_rows(&mut canvas, gradient_rows(DUCK_HEIGHT, rarity, GRADIENT_DELTA));

    let body_hex = palette_lookup(&BODY_COLORS, traits.color)
        .ok_or_else(|| DuckgenError::Format("Body color table is empty".to_string()))?;
    let body = hex_to_rgb(body_hex)?.to_rgba();

    draw_body(&mut canvas, body, EyeStyle::from_personality(traits.personality));
    frame(&mut canvas, border_width(traits.rarity), rarity.to_rgba());

    let font = fonts.regular();
    let scale = PxScale::from(LABEL_SIZE);
    let width = DUCK_WIDTH as i32;
    let height = DUCK_HEIGHT as i32;
    let labels = [
        ((width - 80, 20), format!("Lv.{}", profile.level)),
        ((20, height - 40), species_name(traits.species).to_string()),
    ];
    for (origin, text) in labels {
        draw_outlined_lines(
            &mut canvas,
            origin,
            font,
            scale,
            &[text],
            WHITE,
            BLACK,
            LABEL_OUTLINE,
        );
    }
    // glyph blending leaves edge alpha just under 255 on an opaque canvas
    for pixel in canvas.pixels_mut() {
        pixel.0[3] = u8::MAX;
    }

    Ok(canvas)
}

fn draw_body(canvas: &mut RgbaImage, body: Rgba<u8>, eyes: EyeStyle) {
    let cx = (DUCK_WIDTH / 2) as i32;
    let cy = (DUCK_HEIGHT / 2) as i32;

    // bounding box [cx-60, cy-40] .. [cx+60, cy+60]
    outlined_ellipse(canvas, (cx, cy + 10), (60, 50), 3, body, BLACK);

    let head_y = cy - 60;
    outlined_ellipse(canvas, (cx, head_y), (40, 40), 3, body, BLACK);

    let beak = [(cx - 15, head_y), (cx - 35, head_y + 5), (cx - 15, head_y + 10)];
    fill_polygon(canvas, &beak, BEAK);
    stroke_polygon(canvas, &beak, 2, BLACK);

    let left = (cx - 20, head_y - 10);
    let right = (cx + 20, head_y - 10);
    let pupil = |canvas: &mut RgbaImage, at: (i32, i32)| {
        draw_filled_circle_mut(canvas, at, EYE_SIZE / 2, BLACK);
    };
    match eyes {
        EyeStyle::Happy => {
            stroke_arc(canvas, left, EYE_SIZE, 0..=180, 3, BLACK);
            stroke_arc(canvas, right, EYE_SIZE, 0..=180, 3, BLACK);
        }
        EyeStyle::Open => {
            pupil(canvas, left);
            pupil(canvas, right);
        }
        EyeStyle::Wink => {
            pupil(canvas, left);
            let half = EYE_SIZE / 2;
            stroke_segment(canvas, (right.0 - half, right.1), (right.0 + half, right.1), 3, BLACK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fonts() -> Fonts {
        Fonts::builtin().expect("builtin fonts")
    }

    fn profile(traits: DuckTraits) -> DuckProfile {
        DuckProfile {
            traits,
            ..Default::default()
        }
    }

    #[test]
    fn personality_buckets_are_exhaustive() {
        assert_eq!(EyeStyle::from_personality(i64::MIN), EyeStyle::Happy);
        assert_eq!(EyeStyle::from_personality(1), EyeStyle::Happy);
        assert_eq!(EyeStyle::from_personality(2), EyeStyle::Happy);
        assert_eq!(EyeStyle::from_personality(3), EyeStyle::Open);
        assert_eq!(EyeStyle::from_personality(4), EyeStyle::Open);
        assert_eq!(EyeStyle::from_personality(5), EyeStyle::Wink);
        assert_eq!(EyeStyle::from_personality(i64::MAX), EyeStyle::Wink);
    }

    #[test]
    fn out_of_range_rarity_uses_common_color() {
        for rarity in [0, -3, 6, 99, i64::MIN, i64::MAX] {
            assert_eq!(rarity_color(rarity), RARITY_COLORS[0]);
        }
        assert_eq!(rarity_color(5), "#FFD700");
    }

    #[test]
    fn border_width_caps_at_five() {
        assert_eq!(border_width(1), 2);
        assert_eq!(border_width(2), 4);
        assert_eq!(border_width(5), 5);
        assert_eq!(border_width(0), 0);
        assert_eq!(border_width(-4), 0);
        assert_eq!(border_width(i64::MAX), 5);
    }

    #[test]
    fn species_wraps_both_directions() {
        assert_eq!(species_name(1), "Mallard");
        assert_eq!(species_name(11), "Mallard");
        assert_eq!(species_name(10), "Bufflehead");
        assert_eq!(species_name(0), "Bufflehead");
        assert_eq!(species_name(-9), "Mallard");
        assert_eq!(species_name(-8), "Teal");
    }

    #[test]
    fn legendary_winking_duck() {
        let traits = DuckTraits {
            rarity: 5,
            species: 11,
            color: 0,
            personality: 6,
        };
        assert_eq!(species_name(traits.species), SPECIES_NAMES[0]);
        assert_eq!(EyeStyle::from_personality(traits.personality), EyeStyle::Wink);
        assert_eq!(border_width(traits.rarity), 5);

        let canvas = draw_duck(&profile(traits), &fonts()).expect("render");
        let gold = Rgba([0xff, 0xd7, 0x00, 255]);
        assert_eq!(*canvas.get_pixel(0, 200), gold);
        assert_eq!(*canvas.get_pixel(4, 200), gold);
        // body fill at its centre uses palette entry 0
        assert_eq!(*canvas.get_pixel(200, 220), Rgba([0xff, 0x6b, 0x6b, 255]));
        // left pupil is filled, right eye is only a line
        assert_eq!(*canvas.get_pixel(180, 130), BLACK);
        assert_eq!(*canvas.get_pixel(220, 130), BLACK);
        assert_ne!(*canvas.get_pixel(220, 126), BLACK);
    }

    #[test]
    fn happy_eyes_leave_the_eye_centre_clear() {
        let canvas = draw_duck(&profile(DuckTraits::default()), &fonts()).expect("render");
        let body = Rgba([0x4e, 0xcd, 0xc4, 255]);
        assert_eq!(*canvas.get_pixel(180, 130), body);
        assert_eq!(*canvas.get_pixel(180, 142), BLACK);
    }

    #[test]
    fn open_eyes_fill_both_pupils() {
        let traits = DuckTraits {
            personality: 4,
            ..Default::default()
        };
        let canvas = draw_duck(&profile(traits), &fonts()).expect("render");
        assert_eq!(*canvas.get_pixel(180, 130), BLACK);
        assert_eq!(*canvas.get_pixel(220, 130), BLACK);
    }

    #[test]
    fn background_is_opaque_and_brightens_downwards() {
        let traits = DuckTraits {
            rarity: 3,
            ..Default::default()
        };
        let canvas = draw_duck(&profile(traits), &fonts()).expect("render");
        let top = canvas.get_pixel(100, 10);
        let bottom = canvas.get_pixel(100, 330);
        assert_eq!(top.0[3], 255);
        assert!(bottom.0[0] > top.0[0]);
        assert!(bottom.0[2] >= top.0[2]);
    }

    #[test]
    fn labelled_duck_stays_fully_opaque() {
        let profile = DuckProfile {
            level: 88,
            ..profile(DuckTraits::default())
        };
        let png = render_duck(&profile, &fonts()).expect("render");
        let decoded = image::load_from_memory(&png).expect("decode").to_rgba8();
        assert!(decoded.pixels().all(|pixel| pixel.0[3] == 255));
    }

    #[test]
    fn extreme_traits_render() {
        let traits = DuckTraits {
            rarity: i64::MIN,
            species: i64::MIN,
            color: i64::MIN,
            personality: i64::MIN,
        };
        let canvas = draw_duck(&profile(traits), &fonts()).expect("render");
        assert_eq!(canvas.dimensions(), (DUCK_WIDTH, DUCK_HEIGHT));
    }
}
