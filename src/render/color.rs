//! Color parsing, palette indexing and gradient rows shared by both compositors.

use image::Rgb;

/// Errors returned when a fixed color table entry is malformed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ColorFormatError {
    /// The value did not contain exactly six hex digits after the `#`.
    Length(String),
    /// The value contained a non-hex character.
    Digit(String),
}

impl std::fmt::Display for ColorFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length(value) => write!(f, "Expected six hex digits in color {value:?}"),
            Self::Digit(value) => write!(f, "Invalid hex digit in color {value:?}"),
        }
    }
}

impl std::error::Error for ColorFormatError {}

/// Parses `#RRGGBB` (the `#` is optional) into an RGB triple.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb<u8>, ColorFormatError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ColorFormatError::Length(hex.to_string()));
    }
    // from_str_radix alone would accept a leading '+'
    if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return Err(ColorFormatError::Digit(hex.to_string()));
    }
    let channel = |start: usize| {
        u8::from_str_radix(&digits[start..start + 2], 16)
            .map_err(|_| ColorFormatError::Digit(hex.to_string()))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// Looks up `table[index mod len]` using Euclidean modulo, so negative
/// indices wrap from the end. Only an empty table yields `None`.
pub fn palette_lookup<T>(table: &[T], index: i64) -> Option<&T> {
    wrapped(table, i128::from(index))
}

/// Same as [`palette_lookup`] for tables addressed with 1-based indices.
pub fn one_based_lookup<T>(table: &[T], index: i64) -> Option<&T> {
    wrapped(table, i128::from(index) - 1)
}

fn wrapped<T>(table: &[T], index: i128) -> Option<&T> {
    let len = i128::try_from(table.len()).ok().filter(|len| *len > 0)?;
    let slot = usize::try_from(index.rem_euclid(len)).ok()?;
    table.get(slot)
}

/// Yields one color per row of a `height`-row canvas, brightening `base` by
/// `(y / height) * delta` per channel and clamping at 255.
pub fn gradient_rows(
    height: u32,
    base: Rgb<u8>,
    delta: [u8; 3],
) -> impl Iterator<Item = Rgb<u8>> {
    (0..height).map(move |y| {
        let progress = y as f32 / height as f32;
        let mut row = [0u8; 3];
        for (channel, out) in row.iter_mut().enumerate() {
            let lift = (progress * f32::from(delta[channel])) as u16;
            *out = (u16::from(base.0[channel]) + lift).min(255) as u8;
        }
        Rgb(row)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(hex_to_rgb("#8B4513"), Ok(Rgb([0x8b, 0x45, 0x13])));
        assert_eq!(hex_to_rgb("ffd700"), Ok(Rgb([255, 215, 0])));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(matches!(hex_to_rgb("#12345"), Err(ColorFormatError::Length(_))));
        assert!(matches!(hex_to_rgb("#1234567"), Err(ColorFormatError::Length(_))));
        assert!(matches!(hex_to_rgb("#12G456"), Err(ColorFormatError::Digit(_))));
        assert!(matches!(hex_to_rgb("#+12345"), Err(ColorFormatError::Digit(_))));
        assert!(matches!(hex_to_rgb("##123456"), Err(ColorFormatError::Length(_))));
        assert!(matches!(hex_to_rgb("#ééé"), Err(ColorFormatError::Length(_))));
    }

    #[test]
    fn lookup_wraps_negative_and_large_indices() {
        let table = ["a", "b", "c"];
        assert_eq!(palette_lookup(&table, 0), Some(&"a"));
        assert_eq!(palette_lookup(&table, 4), Some(&"b"));
        assert_eq!(palette_lookup(&table, -1), Some(&"c"));
        assert_eq!(palette_lookup(&table, i64::MIN), Some(&"b"));
        assert_eq!(one_based_lookup(&table, 1), Some(&"a"));
        assert_eq!(one_based_lookup(&table, 0), Some(&"c"));
        assert_eq!(one_based_lookup(&table, i64::MIN), Some(&"a"));
        let empty: [&str; 0] = [];
        assert_eq!(palette_lookup(&empty, 3), None);
    }

    #[test]
    fn gradient_starts_at_base_and_clamps() {
        let rows: Vec<_> = gradient_rows(400, Rgb([250, 10, 0]), [30, 20, 10]).collect();
        assert_eq!(rows.len(), 400);
        assert_eq!(rows[0], Rgb([250, 10, 0]));
        assert_eq!(rows[200], Rgb([255, 20, 5]));
        assert_eq!(rows[399], Rgb([255, 29, 9]));
    }
}
