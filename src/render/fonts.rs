//! Font faces used for labels and captions.

use std::path::Path;

use ab_glyph::FontArc;
use tracing::{debug, warn};

use crate::error::DuckgenError;

static BUILTIN_REGULAR: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans.ttf"
));
static BUILTIN_BOLD: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans-Bold.ttf"
));

/// Regular and bold faces, loaded once and shared read-only between renders.
#[derive(Clone)]
pub struct Fonts {
    regular: FontArc,
    bold: FontArc,
}

impl std::fmt::Debug for Fonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fonts").finish_non_exhaustive()
    }
}

impl Fonts {
    /// The faces compiled into the binary.
    pub fn builtin() -> Result<Self, DuckgenError> {
        Ok(Self {
            regular: builtin_face(BUILTIN_REGULAR)?,
            bold: builtin_face(BUILTIN_BOLD)?,
        })
    }

    /// Loads the preferred font files. A face given no path uses its
    /// built-in counterpart quietly; one whose file is missing or unparsable
    /// falls back with a warning. Only a broken built-in face is an error.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self, DuckgenError> {
        Ok(Self {
            regular: load_face(regular, BUILTIN_REGULAR)?,
            bold: load_face(bold, BUILTIN_BOLD)?,
        })
    }

    /// Face for labels and long captions.
    pub fn regular(&self) -> &FontArc {
        &self.regular
    }

    /// Face for short captions.
    pub fn bold(&self) -> &FontArc {
        &self.bold
    }
}

fn load_face(path: Option<&Path>, fallback: &'static [u8]) -> Result<FontArc, DuckgenError> {
    let Some(path) = path else {
        return builtin_face(fallback);
    };
    match std::fs::read(path) {
        Ok(bytes) => match FontArc::try_from_vec(bytes) {
            Ok(font) => {
                debug!("Loaded font {}", path.display());
                return Ok(font);
            }
            Err(err) => warn!("Font {} is not usable ({err}), using built-in", path.display()),
        },
        Err(err) => warn!("Font {} unavailable ({err}), using built-in", path.display()),
    }
    builtin_face(fallback)
}

fn builtin_face(bytes: &'static [u8]) -> Result<FontArc, DuckgenError> {
    FontArc::try_from_slice(bytes)
        .map_err(|err| DuckgenError::Format(format!("Built-in font is corrupt: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_glyph::Font;

    #[test]
    fn missing_font_files_fall_back_to_builtin() {
        let dir = tempfile::tempdir().expect("tempdir");
        let garbage = dir.path().join("garbage.ttf");
        std::fs::write(&garbage, b"not a font").expect("write garbage font");

        let fonts = Fonts::load(
            Some(dir.path().join("missing.ttf").as_path()),
            Some(garbage.as_path()),
        );
        assert!(fonts.is_ok());
    }

    #[test]
    fn omitted_faces_use_builtin() {
        let builtin = load_face(None, BUILTIN_BOLD).expect("builtin bold");
        let bold = Fonts::load(None, None).expect("load").bold;
        assert_eq!(bold.glyph_count(), builtin.glyph_count());

        let dir = tempfile::tempdir().expect("tempdir");
        let regular = dir.path().join("regular.ttf");
        std::fs::write(&regular, BUILTIN_REGULAR).expect("write font");
        let fonts = Fonts::load(Some(regular.as_path()), None).expect("partial load");
        assert_eq!(fonts.bold().glyph_count(), builtin.glyph_count());
    }

    #[test]
    fn builtin_faces_parse() {
        assert!(Fonts::builtin().is_ok());
    }
}
