//! Shared constants for keys, caching and caption generation.

/// Content type of every stored image.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// File extension of every stored image.
pub const PNG_EXTENSION: &str = "png";

/// Key prefix for duck avatars.
pub const DUCK_KEY_PREFIX: &str = "ducks";

/// Key prefix for memes.
pub const MEME_KEY_PREFIX: &str = "memes";

/// Duck avatars are immutable once minted, cache for a year.
pub const DUCK_CACHE_CONTROL: &str = "max-age=31536000";

/// Memes are cached for a day.
pub const MEME_CACHE_CONTROL: &str = "max-age=86400";

/// Cache-Control for stored objects outside the known prefixes.
pub const DEFAULT_CACHE_CONTROL: &str = "no-cache";

/// Template used when a meme request does not name one.
pub const DEFAULT_TEMPLATE: &str = "doge";

/// Captions used whenever the caption service cannot provide any.
pub const FALLBACK_CAPTIONS: [&str; 4] = ["Such AI", "Much meme", "Very generate", "Wow"];

/// Longest caption we keep, in words.
pub const MAX_CAPTION_WORDS: usize = 10;

/// Messages API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Token budget for one caption request.
pub const CAPTION_MAX_TOKENS: u32 = 200;

/// Sampling temperature for caption requests.
pub const CAPTION_TEMPERATURE: f32 = 0.8;

#[cfg(test)]
/// Public base URL used in tests
pub const TEST_PUBLIC_BASE_URL: &str = "https://cdn.example.org/assets/";
