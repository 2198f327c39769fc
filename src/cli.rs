//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "DUCKGEN_DEBUG")]
    /// Enable debug logging. Env: DUCKGEN_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "9000", env = "DUCKGEN_PORT")]
    /// http listener, defaults to `9000`.
    /// Env: DUCKGEN_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "DUCKGEN_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: DUCKGEN_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(
        long,
        default_value = "http://localhost:9000/objects/",
        env = "DUCKGEN_PUBLIC_BASE_URL"
    )]
    /// Base URL stored objects are published under, eg a CDN domain.
    /// Env: DUCKGEN_PUBLIC_BASE_URL
    pub public_base_url: Url,

    #[clap(long, default_value = "./objects", env = "DUCKGEN_STORAGE_DIR")]
    /// Directory the object store writes into, also served at `/objects`.
    /// Env: DUCKGEN_STORAGE_DIR
    pub storage_dir: PathBuf,

    #[clap(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    /// API key for caption generation; without one memes use fallback captions.
    /// Env: ANTHROPIC_API_KEY
    pub anthropic_api_key: Option<String>,

    #[clap(
        long,
        default_value = "https://api.anthropic.com/v1/messages",
        env = "DUCKGEN_CAPTION_ENDPOINT"
    )]
    /// Messages endpoint used for caption generation.
    /// Env: DUCKGEN_CAPTION_ENDPOINT
    pub caption_endpoint: Url,

    #[clap(
        long,
        default_value = "claude-3-haiku-20240307",
        env = "DUCKGEN_CAPTION_MODEL"
    )]
    /// Model used for caption generation.
    /// Env: DUCKGEN_CAPTION_MODEL
    pub caption_model: String,

    #[clap(long, default_value = "10", env = "DUCKGEN_CAPTION_TIMEOUT")]
    /// Seconds to wait for captions before using the fallback set.
    /// Env: DUCKGEN_CAPTION_TIMEOUT
    pub caption_timeout_secs: u64,

    #[clap(long, default_value = "/opt/fonts/arial.ttf", env = "DUCKGEN_FONT")]
    /// Preferred regular font; the built-in face is used if it can't be loaded.
    /// Env: DUCKGEN_FONT
    pub font_path: PathBuf,

    #[clap(
        long,
        default_value = "/opt/fonts/arial-bold.ttf",
        env = "DUCKGEN_BOLD_FONT"
    )]
    /// Preferred bold font; the built-in face is used if it can't be loaded.
    /// Env: DUCKGEN_BOLD_FONT
    pub bold_font_path: PathBuf,
}
