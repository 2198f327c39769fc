use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use duckgen::render::{DuckProfile, DuckTraits, Fonts, TokenId, render_duck, render_meme};
use std::fs;
use std::path::PathBuf;

/// Render a duck or meme straight to a PNG file, without the server.
///
///   render_sample duck --rarity 5 --species 3 --out duck.png
///   render_sample meme --template drake "Writing tests" "Shipping anyway"
#[derive(Parser, Debug)]
#[command(name = "render_sample")]
struct Args {
    /// Regular font file; the built-in face is used when omitted
    #[arg(long, env = "DUCKGEN_FONT")]
    font: Option<PathBuf>,

    /// Bold font file; the built-in face is used when omitted
    #[arg(long, env = "DUCKGEN_BOLD_FONT")]
    bold_font: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw a duck avatar
    Duck {
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        rarity: i64,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        species: i64,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        color: i64,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        personality: i64,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        level: i64,
        #[arg(long, default_value = "sample")]
        token_id: String,
        #[arg(long, default_value = "duck.png")]
        out: PathBuf,
    },
    /// Draw a meme with the given captions
    Meme {
        #[arg(long, default_value = "doge")]
        template: String,
        #[arg(long, default_value = "meme.png")]
        out: PathBuf,
        /// One caption per text area, in order
        captions: Vec<String>,
    },
}

fn load_fonts(args: &Args) -> Result<Fonts> {
    Fonts::load(args.font.as_deref(), args.bold_font.as_deref())
        .map_err(|err| anyhow!("Failed to load fonts: {err}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let fonts = load_fonts(&args)?;

    let (png, out) = match args.command {
        Command::Duck {
            rarity,
            species,
            color,
            personality,
            level,
            token_id,
            out,
        } => {
            let profile = DuckProfile {
                token_id: TokenId::Text(token_id),
                level,
                traits: DuckTraits {
                    rarity,
                    species,
                    color,
                    personality,
                },
            };
            let png = render_duck(&profile, &fonts)
                .map_err(|err| anyhow!("Failed to render duck: {err}"))?;
            (png, out)
        }
        Command::Meme {
            template,
            out,
            captions,
        } => {
            let png = render_meme(&template, &captions, &fonts)
                .map_err(|err| anyhow!("Failed to render meme: {err}"))?;
            (png, out)
        }
    };

    fs::write(&out, &png).with_context(|| format!("Failed to write {}", out.display()))?;
    println!("Wrote {} ({} bytes)", out.display(), png.len());
    Ok(())
}
