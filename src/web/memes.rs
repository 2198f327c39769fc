//! `POST /memes`

use super::prelude::*;
use crate::captions::captions_for;
use crate::constants::{DEFAULT_TEMPLATE, MEME_CACHE_CONTROL, MEME_KEY_PREFIX, PNG_CONTENT_TYPE};
use crate::render::{render_meme, resolve_template};
use crate::storage::{object_key, public_url};

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

/// Body of a meme request.
#[derive(Clone, Debug, Deserialize)]
pub struct MemeRequest {
    /// What the meme is about. Required.
    #[serde(default)]
    pub prompt: String,
    /// Template id; unknown ids render as doge.
    #[serde(default = "default_template")]
    pub template: String,
}

/// Where the meme was published and what it says.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemeResponse {
    /// Public URL of the image.
    pub image_url: String,
    /// The template id as requested.
    pub template: String,
    /// Captions drawn, in text-area order.
    pub concept: Vec<String>,
}

pub(crate) async fn meme_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MemeResponse>, DuckgenError> {
    let MemeRequest { prompt, template } = parse_request(&body)?;
    if prompt.trim().is_empty() {
        return Err(DuckgenError::Validation("Prompt is required".to_string()));
    }

    let resolved = resolve_template(&template);
    let captions = captions_for(
        state.captions.as_ref(),
        &prompt,
        resolved,
        state.caption_timeout,
    )
    .await;

    let key = object_key(MEME_KEY_PREFIX, &template, Utc::now().timestamp());
    let fonts = state.fonts.clone();
    let drawn = captions.clone();
    let png =
        tokio::task::spawn_blocking(move || render_meme(resolved.id, &drawn, &fonts)).await??;
    state
        .store
        .put(&key, png, PNG_CONTENT_TYPE, MEME_CACHE_CONTROL)
        .await?;
    let image_url = public_url(&state.public_base_url, &key)?;
    info!("Published meme {} ({} captions)", key, captions.len());

    Ok(Json(MemeResponse {
        image_url: image_url.into(),
        template,
        concept: captions,
    }))
}
