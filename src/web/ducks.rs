//! `POST /ducks`

use super::prelude::*;
use crate::constants::{DUCK_CACHE_CONTROL, DUCK_KEY_PREFIX, PNG_CONTENT_TYPE};
use crate::render::{DuckProfile, render_duck};
use crate::storage::{object_key, public_url};

/// Body of a duck render request. A missing profile renders the default duck.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuckRequest {
    /// The duck to draw.
    #[serde(default)]
    pub duck_profile: DuckProfile,
}

/// Where the rendered duck was published.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuckResponse {
    /// Public URL of the image.
    pub image_url: String,
    /// Storage key of the image.
    pub filename: String,
}

pub(crate) async fn duck_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DuckResponse>, DuckgenError> {
    let DuckRequest { duck_profile } = parse_request(&body)?;
    let key = object_key(
        DUCK_KEY_PREFIX,
        &duck_profile.token_id.to_string(),
        Utc::now().timestamp(),
    );

    let fonts = state.fonts.clone();
    let png = tokio::task::spawn_blocking(move || render_duck(&duck_profile, &fonts)).await??;
    state
        .store
        .put(&key, png, PNG_CONTENT_TYPE, DUCK_CACHE_CONTROL)
        .await?;
    let image_url = public_url(&state.public_base_url, &key)?;
    info!("Published duck {}", key);

    Ok(Json(DuckResponse {
        image_url: image_url.into(),
        filename: key,
    }))
}
