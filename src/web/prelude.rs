pub(crate) use crate::error::DuckgenError;
pub(crate) use crate::web::{AppState, parse_request};
pub(crate) use axum::Json;
pub(crate) use axum::body::Bytes;
pub(crate) use axum::extract::State;
pub(crate) use axum::http::HeaderValue;
pub(crate) use chrono::Utc;
pub(crate) use serde::{Deserialize, Serialize};
pub(crate) use tracing::info;
