//! Poster rendering handlers.

use axum::{
    Json,
    extract::{Multipart, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info_span, warn};
use uuid::Uuid;

use crate::error::PosterError;
use crate::param::PosterParam;

use super::super::state::AppState;

const SUB_IMAGE_FIELD_PREFIX: &str = "sub_image_";

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// POST /create - render a JSON poster request to JPEG.
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PosterParam>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(param)) => render(&state, param).await,
        Err(rejection) => error_body(StatusCode::BAD_REQUEST, rejection.body_text()),
    }
}

/// POST /create/form - render a multipart poster request.
///
/// Fields: `param` holds the JSON request; an optional `background` file
/// replaces the background bytes; optional `sub_image_<n>` files replace the
/// bytes of `sub_images[n]`.
pub async fn create_form(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let mut param_json: Option<Vec<u8>> = None;
    let mut background: Option<Vec<u8>> = None;
    let mut sub_images: Vec<(usize, Vec<u8>)> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_body(StatusCode::BAD_REQUEST, format!("Multipart error: {}", e));
            }
        };
        let name = field.name().unwrap_or("").to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                return error_body(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read field {:?}: {}", name, e),
                );
            }
        };

        if name == "param" {
            param_json = Some(bytes);
        } else if name == "background" {
            background = Some(bytes);
        } else if let Some(index) = name.strip_prefix(SUB_IMAGE_FIELD_PREFIX) {
            match index.parse::<usize>() {
                Ok(index) => sub_images.push((index, bytes)),
                Err(_) => {
                    return error_body(
                        StatusCode::BAD_REQUEST,
                        format!("Invalid sub-image field {:?}", name),
                    );
                }
            }
        } else {
            debug!(field = %name, "ignoring unknown form field");
        }
    }

    let Some(param_json) = param_json else {
        return error_body(StatusCode::BAD_REQUEST, "No param field found".to_string());
    };
    let mut param: PosterParam = match serde_json::from_slice(&param_json) {
        Ok(param) => param,
        Err(e) => {
            return error_body(StatusCode::BAD_REQUEST, format!("Invalid param JSON: {}", e));
        }
    };

    if let Some(bytes) = background {
        param.background.get_or_insert_with(Default::default).image = bytes;
    }
    for (index, bytes) in sub_images {
        match param.sub_images.get_mut(index) {
            Some(image) => image.image = bytes,
            None => {
                let message = format!(
                    "{}{} has no matching sub_images entry",
                    SUB_IMAGE_FIELD_PREFIX, index
                );
                return error_body(StatusCode::BAD_REQUEST, message);
            }
        }
    }

    render(&state, param).await
}

/// Render on the blocking pool so compositing never stalls the async workers.
async fn render(state: &AppState, param: PosterParam) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("render", %request_id);
    let engine = state.engine.clone();
    let handle = tokio::runtime::Handle::current();

    let result = tokio::task::spawn_blocking(move || {
        handle.block_on(async move { engine.render(param).await }.instrument(span))
    })
    .await;

    match result {
        Ok(Ok(jpeg)) => ([(header::CONTENT_TYPE, "image/jpeg")], jpeg).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => {
            error!(%request_id, error = %e, "render task failed");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, format!("Processing error: {}", e))
        }
    }
}

/// HTTP status for an engine error.
pub fn status_for(err: &PosterError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if err.is_upstream_error() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(err: &PosterError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        error!(error = %err, "render failed");
    } else {
        warn!(error = %err, "render rejected");
    }
    error_body(status, err.to_string())
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
