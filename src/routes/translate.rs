use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::responses::JsonResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TranslateNameRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateNameResponse {
    pub translated_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateSearchRequest {
    pub search_term: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateSearchResponse {
    pub translated_term: String,
}

fn rejected(err: JsonRejection) -> Response {
    warn!(%err, "rejected translation request body");
    JsonResponse::bad_request_with_code("Invalid JSON body", "invalid_body").into_response()
}

pub async fn translate_name(
    State(state): State<AppState>,
    payload: Result<Json<TranslateNameRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return rejected(err),
    };
    let translated_name = state.translator.translate_name(&payload.name).await;
    info!(chars = payload.name.chars().count(), "name translated");
    Json(TranslateNameResponse { translated_name }).into_response()
}

pub async fn translate_search(
    State(state): State<AppState>,
    payload: Result<Json<TranslateSearchRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return rejected(err),
    };
    let translated_term = state.translator.translate_search(&payload.search_term).await;
    Json(TranslateSearchResponse { translated_term }).into_response()
}
