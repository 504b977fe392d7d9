//! Chat services - Elenco delle chat pubbliche

use crate::core::{AppError, AppState};
use crate::dtos::{ApiResponse, PublicChatDTO};
use crate::entities::ChatType;
use axum::extract::{Json, State};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Tutte le chat pubbliche, attive e non.
///
/// Un errore del database su questa lettura viene riportato come servizio non disponibile.
#[instrument(skip(state))]
pub async fn list_public_chats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<PublicChatDTO>>>, AppError> {
    debug!("Listing public chats");
    let unavailable = |e: sqlx::Error| {
        error!("Failed to load public chats: {:?}", e);
        AppError::service_unavailable("Database connection error")
    };

    let mut conn = state.pool.acquire().await.map_err(unavailable)?;
    let chats = state
        .chat
        .find_by_type(&mut conn, ChatType::Publico.as_str(), None)
        .await
        .map_err(unavailable)?;

    info!("Found {} public chats", chats.len());
    let data = chats.into_iter().map(PublicChatDTO::from).collect();
    Ok(Json(ApiResponse::ok("Chats públicos listados", data)))
}
