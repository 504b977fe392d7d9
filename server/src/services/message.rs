//! Message services - Invio ed elenco dei messaggi di una chat

use super::membership::{is_chat_member, reload_user};
use super::new_token;
use crate::core::{AppError, AppState};
use crate::dtos::{
    utc_string, ApiResponse, CreateMessageDTO, MessageDTO, MessagesQuery, SendMessageRequestDTO,
    SentMessageDTO,
};
use crate::entities::{Chat, User};
use crate::repositories::{Create, begin_write};
use axum::{
    Extension,
    extract::{Json, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use sqlx::SqliteConnection;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Carica la chat e verifica che l'utente possa accedervi
async fn authorized_chat(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
    chat_token: &str,
) -> Result<Chat, AppError> {
    let chat = state
        .chat
        .find_by_token(conn, chat_token)
        .await?
        .ok_or_else(|| AppError::not_found("Chat not found"))?;

    // gli slot vanno letti nello stesso snapshot della chat
    let user = reload_user(state, conn, user).await?;
    if !is_chat_member(&user, &chat) {
        warn!("User is not a member of chat {}", chat.chat_id);
        return Err(AppError::forbidden("Unauthorized access to chat"));
    }
    Ok(chat)
}

#[instrument(skip(state, conn, user, contenido), fields(user_id = %user.user_id))]
pub async fn send_message(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
    chat_token: &str,
    contenido: &str,
) -> Result<SentMessageDTO, AppError> {
    let chat = authorized_chat(state, conn, user, chat_token).await?;

    let data = CreateMessageDTO {
        token: new_token(),
        contenido: contenido.to_string(),
        fecha_envio: Utc::now(),
        sender_id: user.user_id,
        chat_id: chat.chat_id,
    };
    data.validate()?;

    let message = state.msg.create(conn, &data).await?;
    info!("Message {} sent to chat {}", message.message_id, chat.chat_id);

    Ok(SentMessageDTO {
        tokenchat: chat.token,
        contenido: message.contenido,
        fecha_envio: utc_string(&message.fecha_envio),
    })
}

#[instrument(skip(state, conn, user), fields(user_id = %user.user_id))]
pub async fn list_messages(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
    chat_token: &str,
) -> Result<Vec<MessageDTO>, AppError> {
    let chat = authorized_chat(state, conn, user, chat_token).await?;
    let messages = state.msg.find_all_by_chat(conn, chat.chat_id).await?;
    debug!("Loaded {} messages", messages.len());
    Ok(messages.into_iter().map(MessageDTO::from).collect())
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_chat_messages(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(params): Query<MessagesQuery>,
) -> Result<Json<ApiResponse<Vec<MessageDTO>>>, AppError> {
    let chat_token = params
        .tokenchat
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing tokenchat"))?;

    let mut tx = state.pool.begin().await?;
    let messages = list_messages(&state, &mut tx, &current_user, &chat_token).await?;
    tx.commit().await?;

    Ok(Json(ApiResponse::ok("Mensajes listados", messages)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn post_chat_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(params): Query<MessagesQuery>,
    Json(body): Json<SendMessageRequestDTO>,
) -> Result<(StatusCode, Json<ApiResponse<SentMessageDTO>>), AppError> {
    // il token della chat può arrivare in query oppure nel body
    let chat_token = params
        .tokenchat
        .or(body.tokenchat.clone())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing tokenchat"))?;
    body.validate()?;
    let contenido = body.contenido.unwrap_or_default();

    let mut tx = begin_write(&state.pool).await?;
    let sent = send_message(&state, &mut tx, &current_user, &chat_token, &contenido).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Mensaje enviado", sent))))
}
