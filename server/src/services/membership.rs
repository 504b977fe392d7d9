//! Membership services - Chat a cui partecipa un utente
//!
//! Un utente partecipa alle chat collegate agli inviti dei suoi due slot
//! (prima quello da invitante, poi quello da invitato). Le chat pubbliche sono aperte a tutti.

use crate::core::{AppError, AppState};
use crate::dtos::{
    utc_string, ActiveChatDTO, ApiResponse, HomeDTO, ParticipantDTO, PrivateChatDTO,
    UserSummaryDTO,
};
use crate::entities::{Chat, User};
use crate::repositories::Read;
use axum::{
    Extension,
    extract::{Json, State},
};
use chrono::Utc;
use sqlx::SqliteConnection;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Rilegge l'utente dentro la transazione corrente.
///
/// L'utente del middleware è caricato su un'altra connessione: i suoi slot possono
/// non corrispondere allo snapshot dell'operazione.
pub async fn reload_user(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
) -> Result<User, AppError> {
    state
        .user
        .read(conn, &user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Chat attive collegate agli slot dell'utente, senza duplicati (per id) e
/// nell'ordine in cui vengono incontrate.
async fn linked_active_chats(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
) -> Result<Vec<Chat>, AppError> {
    let mut chats: Vec<Chat> = Vec::new();
    for invitation_id in [user.inviter_invitation_id, user.invitee_invitation_id]
        .into_iter()
        .flatten()
    {
        for chat in state.chat.find_by_invitation(conn, invitation_id).await? {
            if chat.activo && !chats.iter().any(|c| c.chat_id == chat.chat_id) {
                chats.push(chat);
            }
        }
    }
    Ok(chats)
}

/// Chat dell'utente. Se l'utente non è collegato a nessuna chat attiva
/// vengono restituite tutte le chat attive.
#[instrument(skip(state, conn, user), fields(user_id = %user.user_id))]
pub async fn resolve_user_chats(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
) -> Result<Vec<Chat>, AppError> {
    let chats = linked_active_chats(state, conn, user).await?;
    if !chats.is_empty() {
        return Ok(chats);
    }

    debug!("User has no linked chats, falling back to every active chat");
    Ok(state.chat.find_active(conn).await?)
}

/// Chat private attive dell'utente, senza duplicati per token. Nessun fallback.
#[instrument(skip(state, conn, user), fields(user_id = %user.user_id))]
pub async fn resolve_private_chats(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
) -> Result<Vec<Chat>, AppError> {
    let mut private: Vec<Chat> = Vec::new();
    for chat in linked_active_chats(state, conn, user).await? {
        if chat.is_private() && !private.iter().any(|c| c.token == chat.token) {
            private.push(chat);
        }
    }
    Ok(private)
}

/// true se l'utente può leggere e scrivere nella chat
pub fn is_chat_member(user: &User, chat: &Chat) -> bool {
    if chat.is_public() {
        return true;
    }
    chat.is_private()
        && chat
            .invitation_id
            .is_some_and(|invitation_id| user.is_part_of(invitation_id))
}

/// Invitanti seguiti dagli invitati di un invito
pub async fn invitation_participants(
    state: &AppState,
    conn: &mut SqliteConnection,
    invitation_id: i64,
) -> Result<Vec<ParticipantDTO>, AppError> {
    let mut participants: Vec<ParticipantDTO> = state
        .user
        .find_inviters(conn, invitation_id)
        .await?
        .iter()
        .map(ParticipantDTO::from)
        .collect();
    participants.extend(
        state
            .user
            .find_invitees(conn, invitation_id)
            .await?
            .iter()
            .map(ParticipantDTO::from),
    );
    Ok(participants)
}

/// Rimuove le coppie (token, nombre) identiche, tenendo la prima occorrenza
pub fn dedup_exact(participants: Vec<ParticipantDTO>) -> Vec<ParticipantDTO> {
    let mut unique: Vec<ParticipantDTO> = Vec::with_capacity(participants.len());
    for participant in participants {
        if !unique.contains(&participant) {
            unique.push(participant);
        }
    }
    unique
}

/// Un partecipante per token, scartando i token vuoti (utenti disconnessi)
pub fn dedup_by_token(participants: Vec<ParticipantDTO>) -> Vec<ParticipantDTO> {
    let mut unique: Vec<ParticipantDTO> = Vec::with_capacity(participants.len());
    for participant in participants {
        if participant.token.is_empty() || unique.iter().any(|p| p.token == participant.token) {
            continue;
        }
        unique.push(participant);
    }
    unique
}

async fn build_home(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
) -> Result<HomeDTO, AppError> {
    let user = reload_user(state, conn, user).await?;
    let now = utc_string(&Utc::now());
    let chats_activos = resolve_user_chats(state, conn, &user)
        .await?
        .into_iter()
        .map(|chat| ActiveChatDTO {
            tokenChat: chat.token,
            tipo: chat.tipo,
            fecha_entrada: now.clone(),
        })
        .collect();

    Ok(HomeDTO {
        usuario: UserSummaryDTO::from(&user),
        chats_activos,
    })
}

async fn build_private_chat_list(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
) -> Result<Vec<PrivateChatDTO>, AppError> {
    let user = reload_user(state, conn, user).await?;
    let mut result = Vec::new();
    for chat in resolve_private_chats(state, conn, &user).await? {
        let participantes = match chat.invitation_id {
            Some(invitation_id) => {
                dedup_by_token(invitation_participants(state, conn, invitation_id).await?)
            }
            None => Vec::new(),
        };
        result.push(PrivateChatDTO {
            tokenChat: chat.token,
            tipo: chat.tipo,
            participantes,
        });
    }
    Ok(result)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn home(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<ApiResponse<HomeDTO>>, AppError> {
    debug!("Loading home");
    let mut tx = state.pool.begin().await?;
    let home = build_home(&state, &mut tx, &current_user).await?;
    tx.commit().await?;

    info!("Home loaded with {} chats", home.chats_activos.len());
    Ok(Json(ApiResponse::ok("Home cargado", home)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_private_chats(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<PrivateChatDTO>>>, AppError> {
    debug!("Listing private chats");
    let mut tx = state.pool.begin().await?;
    let chats = build_private_chat_list(&state, &mut tx, &current_user).await?;
    tx.commit().await?;

    info!("Found {} private chats", chats.len());
    Ok(Json(ApiResponse::ok("Chats privados listados", chats)))
}
