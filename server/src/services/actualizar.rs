//! Actualizar - Istantanea consolidata per il polling dei client
//!
//! In una sola lettura raccoglie: ultimi messaggi delle chat pubbliche attive,
//! ultimi messaggi e partecipanti delle chat private dell'utente, inviti recenti che lo
//! coinvolgono e utenti vicini.

use super::geo::nearby_users;
use super::membership::{
    dedup_exact, invitation_participants, reload_user, resolve_private_chats,
};
use crate::core::{AppError, AppState};
use crate::dtos::{
    ActualizarDTO, ApiResponse, ChatMessagesDTO, InvitationDTO, MessageDTO, ParticipantDTO,
    PrivateChatMessagesDTO,
};
use crate::entities::{ChatType, User};
use axum::{
    Extension,
    extract::{Json, State},
};
use sqlx::SqliteConnection;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Messaggi per chat pubblica
pub const PUBLIC_MESSAGES_LIMIT: i64 = 10;
/// Messaggi per chat privata
pub const PRIVATE_MESSAGES_LIMIT: i64 = 20;
/// Inviti recenti esaminati
pub const RECENT_INVITATIONS_LIMIT: i64 = 20;

#[instrument(skip(state, conn, user), fields(user_id = %user.user_id))]
pub async fn build_snapshot(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
) -> Result<ActualizarDTO, AppError> {
    let user = reload_user(state, conn, user).await?;
    let mut processed = 0;

    // 1. Chat pubbliche attive
    let mut chat_general = Vec::new();
    for chat in state.chat.find_by_type(conn, ChatType::Publico.as_str(), Some(true)).await? {
        let mensajes: Vec<MessageDTO> = state
            .msg
            .find_last_by_chat(conn, chat.chat_id, PUBLIC_MESSAGES_LIMIT)
            .await?
            .into_iter()
            .map(MessageDTO::from)
            .collect();
        processed += mensajes.len();
        chat_general.push(ChatMessagesDTO {
            tokenChat: chat.token,
            mensajes,
        });
    }

    // 2. Chat private dell'utente con i partecipanti
    let mut chat_privado = Vec::new();
    for chat in resolve_private_chats(state, conn, &user).await? {
        let mensajes: Vec<MessageDTO> = state
            .msg
            .find_last_by_chat(conn, chat.chat_id, PRIVATE_MESSAGES_LIMIT)
            .await?
            .into_iter()
            .map(MessageDTO::from)
            .collect();
        processed += mensajes.len();
        let participantes = match chat.invitation_id {
            Some(invitation_id) => {
                dedup_exact(invitation_participants(state, conn, invitation_id).await?)
            }
            None => Vec::new(),
        };
        chat_privado.push(PrivateChatMessagesDTO {
            tokenChat: chat.token,
            mensajes,
            participantes,
        });
    }

    // 3. Inviti recenti che coinvolgono l'utente
    let mut invitaciones = Vec::new();
    for invitation in state.invitation.find_recent(conn, RECENT_INVITATIONS_LIMIT).await? {
        if !user.is_part_of(invitation.invitation_id) {
            continue;
        }
        let chats = state
            .chat
            .find_by_invitation(conn, invitation.invitation_id)
            .await?
            .into_iter()
            .map(|c| c.token)
            .collect();
        let invitadores = state
            .user
            .find_inviters(conn, invitation.invitation_id)
            .await?
            .iter()
            .map(ParticipantDTO::from)
            .collect();
        let invitados = state
            .user
            .find_invitees(conn, invitation.invitation_id)
            .await?
            .iter()
            .map(ParticipantDTO::from)
            .collect();
        invitaciones.push(InvitationDTO {
            token: invitation.token,
            estado: invitation.estado,
            chats,
            invitadores,
            invitados,
        });
    }

    // 4. Utenti vicini
    let usuarios = nearby_users(&user, &state.user.find_all(conn).await?);

    debug!(
        "Snapshot: {} public chats, {} private chats, {} invitations, {} nearby users",
        chat_general.len(),
        chat_privado.len(),
        invitaciones.len(),
        usuarios.len()
    );

    Ok(ActualizarDTO {
        chatGeneralActualizado: !chat_general.is_empty(),
        chatPrivadoActualizado: !chat_privado.is_empty(),
        chatsGeneralesProcesados: chat_general.len(),
        mensajesProcesados: processed,
        invitacionesNuevas: invitaciones.len(),
        invitaciones,
        usuariosCercanos: usuarios.len(),
        usuarios,
        chatGeneral: chat_general,
        chatPrivado: chat_privado,
    })
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn actualizar(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<ApiResponse<ActualizarDTO>>, AppError> {
    let mut tx = state.pool.begin().await?;
    let snapshot = build_snapshot(&state, &mut tx, &current_user).await?;
    tx.commit().await?;

    info!("Snapshot built, {} messages processed", snapshot.mensajesProcesados);
    Ok(Json(ApiResponse::ok("Chats actualizados", snapshot)))
}
