//! Invitation services - Macchina a stati degli inviti alle chat private
//!
//! Ogni operazione lavora su una sola transazione: l'handler la apre, la funzione core
//! esegue letture e scritture, l'handler fa commit. In caso di errore la transazione
//! viene scartata e nessuna modifica è visibile.
//!
//! Invariante mantenuto: non esiste una chat privata collegata a un invito senza
//! invitanti e senza invitati. Quando un invito resta vuoto viene eliminato insieme alle sue chat.

use super::new_token;
use crate::core::{AppError, AppState};
use crate::dtos::{
    utc_string, ApiResponse, ChangeChatRequestDTO, ChatTokenRequestDTO, CreateChatDTO,
    CreateInvitationDTO, InviteRequestDTO, InviteResultDTO, RespondInvitationRequestDTO,
    chat::parse_bool_flag,
};
use crate::entities::{Chat, ChatType, INVITATION_INITIAL_STATE, Invitation, InvitationAction, User};
use crate::repositories::{Create, Delete, Read, begin_write};
use axum::{
    Extension,
    extract::{Json, State},
};
use chrono::Utc;
use sqlx::SqliteConnection;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Ruolo con cui un utente viene collegato a un invito
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Inviter,
    Invitee,
}

async fn create_invitation(
    state: &AppState,
    conn: &mut SqliteConnection,
) -> Result<Invitation, AppError> {
    let invitation = state
        .invitation
        .create(
            conn,
            &CreateInvitationDTO {
                token: new_token(),
                estado: INVITATION_INITIAL_STATE.to_string(),
            },
        )
        .await?;
    Ok(invitation)
}

/// Crea una chat privata attiva con il token indicato e un nuovo invito
async fn create_private_chat(
    state: &AppState,
    conn: &mut SqliteConnection,
    chat_token: &str,
) -> Result<Chat, AppError> {
    let invitation = create_invitation(state, conn).await?;
    let chat = state
        .chat
        .create(
            conn,
            &CreateChatDTO {
                tipo: ChatType::Privado.as_str().to_string(),
                activo: true,
                token: chat_token.to_string(),
                created_at: Utc::now(),
                invitation_id: Some(invitation.invitation_id),
            },
        )
        .await?;
    info!("Created private chat {} with invitation {}", chat.chat_id, invitation.invitation_id);
    Ok(chat)
}

/// Restituisce l'invito della chat, creandone uno se manca
async fn ensure_invitation(
    state: &AppState,
    conn: &mut SqliteConnection,
    chat: &mut Chat,
) -> Result<i64, AppError> {
    if let Some(invitation_id) = chat.invitation_id {
        return Ok(invitation_id);
    }

    let invitation = create_invitation(state, conn).await?;
    state
        .chat
        .set_invitation(conn, chat.chat_id, Some(invitation.invitation_id))
        .await?;
    chat.invitation_id = Some(invitation.invitation_id);
    debug!("Attached new invitation {} to chat {}", invitation.invitation_id, chat.chat_id);
    Ok(invitation.invitation_id)
}

/// Elimina l'invito e le sue chat private se non ha più partecipanti.
/// Restituisce true se l'invito è stato eliminato.
async fn collect_if_empty(
    state: &AppState,
    conn: &mut SqliteConnection,
    invitation_id: i64,
) -> Result<bool, AppError> {
    let (inviters, invitees) = state.user.count_participants(conn, invitation_id).await?;
    if inviters > 0 || invitees > 0 {
        return Ok(false);
    }

    for chat in state.chat.find_by_invitation(conn, invitation_id).await? {
        if chat.is_private() {
            state.chat.delete(conn, &chat.chat_id).await?;
        }
    }
    state.invitation.delete(conn, &invitation_id).await?;
    info!("Invitation {} has no participants left, removed", invitation_id);
    Ok(true)
}

/// Occupa lo slot dell'utente per il ruolo indicato. L'invito a cui lo slot
/// puntava in precedenza viene raccolto se resta vuoto.
async fn attach(
    state: &AppState,
    conn: &mut SqliteConnection,
    user_id: i64,
    invitation_id: i64,
    role: Role,
) -> Result<(), AppError> {
    let user = state
        .user
        .read(conn, &user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let previous = match role {
        Role::Inviter => user.inviter_invitation_id,
        Role::Invitee => user.invitee_invitation_id,
    };
    if previous == Some(invitation_id) {
        return Ok(());
    }

    match role {
        Role::Inviter => state.user.attach_as_inviter(conn, user_id, invitation_id).await?,
        Role::Invitee => state.user.attach_as_invitee(conn, user_id, invitation_id).await?,
    }

    if let Some(previous) = previous {
        debug!("User {} moved from invitation {} as {:?}", user_id, previous, role);
        collect_if_empty(state, conn, previous).await?;
    }
    Ok(())
}

/// Elimina ogni chat privata senza invito o con un invito senza partecipanti
#[instrument(skip(state, conn))]
pub async fn sweep_orphan_private_chats(
    state: &AppState,
    conn: &mut SqliteConnection,
) -> Result<usize, AppError> {
    let mut removed = 0;
    for chat in state.chat.find_by_type(conn, ChatType::Privado.as_str(), None).await? {
        match chat.invitation_id {
            None => {
                state.chat.delete(conn, &chat.chat_id).await?;
                removed += 1;
            }
            Some(invitation_id) => {
                let (inviters, invitees) =
                    state.user.count_participants(conn, invitation_id).await?;
                if inviters == 0 && invitees == 0 {
                    state.chat.delete(conn, &chat.chat_id).await?;
                    state.invitation.delete(conn, &invitation_id).await?;
                    removed += 1;
                }
            }
        }
    }

    if removed > 0 {
        info!("Removed {} orphan private chats", removed);
    }
    Ok(removed)
}

/// Invita `target_token` nella chat privata `chat_token`, creandola se non esiste.
#[instrument(skip(state, conn, inviter), fields(user_id = %inviter.user_id))]
pub async fn invite(
    state: &AppState,
    conn: &mut SqliteConnection,
    inviter: &User,
    chat_token: &str,
    target_token: &str,
) -> Result<InviteResultDTO, AppError> {
    // 1. L'utente invitato deve esistere ed essere online
    let target = state
        .user
        .find_by_token(conn, target_token)
        .await?
        .ok_or_else(|| {
            warn!("Invite target not found");
            AppError::not_found("Usuario no encontrado")
        })?;
    if !target.activo {
        warn!("Invite target {} is offline", target.user_id);
        return Err(AppError::bad_request("Usuario no disponible"));
    }

    // 2. Recuperare (o creare) la chat privata e il suo invito
    let invitation_id = match state.chat.find_by_token(conn, chat_token).await? {
        Some(mut chat) => {
            if !chat.is_private() {
                warn!("Invite attempted on non-private chat {}", chat.chat_id);
                return Err(AppError::bad_request("Solo se pueden invitar a chats privados"));
            }
            ensure_invitation(state, conn, &mut chat).await?
        }
        None => {
            let chat = create_private_chat(state, conn, chat_token).await?;
            chat.invitation_id
                .ok_or_else(|| AppError::internal_server_error("Internal server error"))?
        }
    };

    // 3. Collegare invitante e invitato (idempotente)
    attach(state, conn, inviter.user_id, invitation_id, Role::Inviter).await?;
    attach(state, conn, target.user_id, invitation_id, Role::Invitee).await?;

    // 4. Pulizia globale delle chat private orfane
    sweep_orphan_private_chats(state, conn).await?;

    info!("User {} invited to invitation {}", target.user_id, invitation_id);
    Ok(InviteResultDTO {
        fecha_entrada: utc_string(&Utc::now()),
    })
}

/// Stacca l'utente dalla chat privata; la chat sparisce quando resta senza partecipanti.
async fn leave_chat(
    state: &AppState,
    conn: &mut SqliteConnection,
    user_id: i64,
    chat: &Chat,
) -> Result<(), AppError> {
    match chat.invitation_id {
        None => {
            debug!("Chat {} has no invitation, removing it", chat.chat_id);
            state.chat.delete(conn, &chat.chat_id).await?;
        }
        Some(invitation_id) => {
            state.user.detach_from_invitation(conn, user_id, invitation_id).await?;
            collect_if_empty(state, conn, invitation_id).await?;
        }
    }
    Ok(())
}

/// L'utente esce dalla chat privata `chat_token`
#[instrument(skip(state, conn, user), fields(user_id = %user.user_id))]
pub async fn leave(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
    chat_token: &str,
) -> Result<(), AppError> {
    let chat = state
        .chat
        .find_by_token(conn, chat_token)
        .await?
        .ok_or_else(|| AppError::not_found("Chat not found"))?;
    if !chat.is_private() {
        return Err(AppError::bad_request("Solo se puede salir de chats privados"));
    }

    leave_chat(state, conn, user.user_id, &chat).await?;
    info!("User left chat {}", chat.chat_id);
    Ok(())
}

/// Esce da tutte le chat private attive dell'utente tranne `except`
async fn leave_other_private_chats(
    state: &AppState,
    conn: &mut SqliteConnection,
    user_id: i64,
    except: &Chat,
) -> Result<(), AppError> {
    let user = state
        .user
        .read(conn, &user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut to_leave: Vec<i64> = Vec::new();
    for invitation_id in [user.inviter_invitation_id, user.invitee_invitation_id]
        .into_iter()
        .flatten()
    {
        for chat in state.chat.find_by_invitation(conn, invitation_id).await? {
            if chat.activo
                && chat.is_private()
                && chat.token != except.token
                && !to_leave.contains(&chat.chat_id)
            {
                to_leave.push(chat.chat_id);
            }
        }
    }

    for chat_id in to_leave {
        // può essere già stata eliminata uscendo da una chat precedente
        let Some(chat) = state.chat.read(conn, &chat_id).await? else {
            continue;
        };
        debug!("Leaving private chat {}", chat.chat_id);
        leave_chat(state, conn, user_id, &chat).await?;
    }
    Ok(())
}

/// Attiva o disattiva la partecipazione dell'utente alla chat privata `chat_token`.
///
/// Attivare una chat fa uscire l'utente da ogni altra chat privata attiva:
/// un utente partecipa attivamente a una sola chat privata alla volta.
#[instrument(skip(state, conn, user), fields(user_id = %user.user_id))]
pub async fn set_active(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
    chat_token: &str,
    desired_active: bool,
) -> Result<(), AppError> {
    let mut chat = match state.chat.find_by_token(conn, chat_token).await? {
        Some(chat) => {
            if !chat.is_private() {
                return Err(AppError::bad_request("Solo se pueden cambiar chats privados"));
            }
            chat
        }
        None if desired_active => create_private_chat(state, conn, chat_token).await?,
        None => return Err(AppError::not_found("Chat not found")),
    };

    if !desired_active {
        leave_chat(state, conn, user.user_id, &chat).await?;
        info!("Private chat {} deactivated for user", chat.chat_id);
        return Ok(());
    }

    leave_other_private_chats(state, conn, user.user_id, &chat).await?;
    let invitation_id = ensure_invitation(state, conn, &mut chat).await?;
    attach(state, conn, user.user_id, invitation_id, Role::Invitee).await?;
    state.chat.set_activo(conn, chat.chat_id, true).await?;

    info!("Private chat {} activated for user", chat.chat_id);
    Ok(())
}

/// Risposta dell'invitato: `aceptar` o `rechazar` (case-insensitive).
/// In entrambi i casi l'invito viene eliminato.
#[instrument(skip(state, conn, user), fields(user_id = %user.user_id))]
pub async fn respond(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &User,
    invitation_token: &str,
    action: &str,
) -> Result<InvitationAction, AppError> {
    let action: InvitationAction = action.parse().map_err(|_| {
        warn!("Invalid invitation action: {}", action);
        AppError::bad_request(r#"Invalid accion, must be "aceptar" or "rechazar""#)
    })?;

    let invitation = state
        .invitation
        .find_by_token(conn, invitation_token)
        .await?
        .ok_or_else(|| AppError::not_found("Invitation not found"))?;
    let invitation_id = invitation.invitation_id;

    // Solo un invitato può rispondere
    let responder = state
        .user
        .read(conn, &user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if responder.invitee_invitation_id != Some(invitation_id) {
        warn!("User is not an invitee of invitation {}", invitation_id);
        return Err(AppError::forbidden("No autorizado para gestionar esta invitación"));
    }

    let chats = state.chat.find_by_invitation(conn, invitation_id).await?;
    match action {
        InvitationAction::Aceptar => {
            for chat in chats {
                state.chat.set_activo(conn, chat.chat_id, true).await?;
                state.chat.set_invitation(conn, chat.chat_id, None).await?;
            }
        }
        InvitationAction::Rechazar => {
            let (inviters, invitees) = state.user.count_participants(conn, invitation_id).await?;
            for chat in chats {
                if chat.is_private() && inviters == 0 && invitees <= 1 {
                    debug!("Removing chat {} left without members", chat.chat_id);
                    state.chat.delete(conn, &chat.chat_id).await?;
                } else {
                    state.chat.set_invitation(conn, chat.chat_id, None).await?;
                }
            }
        }
    }

    state.user.detach_all_from_invitation(conn, invitation_id).await?;
    state.invitation.delete(conn, &invitation_id).await?;

    info!("Invitation {} answered with {:?}", invitation_id, action);
    Ok(action)
}

// ************************* HANDLERS HTTP ************************* //

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn invite_to_chat(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<InviteRequestDTO>,
) -> Result<Json<ApiResponse<InviteResultDTO>>, AppError> {
    body.validate()?;
    let chat_token = body.tokenchat.unwrap_or_default();
    let target_token = body.tokenUsuario.unwrap_or_default();

    let mut tx = begin_write(&state.pool).await?;
    let result = invite(&state, &mut tx, &current_user, &chat_token, &target_token).await?;
    tx.commit().await?;

    Ok(Json(ApiResponse::ok("Usuario invitado al chat", result)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn leave_private_chat(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<ChatTokenRequestDTO>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    body.validate()?;
    let chat_token = body.tokenchat.unwrap_or_default();

    let mut tx = begin_write(&state.pool).await?;
    leave(&state, &mut tx, &current_user, &chat_token).await?;
    tx.commit().await?;

    Ok(Json(ApiResponse::empty("Saliste del chat")))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn change_private_chat(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<ChangeChatRequestDTO>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    body.validate()?;
    let chat_token = body.tokenchat.unwrap_or_default();
    let desired_active = body
        .activo
        .as_ref()
        .and_then(parse_bool_flag)
        .ok_or_else(|| AppError::bad_request("Invalid activo value, must be boolean"))?;

    let mut tx = begin_write(&state.pool).await?;
    set_active(&state, &mut tx, &current_user, &chat_token, desired_active).await?;
    tx.commit().await?;

    let message = if desired_active {
        "Chat activado"
    } else {
        "Chat desactivado"
    };
    Ok(Json(ApiResponse::empty(message)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn respond_to_invitation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<RespondInvitationRequestDTO>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    body.validate()?;
    let invitation_token = body.tokeninvitacion.unwrap_or_default();
    let action = body.accion.unwrap_or_default();

    let mut tx = begin_write(&state.pool).await?;
    let action = respond(&state, &mut tx, &current_user, &invitation_token, &action).await?;
    tx.commit().await?;

    let message = match action {
        InvitationAction::Aceptar => "Invitación aceptada",
        InvitationAction::Rechazar => "Invitación rechazada",
    };
    Ok(Json(ApiResponse::empty(message)))
}
