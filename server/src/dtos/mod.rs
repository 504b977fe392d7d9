//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).
//! I nomi dei campi JSON seguono il protocollo dei client esistenti (`tokenChat`, `fecha_envio`, ...).

pub mod actualizar;
pub mod chat;
pub mod invitation;
pub mod message;
pub mod query;
pub mod user;

use chrono::{DateTime, Utc};
use serde::Serialize;

// Re-exports per facilitare l'import
pub use actualizar::{ActualizarDTO, ChatMessagesDTO, PrivateChatMessagesDTO};
pub use chat::{
    ActiveChatDTO, ChangeChatRequestDTO, ChatTokenRequestDTO, CreateChatDTO, HomeDTO,
    InviteRequestDTO, InviteResultDTO, PrivateChatDTO, PublicChatDTO,
};
pub use invitation::{CreateInvitationDTO, InvitationDTO, RespondInvitationRequestDTO};
pub use message::{CreateMessageDTO, MessageDTO, SendMessageRequestDTO, SentMessageDTO};
pub use query::{MessagesQuery, TokenQuery};
pub use user::{NearbyUserDTO, ParticipantDTO, UpdateUserDTO, UserDTO, UserSummaryDTO};

/// Formato dei timestamp esposti dalle API (sempre UTC)
pub const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Formatta un istante come `YYYY-MM-DDTHH:MM:SSZ`
pub fn utc_string(value: &DateTime<Utc>) -> String {
    value.format(UTC_FORMAT).to_string()
}

/// Busta comune di tutte le risposte di successo
#[derive(Serialize, Debug)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: &'static str,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Risposta senza payload (`"data": null`)
    pub fn empty(message: &'static str) -> Self {
        Self {
            success: true,
            message,
            data: None,
        }
    }
}
