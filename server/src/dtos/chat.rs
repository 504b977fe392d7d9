//! Chat DTOs - Data Transfer Objects per chat

use super::{ParticipantDTO, UserSummaryDTO};
use crate::entities::Chat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Chat attiva mostrata in home
#[derive(Serialize, Deserialize, Debug, Clone)]
#[allow(non_snake_case)]
pub struct ActiveChatDTO {
    pub tokenChat: String,
    pub tipo: String,
    pub fecha_entrada: String,
}

/// Risposta di `/api/home`
#[derive(Serialize, Deserialize, Debug)]
pub struct HomeDTO {
    pub usuario: UserSummaryDTO,
    pub chats_activos: Vec<ActiveChatDTO>,
}

/// Chat privata dell'utente con i suoi partecipanti
#[derive(Serialize, Deserialize, Debug, Clone)]
#[allow(non_snake_case)]
pub struct PrivateChatDTO {
    pub tokenChat: String,
    pub tipo: String,
    pub participantes: Vec<ParticipantDTO>,
}

/// Chat pubblica elencata da `/api/chat/general`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PublicChatDTO {
    pub token: String,
    pub tipo: String,
    pub fecha_creacion: Option<String>,
    pub activo: bool,
}

impl From<Chat> for PublicChatDTO {
    fn from(value: Chat) -> Self {
        Self {
            fecha_creacion: Some(super::utc_string(&value.created_at)),
            token: value.token,
            tipo: value.tipo,
            activo: value.activo,
        }
    }
}

/// DTO per creare una nuova chat (senza chat_id)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateChatDTO {
    pub tipo: String,
    pub activo: bool,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub invitation_id: Option<i64>,
}

/// Body di `/api/chat/invitar`
#[derive(Serialize, Deserialize, Debug, Validate)]
#[allow(non_snake_case)]
pub struct InviteRequestDTO {
    #[validate(required(message = "Missing tokenchat"), length(min = 1, message = "Missing tokenchat"))]
    pub tokenchat: Option<String>,
    #[validate(required(message = "Missing tokenUsuario"), length(min = 1, message = "Missing tokenUsuario"))]
    pub tokenUsuario: Option<String>,
}

/// Esito di un invito
#[derive(Serialize, Deserialize, Debug)]
pub struct InviteResultDTO {
    pub fecha_entrada: String,
}

/// Body di `/api/chat/privado/salir`
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct ChatTokenRequestDTO {
    #[validate(required(message = "Missing tokenchat"), length(min = 1, message = "Missing tokenchat"))]
    pub tokenchat: Option<String>,
}

/// Body di `/api/chat/privado/cambiar`. `activo` accetta anche stringhe e numeri
/// (`"true"`, `"0"`, `"on"`, `1`, ...), vedi [`parse_bool_flag`].
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct ChangeChatRequestDTO {
    #[validate(required(message = "Missing tokenchat"), length(min = 1, message = "Missing tokenchat"))]
    pub tokenchat: Option<String>,
    #[validate(required(message = "Missing activo"))]
    pub activo: Option<Value>,
}

/// Interpreta un flag booleano permissivo. `None` se il valore non è riconosciuto.
pub fn parse_bool_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
