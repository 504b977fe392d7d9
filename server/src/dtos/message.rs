//! Message DTOs - Data Transfer Objects per messaggi

use super::{ParticipantDTO, utc_string};
use crate::entities::MessageWithSender;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Messaggio esposto al client, con il mittente
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub token: String,
    pub contenido: String,
    pub fecha_envio: String,
    pub usuario: ParticipantDTO,
}

impl From<MessageWithSender> for MessageDTO {
    fn from(value: MessageWithSender) -> Self {
        Self {
            fecha_envio: utc_string(&value.fecha_envio),
            token: value.token,
            contenido: value.contenido,
            usuario: ParticipantDTO {
                token: value.sender_token,
                nombre: value.sender_nombre,
            },
        }
    }
}

/// Conferma di invio di un messaggio
#[derive(Serialize, Deserialize, Debug)]
pub struct SentMessageDTO {
    pub tokenchat: String,
    pub contenido: String,
    pub fecha_envio: String,
}

/// DTO per creare un nuovo messaggio (senza message_id)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateMessageDTO {
    pub token: String,
    #[validate(length(min = 1, message = "Missing contenido"))]
    pub contenido: String,
    pub fecha_envio: DateTime<Utc>,
    pub sender_id: i64,
    pub chat_id: i64,
}

/// Body di POST `/api/mensaje`. `tokenchat` può arrivare anche dal body.
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct SendMessageRequestDTO {
    #[validate(required(message = "Missing contenido"), length(min = 1, message = "Missing contenido"))]
    pub contenido: Option<String>,
    #[serde(default)]
    pub tokenchat: Option<String>,
}
