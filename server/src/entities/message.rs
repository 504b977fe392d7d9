//! Message entity - Entità messaggio

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub message_id: i64,
    pub token: String,
    pub contenido: String,
    // non usato dai flussi principali
    pub leido: Option<bool>,
    pub fecha_envio: DateTime<Utc>,
    pub sender_id: i64,
    pub chat_id: i64,
}

/// Messaggio con i dati pubblici del mittente (join con users)
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct MessageWithSender {
    pub message_id: i64,
    pub token: String,
    pub contenido: String,
    pub fecha_envio: DateTime<Utc>,
    pub chat_id: i64,
    pub sender_token: String,
    pub sender_nombre: String,
}
