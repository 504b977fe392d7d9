//! Chat entity - Entità chat

use super::enums::ChatType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Chat {
    pub chat_id: i64,
    // salvato così come arriva ("Privado" / "Publico"), confrontato case-insensitive
    pub tipo: String,
    pub activo: bool,
    // identificativo esterno, distinto da chat_id
    pub token: String,
    pub created_at: DateTime<Utc>,
    // le chat pubbliche non hanno mai un invito
    pub invitation_id: Option<i64>,
}

impl Chat {
    pub fn is_private(&self) -> bool {
        ChatType::Privado.matches(&self.tipo)
    }

    pub fn is_public(&self) -> bool {
        ChatType::Publico.matches(&self.tipo)
    }
}
