//! Invitation entity - Entità invito
//!
//! Gli insiemi di invitanti e invitati non sono salvati sull'invito: sono gli utenti
//! il cui slot (`inviter_invitation_id` / `invitee_invitation_id`) punta a questo invito.
//! Allo stesso modo le chat collegate sono quelle con `invitation_id` uguale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Invitation {
    pub invitation_id: i64,
    pub token: String,
    pub estado: String,
    pub created_at: DateTime<Utc>,
}
