//! User entity - Entità utente

use serde::{Deserialize, Serialize};

/// Ruolo garantito a ogni utente, anche se non salvato esplicitamente
pub const DEFAULT_ROLE: &str = "ROLE_USER";

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub nombre: String,
    // lista json di ruoli, es. ["ROLE_ADMIN"]
    pub roles: String,
    // credenziale di sessione, stringa vuota dopo il logout
    pub token: String,
    pub activo: bool,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub baneado: Option<bool>,
    // slot singolo: invito in cui l'utente compare come invitante
    pub inviter_invitation_id: Option<i64>,
    // slot singolo: invito in cui l'utente compare come invitato
    pub invitee_invitation_id: Option<i64>,
}

impl User {
    /// Ruoli dell'utente, sempre comprensivi di `ROLE_USER`, senza duplicati
    pub fn roles(&self) -> Vec<String> {
        let mut roles: Vec<String> = serde_json::from_str(&self.roles).unwrap_or_default();
        roles.push(DEFAULT_ROLE.to_string());
        let mut unique = Vec::with_capacity(roles.len());
        for role in roles {
            if !unique.contains(&role) {
                unique.push(role);
            }
        }
        unique
    }

    /// Coordinate dell'utente, solo se entrambe presenti
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitud, self.longitud) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// true se l'utente occupa uno dei due slot per l'invito indicato
    pub fn is_part_of(&self, invitation_id: i64) -> bool {
        self.inviter_invitation_id == Some(invitation_id)
            || self.invitee_invitation_id == Some(invitation_id)
    }
}
