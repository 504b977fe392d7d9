//! User DTOs - Data Transfer Objects per utenti

use crate::entities::User;
use serde::{Deserialize, Serialize};

/// Profilo completo dell'utente autenticato
#[derive(Serialize, Deserialize, Debug)]
pub struct UserDTO {
    pub id: i64,
    pub email: String,
    pub nombre: String,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub activo: bool,
    pub baneado: Option<bool>,
    pub token: String,
    pub roles: Vec<String>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            roles: value.roles(),
            id: value.user_id,
            email: value.email,
            nombre: value.nombre,
            latitud: value.latitud,
            longitud: value.longitud,
            activo: value.activo,
            baneado: value.baneado,
            token: value.token,
        }
    }
}

/// Riassunto dell'utente mostrato in home
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserSummaryDTO {
    pub nombre: String,
    pub email: String,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

impl From<&User> for UserSummaryDTO {
    fn from(value: &User) -> Self {
        Self {
            nombre: value.nombre.clone(),
            email: value.email.clone(),
            latitud: value.latitud,
            longitud: value.longitud,
        }
    }
}

/// Dati pubblici di un utente: usato per partecipanti, invitanti/invitati e mittenti
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ParticipantDTO {
    pub token: String,
    pub nombre: String,
}

impl From<&User> for ParticipantDTO {
    fn from(value: &User) -> Self {
        Self {
            token: value.token.clone(),
            nombre: value.nombre.clone(),
        }
    }
}

/// Utente entro il raggio di prossimità
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NearbyUserDTO {
    pub token: String,
    pub nombre: String,
    pub distancia_km: f64,
}

/// DTO per aggiornare un utente (solo i campi `Some` vengono modificati)
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateUserDTO {
    pub token: Option<String>,
    pub activo: Option<bool>,
}

impl UpdateUserDTO {
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.activo.is_none()
    }
}
