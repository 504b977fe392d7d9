//! Invitation DTOs - Data Transfer Objects per inviti

use super::ParticipantDTO;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Invito che coinvolge l'utente, come riportato da `/api/actualizar`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InvitationDTO {
    pub token: String,
    pub estado: String,
    pub chats: Vec<String>,
    pub invitadores: Vec<ParticipantDTO>,
    pub invitados: Vec<ParticipantDTO>,
}

/// DTO per creare un nuovo invito (senza invitation_id e created_at)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateInvitationDTO {
    pub token: String,
    pub estado: String,
}

/// Body di `/api/invitacion/responder`
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct RespondInvitationRequestDTO {
    #[validate(
        required(message = "Missing tokeninvitacion"),
        length(min = 1, message = "Missing tokeninvitacion")
    )]
    pub tokeninvitacion: Option<String>,
    #[validate(required(message = "Missing accion"), length(min = 1, message = "Missing accion"))]
    pub accion: Option<String>,
}
