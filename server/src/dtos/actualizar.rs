//! Actualizar DTOs - istantanea restituita da `/api/actualizar`

use super::{InvitationDTO, MessageDTO, NearbyUserDTO, ParticipantDTO};
use serde::{Deserialize, Serialize};

/// Ultimi messaggi di una chat pubblica
#[derive(Serialize, Deserialize, Debug, Clone)]
#[allow(non_snake_case)]
pub struct ChatMessagesDTO {
    pub tokenChat: String,
    pub mensajes: Vec<MessageDTO>,
}

/// Ultimi messaggi di una chat privata con i partecipanti
#[derive(Serialize, Deserialize, Debug, Clone)]
#[allow(non_snake_case)]
pub struct PrivateChatMessagesDTO {
    pub tokenChat: String,
    pub mensajes: Vec<MessageDTO>,
    pub participantes: Vec<ParticipantDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[allow(non_snake_case)]
pub struct ActualizarDTO {
    pub chatGeneralActualizado: bool,
    pub chatPrivadoActualizado: bool,
    pub chatsGeneralesProcesados: usize,
    pub mensajesProcesados: usize,
    pub invitacionesNuevas: usize,
    pub invitaciones: Vec<InvitationDTO>,
    pub usuariosCercanos: usize,
    pub usuarios: Vec<NearbyUserDTO>,
    pub chatGeneral: Vec<ChatMessagesDTO>,
    pub chatPrivado: Vec<PrivateChatMessagesDTO>,
}
