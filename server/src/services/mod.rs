//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo espone le operazioni core (funzioni che lavorano su una connessione o transazione)
//! e gli handler HTTP che le richiamano.

pub mod actualizar;
pub mod chat;
pub mod geo;
pub mod invitation;
pub mod membership;
pub mod message;
pub mod user;

// Re-exports per facilitare l'import
pub use actualizar::actualizar;
pub use chat::list_public_chats;
pub use invitation::{
    change_private_chat, invite_to_chat, leave_private_chat, respond_to_invitation,
};
pub use membership::{home, list_private_chats};
pub use message::{get_chat_messages, post_chat_message};
pub use user::{get_profile, logout_user};

use axum::{http::StatusCode, response::IntoResponse};
use uuid::Uuid;

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}

/// Nuovo token opaco per chat, inviti e messaggi (32 caratteri esadecimali)
pub fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_shape() {
        let token = new_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, new_token());
    }
}
