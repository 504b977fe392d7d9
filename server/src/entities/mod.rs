//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod chat;
pub mod enums;
pub mod invitation;
pub mod message;
pub mod user;

// Re-exports per facilitare l'import
pub use chat::Chat;
pub use enums::{ChatType, INVITATION_INITIAL_STATE, InvitationAction};
pub use invitation::Invitation;
pub use message::{Message, MessageWithSender};
pub use user::User;
