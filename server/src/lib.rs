//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, Config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api", configure_api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Configura le routes `/api`, tutte protette dal token utente
fn configure_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/perfil", get(get_profile))
        .route("/logout", post(logout_user))
        .route("/home", get(home))
        .route("/chat/privado", get(list_private_chats))
        .route("/chat/general", get(list_public_chats))
        .route("/chat/invitar", post(invite_to_chat))
        .route("/chat/privado/salir", post(leave_private_chat))
        .route("/chat/privado/cambiar", post(change_private_chat))
        .route("/invitacion/responder", post(respond_to_invitation))
        .route("/mensaje", get(get_chat_messages).post(post_chat_message))
        .route("/actualizar", get(actualizar))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
