#![allow(dead_code)]

use axum_test::TestServer;
use axum_test::http::HeaderName;
use chat_server::core::AppState;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Header con cui i client passano il token utente
pub const TOKEN_HEADER: HeaderName = HeaderName::from_static("x-token-usuario");

/// Crea un AppState per i test
///
/// # Arguments
/// * `pool` - Connection pool SQLite creato da `#[sqlx::test]`
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::new(pool))
}

/// Crea un TestServer per i test
///
/// # Arguments
/// * `state` - AppState da utilizzare per il server
///
/// # Returns
/// TestServer configurato e pronto per eseguire richieste
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = chat_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Shortcut: stato + server a partire dal pool
pub fn server_for(pool: SqlitePool) -> TestServer {
    create_test_server(create_test_state(pool))
}
