//! Integration tests per gli endpoints delle chat e dei messaggi

mod common;

#[cfg(test)]
mod chat_tests {
    use super::common::{TOKEN_HEADER, server_for};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    // ============================================================
    // GET /api/chat/general
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_list_public_chats(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server
            .get("/api/chat/general")
            .add_header(TOKEN_HEADER, "token-alice")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Chats públicos listados");
        let chats = body["data"].as_array().unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0]["token"], "general");
        assert_eq!(chats[0]["activo"], true);
        assert_eq!(chats[1]["token"], "archivo");
        assert_eq!(chats[1]["activo"], false);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats")))]
    async fn test_list_public_chats_database_error(pool: SqlitePool) -> sqlx::Result<()> {
        sqlx::query("DROP TABLE messages").execute(&pool).await?;
        sqlx::query("DROP TABLE chats").execute(&pool).await?;
        let server = server_for(pool);

        let response = server
            .get("/api/chat/general")
            .add_header(TOKEN_HEADER, "token-alice")
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Database connection error");
        Ok(())
    }

    // ============================================================
    // GET /api/chat/privado
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "invitations")))]
    async fn test_list_private_chats(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server
            .get("/api/chat/privado")
            .add_header(TOKEN_HEADER, "token-alice")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(
            body["data"],
            json!([{
                "tokenChat": "privado-ab",
                "tipo": "Privado",
                "participantes": [
                    { "token": "token-alice", "nombre": "Alice" },
                    { "token": "token-bob", "nombre": "Bob" }
                ]
            }])
        );
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "invitations")))]
    async fn test_list_private_chats_empty(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server
            .get("/api/chat/privado")
            .add_header(TOKEN_HEADER, "token-eve")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"], json!([]));
        Ok(())
    }

    // ============================================================
    // GET/POST /api/mensaje
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "invitations", "messages")))]
    async fn test_send_and_list_messages(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server
            .post("/api/mensaje")
            .add_query_param("tokenchat", "privado-ab")
            .add_header(TOKEN_HEADER, "token-alice")
            .json(&json!({ "contenido": "Nos vemos luego" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Mensaje enviado");
        assert_eq!(body["data"]["tokenchat"], "privado-ab");
        assert_eq!(body["data"]["contenido"], "Nos vemos luego");

        let response = server
            .get("/api/mensaje")
            .add_query_param("tokenchat", "privado-ab")
            .add_header(TOKEN_HEADER, "token-bob")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let messages = body["data"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["contenido"], "Hola Bob");
        assert_eq!(messages[0]["fecha_envio"], "2026-02-01T09:05:00Z");
        assert_eq!(messages[2]["usuario"]["token"], "token-alice");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "invitations", "messages")))]
    async fn test_send_message_with_chat_token_in_body(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server
            .post("/api/mensaje")
            .add_header(TOKEN_HEADER, "token-eve")
            .json(&json!({ "contenido": "Hola a todos", "tokenchat": "general" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "invitations", "messages")))]
    async fn test_message_errors(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        server
            .get("/api/mensaje")
            .add_header(TOKEN_HEADER, "token-eve")
            .await
            .assert_status_bad_request();

        server
            .get("/api/mensaje")
            .add_query_param("tokenchat", "missing")
            .add_header(TOKEN_HEADER, "token-eve")
            .await
            .assert_status_not_found();

        let response = server
            .get("/api/mensaje")
            .add_query_param("tokenchat", "privado-ab")
            .add_header(TOKEN_HEADER, "token-eve")
            .await;
        response.assert_status_forbidden();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Unauthorized access to chat");

        server
            .post("/api/mensaje")
            .add_query_param("tokenchat", "general")
            .add_header(TOKEN_HEADER, "token-eve")
            .json(&json!({ "contenido": "" }))
            .await
            .assert_status_bad_request();
        Ok(())
    }
}
