//! Integration tests per autenticazione, profilo, logout e home

mod common;

#[cfg(test)]
mod user_tests {
    use super::common::{TOKEN_HEADER, server_for};
    use axum_test::http::HeaderName;
    use sqlx::SqlitePool;

    // ============================================================
    // Estrazione del token
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_root_is_public(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server.get("/").await;

        response.assert_status_ok();
        response.assert_text("Server is running!");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_missing_token(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server.get("/api/perfil").await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Missing tokenusuario");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_unknown_token(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server
            .get("/api/perfil")
            .add_header(TOKEN_HEADER, "not-a-token")
            .await;

        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "User not found");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_token_sources(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        server
            .get("/api/perfil")
            .add_query_param("tokenusuario", "token-alice")
            .await
            .assert_status_ok();

        server
            .get("/api/perfil")
            .add_header(HeaderName::from_static("authorization"), "Bearer token-alice")
            .await
            .assert_status_ok();

        server
            .get("/api/perfil")
            .add_header(TOKEN_HEADER, "token-alice")
            .await
            .assert_status_ok();

        Ok(())
    }

    // ============================================================
    // GET /api/perfil
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_profile(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server
            .get("/api/perfil")
            .add_header(TOKEN_HEADER, "token-charlie")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        let user = &body["data"];
        assert_eq!(user["email"], "charlie@example.com");
        assert_eq!(user["token"], "token-charlie");
        assert!(user["latitud"].is_null());
        assert_eq!(user["roles"], serde_json::json!(["ROLE_ADMIN", "ROLE_USER"]));
        Ok(())
    }

    // ============================================================
    // POST /api/logout
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_logout_invalidates_token(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool.clone());

        let response = server
            .post("/api/logout")
            .add_header(TOKEN_HEADER, "token-alice")
            .await;
        response.assert_status_ok();

        let (activo, token): (bool, String) =
            sqlx::query_as("SELECT activo, token FROM users WHERE user_id = 1")
                .fetch_one(&pool)
                .await?;
        assert!(!activo);
        assert_eq!(token, "");

        server
            .get("/api/perfil")
            .add_header(TOKEN_HEADER, "token-alice")
            .await
            .assert_status_not_found();
        Ok(())
    }

    // ============================================================
    // GET /api/home
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "invitations")))]
    async fn test_home_lists_linked_chats(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server
            .get("/api/home")
            .add_header(TOKEN_HEADER, "token-bob")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Home cargado");
        assert_eq!(body["data"]["usuario"]["nombre"], "Bob");
        let chats = body["data"]["chats_activos"].as_array().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0]["tokenChat"], "privado-ab");
        assert_eq!(chats[0]["tipo"], "Privado");
        assert!(chats[0]["fecha_entrada"].as_str().unwrap().ends_with('Z'));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "invitations")))]
    async fn test_home_falls_back_to_active_chats(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server
            .get("/api/home")
            .add_header(TOKEN_HEADER, "token-eve")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let tokens: Vec<&str> = body["data"]["chats_activos"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["tokenChat"].as_str().unwrap())
            .collect();
        assert_eq!(tokens, vec!["general", "privado-ab"]);
        Ok(())
    }
}
