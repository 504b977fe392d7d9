//! Integration tests per GET /api/actualizar

mod common;

#[cfg(test)]
mod actualizar_tests {
    use super::common::{TOKEN_HEADER, server_for};
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "invitations", "messages")))]
    async fn test_actualizar_snapshot(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        let response = server
            .get("/api/actualizar")
            .add_header(TOKEN_HEADER, "token-bob")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Chats actualizados");
        let data = &body["data"];

        assert_eq!(data["chatGeneralActualizado"], true);
        assert_eq!(data["chatPrivadoActualizado"], true);
        assert_eq!(data["chatsGeneralesProcesados"], 1);
        assert_eq!(data["mensajesProcesados"], 12);
        assert_eq!(data["chatGeneral"][0]["mensajes"].as_array().unwrap().len(), 10);
        assert_eq!(data["chatPrivado"][0]["tokenChat"], "privado-ab");
        assert_eq!(
            data["chatPrivado"][0]["mensajes"][1]["usuario"],
            json!({ "token": "token-bob", "nombre": "Bob" })
        );

        assert_eq!(data["invitacionesNuevas"], 1);
        assert_eq!(
            data["invitaciones"][0],
            json!({
                "token": "inv-alice-bob",
                "estado": "aceptada",
                "chats": ["privado-ab"],
                "invitadores": [{ "token": "token-alice", "nombre": "Alice" }],
                "invitados": [{ "token": "token-bob", "nombre": "Bob" }]
            })
        );

        assert_eq!(data["usuariosCercanos"], 1);
        assert_eq!(
            data["usuarios"],
            json!([{ "token": "token-alice", "nombre": "Alice", "distancia_km": 3.336 }])
        );
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "chats", "invitations", "messages")))]
    async fn test_actualizar_after_invite(pool: SqlitePool) -> sqlx::Result<()> {
        let server = server_for(pool);

        server
            .post("/api/chat/invitar")
            .add_header(TOKEN_HEADER, "token-alice")
            .json(&json!({ "tokenchat": "privado-ae", "tokenUsuario": "token-eve" }))
            .await
            .assert_status_ok();

        let response = server
            .get("/api/actualizar")
            .add_query_param("tokenusuario", "token-eve")
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let data = &body["data"];
        assert_eq!(data["chatPrivado"][0]["tokenChat"], "privado-ae");
        assert_eq!(data["chatPrivado"][0]["mensajes"], json!([]));
        assert_eq!(data["invitacionesNuevas"], 1);
        assert_eq!(data["invitaciones"][0]["estado"], "aceptada");
        // Eve è a più di 5 km da tutti
        assert_eq!(data["usuariosCercanos"], 0);
        Ok(())
    }
}
