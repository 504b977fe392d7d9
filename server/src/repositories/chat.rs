//! ChatRepository - Repository per la gestione delle chat

use super::{Create, Delete, Read};
use crate::dtos::CreateChatDTO;
use crate::entities::Chat;
use sqlx::{Error, SqliteConnection};
use tracing::{debug, info, instrument};

const CHAT_COLUMNS: &str = "chat_id, tipo, activo, token, created_at, invitation_id";

// CHAT REPO
pub struct ChatRepository;

impl ChatRepository {
    pub fn new() -> ChatRepository {
        Self
    }

    /// Find chat by its external token
    #[instrument(skip(self, conn))]
    pub async fn find_by_token(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> Result<Option<Chat>, Error> {
        let chat = sqlx::query_as::<_, Chat>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE token = ?"
        ))
        .bind(token)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(chat)
    }

    /// Chat di un certo tipo (case-insensitive), opzionalmente filtrate per stato, in ordine di id
    #[instrument(skip(self, conn))]
    pub async fn find_by_type(
        &self,
        conn: &mut SqliteConnection,
        tipo: &str,
        activo: Option<bool>,
    ) -> Result<Vec<Chat>, Error> {
        let chats = match activo {
            Some(activo) => {
                sqlx::query_as::<_, Chat>(&format!(
                    "SELECT {CHAT_COLUMNS} FROM chats WHERE tipo = ? COLLATE NOCASE AND activo = ? ORDER BY chat_id"
                ))
                .bind(tipo)
                .bind(activo)
                .fetch_all(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as::<_, Chat>(&format!(
                    "SELECT {CHAT_COLUMNS} FROM chats WHERE tipo = ? COLLATE NOCASE ORDER BY chat_id"
                ))
                .bind(tipo)
                .fetch_all(&mut *conn)
                .await?
            }
        };

        debug!("Found {} chats of type {}", chats.len(), tipo);
        Ok(chats)
    }

    /// Tutte le chat attive, di qualsiasi tipo
    pub async fn find_active(&self, conn: &mut SqliteConnection) -> Result<Vec<Chat>, Error> {
        let chats = sqlx::query_as::<_, Chat>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE activo = 1 ORDER BY chat_id"
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(chats)
    }

    /// Chat collegate a un invito
    #[instrument(skip(self, conn))]
    pub async fn find_by_invitation(
        &self,
        conn: &mut SqliteConnection,
        invitation_id: i64,
    ) -> Result<Vec<Chat>, Error> {
        let chats = sqlx::query_as::<_, Chat>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE invitation_id = ? ORDER BY chat_id"
        ))
        .bind(invitation_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(chats)
    }

    /// Collega (o scollega con `None`) una chat a un invito
    #[instrument(skip(self, conn))]
    pub async fn set_invitation(
        &self,
        conn: &mut SqliteConnection,
        chat_id: i64,
        invitation_id: Option<i64>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE chats SET invitation_id = ? WHERE chat_id = ?")
            .bind(invitation_id)
            .bind(chat_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, conn))]
    pub async fn set_activo(
        &self,
        conn: &mut SqliteConnection,
        chat_id: i64,
        activo: bool,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE chats SET activo = ? WHERE chat_id = ?")
            .bind(activo)
            .bind(chat_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

impl Default for ChatRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Create<Chat, CreateChatDTO> for ChatRepository {
    #[instrument(skip(self, conn, data), fields(tipo = %data.tipo))]
    async fn create(&self, conn: &mut SqliteConnection, data: &CreateChatDTO) -> Result<Chat, Error> {
        debug!("Creating new chat");
        let result = sqlx::query(
            r#"
            INSERT INTO chats (tipo, activo, token, created_at, invitation_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.tipo)
        .bind(data.activo)
        .bind(&data.token)
        .bind(data.created_at)
        .bind(data.invitation_id)
        .execute(&mut *conn)
        .await?;

        let new_id = result.last_insert_rowid();
        info!("Chat created with id {}", new_id);

        Ok(Chat {
            chat_id: new_id,
            tipo: data.tipo.clone(),
            activo: data.activo,
            token: data.token.clone(),
            created_at: data.created_at,
            invitation_id: data.invitation_id,
        })
    }
}

impl Read<Chat, i64> for ChatRepository {
    #[instrument(skip(self, conn), fields(chat_id = %id))]
    async fn read(&self, conn: &mut SqliteConnection, id: &i64) -> Result<Option<Chat>, Error> {
        let chat = sqlx::query_as::<_, Chat>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE chat_id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(chat)
    }
}

impl Delete<i64> for ChatRepository {
    /// Elimina la chat; i messaggi vengono rimossi in cascata
    #[instrument(skip(self, conn), fields(chat_id = %id))]
    async fn delete(&self, conn: &mut SqliteConnection, id: &i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM chats WHERE chat_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        info!("Chat deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "invitations")))]
    async fn test_find_by_type_ignores_case(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ChatRepository::new();
        let mut conn = pool.acquire().await?;

        let all_public = repo.find_by_type(&mut conn, "publico", None).await?;
        assert_eq!(all_public.len(), 2);

        let active_public = repo.find_by_type(&mut conn, "PUBLICO", Some(true)).await?;
        assert_eq!(active_public.len(), 1);
        assert_eq!(active_public[0].token, "general");

        let private = repo.find_by_type(&mut conn, "Privado", None).await?;
        assert_eq!(private.len(), 1);
        assert!(private[0].is_private());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "invitations")))]
    async fn test_invitation_link(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ChatRepository::new();
        let mut conn = pool.acquire().await?;

        assert_eq!(repo.find_by_invitation(&mut conn, 1).await?.len(), 1);

        repo.set_invitation(&mut conn, 3, None).await?;
        assert!(repo.find_by_invitation(&mut conn, 1).await?.is_empty());
        let private = repo.find_by_type(&mut conn, "Privado", None).await?;
        assert_eq!(private[0].invitation_id, None);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "invitations", "messages")))]
    async fn test_delete_removes_messages(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ChatRepository::new();
        let mut conn = pool.acquire().await?;

        repo.delete(&mut conn, &3).await?;
        assert!(repo.find_by_token(&mut conn, "privado-ab").await?.is_none());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE chat_id = 3")
            .fetch_one(&mut *conn)
            .await?;
        assert_eq!(remaining, 0);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_create_and_toggle(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = ChatRepository::new();
        let mut conn = pool.acquire().await?;

        let chat = repo
            .create(
                &mut conn,
                &CreateChatDTO {
                    tipo: "Publico".to_string(),
                    activo: true,
                    token: "nuova".to_string(),
                    created_at: Utc::now(),
                    invitation_id: None,
                },
            )
            .await?;
        assert!(chat.is_public());

        repo.set_activo(&mut conn, chat.chat_id, false).await?;
        let reloaded = repo.read(&mut conn, &chat.chat_id).await?.unwrap();
        assert!(!reloaded.activo);
        assert_eq!(repo.find_active(&mut conn).await?.len(), 0);

        Ok(())
    }
}
