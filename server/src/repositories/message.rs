//! MessageRepository - Repository per la gestione dei messaggi

use super::Create;
use crate::dtos::CreateMessageDTO;
use crate::entities::{Message, MessageWithSender};
use sqlx::{Error, SqliteConnection};
use tracing::{debug, instrument};

// MESSAGE REPO
pub struct MessageRepository;

impl MessageRepository {
    pub fn new() -> MessageRepository {
        Self
    }

    /// Ultimi `limit` messaggi di una chat, restituiti in ordine cronologico crescente
    #[instrument(skip(self, conn))]
    pub async fn find_last_by_chat(
        &self,
        conn: &mut SqliteConnection,
        chat_id: i64,
        limit: i64,
    ) -> Result<Vec<MessageWithSender>, Error> {
        let mut messages = sqlx::query_as::<_, MessageWithSender>(
            r#"
            SELECT m.message_id, m.token, m.contenido, m.fecha_envio, m.chat_id,
                   u.token AS sender_token, u.nombre AS sender_nombre
            FROM messages m
            JOIN users u ON u.user_id = m.sender_id
            WHERE m.chat_id = ?
            ORDER BY m.fecha_envio DESC, m.message_id DESC
            LIMIT ?
            "#,
        )
        .bind(chat_id)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        messages.reverse();
        debug!("Loaded {} messages", messages.len());
        Ok(messages)
    }

    /// Tutti i messaggi di una chat, dal più vecchio
    #[instrument(skip(self, conn))]
    pub async fn find_all_by_chat(
        &self,
        conn: &mut SqliteConnection,
        chat_id: i64,
    ) -> Result<Vec<MessageWithSender>, Error> {
        let messages = sqlx::query_as::<_, MessageWithSender>(
            r#"
            SELECT m.message_id, m.token, m.contenido, m.fecha_envio, m.chat_id,
                   u.token AS sender_token, u.nombre AS sender_nombre
            FROM messages m
            JOIN users u ON u.user_id = m.sender_id
            WHERE m.chat_id = ?
            ORDER BY m.fecha_envio ASC, m.message_id ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(messages)
    }
}

impl Default for MessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Create<Message, CreateMessageDTO> for MessageRepository {
    #[instrument(skip(self, conn, data), fields(chat_id = %data.chat_id))]
    async fn create(&self, conn: &mut SqliteConnection, data: &CreateMessageDTO) -> Result<Message, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages (token, contenido, leido, fecha_envio, sender_id, chat_id)
            VALUES (?, ?, 0, ?, ?, ?)
            "#,
        )
        .bind(&data.token)
        .bind(&data.contenido)
        .bind(data.fecha_envio)
        .bind(data.sender_id)
        .bind(data.chat_id)
        .execute(&mut *conn)
        .await?;

        Ok(Message {
            message_id: result.last_insert_rowid(),
            token: data.token.clone(),
            contenido: data.contenido.clone(),
            leido: Some(false),
            fecha_envio: data.fecha_envio,
            sender_id: data.sender_id,
            chat_id: data.chat_id,
        })
    }
}
