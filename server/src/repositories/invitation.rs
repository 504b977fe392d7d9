//! InvitationRepository - Repository per la gestione degli inviti

use super::{Create, Delete, Read};
use crate::dtos::CreateInvitationDTO;
use crate::entities::Invitation;
use chrono::Utc;
use sqlx::{Error, SqliteConnection};
use tracing::{debug, info, instrument};

// INVITATION REPO
pub struct InvitationRepository;

impl InvitationRepository {
    pub fn new() -> InvitationRepository {
        Self
    }

    #[instrument(skip(self, conn))]
    pub async fn find_by_token(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> Result<Option<Invitation>, Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            "SELECT invitation_id, token, estado, created_at FROM invitations WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(invitation)
    }

    /// Ultimi `limit` inviti, dal più recente
    pub async fn find_recent(
        &self,
        conn: &mut SqliteConnection,
        limit: i64,
    ) -> Result<Vec<Invitation>, Error> {
        let invitations = sqlx::query_as::<_, Invitation>(
            "SELECT invitation_id, token, estado, created_at FROM invitations ORDER BY invitation_id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        Ok(invitations)
    }
}

impl Default for InvitationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Create<Invitation, CreateInvitationDTO> for InvitationRepository {
    #[instrument(skip(self, conn, data))]
    async fn create(
        &self,
        conn: &mut SqliteConnection,
        data: &CreateInvitationDTO,
    ) -> Result<Invitation, Error> {
        debug!("Creating new invitation");
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO invitations (token, estado, created_at) VALUES (?, ?, ?)",
        )
        .bind(&data.token)
        .bind(&data.estado)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        let new_id = result.last_insert_rowid();
        info!("Invitation created with id {}", new_id);

        Ok(Invitation {
            invitation_id: new_id,
            token: data.token.clone(),
            estado: data.estado.clone(),
            created_at,
        })
    }
}

impl Read<Invitation, i64> for InvitationRepository {
    async fn read(&self, conn: &mut SqliteConnection, id: &i64) -> Result<Option<Invitation>, Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            "SELECT invitation_id, token, estado, created_at FROM invitations WHERE invitation_id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(invitation)
    }
}

impl Delete<i64> for InvitationRepository {
    /// Elimina l'invito. Slot utente e riferimenti delle chat vengono messi a NULL dal database.
    #[instrument(skip(self, conn), fields(invitation_id = %id))]
    async fn delete(&self, conn: &mut SqliteConnection, id: &i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM invitations WHERE invitation_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        info!("Invitation deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "invitations")))]
    async fn test_create_and_find_recent(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = InvitationRepository::new();
        let mut conn = pool.acquire().await?;

        let created = repo
            .create(
                &mut conn,
                &CreateInvitationDTO {
                    token: "inv-nuovo".to_string(),
                    estado: "aceptada".to_string(),
                },
            )
            .await?;

        let recent = repo.find_recent(&mut conn, 5).await?;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].invitation_id, created.invitation_id);
        assert_eq!(recent[1].token, "inv-alice-bob");

        assert_eq!(repo.find_recent(&mut conn, 1).await?.len(), 1);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "invitations")))]
    async fn test_delete_clears_references(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = InvitationRepository::new();
        let mut conn = pool.acquire().await?;

        repo.delete(&mut conn, &1).await?;
        assert!(repo.find_by_token(&mut conn, "inv-alice-bob").await?.is_none());

        let linked: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE inviter_invitation_id IS NOT NULL OR invitee_invitation_id IS NOT NULL",
        )
        .fetch_one(&mut *conn)
        .await?;
        assert_eq!(linked, 0);

        let chat_link: Option<i64> =
            sqlx::query_scalar("SELECT invitation_id FROM chats WHERE chat_id = 3")
                .fetch_one(&mut *conn)
                .await?;
        assert!(chat_link.is_none());

        Ok(())
    }
}
