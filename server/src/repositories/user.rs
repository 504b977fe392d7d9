//! UserRepository - Repository per la gestione degli utenti
//!
//! Oltre alle operazioni CRUD gestisce i due slot invito dell'utente.
//! Assegnare uno slot sovrascrive il valore precedente: un utente è sempre collegato
//! al più a un invito come invitante e a uno come invitato.

use super::{Read, Update};
use crate::dtos::UpdateUserDTO;
use crate::entities::User;
use sqlx::{Error, SqliteConnection};
use tracing::{debug, info, instrument};

const USER_COLUMNS: &str = "user_id, email, nombre, roles, token, activo, latitud, longitud, baneado, inviter_invitation_id, invitee_invitation_id";

// USER REPO
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> UserRepository {
        Self
    }

    /// Find user by session token. An empty token never matches (logged out users).
    #[instrument(skip(self, conn, token))]
    pub async fn find_by_token(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> Result<Option<User>, Error> {
        if token.is_empty() {
            return Ok(None);
        }
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE token = ?"
        ))
        .bind(token)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Tutti gli utenti, in ordine di id
    pub async fn find_all(&self, conn: &mut SqliteConnection) -> Result<Vec<User>, Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY user_id"
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(users)
    }

    /// Utenti online, in ordine di id
    pub async fn find_active(&self, conn: &mut SqliteConnection) -> Result<Vec<User>, Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE activo = 1 ORDER BY user_id"
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(users)
    }

    /// Insieme degli invitanti di un invito
    #[instrument(skip(self, conn))]
    pub async fn find_inviters(
        &self,
        conn: &mut SqliteConnection,
        invitation_id: i64,
    ) -> Result<Vec<User>, Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE inviter_invitation_id = ? ORDER BY user_id"
        ))
        .bind(invitation_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(users)
    }

    /// Insieme degli invitati di un invito
    #[instrument(skip(self, conn))]
    pub async fn find_invitees(
        &self,
        conn: &mut SqliteConnection,
        invitation_id: i64,
    ) -> Result<Vec<User>, Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE invitee_invitation_id = ? ORDER BY user_id"
        ))
        .bind(invitation_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(users)
    }

    /// Restituisce (numero invitanti, numero invitati) di un invito
    #[instrument(skip(self, conn))]
    pub async fn count_participants(
        &self,
        conn: &mut SqliteConnection,
        invitation_id: i64,
    ) -> Result<(i64, i64), Error> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN inviter_invitation_id = ?1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN invitee_invitation_id = ?1 THEN 1 ELSE 0 END), 0)
            FROM users
            "#,
        )
        .bind(invitation_id)
        .fetch_one(&mut *conn)
        .await?;

        debug!("Invitation has {} inviters and {} invitees", counts.0, counts.1);
        Ok(counts)
    }

    /// Occupa lo slot invitante dell'utente (sovrascrive l'eventuale invito precedente)
    #[instrument(skip(self, conn))]
    pub async fn attach_as_inviter(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        invitation_id: i64,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE users SET inviter_invitation_id = ? WHERE user_id = ?")
            .bind(invitation_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Occupa lo slot invitato dell'utente (sovrascrive l'eventuale invito precedente)
    #[instrument(skip(self, conn))]
    pub async fn attach_as_invitee(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        invitation_id: i64,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE users SET invitee_invitation_id = ? WHERE user_id = ?")
            .bind(invitation_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Libera gli slot dell'utente che puntano all'invito indicato (entrambi i ruoli).
    /// Gli slot che puntano ad altri inviti non vengono toccati.
    #[instrument(skip(self, conn))]
    pub async fn detach_from_invitation(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        invitation_id: i64,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE users SET
                inviter_invitation_id = CASE WHEN inviter_invitation_id = ?1 THEN NULL ELSE inviter_invitation_id END,
                invitee_invitation_id = CASE WHEN invitee_invitation_id = ?1 THEN NULL ELSE invitee_invitation_id END
            WHERE user_id = ?2
            "#,
        )
        .bind(invitation_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Libera gli slot di tutti gli utenti collegati all'invito
    #[instrument(skip(self, conn))]
    pub async fn detach_all_from_invitation(
        &self,
        conn: &mut SqliteConnection,
        invitation_id: i64,
    ) -> Result<u64, Error> {
        let inviters = sqlx::query(
            "UPDATE users SET inviter_invitation_id = NULL WHERE inviter_invitation_id = ?",
        )
        .bind(invitation_id)
        .execute(&mut *conn)
        .await?;
        let invitees = sqlx::query(
            "UPDATE users SET invitee_invitation_id = NULL WHERE invitee_invitation_id = ?",
        )
        .bind(invitation_id)
        .execute(&mut *conn)
        .await?;

        Ok(inviters.rows_affected() + invitees.rows_affected())
    }
}

impl Default for UserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Read<User, i64> for UserRepository {
    #[instrument(skip(self, conn), fields(user_id = %id))]
    async fn read(&self, conn: &mut SqliteConnection, id: &i64) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }
}

impl Update<User, UpdateUserDTO, i64> for UserRepository {
    #[instrument(skip(self, conn, data), fields(user_id = %id))]
    async fn update(&self, conn: &mut SqliteConnection, id: &i64, data: &UpdateUserDTO) -> Result<User, Error> {
        debug!("Updating user");
        // First, get the current user to ensure it exists
        let current_user = self
            .read(conn, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        if data.is_empty() {
            debug!("No fields to update, returning current user");
            return Ok(current_user);
        }

        let mut query_builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE users SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref token) = data.token {
            separated.push("token = ");
            separated.push_bind_unseparated(token.clone());
        }
        if let Some(activo) = data.activo {
            separated.push("activo = ");
            separated.push_bind_unseparated(activo);
        }
        query_builder.push(" WHERE user_id = ");
        query_builder.push_bind(*id);

        query_builder.build().execute(&mut *conn).await?;

        info!("User updated successfully");

        self.read(conn, id).await?.ok_or(sqlx::Error::RowNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_find_by_token(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = UserRepository::new();
        let mut conn = pool.acquire().await?;

        let alice = repo.find_by_token(&mut conn, "token-alice").await?;
        assert_eq!(alice.map(|u| u.user_id), Some(1));

        assert!(repo.find_by_token(&mut conn, "nope").await?.is_none());
        // il token vuoto (utente disconnesso) non deve mai corrispondere
        sqlx::query("UPDATE users SET token = '' WHERE user_id = 3")
            .execute(&mut *conn)
            .await?;
        assert!(repo.find_by_token(&mut conn, "").await?.is_none());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_find_active_skips_offline_users(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = UserRepository::new();
        let mut conn = pool.acquire().await?;

        let active: Vec<i64> = repo
            .find_active(&mut conn)
            .await?
            .into_iter()
            .map(|u| u.user_id)
            .collect();
        assert_eq!(active, vec![1, 2, 3, 5]);
        assert_eq!(repo.find_all(&mut conn).await?.len(), 5);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "invitations")))]
    async fn test_single_slot_is_overwritten(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = UserRepository::new();
        let mut conn = pool.acquire().await?;

        sqlx::query("INSERT INTO invitations (invitation_id, token, estado, created_at) VALUES (2, 'inv-2', 'aceptada', '2026-02-02T00:00:00+00:00')")
            .execute(&mut *conn)
            .await?;

        // Bob è invitato nell'invito 1, assegnarlo all'invito 2 lo stacca dal primo
        repo.attach_as_invitee(&mut conn, 2, 2).await?;
        assert_eq!(repo.count_participants(&mut conn, 1).await?, (1, 0));
        assert_eq!(repo.count_participants(&mut conn, 2).await?, (0, 1));

        let bob = repo.read(&mut conn, &2).await?.unwrap();
        assert_eq!(bob.invitee_invitation_id, Some(2));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "chats", "invitations")))]
    async fn test_detach_only_touches_matching_slots(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = UserRepository::new();
        let mut conn = pool.acquire().await?;

        // l'invito 99 non esiste tra gli slot di Alice: nessun effetto
        repo.detach_from_invitation(&mut conn, 1, 99).await?;
        assert_eq!(repo.count_participants(&mut conn, 1).await?, (1, 1));

        repo.detach_from_invitation(&mut conn, 1, 1).await?;
        assert_eq!(repo.count_participants(&mut conn, 1).await?, (0, 1));

        let detached = repo.detach_all_from_invitation(&mut conn, 1).await?;
        assert_eq!(detached, 1);
        assert_eq!(repo.count_participants(&mut conn, 1).await?, (0, 0));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_update_partial_fields(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = UserRepository::new();
        let mut conn = pool.acquire().await?;

        let updated = repo
            .update(
                &mut conn,
                &1,
                &UpdateUserDTO {
                    token: Some(String::new()),
                    activo: Some(false),
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(updated.token, "");
        assert!(!updated.activo);
        // campi non indicati restano invariati
        assert_eq!(updated.latitud, Some(40.0));

        Ok(())
    }
}
