//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Questo modulo organizza i repository in sotto-moduli separati per una migliore manutenibilità.
//! Ogni repository gestisce le operazioni di database per una specifica entità.

// ************************* NOTA SULLE QUERY ************************* //

/*
   Le query sono scritte con le funzioni runtime di sqlx (query / query_as / query_scalar)
   e le entity derivano sqlx::FromRow: così il progetto compila anche senza un database
   raggiungibile a compile time.
   Number of Rows	Method to Call	Returns
   None	            .execute(...).await	        sqlx::Result<SqliteQueryResult>	   INSERT/UPDATE/DELETE
   Zero or One	    .fetch_optional(...).await	sqlx::Result<Option<T>>
   Exactly One	    .fetch_one(...).await	    sqlx::Result<T>	                   aggregate queries (COUNT)
   Multiple	        .fetch_all(...).await	    sqlx::Result<Vec<T>>
   L'executor è sempre `&mut *conn`: la stessa connessione (o transazione) viene riusata
   per tutte le query di un'operazione.
*/

// ************************* MODULI REPOSITORY ************************* //

pub mod chat;
pub mod invitation;
pub mod message;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use chat::ChatRepository;
pub use invitation::InvitationRepository;
pub use message::MessageRepository;
pub use user::UserRepository;

use crate::core::Config;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

// alias di tipo per il pool, per semplificare lo switch in caso in cui vogliamo usare un altro db
pub type PoolType = SqlitePool;

/// Migrazioni incluse nel binario (cartella `migrations/` del crate)
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Crea il pool di connessioni e applica le migrazioni
#[instrument(skip(config))]
pub async fn connect(config: &Config) -> Result<PoolType, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;
    info!("Database ready, migrations applied");

    Ok(pool)
}

/// Apre una transazione di scrittura.
///
/// `BEGIN IMMEDIATE` prende subito il lock di scrittura: i writer concorrenti attendono
/// (fino a `busy_timeout`) invece di fallire all'upgrade del lock.
pub async fn begin_write(pool: &PoolType) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}
