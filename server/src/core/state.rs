//! Application State - Stato globale dell'applicazione
//!
//! Contiene il pool di connessioni e tutti i repository necessari
//! per gestire l'applicazione.

use crate::repositories::{
    ChatRepository, InvitationRepository, MessageRepository, PoolType, UserRepository,
};

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Pool di connessioni, da cui ogni operazione apre la propria transazione
    pub pool: PoolType,

    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per la gestione delle chat
    pub chat: ChatRepository,

    /// Repository per la gestione dei messaggi
    pub msg: MessageRepository,

    /// Repository per la gestione degli inviti
    pub invitation: InvitationRepository,
}

impl AppState {
    /// Crea una nuova istanza di AppState a partire dal pool fornito.
    ///
    /// I repository non possiedono connessioni: ogni metodo riceve la connessione
    /// (o la transazione) su cui lavorare, così un'operazione composta resta atomica.
    pub fn new(pool: PoolType) -> Self {
        Self {
            pool,
            user: UserRepository::new(),
            chat: ChatRepository::new(),
            msg: MessageRepository::new(),
            invitation: InvitationRepository::new(),
        }
    }
}
