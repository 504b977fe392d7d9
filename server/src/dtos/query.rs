//! Query DTOs - Data Transfer Objects per i parametri in query string

use serde::{Deserialize, Serialize};

/// Token di sessione passato come `?tokenusuario=`
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct TokenQuery {
    #[serde(default)]
    pub tokenusuario: Option<String>,
}

/// Chat di riferimento per `/api/mensaje`
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MessagesQuery {
    #[serde(default)]
    pub tokenchat: Option<String>,
}
