//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stato scritto su ogni invito al momento della creazione.
/// Il valore è letterale e non cambia durante la vita dell'invito.
pub const INVITATION_INITIAL_STATE: &str = "aceptada";

// ********************* ENUMERAZIONI UTILI **********************//

/// Tipo di chat. Nel database il tipo è salvato come testo (`Publico` / `Privado`)
/// ma ogni confronto è case-insensitive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatType {
    Publico,
    Privado,
}

impl ChatType {
    /// Forma canonica salvata nella colonna `tipo`
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Publico => "Publico",
            ChatType::Privado => "Privado",
        }
    }

    /// Confronto case-insensitive con il valore grezzo della colonna
    pub fn matches(&self, tipo: &str) -> bool {
        tipo.eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if ChatType::Publico.matches(s) {
            Ok(ChatType::Publico)
        } else if ChatType::Privado.matches(s) {
            Ok(ChatType::Privado)
        } else {
            Err(())
        }
    }
}

/// Risposta dell'invitato a un invito
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAction {
    Aceptar,
    Rechazar,
}

impl FromStr for InvitationAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aceptar" => Ok(InvitationAction::Aceptar),
            "rechazar" => Ok(InvitationAction::Rechazar),
            _ => Err(()),
        }
    }
}
