//! Phase model - the stages a pratica moves through.

use serde::{Deserialize, Serialize};

/// Phase key of a pratica.
///
/// Stored as a plain string in case records. Keys this crate does not know
/// are kept verbatim in [`Fase::Unknown`] so a corrupted record still loads
/// and can be repaired.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Fase {
    /// On-site survey
    #[default]
    Sopralluogo,
    /// Measurements
    Misure,
    /// Quote
    Preventivo,
    /// Signed order confirmation
    Conferma,
    /// Repair work
    Riparazione,
    /// Invoice
    Fattura,
    /// Installation
    Posa,
    /// Any key not listed above
    Unknown(String),
}

impl Fase {
    /// Every known phase key.
    pub const KNOWN: [Fase; 7] = [
        Fase::Sopralluogo,
        Fase::Misure,
        Fase::Preventivo,
        Fase::Conferma,
        Fase::Riparazione,
        Fase::Fattura,
        Fase::Posa,
    ];

    /// The key as stored in case records.
    pub fn as_str(&self) -> &str {
        match self {
            Fase::Sopralluogo => "sopralluogo",
            Fase::Misure => "misure",
            Fase::Preventivo => "preventivo",
            Fase::Conferma => "conferma",
            Fase::Riparazione => "riparazione",
            Fase::Fattura => "fattura",
            Fase::Posa => "posa",
            Fase::Unknown(key) => key,
        }
    }

    /// Whether this is a key the workflow catalog knows about.
    pub fn is_known(&self) -> bool {
        !matches!(self, Fase::Unknown(_))
    }
}

impl From<&str> for Fase {
    fn from(key: &str) -> Self {
        match key {
            "sopralluogo" => Fase::Sopralluogo,
            "misure" => Fase::Misure,
            "preventivo" => Fase::Preventivo,
            "conferma" => Fase::Conferma,
            "riparazione" => Fase::Riparazione,
            "fattura" => Fase::Fattura,
            "posa" => Fase::Posa,
            other => Fase::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Fase {
    fn from(key: String) -> Self {
        Fase::from(key.as_str())
    }
}

impl From<Fase> for String {
    fn from(fase: Fase) -> Self {
        match fase {
            Fase::Unknown(key) => key,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Fase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metadata for one step of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseDescriptor {
    /// Phase key
    pub key: Fase,

    /// Label shown to operators
    pub label: &'static str,

    /// Icon (emoji)
    pub icon: &'static str,

    /// Accent color (hex)
    pub color: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_round_trip_through_strings() {
        for fase in Fase::KNOWN {
            assert_eq!(Fase::from(fase.as_str()), fase);
            assert!(fase.is_known());
        }
    }

    #[test]
    fn test_unknown_key_is_preserved() {
        let fase = Fase::from("archiviata");
        assert_eq!(fase, Fase::Unknown("archiviata".to_string()));
        assert!(!fase.is_known());
        assert_eq!(String::from(fase), "archiviata");
    }

    #[test]
    fn test_default_is_sopralluogo() {
        assert_eq!(Fase::default(), Fase::Sopralluogo);
    }

    #[test]
    fn test_serde_uses_plain_keys() {
        let json = serde_json::to_string(&Fase::Conferma).unwrap();
        assert_eq!(json, "\"conferma\"");

        let fase: Fase = serde_json::from_str("\"boh\"").unwrap();
        assert_eq!(fase, Fase::Unknown("boh".to_string()));
    }
}
