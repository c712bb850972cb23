//! Task catalog - the fixed checklist each action type starts with.

use crate::task::ActionType;

static SOPRALLUOGO: [&str; 6] = [
    "Verificare accessibilità del cantiere",
    "Rilevare stato dei serramenti esistenti",
    "Fotografare i vani",
    "Verificare tipologia di muratura e controtelai",
    "Raccogliere esigenze del cliente",
    "Concordare tempistiche indicative",
];

static MISURE: [&str; 5] = [
    "Misurare larghezza e altezza dei vani",
    "Verificare squadratura e fuori piombo",
    "Rilevare profondità del davanzale",
    "Annotare apertura e senso di battuta",
    "Registrare note tecniche per la produzione",
];

static POSA: [&str; 8] = [
    "Proteggere pavimenti e arredi",
    "Rimuovere i vecchi serramenti",
    "Preparare il vano",
    "Fissare il serramento",
    "Sigillare e schiumare il perimetro",
    "Regolare la ferramenta",
    "Pulire l'area di lavoro",
    "Verificare il funzionamento con il cliente",
];

static RIPARAZIONE: [&str; 5] = [
    "Diagnosticare il guasto",
    "Sostituire i componenti danneggiati",
    "Regolare ante e ferramenta",
    "Testare apertura e chiusura",
    "Pulire l'area di lavoro",
];

static PREVENTIVO: [&str; 4] = [
    "Selezionare prodotti e finiture",
    "Calcolare costi di materiale e posa",
    "Inviare il preventivo al cliente",
    "Richiamare il cliente per un riscontro",
];

static FOLLOWUP: [&str; 3] = [
    "Chiamare il cliente per verificare la soddisfazione",
    "Raccogliere eventuali segnalazioni",
    "Chiedere una recensione",
];

/// Ordered task descriptions for an action type. Unknown types get an
/// empty checklist.
pub fn lookup(action: &ActionType) -> &'static [&'static str] {
    match action {
        ActionType::Sopralluogo => &SOPRALLUOGO,
        ActionType::Misure => &MISURE,
        ActionType::Posa => &POSA,
        ActionType::Riparazione => &RIPARAZIONE,
        ActionType::Preventivo => &PREVENTIVO,
        ActionType::Followup => &FOLLOWUP,
        ActionType::Other(_) => &[],
    }
}

/// [`lookup`] by raw action key.
pub fn lookup_str(action: &str) -> &'static [&'static str] {
    lookup(&ActionType::from(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_action_has_a_checklist() {
        for action in ActionType::KNOWN {
            assert!(!lookup(&action).is_empty(), "{action} has no tasks");
        }
    }

    #[test]
    fn test_checklist_order_is_fixed() {
        let posa = lookup_str("posa");
        assert_eq!(posa.len(), 8);
        assert_eq!(posa[0], "Proteggere pavimenti e arredi");
        assert_eq!(posa[7], "Verificare il funzionamento con il cliente");
        assert_eq!(lookup_str("posa"), posa);
    }

    #[test]
    fn test_unknown_action_gets_empty_checklist() {
        assert!(lookup_str("collaudo").is_empty());
        assert!(lookup_str("").is_empty());
    }
}
