//! Pratica model - a customer job moving through its workflow.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::gate::{evaluate, GateOutcome};
use crate::id::{PraticaId, PraticaNum};
use crate::phase::{Fase, PhaseDescriptor};
use crate::task::{ActionType, Azione};
use crate::workflow::{Tipo, Workflow};
use crate::Time;

/// A tracked customer job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pratica {
    /// Unique identifier
    pub id: PraticaId,

    /// Display number, unique per year
    pub numero: PraticaNum,

    /// Workflow type
    #[serde(default)]
    pub tipo: Tipo,

    /// Current phase; absent in a record means a new case
    #[serde(default)]
    pub fase: Fase,

    /// Customer
    #[serde(default)]
    pub cliente: Cliente,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Measurements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub misure: Option<Misure>,

    /// Quote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preventivo: Option<Preventivo>,

    /// Order confirmation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conferma_ordine: Option<ConfermaOrdine>,

    /// Invoice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fattura: Option<Fattura>,

    /// Repair record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub riparazione: Option<Riparazione>,

    /// Scheduled and executed actions
    #[serde(default)]
    pub actions: Vec<Azione>,

    /// When created
    pub created_at: Time,

    /// Last updated
    pub updated_at: Time,
}

/// Customer contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cliente {
    /// Name or company
    #[serde(default)]
    pub nome: String,

    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,

    /// Site address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indirizzo: Option<String>,
}

/// Measurements taken on site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Misure {
    /// One entry per opening
    #[serde(default)]
    pub vani: Vec<Vano>,

    /// Technical notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// When measured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rilevate_il: Option<NaiveDate>,
}

/// A single measured opening.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vano {
    /// Room or position
    #[serde(default)]
    pub descrizione: String,

    /// Width in millimetres
    pub larghezza_mm: u32,

    /// Height in millimetres
    pub altezza_mm: u32,

    /// Number of identical openings
    #[serde(default = "one")]
    pub quantita: u32,
}

fn one() -> u32 {
    1
}

/// Quote sent to the customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preventivo {
    /// Total in euro cents
    #[serde(default)]
    pub importo_cent: u64,

    /// Description of the offer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descrizione: Option<String>,

    /// When sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inviato_il: Option<NaiveDate>,
}

/// Order confirmation. Only a signed confirmation lets the case advance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfermaOrdine {
    /// Signed by the customer
    #[serde(default)]
    pub firmata: bool,

    /// When signed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmata_il: Option<NaiveDate>,

    /// Deposit in euro cents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acconto_cent: Option<u64>,
}

/// Invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fattura {
    /// Invoice number
    #[serde(default)]
    pub numero: String,

    /// Total in euro cents
    #[serde(default)]
    pub importo_cent: u64,

    /// Issue date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emessa_il: Option<NaiveDate>,
}

/// Repair record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Riparazione {
    /// What was repaired
    #[serde(default)]
    pub descrizione: String,

    /// Replaced parts
    #[serde(default)]
    pub ricambi: Vec<String>,

    /// When done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eseguita_il: Option<NaiveDate>,
}

/// Data captured for a data-gated phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum PhasePayload {
    /// Measurements
    Misure(Misure),
    /// Quote
    Preventivo(Preventivo),
    /// Order confirmation
    ConfermaOrdine(ConfermaOrdine),
    /// Invoice
    Fattura(Fattura),
    /// Repair record
    Riparazione(Riparazione),
}

impl PhasePayload {
    /// The phase this payload unlocks.
    pub fn phase(&self) -> Fase {
        match self {
            PhasePayload::Misure(_) => Fase::Misure,
            PhasePayload::Preventivo(_) => Fase::Preventivo,
            PhasePayload::ConfermaOrdine(_) => Fase::Conferma,
            PhasePayload::Fattura(_) => Fase::Fattura,
            PhasePayload::Riparazione(_) => Fase::Riparazione,
        }
    }
}

/// Filter for querying pratiche.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PraticaFilter {
    /// Filter by workflow type
    pub tipo: Option<Tipo>,

    /// Filter by current phase
    pub fase: Option<Vec<Fase>>,

    /// Filter by display number year
    pub year: Option<i32>,
}

impl PraticaFilter {
    /// Whether `pratica` passes the filter.
    pub fn matches(&self, pratica: &Pratica) -> bool {
        self.tipo.map_or(true, |t| t == pratica.tipo)
            && self.fase.as_ref().map_or(true, |f| f.contains(&pratica.fase))
            && self.year.map_or(true, |y| y == pratica.numero.year)
    }
}

/// Why a pratica could not be advanced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdvanceError {
    /// `fase` is not part of the pratica's workflow
    #[error("phase '{fase}' is not part of the '{tipo}' workflow")]
    InvalidPhase {
        /// Workflow type
        tipo: Tipo,
        /// Offending phase
        fase: Fase,
    },

    /// Already at the last phase
    #[error("phase '{0}' is the last phase of the workflow")]
    AlreadyTerminal(Fase),

    /// The current phase's gate is not satisfied
    #[error("phase '{fase}' is not complete: {requirement}")]
    GateBlocked {
        /// Current phase
        fase: Fase,
        /// What is still missing
        requirement: String,
    },
}

impl Pratica {
    /// Create a new pratica at the start of its workflow with no payloads.
    pub fn new(id: PraticaId, numero: PraticaNum, tipo: Tipo, cliente: Cliente) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            numero,
            tipo,
            fase: Fase::Sopralluogo,
            cliente,
            note: None,
            misure: None,
            preventivo: None,
            conferma_ordine: None,
            fattura: None,
            riparazione: None,
            actions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The workflow selected by `tipo`.
    pub fn workflow(&self) -> &'static Workflow {
        self.tipo.workflow()
    }

    /// Position of the current phase, `None` if the record is invalid.
    pub fn phase_index(&self) -> Option<usize> {
        self.workflow().phase_index(&self.fase)
    }

    /// Descriptor of the current phase.
    pub fn current_phase(&self) -> Option<&'static PhaseDescriptor> {
        self.workflow().descriptor(&self.fase)
    }

    /// Whether the current phase is the workflow's last.
    pub fn is_terminal(&self) -> bool {
        self.workflow().is_terminal(&self.fase)
    }

    /// First action of the given type.
    pub fn action(&self, action_type: &ActionType) -> Option<&Azione> {
        self.actions.iter().find(|a| &a.action_type == action_type)
    }

    /// Mutable access to the first action of the given type.
    pub fn action_mut(&mut self, action_type: &ActionType) -> Option<&mut Azione> {
        self.actions.iter_mut().find(|a| &a.action_type == action_type)
    }

    /// The action of the given type, created from the task catalog if the
    /// pratica has none yet.
    pub fn ensure_action(&mut self, action_type: ActionType) -> &mut Azione {
        let pos = match self.actions.iter().position(|a| a.action_type == action_type) {
            Some(pos) => pos,
            None => {
                self.actions.push(Azione::from_catalog(action_type));
                self.actions.len() - 1
            }
        };
        &mut self.actions[pos]
    }

    /// Store a phase payload, replacing any previous one.
    pub fn record(&mut self, payload: PhasePayload) {
        match payload {
            PhasePayload::Misure(m) => self.misure = Some(m),
            PhasePayload::Preventivo(p) => self.preventivo = Some(p),
            PhasePayload::ConfermaOrdine(c) => self.conferma_ordine = Some(c),
            PhasePayload::Fattura(f) => self.fattura = Some(f),
            PhasePayload::Riparazione(r) => self.riparazione = Some(r),
        }
    }

    /// Move to the next phase if the current one is complete.
    ///
    /// Never moves backwards and leaves the record untouched on error.
    pub fn advance(&mut self) -> Result<&'static PhaseDescriptor, AdvanceError> {
        let workflow = self.workflow();
        if workflow.phase_index(&self.fase).is_none() {
            return Err(AdvanceError::InvalidPhase {
                tipo: self.tipo,
                fase: self.fase.clone(),
            });
        }
        let Some(next) = workflow.next_after(&self.fase) else {
            return Err(AdvanceError::AlreadyTerminal(self.fase.clone()));
        };
        if let GateOutcome::Blocked { requirement } = evaluate(self) {
            return Err(AdvanceError::GateBlocked {
                fase: self.fase.clone(),
                requirement,
            });
        }

        self.fase = next.key.clone();
        self.updated_at = chrono::Utc::now();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_pratica(tipo: Tipo) -> Pratica {
        Pratica::new(
            PraticaId::from("test"),
            PraticaNum::new(2024, 1),
            tipo,
            Cliente {
                nome: "Rossi".to_string(),
                ..Default::default()
            },
        )
    }

    fn complete_action(p: &mut Pratica, action_type: ActionType) {
        let azione = p.ensure_action(action_type);
        for task in &mut azione.tasks {
            task.done = true;
        }
    }

    #[test]
    fn test_new_pratica_starts_at_sopralluogo() {
        let p = new_pratica(Tipo::Nuovo);
        assert_eq!(p.fase, Fase::Sopralluogo);
        assert_eq!(p.phase_index(), Some(0));
        assert!(p.misure.is_none() && p.fattura.is_none());
        assert!(p.actions.is_empty());
    }

    #[test]
    fn test_ensure_action_is_idempotent() {
        let mut p = new_pratica(Tipo::Nuovo);
        p.ensure_action(ActionType::Sopralluogo).set_done(0, true);
        p.ensure_action(ActionType::Sopralluogo);
        assert_eq!(p.actions.len(), 1);
        assert!(p.actions[0].tasks[0].done);
    }

    #[test]
    fn test_advance_blocked_leaves_record_untouched() {
        let mut p = new_pratica(Tipo::Nuovo);
        p.ensure_action(ActionType::Sopralluogo);
        let before = p.clone();

        let err = p.advance().unwrap_err();
        assert!(matches!(err, AdvanceError::GateBlocked { fase: Fase::Sopralluogo, .. }));
        assert_eq!(p, before);
    }

    #[test]
    fn test_advance_moves_one_step() {
        let mut p = new_pratica(Tipo::Nuovo);
        complete_action(&mut p, ActionType::Sopralluogo);

        let next = p.advance().unwrap();
        assert_eq!(next.key, Fase::Misure);
        assert_eq!(p.fase, Fase::Misure);

        // misure not recorded yet
        assert!(p.advance().is_err());
        assert_eq!(p.fase, Fase::Misure);
    }

    #[test]
    fn test_full_riparazione_workflow() {
        let mut p = new_pratica(Tipo::Riparazione);
        complete_action(&mut p, ActionType::Sopralluogo);
        p.advance().unwrap();
        assert_eq!(p.fase, Fase::Riparazione);

        p.record(PhasePayload::Riparazione(Riparazione {
            descrizione: "Cerniera sostituita".to_string(),
            ..Default::default()
        }));
        p.advance().unwrap();
        assert_eq!(p.fase, Fase::Fattura);

        p.record(PhasePayload::Fattura(Fattura::default()));
        let err = p.advance().unwrap_err();
        assert_eq!(err, AdvanceError::AlreadyTerminal(Fase::Fattura));
        assert!(p.is_terminal());
    }

    #[test]
    fn test_advance_rejects_phase_outside_workflow() {
        let mut p = new_pratica(Tipo::Riparazione);
        p.fase = Fase::Posa;
        complete_action(&mut p, ActionType::Posa);

        let err = p.advance().unwrap_err();
        assert!(matches!(err, AdvanceError::InvalidPhase { tipo: Tipo::Riparazione, .. }));
        assert_eq!(p.fase, Fase::Posa);
    }

    #[test]
    fn test_record_json_shape() {
        let json = r#"{
            "id": "abc",
            "numero": "P-2024-0003",
            "tipo": "nuovo",
            "confermaOrdine": {"firmata": true},
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let p: Pratica = serde_json::from_str(json).unwrap();
        assert_eq!(p.fase, Fase::Sopralluogo);
        assert!(p.conferma_ordine.as_ref().is_some_and(|c| c.firmata));
        assert!(p.actions.is_empty());

        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["fase"], "sopralluogo");
        assert_eq!(value["confermaOrdine"]["firmata"], true);
        assert!(value.get("misure").is_none());
    }

    #[test]
    fn test_filter() {
        let p = new_pratica(Tipo::Riparazione);
        assert!(PraticaFilter::default().matches(&p));
        assert!(PraticaFilter { tipo: Some(Tipo::Riparazione), ..Default::default() }.matches(&p));
        assert!(!PraticaFilter { tipo: Some(Tipo::Nuovo), ..Default::default() }.matches(&p));
        assert!(!PraticaFilter { year: Some(2023), ..Default::default() }.matches(&p));
        assert!(PraticaFilter {
            fase: Some(vec![Fase::Posa, Fase::Sopralluogo]),
            year: Some(2024),
            ..Default::default()
        }
        .matches(&p));
    }

    #[test]
    fn test_payload_phase() {
        assert_eq!(PhasePayload::ConfermaOrdine(ConfermaOrdine::default()).phase(), Fase::Conferma);
        let payload: PhasePayload =
            serde_json::from_str(r#"{"kind":"fattura","data":{"numero":"12/2024"}}"#).unwrap();
        assert_eq!(payload.phase(), Fase::Fattura);
    }
}
