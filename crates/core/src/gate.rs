//! Phase gates - what must be true before a pratica leaves its phase.
//!
//! Checklist-gated phases (`sopralluogo`, `posa`) need every task of the
//! matching action done. Data-gated phases need their payload recorded;
//! `conferma` additionally needs the confirmation signed. Phases without a
//! gate, including unknown keys, never pass.

use crate::phase::Fase;
use crate::pratica::Pratica;
use crate::task::ActionType;

/// Result of evaluating the gate of the current phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The phase is complete
    Ready,

    /// The phase is not complete
    Blocked {
        /// What is still missing
        requirement: String,
    },
}

impl GateOutcome {
    /// Whether the gate passed.
    pub fn is_ready(&self) -> bool {
        matches!(self, GateOutcome::Ready)
    }

    fn blocked(requirement: impl Into<String>) -> Self {
        GateOutcome::Blocked {
            requirement: requirement.into(),
        }
    }

    fn when(ready: bool, requirement: &str) -> Self {
        if ready {
            GateOutcome::Ready
        } else {
            Self::blocked(requirement)
        }
    }
}

/// Evaluate the gate of the pratica's current phase. Never mutates the
/// pratica.
pub fn evaluate(pratica: &Pratica) -> GateOutcome {
    match &pratica.fase {
        Fase::Sopralluogo => checklist_gate(pratica, &ActionType::Sopralluogo),
        Fase::Posa => checklist_gate(pratica, &ActionType::Posa),
        Fase::Misure => GateOutcome::when(pratica.misure.is_some(), "misure not recorded"),
        Fase::Preventivo => {
            GateOutcome::when(pratica.preventivo.is_some(), "preventivo not recorded")
        }
        Fase::Conferma => match &pratica.conferma_ordine {
            Some(conferma) if conferma.firmata => GateOutcome::Ready,
            Some(_) => GateOutcome::blocked("conferma ordine not signed"),
            None => GateOutcome::blocked("conferma ordine not recorded"),
        },
        Fase::Riparazione => {
            GateOutcome::when(pratica.riparazione.is_some(), "riparazione not recorded")
        }
        Fase::Fattura => GateOutcome::when(pratica.fattura.is_some(), "fattura not recorded"),
        Fase::Unknown(key) => GateOutcome::blocked(format!("no gate for phase '{key}'")),
    }
}

/// Whether the pratica's current phase is complete.
pub fn can_advance(pratica: &Pratica) -> bool {
    evaluate(pratica).is_ready()
}

fn checklist_gate(pratica: &Pratica, action_type: &ActionType) -> GateOutcome {
    match pratica.action(action_type) {
        None => GateOutcome::blocked(format!("no {action_type} action")),
        Some(azione) if azione.is_complete() => GateOutcome::Ready,
        Some(azione) => {
            let open = azione.tasks.iter().filter(|t| !t.done).count();
            GateOutcome::blocked(format!("{open} {action_type} task(s) still open"))
        }
    }
}
