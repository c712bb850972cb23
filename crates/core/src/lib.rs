//! Pratiche core data models.
//!
//! This crate defines the case record, the two workflows it can follow, the
//! gates that decide when a phase is complete, and the small formatting
//! helpers (identifiers, progress, dates) built on top of them.

#![warn(missing_docs)]

// Identities
mod id;

// Workflow
mod phase;
mod workflow;
mod gate;

// Cases and their checklists
mod pratica;
mod task;
pub mod checklist;
mod progress;

// Formatting
pub mod date;

// Re-exports
pub use id::*;

pub use phase::{Fase, PhaseDescriptor};
pub use workflow::{phase_index, workflow, Tipo, Workflow, NUOVO, RIPARAZIONE};
pub use gate::{can_advance, evaluate, GateOutcome};

pub use pratica::{
    AdvanceError, Cliente, ConfermaOrdine, Fattura, Misure, PhasePayload, Pratica, PraticaFilter, Preventivo,
    Riparazione, Vano,
};
pub use task::{ActionType, Azione, TaskItem};
pub use progress::progress;

pub use date::{date_label, fmt_date};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
