//! Workflow catalog - the ordered phase lists for each kind of pratica.

use serde::{Deserialize, Serialize};

use crate::phase::{Fase, PhaseDescriptor};

/// Kind of pratica, selecting its workflow.
///
/// Any value other than `"riparazione"` decodes as [`Tipo::Nuovo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tipo {
    /// New installation
    #[default]
    Nuovo,
    /// Repair
    Riparazione,
}

impl Tipo {
    /// Resolve a workflow type string, falling back to [`Tipo::Nuovo`].
    pub fn parse_lenient(tipo: &str) -> Self {
        match tipo {
            "riparazione" => Tipo::Riparazione,
            "nuovo" => Tipo::Nuovo,
            other => {
                tracing::debug!(tipo = other, "unknown workflow type, using nuovo");
                Tipo::Nuovo
            }
        }
    }

    /// Key as stored in case records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tipo::Nuovo => "nuovo",
            Tipo::Riparazione => "riparazione",
        }
    }

    /// The workflow for this kind of pratica.
    pub fn workflow(self) -> &'static Workflow {
        match self {
            Tipo::Nuovo => &NUOVO,
            Tipo::Riparazione => &RIPARAZIONE,
        }
    }
}

impl From<String> for Tipo {
    fn from(s: String) -> Self {
        Tipo::parse_lenient(&s)
    }
}

impl From<Tipo> for String {
    fn from(tipo: Tipo) -> Self {
        tipo.as_str().to_string()
    }
}

impl std::fmt::Display for Tipo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence of phases.
#[derive(Debug, PartialEq, Eq)]
pub struct Workflow {
    /// Which kind of pratica follows this workflow
    pub tipo: Tipo,

    /// Phases, first to last
    pub phases: &'static [PhaseDescriptor],
}

impl Workflow {
    /// Position of `fase` in this workflow, or `None` when the phase does not
    /// belong to it. `None` means the record is in an invalid state.
    pub fn phase_index(&self, fase: &Fase) -> Option<usize> {
        self.phases.iter().position(|p| &p.key == fase)
    }

    /// Descriptor of `fase`, if part of this workflow.
    pub fn descriptor(&self, fase: &Fase) -> Option<&'static PhaseDescriptor> {
        let phases: &'static [PhaseDescriptor] = self.phases;
        phases.iter().find(|p| &p.key == fase)
    }

    /// The phase following `fase`. `None` for the last phase or a phase
    /// outside this workflow.
    pub fn next_after(&self, fase: &Fase) -> Option<&'static PhaseDescriptor> {
        let phases: &'static [PhaseDescriptor] = self.phases;
        self.phase_index(fase).and_then(|i| phases.get(i + 1))
    }

    /// Whether `fase` is the last phase of this workflow.
    pub fn is_terminal(&self, fase: &Fase) -> bool {
        self.phases.last().is_some_and(|p| &p.key == fase)
    }

    /// Phase keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &Fase> + '_ {
        self.phases.iter().map(|p| &p.key)
    }

    /// Number of phases.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Always false; every catalog workflow has phases.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

const SOPRALLUOGO: PhaseDescriptor = PhaseDescriptor {
    key: Fase::Sopralluogo,
    label: "Sopralluogo",
    icon: "🔍",
    color: "#3b82f6",
};

const FATTURA: PhaseDescriptor = PhaseDescriptor {
    key: Fase::Fattura,
    label: "Fattura",
    icon: "🧾",
    color: "#10b981",
};

static NUOVO_PHASES: [PhaseDescriptor; 6] = [
    SOPRALLUOGO,
    PhaseDescriptor {
        key: Fase::Misure,
        label: "Misure",
        icon: "📏",
        color: "#8b5cf6",
    },
    PhaseDescriptor {
        key: Fase::Preventivo,
        label: "Preventivo",
        icon: "💰",
        color: "#f59e0b",
    },
    PhaseDescriptor {
        key: Fase::Conferma,
        label: "Conferma Ordine",
        icon: "✍️",
        color: "#ec4899",
    },
    FATTURA,
    PhaseDescriptor {
        key: Fase::Posa,
        label: "Posa",
        icon: "🔨",
        color: "#ef4444",
    },
];

static RIPARAZIONE_PHASES: [PhaseDescriptor; 3] = [
    SOPRALLUOGO,
    PhaseDescriptor {
        key: Fase::Riparazione,
        label: "Riparazione",
        icon: "🔧",
        color: "#f97316",
    },
    FATTURA,
];

/// New installation workflow.
pub static NUOVO: Workflow = Workflow {
    tipo: Tipo::Nuovo,
    phases: &NUOVO_PHASES,
};

/// Repair workflow.
pub static RIPARAZIONE: Workflow = Workflow {
    tipo: Tipo::Riparazione,
    phases: &RIPARAZIONE_PHASES,
};

/// Workflow for a type string: repair for `"riparazione"`, new installation
/// for anything else.
pub fn workflow(tipo: &str) -> &'static Workflow {
    Tipo::parse_lenient(tipo).workflow()
}

/// Position of phase `fase` in the workflow selected by `tipo`.
pub fn phase_index(tipo: &str, fase: &str) -> Option<usize> {
    workflow(tipo).phase_index(&Fase::from(fase))
}
