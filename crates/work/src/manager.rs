//! Case management service.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use pratiche_core::{
    evaluate, gen_pratica_num, ActionType, AdvanceError, Azione, Cliente, Fase, GateOutcome,
    PhaseDescriptor, PhasePayload, Pratica, PraticaId, PraticaNum, Tipo,
};
use pratiche_storage::{Storage, StorageError};
use tracing::{debug, info};

/// Errors from case management.
#[derive(Debug, thiserror::Error)]
pub enum WorkError {
    /// Storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No pratica with this id
    #[error("pratica {0} not found")]
    NotFound(PraticaId),

    /// The pratica has no action of this type
    #[error("pratica {id} has no {action_type} action")]
    NoSuchAction {
        /// Pratica
        id: PraticaId,
        /// Requested action type
        action_type: ActionType,
    },

    /// Checklist index out of range
    #[error("{action_type} has {len} task(s), no task #{index}")]
    TaskOutOfRange {
        /// Action type
        action_type: ActionType,
        /// Requested index
        index: usize,
        /// Checklist length
        len: usize,
    },

    /// `sign_order` without a recorded order confirmation
    #[error("pratica {0} has no conferma ordine to sign")]
    OrderNotRecorded(PraticaId),

    /// The phase could not be advanced
    #[error(transparent)]
    Advance(#[from] AdvanceError),
}

/// Result type for case management.
pub type Result<T> = std::result::Result<T, WorkError>;

/// Case management service.
#[async_trait]
pub trait CaseManager: Send + Sync {
    /// Open a new pratica with the next display number of the current year.
    async fn open_case(&mut self, spec: CaseSpec) -> Result<Pratica>;

    /// Load a pratica.
    async fn get_case(&self, id: &PraticaId) -> Result<Pratica>;

    /// Start an action, instantiating its checklist from the task catalog.
    /// An existing action of the same type is returned as is.
    async fn start_action(
        &mut self,
        id: &PraticaId,
        action_type: ActionType,
        data: Option<NaiveDate>,
    ) -> Result<Azione>;

    /// Mark one checklist item done or open.
    async fn set_task_done(
        &mut self,
        id: &PraticaId,
        action_type: &ActionType,
        index: usize,
        done: bool,
    ) -> Result<Azione>;

    /// Record the payload of a data-gated phase.
    async fn record_payload(&mut self, id: &PraticaId, payload: PhasePayload) -> Result<Pratica>;

    /// Mark the recorded order confirmation as signed.
    async fn sign_order(&mut self, id: &PraticaId) -> Result<Pratica>;

    /// Move the pratica to its next phase.
    async fn advance(&mut self, id: &PraticaId) -> Result<&'static PhaseDescriptor>;

    /// Summarize where a pratica stands.
    async fn status(&self, id: &PraticaId) -> Result<CaseStatus>;
}

/// Specification for opening a pratica.
#[derive(Debug, Clone, Default)]
pub struct CaseSpec {
    /// Workflow type
    pub tipo: Tipo,
    /// Customer
    pub cliente: Cliente,
    /// Notes
    pub note: Option<String>,
}

/// Progress of one action's checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionProgress {
    /// Action type
    pub action_type: ActionType,
    /// Done tasks
    pub done: usize,
    /// All tasks
    pub total: usize,
    /// Completion, 0..=100
    pub percentage: u8,
}

/// Where a pratica stands in its workflow.
#[derive(Debug, Clone)]
pub struct CaseStatus {
    /// Pratica id
    pub id: PraticaId,
    /// Display number
    pub numero: PraticaNum,
    /// Workflow type
    pub tipo: Tipo,
    /// Current phase
    pub fase: Fase,
    /// Position of the phase, `None` if the record is invalid
    pub phase_index: Option<usize>,
    /// Number of phases in the workflow
    pub total_phases: usize,
    /// Gate of the current phase
    pub gate: GateOutcome,
    /// Whether the current phase is the last
    pub terminal: bool,
    /// Checklist progress per action
    pub actions: Vec<ActionProgress>,
}

/// Configuration for the case manager.
#[derive(Debug, Clone, Default)]
pub struct ManagerConfig {
    /// Use this date instead of the local clock for numbering and
    /// signatures.
    pub fixed_date: Option<NaiveDate>,
}

/// Case manager backed by a [`Storage`].
pub struct BasicCaseManager<S: Storage> {
    storage: S,
    config: ManagerConfig,
}

impl<S: Storage> BasicCaseManager<S> {
    /// Create a new case manager.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: ManagerConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn today(&self) -> NaiveDate {
        self.config
            .fixed_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    async fn load(&self, id: &PraticaId) -> Result<Pratica> {
        self.storage
            .load_pratica(id)
            .await?
            .ok_or_else(|| WorkError::NotFound(id.clone()))
    }

    async fn save(&mut self, pratica: &mut Pratica) -> Result<()> {
        pratica.updated_at = chrono::Utc::now();
        self.storage.save_pratica(pratica).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: Storage + 'static> CaseManager for BasicCaseManager<S> {
    async fn open_case(&mut self, spec: CaseSpec) -> Result<Pratica> {
        let year = self.today().year();
        let seq = self.storage.next_sequence(year).await?;

        let mut pratica = Pratica::new(
            PraticaId::new(),
            PraticaNum::new(year, seq),
            spec.tipo,
            spec.cliente,
        );
        pratica.note = spec.note;

        self.storage.save_pratica(&pratica).await?;
        info!(
            "Opened pratica {} ({}) for {}",
            gen_pratica_num(year, seq),
            pratica.tipo,
            pratica.cliente.nome
        );
        Ok(pratica)
    }

    async fn get_case(&self, id: &PraticaId) -> Result<Pratica> {
        self.load(id).await
    }

    async fn start_action(
        &mut self,
        id: &PraticaId,
        action_type: ActionType,
        data: Option<NaiveDate>,
    ) -> Result<Azione> {
        let mut pratica = self.load(id).await?;
        if let Some(existing) = pratica.action(&action_type) {
            debug!("Pratica {} already has a {} action", pratica.numero, action_type);
            return Ok(existing.clone());
        }

        let azione = pratica.ensure_action(action_type);
        azione.data = data;
        let azione = azione.clone();

        self.save(&mut pratica).await?;
        info!(
            "Started {} on {} with {} task(s)",
            azione.action_type,
            pratica.numero,
            azione.tasks.len()
        );
        Ok(azione)
    }

    async fn set_task_done(
        &mut self,
        id: &PraticaId,
        action_type: &ActionType,
        index: usize,
        done: bool,
    ) -> Result<Azione> {
        let mut pratica = self.load(id).await?;
        let azione = pratica
            .action_mut(action_type)
            .ok_or_else(|| WorkError::NoSuchAction {
                id: id.clone(),
                action_type: action_type.clone(),
            })?;
        if !azione.set_done(index, done) {
            return Err(WorkError::TaskOutOfRange {
                action_type: action_type.clone(),
                index,
                len: azione.tasks.len(),
            });
        }
        let azione = azione.clone();

        self.save(&mut pratica).await?;
        debug!(
            "{} {} task #{} -> {} ({}%)",
            pratica.numero,
            action_type,
            index,
            done,
            azione.progress()
        );
        Ok(azione)
    }

    async fn record_payload(&mut self, id: &PraticaId, payload: PhasePayload) -> Result<Pratica> {
        let mut pratica = self.load(id).await?;
        let phase = payload.phase();
        pratica.record(payload);

        self.save(&mut pratica).await?;
        info!("Recorded {} on {}", phase, pratica.numero);
        Ok(pratica)
    }

    async fn sign_order(&mut self, id: &PraticaId) -> Result<Pratica> {
        let today = self.today();
        let mut pratica = self.load(id).await?;
        let conferma = pratica
            .conferma_ordine
            .as_mut()
            .ok_or_else(|| WorkError::OrderNotRecorded(id.clone()))?;
        conferma.firmata = true;
        conferma.firmata_il = Some(today);

        self.save(&mut pratica).await?;
        info!("Conferma ordine signed on {}", pratica.numero);
        Ok(pratica)
    }

    async fn advance(&mut self, id: &PraticaId) -> Result<&'static PhaseDescriptor> {
        let mut pratica = self.load(id).await?;
        let from = pratica.fase.clone();

        let next = match pratica.advance() {
            Ok(next) => next,
            Err(e) => {
                debug!("Pratica {} stays in {}: {}", pratica.numero, from, e);
                return Err(e.into());
            }
        };

        self.storage.save_pratica(&pratica).await?;
        info!("Pratica {} advanced {} -> {}", pratica.numero, from, next.key);
        Ok(next)
    }

    async fn status(&self, id: &PraticaId) -> Result<CaseStatus> {
        let pratica = self.load(id).await?;
        let workflow = pratica.workflow();

        let actions = pratica
            .actions
            .iter()
            .map(|a| ActionProgress {
                action_type: a.action_type.clone(),
                done: a.tasks.iter().filter(|t| t.done).count(),
                total: a.tasks.len(),
                percentage: a.progress(),
            })
            .collect();

        Ok(CaseStatus {
            phase_index: pratica.phase_index(),
            total_phases: workflow.len(),
            gate: evaluate(&pratica),
            terminal: pratica.is_terminal(),
            id: pratica.id,
            numero: pratica.numero,
            tipo: pratica.tipo,
            fase: pratica.fase,
            actions,
        })
    }
}
