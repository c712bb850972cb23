//! Pratiche CLI - track window installation and repair cases.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use pratiche_core::{
    date_label, ActionType, Cliente, Fase, GateOutcome, PhasePayload, Pratica, PraticaFilter,
    PraticaId, PraticaNum, Tipo,
};
use pratiche_storage::{JsonStorage, Storage};
use pratiche_work::{BasicCaseManager, CaseManager, CaseSpec};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pratiche")]
#[command(about = "Track window installation and repair cases", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

/// Runtime settings.
#[derive(clap::Args, Debug, Clone)]
struct Settings {
    /// Data directory
    #[arg(long, env = "PRATICHE_DIR", default_value = ".pratiche", global = true)]
    data_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a new pratica
    New {
        /// Customer name
        #[arg(long)]
        cliente: String,
        /// Workflow type (nuovo or riparazione)
        #[arg(long, default_value = "nuovo")]
        tipo: String,
        /// Customer phone
        #[arg(long)]
        telefono: Option<String>,
        /// Site address
        #[arg(long)]
        indirizzo: Option<String>,
        /// Notes
        #[arg(long)]
        note: Option<String>,
    },
    /// List pratiche
    List {
        /// Filter by workflow type
        #[arg(long)]
        tipo: Option<String>,
        /// Filter by phase
        #[arg(long)]
        fase: Option<String>,
        /// Filter by year
        #[arg(long)]
        year: Option<i32>,
    },
    /// Show a pratica
    Show {
        /// Id or display number (P-YYYY-NNNN)
        pratica: String,
    },
    /// Show the phases of a workflow
    Workflow {
        /// Workflow type
        #[arg(default_value = "nuovo")]
        tipo: String,
    },
    /// Start an action and its checklist
    Action {
        /// Id or display number
        pratica: String,
        /// Action type (sopralluogo, misure, posa, riparazione, preventivo, followup)
        action_type: String,
        /// Scheduled date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Tick a checklist item
    Task {
        /// Id or display number
        pratica: String,
        /// Action type
        action_type: String,
        /// Task number, starting at 1
        number: usize,
        /// Mark as not done
        #[arg(long)]
        undo: bool,
    },
    /// Record phase data from JSON
    Record {
        /// Id or display number
        pratica: String,
        /// Payload kind
        kind: PayloadKind,
        /// Payload as JSON
        json: String,
    },
    /// Mark the order confirmation as signed
    Sign {
        /// Id or display number
        pratica: String,
    },
    /// Move a pratica to its next phase
    Advance {
        /// Id or display number
        pratica: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PayloadKind {
    Misure,
    Preventivo,
    Conferma,
    Fattura,
    Riparazione,
}

impl PayloadKind {
    fn tag(self) -> &'static str {
        match self {
            PayloadKind::Misure => "misure",
            PayloadKind::Preventivo => "preventivo",
            PayloadKind::Conferma => "confermaOrdine",
            PayloadKind::Fattura => "fattura",
            PayloadKind::Riparazione => "riparazione",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!("Using data directory {}", cli.settings.data_dir.display());

    let storage = JsonStorage::new(&cli.settings.data_dir)
        .await
        .with_context(|| format!("opening {}", cli.settings.data_dir.display()))?;
    let mut manager = BasicCaseManager::new(storage);

    match cli.command {
        Commands::New { cliente, tipo, telefono, indirizzo, note } => {
            let pratica = manager
                .open_case(CaseSpec {
                    tipo: Tipo::parse_lenient(&tipo),
                    cliente: Cliente { nome: cliente, telefono, indirizzo },
                    note,
                })
                .await?;
            println!("Opened {} ({}) - id {}", pratica.numero, pratica.tipo, pratica.id);
        }
        Commands::List { tipo, fase, year } => {
            let filter = PraticaFilter {
                tipo: tipo.as_deref().map(Tipo::parse_lenient),
                fase: fase.map(|f| vec![Fase::from(f)]),
                year,
            };
            let pratiche = manager.storage().list_pratiche(&filter).await?;

            println!("Pratiche ({})", pratiche.len());
            for p in pratiche {
                let phase = p
                    .current_phase()
                    .map(|d| format!("{} {}", d.icon, d.label))
                    .unwrap_or_else(|| format!("?? {}", p.fase));
                println!("  {} | {:<11} | {:<20} | {}", p.numero, p.tipo, phase, p.cliente.nome);
            }
        }
        Commands::Show { pratica } => {
            let id = resolve(&manager, &pratica).await?;
            let p = manager.get_case(&id).await?;
            let status = manager.status(&id).await?;
            print_pratica(&p);
            match status.gate {
                GateOutcome::Ready if status.terminal => println!("  Gate: complete (last phase)"),
                GateOutcome::Ready => println!("  Gate: ready to advance"),
                GateOutcome::Blocked { requirement } => println!("  Gate: {}", requirement),
            }
        }
        Commands::Workflow { tipo } => {
            let tipo = Tipo::parse_lenient(&tipo);
            println!("Workflow {}", tipo);
            for (i, phase) in tipo.workflow().phases.iter().enumerate() {
                println!("  {}. {} {} [{}] {}", i + 1, phase.icon, phase.label, phase.key, phase.color);
            }
        }
        Commands::Action { pratica, action_type, date } => {
            let id = resolve(&manager, &pratica).await?;
            let azione = manager
                .start_action(&id, ActionType::from(action_type), date)
                .await?;
            println!("{} ({} task(s))", azione.action_type, azione.tasks.len());
            for (i, task) in azione.tasks.iter().enumerate() {
                println!("  {}. [{}] {}", i + 1, if task.done { "x" } else { " " }, task.text);
            }
        }
        Commands::Task { pratica, action_type, number, undo } => {
            let id = resolve(&manager, &pratica).await?;
            let index = number
                .checked_sub(1)
                .context("task numbers start at 1")?;
            let azione = manager
                .set_task_done(&id, &ActionType::from(action_type), index, !undo)
                .await?;
            println!("{}: {}%", azione.action_type, azione.progress());
        }
        Commands::Record { pratica, kind, json } => {
            let id = resolve(&manager, &pratica).await?;
            let data: serde_json::Value =
                serde_json::from_str(&json).context("payload is not valid JSON")?;
            let payload: PhasePayload =
                serde_json::from_value(serde_json::json!({ "kind": kind.tag(), "data": data }))
                    .with_context(|| format!("payload does not describe {}", kind.tag()))?;
            let p = manager.record_payload(&id, payload).await?;
            println!("Recorded {} on {}", kind.tag(), p.numero);
        }
        Commands::Sign { pratica } => {
            let id = resolve(&manager, &pratica).await?;
            let p = manager.sign_order(&id).await?;
            println!("Conferma ordine signed on {}", p.numero);
        }
        Commands::Advance { pratica } => {
            let id = resolve(&manager, &pratica).await?;
            let next = manager.advance(&id).await?;
            println!("Now in {} {}", next.icon, next.label);
        }
    }

    Ok(())
}

/// Accept either a display number or a raw id.
async fn resolve<S: Storage + 'static>(
    manager: &BasicCaseManager<S>,
    reference: &str,
) -> Result<PraticaId> {
    match reference.parse::<PraticaNum>() {
        Ok(numero) => manager
            .storage()
            .find_by_numero(numero)
            .await?
            .map(|p| p.id)
            .with_context(|| format!("no pratica {}", numero)),
        Err(_) => Ok(PraticaId::from(reference)),
    }
}

fn print_pratica(p: &Pratica) {
    println!("Pratica {} ({})", p.numero, p.tipo);
    println!("  Id: {}", p.id);
    println!("  Cliente: {}", p.cliente.nome);
    if let Some(telefono) = &p.cliente.telefono {
        println!("  Telefono: {}", telefono);
    }
    if let Some(indirizzo) = &p.cliente.indirizzo {
        println!("  Indirizzo: {}", indirizzo);
    }
    if let Some(note) = &p.note {
        println!("  Note: {}", note);
    }

    let current = p.phase_index();
    println!("  Phases:");
    for (i, phase) in p.workflow().phases.iter().enumerate() {
        let marker = match current {
            Some(c) if i < c => "✓",
            Some(c) if i == c => "→",
            _ => " ",
        };
        println!("    {} {} {}", marker, phase.icon, phase.label);
    }
    if current.is_none() {
        println!("    !! phase '{}' is not part of this workflow", p.fase);
    }

    if !p.actions.is_empty() {
        println!("  Actions:");
        for a in &p.actions {
            let when = a
                .data
                .map(|d| date_label(&d.format("%Y-%m-%d").to_string()))
                .unwrap_or_default();
            println!("    {:<12} {:>3}% {}", a.action_type.as_str(), a.progress(), when);
        }
    }

    let recorded: Vec<&str> = [
        ("misure", p.misure.is_some()),
        ("preventivo", p.preventivo.is_some()),
        ("conferma", p.conferma_ordine.is_some()),
        ("riparazione", p.riparazione.is_some()),
        ("fattura", p.fattura.is_some()),
    ]
    .into_iter()
    .filter_map(|(name, present)| present.then_some(name))
    .collect();
    if !recorded.is_empty() {
        println!("  Recorded: {}", recorded.join(", "));
    }
}
