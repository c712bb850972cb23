//! Case management
//!
//! Opening pratiche, working their checklists, recording phase data, and
//! moving them through their workflow.

#![warn(missing_docs)]

pub mod manager;

pub use manager::{
    ActionProgress, BasicCaseManager, CaseManager, CaseSpec, CaseStatus, ManagerConfig, Result,
    WorkError,
};
