//! Action and task model - scheduled activities and their checklists.

use serde::{Deserialize, Serialize};

use crate::checklist;
use crate::id::gid;
use crate::progress::progress;

/// Kind of action. Checklist-gated phases look up the action with the same
/// key as the phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    /// On-site survey
    Sopralluogo,
    /// Measurement visit
    Misure,
    /// Installation
    Posa,
    /// Repair visit
    Riparazione,
    /// Quote preparation
    Preventivo,
    /// After-sales follow-up call
    Followup,
    /// Any key not listed above
    Other(String),
}

impl ActionType {
    /// Every action type with a catalog checklist.
    pub const KNOWN: [ActionType; 6] = [
        ActionType::Sopralluogo,
        ActionType::Misure,
        ActionType::Posa,
        ActionType::Riparazione,
        ActionType::Preventivo,
        ActionType::Followup,
    ];

    /// The key as stored in case records.
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Sopralluogo => "sopralluogo",
            ActionType::Misure => "misure",
            ActionType::Posa => "posa",
            ActionType::Riparazione => "riparazione",
            ActionType::Preventivo => "preventivo",
            ActionType::Followup => "followup",
            ActionType::Other(key) => key,
        }
    }
}

impl From<&str> for ActionType {
    fn from(key: &str) -> Self {
        match key {
            "sopralluogo" => ActionType::Sopralluogo,
            "misure" => ActionType::Misure,
            "posa" => ActionType::Posa,
            "riparazione" => ActionType::Riparazione,
            "preventivo" => ActionType::Preventivo,
            "followup" => ActionType::Followup,
            other => ActionType::Other(other.to_string()),
        }
    }
}

impl From<String> for ActionType {
    fn from(key: String) -> Self {
        ActionType::from(key.as_str())
    }
}

impl From<ActionType> for String {
    fn from(action: ActionType) -> Self {
        match action {
            ActionType::Other(key) => key,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    /// What has to be done
    #[serde(default)]
    pub text: String,

    /// Whether it is done
    #[serde(default)]
    pub done: bool,
}

impl TaskItem {
    /// Create an open task.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }
}

/// An activity tied to a phase, holding a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Azione {
    /// Local id
    #[serde(default = "gid")]
    pub id: String,

    /// Action key
    #[serde(rename = "type")]
    pub action_type: ActionType,

    /// Checklist, in catalog order
    #[serde(default)]
    pub tasks: Vec<TaskItem>,

    /// Scheduled date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<chrono::NaiveDate>,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Azione {
    /// Create an action with its checklist instantiated from the task
    /// catalog.
    pub fn from_catalog(action_type: ActionType) -> Self {
        let tasks = checklist::lookup(&action_type)
            .iter()
            .map(|text| TaskItem::new(*text))
            .collect();
        Self {
            id: gid(),
            action_type,
            tasks,
            data: None,
            note: None,
        }
    }

    /// Schedule the action.
    pub fn with_date(mut self, data: chrono::NaiveDate) -> Self {
        self.data = Some(data);
        self
    }

    /// Checklist completion, 0..=100.
    pub fn progress(&self) -> u8 {
        progress(&self.tasks)
    }

    /// Whether every checklist item is done. An empty checklist counts as
    /// complete.
    pub fn is_complete(&self) -> bool {
        self.tasks.iter().all(|t| t.done)
    }

    /// Set the done flag of one item. Returns `false` if `index` is out of
    /// range.
    pub fn set_done(&mut self, index: usize, done: bool) -> bool {
        match self.tasks.get_mut(index) {
            Some(task) => {
                task.done = done;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_catalog_instantiates_open_tasks() {
        let azione = Azione::from_catalog(ActionType::Sopralluogo);
        assert_eq!(azione.tasks.len(), checklist::lookup(&ActionType::Sopralluogo).len());
        assert!(azione.tasks.iter().all(|t| !t.done));
        assert_eq!(azione.tasks[0].text, checklist::lookup_str("sopralluogo")[0]);
        assert_eq!(azione.progress(), 0);
        assert!(!azione.id.is_empty());
    }

    #[test]
    fn test_set_done() {
        let mut azione = Azione::from_catalog(ActionType::Followup);
        assert!(azione.set_done(0, true));
        assert!(azione.tasks[0].done);
        assert!(!azione.set_done(99, true));
        assert!(!azione.is_complete());

        for i in 0..azione.tasks.len() {
            azione.set_done(i, true);
        }
        assert!(azione.is_complete());
        assert_eq!(azione.progress(), 100);
    }

    #[test]
    fn test_unknown_action_has_empty_checklist() {
        let azione = Azione::from_catalog(ActionType::from("collaudo"));
        assert!(azione.tasks.is_empty());
        assert_eq!(azione.action_type.as_str(), "collaudo");
    }

    #[test]
    fn test_action_json_shape() {
        let json = r#"{"type":"posa","tasks":[{"text":"a","done":true},{"done":false}]}"#;
        let azione: Azione = serde_json::from_str(json).unwrap();
        assert_eq!(azione.action_type, ActionType::Posa);
        assert_eq!(azione.tasks.len(), 2);
        assert!(!azione.id.is_empty());

        let value = serde_json::to_value(&azione).unwrap();
        assert_eq!(value["type"], "posa");
        assert_eq!(value["tasks"][1]["done"], false);
    }
}
