//! Scripted sessions.
//!
//! A script is a JSON array of actions that drive a `WizardSession` the same
//! way a front-end would:
//!
//! ```json
//! [
//!   { "action": "set-single", "slot": "exhaust", "option": "cat-back" },
//!   { "action": "set-field", "name": "terms_accepted", "value": { "kind": "flag", "value": true } },
//!   { "action": "advance" }
//! ]
//! ```

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::error::{Result, WizardError};
use crate::selection::FieldValue;
use crate::session::WizardSession;

/// One user interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    SetSingle {
        slot: String,
        #[serde(default)]
        option: Option<String>,
    },
    ToggleMulti { slot: String, option: String },
    SetField { name: String, value: FieldValue },
    ClearField { name: String },
    Advance,
    Retreat,
    Reset,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetSingle { .. } => "set-single",
            Action::ToggleMulti { .. } => "toggle-multi",
            Action::SetField { .. } => "set-field",
            Action::ClearField { .. } => "clear-field",
            Action::Advance => "advance",
            Action::Retreat => "retreat",
            Action::Reset => "reset",
        }
    }

    pub fn apply(&self, session: &mut WizardSession) -> Result<()> {
        match self {
            Action::SetSingle { slot, option } => {
                session.set_single(slot, option.as_deref())?;
            }
            Action::ToggleMulti { slot, option } => {
                session.toggle_multi(slot, option)?;
            }
            Action::SetField { name, value } => session.set_field(name, value.clone())?,
            Action::ClearField { name } => session.clear_field(name)?,
            Action::Advance => {
                session.advance()?;
            }
            Action::Retreat => {
                session.retreat()?;
            }
            Action::Reset => session.reset()?,
        }
        Ok(())
    }
}

/// A script stopped at a failing action
#[derive(Debug, Error)]
#[error("action #{} ({action}) failed: {source}", .index + 1)]
pub struct ReplayError {
    /// Zero-based position in the script
    pub index: usize,
    pub action: &'static str,
    #[source]
    pub source: WizardError,
}

/// Apply every action in order, stopping at the first failure
pub fn replay(
    session: &mut WizardSession,
    actions: &[Action],
) -> std::result::Result<(), ReplayError> {
    for (index, action) in actions.iter().enumerate() {
        debug!(index, action = action.name(), "Replaying action");
        action.apply(session).map_err(|source| ReplayError {
            index,
            action: action.name(),
            source,
        })?;
    }
    Ok(())
}

/// Read a script file
pub fn load_script<P: AsRef<Path>>(path: P) -> AnyResult<Vec<Action>> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read script from {:?}", path.as_ref()))?;

    serde_json::from_str(&content).context("Failed to parse script JSON")
}
