//! Validated, immutable board configuration.
//!
//! A [`ConfigSnapshot`] is built once from a [`BoardConfig`] (or its two
//! halves) and never mutated afterwards. Construction enforces the structural
//! invariants the rest of the system relies on:
//!
//! - action and page identifiers are unique
//! - button identifiers are unique within their page
//! - every button references a declared action
//! - grid pages have at least one column
//!
//! Whether each declared action can actually be resolved to a handler is a
//! separate check performed by the action registry.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::board::{ActionDefinition, ActionsConfig, BoardConfig, ButtonConfig, PageConfig, UiConfig};

/// Structural validation failure of a board configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// Two action definitions share an ID.
    #[error("duplicate action id '{action_id}'")]
    DuplicateAction {
        /// The repeated ID.
        action_id: String,
    },

    /// Two pages share an ID.
    #[error("duplicate page id '{page_id}'")]
    DuplicatePage {
        /// The repeated ID.
        page_id: String,
    },

    /// Two buttons on the same page share an ID.
    #[error("duplicate button id '{button_id}' on page '{page_id}'")]
    DuplicateButton {
        /// Page holding both buttons.
        page_id: String,
        /// The repeated ID.
        button_id: String,
    },

    /// A button references an action that is not declared.
    #[error("button '{button_id}' references unknown action '{action_id}'")]
    UnknownAction {
        /// Offending button.
        button_id: String,
        /// Undeclared action.
        action_id: String,
    },

    /// A page declares zero grid columns.
    #[error("page '{page_id}' must have at least one grid column")]
    InvalidGridColumns {
        /// Offending page.
        page_id: String,
    },
}

/// An immutable, validated board configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConfigSnapshot {
    ui: UiConfig,
    actions: BTreeMap<String, ActionDefinition>,
}

impl ConfigSnapshot {
    /// Validate and build a snapshot from the two configuration documents.
    pub fn new(ui: UiConfig, actions: ActionsConfig) -> Result<Self, SnapshotError> {
        let mut action_map = BTreeMap::new();
        for def in actions.actions {
            if action_map.contains_key(&def.id) {
                return Err(SnapshotError::DuplicateAction { action_id: def.id });
            }
            let _ = action_map.insert(def.id.clone(), def);
        }

        let mut page_ids = HashSet::new();
        for page in &ui.pages {
            if !page_ids.insert(page.id.as_str()) {
                return Err(SnapshotError::DuplicatePage {
                    page_id: page.id.clone(),
                });
            }
            if page.grid_columns == 0 {
                return Err(SnapshotError::InvalidGridColumns {
                    page_id: page.id.clone(),
                });
            }
            let mut button_ids = HashSet::new();
            for button in &page.buttons {
                if !button_ids.insert(button.id.as_str()) {
                    return Err(SnapshotError::DuplicateButton {
                        page_id: page.id.clone(),
                        button_id: button.id.clone(),
                    });
                }
                if !action_map.contains_key(&button.action_id) {
                    return Err(SnapshotError::UnknownAction {
                        button_id: button.id.clone(),
                        action_id: button.action_id.clone(),
                    });
                }
            }
        }

        Ok(Self {
            ui,
            actions: action_map,
        })
    }

    /// Pages in navigation order.
    pub fn pages(&self) -> &[PageConfig] {
        &self.ui.pages
    }

    /// The UI document.
    pub fn ui(&self) -> &UiConfig {
        &self.ui
    }

    /// Action definitions keyed by action ID.
    pub fn actions(&self) -> &BTreeMap<String, ActionDefinition> {
        &self.actions
    }

    /// Find a button and its page. A button ID repeated across pages
    /// resolves to its first occurrence in page order.
    pub fn find_button(&self, button_id: &str) -> Option<(&PageConfig, &ButtonConfig)> {
        self.ui.find_button(button_id)
    }
}

impl TryFrom<BoardConfig> for ConfigSnapshot {
    type Error = SnapshotError;

    fn try_from(config: BoardConfig) -> Result<Self, Self::Error> {
        Self::new(config.ui_config, config.actions_config)
    }
}
