//! Board configuration model.
//!
//! These types mirror the two configuration documents the board is driven by:
//! the UI document (`pages` of `buttons`) and the actions document (action
//! definitions naming a handler by module and function). Field names are
//! `snake_case` on the wire.
//!
//! Optional collections and counts accept an explicit `null` as "use the
//! default". The types here are unvalidated input. [`ConfigSnapshot`] is the
//! validated form that the rest of the system works with.
//!
//! [`ConfigSnapshot`]: crate::snapshot::ConfigSnapshot

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{DEFAULT_GRID_COLUMNS, DEFAULT_LAYOUT};
use crate::params::ActionParams;

/// A single interactive control on a page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonConfig {
    /// Button identifier, unique within its page.
    pub id: String,
    /// Label rendered on the button.
    pub text: String,
    /// Icon class (e.g. `"fas fa-rocket"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_class: Option<String>,
    /// Extra style class applied to the button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_class: Option<String>,
    /// Action executed when the button is pressed.
    pub action_id: String,
    /// Parameters passed to the action, merged over the action's defaults.
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_params: ActionParams,
    /// Optional URL the client may poll for content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_content_url: Option<String>,
}

/// A page of buttons.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Display name.
    pub name: String,
    /// Unique page identifier.
    pub id: String,
    /// Layout kind (`"grid"`, `"flex"`, ...).
    #[serde(default = "default_layout")]
    pub layout: String,
    /// Column count for grid layouts. Must be greater than zero.
    #[serde(default = "default_grid_columns", deserialize_with = "null_as_default_grid_columns")]
    pub grid_columns: u32,
    /// Buttons in display order.
    #[serde(default)]
    pub buttons: Vec<ButtonConfig>,
}

fn default_layout() -> String {
    DEFAULT_LAYOUT.to_owned()
}

fn default_grid_columns() -> u32 {
    DEFAULT_GRID_COLUMNS
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_grid_columns<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(DEFAULT_GRID_COLUMNS))
}

/// The UI document: ordered pages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Pages in navigation order.
    pub pages: Vec<PageConfig>,
}

impl UiConfig {
    /// Find a button by ID, returning it together with the page it lives on.
    ///
    /// Pages are searched in order; the first match wins.
    pub fn find_button(&self, button_id: &str) -> Option<(&PageConfig, &ButtonConfig)> {
        self.pages.iter().find_map(|page| {
            page.buttons
                .iter()
                .find(|b| b.id == button_id)
                .map(|button| (page, button))
        })
    }

    /// Iterate over every button on every page, in display order.
    pub fn buttons(&self) -> impl Iterator<Item = &ButtonConfig> {
        self.pages.iter().flat_map(|p| p.buttons.iter())
    }
}

/// Reference from an action identifier to a handler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Unique action identifier referenced by buttons.
    pub id: String,
    /// Handler location (catalog module name).
    pub module: String,
    /// Handler name within the module.
    pub function: String,
    /// Default parameters; button parameters override these per key.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "ActionParams::is_empty"
    )]
    pub default_params: ActionParams,
}

/// The actions document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// Action definitions.
    pub actions: Vec<ActionDefinition>,
}

/// A full board configuration as submitted for staging.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// UI document.
    pub ui_config: UiConfig,
    /// Actions document.
    pub actions_config: ActionsConfig,
}
