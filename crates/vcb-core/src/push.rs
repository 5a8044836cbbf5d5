//! Push messages broadcast to attached clients.
//!
//! Wire format (adjacently tagged):
//!
//! ```json
//! {"type": "button_content_update", "payload": {"button_id": "b1", "text": "Live: 42"}}
//! {"type": "navigation_update", "payload": {}}
//! ```
//!
//! Every optional field of [`ButtonContentUpdate`] is omitted when `None`,
//! meaning "leave unchanged" on the client. An empty `style_class` string
//! clears the extra style class.

use serde::{Deserialize, Serialize};

/// Time-series data for a sparkline mini-chart rendered inside a button.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    /// Data points, oldest first.
    pub data: Vec<f64>,
    /// Stroke color (any CSS color).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Stroke width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

/// Live update for the content of one button.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonContentUpdate {
    /// Target button. Not validated against the active configuration.
    pub button_id: String,
    /// New label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// New icon class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_class: Option<String>,
    /// New extra style class; `""` clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_class: Option<String>,
    /// New sparkline data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparkline: Option<Sparkline>,
}

impl ButtonContentUpdate {
    /// Create an update that changes nothing yet.
    pub fn new(button_id: impl Into<String>) -> Self {
        Self {
            button_id: button_id.into(),
            text: None,
            icon_class: None,
            style_class: None,
            sparkline: None,
        }
    }

    /// Set the label.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

}

/// Empty payload of a navigation update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationPayload {}

/// A message pushed to every attached client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PushMessage {
    /// Change the content of one button.
    ButtonContentUpdate(ButtonContentUpdate),
    /// The active configuration changed; clients should re-fetch navigation.
    NavigationUpdate(NavigationPayload),
}

impl PushMessage {
    /// Build a navigation update.
    pub fn navigation_update() -> Self {
        Self::NavigationUpdate(NavigationPayload {})
    }

    /// Wire name of this message type.
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::ButtonContentUpdate(_) => "button_content_update",
            Self::NavigationUpdate(_) => "navigation_update",
        }
    }
}

impl From<ButtonContentUpdate> for PushMessage {
    fn from(update: ButtonContentUpdate) -> Self {
        Self::ButtonContentUpdate(update)
    }
}
