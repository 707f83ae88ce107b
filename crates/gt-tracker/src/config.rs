// config.rs — Tracker configuration, read from a TOML file.
//
// Example `config.toml`:
//
//   completion_message_color = "#00B400"
//   notify_on_completion = true
//   message_prefix = "Goal Tracker"
//   events_log = "/home/me/.local/share/goal-tracker/events.jsonl"

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use gt_task::Task;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// An RGB colour, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("expected a #RRGGBB colour, got {:?}", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A chat message for the host to show the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub color: Color,
}

/// Top-level tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Colour of the chat message prefix on task completion.
    #[serde(default = "default_completion_color")]
    pub completion_message_color: Color,

    /// Post a chat message when a task completes.
    #[serde(default = "default_notify")]
    pub notify_on_completion: bool,

    /// Text in front of every chat message.
    #[serde(default = "default_prefix")]
    pub message_prefix: String,

    /// Append every tracker event as JSONL to this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_log: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            completion_message_color: default_completion_color(),
            notify_on_completion: default_notify(),
            message_prefix: default_prefix(),
            events_log: None,
        }
    }
}

// Serde default functions
fn default_completion_color() -> Color {
    Color::rgb(0x00, 0xB4, 0x00)
}

fn default_notify() -> bool {
    true
}

fn default_prefix() -> String {
    "Goal Tracker".to_string()
}

impl TrackerConfig {
    /// Read configuration from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(TrackerError::IoError {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        toml::from_str(&text).map_err(|source| TrackerError::InvalidConfig {
            path: path.display().to_string(),
            source,
        })
    }

    /// The chat message announcing that `task` was completed.
    pub fn completion_message(&self, task: &Task) -> Notification {
        Notification {
            text: format!("{}: Completed task — {}", self.message_prefix, task),
            color: self.completion_message_color,
        }
    }
}
