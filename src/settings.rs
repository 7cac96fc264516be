use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Persisted user settings. A missing file or missing key is normal and
/// falls back to the documented default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Last-used channel; `None` until the first run names one.
    pub channel: Option<String>,
    /// Show the joined chatter names on the home screen (on by default,
    /// turning it off keeps the target pool a surprise).
    pub reveal_names_before_start: bool,
    /// Show per-letter occurrence hints on colored keyboard keys.
    pub reveal_occurrence_hints: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            channel: None,
            reveal_names_before_start: true,
            reveal_occurrence_hints: false,
        }
    }
}

pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatterdle").join("settings.conf"))
}

impl Settings {
    pub fn load() -> Self {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(_) => Self::default(),
        }
    }

    /// Parse `key=value` lines; unknown keys and malformed lines are ignored.
    pub fn parse(text: &str) -> Self {
        let mut settings = Self::default();
        for line in text.lines() {
            let line = line.trim();
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "channel" => {
                    let value = value.trim();
                    if !value.is_empty() {
                        settings.channel = Some(value.to_string());
                    }
                }
                "reveal_names" => settings.reveal_names_before_start = value.trim() == "true",
                "occurrence_hints" => settings.reveal_occurrence_hints = value.trim() == "true",
                _ => {}
            }
        }
        settings
    }

    pub fn to_file_string(&self) -> String {
        format!(
            "channel={}\nreveal_names={}\noccurrence_hints={}\n",
            self.channel.as_deref().unwrap_or(""),
            self.reveal_names_before_start,
            self.reveal_occurrence_hints
        )
    }

    pub fn save(&self) -> io::Result<()> {
        match settings_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_file_string())
    }
}
