use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::instance::TableFormat;

/// Registry configuration, loadable from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackerSettings {
    #[serde(default)]
    pub mode: PackingMode,
    #[serde(default)]
    pub attributes: Vec<AttributeChannel>,
    #[serde(default)]
    pub initial_vertex_capacity: usize,
    #[serde(default = "PackerSettings::default_table_channels")]
    pub table_channels: usize,
}

impl Default for PackerSettings {
    fn default() -> Self {
        Self {
            mode: PackingMode::default(),
            attributes: Vec::new(),
            initial_vertex_capacity: 0,
            table_channels: Self::default_table_channels(),
        }
    }
}

impl PackerSettings {
    pub fn two_phase() -> Self {
        Self::default()
    }

    pub fn streaming() -> Self {
        Self {
            mode: PackingMode::Streaming,
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, width: usize) -> Self {
        self.attributes.push(AttributeChannel::new(name, width));
        self
    }

    /// Parses and validates settings from a JSON document.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<PackerSettings>(contents).map(Self::validate)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        let path = path.as_ref();
        let settings = match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!(
                        "Packer settings {:?} rejected at line {} ({}). Expected \
                         `mode` of \"two_phase\" or \"streaming\" and `attributes` as \
                         [{{ \"name\", \"width\" }}]. Packing two-phase with no attributes.",
                        path,
                        err.line(),
                        err
                    );
                    return PackerSettings::default();
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "No packer settings at {:?}. Packing two-phase with no attributes.",
                    path
                );
                return PackerSettings::default();
            }
            Err(err) => {
                warn!(
                    "Cannot read packer settings {:?} ({}). Packing two-phase with no attributes.",
                    path, err
                );
                return PackerSettings::default();
            }
        };

        info!("Loaded packer settings from {:?}: {}", path, settings.describe());
        settings
    }

    /// One-line summary of mode, channels and table layout for logs.
    pub fn describe(&self) -> String {
        let channels = if self.attributes.is_empty() {
            "no attributes".to_owned()
        } else {
            self.attributes
                .iter()
                .map(|channel| format!("{}x{}", channel.name, channel.width))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "{:?} mode, {}, {:?} instance table, {} vertices reserved",
            self.mode,
            channels,
            self.table_format(),
            self.initial_vertex_capacity
        )
    }

    pub fn validate(mut self) -> Self {
        if TableFormat::from_channels(self.table_channels).is_none() {
            warn!(
                "Instance table must have 1, 2 or 4 channels, got {}. Using 4 instead.",
                self.table_channels
            );
            self.table_channels = Self::default_table_channels();
        }

        let mut seen = Vec::with_capacity(self.attributes.len());
        self.attributes.retain(|channel| {
            if channel.width == 0 {
                warn!(
                    "Dropping attribute `{}`: a channel needs at least one component.",
                    channel.name
                );
                return false;
            }
            if seen.contains(&channel.name) {
                warn!(
                    "Dropping attribute `{}` (width {}): the name is already declared.",
                    channel.name, channel.width
                );
                return false;
            }
            seen.push(channel.name.clone());
            true
        });

        self
    }

    pub fn table_format(&self) -> TableFormat {
        TableFormat::from_channels(self.table_channels).unwrap_or(TableFormat::Rgba32Float)
    }

    const fn default_table_channels() -> usize {
        4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingMode {
    /// Record on `add`, allocate exactly once on `pack`.
    #[default]
    TwoPhase,
    /// Write into growable buffers on every `add`.
    Streaming,
}

/// A declared per-vertex channel, e.g. `normal` with width 3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChannel {
    pub name: String,
    pub width: usize,
}

impl AttributeChannel {
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }
}
