//! Preset concretization.
//!
//! # Responsibilities
//! - Turn raw JSON preset records into validated `Preset` values
//! - Resolve `literal://`, `environment://` and `file://` meta references
//!
//! # Design Decisions
//! - Field names match case-insensitively enough for hand-written JSON
//!   (`Title`, `title`; `TabColor`, `tab_color`)
//! - Unknown fields are ignored
//! - The first invalid preset aborts the whole batch

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::config::env::{EnvSource, ProcessEnv};
use crate::config::schema::{Preset, RawPreset};

const LITERAL_SCHEME: &str = "literal://";
const ENVIRONMENT_SCHEME: &str = "environment://";
const FILE_SCHEME: &str = "file://";

/// Why a preset could not be concretized. `index` is its position in the input.
#[derive(Error, Debug)]
pub enum PresetError {
    #[error("preset #{index}: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("preset #{index}: \"Title\" must not be empty")]
    MissingTitle { index: usize },

    #[error("preset #{index} ({title}): \"Type\" must not be empty")]
    MissingType { index: usize, title: String },

    #[error("preset #{index} ({title}): invalid tab color \"{color}\", expected 6 hex digits")]
    InvalidTabColor {
        index: usize,
        title: String,
        color: String,
    },

    #[error("preset #{index} ({title}): meta \"{key}\" refers to unset variable {variable}")]
    MissingMetaVariable {
        index: usize,
        title: String,
        key: String,
        variable: String,
    },

    #[error("preset #{index} ({title}): meta \"{key}\" cannot read {path}: {source}")]
    MetaFile {
        index: usize,
        title: String,
        key: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves raw preset records into final presets, preserving order.
pub trait PresetConcretizer {
    fn concretize(&self, raw: Vec<RawPreset>) -> Result<Vec<Preset>, PresetError>;
}

impl<T: PresetConcretizer + ?Sized> PresetConcretizer for &T {
    fn concretize(&self, raw: Vec<RawPreset>) -> Result<Vec<Preset>, PresetError> {
        (**self).concretize(raw)
    }
}

#[derive(Debug, Deserialize)]
struct PresetDefinition {
    #[serde(default, alias = "Title")]
    title: String,

    #[serde(default, rename = "type", alias = "Type")]
    kind: String,

    #[serde(default, alias = "Host")]
    host: String,

    #[serde(default, alias = "TabColor", alias = "tabColor")]
    tab_color: String,

    #[serde(default, alias = "Meta")]
    meta: BTreeMap<String, String>,
}

/// Default concretizer. Meta `environment://` references read from `E`.
#[derive(Debug, Clone, Default)]
pub struct StandardConcretizer<E = ProcessEnv> {
    env: E,
}

impl<E: EnvSource> StandardConcretizer<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }

    fn concretize_one(&self, index: usize, raw: RawPreset) -> Result<Preset, PresetError> {
        let def: PresetDefinition = serde_json::from_value(serde_json::Value::Object(raw))
            .map_err(|source| PresetError::Malformed { index, source })?;

        let title = def.title.trim().to_string();
        if title.is_empty() {
            return Err(PresetError::MissingTitle { index });
        }

        let kind = def.kind.trim().to_string();
        if kind.is_empty() {
            return Err(PresetError::MissingType { index, title });
        }

        let tab_color = match normalize_tab_color(&def.tab_color) {
            Some(color) => color,
            None => {
                return Err(PresetError::InvalidTabColor {
                    index,
                    title,
                    color: def.tab_color,
                })
            }
        };

        let mut meta = BTreeMap::new();
        for (key, value) in def.meta {
            let resolved = self.resolve_meta(index, &title, &key, &value)?;
            meta.insert(key, resolved);
        }

        Ok(Preset {
            title,
            kind,
            host: def.host.trim().to_string(),
            tab_color,
            meta,
        })
    }

    fn resolve_meta(
        &self,
        index: usize,
        title: &str,
        key: &str,
        value: &str,
    ) -> Result<String, PresetError> {
        if let Some(literal) = value.strip_prefix(LITERAL_SCHEME) {
            return Ok(literal.to_string());
        }

        if let Some(variable) = value.strip_prefix(ENVIRONMENT_SCHEME) {
            return self
                .env
                .var(variable)
                .ok_or_else(|| PresetError::MissingMetaVariable {
                    index,
                    title: title.to_string(),
                    key: key.to_string(),
                    variable: variable.to_string(),
                });
        }

        if let Some(path) = value.strip_prefix(FILE_SCHEME) {
            return std::fs::read_to_string(path).map_err(|source| PresetError::MetaFile {
                index,
                title: title.to_string(),
                key: key.to_string(),
                path: path.to_string(),
                source,
            });
        }

        Ok(value.to_string())
    }
}

impl<E: EnvSource> PresetConcretizer for StandardConcretizer<E> {
    fn concretize(&self, raw: Vec<RawPreset>) -> Result<Vec<Preset>, PresetError> {
        raw.into_iter()
            .enumerate()
            .map(|(index, record)| self.concretize_one(index, record))
            .collect()
    }
}

/// Empty stays empty; otherwise 6 hex digits, optional `#`, lowercased.
fn normalize_tab_color(color: &str) -> Option<String> {
    let color = color.trim();
    if color.is_empty() {
        return Some(String::new());
    }

    let digits = color.strip_prefix('#').unwrap_or(color);
    if digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(digits.to_ascii_lowercase())
    } else {
        None
    }
}
