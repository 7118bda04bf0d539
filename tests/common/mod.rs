//! Shared helpers for the loader integration tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use sshwifty_config::config::{
    BuildError, Common, CommonBuilder, CommonFields, Preset, PresetConcretizer, PresetError,
    RawPreset,
};

/// In-memory environment from `(name, value)` pairs.
pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Concretizer that records what it was given and returns one titled preset per record.
#[derive(Default)]
pub struct RecordingConcretizer {
    pub seen: RefCell<Vec<Vec<RawPreset>>>,
}

impl PresetConcretizer for RecordingConcretizer {
    fn concretize(&self, raw: Vec<RawPreset>) -> Result<Vec<Preset>, PresetError> {
        let presets = raw
            .iter()
            .map(|r| Preset {
                title: r.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                ..Default::default()
            })
            .collect();
        self.seen.borrow_mut().push(raw);
        Ok(presets)
    }
}

/// Common builder that always rejects, counting how often it was asked.
#[derive(Default)]
pub struct RejectingBuilder {
    pub calls: Cell<usize>,
}

impl CommonBuilder for RejectingBuilder {
    fn build(&self, _fields: CommonFields) -> Result<Common, BuildError> {
        self.calls.set(self.calls.get() + 1);
        Err(BuildError::Socks5CredentialsWithoutProxy)
    }
}
