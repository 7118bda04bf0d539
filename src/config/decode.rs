//! JSON values carried inside string variables.
//!
//! # Responsibilities
//! - Decode hook command lists (JSON string arrays)
//! - Decode raw preset records (JSON arrays of objects)
//! - Assemble the hook table from the known hook variables
//!
//! # Design Decisions
//! - Unlike scalar fields, malformed JSON is a hard error naming the variable
//! - An unset hook variable leaves its hook point out of the table entirely

use crate::config::env::{self, EnvSource};
use crate::config::loader::ConfigError;
use crate::config::schema::{HookCommand, HookType, Hooks, RawPreset};

/// Hook points this source can populate, with the variable feeding each.
pub const HOOK_VARIABLES: &[(HookType, &str)] =
    &[(HookType::BeforeConnecting, env::ENV_HOOK_BEFORE_CONNECTING)];

/// Decode `text` (the value of `var`) as a JSON array of strings.
pub fn decode_hook_commands(var: &'static str, text: &str) -> Result<HookCommand, ConfigError> {
    serde_json::from_str(text).map_err(|source| ConfigError::InvalidHookCommands { var, source })
}

/// Decode `text` (the value of `var`) as a JSON array of objects.
///
/// Surrounding whitespace is ignored and blank text yields no presets.
pub fn decode_presets(var: &'static str, text: &str) -> Result<Vec<RawPreset>, ConfigError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(text).map_err(|source| ConfigError::InvalidPresets { var, source })
}

/// Build the hook table from every hook variable that has a value.
///
/// Each present variable contributes exactly one command list.
pub fn assemble_hooks<E: EnvSource + ?Sized>(env: &E) -> Result<Hooks, ConfigError> {
    let mut hooks = Hooks::new();

    for &(hook, var) in HOOK_VARIABLES {
        let text = env::resolve(env, var);
        if text.is_empty() {
            continue;
        }

        let command = decode_hook_commands(var, &text)?;
        tracing::debug!(hook = %hook, args = command.len(), "Hook command configured");
        hooks.insert(hook, vec![command]);
    }

    Ok(hooks)
}
