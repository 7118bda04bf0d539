//! Configuration loaders.
//!
//! A loader produces a complete `Configuration` or an error, never anything
//! in between. `EnvLoader` reads the process environment (or any injected
//! `EnvSource`); `Redundant` chains loaders and takes the first that works.

use std::time::Duration;

use thiserror::Error;

use crate::config::decode;
use crate::config::env::{self, EnvSource, ProcessEnv};
use crate::config::fields::{
    CommonBuilder, CommonFields, ServerBuilder, ServerFields, StandardServerBuilder,
};
use crate::config::preset::{PresetConcretizer, PresetError, StandardConcretizer};
use crate::config::schema::Configuration;
use crate::config::validation::{BuildError, StandardCommonBuilder};

/// Source label reported by `EnvLoader`.
pub const ENVIRONMENT_SOURCE: &str = "Environment Variable";

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to parse {var}: {source}")]
    InvalidHookCommands {
        var: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build the configuration: {0}")]
    Build(#[source] BuildError),

    #[error("invalid \"{var}\": {source}")]
    InvalidPresets {
        var: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to parse Preset data: {0}")]
    Preset(#[source] PresetError),

    #[error("no configuration loader was given")]
    NoLoaders,
}

/// A source of configuration.
pub trait Loader {
    /// Load a configuration, returning it with the name of the source it came from.
    fn load(&self) -> Result<(&'static str, Configuration), ConfigError>;
}

/// Builds the configuration from `SSHWIFTY_*` variables.
#[derive(Debug, Clone)]
pub struct EnvLoader<
    E = ProcessEnv,
    C = StandardCommonBuilder,
    S = StandardServerBuilder,
    P = StandardConcretizer<ProcessEnv>,
> {
    env: E,
    common: C,
    server: S,
    presets: P,
}

impl EnvLoader {
    /// Loader over the process environment with the standard builders.
    pub fn new() -> Self {
        Self::with_source(ProcessEnv)
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource + Clone>
    EnvLoader<E, StandardCommonBuilder, StandardServerBuilder, StandardConcretizer<E>>
{
    /// Loader over `env` with the standard builders. Preset meta
    /// `environment://` references are resolved against the same `env`.
    pub fn with_source(env: E) -> Self {
        Self {
            presets: StandardConcretizer::new(env.clone()),
            env,
            common: StandardCommonBuilder,
            server: StandardServerBuilder,
        }
    }
}

impl<E, C, S, P> EnvLoader<E, C, S, P> {
    pub fn with_common_builder<C2: CommonBuilder>(self, common: C2) -> EnvLoader<E, C2, S, P> {
        EnvLoader {
            env: self.env,
            common,
            server: self.server,
            presets: self.presets,
        }
    }

    pub fn with_server_builder<S2: ServerBuilder>(self, server: S2) -> EnvLoader<E, C, S2, P> {
        EnvLoader {
            env: self.env,
            common: self.common,
            server,
            presets: self.presets,
        }
    }

    pub fn with_concretizer<P2: PresetConcretizer>(self, presets: P2) -> EnvLoader<E, C, S, P2> {
        EnvLoader {
            env: self.env,
            common: self.common,
            server: self.server,
            presets,
        }
    }
}

impl<E, C, S, P> Loader for EnvLoader<E, C, S, P>
where
    E: EnvSource,
    C: CommonBuilder,
    S: ServerBuilder,
    P: PresetConcretizer,
{
    fn load(&self) -> Result<(&'static str, Configuration), ConfigError> {
        tracing::info!("Loading configuration from environment variables ...");

        let hooks = decode::assemble_hooks(&self.env)?;
        let common = self
            .common
            .build(CommonFields::from_env(&self.env, hooks))
            .map_err(ConfigError::Build)?;

        let server = self.server.build(ServerFields::from_env(&self.env));

        let preset_text = env::resolve(&self.env, env::ENV_PRESETS);
        let raw = decode::decode_presets(env::ENV_PRESETS, &preset_text)?;
        let presets = self.presets.concretize(raw).map_err(ConfigError::Preset)?;

        tracing::debug!(
            hooks = common.hooks.len(),
            presets = presets.len(),
            "Environment configuration assembled"
        );

        Ok((
            ENVIRONMENT_SOURCE,
            Configuration {
                host_name: common.host_name,
                shared_key: common.shared_key,
                dial_timeout: Duration::from_secs(u64::from(common.dial_timeout)),
                socks5: common.socks5,
                socks5_user: common.socks5_user,
                socks5_password: common.socks5_password,
                hooks: common.hooks,
                hook_timeout: Duration::from_secs(u64::from(common.hook_timeout)),
                servers: vec![server],
                presets,
                only_allow_preset_remotes: common.only_allow_preset_remotes,
            },
        ))
    }
}

/// Tries each loader in order and returns the first success.
#[derive(Default)]
pub struct Redundant {
    loaders: Vec<Box<dyn Loader>>,
}

impl Redundant {
    pub fn new(loaders: Vec<Box<dyn Loader>>) -> Self {
        Self { loaders }
    }

    pub fn push(&mut self, loader: impl Loader + 'static) {
        self.loaders.push(Box::new(loader));
    }
}

impl Loader for Redundant {
    /// Returns the last loader's error when every loader fails.
    fn load(&self) -> Result<(&'static str, Configuration), ConfigError> {
        let mut last_err = ConfigError::NoLoaders;

        for (attempt, loader) in self.loaders.iter().enumerate() {
            match loader.load() {
                Ok(loaded) => return Ok(loaded),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Configuration loader failed, trying next");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}
