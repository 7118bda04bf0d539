//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment (SSHWIFTY_* variables)
//!     → env.rs (lookup, one-hop indirection, integer coercion)
//!     → decode.rs (hook command lists, raw preset records)
//!     → fields.rs (common and server field bags)
//!     → validation.rs / fields.rs (builders)
//!     → preset.rs (concretization)
//!     → loader.rs (composition)
//!     → Configuration (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; each load reads the environment afresh
//! - Missing or malformed numbers become zero; malformed JSON is an error
//! - Builders and the concretizer are traits so the pipeline can be tested alone

pub mod decode;
pub mod env;
pub mod fields;
pub mod loader;
pub mod preset;
pub mod schema;
pub mod validation;

pub use env::{EnvSource, ProcessEnv};
pub use fields::{Common, CommonBuilder, CommonFields, ServerBuilder, ServerFields};
pub use loader::{ConfigError, EnvLoader, Loader, Redundant};
pub use preset::{PresetConcretizer, PresetError, StandardConcretizer};
pub use schema::{Configuration, HookCommand, HookType, Hooks, Preset, RawPreset, Server};
pub use validation::{BuildError, StandardCommonBuilder};
