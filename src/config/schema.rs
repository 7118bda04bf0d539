//! Configuration schema definitions.
//!
//! This module defines the runtime configuration handed to the serving layer.
//! Values are built once per load and never mutated afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

/// Lifecycle points at which external commands may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookType {
    /// Runs before an outbound connection to a remote is dialed.
    BeforeConnecting,
}

impl HookType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookType::BeforeConnecting => "before_connecting",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One shell-invocable command: program followed by its arguments.
pub type HookCommand = Vec<String>;

/// Hook point to the command lists contributed for it, one list per source.
pub type Hooks = HashMap<HookType, Vec<HookCommand>>;

/// Untyped preset record as decoded from JSON, before concretization.
pub type RawPreset = serde_json::Map<String, serde_json::Value>;

/// Root runtime configuration.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Configuration {
    /// Host name the web interface is served under.
    pub host_name: String,

    /// Shared access key required from clients.
    pub shared_key: String,

    /// Outbound dial timeout.
    pub dial_timeout: Duration,

    /// SOCKS5 proxy address (`host:port`), empty for direct dialing.
    pub socks5: String,
    pub socks5_user: String,
    pub socks5_password: String,

    /// Commands per hook point. A missing key means no commands.
    pub hooks: Hooks,

    /// Upper bound on a single hook command's run time.
    pub hook_timeout: Duration,

    /// Listening servers, at least one.
    pub servers: Vec<Server>,

    /// Concretized presets, in declaration order.
    pub presets: Vec<Preset>,

    /// Reject remotes that no preset defines.
    pub only_allow_preset_remotes: bool,
}

impl Configuration {
    /// Commands registered for `hook`, empty when none were configured.
    pub fn hook_commands(&self, hook: HookType) -> &[HookCommand] {
        self.hooks.get(&hook).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a connection of `kind` to `host` may be dialed.
    pub fn is_remote_allowed(&self, kind: &str, host: &str) -> bool {
        if !self.only_allow_preset_remotes {
            return true;
        }

        self.presets
            .iter()
            .any(|p| p.kind == kind && p.host.eq_ignore_ascii_case(host))
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("host_name", &self.host_name)
            .field("shared_key", &redacted(&self.shared_key))
            .field("dial_timeout", &self.dial_timeout)
            .field("socks5", &self.socks5)
            .field("socks5_user", &self.socks5_user)
            .field("socks5_password", &redacted(&self.socks5_password))
            .field("hooks", &self.hooks)
            .field("hook_timeout", &self.hook_timeout)
            .field("servers", &self.servers)
            .field("presets", &self.presets)
            .field("only_allow_preset_remotes", &self.only_allow_preset_remotes)
            .finish()
    }
}

/// A listening endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Server {
    /// Interface address to bind (e.g., "0.0.0.0", "::1").
    pub listen_interface: String,

    pub listen_port: u16,

    /// Time allowed for the initial handshake.
    pub initial_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub heartbeat_timeout: Duration,

    /// Throttling delay applied between reads.
    pub read_delay: Duration,
    /// Throttling delay applied between writes.
    pub write_delay: Duration,

    pub tls_certificate_file: String,
    pub tls_certificate_key_file: String,

    /// Message shown to operators on the landing page.
    pub server_message: String,
}

impl Server {
    /// TLS is enabled only when both the certificate and the key are set.
    pub fn is_tls(&self) -> bool {
        !self.tls_certificate_file.is_empty() && !self.tls_certificate_key_file.is_empty()
    }

    /// Bind address in `interface:port` form, with IPv6 literals bracketed.
    pub fn listen_address(&self) -> String {
        if self.listen_interface.contains(':') && !self.listen_interface.starts_with('[') {
            format!("[{}]:{}", self.listen_interface, self.listen_port)
        } else {
            format!("{}:{}", self.listen_interface, self.listen_port)
        }
    }
}

/// A predefined remote that users can open without typing its details.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preset {
    pub title: String,

    /// Connection type (e.g., "SSH", "Telnet").
    pub kind: String,

    pub host: String,

    /// Lowercase 6-digit hex color, empty for the default.
    pub tab_color: String,

    /// Type-specific settings with all `scheme://` references resolved.
    pub meta: BTreeMap<String, String>,
}
