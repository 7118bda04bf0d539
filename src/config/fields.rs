//! Flat field bags handed to the builders.
//!
//! A bag carries exactly what the environment said, already coerced but not
//! yet validated. Builders turn bags into the values the composer uses.

use std::time::Duration;

use crate::config::env::{self, EnvSource};
use crate::config::schema::{Hooks, Server};
use crate::config::validation::BuildError;

/// Settings shared by every server. Timeouts are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommonFields {
    pub host_name: String,
    pub shared_key: String,
    pub dial_timeout: u32,
    pub socks5: String,
    pub socks5_user: String,
    pub socks5_password: String,
    pub hooks: Hooks,
    pub hook_timeout: u32,
    pub only_allow_preset_remotes: bool,
}

impl CommonFields {
    /// Collect the common variables from `env`. `hooks` are assembled separately.
    pub fn from_env<E: EnvSource + ?Sized>(env: &E, hooks: Hooks) -> Self {
        Self {
            host_name: env::resolve(env, env::ENV_HOST_NAME),
            shared_key: env::resolve(env, env::ENV_SHARED_KEY),
            dial_timeout: env::parse_u32(&env::resolve(env, env::ENV_DIAL_TIMEOUT)),
            socks5: env::resolve(env, env::ENV_SOCKS5),
            socks5_user: env::resolve(env, env::ENV_SOCKS5_USER),
            socks5_password: env::resolve(env, env::ENV_SOCKS5_PASSWORD),
            hooks,
            hook_timeout: env::parse_u32(&env::resolve(env, env::ENV_HOOK_TIMEOUT)),
            only_allow_preset_remotes: env::presence_flag(env, env::ENV_ONLY_ALLOW_PRESET_REMOTES),
        }
    }
}

/// Validated common settings, same shape as the bag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Common {
    pub host_name: String,
    pub shared_key: String,
    pub dial_timeout: u32,
    pub socks5: String,
    pub socks5_user: String,
    pub socks5_password: String,
    pub hooks: Hooks,
    pub hook_timeout: u32,
    pub only_allow_preset_remotes: bool,
}

/// Settings of one listening server. Timeouts are seconds, delays milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerFields {
    pub listen_interface: String,
    pub listen_port: u16,
    pub initial_timeout: u32,
    pub read_timeout: u32,
    pub write_timeout: u32,
    pub heartbeat_timeout: u32,
    pub read_delay: u32,
    pub write_delay: u32,
    pub tls_certificate_file: String,
    pub tls_certificate_key_file: String,
    pub server_message: String,
}

impl ServerFields {
    pub fn from_env<E: EnvSource + ?Sized>(env: &E) -> Self {
        let number = |name: &str| env::parse_u32(&env::resolve(env, name));

        Self {
            listen_interface: env::resolve(env, env::ENV_LISTEN_INTERFACE),
            listen_port: env::parse_u16(&env::resolve(env, env::ENV_LISTEN_PORT)),
            initial_timeout: number(env::ENV_INITIAL_TIMEOUT),
            read_timeout: number(env::ENV_READ_TIMEOUT),
            write_timeout: number(env::ENV_WRITE_TIMEOUT),
            heartbeat_timeout: number(env::ENV_HEARTBEAT_TIMEOUT),
            read_delay: number(env::ENV_READ_DELAY),
            write_delay: number(env::ENV_WRITE_DELAY),
            tls_certificate_file: env::resolve(env, env::ENV_TLS_CERTIFICATE_FILE),
            tls_certificate_key_file: env::resolve(env, env::ENV_TLS_CERTIFICATE_KEY_FILE),
            server_message: env::resolve(env, env::ENV_SERVER_MESSAGE),
        }
    }
}

/// Validates and defaults the common bag.
pub trait CommonBuilder {
    fn build(&self, fields: CommonFields) -> Result<Common, BuildError>;
}

/// Turns a server bag into a server definition. Cannot fail.
pub trait ServerBuilder {
    fn build(&self, fields: ServerFields) -> Server;
}

impl<T: CommonBuilder + ?Sized> CommonBuilder for &T {
    fn build(&self, fields: CommonFields) -> Result<Common, BuildError> {
        (**self).build(fields)
    }
}

impl<T: ServerBuilder + ?Sized> ServerBuilder for &T {
    fn build(&self, fields: ServerFields) -> Server {
        (**self).build(fields)
    }
}

/// Unit conversion only; no value is defaulted or rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardServerBuilder;

impl ServerBuilder for StandardServerBuilder {
    fn build(&self, fields: ServerFields) -> Server {
        let secs = |v: u32| Duration::from_secs(u64::from(v));
        let millis = |v: u32| Duration::from_millis(u64::from(v));

        Server {
            listen_interface: fields.listen_interface,
            listen_port: fields.listen_port,
            initial_timeout: secs(fields.initial_timeout),
            read_timeout: secs(fields.read_timeout),
            write_timeout: secs(fields.write_timeout),
            heartbeat_timeout: secs(fields.heartbeat_timeout),
            read_delay: millis(fields.read_delay),
            write_delay: millis(fields.write_delay),
            tls_certificate_file: fields.tls_certificate_file,
            tls_certificate_key_file: fields.tls_certificate_key_file,
            server_message: fields.server_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_server_fields_from_env() {
        let env = vars(&[
            ("SSHWIFTY_LISTENINTERFACE", "127.0.0.1"),
            ("SSHWIFTY_LISTENPORT", "8182"),
            ("SSHWIFTY_READTIMEOUT", "120"),
            ("SSHWIFTY_WRITEELAY", "10"),
            ("SSHWIFTY_WRITEDELAY", "99"),
            ("SSHWIFTY_HEARTBEATTIMEOUT", "soon"),
        ]);
        let fields = ServerFields::from_env(&env);

        assert_eq!(fields.listen_interface, "127.0.0.1");
        assert_eq!(fields.listen_port, 8182);
        assert_eq!(fields.read_timeout, 120);
        assert_eq!(fields.write_delay, 10);
        assert_eq!(fields.heartbeat_timeout, 0);
        assert_eq!(fields.initial_timeout, 0);
    }

    #[test]
    fn test_common_fields_from_env() {
        let env = vars(&[
            ("SSHWIFTY_HOSTNAME", "ssh.example.com"),
            ("SSHWIFTY_DIALTIMEOUT", "30"),
            ("SSHWIFTY_HOOKTIMEOUT", "-5"),
            ("SSHWIFTY_ONLYALLOWPRESETREMOTES", "0"),
        ]);
        let fields = CommonFields::from_env(&env, Hooks::new());

        assert_eq!(fields.host_name, "ssh.example.com");
        assert_eq!(fields.dial_timeout, 30);
        assert_eq!(fields.hook_timeout, 0);
        assert!(fields.only_allow_preset_remotes);
        assert!(fields.socks5.is_empty());
    }

    #[test]
    fn test_standard_server_builder_units() {
        let server = StandardServerBuilder.build(ServerFields {
            listen_port: 22,
            initial_timeout: 10,
            read_delay: 250,
            write_delay: 5,
            ..Default::default()
        });

        assert_eq!(server.listen_port, 22);
        assert_eq!(server.initial_timeout, Duration::from_secs(10));
        assert_eq!(server.read_delay, Duration::from_millis(250));
        assert_eq!(server.write_delay, Duration::from_millis(5));
        assert_eq!(server.read_timeout, Duration::ZERO);
    }
}
