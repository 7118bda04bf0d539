//! Environment variable access.
//!
//! # Responsibilities
//! - Abstract the process environment behind `EnvSource`
//! - Resolve one hop of `SSHWIFTY_ENV_RENAMED:` indirection
//! - Coerce raw text into bounded unsigned integers
//!
//! # Design Decisions
//! - Lookups never fail: absent and malformed input both degrade to `""` or `0`
//! - Indirection is a single redirect, never recursive
//! - Range and format checks are left to the builders and the serving layer

use std::collections::{BTreeMap, HashMap};

/// Marker prefix redirecting a variable to another variable.
pub const RENAMED_PREFIX: &str = "SSHWIFTY_ENV_RENAMED:";

pub const ENV_DIAL_TIMEOUT: &str = "SSHWIFTY_DIALTIMEOUT";
pub const ENV_HOOK_TIMEOUT: &str = "SSHWIFTY_HOOKTIMEOUT";
/// JSON string array.
pub const ENV_HOOK_BEFORE_CONNECTING: &str = "SSHWIFTY_HOOK_BEFORE_CONNECTING";
pub const ENV_HOST_NAME: &str = "SSHWIFTY_HOSTNAME";
pub const ENV_SHARED_KEY: &str = "SSHWIFTY_SHAREDKEY";
pub const ENV_SOCKS5: &str = "SSHWIFTY_SOCKS5";
pub const ENV_SOCKS5_USER: &str = "SSHWIFTY_SOCKS5_USER";
pub const ENV_SOCKS5_PASSWORD: &str = "SSHWIFTY_SOCKS5_PASSWORD";
/// Presence flag: any non-empty value enables it.
pub const ENV_ONLY_ALLOW_PRESET_REMOTES: &str = "SSHWIFTY_ONLYALLOWPRESETREMOTES";
pub const ENV_LISTEN_INTERFACE: &str = "SSHWIFTY_LISTENINTERFACE";
pub const ENV_LISTEN_PORT: &str = "SSHWIFTY_LISTENPORT";
pub const ENV_INITIAL_TIMEOUT: &str = "SSHWIFTY_INITIALTIMEOUT";
pub const ENV_READ_TIMEOUT: &str = "SSHWIFTY_READTIMEOUT";
pub const ENV_WRITE_TIMEOUT: &str = "SSHWIFTY_WRITETIMEOUT";
pub const ENV_HEARTBEAT_TIMEOUT: &str = "SSHWIFTY_HEARTBEATTIMEOUT";
pub const ENV_READ_DELAY: &str = "SSHWIFTY_READDELAY";
/// Missing the `D` of "DELAY". Deployed environments depend on this exact name.
pub const ENV_WRITE_DELAY: &str = "SSHWIFTY_WRITEELAY";
pub const ENV_TLS_CERTIFICATE_FILE: &str = "SSHWIFTY_TLSCERTIFICATEFILE";
pub const ENV_TLS_CERTIFICATE_KEY_FILE: &str = "SSHWIFTY_TLSCERTIFICATEKEYFILE";
pub const ENV_SERVER_MESSAGE: &str = "SSHWIFTY_SERVERMESSAGE";
/// JSON array of preset objects.
pub const ENV_PRESETS: &str = "SSHWIFTY_PRESETS";

/// Read-only key/value lookup standing in for the process environment.
pub trait EnvSource {
    /// Returns the raw value of `name`, or `None` when it is not set.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        // Non-unicode values are treated as unset.
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Read `name`, following at most one `SSHWIFTY_ENV_RENAMED:` redirect.
///
/// The redirect target's value is returned verbatim, even when it carries
/// the marker itself. Unset variables resolve to an empty string.
pub fn resolve<E: EnvSource + ?Sized>(env: &E, name: &str) -> String {
    let value = env.var(name).unwrap_or_default();

    match value.strip_prefix(RENAMED_PREFIX) {
        Some(target) => {
            tracing::debug!(variable = name, redirect = target, "Following renamed variable");
            if target.is_empty() {
                return String::new();
            }
            env.var(target).unwrap_or_default()
        }
        None => value,
    }
}

/// True when `name` resolves to a non-empty value, whatever the text says.
pub fn presence_flag<E: EnvSource + ?Sized>(env: &E, name: &str) -> bool {
    !resolve(env, name).is_empty()
}

/// Parse a port number, `0` on any failure.
pub fn parse_u16(raw: &str) -> u16 {
    parse_digits(raw)
}

/// Parse a timeout or delay count, `0` on any failure.
pub fn parse_u32(raw: &str) -> u32 {
    parse_digits(raw)
}

fn parse_digits<T>(raw: &str) -> T
where
    T: std::str::FromStr + Default,
{
    // `FromStr` for integers accepts a leading `+`; plain digits only here.
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return T::default();
    }
    raw.parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_plain_and_missing() {
        let vars = env(&[(ENV_HOST_NAME, "ssh.example.com")]);

        assert_eq!(resolve(&vars, ENV_HOST_NAME), "ssh.example.com");
        assert_eq!(resolve(&vars, ENV_SHARED_KEY), "");
    }

    #[test]
    fn test_resolve_follows_one_hop() {
        let vars = env(&[
            (ENV_SHARED_KEY, "SSHWIFTY_ENV_RENAMED:APP_SECRET"),
            ("APP_SECRET", "s3cret"),
        ]);

        assert_eq!(resolve(&vars, ENV_SHARED_KEY), "s3cret");
    }

    #[test]
    fn test_resolve_does_not_chain() {
        let vars = env(&[
            (ENV_SHARED_KEY, "SSHWIFTY_ENV_RENAMED:FIRST"),
            ("FIRST", "SSHWIFTY_ENV_RENAMED:SECOND"),
            ("SECOND", "never-read"),
        ]);

        assert_eq!(
            resolve(&vars, ENV_SHARED_KEY),
            "SSHWIFTY_ENV_RENAMED:SECOND"
        );
    }

    #[test]
    fn test_resolve_dangling_redirect_is_empty() {
        let vars = env(&[
            (ENV_HOST_NAME, "SSHWIFTY_ENV_RENAMED:NOT_SET"),
            (ENV_SOCKS5, "SSHWIFTY_ENV_RENAMED:"),
        ]);

        assert_eq!(resolve(&vars, ENV_HOST_NAME), "");
        assert_eq!(resolve(&vars, ENV_SOCKS5), "");
    }

    #[test]
    fn test_presence_flag_ignores_content() {
        let vars = env(&[
            (ENV_ONLY_ALLOW_PRESET_REMOTES, "false"),
            (ENV_SOCKS5, ""),
        ]);

        assert!(presence_flag(&vars, ENV_ONLY_ALLOW_PRESET_REMOTES));
        assert!(!presence_flag(&vars, ENV_SOCKS5));
        assert!(!presence_flag(&vars, ENV_HOST_NAME));
    }

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse_u16("8080"), 8080);
        assert_eq!(parse_u16("65535"), 65535);
        assert_eq!(parse_u16("65536"), 0);
        assert_eq!(parse_u16("-1"), 0);
        assert_eq!(parse_u16("+22"), 0);
        assert_eq!(parse_u16(" 22"), 0);
        assert_eq!(parse_u16("port"), 0);
        assert_eq!(parse_u16(""), 0);

        assert_eq!(parse_u32("30"), 30);
        assert_eq!(parse_u32("4294967295"), u32::MAX);
        assert_eq!(parse_u32("4294967296"), 0);
        assert_eq!(parse_u32("1.5"), 0);
    }

    #[test]
    #[serial]
    fn test_process_env_lookup() {
        temp_env::with_vars(
            [
                ("_SSHWIFTY_TEST_TARGET", Some("from-target")),
                (
                    "_SSHWIFTY_TEST_SOURCE",
                    Some("SSHWIFTY_ENV_RENAMED:_SSHWIFTY_TEST_TARGET"),
                ),
                ("_SSHWIFTY_TEST_UNSET", None),
            ],
            || {
                assert_eq!(resolve(&ProcessEnv, "_SSHWIFTY_TEST_SOURCE"), "from-target");
                assert_eq!(ProcessEnv.var("_SSHWIFTY_TEST_UNSET"), None);
            },
        );
    }
}
