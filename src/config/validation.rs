//! Common settings validation.
//!
//! # Responsibilities
//! - Check that SOCKS5 settings are usable together
//! - Reject hook commands that have nothing to execute
//!
//! # Design Decisions
//! - Numeric fields are never defaulted here; zero is passed through
//! - Stops at the first problem, which is what the loader reports

use thiserror::Error;

use crate::config::fields::{Common, CommonBuilder, CommonFields};
use crate::config::schema::HookType;

/// Why the common settings were rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("SOCKS5 credentials are set but no SOCKS5 proxy address is given")]
    Socks5CredentialsWithoutProxy,

    #[error("invalid SOCKS5 proxy address \"{0}\": expected host:port")]
    InvalidSocks5Address(String),

    #[error("hook \"{hook}\" has an empty command at position {index}")]
    EmptyHookCommand { hook: HookType, index: usize },
}

/// Default common builder used by the loaders.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCommonBuilder;

impl CommonBuilder for StandardCommonBuilder {
    fn build(&self, fields: CommonFields) -> Result<Common, BuildError> {
        validate_socks5(&fields)?;

        for (hook, commands) in &fields.hooks {
            for (index, command) in commands.iter().enumerate() {
                let runnable = command.first().is_some_and(|program| !program.is_empty());
                if !runnable {
                    return Err(BuildError::EmptyHookCommand { hook: *hook, index });
                }
            }
        }

        Ok(Common {
            host_name: fields.host_name,
            shared_key: fields.shared_key,
            dial_timeout: fields.dial_timeout,
            socks5: fields.socks5,
            socks5_user: fields.socks5_user,
            socks5_password: fields.socks5_password,
            hooks: fields.hooks,
            hook_timeout: fields.hook_timeout,
            only_allow_preset_remotes: fields.only_allow_preset_remotes,
        })
    }
}

fn validate_socks5(fields: &CommonFields) -> Result<(), BuildError> {
    if fields.socks5.is_empty() {
        if !fields.socks5_user.is_empty() || !fields.socks5_password.is_empty() {
            return Err(BuildError::Socks5CredentialsWithoutProxy);
        }
        return Ok(());
    }

    let valid = fields
        .socks5
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());

    if !valid {
        return Err(BuildError::InvalidSocks5Address(fields.socks5.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Hooks;

    #[test]
    fn test_accepts_minimal_fields() {
        let common = StandardCommonBuilder.build(CommonFields::default()).unwrap();
        assert_eq!(common.dial_timeout, 0);
        assert_eq!(common.hook_timeout, 0);
        assert!(common.hooks.is_empty());
    }

    #[test]
    fn test_socks5_validation() {
        let ok = CommonFields {
            socks5: "proxy.internal:1080".into(),
            socks5_user: "user".into(),
            socks5_password: "pass".into(),
            ..Default::default()
        };
        assert!(StandardCommonBuilder.build(ok).is_ok());

        let ipv6 = CommonFields {
            socks5: "[::1]:1080".into(),
            ..Default::default()
        };
        assert!(StandardCommonBuilder.build(ipv6).is_ok());

        let orphan = CommonFields {
            socks5_password: "pass".into(),
            ..Default::default()
        };
        assert_eq!(
            StandardCommonBuilder.build(orphan),
            Err(BuildError::Socks5CredentialsWithoutProxy)
        );

        for bad in ["proxy.internal", ":1080", "proxy.internal:socks"] {
            let fields = CommonFields {
                socks5: bad.into(),
                ..Default::default()
            };
            assert_eq!(
                StandardCommonBuilder.build(fields),
                Err(BuildError::InvalidSocks5Address(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_rejects_empty_hook_commands() {
        let mut hooks = Hooks::new();
        hooks.insert(
            HookType::BeforeConnecting,
            vec![vec!["/usr/bin/check".into()], vec![]],
        );
        let fields = CommonFields {
            hooks,
            ..Default::default()
        };

        let err = StandardCommonBuilder.build(fields).unwrap_err();
        assert_eq!(
            err,
            BuildError::EmptyHookCommand {
                hook: HookType::BeforeConnecting,
                index: 1
            }
        );
        assert_eq!(
            err.to_string(),
            "hook \"before_connecting\" has an empty command at position 1"
        );
    }
}
