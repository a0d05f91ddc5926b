//! # Configuration Loading
//!
//! `RegistryConfig` and `ServiceConfig` come from three layers, later ones
//! winning: built-in defaults, a TOML file, then `QC_REGISTRY_*` environment
//! variables.
//!
//! ## File Format
//!
//! ```toml
//! check_invariants = true
//!
//! [registry]
//! name = "U2U DePIN Subnet Node"
//! symbol = "DEPIN"
//! lock_time_secs = 14515200
//! initial_token_id = 0
//! blacklist_policy = "enforce"          # or "ignore"
//! mint_authority = "owner_or_whitelisted" # or "owner", "anyone"
//! signature_prefix = "DP_NFT_GENERATE"
//! signer = "0x0000000000000000000000000000000000000000"
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `QC_REGISTRY_NAME` | `name` |
//! | `QC_REGISTRY_SYMBOL` | `symbol` |
//! | `QC_REGISTRY_LOCK_TIME` | `lock_time_secs` |
//! | `QC_REGISTRY_INITIAL_TOKEN_ID` | `initial_token_id` |
//! | `QC_REGISTRY_BLACKLIST_POLICY` | `blacklist_policy` |
//! | `QC_REGISTRY_MINT_AUTHORITY` | `mint_authority` |
//! | `QC_REGISTRY_SIGNATURE_PREFIX` | `signature_prefix` |
//! | `QC_REGISTRY_SIGNER` | `signer` |
//! | `QC_REGISTRY_CHECK_INVARIANTS` | `check_invariants` |

pub use crate::domain::entities::{BlacklistPolicy, MintAuthority, RegistryConfig};
use crate::errors::ConfigError;
use crate::service::ServiceConfig;
use std::fs;
use std::path::Path;
use tracing::debug;

const ENV_NAME: &str = "QC_REGISTRY_NAME";
const ENV_SYMBOL: &str = "QC_REGISTRY_SYMBOL";
const ENV_LOCK_TIME: &str = "QC_REGISTRY_LOCK_TIME";
const ENV_INITIAL_TOKEN_ID: &str = "QC_REGISTRY_INITIAL_TOKEN_ID";
const ENV_BLACKLIST_POLICY: &str = "QC_REGISTRY_BLACKLIST_POLICY";
const ENV_MINT_AUTHORITY: &str = "QC_REGISTRY_MINT_AUTHORITY";
const ENV_SIGNATURE_PREFIX: &str = "QC_REGISTRY_SIGNATURE_PREFIX";
const ENV_SIGNER: &str = "QC_REGISTRY_SIGNER";
const ENV_CHECK_INVARIANTS: &str = "QC_REGISTRY_CHECK_INVARIANTS";

// =============================================================================
// REGISTRY CONFIG SOURCES
// =============================================================================

impl RegistryConfig {
    /// Parse a bare registry table.
    ///
    /// # Errors
    ///
    /// `ConfigError::Parse` on malformed TOML or unknown enum values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read a bare registry table from disk.
    ///
    /// # Errors
    ///
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`RegistryConfig::from_toml_str`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read_file(path.as_ref())?)
    }

    /// Apply `QC_REGISTRY_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidEnv` if a set variable does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidEnv` if a present variable does not parse.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_NAME) {
            self.name = value;
        }
        if let Some(value) = lookup(ENV_SYMBOL) {
            self.symbol = value;
        }
        if let Some(value) = lookup(ENV_LOCK_TIME) {
            self.lock_time_secs = parse_var(ENV_LOCK_TIME, &value, |v| v.parse().ok())?;
        }
        if let Some(value) = lookup(ENV_INITIAL_TOKEN_ID) {
            self.initial_token_id = parse_var(ENV_INITIAL_TOKEN_ID, &value, |v| v.parse().ok())?;
        }
        if let Some(value) = lookup(ENV_BLACKLIST_POLICY) {
            self.blacklist_policy = parse_var(ENV_BLACKLIST_POLICY, &value, parse_blacklist_policy)?;
        }
        if let Some(value) = lookup(ENV_MINT_AUTHORITY) {
            self.mint_authority = parse_var(ENV_MINT_AUTHORITY, &value, parse_mint_authority)?;
        }
        if let Some(value) = lookup(ENV_SIGNATURE_PREFIX) {
            self.signature_prefix = value;
        }
        if let Some(value) = lookup(ENV_SIGNER) {
            self.signer = parse_var(ENV_SIGNER, &value, |v| v.parse().ok())?;
        }
        Ok(())
    }
}

// =============================================================================
// SERVICE CONFIG SOURCES
// =============================================================================

impl ServiceConfig {
    /// Parse a service config file (top-level keys plus a `[registry]` table).
    ///
    /// # Errors
    ///
    /// `ConfigError::Parse` on malformed TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidEnv` if a present variable does not parse.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CHECK_INVARIANTS) {
            self.check_invariants = parse_var(ENV_CHECK_INVARIANTS, &value, parse_bool)?;
        }
        self.registry.apply_overrides_from(lookup)
    }
}

/// Load the full service configuration.
///
/// Starts from defaults, merges `path` if given, applies environment
/// overrides and validates the result.
///
/// # Errors
///
/// Any [`ConfigError`] raised along the way.
pub fn load(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading registry config file");
            ServiceConfig::from_toml_str(&read_file(path)?)?
        }
        None => ServiceConfig::default(),
    };
    config.apply_overrides_from(|var| std::env::var(var).ok())?;
    config.registry.validate()?;
    Ok(config)
}

// =============================================================================
// HELPERS
// =============================================================================

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse_var<T>(
    var: &'static str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    parse(value.trim()).ok_or_else(|| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_blacklist_policy(value: &str) -> Option<BlacklistPolicy> {
    match value.to_lowercase().as_str() {
        "enforce" => Some(BlacklistPolicy::Enforce),
        "ignore" => Some(BlacklistPolicy::Ignore),
        _ => None,
    }
}

fn parse_mint_authority(value: &str) -> Option<MintAuthority> {
    match value.to_lowercase().replace('-', "_").as_str() {
        "owner" => Some(MintAuthority::Owner),
        "owner_or_whitelisted" => Some(MintAuthority::OwnerOrWhitelisted),
        "anyone" => Some(MintAuthority::Anyone),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Address;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = RegistryConfig::from_toml_str("").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn test_registry_toml_fields() {
        let config = RegistryConfig::from_toml_str(
            r#"
            name = "Test Nodes"
            lock_time_secs = 60
            initial_token_id = 1000
            blacklist_policy = "ignore"
            mint_authority = "anyone"
            signer = "0x1111111111111111111111111111111111111111"
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "Test Nodes");
        assert_eq!(config.symbol, "DEPIN");
        assert_eq!(config.lock_time_secs, 60);
        assert_eq!(config.initial_token_id, 1000);
        assert_eq!(config.blacklist_policy, BlacklistPolicy::Ignore);
        assert_eq!(config.mint_authority, MintAuthority::Anyone);
        assert_eq!(config.signer, Address::new([0x11; 20]));
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let err = RegistryConfig::from_toml_str(r#"blacklist_policy = "sometimes""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_bad_signer_is_parse_error() {
        let err = RegistryConfig::from_toml_str(r#"signer = "0x1234""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_service_toml() {
        let config = ServiceConfig::from_toml_str(
            r#"
            check_invariants = false

            [registry]
            symbol = "NODE"
            "#,
        )
        .unwrap();
        assert!(!config.check_invariants);
        assert_eq!(config.registry.symbol, "NODE");
        assert_eq!(config.registry.name, "U2U DePIN Subnet Node");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides_from(lookup(&[
                ("QC_REGISTRY_SYMBOL", "ENV"),
                ("QC_REGISTRY_LOCK_TIME", " 3600 "),
                ("QC_REGISTRY_MINT_AUTHORITY", "owner"),
                ("QC_REGISTRY_BLACKLIST_POLICY", "Ignore"),
                ("QC_REGISTRY_CHECK_INVARIANTS", "1"),
                (
                    "QC_REGISTRY_SIGNER",
                    "2222222222222222222222222222222222222222",
                ),
            ]))
            .unwrap();

        assert!(config.check_invariants);
        assert_eq!(config.registry.symbol, "ENV");
        assert_eq!(config.registry.lock_time_secs, 3600);
        assert_eq!(config.registry.mint_authority, MintAuthority::Owner);
        assert_eq!(config.registry.blacklist_policy, BlacklistPolicy::Ignore);
        assert_eq!(config.registry.signer, Address::new([0x22; 20]));
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = RegistryConfig::default();
        let err = config
            .apply_overrides_from(lookup(&[("QC_REGISTRY_LOCK_TIME", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { var: "QC_REGISTRY_LOCK_TIME", ref value } if value == "soon"
        ));
        assert_eq!(config.lock_time_secs, RegistryConfig::default().lock_time_secs);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RegistryConfig::from_file("/nonexistent/qc-18/registry.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_sample_config_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/registry.toml");
        let content = fs::read_to_string(path).unwrap();
        let config = ServiceConfig::from_toml_str(&content).unwrap();
        assert!(config.registry.validate().is_ok());
        assert_eq!(config.registry.lock_time_secs, 14_515_200);
    }
}
