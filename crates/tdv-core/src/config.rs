//! Validator configuration.
//!
//! Every field has a default, so an absent config file is equivalent to an
//! empty one. Values are layered: defaults, then the YAML file, then
//! environment overrides, then command-line flags (applied by the binary).

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::identity::{NamespaceUris, GRANOLA_BASE_URI, IEEE_BASE_URI, OMH_BASE_URI};
use crate::version::Version;

/// Environment variable overriding [`RemoteConfig::timeout_secs`].
pub const ENV_REMOTE_TIMEOUT_SECS: &str = "TDV_REMOTE_TIMEOUT_SECS";
/// Environment variable overriding [`RemoteConfig::enabled`].
pub const ENV_REMOTE_ENABLED: &str = "TDV_REMOTE_ENABLED";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Base URL per namespace, used to derive canonical and wildcard URIs.
    pub namespaces: BTreeMap<String, String>,
    /// Synthetic wrapper generation for the external namespace.
    pub synthetic: SyntheticConfig,
    /// Remote schema fetching.
    pub remote: RemoteConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        let namespaces = [
            ("granola", GRANOLA_BASE_URI),
            ("ieee", IEEE_BASE_URI),
            ("omh", OMH_BASE_URI),
        ]
        .into_iter()
        .map(|(ns, base)| (ns.to_string(), base.to_string()))
        .collect();

        Self {
            namespaces,
            synthetic: SyntheticConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

/// Settings for generated wrapper schemas in an external namespace.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    /// Whether wrappers are generated at all.
    pub enabled: bool,
    /// The namespace the wrappers are registered under.
    pub namespace: String,
    /// Version assigned to every wrapper.
    pub default_version: Version,
    /// Base of the raw-content URLs the wrappers reference.
    pub raw_base_url: String,
    /// Leaf schema name → directory under `raw_base_url`.
    pub directories: BTreeMap<String, String>,
    /// Leaf names whose wrapper has `"type": "string"` rather than `"object"`.
    pub string_types: BTreeSet<String>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: "ieee".to_string(),
            default_version: Version::new(1, 0),
            raw_base_url: "https://opensource.ieee.org/omh/1752/-/raw/main/schemas/".to_string(),
            directories: default_ieee_directories(),
            string_types: [
                "body-posture",
                "date-time",
                "descriptive-statistic",
                "descriptive-statistic-denominator",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

fn default_ieee_directories() -> BTreeMap<String, String> {
    const TABLE: &[(&str, &[&str])] = &[
        ("environment", &["ambient-light", "ambient-sound", "ambient-temperature"]),
        ("metadata", &["data-point", "data-series", "header", "schema-id"]),
        ("physical_activity", &["physical-activity"]),
        (
            "sleep",
            &[
                "apnea-hypopnea-index",
                "arousal-index",
                "deep-sleep",
                "light-sleep",
                "sleep-episode",
                "sleep-onset-latency",
                "sleep-stage-summary",
                "snore-index",
                "time-in-bed",
                "total-sleep-time",
                "wake-after-sleep-onset",
            ],
        ),
        (
            "survey",
            &[
                "survey-answer",
                "survey-categorical-answer",
                "survey-date-answer",
                "survey-item",
                "survey-question",
                "survey-time-answer",
                "survey-unit-value-answer",
                "survey",
            ],
        ),
        (
            "utility",
            &[
                "body-posture",
                "date-time",
                "descriptive-statistic-denominator",
                "descriptive-statistic",
                "duration-unit-value-range",
                "duration-unit-value",
                "frequency-unit-value",
                "illuminance-unit-value",
                "kcal-unit-value",
                "length-unit-value",
                "percent-unit-value",
                "sound-unit-value",
                "speed-unit-value",
                "temperature-unit-value",
                "time-frame",
                "time-interval",
                "unit-value-range",
                "unit-value",
            ],
        ),
    ];

    TABLE
        .iter()
        .flat_map(|(dir, names)| names.iter().map(move |name| (name.to_string(), dir.to_string())))
        .collect()
}

/// Settings for the remote fetch fallback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// Whether schemas may be fetched over HTTP.
    pub enabled: bool,
    /// Per-request timeout in seconds. Requests are attempted once.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 10,
        }
    }
}

impl ValidatorConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Apply `TDV_*` environment variable overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides using `lookup` as the variable source.
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(ENV_REMOTE_TIMEOUT_SECS) {
            self.remote.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
                var: ENV_REMOTE_TIMEOUT_SECS.to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_REMOTE_ENABLED) {
            self.remote.enabled = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnvOverride {
                        var: ENV_REMOTE_ENABLED.to_string(),
                        value: raw,
                    })
                }
            };
        }
        Ok(())
    }

    /// Validate the configuration and build the namespace URI table.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidBaseUrl`] if a base is not an absolute URL.
    /// - [`ConfigError::Identity`] if a namespace is malformed or two share a base.
    /// - [`ConfigError::UnknownSyntheticNamespace`] if synthetic generation is
    ///   enabled for a namespace without a base URL.
    pub fn namespace_uris(&self) -> Result<NamespaceUris, ConfigError> {
        let mut table = NamespaceUris::empty();
        for (namespace, base) in &self.namespaces {
            let parsed = Url::parse(base).map_err(|e| ConfigError::InvalidBaseUrl {
                namespace: namespace.clone(),
                reason: e.to_string(),
            })?;
            if parsed.cannot_be_a_base() {
                return Err(ConfigError::InvalidBaseUrl {
                    namespace: namespace.clone(),
                    reason: "URL cannot be used as a base".to_string(),
                });
            }
            table.insert(namespace.clone(), base.clone())?;
        }

        if self.synthetic.enabled && table.base_for(&self.synthetic.namespace).is_none() {
            return Err(ConfigError::UnknownSyntheticNamespace(
                self.synthetic.namespace.clone(),
            ));
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_known_namespaces() {
        let config = ValidatorConfig::default();
        let table = config.namespace_uris().unwrap();
        assert_eq!(table.namespaces().collect::<Vec<_>>(), ["granola", "ieee", "omh"]);
        assert_eq!(table, NamespaceUris::default());
    }

    #[test]
    fn default_synthetic_table_matches_leaf_names() {
        let synthetic = SyntheticConfig::default();
        assert_eq!(synthetic.directories.len(), 45);
        assert_eq!(synthetic.directories["header"], "metadata");
        assert_eq!(synthetic.directories["time-frame"], "utility");
        for name in &synthetic.string_types {
            assert!(synthetic.directories.contains_key(name), "{name} has no directory");
        }
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(ValidatorConfig::from_yaml_str("").unwrap(), ValidatorConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = ValidatorConfig::from_yaml_str(
            r#"
namespaces:
  omh: https://www.openmhealth.org/schema/omh
remote:
  timeout_secs: 3
synthetic:
  enabled: false
"#,
        )
        .unwrap();
        assert_eq!(config.namespaces.len(), 1);
        assert_eq!(config.remote.timeout_secs, 3);
        assert!(config.remote.enabled);
        assert!(!config.synthetic.enabled);
        let table = config.namespace_uris().unwrap();
        assert_eq!(
            table.base_for("omh"),
            Some("https://www.openmhealth.org/schema/omh/")
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ValidatorConfig::from_yaml_str("remote:\n  retries: 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let mut config = ValidatorConfig::default();
        config.namespaces.insert("omh".to_string(), "schemas/omh".to_string());
        assert!(matches!(
            config.namespace_uris(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn synthetic_namespace_must_have_base() {
        let mut config = ValidatorConfig::default();
        config.namespaces.remove("ieee");
        assert!(matches!(
            config.namespace_uris(),
            Err(ConfigError::UnknownSyntheticNamespace(ns)) if ns == "ieee"
        ));

        config.synthetic.enabled = false;
        assert!(config.namespace_uris().is_ok());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = ValidatorConfig::default();
        config
            .apply_overrides_from(|var| match var {
                ENV_REMOTE_TIMEOUT_SECS => Some("2".to_string()),
                ENV_REMOTE_ENABLED => Some("off".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.remote.timeout_secs, 2);
        assert!(!config.remote.enabled);
    }

    #[test]
    fn invalid_env_override_is_rejected() {
        let mut config = ValidatorConfig::default();
        let err = config
            .apply_overrides_from(|var| (var == ENV_REMOTE_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvOverride { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tdv.yaml");
        std::fs::write(&path, "remote:\n  enabled: false\n").unwrap();
        let config = ValidatorConfig::load(&path).unwrap();
        assert!(!config.remote.enabled);

        let missing = ValidatorConfig::load(&dir.path().join("absent.yaml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
