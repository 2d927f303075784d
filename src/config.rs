//! Solver configuration
//!
//! Defaults suit every species; a JSON file or environment variables can
//! override them:
//!
//! - `FLORA_CONFIG`: path to a JSON config file
//! - `FLORA_MAX_PASSES`: pass ceiling for the solver
//! - `FLORA_RESOLVER`: `none` or `color-test`

use crate::error::{FloraError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Which ambiguity resolver the solver consults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverKind {
    /// Color is taken as proof; no test crosses
    #[default]
    None,
    /// Search known genotypes for a disambiguating test cross
    ColorTest,
}

impl ResolverKind {
    pub fn name(self) -> &'static str {
        match self {
            ResolverKind::None => "none",
            ResolverKind::ColorTest => "color-test",
        }
    }
}

impl FromStr for ResolverKind {
    type Err = FloraError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(ResolverKind::None),
            "color-test" | "color_test" => Ok(ResolverKind::ColorTest),
            other => Err(FloraError::Config(format!("unknown resolver '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Upper bound on relaxation passes; reaching it means no fixed point
    pub max_passes: usize,
    /// Ambiguity resolver consulted before admitting an offspring
    pub resolver: ResolverKind,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_passes: 256,
            resolver: ResolverKind::None,
        }
    }
}

impl SolverConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Build from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("FLORA_CONFIG") {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(raw) = lookup("FLORA_MAX_PASSES") {
            config.max_passes = raw
                .trim()
                .parse()
                .map_err(|_| FloraError::Config(format!("FLORA_MAX_PASSES '{}' is not a number", raw)))?;
        }
        if let Some(raw) = lookup("FLORA_RESOLVER") {
            config.resolver = raw.parse()?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_passes == 0 {
            return Err(FloraError::Config("max_passes must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SolverConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SolverConfig::default());
        assert_eq!(config.resolver, ResolverKind::None);
    }

    #[test]
    fn test_env_overrides() {
        let config = SolverConfig::from_lookup(lookup(&[
            ("FLORA_MAX_PASSES", "12"),
            ("FLORA_RESOLVER", "Color-Test"),
        ]))
        .unwrap();
        assert_eq!(config.max_passes, 12);
        assert_eq!(config.resolver, ResolverKind::ColorTest);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            SolverConfig::from_lookup(lookup(&[("FLORA_MAX_PASSES", "0")])),
            Err(FloraError::Config(_))
        ));
        assert!(matches!(
            SolverConfig::from_lookup(lookup(&[("FLORA_MAX_PASSES", "many")])),
            Err(FloraError::Config(_))
        ));
        assert!(matches!(
            SolverConfig::from_lookup(lookup(&[("FLORA_RESOLVER", "oracle")])),
            Err(FloraError::Config(_))
        ));
    }

    #[test]
    fn test_load_partial_json() {
        let path = std::env::temp_dir().join(format!("flora-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "resolver": "color-test" }"#).unwrap();
        let config = SolverConfig::from_lookup(lookup(&[(
            "FLORA_CONFIG",
            path.to_str().unwrap(),
        )]))
        .unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.resolver, ResolverKind::ColorTest);
        assert_eq!(config.max_passes, SolverConfig::default().max_passes);
    }
}
