//! `EngineConfig` (grounded on `tasker-shared::config::orchestration`): a
//! small `serde`-deserializable struct layered over a `config`-crate
//! builder, with `dotenvy` loading `.env` first exactly as the teacher does.

use serde::Deserialize;

use crate::error::EngineResult;
use crate::phase::DEFAULT_MAX_HANDLER_EXECUTIONS;

/// Engine-wide tunables. `Default` always produces a usable configuration —
/// this is a library, not a service, so no config file is ever required.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cap on total executions of a single handler requesting RETRY
    /// (spec.md §4.1: "spec choice: 3 total executions").
    pub max_handler_executions: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_handler_executions: DEFAULT_MAX_HANDLER_EXECUTIONS,
        }
    }
}

impl EngineConfig {
    /// Loads `.env` (if present), then layers an optional
    /// `config/engine.toml` file under `ENGINE_`-prefixed environment
    /// overrides, falling back to [`Default`] for anything unset.
    pub fn load() -> EngineResult<Self> {
        let _ = dotenvy::dotenv();
        Self::load_from("config/engine.toml")
    }

    /// Like [`load`](Self::load) but reads the TOML source from an explicit
    /// path — the hook the test suite uses with a `tempfile` fixture.
    pub fn load_from(path: &str) -> EngineResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("ENGINE"))
            .build()?;
        Ok(settings.try_deserialize::<EngineConfig>().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_uses_the_spec_retry_cap() {
        let config = EngineConfig::default();
        assert_eq!(config.max_handler_executions, 3);
    }

    #[test]
    fn load_from_missing_path_falls_back_to_default() {
        let config = EngineConfig::load_from("definitely/not/a/real/path.toml").unwrap();
        assert_eq!(config.max_handler_executions, 3);
    }

    #[test]
    fn load_from_file_source_overrides_the_default() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "max_handler_executions = 5").unwrap();
        let config = EngineConfig::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.max_handler_executions, 5);
    }
}
