use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::SimConfig;

/// Loads a simulation config from a TOML or JSON file, picked by
/// extension. Keys absent from the file keep their defaults; the loaded
/// config is validated before use.
pub fn load_config(path: &Path) -> Result<SimConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    let config: SimConfig = match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err)))?,
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err)))?,
        "" => return Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        other => return Err(Error::UnsupportedConfigFormat(other.to_string())),
    };
    config.validate()?;
    Ok(config)
}
