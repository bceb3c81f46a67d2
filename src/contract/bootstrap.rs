//! Locating the metadata endpoint from the bootstrap configuration

use serde::Deserialize;
use std::path::Path;

use crate::types::ReportError;

/// Inline bootstrap JSON
pub const ENV_BOOTSTRAP_CONFIG: &str = "OPENSERGO_BOOTSTRAP_CONFIG";
/// Path to a bootstrap JSON file, read when the inline config is absent
pub const ENV_BOOTSTRAP: &str = "OPENSERGO_BOOTSTRAP";

#[derive(Debug, Deserialize)]
struct BootstrapConfig {
    #[serde(default)]
    endpoint: String,
}

/// Resolve the endpoint using the process environment
pub fn endpoint_from_env() -> Result<String, ReportError> {
    let inline = std::env::var(ENV_BOOTSTRAP_CONFIG).ok();
    let path = std::env::var(ENV_BOOTSTRAP).ok();
    resolve_endpoint(inline.as_deref(), path.as_deref().map(Path::new))
}

/// Resolve the endpoint from inline JSON or, failing that, a JSON file.
///
/// The result always carries a scheme, `host:port` becomes `http://host:port`.
pub fn resolve_endpoint(inline: Option<&str>, path: Option<&Path>) -> Result<String, ReportError> {
    let raw = match inline.filter(|s| !s.trim().is_empty()) {
        Some(config) => config.to_string(),
        None => {
            let path = path.ok_or_else(|| {
                ReportError::Bootstrap(format!(
                    "neither {} nor {} is set",
                    ENV_BOOTSTRAP_CONFIG, ENV_BOOTSTRAP
                ))
            })?;
            std::fs::read_to_string(path).map_err(|e| {
                ReportError::Bootstrap(format!("cannot read {}: {}", path.display(), e))
            })?
        }
    };

    let config: BootstrapConfig = serde_json::from_str(&raw)?;
    let endpoint = config.endpoint.trim();
    if endpoint.is_empty() {
        return Err(ReportError::MissingEndpoint);
    }

    if endpoint.contains("://") {
        Ok(endpoint.to_string())
    } else {
        Ok(format!("http://{}", endpoint))
    }
}
