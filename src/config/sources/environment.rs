//! Environment variable source: BRICKGRAPH__ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `BRICKGRAPH__STORAGE__BACKEND=memory` sets `storage.backend`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix("BRICKGRAPH")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    ))
}
