//! Built-in defaults, the lowest layer of every merge.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("catalog.root_id", 1i64)?
        .set_default("catalog.root_name", "BRICK Database")?
        .set_default("catalog.root_item_id", "1")?
        .set_default("catalog.default_color", "Default")?
        .set_default("storage.backend", "sled")?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "file")
}
