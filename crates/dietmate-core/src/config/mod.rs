mod dirs;
mod settings;
mod validation;

pub use dirs::Directories;
pub use settings::{AppConfig, Config, DaemonConfig};
pub use validation::warn_unknown_fields;
