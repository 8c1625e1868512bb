use directories::ProjectDirs;
use std::path::PathBuf;

/// Application directories following XDG spec
#[derive(Debug, Clone)]
pub struct Directories {
    /// Config directory (~/.config/dietmate)
    pub config: PathBuf,

    /// Config file path
    pub config_file: PathBuf,
}

impl Directories {
    /// Standard XDG paths, or a `dietmate` directory under the system temp
    /// dir when no home directory can be determined.
    #[must_use]
    pub fn new() -> Self {
        let config = ProjectDirs::from("", "", "dietmate").map_or_else(
            || std::env::temp_dir().join("dietmate"),
            |project| project.config_dir().to_path_buf(),
        );
        Self::with_base(config)
    }

    #[must_use]
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.json"),
            config: base,
        }
    }
}

impl Default for Directories {
    fn default() -> Self {
        Self::new()
    }
}
