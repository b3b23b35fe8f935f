use std::{fs::OpenOptions, io, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse paging config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Page size must be positive")]
    ZeroPageSize,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagingConfig {
    pub page_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        PagingConfig {
            page_size: 100,
        }
    }
}

impl PagingConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = OpenOptions::new().read(true).open(path.as_ref())?;
        let config: PagingConfig = serde_json::from_reader(io::BufReader::new(file))?;
        config.validate()?;
        log::debug!("Loaded paging config from {}: {:?}", path.as_ref().display(), config);
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.validate()?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.as_ref())?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }
}
