use std::path::PathBuf;

use crate::Result;
pub use clap::Parser;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "CATALOG_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "CATALOG_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "CATALOG_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the server, as visible to users"
    )]
    pub base_url: Url,

    #[arg(
        long,
        env = "CATALOG_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/catalog.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "CATALOG_DATA_DIR",
        help = "Data directory for the database, default is system default like ~/.local/share/catalog",
        default_value_t = default_data_dir()
    )]
    data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("catalog"))
        .unwrap_or_else(|| PathBuf::from("catalog"))
        .to_string_lossy()
        .to_string()
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/catalog.db", self.data_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_data_dir() {
        let config =
            ServerConfig::try_parse_from(["catalog-server", "--data-dir", "/tmp/catalog-test"])
                .unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/catalog-test"));
        assert_eq!(
            config.database_url(),
            "sqlite:///tmp/catalog-test/catalog.db"
        );
    }

    #[test]
    fn test_explicit_database_url() {
        let config = ServerConfig::try_parse_from([
            "catalog-server",
            "--port",
            "8080",
            "--database-url",
            "sqlite::memory:",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url(), "sqlite::memory:");
    }
}
