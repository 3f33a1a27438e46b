use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::Parser;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const FALLBACK_DB_PATH: &str = "./data/db";

#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Path to the local configuration TOML file.
    #[arg(short, value_name = "CONFIG_PATH")]
    pub config: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Web {
    #[serde(deserialize_with = "deserialize_socket_addr")]
    pub address: SocketAddr,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Directory holding the sled database.
    pub path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub web: Web,
    pub database: DatabaseSettings,
}

impl Settings {
    /// Load settings from the given TOML file, with sane defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let builder = ConfigBuilder::<DefaultState>::default()
            .set_default("web.address", DEFAULT_ADDR)?
            .set_default("database.path", default_db_path())?;

        let cfg = builder.add_source(File::from(path)).build()?;

        cfg.try_deserialize()
    }
}

fn default_db_path() -> String {
    ProjectDirs::from("com", "realty", "realty-dashboard-server").map_or_else(
        || FALLBACK_DB_PATH.to_string(),
        |dirs| dirs.data_dir().join("db").to_string_lossy().into_owned(),
    )
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
