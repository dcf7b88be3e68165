use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::Parser;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_FETCH_INTERVAL: u64 = 600;
const DEFAULT_RETRY_INTERVAL: u64 = 60;

#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Path to the local configuration TOML file.
    #[arg(short, value_name = "CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Normalizes a form template file and exits.
    #[arg(long, value_name = "TEMPLATE_PATH")]
    pub normalize_template: Option<PathBuf>,

    /// Directory the normalized template is written to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Web {
    #[serde(deserialize_with = "deserialize_socket_addr")]
    pub address: SocketAddr,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: Option<String>,
    /// Ids of the forms to keep in sync.
    pub forms: Vec<i64>,
    /// Seconds between fetches.
    pub fetch_interval: u64,
    /// Seconds between retries of a failed fetch.
    pub retry_interval: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub web: Web,
    pub api: ApiSettings,
}

impl Settings {
    /// Load settings from the given TOML file, with sane defaults.
    pub fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::<DefaultState>::default()
            .set_default("web.address", DEFAULT_ADDR)?
            .set_default("api.base_url", DEFAULT_API_URL)?
            .set_default("api.forms", Vec::<i64>::new())?
            .set_default("api.fetch_interval", DEFAULT_FETCH_INTERVAL)?
            .set_default("api.retry_interval", DEFAULT_RETRY_INTERVAL)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder.build()?.try_deserialize()
    }
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
