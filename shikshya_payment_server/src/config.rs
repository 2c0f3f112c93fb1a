use std::env;

use log::*;
use wallet_gateways::{EsewaConfig, KhaltiConfig};

const DEFAULT_SPG_HOST: &str = "127.0.0.1";
const DEFAULT_SPG_PORT: u16 = 8480;
const DEFAULT_SPG_DATABASE_URL: &str = "sqlite://data/shikshya_store.db";

#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub esewa: EsewaConfig,
    pub khalti: KhaltiConfig,
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPG_HOST").ok().unwrap_or_else(|| DEFAULT_SPG_HOST.into());
        let port = env::var("SPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPG_PORT. {e} Using the default, {DEFAULT_SPG_PORT}, instead."
                    );
                    DEFAULT_SPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPG_PORT);
        let database_url = env::var("SPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SPG_DATABASE_URL is not set. Using the default, {DEFAULT_SPG_DATABASE_URL}.");
            DEFAULT_SPG_DATABASE_URL.to_string()
        });
        let esewa = EsewaConfig::new_from_env_or_default();
        let khalti = KhaltiConfig::new_from_env_or_default();
        Self { host, port, database_url, esewa, khalti }
    }
}
