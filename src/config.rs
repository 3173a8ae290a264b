//! Command line / environment configuration

use std::path::PathBuf;

use clap::Parser;

use crate::db::StoreKind;

#[derive(Debug, Clone, Parser)]
#[command(name = "probe_radar")]
#[command(about = "Live device roster fed by WiFi/BLE probe scan reports")]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "RADAR_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// HTTP port
    #[arg(long, env = "RADAR_PORT", default_value = "8080")]
    pub port: u16,

    /// Directory holding the roster and classification cache
    #[arg(long, env = "RADAR_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Storage backend
    #[arg(long, env = "RADAR_STORE", value_enum, default_value = "json")]
    pub store: StoreKind,

    /// tracing filter directive, used when RUST_LOG is not set
    #[arg(long, env = "RADAR_LOG", default_value = "probe_radar=info,actix_web=info")]
    pub log_filter: String,
}
