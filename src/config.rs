use std::path::PathBuf;

use clap::Parser;
use hookwatch_server::ServerConfig;
use hookwatch_telemetry::TelemetryConfig;
use tracing::Level;

/// Repository webhook receiver and activity dashboard.
#[derive(Debug, Parser)]
#[command(name = "hookwatch", version, about)]
pub struct Cli {
    /// Address to bind.
    #[arg(long, env = "HOOKWATCH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "HOOKWATCH_PORT", default_value_t = 5000)]
    pub port: u16,

    /// SQLite database file. Defaults to ~/.hookwatch/events.db.
    #[arg(long, env = "HOOKWATCH_DATABASE", conflicts_with = "in_memory")]
    pub database: Option<PathBuf>,

    /// Keep events in memory only; they are lost on exit.
    #[arg(long)]
    pub in_memory: bool,

    /// Default log level (trace, debug, info, warn, error). RUST_LOG wins.
    #[arg(long, env = "HOOKWATCH_LOG", default_value = "info", value_parser = parse_level)]
    pub log_level: Level,

    /// Per-module level override as `module=level`; repeatable.
    #[arg(long = "log-module", value_name = "MODULE=LEVEL", value_parser = parse_module_level)]
    pub log_modules: Vec<(String, Level)>,

    /// Log JSON lines instead of text.
    #[arg(long, env = "HOOKWATCH_LOG_JSON")]
    pub log_json: bool,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }

    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            log_level: self.log_level,
            module_levels: self.log_modules.clone(),
            json: self.log_json,
        }
    }

    /// Database location, or `None` for a volatile in-memory store.
    pub fn database_path(&self) -> Option<PathBuf> {
        if self.in_memory {
            return None;
        }
        Some(
            self.database
                .clone()
                .unwrap_or_else(|| dirs_home().join(".hookwatch").join("events.db")),
        )
    }
}

fn parse_level(raw: &str) -> Result<Level, String> {
    hookwatch_telemetry::parse_level(raw).ok_or_else(|| format!("unknown log level: {raw}"))
}

fn parse_module_level(raw: &str) -> Result<(String, Level), String> {
    let (module, level) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected MODULE=LEVEL, got {raw:?}"))?;
    let module = module.trim();
    if module.is_empty() {
        return Err(format!("missing module name in {raw:?}"));
    }
    Ok((module.to_owned(), parse_level(level)?))
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
