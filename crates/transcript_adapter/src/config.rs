#![forbid(unsafe_code)]

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMode {
    InMemory,
    Journal(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub bind: SocketAddr,
    pub store: StoreMode,
    pub log_json: bool,
}

impl AdapterConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_env_var_map(|key| env::var(key).ok())
    }

    pub fn from_env_var_map<F>(mut env_getter: F) -> Result<Self, String>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let bind_raw = env_getter("TRANSCRIPT_HTTP_BIND")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|err| format!("invalid TRANSCRIPT_HTTP_BIND '{bind_raw}': {err}"))?;

        let in_memory = parse_flag(env_getter("TRANSCRIPT_STORE_IN_MEMORY").as_deref(), false);
        let store = if in_memory {
            StoreMode::InMemory
        } else {
            let path = env_getter("TRANSCRIPT_STORE_PATH")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| default_store_path(env_getter("HOME")));
            StoreMode::Journal(path)
        };

        let log_json = parse_flag(env_getter("TRANSCRIPT_LOG_JSON").as_deref(), false);

        Ok(Self {
            bind,
            store,
            log_json,
        })
    }
}

fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "on" | "yes") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "off" | "no") => false,
        _ => default,
    }
}

fn default_store_path(home: Option<String>) -> PathBuf {
    if let Some(home) = home {
        let home = home.trim();
        if !home.is_empty() {
            return PathBuf::from(home).join(".transcripts/store.jsonl");
        }
    }
    PathBuf::from(".transcripts/store.jsonl")
}
