use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub strict_transitions: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_u16("PORT", 3000),
            data_dir: env::var("FISHBURGER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            strict_transitions: env_bool("FISHBURGER_STRICT_TRANSITIONS", false),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("fishburger.db")
    }
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
