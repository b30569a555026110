use anyhow::anyhow;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

pub const HOST_VAR: &str = "ATTENDANCE_HOST";
pub const PORT_VAR: &str = "ATTENDANCE_PORT";
pub const DATA_FILE_VAR: &str = "ATTENDANCE_DATA_FILE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: try_load(&lookup, HOST_VAR, "0.0.0.0")?,
            port: try_load(&lookup, PORT_VAR, "3000")?,
            data_file: try_load(&lookup, DATA_FILE_VAR, "data/attendance.json")?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow!("invalid {key} value {raw:?}: {e}"))
}
