//! Session configuration: engine location, engine resources, search
//! depth and tablebase directory.
//!
//! Settings are read from a JSON file whose keys match the fields of
//! [`Config`]. Missing keys take their defaults; unknown keys are logged
//! and ignored.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{depth::DepthPolicy, engine::EngineOptions, error::AnalyzerError};

const ENGINE_NAME: &str = "stockfish";

const ENGINE_LOCATIONS: [&str; 5] = [
    "/opt/homebrew/bin/stockfish",
    "/usr/local/bin/stockfish",
    "/opt/local/bin/stockfish",
    "/usr/bin/stockfish",
    "/usr/games/stockfish",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine_path: PathBuf,
    pub threads: u32,
    /// Hash table size in MB.
    pub hash_size: u32,
    pub skill_level: u8,
    /// Fixed search depth; dynamic depth when absent.
    pub eval_depth: Option<u32>,
    pub syzygy_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let engine = EngineOptions::default();
        Self {
            engine_path: find_engine_path(),
            threads: engine.threads,
            hash_size: engine.hash_size,
            skill_level: engine.skill_level,
            eval_depth: None,
            syzygy_path: expand_home(Path::new("~/chess/syzygy")),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, AnalyzerError> {
        let text = fs::read_to_string(path).map_err(|source| AnalyzerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    fn from_json(text: &str, path: &Path) -> Result<Self, AnalyzerError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let serde_json::Value::Object(mut fields) = value else {
            return Err(AnalyzerError::Config {
                path: path.to_path_buf(),
                message: "expected a JSON object".to_string(),
            });
        };

        let known = [
            "engine_path",
            "threads",
            "hash_size",
            "skill_level",
            "eval_depth",
            "syzygy_path",
        ];
        let unknown: Vec<String> = fields
            .keys()
            .filter(|k| !known.contains(&k.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            warn!(
                "ignoring unknown config fields in {}: {}",
                path.display(),
                unknown.join(", ")
            );
            fields.retain(|k, _| known.contains(&k.as_str()));
        }

        let mut config: Config = serde_json::from_value(serde_json::Value::Object(fields))?;
        config.syzygy_path = expand_home(&config.syzygy_path);
        config.engine_path = expand_home(&config.engine_path);
        config.validate().map_err(|message| AnalyzerError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), AnalyzerError> {
        let io_err = |source| AnalyzerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n").map_err(io_err)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.threads == 0 {
            return Err("threads must be at least 1".to_string());
        }
        if self.hash_size == 0 {
            return Err("hash_size must be at least 1 MB".to_string());
        }
        if self.skill_level > 20 {
            return Err(format!(
                "skill_level must be between 0 and 20, got {}",
                self.skill_level
            ));
        }
        if self.eval_depth == Some(0) {
            return Err("eval_depth must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            threads: self.threads,
            hash_size: self.hash_size,
            skill_level: self.skill_level,
        }
    }

    pub fn depth_policy(&self) -> DepthPolicy {
        self.eval_depth.map_or(DepthPolicy::Dynamic, DepthPolicy::Fixed)
    }
}

/// Replace a leading `~` with the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

fn default_engine_path() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/opt/homebrew/bin/stockfish")
    } else {
        PathBuf::from("/usr/games/stockfish")
    }
}

/// Locate the engine: `PATH` first, then well-known install locations,
/// then the platform default even if it does not exist.
pub fn find_engine_path() -> PathBuf {
    let exe = format!("{ENGINE_NAME}{}", env::consts::EXE_SUFFIX);
    let on_path = env::var_os("PATH")
        .into_iter()
        .flat_map(|paths| env::split_paths(&paths).collect::<Vec<_>>())
        .map(|dir| dir.join(&exe))
        .find(|candidate| is_executable(candidate));

    if let Some(path) = on_path {
        debug!("found engine on PATH: {}", path.display());
        return path;
    }

    if let Some(path) = ENGINE_LOCATIONS
        .iter()
        .map(PathBuf::from)
        .find(|p| is_executable(p))
    {
        debug!("found engine at {}", path.display());
        return path;
    }

    let fallback = default_engine_path();
    debug!("no engine found, defaulting to {}", fallback.display());
    fallback
}
