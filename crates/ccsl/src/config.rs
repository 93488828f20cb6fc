//! Loading and saving the TOML configuration.
//!
//! Search order, first readable and parseable file wins:
//!
//! 1. `$CCSL_CONFIG`, if set (and nothing else is tried)
//! 2. `$XDG_CONFIG_HOME/ccsl/config.toml`, or `~/.config/ccsl/config.toml`
//! 3. `~/.claude/ccsl.toml`
//!
//! The file is layered over [`Config::default`]. Environment overrides are
//! applied last:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `CCSL_PROMPT_MAX` | `ui.truncate` |
//! | `CCSL_ANSI` | `theme.ansi` (`0`/`false` = off) |
//! | `CCSL_ICONS` | `theme.icons` (`0`/`false` = off) |

use ccsl_core::config::Config;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const CONFIG_ENV: &str = "CCSL_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("cannot determine the home directory")]
    NoHome,
}

/// A loaded configuration and the file it came from.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub config: Config,
    /// `None` when only defaults (and env overrides) apply.
    pub source: Option<PathBuf>,
}

/// `$XDG_CONFIG_HOME/ccsl/config.toml`, falling back to `~/.config`.
pub fn user_config_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => dirs::home_dir()?.join(".config"),
    };
    Some(base.join("ccsl").join("config.toml"))
}

/// `~/.claude/ccsl.toml`.
pub fn claude_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude").join("ccsl.toml"))
}

/// Candidate files in search order.
pub fn search_paths() -> Vec<PathBuf> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return vec![PathBuf::from(explicit)];
    }
    user_config_path()
        .into_iter()
        .chain(claude_config_path())
        .collect()
}

/// Parse TOML text into a config, keeping the stock producer table for
/// ids the text does not mention.
pub fn parse(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.fill_default_plugins();
    Ok(config)
}

pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, path)
}

/// Load from the first usable file in `paths`, then apply `env`.
///
/// Missing files are skipped silently; unparseable ones are skipped with a
/// warning. Never fails.
pub fn load_from(paths: &[PathBuf], env: impl Fn(&str) -> Option<String>) -> Loaded {
    let mut loaded = Loaded {
        config: Config::default(),
        source: None,
    };
    for path in paths {
        match load_file(path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                loaded = Loaded {
                    config,
                    source: Some(path.clone()),
                };
                break;
            }
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Skipping config: {e}"),
        }
    }
    apply_env(&mut loaded.config, env);
    loaded
}

/// Load using the standard search paths and the process environment.
pub fn load() -> Loaded {
    load_from(&search_paths(), |key| std::env::var(key).ok())
}

fn env_flag(value: &str) -> bool {
    let value = value.trim();
    value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Apply `CCSL_*` overrides read through `env`.
pub fn apply_env(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
    if let Some(max) = env("CCSL_PROMPT_MAX") {
        match max.trim().parse::<usize>() {
            Ok(n) => config.ui.truncate = n,
            Err(_) => warn!("Ignoring CCSL_PROMPT_MAX={max:?}: not a number"),
        }
    }
    if let Some(ansi) = env("CCSL_ANSI").filter(|v| !v.is_empty()) {
        config.theme.ansi = env_flag(&ansi);
    }
    if let Some(icons) = env("CCSL_ICONS").filter(|v| !v.is_empty()) {
        config.theme.icons = env_flag(&icons);
    }
}

/// Write `config` to `path` as TOML, creating parent directories. The file
/// is written next to its destination and renamed into place.
pub fn save(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(config)?;
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(write_err)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, text).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)
}

/// Where `setup` writes: `$CCSL_CONFIG` if set, else the user config path.
pub fn save_path() -> Result<PathBuf, ConfigError> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(explicit));
    }
    user_config_path().ok_or(ConfigError::NoHome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = Config::default();
        apply_env(
            &mut cfg,
            env(&[("CCSL_PROMPT_MAX", "60"), ("CCSL_ANSI", "0"), ("CCSL_ICONS", "FALSE")]),
        );
        assert_eq!(cfg.ui.truncate, 60);
        assert!(!cfg.theme.ansi);
        assert!(!cfg.theme.icons);
    }

    #[test]
    fn bad_numeric_override_is_ignored() {
        let mut cfg = Config::default();
        apply_env(&mut cfg, env(&[("CCSL_PROMPT_MAX", "wide")]));
        assert_eq!(cfg.ui.truncate, 120);
    }

    #[test]
    fn truthy_override_keeps_flag_on() {
        let mut cfg = Config::default();
        cfg.theme.ansi = false;
        apply_env(&mut cfg, env(&[("CCSL_ANSI", "1")]));
        assert!(cfg.theme.ansi);
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = parse("[ui\ntemplate = ", Path::new("/x/config.toml")).unwrap_err();
        assert!(err.to_string().contains("/x/config.toml"));
    }
}
