/// Configuration system for switchboard.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::SwitchboardConfig::default()`]
/// 2. **User global config**: `~/.switchboard/config.toml`
/// 3. **Project local config**: `.switchboard.toml` in the current working directory
/// 4. **Environment variables**: `SWITCHBOARD_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to built-in defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use switchboard::config;
///
/// let cfg = config::load();
/// let backend = HttpBackend::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::SwitchboardConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved switchboard configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> SwitchboardConfig {
    let mut merged = toml::Table::new();

    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_file(path) {
            merge_tables(&mut merged, layer);
        }
    }

    let mut config = toml::Value::Table(merged)
        .try_into::<SwitchboardConfig>()
        .unwrap_or_default();

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Files that do not parse as a valid config layer are ignored, so a broken
/// config never keeps the panel from starting.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Table> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str::<SwitchboardConfig>(&content).ok()?;
    toml::from_str(&content).ok()
}

/// Overlay `layer` onto `base` key by key; nested tables merge recursively.
fn merge_tables(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding the global config and the failure log: `~/.switchboard/`.
pub fn state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".switchboard"))
}

fn global_config_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".switchboard.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `SWITCHBOARD_BACKEND_URL`: scenario runner base URL
/// - `SWITCHBOARD_TIMEOUT_MS`: per-request timeout
/// - `SWITCHBOARD_LISTEN`: page server address
/// - `SWITCHBOARD_POLL_MS`: run-status poll interval
/// - `SWITCHBOARD_LOGGING`: failure log (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut SwitchboardConfig) {
    if let Ok(val) = std::env::var("SWITCHBOARD_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.url = val;
    }
    if let Ok(val) = std::env::var("SWITCHBOARD_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("SWITCHBOARD_LISTEN")
        && !val.is_empty()
    {
        config.panel.listen = val;
    }
    if let Ok(val) = std::env::var("SWITCHBOARD_POLL_MS")
        && let Ok(ms) = val.parse::<u64>()
        && ms > 0
    {
        config.panel.status_poll_ms = ms;
    }
    if let Ok(val) = std::env::var("SWITCHBOARD_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.switchboard/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.switchboard/ directory")?;
    }

    fs::write(&path, SwitchboardConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `backend.url`. The existing value's type decides
/// how `value` is parsed.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&SwitchboardConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&source).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((parents, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must be `section.key`, got '{key}'");
    };

    let mut current = root;
    for part in parents.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{parents}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str(
            r#"
[backend]
url = "http://a:1"
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "backend.url", "http://b:2").unwrap();
        assert_eq!(root["backend"]["url"].as_str(), Some("http://b:2"));
    }

    #[test]
    fn set_toml_value_keeps_integer_type() {
        let mut root: toml::Value = toml::from_str(
            r#"
[panel]
status_poll_ms = 1000
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "panel.status_poll_ms", "500").unwrap();
        assert_eq!(root["panel"]["status_poll_ms"].as_integer(), Some(500));

        let err = set_toml_value(&mut root, "panel.status_poll_ms", "soon");
        assert!(err.is_err());
    }

    #[test]
    fn set_toml_value_updates_bool() {
        let mut root: toml::Value = toml::from_str(
            r#"
[logging]
enabled = true
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "logging.enabled", "off").unwrap();
        assert_eq!(root["logging"]["enabled"].as_bool(), Some(false));
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str(
            r#"
[backend]
url = "http://a:1"
"#,
        )
        .unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "backend.nope", "value").is_err());
        assert!(set_toml_value(&mut root, "backend", "value").is_err());
    }

    #[test]
    fn later_layer_overrides_only_its_own_keys() {
        let mut merged: toml::Table = toml::from_str(
            r#"
[backend]
url = "http://global:1"
timeout_ms = 500
"#,
        )
        .unwrap();
        let project: toml::Table = toml::from_str(
            r#"
[backend]
url = "http://project:2"
"#,
        )
        .unwrap();
        merge_tables(&mut merged, project);

        let config: SwitchboardConfig = toml::Value::Table(merged).try_into().unwrap();
        assert_eq!(config.backend.url, "http://project:2");
        assert_eq!(config.backend.timeout_ms, 500);
        assert_eq!(config.panel.status_poll_ms, 1000);
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: SwitchboardConfig = toml::from_str(&toml_str).unwrap();
    }
}
