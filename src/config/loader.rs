use super::{ConfigError, Settings};
use serde_yaml::{Mapping, Value};
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, info};

/// Load a `.yaml`/`.yml`/`.json` file as an untyped document
pub fn load_value(path: &Path) -> Result<Value, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let value: Value = match extension.as_deref() {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        }
        Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    let empty = match &value {
        Value::Null => true,
        Value::Mapping(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }

    debug!("Loaded configuration document from {}", path.display());
    Ok(value)
}

/// Merge `overlay` into `base`
///
/// Mappings merge recursively, two sequences merge into a sorted union
/// without duplicates, and any other overlay value replaces the base value.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            merge_mappings(base_map, overlay_map);
        }
        (Value::Sequence(base_seq), Value::Sequence(overlay_seq)) => {
            for item in overlay_seq {
                if !base_seq.contains(&item) {
                    base_seq.push(item);
                }
            }
            base_seq.sort_by(compare_scalars);
        }
        (base, overlay) => *base = overlay,
    }
}

fn merge_mappings(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge_values(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

/// Orders strings and numbers; everything else compares equal so a stable
/// sort leaves it in place.
fn compare_scalars(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Load, apply environment overrides and validate a single settings file
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    load_layered(path, None)
}

/// Load default settings layered with an optional override file, reading
/// overrides from the process environment
pub fn load_layered(default_path: &Path, override_path: Option<&Path>) -> Result<Settings, ConfigError> {
    load_layered_with(default_path, override_path, |key| std::env::var(key).ok())
}

/// Like [`load_layered`] with a custom environment lookup
pub fn load_layered_with<F>(
    default_path: &Path,
    override_path: Option<&Path>,
    env: F,
) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut document = load_value(default_path)?;
    if let Some(override_path) = override_path {
        let overlay = load_value(override_path)?;
        debug!(
            "Merging {} into {}",
            override_path.display(),
            default_path.display()
        );
        merge_values(&mut document, overlay);
    }

    let mut settings = Settings::from_value(document)?;
    settings.apply_env_overrides_with(env);
    settings.validate()?;

    info!(
        "Loaded settings from {} ({} enabled services)",
        default_path.display(),
        settings.services().iter().filter(|(_, s)| s.is_enabled()).count()
    );
    Ok(settings)
}
