//! Config validation - warns about unknown fields

use serde_json::Value;
use tracing::warn;

const SECTIONS: &[(&str, &[&str])] = &[
    ("app", &["rootUrl", "mainPageMarker"]),
    ("daemon", &["hostRequestTimeoutMs"]),
];

/// Validate JSON config and warn about unknown fields.
pub fn warn_unknown_fields(content: &str, config_name: &str) {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        return;
    };

    for path in find_unknown_keys(&value) {
        warn!("Unknown config field in {config_name}: {path}");
    }
}

/// Returns paths like "app.unknownField" for unknown fields.
fn find_unknown_keys(value: &Value) -> Vec<String> {
    let Value::Object(obj) = value else {
        return Vec::new();
    };

    let mut unknowns = Vec::new();
    for (key, child) in obj {
        let Some((_, fields)) = SECTIONS.iter().find(|(name, _)| *name == key.as_str()) else {
            unknowns.push(key.clone());
            continue;
        };

        if let Value::Object(section) = child {
            unknowns.extend(
                section
                    .keys()
                    .filter(|field| !fields.contains(&field.as_str()))
                    .map(|field| format!("{key}.{field}")),
            );
        }
    }
    unknowns
}
