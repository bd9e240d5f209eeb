use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

/// Read a `value % key` parameter file into a key → value mapping.
///
/// Lines that are blank, lack a `%`, or carry an unparsable value are skipped
/// with a warning. A repeated key keeps its last value.
pub fn load_parameters(path: &Path) -> Result<HashMap<String, f64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading parameter file {}", path.display()))?;
    Ok(parse_parameters(&text))
}

pub fn parse_parameters(text: &str) -> HashMap<String, f64> {
    let mut params = HashMap::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let Some((value, key)) = line.split_once('%') else {
            warn!(line = lineno + 1, content = line, "skipping parameter line without '%'");
            continue;
        };
        let key = key.trim();
        if key.is_empty() || key.contains('%') {
            warn!(line = lineno + 1, content = line, "skipping parameter line without a single key");
            continue;
        }
        match value.trim().parse::<f64>() {
            Ok(v) => {
                params.insert(key.to_string(), v);
            }
            Err(e) => {
                warn!(line = lineno + 1, content = line, error = %e, "skipping unparsable parameter");
            }
        }
    }
    params
}
