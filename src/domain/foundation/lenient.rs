//! Lenient numeric deserialization for loosely typed external records.

use serde::{Deserialize, Deserializer};

/// Accepts a JSON number, a numeric string or anything else (yielding `None`).
///
/// Fractional values are truncated; negative or out-of-range values yield `None`.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    })
    .and_then(|n| u32::try_from(n).ok()))
}

fn whole(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0).then(|| f as u64)
}
