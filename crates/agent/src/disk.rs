//! `df` execution and parsing.
//!
//! The agent shells out to the local `df` binary and reports the first data
//! row: lower-cased headers become keys, `use%` is reduced to its number,
//! and `diskUsed` is computed from the raw block counts so the monitor's
//! threshold compare does not depend on df's own rounding.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use tokio::process::Command;

/// Run `df <path>` and parse its first data row.
pub async fn check_disk(path: &str) -> Result<Map<String, Value>> {
    let output = Command::new("df")
        .arg(path)
        .output()
        .await
        .context("cannot execute df")?;

    if !output.status.success() {
        bail!("df exited with {}", output.status);
    }

    parse_df_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parse df's tabular output.
///
/// The `Mounted on` header splits into two tokens, so headers are truncated
/// to the value count, exactly like the row lines up visually.
pub fn parse_df_output(out: &str) -> Result<Map<String, Value>> {
    let mut lines = out.lines();
    let headers = lines.next().context("df produced no header row")?;
    let values = lines.next().context("df produced no data row")?;

    let header_tokens: Vec<String> = headers
        .split_whitespace()
        .map(|h| h.to_lowercase())
        .collect();
    let value_tokens: Vec<&str> = values.split_whitespace().collect();

    if value_tokens.is_empty() {
        bail!("df data row is empty");
    }

    let columns = header_tokens.len().min(value_tokens.len());
    let mut map = Map::new();
    for i in 0..columns {
        if header_tokens[i] == "use%" {
            map.insert(header_tokens[i].clone(), json!(leading_number(value_tokens[i])));
        } else {
            map.insert(header_tokens[i].clone(), json!(value_tokens[i]));
        }
    }

    // linux df reports the capacity column as "1K-blocks"
    if let Some(blocks) = map.get("1k-blocks").cloned() {
        map.insert("size".to_string(), blocks);
    }

    let used = map.get("used").map(number_of).unwrap_or(0.0);
    let available = map.get("available").map(number_of).unwrap_or(0.0);
    if used + available > 0.0 {
        let disk_used = (used / (used + available) * 100.0).round() as i64;
        map.insert("diskUsed".to_string(), json!(disk_used));
    } else {
        map.insert("diskUsed".to_string(), json!(0));
    }

    Ok(map)
}

/// Leading integer of a token, ignoring units and separators (`82%` -> 82,
/// `40G` -> 40).
fn leading_number(token: &str) -> i64 {
    let digits: String = token
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

fn number_of(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => leading_number(s) as f64,
        _ => 0.0,
    }
}
