//! Read-only listings

use std::path::Path;

use keyglow::config::default_config_path;
use keyglow::effects::EFFECTS;
use keyglow::{Config, KeyMatrix, LogicalKey, TriggerTable};
use serde::Serialize;

use super::CommandResult;

#[derive(Serialize)]
struct KeyInfo {
    key: LogicalKey,
    codes: Vec<u8>,
    cells: Vec<(usize, usize)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suppressed_by: Option<LogicalKey>,
}

fn key_infos(table: &TriggerTable, matrix: &KeyMatrix) -> Vec<KeyInfo> {
    LogicalKey::ALL
        .iter()
        .map(|&key| KeyInfo {
            key,
            codes: table
                .codes(key)
                .map(|c| c.iter().copied().collect())
                .unwrap_or_default(),
            cells: matrix.positions(key).to_vec(),
            suppressed_by: table.suppressed_by(key),
        })
        .collect()
}

pub fn keys(json: bool) -> CommandResult {
    let infos = key_infos(&TriggerTable::reference(), KeyMatrix::reference());

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("{:<10} {:<18} Cells", "Key", "Codes");
    println!("{}", "-".repeat(48));
    for info in &infos {
        let codes = info
            .codes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("+");
        let cells = info
            .cells
            .iter()
            .map(|(x, y)| format!("{x},{y}"))
            .collect::<Vec<_>>()
            .join(" ");
        let note = info
            .suppressed_by
            .map(|k| format!("  (reported as {k})"))
            .unwrap_or_default();
        println!("{:<10} {:<18} {}{}", info.key.name(), codes, cells, note);
    }
    println!("\n{} keys", infos.len());
    Ok(())
}

pub fn effects() -> CommandResult {
    println!("Available effects:\n");
    for (name, description) in EFFECTS {
        println!("  {name:<12} {description}");
    }
    println!("\nSelect with `keyglow run --effect NAME` or `[effect] kind = \"NAME\"` in the config file.");
    Ok(())
}

pub fn config(path: Option<&Path>, init: bool) -> CommandResult {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let config = if init {
        let config = Config::default();
        config.save(&path)?;
        println!("Wrote default config: {}", path.display());
        config
    } else {
        Config::load_or_init(&path)?
    };
    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_infos_cover_all_keys() {
        let infos = key_infos(&TriggerTable::reference(), KeyMatrix::reference());
        assert_eq!(infos.len(), LogicalKey::COUNT);
        let num_enter = infos.iter().find(|i| i.key == LogicalKey::NumEnter).unwrap();
        assert_eq!(num_enter.suppressed_by, Some(LogicalKey::Enter));
        assert_eq!(num_enter.codes, vec![13]);
    }

    #[test]
    fn test_key_info_json() {
        let infos = key_infos(&TriggerTable::reference(), KeyMatrix::reference());
        let json = serde_json::to_value(&infos[0]).unwrap();
        assert_eq!(json["key"], "Esc");
        assert_eq!(json["codes"], serde_json::json!([27]));
        assert!(json.get("suppressed_by").is_none());
    }
}
