//! Save record and field-by-field repair
//!
//! Loading never fails: every field that is missing, of the wrong type or out
//! of range is replaced with its default and reported.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::money::Money;

/// Version stamped on every write
pub const SAVE_VERSION: &str = "1.0.0";

/// Persistent progress across runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub version: String,
    /// Best wave ever reached (at least 1)
    pub max_stage: u32,
    pub rebirth_stones: Money,
    pub attack_level: u32,
    /// Unix ms
    pub last_played: f64,
    /// Unix ms
    pub last_saved: f64,
}

impl SaveRecord {
    /// Fresh record stamped at `now`
    pub fn default_at(now: f64) -> Self {
        Self {
            version: SAVE_VERSION.to_string(),
            max_stage: 1,
            rebirth_stones: Money::ZERO,
            attack_level: 0,
            last_played: now,
            last_saved: now,
        }
    }
}

/// A repaired record and the fields that had to be fixed
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub record: SaveRecord,
    pub repaired_fields: Vec<&'static str>,
}

impl Repaired {
    pub fn is_clean(&self) -> bool {
        self.repaired_fields.is_empty()
    }
}

static MISSING: Value = Value::Null;

/// Non-negative integer from a JSON number (fractions are floored)
fn as_count(value: &Value) -> Option<u32> {
    let n = value.as_f64()?;
    if !n.is_finite() || n < 0.0 || n > u32::MAX as f64 {
        return None;
    }
    Some(n.floor() as u32)
}

fn as_timestamp(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite() && *n >= 0.0)
}

fn as_stones(value: &Value) -> Option<Money> {
    let money = match value {
        Value::String(text) => text.parse::<Money>().ok()?,
        Value::Number(n) => Money::from_f64(n.as_f64()?),
        _ => return None,
    };
    (!money.is_negative()).then_some(money)
}

/// Rebuild a record from arbitrary JSON
pub fn repair(value: &Value, now: f64) -> Repaired {
    let defaults = SaveRecord::default_at(now);
    let mut repaired_fields = Vec::new();
    let field = |name: &str| value.get(name).unwrap_or(&MISSING);

    let mut take = |name: &'static str, ok: bool| {
        if !ok {
            log::warn!("Save field `{name}` missing or malformed, using default");
            repaired_fields.push(name);
        }
    };

    let version = field("version").as_str().map(str::to_string);
    take("version", version.is_some());

    let max_stage = as_count(field("maxStage")).filter(|s| *s >= 1);
    take("maxStage", max_stage.is_some());

    let rebirth_stones = as_stones(field("rebirthStones"));
    take("rebirthStones", rebirth_stones.is_some());

    let attack_level = as_count(field("attackLevel"));
    take("attackLevel", attack_level.is_some());

    let last_played = as_timestamp(field("lastPlayed"));
    take("lastPlayed", last_played.is_some());

    let last_saved = as_timestamp(field("lastSaved"));
    take("lastSaved", last_saved.is_some());

    Repaired {
        record: SaveRecord {
            version: version.unwrap_or(defaults.version),
            max_stage: max_stage.unwrap_or(defaults.max_stage),
            rebirth_stones: rebirth_stones.unwrap_or(defaults.rebirth_stones),
            attack_level: attack_level.unwrap_or(defaults.attack_level),
            last_played: last_played.unwrap_or(defaults.last_played),
            last_saved: last_saved.unwrap_or(defaults.last_saved),
        },
        repaired_fields,
    }
}

/// Parse stored text. Unparseable text repairs to a default record.
pub fn parse(text: &str, now: f64) -> Repaired {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => repair(&value, now),
        Err(e) => {
            log::warn!("Save data is not valid JSON ({e}), starting fresh");
            repair(&Value::Null, now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let record = SaveRecord {
            max_stage: 12,
            rebirth_stones: "1.5e400".parse().unwrap(),
            attack_level: 3,
            ..SaveRecord::default_at(1000.0)
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["maxStage"], json!(12));
        assert_eq!(value["rebirthStones"], json!("1.5e+400"));
        assert_eq!(value["attackLevel"], json!(3));
        assert_eq!(value["version"], json!(SAVE_VERSION));
        assert_eq!(value["lastPlayed"], json!(1000.0));
    }

    #[test]
    fn test_clean_round_trip() {
        let record = SaveRecord {
            max_stage: 40,
            rebirth_stones: Money::from(250u64),
            attack_level: 7,
            ..SaveRecord::default_at(5.0)
        };
        let text = serde_json::to_string(&record).unwrap();
        let repaired = parse(&text, 99.0);
        assert!(repaired.is_clean());
        assert_eq!(repaired.record, record);
    }

    #[test]
    fn test_field_repair() {
        let value = json!({
            "version": "0.9.0",
            "maxStage": "abc",
            "rebirthStones": "-5",
            "attackLevel": 2,
            "lastPlayed": 123.0
        });
        let repaired = repair(&value, 777.0);
        assert_eq!(
            repaired.repaired_fields,
            vec!["maxStage", "rebirthStones", "lastSaved"]
        );
        assert_eq!(repaired.record.version, "0.9.0");
        assert_eq!(repaired.record.max_stage, 1);
        assert!(repaired.record.rebirth_stones.is_zero());
        assert_eq!(repaired.record.attack_level, 2);
        assert_eq!(repaired.record.last_played, 123.0);
        assert_eq!(repaired.record.last_saved, 777.0);
    }

    #[test]
    fn test_numeric_stones_accepted() {
        let repaired = repair(&json!({ "rebirthStones": 31 }), 0.0);
        assert_eq!(repaired.record.rebirth_stones.to_f64(), 31.0);
        assert!(!repaired.repaired_fields.contains(&"rebirthStones"));
    }

    #[test]
    fn test_out_of_range_stones_repaired() {
        let repaired = parse(r#"{"rebirthStones":"10e9223372036854775807"}"#, 0.0);
        assert!(repaired.repaired_fields.contains(&"rebirthStones"));
        assert!(repaired.record.rebirth_stones.is_zero());

        let repaired = parse(r#"{"rebirthStones":"1e99999"}"#, 0.0);
        assert!(repaired.repaired_fields.contains(&"rebirthStones"));
    }

    #[test]
    fn test_garbage_text() {
        let repaired = parse("not json at all", 10.0);
        assert_eq!(repaired.repaired_fields.len(), 6);
        assert_eq!(repaired.record, SaveRecord::default_at(10.0));

        let repaired = parse("[1, 2, 3]", 10.0);
        assert_eq!(repaired.record, SaveRecord::default_at(10.0));
    }

    #[test]
    fn test_negative_and_zero_stage() {
        let repaired = repair(&json!({ "maxStage": 0, "attackLevel": -1 }), 0.0);
        assert_eq!(repaired.record.max_stage, 1);
        assert_eq!(repaired.record.attack_level, 0);
        assert!(repaired.repaired_fields.contains(&"maxStage"));
        assert!(repaired.repaired_fields.contains(&"attackLevel"));
    }
}
