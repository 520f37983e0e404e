//! Static per-spot game parameters, normalized from the solver's raw
//! settings payload.
//!
//! The raw settings are nested and loosely structured; `normalize_settings`
//! flattens them into `GameSettings` with a documented default for every
//! field, so the mapping is total and deterministic. All amounts are in
//! minor currency units.

use serde_json::Value;

/// Default big blind: 100,000 minor units.
pub const DEFAULT_BIG_BLIND: u64 = 100_000;
/// Default player count when neither a count nor a stack array is present.
pub const DEFAULT_PLAYER_COUNT: usize = 2;
/// Default starting stack, expressed in big blinds.
pub const DEFAULT_STACK_BB: u64 = 100;

/// Immutable game parameters for the lifetime of one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    pub big_blind: u64,
    pub small_blind: u64,
    pub ante: u64,
    /// Starting stack per seat, indexed by seat.
    pub stacks: Vec<u64>,
    pub player_count: usize,
    pub straddle: bool,
    pub button_ante: bool,
}

impl GameSettings {
    /// Heads-up settings with every seat at `stack`, no ante. Used by the
    /// demo spot and tests.
    pub fn heads_up(big_blind: u64, stack: u64) -> GameSettings {
        GameSettings {
            big_blind,
            small_blind: big_blind / 2,
            ante: 0,
            stacks: vec![stack, stack],
            player_count: 2,
            straddle: false,
            button_ante: false,
        }
    }
}

/// Flatten raw solver settings into `GameSettings`.
///
/// Defaults for absent fields: big blind 100,000; small blind half the big
/// blind; ante 0; player count from the stack-array length (2 when no
/// stacks are given); stacks 100bb per seat; mode flags false. Never fails.
pub fn normalize_settings(raw: &Value) -> GameSettings {
    let blinds = raw.get("blinds").unwrap_or(&Value::Null);

    let big_blind = amount_field(blinds, &["bb", "bigBlind"])
        .or_else(|| amount_field(raw, &["bigBlind", "bb"]))
        .unwrap_or(DEFAULT_BIG_BLIND);
    let small_blind = amount_field(blinds, &["sb", "smallBlind"])
        .or_else(|| amount_field(raw, &["smallBlind", "sb"]))
        .unwrap_or(big_blind / 2);
    let ante = amount_field(blinds, &["ante"])
        .or_else(|| amount_field(raw, &["ante"]))
        .unwrap_or(0);

    let mut stacks: Vec<u64> = raw
        .get("stacks")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(as_amount).collect())
        .unwrap_or_default();

    let player_count = raw
        .get("playerCount")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .filter(|n| *n > 0)
        .unwrap_or_else(|| {
            if stacks.is_empty() {
                DEFAULT_PLAYER_COUNT
            } else {
                stacks.len()
            }
        });

    stacks.resize(player_count, big_blind * DEFAULT_STACK_BB);

    GameSettings {
        big_blind,
        small_blind,
        ante,
        stacks,
        player_count,
        straddle: flag_field(raw, "straddle"),
        button_ante: flag_field(raw, "buttonAnte"),
    }
}

fn as_amount(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
}

fn amount_field(value: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| value.get(*key).and_then(as_amount))
}

fn flag_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_settings_take_documented_defaults() {
        let settings = normalize_settings(&Value::Null);
        assert_eq!(settings.big_blind, 100_000);
        assert_eq!(settings.small_blind, 50_000);
        assert_eq!(settings.ante, 0);
        assert_eq!(settings.player_count, 2);
        assert_eq!(settings.stacks, vec![10_000_000, 10_000_000]);
        assert!(!settings.straddle);
        assert!(!settings.button_ante);
    }

    #[test]
    fn nested_blinds_are_read() {
        let raw = json!({
            "blinds": { "sb": 1, "bb": 2, "ante": 0 },
            "stacks": [200, 200]
        });
        let settings = normalize_settings(&raw);
        assert_eq!(settings.small_blind, 1);
        assert_eq!(settings.big_blind, 2);
        assert_eq!(settings.player_count, 2);
        assert_eq!(settings.stacks, vec![200, 200]);
    }

    #[test]
    fn flat_blind_fields_also_accepted() {
        let raw = json!({ "bigBlind": 400, "smallBlind": 200 });
        let settings = normalize_settings(&raw);
        assert_eq!(settings.big_blind, 400);
        assert_eq!(settings.small_blind, 200);
    }

    #[test]
    fn player_count_derived_from_stacks() {
        let raw = json!({ "stacks": [100, 100, 100] });
        let settings = normalize_settings(&raw);
        assert_eq!(settings.player_count, 3);
    }

    #[test]
    fn short_stack_array_padded_to_player_count() {
        let raw = json!({ "playerCount": 3, "stacks": [500], "blinds": { "bb": 10 } });
        let settings = normalize_settings(&raw);
        assert_eq!(settings.stacks, vec![500, 1_000, 1_000]);
    }

    #[test]
    fn float_amounts_rounded() {
        let raw = json!({ "blinds": { "bb": 2.5 } });
        assert_eq!(normalize_settings(&raw).big_blind, 3);
    }

    #[test]
    fn normalization_is_deterministic() {
        let raw = json!({ "blinds": { "bb": 7 }, "stacks": [9, 9] });
        assert_eq!(normalize_settings(&raw), normalize_settings(&raw));
    }
}
