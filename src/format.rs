//! Amount and action-label formatting.
//!
//! Two amount policies coexist on purpose and must stay separate: the
//! navigator's internal labels abbreviate large chip counts ("1.5M",
//! "20K"), while the table display expresses amounts as multiples of the
//! big blind ("2.5bb"). They serve different UI surfaces and are never
//! unified.

use crate::tree::ActionKind;

/// Abbreviate a raw chip amount for compact labels:
/// >= 1,000,000 -> "X.YM", >= 1,000 -> "XK", otherwise the literal integer.
pub fn abbreviate_chips(amount: u64) -> String {
    if amount >= 1_000_000 {
        format!("{:.1}M", amount as f64 / 1_000_000.0)
    } else if amount >= 1_000 {
        format!("{:.0}K", amount as f64 / 1_000.0)
    } else {
        amount.to_string()
    }
}

/// Express a chip amount as a multiple of the big blind.
pub fn in_big_blinds(amount: u64, big_blind: u64) -> String {
    if big_blind == 0 {
        return amount.to_string();
    }
    let bb = amount as f64 / big_blind as f64;
    if bb.fract() == 0.0 {
        format!("{}bb", bb as u64)
    } else {
        format!("{:.1}bb", bb)
    }
}

/// Human-readable label for an action: Fold, Call, Check,
/// "Raise {amount}" (abbreviated) when a raise carries an amount, All-in.
pub fn action_label(kind: ActionKind, amount: Option<u64>) -> String {
    match kind {
        ActionKind::Fold => "Fold".to_string(),
        ActionKind::Call => "Call".to_string(),
        ActionKind::Check => "Check".to_string(),
        ActionKind::Raise => match amount {
            Some(a) if a > 0 => format!("Raise {}", abbreviate_chips(a)),
            _ => "Raise".to_string(),
        },
        ActionKind::AllIn => "All-in".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviates_millions() {
        assert_eq!(abbreviate_chips(1_500_000), "1.5M");
        assert_eq!(abbreviate_chips(2_000_000), "2.0M");
    }

    #[test]
    fn abbreviates_thousands() {
        assert_eq!(abbreviate_chips(20_000), "20K");
        assert_eq!(abbreviate_chips(1_000), "1K");
    }

    #[test]
    fn small_amounts_literal() {
        assert_eq!(abbreviate_chips(999), "999");
        assert_eq!(abbreviate_chips(0), "0");
    }

    #[test]
    fn big_blind_relative() {
        assert_eq!(in_big_blinds(250_000, 100_000), "2.5bb");
        assert_eq!(in_big_blinds(200_000, 100_000), "2bb");
        assert_eq!(in_big_blinds(50_000, 0), "50000");
    }

    #[test]
    fn labels_follow_policy() {
        assert_eq!(action_label(ActionKind::Fold, None), "Fold");
        assert_eq!(action_label(ActionKind::Call, Some(100)), "Call");
        assert_eq!(action_label(ActionKind::Check, None), "Check");
        assert_eq!(action_label(ActionKind::Raise, Some(1_500_000)), "Raise 1.5M");
        assert_eq!(action_label(ActionKind::Raise, Some(0)), "Raise");
        assert_eq!(action_label(ActionKind::Raise, None), "Raise");
        assert_eq!(action_label(ActionKind::AllIn, Some(9_999_999)), "All-in");
    }
}
