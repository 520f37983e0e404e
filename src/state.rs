//! Game-state reconstruction: stacks, pot, and per-street contributions
//! replayed from an action sequence against static game settings.
//!
//! These are pure functions over `(player, GameSettings, sequence)`; the
//! same inputs always produce the same outputs. Seat 0 posts the small
//! blind and seat 1 the big blind; the ante, when present, is posted by
//! every seat in addition to any blind.

use std::collections::{BTreeMap, HashSet};

use crate::error::{ViewerError, ViewerResult};
use crate::navigator::TreeNavigator;
use crate::settings::GameSettings;
use crate::tree::ActionKind;

pub const SMALL_BLIND_SEAT: usize = 0;
pub const BIG_BLIND_SEAT: usize = 1;

/// One concrete action on the path from the root to a node: who acted,
/// what they did, the wagered amount (0 when no chips moved), and the
/// street it happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencedAction {
    pub player: usize,
    pub kind: ActionKind,
    pub amount: u64,
    pub street: u8,
}

/// Pot size and per-player contributions at a point in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotState {
    pub total_pot: u64,
    /// What each seat has wagered on the current street.
    pub street_contributions: Vec<u64>,
    /// What each seat has wagered in total, blinds included.
    pub total_contributions: Vec<u64>,
}

/// Reconstruct the action sequence leading to `node_id` by walking parent
/// links and recording the action instance that connected each pair. The
/// sequence is derived, not stored: the tree only keeps the links.
pub fn action_sequence(
    navigator: &TreeNavigator,
    node_id: &str,
) -> ViewerResult<Vec<SequencedAction>> {
    let mut sequence = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut current = navigator.node(node_id)?;

    while let Some(parent_id) = current.parent.as_deref() {
        if !seen.insert(current.id.clone()) {
            return Err(ViewerError::CycleDetected(current.id.clone()));
        }
        let parent = navigator.node(parent_id)?;
        if let Some(action) = parent
            .actions
            .iter()
            .find(|a| a.node.as_deref() == Some(current.id.as_str()))
        {
            sequence.push(SequencedAction {
                player: parent.acting_player,
                kind: action.kind,
                amount: action.amount.unwrap_or(0),
                street: parent.street,
            });
        }
        current = parent;
    }

    sequence.reverse();
    Ok(sequence)
}

/// Remaining stack for `player` after forced blinds/antes and every
/// chip-moving action of theirs in `sequence`. Folds and checks never move
/// chips.
///
/// Wagers are folded per street with the same semantics as the pot: a call
/// adds to the street's wager, while a raise or all-in replaces it (the
/// amount is the new street total, so a posted blind is absorbed by a
/// later raise rather than deducted twice). The deduction is the sum of
/// each street's final wager plus the ante. The result saturates at zero:
/// a sequence that would overdraw the stack is a data inconsistency
/// resolved by clamping, not propagated.
pub fn stack_absolute(
    player: usize,
    settings: &GameSettings,
    sequence: &[SequencedAction],
) -> ViewerResult<u64> {
    check_player(player, settings)?;

    let initial = settings.stacks.get(player).copied().unwrap_or(0);

    let mut per_street: BTreeMap<u8, u64> = BTreeMap::new();
    if player == SMALL_BLIND_SEAT {
        *per_street.entry(0).or_insert(0) += settings.small_blind;
    }
    if player == BIG_BLIND_SEAT {
        *per_street.entry(0).or_insert(0) += settings.big_blind;
    }

    for action in sequence.iter().filter(|a| a.player == player) {
        let wagered = per_street.entry(action.street).or_insert(0);
        match action.kind {
            ActionKind::Call => *wagered += action.amount,
            ActionKind::Raise | ActionKind::AllIn => *wagered = action.amount,
            ActionKind::Fold | ActionKind::Check => {}
        }
    }

    let mut committed: u64 = per_street.values().sum();
    if settings.ante > 0 {
        committed += settings.ante;
    }
    Ok(initial.saturating_sub(committed))
}

/// Whether a wager of `amount` consumes the player's entire remaining
/// stack, computed from the state immediately before the action: `prior`
/// must exclude the action itself.
pub fn is_all_in(
    amount: u64,
    player: usize,
    settings: &GameSettings,
    prior: &[SequencedAction],
) -> ViewerResult<bool> {
    Ok(amount >= stack_absolute(player, settings, prior)?)
}

/// Fold `sequence` into the pot and per-player contribution totals as of
/// `current_street`.
///
/// The pot starts with the antes (when any) plus both blinds, and the
/// blind seats are seeded into the contribution vectors (current-street
/// only while still preflop). A call then adds to the caller's
/// current-street contribution, while a raise replaces it: a raise amount
/// is the player's new total wager for the street, not an increment. An
/// all-in is a raise for the rest of the stack and replaces likewise.
pub fn pot_and_contributions(
    settings: &GameSettings,
    sequence: &[SequencedAction],
    current_street: u8,
) -> ViewerResult<PotState> {
    let players = settings.player_count;

    let mut total_pot = settings.small_blind + settings.big_blind;
    if settings.ante > 0 {
        total_pot += settings.ante * players as u64;
    }

    let mut street = vec![0u64; players];
    let mut total = vec![0u64; players];
    if players > SMALL_BLIND_SEAT {
        total[SMALL_BLIND_SEAT] += settings.small_blind;
        if current_street == 0 {
            street[SMALL_BLIND_SEAT] += settings.small_blind;
        }
    }
    if players > BIG_BLIND_SEAT {
        total[BIG_BLIND_SEAT] += settings.big_blind;
        if current_street == 0 {
            street[BIG_BLIND_SEAT] += settings.big_blind;
        }
    }

    for action in sequence {
        check_player(action.player, settings)?;
        if !action.kind.wagers() || action.amount == 0 {
            continue;
        }
        total_pot += action.amount;
        total[action.player] += action.amount;
        if action.street == current_street {
            match action.kind {
                ActionKind::Call => street[action.player] += action.amount,
                ActionKind::Raise | ActionKind::AllIn => {
                    street[action.player] = action.amount
                }
                ActionKind::Fold | ActionKind::Check => {}
            }
        }
    }

    Ok(PotState {
        total_pot,
        street_contributions: street,
        total_contributions: total,
    })
}

fn check_player(player: usize, settings: &GameSettings) -> ViewerResult<()> {
    if player >= settings.player_count {
        return Err(ViewerError::PlayerIndexOutOfRange {
            index: player,
            players: settings.player_count,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hu_settings() -> GameSettings {
        GameSettings {
            big_blind: 2,
            small_blind: 1,
            ante: 0,
            stacks: vec![200, 200],
            player_count: 2,
            straddle: false,
            button_ante: false,
        }
    }

    fn act(player: usize, kind: ActionKind, amount: u64, street: u8) -> SequencedAction {
        SequencedAction {
            player,
            kind,
            amount,
            street,
        }
    }

    #[test]
    fn blinds_posted_before_any_action() {
        let settings = hu_settings();
        assert_eq!(stack_absolute(0, &settings, &[]).unwrap(), 199);
        assert_eq!(stack_absolute(1, &settings, &[]).unwrap(), 198);
    }

    #[test]
    fn raise_absorbs_the_posted_blind() {
        let settings = hu_settings();
        // Raise to 10 on the street where the small blind was posted: the
        // blind is part of the 10, not deducted on top of it.
        let sequence = [act(0, ActionKind::Raise, 10, 0)];
        assert_eq!(stack_absolute(0, &settings, &sequence).unwrap(), 190);
        assert_eq!(stack_absolute(1, &settings, &sequence).unwrap(), 198);
    }

    #[test]
    fn call_adds_on_top_of_the_posted_blind() {
        let settings = hu_settings();
        let sequence = [
            act(0, ActionKind::Raise, 6, 0),
            act(1, ActionKind::Call, 6, 0),
        ];
        assert_eq!(stack_absolute(0, &settings, &sequence).unwrap(), 194);
        assert_eq!(stack_absolute(1, &settings, &sequence).unwrap(), 192);
    }

    #[test]
    fn reraise_replaces_the_earlier_street_wager() {
        let settings = hu_settings();
        let sequence = [
            act(0, ActionKind::Raise, 6, 0),
            act(1, ActionKind::Raise, 20, 0),
            act(0, ActionKind::Raise, 60, 0),
        ];
        assert_eq!(stack_absolute(0, &settings, &sequence).unwrap(), 140);
        assert_eq!(stack_absolute(1, &settings, &sequence).unwrap(), 180);
    }

    #[test]
    fn streets_accumulate_independently() {
        let settings = hu_settings();
        let sequence = [
            act(0, ActionKind::Raise, 6, 0),
            act(1, ActionKind::Call, 6, 0),
            act(1, ActionKind::Raise, 10, 1),
            act(0, ActionKind::Call, 10, 1),
        ];
        // P0: street 0 ends at 6 (raise absorbed the blind), street 1 call
        // adds 10. P1: street 0 ends at 8 (blind plus call), street 1 at 10.
        assert_eq!(stack_absolute(0, &settings, &sequence).unwrap(), 184);
        assert_eq!(stack_absolute(1, &settings, &sequence).unwrap(), 182);
    }

    #[test]
    fn fold_and_check_move_no_chips() {
        let settings = hu_settings();
        let sequence = [
            act(0, ActionKind::Check, 0, 0),
            act(1, ActionKind::Fold, 0, 0),
        ];
        assert_eq!(stack_absolute(0, &settings, &sequence).unwrap(), 199);
        assert_eq!(stack_absolute(1, &settings, &sequence).unwrap(), 198);
    }

    #[test]
    fn ante_applies_to_every_seat_on_top_of_blinds() {
        let mut settings = hu_settings();
        settings.ante = 5;
        assert_eq!(stack_absolute(0, &settings, &[]).unwrap(), 194);
        assert_eq!(stack_absolute(1, &settings, &[]).unwrap(), 193);
    }

    #[test]
    fn stack_clamps_at_zero() {
        let settings = hu_settings();
        let sequence = [act(0, ActionKind::AllIn, 10_000, 0)];
        assert_eq!(stack_absolute(0, &settings, &sequence).unwrap(), 0);
    }

    #[test]
    fn out_of_range_player_is_an_error() {
        let settings = hu_settings();
        assert!(matches!(
            stack_absolute(2, &settings, &[]),
            Err(ViewerError::PlayerIndexOutOfRange { index: 2, players: 2 })
        ));
    }

    #[test]
    fn all_in_detection_uses_state_before_the_action() {
        let settings = hu_settings();
        assert!(!is_all_in(10, 0, &settings, &[]).unwrap());
        assert!(is_all_in(199, 0, &settings, &[]).unwrap());
        let prior = [act(0, ActionKind::Raise, 10, 0)];
        assert!(is_all_in(190, 0, &settings, &prior).unwrap());
        assert!(!is_all_in(189, 0, &settings, &prior).unwrap());
    }

    #[test]
    fn pot_seeds_blinds_and_antes() {
        let mut settings = hu_settings();
        settings.ante = 5;
        let pot = pot_and_contributions(&settings, &[], 0).unwrap();
        assert_eq!(pot.total_pot, 1 + 2 + 5 * 2);
        assert_eq!(pot.total_contributions, vec![1, 2]);
        assert_eq!(pot.street_contributions, vec![1, 2]);
    }

    #[test]
    fn blind_seeding_skips_street_contributions_postflop() {
        let settings = hu_settings();
        let pot = pot_and_contributions(&settings, &[], 1).unwrap();
        assert_eq!(pot.street_contributions, vec![0, 0]);
        assert_eq!(pot.total_contributions, vec![1, 2]);
    }

    #[test]
    fn raise_replaces_and_call_adds_on_current_street() {
        // Zero blinds isolate the replace-vs-add asymmetry.
        let settings = GameSettings {
            big_blind: 0,
            small_blind: 0,
            ante: 0,
            stacks: vec![200, 200],
            player_count: 2,
            straddle: false,
            button_ante: false,
        };
        let sequence = [
            act(0, ActionKind::Raise, 6, 0),
            act(1, ActionKind::Call, 6, 0),
            act(0, ActionKind::Raise, 20, 0),
        ];
        let pot = pot_and_contributions(&settings, &sequence, 0).unwrap();
        assert_eq!(pot.street_contributions[0], 20);
        assert_eq!(pot.street_contributions[1], 6);
        assert_eq!(pot.total_contributions[0], 26);
        assert_eq!(pot.total_contributions[1], 6);
        assert_eq!(pot.total_pot, 32);
    }

    #[test]
    fn raise_replaces_on_top_of_blind_seed() {
        let settings = hu_settings();
        let sequence = [
            act(0, ActionKind::Raise, 6, 0),
            act(1, ActionKind::Call, 6, 0),
        ];
        let pot = pot_and_contributions(&settings, &sequence, 0).unwrap();
        // Raise replaced the small-blind seed; the call added to the
        // big-blind seed.
        assert_eq!(pot.street_contributions, vec![6, 8]);
        assert_eq!(pot.total_contributions, vec![7, 8]);
        assert_eq!(pot.total_pot, 15);
    }

    #[test]
    fn prior_street_actions_count_toward_totals_only() {
        let settings = hu_settings();
        let sequence = [
            act(0, ActionKind::Raise, 6, 0),
            act(1, ActionKind::Call, 6, 0),
            act(1, ActionKind::Raise, 10, 1),
        ];
        let pot = pot_and_contributions(&settings, &sequence, 1).unwrap();
        assert_eq!(pot.street_contributions, vec![0, 10]);
        assert_eq!(pot.total_contributions, vec![7, 18]);
    }

    #[test]
    fn all_in_replaces_like_a_raise() {
        let settings = hu_settings();
        let sequence = [
            act(0, ActionKind::Raise, 6, 0),
            act(1, ActionKind::AllIn, 198, 0),
        ];
        let pot = pot_and_contributions(&settings, &sequence, 0).unwrap();
        assert_eq!(pot.street_contributions[1], 198);
    }

    #[test]
    fn determinism() {
        let settings = hu_settings();
        let sequence = [
            act(0, ActionKind::Raise, 6, 0),
            act(1, ActionKind::Call, 6, 0),
        ];
        assert_eq!(
            stack_absolute(0, &settings, &sequence).unwrap(),
            stack_absolute(0, &settings, &sequence).unwrap()
        );
        assert_eq!(
            pot_and_contributions(&settings, &sequence, 0).unwrap(),
            pot_and_contributions(&settings, &sequence, 0).unwrap()
        );
    }
}
