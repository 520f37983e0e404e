use std::fs;
use std::path::PathBuf;

use spotview::error::ViewerError;
use spotview::navigator::TreeNavigator;
use spotview::settings::{normalize_settings, GameSettings};
use spotview::state::{
    action_sequence, is_all_in, pot_and_contributions, stack_absolute, SequencedAction,
};
use spotview::tree::{ActionKind, Tree};

fn fixture_settings() -> GameSettings {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/settings.json");
    let raw = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
    normalize_settings(&raw)
}

fn fixture_navigator() -> TreeNavigator {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tree.json");
    let tree = Tree::from_json(&fs::read(path).unwrap()).unwrap();
    TreeNavigator::new(tree).unwrap()
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
fn test_fixture_settings_normalize() {
    let settings = fixture_settings();
    assert_eq!(settings.small_blind, 1);
    assert_eq!(settings.big_blind, 2);
    assert_eq!(settings.ante, 0);
    assert_eq!(settings.stacks, vec![200, 200]);
    assert_eq!(settings.player_count, 2);
}

#[test]
fn test_blinds_posted_with_empty_sequence() {
    let settings = fixture_settings();
    assert_eq!(stack_absolute(0, &settings, &[]).unwrap(), 199);
    assert_eq!(stack_absolute(1, &settings, &[]).unwrap(), 198);
}

#[test]
fn test_preflop_raise_to_ten() {
    let settings = fixture_settings();
    let sequence = [act(0, ActionKind::Raise, 10, 0)];
    assert_eq!(stack_absolute(0, &settings, &sequence).unwrap(), 190);
    assert!(!is_all_in(10, 0, &settings, &[]).unwrap());
}

#[test]
fn test_replace_vs_add_asymmetry() {
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
}

#[test]
fn test_out_of_range_player_signals() {
    let settings = fixture_settings();
    assert!(matches!(
        stack_absolute(5, &settings, &[]),
        Err(ViewerError::PlayerIndexOutOfRange { index: 5, players: 2 })
    ));
    let bad = [act(9, ActionKind::Raise, 4, 0)];
    assert!(pot_and_contributions(&settings, &bad, 0).is_err());
}

#[test]
fn test_sequence_reconstruction_from_tree_path() {
    let nav = fixture_navigator();
    let sequence = action_sequence(&nav, "end2").unwrap();
    assert_eq!(
        sequence,
        vec![
            act(0, ActionKind::Raise, 100_000, 0),
            act(1, ActionKind::Call, 100_000, 0),
            act(1, ActionKind::Raise, 50_000, 1),
            act(0, ActionKind::Call, 50_000, 1),
        ]
    );
}

#[test]
fn test_root_sequence_is_empty() {
    let nav = fixture_navigator();
    assert!(action_sequence(&nav, "start").unwrap().is_empty());
}

#[test]
fn test_state_at_a_tree_node() {
    // Minor-unit settings matching the fixture tree's amounts.
    let raw = serde_json::json!({
        "blinds": { "sb": 50000, "bb": 100000 },
        "stacks": [10000000, 10000000]
    });
    let settings = normalize_settings(&raw);
    let nav = fixture_navigator();
    let sequence = action_sequence(&nav, "bet").unwrap();
    let street = nav.node("bet").unwrap().street;

    // P0 raised to 100K preflop (blind absorbed); P1 called 100K on top of
    // the big blind, then bet 50K on the flop.
    assert_eq!(stack_absolute(0, &settings, &sequence).unwrap(), 9_900_000);
    assert_eq!(
        stack_absolute(1, &settings, &sequence).unwrap(),
        9_750_000
    );

    let pot = pot_and_contributions(&settings, &sequence, street).unwrap();
    assert_eq!(pot.street_contributions, vec![0, 50_000]);
    assert_eq!(pot.total_contributions, vec![150_000, 250_000]);
}

#[test]
fn test_determinism_of_reconstruction() {
    let settings = fixture_settings();
    let sequence = [
        act(0, ActionKind::Raise, 6, 0),
        act(1, ActionKind::Call, 6, 0),
    ];
    for _ in 0..3 {
        assert_eq!(stack_absolute(0, &settings, &sequence).unwrap(), 194);
        assert_eq!(
            pot_and_contributions(&settings, &sequence, 0).unwrap(),
            pot_and_contributions(&settings, &sequence, 0).unwrap()
        );
    }
}
