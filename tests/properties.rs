//! Property tests for the game state machine.
//!
//! Random operation sequences are thrown at a local game; after every step the
//! structural invariants must hold, and any rejected operation must leave the
//! game untouched.

use std::collections::HashSet;

use imposter_state::state::{
    imposter_count, GameError, GameSettings, GameState, GameStatus, LocalGame, Role,
    RoomRegistry, RoomStatus,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const PLAYERS: [&str; 4] = ["Alice", "Bob", "Cara", "Dan"];

#[derive(Debug, Clone)]
enum Op {
    Clue(usize),
    StartVoting,
    Vote(usize, usize),
    Eliminate(usize),
    Resolve,
    Guess(bool),
    NextRound,
}

/// Indices past the roster name players that do not exist.
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..6).prop_map(Op::Clue),
        1 => Just(Op::StartVoting),
        3 => (0usize..6, 0usize..6).prop_map(|(v, t)| Op::Vote(v, t)),
        1 => (0usize..6).prop_map(Op::Eliminate),
        1 => Just(Op::Resolve),
        1 => any::<bool>().prop_map(Op::Guess),
        1 => Just(Op::NextRound),
    ]
}

fn player_id(index: usize) -> String {
    format!("player-{}", index)
}

fn apply(local: &mut LocalGame, op: &Op) -> Result<(), GameError> {
    match op {
        Op::Clue(i) => local.add_clue(&player_id(*i), "hint").map(|_| ()),
        Op::StartVoting => local.start_voting(),
        Op::Vote(v, t) => local.add_vote(&player_id(*v), &player_id(*t)).map(|_| ()),
        Op::Eliminate(i) => local.eliminate_player(&player_id(*i)).map(|_| ()),
        Op::Resolve => local.resolve_voting().map(|_| ()),
        Op::Guess(right) => local
            .set_imposter_guess(if *right { "OCEAN" } else { "desert" })
            .map(|_| ()),
        Op::NextRound => local.next_round().map(|_| ()),
    }
}

fn check_invariants(game: &GameState) -> Result<(), TestCaseError> {
    prop_assert!(game.current_round() >= 1);
    prop_assert!(game.current_round() <= game.max_rounds());
    prop_assert_eq!(game.players().len(), PLAYERS.len());
    prop_assert_eq!(game.imposters().count(), 1);

    if game.winner().is_some() {
        prop_assert_eq!(game.status(), GameStatus::Finished);
    }

    let mut voters = HashSet::new();
    for vote in game.votes() {
        prop_assert_eq!(vote.round, game.current_round());
        prop_assert!(
            voters.insert((vote.voter_id.clone(), vote.round)),
            "duplicate vote from {} in round {}",
            vote.voter_id,
            vote.round
        );
    }

    let mut last_round = 1;
    for clue in game.clues() {
        prop_assert!(clue.round >= last_round);
        prop_assert!(clue.round <= game.current_round());
        last_round = clue.round;
    }
    Ok(())
}

#[test]
fn prop_valid_player_count_deals_one_imposter() {
    proptest!(|(n in 3usize..=10, seed in any::<u64>())| {
        let names: Vec<String> = (0..n).map(|i| format!("P{}", i)).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut local = LocalGame::new();

        let game = local.create_game_with_rng(&names, Some("Pizza"), &mut rng).unwrap();

        prop_assert_eq!(game.players().len(), n);
        prop_assert_eq!(game.imposters().count(), 1);
        prop_assert_eq!(game.status(), GameStatus::Playing);
        prop_assert_eq!(game.current_round(), 1);
        prop_assert!(game.clues().is_empty());
        prop_assert!(game.votes().is_empty());
        prop_assert_eq!(game.winner(), None);
    });
}

#[test]
fn prop_invalid_player_count_rejected() {
    proptest!(|(n in prop_oneof![0usize..3, 11usize..30])| {
        let names: Vec<String> = (0..n).map(|i| format!("P{}", i)).collect();
        let mut local = LocalGame::new();

        let result = local.create_game(&names, None);

        prop_assert_eq!(
            result.unwrap_err(),
            GameError::Validation { min: 3, max: 10, got: n }
        );
        prop_assert!(!local.has_game());
    });
}

#[test]
fn prop_rejections_never_mutate() {
    proptest!(|(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    )| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut local = LocalGame::with_settings(GameSettings {
            min_players: 4,
            ..GameSettings::default()
        })
        .unwrap();
        local.create_game_with_rng(&PLAYERS, Some("ocean"), &mut rng).unwrap();

        for op in &ops {
            let before = local.game().cloned();
            if apply(&mut local, op).is_err() {
                prop_assert_eq!(local.game().cloned(), before, "rejected {:?} mutated the game", op);
            }
            if let Some(game) = local.game() {
                check_invariants(game)?;
            }
        }
    });
}

#[test]
fn prop_one_vote_per_voter_per_round() {
    proptest!(|(votes in prop::collection::vec((0usize..4, 0usize..4), 1..40))| {
        let mut local = LocalGame::new();
        local.create_game(&PLAYERS, Some("ocean")).unwrap();
        local.start_voting().unwrap();

        for (voter, target) in &votes {
            local.add_vote(&player_id(*voter), &player_id(*target)).unwrap();
        }

        let game = local.game().unwrap();
        let distinct: HashSet<&usize> = votes.iter().map(|(v, _)| v).collect();
        prop_assert_eq!(game.votes().len(), distinct.len());

        // The surviving vote per voter is their last one
        for vote in game.votes() {
            let last = votes
                .iter()
                .rev()
                .find(|(v, _)| player_id(*v) == vote.voter_id)
                .map(|(_, t)| player_id(*t));
            prop_assert_eq!(Some(vote.target_id.clone()), last);
        }
    });
}

#[test]
fn prop_room_deals_scaled_imposters() {
    proptest!(|(n in 3usize..=24, seed in any::<u64>())| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut rooms = RoomRegistry::new();
        let settings = GameSettings {
            max_players: 24,
            ..GameSettings::default()
        };
        let (room_id, code) = {
            let room = rooms.create_room_with_rng("Host", settings, &mut rng).unwrap();
            (room.id.clone(), room.code.clone())
        };
        for i in 1..n {
            rooms.join_room(&code, format!("P{}", i)).unwrap();
        }

        let room = rooms.start_game_with_rng(&room_id, None, &mut rng).unwrap();
        let game = room.game().unwrap();

        prop_assert_eq!(room.status, RoomStatus::RoleReveal);
        prop_assert_eq!(game.imposters().count(), imposter_count(n));
        let mirrored = room
            .players()
            .iter()
            .filter(|p| p.role == Some(Role::Imposter))
            .count();
        prop_assert_eq!(mirrored, imposter_count(n));
        prop_assert!(imposter_count(n) < n);
    });
}
