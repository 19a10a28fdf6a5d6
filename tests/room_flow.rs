//! End-to-end room games driven through the public API, observed the way a
//! transport would see them: through a channel subscription.

use imposter_state::state::{
    GameError, GameSettings, GameStatus, RoomError, RoomMessage, RoomMessageType, RoomRegistry,
    RoomStatus, Winner,
};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn drain(receiver: &std::sync::mpsc::Receiver<RoomMessage>) -> Vec<RoomMessage> {
    receiver.try_iter().collect()
}

fn kinds(messages: &[RoomMessage]) -> Vec<RoomMessageType> {
    messages.iter().map(|m| m.kind).collect()
}

#[test]
fn test_two_round_room_game() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut rooms = RoomRegistry::new();

    let (room_id, code) = {
        let room = rooms
            .create_room_with_rng("Alice", GameSettings::default(), &mut rng)
            .unwrap();
        (room.id.clone(), room.code.clone())
    };
    let (_sub, receiver) = rooms.subscribe_channel(&room_id);

    for name in ["Bob", "Cara", "Dan", "Eve"] {
        rooms.join_room(&code, name).unwrap();
    }
    let joined = drain(&receiver);
    assert_eq!(joined.len(), 4);
    assert!(joined.iter().all(|m| m.kind == RoomMessageType::PlayerJoined));
    assert_eq!(joined[0].data["name"], "Bob");
    assert_eq!(joined[0].player_id.as_deref(), joined[0].data["id"].as_str());

    rooms
        .start_game_with_rng(&room_id, Some("Volcano"), &mut rng)
        .unwrap();
    rooms.begin_play(&room_id).unwrap();

    let (imposter, crew) = {
        let game = rooms.get_room(&room_id).unwrap().game().unwrap();
        assert_eq!(game.imposters().count(), 1);
        let imposter = game.imposters().next().unwrap().id.clone();
        let crew: Vec<String> = game
            .players()
            .iter()
            .filter(|p| !p.is_imposter())
            .map(|p| p.id.clone())
            .collect();
        (imposter, crew)
    };

    // Round 1: the crew gangs up on one of their own
    rooms.start_voting(&room_id).unwrap();
    for voter in &crew {
        rooms.add_vote(&room_id, voter, &crew[0]).unwrap();
    }
    assert_eq!(rooms.resolve_voting(&room_id).unwrap(), None);

    let room = rooms.get_room(&room_id).unwrap();
    assert_eq!(room.status, RoomStatus::Finished);
    assert_eq!(room.get_player(&crew[0]).unwrap().is_eliminated, Some(true));

    // Nobody has won yet, so listeners see an update rather than the end
    let round_one = drain(&receiver);
    assert!(round_one.iter().all(|m| m.kind != RoomMessageType::GameEnded));
    assert_eq!(round_one.last().unwrap().kind, RoomMessageType::GameUpdate);
    assert_eq!(round_one.last().unwrap().data["winner"], serde_json::Value::Null);

    // Round 2: the imposter is caught
    assert_eq!(rooms.next_round(&room_id).unwrap(), 2);

    // Eliminated players give no more clues
    assert_eq!(
        rooms.add_clue(&room_id, &crew[0], "hot").unwrap_err(),
        RoomError::Game(GameError::PlayerEliminated(crew[0].clone()))
    );
    rooms.add_clue(&room_id, &crew[1], "lava").unwrap();
    rooms.add_clue(&room_id, &imposter, "mountain").unwrap();
    rooms.start_voting(&room_id).unwrap();
    for voter in &crew[1..] {
        rooms.add_vote(&room_id, voter, &imposter).unwrap();
    }
    assert_eq!(rooms.resolve_voting(&room_id).unwrap(), Some(Winner::Crew));

    let room = rooms.get_room(&room_id).unwrap();
    let game = room.game().unwrap();
    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(game.current_round(), 2);
    assert_eq!(game.clues().len(), 2);
    assert!(game.clues().iter().all(|c| c.round == 2));

    let messages = drain(&receiver);
    let ended: Vec<&RoomMessage> = messages
        .iter()
        .filter(|m| m.kind == RoomMessageType::GameEnded)
        .collect();
    assert_eq!(ended.len(), 1);
    let last = messages.last().unwrap();
    assert_eq!(last.kind, RoomMessageType::GameEnded);
    assert_eq!(last.data["winner"], "crew");
    assert_eq!(last.data["eliminatedPlayer"]["id"], imposter.as_str());

    let clue_messages: Vec<&RoomMessage> = messages
        .iter()
        .filter(|m| m.kind == RoomMessageType::ClueSubmitted)
        .collect();
    assert_eq!(clue_messages.len(), 2);
    assert_eq!(clue_messages[1].player_id.as_deref(), Some(imposter.as_str()));
    assert_eq!(clue_messages[1].data["text"], "mountain");
}

#[test]
fn test_room_events_in_order() {
    let mut rooms = RoomRegistry::new();
    let (room_id, code) = {
        let room = rooms.create_room("Alice", GameSettings::default()).unwrap();
        (room.id.clone(), room.code.clone())
    };
    let (_sub, receiver) = rooms.subscribe_channel(&room_id);

    rooms.join_room(&code, "Bob").unwrap();
    rooms.join_room(&code, "Cara").unwrap();
    let bob = rooms.get_room(&room_id).unwrap().players()[1].id.clone();
    rooms.start_game(&room_id, None).unwrap();
    rooms.begin_play(&room_id).unwrap();
    rooms.add_clue(&room_id, &bob, "round").unwrap();
    rooms.start_voting(&room_id).unwrap();
    rooms.leave_room(&room_id, &bob).unwrap();

    assert_eq!(
        kinds(&drain(&receiver)),
        vec![
            RoomMessageType::PlayerJoined,
            RoomMessageType::PlayerJoined,
            RoomMessageType::GameStarted,
            RoomMessageType::GameUpdate,
            RoomMessageType::ClueSubmitted,
            RoomMessageType::GameUpdate,
            RoomMessageType::PlayerLeft,
        ]
    );

    // Mid-game leavers stay on the roster
    let room = rooms.get_room(&room_id).unwrap();
    assert_eq!(room.player_count(), 3);
    assert!(!room.get_player(&bob).unwrap().is_connected);
}

#[test]
fn test_rooms_are_isolated() {
    let mut rooms = RoomRegistry::new();
    let first = rooms.create_room("Alice", GameSettings::default()).unwrap().id.clone();
    let second = rooms.create_room("Zed", GameSettings::default()).unwrap().id.clone();
    let (_sub, receiver) = rooms.subscribe_channel(&first);

    let code = rooms.get_room(&second).unwrap().code.clone();
    rooms.join_room(&code, "Bob").unwrap();

    assert!(drain(&receiver).is_empty());
    assert_eq!(rooms.count(), 2);
    assert_eq!(rooms.get_room(&first).unwrap().player_count(), 1);
    assert_eq!(rooms.get_room_by_code(&code).unwrap().id, second);
}
