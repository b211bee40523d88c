//! Tests for the room registry and scripted replays.

use std::io::Write;
use std::sync::Arc;
use strictly_rooms::{
    ChannelOutbound, RoomConfig, RoomErrorKind, RoomId, RoomRegistry, Script, Step,
};
use strictly_rules::{Cell, Mark, SessionId};

fn registry() -> RoomRegistry {
    let (outbound, _events) = ChannelOutbound::channel();
    RoomRegistry::new(RoomConfig::default(), Arc::new(outbound))
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_room_rejected() {
    let registry = registry();
    let id = RoomId::from("lobby");
    registry.create_room(id.clone()).unwrap();

    let err = registry.create_room(id.clone()).unwrap_err();
    assert_eq!(err.kind, RoomErrorKind::AlreadyExists("lobby".into()));
    assert_eq!(registry.room_ids().unwrap(), vec![id]);
}

#[tokio::test(start_paused = true)]
async fn test_rooms_are_independent() {
    let registry = registry();
    let a = registry.create_room(RoomId::from("a")).unwrap();
    let b = registry.create_room(RoomId::from("b")).unwrap();

    a.join(SessionId::from("p1"), strictly_rooms::JoinOptions::new("Alice"))
        .unwrap();

    assert_eq!(a.snapshot().await.unwrap().players().len(), 1);
    assert!(b.snapshot().await.unwrap().players().is_empty());
    assert_eq!(
        registry.room_ids().unwrap(),
        vec![RoomId::from("a"), RoomId::from("b")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_close_room_forgets_it() {
    let registry = registry();
    let id = RoomId::from("lobby");
    let handle = registry.create_room(id.clone()).unwrap();

    registry.close_room(&id).unwrap();

    assert!(handle.snapshot().await.is_err());
    assert!(registry.room_ids().unwrap().is_empty());
    let err = registry.room(&id).unwrap_err();
    assert_eq!(err.kind, RoomErrorKind::NotFound("lobby".into()));
    assert!(registry.close_room(&id).is_err());

    // The name is free again.
    let reopened = registry.create_room(id.clone()).unwrap();
    assert!(reopened.snapshot().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_script_from_file_runs_to_completion() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
room = "replay"

[[step]]
action = "join"
session = "a"
name = "Alice"

[[step]]
action = "join"
session = "b"
name = "Bob"

[[step]]
action = "move"
session = "a"
index = 4

[[step]]
action = "leave"
session = "a"

[[step]]
action = "move"
session = "b"
index = 0

[[step]]
action = "rejoin"
session = "a"

[[step]]
action = "leave"
session = "b"

[[step]]
action = "wait"
millis = 21000
"#
    )
    .unwrap();

    let script = Script::from_file(file.path()).unwrap();
    assert_eq!(script.room, "replay");
    assert_eq!(script.steps.len(), 8);
    assert_eq!(
        script.steps[3],
        Step::Leave {
            session: "a".into(),
            consented: false,
        }
    );

    let registry = registry();
    let state = script.run(&registry).await.unwrap();

    // Bob's window ran out, so the round was reset for Alice alone.
    assert_eq!(state.players().len(), 1);
    assert!(state.player(&SessionId::from("a")).is_some());
    assert!(state.board().cells().iter().all(|c| *c == Cell::Empty));
    assert_eq!(state.current_turn(), Some(&SessionId::from("a")));
    assert!(registry.room_ids().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_script_keeps_board_without_departures() {
    let script = Script {
        room: "short".into(),
        steps: vec![
            Step::Join {
                session: "a".into(),
                name: "Alice".into(),
            },
            Step::Join {
                session: "b".into(),
                name: "Bob".into(),
            },
            Step::Move {
                session: "a".into(),
                index: 2,
            },
        ],
    };

    let state = script.run(&registry()).await.unwrap();

    assert_eq!(state.board().get(2), Some(Cell::Occupied(Mark::X)));
    assert_eq!(state.current_turn(), Some(&SessionId::from("b")));
}

#[test]
fn test_script_missing_file_is_config_error() {
    let err = Script::from_file("/definitely/not/here.toml").unwrap_err();
    assert!(err.message.contains("Failed to read script"));
}
