//! Tests for move arbitration, restarts and error notices.

mod common;

use common::TestRoom;
use serde_json::json;
use std::time::Duration;
use strictly_rooms::OutboundEvent;
use strictly_rules::{Cell, DRAW, Mark};

#[tokio::test(start_paused = true)]
async fn test_move_passes_turn() {
    let mut room = TestRoom::new();
    let p1 = room.join("p1", "Alice");
    let p2 = room.join("p2", "Bob");

    room.play(&p1, 4);
    let state = room.snapshot().await;

    assert_eq!(state.board().get(4), Some(Cell::Occupied(Mark::X)));
    assert_eq!(state.current_turn(), Some(&p2));
    assert!(room.notices_for(&p1).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_out_of_turn_move_rejected() {
    let mut room = TestRoom::new();
    let p1 = room.join("p1", "Alice");
    let p2 = room.join("p2", "Bob");
    room.snapshot().await;
    room.drain();

    room.play(&p2, 0);
    let state = room.snapshot().await;

    assert!(state.board().is_empty(0));
    assert_eq!(state.current_turn(), Some(&p1));
    let events = room.drain();
    assert!(!events.iter().any(|e| matches!(e, OutboundEvent::State { .. })));
    assert_eq!(
        events,
        vec![OutboundEvent::Error {
            room: room.handle.id().clone(),
            to: p2.clone(),
            notice: strictly_rooms::RequestError::NotYourTurn.notice(),
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_invalid_moves_rejected_without_passing_turn() {
    let mut room = TestRoom::new();
    let p1 = room.join("p1", "Alice");
    let p2 = room.join("p2", "Bob");
    room.play(&p1, 4);

    room.play(&p2, 4);
    room.play(&p2, 9);
    room.play(&p2, -1);
    let state = room.snapshot().await;

    assert_eq!(state.board().get(4), Some(Cell::Occupied(Mark::X)));
    assert_eq!(state.current_turn(), Some(&p2));
    assert_eq!(
        room.notices_for(&p2),
        vec!["Invalid move. Try another position."; 3]
    );
}

#[tokio::test(start_paused = true)]
async fn test_moves_after_win_rejected() {
    let mut room = TestRoom::new();
    let (p1, p2) = room.seat_and_win_for_first().await;

    room.play(&p2, 8);
    room.play(&p1, 8);
    let state = room.snapshot().await;

    assert!(state.board().is_empty(8));
    assert_eq!(state.winner_name(), Some("Alice"));
    assert_eq!(state.winner_id(), Some(&p1));
    assert_eq!(*state.player(&p1).unwrap().win_count(), 1);
    assert_eq!(state.current_turn(), Some(&p1));

    let events = room.drain();
    let notices: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            OutboundEvent::Error { to, notice, .. } => Some((to.clone(), notice.message.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        notices,
        vec![
            (p2.clone(), "Game is already over.".to_string()),
            (p1.clone(), "Game is already over.".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_draw_recorded() {
    let room = TestRoom::new();
    let p1 = room.join("p1", "Alice");
    let p2 = room.join("p2", "Bob");

    // X O X / X O O / O X X
    for (id, index) in [
        (&p1, 0),
        (&p2, 1),
        (&p1, 2),
        (&p2, 4),
        (&p1, 3),
        (&p2, 5),
        (&p1, 7),
        (&p2, 6),
        (&p1, 8),
    ] {
        room.play(id, index);
    }
    let state = room.snapshot().await;

    assert!(*state.game_over());
    assert_eq!(state.winner_name(), Some(DRAW));
    assert_eq!(state.winner_id(), None);
    assert_eq!(*state.draw_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_before_conclusion_rejected() {
    let mut room = TestRoom::new();
    let p1 = room.join("p1", "Alice");
    let _p2 = room.join("p2", "Bob");
    room.play(&p1, 0);

    room.restart(&p1);
    let state = room.snapshot().await;

    assert_eq!(state.board().get(0), Some(Cell::Occupied(Mark::X)));
    assert!(!*state.restart_pulse());
    assert_eq!(room.notices_for(&p1), vec!["The game is not completed yet."]);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_win_lets_loser_open_and_pulses() {
    let mut room = TestRoom::new();
    let (p1, p2) = room.seat_and_win_for_first().await;

    room.restart(&p2);
    let state = room.snapshot().await;

    assert!(state.board().cells().iter().all(|c| *c == Cell::Empty));
    assert!(!*state.game_over());
    assert_eq!(state.winner_name(), None);
    assert_eq!(state.winner_id(), None);
    assert_eq!(state.current_turn(), Some(&p2));
    assert!(*state.restart_pulse());
    assert_eq!(*state.player(&p1).unwrap().win_count(), 1);

    // The pulse never blocks play.
    room.play(&p2, 4);
    let state = room.snapshot().await;
    assert_eq!(state.board().get(4), Some(Cell::Occupied(Mark::O)));
    assert!(*state.restart_pulse());

    tokio::time::sleep(Duration::from_millis(3001)).await;
    let state = room.snapshot().await;
    assert!(!*state.restart_pulse());
    assert_eq!(state.board().get(4), Some(Cell::Occupied(Mark::O)));
}

#[tokio::test(start_paused = true)]
async fn test_second_restart_supersedes_pending_pulse_clear() {
    let mut room = TestRoom::new();
    let (p1, p2) = room.seat_and_win_for_first().await;
    room.restart(&p1);
    room.snapshot().await;

    tokio::time::sleep(Duration::from_secs(2)).await;

    // Bob opens and wins the next round, then restarts again.
    for (id, index) in [(&p2, 0), (&p1, 3), (&p2, 1), (&p1, 4), (&p2, 2)] {
        room.play(id, index);
    }
    room.restart(&p2);
    let state = room.snapshot().await;
    assert_eq!(state.current_turn(), Some(&p1));
    assert_eq!(*state.player(&p2).unwrap().win_count(), 1);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(*room.snapshot().await.restart_pulse());

    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert!(!*room.snapshot().await.restart_pulse());
}

#[tokio::test(start_paused = true)]
async fn test_raw_messages_decode_or_notify() {
    let mut room = TestRoom::new();
    let p1 = room.join("p1", "Alice");
    let p2 = room.join("p2", "Bob");

    room.handle
        .send_raw(p1.clone(), "make_move", json!({ "index": 8 }))
        .unwrap();
    let state = room.snapshot().await;
    assert_eq!(state.board().get(8), Some(Cell::Occupied(Mark::X)));
    assert!(room.notices_for(&p1).is_empty());

    room.handle
        .send_raw(p2.clone(), "make_move", json!({ "cell": 4 }))
        .unwrap();
    room.handle
        .send_raw(p2.clone(), "make_move", json!("nine"))
        .unwrap();
    let state = room.snapshot().await;

    assert!(state.board().is_empty(4));
    assert_eq!(state.current_turn(), Some(&p2));
    assert_eq!(
        room.notices_for(&p2),
        vec!["Malformed \"make_move\" message."; 2]
    );
}

#[tokio::test(start_paused = true)]
async fn test_unseated_requester_gets_notice() {
    let mut room = TestRoom::new();
    let _p1 = room.join("p1", "Alice");
    let _p2 = room.join("p2", "Bob");
    let stranger = strictly_rules::SessionId::from("zed");

    room.play(&stranger, 0);
    room.restart(&stranger);
    let state = room.snapshot().await;

    assert!(state.board().is_empty(0));
    assert_eq!(
        room.notices_for(&stranger),
        vec!["You are not seated in this game."; 2]
    );
}
