use std::thread;
use std::time::Duration;
use tempograph::{
    AttrValue, AttributeKey, CancelToken, ChangedAttribute, Direction, ElementKind, Identity,
    Interval, PendingEdge, Session, SyncSession, TimeSlider, Transition, Window, WindowPlayer,
};

fn color_session() -> (Session, Identity) {
    let mut session = Session::new();
    session
        .create_network(Some("net"), None, Interval::unbounded(), true)
        .unwrap();
    let node = Identity::Node(session.create_node(Some("n"), None, Interval::unbounded()).unwrap());
    for (value, start, end) in [("red", 0.0, 5.0), ("blue", 5.0, 10.0)] {
        session
            .record(
                node,
                AttributeKey::attribute("color"),
                AttrValue::String(value.into()),
                "string",
                Interval::new(start, end),
            )
            .unwrap();
    }
    (session, node)
}

fn summary(changes: &[ChangedAttribute]) -> Vec<(String, Transition)> {
    changes
        .iter()
        .map(|c| (c.value.to_string(), c.transition))
        .collect()
}

/// Moving from [0,5) to [5,10) reports red leaving and blue entering.
#[test]
fn test_color_switch_between_adjacent_windows() {
    let (session, node) = color_session();
    let key = AttributeKey::attribute("color");

    let changes = session
        .changed_since(
            ElementKind::Node,
            Some(&key),
            Window::new(0.0, 5.0),
            Window::new(5.0, 10.0),
        )
        .unwrap();
    assert_eq!(
        summary(&changes),
        vec![
            ("red".to_string(), Transition::Left),
            ("blue".to_string(), Transition::Entered),
        ]
    );
    assert!(changes.iter().all(|c| c.identity == node));

    assert_eq!(
        session.current_active_value(node, &key, 4.999),
        Some(&AttrValue::String("red".into()))
    );
    assert_eq!(
        session.current_active_value(node, &key, 5.0),
        Some(&AttrValue::String("blue".into()))
    );
}

#[test]
fn test_changed_is_symmetric_and_idempotent() {
    let (session, _) = color_session();
    let windows = [
        Window::EMPTY,
        Window::new(0.0, 1.0),
        Window::new(4.0, 6.0),
        Window::point(7.0),
        Window::new(9.0, 20.0),
    ];

    for w1 in &windows {
        assert!(session.advance_window(*w1, *w1).unwrap().is_empty());
        for w2 in &windows {
            let forward = session.advance_window(*w1, *w2).unwrap();
            let backward = session.advance_window(*w2, *w1).unwrap();
            assert_eq!(forward.len(), backward.len());
            for (f, b) in forward.iter().zip(backward.iter()) {
                assert_eq!(f.interval, b.interval);
                assert_eq!(f.transition, b.transition.reversed());
            }
        }
    }
}

/// Touching the boundary is not overlapping.
#[test]
fn test_boundary_contact_is_not_visible() {
    let (session, _) = color_session();
    let key = AttributeKey::attribute("color");
    let visible = session
        .store()
        .overlapping(ElementKind::Node, &key, &Window::new(10.0, 12.0));
    assert!(visible.is_empty());

    let visible = session
        .store()
        .overlapping(ElementKind::Node, &key, &Window::new(4.0, 5.0));
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].1.value, AttrValue::String("red".into()));
}

#[test]
fn test_instant_events_show_in_spanning_windows() {
    let mut session = Session::new();
    session
        .create_network(None, None, Interval::unbounded(), false)
        .unwrap();
    let node = Identity::Node(session.create_node(Some("n"), None, Interval::unbounded()).unwrap());
    session
        .record(
            node,
            AttributeKey::attribute("ping"),
            AttrValue::Boolean(true),
            "boolean",
            Interval::new(3.0, 3.0),
        )
        .unwrap();

    let entered = session
        .advance_window(Window::new(0.0, 1.0), Window::new(2.0, 4.0))
        .unwrap();
    assert_eq!(entered.nodes.len(), 1);
    assert_eq!(
        session.current_active_value(node, &AttributeKey::attribute("ping"), 3.0),
        Some(&AttrValue::Boolean(true))
    );
}

#[test]
fn test_visible_sets_for_a_window() {
    let mut session = Session::new();
    session
        .create_network(None, None, Interval::unbounded(), true)
        .unwrap();
    session.create_node(Some("a"), None, Interval::new(0.0, 10.0)).unwrap();
    session.create_node(Some("b"), None, Interval::new(5.0, 10.0)).unwrap();
    session
        .create_edge(PendingEdge::new("a", "b", Interval::new(6.0, 8.0)))
        .unwrap();

    assert_eq!(session.visible_nodes(Window::new(1.0, 2.0)).len(), 1);
    assert_eq!(session.visible_nodes(Window::new(6.0, 7.0)).len(), 2);
    assert!(session.visible_edges(Window::new(1.0, 2.0)).is_empty());
    assert_eq!(session.visible_edges(Window::new(7.0, 7.5)).len(), 1);
}

/// Playing the whole slider forward and back leaves every change balanced.
#[test]
fn test_player_round_trip_balances_transitions() {
    let (session, _) = color_session();
    let slider = TimeSlider::for_session(&session).unwrap();
    assert_eq!(slider.time_at(0), 0.0);
    assert_eq!(slider.time_at(slider.last_position()), 10.0);

    let mut player = WindowPlayer::new(slider, CancelToken::new());
    let mut balance = 0i64;
    let mut count = |delta: &tempograph::WindowDelta| {
        for change in delta.iter() {
            balance += match change.transition {
                Transition::Entered => 1,
                Transition::Left => -1,
            };
        }
    };

    count(&player.seek(&session, 0).unwrap());
    player
        .play(&session, Direction::Forward, |_, delta| count(delta))
        .unwrap();
    player
        .play(&session, Direction::Backward, |_, delta| count(delta))
        .unwrap();
    assert_eq!(player.position(), 0);

    // Back at the first window: network, node and red are visible.
    assert_eq!(balance, 3);
}

#[test]
fn test_cancel_from_another_thread_stops_playback() {
    let mut session = Session::new();
    session
        .create_network(None, None, Interval::new(0.0, 1_000.0), true)
        .unwrap();
    let shared = SyncSession::new(session);

    let cancel = CancelToken::new();
    let slider = TimeSlider::new(0.0, 1_000.0, 1_000_000);
    let mut player = WindowPlayer::new(slider, cancel.clone());

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        cancel.cancel();
    });

    let frames = {
        let guard = shared.read();
        player
            .play(&guard, Direction::Forward, |_, _| {
                thread::sleep(Duration::from_micros(50));
            })
            .unwrap()
    };
    stopper.join().unwrap();

    assert!(frames < 1_000_000);
    assert_eq!(player.position() as usize, frames);
}

#[test]
fn test_window_cycle_applies_delta() {
    let (session, node) = color_session();
    let shared = SyncSession::new(session);

    let applied = shared
        .window_cycle(Window::EMPTY, Window::new(6.0, 7.0), |delta| {
            delta
                .nodes
                .iter()
                .filter(|c| c.identity == node)
                .map(|c| c.value.to_string())
                .collect::<Vec<_>>()
        })
        .unwrap();
    assert_eq!(applied, vec!["true", "blue"]);

    assert_eq!(
        shared.current_active_value(node, &AttributeKey::attribute("color"), 6.5),
        Some(AttrValue::String("blue".into()))
    );
}
