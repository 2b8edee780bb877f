//! Streams a small dynamic network and replays it through a moving window.
//!
//! The edge `a-c` is declared before node `c` exists, so it waits in the
//! orphan queue until the network closes.
//!
//! Run with: RUST_LOG=debug cargo run --example replay_window

use std::thread;
use std::time::Duration;
use tempograph::prelude::*;
use tempograph::{CancelToken, Direction, TimeSlider, WindowPlayer};

fn events() -> Vec<ParseEvent> {
    vec![
        ParseEvent::start(ElementTag::Network, [("id", "demo"), ("label", "Replay demo")]),
        ParseEvent::start(ElementTag::Node, [("id", "a"), ("start", "0")]),
        ParseEvent::start(
            ElementTag::NodeAttribute,
            [
                ("name", "status"),
                ("type", "string"),
                ("value", "idle"),
                ("start", "0"),
                ("end", "4"),
            ],
        ),
        ParseEvent::end(ElementTag::NodeAttribute),
        ParseEvent::start(
            ElementTag::NodeAttribute,
            [
                ("name", "status"),
                ("type", "string"),
                ("value", "busy"),
                ("start", "4"),
                ("end", "10"),
            ],
        ),
        ParseEvent::end(ElementTag::NodeAttribute),
        ParseEvent::end(ElementTag::Node),
        ParseEvent::start(ElementTag::Node, [("id", "b"), ("start", "2"), ("end", "8")]),
        ParseEvent::end(ElementTag::Node),
        ParseEvent::start(
            ElementTag::Edge,
            [("source", "a"), ("target", "c"), ("start", "6")],
        ),
        ParseEvent::start(
            ElementTag::EdgeAttribute,
            [("name", "weight"), ("type", "real"), ("value", "2.5"), ("start", "6")],
        ),
        ParseEvent::end(ElementTag::EdgeAttribute),
        ParseEvent::end(ElementTag::Edge),
        ParseEvent::start(ElementTag::Node, [("id", "c"), ("start", "5"), ("end", "10")]),
        ParseEvent::end(ElementTag::Node),
        ParseEvent::end(ElementTag::Network),
    ]
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Window Replay Example ===\n");

    let mut networks = SessionBuilder::new().load(events())?;
    let loaded = networks.remove(0);
    println!("1. Loaded network, status: {:?}", loaded.status);

    let stats = loaded.session.stats();
    println!(
        "   {} nodes, {} edges, {} attributes, {} orphan(s) resolved\n",
        stats.nodes, stats.edges, stats.attributes_recorded, stats.orphans_resolved
    );

    let shared = SyncSession::new(loaded.session);
    let (min, max) = match (shared.min_time(), shared.max_time()) {
        (Some(min), Some(max)) => (min, max),
        _ => return Err("network has no finite time bounds".into()),
    };

    println!("2. Playing {}..{} forward", min, max);
    let slider = TimeSlider::new(min, max, 10);
    let cancel = CancelToken::new();
    let mut player = WindowPlayer::new(slider, cancel.clone());

    {
        let session = shared.read();
        let first = player.seek(&session, 0)?;
        println!("   t={:>5.1}  {} change(s)", player.current_time(), first.len());

        player.play(&session, Direction::Forward, |position, delta| {
            let t = slider.time_at(position);
            for change in delta.iter() {
                let arrow = match change.transition {
                    Transition::Entered => "+",
                    Transition::Left => "-",
                };
                println!(
                    "   t={:>5.1}  {} {} {} = {}",
                    t, arrow, change.identity, change.key, change.value
                );
            }
        })?;
    }

    println!("\n3. Visible at t=6");
    let window = Window::new(6.0, 7.0);
    println!("   nodes: {:?}", shared.visible_nodes(window));
    println!("   edges: {:?}", shared.visible_edges(window));

    println!("\n4. Cancelling a long backward replay from another thread");
    let stopper = {
        let cancel = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            cancel.cancel();
        })
    };
    let frames = {
        let session = shared.read();
        player.play(&session, Direction::Backward, |_, _| {
            thread::sleep(Duration::from_millis(2));
        })?
    };
    stopper.join().map_err(|_| "stopper thread panicked")?;
    println!("   played {} frame(s) before stopping at position {}", frames, player.position());

    println!("\n=== Example completed ===");
    Ok(())
}
