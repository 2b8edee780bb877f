use tempograph::stream::{ElementTag, ParseEvent};
use tempograph::{
    AttrValue, AttributeKey, Identity, Interval, IntervalIndex, Session, SessionBuilder,
    TempographError, Window,
};

/// Large timeline: many overlapping intervals stay queryable
#[test]
fn test_large_partition() {
    let mut session = Session::new();
    session
        .create_network(None, None, Interval::unbounded(), true)
        .expect("Failed to create network");
    let node = Identity::Node(
        session
            .create_node(Some("hub"), None, Interval::unbounded())
            .expect("Failed to create node"),
    );

    for i in 0..10_000 {
        let start = i as f64;
        session
            .record(
                node,
                AttributeKey::attribute("load"),
                AttrValue::Integer(i),
                "integer",
                Interval::new(start, start + 50.0),
            )
            .unwrap_or_else(|_| panic!("Failed to record interval {}", i));
    }

    let delta = session
        .advance_window(Window::new(100.0, 101.0), Window::new(101.0, 102.0))
        .expect("Query failed");
    // [51, 101) leaves, [101, 151) enters.
    assert_eq!(delta.nodes.len(), 2);
    assert_eq!(
        session.current_active_value(node, &AttributeKey::attribute("load"), 5_000.5),
        Some(&AttrValue::Integer(5_000))
    );
}

/// Queries on an empty index
#[test]
fn test_empty_index_queries() {
    let index: IntervalIndex<()> = IntervalIndex::new();
    assert!(index.overlapping(&Window::new(f64::NEG_INFINITY, f64::INFINITY)).is_empty());
    assert!(index.changed(&Window::EMPTY, &Window::new(0.0, 1.0)).is_empty());
    assert_eq!(index.active_at(0.0, |_| true), None);
    assert_eq!(index.depth(), 0);

    let session = Session::new();
    assert_eq!(session.min_time(), None);
    assert_eq!(session.max_time(), None);
    assert!(session.advance_window(Window::EMPTY, Window::new(0.0, 1.0)).unwrap().is_empty());
}

/// Infinite sentinels as interval and window bounds
#[test]
fn test_infinite_bounds() {
    let mut index = IntervalIndex::new();
    index.insert(Interval::unbounded(), "always").unwrap();
    index.insert(Interval::new(f64::NEG_INFINITY, 0.0), "past").unwrap();
    index.insert(Interval::open(0.0), "future").unwrap();

    let everything = Window::new(f64::NEG_INFINITY, f64::INFINITY);
    assert_eq!(index.overlapping_ids(&everything), vec![0, 1, 2]);
    assert_eq!(index.overlapping_ids(&Window::new(-1.0, 0.0)), vec![0, 1]);
    assert_eq!(index.overlapping_ids(&Window::new(0.0, 1.0)), vec![0, 2]);
    assert_eq!(index.bounds().min(), Some(0.0));
    assert_eq!(index.bounds().max(), Some(0.0));
}

/// NaN never enters the index
#[test]
fn test_nan_bounds_rejected() {
    let mut index = IntervalIndex::new();
    assert!(matches!(
        index.insert(Interval::new(0.0, f64::NAN), ()),
        Err(TempographError::InvalidInterval(_))
    ));
    assert!(index.is_empty());

    let session = Session::new();
    assert!(session
        .advance_window(Window::EMPTY, Window::new(f64::NAN, 1.0))
        .is_err());
}

/// Signed zero is a single start key
#[test]
fn test_signed_zero() {
    let mut index = IntervalIndex::new();
    index.insert(Interval::new(-0.0, 1.0), 'a').unwrap();
    index.insert(Interval::new(0.0, 1.0), 'b').unwrap();
    assert_eq!(index.distinct_starts(), 1);

    let active = index.active_at(0.0, |_| true).unwrap();
    assert_eq!(index.get(active).unwrap().payload, 'b');
}

/// Unparseable time stamps skip only the offending attribute
#[test]
fn test_non_numeric_time_stamps() {
    let events = vec![
        ParseEvent::start(ElementTag::Network, [("id", "net"), ("start", "dawn")]),
        ParseEvent::start(ElementTag::Node, [("id", "n"), ("start", "0")]),
        ParseEvent::start(
            ElementTag::NodeAttribute,
            [("name", "w"), ("type", "integer"), ("value", "1"), ("start", "later")],
        ),
        ParseEvent::end(ElementTag::NodeAttribute),
        ParseEvent::start(
            ElementTag::NodeAttribute,
            [("name", "w"), ("type", "integer"), ("value", "2"), ("start", "Infinity")],
        ),
        ParseEvent::end(ElementTag::NodeAttribute),
        ParseEvent::end(ElementTag::Node),
        ParseEvent::end(ElementTag::Network),
    ];

    let networks = SessionBuilder::new().load(events).unwrap();
    let session = &networks[0].session;
    // The malformed network interval falls back to the whole timeline.
    assert_eq!(
        session.graph().network().unwrap().existence,
        Interval::unbounded()
    );
    assert_eq!(session.stats().attributes_skipped, 1);
    assert_eq!(session.stats().attributes_recorded, 1);
}

/// Unicode ids and labels
#[test]
fn test_unicode_identifiers() {
    let mut session = Session::new();
    session
        .create_network(
            Some("réseau"),
            Some("動的ネットワーク"),
            Interval::unbounded(),
            true,
        )
        .unwrap();
    let a = session.create_node(Some("ノード"), None, Interval::unbounded()).unwrap();
    session.create_node(Some("узел"), None, Interval::unbounded()).unwrap();
    session
        .create_edge(tempograph::PendingEdge::new("ノード", "узел", Interval::unbounded()))
        .unwrap();

    assert_eq!(session.graph().node_by_key("ノード"), Some(a));
    assert!(session.graph().edge_by_key("ノード-узел").is_some());
}

/// Closing an already closed interval is rejected without side effects
#[test]
fn test_double_backfill() {
    let mut session = Session::new();
    let node = Identity::Node(session.create_node(Some("n"), None, Interval::open(1.0)).unwrap());
    let key = AttributeKey::attribute("state");
    session
        .record(node, key.clone(), AttrValue::Boolean(true), "boolean", Interval::open(2.0))
        .unwrap();

    session.backfill(node, &key, 3.0).unwrap();
    assert!(session.backfill(node, &key, 4.0).is_err());
    assert_eq!(session.stats().backfilled, 1);
    assert_eq!(
        session.store().history(node, &key),
        vec![(Interval::new(2.0, 3.0), &AttrValue::Boolean(true))]
    );
}
