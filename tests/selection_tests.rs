// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Selection flow tests: click to highlight, URL sync, stale discards.

use overland_map::map::layers::highlight_layer;
use overland_map::map::{
    ColorScheme, HighlightController, HighlightSettings, LayerFilter, MapEvent, ScreenPoint,
};
use overland_map::models::{Entity, EntityKind, OpenStatus};
use overland_map::selection::{Outcome, SelectionState};
use overland_map::url::Route;
use serde_json::json;
use std::time::Duration;

mod common;

use common::{feature, feature_with_geometry, MapCall};

const CLICK: MapEvent = MapEvent::Click {
    point: ScreenPoint { x: 10.0, y: 20.0 },
};

fn selected(state: &SelectionState) -> (EntityKind, String) {
    let selected = state.selected().expect("expected a selection");
    (selected.kind, selected.id.clone())
}

#[tokio::test]
async fn test_country_click_highlights_and_pushes_url() {
    let t = common::test_session();
    t.map.set_features(vec![feature(
        "countries-fill",
        json!({"ADM0_A3": "KAZ", "NAME": "Kazakhstan"}),
    )]);

    let outcome = t.session.handle_event(CLICK).await;
    assert_eq!(outcome, Some(Outcome::Committed));

    let state = t.session.state();
    assert_eq!(selected(&state), (EntityKind::Country, "KAZ".to_string()));
    assert!(matches!(
        state.selected().and_then(|s| s.record.as_ref()),
        Some(Entity::Country(c)) if c.name == "Kazakhstan"
    ));

    assert_eq!(
        t.map.visible_highlights(),
        vec![(EntityKind::Country, LayerFilter::equals("ADM0_A3", "KAZ"))]
    );
    assert_eq!(t.history.paths(), vec!["/country/KAZ".to_string()]);
    assert_eq!(
        t.history.last_title().as_deref(),
        Some("Kazakhstan | Overland Map")
    );
}

#[tokio::test]
async fn test_country_without_codes_resolves_by_name() {
    let t = common::test_session();
    let clicked = feature(
        "countries-fill",
        json!({"ADM0_A3": "-99", "ISO_A3": "-99", "NAME": "Kazakhstan"}),
    );

    let outcome = t.session.select_feature(clicked).await;
    assert_eq!(outcome, Outcome::Committed);
    assert_eq!(
        selected(&t.session.state()),
        (EntityKind::Country, "KAZ".to_string())
    );
    assert_eq!(t.session.current_path(), "/country/KAZ");
}

#[tokio::test]
async fn test_unknown_country_keeps_raw_identifier() {
    let t = common::test_session();
    let clicked = feature("countries-fill", json!({"ADM0_A3": "XKX", "NAME": "Atlantis"}));

    assert_eq!(t.session.select_feature(clicked).await, Outcome::Committed);
    let state = t.session.state();
    let selection = state.selected().unwrap();
    assert_eq!(selection.id, "XKX");
    assert!(selection.record.is_none());
}

#[tokio::test]
async fn test_click_precedence_prefers_border_post() {
    let t = common::test_session();
    t.map.set_features(vec![
        feature("countries-fill", json!({"ADM0_A3": "KGZ"})),
        feature("borders-line", json!({"id": "KGZ-TJK"})),
        feature("border-posts", json!({"id": "bp-kyzyl-art"})),
    ]);

    assert_eq!(t.session.handle_event(CLICK).await, Some(Outcome::Committed));

    let state = t.session.state();
    assert_eq!(selected(&state), (EntityKind::BorderPost, "bp-kyzyl-art".to_string()));
    match state.selected().and_then(|s| s.record.as_ref()) {
        Some(Entity::BorderPost(post)) => {
            assert_eq!(post.is_open, OpenStatus::Restricted);
            assert_eq!(post.name.as_deref(), Some("Kyzyl-Art"));
        }
        other => panic!("unexpected record: {other:?}"),
    }

    let fly = t
        .map
        .calls()
        .into_iter()
        .find(|c| matches!(c, MapCall::FlyTo { .. }));
    match fly {
        Some(MapCall::FlyTo { center, zoom }) => {
            assert_eq!(zoom, 10.0);
            assert_eq!((center.x(), center.y()), (73.382, 39.35));
        }
        other => panic!("expected fly_to, got {other:?}"),
    }
}

#[tokio::test]
async fn test_complete_border_post_feature_needs_no_fetch() {
    let t = common::test_session();
    let clicked = feature_with_geometry(
        "border-posts",
        json!({"id": "bp-new", "name": "New post", "is_open": 3}),
        json!({"type": "Point", "coordinates": [70.0, 40.0]}),
    );

    assert_eq!(t.session.select_feature(clicked).await, Outcome::Committed);
    assert_eq!(t.remote.calls(), 0);

    let state = t.session.state();
    match state.selected().and_then(|s| s.record.as_ref()) {
        Some(Entity::BorderPost(post)) => {
            assert_eq!(post.is_open, OpenStatus::Restricted);
            assert_eq!(post.coordinates, Some([70.0, 40.0]));
        }
        other => panic!("unexpected record: {other:?}"),
    }
    assert_eq!(
        t.map.visible_highlights(),
        vec![(EntityKind::BorderPost, LayerFilter::equals("id", "bp-new"))]
    );
}

#[tokio::test]
async fn test_border_feature_without_id_is_unresolvable() {
    let t = common::test_session();
    let clicked = feature("borders-line", json!({"name": "KAZ-UZB"}));

    assert_eq!(t.session.select_feature(clicked).await, Outcome::Unresolvable);
    assert_eq!(t.session.state(), SelectionState::Empty);
    assert!(t.history.paths().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slow_resolution_is_discarded() {
    let t = common::test_session();
    t.remote.insert(
        EntityKind::Border,
        "slow-border",
        json!({"id": "slow-border", "properties": {"name": "AAA-BBB", "is_open": 2}}),
    );
    t.remote.insert(
        EntityKind::Border,
        "fast-border",
        json!({"id": "fast-border", "properties": {"name": "CCC-DDD", "is_open": 2}}),
    );
    t.remote.delay("slow-border", Duration::from_millis(500));

    let (slow, fast) = tokio::join!(t.session.select(EntityKind::Border, "slow-border"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        t.session.select(EntityKind::Border, "fast-border").await
    });

    assert_eq!(slow, Outcome::Superseded);
    assert_eq!(fast, Outcome::Committed);
    assert_eq!(
        selected(&t.session.state()),
        (EntityKind::Border, "fast-border".to_string())
    );
    assert_eq!(
        t.map.visible_highlights(),
        vec![(EntityKind::Border, LayerFilter::equals("id", "fast-border"))]
    );
    assert_eq!(t.history.paths(), vec!["/border/fast-border".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_close_during_resolution_wins() {
    let t = common::test_session();
    t.remote.insert(
        EntityKind::Zone,
        "zone-slow",
        json!({"id": "zone-slow", "properties": {"name": "Slow zone", "type": 1}}),
    );
    t.remote.delay("zone-slow", Duration::from_millis(200));

    let (outcome, closed) = tokio::join!(t.session.select(EntityKind::Zone, "zone-slow"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        t.session.close()
    });

    assert_eq!(outcome, Outcome::Superseded);
    assert_eq!(closed, Outcome::Cleared);
    assert_eq!(t.session.state(), SelectionState::Empty);
    assert!(t.map.visible_highlights().is_empty());
}

#[tokio::test]
async fn test_only_one_highlight_across_kinds() {
    let t = common::test_session();

    t.session.select(EntityKind::Country, "UZB").await;
    t.session.select(EntityKind::Border, "KAZ-UZB").await;
    t.session.select(EntityKind::Zone, "zone-gbao").await;

    assert_eq!(
        t.map.visible_highlights(),
        vec![(EntityKind::Zone, LayerFilter::equals("id", "zone-gbao"))]
    );
    assert!(t
        .map
        .filter_of(highlight_layer(EntityKind::Country))
        .is_some_and(|f| f.is_never()));
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let t = common::test_session();
    t.session.select(EntityKind::Country, "KAZ").await;

    assert_eq!(t.session.close(), Outcome::Cleared);
    let calls_after_first = t.map.calls().len();
    let pushes_after_first = t.history.paths();

    assert_eq!(t.session.close(), Outcome::Cleared);
    assert_eq!(t.session.state(), SelectionState::Empty);
    assert!(t.map.visible_highlights().is_empty());
    // The second clear re-applies the same filters and pushes nothing new.
    assert_eq!(t.map.calls().len(), calls_after_first + 5);
    assert_eq!(t.history.paths(), pushes_after_first);
    assert_eq!(pushes_after_first.last().map(String::as_str), Some("/"));
    assert_eq!(t.history.last_title().as_deref(), Some("Overland Map"));
}

#[tokio::test]
async fn test_empty_click_closes_selection() {
    let t = common::test_session();
    t.session.select(EntityKind::Country, "KAZ").await;

    t.map.set_features(vec![feature("water", json!({}))]);
    assert_eq!(t.session.handle_event(CLICK).await, Some(Outcome::Cleared));
    assert_eq!(t.session.state(), SelectionState::Empty);
}

#[tokio::test(start_paused = true)]
async fn test_itinerary_switches_scheme_before_highlight() {
    let t = common::test_session();
    let clicked = feature("itineraries-line", json!({"id": "G6"}));

    assert_eq!(t.session.select_feature(clicked).await, Outcome::Committed);
    assert_eq!(t.session.color_scheme(), ColorScheme::Itineraries);

    let repaint = t
        .map
        .position(|c| matches!(c, MapCall::Paint { layer, .. } if layer == "countries-fill"))
        .expect("country layer repainted");
    let highlight = t
        .map
        .position(|c| {
            matches!(c, MapCall::Filter { layer, filter } if layer == "highlight-itinerary" && !filter.is_never())
        })
        .expect("itinerary highlighted");
    assert!(repaint < highlight);

    assert!(t.map.calls().iter().any(|c| matches!(c, MapCall::FitBounds(_))));
    assert_eq!(t.history.last_title().as_deref(), Some("Pamir Highway | Overland Map"));
}

#[tokio::test(start_paused = true)]
async fn test_highlight_gives_up_when_layer_never_loads() {
    let map = common::FakeMap::empty();
    map.add_layer("countries-fill");
    let t = common::session_with(map, common::FakeRemote::new());

    let outcome = t.session.select(EntityKind::Country, "TJK").await;

    // The selection still commits; only the visual highlight is missing.
    assert_eq!(outcome, Outcome::Committed);
    assert_eq!(selected(&t.session.state()), (EntityKind::Country, "TJK".to_string()));
    assert!(t.map.visible_highlights().is_empty());
}

#[tokio::test]
async fn test_url_round_trip_for_every_kind() {
    let cases = [
        (EntityKind::Country, "UZB"),
        (EntityKind::Border, "KAZ-UZB"),
        (EntityKind::BorderPost, "bp-zhibek-zholy"),
        (EntityKind::Zone, "zone-gbao"),
        (EntityKind::Itinerary, "G6"),
    ];

    for (kind, id) in cases {
        let first = common::test_session();
        assert_eq!(first.session.select(kind, id).await, Outcome::Committed);
        let path = first.session.current_path();
        assert_eq!(path, Route::entity(kind, id).to_path());

        let second = common::test_session();
        assert_eq!(second.session.open_initial_route(&path).await, Outcome::Committed);
        let state = second.session.state();
        assert_eq!(selected(&state), (kind, id.to_string()));
        assert!(state.selected().unwrap().record.is_some(), "{kind} {id}");
        // A deep link is already in the address bar.
        assert!(second.history.paths().is_empty());
    }
}

#[tokio::test]
async fn test_back_navigation_does_not_push() {
    let t = common::test_session();
    t.session.select(EntityKind::Country, "KAZ").await;
    t.session.select(EntityKind::Country, "UZB").await;
    assert_eq!(t.history.paths().len(), 2);

    assert_eq!(t.session.handle_pop_state("/country/KAZ").await, Outcome::Committed);
    assert_eq!(selected(&t.session.state()), (EntityKind::Country, "KAZ".to_string()));
    assert_eq!(t.session.current_path(), "/country/KAZ");

    assert_eq!(t.session.handle_pop_state("/").await, Outcome::Cleared);
    assert_eq!(t.session.state(), SelectionState::Empty);
    assert_eq!(t.history.paths().len(), 2);

    // A fresh selection after navigating pushes again.
    t.session.select(EntityKind::Country, "TJK").await;
    assert_eq!(t.history.paths().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_selection_during_back_navigation_still_pushes() {
    let t = common::test_session();
    t.remote.insert(
        EntityKind::Zone,
        "zone-slow",
        json!({"id": "zone-slow", "properties": {"name": "Slow zone", "type": 1}}),
    );
    t.remote.delay("zone-slow", Duration::from_millis(500));

    let (popped, picked) = tokio::join!(t.session.handle_pop_state("/zone/zone-slow"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        t.session.select(EntityKind::Country, "KAZ").await
    });

    assert_eq!(popped, Outcome::Superseded);
    assert_eq!(picked, Outcome::Committed);
    assert_eq!(selected(&t.session.state()), (EntityKind::Country, "KAZ".to_string()));
    assert_eq!(t.history.paths(), vec!["/country/KAZ".to_string()]);
    assert_eq!(t.session.current_path(), "/country/KAZ");
}

#[tokio::test(start_paused = true)]
async fn test_stalled_remote_does_not_hang_selection() {
    let t = common::test_session();
    t.remote.delay("zone-gbao", Duration::from_secs(3600));

    let started = tokio::time::Instant::now();
    let outcome = t.session.select(EntityKind::Zone, "zone-gbao").await;

    assert_eq!(outcome, Outcome::Committed);
    assert!(started.elapsed() < Duration::from_secs(60));
    let state = t.session.state();
    let record = &state.selected().unwrap().record;
    assert!(matches!(record, Some(Entity::Zone(zone)) if zone.id == "zone-gbao"));
    assert_eq!(t.history.paths(), vec!["/zone/zone-gbao".to_string()]);
}

#[tokio::test]
async fn test_highlight_budget_overrun_is_only_a_warning() {
    let map = common::FakeMap::ready();
    let settings = HighlightSettings {
        budget: Duration::from_millis(20),
        retry_delay: Duration::from_millis(5),
        max_attempts: 10,
    };
    let controller = HighlightController::new(map.clone(), settings);

    controller.try_highlight(EntityKind::Country, "KAZ").await.unwrap();
    assert_eq!(controller.budget_overruns(), 0);

    map.set_latency(Duration::from_millis(15));
    controller.try_highlight(EntityKind::Border, "KAZ-UZB").await.unwrap();
    assert_eq!(controller.budget_overruns(), 1);
    assert_eq!(
        map.visible_highlights(),
        vec![(EntityKind::Border, LayerFilter::equals("id", "KAZ-UZB"))]
    );

    controller.clear_all();
    assert_eq!(controller.budget_overruns(), 2);
    assert!(map.visible_highlights().is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_ignored() {
    let t = common::test_session();
    assert_eq!(t.session.handle_pop_state("/museum/1").await, Outcome::Ignored);
    assert_eq!(t.session.state(), SelectionState::Empty);
}

#[tokio::test]
async fn test_history_state_carries_kind_and_id() {
    let t = common::test_session();
    t.session.select(EntityKind::BorderPost, "bp-kyzyl-art").await;

    let states = t.history.states();
    let state = states[0].as_ref().expect("entity routes carry state");
    assert_eq!(state.kind, EntityKind::BorderPost);
    assert_eq!(state.id, "bp-kyzyl-art");
}

#[tokio::test]
async fn test_hover_cursor() {
    let t = common::test_session();

    t.session
        .handle_event(MapEvent::MouseEnter {
            layer: "borders-line".to_string(),
        })
        .await;
    assert_eq!(t.map.last_cursor().as_deref(), Some("pointer"));

    t.session
        .handle_event(MapEvent::MouseLeave {
            layer: "borders-line".to_string(),
        })
        .await;
    assert_eq!(t.map.last_cursor().as_deref(), Some(""));
}

#[tokio::test]
async fn test_subscribers_see_committed_state() {
    let t = common::test_session();
    let mut rx = t.session.subscribe();

    t.session.select(EntityKind::Country, "KGZ").await;
    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert_eq!(selected(&state), (EntityKind::Country, "KGZ".to_string()));
    assert!(state.selected().unwrap().record.is_some());
}

#[tokio::test]
async fn test_teardown_leaves_history_alone() {
    let t = common::test_session();
    t.session.select(EntityKind::Country, "KAZ").await;
    let pushes = t.history.paths();

    t.session.teardown();
    assert_eq!(t.session.state(), SelectionState::Empty);
    assert!(t.map.visible_highlights().is_empty());
    assert_eq!(t.history.paths(), pushes);
}
