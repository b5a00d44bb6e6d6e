//! Editing sessions driven through the sync controller.

use tandem::{
    config::{AppConfig, LayoutEngine},
    geometry::Point,
    identifier::Id,
    layout::hierarchical::SugiyamaService,
    model::{Origin, SYNTHETIC_LINE},
    surface::DiagramEvent,
    sync::{Effect, LayoutOutcome, SyncController, SyncOrigin, SyncState},
};

fn regenerated_text(effects: &[Effect]) -> Option<String> {
    effects.iter().find_map(|effect| match effect {
        Effect::TextRegenerated(text) => Some(text.clone()),
        _ => None,
    })
}

#[test]
fn test_round_trip_session() {
    let mut config = AppConfig::default();
    config.set_regenerate_text(true);
    let mut sync = SyncController::new(config);

    sync.on_text_changed("Client > Server: API Call\nServer > Database: Query");
    assert_eq!(sync.graph().node_count(), 3);

    // Draw a new node and connect it; every edit is echoed back by the editor.
    let report = sync.on_diagram_event(
        DiagramEvent::AddNode {
            position: Point::new(600.0, 50.0),
        },
        SyncOrigin::FromDiagram,
    );
    let text = regenerated_text(report.effects()).unwrap();
    assert!(sync.on_text_changed(&text).is_empty());

    let report = sync.on_diagram_event(
        DiagramEvent::Connect {
            source: Id::new("Server"),
            target: Id::new("node_1"),
        },
        SyncOrigin::FromDiagram,
    );
    let text = regenerated_text(report.effects()).unwrap();
    assert!(text.ends_with("\nAsset 1\nServer > Asset 1"));
    assert!(sync.on_text_changed(&text).is_empty());

    assert_eq!(sync.graph().node_count(), 4);
    assert_eq!(sync.graph().edge_count(), 3);
    assert_eq!(sync.line_for_entity(Id::new("node_1")), SYNTHETIC_LINE);
    assert_eq!(sync.state(), SyncState::Idle);

    // The user then types; the text is the single source of truth again.
    let edited = format!("{text}\n// reviewed");
    let report = sync.on_text_changed(&edited);
    assert!(report.contains(|e| matches!(e, Effect::GraphReplaced(_))));
    assert_eq!(sync.graph().node_count(), 4);
    let asset = sync.graph().node(Id::new("Asset 1")).unwrap();
    assert_eq!(asset.origin(), Origin::Line(2));
    assert!(sync.graph().node(Id::new("node_1")).is_none());
}

#[test]
fn test_hierarchical_session() {
    let mut config = AppConfig::default();
    config.set_layout_engine(LayoutEngine::Hierarchical);
    let mut sync = SyncController::new(config);

    let report = sync.on_text_changed("direction down\nWeb > Api\nApi > Db");
    assert!(report.contains(|e| matches!(e, Effect::LayoutRequested(_))));

    let grid = sync.graph().positions();
    assert_eq!(sync.run_layout(&SugiyamaService), LayoutOutcome::Applied);
    assert_eq!(sync.graph().positions().len(), grid.len());
    assert!(sync.graph().nodes().all(|node| node.position().is_finite()));
    assert_eq!(sync.graph().routes().count(), 2);
}
