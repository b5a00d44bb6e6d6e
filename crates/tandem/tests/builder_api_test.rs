//! Integration tests for the DiagramBuilder API

use tandem::{
    DiagramBuilder, TandemError,
    config::{AppConfig, LayoutEngine},
    identifier::Id,
};

const EXAMPLE: &str = "Client > Server: API Call\nServer > Database: Query";

#[test]
fn test_parse_example() {
    let builder = DiagramBuilder::default();
    let document = builder.parse(EXAMPLE).unwrap();

    assert_eq!(document.nodes().len(), 3);
    assert_eq!(document.edges().len(), 2);
    assert_eq!(document.source_map().len(), 2);
    assert!(document.edges().iter().all(|edge| edge.label().is_some()));
}

#[test]
fn test_layout_positions_every_node() {
    let builder = DiagramBuilder::default();
    let document = builder.parse(EXAMPLE).unwrap();
    let graph = builder.layout(&document).unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.routes().count(), 2);
    assert!(graph.nodes().all(|node| node.position().is_finite()));

    let client = graph.node(Id::new("Client")).unwrap().position();
    let server = graph.node(Id::new("Server")).unwrap().position();
    assert_ne!(client, server);
}

#[test]
fn test_hierarchical_layout_keeps_every_node() {
    let mut config = AppConfig::default();
    config.set_layout_engine(LayoutEngine::Hierarchical);
    let builder = DiagramBuilder::new(config);

    let source = "direction down\nWeb > Api\nApi > Db\nApi > Cache\nWeb > Cdn\nLonely";
    let document = builder.parse(source).unwrap();
    let graph = builder.layout(&document).unwrap();

    assert_eq!(graph.node_count(), 6);
    assert!(graph.nodes().all(|node| node.position().is_finite()));
    let mut seen: Vec<_> = graph
        .nodes()
        .map(|node| (node.position().x().to_bits(), node.position().y().to_bits()))
        .collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 6);
}

#[test]
fn test_render_svg() {
    let builder = DiagramBuilder::default();
    let document = builder.parse(EXAMPLE).unwrap();
    let graph = builder.layout(&document).unwrap();
    let svg = builder.render_svg(&graph).unwrap();

    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("</svg>"), "Output should be complete SVG");
    assert_eq!(svg.matches("class=\"edge\"").count(), 2);
    assert!(svg.contains("API Call"));
}

#[test]
fn test_unrecognized_lines_are_not_errors() {
    let builder = DiagramBuilder::default();
    let document = builder.parse("direction sideways\n[broken\n\n// note").unwrap();
    assert!(document.edges().is_empty());
}

#[test]
fn test_invalid_style_is_export_error() {
    let config: AppConfig = toml::from_str("[style]\nedge_color = \"no-such-color\"").unwrap();
    let builder = DiagramBuilder::new(config);
    let document = builder.parse("A > B").unwrap();
    let graph = builder.layout(&document).unwrap();

    let err = builder.render_svg(&graph).unwrap_err();
    assert!(matches!(err, TandemError::Export(_)));
}
