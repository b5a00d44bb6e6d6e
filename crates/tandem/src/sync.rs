//! Bidirectional sync between the source text and the rendered diagram.
//!
//! The [`SyncController`] owns the current text, the rendered graph and the
//! source map of the last successful parse. Every call runs to completion:
//! the controller leaves [`SyncState::Idle`] for the duration of one update
//! and is back before returning.
//!
//! ```text
//!            text changed                      diagram interaction
//!   Idle ───────────────► ApplyingFromText    Idle ─────────────► ApplyingFromDiagram
//!     ▲   parse, rebuild graph   │              ▲   patch graph in place   │
//!     └──────────────────────────┘              └──────────────────────────┘
//! ```
//!
//! Text updates rebuild the graph wholesale. Diagram updates never re-parse;
//! when text regeneration is enabled they append a statement to the text and
//! arm an echo guard so the editor's resulting text-change event is not
//! parsed back into a duplicate.
//!
//! Layout delegation is asynchronous: [`SyncController::request_layout`]
//! hands out a [`LayoutJob`] stamped with the graph identity, and the result
//! is only applied if the graph has not changed in the meantime.

use std::{collections::HashMap, fmt};

use log::{debug, error, info, trace, warn};

use tandem_core::{
    geometry::Point,
    identifier::Id,
    model::{Document, EdgeKind, Origin, SYNTHETIC_LINE},
    source_map::{EntityKind, EntityRef, SourceMap},
};

use crate::{
    config::{AppConfig, LayoutEngine},
    layout::{
        GraphIdentity, grid,
        hierarchical::{self, LayoutRequest, LayoutService, LayoutServiceError},
    },
    measure,
    surface::{DiagramEvent, NodeKind, RenderEdge, RenderGraph, RenderNode},
};

const DIAGRAM_NODE_COLOR: &str = "blue";
const DIAGRAM_GROUP_COLOR: &str = "gray";

/// What the controller is doing right now.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    ApplyingFromText,
    ApplyingFromDiagram,
}

/// Provenance of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOrigin {
    FromText,
    FromDiagram,
}

impl fmt::Display for SyncOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FromText => write!(f, "text"),
            Self::FromDiagram => write!(f, "diagram"),
        }
    }
}

/// Something the host has to do after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The rendered graph was rebuilt from text.
    GraphReplaced(GraphIdentity),
    /// The rendered graph was changed in place.
    GraphPatched,
    /// The text was extended to match a diagram edit. The editor should show
    /// this text.
    TextRegenerated(String),
    /// The editor should highlight this 0-based line.
    HighlightLine(usize),
    /// The diagram should focus this entity.
    FocusEntity(EntityRef),
    /// The graph identity changed and the hierarchical engine is selected.
    LayoutRequested(GraphIdentity),
    /// The text could not be compiled; the previous graph is still shown.
    ParseFailed { line: usize, message: String },
}

/// Result of one controller call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    origin: Option<SyncOrigin>,
    effects: Vec<Effect>,
}

impl SyncReport {
    fn new(origin: Option<SyncOrigin>, effects: Vec<Effect>) -> Self {
        Self { origin, effects }
    }

    fn ignored() -> Self {
        Self::default()
    }

    /// Origin of the change this call applied, if it applied one.
    pub fn origin(&self) -> Option<SyncOrigin> {
        self.origin
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn contains(&self, predicate: impl Fn(&Effect) -> bool) -> bool {
        self.effects.iter().any(predicate)
    }
}

/// Stamp identifying the graph a layout was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTicket {
    identity: GraphIdentity,
    generation: u64,
}

impl LayoutTicket {
    pub fn identity(&self) -> GraphIdentity {
        self.identity
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A layout computation handed to the host.
#[derive(Debug, Clone)]
pub struct LayoutJob {
    ticket: LayoutTicket,
    request: LayoutRequest,
}

impl LayoutJob {
    pub fn ticket(&self) -> LayoutTicket {
        self.ticket
    }

    pub fn request(&self) -> &LayoutRequest {
        &self.request
    }

    /// Runs the job on `service`.
    pub fn run(&self, service: &dyn LayoutService) -> Result<HashMap<Id, Point>, LayoutServiceError> {
        service.layout(&self.request)
    }
}

/// What happened to a layout result.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutOutcome {
    Applied,
    /// The graph changed after the request; the result was dropped.
    Stale,
    /// The service failed; positions are unchanged.
    Failed(LayoutServiceError),
}

/// Allocates ids for diagram-created entities.
///
/// The counter only grows. Candidates already taken are skipped.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: usize,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator {
    /// Returns the next free `{prefix}_{n}` and its number.
    pub fn next_numbered(&mut self, prefix: &str, taken: impl Fn(Id) -> bool) -> (Id, usize) {
        loop {
            let n = self.bump();
            let id = Id::numbered(prefix, n);
            if !taken(id) {
                return (id, n);
            }
        }
    }

    /// Returns the next free `{source}-{target}-{n}`.
    pub fn next_edge(&mut self, source: Id, target: Id, taken: impl Fn(Id) -> bool) -> Id {
        loop {
            let n = self.bump();
            let id = Id::new(&format!("{source}-{target}-{n}"));
            if !taken(id) {
                return id;
            }
        }
    }

    fn bump(&mut self) -> usize {
        let n = self.next;
        self.next += 1;
        n
    }
}

type Parser = fn(&str) -> tandem_parser::Result<Document>;

/// Keeps the source text and the rendered diagram in sync.
pub struct SyncController {
    config: AppConfig,
    parser: Parser,
    state: SyncState,
    last_origin: Option<SyncOrigin>,
    text: String,
    graph: RenderGraph,
    source_map: SourceMap,
    identity: GraphIdentity,
    generation: u64,
    ids: IdGenerator,
    echo: Option<String>,
}

impl SyncController {
    pub fn new(config: AppConfig) -> Self {
        let graph = RenderGraph::default();
        Self {
            config,
            parser: tandem_parser::parse,
            state: SyncState::Idle,
            last_origin: None,
            text: String::new(),
            identity: graph.identity(),
            graph,
            source_map: SourceMap::default(),
            generation: 0,
            ids: IdGenerator::default(),
            echo: None,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Origin of the last applied change.
    pub fn last_origin(&self) -> Option<SyncOrigin> {
        self.last_origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    /// Source map of the last successful parse.
    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn identity(&self) -> GraphIdentity {
        self.identity
    }

    /// Handles a text-changed event from the editor.
    pub fn on_text_changed(&mut self, text: &str) -> SyncReport {
        if self.state != SyncState::Idle {
            warn!(state:? = self.state; "Dropping text change during an update");
            return SyncReport::ignored();
        }
        if self.echo.take().is_some_and(|echo| echo == text) {
            debug!("Suppressing echo of regenerated text");
            return SyncReport::ignored();
        }

        self.state = SyncState::ApplyingFromText;
        self.text = text.to_string();
        let report = self.apply_text();
        self.state = SyncState::Idle;
        report
    }

    fn apply_text(&mut self) -> SyncReport {
        info!(bytes = self.text.len(); "Applying text change");

        let document = match (self.parser)(&self.text) {
            Ok(document) => document,
            Err(err) => {
                error!(err:%, line = err.line(); "Failed to parse text, keeping previous graph");
                return SyncReport::new(
                    Some(SyncOrigin::FromText),
                    vec![Effect::ParseFailed {
                        line: err.line(),
                        message: err.to_string(),
                    }],
                );
            }
        };

        let mut graph = RenderGraph::from_document(&document, self.config.style());
        let identity = graph.identity();
        let mut effects = Vec::new();

        if identity == self.identity {
            debug!(identity:%; "Graph identity unchanged, keeping positions");
            graph.inherit_geometry(&self.graph);
        } else {
            let positions = grid::layout(&graph.layout_nodes(), self.config.layout().grid());
            graph.apply_positions(&positions);
            if self.config.layout().engine() == LayoutEngine::Hierarchical {
                effects.push(Effect::LayoutRequested(identity));
            }
        }
        effects.insert(0, Effect::GraphReplaced(identity));

        self.graph = graph;
        self.identity = identity;
        self.source_map = document.source_map().clone();
        self.last_origin = Some(SyncOrigin::FromText);
        SyncReport::new(Some(SyncOrigin::FromText), effects)
    }

    /// Handles an event from the rendering surface.
    ///
    /// Events tagged [`SyncOrigin::FromText`] are notifications caused by a
    /// text-driven replacement. Of those only size measurements are applied,
    /// and they never touch the text.
    pub fn on_diagram_event(&mut self, event: DiagramEvent, origin: SyncOrigin) -> SyncReport {
        if self.state != SyncState::Idle {
            warn!(state:? = self.state; "Dropping diagram event during an update");
            return SyncReport::ignored();
        }

        match event {
            DiagramEvent::SelectNode(id) => {
                return self.focus_entity(EntityRef::new(EntityKind::Node, id));
            }
            DiagramEvent::SelectEdge(id) => {
                return self.focus_entity(EntityRef::new(EntityKind::Edge, id));
            }
            DiagramEvent::Measured { id, size, handles } if origin == SyncOrigin::FromText => {
                if self.graph.measure_node(id, size, handles) {
                    return SyncReport::new(Some(SyncOrigin::FromText), vec![Effect::GraphPatched]);
                }
                return SyncReport::ignored();
            }
            _ if origin == SyncOrigin::FromText => {
                trace!(event:?; "Ignoring surface notification caused by text update");
                return SyncReport::ignored();
            }
            _ => {}
        }

        self.state = SyncState::ApplyingFromDiagram;
        let effects = self.apply_diagram_event(event);
        self.state = SyncState::Idle;

        if effects.is_empty() {
            return SyncReport::ignored();
        }
        self.identity = self.graph.identity();
        self.last_origin = Some(SyncOrigin::FromDiagram);
        SyncReport::new(Some(SyncOrigin::FromDiagram), effects)
    }

    fn apply_diagram_event(&mut self, event: DiagramEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            DiagramEvent::MoveNode { id, position } => {
                if self.graph.move_node(id, position) {
                    effects.push(Effect::GraphPatched);
                } else {
                    debug!(node:% = id; "Ignoring move of unknown node");
                }
            }
            DiagramEvent::Connect { source, target } => {
                let (Some(source_node), Some(target_node)) =
                    (self.graph.node(source), self.graph.node(target))
                else {
                    debug!(source:%, target:%; "Ignoring connection to unknown node");
                    return effects;
                };
                let statement = format!("{} > {}", source_node.label(), target_node.label());

                let graph = &self.graph;
                let id = self.ids.next_edge(source, target, |id| graph.contains(id));
                let edge = RenderEdge::new(id, source, target, EdgeKind::Arrow, Origin::Diagram);
                if self.graph.insert_edge(edge) {
                    info!(edge:% = id; "Connected nodes on the diagram");
                    effects.push(Effect::GraphPatched);
                    effects.extend(self.regenerate(&statement));
                }
            }
            DiagramEvent::Reconnect {
                edge,
                source,
                target,
            } => {
                if self.graph.reconnect_edge(edge, source, target) {
                    effects.push(Effect::GraphPatched);
                } else {
                    debug!(edge:%; "Ignoring invalid reconnection");
                }
            }
            DiagramEvent::AddNode { position } => {
                let graph = &self.graph;
                let (id, n) = self.ids.next_numbered("node", |id| graph.contains(id));
                let label = format!("Asset {n}");
                let size = measure::node_size(
                    &label,
                    false,
                    false,
                    self.graph.style().typeface,
                    self.config.style(),
                );
                let node = RenderNode::new(id, NodeKind::Default, label.as_str(), Origin::Diagram)
                    .with_color(DIAGRAM_NODE_COLOR)
                    .with_position(position)
                    .with_size(size);
                self.graph.insert_node(node);
                info!(node:% = id; "Added node on the diagram");
                effects.push(Effect::GraphPatched);
                effects.extend(self.regenerate(&label));
            }
            DiagramEvent::AddGroup { position } => {
                let graph = &self.graph;
                let (id, n) = self.ids.next_numbered("group", |id| graph.contains(id));
                let label = format!("Group {n}");
                let node = RenderNode::new(id, NodeKind::Group, label.as_str(), Origin::Diagram)
                    .with_color(DIAGRAM_GROUP_COLOR)
                    .with_position(position)
                    .with_size(measure::GROUP_SIZE);
                self.graph.insert_node(node);
                info!(node:% = id; "Added group on the diagram");
                effects.push(Effect::GraphPatched);
                effects.extend(self.regenerate(&format!("{label} [type: group]")));
            }
            DiagramEvent::Measured { id, size, handles } => {
                if self.graph.measure_node(id, size, handles) {
                    effects.push(Effect::GraphPatched);
                }
            }
            DiagramEvent::SelectNode(_) | DiagramEvent::SelectEdge(_) => {}
        }
        effects
    }

    /// Appends `statement` to the text if regeneration is enabled.
    fn regenerate(&mut self, statement: &str) -> Option<Effect> {
        if !self.config.sync().regenerate_text() {
            return None;
        }

        let mut text = self.text.clone();
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(statement);
        debug!(statement; "Regenerated text from diagram edit");

        self.text.clone_from(&text);
        self.echo = Some(text.clone());
        Some(Effect::TextRegenerated(text))
    }

    /// Highlights the line that produced an entity.
    fn focus_entity(&self, entity: EntityRef) -> SyncReport {
        match self.source_map.resolve_line(entity) {
            Some(line) => SyncReport::new(None, vec![Effect::HighlightLine(line)]),
            None => {
                trace!(entity:%; "Selected entity has no source line");
                SyncReport::ignored()
            }
        }
    }

    /// Handles the editor cursor moving onto `line`.
    pub fn on_cursor_line(&self, line: usize) -> SyncReport {
        match self.source_map.resolve_entity_for_line(line) {
            Some(entity) => SyncReport::new(None, vec![Effect::FocusEntity(entity)]),
            None => SyncReport::ignored(),
        }
    }

    /// Source line of an entity, [`SYNTHETIC_LINE`] for diagram-created or
    /// unmapped entities.
    pub fn line_for_entity(&self, id: Id) -> isize {
        let diagram_created = self
            .graph
            .node(id)
            .map(RenderNode::origin)
            .or_else(|| self.graph.edge(id).map(RenderEdge::origin))
            == Some(Origin::Diagram);
        if diagram_created {
            return SYNTHETIC_LINE;
        }
        self.source_map
            .resolve_line_for_entity(id)
            .and_then(|line| isize::try_from(line).ok())
            .unwrap_or(SYNTHETIC_LINE)
    }

    /// Starts a layout of the current graph.
    ///
    /// Any job handed out earlier becomes stale.
    pub fn request_layout(&mut self) -> LayoutJob {
        self.generation += 1;
        let ticket = LayoutTicket {
            identity: self.identity,
            generation: self.generation,
        };
        info!(identity:% = ticket.identity, generation = ticket.generation; "Layout requested");
        LayoutJob {
            ticket,
            request: LayoutRequest::from_graph(&self.graph, self.config.layout().hierarchical()),
        }
    }

    /// Applies the result of a layout job if it is still current.
    pub fn complete_layout(
        &mut self,
        ticket: LayoutTicket,
        result: Result<HashMap<Id, Point>, LayoutServiceError>,
    ) -> LayoutOutcome {
        if ticket.identity != self.identity || ticket.generation != self.generation {
            warn!(
                ticket:% = ticket.identity,
                current:% = self.identity,
                generation = ticket.generation;
                "Discarding stale layout result"
            );
            return LayoutOutcome::Stale;
        }

        match result {
            Ok(placed) => {
                let positions = hierarchical::merge(self.graph.positions(), Ok(placed));
                self.graph.apply_positions(&positions);
                info!(nodes = positions.len(); "Layout applied");
                LayoutOutcome::Applied
            }
            Err(err) => {
                warn!(err:%; "Layout failed, keeping positions");
                LayoutOutcome::Failed(err)
            }
        }
    }

    /// Requests, runs and completes a layout in one go.
    pub fn run_layout(&mut self, service: &dyn LayoutService) -> LayoutOutcome {
        let job = self.request_layout();
        let result = job.run(service);
        self.complete_layout(job.ticket(), result)
    }
}

#[cfg(test)]
mod tests {
    use tandem_core::{
        geometry::{Side, Size},
        source_map::EntityKind,
    };
    use tandem_parser::ParseError;

    use super::*;
    use crate::surface::{Handle, HandleKind};

    fn controller() -> SyncController {
        SyncController::new(AppConfig::default())
    }

    fn regenerating() -> SyncController {
        let mut config = AppConfig::default();
        config.set_regenerate_text(true);
        SyncController::new(config)
    }

    fn position(controller: &SyncController, name: &str) -> Point {
        controller.graph().node(Id::new(name)).unwrap().position()
    }

    struct FixedService(HashMap<Id, Point>);

    impl LayoutService for FixedService {
        fn layout(&self, _: &LayoutRequest) -> Result<HashMap<Id, Point>, LayoutServiceError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_text_change_builds_graph() {
        let mut sync = controller();
        let report = sync.on_text_changed("Client > Server: API Call\nServer > Database: Query");

        assert_eq!(report.origin(), Some(SyncOrigin::FromText));
        assert!(report.contains(|e| matches!(e, Effect::GraphReplaced(_))));
        assert_eq!(sync.state(), SyncState::Idle);
        assert_eq!(sync.last_origin(), Some(SyncOrigin::FromText));
        assert_eq!(sync.graph().node_count(), 3);
        assert_eq!(sync.graph().edge_count(), 2);
        assert_eq!(sync.graph().routes().count(), 2);
        assert_ne!(position(&sync, "Client"), position(&sync, "Server"));
    }

    #[test]
    fn test_same_identity_keeps_positions() {
        let mut sync = controller();
        sync.on_text_changed("A > B");
        let moved = Point::new(420.0, 42.0);
        sync.on_diagram_event(
            DiagramEvent::MoveNode {
                id: Id::new("A"),
                position: moved,
            },
            SyncOrigin::FromDiagram,
        );

        let report = sync.on_text_changed("A > B: renamed");
        assert!(!report.contains(|e| matches!(e, Effect::LayoutRequested(_))));
        assert_eq!(position(&sync, "A"), moved);
        assert_eq!(
            sync.graph().edge(Id::new("edge_A_B_0")).unwrap().label(),
            Some("renamed")
        );
    }

    #[test]
    fn test_identity_change_requests_layout() {
        let mut config = AppConfig::default();
        config.set_layout_engine(LayoutEngine::Hierarchical);
        let mut sync = SyncController::new(config);

        let report = sync.on_text_changed("A > B");
        assert!(report.contains(|e| matches!(e, Effect::LayoutRequested(_))));

        let report = sync.on_text_changed("A > B\n// note");
        assert!(!report.contains(|e| matches!(e, Effect::LayoutRequested(_))));
    }

    #[test]
    fn test_parse_failure_keeps_previous_graph() {
        fn failing(_: &str) -> tandem_parser::Result<Document> {
            Err(ParseError::DanglingEdge {
                line: 1,
                edge: Id::new("edge_A_Z_1"),
                endpoint: Id::new("Z"),
            })
        }

        let mut sync = controller();
        sync.on_text_changed("A > B");
        let before = sync.graph().clone();

        sync.parser = failing;
        let report = sync.on_text_changed("A > B\nA > Z");

        assert!(report.contains(|e| matches!(e, Effect::ParseFailed { line: 1, .. })));
        assert_eq!(sync.graph(), &before);
        assert_eq!(sync.source_map().len(), 1);
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[test]
    fn test_add_node_and_group_defaults() {
        let mut sync = controller();
        sync.on_text_changed("node_1");

        let report = sync.on_diagram_event(
            DiagramEvent::AddNode {
                position: Point::new(10.0, 10.0),
            },
            SyncOrigin::FromDiagram,
        );
        assert_eq!(report.origin(), Some(SyncOrigin::FromDiagram));
        assert_eq!(sync.last_origin(), Some(SyncOrigin::FromDiagram));

        // node_1 is declared in the text, so the counter moves on.
        let node = sync.graph().node(Id::new("node_2")).unwrap();
        assert_eq!(node.label(), "Asset 2");
        assert_eq!(node.color(), Some("blue"));
        assert_eq!(node.origin(), Origin::Diagram);
        assert_eq!(sync.line_for_entity(node.id()), SYNTHETIC_LINE);

        sync.on_diagram_event(
            DiagramEvent::AddGroup {
                position: Point::new(400.0, 10.0),
            },
            SyncOrigin::FromDiagram,
        );
        let group = sync.graph().node(Id::new("group_3")).unwrap();
        assert_eq!(group.label(), "Group 3");
        assert_eq!(group.color(), Some("gray"));
        assert!(group.is_group());

        // Without regeneration the text is untouched.
        assert_eq!(sync.text(), "node_1");
    }

    #[test]
    fn test_connect_creates_diagram_edge() {
        let mut sync = regenerating();
        sync.on_text_changed("Web\nApi");

        let report = sync.on_diagram_event(
            DiagramEvent::Connect {
                source: Id::new("Web"),
                target: Id::new("Api"),
            },
            SyncOrigin::FromDiagram,
        );

        let edge = sync.graph().edge(Id::new("Web-Api-1")).unwrap();
        assert_eq!(edge.origin(), Origin::Diagram);
        assert_eq!(edge.kind(), EdgeKind::Arrow);
        assert!(report.contains(|e| *e == Effect::TextRegenerated("Web\nApi\nWeb > Api".to_string())));
        assert!(sync.graph().route(edge.id()).is_some());
    }

    #[test]
    fn test_connect_unknown_node_is_ignored() {
        let mut sync = controller();
        sync.on_text_changed("Web");
        let report = sync.on_diagram_event(
            DiagramEvent::Connect {
                source: Id::new("Web"),
                target: Id::new("Nowhere"),
            },
            SyncOrigin::FromDiagram,
        );

        assert!(report.is_empty());
        assert_eq!(sync.last_origin(), Some(SyncOrigin::FromText));
    }

    #[test]
    fn test_no_feedback_loop() {
        let mut sync = regenerating();
        sync.on_text_changed("Gateway");

        let report = sync.on_diagram_event(
            DiagramEvent::AddNode {
                position: Point::new(300.0, 50.0),
            },
            SyncOrigin::FromDiagram,
        );
        let regenerated = report
            .effects()
            .iter()
            .find_map(|e| match e {
                Effect::TextRegenerated(text) => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(regenerated, "Gateway\nAsset 1");

        // The editor echoes the regenerated text back.
        let echo = sync.on_text_changed(&regenerated);
        assert!(echo.is_empty());
        assert_eq!(sync.graph().node_count(), 2);
        assert!(sync.graph().node(Id::new("node_1")).is_some());
        assert!(sync.graph().node(Id::new("Asset 1")).is_none());
        assert_eq!(sync.last_origin(), Some(SyncOrigin::FromDiagram));

        // A real edit afterwards re-parses, and the asset exists once.
        sync.on_text_changed("Gateway\nAsset 1\nGateway > Asset 1");
        assert_eq!(sync.graph().node_count(), 2);
        assert!(sync.graph().node(Id::new("Asset 1")).is_some());
    }

    #[test]
    fn test_echo_guard_only_matches_exact_text() {
        let mut sync = regenerating();
        sync.on_text_changed("A");
        sync.on_diagram_event(
            DiagramEvent::AddNode {
                position: Point::new(0.0, 0.0),
            },
            SyncOrigin::FromDiagram,
        );

        let report = sync.on_text_changed("A\nAsset 1\nB");
        assert!(report.contains(|e| matches!(e, Effect::GraphReplaced(_))));
        assert_eq!(sync.graph().node_count(), 3);
    }

    #[test]
    fn test_text_tagged_notifications() {
        let mut sync = controller();
        sync.on_text_changed("A > B");
        let before = position(&sync, "A");

        let report = sync.on_diagram_event(
            DiagramEvent::MoveNode {
                id: Id::new("A"),
                position: Point::new(999.0, 999.0),
            },
            SyncOrigin::FromText,
        );
        assert!(report.is_empty());
        assert_eq!(position(&sync, "A"), before);

        let handle = Handle::new(
            Side::Right,
            HandleKind::Source,
            tandem_core::geometry::Bounds::new_from_top_left(
                Point::new(170.0, 20.0),
                Size::new(10.0, 10.0),
            ),
        );
        let report = sync.on_diagram_event(
            DiagramEvent::Measured {
                id: Id::new("A"),
                size: Size::new(180.0, 60.0),
                handles: vec![handle],
            },
            SyncOrigin::FromText,
        );
        assert_eq!(report.origin(), Some(SyncOrigin::FromText));
        assert_eq!(
            sync.graph().node(Id::new("A")).unwrap().size(),
            Size::new(180.0, 60.0)
        );
        assert_eq!(sync.last_origin(), Some(SyncOrigin::FromText));
    }

    #[test]
    fn test_focus_queries() {
        let mut sync = controller();
        sync.on_text_changed("// header\nApi [icon: server]\nApi > Db");

        let report = sync.on_diagram_event(DiagramEvent::SelectNode(Id::new("Api")), SyncOrigin::FromDiagram);
        assert_eq!(report.effects(), &[Effect::HighlightLine(1)]);
        assert_eq!(report.origin(), None);
        assert_eq!(sync.last_origin(), Some(SyncOrigin::FromText));

        let report = sync.on_diagram_event(
            DiagramEvent::SelectEdge(Id::new("edge_Api_Db_2")),
            SyncOrigin::FromDiagram,
        );
        assert_eq!(report.effects(), &[Effect::HighlightLine(2)]);

        // Db was only created implicitly by the edge line.
        assert!(sync
            .on_diagram_event(DiagramEvent::SelectNode(Id::new("Db")), SyncOrigin::FromDiagram)
            .is_empty());

        let report = sync.on_cursor_line(1);
        assert!(report.contains(|e| matches!(
            e,
            Effect::FocusEntity(entity) if entity.kind() == EntityKind::Node && entity.id() == "Api"
        )));
        assert!(sync.on_cursor_line(0).is_empty());
        assert_eq!(sync.line_for_entity(Id::new("Api")), 1);
    }

    #[test]
    fn test_select_edge_when_a_node_is_named_like_it() {
        let mut sync = controller();
        sync.on_text_changed("edge_A_B_1\nA > B");

        let edge = sync.graph().edges().next().unwrap().id();
        assert_ne!(edge, "edge_A_B_1");

        let report = sync.on_diagram_event(DiagramEvent::SelectEdge(edge), SyncOrigin::FromDiagram);
        assert_eq!(report.effects(), &[Effect::HighlightLine(1)]);

        let report = sync.on_diagram_event(
            DiagramEvent::SelectNode(Id::new("edge_A_B_1")),
            SyncOrigin::FromDiagram,
        );
        assert_eq!(report.effects(), &[Effect::HighlightLine(0)]);

        // A node id is never an edge.
        assert!(sync
            .on_diagram_event(
                DiagramEvent::SelectEdge(Id::new("edge_A_B_1")),
                SyncOrigin::FromDiagram
            )
            .is_empty());
        assert_eq!(sync.line_for_entity(edge), 1);
    }

    #[test]
    fn test_layout_applied() {
        let mut sync = controller();
        sync.on_text_changed("A > B");

        let service = FixedService(HashMap::from([(Id::new("A"), Point::new(5.0, 500.0))]));
        assert_eq!(sync.run_layout(&service), LayoutOutcome::Applied);
        assert_eq!(position(&sync, "A"), Point::new(5.0, 500.0));
    }

    #[test]
    fn test_stale_layout_discarded() {
        let mut sync = controller();
        sync.on_text_changed("A > B");
        let job = sync.request_layout();

        sync.on_text_changed("A > B\nB > C");
        let before = sync.graph().positions();
        let result = job.run(&FixedService(HashMap::from([(Id::new("A"), Point::new(1.0, 1.0))])));

        assert_eq!(sync.complete_layout(job.ticket(), result), LayoutOutcome::Stale);
        assert_eq!(sync.graph().positions(), before);
    }

    #[test]
    fn test_superseded_request_is_stale() {
        let mut sync = controller();
        sync.on_text_changed("A > B");
        let first = sync.request_layout();
        let second = sync.request_layout();

        assert_eq!(
            sync.complete_layout(first.ticket(), Ok(HashMap::new())),
            LayoutOutcome::Stale
        );
        assert_eq!(
            sync.complete_layout(second.ticket(), Ok(HashMap::new())),
            LayoutOutcome::Applied
        );
    }

    #[test]
    fn test_failed_layout_keeps_positions() {
        let mut sync = controller();
        sync.on_text_changed("A > B");
        let before = sync.graph().positions();
        let job = sync.request_layout();

        let outcome = sync.complete_layout(
            job.ticket(),
            Err(LayoutServiceError::Unavailable("down".to_string())),
        );
        assert!(matches!(outcome, LayoutOutcome::Failed(_)));
        assert_eq!(sync.graph().positions(), before);
    }

    #[test]
    fn test_id_generator_is_monotonic() {
        let mut ids = IdGenerator::default();
        let (first, _) = ids.next_numbered("node", |_| false);
        let (second, n) = ids.next_numbered("node", |id| id == "node_3");

        assert_eq!(first, "node_1");
        assert_eq!(second, "node_2");
        assert_eq!(n, 2);
        let edge = ids.next_edge(Id::new("A"), Id::new("B"), |id| id == "A-B-3");
        assert_eq!(edge, "A-B-4");
    }
}
