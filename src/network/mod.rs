//! The node store: vertices, directed edges, and reverse-edge pairing for the
//! water-distribution flow graph.
//!
//! Vertices and edges live in flat arenas addressed by stable, `Copy` indices
//! ([`VertexIndex`], [`EdgeIndex`]) rather than by pointer, so a [`Network`]
//! can be cloned wholesale (see [`Network::deep_copy`]) without having to
//! patch up any internal references: the indices of a clone mean exactly what
//! they meant in the original.

use std::collections::HashMap;

/// A stable reference to a vertex in a [`Network`]'s arena.
///
/// Indices are only meaningful relative to the `Network` that produced them;
/// mixing indices from two different networks (even a network and its own
/// [`Network::deep_copy`]) is a logic error the type system does not catch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexIndex(usize);

/// A stable reference to an edge in a [`Network`]'s arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIndex(usize);

/// The role a vertex plays in the network.
///
/// Reservoirs and cities carry the capacity bounds that, on a solve, get
/// folded into the super-source/super-target edges (§4.3); pumping stations
/// are pure transit. `SuperSource`/`SuperTarget` mark the two synthetic
/// vertices created lazily by the first [`crate::flow::maxflow`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VertexKind {
    /// A source with a capped external supply.
    Reservoir {
        /// Maximum water the reservoir can deliver per solve.
        max_delivery: f64,
    },
    /// A transit-only vertex: no external supply or demand.
    PumpingStation,
    /// A sink with a stated demand.
    City {
        /// The demand the city wants satisfied.
        demand: f64,
    },
    /// Synthetic vertex feeding every reservoir; exists only once a solve has run.
    SuperSource,
    /// Synthetic vertex drained by every city; exists only once a solve has run.
    SuperTarget,
}

impl VertexKind {
    /// True for [`VertexKind::SuperSource`] and [`VertexKind::SuperTarget`].
    #[must_use]
    pub fn is_super(&self) -> bool {
        matches!(self, VertexKind::SuperSource | VertexKind::SuperTarget)
    }
}

/// A vertex: its identity, role, derived flow, and BFS scratch fields.
#[derive(Clone, Debug)]
pub struct Vertex {
    code: String,
    kind: VertexKind,
    flow: f64,
    outgoing: Vec<EdgeIndex>,
    incoming: Vec<EdgeIndex>,
    // Scratch fields used by the BFS/augment kernel (§4.2). Reset at the
    // start of every search; meaningless outside one.
    visited: bool,
    path_edge: Option<EdgeIndex>,
}

impl Vertex {
    fn new(code: String, kind: VertexKind) -> Self {
        Vertex {
            code,
            kind,
            flow: 0.0,
            outgoing: Vec::new(),
            incoming: Vec::new(),
            visited: false,
            path_edge: None,
        }
    }

    /// The vertex's unique code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The vertex's kind.
    #[must_use]
    pub fn kind(&self) -> &VertexKind {
        &self.kind
    }

    /// The derived post-solve throughput (§3): Σ incoming flow when any
    /// incoming edge exists, else Σ outgoing flow.
    #[must_use]
    pub fn flow(&self) -> f64 {
        self.flow
    }

    /// Outgoing edge indices, in insertion order.
    #[must_use]
    pub fn outgoing(&self) -> &[EdgeIndex] {
        &self.outgoing
    }

    /// Incoming edge indices, in insertion order.
    #[must_use]
    pub fn incoming(&self) -> &[EdgeIndex] {
        &self.incoming
    }
}

/// A directed edge between two vertices, with its capacity, current flow, and
/// an optional reverse pairing for bidirectional pipes.
#[derive(Clone, Debug)]
pub struct Edge {
    origin: VertexIndex,
    destination: VertexIndex,
    capacity: f64,
    flow: f64,
    reverse: Option<EdgeIndex>,
}

impl Edge {
    /// The edge's origin vertex.
    #[must_use]
    pub fn origin(&self) -> VertexIndex {
        self.origin
    }

    /// The edge's destination vertex.
    #[must_use]
    pub fn destination(&self) -> VertexIndex {
        self.destination
    }

    /// The edge's capacity. Always non-negative.
    #[must_use]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// The edge's current flow.
    #[must_use]
    pub fn flow(&self) -> f64 {
        self.flow
    }

    /// The paired reverse edge, for bidirectional pipes.
    #[must_use]
    pub fn reverse(&self) -> Option<EdgeIndex> {
        self.reverse
    }

    /// Absolute slack: `capacity - flow`.
    #[must_use]
    pub fn absolute_slack(&self) -> f64 {
        self.capacity - self.flow
    }

    /// Relative slack: `(capacity - flow) / capacity`. The caller must ensure
    /// `capacity > 0` (the metrics calculator skips zero-capacity edges; see
    /// §4.4 and §7).
    #[must_use]
    pub fn relative_slack(&self) -> f64 {
        self.absolute_slack() / self.capacity
    }

    /// Add `delta` (possibly negative) to this edge's flow.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the result leaves `flow` outside
    /// `[0, capacity]` by more than a small tolerance — every caller is
    /// expected to compute `delta` from an honest residual (§4.2, §4.6).
    pub(crate) fn add_flow(&mut self, delta: f64) {
        self.flow += delta;
        debug_assert!(
            self.flow >= -1e-6 && self.flow <= self.capacity + 1e-6,
            "edge flow escaped capacity bounds: flow={} capacity={}",
            self.flow,
            self.capacity
        );
        if self.flow < 0.0 {
            self.flow = 0.0;
        }
    }

    pub(crate) fn set_flow(&mut self, flow: f64) {
        self.flow = flow;
    }
}

/// A keyed container of vertices and directed edges.
///
/// `Network` is the mutation surface for the whole crate: ingestion builds
/// one, [`crate::flow::maxflow`] attaches synthetic super-source/super-target
/// vertices to it and solves in place, and every "what-if" analysis first
/// takes a [`Network::deep_copy`] so the baseline is never disturbed.
#[derive(Clone, Debug, Default)]
pub struct Network {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    by_code: HashMap<String, VertexIndex>,
    super_source: Option<VertexIndex>,
    super_target: Option<VertexIndex>,
}

impl Network {
    /// Create an empty network.
    #[must_use]
    pub fn new() -> Self {
        Network::default()
    }

    /// Add a vertex with the given code and kind.
    ///
    /// Returns `false` (and adds nothing) if `code` is already in use.
    pub fn add_vertex(&mut self, code: impl Into<String>, kind: VertexKind) -> bool {
        let code = code.into();
        if self.by_code.contains_key(&code) {
            return false;
        }
        let index = VertexIndex(self.vertices.len());
        self.vertices.push(Vertex::new(code.clone(), kind));
        self.by_code.insert(code, index);
        true
    }

    /// Look up a vertex by its code. Amortised O(1).
    #[must_use]
    pub fn find_vertex(&self, code: &str) -> Option<VertexIndex> {
        self.by_code.get(code).copied()
    }

    /// Add a single directed edge `src -> dst`.
    ///
    /// Returns `false` if either endpoint does not exist.
    pub fn add_edge(&mut self, src: &str, dst: &str, capacity: f64, initial_flow: f64) -> bool {
        let (Some(s), Some(d)) = (self.find_vertex(src), self.find_vertex(dst)) else {
            return false;
        };
        self.push_edge(s, d, capacity, initial_flow);
        true
    }

    /// Add a bidirectional pipe: two directed edges, mutually reverse-paired.
    ///
    /// Returns `false` if either endpoint does not exist. The two edges are
    /// always paired as mutual reverses, regardless of capacity (§9) — but an
    /// unrelated anti-parallel edge added separately is never implicitly
    /// paired with anything.
    pub fn add_bidirectional(
        &mut self,
        src: &str,
        dst: &str,
        capacity: f64,
        fwd_flow: f64,
        rev_flow: f64,
    ) -> bool {
        let (Some(s), Some(d)) = (self.find_vertex(src), self.find_vertex(dst)) else {
            return false;
        };
        let fwd = self.push_edge(s, d, capacity, fwd_flow);
        let rev = self.push_edge(d, s, capacity, rev_flow);
        self.edges[fwd.0].reverse = Some(rev);
        self.edges[rev.0].reverse = Some(fwd);
        true
    }

    fn push_edge(
        &mut self,
        origin: VertexIndex,
        destination: VertexIndex,
        capacity: f64,
        flow: f64,
    ) -> EdgeIndex {
        let index = EdgeIndex(self.edges.len());
        self.edges.push(Edge {
            origin,
            destination,
            capacity,
            flow,
            reverse: None,
        });
        self.vertices[origin.0].outgoing.push(index);
        self.vertices[destination.0].incoming.push(index);
        index
    }

    /// Produce an independent copy whose flows can be mutated without
    /// affecting `self` (§4.7). Since the arena holds owned data addressed by
    /// position, this is a structural clone: indices keep their meaning.
    #[must_use]
    pub fn deep_copy(&self) -> Network {
        self.clone()
    }

    /// Number of vertices, including any super-source/super-target.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges, including any edges incident to super vertices.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterate over all vertex indices in insertion order.
    pub fn vertex_indices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        (0..self.vertices.len()).map(VertexIndex)
    }

    /// Iterate over all edge indices in insertion order.
    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        (0..self.edges.len()).map(EdgeIndex)
    }

    /// Borrow a vertex by index.
    #[must_use]
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self.vertices[index.0]
    }

    /// Borrow an edge by index.
    #[must_use]
    pub fn edge(&self, index: EdgeIndex) -> &Edge {
        &self.edges[index.0]
    }

    pub(crate) fn vertex_mut(&mut self, index: VertexIndex) -> &mut Vertex {
        &mut self.vertices[index.0]
    }

    pub(crate) fn edge_mut(&mut self, index: EdgeIndex) -> &mut Edge {
        &mut self.edges[index.0]
    }

    /// Set every edge's flow and every vertex's derived flow to zero.
    pub fn reset_flows(&mut self) {
        for edge in &mut self.edges {
            edge.flow = 0.0;
        }
        for vertex in &mut self.vertices {
            vertex.flow = 0.0;
        }
    }

    /// Recompute every vertex's derived `flow` field (§3): Σ incoming flow
    /// when the vertex has any incoming edge, else Σ outgoing flow.
    pub fn refresh_vertex_flows(&mut self) {
        for i in 0..self.vertices.len() {
            let vertex = &self.vertices[i];
            let flow = if vertex.incoming.is_empty() {
                vertex
                    .outgoing
                    .iter()
                    .map(|&e| self.edges[e.0].flow)
                    .sum()
            } else {
                vertex
                    .incoming
                    .iter()
                    .map(|&e| self.edges[e.0].flow)
                    .sum()
            };
            self.vertices[i].flow = flow;
        }
    }

    pub(crate) fn reset_scratch(&mut self) {
        for vertex in &mut self.vertices {
            vertex.visited = false;
            vertex.path_edge = None;
        }
    }

    pub(crate) fn visited(&self, index: VertexIndex) -> bool {
        self.vertices[index.0].visited
    }

    pub(crate) fn set_visited(&mut self, index: VertexIndex, value: bool) {
        self.vertices[index.0].visited = value;
    }

    pub(crate) fn set_path_edge(&mut self, index: VertexIndex, edge: EdgeIndex) {
        self.vertices[index.0].path_edge = Some(edge);
    }

    pub(crate) fn path_edge(&self, index: VertexIndex) -> Option<EdgeIndex> {
        self.vertices[index.0].path_edge
    }

    /// The super-source vertex, if a solve has already created one.
    #[must_use]
    pub fn super_source(&self) -> Option<VertexIndex> {
        self.super_source
    }

    /// The super-target vertex, if a solve has already created one.
    #[must_use]
    pub fn super_target(&self) -> Option<VertexIndex> {
        self.super_target
    }

    /// Attach (or, on a later solve, reuse) the super-source and
    /// super-target vertices (§4.3, §9: created lazily, kept for the
    /// lifetime of the graph).
    ///
    /// Returns an error if the network has no reservoirs or no cities: the
    /// topology would be degenerate regardless of which pair of vertices
    /// ends up playing source and sink.
    pub fn ensure_super_vertices(&mut self) -> Result<(VertexIndex, VertexIndex), crate::error::Error> {
        if let (Some(s), Some(t)) = (self.super_source, self.super_target) {
            return Ok((s, t));
        }

        let reservoirs: Vec<(VertexIndex, f64)> = self
            .vertex_indices()
            .filter_map(|i| match self.vertex(i).kind() {
                VertexKind::Reservoir { max_delivery } => Some((i, *max_delivery)),
                _ => None,
            })
            .collect();
        let cities: Vec<(VertexIndex, f64)> = self
            .vertex_indices()
            .filter_map(|i| match self.vertex(i).kind() {
                VertexKind::City { demand } => Some((i, *demand)),
                _ => None,
            })
            .collect();

        if reservoirs.is_empty() {
            return Err(crate::error::Error::DegenerateTopology {
                reason: "network has no reservoirs".to_string(),
            });
        }
        if cities.is_empty() {
            return Err(crate::error::Error::DegenerateTopology {
                reason: "network has no cities".to_string(),
            });
        }

        self.add_vertex("\u{0}super-source", VertexKind::SuperSource);
        let source = self.find_vertex("\u{0}super-source").unwrap();
        self.add_vertex("\u{0}super-target", VertexKind::SuperTarget);
        let target = self.find_vertex("\u{0}super-target").unwrap();

        for (reservoir, max_delivery) in reservoirs {
            self.push_edge(source, reservoir, max_delivery, 0.0);
        }
        for (city, demand) in cities {
            self.push_edge(city, target, demand, 0.0);
        }

        self.super_source = Some(source);
        self.super_target = Some(target);
        Ok((source, target))
    }

    /// Edges whose origin is `a` and destination is `b`. Usually at most one
    /// (a network built from well-formed pipe records has no parallel
    /// edges), but ablation does not assume it.
    #[must_use]
    pub fn edges_between(&self, a: VertexIndex, b: VertexIndex) -> Vec<EdgeIndex> {
        self.vertices[a.0]
            .outgoing
            .iter()
            .copied()
            .filter(|&e| self.edges[e.0].destination == b)
            .collect()
    }
}
