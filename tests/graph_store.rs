use chunkgraph::storage::{
    AdjState, Dir, Edge, GraphStore, Narrow, NarrowGraphStore, NodeId, OffsetWidth, Wide,
    WideGraphStore,
};
use chunkgraph::StoreError;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Plain nested-vector model the packed store is checked against.
#[derive(Default)]
struct Model {
    out: Vec<Vec<Edge>>,
    inbound: Vec<Vec<Edge>>,
}

impl Model {
    fn ensure(&mut self, id: NodeId) {
        let len = id.0 as usize + 1;
        if self.out.len() < len {
            self.out.resize(len, Vec::new());
            self.inbound.resize(len, Vec::new());
        }
    }

    fn add(&mut self, from: NodeId, to: NodeId, tag: u32) {
        self.ensure(from);
        self.ensure(to);
        self.out[from.0 as usize].push(Edge::new(tag, to));
        self.inbound[to.0 as usize].push(Edge::new(tag, from));
    }
}

fn assert_matches_model<W: OffsetWidth>(graph: &GraphStore<W>, model: &Model) {
    assert_eq!(graph.node_count(), model.out.len());
    for id in graph.nodes() {
        for (dir, expected) in [
            (Dir::Out, &model.out[id.0 as usize]),
            (Dir::In, &model.inbound[id.0 as usize]),
        ] {
            assert_eq!(graph.degree(id, dir).unwrap() as usize, expected.len());
            let walked: Vec<Edge> = graph.edges(id, dir).unwrap().collect();
            assert_eq!(&walked, expected, "node {id} {dir:?}");
            for (k, edge) in expected.iter().enumerate() {
                assert_eq!(graph.edge(id, dir, k as u32).unwrap(), *edge);
            }
        }
    }
}

fn random_stream<W: OffsetWidth>(seed: u64, nodes: u32, edges: usize) -> (GraphStore<W>, Model) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut graph = GraphStore::<W>::new();
    let mut model = Model::default();
    for _ in 0..edges {
        let from = format!("node-{}", rng.gen_range(0..nodes));
        let to = format!("node-{}", rng.gen_range(0..nodes));
        let tag = rng.gen::<u32>();
        let (f, t) = graph.add_edge(&from, &to, tag).unwrap();
        model.add(f, t, tag);
    }
    (graph, model)
}

#[test]
fn streaming_matches_model_narrow() {
    let (graph, model) = random_stream::<Narrow>(0xDEADBEEF, 64, 2_000);
    assert_matches_model(&graph, &model);
    assert_eq!(graph.edge_count(), 2_000);
}

#[test]
fn streaming_matches_model_wide() {
    let (graph, model) = random_stream::<Wide>(7, 16, 500);
    assert_matches_model(&graph, &model);
}

#[test]
fn bulk_and_streaming_produce_same_queries() {
    let (streamed, model) = random_stream::<Wide>(42, 32, 400);

    let mut bulk = WideGraphStore::new();
    let keys: Vec<String> = {
        let mut by_id = vec![String::new(); streamed.node_count()];
        for (key, id) in streamed.keys() {
            by_id[id.0 as usize] = key.to_owned();
        }
        by_id
    };
    for key in &keys {
        bulk.intern_id(key).unwrap();
    }
    for id in bulk.nodes().collect::<Vec<_>>() {
        bulk.set_out_edges(id, &model.out[id.0 as usize]).unwrap();
        bulk.set_in_edges(id, &model.inbound[id.0 as usize]).unwrap();
    }
    assert_matches_model(&bulk, &model);
    assert_eq!(bulk.edge_count(), streamed.edge_count());
    // same blocks, different interleaving
    assert_eq!(
        bulk.chunk_store(Dir::Out).write_cursor(),
        streamed.chunk_store(Dir::Out).write_cursor()
    );
}

#[test]
fn unseen_keys_get_ids_in_first_seen_order() {
    let mut graph = NarrowGraphStore::new();
    graph.add_edge("uri1", "uri2", 1).unwrap();
    graph.add_edge("uri1", "uri3", 2).unwrap();
    graph.add_edge("uri1", "uri4", 3).unwrap();
    graph.add_edge("uri1", "uri5", 4).unwrap();
    graph.add_edge("uri4", "uri1", 5).unwrap();
    graph.add_edge("uri4", "uri6", 6).unwrap();
    graph.add_edge("uri8", "uri9", 7).unwrap();
    let id = |k: &str| graph.lookup_id(k).unwrap();
    assert_eq!(graph.node_count(), 8);
    assert_eq!(id("uri8"), NodeId(6));
    assert_eq!(graph.out_degree(id("uri1")).unwrap(), 4);
    assert_eq!(graph.in_edge(id("uri9"), 0).unwrap(), Edge::new(7, id("uri8")));
    assert_eq!(graph.lookup_id("uri7"), None);
    assert_eq!(graph.adj_state(id("uri9"), Dir::Out).unwrap(), AdjState::Unset);
}

#[test]
fn large_tags_and_ids_are_not_truncated() {
    let mut graph = WideGraphStore::new();
    for i in 0..70_000u32 {
        graph.intern_id(&format!("n{i}")).unwrap();
    }
    graph
        .add_edge_between(NodeId(69_999), NodeId(65_536), u32::MAX)
        .unwrap();
    assert_eq!(
        graph.out_edge(NodeId(69_999), 0).unwrap(),
        Edge::new(u32::MAX, NodeId(65_536))
    );
    assert_eq!(
        graph.in_edge(NodeId(65_536), 0).unwrap(),
        Edge::new(u32::MAX, NodeId(69_999))
    );
}

#[test]
fn concurrent_readers_see_the_same_graph() {
    let (graph, model) = random_stream::<Wide>(99, 20, 300);
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| assert_matches_model(&graph, &model));
        }
    });
}

#[test]
fn errors_render_readably() {
    let mut graph = NarrowGraphStore::new();
    let a = graph.intern_id("a").unwrap();
    let err = graph.set_edges_columns(a, Dir::In, &[1], &[]).unwrap_err();
    assert!(matches!(err, StoreError::CorruptState(_)));
    assert_eq!(err.to_string(), "corrupt state: node 0: 1 tags but 0 neighbours");
    let err = graph.in_degree(NodeId(3)).unwrap_err();
    assert_eq!(err.to_string(), "unknown node id 3");
}

proptest! {
    #[test]
    fn intern_assigns_first_seen_order(keys in prop::collection::vec("[a-f]{1,3}", 1..60)) {
        let mut graph = NarrowGraphStore::new();
        let mut seen: Vec<String> = Vec::new();
        for key in &keys {
            let id = graph.intern_id(key).unwrap();
            match seen.iter().position(|k| k == key) {
                Some(pos) => prop_assert_eq!(id, NodeId(pos as u32)),
                None => {
                    prop_assert_eq!(id, NodeId(seen.len() as u32));
                    seen.push(key.clone());
                }
            }
            prop_assert_eq!(graph.node_count(), seen.len());
        }
        let ordered: Vec<&str> = graph.keys().map(|(k, _)| k).collect();
        let mut expected: Vec<&str> = seen.iter().map(String::as_str).collect();
        expected.sort_unstable();
        prop_assert_eq!(ordered, expected);
    }

    #[test]
    fn add_edge_grows_degrees_by_one(
        edges in prop::collection::vec((0u8..10, 0u8..10, any::<u32>()), 1..80)
    ) {
        let mut graph = NarrowGraphStore::new();
        for (from, to, tag) in edges {
            let (from, to) = (format!("k{from}"), format!("k{to}"));
            let out_before = graph
                .lookup_id(&from)
                .map_or(0, |id| graph.out_degree(id).unwrap());
            let in_before = graph
                .lookup_id(&to)
                .map_or(0, |id| graph.in_degree(id).unwrap());
            let (f, t) = graph.add_edge(&from, &to, tag).unwrap();
            let out_after = graph.out_degree(f).unwrap();
            let in_after = graph.in_degree(t).unwrap();
            prop_assert_eq!(out_after, out_before + 1);
            prop_assert_eq!(in_after, in_before + 1);
            prop_assert_eq!(graph.out_edge(f, out_after - 1).unwrap(), Edge::new(tag, t));
            prop_assert_eq!(graph.in_edge(t, in_after - 1).unwrap(), Edge::new(tag, f));
            prop_assert!(graph.has_edge(f, t, Dir::Out).unwrap());
            prop_assert!(graph.has_edge(t, f, Dir::In).unwrap());
        }
    }

    #[test]
    fn sorted_bulk_is_ascending_and_stable(
        raw in prop::collection::vec((0u32..8, any::<u32>()), 1..40)
    ) {
        let mut graph = WideGraphStore::new();
        for i in 0..8 {
            graph.intern_id(&format!("n{i}")).unwrap();
        }
        let edges: Vec<Edge> = raw.iter().map(|(n, tag)| Edge::new(*tag, NodeId(*n))).collect();
        graph.set_out_edges_sorted(NodeId(0), &edges).unwrap();
        let stored: Vec<Edge> = graph.edges(NodeId(0), Dir::Out).unwrap().collect();
        let mut expected = edges.clone();
        expected.sort_by_key(|e| e.neighbor);
        prop_assert_eq!(stored, expected);
    }
}
