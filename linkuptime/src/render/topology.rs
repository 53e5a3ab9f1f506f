use crate::accumulator::LinkTable;
use petgraph::{algo::dijkstra, graphmap::UnGraphMap};

/// The pair of servers furthest apart, counting hops over links in either
/// direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestPath {
    pub hops: usize,
    pub from: String,
    pub to: String,
}

/// Links as an undirected graph. Nodes keep the order they were discovered in.
fn link_graph(links: &LinkTable) -> UnGraphMap<&str, ()> {
    let mut graph = UnGraphMap::new();
    for (hub, leaves) in links {
        for leaf in leaves {
            graph.add_edge(hub.as_str(), leaf.as_str(), ());
        }
    }
    graph
}

/// Shortest hop counts from every server; the longest of those wins. Ties go
/// to the pair found first in discovery order. `None` if there are no links.
pub fn longest_path(links: &LinkTable) -> Option<LongestPath> {
    let graph = link_graph(links);
    let mut best: Option<(usize, &str, &str)> = None;

    for start in graph.nodes() {
        let distances = dijkstra(&graph, start, None, |_| 1usize);

        for end in graph.nodes() {
            let Some(&hops) = distances.get(end) else {
                continue;
            };
            if best.map_or(true, |(longest, _, _)| hops > longest) {
                best = Some((hops, start, end));
            }
        }
    }

    best.filter(|(hops, _, _)| *hops > 0)
        .map(|(hops, from, to)| LongestPath {
            hops,
            from: from.to_string(),
            to: to.to_string(),
        })
}
