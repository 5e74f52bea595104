// Graph Module
// Adjacency-list graph with weighted edges, directed or undirected.
// Carries the two traversals (visitor callbacks) and both single-source
// shortest-path algorithms: Dijkstra for non-negative weights and
// Bellman-Ford with negative-cycle detection.

use anyhow::{bail, Result};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use tracing::debug;

use crate::types::ValidatedVertexCount;
use crate::validation;

/// One outgoing edge in an adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub to: usize,
    pub weight: i64,
}

/// Adjacency-list graph over vertices `0..num_vertices`.
#[derive(Debug, Clone)]
pub struct Graph {
    adjacency: Vec<Vec<Edge>>,
    directed: bool,
}

/// Distances and predecessor links from a single source. `None` marks an
/// unreachable vertex (the original's INT_MAX convention).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    pub start: usize,
    pub distances: Vec<Option<i64>>,
    pub predecessors: Vec<Option<usize>>,
}

impl ShortestPaths {
    /// Reconstruct the path from the source to `vertex` by walking the
    /// predecessor chain; `None` when the vertex is unreachable.
    pub fn path_to(&self, vertex: usize) -> Option<Vec<usize>> {
        self.distances.get(vertex).copied().flatten()?;
        let mut path = vec![vertex];
        let mut current = vertex;
        while let Some(prev) = self.predecessors[current] {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }
}

/// Bellman-Ford either produces paths or reports a negative cycle
/// reachable from the source. The cycle is a normal negative result,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BellmanFordOutcome {
    Paths(ShortestPaths),
    NegativeCycle,
}

impl Graph {
    /// Create a graph with `vertices` isolated vertices.
    pub fn new(vertices: usize, directed: bool) -> Result<Self> {
        let count = ValidatedVertexCount::new(vertices)?;
        Ok(Self {
            adjacency: vec![Vec::new(); count.get()],
            directed,
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Add an edge. Undirected graphs store the reverse edge as well.
    pub fn add_edge(&mut self, src: usize, dest: usize, weight: i64) -> Result<()> {
        validation::graph::validate_vertex(src, self.num_vertices())?;
        validation::graph::validate_vertex(dest, self.num_vertices())?;

        self.adjacency[src].push(Edge { to: dest, weight });
        if !self.directed {
            self.adjacency[dest].push(Edge { to: src, weight });
        }
        Ok(())
    }

    pub fn neighbors(&self, vertex: usize) -> Result<&[Edge]> {
        validation::graph::validate_vertex(vertex, self.num_vertices())?;
        Ok(&self.adjacency[vertex])
    }

    /// Breadth-first traversal from `start`, invoking `visit` on each
    /// vertex in discovery order. Returns the number of vertices reached.
    pub fn bfs<F: FnMut(usize)>(&self, start: usize, mut visit: F) -> Result<usize> {
        validation::graph::validate_vertex(start, self.num_vertices())?;

        let mut visited = vec![false; self.num_vertices()];
        let mut queue = VecDeque::new();
        visited[start] = true;
        queue.push_back(start);

        let mut reached = 0;
        while let Some(vertex) = queue.pop_front() {
            visit(vertex);
            reached += 1;
            for edge in &self.adjacency[vertex] {
                if !visited[edge.to] {
                    visited[edge.to] = true;
                    queue.push_back(edge.to);
                }
            }
        }
        debug!(start, reached, "bfs traversal");
        Ok(reached)
    }

    /// Depth-first traversal from `start`, pre-order visit. Returns the
    /// number of vertices reached.
    pub fn dfs<F: FnMut(usize)>(&self, start: usize, mut visit: F) -> Result<usize> {
        validation::graph::validate_vertex(start, self.num_vertices())?;

        fn walk<F: FnMut(usize)>(
            adjacency: &[Vec<Edge>],
            vertex: usize,
            visited: &mut [bool],
            visit: &mut F,
            reached: &mut usize,
        ) {
            visited[vertex] = true;
            visit(vertex);
            *reached += 1;
            for edge in &adjacency[vertex] {
                if !visited[edge.to] {
                    walk(adjacency, edge.to, visited, visit, reached);
                }
            }
        }

        let mut visited = vec![false; self.num_vertices()];
        let mut reached = 0;
        walk(
            &self.adjacency,
            start,
            &mut visited,
            &mut visit,
            &mut reached,
        );
        debug!(start, reached, "dfs traversal");
        Ok(reached)
    }

    /// Dijkstra's algorithm from `start`. Fails on the first negative
    /// edge weight reachable during relaxation.
    pub fn dijkstra(&self, start: usize) -> Result<ShortestPaths> {
        validation::graph::validate_vertex(start, self.num_vertices())?;

        let n = self.num_vertices();
        let mut distances: Vec<Option<i64>> = vec![None; n];
        let mut predecessors: Vec<Option<usize>> = vec![None; n];
        let mut heap = BinaryHeap::new();

        distances[start] = Some(0);
        heap.push(Reverse((0i64, start)));

        while let Some(Reverse((dist, u))) = heap.pop() {
            // Stale entry: a shorter path was already settled.
            if distances[u].is_some_and(|d| d < dist) {
                continue;
            }
            for edge in &self.adjacency[u] {
                if edge.weight < 0 {
                    bail!(
                        "Dijkstra requires non-negative weights, edge {u}->{} has {}",
                        edge.to,
                        edge.weight
                    );
                }
                let candidate = dist + edge.weight;
                if distances[edge.to].is_none_or(|d| candidate < d) {
                    distances[edge.to] = Some(candidate);
                    predecessors[edge.to] = Some(u);
                    heap.push(Reverse((candidate, edge.to)));
                }
            }
        }

        let reachable = distances.iter().filter(|d| d.is_some()).count();
        debug!(start, reachable, "dijkstra");
        Ok(ShortestPaths {
            start,
            distances,
            predecessors,
        })
    }

    /// Bellman-Ford from `start`: V-1 relaxation rounds over every edge,
    /// then one more scan to detect a reachable negative cycle.
    pub fn bellman_ford(&self, start: usize) -> Result<BellmanFordOutcome> {
        validation::graph::validate_vertex(start, self.num_vertices())?;

        let n = self.num_vertices();
        let mut distances: Vec<Option<i64>> = vec![None; n];
        let mut predecessors: Vec<Option<usize>> = vec![None; n];
        distances[start] = Some(0);

        for _ in 0..n.saturating_sub(1) {
            let mut relaxed = false;
            for u in 0..n {
                let Some(du) = distances[u] else { continue };
                for edge in &self.adjacency[u] {
                    let candidate = du + edge.weight;
                    if distances[edge.to].is_none_or(|d| candidate < d) {
                        distances[edge.to] = Some(candidate);
                        predecessors[edge.to] = Some(u);
                        relaxed = true;
                    }
                }
            }
            if !relaxed {
                break;
            }
        }

        // A further improvement on the V-th scan means a negative cycle.
        for u in 0..n {
            let Some(du) = distances[u] else { continue };
            for edge in &self.adjacency[u] {
                if distances[edge.to].is_none_or(|d| du + edge.weight < d) {
                    debug!(start, "bellman-ford detected negative cycle");
                    return Ok(BellmanFordOutcome::NegativeCycle);
                }
            }
        }

        let reachable = distances.iter().filter(|d| d.is_some()).count();
        debug!(start, reachable, "bellman-ford");
        Ok(BellmanFordOutcome::Paths(ShortestPaths {
            start,
            distances,
            predecessors,
        }))
    }
}
