//! Bounded BFS path enumeration over the relationship graph.

use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};

use super::RelationshipGraph;

/// Default hop limit for path searches.
pub const DEFAULT_MAX_DEPTH: usize = 3;

impl RelationshipGraph {
    /// Enumerate simple paths from `from` to `to` using BFS.
    /// Returns paths of at most `max_depth` hops, shortest first.
    ///
    /// Each path starts at `from` and ends at `to`. Cycles are avoided per
    /// path only, so a table may appear on several returned paths. Branches
    /// whose set of visited tables was already expanded are dropped, which
    /// bounds the search on densely connected schemas.
    ///
    /// Returns an empty list when either table is unknown or no path exists
    /// within the limit; `from == to` yields the single one-table path.
    /// Among equally short paths the order is traversal order, which follows
    /// the order relationships were declared.
    pub fn find_paths(&self, from: &str, to: &str, max_depth: usize) -> Vec<Vec<String>> {
        let (Some(start), Some(target)) = (self.id_of(from), self.id_of(to)) else {
            return Vec::new();
        };

        if start == target {
            return vec![vec![from.to_string()]];
        }

        let mut paths: Vec<Vec<NodeIndex>> = Vec::new();
        let mut seen_signatures: HashSet<Vec<NodeIndex>> = HashSet::new();
        let mut queue: VecDeque<Vec<NodeIndex>> = VecDeque::new();
        queue.push_back(vec![start]);

        while let Some(path) = queue.pop_front() {
            if path.len() > max_depth {
                continue;
            }

            let mut signature = path.clone();
            signature.sort_unstable();
            if !seen_signatures.insert(signature) {
                continue;
            }

            let Some(&current) = path.last() else {
                continue;
            };

            for neighbour in self.neighbours(current) {
                if neighbour == target {
                    let mut complete = path.clone();
                    complete.push(neighbour);
                    paths.push(complete);
                } else if !path.contains(&neighbour) {
                    let mut next = path.clone();
                    next.push(neighbour);
                    queue.push_back(next);
                }
            }
        }

        paths.sort_by_key(Vec::len);
        paths
            .into_iter()
            .map(|path| path.into_iter().map(|id| self.name_of(id).to_string()).collect())
            .collect()
    }

    /// Shortest path from `from` to `to` within `max_depth` hops, if any.
    pub fn shortest_path(&self, from: &str, to: &str, max_depth: usize) -> Option<Vec<String>> {
        self.find_paths(from, to, max_depth).into_iter().next()
    }
}
