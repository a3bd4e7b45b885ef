//! BFS traversal over the directed connection graph.

use std::collections::{HashMap, VecDeque};

use super::KnowledgeGraph;
use crate::{KgError, Result};

/// Shortest path by edge count from `start` to `end`.
///
/// Unweighted BFS following outgoing connections. Ties go to the first path
/// discovered in neighbor insertion order. Returns `None` when either endpoint
/// is unknown or `end` is unreachable; `start == end` yields `[start]`.
pub fn shortest_path(
    graph: &KnowledgeGraph,
    start: &str,
    end: &str,
) -> Result<Option<Vec<String>>> {
    if !graph.has_entity(start) || !graph.has_entity(end) {
        return Ok(None);
    }
    if start == end {
        return Ok(Some(vec![start.to_string()]));
    }

    // child -> parent on the BFS tree; presence doubles as the visited set
    let mut parents: HashMap<&str, &str> = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    parents.insert(start, start);

    while let Some(entity) = queue.pop_front() {
        for (next, _) in graph.relationships().outgoing(entity) {
            if parents.contains_key(next) {
                continue;
            }
            parents.insert(next, entity);
            if next == end {
                return unwind(&parents, start, end).map(Some);
            }
            queue.push_back(next);
        }
    }

    Ok(None)
}

/// Walk the BFS tree back from `end`. Every visited entity has a parent, so a
/// gap in the chain means the tree is corrupt.
fn unwind(parents: &HashMap<&str, &str>, start: &str, end: &str) -> Result<Vec<String>> {
    let mut path = vec![end.to_string()];
    let mut current = end;
    while current != start {
        let parent = parents.get(current).copied().ok_or_else(|| {
            KgError::Internal(format!(
                "broken BFS parent chain at '{}' while tracing {} to {}",
                current, start, end
            ))
        })?;
        path.push(parent.to_string());
        current = parent;
    }
    path.reverse();
    Ok(path)
}
