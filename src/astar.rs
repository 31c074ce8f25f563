//! A variant of
//! [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html)
//! which keeps its per-search bookkeeping in an insertion-ordered arena and selects among
//! equal-priority nodes with an explicit [TieBreak] policy.
use crate::error::{PathError, PathResult};
use fxhash::FxBuildHasher;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use log::{debug, warn};
use num_traits::Zero;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;
use std::time::Instant;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// How to choose between open nodes that share the smallest estimated total cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// The node that entered the open set first wins.
    #[default]
    InsertionOrder,
    /// The node closest to the goal according to the heuristic wins, then insertion order.
    LowestHeuristic,
}

/// Budget checked once per loop iteration.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchLimits {
    pub max_expansions: Option<usize>,
    pub deadline: Option<Instant>,
}

impl SearchLimits {
    fn exceeded(&self, expansions: usize) -> bool {
        self.max_expansions.is_some_and(|max| expansions >= max)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Search state of a discovered node. The estimated total cost is always derived from `g`
/// and `h` and never stored on its own.
#[derive(Clone, Copy, Debug)]
struct NodeState<C> {
    parent: usize,
    g: C,
    h: C,
    closed: bool,
}

impl<C: Zero + Copy> NodeState<C> {
    fn f(&self) -> C {
        self.g + self.h
    }
}

struct SmallestCostHolder<K> {
    estimated_cost: K,
    tie: K,
    index: usize,
}

impl<K: PartialEq> Eq for SmallestCostHolder<K> {}

impl<K: PartialEq> PartialEq for SmallestCostHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost.eq(&other.estimated_cost)
            && self.tie.eq(&other.tie)
            && self.index == other.index
    }
}

impl<K: Ord> PartialOrd for SmallestCostHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SmallestCostHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed throughout: the max-heap must yield the smallest estimated cost, then
        // the smallest tie key, then the earliest inserted node
        other
            .estimated_cost
            .cmp(&self.estimated_cost)
            .then_with(|| other.tie.cmp(&self.tie))
            .then_with(|| other.index.cmp(&self.index))
    }
}

fn reverse_path<N, C>(nodes: &FxIndexMap<N, NodeState<C>>, start: usize) -> Vec<N>
where
    N: Eq + Hash + Clone,
{
    let mut i = start;
    let mut path: Vec<N> = std::iter::from_fn(|| {
        nodes.get_index(i).map(|(node, state)| {
            i = state.parent;
            node.clone()
        })
    })
    .collect();
    path.reverse();
    path
}

/// Runs A* from `start` until `success` accepts a node, returning the path (including
/// `start`) and its cost, or `None` once every reachable node has been closed.
///
/// Closed nodes are never reopened, so `heuristic` must be consistent for the result to be
/// optimal.
pub fn astar<N, C, FN, IN, FH, FS>(
    start: &N,
    mut successors: FN,
    mut heuristic: FH,
    mut success: FS,
    tie_break: TieBreak,
    limits: &SearchLimits,
) -> PathResult<Option<(Vec<N>, C)>>
where
    N: Eq + Hash + Clone,
    C: Zero + Ord + Copy,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, C)>,
    FH: FnMut(&N) -> C,
    FS: FnMut(&N) -> bool,
{
    let tie_key = |state: &NodeState<C>| match tie_break {
        TieBreak::InsertionOrder => C::zero(),
        TieBreak::LowestHeuristic => state.h,
    };
    let mut to_see = BinaryHeap::new();
    let mut nodes: FxIndexMap<N, NodeState<C>> = FxIndexMap::default();
    let root = NodeState {
        parent: usize::MAX,
        g: C::zero(),
        h: heuristic(start),
        closed: false,
    };
    to_see.push(SmallestCostHolder {
        estimated_cost: root.f(),
        tie: tie_key(&root),
        index: 0,
    });
    nodes.insert(start.clone(), root);
    let mut expansions = 0;

    while let Some(SmallestCostHolder {
        estimated_cost,
        index,
        ..
    }) = to_see.pop()
    {
        let (node, cost) = match nodes.get_index(index) {
            // A node may sit in the heap several times if a cheaper way to it was found;
            // only the entry matching its current cost is live.
            Some((node, state)) if !state.closed && state.f() == estimated_cost => {
                (node.clone(), state.g)
            }
            _ => continue,
        };
        if success(&node) {
            debug!("Goal reached after {} expansions", expansions);
            return Ok(Some((reverse_path(&nodes, index), cost)));
        }
        if limits.exceeded(expansions) {
            warn!("Search aborted after {} expansions", expansions);
            return Err(PathError::SearchAborted { expansions });
        }
        if let Some((_, state)) = nodes.get_index_mut(index) {
            state.closed = true;
        }
        expansions += 1;

        for (successor, move_cost) in successors(&node) {
            let new_cost = cost + move_cost;
            let (n, state) = match nodes.entry(successor) {
                Vacant(e) => {
                    let state = NodeState {
                        parent: index,
                        g: new_cost,
                        h: heuristic(e.key()),
                        closed: false,
                    };
                    let n = e.index();
                    e.insert(state);
                    (n, state)
                }
                Occupied(mut e) => {
                    let n = e.index();
                    let state = e.get_mut();
                    if state.closed || new_cost >= state.g {
                        continue;
                    }
                    state.g = new_cost;
                    state.parent = index;
                    (n, *state)
                }
            };
            to_see.push(SmallestCostHolder {
                estimated_cost: state.f(),
                tie: tie_key(&state),
                index: n,
            });
        }
    }
    debug!("Open set exhausted after {} expansions", expansions);
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Successors on the integer line, moving one step left or right within `0..len`.
    fn line(len: i32) -> impl FnMut(&i32) -> Vec<(i32, i32)> {
        move |&n| {
            [n - 1, n + 1]
                .into_iter()
                .filter(|m| (0..len).contains(m))
                .map(|m| (m, 1))
                .collect()
        }
    }

    #[test]
    fn walks_a_line() {
        let result = astar(
            &0,
            line(5),
            |&n| 4 - n,
            |&n| n == 4,
            TieBreak::InsertionOrder,
            &SearchLimits::default(),
        )
        .unwrap();
        assert_eq!(result, Some((vec![0, 1, 2, 3, 4], 4)));
    }

    #[test]
    fn start_is_goal() {
        let result = astar(
            &3,
            line(5),
            |_| 0,
            |&n| n == 3,
            TieBreak::InsertionOrder,
            &SearchLimits::default(),
        )
        .unwrap();
        assert_eq!(result, Some((vec![3], 0)));
    }

    #[test]
    fn exhausts_without_goal() {
        let result = astar(
            &0,
            line(5),
            |_| 0,
            |&n| n == 9,
            TieBreak::InsertionOrder,
            &SearchLimits::default(),
        )
        .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn stops_at_expansion_budget() {
        let limits = SearchLimits {
            max_expansions: Some(2),
            deadline: None,
        };
        let result = astar(
            &0,
            line(10),
            |_| 0,
            |&n| n == 9,
            TieBreak::InsertionOrder,
            &limits,
        );
        assert_eq!(result, Err(PathError::SearchAborted { expansions: 2 }));
    }

    #[test]
    fn expired_deadline_aborts_before_expanding() {
        let limits = SearchLimits {
            max_expansions: None,
            deadline: Some(Instant::now()),
        };
        let result = astar(
            &0,
            line(10),
            |_| 0,
            |&n| n == 9,
            TieBreak::InsertionOrder,
            &limits,
        );
        assert_eq!(result, Err(PathError::SearchAborted { expansions: 0 }));
    }

    #[test]
    fn cheaper_route_replaces_parent() {
        // 0 -> 1 costs 5, 0 -> 2 -> 1 costs 2
        let edges = |&n: &u8| -> Vec<(u8, u32)> {
            match n {
                0 => vec![(1, 5), (2, 1)],
                2 => vec![(1, 1)],
                1 => vec![(3, 1)],
                _ => vec![],
            }
        };
        let result = astar(
            &0u8,
            edges,
            |_| 0,
            |&n| n == 3,
            TieBreak::InsertionOrder,
            &SearchLimits::default(),
        )
        .unwrap();
        assert_eq!(result, Some((vec![0, 2, 1, 3], 3)));
    }

    #[test]
    fn improved_open_node_keeps_its_place() {
        // Node 1 is inserted before node 3 and later made cheaper through node 2; with equal
        // estimated cost it must still be expanded before node 3.
        let edges = |&n: &u8| -> Vec<(u8, u32)> {
            match n {
                0 => vec![(1, 5), (2, 1)],
                2 => vec![(3, 1), (1, 1)],
                1 | 3 => vec![(4, 1)],
                _ => vec![],
            }
        };
        let result = astar(
            &0u8,
            edges,
            |_| 0,
            |&n| n == 4,
            TieBreak::InsertionOrder,
            &SearchLimits::default(),
        )
        .unwrap();
        assert_eq!(result, Some((vec![0, 2, 1, 4], 3)));
    }

    #[test]
    fn insertion_order_breaks_ties() {
        // Two equal-cost branches; the first listed successor is expanded and returned first.
        let edges = |&n: &u8| -> Vec<(u8, u32)> {
            match n {
                0 => vec![(1, 1), (2, 1)],
                1 => vec![(3, 1)],
                2 => vec![(3, 1)],
                _ => vec![],
            }
        };
        let result = astar(
            &0u8,
            edges,
            |_| 0,
            |&n| n == 3,
            TieBreak::InsertionOrder,
            &SearchLimits::default(),
        )
        .unwrap();
        assert_eq!(result, Some((vec![0, 1, 3], 2)));
    }

    #[test]
    fn lowest_heuristic_breaks_ties() {
        // After expanding 0 both branches have f = 2, but node 2 is estimated closer to the goal
        let edges = |&n: &u8| -> Vec<(u8, u32)> {
            match n {
                0 => vec![(1, 1), (2, 2)],
                1 => vec![(3, 1)],
                2 => vec![(3, 0)],
                _ => vec![],
            }
        };
        let heuristic = |&n: &u8| match n {
            0 => 2,
            1 => 1,
            _ => 0,
        };
        for (tie_break, expected) in [
            (TieBreak::InsertionOrder, vec![0, 1, 3]),
            (TieBreak::LowestHeuristic, vec![0, 2, 3]),
        ] {
            let result = astar(
                &0u8,
                edges,
                heuristic,
                |&n| n == 3,
                tie_break,
                &SearchLimits::default(),
            )
            .unwrap();
            assert_eq!(result, Some((expected, 2)));
        }
    }
}
