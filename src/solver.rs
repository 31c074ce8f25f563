use crate::astar::{astar, SearchLimits, TieBreak};
use crate::error::PathResult;
use crate::walk_grid::{Cell, WalkGrid};
use crate::{EDGE_COST, N_SMALLVEC_SIZE};
use grid_util::point::Point;
use itertools::Itertools;
use log::{debug, info, warn};
use smallvec::SmallVec;
use std::time::{Duration, Instant};

/// A* over the 4-neighbourhood of a [WalkGrid] with unit edge cost and the
/// [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry) as heuristic.
///
/// The solver holds configuration only. All search state lives inside a single
/// [find_path](Self::find_path) call, so one grid can serve any number of concurrent searches.
#[derive(Clone, Debug)]
pub struct PathFinder {
    pub tie_break: TieBreak,
    /// Abort once this many cells have been expanded.
    pub max_expansions: Option<usize>,
    /// Abort once a search has been running for this long.
    pub timeout: Option<Duration>,
    /// Reject start and target on different connected components without searching.
    pub use_components: bool,
}

impl Default for PathFinder {
    fn default() -> PathFinder {
        PathFinder::new()
    }
}

impl PathFinder {
    pub fn new() -> PathFinder {
        PathFinder {
            tie_break: TieBreak::InsertionOrder,
            max_expansions: None,
            timeout: None,
            use_components: true,
        }
    }

    pub fn heuristic(&self, p1: &Point, p2: &Point) -> i32 {
        p1.manhattan_distance(p2) * EDGE_COST
    }

    fn successors(
        &self,
        grid: &WalkGrid,
        node: &Point,
    ) -> SmallVec<[(Point, i32); N_SMALLVEC_SIZE]> {
        grid.neighbours(node)
            .into_iter()
            .map(|p| (p, EDGE_COST))
            .collect()
    }

    /// Total cost of a path as returned by [find_path](Self::find_path).
    pub fn path_cost(&self, path: &[Point]) -> usize {
        path.len() * EDGE_COST as usize
    }

    fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_expansions: self.max_expansions,
            deadline: self.timeout.map(|timeout| Instant::now() + timeout),
        }
    }

    /// Computes a shortest path from `start` to `target`.
    ///
    /// The returned steps run from the cell after `start` up to and including `target`, so
    /// a search from a cell to itself yields an empty path. `Ok(None)` means no path exists.
    /// Both points must lie on the grid; their walkability is not checked. A blocked start
    /// can still step onto walkable neighbours, while a blocked target is never entered.
    pub fn find_path(
        &self,
        grid: &WalkGrid,
        start: Point,
        target: Point,
    ) -> PathResult<Option<Vec<Point>>> {
        grid.check_bounds(start)?;
        grid.check_bounds(target)?;
        if start == target {
            return Ok(Some(Vec::new()));
        }
        if !grid.is_walkable(target) {
            info!("{} is blocked and cannot be entered", target);
            return Ok(None);
        }
        if self.use_components && grid.is_walkable(start) && grid.unreachable(&start, &target) {
            info!("{} is not reachable from {}", target, start);
            return Ok(None);
        }
        debug!("Computing path from {} to {}", start, target);
        let result = astar(
            &start,
            |node| self.successors(grid, node),
            |point| self.heuristic(point, &target),
            |point| *point == target,
            self.tie_break,
            &self.limits(),
        )?;
        if result.is_none() && self.use_components && grid.reachable(&start, &target) {
            warn!("Reachable target {} could not be pathed to from {}", target, start);
        }
        Ok(result.map(|(mut path, _cost)| {
            path.remove(0);
            path
        }))
    }

    /// [find_path](Self::find_path) for two cells of the grid.
    pub fn find_path_between(
        &self,
        grid: &WalkGrid,
        start: &Cell,
        target: &Cell,
    ) -> PathResult<Option<Vec<Point>>> {
        self.find_path(grid, start.point(), target.point())
    }
}

/// Checks that every step of `path` is walkable and 4-adjacent to the one before it,
/// starting from `start`.
pub fn is_valid_path(grid: &WalkGrid, start: Point, path: &[Point]) -> bool {
    std::iter::once(&start)
        .chain(path)
        .tuple_windows()
        .all(|(a, b)| grid.is_walkable(*b) && a.manhattan_distance(b) == 1)
}
