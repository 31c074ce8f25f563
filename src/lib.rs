//! # grid_astar
//!
//! Shortest paths on a uniform 4-connected grid using
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) with the Manhattan distance as
//! heuristic. Every move between orthogonally adjacent walkable cells costs the same, so the
//! returned paths have the minimal number of steps. Pre-computes
//! [connected components](https://en.wikipedia.org/wiki/Component_(graph_theory))
//! to avoid flood-filling behaviour if no path exists.
//!
//! ```
//! use grid_astar::{PathFinder, WalkGrid};
//! use grid_util::point::Point;
//!
//! let grid = WalkGrid::from_map(&[[0, 0, 0], [1, 1, 0], [0, 0, 0]]).unwrap();
//! let path = PathFinder::new()
//!     .find_path(&grid, Point::new(0, 0), Point::new(0, 2))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(path.len(), 6);
//! ```
//!
//! A [WalkGrid] never changes after construction and all search state is local to a call of
//! [PathFinder::find_path], so a grid may be shared freely between threads.
pub mod astar;
pub mod error;
pub mod solver;
pub mod walk_grid;

pub use astar::{SearchLimits, TieBreak};
pub use error::{PathError, PathResult};
pub use solver::{is_valid_path, PathFinder};
pub use walk_grid::{Cell, WalkGrid};

/// Cost of a single orthogonal step.
pub const EDGE_COST: i32 = 1;

/// Inline capacity for neighbour lists; a 4-neighbourhood never spills to the heap.
pub const N_SMALLVEC_SIZE: usize = 4;
