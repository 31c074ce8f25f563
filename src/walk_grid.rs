use crate::error::{PathError, PathResult};
use crate::N_SMALLVEC_SIZE;
use core::fmt;
use grid_util::grid::{BoolGrid, ValueGrid};
use grid_util::point::Point;
use itertools::Itertools;
use log::info;
use num_traits::Zero;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;
use std::str::FromStr;

/// Offsets of the 4-neighbourhood, in the order successors are generated.
pub const NEUMANN_OFFSETS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// A single grid location together with its walkability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    point: Point,
    walkable: bool,
}

impl Cell {
    pub fn x(&self) -> i32 {
        self.point.x
    }
    pub fn y(&self) -> i32 {
        self.point.y
    }
    pub fn point(&self) -> Point {
        self.point
    }
    pub fn is_walkable(&self) -> bool {
        self.walkable
    }
}

/// [WalkGrid] stores the raw [bool] values of a [BoolGrid] that determine whether a cell is
/// blocked ([true]) or walkable ([false]), together with the connected components of its
/// walkable cells in a [UnionFind] structure. The grid cannot be changed once built, so the
/// components are generated exactly once and the grid can be shared between searches.
#[derive(Clone, Debug)]
pub struct WalkGrid {
    grid: BoolGrid,
    width: usize,
    height: usize,
    components: UnionFind<usize>,
}

impl WalkGrid {
    /// Builds a grid from rows of markers where zero means walkable and anything else blocked.
    /// The outer slice is indexed by `y`, each row by `x`, so a map laid out as `map[x][y]`
    /// (column-major, width first) must be transposed before it is passed in.
    pub fn from_map<R, T>(map: &[R]) -> PathResult<WalkGrid>
    where
        R: AsRef<[T]>,
        T: Zero,
    {
        let height = map.len();
        let width = map.first().map_or(0, |row| row.as_ref().len());
        if let Some(y) = map.iter().position(|row| row.as_ref().len() != width) {
            return Err(PathError::InvalidInput(format!(
                "row {} has {} cells, expected {}",
                y,
                map[y].as_ref().len(),
                width
            )));
        }
        let walkable = map
            .iter()
            .flat_map(|row| row.as_ref().iter().map(|marker| marker.is_zero()));
        WalkGrid::from_walkable(width, height, walkable)
    }

    /// Builds a grid from row-major walkability flags.
    pub fn from_walkable<I>(width: usize, height: usize, walkable: I) -> PathResult<WalkGrid>
    where
        I: IntoIterator<Item = bool>,
    {
        if width == 0 || height == 0 {
            return Err(PathError::InvalidInput(format!(
                "grid must not be empty, got {}x{}",
                width, height
            )));
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(PathError::InvalidInput(format!(
                "{}x{} does not fit in i32 coordinates",
                width, height
            )));
        }
        let mut grid = BoolGrid::new(width, height, false);
        let mut count = 0;
        for (ix, walkable) in walkable.into_iter().enumerate() {
            if ix >= width * height {
                return Err(PathError::InvalidInput(format!(
                    "more than {} cells supplied for a {}x{} grid",
                    width * height,
                    width,
                    height
                )));
            }
            grid.set((ix % width) as i32, (ix / width) as i32, !walkable);
            count += 1;
        }
        if count != width * height {
            return Err(PathError::InvalidInput(format!(
                "{} cells supplied for a {}x{} grid",
                count, width, height
            )));
        }
        let mut walk_grid = WalkGrid {
            grid,
            width,
            height,
            components: UnionFind::new(width * height),
        };
        walk_grid.generate_components();
        Ok(walk_grid)
    }

    /// A grid without any blocked cells.
    pub fn open(width: usize, height: usize) -> PathResult<WalkGrid> {
        WalkGrid::from_walkable(width, height, std::iter::repeat(true).take(width * height))
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        self.grid.point_in_bounds(point)
    }

    /// Walkability of a point; points outside the grid are never walkable.
    pub fn is_walkable(&self, point: Point) -> bool {
        self.in_bounds(point) && !self.grid.get(point.x, point.y)
    }

    /// Retrieves the [Cell] at the given coordinate.
    pub fn get_node(&self, x: i32, y: i32) -> PathResult<Cell> {
        let point = Point::new(x, y);
        self.check_bounds(point)?;
        Ok(Cell {
            point,
            walkable: !self.grid.get(x, y),
        })
    }

    pub(crate) fn check_bounds(&self, point: Point) -> PathResult<()> {
        if self.in_bounds(point) {
            Ok(())
        } else {
            Err(PathError::OutOfBounds {
                x: point.x,
                y: point.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// The walkable points of the 4-neighbourhood of `point`, in [NEUMANN_OFFSETS] order.
    pub fn neighbours(&self, point: &Point) -> SmallVec<[Point; N_SMALLVEC_SIZE]> {
        NEUMANN_OFFSETS
            .iter()
            .map(|(dx, dy)| Point::new(point.x + dx, point.y + dy))
            .filter(|p| self.is_walkable(*p))
            .collect()
    }

    fn get_ix_point(&self, point: &Point) -> usize {
        self.grid.get_ix_point(point)
    }

    /// Retrieves the component id a walkable [Point] belongs to.
    pub fn component(&self, point: &Point) -> Option<usize> {
        if self.is_walkable(*point) {
            Some(self.components.find(self.get_ix_point(point)))
        } else {
            None
        }
    }

    /// Checks if start and goal are walkable and on the same component.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        match (self.component(start), self.component(goal)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Checks if start and goal are not on the same component.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        !self.reachable(start, goal)
    }

    /// Links every walkable cell to its walkable right and lower neighbours.
    fn generate_components(&mut self) {
        info!(
            "Generating connected components for {}x{} grid",
            self.width, self.height
        );
        self.components = UnionFind::new(self.width * self.height);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let point = Point::new(x, y);
                if !self.is_walkable(point) {
                    continue;
                }
                let parent_ix = self.get_ix_point(&point);
                for p in [Point::new(x + 1, y), Point::new(x, y + 1)] {
                    if self.is_walkable(p) {
                        let ix = self.get_ix_point(&p);
                        self.components.union(parent_ix, ix);
                    }
                }
            }
        }
    }
}

impl fmt::Display for WalkGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.height as i32 {
            let row = (0..self.width as i32)
                .map(|x| if self.grid.get(x, y) { '#' } else { '.' })
                .join("");
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

/// Parses one row per line: `.` is walkable, `#`, `@`, `O`, `T` and `W` are blocked.
impl FromStr for WalkGrid {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .trim_matches(|c: char| c == '\n' || c == '\r')
            .lines()
            .map(|line| {
                line.trim_end()
                    .chars()
                    .map(|c| match c {
                        '.' => Ok(0u8),
                        '#' | '@' | 'O' | 'T' | 'W' => Ok(1u8),
                        other => Err(PathError::InvalidInput(format!(
                            "unexpected map glyph {:?}",
                            other
                        ))),
                    })
                    .collect::<PathResult<Vec<u8>>>()
            })
            .collect::<PathResult<Vec<Vec<u8>>>>()?;
        WalkGrid::from_map(&rows)
    }
}
