use thiserror::Error;

/// Errors produced while building a [WalkGrid](crate::walk_grid::WalkGrid) or running a search.
///
/// A search that simply finds no route is not an error; it yields `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The walkability map could not be turned into a grid.
    #[error("invalid grid input: {0}")]
    InvalidInput(String),

    /// A coordinate lies outside the grid.
    #[error("point ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// The search hit its expansion budget or deadline before finishing.
    #[error("search aborted after {expansions} expansions")]
    SearchAborted { expansions: usize },
}

/// Result type used throughout the crate.
pub type PathResult<T> = Result<T, PathError>;
