use grid_astar::{PathFinder, WalkGrid};
use grid_util::point::Point;

// In this example a path is found on a 3x3 grid with shape
//  ___
// |S  |
// | # |
// |  E|
//  ___
// where
// - # marks an obstacle
// - S marks the start
// - E marks the end
//
// Nodes have a 4-neighborhood

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let grid = WalkGrid::from_map(&[[0, 0, 0], [0, 1, 0], [0, 0, 0]])?;
    println!("{}", grid);
    let start = Point::new(0, 0);
    let end = Point::new(2, 2);
    match PathFinder::new().find_path(&grid, start, end)? {
        Some(path) => {
            println!("Path:");
            for p in path {
                println!("{:?}", p);
            }
        }
        None => println!("No path from {} to {}", start, end),
    }
    Ok(())
}
