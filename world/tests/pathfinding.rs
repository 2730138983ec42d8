use tilepath_core::{
    ChunkData, GlobalCoord, LocalCoord, PathfinderKind, Position, SearchConfig, TieBreak,
    TileData, WorldData, WorldSettings,
};
use tilepath_world::pathfinding::{path_cost, PathGoal};
use tilepath_world::{Tile, World};

/// Reference maze on a single 16x16 chunk. `MAZE[x]` holds column `x`, its
/// `y`-th byte the tile at local (x, y): `#` solid, `.` open, `D` a doorway.
/// The route from (1, 1) to (14, 14) spans exactly 41 tiles.
const MAZE: [&str; 16] = [
    "################",
    "#..............#",
    "#.###.########.#",
    "#.#...#...#....#",
    "#.#.###...#....#",
    "#.#.....#.#....#",
    "#...#.#...######",
    "#.###..........#",
    "#.#..#....####.#",
    "#.#.......#....#",
    "#.##############",
    "#.#...#...#....#",
    "#.#.#.#.#...#..#",
    "#.#.#.#.###.#..#",
    "#...#...###..#.#",
    "################",
];

#[test]
fn scan_pathfinder_solves_the_reference_maze() {
    let world = maze_world(PathfinderKind::Scan);

    let path = world
        .find_path(Position::new(1.0, 1.0), PathGoal::Point(Position::new(14.0, 14.0)))
        .expect("path");

    assert_eq!(path.len(), 41);
    assert_endpoints(&path, LocalCoord::new(1, 1), LocalCoord::new(14, 14));
}

#[test]
fn indexed_pathfinder_solves_the_reference_maze() {
    let world = maze_world(PathfinderKind::Indexed);

    let path = world
        .find_path(Position::new(1.0, 1.0), PathGoal::Point(Position::new(14.0, 14.0)))
        .expect("path");

    assert_eq!(path.len(), 41);
    assert_endpoints(&path, LocalCoord::new(1, 1), LocalCoord::new(14, 14));
}

#[test]
fn both_strategies_return_routes_of_equal_cost() {
    let scan = maze_world(PathfinderKind::Scan);
    let indexed = maze_world(PathfinderKind::Indexed);
    let goal = Position::new(14.0, 14.0);

    let scan_path = scan
        .find_path(Position::new(1.0, 1.0), PathGoal::Point(goal))
        .expect("scan path");
    let indexed_path = indexed
        .find_path(Position::new(1.0, 1.0), PathGoal::Point(goal))
        .expect("indexed path");

    assert_eq!(path_cost(&scan_path), path_cost(&indexed_path));
    assert_eq!(path_cost(&scan_path), 400);
}

#[test]
fn deterministic_searches_repeat_identically() {
    let world = maze_world(PathfinderKind::Indexed);
    let start = Position::new(1.0, 1.0);
    let goal = Position::new(14.0, 14.0);

    let first: Vec<GlobalCoord> = world
        .find_path(start, PathGoal::Point(goal))
        .expect("path")
        .iter()
        .map(|tile| tile.global_position())
        .collect();

    for _ in 0..4 {
        let repeat: Vec<GlobalCoord> = world
            .find_path(start, PathGoal::Point(goal))
            .expect("path")
            .iter()
            .map(|tile| tile.global_position())
            .collect();
        assert_eq!(repeat, first);
    }
}

#[test]
fn jittered_searches_still_reach_the_goal() {
    let config = SearchConfig {
        tie_break: TieBreak::Jittered { seed: 0x5eed },
        iteration_cap: None,
    };
    let mut world = World::new(PathfinderKind::Indexed, config);
    world.import(maze_data()).expect("import");

    let path = world
        .find_path(Position::new(1.0, 1.0), PathGoal::Point(Position::new(14.0, 14.0)))
        .expect("path");

    assert_endpoints(&path, LocalCoord::new(1, 1), LocalCoord::new(14, 14));
}

#[test]
fn search_prefers_road_tiles_between_equal_length_routes() {
    // Two two-step routes from (0, 0) to (1, 1); only the one through
    // (1, 0) is paved.
    let mut data = open_field(4);
    data.chunks[0][0].tiles[1][0].terrain = "road".to_owned();
    let world = imported(PathfinderKind::Indexed, data);

    let path = world
        .find_path(Position::new(0.0, 0.0), PathGoal::Point(Position::new(1.0, 1.0)))
        .expect("path");

    assert_eq!(path.len(), 3);
    assert_eq!(path[1].global_position(), GlobalCoord::new(1, 0));
    assert!(path[1].is_road());
}

#[test]
fn enclosed_destination_fails_without_searching() {
    // The centre of a plus of solid tiles is unreachable by definition.
    let mut data = open_field(8);
    for (x, y) in [(3, 2), (2, 3), (4, 3), (3, 4)] {
        data.chunks[0][0].tiles[x][y] = TileData::solid("grass");
    }
    let world = imported(PathfinderKind::Scan, data);

    assert!(world
        .find_path(Position::new(0.0, 0.0), PathGoal::Point(Position::new(3.0, 3.0)))
        .is_none());
}

#[test]
fn missing_endpoints_yield_no_path() {
    let world = maze_world(PathfinderKind::Indexed);

    assert!(world
        .find_path(Position::new(-1.0, 1.0), PathGoal::Point(Position::new(14.0, 14.0)))
        .is_none());
    assert!(world
        .find_path(Position::new(1.0, 1.0), PathGoal::Point(Position::new(99.0, 14.0)))
        .is_none());
    assert!(world
        .find_path(Position::new(1.0, -5.0), PathGoal::Nearest(&|_: &Tile| true))
        .is_none());
}

#[test]
fn walled_off_goal_exhausts_the_open_set() {
    // A fully solid ring isolates the east side of the field.
    let mut data = open_field(8);
    for y in 0..8 {
        data.chunks[0][0].tiles[4][y] = TileData::solid("grass");
    }
    let world = imported(PathfinderKind::Indexed, data);

    assert!(world
        .find_path(Position::new(1.0, 1.0), PathGoal::Point(Position::new(6.0, 6.0)))
        .is_none());
}

#[test]
fn solid_start_tunnels_to_the_nearest_exit() {
    // The start is solid and boxed in by more solid tiles; (2, 1) is the
    // only open exit and leads into open ground.
    let mut data = open_field(4);
    data.chunks[0][0].tiles[1][1] = TileData::solid("grass");
    for (x, y) in [(0, 0), (1, 0), (2, 0), (0, 1), (0, 2), (1, 2), (2, 2)] {
        data.chunks[0][0].tiles[x][y] = TileData::solid("grass");
    }
    let world = imported(PathfinderKind::Indexed, data);

    let path = world
        .find_path(Position::new(1.0, 1.0), PathGoal::Point(Position::new(2.0, 1.0)))
        .expect("path");

    assert_eq!(path.len(), 2);
    assert_eq!(path[0].global_position(), GlobalCoord::new(1, 1));
    assert_eq!(path[1].global_position(), GlobalCoord::new(2, 1));
}

#[test]
fn ordinary_routes_may_not_cut_through_isolated_walls() {
    // Scan variant of the tunneling rule: a route starting on open ground
    // never enters solid terrain, however expensive the detour.
    let world = maze_world(PathfinderKind::Scan);

    let path = world
        .find_path(Position::new(1.0, 1.0), PathGoal::Point(Position::new(14.0, 14.0)))
        .expect("path");

    assert!(path.iter().all(|tile| !tile.is_solid()));
}

#[test]
fn predicate_goal_stops_at_the_nearest_matching_tile() {
    let mut data = maze_data();
    // Two doorways; the one at (5, 2) sits closer to the start.
    data.chunks[0][0].tiles[5][2] = TileData {
        solid: false,
        door: true,
        terrain: "grass".to_owned(),
    };
    data.chunks[0][0].tiles[14][14].door = true;
    let world = imported(PathfinderKind::Indexed, data);

    let path = world
        .find_path(Position::new(1.0, 1.0), PathGoal::Nearest(&Tile::is_door))
        .expect("path");

    assert_eq!(path[0].local_position(), LocalCoord::new(1, 1));
    assert!(path.last().expect("tile").is_door());
    assert_eq!(
        path.last().expect("tile").global_position(),
        GlobalCoord::new(5, 2)
    );
}

#[test]
fn find_door_routes_through_the_maze_to_a_door_in_range() {
    let mut data = maze_data();
    data.chunks[0][0].tiles[5][2] = TileData {
        solid: false,
        door: true,
        terrain: "grass".to_owned(),
    };
    let world = imported(PathfinderKind::Indexed, data);

    // The door sits sqrt(17) tiles from the start.
    let path = world
        .find_door(Position::new(1.0, 1.0), 2.0, 10.0)
        .expect("route");
    assert_eq!(path[0].local_position(), LocalCoord::new(1, 1));
    assert_eq!(
        path.last().expect("door").global_position(),
        GlobalCoord::new(5, 2)
    );

    assert!(world.find_door(Position::new(1.0, 1.0), 10.0, 12.0).is_none());
}

#[test]
fn predicate_satisfied_at_the_start_returns_a_single_tile() {
    let world = maze_world(PathfinderKind::Scan);

    let path = world
        .find_path(
            Position::new(1.0, 1.0),
            PathGoal::Nearest(&|tile: &Tile| !tile.is_solid()),
        )
        .expect("path");

    assert_eq!(path.len(), 1);
    assert_eq!(path[0].local_position(), LocalCoord::new(1, 1));
}

#[test]
fn iteration_cap_bounds_a_search() {
    let config = SearchConfig {
        tie_break: TieBreak::Deterministic,
        iteration_cap: Some(4),
    };
    let mut world = World::new(PathfinderKind::Indexed, config);
    world.import(maze_data()).expect("import");

    assert!(world
        .find_path(Position::new(1.0, 1.0), PathGoal::Point(Position::new(14.0, 14.0)))
        .is_none());
}

#[test]
fn reimport_rebinds_a_working_pathfinder() {
    let mut world = maze_world(PathfinderKind::Indexed);
    let start = Position::new(1.0, 1.0);
    let goal = Position::new(14.0, 14.0);
    assert!(world.find_path(start, PathGoal::Point(goal)).is_some());

    // Seal the maze entrance on reimport; the rebuilt generation must
    // report the route as gone rather than consult stale state.
    let mut sealed = maze_data();
    sealed.chunks[0][0].tiles[1][2] = TileData::solid("grass");
    sealed.chunks[0][0].tiles[2][1] = TileData::solid("grass");
    world.import(sealed).expect("reimport");

    assert!(world.find_path(start, PathGoal::Point(goal)).is_none());
}

#[test]
fn routes_cross_chunk_boundaries() {
    // Four 4x4 chunks of open ground; the route spans all of them.
    let world = imported(PathfinderKind::Indexed, open_world_data(8, 4));

    let path = world
        .find_path(Position::new(0.0, 0.0), PathGoal::Point(Position::new(7.0, 7.0)))
        .expect("path");

    assert_eq!(path.len(), 15);
    assert_eq!(path[0].global_position(), GlobalCoord::new(0, 0));
    assert_eq!(path[14].global_position(), GlobalCoord::new(7, 7));
    let chunks: std::collections::HashSet<_> =
        path.iter().map(|tile| tile.chunk_position()).collect();
    assert!(chunks.len() >= 3);
}

fn assert_endpoints(path: &[&Tile], start: LocalCoord, goal: LocalCoord) {
    assert_eq!(path.first().expect("start tile").local_position(), start);
    assert_eq!(path.last().expect("goal tile").local_position(), goal);
}

fn maze_data() -> WorldData {
    let tiles = MAZE
        .iter()
        .map(|column| {
            column
                .bytes()
                .map(|cell| match cell {
                    b'#' => TileData::solid("grass"),
                    b'D' => TileData {
                        solid: false,
                        door: true,
                        terrain: "grass".to_owned(),
                    },
                    _ => TileData::open("grass"),
                })
                .collect()
        })
        .collect();
    WorldData {
        settings: WorldSettings::new(16, 16),
        chunks: vec![vec![ChunkData {
            tiles,
            entities: Vec::new(),
        }]],
    }
}

fn maze_world(strategy: PathfinderKind) -> World {
    imported(strategy, maze_data())
}

fn open_field(size: u32) -> WorldData {
    open_world_data(size, size)
}

fn open_world_data(level_size: u32, chunk_size: u32) -> WorldData {
    let settings = WorldSettings::new(level_size, chunk_size);
    let axis = settings.chunks_per_axis() as usize;
    let size = chunk_size as usize;
    let chunk = ChunkData {
        tiles: vec![vec![TileData::open("grass"); size]; size],
        entities: Vec::new(),
    };
    WorldData {
        settings,
        chunks: vec![vec![chunk; axis]; axis],
    }
}

fn imported(strategy: PathfinderKind, data: WorldData) -> World {
    let mut world = World::new(strategy, SearchConfig::default());
    world.import(data).expect("import");
    world
}
