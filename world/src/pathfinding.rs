//! A*-family route search over the cached tile adjacency graph.
//!
//! Two interchangeable strategies implement the same contract. The
//! [`ScanPathfinder`] keeps every search structure in plain vectors with
//! linear lookup, which is simple but costs time proportional to the visited
//! set on every access. The [`IndexedPathfinder`] assigns each tile a dense
//! index on first sight and addresses flat score arrays with it. Both return
//! routes of equal total cost; the exact tile sequence may differ only where
//! several optimal routes exist, subject to the configured tie-break.
//!
//! The cost model biases routes toward roads and heavily penalizes, without
//! forbidding, solid terrain: a solid step costs 100, a road step 1 and any
//! other step 10. Solid tiles are only expandable as an unbroken run that
//! begins at the start tile, which lets a caller that finds itself inside
//! blocked terrain route back out while ordinary routes may not cut through
//! isolated obstacles.

use std::collections::HashMap;
use std::fmt;

use tilepath_core::{GlobalCoord, PathfinderKind, Position, SearchConfig, TieBreak};

use crate::{Tile, World};

const SOLID_COST: u32 = 100;
const ROAD_COST: u32 = 1;
const PLAIN_COST: u32 = 10;

/// Destination of a path search.
pub enum PathGoal<'p> {
    /// Route to the tile containing this position. The search fails up front
    /// when the tile does not exist or every one of its neighbours is solid.
    Point(Position),
    /// Route to the nearest tile satisfying the predicate. The heuristic
    /// degrades to zero, making the search uniform-cost.
    Nearest(&'p dyn Fn(&Tile) -> bool),
}

impl fmt::Debug for PathGoal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point(position) => f.debug_tuple("Point").field(position).finish(),
            Self::Nearest(_) => f.write_str("Nearest(..)"),
        }
    }
}

/// Stateless-per-call search service bound to a world.
pub trait Pathfinder: fmt::Debug {
    /// Finds a walkable route from `start` to `goal`.
    ///
    /// Returns the full tile sequence from the start tile to the goal tile
    /// inclusive, or `None` when no route exists. Must not mutate any world
    /// state.
    fn find_path<'w>(
        &self,
        world: &'w World,
        start: Position,
        goal: PathGoal<'_>,
    ) -> Option<Vec<&'w Tile>>;
}

/// Instantiates the strategy selected by the world configuration.
pub(crate) fn bind(kind: PathfinderKind, config: SearchConfig) -> Box<dyn Pathfinder> {
    match kind {
        PathfinderKind::Scan => Box::new(ScanPathfinder::new(config)),
        PathfinderKind::Indexed => Box::new(IndexedPathfinder::new(config)),
    }
}

/// Cost of stepping onto a tile. The departure tile never matters.
fn step_cost(to: &Tile) -> u32 {
    if to.is_solid() {
        SOLID_COST
    } else if to.is_road() {
        ROAD_COST
    } else {
        PLAIN_COST
    }
}

/// Straight-line estimate toward a fixed destination, zero without one.
///
/// Both ends are measured in global coordinates. (A historical variant mixed
/// the destination's global position with the candidate's chunk-local one,
/// which loses admissibility across chunk boundaries.)
fn heuristic(tile: &Tile, destination: Option<GlobalCoord>) -> f32 {
    destination.map_or(0.0, |goal| tile.global_position().distance(goal))
}

struct Endpoints<'w> {
    start: &'w Tile,
    destination: Option<GlobalCoord>,
}

/// Resolves both endpoints, rejecting searches that provably cannot succeed:
/// a missing start tile, a missing fixed destination, or a fixed destination
/// whose every neighbour is solid.
fn resolve_endpoints<'w>(
    world: &'w World,
    start: Position,
    goal: &PathGoal<'_>,
) -> Option<Endpoints<'w>> {
    let destination = match goal {
        PathGoal::Point(position) => {
            let tile = world.tile_at(*position)?;
            let open_neighbour = tile
                .neighbours()
                .iter()
                .filter_map(|coord| world.tile_at_global(*coord))
                .any(|neighbour| !neighbour.is_solid());
            if !open_neighbour {
                return None;
            }
            Some(tile.global_position())
        }
        PathGoal::Nearest(_) => None,
    };

    let start = world.tile_at(start)?;
    Some(Endpoints { start, destination })
}

fn goal_reached(tile: &Tile, destination: Option<GlobalCoord>, goal: &PathGoal<'_>) -> bool {
    match destination {
        Some(coord) => tile.global_position() == coord,
        None => match goal {
            PathGoal::Nearest(predicate) => predicate(tile),
            PathGoal::Point(_) => false,
        },
    }
}

/// Tie-break state applied while scanning the open set for the lowest score.
enum TieBreaker {
    Deterministic,
    Jittered { state: u64 },
}

impl TieBreaker {
    fn new(tie_break: TieBreak) -> Self {
        match tie_break {
            TieBreak::Deterministic => Self::Deterministic,
            TieBreak::Jittered { seed } => Self::Jittered { state: seed },
        }
    }

    /// Perturbation added to a candidate's score, at most ±0.05.
    fn perturb(&mut self) -> f32 {
        match self {
            Self::Deterministic => 0.0,
            Self::Jittered { state } => {
                *state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1);
                let unit = ((*state >> 33) % 1_000) as f32 / 1_000.0;
                (unit - 0.5) / 10.0
            }
        }
    }
}

/// List-based strategy: open set, scores and predecessors live in plain
/// vectors keyed by tile coordinate, with linear lookup throughout.
#[derive(Clone, Copy, Debug)]
pub struct ScanPathfinder {
    config: SearchConfig,
}

impl ScanPathfinder {
    /// Creates a list-based pathfinder with the provided tunables.
    #[must_use]
    pub const fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

impl Pathfinder for ScanPathfinder {
    fn find_path<'w>(
        &self,
        world: &'w World,
        start: Position,
        goal: PathGoal<'_>,
    ) -> Option<Vec<&'w Tile>> {
        let endpoints = resolve_endpoints(world, start, &goal)?;
        let start_coord = endpoints.start.global_position();
        let destination = endpoints.destination;
        let mut tie_breaker = TieBreaker::new(self.config.tie_break);

        let mut open: Vec<GlobalCoord> = vec![start_coord];
        let mut g_scores: Vec<(GlobalCoord, u32)> = vec![(start_coord, 0)];
        let mut f_scores: Vec<(GlobalCoord, f32)> =
            vec![(start_coord, heuristic(endpoints.start, destination))];
        // Predecessor pairs stored as (to, from).
        let mut came_from: Vec<(GlobalCoord, GlobalCoord)> = Vec::new();
        let mut expansions = 0usize;

        while !open.is_empty() {
            if let Some(cap) = self.config.iteration_cap {
                if expansions >= cap {
                    return None;
                }
            }
            expansions += 1;

            let mut best_index = 0;
            let mut best_score = f32::INFINITY;
            for (index, coord) in open.iter().enumerate() {
                let score = lookup_f(&f_scores, *coord) + tie_breaker.perturb();
                if score < best_score {
                    best_score = score;
                    best_index = index;
                }
            }
            let current_coord = open.remove(best_index);
            let current = world.tile_at_global(current_coord)?;

            if goal_reached(current, destination, &goal) {
                return rebuild_scan_path(world, &came_from, current_coord);
            }

            // A solid tile away from the start only expands when it was
            // reached from another solid tile.
            if current.is_solid() && current_coord != start_coord {
                let from_solid = came_from
                    .iter()
                    .find(|(to, _)| *to == current_coord)
                    .and_then(|(_, from)| world.tile_at_global(*from))
                    .is_some_and(Tile::is_solid);
                if !from_solid {
                    continue;
                }
            }

            let current_g = lookup_g(&g_scores, current_coord);
            for &neighbour_coord in current.neighbours() {
                let Some(neighbour) = world.tile_at_global(neighbour_coord) else {
                    continue;
                };
                if neighbour.is_solid() && !current.is_solid() {
                    continue;
                }

                let tentative = current_g.saturating_add(step_cost(neighbour));
                if tentative < lookup_g(&g_scores, neighbour_coord) {
                    upsert(&mut came_from, neighbour_coord, current_coord);
                    upsert(&mut g_scores, neighbour_coord, tentative);
                    upsert(
                        &mut f_scores,
                        neighbour_coord,
                        tentative as f32 + heuristic(neighbour, destination),
                    );
                    if !open.contains(&neighbour_coord) {
                        open.push(neighbour_coord);
                    }
                }
            }
        }

        None
    }
}

fn lookup_g(scores: &[(GlobalCoord, u32)], coord: GlobalCoord) -> u32 {
    scores
        .iter()
        .find(|(entry, _)| *entry == coord)
        .map_or(u32::MAX, |(_, score)| *score)
}

fn lookup_f(scores: &[(GlobalCoord, f32)], coord: GlobalCoord) -> f32 {
    scores
        .iter()
        .find(|(entry, _)| *entry == coord)
        .map_or(f32::INFINITY, |(_, score)| *score)
}

fn upsert<T>(entries: &mut Vec<(GlobalCoord, T)>, coord: GlobalCoord, value: T) {
    match entries.iter_mut().find(|(entry, _)| *entry == coord) {
        Some((_, slot)) => *slot = value,
        None => entries.push((coord, value)),
    }
}

fn rebuild_scan_path<'w>(
    world: &'w World,
    came_from: &[(GlobalCoord, GlobalCoord)],
    goal: GlobalCoord,
) -> Option<Vec<&'w Tile>> {
    let mut coord = goal;
    let mut path = vec![world.tile_at_global(coord)?];
    while let Some((_, from)) = came_from.iter().find(|(to, _)| *to == coord) {
        coord = *from;
        path.push(world.tile_at_global(coord)?);
    }
    path.reverse();
    Some(path)
}

/// Index-based strategy: every tile encountered receives a dense index on
/// first sight, and `g`, `f` and predecessor live in flat arrays addressed
/// by that index.
#[derive(Clone, Copy, Debug)]
pub struct IndexedPathfinder {
    config: SearchConfig,
}

impl IndexedPathfinder {
    /// Creates an index-based pathfinder with the provided tunables.
    #[must_use]
    pub const fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

/// Per-call arena mapping tile coordinates to dense indices.
struct SearchArena<'w> {
    tiles: Vec<&'w Tile>,
    indices: HashMap<GlobalCoord, usize>,
    g_scores: Vec<u32>,
    f_scores: Vec<f32>,
    came_from: Vec<Option<usize>>,
}

impl<'w> SearchArena<'w> {
    fn new() -> Self {
        Self {
            tiles: Vec::new(),
            indices: HashMap::new(),
            g_scores: Vec::new(),
            f_scores: Vec::new(),
            came_from: Vec::new(),
        }
    }

    fn intern(&mut self, tile: &'w Tile) -> usize {
        let coord = tile.global_position();
        if let Some(index) = self.indices.get(&coord) {
            return *index;
        }

        let index = self.tiles.len();
        self.tiles.push(tile);
        self.g_scores.push(u32::MAX);
        self.f_scores.push(f32::INFINITY);
        self.came_from.push(None);
        let _ = self.indices.insert(coord, index);
        index
    }

    fn rebuild_path(&self, goal: usize) -> Vec<&'w Tile> {
        let mut index = goal;
        let mut path = vec![self.tiles[index]];
        while let Some(previous) = self.came_from[index] {
            index = previous;
            path.push(self.tiles[index]);
        }
        path.reverse();
        path
    }
}

impl Pathfinder for IndexedPathfinder {
    fn find_path<'w>(
        &self,
        world: &'w World,
        start: Position,
        goal: PathGoal<'_>,
    ) -> Option<Vec<&'w Tile>> {
        let endpoints = resolve_endpoints(world, start, &goal)?;
        let destination = endpoints.destination;
        let mut tie_breaker = TieBreaker::new(self.config.tie_break);

        let mut arena = SearchArena::new();
        let start_index = arena.intern(endpoints.start);
        arena.g_scores[start_index] = 0;
        arena.f_scores[start_index] = heuristic(endpoints.start, destination);

        let mut open: Vec<usize> = vec![start_index];
        let mut expansions = 0usize;

        while !open.is_empty() {
            if let Some(cap) = self.config.iteration_cap {
                if expansions >= cap {
                    return None;
                }
            }
            expansions += 1;

            let mut best_position = 0;
            let mut best_score = f32::INFINITY;
            for (position, index) in open.iter().enumerate() {
                let score = arena.f_scores[*index] + tie_breaker.perturb();
                if score < best_score {
                    best_score = score;
                    best_position = position;
                }
            }
            let current_index = open.remove(best_position);
            let current = arena.tiles[current_index];

            if goal_reached(current, destination, &goal) {
                return Some(arena.rebuild_path(current_index));
            }

            if current.is_solid() && current_index != start_index {
                let from_solid = arena.came_from[current_index]
                    .map(|previous| arena.tiles[previous].is_solid())
                    .unwrap_or(false);
                if !from_solid {
                    continue;
                }
            }

            let current_g = arena.g_scores[current_index];
            for &neighbour_coord in current.neighbours() {
                let Some(neighbour) = world.tile_at_global(neighbour_coord) else {
                    continue;
                };
                if neighbour.is_solid() && !current.is_solid() {
                    continue;
                }

                let neighbour_index = arena.intern(neighbour);
                let tentative = current_g.saturating_add(step_cost(neighbour));
                if tentative < arena.g_scores[neighbour_index] {
                    arena.came_from[neighbour_index] = Some(current_index);
                    arena.g_scores[neighbour_index] = tentative;
                    arena.f_scores[neighbour_index] =
                        tentative as f32 + heuristic(neighbour, destination);
                    if !open.contains(&neighbour_index) {
                        open.push(neighbour_index);
                    }
                }
            }
        }

        None
    }
}

/// Total cost of a route under the shared cost model. The start tile is free.
#[must_use]
pub fn path_cost(path: &[&Tile]) -> u32 {
    path.iter().skip(1).map(|tile| step_cost(tile)).sum()
}
