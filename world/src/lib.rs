#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative chunked tile world for Tilepath.
//!
//! The world owns a square grid of [`Chunk`]s, each owning a dense square
//! grid of [`Tile`]s. All map state mutates only inside [`World::import`],
//! which rebuilds every chunk from a [`WorldData`] record, recomputes the
//! neighbour caches, and rebinds a fresh pathfinder strategy. Outside of
//! import the world is read-only, so any number of concurrent callers may
//! look up tiles and run path searches without coordination.

pub mod pathfinding;

use tilepath_core::{
    global_position, resolve, ChunkCoord, ChunkData, EntityId, GlobalCoord, ImportError,
    LocalCoord, PathfinderKind, Position, SearchConfig, TileData, WorldData, WorldSettings,
};

use crate::pathfinding::{PathGoal, Pathfinder};

/// A single grid cell: the unit of walkability and the search-graph vertex.
#[derive(Clone, Debug)]
pub struct Tile {
    local: LocalCoord,
    global: GlobalCoord,
    chunk: ChunkCoord,
    solid: bool,
    door: bool,
    terrain: String,
    neighbours: Option<Vec<GlobalCoord>>,
}

impl Tile {
    fn from_data(chunk: ChunkCoord, local: LocalCoord, data: TileData, chunk_size: u32) -> Self {
        // A doorway is passable by definition, whatever the record claims.
        let solid = data.solid && !data.door;
        Self {
            local,
            global: global_position(chunk, local, chunk_size),
            chunk,
            solid,
            door: data.door,
            terrain: data.terrain,
            neighbours: None,
        }
    }

    /// Position of the tile within its owning chunk.
    #[must_use]
    pub const fn local_position(&self) -> LocalCoord {
        self.local
    }

    /// World-absolute position of the tile.
    #[must_use]
    pub const fn global_position(&self) -> GlobalCoord {
        self.global
    }

    /// Coordinate of the chunk that owns this tile.
    ///
    /// A plain coordinate rather than a reference: ownership always runs
    /// top-down from the world, and the back-reference exists only for
    /// coordinate resolution.
    #[must_use]
    pub const fn chunk_position(&self) -> ChunkCoord {
        self.chunk
    }

    /// Reports whether the tile blocks ordinary movement.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.solid
    }

    /// Reports whether the tile is a passable doorway.
    #[must_use]
    pub const fn is_door(&self) -> bool {
        self.door
    }

    /// Terrain category assigned to the tile.
    #[must_use]
    pub fn terrain(&self) -> &str {
        &self.terrain
    }

    /// Reports whether the terrain belongs to the road category, including
    /// variants such as `road_02`.
    #[must_use]
    pub fn is_road(&self) -> bool {
        self.terrain.contains("road")
    }

    /// Coordinates of the cached cardinal neighbours, at most four.
    ///
    /// Empty until the owning world completes its caching pass after import.
    #[must_use]
    pub fn neighbours(&self) -> &[GlobalCoord] {
        self.neighbours.as_deref().unwrap_or(&[])
    }
}

/// Fixed-size square block of tiles: the unit of map import granularity.
#[derive(Clone, Debug)]
pub struct Chunk {
    position: ChunkCoord,
    tiles: Vec<Vec<Tile>>,
    entities: Vec<EntityId>,
    neighbours: Option<Vec<ChunkCoord>>,
}

impl Chunk {
    fn from_data(position: ChunkCoord, data: ChunkData, chunk_size: u32) -> Self {
        let tiles = data
            .tiles
            .into_iter()
            .enumerate()
            .map(|(column, cells)| {
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(row, tile)| {
                        let local = LocalCoord::new(column as u32, row as u32);
                        Tile::from_data(position, local, tile, chunk_size)
                    })
                    .collect()
            })
            .collect();
        Self {
            position,
            tiles,
            entities: data.entities,
            neighbours: None,
        }
    }

    /// Grid position of the chunk measured in chunk units.
    #[must_use]
    pub const fn position(&self) -> ChunkCoord {
        self.position
    }

    /// Returns the tile at the provided chunk-relative coordinate.
    #[must_use]
    pub fn tile(&self, local: LocalCoord) -> Option<&Tile> {
        self.tiles
            .get(local.column() as usize)?
            .get(local.row() as usize)
    }

    /// Iterates over every tile owned by the chunk in column-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    /// Entities currently located inside the chunk.
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Coordinates of the cached adjacent chunks, at most four.
    ///
    /// Empty until the owning world completes its caching pass after import.
    #[must_use]
    pub fn neighbours(&self) -> &[ChunkCoord] {
        self.neighbours.as_deref().unwrap_or(&[])
    }
}

/// Full map: a square grid of chunks plus the bound pathfinder strategy.
#[derive(Debug)]
pub struct World {
    settings: WorldSettings,
    chunks: Vec<Vec<Chunk>>,
    strategy: PathfinderKind,
    config: SearchConfig,
    pathfinder: Box<dyn Pathfinder>,
}

impl World {
    /// Creates an empty world bound to the provided search strategy.
    ///
    /// The world holds no chunks until [`World::import`] runs; every lookup
    /// and search reports "no tile" / "no path" before then.
    #[must_use]
    pub fn new(strategy: PathfinderKind, config: SearchConfig) -> Self {
        Self {
            settings: WorldSettings::default(),
            chunks: Vec::new(),
            strategy,
            config,
            pathfinder: pathfinding::bind(strategy, config),
        }
    }

    /// Dimensions the current chunk grid was built against.
    #[must_use]
    pub const fn settings(&self) -> WorldSettings {
        self.settings
    }

    /// Strategy executing path searches for this world.
    #[must_use]
    pub const fn strategy(&self) -> PathfinderKind {
        self.strategy
    }

    /// Replaces the entire map with the provided record.
    ///
    /// Tears down every existing chunk, builds the new generation, runs the
    /// neighbour caching pass, and rebinds a fresh pathfinder so no search
    /// state from the previous tile generation survives. Validation happens
    /// before teardown: a malformed record leaves the world untouched.
    pub fn import(&mut self, data: WorldData) -> Result<(), ImportError> {
        let settings = data.settings;
        let chunk_size = settings.chunk_size();
        if chunk_size == 0 || settings.level_size() % chunk_size != 0 {
            return Err(ImportError::InvalidSettings {
                level_size: settings.level_size(),
                chunk_size,
            });
        }

        let expected = settings.chunks_per_axis();
        if data.chunks.len() != expected as usize {
            return Err(ImportError::ChunkColumns {
                expected,
                found: data.chunks.len(),
            });
        }
        for (column, rows) in data.chunks.iter().enumerate() {
            if rows.len() != expected as usize {
                return Err(ImportError::ChunkRows {
                    column: column as u32,
                    expected,
                    found: rows.len(),
                });
            }
            for (row, chunk) in rows.iter().enumerate() {
                let square = chunk.tiles.len() == chunk_size as usize
                    && chunk
                        .tiles
                        .iter()
                        .all(|cells| cells.len() == chunk_size as usize);
                if !square {
                    return Err(ImportError::TileGrid {
                        column: column as u32,
                        row: row as u32,
                        expected: chunk_size,
                    });
                }
            }
        }

        self.settings = settings;
        self.chunks.clear();
        self.chunks = data
            .chunks
            .into_iter()
            .enumerate()
            .map(|(column, rows)| {
                rows.into_iter()
                    .enumerate()
                    .map(|(row, chunk)| {
                        let position = ChunkCoord::new(column as u32, row as u32);
                        Chunk::from_data(position, chunk, chunk_size)
                    })
                    .collect()
            })
            .collect();

        self.cache_neighbours();
        self.pathfinder = pathfinding::bind(self.strategy, self.config);
        Ok(())
    }

    /// Returns the chunk at the provided grid coordinate.
    #[must_use]
    pub fn chunk(&self, position: ChunkCoord) -> Option<&Chunk> {
        self.chunks
            .get(position.column() as usize)?
            .get(position.row() as usize)
    }

    /// Returns the tile containing the provided continuous position.
    ///
    /// Negative, fractional and out-of-bounds positions degrade to `None`.
    /// Side-effect free and callable concurrently from read-only borrows.
    #[must_use]
    pub fn tile_at(&self, position: Position) -> Option<&Tile> {
        let address = resolve(position, self.settings.chunk_size())?;
        self.chunk(address.chunk())?.tile(address.local())
    }

    /// Returns the tile at the provided world-absolute coordinate.
    #[must_use]
    pub fn tile_at_global(&self, global: GlobalCoord) -> Option<&Tile> {
        let size = self.settings.chunk_size();
        if size == 0 {
            return None;
        }
        let chunk = ChunkCoord::new(global.column() / size, global.row() / size);
        let local = LocalCoord::new(global.column() % size, global.row() % size);
        self.chunk(chunk)?.tile(local)
    }

    /// Finds a walkable route from `start` to the provided goal.
    ///
    /// Returns the full tile sequence from the start tile to the goal tile
    /// inclusive, or `None` when no route exists. Never mutates map state.
    #[must_use]
    pub fn find_path(&self, start: Position, goal: PathGoal<'_>) -> Option<Vec<&Tile>> {
        self.pathfinder.find_path(self, start, goal)
    }

    /// Returns the first entity satisfying the predicate, scanning chunks in
    /// grid order.
    #[must_use]
    pub fn find_entity<F>(&self, mut predicate: F) -> Option<EntityId>
    where
        F: FnMut(EntityId) -> bool,
    {
        self.chunks
            .iter()
            .flatten()
            .flat_map(|chunk| chunk.entities().iter().copied())
            .find(|entity| predicate(*entity))
    }

    /// Reports whether any entity in the world satisfies the predicate.
    #[must_use]
    pub fn some_entity<F>(&self, predicate: F) -> bool
    where
        F: FnMut(EntityId) -> bool,
    {
        self.find_entity(predicate).is_some()
    }

    /// Collects every entity satisfying the predicate in grid order.
    #[must_use]
    pub fn filter_entities<F>(&self, mut predicate: F) -> Vec<EntityId>
    where
        F: FnMut(EntityId) -> bool,
    {
        self.chunks
            .iter()
            .flatten()
            .flat_map(|chunk| chunk.entities().iter().copied())
            .filter(|entity| predicate(*entity))
            .collect()
    }

    /// Collects every door tile in the world, scanning chunks in grid order.
    #[must_use]
    pub fn doors(&self) -> Vec<&Tile> {
        self.chunks
            .iter()
            .flatten()
            .flat_map(Chunk::tiles)
            .filter(|tile| tile.is_door())
            .collect()
    }

    /// Finds a route to a door whose straight-line distance from `position`
    /// lies strictly between `min_distance` and `max_distance`.
    ///
    /// Only the chunks that can hold such a door are scanned. Doors are
    /// considered in chunk grid order and the first one inside the band
    /// wins; the returned route runs from `position` to that door. Returns
    /// `None` when no door falls inside the band or the chosen door is
    /// unreachable.
    #[must_use]
    pub fn find_door(
        &self,
        position: Position,
        min_distance: f32,
        max_distance: f32,
    ) -> Option<Vec<&Tile>> {
        let size = self.settings.chunk_size();
        if size == 0 || !position.x().is_finite() || !position.y().is_finite() {
            return None;
        }
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return None;
        }

        let axis = i64::from(self.settings.chunks_per_axis());
        let span = (max_distance / size as f32).floor() as i64;
        let chunk_column = (position.x() / size as f32).floor() as i64;
        let chunk_row = (position.y() / size as f32).floor() as i64;
        let columns = (chunk_column - span).max(0)..(chunk_column + span + 1).min(axis);

        for column in columns {
            let rows = (chunk_row - span).max(0)..(chunk_row + span + 1).min(axis);
            for row in rows {
                let chunk = self.chunk(ChunkCoord::new(column as u32, row as u32))?;
                for tile in chunk.tiles() {
                    if !tile.is_door() {
                        continue;
                    }
                    let global = tile.global_position();
                    let corner = Position::new(global.column() as f32, global.row() as f32);
                    let distance = corner.distance(position);
                    if distance > min_distance && distance < max_distance {
                        return self.find_path(position, PathGoal::Point(corner));
                    }
                }
            }
        }
        None
    }

    /// Populates the tile and chunk adjacency caches in a single pass.
    ///
    /// Tiles receive the coordinates of their in-bounds cardinal neighbours;
    /// chunks receive the same one level up. The result is an immutable
    /// snapshot consumed by the search until the next import.
    fn cache_neighbours(&mut self) {
        let mut tile_lists = Vec::with_capacity(self.chunks.len());
        for column in &self.chunks {
            let mut chunk_lists = Vec::with_capacity(column.len());
            for chunk in column {
                let mut per_tile = Vec::with_capacity(chunk.tiles.len());
                for cells in &chunk.tiles {
                    let mut per_cell = Vec::with_capacity(cells.len());
                    for tile in cells {
                        per_cell.push(self.cardinal_neighbours(tile.global_position()));
                    }
                    per_tile.push(per_cell);
                }
                chunk_lists.push(per_tile);
            }
            tile_lists.push(chunk_lists);
        }

        for (column, chunk_lists) in self.chunks.iter_mut().zip(tile_lists) {
            for (chunk, per_tile) in column.iter_mut().zip(chunk_lists) {
                for (cells, per_cell) in chunk.tiles.iter_mut().zip(per_tile) {
                    for (tile, neighbours) in cells.iter_mut().zip(per_cell) {
                        tile.neighbours = Some(neighbours);
                    }
                }
            }
        }

        let axis = self.settings.chunks_per_axis();
        for column in &mut self.chunks {
            for chunk in column {
                let position = chunk.position();
                let mut neighbours = Vec::with_capacity(4);
                if let Some(west) = position.column().checked_sub(1) {
                    neighbours.push(ChunkCoord::new(west, position.row()));
                }
                if position.column() + 1 < axis {
                    neighbours.push(ChunkCoord::new(position.column() + 1, position.row()));
                }
                if let Some(north) = position.row().checked_sub(1) {
                    neighbours.push(ChunkCoord::new(position.column(), north));
                }
                if position.row() + 1 < axis {
                    neighbours.push(ChunkCoord::new(position.column(), position.row() + 1));
                }
                chunk.neighbours = Some(neighbours);
            }
        }
    }

    fn cardinal_neighbours(&self, global: GlobalCoord) -> Vec<GlobalCoord> {
        let mut candidates = Vec::with_capacity(4);
        if let Some(west) = global.column().checked_sub(1) {
            candidates.push(GlobalCoord::new(west, global.row()));
        }
        if let Some(east) = global.column().checked_add(1) {
            candidates.push(GlobalCoord::new(east, global.row()));
        }
        if let Some(north) = global.row().checked_sub(1) {
            candidates.push(GlobalCoord::new(global.column(), north));
        }
        if let Some(south) = global.row().checked_add(1) {
            candidates.push(GlobalCoord::new(global.column(), south));
        }
        candidates
            .into_iter()
            .filter(|coord| self.tile_at_global(*coord).is_some())
            .collect()
    }
}
