#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tilepath engine.
//!
//! This crate defines the pure vocabulary that connects the authoritative
//! world to its adapters: coordinate newtypes, the chunk/tile addressing
//! functions, the serializable map records consumed by world import, and the
//! configuration types that select a pathfinder strategy. Nothing in this
//! crate holds state or touches I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default edge length of the level measured in tiles.
pub const DEFAULT_LEVEL_SIZE: u32 = 64;

/// Default edge length of a single chunk measured in tiles.
pub const DEFAULT_CHUNK_SIZE: u32 = 16;

/// Continuous position expressed in tile units.
///
/// Fractional components address a point inside a tile; the integer floor of
/// each axis selects the tile itself.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new continuous position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component measured in tile units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component measured in tile units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Straight-line distance between two positions.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Location of a chunk within the world grid, measured in chunk units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    column: u32,
    row: u32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the chunk.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the chunk.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Location of a tile within its owning chunk, running `[0, chunk_size)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalCoord {
    column: u32,
    row: u32,
}

impl LocalCoord {
    /// Creates a new chunk-relative tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index within the chunk.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index within the chunk.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// World-absolute tile coordinate derived from chunk and local positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalCoord {
    column: u32,
    row: u32,
}

impl GlobalCoord {
    /// Creates a new world-absolute tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index within the world.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index within the world.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Straight-line distance between two tile coordinates.
    #[must_use]
    pub fn distance(self, other: GlobalCoord) -> f32 {
        let dx = self.column.abs_diff(other.column) as f32;
        let dy = self.row.abs_diff(other.row) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Coordinate of the continuous point at the centre of the tile.
    #[must_use]
    pub fn center(self) -> Position {
        Position::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }
}

/// Fully resolved address of a tile: its chunk and its position inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileAddress {
    chunk: ChunkCoord,
    local: LocalCoord,
}

impl TileAddress {
    /// Creates a new tile address from its chunk and local parts.
    #[must_use]
    pub const fn new(chunk: ChunkCoord, local: LocalCoord) -> Self {
        Self { chunk, local }
    }

    /// Chunk that owns the addressed tile.
    #[must_use]
    pub const fn chunk(&self) -> ChunkCoord {
        self.chunk
    }

    /// Position of the tile within its owning chunk.
    #[must_use]
    pub const fn local(&self) -> LocalCoord {
        self.local
    }
}

/// Resolves a continuous position into a chunk and local tile address.
///
/// Returns `None` for negative or non-finite coordinates and for a zero
/// chunk size: the chunk grid never extends below the origin, so such
/// positions address no tile. Callers still bound-check the chunk index
/// against their grid.
#[must_use]
pub fn resolve(position: Position, chunk_size: u32) -> Option<TileAddress> {
    if chunk_size == 0 {
        return None;
    }

    let column = position.x().floor();
    let row = position.y().floor();
    if !column.is_finite() || !row.is_finite() || column < 0.0 || row < 0.0 {
        return None;
    }

    let column = column as u64;
    let row = row as u64;
    let size = u64::from(chunk_size);

    let chunk_column = u32::try_from(column / size).ok()?;
    let chunk_row = u32::try_from(row / size).ok()?;
    let local_column = (column % size) as u32;
    let local_row = (row % size) as u32;

    Some(TileAddress::new(
        ChunkCoord::new(chunk_column, chunk_row),
        LocalCoord::new(local_column, local_row),
    ))
}

/// Computes a tile's world-absolute coordinate from its chunk and local parts.
#[must_use]
pub fn global_position(chunk: ChunkCoord, local: LocalCoord, chunk_size: u32) -> GlobalCoord {
    GlobalCoord::new(
        chunk.column() * chunk_size + local.column(),
        chunk.row() * chunk_size + local.row(),
    )
}

/// Dimensions the world is built against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSettings {
    level_size: u32,
    chunk_size: u32,
}

impl WorldSettings {
    /// Creates settings with explicit level and chunk edge lengths.
    #[must_use]
    pub const fn new(level_size: u32, chunk_size: u32) -> Self {
        Self {
            level_size,
            chunk_size,
        }
    }

    /// Edge length of the level measured in tiles.
    #[must_use]
    pub const fn level_size(&self) -> u32 {
        self.level_size
    }

    /// Edge length of a single chunk measured in tiles.
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Number of chunks along each axis of the world grid.
    #[must_use]
    pub const fn chunks_per_axis(&self) -> u32 {
        if self.chunk_size == 0 {
            0
        } else {
            self.level_size / self.chunk_size
        }
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_SIZE, DEFAULT_CHUNK_SIZE)
    }
}

/// Opaque identifier of an entity occupying a chunk.
///
/// The world tracks occupants but never interprets them; their behaviour
/// lives entirely outside this engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Serialized description of a single tile within a chunk record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileData {
    /// Blocks ordinary movement when set.
    pub solid: bool,
    /// Marks a passable doorway; mutually exclusive with `solid`.
    pub door: bool,
    /// Terrain category such as `grass`, `road` or `water`. Variant names
    /// like `road_02` keep their category as a prefix.
    pub terrain: String,
}

impl TileData {
    /// Creates an open tile of the provided terrain category.
    #[must_use]
    pub fn open(terrain: &str) -> Self {
        Self {
            solid: false,
            door: false,
            terrain: terrain.to_owned(),
        }
    }

    /// Creates a solid tile of the provided terrain category.
    #[must_use]
    pub fn solid(terrain: &str) -> Self {
        Self {
            solid: true,
            door: false,
            terrain: terrain.to_owned(),
        }
    }
}

/// Serialized description of a chunk: a dense tile grid plus its occupants.
///
/// Tiles are stored column-major: `tiles[x][y]` addresses local column `x`
/// and local row `y`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkData {
    /// Column-major `chunk_size × chunk_size` tile grid.
    pub tiles: Vec<Vec<TileData>>,
    /// Entities located inside the chunk at import time.
    #[serde(default)]
    pub entities: Vec<EntityId>,
}

/// Serialized description of an entire world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldData {
    /// Dimensions the chunk grid must agree with.
    pub settings: WorldSettings,
    /// Column-major grid of chunk records.
    pub chunks: Vec<Vec<ChunkData>>,
}

/// Validation failures reported by world import.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ImportError {
    /// The settings describe a chunk size of zero or one that does not
    /// divide the level size.
    #[error("chunk size {chunk_size} does not partition level size {level_size}")]
    InvalidSettings {
        /// Level edge length from the imported settings.
        level_size: u32,
        /// Chunk edge length from the imported settings.
        chunk_size: u32,
    },
    /// The chunk grid does not match the expected number of columns.
    #[error("expected {expected} chunk columns, found {found}")]
    ChunkColumns {
        /// Chunk columns required by the settings.
        expected: u32,
        /// Chunk columns present in the record.
        found: usize,
    },
    /// A chunk column does not match the expected number of rows.
    #[error("chunk column {column} holds {found} rows, expected {expected}")]
    ChunkRows {
        /// Column whose row count disagrees.
        column: u32,
        /// Chunk rows required by the settings.
        expected: u32,
        /// Chunk rows present in the column.
        found: usize,
    },
    /// A chunk's tile grid is not exactly `chunk_size × chunk_size`.
    #[error("chunk ({column}, {row}) tile grid is not {expected}x{expected}")]
    TileGrid {
        /// Column of the malformed chunk.
        column: u32,
        /// Row of the malformed chunk.
        row: u32,
        /// Required tile edge length.
        expected: u32,
    },
}

/// Strategy used to execute path searches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathfinderKind {
    /// List-based search storing scores in linearly scanned vectors.
    Scan,
    /// Index-based search storing scores in flat arrays addressed by dense
    /// per-tile indices.
    #[default]
    Indexed,
}

/// Ordering applied when several open-set tiles share the lowest score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TieBreak {
    /// First-found tile wins. Repeated searches over the same map return
    /// identical routes.
    #[default]
    Deterministic,
    /// Comparisons are perturbed by a small pseudo-random jitter derived
    /// from the seed, so equal-cost alternatives vary between seeds.
    Jittered {
        /// Seed for the jitter sequence.
        seed: u64,
    },
}

/// Tunables shared by every pathfinder strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Tie-break rule applied during open-set selection.
    pub tie_break: TieBreak,
    /// Upper bound on expanded tiles per search. Exceeding the cap reports
    /// "no path". `None` leaves the search unbounded.
    pub iteration_cap: Option<usize>,
}
