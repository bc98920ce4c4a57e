//! Cell grid, cell masks and vein provenance.

use serde::{Deserialize, Serialize};

use crate::aliens::AlienInstance;

/// Grid coordinate `(x, y)`; `y` grows downward from the sky.
pub type Pos = (i32, i32);

/// Four cardinal neighbour offsets.
pub const CARDINALS: [Pos; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Solid,
    Space,
}

/// Mineral occupying a solid cell, as seen by the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ground {
    #[serde(rename = "type")]
    pub mineral: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub count: u32,
}

fn one() -> u32 {
    1
}

fn is_one(n: &u32) -> bool {
    *n == 1
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 1,
        }
    }

    pub fn stack(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FluidKind {
    Lava,
    Gas,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Hazard {
    Fluid {
        #[serde(rename = "type")]
        kind: FluidKind,
    },
    Alien(AlienInstance),
}

impl Hazard {
    pub fn lava() -> Self {
        Hazard::Fluid {
            kind: FluidKind::Lava,
        }
    }

    pub fn gas() -> Self {
        Hazard::Fluid {
            kind: FluidKind::Gas,
        }
    }

    pub fn fluid_kind(&self) -> Option<FluidKind> {
        match self {
            Hazard::Fluid { kind } => Some(*kind),
            Hazard::Alien(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: Terrain,
    pub ground: Option<Ground>,
    pub items: Vec<Item>,
    pub hazards: Vec<Hazard>,
}

impl Cell {
    pub fn space() -> Self {
        Self {
            terrain: Terrain::Space,
            ground: None,
            items: Vec::new(),
            hazards: Vec::new(),
        }
    }

    pub fn solid(mineral: impl Into<String>) -> Self {
        Self {
            terrain: Terrain::Solid,
            ground: Some(Ground {
                mineral: mineral.into(),
            }),
            items: Vec::new(),
            hazards: Vec::new(),
        }
    }

    pub fn is_space(&self) -> bool {
        self.terrain == Terrain::Space
    }

    pub fn is_solid(&self) -> bool {
        self.terrain == Terrain::Solid
    }

    /// Turn the cell into open space, dropping its ground.
    pub fn hollow(&mut self) {
        self.terrain = Terrain::Space;
        self.ground = None;
    }

    pub fn has_fluid(&self, kind: FluidKind) -> bool {
        self.hazards.iter().any(|h| h.fluid_kind() == Some(kind))
    }

    /// Add an item, merging with an existing stack of the same name.
    pub fn add_item(&mut self, item: Item) {
        match self.items.iter_mut().find(|i| i.name == item.name) {
            Some(existing) => existing.count += item.count,
            None => self.items.push(item),
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Column-major cell storage: `columns[x][y]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    columns: Vec<Vec<Cell>>,
}

impl Grid {
    /// A grid of open space.
    pub fn new(width: u32, depth: u32) -> Self {
        Self {
            columns: vec![vec![Cell::space(); depth as usize]; width as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.columns.len() as u32
    }

    pub fn depth(&self) -> u32 {
        self.columns.first().map_or(0, |c| c.len() as u32)
    }

    pub fn columns(&self) -> &[Vec<Cell>] {
        &self.columns
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.depth()
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(&self.columns[x as usize][y as usize])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(&mut self.columns[x as usize][y as usize])
    }

    /// Out-of-bounds counts as not space.
    pub fn is_space(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(Cell::is_space)
    }

    /// Out-of-bounds counts as not solid.
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(Cell::is_solid)
    }

    /// Every coordinate in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let (w, d) = (self.width() as i32, self.depth() as i32);
        (0..d).flat_map(move |y| (0..w).map(move |x| (x, y)))
    }

    pub fn cells(&self) -> impl Iterator<Item = (Pos, &Cell)> {
        self.columns.iter().enumerate().flat_map(|(x, col)| {
            col.iter()
                .enumerate()
                .map(move |(y, cell)| ((x as i32, y as i32), cell))
        })
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = (Pos, &mut Cell)> {
        self.columns.iter_mut().enumerate().flat_map(|(x, col)| {
            col.iter_mut()
                .enumerate()
                .map(move |(y, cell)| ((x as i32, y as i32), cell))
        })
    }
}

// ---------------------------------------------------------------------------
// CellMask
// ---------------------------------------------------------------------------

/// Dense coordinate set over a grid. Iterates in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMask {
    width: u32,
    depth: u32,
    bits: Vec<bool>,
    len: usize,
}

impl CellMask {
    pub fn new(width: u32, depth: u32) -> Self {
        Self {
            width,
            depth,
            bits: vec![false; (width * depth) as usize],
            len: 0,
        }
    }

    pub fn from_fn(width: u32, depth: u32, f: impl Fn(i32, i32) -> bool) -> Self {
        let mut mask = Self::new(width, depth);
        for y in 0..depth as i32 {
            for x in 0..width as i32 {
                if f(x, y) {
                    mask.insert(x, y);
                }
            }
        }
        mask
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.depth {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Returns true if the coordinate was newly added.
    pub fn insert(&mut self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(i) if !self.bits[i] => {
                self.bits[i] = true;
                self.len += 1;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.bits[i])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        let w = self.width as usize;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(i, _)| ((i % w) as i32, (i / w) as i32))
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Generation-time bookkeeping for a ground cell. Never reaches the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationMetadata {
    pub vein_source: bool,
    /// Vein instance that painted the cell.
    pub vein_index: u32,
}

/// One painted vein instance: a path, band, cluster or ring group.
#[derive(Debug, Clone, PartialEq)]
pub struct VeinInstance {
    pub index: u32,
    /// Position of the vein in `ground.veins`.
    pub spec_index: usize,
    pub mineral: String,
    pub yield_rate: f64,
}

/// Provenance layer kept beside the grid during generation.
#[derive(Debug, Clone)]
pub struct Provenance {
    width: u32,
    depth: u32,
    tags: Vec<Option<GenerationMetadata>>,
    instances: Vec<VeinInstance>,
}

impl Provenance {
    pub fn new(width: u32, depth: u32) -> Self {
        Self {
            width,
            depth,
            tags: vec![None; (width * depth) as usize],
            instances: Vec::new(),
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.depth {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Open a new vein instance and return its index.
    pub fn open_instance(&mut self, spec_index: usize, mineral: &str, yield_rate: f64) -> u32 {
        let index = self.instances.len() as u32;
        self.instances.push(VeinInstance {
            index,
            spec_index,
            mineral: mineral.to_string(),
            yield_rate,
        });
        index
    }

    pub fn instances(&self) -> &[VeinInstance] {
        &self.instances
    }

    pub fn tag(&mut self, x: i32, y: i32, vein_index: u32) {
        if let Some(i) = self.index(x, y) {
            self.tags[i] = Some(GenerationMetadata {
                vein_source: true,
                vein_index,
            });
        }
    }

    pub fn clear(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.tags[i] = None;
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<GenerationMetadata> {
        self.index(x, y).and_then(|i| self.tags[i])
    }

    /// Cells painted by one vein instance, row-major.
    pub fn cells_of(&self, vein_index: u32) -> Vec<Pos> {
        let w = self.width as usize;
        self.tags
            .iter()
            .enumerate()
            .filter(|(_, tag)| tag.is_some_and(|t| t.vein_index == vein_index))
            .map(|(i, _)| ((i % w) as i32, (i / w) as i32))
            .collect()
    }

    pub fn tagged_count(&self) -> usize {
        self.tags.iter().filter(|t| t.is_some()).count()
    }
}
