use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::modules::ability::AbilityKind;
use crate::modules::actor::ActorId;

/// Integer cell coordinate in grid space (not array space; see `Grid::origin`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Saturates at the ends of `i32`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// `None` when either axis leaves the `i32` range.
    pub const fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    pub const fn checked_add(self, rhs: GridPos) -> Option<Self> {
        self.checked_offset(rhs.x, rhs.y)
    }

    /// The 3x3 block centered on `self`, center included, x-major. Cells past
    /// the ends of `i32` are skipped.
    pub fn neighborhood(self) -> impl Iterator<Item = GridPos> {
        (-1..=1).flat_map(move |dx| (-1..=1).filter_map(move |dy| self.checked_offset(dx, dy)))
    }
}

impl Add for GridPos {
    type Output = GridPos;

    fn add(self, rhs: GridPos) -> GridPos {
        self.offset(rhs.x, rhs.y)
    }
}

impl AddAssign for GridPos {
    fn add_assign(&mut self, rhs: GridPos) {
        *self = *self + rhs;
    }
}

impl Sub for GridPos {
    type Output = GridPos;

    fn sub(self, rhs: GridPos) -> GridPos {
        GridPos::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl Neg for GridPos {
    type Output = GridPos;

    fn neg(self) -> GridPos {
        GridPos::new(self.x.saturating_neg(), self.y.saturating_neg())
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Continuous position; cell `(x, y)` is the unit square centered at `(x + 0.5, y + 0.5)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    #[default]
    Void,
    Floor,
    Wall,
    Hazard,
}

impl TileKind {
    pub const fn is_walkable(self) -> bool {
        !matches!(self, TileKind::Void | TileKind::Wall)
    }

    pub const fn label(self) -> &'static str {
        match self {
            TileKind::Void => "void",
            TileKind::Floor => "floor",
            TileKind::Wall => "wall",
            TileKind::Hazard => "hazard",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub kind: TileKind,
    pub occupant: Option<ActorId>,
    pub collectible: Option<AbilityKind>,
}

impl Cell {
    /// What every out-of-range query sees.
    pub const VOID: Cell = Cell {
        kind: TileKind::Void,
        occupant: None,
        collectible: None,
    };

    pub const fn of(kind: TileKind) -> Self {
        Self {
            kind,
            occupant: None,
            collectible: None,
        }
    }

    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Dense bounded cell array. Out-of-range reads return `Cell::VOID` and
/// out-of-range writes are dropped; nothing here fails.
#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    origin: GridPos,
    cells: Vec<Cell>,
    /// Incremented whenever a cell changes.
    revision: u64,
}

impl Grid {
    /// All cells start as void.
    pub fn new(width: u32, height: u32, origin: GridPos) -> Self {
        Self::filled(width, height, origin, TileKind::Void)
    }

    pub fn filled(width: u32, height: u32, origin: GridPos, kind: TileKind) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        let len = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            origin,
            cells: vec![Cell::of(kind); len],
            revision: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn origin(&self) -> GridPos {
        self.origin
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_valid(&self, pos: GridPos) -> bool {
        self.index(pos).is_some()
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        let ax = pos.x.checked_sub(self.origin.x)?;
        let ay = pos.y.checked_sub(self.origin.y)?;
        if ax < 0 || ax >= self.width || ay < 0 || ay >= self.height {
            return None;
        }
        Some(ax as usize + ay as usize * self.width as usize)
    }

    pub fn get(&self, pos: GridPos) -> Cell {
        match self.index(pos) {
            Some(idx) => self.cells[idx],
            None => Cell::VOID,
        }
    }

    pub fn set(&mut self, pos: GridPos, cell: Cell) {
        let Some(idx) = self.index(pos) else {
            return;
        };
        if self.cells[idx] != cell {
            self.cells[idx] = cell;
            self.revision += 1;
        }
    }

    pub fn set_kind(&mut self, pos: GridPos, kind: TileKind) {
        let mut cell = self.get(pos);
        cell.kind = kind;
        self.set(pos, cell);
    }

    /// Every in-range position, row by row from the origin.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.height).flat_map(move |ay| {
            (0..self.width).map(move |ax| self.origin.offset(ax, ay))
        })
    }

    /// Rounds rather than truncates so interpolation noise (2.9999) lands on the right cell.
    pub fn world_to_grid(&self, world: WorldPos) -> GridPos {
        GridPos::new(
            (world.x - 0.5).round() as i32,
            (world.y - 0.5).round() as i32,
        )
    }

    pub fn grid_to_world(&self, pos: GridPos) -> WorldPos {
        WorldPos::new(pos.x as f32 + 0.5, pos.y as f32 + 0.5)
    }

    pub fn occupant(&self, pos: GridPos) -> Option<ActorId> {
        self.get(pos).occupant
    }

    /// Claims `pos` for `actor`. Fails when out of range or held by someone else.
    pub fn register_occupant(&mut self, pos: GridPos, actor: ActorId) -> bool {
        if !self.is_valid(pos) {
            return false;
        }
        let mut cell = self.get(pos);
        match cell.occupant {
            Some(other) if other != actor => false,
            _ => {
                cell.occupant = Some(actor);
                self.set(pos, cell);
                true
            }
        }
    }

    /// Releases `pos` only if `actor` is the one holding it.
    pub fn unregister_occupant(&mut self, pos: GridPos, actor: ActorId) -> bool {
        let mut cell = self.get(pos);
        if cell.occupant != Some(actor) {
            return false;
        }
        cell.occupant = None;
        self.set(pos, cell);
        true
    }

    pub fn place_collectible(&mut self, pos: GridPos, ability: AbilityKind) -> bool {
        if !self.is_valid(pos) {
            return false;
        }
        let mut cell = self.get(pos);
        cell.collectible = Some(ability);
        self.set(pos, cell);
        true
    }

    /// Removes and returns the collectible at `pos`.
    pub fn take_collectible(&mut self, pos: GridPos) -> Option<AbilityKind> {
        let mut cell = self.get(pos);
        let taken = cell.collectible.take()?;
        self.set(pos, cell);
        Some(taken)
    }

    pub fn collectibles(&self) -> impl Iterator<Item = (GridPos, AbilityKind)> + '_ {
        self.positions()
            .filter_map(|pos| self.get(pos).collectible.map(|ability| (pos, ability)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(width: u32, height: u32) -> Grid {
        Grid::filled(width, height, GridPos::origin(), TileKind::Floor)
    }

    #[test]
    fn out_of_range_reads_are_void() {
        let grid = floor(3, 3);
        assert_eq!(grid.get(GridPos::new(3, 0)), Cell::VOID);
        assert_eq!(grid.get(GridPos::new(-1, 2)), Cell::VOID);
        assert_eq!(grid.get(GridPos::new(1, 1)).kind, TileKind::Floor);
    }

    #[test]
    fn out_of_range_writes_are_dropped() {
        let mut grid = floor(2, 2);
        grid.set(GridPos::new(5, 5), Cell::of(TileKind::Wall));
        assert_eq!(grid.revision(), 0);
        assert!(!grid.place_collectible(GridPos::new(-1, 0), AbilityKind::Diagonal));
        assert!(!grid.register_occupant(GridPos::new(2, 0), ActorId(1)));
    }

    #[test]
    fn origin_offset_shifts_bounds() {
        let grid = Grid::filled(4, 2, GridPos::new(-2, -1), TileKind::Floor);
        assert!(grid.is_valid(GridPos::new(-2, -1)));
        assert!(grid.is_valid(GridPos::new(1, 0)));
        assert!(!grid.is_valid(GridPos::new(2, 0)));
        assert!(!grid.is_valid(GridPos::new(0, 1)));
        assert_eq!(grid.positions().count(), 8);
    }

    #[test]
    fn world_transform_rounds_noise() {
        let grid = floor(10, 10);
        assert_eq!(grid.world_to_grid(WorldPos::new(2.99999, 3.5)), GridPos::new(2, 3));
        assert_eq!(grid.world_to_grid(WorldPos::new(3.49, 0.51)), GridPos::new(3, 0));
        assert_eq!(grid.grid_to_world(GridPos::new(4, -2)), WorldPos::new(4.5, -1.5));
    }

    #[test]
    fn occupancy_is_exclusive() {
        let mut grid = floor(2, 1);
        let pos = GridPos::new(0, 0);
        assert!(grid.register_occupant(pos, ActorId(1)));
        assert!(!grid.register_occupant(pos, ActorId(2)));
        assert!(!grid.unregister_occupant(pos, ActorId(2)));
        assert_eq!(grid.occupant(pos), Some(ActorId(1)));
        assert!(grid.unregister_occupant(pos, ActorId(1)));
        assert_eq!(grid.occupant(pos), None);
    }

    #[test]
    fn collectibles_are_taken_once() {
        let mut grid = floor(2, 2);
        let pos = GridPos::new(1, 1);
        grid.place_collectible(pos, AbilityKind::LShape);
        assert_eq!(grid.collectibles().collect::<Vec<_>>(), vec![(pos, AbilityKind::LShape)]);
        assert_eq!(grid.take_collectible(pos), Some(AbilityKind::LShape));
        assert_eq!(grid.take_collectible(pos), None);
        assert_eq!(grid.get(pos).collectible, None);
    }

    #[test]
    fn neighborhood_includes_center() {
        let cells: Vec<_> = GridPos::new(5, 5).neighborhood().collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], GridPos::new(4, 4));
        assert!(cells.contains(&GridPos::new(5, 5)));
        assert_eq!(cells[8], GridPos::new(6, 6));
    }

    #[test]
    fn arithmetic_at_i32_edges_never_panics() {
        let edge = GridPos::new(i32::MAX, i32::MIN);
        assert_eq!(edge.offset(1, -1), edge);
        assert_eq!(edge.checked_offset(1, 0), None);
        assert_eq!(edge.checked_offset(-1, 1), Some(GridPos::new(i32::MAX - 1, i32::MIN + 1)));
        assert_eq!(-edge, GridPos::new(-i32::MAX, i32::MAX));
        assert_eq!(edge - GridPos::new(-1, 1), edge);
        assert_eq!(edge.neighborhood().count(), 4);

        let grid = Grid::filled(3, 3, GridPos::new(i32::MAX - 2, 0), TileKind::Floor);
        assert!(grid.is_valid(GridPos::new(i32::MAX, 2)));
        assert_eq!(grid.positions().count(), 9);
    }
}
