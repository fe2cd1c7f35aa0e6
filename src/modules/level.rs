//! ASCII level maps. The first text row is the top of the grid.
//!
//! ```text
//! #######
//! #@..O.#
//! #.^^..#
//! #...o.#
//! #######
//! ```

use std::fs;
use std::path::Path;

use crate::modules::ability::AbilityKind;
use crate::modules::error::LevelError;
use crate::modules::grid::{Grid, GridPos, TileKind};

/// What a single map character stands for.
enum Glyph {
    Tile(TileKind),
    Player,
    Pursuer(AbilityKind),
    Collectible(AbilityKind),
}

fn glyph(c: char) -> Option<Glyph> {
    let glyph = match c {
        '#' => Glyph::Tile(TileKind::Wall),
        '.' => Glyph::Tile(TileKind::Floor),
        ' ' | '_' => Glyph::Tile(TileKind::Void),
        '^' => Glyph::Tile(TileKind::Hazard),
        '@' => Glyph::Player,
        'n' => Glyph::Pursuer(AbilityKind::None),
        't' => Glyph::Pursuer(AbilityKind::Rest),
        'o' => Glyph::Pursuer(AbilityKind::Diagonal),
        'h' => Glyph::Pursuer(AbilityKind::Straight),
        'f' => Glyph::Pursuer(AbilityKind::LShape),
        'N' => Glyph::Collectible(AbilityKind::None),
        'T' => Glyph::Collectible(AbilityKind::Rest),
        'O' => Glyph::Collectible(AbilityKind::Diagonal),
        'H' => Glyph::Collectible(AbilityKind::Straight),
        'F' => Glyph::Collectible(AbilityKind::LShape),
        'D' => Glyph::Collectible(AbilityKind::Unbound),
        _ => return None,
    };
    Some(glyph)
}

#[derive(Debug, Clone)]
pub struct Level {
    pub grid: Grid,
    pub player: Option<GridPos>,
    pub pursuers: Vec<(GridPos, AbilityKind)>,
    pub collectibles: Vec<(GridPos, AbilityKind)>,
}

impl Level {
    pub fn load(path: &Path, origin: GridPos) -> Result<Self, LevelError> {
        let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, origin)
    }

    /// Blank lines around the map are ignored; short rows are padded with void.
    pub fn parse(text: &str, origin: GridPos) -> Result<Self, LevelError> {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
            .collect();
        let first = lines.iter().position(|(_, l)| !l.trim().is_empty());
        let last = lines.iter().rposition(|(_, l)| !l.trim().is_empty());
        let (Some(first), Some(last)) = (first, last) else {
            return Err(LevelError::Empty);
        };
        let rows = &lines[first..=last];

        let height = rows.len() as u32;
        let width = rows
            .iter()
            .map(|(_, l)| l.chars().count())
            .max()
            .unwrap_or(0) as u32;

        let mut level = Level {
            grid: Grid::new(width, height, origin),
            player: None,
            pursuers: Vec::new(),
            collectibles: Vec::new(),
        };

        for (row, (line_no, line)) in rows.iter().enumerate() {
            let y = origin.y + (height as i32 - 1 - row as i32);
            for (col, c) in line.chars().enumerate() {
                let pos = GridPos::new(origin.x + col as i32, y);
                let unknown = || LevelError::UnknownTile {
                    tile: c,
                    line: *line_no,
                    column: col + 1,
                };
                match glyph(c).ok_or_else(unknown)? {
                    Glyph::Tile(kind) => level.grid.set_kind(pos, kind),
                    Glyph::Player => {
                        if level.player.is_some() {
                            return Err(LevelError::DuplicatePlayer {
                                line: *line_no,
                                column: col + 1,
                            });
                        }
                        level.grid.set_kind(pos, TileKind::Floor);
                        level.player = Some(pos);
                    }
                    Glyph::Pursuer(ability) => {
                        level.grid.set_kind(pos, TileKind::Floor);
                        level.pursuers.push((pos, ability));
                    }
                    Glyph::Collectible(ability) => {
                        level.grid.set_kind(pos, TileKind::Floor);
                        level.collectibles.push((pos, ability));
                    }
                }
            }
        }

        Ok(level)
    }

    /// Count of cells per tile kind, in `Void, Floor, Wall, Hazard` order.
    pub fn tile_counts(&self) -> [(TileKind, usize); 4] {
        let mut counts = [
            (TileKind::Void, 0),
            (TileKind::Floor, 0),
            (TileKind::Wall, 0),
            (TileKind::Hazard, 0),
        ];
        for pos in self.grid.positions() {
            let kind = self.grid.get(pos).kind;
            if let Some(slot) = counts.iter_mut().find(|(k, _)| *k == kind) {
                slot.1 += 1;
            }
        }
        counts
    }
}
