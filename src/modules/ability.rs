use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::modules::grid::GridPos;

/// One of the four cardinal press directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn delta(self) -> GridPos {
        match self {
            Direction::Up => GridPos::new(0, 1),
            Direction::Down => GridPos::new(0, -1),
            Direction::Left => GridPos::new(-1, 0),
            Direction::Right => GridPos::new(1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Quarter turn counter-clockwise: up, left, down, right, up.
    pub const fn ccw(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// WASD key mapping.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Direction::Up),
            's' => Some(Direction::Down),
            'a' => Some(Direction::Left),
            'd' => Some(Direction::Right),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            _ => Err(()),
        }
    }
}

const CARDINAL_OFFSETS: [GridPos; 4] = [
    GridPos::new(0, 1),
    GridPos::new(0, -1),
    GridPos::new(-1, 0),
    GridPos::new(1, 0),
];

const DIAGONAL_OFFSETS: [GridPos; 4] = [
    GridPos::new(1, 1),
    GridPos::new(1, -1),
    GridPos::new(-1, 1),
    GridPos::new(-1, -1),
];

const STRAIGHT_OFFSETS: [GridPos; 4] = [
    GridPos::new(0, 2),
    GridPos::new(0, -2),
    GridPos::new(-2, 0),
    GridPos::new(2, 0),
];

const KNIGHT_OFFSETS: [GridPos; 8] = [
    GridPos::new(1, 2),
    GridPos::new(2, 1),
    GridPos::new(2, -1),
    GridPos::new(1, -2),
    GridPos::new(-1, -2),
    GridPos::new(-2, -1),
    GridPos::new(-2, 1),
    GridPos::new(-1, 2),
];

/// Movement shape currently governing an actor. Collectibles carry one of these
/// as their tag.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    /// Plain cardinal step.
    #[default]
    None,
    /// Cardinal step, idle every other tick.
    #[value(alias = "turtle")]
    Rest,
    #[value(alias = "ox")]
    Diagonal,
    /// Two cells along one axis; may land on walls and void.
    #[value(alias = "hawk")]
    Straight,
    #[value(name = "lshape", alias = "fox")]
    LShape,
    /// Reserved for the controlled actor.
    #[value(alias = "dragon")]
    Unbound,
}

impl AbilityKind {
    pub const fn label(self) -> &'static str {
        match self {
            AbilityKind::None => "none",
            AbilityKind::Rest => "rest",
            AbilityKind::Diagonal => "diagonal",
            AbilityKind::Straight => "straight",
            AbilityKind::LShape => "lshape",
            AbilityKind::Unbound => "unbound",
        }
    }

    /// Name of the mask that grants this ability.
    pub const fn mask_name(self) -> &'static str {
        match self {
            AbilityKind::None => "Plain",
            AbilityKind::Rest => "Turtle",
            AbilityKind::Diagonal => "Ox",
            AbilityKind::Straight => "Hawk",
            AbilityKind::LShape => "Fox",
            AbilityKind::Unbound => "Dragon",
        }
    }

    /// Presses replace the buffer instead of voting.
    pub const fn is_unbuffered(self) -> bool {
        matches!(self, AbilityKind::None | AbilityKind::Rest)
    }

    pub const fn rests(self) -> bool {
        matches!(self, AbilityKind::Rest)
    }

    /// Controlled actors with this ability may land on walls and void.
    /// Pursuers never get terrain passthrough.
    pub const fn ignores_terrain(self) -> bool {
        matches!(self, AbilityKind::Straight | AbilityKind::Unbound)
    }

    /// Candidate offsets for a pursuer, `None` for abilities pursuers cannot carry.
    pub fn pursuer_offsets(self) -> Option<&'static [GridPos]> {
        match self {
            AbilityKind::None | AbilityKind::Rest => Some(&CARDINAL_OFFSETS),
            AbilityKind::Diagonal => Some(&DIAGONAL_OFFSETS),
            AbilityKind::Straight => Some(&STRAIGHT_OFFSETS),
            AbilityKind::LShape => Some(&KNIGHT_OFFSETS),
            AbilityKind::Unbound => None,
        }
    }
}

impl fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for AbilityKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "plain" => Ok(AbilityKind::None),
            "rest" | "turtle" => Ok(AbilityKind::Rest),
            "diagonal" | "ox" => Ok(AbilityKind::Diagonal),
            "straight" | "hawk" => Ok(AbilityKind::Straight),
            "lshape" | "l-shape" | "fox" => Ok(AbilityKind::LShape),
            "unbound" | "dragon" => Ok(AbilityKind::Unbound),
            _ => Err(()),
        }
    }
}
