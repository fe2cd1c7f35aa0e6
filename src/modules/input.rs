//! Input buffering and vote resolution for the controlled actor.
//!
//! Raw presses collect in a short FIFO buffer. Opposite presses annihilate,
//! and once per tick the buffer is tallied into a primary and a secondary
//! direction that the current ability expands into a step sequence.

use std::collections::VecDeque;

use crate::modules::ability::{AbilityKind, Direction};
use crate::modules::grid::GridPos;

pub const DEFAULT_BUFFER_CAPACITY: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputBuffer {
    entries: VecDeque<Direction>,
    capacity: usize,
}

impl InputBuffer {
    /// Capacity is clamped to at least one slot.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Direction> {
        self.iter().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn replace(&mut self, dir: Direction) {
        self.entries.clear();
        self.entries.push_back(dir);
    }

    /// Cancels the most recent opposite press if there is one, otherwise appends
    /// and evicts the oldest entry on overflow.
    pub fn vote(&mut self, dir: Direction) {
        let opposite = dir.opposite();
        if let Some(idx) = self.entries.iter().rposition(|d| *d == opposite) {
            self.entries.remove(idx);
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(dir);
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovementPattern {
    steps: Vec<Direction>,
}

impl MovementPattern {
    pub fn new(steps: Vec<Direction>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Direction] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Displacement the tick actually applies.
    pub fn net(&self) -> GridPos {
        self.steps
            .iter()
            .fold(GridPos::origin(), |acc, dir| acc + dir.delta())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vote {
    pub primary: Direction,
    pub secondary: Direction,
}

/// Tallies the buffer. Ties on the top count go to whichever direction was
/// pressed first; the same rule picks among secondary candidates.
pub fn tally(buffer: &InputBuffer) -> Option<Vote> {
    let mut counts = [0usize; 4];
    for dir in buffer.iter() {
        counts[dir.index()] += 1;
    }
    let max_votes = counts.iter().copied().max().unwrap_or(0);
    let primary = buffer.iter().find(|d| counts[d.index()] == max_votes)?;

    let mut secondary: Option<Direction> = None;
    for dir in buffer.iter().filter(|d| *d != primary) {
        match secondary {
            Some(best) if counts[best.index()] >= counts[dir.index()] => {}
            _ => secondary = Some(dir),
        }
    }

    Some(Vote {
        primary,
        secondary: secondary.unwrap_or_else(|| primary.ccw()),
    })
}

/// Expands the buffered votes into the step sequence for `ability`.
pub fn expand(ability: AbilityKind, buffer: &InputBuffer) -> MovementPattern {
    let Some(Vote { primary, secondary }) = tally(buffer) else {
        return MovementPattern::default();
    };
    let steps = match ability {
        AbilityKind::None | AbilityKind::Rest => vec![primary],
        AbilityKind::Diagonal => vec![primary, secondary],
        AbilityKind::Straight => vec![primary, primary],
        AbilityKind::LShape => vec![primary, primary, secondary],
        AbilityKind::Unbound => buffer.to_vec(),
    };
    MovementPattern::new(steps)
}

/// Buffer plus the pattern predicted from it; owned by a controlled actor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    buffer: InputBuffer,
    pattern: MovementPattern,
}

impl Controls {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: InputBuffer::new(capacity),
            pattern: MovementPattern::default(),
        }
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub fn pattern(&self) -> &MovementPattern {
        &self.pattern
    }

    pub fn add_input(&mut self, dir: Direction, ability: AbilityKind) {
        if ability.is_unbuffered() {
            self.buffer.replace(dir);
        } else {
            self.buffer.vote(dir);
        }
        self.recompute(ability);
    }

    pub fn recompute(&mut self, ability: AbilityKind) {
        self.pattern = expand(ability, &self.buffer);
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pattern.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::{Down, Left, Right, Up};

    fn controls_with(ability: AbilityKind, presses: &[Direction]) -> Controls {
        let mut controls = Controls::default();
        for dir in presses {
            controls.add_input(*dir, ability);
        }
        controls
    }

    #[test]
    fn opposite_press_cancels() {
        let controls = controls_with(AbilityKind::Diagonal, &[Up, Down]);
        assert!(controls.buffer().is_empty());
        assert!(controls.pattern().is_empty());
        assert_eq!(controls.pattern().net(), GridPos::origin());
    }

    #[test]
    fn cancellation_removes_most_recent_opposite() {
        let mut buffer = InputBuffer::new(3);
        buffer.vote(Up);
        buffer.vote(Left);
        buffer.vote(Up);
        buffer.vote(Down);
        assert_eq!(buffer.to_vec(), vec![Up, Left]);
    }

    #[test]
    fn first_pressed_wins_ties() {
        let controls = controls_with(AbilityKind::Diagonal, &[Up, Left]);
        assert_eq!(
            tally(controls.buffer()),
            Some(Vote {
                primary: Up,
                secondary: Left
            })
        );
        assert_eq!(controls.pattern().steps(), &[Up, Left]);
        assert_eq!(controls.pattern().net(), GridPos::new(-1, 1));
    }

    #[test]
    fn majority_beats_first_press() {
        let controls = controls_with(AbilityKind::LShape, &[Left, Up, Up]);
        assert_eq!(controls.pattern().steps(), &[Up, Up, Left]);
        assert_eq!(controls.pattern().net(), GridPos::new(-1, 2));
    }

    #[test]
    fn oldest_entry_is_evicted() {
        let controls = controls_with(AbilityKind::Straight, &[Up, Left, Left, Up]);
        assert_eq!(controls.buffer().to_vec(), vec![Left, Left, Up]);
        assert_eq!(controls.pattern().steps(), &[Left, Left]);
    }

    #[test]
    fn lone_vote_falls_back_to_ccw_secondary() {
        let controls = controls_with(AbilityKind::Diagonal, &[Right]);
        assert_eq!(controls.pattern().steps(), &[Right, Up]);
        let controls = controls_with(AbilityKind::LShape, &[Down, Down]);
        assert_eq!(controls.pattern().steps(), &[Down, Down, Right]);
    }

    #[test]
    fn unbuffered_abilities_keep_latest_press() {
        let controls = controls_with(AbilityKind::Rest, &[Up, Left, Down]);
        assert_eq!(controls.buffer().to_vec(), vec![Down]);
        assert_eq!(controls.pattern().steps(), &[Down]);
    }

    #[test]
    fn unbound_applies_every_press() {
        let controls = controls_with(AbilityKind::Unbound, &[Up, Right, Up]);
        assert_eq!(controls.pattern().net(), GridPos::new(1, 2));
    }

    #[test]
    fn capacity_is_at_least_one() {
        let mut buffer = InputBuffer::new(0);
        buffer.vote(Up);
        buffer.vote(Left);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.to_vec(), vec![Left]);
    }

    #[test]
    fn reset_clears_prediction() {
        let mut controls = controls_with(AbilityKind::Straight, &[Right]);
        assert!(!controls.pattern().is_empty());
        controls.reset();
        assert!(controls.buffer().is_empty());
        assert!(controls.pattern().is_empty());
    }
}
