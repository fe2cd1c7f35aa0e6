//! Timed spawns. Entries are sorted by tick once, then polled after every tick;
//! each entry warns at most once and spawns at most once.

use serde::{Deserialize, Serialize};

use crate::modules::ability::AbilityKind;
use crate::modules::engine::DEFAULT_SPRITE_BASE_ANGLE;
use crate::modules::grid::WorldPos;

pub const DEFAULT_WARNING_TICKS: u64 = 3;

fn default_warning_ticks() -> u64 {
    DEFAULT_WARNING_TICKS
}

fn default_sprite_base_angle() -> f32 {
    DEFAULT_SPRITE_BASE_ANGLE
}

/// What an entry brings into the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Prefab {
    Pursuer {
        #[serde(default)]
        ability: AbilityKind,
        #[serde(default = "default_sprite_base_angle")]
        sprite_base_angle: f32,
    },
    Collectible {
        ability: AbilityKind,
    },
}

impl Prefab {
    pub fn label(&self) -> String {
        match self {
            Prefab::Pursuer { ability, .. } => format!("{} pursuer", ability.mask_name()),
            Prefab::Collectible { ability } => format!("{} mask", ability.mask_name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub tick: u64,
    /// Rough world position; snapped to a cell when the entry fires.
    pub position: WorldPos,
    /// Ticks of advance notice; 0 disables the warning.
    #[serde(default = "default_warning_ticks")]
    pub warning_ticks: u64,
    pub prefab: Prefab,
    #[serde(skip)]
    warned: bool,
    #[serde(skip)]
    spawned: bool,
}

impl SpawnEntry {
    pub fn new(tick: u64, position: WorldPos, prefab: Prefab) -> Self {
        Self {
            tick,
            position,
            warning_ticks: DEFAULT_WARNING_TICKS,
            prefab,
            warned: false,
            spawned: false,
        }
    }

    pub fn with_warning(mut self, warning_ticks: u64) -> Self {
        self.warning_ticks = warning_ticks;
        self
    }

    pub fn is_spawned(&self) -> bool {
        self.spawned
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleAction {
    Warn { position: WorldPos, spawn_tick: u64 },
    Spawn { prefab: Prefab, position: WorldPos },
}

#[derive(Debug, Clone, Default)]
pub struct SpawnSchedule {
    entries: Vec<SpawnEntry>,
}

impl SpawnSchedule {
    /// Stable sort: entries sharing a tick keep their listed order.
    pub fn new(mut entries: Vec<SpawnEntry>) -> Self {
        entries.sort_by_key(|e| e.tick);
        Self { entries }
    }

    pub fn entries(&self) -> &[SpawnEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that have not spawned yet.
    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|e| !e.spawned).count()
    }

    /// Actions due at `tick`, in schedule order.
    pub fn poll(&mut self, tick: u64) -> Vec<ScheduleAction> {
        let mut actions = Vec::new();
        for entry in &mut self.entries {
            if entry.warning_ticks > 0
                && !entry.warned
                && tick + entry.warning_ticks >= entry.tick
            {
                entry.warned = true;
                actions.push(ScheduleAction::Warn {
                    position: entry.position,
                    spawn_tick: entry.tick,
                });
            }

            if !entry.spawned && tick >= entry.tick {
                entry.spawned = true;
                actions.push(ScheduleAction::Spawn {
                    prefab: entry.prefab,
                    position: entry.position,
                });
            }
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pursuer(ability: AbilityKind) -> Prefab {
        Prefab::Pursuer {
            ability,
            sprite_base_angle: 90.0,
        }
    }

    #[test]
    fn sorts_by_tick_keeping_ties_in_order() {
        let schedule = SpawnSchedule::new(vec![
            SpawnEntry::new(9, WorldPos::new(0.0, 0.0), pursuer(AbilityKind::Diagonal)),
            SpawnEntry::new(2, WorldPos::new(1.0, 0.0), pursuer(AbilityKind::Straight)),
            SpawnEntry::new(2, WorldPos::new(2.0, 0.0), pursuer(AbilityKind::LShape)),
        ]);
        let ticks: Vec<_> = schedule.entries().iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![2, 2, 9]);
        assert_eq!(schedule.entries()[0].position, WorldPos::new(1.0, 0.0));
        assert_eq!(schedule.entries()[1].position, WorldPos::new(2.0, 0.0));
    }

    #[test]
    fn warns_ahead_then_spawns_once() {
        let mut schedule = SpawnSchedule::new(vec![SpawnEntry::new(
            5,
            WorldPos::new(3.5, 1.5),
            pursuer(AbilityKind::Rest),
        )]);
        assert!(schedule.poll(1).is_empty());
        assert_eq!(
            schedule.poll(2),
            vec![ScheduleAction::Warn {
                position: WorldPos::new(3.5, 1.5),
                spawn_tick: 5
            }]
        );
        assert!(schedule.poll(3).is_empty());
        assert!(schedule.poll(4).is_empty());
        assert_eq!(
            schedule.poll(5),
            vec![ScheduleAction::Spawn {
                prefab: pursuer(AbilityKind::Rest),
                position: WorldPos::new(3.5, 1.5)
            }]
        );
        assert!(schedule.poll(6).is_empty());
        assert_eq!(schedule.pending(), 0);
    }

    #[test]
    fn zero_warning_disables_notice() {
        let entry = SpawnEntry::new(
            2,
            WorldPos::new(0.0, 0.0),
            Prefab::Collectible {
                ability: AbilityKind::Unbound,
            },
        )
        .with_warning(0);
        let mut schedule = SpawnSchedule::new(vec![entry]);
        assert!(schedule.poll(1).is_empty());
        assert!(matches!(
            schedule.poll(2).as_slice(),
            [ScheduleAction::Spawn { .. }]
        ));
    }

    #[test]
    fn late_poll_fires_warning_and_spawn_together() {
        let mut schedule = SpawnSchedule::new(vec![SpawnEntry::new(
            1,
            WorldPos::new(0.0, 0.0),
            pursuer(AbilityKind::None),
        )]);
        let actions = schedule.poll(4);
        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], ScheduleAction::Warn { spawn_tick: 1, .. }));
        assert!(matches!(actions[1], ScheduleAction::Spawn { .. }));
    }

    #[test]
    fn entries_parse_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            spawns: Vec<SpawnEntry>,
        }
        let text = r#"
            [[spawns]]
            tick = 10
            position = { x = 4, y = 2.5 }
            prefab = { kind = "pursuer", ability = "lshape" }

            [[spawns]]
            tick = 3
            warning_ticks = 0
            position = { x = 1.0, y = 1.0 }
            prefab = { kind = "collectible", ability = "straight" }
        "#;
        let wrapper: Wrapper = toml::from_str(text).unwrap();
        assert_eq!(wrapper.spawns[0].warning_ticks, DEFAULT_WARNING_TICKS);
        assert_eq!(wrapper.spawns[0].position, WorldPos::new(4.0, 2.5));
        assert_eq!(
            wrapper.spawns[0].prefab,
            Prefab::Pursuer {
                ability: AbilityKind::LShape,
                sprite_base_angle: 90.0
            }
        );
        assert_eq!(
            wrapper.spawns[1].prefab,
            Prefab::Collectible {
                ability: AbilityKind::Straight
            }
        );
        assert_eq!(wrapper.spawns[1].warning_ticks, 0);
    }
}
