//! Player state and effect application.

use serde::{Deserialize, Serialize};

use crate::scene::Effect;

/// Mutable player state, owned by the game session.
///
/// Health is never clamped: a negative value is exactly what the
/// session's death check looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub health: i32,
    pub gold: i32,
    /// Item names collected so far, append-only during play.
    pub inventory: Vec<String>,
    /// Number of accepted choices so far.
    pub step: u32,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            health: 100,
            gold: 0,
            inventory: Vec::new(),
            step: 0,
        }
    }

    /// Apply a choice effect: additive health/gold, append-only inventory,
    /// and one more accepted step.
    pub fn apply(&mut self, effect: &Effect) {
        self.health += effect.health;
        self.gold += effect.gold;
        self.inventory.extend(effect.items.iter().cloned());
        self.step += 1;
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// One-line snapshot embedded in prompt messages.
    pub fn summary(&self) -> String {
        let inventory = if self.inventory.is_empty() {
            "none".to_string()
        } else {
            self.inventory.join(", ")
        };
        format!(
            "health {}, gold {}, inventory [{}], step {}",
            self.health, self.gold, inventory, self.step
        )
    }

    /// Stat block appended to terminal scenes.
    pub fn final_stats(&self) -> String {
        let inventory = if self.inventory.is_empty() {
            "None".to_string()
        } else {
            self.inventory.join(", ")
        };
        format!(
            "Final Stats:\nHealth: {}\nGold: {}\nInventory: {}",
            self.health, self.gold, inventory
        )
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}
