//! Battle configuration.

use std::time::Duration;

use tracing::warn;

/// Tunable battle parameters.
///
/// The defaults are the canonical rules: 20–30 starting hitpoints, 1–3
/// power moves, 2–6 basic damage tripled on a landed power move, and a
/// 30-second turn limit. Tests narrow the ranges (e.g. `powermoves_min
/// == powermoves_max`) to make stat rolls deterministic.
#[derive(Debug, Clone)]
pub struct BattleConfig {
    /// Inclusive range for starting hitpoints.
    pub hitpoints_min: i32,
    pub hitpoints_max: i32,

    /// Inclusive range for starting power moves.
    pub powermoves_min: u8,
    pub powermoves_max: u8,

    /// Inclusive range for a basic attack's damage.
    pub damage_min: i32,
    pub damage_max: i32,

    /// A landed power move deals `power_multiplier` times a basic roll.
    pub power_multiplier: i32,

    /// How long the active player has to act before the turn is forced
    /// to the opponent with zero damage.
    pub turn_limit: Duration,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            hitpoints_min: 20,
            hitpoints_max: 30,
            powermoves_min: 1,
            powermoves_max: 3,
            damage_min: 2,
            damage_max: 6,
            power_multiplier: 3,
            turn_limit: Duration::from_secs(30),
        }
    }
}

impl BattleConfig {
    /// Fixes any inverted ranges so the config is safe to roll from.
    ///
    /// Called by [`Arena::new`](crate::Arena::new); an inverted range
    /// would otherwise panic inside `random_range`.
    pub fn validated(mut self) -> Self {
        if self.hitpoints_min > self.hitpoints_max {
            warn!(
                min = self.hitpoints_min,
                max = self.hitpoints_max,
                "inverted hitpoints range, swapping"
            );
            std::mem::swap(&mut self.hitpoints_min, &mut self.hitpoints_max);
        }
        if self.powermoves_min > self.powermoves_max {
            warn!(
                min = self.powermoves_min,
                max = self.powermoves_max,
                "inverted powermoves range, swapping"
            );
            std::mem::swap(&mut self.powermoves_min, &mut self.powermoves_max);
        }
        if self.damage_min > self.damage_max {
            warn!(
                min = self.damage_min,
                max = self.damage_max,
                "inverted damage range, swapping"
            );
            std::mem::swap(&mut self.damage_min, &mut self.damage_max);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_canonical_rules() {
        let config = BattleConfig::default();
        assert_eq!(config.hitpoints_min, 20);
        assert_eq!(config.hitpoints_max, 30);
        assert_eq!(config.powermoves_min, 1);
        assert_eq!(config.powermoves_max, 3);
        assert_eq!(config.damage_min, 2);
        assert_eq!(config.damage_max, 6);
        assert_eq!(config.power_multiplier, 3);
        assert_eq!(config.turn_limit, Duration::from_secs(30));
    }

    #[test]
    fn test_validated_fixes_inverted_ranges() {
        let config = BattleConfig {
            hitpoints_min: 30,
            hitpoints_max: 20,
            damage_min: 6,
            damage_max: 2,
            ..BattleConfig::default()
        }
        .validated();
        assert!(config.hitpoints_min <= config.hitpoints_max);
        assert!(config.damage_min <= config.damage_max);
    }
}
