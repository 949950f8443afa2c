//! Battle-end rule

use serde::{Deserialize, Serialize};

use crate::combat::roster::Roster;
use crate::core::types::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleResult {
    Victory,
    Defeat,
}

/// Check whether the battle is over, from the allies' point of view
///
/// A simultaneous wipe of both sides counts as a defeat; there is no draw.
pub fn check_battle_end(roster: &Roster) -> Option<BattleResult> {
    let allies_alive = roster.any_alive(Side::Ally);
    let enemies_alive = roster.any_alive(Side::Enemy);

    match (allies_alive, enemies_alive) {
        (false, _) => Some(BattleResult::Defeat),
        (true, false) => Some(BattleResult::Victory),
        (true, true) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::combatant::{Combatant, Health};
    use crate::core::types::ActorId;

    fn roster(allies_dead: bool, enemies_dead: bool) -> Roster {
        let mut roster = Roster::from_combatants([
            Combatant::test_fighter(ActorId(1), Side::Ally),
            Combatant::test_fighter(ActorId(2), Side::Ally),
            Combatant::test_fighter(ActorId(10), Side::Enemy),
            Combatant::test_fighter(ActorId(11), Side::Enemy),
        ]);
        for combatant in roster.iter_mut() {
            let dead = match combatant.side {
                Side::Ally => allies_dead,
                Side::Enemy => enemies_dead,
            };
            if dead {
                combatant.health = Health::with_damage(100, 40, 60);
            }
        }
        roster
    }

    #[test]
    fn test_enemies_wiped_is_victory() {
        assert_eq!(check_battle_end(&roster(false, true)), Some(BattleResult::Victory));
    }

    #[test]
    fn test_allies_wiped_is_defeat() {
        assert_eq!(check_battle_end(&roster(true, false)), Some(BattleResult::Defeat));
    }

    #[test]
    fn test_double_wipe_is_defeat() {
        assert_eq!(check_battle_end(&roster(true, true)), Some(BattleResult::Defeat));
    }

    #[test]
    fn test_both_standing_continues() {
        assert_eq!(check_battle_end(&roster(false, false)), None);
    }
}
