//! The matchmaking scan.

use duelforge_session::Registry;
use duelforge_transport::ConnectionId;

/// Finds an eligible opponent for `player`, or `None`.
///
/// Linear scan in registry (connection) order; the first candidate wins.
/// A candidate is eligible when it is another session that has confirmed
/// a name, is not currently battling, and is not blocked by rematch
/// avoidance in either direction.
///
/// Rematch avoidance is strict and symmetric: a pair that just fought
/// stays unmatched (both waiting) until a third party appears or an
/// intervening match overwrites one side's `last_opponent`.
pub fn find_opponent(
    registry: &Registry,
    player_id: ConnectionId,
) -> Option<ConnectionId> {
    let player = registry.get(player_id)?;
    registry.ids().into_iter().find(|&candidate_id| {
        if candidate_id == player_id {
            return false;
        }
        let Some(candidate) = registry.get(candidate_id) else {
            return false;
        };
        candidate.name_confirmed
            && !candidate.battle.is_in_battle()
            && player.last_opponent != Some(candidate_id)
            && candidate.last_opponent != Some(player_id)
    })
}

#[cfg(test)]
mod tests {
    use duelforge_session::{BattleState, Session};

    use super::*;

    fn id(n: u64) -> ConnectionId {
        ConnectionId::new(n)
    }

    fn waiting(n: u64, name: &str) -> Session {
        let mut s = Session::new(id(n), "127.0.0.1:4000".parse().unwrap());
        s.name = name.to_string();
        s.name_confirmed = true;
        s.battle = BattleState::Waiting;
        s
    }

    fn registry_of(sessions: Vec<Session>) -> Registry {
        let mut reg = Registry::new();
        for s in sessions {
            reg.add(s).expect("add");
        }
        reg
    }

    #[test]
    fn test_returns_first_eligible_in_connection_order() {
        let reg = registry_of(vec![
            waiting(1, "Ann"),
            waiting(2, "Bo"),
            waiting(3, "Cai"),
        ]);
        assert_eq!(find_opponent(&reg, id(3)), Some(id(1)));
    }

    #[test]
    fn test_never_returns_the_player_itself() {
        let reg = registry_of(vec![waiting(1, "Ann")]);
        assert_eq!(find_opponent(&reg, id(1)), None);
    }

    #[test]
    fn test_skips_unnamed_and_battling_sessions() {
        let mut unnamed = waiting(2, "");
        unnamed.name_confirmed = false;
        let mut battling = waiting(3, "Cai");
        battling.battle = BattleState::InBattle;
        let reg =
            registry_of(vec![waiting(1, "Ann"), unnamed, battling]);
        assert_eq!(find_opponent(&reg, id(1)), None);
    }

    #[test]
    fn test_rematch_avoidance_is_symmetric() {
        let mut ann = waiting(1, "Ann");
        let mut bo = waiting(2, "Bo");
        ann.last_opponent = Some(id(2));
        bo.last_opponent = Some(id(1));
        let reg = registry_of(vec![ann, bo]);
        // Neither direction may pair them again straight away.
        assert_eq!(find_opponent(&reg, id(1)), None);
        assert_eq!(find_opponent(&reg, id(2)), None);
    }

    #[test]
    fn test_one_sided_link_still_blocks() {
        // Only the candidate remembers the player; the pair is still
        // blocked (the check is symmetric over both links).
        let ann = waiting(1, "Ann");
        let mut bo = waiting(2, "Bo");
        bo.last_opponent = Some(id(1));
        let reg = registry_of(vec![ann, bo]);
        assert_eq!(find_opponent(&reg, id(1)), None);
    }

    #[test]
    fn test_third_party_breaks_the_deadlock() {
        let mut ann = waiting(1, "Ann");
        let mut bo = waiting(2, "Bo");
        ann.last_opponent = Some(id(2));
        bo.last_opponent = Some(id(1));
        let reg =
            registry_of(vec![ann, bo, waiting(3, "Cai")]);
        assert_eq!(find_opponent(&reg, id(1)), Some(id(3)));
        assert_eq!(find_opponent(&reg, id(2)), Some(id(3)));
    }

    #[test]
    fn test_unknown_player_finds_nothing() {
        let reg = registry_of(vec![waiting(1, "Ann")]);
        assert_eq!(find_opponent(&reg, id(42)), None);
    }
}
