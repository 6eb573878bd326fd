//! Activity feed — a human-readable timeline derived from stored rows.
//!
//! The engine pushes nothing; joins, kills, removals, and game transitions
//! are all re-derived from the roster, the closed edges, and the group
//! timestamps. Reseed closures never appear in the feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  assignment::{Assignment, CloseReason},
  group::Group,
  player::{Player, PlayerStatus},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedEvent {
  PlayerJoined {
    player_id:    Uuid,
    display_name: String,
    at:           DateTime<Utc>,
  },
  Elimination {
    assassin_id:   Uuid,
    assassin_name: String,
    victim_id:     Uuid,
    victim_name:   String,
    dare_text:     String,
    at:            DateTime<Utc>,
  },
  MemberRemoved {
    player_id:    Uuid,
    display_name: String,
    at:           DateTime<Utc>,
  },
  GameStarted { at: DateTime<Utc> },
  GameEnded { at: DateTime<Utc> },
}

impl FeedEvent {
  pub fn at(&self) -> DateTime<Utc> {
    match self {
      Self::PlayerJoined { at, .. }
      | Self::Elimination { at, .. }
      | Self::MemberRemoved { at, .. }
      | Self::GameStarted { at }
      | Self::GameEnded { at } => *at,
    }
  }
}

/// Pick out the "kill edges": closed `eliminated` edges whose target is the
/// player who fell. Each elimination closes two edges at the same instant —
/// the assassin's (no back-reference) and the victim's outgoing one (carries
/// `replaced_by`). A terminal two-player kill leaves neither with a
/// back-reference, so the tie is broken on the victims' statuses.
fn kill_edges<'a>(
  assignments: &'a [Assignment],
  players:     &[Player],
) -> Vec<&'a Assignment> {
  let status_of = |id: Uuid| {
    players
      .iter()
      .find(|p| p.player_id == id)
      .map(|p| p.status)
  };

  let mut kills = Vec::new();
  for edge in assignments {
    let Some(closure) = &edge.closure else { continue };
    if closure.reason != CloseReason::Eliminated
      || closure.replaced_by.is_some()
    {
      continue;
    }

    let companion = assignments.iter().find(|other| {
      other.assignment_id != edge.assignment_id
        && other.assassin_id == edge.target_id
        && other
          .closure
          .as_ref()
          .is_some_and(|c| c.reason == CloseReason::Eliminated && c.at == closure.at)
    });

    let is_kill = match companion {
      None => true,
      Some(other) => match &other.closure {
        Some(c) if c.replaced_by.is_some() => true,
        _ => {
          // Terminal pair: both edges look alike. The kill edge is the one
          // whose target actually left the ring.
          let ours = status_of(edge.target_id);
          let theirs = status_of(other.target_id);
          match (ours, theirs) {
            (Some(PlayerStatus::Eliminated), Some(PlayerStatus::Eliminated))
            | (None, None) => edge.assignment_id < other.assignment_id,
            (Some(PlayerStatus::Eliminated), _) => true,
            (_, Some(PlayerStatus::Eliminated)) => false,
            _ => edge.assignment_id < other.assignment_id,
          }
        }
      },
    };

    if is_kill {
      kills.push(edge);
    }
  }
  kills
}

/// Build the full timeline for a group, newest first.
pub fn build_feed(
  group:       &Group,
  players:     &[Player],
  assignments: &[Assignment],
) -> Vec<FeedEvent> {
  let name_of = |id: Uuid| {
    players
      .iter()
      .find(|p| p.player_id == id)
      .map(|p| p.display_name.clone())
      .unwrap_or_else(|| "?".to_string())
  };

  let mut events = Vec::new();

  for player in players {
    events.push(FeedEvent::PlayerJoined {
      player_id:    player.player_id,
      display_name: player.display_name.clone(),
      at:           player.created_at,
    });
  }

  for edge in kill_edges(assignments, players) {
    let Some(closure) = &edge.closure else { continue };
    events.push(FeedEvent::Elimination {
      assassin_id:   edge.assassin_id,
      assassin_name: name_of(edge.assassin_id),
      victim_id:     edge.target_id,
      victim_name:   name_of(edge.target_id),
      dare_text:     edge.dare_text.clone(),
      at:            closure.at,
    });
  }

  for edge in assignments {
    let Some(closure) = &edge.closure else { continue };
    if closure.reason == CloseReason::Removed && closure.replaced_by.is_none()
    {
      events.push(FeedEvent::MemberRemoved {
        player_id:    edge.target_id,
        display_name: name_of(edge.target_id),
        at:           closure.at,
      });
    }
  }

  if let Some(at) = group.started_at {
    events.push(FeedEvent::GameStarted { at });
  }
  if let Some(at) = group.ended_at {
    events.push(FeedEvent::GameEnded { at });
  }

  events.sort_by_key(|e| std::cmp::Reverse(e.at()));
  events
}

/// Kills per assassin, derived from the same ledger scan as the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillCount {
  pub player_id:    Uuid,
  pub display_name: String,
  pub kills:        u32,
}

pub fn kill_counts(
  players:     &[Player],
  assignments: &[Assignment],
) -> Vec<KillCount> {
  let kills = kill_edges(assignments, players);
  players
    .iter()
    .map(|p| KillCount {
      player_id:    p.player_id,
      display_name: p.display_name.clone(),
      kills:        kills
        .iter()
        .filter(|e| e.assassin_id == p.player_id)
        .count() as u32,
    })
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{assignment::Closure, group::GameStatus};

  fn group() -> Group {
    Group {
      group_id:   Uuid::new_v4(),
      name:       "g".into(),
      status:     GameStatus::Active,
      created_at: Utc::now(),
      started_at: None,
      ended_at:   None,
    }
  }

  fn player(group_id: Uuid, name: &str, status: PlayerStatus) -> Player {
    Player {
      player_id: Uuid::new_v4(),
      group_id,
      display_name: name.into(),
      status,
      owner_profile_id: None,
      created_at: Utc::now(),
      deactivated_at: None,
    }
  }

  fn closed(
    group_id: Uuid,
    assassin: Uuid,
    target: Uuid,
    reason: CloseReason,
    at: DateTime<Utc>,
    replaced_by: Option<Uuid>,
  ) -> Assignment {
    Assignment {
      assignment_id: Uuid::new_v4(),
      group_id,
      assassin_id: assassin,
      target_id: target,
      dare_text: "dare".into(),
      created_at: at,
      closure: Some(Closure { reason, at, replaced_by }),
    }
  }

  #[test]
  fn normal_elimination_yields_one_event_for_the_kill_edge() {
    let g = group();
    let a = player(g.group_id, "a", PlayerStatus::Active);
    let v = player(g.group_id, "v", PlayerStatus::Eliminated);
    let n = player(g.group_id, "n", PlayerStatus::Active);
    let at = Utc::now();
    let new_id = Uuid::new_v4();
    let edges = vec![
      closed(g.group_id, a.player_id, v.player_id, CloseReason::Eliminated, at, None),
      closed(g.group_id, v.player_id, n.player_id, CloseReason::Eliminated, at, Some(new_id)),
    ];
    let players = vec![a.clone(), v.clone(), n];

    let feed = build_feed(&g, &players, &edges);
    let kills: Vec<_> = feed
      .iter()
      .filter(|e| matches!(e, FeedEvent::Elimination { .. }))
      .collect();

    assert_eq!(kills.len(), 1);
    assert!(matches!(
      kills[0],
      FeedEvent::Elimination { assassin_id, victim_id, .. }
        if *assassin_id == a.player_id && *victim_id == v.player_id
    ));
  }

  #[test]
  fn terminal_pair_yields_one_event_for_the_real_victim() {
    let g = group();
    let a = player(g.group_id, "a", PlayerStatus::Active);
    let v = player(g.group_id, "v", PlayerStatus::Eliminated);
    let at = Utc::now();
    let edges = vec![
      closed(g.group_id, a.player_id, v.player_id, CloseReason::Eliminated, at, None),
      closed(g.group_id, v.player_id, a.player_id, CloseReason::Eliminated, at, None),
    ];
    let players = vec![a.clone(), v.clone()];

    let feed = build_feed(&g, &players, &edges);
    let kills: Vec<_> = feed
      .iter()
      .filter(|e| matches!(e, FeedEvent::Elimination { .. }))
      .collect();

    assert_eq!(kills.len(), 1);
    assert!(matches!(
      kills[0],
      FeedEvent::Elimination { assassin_id, victim_id, .. }
        if *assassin_id == a.player_id && *victim_id == v.player_id
    ));
  }

  #[test]
  fn reseed_closures_never_appear() {
    let g = group();
    let a = player(g.group_id, "a", PlayerStatus::Active);
    let b = player(g.group_id, "b", PlayerStatus::Active);
    let at = Utc::now();
    let edges = vec![closed(
      g.group_id,
      a.player_id,
      b.player_id,
      CloseReason::Reseed,
      at,
      None,
    )];
    let players = vec![a, b];

    let feed = build_feed(&g, &players, &edges);
    assert!(
      feed
        .iter()
        .all(|e| matches!(e, FeedEvent::PlayerJoined { .. }))
    );
  }

  #[test]
  fn removal_emits_member_removed_not_elimination() {
    let g = group();
    let b = player(g.group_id, "b", PlayerStatus::Active);
    let c = player(g.group_id, "c", PlayerStatus::Removed);
    let d = player(g.group_id, "d", PlayerStatus::Active);
    let at = Utc::now();
    let new_id = Uuid::new_v4();
    let edges = vec![
      closed(g.group_id, b.player_id, c.player_id, CloseReason::Removed, at, None),
      closed(g.group_id, c.player_id, d.player_id, CloseReason::Removed, at, Some(new_id)),
    ];
    let players = vec![b, c.clone(), d];

    let feed = build_feed(&g, &players, &edges);
    let removed: Vec<_> = feed
      .iter()
      .filter(|e| matches!(e, FeedEvent::MemberRemoved { .. }))
      .collect();

    assert_eq!(removed.len(), 1);
    assert!(
      feed
        .iter()
        .all(|e| !matches!(e, FeedEvent::Elimination { .. }))
    );
    assert!(matches!(
      removed[0],
      FeedEvent::MemberRemoved { player_id, .. } if *player_id == c.player_id
    ));
  }

  #[test]
  fn kill_counts_follow_the_ledger() {
    let g = group();
    let a = player(g.group_id, "a", PlayerStatus::Active);
    let v = player(g.group_id, "v", PlayerStatus::Eliminated);
    let n = player(g.group_id, "n", PlayerStatus::Active);
    let at = Utc::now();
    let new_id = Uuid::new_v4();
    let edges = vec![
      closed(g.group_id, a.player_id, v.player_id, CloseReason::Eliminated, at, None),
      closed(g.group_id, v.player_id, n.player_id, CloseReason::Eliminated, at, Some(new_id)),
    ];
    let players = vec![a.clone(), v, n];

    let counts = kill_counts(&players, &edges);
    let a_count = counts
      .iter()
      .find(|c| c.player_id == a.player_id)
      .map(|c| c.kills);
    assert_eq!(a_count, Some(1));
    assert!(
      counts
        .iter()
        .filter(|c| c.player_id != a.player_id)
        .all(|c| c.kills == 0)
    );
  }
}
