//! Integration tests for `SqliteStore` against an in-memory database.

use quarry_core::{
  dare::{Difficulty, NewDareTemplate},
  feed::FeedEvent,
  group::GameStatus,
  player::PlayerStatus,
  ring::RingEdge,
  store::{PlayerFilter, RingStore},
  view::AssignmentView,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Create a group with `names.len()` players, in roster order.
async fn group_with_players(
  s: &SqliteStore,
  names: &[&str],
) -> (Uuid, Vec<Uuid>) {
  let group = s.create_group("test ring".into()).await.unwrap();
  let mut ids = Vec::new();
  for name in names {
    let p = s
      .add_player(group.group_id, name.to_string(), None)
      .await
      .unwrap();
    ids.push(p.player_id);
  }
  (group.group_id, ids)
}

fn core_err(err: Error) -> quarry_core::Error {
  match err {
    Error::Core(e) => e,
    other => panic!("expected core error, got: {other}"),
  }
}

// ─── Groups and roster ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_group() {
  let s = store().await;

  let group = s.create_group("kings cup".into()).await.unwrap();
  assert_eq!(group.status, GameStatus::Lobby);

  let fetched = s.get_group(group.group_id).await.unwrap().unwrap();
  assert_eq!(fetched.group_id, group.group_id);
  assert_eq!(fetched.name, "kings cup");
  assert!(fetched.started_at.is_none());
}

#[tokio::test]
async fn get_group_missing_returns_none() {
  let s = store().await;
  assert!(s.get_group(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn players_join_as_waiting() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["ada", "bo"]).await;

  let players = s.list_players(group_id, PlayerFilter::All).await.unwrap();
  assert_eq!(players.len(), 2);
  assert!(players.iter().all(|p| p.status == PlayerStatus::Waiting));
  assert_eq!(players[0].player_id, ids[0]);
}

#[tokio::test]
async fn add_player_to_unknown_group_fails() {
  let s = store().await;
  let err = s
    .add_player(Uuid::new_v4(), "ghost".into(), None)
    .await
    .unwrap_err();
  assert!(matches!(
    core_err(err),
    quarry_core::Error::GroupNotFound(_)
  ));
}

#[tokio::test]
async fn claim_player_attaches_owner() {
  let s = store().await;
  let (_, ids) = group_with_players(&s, &["ada"]).await;
  let profile = Uuid::new_v4();

  let claimed = s.claim_player(ids[0], profile).await.unwrap();
  assert_eq!(claimed.owner_profile_id, Some(profile));

  let unclaimed = s
    .list_players(claimed.group_id, PlayerFilter::Unclaimed)
    .await
    .unwrap();
  assert!(unclaimed.is_empty());
}

// ─── Seed ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_needs_two_players() {
  let s = store().await;
  let (group_id, _) = group_with_players(&s, &["ada"]).await;

  let err = s.seed_ring(group_id).await.unwrap_err();
  assert!(matches!(
    core_err(err),
    quarry_core::Error::InsufficientPlayers { have: 1 }
  ));
}

#[tokio::test]
async fn seed_builds_ring_in_roster_order() {
  let s = store().await;
  let (group_id, ids) =
    group_with_players(&s, &["a", "b", "c", "d"]).await;

  let edges = s.seed_ring(group_id).await.unwrap();
  assert_eq!(edges.len(), 4);
  for (i, edge) in edges.iter().enumerate() {
    assert_eq!(edge.assassin_id, ids[i]);
    assert_eq!(edge.target_id, ids[(i + 1) % 4]);
  }

  let audit = s.audit_ring(group_id).await.unwrap();
  assert!(audit.valid);
  assert_eq!(audit.players, 4);
  assert_eq!(audit.edges, 4);

  let group = s.get_group(group_id).await.unwrap().unwrap();
  assert_eq!(group.status, GameStatus::Active);
  assert!(group.started_at.is_some());

  let players = s.list_players(group_id, PlayerFilter::All).await.unwrap();
  assert!(players.iter().all(|p| p.status == PlayerStatus::Active));
}

#[tokio::test]
async fn seed_without_templates_uses_placeholder_dare() {
  let s = store().await;
  let (group_id, _) = group_with_players(&s, &["a", "b"]).await;

  let edges = s.seed_ring(group_id).await.unwrap();
  assert!(edges.iter().all(|e| e.dare_text == "Be creative!"));
}

#[tokio::test]
async fn seed_personalizes_template_dares() {
  let s = store().await;
  let (group_id, _) = group_with_players(&s, &["ada", "bo"]).await;
  s.add_dare_template(NewDareTemplate {
    group_id,
    text: "serenade your target".into(),
    difficulty: Difficulty::Easy,
    tags: vec![],
  })
  .await
  .unwrap();

  let edges = s.seed_ring(group_id).await.unwrap();
  // ada hunts bo and vice versa; each dare names the actual target.
  let by_assassin: Vec<_> = edges
    .iter()
    .map(|e| e.dare_text.clone())
    .collect();
  assert_eq!(by_assassin, vec!["serenade bo", "serenade ada"]);
}

#[tokio::test]
async fn reseeding_over_live_ring_closes_old_edges_as_reseed() {
  let s = store().await;
  let (group_id, _) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();
  s.seed_ring(group_id).await.unwrap();

  let all = s.assignments(group_id, true).await.unwrap();
  assert_eq!(all.len(), 6);
  let closed: Vec<_> = all.iter().filter(|e| !e.is_open()).collect();
  assert_eq!(closed.len(), 3);
  assert!(closed.iter().all(|e| {
    e.closure
      .as_ref()
      .is_some_and(|c| c.reason.to_string() == "reseed")
  }));

  assert!(s.audit_ring(group_id).await.unwrap().valid);
}

// ─── Reseed ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reseed_installs_admin_mapping() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();

  // Reverse the direction of the ring.
  let edges = vec![
    RingEdge { assassin_id: ids[0], target_id: ids[2], dare_text: "x".into() },
    RingEdge { assassin_id: ids[2], target_id: ids[1], dare_text: "y".into() },
    RingEdge { assassin_id: ids[1], target_id: ids[0], dare_text: "z".into() },
  ];
  let installed = s.reseed_ring(group_id, edges).await.unwrap();
  assert_eq!(installed.len(), 3);

  let ring = s.ring_edges(group_id).await.unwrap();
  let a_edge = ring.iter().find(|e| e.assassin_id == ids[0]).unwrap();
  assert_eq!(a_edge.target_id, ids[2]);
  assert!(s.audit_ring(group_id).await.unwrap().valid);
}

#[tokio::test]
async fn rejected_reseed_leaves_ring_untouched() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();
  let before = s.ring_edges(group_id).await.unwrap();

  // Both a and b hunt c: duplicate target.
  let bad = vec![
    RingEdge { assassin_id: ids[0], target_id: ids[2], dare_text: "".into() },
    RingEdge { assassin_id: ids[1], target_id: ids[2], dare_text: "".into() },
    RingEdge { assassin_id: ids[2], target_id: ids[0], dare_text: "".into() },
  ];
  let err = s.reseed_ring(group_id, bad).await.unwrap_err();
  assert_eq!(core_err(err).reason_code(), "duplicate_target");

  let after = s.ring_edges(group_id).await.unwrap();
  let ids_before: Vec<_> =
    before.iter().map(|e| e.assignment_id).collect();
  let ids_after: Vec<_> = after.iter().map(|e| e.assignment_id).collect();
  assert_eq!(ids_before, ids_after);
  assert!(s.audit_ring(group_id).await.unwrap().valid);
}

#[tokio::test]
async fn reseed_rejects_fragmented_mapping() {
  let s = store().await;
  let (group_id, ids) =
    group_with_players(&s, &["a", "b", "c", "d"]).await;
  s.seed_ring(group_id).await.unwrap();

  // Two disjoint 2-cycles: a permutation, but not one ring.
  let bad = vec![
    RingEdge { assassin_id: ids[0], target_id: ids[1], dare_text: "".into() },
    RingEdge { assassin_id: ids[1], target_id: ids[0], dare_text: "".into() },
    RingEdge { assassin_id: ids[2], target_id: ids[3], dare_text: "".into() },
    RingEdge { assassin_id: ids[3], target_id: ids[2], dare_text: "".into() },
  ];
  let err = s.reseed_ring(group_id, bad).await.unwrap_err();
  assert_eq!(core_err(err).reason_code(), "fragmented_ring");
}

#[tokio::test]
async fn reseed_can_resurrect_an_eliminated_player() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();
  s.eliminate(group_id, ids[0]).await.unwrap(); // a kills b

  let edges = vec![
    RingEdge { assassin_id: ids[0], target_id: ids[1], dare_text: "back".into() },
    RingEdge { assassin_id: ids[1], target_id: ids[2], dare_text: "in".into() },
    RingEdge { assassin_id: ids[2], target_id: ids[0], dare_text: "play".into() },
  ];
  s.reseed_ring(group_id, edges).await.unwrap();

  let b = s.get_player(ids[1]).await.unwrap().unwrap();
  assert_eq!(b.status, PlayerStatus::Active);
  assert!(s.audit_ring(group_id).await.unwrap().valid);
}

// ─── Eliminate ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn elimination_splices_the_ring() {
  // Seeded a→b→c→d→a; a eliminates b.
  let s = store().await;
  let (group_id, ids) =
    group_with_players(&s, &["a", "b", "c", "d"]).await;
  s.seed_ring(group_id).await.unwrap();

  let outcome = s.eliminate(group_id, ids[0]).await.unwrap();
  assert_eq!(outcome.victim_id, ids[1]);
  assert!(!outcome.game_over);
  let new_edge = outcome.new_assignment.unwrap();
  assert_eq!(new_edge.assassin_id, ids[0]);
  assert_eq!(new_edge.target_id, ids[2]);

  // Both retired edges carry reason 'eliminated'; the victim's outgoing one
  // back-references the spliced edge.
  let all = s.assignments(group_id, true).await.unwrap();
  let a_to_b = all
    .iter()
    .find(|e| e.assassin_id == ids[0] && e.target_id == ids[1])
    .unwrap();
  let b_to_c = all
    .iter()
    .find(|e| e.assassin_id == ids[1] && e.target_id == ids[2])
    .unwrap();
  assert_eq!(
    a_to_b.closure.as_ref().map(|c| c.reason.to_string()),
    Some("eliminated".into())
  );
  assert_eq!(
    b_to_c.closure.as_ref().and_then(|c| c.replaced_by),
    Some(new_edge.assignment_id)
  );

  let b = s.get_player(ids[1]).await.unwrap().unwrap();
  assert_eq!(b.status, PlayerStatus::Eliminated);
  assert!(b.deactivated_at.is_some());

  let audit = s.audit_ring(group_id).await.unwrap();
  assert!(audit.valid);
  assert_eq!(audit.players, 3);
}

#[tokio::test]
async fn victim_dare_is_inherited_by_default() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();
  s.edit_dare(group_id, ids[1], "b's dare".into()).await.unwrap();

  let outcome = s.eliminate(group_id, ids[0]).await.unwrap();
  assert_eq!(outcome.new_assignment.unwrap().dare_text, "b's dare");
}

#[tokio::test]
async fn eliminating_the_last_opponent_ends_the_game() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b"]).await;
  s.seed_ring(group_id).await.unwrap();

  let outcome = s.eliminate(group_id, ids[0]).await.unwrap();
  assert!(outcome.game_over);
  assert!(outcome.new_assignment.is_none());

  let group = s.get_group(group_id).await.unwrap().unwrap();
  assert_eq!(group.status, GameStatus::Ended);
  assert!(group.ended_at.is_some());

  assert!(s.ring_edges(group_id).await.unwrap().is_empty());
  assert!(s.audit_ring(group_id).await.unwrap().valid);

  let view = s.current_assignment(group_id, ids[0]).await.unwrap();
  assert_eq!(view, AssignmentView::Champion);
}

#[tokio::test]
async fn eliminated_player_cannot_eliminate() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();
  s.eliminate(group_id, ids[0]).await.unwrap(); // b is out

  let err = s.eliminate(group_id, ids[1]).await.unwrap_err();
  assert!(matches!(
    core_err(err),
    quarry_core::Error::NoActiveAssignment(id) if id == ids[1]
  ));
}

#[tokio::test]
async fn whole_round_runs_down_to_a_champion() {
  let s = store().await;
  let (group_id, ids) =
    group_with_players(&s, &["a", "b", "c", "d", "e"]).await;
  s.seed_ring(group_id).await.unwrap();

  // a takes everyone out in turn.
  for _ in 0..3 {
    let outcome = s.eliminate(group_id, ids[0]).await.unwrap();
    assert!(!outcome.game_over);
    assert!(s.audit_ring(group_id).await.unwrap().valid);
  }
  let last = s.eliminate(group_id, ids[0]).await.unwrap();
  assert!(last.game_over);

  let counts = s.kill_counts(group_id).await.unwrap();
  let a_kills = counts
    .iter()
    .find(|c| c.player_id == ids[0])
    .map(|c| c.kills);
  assert_eq!(a_kills, Some(4));
}

// ─── Remove member ───────────────────────────────────────────────────────────

#[tokio::test]
async fn removal_splices_without_kill_credit() {
  // a→b→c→d→a; remove c: b hunts d, no kill recorded for b.
  let s = store().await;
  let (group_id, ids) =
    group_with_players(&s, &["a", "b", "c", "d"]).await;
  s.seed_ring(group_id).await.unwrap();

  let outcome = s.remove_member(group_id, ids[2]).await.unwrap();
  assert_eq!(outcome.hunter_id, ids[1]);
  assert_eq!(outcome.new_assignment.target_id, ids[3]);

  let all = s.assignments(group_id, true).await.unwrap();
  let closed_removed: Vec<_> = all
    .iter()
    .filter(|e| {
      e.closure
        .as_ref()
        .is_some_and(|c| c.reason.to_string() == "removed")
    })
    .collect();
  assert_eq!(closed_removed.len(), 2);

  let c = s.get_player(ids[2]).await.unwrap().unwrap();
  assert_eq!(c.status, PlayerStatus::Removed);

  let counts = s.kill_counts(group_id).await.unwrap();
  assert!(counts.iter().all(|k| k.kills == 0));
  assert!(s.audit_ring(group_id).await.unwrap().valid);
}

#[tokio::test]
async fn removal_keeps_the_hunters_own_dare_by_default() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();
  s.edit_dare(group_id, ids[0], "a's own dare".into())
    .await
    .unwrap();

  let outcome = s.remove_member(group_id, ids[1]).await.unwrap();
  assert_eq!(outcome.new_assignment.dare_text, "a's own dare");
}

#[tokio::test]
async fn removing_from_two_player_ring_is_rejected() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b"]).await;
  s.seed_ring(group_id).await.unwrap();

  let err = s.remove_member(group_id, ids[1]).await.unwrap_err();
  assert!(matches!(
    core_err(err),
    quarry_core::Error::RingTooSmall { have: 2 }
  ));
  // Nothing changed.
  assert_eq!(s.ring_edges(group_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn removing_a_waiting_player_is_rejected() {
  let s = store().await;
  let (group_id, _ids) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();
  let late = s
    .add_player(group_id, "late joiner".into(), None)
    .await
    .unwrap();

  let err = s
    .remove_member(group_id, late.player_id)
    .await
    .unwrap_err();
  assert!(matches!(
    core_err(err),
    quarry_core::Error::NotActive(id) if id == late.player_id
  ));
}

// ─── Mid-game joins and restores ─────────────────────────────────────────────

#[tokio::test]
async fn mid_game_joiner_waits_outside_the_ring() {
  let s = store().await;
  let (group_id, _) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();

  let late = s.add_player(group_id, "late".into(), None).await.unwrap();
  assert_eq!(late.status, PlayerStatus::Waiting);

  // The live ring is untouched and still valid.
  let audit = s.audit_ring(group_id).await.unwrap();
  assert!(audit.valid);
  assert_eq!(audit.players, 3);

  let view = s
    .current_assignment(group_id, late.player_id)
    .await
    .unwrap();
  assert_eq!(view, AssignmentView::Waiting);
}

#[tokio::test]
async fn restored_player_returns_as_waiting() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();
  s.eliminate(group_id, ids[0]).await.unwrap(); // b is out

  let restored = s.restore_player(ids[1]).await.unwrap();
  assert_eq!(restored.status, PlayerStatus::Waiting);
  // The departure timestamp stays on record.
  assert!(restored.deactivated_at.is_some());

  // Still not in the ring until a reseed.
  assert!(s.audit_ring(group_id).await.unwrap().valid);
  let view = s.current_assignment(group_id, ids[1]).await.unwrap();
  assert_eq!(view, AssignmentView::Waiting);
}

// ─── Dare lifecycle ──────────────────────────────────────────────────────────

#[tokio::test]
async fn edit_dare_updates_open_edge_only() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b"]).await;
  s.seed_ring(group_id).await.unwrap();

  let updated = s
    .edit_dare(group_id, ids[0], "lick a lamppost".into())
    .await
    .unwrap();
  assert_eq!(updated.dare_text, "lick a lamppost");
  assert_eq!(updated.assassin_id, ids[0]);
}

#[tokio::test]
async fn edit_dare_without_assignment_fails() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b"]).await;

  let err = s
    .edit_dare(group_id, ids[0], "anything".into())
    .await
    .unwrap_err();
  assert!(matches!(
    core_err(err),
    quarry_core::Error::NoActiveAssignment(_)
  ));
}

#[tokio::test]
async fn dare_templates_round_trip() {
  let s = store().await;
  let (group_id, _) = group_with_players(&s, &["a", "b"]).await;

  let tmpl = s
    .add_dare_template(NewDareTemplate {
      group_id,
      text: "steal your target's hat".into(),
      difficulty: Difficulty::Hard,
      tags: vec!["public".into()],
    })
    .await
    .unwrap();

  let listed = s.list_dare_templates(group_id, true).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].template_id, tmpl.template_id);
  assert_eq!(listed[0].difficulty, Difficulty::Hard);
  assert_eq!(listed[0].tags, vec!["public".to_string()]);

  let off = s
    .set_dare_template_active(tmpl.template_id, false)
    .await
    .unwrap();
  assert!(!off.is_active);
  assert!(s.list_dare_templates(group_id, true).await.unwrap().is_empty());
  assert_eq!(s.list_dare_templates(group_id, false).await.unwrap().len(), 1);
}

// ─── Read models ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn current_assignment_shows_target_and_dare() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["ada", "bo"]).await;
  s.seed_ring(group_id).await.unwrap();
  s.edit_dare(group_id, ids[0], "wink at bo".into()).await.unwrap();

  let view = s.current_assignment(group_id, ids[0]).await.unwrap();
  match view {
    AssignmentView::Hunting { target_id, target_name, dare_text, .. } => {
      assert_eq!(target_id, ids[1]);
      assert_eq!(target_name, "bo");
      assert_eq!(dare_text, "wink at bo");
    }
    other => panic!("expected hunting view, got {other:?}"),
  }
}

#[tokio::test]
async fn eliminated_player_sees_out() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();
  s.eliminate(group_id, ids[0]).await.unwrap();

  let view = s.current_assignment(group_id, ids[1]).await.unwrap();
  assert_eq!(view, AssignmentView::Out);
}

#[tokio::test]
async fn feed_records_the_round() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["a", "b", "c"]).await;
  s.seed_ring(group_id).await.unwrap();
  s.eliminate(group_id, ids[0]).await.unwrap(); // a kills b
  s.seed_ring(group_id).await.unwrap(); // fresh round for the survivors

  let feed = s.feed(group_id).await.unwrap();

  let kills: Vec<_> = feed
    .iter()
    .filter_map(|e| match e {
      FeedEvent::Elimination { assassin_id, victim_id, .. } => {
        Some((*assassin_id, *victim_id))
      }
      _ => None,
    })
    .collect();
  assert_eq!(kills, vec![(ids[0], ids[1])]);

  let joins = feed
    .iter()
    .filter(|e| matches!(e, FeedEvent::PlayerJoined { .. }))
    .count();
  assert_eq!(joins, 3);

  assert!(
    feed
      .iter()
      .any(|e| matches!(e, FeedEvent::GameStarted { .. }))
  );
}

#[tokio::test]
async fn ring_edges_carry_display_names() {
  let s = store().await;
  let (group_id, ids) = group_with_players(&s, &["ada", "bo"]).await;
  s.seed_ring(group_id).await.unwrap();

  let ring = s.ring_edges(group_id).await.unwrap();
  let ada_edge = ring.iter().find(|e| e.assassin_id == ids[0]).unwrap();
  assert_eq!(ada_edge.assassin_name, "ada");
  assert_eq!(ada_edge.target_name, "bo");
}

#[tokio::test]
async fn audit_on_unknown_group_fails() {
  let s = store().await;
  let err = s.audit_ring(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    core_err(err),
    quarry_core::Error::GroupNotFound(_)
  ));
}
