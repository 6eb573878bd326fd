//! [`SqliteStore`] — the SQLite implementation of [`RingStore`].

use std::{collections::BTreeSet, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use quarry_core::{
  assignment::Assignment,
  dare::{self, DareTemplate, NewDareTemplate},
  feed::{self, FeedEvent, KillCount},
  group::{GameStatus, Group},
  plan::{
    self, DarePolicy, Elimination, GameTransition, MutationPlan, Removal,
    RingSnapshot,
  },
  player::{Player, PlayerStatus},
  ring::{self, RingAudit, RingEdge, RingViolation},
  store::{PlayerFilter, RingStore},
  view::{self, AssignmentView, NamedEdge},
};

use crate::{
  Error, Result,
  encode::{
    RawAssignment, RawGroup, RawPlayer, RawTemplate, encode_dt, encode_tags,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quarry game store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// mutations run on the connection's dedicated thread inside an immediate
/// transaction, so they are serialized and atomic.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  policy: DarePolicy,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, policy: DarePolicy::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, policy: DarePolicy::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Override the dare-inheritance policy used by eliminate/remove splices.
  pub fn with_dare_policy(mut self, policy: DarePolicy) -> Self {
    self.policy = policy;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread, carrying our error type through the
  /// `tokio_rusqlite` boundary intact.
  async fn call_store<T>(
    &self,
    f: impl FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
  ) -> Result<T>
  where
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        f(conn).map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
      })
      .await
      .map_err(|e| match e {
        tokio_rusqlite::Error::Other(inner) => {
          match inner.downcast::<Error>() {
            Ok(ours) => *ours,
            Err(other) => {
              Error::Database(tokio_rusqlite::Error::Other(other))
            }
          }
        }
        other => Error::from(other),
      })
  }
}

// ─── Row loading (connection thread) ─────────────────────────────────────────

fn load_group(conn: &rusqlite::Connection, group_id: Uuid) -> Result<Group> {
  get_group_row(conn, group_id)?
    .ok_or(Error::Core(quarry_core::Error::GroupNotFound(group_id)))
}

fn get_group_row(
  conn:     &rusqlite::Connection,
  group_id: Uuid,
) -> Result<Option<Group>> {
  let raw = conn
    .query_row(
      "SELECT group_id, name, status, created_at, started_at, ended_at
         FROM groups WHERE group_id = ?1",
      rusqlite::params![encode_uuid(group_id)],
      |row| {
        Ok(RawGroup {
          group_id:   row.get(0)?,
          name:       row.get(1)?,
          status:     row.get(2)?,
          created_at: row.get(3)?,
          started_at: row.get(4)?,
          ended_at:   row.get(5)?,
        })
      },
    )
    .optional()?;

  raw.map(RawGroup::into_group).transpose()
}

const PLAYER_COLUMNS: &str = "player_id, group_id, display_name, status, \
                              owner_profile_id, created_at, deactivated_at";

fn player_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPlayer> {
  Ok(RawPlayer {
    player_id:        row.get(0)?,
    group_id:         row.get(1)?,
    display_name:     row.get(2)?,
    status:           row.get(3)?,
    owner_profile_id: row.get(4)?,
    created_at:       row.get(5)?,
    deactivated_at:   row.get(6)?,
  })
}

fn load_players(
  conn:     &rusqlite::Connection,
  group_id: Uuid,
) -> Result<Vec<Player>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PLAYER_COLUMNS} FROM players
      WHERE group_id = ?1
      ORDER BY created_at, player_id"
  ))?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(group_id)], player_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawPlayer::into_player).collect()
}

fn get_player_row(
  conn:      &rusqlite::Connection,
  player_id: Uuid,
) -> Result<Option<Player>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = ?1"),
      rusqlite::params![encode_uuid(player_id)],
      player_from_row,
    )
    .optional()?;

  raw.map(RawPlayer::into_player).transpose()
}

const ASSIGNMENT_COLUMNS: &str =
  "assignment_id, group_id, assassin_id, target_id, dare_text, created_at, \
   closed_at, reason_closed, replaced_by";

fn assignment_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawAssignment> {
  Ok(RawAssignment {
    assignment_id: row.get(0)?,
    group_id:      row.get(1)?,
    assassin_id:   row.get(2)?,
    target_id:     row.get(3)?,
    dare_text:     row.get(4)?,
    created_at:    row.get(5)?,
    closed_at:     row.get(6)?,
    reason_closed: row.get(7)?,
    replaced_by:   row.get(8)?,
  })
}

fn load_assignments(
  conn:      &rusqlite::Connection,
  group_id:  Uuid,
  only_open: bool,
) -> Result<Vec<Assignment>> {
  let filter = if only_open { "AND closed_at IS NULL" } else { "" };
  let mut stmt = conn.prepare(&format!(
    "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
      WHERE group_id = ?1 {filter}
      ORDER BY created_at, assignment_id"
  ))?;
  let raws = stmt
    .query_map(
      rusqlite::params![encode_uuid(group_id)],
      assignment_from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawAssignment::into_assignment).collect()
}

fn load_snapshot(
  conn:     &rusqlite::Connection,
  group_id: Uuid,
) -> Result<RingSnapshot> {
  Ok(RingSnapshot {
    group:      load_group(conn, group_id)?,
    players:    load_players(conn, group_id)?,
    open_edges: load_assignments(conn, group_id, true)?,
  })
}

const TEMPLATE_COLUMNS: &str =
  "template_id, group_id, text, difficulty, tags, is_active, created_at";

fn template_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawTemplate> {
  Ok(RawTemplate {
    template_id: row.get(0)?,
    group_id:    row.get(1)?,
    text:        row.get(2)?,
    difficulty:  row.get(3)?,
    tags:        row.get(4)?,
    is_active:   row.get(5)?,
    created_at:  row.get(6)?,
  })
}

fn load_templates(
  conn:        &rusqlite::Connection,
  group_id:    Uuid,
  only_active: bool,
) -> Result<Vec<DareTemplate>> {
  let filter = if only_active { "AND is_active = 1" } else { "" };
  let mut stmt = conn.prepare(&format!(
    "SELECT {TEMPLATE_COLUMNS} FROM dare_templates
      WHERE group_id = ?1 {filter}
      ORDER BY created_at, template_id"
  ))?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(group_id)], template_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawTemplate::into_template).collect()
}

// ─── Plan application (connection thread) ────────────────────────────────────

fn apply_plan(
  conn:     &rusqlite::Connection,
  group_id: Uuid,
  plan:     &MutationPlan,
  now:      DateTime<Utc>,
) -> Result<()> {
  let now_str = encode_dt(now);

  // Close before insert so the one-open-edge-per-player indexes never see
  // both generations at once.
  for close in &plan.close {
    let n = conn.execute(
      "UPDATE assignments
          SET closed_at = ?1, reason_closed = ?2, replaced_by = ?3
        WHERE assignment_id = ?4 AND closed_at IS NULL",
      rusqlite::params![
        now_str,
        close.reason.to_string(),
        close.replaced_by.map(encode_uuid),
        encode_uuid(close.assignment_id),
      ],
    )?;
    if n != 1 {
      return Err(Error::Conflict(format!(
        "assignment {} is no longer open",
        close.assignment_id
      )));
    }
  }

  for edge in &plan.insert {
    conn.execute(
      "INSERT INTO assignments (
         assignment_id, group_id, assassin_id, target_id, dare_text,
         created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        encode_uuid(edge.assignment_id),
        encode_uuid(group_id),
        encode_uuid(edge.assassin_id),
        encode_uuid(edge.target_id),
        edge.dare_text,
        now_str,
      ],
    )?;
  }

  for (player_id, status) in &plan.player_status {
    let leaving =
      matches!(status, PlayerStatus::Eliminated | PlayerStatus::Removed);
    if leaving {
      conn.execute(
        "UPDATE players SET status = ?1, deactivated_at = ?2
          WHERE player_id = ?3",
        rusqlite::params![
          status.to_string(),
          now_str,
          encode_uuid(*player_id)
        ],
      )?;
    } else {
      conn.execute(
        "UPDATE players SET status = ?1 WHERE player_id = ?2",
        rusqlite::params![status.to_string(), encode_uuid(*player_id)],
      )?;
    }
  }

  match plan.game {
    Some(GameTransition::Start) => {
      conn.execute(
        "UPDATE groups
            SET status = 'active', started_at = ?1, ended_at = NULL
          WHERE group_id = ?2",
        rusqlite::params![now_str, encode_uuid(group_id)],
      )?;
    }
    Some(GameTransition::End) => {
      conn.execute(
        "UPDATE groups SET status = 'ended', ended_at = ?1
          WHERE group_id = ?2",
        rusqlite::params![now_str, encode_uuid(group_id)],
      )?;
    }
    None => {}
  }

  Ok(())
}

/// Re-derive the ring from the rows just written; an invalid result rolls
/// the surrounding transaction back.
fn audit_written_state(
  conn:     &rusqlite::Connection,
  group_id: Uuid,
) -> Result<()> {
  let players = load_players(conn, group_id)?;
  let open = load_assignments(conn, group_id, true)?;
  let active: BTreeSet<Uuid> = players
    .iter()
    .filter(|p| p.status.is_active())
    .map(|p| p.player_id)
    .collect();

  let report = ring::audit(&active, &open);
  if !report.valid {
    let violation = report.violation.unwrap_or(
      RingViolation::FragmentedRing { visited: 0, expected: report.players },
    );
    return Err(Error::Integrity(violation));
  }
  Ok(())
}

/// Read current state, plan, apply, re-audit, commit — or roll back and
/// write nothing.
fn run_mutation<T>(
  conn:     &mut rusqlite::Connection,
  group_id: Uuid,
  build:    impl FnOnce(
    &rusqlite::Connection,
    &RingSnapshot,
    DateTime<Utc>,
  ) -> Result<(MutationPlan, T)>,
) -> Result<T> {
  let tx = conn
    .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
  let now = Utc::now();
  let snapshot = load_snapshot(&tx, group_id)?;
  let (plan, outcome) = build(&tx, &snapshot, now)?;
  apply_plan(&tx, group_id, &plan, now)?;
  audit_written_state(&tx, group_id)?;
  tx.commit()?;
  Ok(outcome)
}

/// Materialise the assignments a plan inserts, as they now exist in the
/// database.
fn inserted_edges(
  plan:     &MutationPlan,
  group_id: Uuid,
  now:      DateTime<Utc>,
) -> Vec<Assignment> {
  plan
    .insert
    .iter()
    .map(|e| Assignment {
      assignment_id: e.assignment_id,
      group_id,
      assassin_id:   e.assassin_id,
      target_id:     e.target_id,
      dare_text:     e.dare_text.clone(),
      created_at:    now,
      closure:       None,
    })
    .collect()
}

fn display_name(players: &[Player], id: Uuid) -> String {
  players
    .iter()
    .find(|p| p.player_id == id)
    .map(|p| p.display_name.clone())
    .unwrap_or_else(|| "?".to_string())
}

// ─── RingStore impl ──────────────────────────────────────────────────────────

impl RingStore for SqliteStore {
  type Error = Error;

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn create_group(&self, name: String) -> Result<Group> {
    let group = Group {
      group_id:   Uuid::new_v4(),
      name,
      status:     GameStatus::Lobby,
      created_at: Utc::now(),
      started_at: None,
      ended_at:   None,
    };

    let id_str = encode_uuid(group.group_id);
    let at_str = encode_dt(group.created_at);
    let name_cl = group.name.clone();

    self
      .call_store(move |conn| {
        conn.execute(
          "INSERT INTO groups (group_id, name, status, created_at)
           VALUES (?1, ?2, 'lobby', ?3)",
          rusqlite::params![id_str, name_cl, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(group)
  }

  async fn get_group(&self, group_id: Uuid) -> Result<Option<Group>> {
    self
      .call_store(move |conn| get_group_row(conn, group_id))
      .await
  }

  // ── Player registry ───────────────────────────────────────────────────────

  async fn add_player(
    &self,
    group_id: Uuid,
    display_name: String,
    owner_profile_id: Option<Uuid>,
  ) -> Result<Player> {
    let player = Player {
      player_id: Uuid::new_v4(),
      group_id,
      display_name,
      status: PlayerStatus::Waiting,
      owner_profile_id,
      created_at: Utc::now(),
      deactivated_at: None,
    };
    let row = player.clone();

    self
      .call_store(move |conn| {
        load_group(conn, group_id)?;
        conn.execute(
          "INSERT INTO players (
             player_id, group_id, display_name, status, owner_profile_id,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            encode_uuid(row.player_id),
            encode_uuid(row.group_id),
            row.display_name,
            row.status.to_string(),
            row.owner_profile_id.map(encode_uuid),
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(player)
  }

  async fn get_player(&self, player_id: Uuid) -> Result<Option<Player>> {
    self
      .call_store(move |conn| get_player_row(conn, player_id))
      .await
  }

  async fn list_players(
    &self,
    group_id: Uuid,
    filter: PlayerFilter,
  ) -> Result<Vec<Player>> {
    self
      .call_store(move |conn| {
        let players = load_players(conn, group_id)?;
        let filtered = players
          .into_iter()
          .filter(|p| match filter {
            PlayerFilter::All => true,
            PlayerFilter::Pool => p.status.in_pool(),
            PlayerFilter::Inactive => !p.status.in_pool(),
            PlayerFilter::Unclaimed => p.owner_profile_id.is_none(),
          })
          .collect();
        Ok(filtered)
      })
      .await
  }

  async fn claim_player(
    &self,
    player_id: Uuid,
    profile_id: Uuid,
  ) -> Result<Player> {
    self
      .call_store(move |conn| {
        let mut player = get_player_row(conn, player_id)?.ok_or(
          Error::Core(quarry_core::Error::PlayerNotFound(player_id)),
        )?;
        conn.execute(
          "UPDATE players SET owner_profile_id = ?1 WHERE player_id = ?2",
          rusqlite::params![encode_uuid(profile_id), encode_uuid(player_id)],
        )?;
        player.owner_profile_id = Some(profile_id);
        Ok(player)
      })
      .await
  }

  async fn restore_player(&self, player_id: Uuid) -> Result<Player> {
    self
      .call_store(move |conn| {
        let mut player = get_player_row(conn, player_id)?.ok_or(
          Error::Core(quarry_core::Error::PlayerNotFound(player_id)),
        )?;
        if matches!(
          player.status,
          PlayerStatus::Eliminated | PlayerStatus::Removed
        ) {
          conn.execute(
            "UPDATE players SET status = 'waiting' WHERE player_id = ?1",
            rusqlite::params![encode_uuid(player_id)],
          )?;
          player.status = PlayerStatus::Waiting;
        }
        Ok(player)
      })
      .await
  }

  // ── Ring mutations ────────────────────────────────────────────────────────

  async fn seed_ring(&self, group_id: Uuid) -> Result<Vec<Assignment>> {
    self
      .call_store(move |conn| {
        run_mutation(conn, group_id, |tx, snapshot, now| {
          let pool: Vec<Uuid> = snapshot
            .players
            .iter()
            .filter(|p| p.status.in_pool())
            .map(|p| p.player_id)
            .collect();
          let templates = load_templates(tx, group_id, true)?;
          let mut rng = rand::rng();

          let plan = plan::plan_seed(snapshot, &pool, |target| {
            dare::roll_dare(&templates, &target.display_name, &mut rng)
          })
          .map_err(Error::Core)?;

          let edges = inserted_edges(&plan, group_id, now);
          Ok((plan, edges))
        })
      })
      .await
  }

  async fn reseed_ring(
    &self,
    group_id: Uuid,
    edges: Vec<RingEdge>,
  ) -> Result<Vec<Assignment>> {
    self
      .call_store(move |conn| {
        run_mutation(conn, group_id, |_tx, snapshot, now| {
          let plan =
            plan::plan_reseed(snapshot, &edges).map_err(Error::Core)?;
          let inserted = inserted_edges(&plan, group_id, now);
          Ok((plan, inserted))
        })
      })
      .await
  }

  async fn eliminate(
    &self,
    group_id: Uuid,
    assassin_id: Uuid,
  ) -> Result<Elimination> {
    let policy = self.policy;
    self
      .call_store(move |conn| {
        run_mutation(conn, group_id, |_tx, snapshot, _now| {
          plan::plan_eliminate(snapshot, assassin_id, &policy)
            .map_err(Error::Core)
        })
      })
      .await
      .inspect(|outcome| {
        tracing_kill(group_id, outcome);
      })
  }

  async fn remove_member(
    &self,
    group_id: Uuid,
    player_id: Uuid,
  ) -> Result<Removal> {
    let policy = self.policy;
    self
      .call_store(move |conn| {
        run_mutation(conn, group_id, |_tx, snapshot, _now| {
          plan::plan_remove(snapshot, player_id, &policy)
            .map_err(Error::Core)
        })
      })
      .await
  }

  // ── Dare lifecycle ────────────────────────────────────────────────────────

  async fn edit_dare(
    &self,
    group_id: Uuid,
    assassin_id: Uuid,
    dare_text: String,
  ) -> Result<Assignment> {
    self
      .call_store(move |conn| {
        let n = conn.execute(
          "UPDATE assignments SET dare_text = ?1
            WHERE group_id = ?2 AND assassin_id = ?3 AND closed_at IS NULL",
          rusqlite::params![
            dare_text,
            encode_uuid(group_id),
            encode_uuid(assassin_id)
          ],
        )?;
        if n == 0 {
          return Err(Error::Core(
            quarry_core::Error::NoActiveAssignment(assassin_id),
          ));
        }

        let open = load_assignments(conn, group_id, true)?;
        open
          .into_iter()
          .find(|e| e.assassin_id == assassin_id)
          .ok_or(Error::Core(quarry_core::Error::NoActiveAssignment(
            assassin_id,
          )))
      })
      .await
  }

  async fn add_dare_template(
    &self,
    input: NewDareTemplate,
  ) -> Result<DareTemplate> {
    let template = DareTemplate {
      template_id: Uuid::new_v4(),
      group_id:    input.group_id,
      text:        input.text,
      difficulty:  input.difficulty,
      tags:        input.tags,
      is_active:   true,
      created_at:  Utc::now(),
    };
    let row = template.clone();

    self
      .call_store(move |conn| {
        load_group(conn, row.group_id)?;
        conn.execute(
          "INSERT INTO dare_templates (
             template_id, group_id, text, difficulty, tags, is_active,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
          rusqlite::params![
            encode_uuid(row.template_id),
            encode_uuid(row.group_id),
            row.text,
            row.difficulty.to_string(),
            encode_tags(&row.tags)?,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(template)
  }

  async fn list_dare_templates(
    &self,
    group_id: Uuid,
    only_active: bool,
  ) -> Result<Vec<DareTemplate>> {
    self
      .call_store(move |conn| load_templates(conn, group_id, only_active))
      .await
  }

  async fn set_dare_template_active(
    &self,
    template_id: Uuid,
    active: bool,
  ) -> Result<DareTemplate> {
    self
      .call_store(move |conn| {
        let n = conn.execute(
          "UPDATE dare_templates SET is_active = ?1 WHERE template_id = ?2",
          rusqlite::params![active, encode_uuid(template_id)],
        )?;
        if n == 0 {
          return Err(Error::Core(quarry_core::Error::TemplateNotFound(
            template_id,
          )));
        }

        let raw = conn.query_row(
          &format!(
            "SELECT {TEMPLATE_COLUMNS} FROM dare_templates
              WHERE template_id = ?1"
          ),
          rusqlite::params![encode_uuid(template_id)],
          template_from_row,
        )?;
        raw.into_template()
      })
      .await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn ring_edges(&self, group_id: Uuid) -> Result<Vec<NamedEdge>> {
    self
      .call_store(move |conn| {
        load_group(conn, group_id)?;
        let players = load_players(conn, group_id)?;
        let open = load_assignments(conn, group_id, true)?;

        Ok(
          open
            .into_iter()
            .map(|e| NamedEdge {
              assignment_id: e.assignment_id,
              assassin_id:   e.assassin_id,
              assassin_name: display_name(&players, e.assassin_id),
              target_id:     e.target_id,
              target_name:   display_name(&players, e.target_id),
              dare_text:     e.dare_text,
            })
            .collect(),
        )
      })
      .await
  }

  async fn assignments(
    &self,
    group_id: Uuid,
    include_closed: bool,
  ) -> Result<Vec<Assignment>> {
    self
      .call_store(move |conn| {
        load_group(conn, group_id)?;
        load_assignments(conn, group_id, !include_closed)
      })
      .await
  }

  async fn current_assignment(
    &self,
    group_id: Uuid,
    player_id: Uuid,
  ) -> Result<AssignmentView> {
    self
      .call_store(move |conn| {
        let group = load_group(conn, group_id)?;
        let players = load_players(conn, group_id)?;
        let player = players
          .iter()
          .find(|p| p.player_id == player_id)
          .ok_or(Error::Core(quarry_core::Error::PlayerNotFound(
            player_id,
          )))?;

        let open = load_assignments(conn, group_id, true)?;
        let edge = open.iter().find(|e| e.assassin_id == player_id);
        let named = edge.map(|e| {
          (e, display_name(&players, e.target_id))
        });

        Ok(view::assignment_view(
          &group,
          player,
          named.as_ref().map(|(e, name)| (*e, name.as_str())),
        ))
      })
      .await
  }

  async fn audit_ring(&self, group_id: Uuid) -> Result<RingAudit> {
    self
      .call_store(move |conn| {
        load_group(conn, group_id)?;
        let players = load_players(conn, group_id)?;
        let open = load_assignments(conn, group_id, true)?;
        let active: BTreeSet<Uuid> = players
          .iter()
          .filter(|p| p.status.is_active())
          .map(|p| p.player_id)
          .collect();
        Ok(ring::audit(&active, &open))
      })
      .await
  }

  async fn feed(&self, group_id: Uuid) -> Result<Vec<FeedEvent>> {
    self
      .call_store(move |conn| {
        let group = load_group(conn, group_id)?;
        let players = load_players(conn, group_id)?;
        let all = load_assignments(conn, group_id, false)?;
        Ok(feed::build_feed(&group, &players, &all))
      })
      .await
  }

  async fn kill_counts(&self, group_id: Uuid) -> Result<Vec<KillCount>> {
    self
      .call_store(move |conn| {
        load_group(conn, group_id)?;
        let players = load_players(conn, group_id)?;
        let all = load_assignments(conn, group_id, false)?;
        Ok(feed::kill_counts(&players, &all))
      })
      .await
  }
}

fn tracing_kill(group_id: Uuid, outcome: &Elimination) {
  if outcome.game_over {
    tracing::info!(
      %group_id,
      assassin = %outcome.assassin_id,
      victim = %outcome.victim_id,
      "elimination ends the game"
    );
  } else {
    tracing::debug!(
      %group_id,
      assassin = %outcome.assassin_id,
      victim = %outcome.victim_id,
      "elimination recorded"
    );
  }
}
