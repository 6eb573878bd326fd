//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, UUIDs as hyphenated
//! lowercase strings, enums as their snake_case names, tags as compact JSON.

use chrono::{DateTime, Utc};
use quarry_core::{
  assignment::{Assignment, CloseReason, Closure},
  dare::{DareTemplate, Difficulty},
  group::{GameStatus, Group},
  player::{Player, PlayerStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_enum<T: std::str::FromStr>(s: &str, what: &str) -> Result<T> {
  s.parse::<T>()
    .map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `groups` row.
pub struct RawGroup {
  pub group_id:   String,
  pub name:       String,
  pub status:     String,
  pub created_at: String,
  pub started_at: Option<String>,
  pub ended_at:   Option<String>,
}

impl RawGroup {
  pub fn into_group(self) -> Result<Group> {
    Ok(Group {
      group_id:   decode_uuid(&self.group_id)?,
      name:       self.name,
      status:     decode_enum::<GameStatus>(&self.status, "game status")?,
      created_at: decode_dt(&self.created_at)?,
      started_at: self.started_at.as_deref().map(decode_dt).transpose()?,
      ended_at:   self.ended_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `players` row.
pub struct RawPlayer {
  pub player_id:        String,
  pub group_id:         String,
  pub display_name:     String,
  pub status:           String,
  pub owner_profile_id: Option<String>,
  pub created_at:       String,
  pub deactivated_at:   Option<String>,
}

impl RawPlayer {
  pub fn into_player(self) -> Result<Player> {
    Ok(Player {
      player_id:        decode_uuid(&self.player_id)?,
      group_id:         decode_uuid(&self.group_id)?,
      display_name:     self.display_name,
      status:           decode_enum::<PlayerStatus>(
        &self.status,
        "player status",
      )?,
      owner_profile_id: self
        .owner_profile_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      created_at:       decode_dt(&self.created_at)?,
      deactivated_at:   self
        .deactivated_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
    })
  }
}

/// Raw strings read directly from an `assignments` row.
pub struct RawAssignment {
  pub assignment_id: String,
  pub group_id:      String,
  pub assassin_id:   String,
  pub target_id:     String,
  pub dare_text:     String,
  pub created_at:    String,
  pub closed_at:     Option<String>,
  pub reason_closed: Option<String>,
  pub replaced_by:   Option<String>,
}

impl RawAssignment {
  pub fn into_assignment(self) -> Result<Assignment> {
    let closure = match (self.closed_at, self.reason_closed) {
      (Some(at), Some(reason)) => Some(Closure {
        reason:      decode_enum::<CloseReason>(&reason, "close reason")?,
        at:          decode_dt(&at)?,
        replaced_by: self
          .replaced_by
          .as_deref()
          .map(decode_uuid)
          .transpose()?,
      }),
      (None, None) => None,
      _ => {
        return Err(Error::Decode(format!(
          "assignment {} has a half-closed lifecycle",
          self.assignment_id
        )));
      }
    };

    Ok(Assignment {
      assignment_id: decode_uuid(&self.assignment_id)?,
      group_id:      decode_uuid(&self.group_id)?,
      assassin_id:   decode_uuid(&self.assassin_id)?,
      target_id:     decode_uuid(&self.target_id)?,
      dare_text:     self.dare_text,
      created_at:    decode_dt(&self.created_at)?,
      closure,
    })
  }
}

/// Raw strings read directly from a `dare_templates` row.
pub struct RawTemplate {
  pub template_id: String,
  pub group_id:    String,
  pub text:        String,
  pub difficulty:  String,
  pub tags:        String,
  pub is_active:   bool,
  pub created_at:  String,
}

impl RawTemplate {
  pub fn into_template(self) -> Result<DareTemplate> {
    Ok(DareTemplate {
      template_id: decode_uuid(&self.template_id)?,
      group_id:    decode_uuid(&self.group_id)?,
      text:        self.text,
      difficulty:  decode_enum::<Difficulty>(&self.difficulty, "difficulty")?,
      tags:        decode_tags(&self.tags)?,
      is_active:   self.is_active,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
