//! Dare templates and dare-text helpers.
//!
//! Templates are boilerplate dares an admin curates per group. Seeding draws
//! a random active template for each edge and personalizes it by substituting
//! the target's display name for the phrase "your target".

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback dare used when a group has no active templates.
pub const DEFAULT_DARE: &str = "Be creative!";

/// The phrase templates use to refer to whoever the dare is aimed at.
pub const TARGET_PLACEHOLDER: &str = "your target";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Intermediate,
  Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DareTemplate {
  pub template_id: Uuid,
  pub group_id:    Uuid,
  pub text:        String,
  pub difficulty:  Difficulty,
  pub tags:        Vec<String>,
  pub is_active:   bool,
  pub created_at:  DateTime<Utc>,
}

/// Input for creating a template; id and timestamp are set by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDareTemplate {
  pub group_id:   Uuid,
  pub text:       String,
  pub difficulty: Difficulty,
  #[serde(default)]
  pub tags:       Vec<String>,
}

/// Replace every whole-phrase occurrence of [`TARGET_PLACEHOLDER`]
/// (case-insensitive) with `target_name`.
///
/// Matching is done over an ASCII-lowercased copy so byte offsets line up
/// with the original text; the placeholder itself is pure ASCII.
pub fn personalize(template: &str, target_name: &str) -> String {
  let lower = template.to_ascii_lowercase();
  let bytes = lower.as_bytes();
  let needle = TARGET_PLACEHOLDER;

  let mut out = String::with_capacity(template.len());
  let mut copied = 0;
  let mut search = 0;

  while let Some(pos) = lower[search..].find(needle) {
    let start = search + pos;
    let end = start + needle.len();
    let boundary_before =
      start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let boundary_after =
      end == bytes.len() || !bytes[end].is_ascii_alphanumeric();

    if boundary_before && boundary_after {
      out.push_str(&template[copied..start]);
      out.push_str(target_name);
      copied = end;
    }
    search = end;
  }

  out.push_str(&template[copied..]);
  out
}

/// Draw a random active template personalized for `target_name`, or the
/// default placeholder dare when none exist.
pub fn roll_dare<R: Rng>(
  templates:   &[DareTemplate],
  target_name: &str,
  rng:         &mut R,
) -> String {
  let pool: Vec<&DareTemplate> =
    templates.iter().filter(|t| t.is_active).collect();
  if pool.is_empty() {
    return DEFAULT_DARE.to_string();
  }
  let pick = pool[rng.random_range(0..pool.len())];
  personalize(&pick.text, target_name)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
