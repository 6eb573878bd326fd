//! Async HTTP client wrapping the Quarry JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use quarry_core::{
  assignment::Assignment,
  dare::{DareTemplate, Difficulty},
  feed::{FeedEvent, KillCount},
  group::Group,
  plan::{Elimination, Removal},
  player::Player,
  ring::{RingAudit, RingEdge},
  view::{AssignmentView, NamedEdge},
};
use reqwest::Client;
use serde_json::json;
use uuid::Uuid;

/// Async HTTP client for the Quarry JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: String) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  /// Deserialise a success body, or surface the server's `error` message.
  async fn expect_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    what: &str,
  ) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
      return resp
        .json()
        .await
        .with_context(|| format!("deserialising {what}"));
    }

    let body: serde_json::Value = resp.json().await.unwrap_or_default();
    let message = body
      .get("error")
      .and_then(|v| v.as_str())
      .unwrap_or("unknown error");
    Err(anyhow!("{what} → {status}: {message}"))
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  pub async fn create_group(&self, name: &str) -> Result<Group> {
    let resp = self
      .client
      .post(self.url("/groups"))
      .json(&json!({ "name": name }))
      .send()
      .await
      .context("POST /groups failed")?;
    Self::expect_json(resp, "POST /groups").await
  }

  pub async fn get_group(&self, id: Uuid) -> Result<Group> {
    let resp = self
      .client
      .get(self.url(&format!("/groups/{id}")))
      .send()
      .await
      .context("GET /groups/:id failed")?;
    Self::expect_json(resp, "GET /groups/:id").await
  }

  pub async fn feed(&self, group: Uuid) -> Result<Vec<FeedEvent>> {
    let resp = self
      .client
      .get(self.url(&format!("/groups/{group}/feed")))
      .send()
      .await
      .context("GET /feed failed")?;
    Self::expect_json(resp, "GET /feed").await
  }

  pub async fn kills(&self, group: Uuid) -> Result<Vec<KillCount>> {
    let resp = self
      .client
      .get(self.url(&format!("/groups/{group}/kills")))
      .send()
      .await
      .context("GET /kills failed")?;
    Self::expect_json(resp, "GET /kills").await
  }

  // ── Players ───────────────────────────────────────────────────────────────

  pub async fn list_players(
    &self,
    group: Uuid,
    filter: &str,
  ) -> Result<Vec<Player>> {
    let resp = self
      .client
      .get(self.url(&format!("/groups/{group}/players")))
      .query(&[("filter", filter)])
      .send()
      .await
      .context("GET /players failed")?;
    Self::expect_json(resp, "GET /players").await
  }

  pub async fn add_player(&self, group: Uuid, name: &str) -> Result<Player> {
    let resp = self
      .client
      .post(self.url(&format!("/groups/{group}/players")))
      .json(&json!({ "display_name": name }))
      .send()
      .await
      .context("POST /players failed")?;
    Self::expect_json(resp, "POST /players").await
  }

  pub async fn restore_player(&self, player: Uuid) -> Result<Player> {
    let resp = self
      .client
      .post(self.url(&format!("/players/{player}/restore")))
      .send()
      .await
      .context("POST /restore failed")?;
    Self::expect_json(resp, "POST /restore").await
  }

  pub async fn assignment(
    &self,
    group: Uuid,
    player: Uuid,
  ) -> Result<AssignmentView> {
    let resp = self
      .client
      .get(self.url(&format!("/groups/{group}/players/{player}/assignment")))
      .send()
      .await
      .context("GET /assignment failed")?;
    Self::expect_json(resp, "GET /assignment").await
  }

  pub async fn edit_dare(
    &self,
    group: Uuid,
    player: Uuid,
    text: &str,
  ) -> Result<Assignment> {
    let resp = self
      .client
      .put(self.url(&format!("/groups/{group}/players/{player}/dare")))
      .json(&json!({ "dare_text": text }))
      .send()
      .await
      .context("PUT /dare failed")?;
    Self::expect_json(resp, "PUT /dare").await
  }

  // ── Ring ──────────────────────────────────────────────────────────────────

  pub async fn ring(&self, group: Uuid) -> Result<Vec<NamedEdge>> {
    let resp = self
      .client
      .get(self.url(&format!("/groups/{group}/ring")))
      .send()
      .await
      .context("GET /ring failed")?;
    Self::expect_json(resp, "GET /ring").await
  }

  pub async fn seed(&self, group: Uuid) -> Result<Vec<Assignment>> {
    let resp = self
      .client
      .post(self.url(&format!("/groups/{group}/ring/seed")))
      .send()
      .await
      .context("POST /ring/seed failed")?;
    Self::expect_json(resp, "POST /ring/seed").await
  }

  pub async fn reseed(
    &self,
    group: Uuid,
    edges: Vec<RingEdge>,
  ) -> Result<Vec<Assignment>> {
    let resp = self
      .client
      .post(self.url(&format!("/groups/{group}/ring/reseed")))
      .json(&json!({ "edges": edges }))
      .send()
      .await
      .context("POST /ring/reseed failed")?;
    Self::expect_json(resp, "POST /ring/reseed").await
  }

  pub async fn audit(&self, group: Uuid) -> Result<RingAudit> {
    let resp = self
      .client
      .get(self.url(&format!("/groups/{group}/ring/audit")))
      .send()
      .await
      .context("GET /ring/audit failed")?;
    Self::expect_json(resp, "GET /ring/audit").await
  }

  pub async fn eliminate(
    &self,
    group: Uuid,
    assassin: Uuid,
  ) -> Result<Elimination> {
    let resp = self
      .client
      .post(self.url(&format!("/groups/{group}/eliminations")))
      .json(&json!({ "assassin_player_id": assassin }))
      .send()
      .await
      .context("POST /eliminations failed")?;
    Self::expect_json(resp, "POST /eliminations").await
  }

  pub async fn remove_member(
    &self,
    group: Uuid,
    player: Uuid,
  ) -> Result<Removal> {
    let resp = self
      .client
      .post(self.url(&format!("/groups/{group}/removals")))
      .json(&json!({ "player_id": player }))
      .send()
      .await
      .context("POST /removals failed")?;
    Self::expect_json(resp, "POST /removals").await
  }

  // ── Dare templates ────────────────────────────────────────────────────────

  pub async fn add_template(
    &self,
    group: Uuid,
    text: &str,
    difficulty: Difficulty,
    tags: Vec<String>,
  ) -> Result<DareTemplate> {
    let resp = self
      .client
      .post(self.url(&format!("/groups/{group}/dare-templates")))
      .json(&json!({ "text": text, "difficulty": difficulty, "tags": tags }))
      .send()
      .await
      .context("POST /dare-templates failed")?;
    Self::expect_json(resp, "POST /dare-templates").await
  }

  pub async fn list_templates(
    &self,
    group: Uuid,
    include_inactive: bool,
  ) -> Result<Vec<DareTemplate>> {
    let resp = self
      .client
      .get(self.url(&format!("/groups/{group}/dare-templates")))
      .query(&[("include_inactive", include_inactive.to_string())])
      .send()
      .await
      .context("GET /dare-templates failed")?;
    Self::expect_json(resp, "GET /dare-templates").await
  }
}
