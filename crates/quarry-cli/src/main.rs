//! `quarry` — admin command line for the Quarry ring engine.
//!
//! # Usage
//!
//! ```
//! quarry group create "office game"
//! quarry players add <group> "Ada L"
//! quarry ring seed <group>
//! quarry eliminate <group> <assassin>
//! quarry ring audit <group>
//! ```

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::ApiClient;
use quarry_core::{
  dare::Difficulty, feed::FeedEvent, ring::RingEdge, view::AssignmentView,
};
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "quarry", about = "Admin CLI for the Quarry ring engine")]
struct Args {
  /// Base URL of the quarry server.
  #[arg(long, env = "QUARRY_URL", default_value = "http://localhost:5200")]
  url: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Group management.
  #[command(subcommand)]
  Group(GroupCmd),
  /// Roster management.
  #[command(subcommand)]
  Players(PlayersCmd),
  /// Ring operations.
  #[command(subcommand)]
  Ring(RingCmd),
  /// Record a kill: the assassin eliminated their current target.
  Eliminate { group: Uuid, assassin: Uuid },
  /// Dare management.
  #[command(subcommand)]
  Dare(DareCmd),
  /// Print the group's activity timeline.
  Feed { group: Uuid },
  /// Print kill counts per player.
  Kills { group: Uuid },
}

#[derive(Subcommand, Debug)]
enum GroupCmd {
  Create { name: String },
  Show { group: Uuid },
}

#[derive(Subcommand, Debug)]
enum PlayersCmd {
  List {
    group:  Uuid,
    /// all | pool | inactive | unclaimed
    #[arg(long, default_value = "all")]
    filter: String,
  },
  Add {
    group: Uuid,
    name:  String,
  },
  /// Splice a player out of the live ring without kill credit.
  Remove {
    group:  Uuid,
    player: Uuid,
  },
  /// Return an eliminated/removed player to the group as waiting.
  Restore {
    player: Uuid,
  },
  /// Show what a player currently sees.
  Assignment {
    group:  Uuid,
    player: Uuid,
  },
}

#[derive(Subcommand, Debug)]
enum RingCmd {
  /// Print the open edges.
  Show { group: Uuid },
  /// Seed a fresh ring over the group's pool.
  Seed { group: Uuid },
  /// Install an explicit ring from a JSON file of
  /// `[{"assassin_id":..,"target_id":..,"dare_text":..}, ...]`.
  Reseed {
    group: Uuid,
    #[arg(long)]
    file:  std::path::PathBuf,
  },
  /// Re-derive ring validity from stored state.
  Audit { group: Uuid },
}

#[derive(Subcommand, Debug)]
enum DareCmd {
  /// Replace the dare on a player's open assignment.
  Set {
    group:  Uuid,
    player: Uuid,
    text:   String,
  },
  /// Add a dare template to the group's pool.
  AddTemplate {
    group: Uuid,
    text:  String,
    /// easy | intermediate | hard
    #[arg(long, default_value = "easy")]
    difficulty: Difficulty,
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
  },
  /// List the group's templates.
  Templates {
    group: Uuid,
    /// Include deactivated templates.
    #[arg(long)]
    all: bool,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let api = ApiClient::new(args.url)?;

  match args.command {
    Command::Group(cmd) => run_group(&api, cmd).await,
    Command::Players(cmd) => run_players(&api, cmd).await,
    Command::Ring(cmd) => run_ring(&api, cmd).await,
    Command::Eliminate { group, assassin } => {
      let outcome = api.eliminate(group, assassin).await?;
      if outcome.game_over {
        println!(
          "{} eliminated {} — game over, sole survivor stands",
          outcome.assassin_id, outcome.victim_id
        );
      } else {
        println!(
          "{} eliminated {}",
          outcome.assassin_id, outcome.victim_id
        );
        if let Some(edge) = outcome.new_assignment {
          println!("new assignment: {} → {}", edge.assassin_id, edge.target_id);
        }
      }
      Ok(())
    }
    Command::Dare(cmd) => run_dare(&api, cmd).await,
    Command::Feed { group } => {
      for event in api.feed(group).await? {
        println!("{}", render_event(&event));
      }
      Ok(())
    }
    Command::Kills { group } => {
      for count in api.kills(group).await? {
        println!("{:>3}  {}", count.kills, count.display_name);
      }
      Ok(())
    }
  }
}

async fn run_group(api: &ApiClient, cmd: GroupCmd) -> Result<()> {
  match cmd {
    GroupCmd::Create { name } => {
      let group = api.create_group(&name).await?;
      println!("{}  {}", group.group_id, group.name);
    }
    GroupCmd::Show { group } => {
      let g = api.get_group(group).await?;
      println!("{}  {}  [{}]", g.group_id, g.name, g.status);
    }
  }
  Ok(())
}

async fn run_players(api: &ApiClient, cmd: PlayersCmd) -> Result<()> {
  match cmd {
    PlayersCmd::List { group, filter } => {
      for p in api.list_players(group, &filter).await? {
        println!("{}  {:<12}  {}", p.player_id, p.status, p.display_name);
      }
    }
    PlayersCmd::Add { group, name } => {
      let p = api.add_player(group, &name).await?;
      println!("{}  {}", p.player_id, p.display_name);
    }
    PlayersCmd::Remove { group, player } => {
      let outcome = api.remove_member(group, player).await?;
      println!(
        "removed {}; {} now hunts {}",
        outcome.removed_id,
        outcome.new_assignment.assassin_id,
        outcome.new_assignment.target_id
      );
    }
    PlayersCmd::Restore { player } => {
      let p = api.restore_player(player).await?;
      println!("{}  {}  [{}]", p.player_id, p.display_name, p.status);
    }
    PlayersCmd::Assignment { group, player } => {
      match api.assignment(group, player).await? {
        AssignmentView::Hunting { target_name, dare_text, .. } => {
          println!("target: {target_name}");
          println!("dare:   {dare_text}");
        }
        AssignmentView::Champion => println!("game over — you won"),
        AssignmentView::Out => println!("out of the current round"),
        AssignmentView::Waiting => println!("no assignment yet"),
      }
    }
  }
  Ok(())
}

async fn run_ring(api: &ApiClient, cmd: RingCmd) -> Result<()> {
  match cmd {
    RingCmd::Show { group } => {
      for edge in api.ring(group).await? {
        println!(
          "{} → {}   “{}”",
          edge.assassin_name, edge.target_name, edge.dare_text
        );
      }
    }
    RingCmd::Seed { group } => {
      let edges = api.seed(group).await?;
      println!("seeded ring with {} edges", edges.len());
    }
    RingCmd::Reseed { group, file } => {
      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading {}", file.display()))?;
      let edges: Vec<RingEdge> =
        serde_json::from_str(&raw).context("parsing ring edges")?;
      let installed = api.reseed(group, edges).await?;
      println!("installed ring with {} edges", installed.len());
    }
    RingCmd::Audit { group } => {
      let report = api.audit(group).await?;
      if report.valid {
        println!(
          "ring OK: {} players, {} edges",
          report.players, report.edges
        );
      } else {
        let detail = report
          .violation
          .map(|v| v.to_string())
          .unwrap_or_else(|| "unknown violation".to_string());
        println!("ring INVALID: {detail}");
      }
    }
  }
  Ok(())
}

async fn run_dare(api: &ApiClient, cmd: DareCmd) -> Result<()> {
  match cmd {
    DareCmd::Set { group, player, text } => {
      let a = api.edit_dare(group, player, &text).await?;
      println!("dare updated for assignment {}", a.assignment_id);
    }
    DareCmd::AddTemplate { group, text, difficulty, tags } => {
      let t = api.add_template(group, &text, difficulty, tags).await?;
      println!("{}  {}", t.template_id, t.text);
    }
    DareCmd::Templates { group, all } => {
      for t in api.list_templates(group, all).await? {
        let marker = if t.is_active { " " } else { "x" };
        println!("{marker} {}  [{}]  {}", t.template_id, t.difficulty, t.text);
      }
    }
  }
  Ok(())
}

fn render_event(event: &FeedEvent) -> String {
  let at = event.at().to_rfc3339();
  match event {
    FeedEvent::PlayerJoined { display_name, .. } => {
      format!("{at}  {display_name} joined")
    }
    FeedEvent::Elimination {
      assassin_name, victim_name, dare_text, ..
    } => {
      format!("{at}  {assassin_name} eliminated {victim_name} with “{dare_text}”")
    }
    FeedEvent::MemberRemoved { display_name, .. } => {
      format!("{at}  {display_name} left the game")
    }
    FeedEvent::GameStarted { .. } => format!("{at}  game started"),
    FeedEvent::GameEnded { .. } => format!("{at}  game ended"),
  }
}
