//! Headless Duel Runner
//!
//! Runs an AI vs AI battle on a fixed demo roster and prints a summary.

use std::path::PathBuf;

use clap::Parser;
use duel_atb::battle::{BattleController, BattleResult};
use duel_atb::combat::{Combatant, Roster, SkillBook, SkillDef, Stats};
use duel_atb::core::{ActorId, BattleConfig, Side, SkillId};
use duel_atb::stage::NullStage;
use serde::Serialize;

/// Headless Duel Runner - AI vs AI battles for balancing
#[derive(Parser, Debug)]
#[command(name = "duel_runner")]
#[command(about = "Run an AI vs AI duel and print the result")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Battle config (TOML); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum ticks before giving up
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

#[derive(Serialize)]
struct Survivor {
    id: u32,
    name: String,
    side: Side,
    remaining_hp: u32,
}

#[derive(Serialize)]
struct DuelSummary {
    result: Option<BattleResult>,
    turns: u32,
    ticks: u64,
    seed: u64,
    survivors: Vec<Survivor>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("duel_atb=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => BattleConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config '{}': {}", path.display(), e);
            eprintln!("Using default config");
            BattleConfig::default()
        }),
        None => BattleConfig::default(),
    };
    config.human_side = None;
    let seed = args.seed.unwrap_or_else(rand::random);
    config.seed = seed;

    let mut controller = match BattleController::new(
        config,
        demo_roster(),
        Box::new(demo_skills()),
        NullStage::instant(),
    ) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    while !controller.is_finished() && controller.ticks() < args.max_ticks {
        controller.update(args.dt);
    }

    let survivors = controller
        .roster()
        .iter()
        .filter(|c| c.is_alive())
        .map(|c| Survivor {
            id: c.id.0,
            name: c.name.clone(),
            side: c.side,
            remaining_hp: c.health.remaining(),
        })
        .collect();

    let summary = DuelSummary {
        result: controller.result(),
        turns: controller.context().turn,
        ticks: controller.ticks(),
        seed,
        survivors,
    };

    match args.format.as_str() {
        "text" => print_text(&summary),
        "json" => print_json(&summary),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            print_json(&summary);
        }
    }
}

fn print_json(summary: &DuelSummary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to serialize summary: {}", e),
    }
}

fn print_text(summary: &DuelSummary) {
    println!("Duel Result");
    println!("===========");
    match summary.result {
        Some(result) => println!("Result: {:?}", result),
        None => println!("Result: undecided (tick limit)"),
    }
    println!("Turns: {}", summary.turns);
    println!("Ticks: {}", summary.ticks);
    println!("Seed: {}", summary.seed);
    println!();
    for survivor in &summary.survivors {
        println!(
            "  {:?} #{} {}: {} HP",
            survivor.side, survivor.id, survivor.name, survivor.remaining_hp
        );
    }
}

const KEEN_EYE: SkillId = SkillId(1);
const HEAVY_HANDS: SkillId = SkillId(2);
const FEINT: SkillId = SkillId(3);

fn demo_skills() -> SkillBook {
    SkillBook::new()
        .with(
            KEEN_EYE,
            SkillDef {
                name: "Keen Eye".into(),
                recovery_bonus: 1,
                ..SkillDef::default()
            },
        )
        .with(
            HEAVY_HANDS,
            SkillDef {
                name: "Heavy Hands".into(),
                damage_bonus_percent: 20.0,
                critical_conversion: true,
                ..SkillDef::default()
            },
        )
        .with(
            FEINT,
            SkillDef {
                name: "Feint".into(),
                unavoidable: true,
                ..SkillDef::default()
            },
        )
}

/// Two allies against three enemies
fn demo_roster() -> Roster {
    let mut duelist = Combatant::new(
        ActorId(1),
        "Duelist",
        Side::Ally,
        120,
        Stats {
            attack: 14,
            defense: 10,
            speed: 12.0,
            insight: 25,
            confuse: 15,
            intelligence: 70,
        },
    );
    duelist.skills.push(KEEN_EYE);

    let mut guard = Combatant::new(
        ActorId(2),
        "Guard",
        Side::Ally,
        150,
        Stats {
            attack: 10,
            defense: 16,
            speed: 8.0,
            insight: 12,
            confuse: 10,
            intelligence: 55,
        },
    );
    guard.skills.push(HEAVY_HANDS);

    let bandit = |id: u32, name: &str| {
        Combatant::new(
            ActorId(id),
            name,
            Side::Enemy,
            70,
            Stats {
                attack: 9,
                defense: 8,
                speed: 10.0,
                insight: 10,
                confuse: 12,
                intelligence: 40,
            },
        )
    };

    let mut cutpurse = bandit(12, "Cutpurse");
    cutpurse.skills.push(FEINT);

    Roster::from_combatants([bandit(11, "Bandit"), cutpurse, bandit(13, "Bandit Chief")])
}
