use clap::{Parser, Subcommand};
use engine::api::{load_scenario, simulate_encounter, ThemeLoader};
use engine::content::{BuiltinThemes, FileThemes};
use engine::{Difficulty, EngineConfig};
use std::path::PathBuf;

#[derive(Subcommand)]
enum Cmd {
    /// Run one encounter from a scenario file (JSON or YAML)
    Simulate {
        /// Path to the scenario
        #[arg(long)]
        scenario: PathBuf,
        /// RNG seed; overrides the scenario's own
        #[arg(long)]
        seed: Option<u64>,
        /// Print the full report as JSON instead of the battle log
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List available monsters
    Monsters {
        /// Directory of `<id>.json` monsters (defaults to the built-ins)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Show what an insight of the given quality reveals in hard mode
    Reveal {
        /// Built-in monster id
        #[arg(long)]
        monster: String,
        /// Insight quality, 0.0 to 1.0
        #[arg(long, default_value_t = 0.0)]
        quality: f64,
    },
    /// Print the effective engine configuration as JSON
    Config {
        /// JSON or YAML file to load; defaults apply otherwise
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Parser)]
#[command(name = "adventure")]
#[command(about = "Party encounter engine harness")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

fn main() -> anyhow::Result<()> {
    engine::init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Simulate { scenario, seed, json } => {
            let mut cfg = load_scenario(&scenario)?;
            if seed.is_some() {
                cfg.seed = seed;
            }
            let report = simulate_encounter(&cfg)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            for line in &report.log {
                println!("{}", line);
            }
            println!("outcome: {:?}", report.outcome.classification);
            for entry in report.rewards.iter() {
                let auto = if entry.auto { " (auto)" } else { "" };
                println!(
                    "reward {}{}: xp={} currency={} chests={}",
                    entry.name,
                    auto,
                    entry.xp,
                    entry.currency,
                    entry.loot.total()
                );
            }
        }
        Cmd::Monsters { dir } => match dir {
            Some(d) => list_monsters(&FileThemes::new(d)),
            None => list_monsters(&BuiltinThemes),
        },
        Cmd::Reveal { monster, quality } => {
            let mut m = BuiltinThemes.monster(&monster)?;
            m.mode = Difficulty::Hard;
            let view = m.view(Some(quality.clamp(0.0, 1.0)));
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Cmd::Config { file } => {
            let cfg = match file {
                Some(path) => EngineConfig::load(path)?,
                None => EngineConfig::default(),
            };
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }
    Ok(())
}

fn list_monsters(themes: &impl ThemeLoader) {
    for id in themes.names() {
        print_monster(&id, themes.monster(&id));
    }
}

fn print_monster(id: &str, monster: Result<engine::Monster, engine::SetupError>) {
    match monster {
        Ok(m) => println!(
            "{:<14} {:<16} {:?} combat={} talk={}",
            id,
            m.display_name(),
            m.tier,
            m.combat_target(),
            m.talk_target()
        ),
        Err(e) => eprintln!("{}: {}", id, e),
    }
}
