use clap::Parser;
use encoding_rs::Encoding;
use engine::api::{simulate_encounter_many, ScenarioConfig};
use std::{fs, path::PathBuf};

#[derive(Parser)]
#[command(name = "simulate-many")]
#[command(about = "Monte Carlo sim: many encounters from one scenario")]
struct Args {
    /// Path to scenario JSON (or YAML)
    #[arg(long)]
    scenario: PathBuf,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Override the scenario's weekday (1 = Monday)
    #[arg(long)]
    weekday: Option<u8>,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn read_text_auto(path: &std::path::Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn read_scenario_auto(path: &std::path::Path) -> anyhow::Result<ScenarioConfig> {
    let text = read_text_auto(path)?;
    let yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if yaml {
        Ok(serde_yaml::from_str(&text)?)
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}

fn pct(n: u32, of: u32) -> f64 {
    if of == 0 { 0.0 } else { n as f64 * 100.0 / of as f64 }
}

fn main() -> anyhow::Result<()> {
    engine::init_tracing();
    let args = Args::parse();

    let mut cfg = read_scenario_auto(&args.scenario)?;
    cfg.seed = Some(args.seed);
    if let Some(day) = args.weekday {
        cfg.weekday = day;
    }
    let s = simulate_encounter_many(&cfg, args.trials)?;
    tracing::debug!(trials = s.samples, lost = s.lost, "simulation finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&s)?);
        return Ok(());
    }

    println!("simulate-many results");
    println!("---------------------");
    println!("trials:             {}", s.samples);
    println!("party size:         {}", cfg.party.len());
    println!();
    println!("both won:           {:.1}%", pct(s.both_won, s.samples));
    println!("combat only:        {:.1}%", pct(s.physical_magical_won, s.samples));
    println!("diplomacy only:     {:.1}%", pct(s.diplomacy_won, s.samples));
    println!("lost:               {:.1}%", pct(s.lost, s.samples));
    println!("avg combat total:   {:.2}", s.avg_combat);
    println!("avg talk total:     {:.2}", s.avg_talk);
    println!("avg party xp:       {:.2}", s.avg_xp);

    Ok(())
}
