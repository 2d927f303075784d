//! Flora CLI — flower breeding planner
//!
//! Commands:
//!   flora colors  — list genotypes matching a species/color/seed filter
//!   flora explore — list every genotype reachable from a species' seeds
//!   flora breed   — show the best breeding tree for a color
//!   flora stats   — show solved-table store statistics

use flora_core::{
    BreedingPlanner, Color, ColorTable, FloraError, Genotype, SolverConfig, Species, TableStore,
};
use std::env;
use std::process;

const STORE_FILE: &str = "flora-tables.json";

fn print_usage() {
    println!(
        r#"
Flora — flower breeding planner

Usage: flora <command> [options]

Commands:
  colors  <table.tsv> <species> [color] [seed|bred]   Filter the color table
  explore <table.tsv> <species>                       Reachable genotypes by probability
  breed   <table.tsv> <species> <color> [seed|bred]   Best breeding tree for a color
  stats                                               Show solved-table store statistics
  help                                                Show this message

The color table holds one genotype per line, tab-separated: alleles first
(e.g. RRyyWWSs), color last, with "(seed)" marking seed-packet flowers.

Environment:
  FLORA_CONFIG       JSON solver config file
  FLORA_MAX_PASSES   solver pass ceiling
  FLORA_RESOLVER     none | color-test

Examples:
  flora colors roses.tsv roses red seed
  flora explore roses.tsv roses
  flora breed roses.tsv roses blue
"#
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "colors" => cmd_colors(&args[2..]),
        "explore" => cmd_explore(&args[2..]),
        "breed" => cmd_breed(&args[2..]),
        "stats" => cmd_stats(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("  Error: {}", e);
        process::exit(1);
    }
}

/// Parse an optional `seed` / `bred` filter
fn parse_seed_flag(arg: Option<&String>) -> Result<Option<bool>, FloraError> {
    match arg.map(|s| s.to_ascii_lowercase()) {
        None => Ok(None),
        Some(s) if s == "seed" => Ok(Some(true)),
        Some(s) if s == "bred" => Ok(Some(false)),
        Some(s) => Err(FloraError::Config(format!("expected 'seed' or 'bred', got '{}'", s))),
    }
}

/// Load the color table and build a planner over the persisted store
fn load_planner(path: &str, species: Species) -> Result<BreedingPlanner, FloraError> {
    let colors = ColorTable::load(species, path)?;
    let config = SolverConfig::from_env()?;
    Ok(BreedingPlanner::new(colors, config).with_store(TableStore::open(STORE_FILE)))
}

fn describe(colors: &ColorTable, g: &Genotype) -> String {
    match colors.lookup(g) {
        Some(r) if r.seed => format!("{} {} (seed)", g.code(), r.color),
        Some(r) => format!("{} {}", g.code(), r.color),
        None => format!("{} ?", g.code()),
    }
}

fn cmd_colors(args: &[String]) -> Result<(), FloraError> {
    if args.len() < 2 {
        eprintln!("Usage: flora colors <table.tsv> <species> [color] [seed|bred]");
        return Ok(());
    }
    let species: Species = args[1].parse()?;
    let colors = ColorTable::load(species, &args[0])?;

    // The color filter is optional, so a lone seed flag may sit in its place.
    let (color, seed) = match args.get(2) {
        Some(arg) if parse_seed_flag(Some(arg)).is_ok() => (None, parse_seed_flag(Some(arg))?),
        Some(arg) => (Some(arg.parse::<Color>()?), parse_seed_flag(args.get(3))?),
        None => (None, None),
    };

    let matches = colors.filter(Some(species), color, seed);
    println!("\n  {} matching {} genotypes:", matches.len(), species);
    for g in &matches {
        println!("  {}", describe(&colors, g));
    }
    Ok(())
}

fn cmd_explore(args: &[String]) -> Result<(), FloraError> {
    if args.len() < 2 {
        eprintln!("Usage: flora explore <table.tsv> <species>");
        return Ok(());
    }
    let species: Species = args[1].parse()?;
    let mut planner = load_planner(&args[0], species)?;

    let table = planner.table(species).clone();
    let mut rows: Vec<_> = table.iter().collect();
    rows.sort_by(|a, b| b.1.tested_probability.total_cmp(&a.1.tested_probability));

    println!("\n  {} reachable {} genotypes:", rows.len(), species);
    println!("  {}", "-".repeat(60));
    for (g, record) in rows {
        let origin = match table.parents(g) {
            Some((a, b)) => format!("{} x {}", a.code(), b.code()),
            None => "seed".to_string(),
        };
        println!(
            "  {:<32} p={:.4}  <- {}",
            describe(planner.colors(), g),
            record.tested_probability,
            origin
        );
    }

    planner.store().save()?;
    Ok(())
}

fn cmd_breed(args: &[String]) -> Result<(), FloraError> {
    if args.len() < 3 {
        eprintln!("Usage: flora breed <table.tsv> <species> <color> [seed|bred]");
        return Ok(());
    }
    let species: Species = args[1].parse()?;
    let color: Color = args[2].parse()?;
    let seed = parse_seed_flag(args.get(3))?;
    let mut planner = load_planner(&args[0], species)?;

    let Some((target, probability)) = planner.best_match(species, Some(color), seed) else {
        println!("\n  No reachable {} {} with those attributes.", color, species);
        return Ok(());
    };

    println!(
        "\n  Best target: {} (p={:.4})",
        describe(planner.colors(), &target),
        probability
    );
    let tree = planner.lineage(&target)?;
    println!("{}", serde_json::to_string_pretty(tree.as_ref())?);

    planner.store().save()?;
    Ok(())
}

fn cmd_stats() -> Result<(), FloraError> {
    let store = TableStore::open(STORE_FILE);
    println!("\n  {}", store.summary());
    println!("  Created:      {}", store.metadata.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    Ok(())
}
