//! ShortsRemover CLI
//!
//! Runs the filter engine offline against saved pages, and dumps or checks
//! selector registries.

use std::fs;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use log::LevelFilter;
use serde::Serialize;

use sr_core::html::validate_registry;
use sr_core::offline::OfflineHost;
use sr_core::{EngineConfig, FilterController, InitOutcome, ScanReport, SelectorRegistry};

mod bench;

#[derive(Parser)]
#[command(name = "sr-cli")]
#[command(about = "ShortsRemover offline scanner and registry tools")]
struct Cli {
    /// Log engine decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine once against a saved page
    Scan {
        /// Saved HTML page
        #[arg(short, long)]
        input: String,

        /// URL the page was loaded from
        #[arg(short, long)]
        url: String,

        /// Write the cleaned page here
        #[arg(short, long)]
        output: Option<String>,

        /// Selector registry JSON (defaults to the built-in one)
        #[arg(short, long)]
        registry: Option<String>,

        /// Engine config JSON
        #[arg(short, long)]
        config: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump the built-in selector registry as JSON
    Registry {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate a selector registry file
    Validate {
        /// Registry file to validate
        #[arg(short, long)]
        registry: String,
    },

    /// Time scans over a synthetic feed page
    Bench {
        /// Video cards on the synthetic page
        #[arg(long, default_value_t = 1000)]
        cards: usize,

        /// Timed iterations
        #[arg(long, default_value_t = 100)]
        iterations: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    let result = match cli.command {
        Commands::Scan {
            input,
            url,
            output,
            registry,
            config,
            json,
        } => cmd_scan(ScanOptions {
            input,
            url,
            output,
            registry,
            config,
            json,
        }),
        Commands::Registry { output } => cmd_registry(output.as_deref()),
        Commands::Validate { registry } => cmd_validate(&registry),
        Commands::Bench { cards, iterations } => bench::run(bench::BenchOptions { cards, iterations }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

struct ScanOptions {
    input: String,
    url: String,
    output: Option<String>,
    registry: Option<String>,
    config: Option<String>,
    json: bool,
}

#[derive(Serialize)]
struct ScanSummary {
    input: String,
    url: String,
    registry: String,
    outcome: InitOutcome,
    tally: u64,
    navigations: Vec<String>,
    elapsed_ms: f64,
}

fn cmd_scan(opts: ScanOptions) -> Result<(), String> {
    let html = fs::read_to_string(&opts.input)
        .map_err(|e| format!("Failed to read '{}': {}", opts.input, e))?;
    let registry = match &opts.registry {
        Some(path) => load_registry(path)?,
        None => SelectorRegistry::youtube(),
    };
    let config = match &opts.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let mut controller = FilterController::new(OfflineHost::new(&html, &opts.url), config, registry);

    let start = Instant::now();
    let outcome = controller.init();
    let elapsed = start.elapsed();

    // Let an armed redirect fire. No mutations are delivered offline, so no rescans run.
    let redirect_delay = controller.config().redirect_delay();
    controller.advance(redirect_delay + Duration::from_millis(1));

    let summary = ScanSummary {
        input: opts.input.clone(),
        url: opts.url.clone(),
        registry: controller.registry().label().to_string(),
        outcome,
        tally: controller.tally(),
        navigations: controller.host().navigations().to_vec(),
        elapsed_ms: elapsed.as_secs_f64() * 1000.0,
    };

    if opts.json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Failed to serialize report: {}", e))?;
        println!("{}", text);
    } else {
        print_summary(&summary);
    }

    if let Some(output) = &opts.output {
        let cleaned = controller.host().document().to_html();
        fs::write(output, cleaned).map_err(|e| format!("Failed to write '{}': {}", output, e))?;
        if !opts.json {
            println!("  Output:    {}", output);
        }
    }

    Ok(())
}

fn print_summary(summary: &ScanSummary) {
    println!("Scanned '{}' as {}", summary.input, summary.url);
    println!("  Registry:  {}", summary.registry);
    match &summary.outcome {
        InitOutcome::OffSite => println!("  Outcome:   off site, nothing done"),
        InitOutcome::AlreadyStarted => println!("  Outcome:   already started"),
        InitOutcome::Started { report, observing } => {
            println!(
                "  Outcome:   started ({})",
                if *observing { "observing" } else { "observer failed" }
            );
            match report {
                ScanReport::Filtered {
                    matched,
                    detached,
                    counted,
                    ..
                } => {
                    println!("  Matched:   {}", matched);
                    println!("  Detached:  {}", detached);
                    println!("  Counted:   {}", counted);
                }
                ScanReport::Redirect { outcome } => println!("  Redirect:  {:?}", outcome),
                ScanReport::OffSite => {}
            }
        }
    }
    for url in &summary.navigations {
        println!("  Navigated: {}", url);
    }
    println!("  Tally:     {}", summary.tally);
    println!("  Time:      {:.2}ms", summary.elapsed_ms);
}

fn cmd_registry(output: Option<&str>) -> Result<(), String> {
    let text = SelectorRegistry::youtube()
        .to_json_pretty()
        .map_err(|e| format!("Failed to serialize registry: {}", e))?;

    match output {
        Some(path) => {
            fs::write(path, &text).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
            println!("Wrote built-in registry to '{}'", path);
        }
        None => println!("{}", text),
    }

    Ok(())
}

fn cmd_validate(path: &str) -> Result<(), String> {
    let registry = load_registry(path)?;
    let patterns: usize = registry.iter().map(|(_, patterns)| patterns.len()).sum();

    println!("✓ Registry '{}' is valid", path);
    println!("  Label:     {}", registry.label());
    println!("  Version:   {}", registry.version());
    println!("  Keys:      {}", registry.iter().count());
    println!("  Patterns:  {}", patterns);

    Ok(())
}

fn load_registry(path: &str) -> Result<SelectorRegistry, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    let registry =
        SelectorRegistry::from_json(&text).map_err(|e| format!("Invalid registry '{}': {}", path, e))?;
    validate_registry(&registry).map_err(|e| format!("Invalid registry '{}': {}", path, e))?;
    Ok(registry)
}

fn load_config(path: &str) -> Result<EngineConfig, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    EngineConfig::from_json(&text).map_err(|e| format!("Invalid config '{}': {}", path, e))
}
