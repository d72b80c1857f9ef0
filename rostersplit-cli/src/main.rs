use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use rostersplit_cli::console::{render_event, summary_lines};
use rostersplit_core::{spawn_split, SplitEvent, SplitProcessor, SplitRequest, SplitSummary, SplitterConfig};

#[derive(Parser)]
#[command(name = "rostersplit")]
#[command(about = "Split multi-employee roster PDFs into one PDF per employee and period")]
struct Args {
    /// Path to the roster PDF to split
    #[arg(short, long)]
    input: Option<String>,

    /// Directory that receives the "<name> Splitted" folder
    /// (default: output.default_root from the config)
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Write the run summary as JSON to this path
    #[arg(short, long)]
    report: Option<String>,

    /// Show page text previews, progress and debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective config as YAML and exit
    #[arg(long)]
    show_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing starts before the config is read so a load failure is logged;
    // the config's log level is swapped in afterwards
    let filter_handle = init_tracing(args.verbose);
    let config = SplitterConfig::load_with_fallback(args.config.as_deref());
    if let Some(handle) = filter_handle {
        if let Err(e) = handle.reload(EnvFilter::new(&config.log_level)) {
            eprintln!("⚠️  Could not apply log level '{}': {}", config.log_level, e);
        }
    }

    if args.show_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    println!("🦀 Roster Splitter");

    let Some(input) = &args.input else {
        eprintln!("❌ No input PDF given, use --input <path>");
        std::process::exit(2);
    };

    if let Some(config_path) = &args.config {
        println!("📋 Config: {}", config_path);
    } else {
        println!("📋 Using default config");
    }
    println!("📄 Processing: {}", input);

    let mut request = SplitRequest::new(input);
    if let Some(dir) = &args.output_dir {
        request = request.with_output_root(dir);
    }

    let handle = spawn_split(SplitProcessor::new(config), request)?;
    let mut summary: Option<SplitSummary> = None;
    let mut failed = false;

    loop {
        let finished = handle.is_finished();
        for event in handle.poll() {
            if let Some(line) = render_event(&event, args.verbose) {
                println!("{line}");
            }
            match event {
                SplitEvent::Completed(s) => summary = Some(s),
                SplitEvent::Failed(_) => failed = true,
                _ => {}
            }
        }
        // Checked before the final poll so no event sent before exit is missed
        if finished {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    if let Err(e) = handle.join() {
        if !failed {
            eprintln!("❌ Splitting failed: {e}");
        }
        std::process::exit(1);
    }

    if let Some(summary) = summary {
        for line in summary_lines(&summary) {
            println!("{line}");
        }
        if let Some(report_path) = &args.report {
            save_report(&summary, report_path)?;
        }
    }

    Ok(())
}

/// Install the subscriber. Returns a reload handle when neither `RUST_LOG` nor
/// `--verbose` fixed the filter, so the config can still pick the level.
fn init_tracing(verbose: bool) -> Option<reload::Handle<EnvFilter, Registry>> {
    let from_env = EnvFilter::try_from_default_env().ok();
    let fixed = from_env.is_some() || verbose;
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if fixed {
        None
    } else {
        Some(handle)
    }
}

fn save_report(summary: &SplitSummary, report_path: &str) -> Result<()> {
    summary.save_json(Path::new(report_path))?;
    println!("💾 Report saved to: {}", report_path);
    Ok(())
}
