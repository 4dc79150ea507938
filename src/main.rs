mod bulk;
mod cli;
mod geocode;
mod grader;
mod http_client;
mod leads;
mod map;
mod parser;
mod pdf;
mod rate_limiter;
mod ui;
mod writer;

use bulk::ScoredLead;
use clap::Parser;
use cli::{Cli, Commands};
use geocode::Geocoder;
use http_client::HttpClient;
use leads::LeadFile;
use map::MapPin;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use ui::AuditStats;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Audit { url, pdf } => run_audit(&url, pdf.as_deref()).await,
        Commands::Bulk {
            input,
            output,
            json,
            map,
            quiet,
        } => run_bulk(&input, &output, json, map, quiet).await,
    };

    if let Err(e) = result {
        eprintln!("sitegrade: {}", e);
        std::process::exit(1);
    }
}

async fn run_audit(url: &str, pdf_path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let client = HttpClient::new()?;

    println!("Scanning {} ...", url);
    let audit = grader::grade(&client, url).await?;

    println!();
    println!("  URL    : {}", audit.url);
    if let Some(title) = &audit.title {
        println!("  Title  : {}", title);
    }
    println!("  HTTP   : {}", audit.status);
    println!("  TTFB   : {:.2}s", audit.ttfb_secs);
    println!("  Score  : {}/100", audit.score);
    println!();
    println!("Analysis:");
    if audit.issues.is_empty() {
        println!("  - no issues found, the page looks healthy");
    }
    for issue in &audit.issues {
        println!("  - {}", issue);
    }

    if let Some(path) = pdf_path {
        pdf::write_pdf(path, &audit)?;
        println!();
        println!("Report saved to {}", path.display());
    }

    Ok(())
}

async fn run_bulk(
    input: &Path,
    output: &Path,
    json: Option<PathBuf>,
    map_path: Option<PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn Error>> {
    let lead_file = LeadFile::load(input)?;
    let total = lead_file.rows.len();
    let headers = lead_file.headers.clone();

    // Fail before grading, not after half an hour of it. The address
    // column index travels with the map path so the later branch cannot
    // run without it.
    let map_request = match map_path {
        Some(path) => match lead_file.address_idx {
            Some(idx) => Some((path, idx)),
            None => {
                return Err(format!(
                    "map output needs an '{}' column in the CSV",
                    leads::ADDRESS_COLUMN
                )
                .into());
            }
        },
        None => None,
    };

    let client = HttpClient::new()?;
    let stats = Arc::new(AuditStats::new());

    let scored = if quiet {
        bulk::run(&lead_file, &client, stats.clone(), true).await
    } else {
        let loop_stats = stats.clone();
        let handle =
            tokio::spawn(async move { bulk::run(&lead_file, &client, loop_stats, false).await });
        ui::run_ui(stats.clone(), total).await?;
        handle.await?
    };

    let processed = stats.processed.load(Ordering::Relaxed);
    if stats.should_stop() && processed < total {
        eprintln!("stopped early: {} of {} rows graded", processed, total);
    }

    writer::write_scored_csv(output, &headers, &scored)?;
    println!("{} rows scored, written to {}", scored.len(), output.display());

    if let Some(path) = &json {
        writer::write_jsonl(path, &scored)?;
        println!("audit records written to {}", path.display());
    }

    if let Some((path, address_idx)) = &map_request {
        let pins = geocode_leads(&scored, *address_idx).await?;
        map::write_map(path, &pins)?;
        println!(
            "map with {} of {} leads written to {}",
            pins.len(),
            scored.len(),
            path.display()
        );
    }

    Ok(())
}

/// One Nominatim lookup per row that carries an address; rows without
/// one, or without a geocoder hit, are skipped.
async fn geocode_leads(
    scored: &[ScoredLead],
    address_idx: usize,
) -> Result<Vec<MapPin>, Box<dyn Error>> {
    let geocoder = Geocoder::new()?;
    let mut pins = Vec::new();

    for lead in scored {
        let Some(address) = lead
            .row
            .get(address_idx)
            .map(str::trim)
            .filter(|a| !a.is_empty())
        else {
            continue;
        };

        match geocoder.lookup(address).await {
            Ok(Some(coords)) => pins.push(MapPin {
                website: lead.website.clone(),
                score: lead.score,
                coords,
            }),
            Ok(None) => eprintln!("no geocoder hit for '{}'", address),
            Err(e) => eprintln!("geocoding '{}' failed: {}", address, e),
        }
    }

    Ok(pins)
}
