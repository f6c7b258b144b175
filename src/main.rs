// kegel-pdf: Generate score sheets, member lists, settlements and brackets

use std::io::Read;
use std::path::Path;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kegel_pdf::model::{Bracket, MatchDay, Member, Settlement};
use kegel_pdf::templates::{self, Letterhead, Logo};
use kegel_pdf::{AppError, PdfAttachment, SheetConfig};

// ============================================================================
// CLI
// ============================================================================

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate PDF documents for a bowling club")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Member list from a JSON array of members
    Members(CommonArgs),
    /// League score sheet from a JSON match day
    ScoreSheet(CommonArgs),
    /// Settlement sheet from a JSON settlement
    Settlement(CommonArgs),
    /// Tournament bracket from a JSON bracket
    Bracket(CommonArgs),
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// JSON data file
    #[arg(short, long)]
    data: String,

    /// Output filename (defaults to <document>-<date>.pdf)
    #[arg(short, long)]
    output: Option<String>,

    /// Sheet configuration (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Club name printed in the letterhead
    #[arg(long)]
    club: Option<String>,

    /// Logo image (file path or URL) to display in the header top-right
    #[arg(long)]
    logo: Option<String>,

    /// Print date (YYYY-MM-DD format, defaults to today)
    #[arg(long)]
    date: Option<String>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();
    let (kind, common) = match &args.command {
        Command::Members(c) => ("mitgliederliste", c),
        Command::ScoreSheet(c) => ("spielbericht", c),
        Command::Settlement(c) => ("abrechnung", c),
        Command::Bracket(c) => ("turnierbaum", c),
    };

    let printed = parse_date(&common.date)?;
    let config = load_config(common)?;
    let logo = load_logo(&config.logo)?;
    let head = Letterhead {
        config: &config,
        logo: logo.as_ref(),
        printed,
    };

    let data = Path::new(&common.data);
    let bytes = match &args.command {
        Command::Members(_) => {
            let members: Vec<Member> = load_data(data)?;
            templates::member_list::render(&head, &members)?
        }
        Command::ScoreSheet(_) => {
            let day: MatchDay = load_data(data)?;
            templates::score_sheet::render(&head, &day)?
        }
        Command::Settlement(_) => {
            let settlement: Settlement = load_data(data)?;
            templates::settlement::render(&head, &settlement)?
        }
        Command::Bracket(_) => {
            let bracket: Bracket = load_data(data)?;
            templates::bracket::render(&head, &bracket)?
        }
    };

    let name = format!("{}-{}", kind, printed.format("%Y-%m-%d"));
    let attachment = PdfAttachment::new(&name, bytes);
    let output_file = common
        .output
        .clone()
        .unwrap_or_else(|| attachment.filename.clone());
    std::fs::write(&output_file, &attachment.bytes)?;

    info!(output = %output_file, bytes = attachment.bytes.len(), "generated document");
    println!("✓ Generated: {}", output_file);
    println!("  Club: {}", config.club);
    println!("  Date: {}", templates::format_date(printed));

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_date(date_str: &Option<String>) -> Result<NaiveDate, AppError> {
    match date_str {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::Date(s.clone())),
        None => Ok(Local::now().date_naive()),
    }
}

fn load_config(args: &CommonArgs) -> Result<SheetConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => SheetConfig::load(Path::new(path))?,
        None => SheetConfig::default(),
    };
    if let Some(club) = &args.club {
        config.club = club.clone();
    }
    if let Some(logo) = &args.logo {
        config.logo = Some(logo.clone());
    }
    Ok(config)
}

fn load_data<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Data(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content).map_err(|e| AppError::Data(format!("Invalid JSON: {}", e)))
}

fn load_logo(path: &Option<String>) -> Result<Option<Logo>, AppError> {
    match path {
        Some(p) => {
            let image_bytes = if p.starts_with("http://") || p.starts_with("https://") {
                let response = ureq::get(p)
                    .call()
                    .map_err(|e| AppError::Logo(format!("Failed to fetch URL: {}", e)))?;

                let mut bytes = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut bytes)
                    .map_err(|e| AppError::Logo(format!("Failed to read response: {}", e)))?;
                bytes
            } else {
                std::fs::read(p).map_err(|e| AppError::Logo(format!("{}: {}", p, e)))?
            };

            let logo = Logo::from_bytes(&image_bytes)
                .map_err(|e| AppError::Logo(e.to_string()))?;
            Ok(Some(logo))
        }
        None => Ok(None),
    }
}
