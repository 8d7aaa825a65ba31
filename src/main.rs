use std::io::{BufRead, Write};
use std::path::PathBuf;

use attendance_report::schema::Config;
use attendance_report::{ReportError, Result, pipeline};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("attendance_report=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ReportError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate(args) => execute_generate(args),
    }
}

fn execute_generate(args: GenerateArgs) -> Result<()> {
    for path in [&args.roster, &args.poll] {
        if !path.exists() {
            return Err(ReportError::MissingInput(path.clone()));
        }
    }

    let config = match &args.schema {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };

    let in_person = match args.in_person {
        Some(count) => count,
        None => prompt_in_person()?,
    };

    let (output, report) = pipeline::generate_from_paths(
        &args.roster,
        &args.poll,
        in_person,
        &args.output_dir,
        &config,
    )?;

    if args.print_summary {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    info!(output = %output.display(), "done");
    println!("{} generated successfully.", output.display());
    Ok(())
}

/// Asks for the in-person headcount on stdin.
fn prompt_in_person() -> Result<u32> {
    let mut stdout = std::io::stdout();
    write!(stdout, "Enter In-Person attendance count: ")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim();
    trimmed
        .parse::<u32>()
        .map_err(|_| ReportError::InvalidInPerson(trimmed.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile a meeting roster with a poll export into an attendance report."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Build the attendance spreadsheet for one meeting.
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Roster export listing the expected devices (File A, CSV or xlsx).
    #[arg(long)]
    roster: PathBuf,

    /// Poll/attendance export from the meeting platform (File B, CSV or xlsx).
    #[arg(long)]
    poll: PathBuf,

    /// Number of people attending in person. Prompted for when omitted.
    #[arg(long)]
    in_person: Option<u32>,

    /// Directory receiving `Output_<date>.xlsx`.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// JSON file overriding column and row offsets of the inputs.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Print the composed report as JSON after writing the spreadsheet.
    #[arg(long)]
    print_summary: bool,
}
