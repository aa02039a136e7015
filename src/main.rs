mod config;
mod error;
mod page;
mod play;
mod quiz;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use config::{Command, Config};
use error::{CliError, Result};
use log::{info, warn};

fn main() {
    let config = Config::load();

    pretty_env_logger::init();
    log::info!("Starting quiz page generator...");

    if let Err(err) = run(&config) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<()> {
    if let Some(path) = config.ignored_output() {
        warn!("Only build writes a page, ignoring output {}", path.display());
    }
    let raw = load_dataset(&config.input)?;

    match config.subcommand() {
        Command::Build => build(&raw, config.output.as_deref()),
        Command::Check => check(&raw),
        Command::Play { exam } => {
            let exams = playable_exams(&raw)?;
            let stdin = io::stdin();
            play::run(&exams, exam, stdin.lock(), io::stdout(), &mut rand::thread_rng())?;
            Ok(())
        }
    }
}

fn load_dataset(path: &Path) -> Result<serde_json::Value> {
    if !path.exists() {
        return Err(CliError::MissingFile(path.to_path_buf()));
    }
    info!("Loading quiz data from {}", path.display());
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn build(raw: &serde_json::Value, output: Option<&Path>) -> Result<()> {
    let html = page::render(raw)?;

    // The page reports dataset problems itself; here they are only a heads-up.
    let exams = quiz::normalize(raw);
    match quiz::validate(&exams, quiz::dataset::raw_exam_count(raw)) {
        Ok(()) => info!("Dataset has {} playable exams", exams.len()),
        Err(err) => warn!("The generated page will report: {}", err),
    }

    match output {
        Some(path) => {
            fs::write(path, &html)?;
            info!("Wrote quiz page to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn check(raw: &serde_json::Value) -> Result<()> {
    let exams = playable_exams(raw)?;
    let mut stdout = io::stdout().lock();
    for exam in &exams {
        writeln!(stdout, "{}", exam.label())?;
    }
    Ok(())
}

fn playable_exams(raw: &serde_json::Value) -> Result<Vec<quiz::Exam>> {
    let exams = quiz::normalize(raw);
    quiz::validate(&exams, quiz::dataset::raw_exam_count(raw))?;
    Ok(exams)
}
