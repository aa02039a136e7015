use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

pub const DEFAULT_DATA_FILE: &str = "quiz_data.json";

/// Turns a quiz dataset into a self-contained exam page.
#[derive(Debug, Parser)]
#[command(name = "quiz-page", version)]
pub struct Config {
    /// Quiz dataset: a JSON object keyed by exam.
    #[arg(short, long, env = "QUIZ_DATA_PATH", default_value = DEFAULT_DATA_FILE, global = true)]
    pub input: PathBuf,

    /// Write the page here instead of standard output.
    #[arg(short, long, env = "QUIZ_PAGE_OUTPUT", global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate the HTML page (the default).
    Build,
    /// List the playable exams, or report why there are none.
    Check,
    /// Take an exam in the terminal.
    Play {
        /// 1-based position in the exam list; asked for when omitted.
        #[arg(short, long)]
        exam: Option<usize>,
    },
}

impl Config {
    /// Reads `.env` if there is one, then the command line.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Config::parse()
    }

    pub fn subcommand(&self) -> Command {
        self.command.clone().unwrap_or(Command::Build)
    }

    /// An `--output` given to a command other than `build`.
    pub fn ignored_output(&self) -> Option<&Path> {
        match self.subcommand() {
            Command::Build => None,
            _ => self.output.as_deref(),
        }
    }
}
