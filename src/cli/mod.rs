//! Command-line interface for moodstack.
//!
//! The front end only analyzes text and reports on stored analyses. It never
//! handles diary keys.

use crate::constants::{APP_DESCRIPTION, APP_NAME, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use crate::emotion::AnalysisMode;
use crate::errors::AppResult;
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

/// Emotion analysis over encrypted diaries
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Log output format
    #[clap(long, global = true, default_value = LOG_FORMAT_TEXT, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: String,

    /// Enable debug logging
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a piece of text and print the result as JSON
    Analyze(AnalyzeArgs),
    /// Print aggregate emotion statistics for an owner
    Stats(WindowArgs),
    /// Print an owner's stored analyses, oldest first
    Trends(WindowArgs),
}

#[derive(Args, Debug)]
#[clap(group(ArgGroup::new("input").required(true).args(&["text", "file"])))]
pub struct AnalyzeArgs {
    /// Text to analyze
    #[clap(long)]
    pub text: Option<String>,

    /// File whose contents should be analyzed
    #[clap(long)]
    pub file: Option<PathBuf>,

    /// Analysis mode: local, blended or ai
    #[clap(long, default_value = "local")]
    pub mode: AnalysisMode,
}

impl AnalyzeArgs {
    /// Returns the text to analyze, reading the file if one was given.
    pub fn read_input(&self) -> AppResult<String> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => Ok(fs::read_to_string(path)?),
            (None, None) => Ok(String::new()),
        }
    }
}

#[derive(Args, Debug)]
pub struct WindowArgs {
    /// Owner whose analyses are reported
    #[clap(long)]
    pub owner: i64,

    /// Look-back window in days (0 for all time)
    #[clap(long, default_value_t = 30)]
    pub days: u32,
}
