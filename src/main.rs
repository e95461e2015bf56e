/*!
# moodstack

Command-line front end for the moodstack library.

## Usage

```text
moodstack [--log-format text|json] [-v] <COMMAND>

Commands:
  analyze  Analyze a piece of text and print the result as JSON
  stats    Print aggregate emotion statistics for an owner
  trends   Print an owner's stored analyses, oldest first
```

Logs go to stderr; command output on stdout is always JSON.

## Configuration

See [`moodstack::Config`] for the `MOODSTACK_*` environment variables.
*/

use clap::Parser;
use moodstack::ai::{OllamaClient, OllamaEmotionAnalyzer};
use moodstack::cli::{AnalyzeArgs, CliArgs, Command, WindowArgs};
use moodstack::constants::{
    DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON, TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME,
};
use moodstack::db::Database;
use moodstack::emotion::{lexicon, AnalysisMode, EmotionAnalyzer, EmotionLexicon, EmotionService};
use moodstack::{AppResult, Config};
use serde::Serialize;
use std::io;
use std::process::ExitCode;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(log_format: &str, verbose: bool) {
    let level = if verbose { "debug" } else { DEFAULT_LOG_LEVEL };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("moodstack={}", level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == LOG_FORMAT_JSON {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
    }
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    println!("{}", rendered);
    Ok(())
}

fn analyze(config: &Config, lexicon: &EmotionLexicon, args: &AnalyzeArgs) -> AppResult<()> {
    let text = args.read_input()?;

    let mut analyzer = EmotionAnalyzer::new(lexicon);
    if args.mode != AnalysisMode::Local {
        let client = OllamaClient::new(config.ollama_url.as_str(), config.ai_timeout())?;
        analyzer = analyzer.with_external(OllamaEmotionAnalyzer::new(
            client,
            config.ai_model.as_str(),
        ));
    }

    let analysis = analyzer.analyze(&text, args.mode)?;
    print_json(&analysis)
}

fn open_service<'l>(config: &Config, lexicon: &'l EmotionLexicon) -> AppResult<EmotionService<'l>> {
    let db = Database::open(&config.db_path)?;
    db.initialize_schema()?;
    Ok(EmotionService::new(db, EmotionAnalyzer::new(lexicon)))
}

fn run(args: CliArgs) -> AppResult<()> {
    let config = Config::load()?;
    config.validate()?;
    debug!("Configuration: {:?}", config);

    let lexicon = lexicon::ensure_loaded(config.lexicon_path.as_deref());

    match &args.command {
        Command::Analyze(analyze_args) => analyze(&config, lexicon, analyze_args),
        Command::Stats(WindowArgs { owner, days }) => {
            let service = open_service(&config, lexicon)?;
            print_json(&service.statistics(*owner, *days)?)
        }
        Command::Trends(WindowArgs { owner, days }) => {
            let service = open_service(&config, lexicon)?;
            print_json(&service.emotion_trends(*owner, *days)?)
        }
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(&args.log_format, args.verbose);

    let span = info_span!(TRACING_ROOT_SPAN_NAME, service = TRACING_SERVICE_NAME);
    let _guard = span.enter();
    info!("Starting moodstack");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
