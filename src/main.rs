mod catalog;
mod cli;
mod config;
mod covers;
mod engine;
mod ffprobe;
mod metadata;
mod preflight;
mod providers;
mod report;
mod scanner;
mod spotdl;
mod store;

use anyhow::Result;
use env_logger::Builder;
use log::LevelFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli_args = cli::CliArgs::parse();

    let config = config::Config::from_args(cli_args)?;
    init_logging(config.verbose);

    let files = scanner::Scanner::new(&config.videos_dir).scan();
    anyhow::ensure!(
        !files.is_empty(),
        "no video files found in '{}'",
        config.videos_dir.display()
    );
    log::info!("Found {} video files", files.len());

    preflight::check_tools(config.offline)?;
    if !config.offline {
        preflight::check_connectivity()?;
    }

    let metadata_provider = spotdl::SpotdlClient::new(config.timeout);
    let probe = ffprobe::FfprobeProbe;
    let cover_provider = covers::HttpCoverProvider::new(config.timeout);

    let engine = engine::Engine::new(
        &metadata_provider,
        &probe,
        &cover_provider,
        covers::CoverStore::new(&config.covers_dir),
        store::CatalogStore::new(&config.catalog_path, &config.archive_path),
        engine::EngineOptions {
            offline: config.offline,
            force: config.force,
        },
    );

    let report = engine.run(&files)?;
    report.emit_summary();

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    let mut builder =
        Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}
