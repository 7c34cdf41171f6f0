use anyhow::{Context, Result};
use clap::Parser;
use img_shrink::cli::{shrink_overrides, Args, Commands};
use img_shrink::{logger, ConsoleReporter, Settings, Shrinker};

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose);

    match args.command {
        Commands::Shrink {
            files,
            level,
            concurrency,
            engine,
            recursive,
            no_progress,
        } => {
            let overrides = shrink_overrides(level, concurrency, engine, recursive, no_progress);
            let settings = Settings::load(args.config.as_deref(), &overrides)
                .context("failed to load configuration")?;
            shrink(&files, &settings)?;
        }
        Commands::Version => {
            println!("img-shrink version: {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn shrink(files: &[String], settings: &Settings) -> Result<()> {
    let options = settings.batch_options()?;
    let transform = settings.engine.build(settings.level)?;
    let mut shrinker = Shrinker::new(options, transform, Box::new(ConsoleReporter::stdout()));

    shrinker.run(files)?;
    Ok(())
}

