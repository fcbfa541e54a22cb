mod cli;
mod config;
mod errors;
mod processing;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{
    error,
    info,
};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> std::result::Result<(), errors::CliError> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        ) // This uses RUST_LOG environment variable
        .init();

    let args = Cli::parse();
    let config = Config::from_json(&args.config)?.with_cli_args(&args)?;
    info!("Parsed configuration: {:#?}", config);

    let (Some(input), Some(output)) = (&config.input, &config.output) else {
        return Err(errors::CliError::Config {
            source: "Missing input or output".to_string(),
        });
    };

    std::fs::create_dir_all(&output.directory)
        .map_err(|e| errors::CliError::io(e, &output.directory))?;

    let results = processing::process_files(&input.files, &config.features, output);
    let mut n_failed = 0;
    let mut n_features = 0;
    for (path, res) in results.iter() {
        match res {
            Ok(n) => n_features += n,
            Err(e) => {
                n_failed += 1;
                error!("Failed {}: {}", path.display(), e);
            }
        }
    }
    info!(
        "Processed {} files, {} features written, {} failed",
        results.len(),
        n_features,
        n_failed
    );

    if n_failed > 0 {
        return Err(errors::CliError::Processing {
            source: format!("{} of {} files failed", n_failed, results.len()),
            path: None,
        });
    }
    Ok(())
}
