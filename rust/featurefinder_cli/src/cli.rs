use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Path to an MS1 JSON dump, can be repeated (will over-write the config file)
    #[arg(short, long)]
    pub input: Vec<PathBuf>,

    /// Path to the output directory (will over-write the config file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}
