use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "lgit")]
#[command(about = "Git repository session served as JSON lines over stdin/stdout")]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Recent-repository data file (overrides config)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Repository to open before serving requests
    #[arg(long)]
    pub open: Option<PathBuf>,

    /// Print the recently opened repositories and exit
    #[arg(long)]
    pub list_recent: bool,
}
