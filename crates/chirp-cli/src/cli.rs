use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chirp", about = "Chirp: append-only tweet record store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a new author key
    Keygen(KeygenArgs),
    /// Post a tweet as the configured key
    Post(PostArgs),
    /// Show a single tweet by address
    Show(ShowArgs),
    /// List tweets, optionally filtered
    List(ListArgs),
}

#[derive(Args)]
pub struct KeygenArgs {
    /// Where to write the key (defaults to the configured keypair path)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Overwrite an existing key file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct PostArgs {
    pub content: String,
    #[arg(short, long, default_value = "")]
    pub topic: String,
}

#[derive(Args)]
pub struct ShowArgs {
    pub address: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only tweets by this author (hex public key)
    #[arg(long)]
    pub author: Option<String>,
    /// Only tweets with exactly this topic
    #[arg(long, conflicts_with = "topic_prefix")]
    pub topic: Option<String>,
    /// Only tweets whose topic starts with these bytes
    #[arg(long)]
    pub topic_prefix: Option<String>,
    /// Only tweets whose content starts with this text
    #[arg(long)]
    pub content_prefix: Option<String>,
}
