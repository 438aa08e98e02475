use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context};
use chirp_client::{query, Tweet, TweetClient};
use chirp_crypto::SigningKey;
use chirp_store::FileRecordStore;
use chirp_types::{Pubkey, RecordAddress};
use colored::Colorize;

use crate::cli::*;
use crate::config::ClientConfig;

pub fn run_command(cli: Cli, config: ClientConfig) -> anyhow::Result<()> {
    match cli.command {
        Command::Keygen(args) => cmd_keygen(args, &config),
        Command::Post(args) => cmd_post(args, &config, &cli.format),
        Command::Show(args) => cmd_show(args, &config, &cli.format),
        Command::List(args) => cmd_list(args, &config, &cli.format),
    }
}

fn open_client(config: &ClientConfig) -> anyhow::Result<TweetClient> {
    let store = FileRecordStore::open(&config.store_path, config.store_config())
        .with_context(|| format!("opening store {}", config.store_path.display()))?;
    let wallet = config.load_keypair()?;
    Ok(TweetClient::new(Arc::new(store), wallet))
}

fn cmd_keygen(args: KeygenArgs, config: &ClientConfig) -> anyhow::Result<()> {
    let path = args.out.unwrap_or_else(|| config.keypair_path.clone());
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let key = SigningKey::generate();
    fs::write(&path, format!("{}\n", key.to_hex()))
        .with_context(|| format!("writing key {}", path.display()))?;
    println!("{} Wrote key to {}", "✓".green().bold(), path.display().to_string().bold());
    println!("  Pubkey: {}", key.pubkey().to_hex().cyan());
    Ok(())
}

fn cmd_post(args: PostArgs, config: &ClientConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let client = open_client(config)?;
    let tweet = client.send_tweet(&args.topic, &args.content)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tweet)?),
        OutputFormat::Text => {
            println!("{} Tweet sent", "✓".green().bold());
            println!("  Address: {}", tweet.address.to_hex().yellow());
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, config: &ClientConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let client = open_client(config)?;
    let address = RecordAddress::from_hex(&args.address)
        .with_context(|| format!("invalid address {}", args.address))?;
    let tweet = client.fetch(&address)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tweet)?),
        OutputFormat::Text => print_tweet(&tweet),
    }
    Ok(())
}

fn cmd_list(args: ListArgs, config: &ClientConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let client = open_client(config)?;

    let mut filters = Vec::new();
    if let Some(author) = &args.author {
        let author =
            Pubkey::from_hex(author).with_context(|| format!("invalid author key {author}"))?;
        filters.extend(query::by_author(&author));
    }
    if let Some(topic) = &args.topic {
        filters.extend(query::by_topic(topic));
    }
    if let Some(prefix) = &args.topic_prefix {
        filters.extend(query::by_topic_prefix(prefix));
    }
    if let Some(prefix) = &args.content_prefix {
        filters.extend(query::by_content_prefix(prefix));
    }

    let tweets = client.filter(&filters)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tweets)?),
        OutputFormat::Text if tweets.is_empty() => println!("No tweets."),
        OutputFormat::Text => {
            for tweet in &tweets {
                print_tweet(tweet);
                println!();
            }
            println!("{} tweet(s)", tweets.len().to_string().bold());
        }
    }
    Ok(())
}

fn print_tweet(tweet: &Tweet) {
    let when = tweet
        .created_at()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| tweet.account.timestamp.to_string());
    println!(
        "{}  {}  {}",
        tweet.address.short_hex().yellow().bold(),
        tweet.author_display().cyan(),
        when.dimmed()
    );
    if !tweet.topic().is_empty() {
        println!("  #{}", tweet.topic().green());
    }
    println!("  {}", tweet.content());
}
