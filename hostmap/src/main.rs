use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use hostmap_core::checkpoint::CheckpointStore;
use hostmap_core::config::CrawlConfig;
use hostmap_core::crawl::{CrawlProgressCallback, PageProcessor};
use hostmap_core::graph::HostGraph;
use hostmap_core::print_banner;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use url::Url;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command).await,
        Some(("stats", primary_command)) => handle_stats(primary_command),
        None => return,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

async fn handle_crawl(sub_matches: &ArgMatches) -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut config = match sub_matches.get_one::<String>("config") {
        Some(path) => {
            CrawlConfig::from_file(&expand_path(path)).map_err(anyhow::Error::msg)?
        }
        None => CrawlConfig::default(),
    };

    if let Some(seeds) = sub_matches.get_many::<Url>("seed") {
        config.seed_urls = seeds.map(|u| u.to_string()).collect();
    }
    if let Some(batch_size) = sub_matches.get_one::<usize>("batch-size") {
        config.batch_size = *batch_size;
    }
    if let Some(max) = sub_matches.get_one::<u64>("max-per-domain") {
        config.max_links_per_root_domain = *max;
    }
    if let Some(timeout) = sub_matches.get_one::<u64>("timeout") {
        config.fetch_timeout_secs = *timeout;
    }
    config.validate().map_err(anyhow::Error::msg)?;

    let db_path = expand_path(sub_matches.get_one::<String>("database").unwrap());
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let state_dir = expand_path(sub_matches.get_one::<String>("state-dir").unwrap());

    let graph = HostGraph::open(&db_path)?;
    let checkpoints = CheckpointStore::new(&state_dir);
    let mut processor = PageProcessor::new(config, graph, checkpoints)?;

    if processor.state().is_exhausted() {
        anyhow::bail!(
            "nothing to crawl: no resumable checkpoint in {} and no seed URLs given \
            (use --seed or a config file)",
            state_dir.display()
        );
    }

    println!("Database: {}", db_path.display());
    println!("Checkpoints: {}", state_dir.display());
    println!("Queue: {} URLs\n", processor.state().queue_len());

    // Spinner fed by the checkpoint progress callback.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Crawling...");

    let spinner_clone = spinner.clone();
    let progress_callback: CrawlProgressCallback = Arc::new(move |progress| {
        spinner_clone.set_message(format!(
            "Processed {} pages | queue {} | {} root domains",
            progress.pages_processed, progress.queue_depth, progress.domains_seen
        ));
    });
    processor = processor.with_progress_callback(progress_callback);

    // Ctrl-C raises the flag; the loop finishes its current page, then the
    // final commit and checkpoint run before we get back here.
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }

    let summary = processor.run(&shutdown).await?;
    spinner.finish_and_clear();

    if summary.interrupted {
        println!("{}", "Interrupted - progress checkpointed.".yellow());
    } else {
        println!("{}", "Crawl complete.".green());
    }
    println!("  Pages processed: {}", summary.pages_processed);
    println!("  Queue remaining: {}", summary.queue_depth);
    println!("  Root domains seen: {}", summary.domains_seen);
    println!("  Hosts known: {}", processor.graph().host_count()?);
    println!("  Edges recorded: {}", processor.graph().edge_count()?);

    Ok(())
}

fn handle_stats(sub_matches: &ArgMatches) -> anyhow::Result<()> {
    let db_path = expand_path(sub_matches.get_one::<String>("database").unwrap());
    if !HostGraph::exists(&db_path) {
        anyhow::bail!("no database at {}", db_path.display());
    }
    let top = *sub_matches.get_one::<usize>("top").unwrap();

    let graph = HostGraph::open(&db_path)?;
    println!("Hosts: {}", graph.host_count()?);
    println!("Resource edges: {}", graph.edge_count()?);

    let targets = graph.top_targets(top)?;
    if !targets.is_empty() {
        println!("\nMost referenced hosts:");
        for (hostname, refs) in targets {
            println!("  {:>6}  {}", refs.to_string().cyan(), hostname);
        }
    }

    Ok(())
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
