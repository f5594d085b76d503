use std::{env, process};

use anyhow::Context;
use booksearch_core::config::Config;
use booksearch_core::runner::{Runner, DEFAULT_AUTHORS};
use booksearch_core::types::sample_book;
use booksearch_elastic::ElasticClient;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Options {
    show_mapping: bool,
    insert_sample: bool,
    authors: Vec<String>,
}

#[derive(Debug, PartialEq)]
enum Parsed {
    Run(Options),
    Help,
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--show-mapping] [--insert-sample] [--author <name>]...\n\
         \n\
         Ensures the configured indexes exist, then searches them for books by\n\
         the given authors (default: {}).\n\
         Settings come from booksearch.toml and BOOKSEARCH_* env vars.",
        DEFAULT_AUTHORS.join(", ")
    )
}

fn parse_args(args: &[String]) -> Result<Parsed, String> {
    let mut opts = Options::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--show-mapping" => opts.show_mapping = true,
            "--insert-sample" => opts.insert_sample = true,
            "--author" | "-a" => {
                let name = args.get(i + 1).ok_or("--author requires a name")?;
                opts.authors.push(name.clone());
                i += 1;
            }
            "--help" | "-h" => return Ok(Parsed::Help),
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(Parsed::Run(opts))
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("booksearch");
    let opts = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(Parsed::Run(opts)) => opts,
        Ok(Parsed::Help) => {
            println!("{}", usage(prog));
            return Ok(());
        }
        Err(msg) => {
            eprintln!("Error: {msg}\n\n{}", usage(prog));
            process::exit(2);
        }
    };

    let settings = Config::load()?.settings().context("Error loading config")?;
    tracing::info!(endpoint = %settings.endpoint, indexes = ?settings.indexes, "starting");

    let client = ElasticClient::from_settings(&settings)?;
    let runner = Runner::from_settings(client, &settings, &env::current_dir()?)?;

    runner.init_indexes()?;

    if opts.show_mapping {
        let index = &runner.indexes()[0];
        let mapping = runner.inspect_mapping(index)?;
        let pretty = serde_json::to_string_pretty(&mapping)?;
        println!("Mapping for index '{}':\n{}", index, pretty);
    }

    if opts.insert_sample {
        runner.insert_document(&sample_book())?;
    }

    let authors: Vec<&str> = if opts.authors.is_empty() {
        DEFAULT_AUTHORS.to_vec()
    } else {
        opts.authors.iter().map(String::as_str).collect()
    };
    let outcome = runner.search_authors(&authors)?;
    for book in &outcome.records {
        println!("{book}");
    }
    if outcome.skipped > 0 {
        tracing::warn!(
            skipped = outcome.skipped,
            "some hits did not decode as books"
        );
    }
    tracing::info!(
        printed = outcome.records.len(),
        total = ?outcome.total,
        "search complete"
    );
    Ok(())
}
