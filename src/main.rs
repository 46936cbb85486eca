mod catalogue;
mod cli;
mod error;

use clap::Parser;
use exn::ResultExt;
use quire_config::Config;
use quire_epub::{Bookshelf, Page, SearchCache};
use serde::Serialize;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use crate::catalogue::Catalogue;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    // RUST_LOG wins over the configured level; logs go to stderr so stdout stays JSON.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .or_raise(|| ErrorKind::Config)?;
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let root = cli.library.unwrap_or(config.library);
    tracing::debug!(library = %root.display(), "Opening Calibre library");
    let shelf = Bookshelf::new(Catalogue::open(&root)?, SearchCache::new(config.search.cache_ttl()));

    match cli.command {
        Command::Books { query, limit, offset } => {
            let page = quire_calibre::Page::new(limit, offset);
            print_json(&shelf.locator().search_books(&query, page).or_raise(|| ErrorKind::Catalogue)?)
        },
        Command::Book { book } => print_json(&shelf.locator().book(book).or_raise(|| ErrorKind::Catalogue)?),
        Command::Chapters { book } => print_json(&shelf.list_chapters(book).or_raise(|| ErrorKind::Document)?),
        Command::Content { book, chapter } => {
            let text = shelf.chapter_content(book, chapter).or_raise(|| ErrorKind::Document)?;
            writeln!(std::io::stdout().lock(), "{text}").or_raise(|| ErrorKind::Output)
        },
        Command::Search { book, query, limit, offset } => {
            let matches = shelf.search(book, &query, Page::new(limit, offset)).or_raise(|| ErrorKind::Document)?;
            print_json(&matches)
        },
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).or_raise(|| ErrorKind::Output)?;
    writeln!(stdout).or_raise(|| ErrorKind::Output)
}
