use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(about = "List, read and search the EPUBs of a Calibre library")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Calibre library root; overrides the configured one
    #[arg(long, short, global = true)]
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find books by title, author, tag or description (case-insensitive)
    Books {
        /// Text to look for; lists every book when omitted
        #[arg(default_value = "")]
        query: String,
        /// Maximum number of books (0 for all)
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Number of books to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Show the catalogue record of one book
    Book {
        /// Calibre book id
        book: u64,
    },
    /// List the chapters of a book in reading order
    Chapters {
        /// Calibre book id
        book: u64,
    },
    /// Print the plain text of one chapter
    Content {
        /// Calibre book id
        book: u64,
        /// Zero-based chapter index
        chapter: usize,
    },
    /// Find paragraphs containing a phrase (case-insensitive)
    Search {
        /// Calibre book id
        book: u64,
        /// Text to look for
        query: String,
        /// Maximum number of results (0 for all)
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
}
