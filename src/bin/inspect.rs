//! lsmcore inspection tool
//!
//! Decodes WAL, Index and SSTable files and prints their contents.

use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use lsmcore::storage::Index;
use lsmcore::wal::{Operation, WalReader};
use lsmcore::{Config, SSTable, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// lsmcore file inspector
#[derive(Parser, Debug)]
#[command(name = "lsmcore-inspect")]
#[command(about = "Decode lsmcore WAL, index and segment files")]
#[command(version)]
struct Args {
    /// Data directory (default WAL location, and where SSTable ids are resolved)
    #[arg(short, long, default_value = "./lsmcore_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every record of a WAL file, in log order
    Wal {
        /// WAL file (defaults to the data directory's WAL)
        path: Option<PathBuf>,
    },

    /// Print every entry of an index file, in file order
    Index {
        /// Index file
        path: PathBuf,
    },

    /// Look up a key in the SSTable with the given id
    Get {
        /// SSTable id (file names sstable_{id:06}.idx / .seg)
        id: u64,

        /// The key to look up
        key: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lsmcore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::builder().data_dir(&args.data_dir).build();

    if let Err(e) = run(&config, args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(config: &Config, command: Commands) -> lsmcore::Result<()> {
    match command {
        Commands::Wal { path } => {
            let path = path.unwrap_or_else(|| config.wal_path());
            tracing::info!("Reading WAL {}", path.display());

            let mut reader = WalReader::open(&path)?;
            let mut count = 0u64;
            while let Some(record) = reader.next_record()? {
                let op = match record.operation {
                    Operation::Put => "PUT",
                    Operation::Del => "DEL",
                };
                println!(
                    "{:>8}  {}  {}  {}",
                    count,
                    op,
                    show(&record.key),
                    show(&record.value)
                );
                count += 1;
            }
            println!("{} records, {} bytes", count, reader.position());
        }

        Commands::Index { path } => {
            let index = Index::from_file(File::open(&path)?)?;
            for entry in index.iter() {
                let (key, offset) = entry?;
                println!("{:>12}  {}", offset, show(&key));
            }
            println!("{} entries", index.size());
            index.close()?;
        }

        Commands::Get { id, key } => {
            // Never create files here: a missing table is an error
            let sstable = SSTable::new(
                File::open(config.index_path(id))?,
                File::open(config.segment_path(id))?,
            )?;
            match sstable.get(key.as_bytes()) {
                Some(Value::Live(value)) => println!("{}", show(&value)),
                Some(Value::Tombstone) => println!("(deleted)"),
                None => println!("(not found)"),
            }
            sstable.close()?;
        }
    }

    Ok(())
}

/// Printable form of arbitrary bytes
fn show(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}
