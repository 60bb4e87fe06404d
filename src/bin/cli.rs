//! rowvault CLI Client
//!
//! Command-line interface for a rowvault node.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rowvault::schema::ReplicationStrategy;
use rowvault::{Columns, ConnectionConfig, Consistency, RemoteStore, Session, Store};

/// rowvault CLI
#[derive(Parser, Debug)]
#[command(name = "rowvault-cli")]
#[command(about = "CLI for a rowvault node")]
#[command(version)]
struct Args {
    /// Node address
    #[arg(short, long, default_value = "127.0.0.1:9160")]
    server: String,

    /// Keyspace the session binds to
    #[arg(short, long, default_value = "rowvault")]
    keyspace: String,

    /// Username, if the node requires login
    #[arg(short, long)]
    user: Option<String>,

    /// Password for --user
    #[arg(short, long, requires = "user")]
    password: Option<String>,

    /// Read consistency level
    #[arg(long, default_value = "ONE")]
    read_consistency: Consistency,

    /// Write consistency level
    #[arg(long, default_value = "ANY")]
    write_consistency: Consistency,

    /// Chunk size for file uploads, in bytes
    #[arg(long)]
    chunk_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List keyspaces
    Keyspaces,

    /// Create the session keyspace
    AddKeyspace {
        /// Replication factor for the simple strategy
        #[arg(long, default_value = "1")]
        replication_factor: u32,
    },

    /// Drop the session keyspace
    DropKeyspace,

    /// List column families in the keyspace
    ColumnFamilies,

    /// Create a column family
    AddColumnFamily {
        name: String,

        /// Columns that hold raw bytes
        #[arg(long = "binary")]
        binary_columns: Vec<String>,
    },

    /// Drop a column family
    DropColumnFamily { name: String },

    /// Upsert a record from name=value pairs
    Put {
        column_family: String,
        key: String,
        #[arg(value_name = "NAME=VALUE", required = true)]
        columns: Vec<String>,
    },

    /// Print a record
    Get { column_family: String, key: String },

    /// Delete a record or file
    Del { column_family: String, key: String },

    /// Upload a file
    PutFile {
        column_family: String,
        key: String,
        path: PathBuf,
    },

    /// Download a file (to stdout without --output)
    GetFile {
        column_family: String,
        key: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List records in a column family
    List {
        column_family: String,

        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<u64>,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> rowvault::Result<()> {
    let mut builder = ConnectionConfig::builder(&args.keyspace)
        .read_consistency(args.read_consistency)
        .write_consistency(args.write_consistency);
    if let Some(user) = &args.user {
        builder = builder.credentials(user, args.password.as_deref().unwrap_or_default());
    }
    if let Some(size) = args.chunk_size {
        builder = builder.chunk_size(size);
    }

    let mut session: Session<RemoteStore> = Session::connect(&args.server, builder.build()?)?;

    match args.command {
        Commands::Keyspaces => {
            for name in session.keyspaces()? {
                println!("{}", name);
            }
        }
        Commands::AddKeyspace { replication_factor } => {
            let mut options = BTreeMap::new();
            options.insert("replication_factor".to_string(), replication_factor.to_string());
            report(session.add_keyspace(ReplicationStrategy::Simple, options)?, "created", "already exists");
        }
        Commands::DropKeyspace => {
            report(session.delete_keyspace()?, "dropped", "not found");
        }
        Commands::ColumnFamilies => {
            for name in session.column_families()? {
                println!("{}", name);
            }
        }
        Commands::AddColumnFamily { name, binary_columns } => {
            let binary: Vec<&str> = binary_columns.iter().map(String::as_str).collect();
            report(session.add_column_family(&name, &binary)?, "created", "already exists");
        }
        Commands::DropColumnFamily { name } => {
            report(session.delete_column_family(&name)?, "dropped", "not found");
        }
        Commands::Put {
            column_family,
            key,
            columns,
        } => {
            let columns = parse_columns(&columns)?;
            session.put_record(&column_family, &key, &columns)?;
            println!("OK");
        }
        Commands::Get { column_family, key } => match session.get_record(&column_family, &key)? {
            Some(columns) => write_record(&mut io::stdout().lock(), &key, &columns)?,
            None => println!("(nil)"),
        },
        Commands::Del { column_family, key } => {
            session.delete(&column_family, &key)?;
            println!("OK");
        }
        Commands::PutFile {
            column_family,
            key,
            path,
        } => {
            let reader = BufReader::new(File::open(&path)?);
            let info = session.put_file(&column_family, &key, reader, None)?;
            println!(
                "OK ({} bytes in {} chunks)",
                info.byte_count,
                info.chunk_count()
            );
        }
        Commands::GetFile {
            column_family,
            key,
            output,
        } => {
            let mut content = match session.get_file_content(&column_family, &key)? {
                Some(content) => content,
                None => {
                    println!("(nil)");
                    return Ok(());
                }
            };
            match output {
                Some(path) => {
                    let mut file = BufWriter::new(File::create(&path)?);
                    io::copy(&mut content, &mut file)?;
                    file.flush()?;
                }
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    io::copy(&mut content, &mut handle)?;
                    handle.flush()?;
                }
            }
        }
        Commands::List {
            column_family,
            limit,
        } => {
            let stdout = io::stdout();
            let printed = list_records(
                &mut session,
                &column_family,
                limit.unwrap_or(u64::MAX),
                &mut stdout.lock(),
            )?;
            println!("({} records)", printed);
        }
    }

    session.close();
    Ok(())
}

fn parse_columns(pairs: &[String]) -> rowvault::Result<Columns> {
    let mut columns = Columns::new();
    for pair in pairs {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| rowvault::Error::Config(format!("expected NAME=VALUE, got {:?}", pair)))?;
        columns.insert(name.to_string(), value.to_string());
    }
    Ok(columns)
}

fn write_record(out: &mut impl Write, key: &str, columns: &Columns) -> io::Result<()> {
    writeln!(out, "{}", key)?;
    for (name, value) in columns {
        writeln!(out, "  {} = {}", name, value)?;
    }
    Ok(())
}

/// Print at most `limit` records; returns how many were printed
fn list_records<S: Store>(
    session: &mut Session<S>,
    column_family: &str,
    limit: u64,
    out: &mut impl Write,
) -> rowvault::Result<u64> {
    if limit == 0 {
        return Ok(0);
    }

    let mut printed = 0u64;
    let mut failure = None;
    session.for_each_record(column_family, |key, columns| {
        if let Err(e) = write_record(out, key, columns) {
            failure = Some(e);
            return ControlFlow::Break(());
        }
        printed += 1;
        if printed >= limit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(printed),
    }
}

fn report(changed: bool, done: &str, unchanged: &str) {
    if changed {
        println!("OK ({})", done);
    } else {
        println!("OK ({})", unchanged);
    }
}
