//! QuorumKV CLI Client
//!
//! Command-line interface for talking to a QuorumKV cluster.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quorumkv::{Client, Config, Consistency, Result, Sequence};

/// QuorumKV CLI
#[derive(Parser, Debug)]
#[command(name = "quorumkv-cli")]
#[command(about = "CLI for the QuorumKV key-value store")]
struct Args {
    /// Node address (repeat to list fallbacks)
    #[arg(short, long, default_value = "127.0.0.1:7080")]
    node: Vec<String>,

    /// Cluster identifier
    #[arg(short, long, default_value = "quorumkv")]
    cluster: String,

    /// Client identifier shown in server logs
    #[arg(long, default_value = "quorumkv-cli")]
    client_id: String,

    /// Allow stale reads (best-effort consistency)
    #[arg(long)]
    dirty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get { key: String },

    /// Set a key-value pair
    Set { key: String, value: String },

    /// Delete a key
    Del { key: String },

    /// Check whether a key exists
    Exists { key: String },

    /// List keys starting with a prefix
    Prefix {
        prefix: String,

        /// Maximum number of keys (-1 = unbounded)
        #[arg(long, default_value_t = -1)]
        max: i32,
    },

    /// Delete every key starting with a prefix
    DelPrefix { prefix: String },

    /// Compare-and-swap a value
    TestAndSet {
        key: String,

        /// Expected current value (omit to require absence)
        #[arg(long)]
        expected: Option<String>,

        /// New value (omit to delete on match)
        #[arg(long)]
        value: Option<String>,
    },

    /// Atomically set several key-value pairs
    SetMany {
        /// key=value pairs
        pairs: Vec<String>,

        /// Ask the server to fsync before acknowledging
        #[arg(long)]
        sync: bool,
    },

    /// Ask which node is master
    WhoMaster,

    /// Print the server version
    Version,

    /// Run a consensus no-op
    Nop,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut builder = Config::builder()
        .cluster_id(args.cluster.as_str())
        .client_id(args.client_id.as_str());
    for node in &args.node {
        builder = builder.node(node.as_str());
    }

    let mut client = Client::new(builder.build())?;
    client.connect()?;

    let consistency = if args.dirty {
        Some(Consistency::Inconsistent)
    } else {
        None
    };

    match args.command {
        Commands::Get { key } => {
            println!("{}", client.get(consistency, &key)?);
        }
        Commands::Set { key, value } => {
            client.set(&key, &value)?;
        }
        Commands::Del { key } => {
            client.delete(&key)?;
        }
        Commands::Exists { key } => {
            println!("{}", client.exists(consistency, &key)?);
        }
        Commands::Prefix { prefix, max } => {
            for key in client.prefix_keys(consistency, &prefix, max)? {
                println!("{key}");
            }
        }
        Commands::DelPrefix { prefix } => {
            let removed = client.delete_prefix(&prefix)?;
            println!("{removed}");
        }
        Commands::TestAndSet {
            key,
            expected,
            value,
        } => {
            let previous =
                client.test_and_set(&key, expected.as_deref(), value.as_deref())?;
            match previous {
                Some(v) => println!("{v}"),
                None => println!("(none)"),
            }
        }
        Commands::SetMany { pairs, sync } => {
            let mut sequence = Sequence::new();
            for pair in &pairs {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    quorumkv::ClientError::Validation(format!(
                        "expected key=value, got {pair:?}"
                    ))
                })?;
                sequence.add_set(key, value);
            }
            client.apply(sequence, sync)?;
        }
        Commands::WhoMaster => match client.who_master()? {
            Some(node) => println!("{node}"),
            None => println!("(no master)"),
        },
        Commands::Version => {
            let (major, minor, patch, info) = client.version()?;
            println!("{major}.{minor}.{patch} {info}");
        }
        Commands::Nop => {
            client.nop()?;
        }
    }

    Ok(())
}
