//! SlotKV CLI Client
//!
//! Command-line interface for interacting with SlotKV.

use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use rand::distributions::Alphanumeric;
use rand::Rng;
use slotkv::network::Client;
use slotkv::protocol::{Reply, Response};

/// SlotKV CLI
#[derive(Parser, Debug)]
#[command(name = "slotkv-cli")]
#[command(about = "CLI for SlotKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:5050")]
    server: String,

    /// Largest response payload to accept, in MB
    #[arg(long, default_value = "16")]
    max_message_mb: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set (at most 16 bytes)
        key: String,

        /// The value to set
        value: String,
    },

    /// List every pair whose key starts with a prefix
    Prefix {
        /// The prefix to match
        prefix: String,
    },

    /// Wipe the store
    Reset,

    /// Ping the server
    Ping,

    /// Write random keys with random values and report the elapsed time
    Bulk {
        /// Number of writes
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Size of each value in bytes
        #[arg(short = 'b', long, default_value = "512")]
        value_size: usize,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    client.set_max_message_size(args.max_message_mb.saturating_mul(1024 * 1024));

    let result = match args.command {
        Commands::Get { key } => client.get(&key),
        Commands::Set { key, value } => client.put(&key, &value),
        Commands::Prefix { prefix } => client.get_by_prefix(&prefix),
        Commands::Reset => client.reset(),
        Commands::Ping => client.ping(),
        Commands::Bulk { count, value_size } => return bulk(&mut client, count, value_size),
    };

    match result {
        Ok(response) => print_response(&response),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_response(response: &Response) -> ExitCode {
    match &response.reply {
        Some(Reply::Found(pair)) => println!("{}", pair.value),
        Some(Reply::Pairs(pairs)) if pairs.is_empty() => println!("(no keys with that prefix)"),
        Some(Reply::Pairs(pairs)) => {
            for pair in pairs {
                println!("{}\t{}", pair.key, pair.value);
            }
        }
        Some(Reply::Pong) => println!("PONG"),
        Some(_) => println!("{}", response.message),
        None => println!("{:?}: {}", response.status, response.message),
    }

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn bulk(client: &mut Client, count: usize, value_size: usize) -> ExitCode {
    let mut rng = rand::thread_rng();
    println!("Starting bulk write of {} values ({} bytes each)...", count, value_size);

    let started = Instant::now();
    for i in 0..count {
        // 8 random bytes as hex: exactly the 16-byte key limit
        let key: String = rng.gen::<[u8; 8]>().iter().map(|b| format!("{:02x}", b)).collect();
        let value: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(value_size)
            .map(char::from)
            .collect();

        match client.put(&key, &value) {
            Ok(response) if response.is_success() => {}
            Ok(response) => {
                eprintln!("write {} ({}) failed: {}", i, key, response.message);
                return ExitCode::FAILURE;
            }
            Err(e) => {
                eprintln!("write {} ({}) failed: {}", i, key, e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!("Bulk write completed in {:.2?}", started.elapsed());
    ExitCode::SUCCESS
}
