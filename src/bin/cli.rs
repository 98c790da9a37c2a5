//! ssdbkv CLI Client
//!
//! Command-line interface for talking to an SSDB server.

use clap::{Parser, Subcommand};
use ssdbkv::{Client, Command, Endpoint, Reply, SerializationMode, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// ssdbkv CLI
#[derive(Parser, Debug)]
#[command(name = "ssdbkv-cli")]
#[command(about = "CLI for the SSDB key-value server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8888")]
    port: u16,

    /// Read timeout in seconds (0 disables it)
    #[arg(short, long, default_value = "30")]
    timeout: f64,

    /// Key prefix applied to every top-level key
    #[arg(long, default_value = "")]
    prefix: String,

    /// Serialization mode: none, native or compact
    #[arg(long, default_value = "none")]
    serializer: String,

    /// Connect on first command instead of at startup
    #[arg(long)]
    lazy: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get { key: String },

    /// Set a key-value pair
    Set {
        key: String,
        value: String,

        /// Time-to-live in seconds
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Delete a key
    Del { key: String },

    /// Check whether a key exists
    Exists { key: String },

    /// Increment an integer value
    Incr {
        key: String,
        #[arg(default_value = "1")]
        by: i64,
    },

    /// List keys in (start, end]
    Keys {
        #[arg(default_value = "")]
        start: String,
        #[arg(default_value = "")]
        end: String,
        #[arg(short, long, default_value = "100")]
        limit: i64,
    },

    /// List key/value pairs in (start, end]
    Scan {
        #[arg(default_value = "")]
        start: String,
        #[arg(default_value = "")]
        end: String,
        #[arg(short, long, default_value = "100")]
        limit: i64,
    },

    /// Get a hash field
    Hget { name: String, field: String },

    /// Set a hash field
    Hset { name: String, field: String, value: String },

    /// Get every field of a hash
    Hgetall { name: String },

    /// Set a sorted set member's score
    Zset { name: String, member: String, score: i64 },

    /// Get a sorted set member's score
    Zget { name: String, member: String },

    /// Push items onto the back of a queue
    Qpush {
        name: String,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Pop items from the front of a queue
    Qpop {
        name: String,
        #[arg(default_value = "1")]
        size: i64,
    },

    /// Send a raw command and print every reply block
    Raw {
        verb: String,
        args: Vec<String>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ssdbkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::debug!("Command failed: {:?}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> ssdbkv::Result<()> {
    let endpoint = Endpoint::builder()
        .host(&args.host)
        .port(args.port)
        .read_timeout(args.timeout)
        .build()?;

    tracing::debug!("Connecting to {}", endpoint.addr());
    let mut client = if args.lazy {
        Client::connect_lazy(endpoint)?
    } else {
        Client::connect(endpoint)?
    };
    client.set_prefix(&args.prefix);
    client.set_serialization_mode(args.serializer.parse::<SerializationMode>()?);

    match args.command {
        Commands::Get { key } => print_opt(client.get(&key)?),
        Commands::Set { key, value, ttl } => println!("{}", client.set(&key, value, ttl)?),
        Commands::Del { key } => println!("{}", client.del(&key)?),
        Commands::Exists { key } => println!("{}", client.exists(&key)?),
        Commands::Incr { key, by } => print_num(client.incr(&key, by)?),
        Commands::Keys { start, end, limit } => {
            for key in client.keys(&start, &end, limit)? {
                println!("{}", String::from_utf8_lossy(&key));
            }
        }
        Commands::Scan { start, end, limit } => {
            for (key, value) in client.scan(&start, &end, limit)? {
                println!("{}\t{}", String::from_utf8_lossy(&key), render(&value));
            }
        }
        Commands::Hget { name, field } => print_opt(client.hget(&name, &field)?),
        Commands::Hset { name, field, value } => {
            println!("{}", client.hset(&name, &field, value)?)
        }
        Commands::Hgetall { name } => {
            for (field, value) in client.hgetall(&name)? {
                println!("{}\t{}", String::from_utf8_lossy(&field), render(&value));
            }
        }
        Commands::Zset { name, member, score } => {
            println!("{}", client.zset(&name, &member, score)?)
        }
        Commands::Zget { name, member } => print_num(client.zget(&name, &member)?),
        Commands::Qpush { name, values } => print_num(client.qpush_back_many(&name, &values)?),
        Commands::Qpop { name, size } => {
            for value in client.qpop_front_many(&name, size)? {
                println!("{}", render(&value));
            }
        }
        Commands::Raw { verb, args } => {
            let command = args.iter().fold(Command::new(verb), |cmd, arg| cmd.arg(arg));
            print_reply(&client.raw(&command)?);
        }
    }

    client.close();
    Ok(())
}

fn print_opt(value: Option<Value>) {
    match value {
        Some(value) => println!("{}", render(&value)),
        None => println!("(not found)"),
    }
}

fn print_num(n: Option<i64>) {
    match n {
        Some(n) => println!("{}", n),
        None => println!("(not found)"),
    }
}

fn print_reply(reply: &Reply) {
    println!("{}", reply.status());
    for block in reply.blocks() {
        println!("{}", String::from_utf8_lossy(block));
    }
}

/// Human-readable form of a decoded value
fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Map(pairs) => {
            let pairs: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("{}: {}", render(k), render(v)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
    }
}
