//! finebench binary
//!
//! Runs the PUT/GET phases against FineDB and the in-process comparison
//! backends, then prints one line per phase and backend.

use clap::{Parser, ValueEnum};
use finebench::backend::memory::{MemoryCache, MemoryCollection, MemoryTable};
use finebench::backend::{Backend, CacheBackend, DocumentBackend, RelationalBackend};
use finebench::harness::total_elapsed;
use finebench::protocol::ProtocolVersion;
use finebench::{
    BenchConfig, ClientConfig, ConnectionMode, Harness, Phase, PhaseKind, Result, StoreClient,
    Workload,
};
use tracing_subscriber::{fmt, EnvFilter};

/// Backends that can be benchmarked
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// FineDB over its binary protocol
    Store,
    /// In-process cache
    Cache,
    /// In-process relational table
    Relational,
    /// In-process document collection
    Document,
}

/// Phases that can reuse a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PhaseArg {
    PutAsync,
    PutSync,
    Get,
    Del,
}

impl From<PhaseArg> for PhaseKind {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::PutAsync => PhaseKind::PutAsync,
            PhaseArg::PutSync => PhaseKind::PutSync,
            PhaseArg::Get => PhaseKind::Get,
            PhaseArg::Del => PhaseKind::Delete,
        }
    }
}

/// finebench
#[derive(Parser, Debug)]
#[command(name = "finebench")]
#[command(about = "Compare FineDB PUT/GET timings with other backends")]
#[command(version)]
struct Args {
    /// FineDB address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:11138")]
    addr: String,

    /// Protocol version: a (flags-in-high-bits) or b (command-in-low-bits)
    #[arg(short, long, default_value = "a")]
    protocol: ProtocolVersion,

    /// Times the workload is replayed per phase
    #[arg(short, long, default_value = "45")]
    repeat: usize,

    /// Reuse one connection per phase instead of connecting per operation
    #[arg(long)]
    shared: bool,

    /// Reuse one connection only in these phases (e.g. get)
    #[arg(long, value_enum, value_delimiter = ',')]
    shared_phases: Vec<PhaseArg>,

    /// Also run a DEL phase (protocol b only)
    #[arg(long)]
    delete: bool,

    /// Connect timeout in milliseconds (0 = none)
    #[arg(long, default_value = "1000")]
    connect_timeout_ms: u64,

    /// Read/write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "5000")]
    io_timeout_ms: u64,

    /// Pause that ends response data in milliseconds (0 = take what has arrived)
    #[arg(long, default_value = "10")]
    drain_timeout_ms: u64,

    /// Backends to run, in order
    #[arg(
        short,
        long,
        value_enum,
        value_delimiter = ',',
        default_values = ["store", "cache", "relational", "document"]
    )]
    backends: Vec<BackendKind>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,finebench=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("finebench v{}", finebench::VERSION);
    tracing::info!("Target: {} ({})", args.addr, args.protocol);

    if let Err(e) = run(args) {
        tracing::error!("Benchmark failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let client_config = ClientConfig::builder()
        .addr(&args.addr)
        .protocol(args.protocol)
        .connect_timeout_ms(args.connect_timeout_ms)
        .read_timeout_ms(args.io_timeout_ms)
        .write_timeout_ms(args.io_timeout_ms)
        .drain_timeout_ms(args.drain_timeout_ms)
        .build();

    let bench_config = BenchConfig {
        repeat_count: args.repeat,
        per_call_connection: !args.shared,
        shared_phases: args.shared_phases.iter().map(|&p| p.into()).collect(),
    };

    let mut phases = Phase::defaults();
    if args.delete {
        phases.push(Phase::delete());
    }
    let harness = Harness::new(bench_config.repeat_count, phases);

    let mut backends = Vec::with_capacity(args.backends.len());
    for kind in &args.backends {
        backends.push(build_backend(*kind, &client_config, &bench_config));
    }

    let workload = Workload::sample();
    let results = harness.run(&mut backends, &workload)?;

    for result in &results {
        println!("{}", result);
    }
    println!("total: {:?}", total_elapsed(&results));

    Ok(())
}

fn build_backend(
    kind: BackendKind,
    client_config: &ClientConfig,
    bench_config: &BenchConfig,
) -> Box<dyn Backend> {
    match kind {
        BackendKind::Store => {
            let mode = if bench_config.per_call_connection {
                ConnectionMode::PerCall
            } else {
                ConnectionMode::Shared
            };
            let client = bench_config
                .shared_phases
                .iter()
                .fold(StoreClient::new(client_config.clone(), mode), |client, &kind| {
                    client.with_phase_mode(kind, ConnectionMode::Shared)
                });
            Box::new(client)
        }
        BackendKind::Cache => Box::new(CacheBackend::new("cache", MemoryCache::new())),
        BackendKind::Relational => {
            Box::new(RelationalBackend::new("relational", MemoryTable::new()))
        }
        BackendKind::Document => Box::new(DocumentBackend::new(
            "document",
            MemoryCollection::new(),
            "finedb",
        )),
    }
}
