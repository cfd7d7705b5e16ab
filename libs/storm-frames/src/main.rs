use std::{fs::File, io::Read, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use jiff::Timestamp;
use miette::IntoDiagnostic;
use serde_json::{Map, Value};
use storm_frames::{
    Options, QueryRequest, TimeRange,
    config::{Config, OutputFormat},
    print, query, time_vars,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[clap(long, global = true, help = "Path to the configuration file")]
    config: Option<PathBuf>,
    #[clap(
        long,
        global = true,
        value_enum,
        default_value = "warn",
        help = "Log level (error, warn, info, debug, trace)"
    )]
    log_level: LogLevel,
}

#[derive(Subcommand, Clone)]
enum Commands {
    #[command(about = "Decode a captured storm response body into a table")]
    Decode(DecodeArgs),
    #[command(about = "Print the time variables injected for a time range")]
    Vars(VarsArgs),
    #[command(about = "Validate a query and print the outbound request")]
    Request(RequestArgs),
}

#[derive(clap::Args, Clone, Debug)]
struct DecodeArgs {
    #[clap(help = "Response body to decode, stdin when omitted")]
    input: Option<PathBuf>,
    #[clap(long, help = "Body came from the call endpoint")]
    call: bool,
    #[clap(long, help = "Flatten nested objects in call results")]
    flatten: bool,
    #[clap(long, help = "Ref id attached to the table")]
    ref_id: Option<String>,
    #[clap(long, value_enum, help = "Output format")]
    format: Option<OutputFormat>,
}

#[derive(clap::Args, Clone, Debug)]
struct RangeArgs {
    #[clap(long, help = "Start of the time range (RFC 3339)")]
    from: Option<Timestamp>,
    #[clap(long, help = "End of the time range (RFC 3339), defaults to now")]
    to: Option<Timestamp>,
}

#[derive(clap::Args, Clone, Debug)]
struct VarsArgs {
    #[clap(flatten)]
    range: RangeArgs,
    #[clap(long, help = "Existing variables as a JSON object")]
    vars: Option<String>,
}

#[derive(clap::Args, Clone, Debug)]
struct RequestArgs {
    #[clap(long, help = "Storm query text")]
    query: String,
    #[clap(long, help = "Send to the call endpoint")]
    call: bool,
    #[clap(long, help = "Query options as a JSON object")]
    opts: Option<String>,
    #[clap(flatten)]
    range: RangeArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl RangeArgs {
    fn resolve(&self, config: &Config) -> miette::Result<TimeRange> {
        let to = self.to.unwrap_or_else(Timestamp::now);
        let from = match self.from {
            Some(from) => from,
            None => to.checked_sub(config.lookback()?).into_diagnostic()?,
        };
        Ok(TimeRange::new(from, to))
    }
}

fn main() -> miette::Result<()> {
    let args = Cli::parse();
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::builder().from_env_lossy()
    } else {
        EnvFilter::builder().parse_lossy(format!("storm_frames={}", args.log_level.as_str()))
    };

    let _ = tracing_subscriber::fmt::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .try_init();

    let config = Config::load(args.config)?;
    let stdout = std::io::stdout().lock();
    match args.command {
        Commands::Decode(DecodeArgs {
            input,
            call,
            flatten,
            ref_id,
            format,
        }) => {
            let mut opts = Options::new();
            if flatten {
                opts.insert("flatten", Value::Bool(true));
            }
            opts.merge_defaults(&config.opts);
            let request = QueryRequest::default().with_call(call).with_opts(opts);
            let body: Box<dyn Read> = match input {
                Some(path) => {
                    info!(?path, "decoding response body");
                    Box::new(File::open(path).into_diagnostic()?)
                }
                None => Box::new(std::io::stdin().lock()),
            };
            let ref_id = ref_id.unwrap_or(config.ref_id);
            let table = query::decode_response(&request, body, &ref_id)?;
            print::write_table(&table, format.unwrap_or(config.format), stdout)?;
            Ok(())
        }
        Commands::Vars(VarsArgs { range, vars }) => {
            let range = range.resolve(&config)?;
            let mut vars: Map<String, Value> = match vars {
                Some(vars) => serde_json::from_str(&vars).into_diagnostic()?,
                None => Map::new(),
            };
            time_vars::inject(&mut vars, &range);
            serde_json::to_writer_pretty(stdout, &vars).into_diagnostic()?;
            println!();
            Ok(())
        }
        Commands::Request(RequestArgs {
            query: storm_query,
            call,
            opts,
            range,
        }) => {
            let range = range.resolve(&config)?;
            let mut opts: Options = match opts {
                Some(opts) => serde_json::from_str(&opts).into_diagnostic()?,
                None => Options::new(),
            };
            opts.merge_defaults(&config.opts);
            let request = QueryRequest::new(storm_query).with_call(call).with_opts(opts);
            let prepared = query::prepare(request, &range)?;
            println!("POST {}", prepared.path());
            serde_json::to_writer_pretty(stdout, &prepared.body).into_diagnostic()?;
            println!();
            Ok(())
        }
    }
}
