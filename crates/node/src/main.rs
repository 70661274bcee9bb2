use shangd_log as logging;

mod dns_records;
mod observer;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shangd_checkpoints::{
    write_checkpoints_file, CheckpointFile, Checkpoints, LoadReport, SharedCheckpoints,
};
use shangd_consensus::constants::DEFAULT_DNS_TIMEOUT_SECS;
use shangd_consensus::{chain_params, hash256_from_hex, Network};
use shangd_log::{log_error, log_info, log_warn};

pub use crate::dns_records::{prefetch_records, read_dns_records, PrefetchedRecords};
pub use crate::observer::LogObserver;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Summary,
    Points,
    MaxHeight,
    Zone { height: u64 },
    Check { height: u64, hash: String },
    Alternative { blockchain_height: u64, block_height: u64 },
    Export { path: PathBuf },
}

#[derive(Clone, Debug)]
struct Config {
    network: Network,
    data_dir: PathBuf,
    checkpoints_file: Option<PathBuf>,
    dns_checkpoints: bool,
    dns_records: Option<PathBuf>,
    dns_timeout_secs: u64,
    log_level: logging::Level,
    log_format: logging::Format,
    log_timestamps: bool,
    command: Command,
}

impl Config {
    fn checkpoints_path(&self) -> PathBuf {
        self.checkpoints_file.clone().unwrap_or_else(|| {
            self.data_dir
                .join(chain_params(self.network).checkpoints_file_name)
        })
    }
}

#[derive(Debug)]
enum CliAction {
    Run(Box<Config>),
    PrintHelp,
    PrintVersion,
}

pub async fn run_entry() -> Result<(), String> {
    match parse_args()? {
        CliAction::PrintHelp => {
            println!("{}", usage());
            Ok(())
        }
        CliAction::PrintVersion => {
            println!("shangd-checkpoints {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliAction::Run(config) => run_with_config(*config).await,
    }
}

async fn run_with_config(config: Config) -> Result<(), String> {
    logging::init(logging::LogConfig {
        level: config.log_level,
        format: config.log_format,
        timestamps: config.log_timestamps,
    });

    log_info!(
        "Startup: network={}, data_dir={}, dns_checkpoints={}",
        config.network.as_str(),
        config.data_dir.display(),
        config.dns_checkpoints
    );
    let checkpoints = build_checkpoints(&config).await?;
    let shared = SharedCheckpoints::new(checkpoints);
    run_command(&config.command, &shared)
}

/// Builds the registry in trust order: defaults, then file, then DNS.
async fn build_checkpoints(config: &Config) -> Result<Checkpoints, String> {
    let mut checkpoints = Checkpoints::with_observer(Arc::new(LogObserver));
    if let Err(err) = checkpoints.init_default_checkpoints(config.network) {
        log_error!(
            "hardcoded checkpoints for {} are inconsistent: {err}",
            config.network.as_str()
        );
        return Err(format!("default checkpoints rejected: {err}"));
    }

    let params = chain_params(config.network);
    let records = if config.dns_checkpoints {
        prefetch_records(
            config.dns_records.clone(),
            params.checkpoint_dns_domains,
            Duration::from_secs(config.dns_timeout_secs),
        )
        .await
    } else {
        PrefetchedRecords::disabled()
    };

    let path = config.checkpoints_path();
    let report = match checkpoints.load_new_checkpoints(
        &path,
        config.network,
        config.dns_checkpoints,
        &records,
    ) {
        Ok(report) => report,
        Err(err) => {
            log_error!("checkpoint loading failed: {err}");
            return Err(format!("failed to load checkpoints: {err}"));
        }
    };
    log_loaded(&checkpoints, report);
    Ok(checkpoints)
}

fn log_loaded(checkpoints: &Checkpoints, report: LoadReport) {
    match checkpoints.max_height() {
        Some(max) => log_info!(
            "{} checkpoints active ({} new, {} ignored), highest at {max}",
            checkpoints.len(),
            report.added,
            report.skipped
        ),
        None => log_warn!("no checkpoints active, fork protection disabled"),
    }
}

fn run_command(command: &Command, shared: &SharedCheckpoints) -> Result<(), String> {
    let checkpoints = shared.snapshot();
    match command {
        Command::Summary => {
            println!(
                "{}",
                json!({
                    "checkpoints": checkpoints.len(),
                    "max_height": checkpoints.max_height(),
                })
            );
        }
        Command::Points => {
            let file = CheckpointFile::from_checkpoints(&checkpoints);
            let text = serde_json::to_string_pretty(&file)
                .map_err(|err| format!("failed to encode checkpoints: {err}"))?;
            println!("{text}");
        }
        Command::MaxHeight => {
            let max = checkpoints.get_max_height().map_err(|err| err.to_string())?;
            println!("{max}");
        }
        Command::Zone { height } => {
            println!("{}", checkpoints.is_in_checkpoint_zone(*height));
        }
        Command::Check { height, hash } => {
            let hash = hash256_from_hex(hash).map_err(|err| format!("invalid hash: {err}"))?;
            let check = checkpoints.check_block_detailed(*height, &hash);
            println!(
                "{}",
                json!({
                    "height": height,
                    "passed": check.passed,
                    "is_checkpoint": check.is_checkpoint,
                })
            );
        }
        Command::Alternative {
            blockchain_height,
            block_height,
        } => {
            println!(
                "{}",
                checkpoints.is_alternative_block_allowed(*blockchain_height, *block_height)
            );
        }
        Command::Export { path } => {
            write_checkpoints_file(path, &checkpoints)
                .map_err(|err| format!("failed to export to {}: {err}", path.display()))?;
            log_info!("wrote {} checkpoints to {}", checkpoints.len(), path.display());
        }
    }
    Ok(())
}

fn parse_args() -> Result<CliAction, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_height(raw: Option<String>, what: &str) -> Result<u64, String> {
    let value = raw.ok_or_else(|| format!("missing {what}\n{}", usage()))?;
    value
        .parse::<u64>()
        .map_err(|_| format!("invalid {what} '{value}'\n{}", usage()))
}

fn parse_command<I>(name: &str, args: &mut I) -> Result<Command, String>
where
    I: Iterator<Item = String>,
{
    match name {
        "points" => Ok(Command::Points),
        "max-height" => Ok(Command::MaxHeight),
        "zone" => Ok(Command::Zone {
            height: parse_height(args.next(), "height")?,
        }),
        "check" => {
            let height = parse_height(args.next(), "height")?;
            let hash = args
                .next()
                .ok_or_else(|| format!("missing hash for check\n{}", usage()))?;
            Ok(Command::Check { height, hash })
        }
        "alt" => Ok(Command::Alternative {
            blockchain_height: parse_height(args.next(), "blockchain height")?,
            block_height: parse_height(args.next(), "block height")?,
        }),
        "export" => {
            let path = args
                .next()
                .ok_or_else(|| format!("missing path for export\n{}", usage()))?;
            Ok(Command::Export {
                path: PathBuf::from(path),
            })
        }
        _ => Err(format!("unknown command '{name}'\n{}", usage())),
    }
}

fn parse_args_from<I>(raw_args: I) -> Result<CliAction, String>
where
    I: IntoIterator<Item = String>,
{
    let mut network = Network::Mainnet;
    let mut data_dir: Option<PathBuf> = None;
    let mut checkpoints_file: Option<PathBuf> = None;
    let mut dns_checkpoints = false;
    let mut dns_records: Option<PathBuf> = None;
    let mut dns_timeout_secs = DEFAULT_DNS_TIMEOUT_SECS;
    let mut log_level = logging::Level::Info;
    let mut log_format = logging::Format::Text;
    let mut log_timestamps = true;
    let mut command = Command::Summary;
    let mut args = raw_args.into_iter().peekable();

    if let Some(first) = args.peek().map(|value| value.as_str()) {
        match first {
            "help" => return Ok(CliAction::PrintHelp),
            "version" => return Ok(CliAction::PrintVersion),
            name if !name.starts_with('-') => {
                let name = name.to_string();
                let _ = args.next();
                command = parse_command(&name, &mut args)?;
            }
            _ => {}
        }
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(CliAction::PrintHelp),
            "--version" | "-V" => return Ok(CliAction::PrintVersion),
            "--network" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for --network\n{}", usage()))?;
                network = Network::parse(&value)
                    .ok_or_else(|| format!("invalid network '{value}'\n{}", usage()))?;
            }
            "--data-dir" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for --data-dir\n{}", usage()))?;
                data_dir = Some(PathBuf::from(value));
            }
            "--checkpoints-file" => {
                let value = args.next().ok_or_else(|| {
                    format!("missing value for --checkpoints-file\n{}", usage())
                })?;
                checkpoints_file = Some(PathBuf::from(value));
            }
            "--dns-checkpoints" => dns_checkpoints = true,
            "--no-dns-checkpoints" => dns_checkpoints = false,
            "--dns-records" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for --dns-records\n{}", usage()))?;
                dns_records = Some(PathBuf::from(value));
            }
            "--dns-timeout-secs" => {
                let value = args.next().ok_or_else(|| {
                    format!("missing value for --dns-timeout-secs\n{}", usage())
                })?;
                dns_timeout_secs = value
                    .parse::<u64>()
                    .map_err(|_| format!("invalid dns timeout '{value}'\n{}", usage()))?;
                if dns_timeout_secs == 0 {
                    return Err(format!("dns timeout must be > 0\n{}", usage()));
                }
            }
            "--log-level" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for --log-level\n{}", usage()))?;
                log_level = logging::Level::parse(&value)
                    .ok_or_else(|| format!("invalid log level '{value}'\n{}", usage()))?;
            }
            "--log-format" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for --log-format\n{}", usage()))?;
                log_format = logging::Format::parse(&value)
                    .ok_or_else(|| format!("invalid log format '{value}'\n{}", usage()))?;
            }
            "--log-timestamps" => log_timestamps = true,
            "--no-log-timestamps" => log_timestamps = false,
            other => return Err(format!("unknown argument '{other}'\n{}", usage())),
        }
    }

    Ok(CliAction::Run(Box::new(Config {
        network,
        data_dir: data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        checkpoints_file,
        dns_checkpoints,
        dns_records,
        dns_timeout_secs,
        log_level,
        log_format,
        log_timestamps,
        command,
    })))
}

fn usage() -> String {
    [
        "Usage:",
        "  shangd-checkpoints [command] [options]",
        "",
        "Commands:",
        "  help                  Print this help and exit",
        "  version               Print version and exit",
        "  points                Print every active checkpoint as a hash file",
        "  max-height            Print the highest checkpoint height",
        "  zone HEIGHT           Print whether HEIGHT is inside the checkpoint zone",
        "  check HEIGHT HASH     Match a block hash against the checkpoint at HEIGHT",
        "  alt TIP HEIGHT        Print whether an alternative block at HEIGHT is allowed with the chain at TIP",
        "  export PATH           Write active checkpoints to PATH",
        "",
        "Options:",
        "  --help, -h  Print this help and exit",
        "  --version, -V  Print version and exit",
        "  --network  Network selection (mainnet|testnet) (default: mainnet)",
        "  --data-dir  Base data directory (default: ./data)",
        "  --checkpoints-file  Checkpoint hash file (default: <data-dir>/checkpoints.json)",
        "  --dns-checkpoints  Also load checkpoints published in DNS TXT records",
        "  --no-dns-checkpoints  Skip DNS checkpoints (default)",
        "  --dns-records  File of '<domain> <txt-record>' lines answering DNS lookups",
        "  --dns-timeout-secs  Give up on DNS checkpoints after N seconds (default: 20)",
        "  --log-level  Log verbosity (error|warn|info|debug) (default: info)",
        "  --log-format  Log output format (text|json) (default: text)",
        "  --log-timestamps  Enable timestamps in text logs (default: on)",
        "  --no-log-timestamps  Disable timestamps in text logs",
    ]
    .join("\n")
}
