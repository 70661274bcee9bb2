//! Checkpoints published as DNS TXT records.
//!
//! Each record reads `<height>:<hex-hash>`. Resolution, DNSSEC and any
//! agreement between domains belong to the [`TxtResolver`]; this module only
//! sees resolved text and feeds it through the conflict-checked insert.

use std::collections::HashMap;
use std::fmt;

use shangd_consensus::constants::DNS_RECORD_SEPARATOR;
use shangd_consensus::{chain_params, hash256_from_hex, Hash256, Network};
use shangd_log::{log_debug, log_info, log_trace, log_warn};

use crate::error::CheckpointError;
use crate::loader::LoadReport;
use crate::registry::Checkpoints;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolverError(pub String);

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ResolverError {}

pub trait TxtResolver: Send + Sync {
    /// Returns the TXT records published for `domains`.
    fn resolve_txt(&self, domains: &[&str]) -> Result<Vec<String>, ResolverError>;
}

/// What to do when the resolver itself fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DnsFailurePolicy {
    /// Fail-open on resolver failure: the load succeeds with nothing added.
    /// This is the shipped behaviour and awaits product confirmation.
    #[default]
    FailOpen,
    /// Surface the failure as [`CheckpointError::Resolver`].
    FailClosed,
}

/// Splits a `<height>:<hex-hash>` record, returning `None` if either half is
/// malformed. The hash must be exactly 64 hex characters with nothing around
/// it.
pub fn parse_txt_record(record: &str) -> Option<(u64, Hash256)> {
    let (height, hash) = record.split_once(DNS_RECORD_SEPARATOR)?;
    let height = height.trim().parse::<u64>().ok()?;
    let hash = hash256_from_hex(hash).ok()?;
    Some((height, hash))
}

/// Serves fixed records per domain.
#[derive(Clone, Debug, Default)]
pub struct StaticResolver {
    records: HashMap<String, Vec<String>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, domain: impl Into<String>, record: impl Into<String>) {
        self.records
            .entry(domain.into())
            .or_default()
            .push(record.into());
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TxtResolver for StaticResolver {
    fn resolve_txt(&self, domains: &[&str]) -> Result<Vec<String>, ResolverError> {
        let records: Vec<String> = domains
            .iter()
            .filter_map(|domain| self.records.get(*domain))
            .flatten()
            .cloned()
            .collect();
        if records.is_empty() {
            return Err(ResolverError(format!(
                "no TXT records for {}",
                domains.join(", ")
            )));
        }
        Ok(records)
    }
}

impl Checkpoints {
    pub fn load_checkpoints_from_dns(
        &mut self,
        network: Network,
        resolver: &dyn TxtResolver,
    ) -> Result<LoadReport, CheckpointError> {
        self.load_checkpoints_from_dns_with_policy(network, resolver, DnsFailurePolicy::FailOpen)
    }

    pub fn load_checkpoints_from_dns_with_policy(
        &mut self,
        network: Network,
        resolver: &dyn TxtResolver,
        policy: DnsFailurePolicy,
    ) -> Result<LoadReport, CheckpointError> {
        let params = chain_params(network);
        let records = match resolver.resolve_txt(params.checkpoint_dns_domains) {
            Ok(records) => records,
            Err(err) => match policy {
                DnsFailurePolicy::FailOpen => {
                    log_warn!("checkpoint dns lookup failed, continuing without: {err}");
                    return Ok(LoadReport::default());
                }
                DnsFailurePolicy::FailClosed => return Err(CheckpointError::Resolver(err.0)),
            },
        };

        let mut report = LoadReport::default();
        for record in &records {
            let Some((height, hash)) = parse_txt_record(record) else {
                log_debug!("skipping malformed checkpoint record {record:?}");
                report.skipped += 1;
                continue;
            };
            if self.add_checkpoint_hash(height, hash)? {
                log_trace!("applied dns checkpoint at height {height}");
                report.added += 1;
            } else {
                report.skipped += 1;
            }
        }
        log_info!(
            "checkpoint dns records for {}: {} applied, {} skipped",
            network.as_str(),
            report.added,
            report.skipped
        );
        Ok(report)
    }
}
