//! Offline TXT record source and the bounded lookup used at startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use shangd_checkpoints::{ResolverError, StaticResolver, TxtResolver};
use shangd_log::log_debug;

/// Reads `<domain> <txt-record>` lines; blank lines and `#` comments are
/// ignored.
pub fn read_dns_records(path: &Path) -> Result<StaticResolver, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read dns records {}: {err}", path.display()))?;
    let mut resolver = StaticResolver::new();
    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((domain, record)) = line.split_once(char::is_whitespace) else {
            return Err(format!(
                "{}:{}: expected '<domain> <record>'",
                path.display(),
                index + 1
            ));
        };
        resolver.insert(domain, record.trim().trim_matches('"'));
    }
    log_debug!("read {} dns records from {}", resolver.len(), path.display());
    Ok(resolver)
}

/// Result of a lookup performed ahead of time, replayed to the loader.
pub struct PrefetchedRecords(Result<Vec<String>, ResolverError>);

impl PrefetchedRecords {
    pub fn disabled() -> Self {
        Self(Err(ResolverError("dns checkpoints disabled".to_string())))
    }
}

impl TxtResolver for PrefetchedRecords {
    fn resolve_txt(&self, _domains: &[&str]) -> Result<Vec<String>, ResolverError> {
        self.0.clone()
    }
}

/// Resolves `domains` on a blocking thread, giving up after `timeout`.
pub async fn prefetch_records(
    records_path: Option<PathBuf>,
    domains: &'static [&'static str],
    timeout: Duration,
) -> PrefetchedRecords {
    let lookup = tokio::task::spawn_blocking(move || {
        let Some(path) = records_path else {
            return Err(ResolverError("no dns record source configured".to_string()));
        };
        let resolver = read_dns_records(&path).map_err(ResolverError)?;
        resolver.resolve_txt(domains)
    });

    let result = match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => Err(ResolverError(format!("dns lookup task failed: {err}"))),
        Err(_) => Err(ResolverError(format!(
            "dns lookup timed out after {}s",
            timeout.as_secs()
        ))),
    };
    PrefetchedRecords(result)
}
