// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reachability probe feeding the connectivity detector.
//!
//! The probe stands in for the platform's online/offline signal: a periodic
//! TCP connect to the backend host. It only reports; transition handling
//! lives in [`ConnectivityDetector`].

use std::time::Duration;

use suvidha_config::model::{BackendConfig, ConnectivityConfig};
use suvidha_core::{Reachability, SuvidhaError};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::connectivity::ConnectivityDetector;

pub struct ReachabilityProbe {
    address: String,
    interval: Duration,
    timeout: Duration,
}

impl ReachabilityProbe {
    pub fn new(address: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            interval,
            timeout,
        }
    }

    /// Probe `connectivity.probe_address`, or the backend host when unset.
    pub fn from_config(
        connectivity: &ConnectivityConfig,
        backend: &BackendConfig,
    ) -> Result<Self, SuvidhaError> {
        let address = match &connectivity.probe_address {
            Some(addr) => addr.clone(),
            None => backend_address(&backend.base_url)?,
        };
        Ok(Self::new(
            address,
            Duration::from_secs(connectivity.probe_interval_secs),
            Duration::from_millis(connectivity.probe_timeout_ms),
        ))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// One connect attempt.
    pub async fn probe_once(&self) -> Reachability {
        let attempt = tokio::time::timeout(self.timeout, TcpStream::connect(self.address.as_str())).await;
        match attempt {
            Ok(Ok(_)) => Reachability::Online,
            Ok(Err(e)) => {
                debug!(address = %self.address, error = %e, "probe connect failed");
                Reachability::Offline
            }
            Err(_) => {
                debug!(address = %self.address, timeout = ?self.timeout, "probe timed out");
                Reachability::Offline
            }
        }
    }

    /// Probe on every interval tick until cancelled, reporting each result.
    pub async fn run(self, detector: ConnectivityDetector, cancel: CancellationToken) {
        info!(address = %self.address, interval = ?self.interval, "reachability probe started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reachability = self.probe_once().await;
                    detector.report(reachability);
                }
                _ = cancel.cancelled() => {
                    info!("reachability probe shutting down");
                    break;
                }
            }
        }
    }
}

/// `host:port` of the backend, defaulting the port from the scheme.
fn backend_address(base_url: &str) -> Result<String, SuvidhaError> {
    let url = reqwest::Url::parse(base_url)
        .map_err(|e| SuvidhaError::Config(format!("backend.base_url `{base_url}`: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| SuvidhaError::Config(format!("backend.base_url `{base_url}` has no host")))?;
    let port = url.port_or_known_default().ok_or_else(|| {
        SuvidhaError::Config(format!("backend.base_url `{base_url}` has no port"))
    })?;
    Ok(format!("{host}:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_derived_from_base_url() {
        assert_eq!(backend_address("http://127.0.0.1:8000").unwrap(), "127.0.0.1:8000");
        assert_eq!(backend_address("https://api.suvidha.example").unwrap(), "api.suvidha.example:443");
        assert!(backend_address("not a url").is_err());
    }

    #[test]
    fn explicit_probe_address_wins() {
        let connectivity = ConnectivityConfig {
            probe_address: Some("10.0.0.1:53".into()),
            ..ConnectivityConfig::default()
        };
        let probe = ReachabilityProbe::from_config(&connectivity, &BackendConfig::default()).unwrap();
        assert_eq!(probe.address(), "10.0.0.1:53");
    }

    #[tokio::test]
    async fn open_port_is_online_closed_port_is_offline() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().to_string();
        let probe = ReachabilityProbe::new(open, Duration::from_secs(1), Duration::from_secs(1));
        assert_eq!(probe.probe_once().await, Reachability::Online);

        drop(listener);
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let closed_addr = closed.local_addr().unwrap().to_string();
        drop(closed);
        let probe = ReachabilityProbe::new(closed_addr, Duration::from_secs(1), Duration::from_secs(1));
        assert_eq!(probe.probe_once().await, Reachability::Offline);
    }

    #[tokio::test]
    async fn run_reports_into_detector_until_cancelled() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let detector = ConnectivityDetector::new(Reachability::Offline);
        let mut sub = detector.subscribe().unwrap();
        let cancel = CancellationToken::new();

        let probe = ReachabilityProbe::new(addr, Duration::from_millis(20), Duration::from_secs(1));
        let task = tokio::spawn(probe.run(detector.clone(), cancel.clone()));

        let event = tokio::time::timeout(Duration::from_secs(5), sub.recv()).await.unwrap();
        assert!(event.is_some());
        assert!(detector.is_online());

        cancel.cancel();
        task.await.unwrap();
    }
}
