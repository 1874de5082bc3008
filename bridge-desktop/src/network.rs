//! Network Monitoring Implementations

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    network::{NetworkChangeStream, NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType},
};
use core_async::sync::watch;
use core_async::time::{sleep, timeout, Duration};
use std::sync::Arc;
use tracing::{debug, info};

/// Desktop network monitor implementation
///
/// Detects connectivity by opening a TCP connection to a well-known endpoint.
/// Changes are discovered by polling; platform notification APIs (netlink,
/// SystemConfiguration, Network List Manager) would avoid the poll but need
/// per-OS dependencies.
#[derive(Clone)]
pub struct DesktopNetworkMonitor {
    target_addr: String,
    connect_timeout: Duration,
    poll_interval: Duration,
}

impl DesktopNetworkMonitor {
    /// Create a monitor that connects to a public DNS resolver.
    pub fn new() -> Self {
        Self {
            target_addr: "8.8.8.8:53".to_string(),
            connect_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(5),
        }
    }

    pub fn with_target_addr(mut self, addr: impl Into<String>) -> Self {
        self.target_addr = addr.into();
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn check_connectivity(&self) -> NetworkStatus {
        match timeout(
            self.connect_timeout,
            tokio::net::TcpStream::connect(self.target_addr.as_str()),
        )
        .await
        {
            Ok(Ok(_)) => NetworkStatus::Connected,
            Ok(Err(_)) | Err(_) => NetworkStatus::Disconnected,
        }
    }
}

impl Default for DesktopNetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkMonitor for DesktopNetworkMonitor {
    async fn get_network_info(&self) -> Result<NetworkInfo> {
        let status = self.check_connectivity().await;
        debug!(status = ?status, target = %self.target_addr, "Reachability check finished");

        Ok(match status {
            // Ethernet and WiFi are indistinguishable without platform APIs.
            NetworkStatus::Connected => NetworkInfo::connected(Some(NetworkType::Other)),
            _ => NetworkInfo::disconnected(),
        })
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn NetworkChangeStream>> {
        let last_status = Some(self.check_connectivity().await);
        Ok(Box::new(PollingChangeStream {
            monitor: self.clone(),
            last_status,
        }))
    }
}

/// Change stream that re-checks reachability on a fixed interval.
struct PollingChangeStream {
    monitor: DesktopNetworkMonitor,
    last_status: Option<NetworkStatus>,
}

#[async_trait]
impl NetworkChangeStream for PollingChangeStream {
    async fn next(&mut self) -> Option<NetworkInfo> {
        loop {
            sleep(self.monitor.poll_interval).await;

            if let Ok(info) = self.monitor.get_network_info().await {
                if self.last_status != Some(info.status) {
                    self.last_status = Some(info.status);
                    return Some(info);
                }
            }
        }
    }
}

/// Network monitor driven by the host.
///
/// Mobile shells and browsers already deliver online/offline callbacks; the
/// host forwards them with [`ManualNetworkMonitor::set_online`]. Also the
/// monitor of choice for tests and demos.
#[derive(Clone)]
pub struct ManualNetworkMonitor {
    state: Arc<watch::Sender<bool>>,
}

impl ManualNetworkMonitor {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Report a connectivity change. Repeating the current value is ignored.
    pub fn set_online(&self, online: bool) {
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            info!(online, "Connectivity changed");
        }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }
}

#[async_trait]
impl NetworkMonitor for ManualNetworkMonitor {
    async fn get_network_info(&self) -> Result<NetworkInfo> {
        Ok(to_info(self.is_online()))
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn NetworkChangeStream>> {
        Ok(Box::new(ManualChangeStream {
            rx: self.state.subscribe(),
        }))
    }
}

struct ManualChangeStream {
    rx: watch::Receiver<bool>,
}

#[async_trait]
impl NetworkChangeStream for ManualChangeStream {
    async fn next(&mut self) -> Option<NetworkInfo> {
        self.rx.changed().await.ok()?;
        let online = *self.rx.borrow_and_update();
        Some(to_info(online))
    }
}

fn to_info(online: bool) -> NetworkInfo {
    if online {
        NetworkInfo::connected(None)
    } else {
        NetworkInfo::disconnected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_target_reports_disconnected() {
        // Port 9 on localhost is the discard service and is almost never open.
        let monitor = DesktopNetworkMonitor::new()
            .with_target_addr("127.0.0.1:9")
            .with_connect_timeout(Duration::from_millis(200));

        let info = monitor.get_network_info().await.unwrap();
        assert_eq!(info.status, NetworkStatus::Disconnected);
        assert!(!monitor.is_connected().await);
    }

    #[tokio::test]
    async fn test_reachable_target_reports_connected() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let monitor = DesktopNetworkMonitor::new().with_target_addr(addr.to_string());
        assert!(monitor.is_connected().await);
    }

    #[tokio::test]
    async fn test_manual_monitor_reports_flag() {
        let monitor = ManualNetworkMonitor::new(true);
        assert!(monitor.is_connected().await);

        monitor.set_online(false);
        assert!(!monitor.is_connected().await);
    }

    #[tokio::test]
    async fn test_manual_monitor_streams_transitions() {
        let monitor = ManualNetworkMonitor::new(true);
        let mut changes = monitor.subscribe_changes().await.unwrap();

        monitor.set_online(false);
        let info = changes.next().await.unwrap();
        assert_eq!(info.status, NetworkStatus::Disconnected);

        monitor.set_online(false);
        monitor.set_online(true);
        let info = changes.next().await.unwrap();
        assert_eq!(info.status, NetworkStatus::Connected);
    }

    #[tokio::test]
    async fn test_manual_stream_ends_when_monitor_dropped() {
        let monitor = ManualNetworkMonitor::new(true);
        let mut changes = monitor.subscribe_changes().await.unwrap();
        drop(monitor);
        assert!(changes.next().await.is_none());
    }
}
