//! LAN address discovery.
//!
//! Connecting a UDP socket only selects a route; no datagram is sent. The
//! socket's local address is then the interface the host would use to reach
//! the target, which is the address other devices on the LAN can use.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;
use tokio::net::UdpSocket;

/// Address reported when the probe fails.
pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid probe target {0:?}")]
    Target(String),

    #[error("probe socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no route selected a local address")]
    Unspecified,
}

/// Determine the outward-facing local IP used to reach `target`.
pub async fn probe_lan_ip(target: &str) -> Result<IpAddr, ProbeError> {
    let target: SocketAddr = target
        .parse()
        .map_err(|_| ProbeError::Target(target.to_string()))?;

    let bind: SocketAddr = match target {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (std::net::Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(bind).await?;
    socket.connect(target).await?;

    let local = socket.local_addr()?.ip();
    if local.is_unspecified() {
        return Err(ProbeError::Unspecified);
    }
    Ok(local)
}

/// Like [`probe_lan_ip`], falling back to `127.0.0.1` on any failure.
pub async fn lan_ip_or_loopback(target: &str) -> IpAddr {
    match probe_lan_ip(target).await {
        Ok(ip) => ip,
        Err(e) => {
            tracing::debug!(error = %e, fallback = %LOOPBACK, "LAN address probe failed");
            LOOPBACK
        }
    }
}
