//! Datagram transports

pub mod metrics;
pub mod udp;


pub use metrics::{MetricsTracker, UdpStats};
pub use udp::{UdpConfig, UdpTransport};
