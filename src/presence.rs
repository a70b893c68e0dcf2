//! Presence advertisement and address resolution collaborators.
//!
//! Advertising is fire-and-forget: the appender calls the advertiser when
//! activated and again when closed, and never inspects the outcome.

use std::net::{IpAddr, ToSocketAddrs};

use log::debug;

/// Service zone announced by appenders that advertise themselves.
pub const DEFAULT_ZONE: &str = "_log4j_obj_logio_appender.local.";

/// Announces the appender on a discovery network.
pub trait PresenceAdvertiser: Send + Sync {
    fn advertise(&self, zone: &str, port: u16, name: &str);
    fn unadvertise(&self);
}

/// Resolves a configured host name to an address.
pub trait AddressResolver: Send + Sync {
    /// Returns `None` when the host cannot be resolved.
    fn resolve(&self, host: &str) -> Option<IpAddr>;
}

/// Resolver backed by the operating system's name service.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

impl AddressResolver for SystemResolver {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Some(ip);
        }
        match (host, 0).to_socket_addrs() {
            Ok(mut addrs) => {
                let found = addrs.next().map(|addr| addr.ip());
                if found.is_none() {
                    debug!("Could not resolve [{host}]: no records returned.");
                }
                found
            }
            Err(err) => {
                debug!("Could not resolve [{host}]: {err}");
                None
            }
        }
    }
}
