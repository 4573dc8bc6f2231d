//! Host header and client network filtering
//!
//! A request passes when its `Host` matches one of the allowed host names, or
//! names an IP literal inside one of the allowed networks. When a peer
//! address is known it must also fall inside the allowed networks.

use std::net::IpAddr;
use std::rc::Rc;

use actix_service::forward_ready;
use actix_utils::future::{Ready, ok};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};
use futures::future::LocalBoxFuture;

use supermanager_common::SuperManagerError;
use supermanager_server_common::{AppError, Configuration, model::ANY_HOST};

/// An IPv4 or IPv6 network in CIDR notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpNet {
    V4 { network: u32, mask: u32 },
    V6 { network: u128, mask: u128 },
}

impl IpNet {
    /// Parses `addr/prefix`. A bare address is a single-host network.
    pub fn parse(cidr: &str) -> Option<Self> {
        let mut parts = cidr.trim().splitn(2, '/');
        let ip: IpAddr = parts.next()?.trim().parse().ok()?;
        let prefix = parts.next().map(|p| p.trim().parse::<u32>());

        match ip {
            IpAddr::V4(v4) => {
                let prefix = match prefix {
                    Some(p) => p.ok().filter(|p| *p <= 32)?,
                    None => 32,
                };
                let mask = if prefix == 0 { 0 } else { !0u32 << (32 - prefix) };
                Some(IpNet::V4 {
                    network: u32::from(v4) & mask,
                    mask,
                })
            }
            IpAddr::V6(v6) => {
                let prefix = match prefix {
                    Some(p) => p.ok().filter(|p| *p <= 128)?,
                    None => 128,
                };
                let mask = if prefix == 0 { 0 } else { !0u128 << (128 - prefix) };
                Some(IpNet::V6 {
                    network: u128::from(v6) & mask,
                    mask,
                })
            }
        }
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self, ip.to_canonical()) {
            (IpNet::V4 { network, mask }, IpAddr::V4(v4)) => u32::from(v4) & mask == *network,
            (IpNet::V6 { network, mask }, IpAddr::V6(v6)) => u128::from(v6) & mask == *network,
            _ => false,
        }
    }
}

/// Allowed host names and client networks
#[derive(Debug, Clone)]
pub struct HostPolicy {
    hosts: Vec<String>,
    nets: Vec<IpNet>,
}

impl HostPolicy {
    pub fn new(hosts: &[String], nets: &[String]) -> Self {
        let nets = nets
            .iter()
            .filter_map(|n| {
                let net = IpNet::parse(n);
                if net.is_none() {
                    tracing::warn!(net = %n, "Ignoring invalid allowed network");
                }
                net
            })
            .collect();

        Self {
            hosts: hosts.iter().map(|h| h.trim().to_lowercase()).collect(),
            nets,
        }
    }

    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self::new(
            &configuration.allowed_hosts(),
            &configuration.allowed_cidr_nets(),
        )
    }

    pub fn allows_ip(&self, ip: IpAddr) -> bool {
        self.nets.iter().any(|net| net.contains(ip))
    }

    /// Matches a `Host` value: exact names, `.example.com` for a domain and
    /// its subdomains, `*` for anything, or an IP inside an allowed network.
    pub fn allows_host(&self, host: &str) -> bool {
        let name = strip_port(host).to_lowercase();

        let by_name = self.hosts.iter().any(|pattern| {
            if pattern == ANY_HOST {
                return true;
            }
            match pattern.strip_prefix('.') {
                Some(domain) => name == domain || name.ends_with(pattern.as_str()),
                None => name == *pattern,
            }
        });

        by_name
            || name
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<IpAddr>()
                .is_ok_and(|ip| self.allows_ip(ip))
    }
}

/// `example.com:8000` -> `example.com`, `[::1]:8000` -> `[::1]`
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

pub struct AllowedHosts {
    policy: Rc<HostPolicy>,
}

impl AllowedHosts {
    pub fn new(policy: HostPolicy) -> Self {
        Self {
            policy: Rc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AllowedHosts
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AllowedHostsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AllowedHostsMiddleware {
            service,
            policy: self.policy.clone(),
        })
    }
}

pub struct AllowedHostsMiddleware<S> {
    service: S,
    policy: Rc<HostPolicy>,
}

impl<S, B> Service<ServiceRequest> for AllowedHostsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let host = req.connection_info().host().to_string();

        if !self.policy.allows_host(&host) {
            tracing::warn!(host = %host, "Rejected request with disallowed host");
            let err = AppError::from(SuperManagerError::IllegalArgument(format!(
                "Invalid HTTP_HOST header: '{}'.",
                host
            )));
            let res = req.error_response(err).map_into_right_body();
            return Box::pin(async move { Ok(res) });
        }

        if let Some(peer) = req.peer_addr()
            && !self.policy.allows_ip(peer.ip())
        {
            tracing::warn!(peer = %peer.ip(), "Rejected request from disallowed network");
            let err = AppError::from(SuperManagerError::PermissionDenied);
            let res = req.error_response(err).map_into_right_body();
            return Box::pin(async move { Ok(res) });
        }

        let res = self.service.call(req);

        Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use proptest::prelude::*;

    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn policy(hosts: &[&str], nets: &[&str]) -> HostPolicy {
        HostPolicy::new(
            &hosts.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
            &nets.iter().map(|n| n.to_string()).collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_parse_v4() {
        let net = IpNet::parse("192.168.1.77/24").unwrap();
        assert_eq!(
            net,
            IpNet::V4 {
                network: u32::from(Ipv4Addr::new(192, 168, 1, 0)),
                mask: 0xFFFF_FF00
            }
        );
        assert!(net.contains(ip("192.168.1.200")));
        assert!(!net.contains(ip("192.168.2.1")));
        assert!(!net.contains(ip("::1")));

        assert!(IpNet::parse("10.0.0.1/33").is_none());
        assert!(IpNet::parse("10.0.0/8").is_none());
        assert!(IpNet::parse("10.0.0.1/x").is_none());
    }

    #[test]
    fn test_parse_v6() {
        let net = IpNet::parse("fd00::/8").unwrap();
        assert!(net.contains(ip("fd12:3456::1")));
        assert!(!net.contains(ip("fe80::1")));
        assert!(IpNet::parse("::/0").unwrap().contains(ip("2001:db8::1")));
        assert!(IpNet::parse("::1/129").is_none());
    }

    #[test]
    fn test_mapped_v4_matches_v4_net() {
        let net = IpNet::parse("127.0.0.0/8").unwrap();
        let mapped = IpAddr::V6(Ipv4Addr::new(127, 0, 0, 1).to_ipv6_mapped());
        assert!(net.contains(mapped));
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com:8000"), "example.com");
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("[::1]:8000"), "[::1]");
        assert_eq!(strip_port("::1"), "::1");
    }

    #[test]
    fn test_allows_host() {
        let p = policy(&["api.example.com", ".corp.local"], &["10.0.0.0/8"]);

        assert!(p.allows_host("api.example.com"));
        assert!(p.allows_host("API.example.com:8000"));
        assert!(p.allows_host("corp.local"));
        assert!(p.allows_host("inventory.corp.local"));
        assert!(p.allows_host("10.1.2.3:8000"));

        assert!(!p.allows_host("evil.com"));
        assert!(!p.allows_host("notcorp.local"));
        assert!(!p.allows_host("192.168.0.1"));
    }

    #[test]
    fn test_wildcard_host_and_invalid_nets() {
        let p = policy(&["*"], &["not-a-net", "0.0.0.0/0"]);
        assert!(p.allows_host("anything.example"));
        assert!(p.allows_ip(ip("8.8.8.8")));
        assert!(!p.allows_ip(ip("::1")));
    }

    proptest! {
        #[test]
        fn prop_v4_address_in_own_network(addr in any::<u32>(), prefix in 0u32..=32) {
            let a = Ipv4Addr::from(addr);
            let net = IpNet::parse(&format!("{}/{}", a, prefix)).unwrap();
            prop_assert!(net.contains(IpAddr::V4(a)));
            prop_assert!(IpNet::parse("0.0.0.0/0").unwrap().contains(IpAddr::V4(a)));
        }

        #[test]
        fn prop_v6_address_in_own_network(addr in any::<u128>(), prefix in 0u32..=128) {
            let a = Ipv6Addr::from(addr);
            let net = IpNet::parse(&format!("{}/{}", a, prefix)).unwrap();
            prop_assert!(net.contains(IpAddr::V6(a)) || a.to_ipv4_mapped().is_some());
        }
    }
}
