use std::net::IpAddr;

use axum::http::HeaderMap;
use ipnet::IpNet;

/// Resolve the submitting client's address.
///
/// `X-Forwarded-For` is only honored when the direct peer is a trusted proxy;
/// the leftmost address that is not itself a trusted proxy wins.
pub fn client_ip(
    headers: &HeaderMap,
    peer_addr: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> IpAddr {
    let peer = peer_addr.unwrap_or(IpAddr::from([127, 0, 0, 1]));

    if !trusted_proxies.is_empty() && trusted_proxies.iter().any(|net| net.contains(&peer)) {
        if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            for ip_str in xff.split(',').map(|s| s.trim()) {
                if let Ok(ip) = ip_str.parse::<IpAddr>() {
                    if !trusted_proxies.iter().any(|net| net.contains(&ip)) {
                        return ip;
                    }
                }
            }
        }
    }

    peer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xff(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", value.parse().unwrap());
        headers
    }

    fn proxies() -> Vec<IpNet> {
        vec!["10.0.0.0/8".parse().unwrap()]
    }

    #[test]
    fn untrusted_peer_cannot_spoof_forwarded_for() {
        let peer: IpAddr = "203.0.113.7".parse().unwrap();
        let ip = client_ip(&xff("198.51.100.1"), Some(peer), &proxies());
        assert_eq!(ip, peer);
    }

    #[test]
    fn forwarded_for_ignored_without_trusted_proxies() {
        let peer: IpAddr = "10.1.2.3".parse().unwrap();
        let ip = client_ip(&xff("198.51.100.1"), Some(peer), &[]);
        assert_eq!(ip, peer);
    }

    #[test]
    fn trusted_peer_yields_first_non_proxy_address() {
        let peer: IpAddr = "10.0.0.5".parse().unwrap();
        let ip = client_ip(
            &xff("10.0.0.9, 198.51.100.1, 192.0.2.4"),
            Some(peer),
            &proxies(),
        );
        assert_eq!(ip, "198.51.100.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn garbage_forwarded_for_falls_back_to_peer() {
        let peer: IpAddr = "10.0.0.5".parse().unwrap();
        let ip = client_ip(&xff("not-an-ip, also bad"), Some(peer), &proxies());
        assert_eq!(ip, peer);
    }

    #[test]
    fn missing_peer_defaults_to_loopback() {
        let ip = client_ip(&HeaderMap::new(), None, &proxies());
        assert_eq!(ip, IpAddr::from([127, 0, 0, 1]));
    }
}
