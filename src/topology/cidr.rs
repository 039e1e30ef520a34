use ipnet::Ipv4Net;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CidrError {
    #[error("'{0}' is not an IPv4 network in address/prefix form")]
    Format(String),
    #[error("'{0}' has host bits set")]
    HostBits(String),
}

/// Parses `a.b.c.d/len`; the address must already be the network address.
pub fn parse_network(raw: &str) -> Result<Ipv4Net, CidrError> {
    let raw = raw.trim();
    let net: Ipv4Net = raw
        .parse()
        .map_err(|_| CidrError::Format(raw.to_string()))?;
    if net.trunc() != net {
        return Err(CidrError::HostBits(raw.to_string()));
    }
    Ok(net)
}

/// Two CIDR blocks overlap exactly when one of them contains the other.
pub fn overlaps(left: &Ipv4Net, right: &Ipv4Net) -> bool {
    left.contains(right) || right.contains(left)
}
