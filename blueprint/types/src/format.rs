//! String formats recognised by the `Format` validation.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s<>]+@[^@\s<>]+\.[^@\s<>]+$").expect("valid regex"));

static HOSTNAME_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("valid regex")
});

static MAC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$|^([0-9A-Fa-f]{4}\.){2}[0-9A-Fa-f]{4}$")
        .expect("valid regex")
});

/// A well-known string format.
///
/// ## Examples
///
/// ```
/// use blueprint_types::Format;
///
/// assert!(Format::Ipv4.matches("192.168.0.1"));
/// assert!(!Format::Email.matches("not an email"));
/// assert_eq!(Format::DateTime.to_string(), "date-time");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Format {
    /// RFC3339 date and time.
    DateTime,
    Email,
    /// RFC1123 host name.
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    /// IEEE 802 MAC-48, EUI-48 or EUI-64 address.
    Mac,
    /// IP address with prefix length, e.g. `10.0.0.0/8`.
    Cidr,
}

impl Format {
    /// Returns `true` when `s` is a valid instance of this format.
    pub fn matches(self, s: &str) -> bool {
        match self {
            Format::DateTime => DateTime::parse_from_rfc3339(s).is_ok(),
            Format::Email => EMAIL.is_match(s),
            Format::Hostname => is_hostname(s),
            Format::Ipv4 => s.parse::<Ipv4Addr>().is_ok(),
            Format::Ipv6 => s.parse::<Ipv6Addr>().is_ok(),
            Format::Uri => url::Url::parse(s).is_ok(),
            Format::Mac => MAC.is_match(s),
            Format::Cidr => is_cidr(s),
        }
    }
}

fn is_hostname(s: &str) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    !s.is_empty() && s.len() <= 253 && s.split('.').all(|label| HOSTNAME_LABEL.is_match(label))
}

fn is_cidr(s: &str) -> bool {
    let Some((addr, prefix)) = s.split_once('/') else {
        return false;
    };
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match addr.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => prefix <= 32,
        Ok(IpAddr::V6(_)) => prefix <= 128,
        Err(_) => false,
    }
}
