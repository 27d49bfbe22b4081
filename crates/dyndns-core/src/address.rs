//! Address classification
//!
//! Turns the raw `ipaddresses` list of an update request into the addresses
//! that will be written to the zone. Entries that are empty or not an IP
//! literal are dropped without being reported; only an empty result is an
//! error, and that is the pipeline's call to make.
//!
//! The address family is decided by shape, not by value: four dot-separated
//! groups of one to three digits is IPv4, anything else that parsed as an IP
//! literal is IPv6. `IpAddr` parsing already rejects out-of-range octets, so
//! the shape test only has to separate the two families.

use std::fmt;
use std::net::IpAddr;

/// Address family of a classified entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// Dotted-quad IPv4
    V4,
    /// Everything else (including IPv4-mapped IPv6 notation)
    V6,
}

impl AddressFamily {
    /// DNS record type written for this family
    pub fn record_type(self) -> &'static str {
        match self {
            AddressFamily::V4 => "A",
            AddressFamily::V6 => "AAAA",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => f.write_str("IPv4"),
            AddressFamily::V6 => f.write_str("IPv6"),
        }
    }
}

/// An address that passed validation, with its family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedAddress {
    /// The address exactly as submitted (minus surrounding whitespace)
    pub value: String,
    /// Family by textual shape
    pub family: AddressFamily,
}

/// Result of one pass over the submitted addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSet {
    addresses: Vec<ClassifiedAddress>,
    first_ipv4: Option<String>,
    first_ipv6: Option<String>,
}

impl AddressSet {
    /// Classified addresses in input order
    pub fn addresses(&self) -> &[ClassifiedAddress] {
        &self.addresses
    }

    /// True when no submitted entry survived validation
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Number of classified addresses
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// First IPv4 address in input order
    pub fn first_ipv4(&self) -> Option<&str> {
        self.first_ipv4.as_deref()
    }

    /// First IPv6 address in input order
    pub fn first_ipv6(&self) -> Option<&str> {
        self.first_ipv6.as_deref()
    }

    fn push(&mut self, address: ClassifiedAddress) {
        let slot = match address.family {
            AddressFamily::V4 => &mut self.first_ipv4,
            AddressFamily::V6 => &mut self.first_ipv6,
        };
        if slot.is_none() {
            *slot = Some(address.value.clone());
        }
        self.addresses.push(address);
    }
}

impl FromIterator<ClassifiedAddress> for AddressSet {
    fn from_iter<I: IntoIterator<Item = ClassifiedAddress>>(iter: I) -> Self {
        let mut set = AddressSet::default();
        for address in iter {
            set.push(address);
        }
        set
    }
}

/// True if `s` is four dot-separated groups of 1 to 3 ASCII digits.
///
/// Octet range is not checked: `999.999.999.999` has IPv4 shape.
pub fn is_ipv4_shaped(s: &str) -> bool {
    let mut groups = 0;
    for group in s.split('.') {
        groups += 1;
        if groups > 4 || group.is_empty() || group.len() > 3 {
            return false;
        }
        if !group.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    groups == 4
}

/// Validate and classify a single raw entry
///
/// Returns `None` for empty entries and anything that is not an IP literal.
/// Entries are taken as given: `" 192.0.2.1"` is not an IP literal.
pub fn classify(value: &str) -> Option<ClassifiedAddress> {
    if value.is_empty() || value.parse::<IpAddr>().is_err() {
        return None;
    }

    let family = if is_ipv4_shaped(value) {
        AddressFamily::V4
    } else {
        AddressFamily::V6
    };

    Some(ClassifiedAddress {
        value: value.to_string(),
        family,
    })
}

/// Classify every entry of a raw address list, dropping invalid ones
pub fn classify_all<I, S>(raw: I) -> AddressSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|entry| classify(entry.as_ref()))
        .collect()
}

/// Split an `ipaddresses` query value, falling back to the caller's address
///
/// The caller's address is used when the parameter is missing or empty.
pub fn raw_address_list(ipaddresses: Option<&str>, caller: &str) -> Vec<String> {
    match ipaddresses {
        Some(list) if !list.is_empty() => list.split(',').map(str::to_string).collect(),
        _ => vec![caller.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_shape_is_group_count_not_range() {
        assert!(is_ipv4_shaped("203.0.113.5"));
        assert!(is_ipv4_shaped("999.999.999.999"));
        assert!(!is_ipv4_shaped("1.2.3"));
        assert!(!is_ipv4_shaped("1.2.3.4.5"));
        assert!(!is_ipv4_shaped("1.2.3.1234"));
        assert!(!is_ipv4_shaped("1..3.4"));
        assert!(!is_ipv4_shaped("::ffff:1.2.3.4"));
    }

    #[test]
    fn invalid_entries_are_dropped() {
        let set = classify_all(["", "not-an-ip", "203.0.113.5", "999.1.1.1", "2001:db8::1"]);

        let values: Vec<_> = set.addresses().iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, vec!["203.0.113.5", "2001:db8::1"]);
    }

    #[test]
    fn families_follow_shape() {
        assert_eq!(classify("198.51.100.7").unwrap().family, AddressFamily::V4);
        assert_eq!(classify("2001:db8::7").unwrap().family, AddressFamily::V6);
        // Mapped notation is not dotted-quad shaped
        assert_eq!(classify("::ffff:198.51.100.7").unwrap().family, AddressFamily::V6);
    }

    #[test]
    fn first_of_each_family_wins() {
        let set = classify_all(["2001:db8::1", "192.0.2.1", "2001:db8::2", "192.0.2.2"]);

        assert_eq!(set.len(), 4);
        assert_eq!(set.first_ipv4(), Some("192.0.2.1"));
        assert_eq!(set.first_ipv6(), Some("2001:db8::1"));
    }

    #[test]
    fn missing_family_stays_unset() {
        let set = classify_all(["192.0.2.1"]);
        assert_eq!(set.first_ipv6(), None);
    }

    #[test]
    fn only_invalid_entries_yield_empty_set() {
        let set = classify_all(["nope", "", "300.1.1.1"]);
        assert!(set.is_empty());
    }

    #[test]
    fn padded_entries_are_not_addresses() {
        let set = classify_all([" 192.0.2.1", "2001:db8::1 ", "192.0.2.2"]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.first_ipv4(), Some("192.0.2.2"));
        assert_eq!(set.first_ipv6(), None);
    }

    #[test]
    fn caller_address_is_the_fallback() {
        assert_eq!(raw_address_list(None, "192.0.2.9"), vec!["192.0.2.9"]);
        assert_eq!(raw_address_list(Some(""), "192.0.2.9"), vec!["192.0.2.9"]);
        assert_eq!(
            raw_address_list(Some("192.0.2.1,,2001:db8::1"), "192.0.2.9"),
            vec!["192.0.2.1", "", "2001:db8::1"]
        );
    }
}
