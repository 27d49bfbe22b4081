//! Zone update directives
//!
//! Builds the `nsupdate` transaction for one request. The order is fixed:
//!
//! ```text
//! server localhost
//! zone example.com
//! update delete host.example.com
//! update add host.example.com 60 A 203.0.113.5
//! update add host.example.com 60 AAAA 2001:db8::1
//! send
//! ```
//!
//! Every existing record of the hostname is deleted before the new ones are
//! added, inside the same transaction.

use std::fmt;

use crate::address::{AddressFamily, AddressSet};
use crate::config::ZoneUpdateConfig;

/// One line of an update transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneDirective {
    /// Server the transaction is sent to
    Server(String),
    /// Zone the transaction applies to
    Zone(String),
    /// Remove all records of a name
    Delete {
        /// Owner name
        name: String,
    },
    /// Add one address record
    Add {
        /// Owner name
        name: String,
        /// TTL in seconds
        ttl: u32,
        /// `A` or `AAAA`
        family: AddressFamily,
        /// Address text
        value: String,
    },
    /// Commit the transaction
    Send,
}

impl fmt::Display for ZoneDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneDirective::Server(server) => write!(f, "server {}", server),
            ZoneDirective::Zone(zone) => write!(f, "zone {}", zone),
            ZoneDirective::Delete { name } => write!(f, "update delete {}", name),
            ZoneDirective::Add {
                name,
                ttl,
                family,
                value,
            } => write!(
                f,
                "update add {} {} {} {}",
                name,
                ttl,
                family.record_type(),
                value
            ),
            ZoneDirective::Send => f.write_str("send"),
        }
    }
}

/// Build the directive sequence for one hostname
pub fn build_directives(
    settings: &ZoneUpdateConfig,
    hostname: &str,
    zone: &str,
    addresses: &AddressSet,
) -> Vec<ZoneDirective> {
    let mut directives = Vec::with_capacity(addresses.len() + 4);

    directives.push(ZoneDirective::Server(settings.server.clone()));
    directives.push(ZoneDirective::Zone(zone.to_string()));
    directives.push(ZoneDirective::Delete {
        name: hostname.to_string(),
    });

    for address in addresses.addresses() {
        directives.push(ZoneDirective::Add {
            name: hostname.to_string(),
            ttl: settings.ttl,
            family: address.family,
            value: address.value.clone(),
        });
    }

    directives.push(ZoneDirective::Send);
    directives
}

/// Render directives as a newline-terminated script
pub fn render_script(directives: &[ZoneDirective]) -> String {
    let mut script = String::new();
    for directive in directives {
        script.push_str(&directive.to_string());
        script.push('\n');
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::classify_all;

    fn lines(directives: &[ZoneDirective]) -> Vec<String> {
        directives.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn mixed_families_in_input_order() {
        let addresses = classify_all(["203.0.113.5", "2001:db8::1"]);
        let directives = build_directives(
            &ZoneUpdateConfig::default(),
            "host.example.com",
            "example.com",
            &addresses,
        );

        assert_eq!(
            lines(&directives),
            vec![
                "server localhost",
                "zone example.com",
                "update delete host.example.com",
                "update add host.example.com 60 A 203.0.113.5",
                "update add host.example.com 60 AAAA 2001:db8::1",
                "send",
            ]
        );
    }

    #[test]
    fn invalid_entries_never_become_adds() {
        let addresses = classify_all(["2001:db8::9", "garbage", "", "192.0.2.4"]);
        let directives = build_directives(
            &ZoneUpdateConfig::default(),
            "h.example.net",
            "example.net",
            &addresses,
        );

        let adds: Vec<_> = directives
            .iter()
            .filter(|d| matches!(d, ZoneDirective::Add { .. }))
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            adds,
            vec![
                "update add h.example.net 60 AAAA 2001:db8::9",
                "update add h.example.net 60 A 192.0.2.4",
            ]
        );
    }

    #[test]
    fn exactly_one_delete_before_adds() {
        let addresses = classify_all(["192.0.2.1", "192.0.2.2", "2001:db8::1"]);
        let directives = build_directives(
            &ZoneUpdateConfig::default(),
            "h.example.org",
            "example.org",
            &addresses,
        );

        let deletes: Vec<_> = directives
            .iter()
            .enumerate()
            .filter(|(_, d)| matches!(d, ZoneDirective::Delete { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(deletes, vec![2]);
        assert_eq!(directives.last(), Some(&ZoneDirective::Send));
    }

    #[test]
    fn server_and_ttl_come_from_settings() {
        let settings = ZoneUpdateConfig {
            server: "ns1.example.com 5353".to_string(),
            ttl: 300,
        };
        let addresses = classify_all(["192.0.2.1"]);
        let directives = build_directives(&settings, "h.example.com", "example.com", &addresses);

        assert_eq!(directives[0].to_string(), "server ns1.example.com 5353");
        assert_eq!(directives[3].to_string(), "update add h.example.com 300 A 192.0.2.1");
    }

    #[test]
    fn script_is_one_directive_per_line() {
        let addresses = classify_all(["192.0.2.1"]);
        let directives = build_directives(
            &ZoneUpdateConfig::default(),
            "h.example.com",
            "example.com",
            &addresses,
        );

        assert_eq!(
            render_script(&directives),
            "server localhost\nzone example.com\nupdate delete h.example.com\n\
             update add h.example.com 60 A 192.0.2.1\nsend\n"
        );
    }
}
