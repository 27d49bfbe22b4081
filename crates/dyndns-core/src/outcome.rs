//! Update outcomes and their protocol encoding
//!
//! Response bodies are the dyn.com return codes, plus `iperror` for requests
//! without a usable address:
//!
//! | Outcome | Body | Status |
//! |---|---|---|
//! | `Misconfigured` | plain-text reason | 500 |
//! | `BadAuth` | `badauth` | 401, with a Basic challenge |
//! | `NoHost` | `nohost` | 400 |
//! | `IpError` | `iperror` | 400 |
//! | `DnsError` | `dnserr` | 200 |
//! | `Good` | `good <address>` | 200 |

use std::fmt;

use crate::address::is_ipv4_shaped;

/// Realm sent in the `WWW-Authenticate` challenge
pub const AUTH_REALM: &str = "DynDNS Update";

/// Protocol return codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    /// The update was successful, and the hostname is now updated
    Good,
    /// The username and password pair do not match a registered user
    BadAuth,
    /// The update changed no settings (reserved, never emitted)
    NoChange,
    /// The hostname specified does not exist in this user account
    NoHost,
    /// DNS error encountered
    DnsError,
    /// No valid IP address was given
    IpError,
}

impl ReturnCode {
    /// Wire token of this code
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnCode::Good => "good",
            ReturnCode::BadAuth => "badauth",
            ReturnCode::NoChange => "nochg",
            ReturnCode::NoHost => "nohost",
            ReturnCode::DnsError => "dnserr",
            ReturnCode::IpError => "iperror",
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Transaction committed
    Good {
        /// First IPv4 address of the request
        ipv4: Option<String>,
        /// First IPv6 address of the request
        ipv6: Option<String>,
    },
    /// Credentials rejected
    BadAuth,
    /// Hostname missing or not owned by the user
    NoHost,
    /// No submitted address survived validation
    IpError,
    /// Transport rejected the transaction
    DnsError,
    /// Service cannot process requests; the reason is shown to the client
    Misconfigured(String),
}

impl UpdateOutcome {
    /// Return code for this outcome (`None` for `Misconfigured`)
    pub fn return_code(&self) -> Option<ReturnCode> {
        match self {
            UpdateOutcome::Good { .. } => Some(ReturnCode::Good),
            UpdateOutcome::BadAuth => Some(ReturnCode::BadAuth),
            UpdateOutcome::NoHost => Some(ReturnCode::NoHost),
            UpdateOutcome::IpError => Some(ReturnCode::IpError),
            UpdateOutcome::DnsError => Some(ReturnCode::DnsError),
            UpdateOutcome::Misconfigured(_) => None,
        }
    }

    /// Encode for the client
    ///
    /// `caller` is the client's own network address. For `Good` it picks which
    /// family is echoed back: the first IPv4 address if `caller` is dotted-quad,
    /// otherwise the first IPv6 address. The echoed address may be empty.
    pub fn encode(&self, caller: &str) -> EncodedResponse {
        match self {
            UpdateOutcome::Misconfigured(reason) => EncodedResponse::new(500, reason.clone()),
            UpdateOutcome::BadAuth => EncodedResponse {
                status: 401,
                body: ReturnCode::BadAuth.to_string(),
                challenge: true,
            },
            UpdateOutcome::NoHost => EncodedResponse::new(400, ReturnCode::NoHost.to_string()),
            UpdateOutcome::IpError => EncodedResponse::new(400, ReturnCode::IpError.to_string()),
            UpdateOutcome::DnsError => EncodedResponse::new(200, ReturnCode::DnsError.to_string()),
            UpdateOutcome::Good { ipv4, ipv6 } => {
                let echoed = if is_ipv4_shaped(caller) { ipv4 } else { ipv6 };
                EncodedResponse::new(
                    200,
                    format!("{} {}", ReturnCode::Good, echoed.as_deref().unwrap_or("")),
                )
            }
        }
    }
}

/// Transport-neutral response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResponse {
    /// HTTP status code
    pub status: u16,
    /// Plain-text body
    pub body: String,
    /// Send `WWW-Authenticate: Basic realm="DynDNS Update"`
    pub challenge: bool,
}

impl EncodedResponse {
    fn new(status: u16, body: String) -> Self {
        Self {
            status,
            body,
            challenge: false,
        }
    }

    /// Value of the `WWW-Authenticate` header when `challenge` is set
    pub fn challenge_header() -> String {
        format!("Basic realm=\"{}\"", AUTH_REALM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good(ipv4: Option<&str>, ipv6: Option<&str>) -> UpdateOutcome {
        UpdateOutcome::Good {
            ipv4: ipv4.map(str::to_string),
            ipv6: ipv6.map(str::to_string),
        }
    }

    #[test]
    fn tokens_are_exact() {
        assert_eq!(ReturnCode::Good.as_str(), "good");
        assert_eq!(ReturnCode::BadAuth.as_str(), "badauth");
        assert_eq!(ReturnCode::NoChange.as_str(), "nochg");
        assert_eq!(ReturnCode::NoHost.as_str(), "nohost");
        assert_eq!(ReturnCode::DnsError.as_str(), "dnserr");
        assert_eq!(ReturnCode::IpError.as_str(), "iperror");
    }

    #[test]
    fn failures_map_to_status_and_token() {
        let cases = [
            (UpdateOutcome::NoHost, 400, "nohost"),
            (UpdateOutcome::IpError, 400, "iperror"),
            (UpdateOutcome::DnsError, 200, "dnserr"),
        ];
        for (outcome, status, body) in cases {
            let encoded = outcome.encode("192.0.2.9");
            assert_eq!(encoded.status, status);
            assert_eq!(encoded.body, body);
            assert!(!encoded.challenge);
        }
    }

    #[test]
    fn bad_auth_challenges() {
        let encoded = UpdateOutcome::BadAuth.encode("192.0.2.9");
        assert_eq!(encoded.status, 401);
        assert_eq!(encoded.body, "badauth");
        assert!(encoded.challenge);
        assert_eq!(
            EncodedResponse::challenge_header(),
            "Basic realm=\"DynDNS Update\""
        );
    }

    #[test]
    fn misconfiguration_shows_reason() {
        let encoded = UpdateOutcome::Misconfigured("System not configured!".to_string())
            .encode("192.0.2.9");
        assert_eq!(encoded.status, 500);
        assert_eq!(encoded.body, "System not configured!");
    }

    #[test]
    fn good_echoes_family_of_caller() {
        let outcome = good(Some("203.0.113.5"), Some("2001:db8::1"));

        assert_eq!(outcome.encode("203.0.113.9").body, "good 203.0.113.5");
        assert_eq!(outcome.encode("2001:db8::99").body, "good 2001:db8::1");
    }

    #[test]
    fn good_with_missing_family_has_empty_address() {
        let outcome = good(None, Some("2001:db8::1"));

        let encoded = outcome.encode("198.51.100.1");
        assert_eq!(encoded.status, 200);
        assert_eq!(encoded.body, "good ");
    }

    #[test]
    fn no_outcome_emits_nochg() {
        let outcomes = [
            good(Some("192.0.2.1"), None),
            UpdateOutcome::BadAuth,
            UpdateOutcome::NoHost,
            UpdateOutcome::IpError,
            UpdateOutcome::DnsError,
            UpdateOutcome::Misconfigured(String::new()),
        ];
        assert!(outcomes
            .iter()
            .all(|o| o.return_code() != Some(ReturnCode::NoChange)));
    }
}
