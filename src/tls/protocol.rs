//! Protocol identifiers accepted by `TlsContext::create`

use std::fmt;
use std::str::FromStr;

use openssl::ssl::{SslMethod, SslVersion};

use crate::common::ContextError;

/// Protocol a context is created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// SSL 3.0 only
    SslV3,
    /// TLS 1.0 only
    TlsV1,
    /// TLS 1.1 only
    TlsV1_1,
    /// TLS 1.2 only
    TlsV1_2,
    /// TLS 1.3 only
    TlsV1_3,
    /// Highest version both peers support
    SslV23,
}

impl Protocol {
    /// Every protocol, in the order tools list them.
    pub const ALL: [Protocol; 6] = [
        Protocol::SslV3,
        Protocol::TlsV1,
        Protocol::TlsV1_1,
        Protocol::TlsV1_2,
        Protocol::TlsV1_3,
        Protocol::SslV23,
    ];

    /// Canonical token
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::SslV3 => "sslv3",
            Protocol::TlsV1 => "tlsv1",
            Protocol::TlsV1_1 => "tlsv1_1",
            Protocol::TlsV1_2 => "tlsv1_2",
            Protocol::TlsV1_3 => "tlsv1_3",
            Protocol::SslV23 => "sslv23",
        }
    }

    /// Engine method used to allocate the context.
    pub(crate) fn method(&self) -> SslMethod {
        SslMethod::tls()
    }

    /// Version the context is pinned to, `None` for negotiated contexts.
    pub(crate) fn pinned_version(&self) -> Option<SslVersion> {
        match self {
            Protocol::SslV3 => Some(SslVersion::SSL3),
            Protocol::TlsV1 => Some(SslVersion::TLS1),
            Protocol::TlsV1_1 => Some(SslVersion::TLS1_1),
            Protocol::TlsV1_2 => Some(SslVersion::TLS1_2),
            Protocol::TlsV1_3 => Some(SslVersion::TLS1_3),
            Protocol::SslV23 => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sslv3" => Ok(Protocol::SslV3),
            "tlsv1" => Ok(Protocol::TlsV1),
            "tlsv1_1" => Ok(Protocol::TlsV1_1),
            "tlsv1_2" => Ok(Protocol::TlsV1_2),
            "tlsv1_3" => Ok(Protocol::TlsV1_3),
            "sslv23" | "tls" => Ok(Protocol::SslV23),
            _ => Err(ContextError::InvalidProtocol(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parsing() {
        assert_eq!("sslv3".parse::<Protocol>().unwrap(), Protocol::SslV3);
        assert_eq!("tlsv1".parse::<Protocol>().unwrap(), Protocol::TlsV1);
        assert_eq!("sslv23".parse::<Protocol>().unwrap(), Protocol::SslV23);
        assert_eq!("tls".parse::<Protocol>().unwrap(), Protocol::SslV23);
        assert_eq!("tlsv1_3".parse::<Protocol>().unwrap(), Protocol::TlsV1_3);
    }

    #[test]
    fn test_invalid_protocol_reports_value() {
        match "TLSv1".parse::<Protocol>() {
            Err(ContextError::InvalidProtocol(value)) => assert_eq!(value, "TLSv1"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_tokens_round_trip() {
        for protocol in Protocol::ALL {
            assert_eq!(protocol.as_str().parse::<Protocol>().unwrap(), protocol);
        }
    }

    #[test]
    fn test_only_sslv23_negotiates() {
        assert!(Protocol::SslV23.pinned_version().is_none());
        assert!(Protocol::TlsV1_2.pinned_version() == Some(SslVersion::TLS1_2));
    }
}
