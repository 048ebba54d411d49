//! Error types.

use std::net::SocketAddr;
use std::time::Duration;
use trust_dns_proto::error::ProtoError;
use trust_dns_proto::op::ResponseCode;

/// Error enumerates the possible axfrcheck error states.
///
/// Every variant raised while transferring a zone is folded into a
/// [`TransferOutcome`][crate::xfr::TransferOutcome] by
/// [`Client::transfer`][crate::xfr::Client::transfer], using the `Display` output as the
/// outcome's error detail. Only configuration and listener errors ever reach the binary.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when the master is neither an IPv4 nor an IPv6 address literal.
    #[error("invalid master address \"{0}\"")]
    InvalidMaster(String),

    /// Returned when the zone can't be turned into a DNS name for the AXFR question.
    #[error("invalid zone \"{0}\": {1}")]
    InvalidZone(String, ProtoError),

    /// Returned when the outbound socket can't be created or bound to the configured
    /// source address.
    #[error("bind {0}: {1}")]
    Bind(SocketAddr, std::io::Error),

    /// Returned when the master refuses or can't be reached.
    #[error("dial tcp {0}: {1}")]
    Connect(SocketAddr, std::io::Error),

    /// Returned when the TCP handshake with the master doesn't finish in time.
    #[error("dial tcp {0}: i/o timeout after {1:?}")]
    ConnectTimeout(SocketAddr, Duration),

    /// Returned when a DNS message is too large for a TCP length prefix.
    #[error("message of {0} bytes exceeds the TCP frame limit")]
    FrameTooLarge(usize),

    /// Returned when a response doesn't carry the id of the AXFR query.
    #[error("id mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: u16, actual: u16 },

    /// Returned when the master answers with anything other than `NOERROR`.
    #[error("bad xfr rcode: {0:?}")]
    BadRcode(ResponseCode),

    /// Returned when the first response record isn't the zone's SOA.
    #[error("first record is not SOA")]
    FirstRecordNotSoa,

    /// Returned when the master closes the connection before the closing SOA.
    #[error("connection closed before the end of the transfer")]
    UnexpectedEof,

    /// Returned when the whole transfer, dial included, exceeds
    /// [`Config::transfer_timeout`][crate::config::Config::transfer_timeout].
    #[error("transfer timed out after {0:?}")]
    TransferTimeout(Duration),

    /// Returned when the configured timeouts can't work together.
    #[error("invalid timeouts: {0}")]
    InvalidTimeouts(&'static str),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred: {0}")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON fails, either for the
    /// [config file][crate::config::Config::try_from_file] or for a transfer request body.
    #[error("invalid JSON: {0}")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when a DNS message can't be encoded or decoded.
    #[error("DNS error: {0}")]
    DNSError(#[from] ProtoError),

    /// Returned when the HTTP listener can't be set up.
    #[error("HTTP error: {0}")]
    HTTPError(#[from] hyper::Error),
}
