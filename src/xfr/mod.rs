//! DNS zone transfer (AXFR) client.
//!
//! [`Client::transfer`] pulls a complete copy of a zone from a master nameserver over TCP and
//! reports whether the transfer finished cleanly. Records are read and discarded; only the
//! shape of the response sequence is checked.
//!
//! # Transfer steps
//!
//! 1. The master must be a bare IPv4 or IPv6 literal. IPv4 (and IPv4-mapped IPv6) masters are
//!    dialed from [`Config::source_ip4`][crate::config::Config::source_ip4], IPv6 masters from
//!    [`Config::source_ip6`][crate::config::Config::source_ip6]. An unset source lets the
//!    system choose.
//! 2. The TCP connection to port 53 must be established within
//!    [`CONNECT_TIMEOUT`] (one second). There are no retries.
//! 3. The AXFR query is sent and each response message is inspected in order. The first error
//!    decides the outcome and nothing after it is read.
//! 4. The whole exchange is bounded by
//!    [`Config::transfer_timeout`][crate::config::Config::transfer_timeout], so a silent master
//!    can't hold a caller forever.
//!
//! E.g. for a master that refuses connections:
//!
//! ```json
//! { "status": "Error", "errormessage": "dial tcp 203.0.113.5:53: Connection refused (os error 111)" }
//! ```

mod envelope;
mod session;

pub use session::CONNECT_TIMEOUT;

use crate::config::SharedConfig;
use crate::error::Error;
use envelope::Envelopes;
use serde::Serialize;
use session::Endpoint;
use tokio::time::timeout;

/// Port transfers are requested on.
pub const DNS_PORT: u16 = 53;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[serde(rename = "OK")]
    Success,
    #[serde(rename = "Error")]
    Failure,
}

/// The terminal result of one transfer. `error_detail` is set iff the transfer failed.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub status: Status,
    #[serde(rename = "errormessage", skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl TransferOutcome {
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            error_detail: None,
        }
    }

    #[must_use]
    pub fn failure(err: &Error) -> Self {
        Self {
            status: Status::Failure,
            error_detail: Some(err.to_string()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Zone transfer client. Cheap to clone; calls share nothing but the read-only config.
#[derive(Clone, Debug)]
pub struct Client {
    config: SharedConfig,
    port: u16,
}

impl Client {
    #[must_use]
    pub fn new(config: SharedConfig) -> Self {
        Self {
            config,
            port: DNS_PORT,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_port(config: SharedConfig, port: u16) -> Self {
        Self { config, port }
    }

    /// Transfer `zone` from `master`, returning the outcome. Never fails outright: every error
    /// ends up in [`TransferOutcome::error_detail`].
    pub async fn transfer(&self, zone: &str, master: &str) -> TransferOutcome {
        tracing::info!("transferring \"{zone}\" from {master}");
        let deadline = self.config.transfer_timeout;
        let result = match timeout(deadline, self.try_transfer(zone, master)).await {
            Ok(result) => result,
            Err(_) => Err(Error::TransferTimeout(deadline)),
        };

        match result {
            Ok(records) => {
                tracing::info!("transferred \"{zone}\" from {master}: {records} records");
                TransferOutcome::success()
            }
            Err(err) => {
                tracing::warn!("transfer of \"{zone}\" from {master} failed: {err}");
                TransferOutcome::failure(&err)
            }
        }
    }

    async fn try_transfer(&self, zone: &str, master: &str) -> Result<usize, Error> {
        let endpoint = Endpoint::parse(master, self.port)?;
        let stream = endpoint.dial(endpoint.local_addr(&self.config)).await?;

        let mut envelopes = Envelopes::open(stream, zone).await;
        while let Some(envelope) = envelopes.next().await {
            let message = envelope?;
            tracing::debug!(
                "envelope from {} with {} records",
                endpoint.remote(),
                message.answers().len()
            );
        }
        Ok(envelopes.records())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{a, respond, soa, spawn_master};
    use super::*;
    use crate::config::Config;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::net::TcpListener;
    use trust_dns_proto::op::{Message, ResponseCode};

    const ZONE: &str = "example.com.";

    fn client(config: Config, port: u16) -> Client {
        Client::with_port(Arc::new(config), port)
    }

    fn complete_zone() -> impl FnOnce(&Message) -> Vec<Message> + Send + 'static {
        |query| {
            vec![
                respond(query, vec![soa(ZONE)]),
                respond(query, vec![a("www.example.com."), soa(ZONE)]),
            ]
        }
    }

    fn refusing_zone() -> impl FnOnce(&Message) -> Vec<Message> + Send + 'static {
        |query| {
            let mut refused = respond(query, vec![]);
            refused.set_response_code(ResponseCode::Refused);
            vec![refused]
        }
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&TransferOutcome::success()).unwrap(),
            r#"{"status":"OK"}"#
        );
        assert_eq!(
            serde_json::to_string(&TransferOutcome::failure(&Error::FirstRecordNotSoa)).unwrap(),
            r#"{"status":"Error","errormessage":"first record is not SOA"}"#
        );
    }

    #[tokio::test]
    async fn complete_transfer_succeeds() {
        let (addr, _) = spawn_master(complete_zone()).await;
        let outcome = client(Config::default(), addr.port())
            .transfer(ZONE, "127.0.0.1")
            .await;
        assert_eq!(outcome, TransferOutcome::success());
    }

    #[tokio::test]
    async fn refused_connection_fails_within_connect_bound() {
        let port = closed_port().await;
        let started = Instant::now();
        let outcome = client(Config::default(), port)
            .transfer(ZONE, "127.0.0.1")
            .await;
        assert!(started.elapsed() < CONNECT_TIMEOUT + Duration::from_millis(500));
        assert_eq!(outcome.status, Status::Failure);
        assert!(outcome
            .error_detail
            .unwrap()
            .starts_with(&format!("dial tcp 127.0.0.1:{port}: ")));
    }

    #[tokio::test]
    async fn unreachable_master_fails_the_same_way_twice() {
        let port = closed_port().await;
        let client = client(Config::default(), port);
        let first = client.transfer(ZONE, "127.0.0.1").await;
        let second = client.transfer(ZONE, "127.0.0.1").await;
        assert!(!first.is_success());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn invalid_master_fails_without_dialing() {
        let outcome = client(Config::default(), DNS_PORT)
            .transfer(ZONE, "ns1.example.com")
            .await;
        assert_eq!(
            outcome.error_detail.as_deref(),
            Some("invalid master address \"ns1.example.com\"")
        );
    }

    #[tokio::test]
    async fn malformed_zone_reports_the_name_error() {
        let (addr, _) = spawn_master(|_| vec![]).await;
        let zone = format!("{}.example.com.", "a".repeat(64));
        let outcome = client(Config::default(), addr.port())
            .transfer(&zone, "127.0.0.1")
            .await;
        assert_eq!(outcome.status, Status::Failure);
        assert!(outcome
            .error_detail
            .unwrap()
            .starts_with(&format!("invalid zone \"{zone}\": ")));
    }

    #[tokio::test]
    async fn first_mid_stream_error_wins() {
        let (addr, _) = spawn_master(|query| {
            let mut failed = respond(query, vec![]);
            failed.set_response_code(ResponseCode::NotAuth);
            let mut foreign = respond(query, vec![a("www.example.com.")]);
            foreign.set_id(query.id().wrapping_add(1));
            vec![
                respond(query, vec![soa(ZONE)]),
                respond(query, vec![a("www.example.com.")]),
                failed,
                foreign,
                respond(query, vec![soa(ZONE)]),
            ]
        })
        .await;
        let outcome = client(Config::default(), addr.port())
            .transfer(ZONE, "127.0.0.1")
            .await;
        assert_eq!(
            outcome.error_detail.as_deref(),
            Some("bad xfr rcode: NotAuth")
        );
    }

    #[tokio::test]
    async fn silent_master_hits_the_transfer_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let hold = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let config = Config {
            transfer_timeout: Duration::from_millis(200),
            ..Config::default()
        };
        let outcome = client(config, port).transfer(ZONE, "127.0.0.1").await;
        assert_eq!(
            outcome.error_detail.as_deref(),
            Some("transfer timed out after 200ms")
        );
        hold.abort();
    }

    #[tokio::test]
    async fn concurrent_transfers_do_not_interfere() {
        let (good, _) = spawn_master(complete_zone()).await;
        let (bad, _) = spawn_master(refusing_zone()).await;
        let good_client = client(Config::default(), good.port());
        let bad_client = client(Config::default(), bad.port());

        let (ok, refused) = tokio::join!(
            good_client.transfer(ZONE, "127.0.0.1"),
            bad_client.transfer("example.net.", "127.0.0.1"),
        );
        assert!(ok.is_success());
        assert_eq!(
            refused.error_detail.as_deref(),
            Some("bad xfr rcode: Refused")
        );
    }

    // Linux routes all of 127.0.0.0/8 to loopback, so 127.0.0.2 is bindable.
    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn ipv4_transfer_is_bound_to_the_ipv4_source() {
        let (addr, peer) = spawn_master(complete_zone()).await;
        let config = Config {
            source_ip4: Some("127.0.0.2".parse().unwrap()),
            source_ip6: Some("::1".parse().unwrap()),
            ..Config::default()
        };
        let outcome = client(config, addr.port())
            .transfer(ZONE, "127.0.0.1")
            .await;
        assert!(outcome.is_success());
        assert_eq!(peer.await.unwrap().ip().to_string(), "127.0.0.2");
    }
}
