//! axfrcheck
//!
//! A small HTTP service that checks whether a DNS master will hand out a zone. Each request
//! triggers a full zone transfer ([AXFR]) over TCP from the requested master and answers with
//! whether the transfer completed, or the first error that stopped it.
//!
//! Transfers leave from a configurable source address per address family, which makes the
//! service useful for verifying transfer ACLs on masters from the secondary's point of view.
//! The transferred records themselves are discarded.
//!
//! See [`api`] for the HTTP endpoints, [`xfr`] for the transfer rules and [`config`] for the
//! configuration file.
//!
//! [AXFR]: https://www.rfc-editor.org/rfc/rfc5936
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod xfr;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use xfr::{Client, TransferOutcome};
