//! HTTP API for triggering zone transfers.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/axfr` (POST)
//!
//!   Expects a JSON request body of the form:
//!
//!   ```json
//!   { "master": "203.0.113.5", "zone": "example.com." }
//!   ```
//!
//!  Where `master` is a bare IPv4 or IPv6 address (no brackets, no port) of the nameserver to
//!  transfer `zone` from. The `Content-Type` header is not checked.
//!
//!  Every attempted transfer returns HTTP 200 (OK), successful or not:
//!
//!  ```json
//!  { "status": "OK" }
//!  ```
//!
//!  ```json
//!  { "status": "Error", "errormessage": "bad xfr rcode: Refused" }
//!  ```
//!
//!  A body that isn't a valid transfer request returns HTTP 422 (Unprocessable Entity):
//!
//!  ```json
//!  { "status": "Could not unmarshal json", "errormessage": "invalid JSON: ..." }
//!  ```
//!
//!  Only the first 1 MiB of the body is decoded; the rest is ignored, so an oversized document
//!  usually ends up as HTTP 422.
//!
//!  A body that can't be read returns HTTP 500 (Internal Server Error). Any method other than
//!  `POST` returns HTTP 500 with the plain text body `Not implemented`.
//!
//! ```bash
//! ❯ curl --json '{"master":"203.0.113.5","zone":"example.com."}' http://localhost:8080/axfr
//! {"status":"OK"}
//! ```

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
