//! The AXFR exchange over an established TCP connection.
//!
//! The query and every response message travel with the two byte length prefix of
//! [RFC-1035 section 4.2.2][RFC-1035]. Each response message is one envelope: a batch of
//! zone records, or the error that ended the transfer. The transfer is complete once a
//! message ends with the closing copy of the zone's SOA record ([RFC-5936][RFC-5936]).
//!
//! [RFC-1035]: https://www.rfc-editor.org/rfc/rfc1035#section-4.2.2
//! [RFC-5936]: https://www.rfc-editor.org/rfc/rfc5936#section-2.2
use crate::error::Error;
use std::io::ErrorKind;
use std::str::FromStr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use trust_dns_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use trust_dns_proto::rr::{DNSClass, Name, RecordType};

/// Build the AXFR query for `zone`. Relative names are taken as relative to the root.
pub(crate) fn axfr_query(zone: &str, id: u16) -> Result<Message, Error> {
    let invalid = |err| Error::InvalidZone(zone.to_string(), err);
    let name = Name::from_str(zone)
        .and_then(|name| name.append_domain(&Name::root()))
        .map_err(invalid)?;

    let mut query = Query::query(name, RecordType::AXFR);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(false)
        .add_query(query);
    Ok(message)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    AwaitingOpeningSoa,
    InZone,
    Done,
}

/// A lazy, single-use sequence of AXFR response envelopes.
///
/// Owns the connection to the master; dropping it closes the connection. The sequence ends
/// after the closing SOA, or right after the first error it yields.
#[derive(Debug)]
pub(crate) struct Envelopes {
    stream: TcpStream,
    query_id: u16,
    progress: Progress,
    records: usize,
    pending: Option<Error>,
}

impl Envelopes {
    /// Send the AXFR query for `zone` and return the response sequence.
    ///
    /// A query that can't be built or sent doesn't short-circuit: its error is the first
    /// envelope of the returned sequence.
    pub(crate) async fn open(stream: TcpStream, zone: &str) -> Self {
        let mut envelopes = Self {
            stream,
            query_id: rand::random(),
            progress: Progress::AwaitingOpeningSoa,
            records: 0,
            pending: None,
        };
        if let Err(err) = envelopes.send_query(zone).await {
            envelopes.pending = Some(err);
        }
        envelopes
    }

    async fn send_query(&mut self, zone: &str) -> Result<(), Error> {
        let wire = axfr_query(zone, self.query_id)?.to_vec()?;
        write_frame(&mut self.stream, &wire).await
    }

    /// Total number of answer records received so far.
    pub(crate) fn records(&self) -> usize {
        self.records
    }

    /// The next envelope, or `None` once the sequence is exhausted.
    pub(crate) async fn next(&mut self) -> Option<Result<Message, Error>> {
        if let Some(err) = self.pending.take() {
            self.progress = Progress::Done;
            return Some(Err(err));
        }
        if self.progress == Progress::Done {
            return None;
        }
        let envelope = self.receive().await;
        if envelope.is_err() {
            self.progress = Progress::Done;
        }
        Some(envelope)
    }

    async fn receive(&mut self) -> Result<Message, Error> {
        let frame = read_frame(&mut self.stream).await?;
        let message = Message::from_vec(&frame)?;
        self.inspect(&message)?;
        Ok(message)
    }

    fn inspect(&mut self, message: &Message) -> Result<(), Error> {
        if message.id() != self.query_id {
            return Err(Error::IdMismatch {
                expected: self.query_id,
                actual: message.id(),
            });
        }
        if message.response_code() != ResponseCode::NoError {
            return Err(Error::BadRcode(message.response_code()));
        }

        let answers = message.answers();
        if self.progress == Progress::AwaitingOpeningSoa {
            match answers.first() {
                Some(first) if first.rr_type() == RecordType::SOA => {
                    self.progress = Progress::InZone;
                }
                _ => return Err(Error::FirstRecordNotSoa),
            }
        }
        self.records += answers.len();

        // The opening SOA alone in its message doesn't close the transfer.
        let ends_with_soa = answers
            .last()
            .map_or(false, |last| last.rr_type() == RecordType::SOA);
        if ends_with_soa && self.records > 1 {
            self.progress = Progress::Done;
        }
        Ok(())
    }
}

async fn write_frame(stream: &mut TcpStream, wire: &[u8]) -> Result<(), Error> {
    let len = u16::try_from(wire.len()).map_err(|_| Error::FrameTooLarge(wire.len()))?;
    let mut frame = Vec::with_capacity(wire.len() + 2);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(wire);
    stream.write_all(&frame).await?;
    stream.flush().await?;
    Ok(())
}

async fn read_frame(stream: &mut TcpStream) -> Result<Vec<u8>, Error> {
    let len = stream.read_u16().await.map_err(eof_as_truncation)?;
    let mut frame = vec![0; usize::from(len)];
    stream
        .read_exact(&mut frame)
        .await
        .map_err(eof_as_truncation)?;
    Ok(frame)
}

fn eof_as_truncation(err: std::io::Error) -> Error {
    match err.kind() {
        ErrorKind::UnexpectedEof => Error::UnexpectedEof,
        _ => Error::IO(err),
    }
}
