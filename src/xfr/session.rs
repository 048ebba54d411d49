//! Dialing the master: address family detection, source selection and the timed connect.
use crate::config::Config;
use crate::error::Error;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::time::Duration;
use tokio::net::{TcpSocket, TcpStream};
use tokio::time::timeout;

/// Fixed bound on the TCP handshake with a master.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    V4,
    V6,
}

/// Where a transfer connects to, and which family of source address it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Endpoint {
    family: Family,
    remote: SocketAddr,
}

impl Endpoint {
    /// Classify a bare master literal and attach the DNS port.
    ///
    /// IPv4-mapped IPv6 literals (`::ffff:192.0.2.1`) have a four byte form and are dialed
    /// as IPv4. Anything that is not an address literal at all is rejected rather than
    /// guessed at.
    pub(crate) fn parse(master: &str, port: u16) -> Result<Self, Error> {
        let ip: IpAddr = master
            .parse()
            .map_err(|_| Error::InvalidMaster(master.to_string()))?;
        let endpoint = match ip {
            IpAddr::V4(v4) => Self::v4(v4, port),
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => Self::v4(v4, port),
                None => Self {
                    family: Family::V6,
                    remote: SocketAddr::V6(SocketAddrV6::new(v6, port, 0, 0)),
                },
            },
        };
        Ok(endpoint)
    }

    fn v4(ip: Ipv4Addr, port: u16) -> Self {
        Self {
            family: Family::V4,
            remote: SocketAddr::V4(SocketAddrV4::new(ip, port)),
        }
    }

    pub(crate) fn remote(&self) -> SocketAddr {
        self.remote
    }

    /// The configured source address for this endpoint's family, with an OS-chosen port.
    pub(crate) fn local_addr(&self, config: &Config) -> SocketAddr {
        match self.family {
            Family::V4 => {
                SocketAddr::from((config.source_ip4.unwrap_or(Ipv4Addr::UNSPECIFIED), 0))
            }
            Family::V6 => {
                SocketAddr::from((config.source_ip6.unwrap_or(Ipv6Addr::UNSPECIFIED), 0))
            }
        }
    }

    /// Open a TCP connection to the master from `local`, giving up after [`CONNECT_TIMEOUT`].
    pub(crate) async fn dial(&self, local: SocketAddr) -> Result<TcpStream, Error> {
        let socket = match self.family {
            Family::V4 => TcpSocket::new_v4(),
            Family::V6 => TcpSocket::new_v6(),
        }
        .map_err(|err| Error::Bind(local, err))?;
        socket.bind(local).map_err(|err| Error::Bind(local, err))?;

        tracing::debug!("dialing {} from {local}", self.remote);
        match timeout(CONNECT_TIMEOUT, socket.connect(self.remote)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(err)) => Err(Error::Connect(self.remote, err)),
            Err(_) => Err(Error::ConnectTimeout(self.remote, CONNECT_TIMEOUT)),
        }
    }
}
