use crate::error::Error;
use serde::{Deserialize, Deserializer};
use serde_with::{serde_as, DurationSeconds};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, Read};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(310);

#[serde_as]
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Local address IPv4 transfers are bound to. Unset or `""` lets the system choose.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source_ip4: Option<Ipv4Addr>,
    /// Local address IPv6 transfers are bound to. Unset or `""` lets the system choose.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source_ip6: Option<Ipv6Addr>,
    /// Upper bound for a whole transfer, from dial to closing SOA.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_api_timeout")]
    pub api_timeout: Duration,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8080))
}

fn default_transfer_timeout() -> Duration {
    DEFAULT_TRANSFER_TIMEOUT
}

fn default_api_timeout() -> Duration {
    DEFAULT_API_TIMEOUT
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            source_ip4: None,
            source_ip6: None,
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
            api_timeout: DEFAULT_API_TIMEOUT,
        }
    }
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        Self::try_from_reader(BufReader::new(f))
    }

    pub fn try_from_reader(reader: impl Read) -> Result<Self, Error> {
        let conf: Config = serde_json::from_reader(reader)?;
        conf.timeouts_are_sane()?;
        Ok(conf)
    }

    fn timeouts_are_sane(&self) -> Result<(), Error> {
        if self.transfer_timeout.is_zero() {
            return Err(Error::InvalidTimeouts("transfer-timeout must be positive"));
        }
        // A request timeout shorter than the transfer would cut off the outcome.
        if self.api_timeout <= self.transfer_timeout {
            return Err(Error::InvalidTimeouts(
                "api-timeout must be longer than transfer-timeout",
            ));
        }
        Ok(())
    }
}
