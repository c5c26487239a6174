use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type SharedConfig = Arc<Config>;

/// Ports below 1024 need privileges the server shouldn't run with.
pub const PORT_RANGE: RangeInclusive<u32> = 1024..=65535;

fn default_listen_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u32 {
    9000
}

fn default_records() -> PathBuf {
    PathBuf::from("hosts.txt")
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: IpAddr,
    /// Kept wider than `u16` so out-of-range values get a useful diagnostic.
    #[serde(default = "default_port")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub port: u32,
    /// A hosts file, or a directory of zone files.
    #[serde(default = "default_records")]
    pub records: PathBuf,
    /// Log file to append to. Logs go to stdout when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: default_listen_addr(),
            port: default_port(),
            records: default_records(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the file can't be opened, [`Error::InvalidJSON`] if it doesn't
    /// parse, and [`Error::PortOutOfRange`] for a port outside [`PORT_RANGE`].
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.dns_bind_addr()?;
        Ok(conf)
    }

    /// The UDP address to serve on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PortOutOfRange`] for a port outside [`PORT_RANGE`].
    pub fn dns_bind_addr(&self) -> Result<SocketAddr, Error> {
        if !PORT_RANGE.contains(&self.port) {
            return Err(Error::PortOutOfRange(self.port));
        }
        let port = u16::try_from(self.port).map_err(|_| Error::PortOutOfRange(self.port))?;
        Ok(SocketAddr::new(self.listen_addr, port))
    }
}
