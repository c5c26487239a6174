//! Error types.

use crate::record_store::LineError;
use std::path::PathBuf;

/// Error enumerates the fatal minidns error states. All of them stop the process before it starts
/// serving; errors caused by a single request are answered on the wire instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when [`Config::port`][`crate::config::Config::port`] is outside 1024 - 65535.
    #[error("the port number {0} is out of range (1024 - 65535)")]
    PortOutOfRange(u32),

    /// Returned when a generic IO error occurs, e.g. binding the UDP socket.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when [trying to load a `Config`][crate::config::Config::try_from_file] fails due
    /// to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when the configured record source, or a zone file inside it, can't be read.
    #[error("could not read record source {}", .path.display())]
    StoreIO {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Returned when the record source was read but yielded no usable records.
    #[error("record source {} holds no usable records", .0.display())]
    EmptyStore(PathBuf),

    /// Returned when a [JSON zone document][crate::record_store::zone_document] doesn't match the
    /// document schema.
    #[error("invalid zone document {}", .path.display())]
    ZoneDocument {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Returned when a JSON zone document is well formed but holds a name that can't be served.
    #[error("invalid record in zone document {}", .path.display())]
    ZoneDocumentRecord { path: PathBuf, source: LineError },

    /// Returned when two zone files declare the same origin.
    #[error("zone \"{origin}\" from {} is already defined", .path.display())]
    DuplicateZone { origin: String, path: PathBuf },
}
