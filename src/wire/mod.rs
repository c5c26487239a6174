//! DNS wire format.
//!
//! A deliberately small subset of [RFC-1035][RFC-1035]: the 12 byte header, a single question
//! and an answer section. Names are read as plain label sequences; compression pointers are never
//! followed on decode; the only pointer ever written is the `0xC0 0x0C` reference back to the
//! question name.
//!
//! [RFC-1035]: https://www.rfc-editor.org/rfc/rfc1035#section-4

pub mod cursor;
pub mod header;
pub mod message;
pub mod name;

use std::fmt;

pub use cursor::Reader;
pub use header::{Header, HEADER_LEN};
pub use message::{
    decode_query, encode_query, encode_response, Query, Question, ResourceRecord, Response,
    MAX_UDP_MESSAGE_LEN,
};

/// The `IN` (Internet) class.
pub const CLASS_IN: u16 = 1;

/// Domain holding IPv4 reverse lookup names ([RFC-1035 §3.5][RFC-1035-3.5]).
///
/// [RFC-1035-3.5]: https://www.rfc-editor.org/rfc/rfc1035#section-3.5
pub const REVERSE_DOMAIN: &str = "in-addr.arpa";

/// Errors produced while reading or writing DNS messages.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("truncated message: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid label length {length} at offset {offset}")]
    InvalidLabelLength { offset: usize, length: u8 },

    #[error("encoded name is {0} bytes, the limit is 255")]
    NameTooLong(usize),

    #[error("invalid label \"{0}\": labels must be 1 to 63 bytes")]
    InvalidLabel(String),

    #[error("message carries no question")]
    NoQuestion,

    #[error("rdata of {0} bytes does not fit a 16 bit length")]
    RdataTooLong(usize),
}

/// Response codes this server produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    FormatError,
    NameError,
}

impl From<ResponseCode> for u8 {
    fn from(code: ResponseCode) -> Self {
        match code {
            ResponseCode::Success => 0,
            ResponseCode::FormatError => 1,
            ResponseCode::NameError => 3,
        }
    }
}

/// Resource record types understood by the record store. Anything else is carried through
/// as [`RecordType::Unknown`] so that questions echo back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    ANY,
    Unknown(u16),
}

impl RecordType {
    /// Parse a master-file mnemonic (`A`, `AAAA`, ...). Mnemonics are case-insensitive.
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        let rtype = match s.to_ascii_uppercase().as_str() {
            "A" => Self::A,
            "NS" => Self::NS,
            "CNAME" => Self::CNAME,
            "SOA" => Self::SOA,
            "PTR" => Self::PTR,
            "MX" => Self::MX,
            "TXT" => Self::TXT,
            "AAAA" => Self::AAAA,
            _ => return None,
        };
        Some(rtype)
    }
}

impl From<u16> for RecordType {
    fn from(n: u16) -> Self {
        match n {
            1 => Self::A,
            2 => Self::NS,
            5 => Self::CNAME,
            6 => Self::SOA,
            12 => Self::PTR,
            15 => Self::MX,
            16 => Self::TXT,
            28 => Self::AAAA,
            255 => Self::ANY,
            n => Self::Unknown(n),
        }
    }
}

impl From<RecordType> for u16 {
    fn from(rtype: RecordType) -> Self {
        match rtype {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::ANY => 255,
            RecordType::Unknown(n) => n,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(n) => write!(f, "TYPE{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Parse a master-file class mnemonic into its numeric value.
pub fn class_from_mnemonic(s: &str) -> Option<u16> {
    match s.to_ascii_uppercase().as_str() {
        "IN" => Some(CLASS_IN),
        "CS" => Some(2),
        "CH" => Some(3),
        "HS" => Some(4),
        _ => None,
    }
}
