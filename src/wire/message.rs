use crate::wire::name::{encode_labels, encode_name, read_raw_labels, split_name};
use crate::wire::{Header, Reader, RecordType, WireError, HEADER_LEN};

/// Largest message sent over UDP without EDNS0 ([RFC-1035 §4.2.1][RFC-1035]).
///
/// [RFC-1035]: https://www.rfc-editor.org/rfc/rfc1035#section-4.2.1
pub const MAX_UDP_MESSAGE_LEN: usize = 512;

/// Pointer to the question name, which always starts right after the header.
const QUESTION_NAME_POINTER: [u8; 2] = [0xC0, 0x0C];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// The name's labels exactly as they arrived, so the question can be echoed byte for byte.
    pub labels: Vec<Vec<u8>>,
    pub qtype: RecordType,
    pub qclass: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub header: Header,
    pub question: Question,
}

/// An answer ready to be written. The rdlength written on the wire is `rdata.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub rtype: RecordType,
    pub class: u16,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub header: Header,
    /// `None` when the question couldn't be decoded and only a header is sent back.
    pub question: Option<Question>,
    pub answers: Vec<ResourceRecord>,
}

impl Question {
    pub fn new(qname: &str, qtype: RecordType, qclass: u16) -> Self {
        Question {
            labels: split_name(qname)
                .into_iter()
                .map(|label| label.as_bytes().to_vec())
                .collect(),
            qtype,
            qclass,
        }
    }

    /// The dotted name to look up, without a trailing dot. `None` when a label isn't UTF-8 or
    /// contains a `.`: no stored name can match such a question.
    pub fn name(&self) -> Option<String> {
        let labels = self
            .labels
            .iter()
            .map(|label| std::str::from_utf8(label).ok().filter(|l| !l.contains('.')))
            .collect::<Option<Vec<&str>>>()?;
        Some(labels.join("."))
    }

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), WireError> {
        encode_labels(&self.labels, out)?;
        out.extend_from_slice(&u16::from(self.qtype).to_be_bytes());
        out.extend_from_slice(&self.qclass.to_be_bytes());
        Ok(())
    }
}

impl ResourceRecord {
    fn encode(&self, question_name: Option<&str>, out: &mut Vec<u8>) -> Result<(), WireError> {
        let rdlength =
            u16::try_from(self.rdata.len()).map_err(|_| WireError::RdataTooLong(self.rdata.len()))?;
        match question_name {
            Some(q) if q == self.name => out.extend_from_slice(&QUESTION_NAME_POINTER),
            _ => encode_name(&self.name, out)?,
        }
        out.extend_from_slice(&u16::from(self.rtype).to_be_bytes());
        out.extend_from_slice(&self.class.to_be_bytes());
        out.extend_from_slice(&self.ttl.to_be_bytes());
        out.extend_from_slice(&rdlength.to_be_bytes());
        out.extend_from_slice(&self.rdata);
        Ok(())
    }
}

/// Decode the header and first question of a query. Anything after the question (answers,
/// additional records such as an EDNS0 OPT) is ignored.
///
/// # Errors
///
/// Returns a [`WireError`] if the message is truncated, a label length is invalid, or the
/// header announces no question.
pub fn decode_query(buf: &[u8]) -> Result<Query, WireError> {
    let mut reader = Reader::new(buf);
    let header = Header::decode(&mut reader)?;
    if header.qd_count == 0 {
        return Err(WireError::NoQuestion);
    }
    let labels = read_raw_labels(&mut reader)?
        .into_iter()
        .map(<[u8]>::to_vec)
        .collect();
    let qtype = RecordType::from(reader.read_u16()?);
    let qclass = reader.read_u16()?;
    Ok(Query {
        header,
        question: Question {
            labels,
            qtype,
            qclass,
        },
    })
}

/// Encode a query message. The header is written as given.
pub fn encode_query(query: &Query) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::with_capacity(MAX_UDP_MESSAGE_LEN);
    query.header.encode(&mut out);
    query.question.encode(&mut out)?;
    Ok(out)
}

/// Encode a response, keeping it within [`MAX_UDP_MESSAGE_LEN`].
///
/// `qd_count` and `an_count` are written from what is actually encoded. When not every answer
/// fits, the longest fitting prefix of answers is kept and the `tc` flag is set.
///
/// # Errors
///
/// Returns a [`WireError`] if a name can't be encoded or an rdata is longer than 65535 bytes.
pub fn encode_response(response: &Response) -> Result<Vec<u8>, WireError> {
    let mut body = Vec::with_capacity(MAX_UDP_MESSAGE_LEN);
    if let Some(question) = &response.question {
        question.encode(&mut body)?;
    }

    let mut header = response.header;
    header.qd_count = u16::from(response.question.is_some());
    header.an_count = 0;

    let question_name = response.question.as_ref().and_then(Question::name);
    let mut entry = Vec::new();
    for answer in &response.answers {
        entry.clear();
        answer.encode(question_name.as_deref(), &mut entry)?;
        if HEADER_LEN + body.len() + entry.len() > MAX_UDP_MESSAGE_LEN {
            header.tc = true;
            break;
        }
        body.extend_from_slice(&entry);
        header.an_count += 1;
    }

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    header.encode(&mut out);
    out.extend_from_slice(&body);
    Ok(out)
}
