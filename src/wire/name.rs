//! Domain name label encoding ([RFC-1035 §3.1][RFC-1035]).
//!
//! [RFC-1035]: https://www.rfc-editor.org/rfc/rfc1035#section-3.1
use crate::wire::{Reader, WireError};

pub const MAX_LABEL_LEN: usize = 63;
pub const MAX_NAME_LEN: usize = 255;

/// Decode the label sequence starting at `offset`, returning the labels and the offset just
/// past the terminating zero byte.
///
/// # Errors
///
/// Returns [`WireError::Truncated`] if a label runs past the end of `buf`, and
/// [`WireError::InvalidLabelLength`] for length bytes above 63 (which includes compression
/// pointers).
pub fn decode_labels(buf: &[u8], offset: usize) -> Result<(Vec<String>, usize), WireError> {
    let mut reader = Reader::at(buf, offset);
    let labels = read_raw_labels(&mut reader)?
        .into_iter()
        .map(|label| String::from_utf8_lossy(label).into_owned())
        .collect();
    Ok((labels, reader.position()))
}

/// Read a label sequence, leaving each label's bytes untouched.
pub(crate) fn read_raw_labels<'a>(reader: &mut Reader<'a>) -> Result<Vec<&'a [u8]>, WireError> {
    let start = reader.position();
    let mut labels = Vec::new();
    loop {
        let offset = reader.position();
        let length = reader.read_u8()?;
        if length == 0 {
            break;
        }
        if usize::from(length) > MAX_LABEL_LEN {
            return Err(WireError::InvalidLabelLength { offset, length });
        }
        labels.push(reader.read_bytes(usize::from(length))?);
    }
    let encoded_len = reader.position() - start;
    if encoded_len > MAX_NAME_LEN {
        return Err(WireError::NameTooLong(encoded_len));
    }
    Ok(labels)
}

/// Append the wire encoding of `labels` to `out`.
///
/// # Errors
///
/// Returns [`WireError::InvalidLabel`] for empty labels or labels longer than 63 bytes, and
/// [`WireError::NameTooLong`] if the encoding would exceed 255 bytes. Nothing is written to
/// `out` on error.
pub fn encode_labels<S: AsRef<[u8]>>(labels: &[S], out: &mut Vec<u8>) -> Result<(), WireError> {
    let encoded_len = labels
        .iter()
        .map(|l| l.as_ref().len() + 1)
        .sum::<usize>()
        + 1;
    if encoded_len > MAX_NAME_LEN {
        return Err(WireError::NameTooLong(encoded_len));
    }
    for label in labels {
        let label: &[u8] = label.as_ref();
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(WireError::InvalidLabel(
                String::from_utf8_lossy(label).into_owned(),
            ));
        }
    }

    out.reserve(encoded_len);
    for label in labels {
        let label: &[u8] = label.as_ref();
        // Length checked above.
        #[allow(clippy::cast_possible_truncation)]
        out.push(label.len() as u8);
        out.extend_from_slice(label);
    }
    out.push(0);
    Ok(())
}

/// Append the wire encoding of a dotted name. A single trailing dot is ignored; `""` and `"."`
/// encode as the root name.
pub fn encode_name(name: &str, out: &mut Vec<u8>) -> Result<(), WireError> {
    encode_labels(&split_name(name), out)
}

/// Split a dotted name into labels.
pub fn split_name(name: &str) -> Vec<&str> {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() {
        return Vec::new();
    }
    name.split('.').collect()
}

/// Wire length of a dotted name, or an error if it can't be encoded.
pub fn encoded_len(name: &str) -> Result<usize, WireError> {
    let mut scratch = Vec::new();
    encode_name(name, &mut scratch)?;
    Ok(scratch.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_labels() {
        let mut out = Vec::new();
        encode_name("www.example.com", &mut out).unwrap();
        assert_eq!(out, b"\x03www\x07example\x03com\x00");
    }

    #[test]
    fn trailing_dot_and_root() {
        let mut dotted = Vec::new();
        encode_name("example.com.", &mut dotted).unwrap();
        let mut plain = Vec::new();
        encode_name("example.com", &mut plain).unwrap();
        assert_eq!(dotted, plain);

        let mut root = Vec::new();
        encode_name(".", &mut root).unwrap();
        assert_eq!(root, [0]);
    }

    #[test]
    fn rejects_bad_labels() {
        let mut out = Vec::new();
        assert_eq!(
            encode_name("a..b", &mut out),
            Err(WireError::InvalidLabel(String::new()))
        );
        let long = "x".repeat(64);
        assert_eq!(
            encode_name(&long, &mut out),
            Err(WireError::InvalidLabel(long.clone()))
        );
        let huge = ["abcdefghi"; 30].join(".");
        assert!(matches!(
            encode_name(&huge, &mut out),
            Err(WireError::NameTooLong(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn decodes_with_offset() {
        let buf = b"\xff\xff\x04host\x01a\x00\x00\x01";
        let (labels, next) = decode_labels(buf, 2).unwrap();
        assert_eq!(labels, ["host", "a"]);
        assert_eq!(next, 10);
        assert_eq!(labels.join("."), "host.a");
    }

    #[test]
    fn label_past_end_is_truncated() {
        let buf = b"\x07exam";
        assert!(matches!(
            decode_labels(buf, 0),
            Err(WireError::Truncated { offset: 1, .. })
        ));
        // Missing terminator.
        assert!(matches!(
            decode_labels(b"\x03com", 0),
            Err(WireError::Truncated { offset: 4, .. })
        ));
    }

    #[test]
    fn raw_labels_keep_their_bytes() {
        let buf = b"\x03a.b\x02\xff\xfe\x00";
        let labels = read_raw_labels(&mut Reader::new(buf)).unwrap();
        assert_eq!(labels, [b"a.b".as_slice(), b"\xff\xfe".as_slice()]);

        let mut out = Vec::new();
        encode_labels(&labels, &mut out).unwrap();
        assert_eq!(out, buf);
    }

    #[test]
    fn pointer_is_an_invalid_length() {
        assert_eq!(
            decode_labels(&[0xc0, 0x0c], 0),
            Err(WireError::InvalidLabelLength {
                offset: 0,
                length: 0xc0
            })
        );
        assert_eq!(
            decode_labels(&[64], 0),
            Err(WireError::InvalidLabelLength {
                offset: 0,
                length: 64
            })
        );
    }
}
