use crate::wire::{Reader, ResponseCode, WireError};

pub const HEADER_LEN: usize = 12;

const QR_BIT: u16 = 1 << 15;
const OPCODE_SHIFT: u16 = 11;
const AA_BIT: u16 = 1 << 10;
const TC_BIT: u16 = 1 << 9;
const RD_BIT: u16 = 1 << 8;
const RA_BIT: u16 = 1 << 7;
const NIBBLE: u16 = 0x000F;

/// The fixed 12 byte message header.
///
/// `opcode` and `rcode` are 4 bit fields; only their low nibble is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub qr: bool,
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub rcode: u8,
    pub qd_count: u16,
    pub an_count: u16,
    pub ns_count: u16,
    pub ar_count: u16,
}

impl Header {
    /// A response header for `request`: same id, opcode and recursion-desired flag, with the
    /// `qr` bit set and all counts zeroed.
    pub fn response_to(request: &Header) -> Self {
        Header {
            id: request.id,
            qr: true,
            opcode: request.opcode,
            rd: request.rd,
            ..Header::default()
        }
    }

    /// A response header for a request too short or malformed to decode. Echoes what arrived:
    /// the id needs the first two bytes, the opcode and `rd` flag the third.
    pub fn response_to_partial(packet: &[u8]) -> Self {
        let mut request = Header::default();
        if let [hi, lo, ..] = packet {
            request.id = u16::from_be_bytes([*hi, *lo]);
        }
        if let Some(high) = packet.get(2) {
            let flags = u16::from(*high) << 8;
            // Masked to a nibble.
            #[allow(clippy::cast_possible_truncation)]
            let opcode = ((flags >> OPCODE_SHIFT) & NIBBLE) as u8;
            request.opcode = opcode;
            request.rd = flags & RD_BIT != 0;
        }
        Header::response_to(&request)
    }

    pub fn set_response_code(&mut self, code: ResponseCode) {
        self.rcode = code.into();
    }

    pub fn flags(&self) -> u16 {
        let mut flags = 0;
        if self.qr {
            flags |= QR_BIT;
        }
        flags |= (u16::from(self.opcode) & NIBBLE) << OPCODE_SHIFT;
        if self.aa {
            flags |= AA_BIT;
        }
        if self.tc {
            flags |= TC_BIT;
        }
        if self.rd {
            flags |= RD_BIT;
        }
        if self.ra {
            flags |= RA_BIT;
        }
        flags | (u16::from(self.rcode) & NIBBLE)
    }

    pub fn decode(reader: &mut Reader<'_>) -> Result<Self, WireError> {
        let id = reader.read_u16()?;
        let flags = reader.read_u16()?;
        // Both fields are masked to a nibble.
        #[allow(clippy::cast_possible_truncation)]
        let header = Header {
            id,
            qr: flags & QR_BIT != 0,
            opcode: ((flags >> OPCODE_SHIFT) & NIBBLE) as u8,
            aa: flags & AA_BIT != 0,
            tc: flags & TC_BIT != 0,
            rd: flags & RD_BIT != 0,
            ra: flags & RA_BIT != 0,
            rcode: (flags & NIBBLE) as u8,
            qd_count: reader.read_u16()?,
            an_count: reader.read_u16()?,
            ns_count: reader.read_u16()?,
            ar_count: reader.read_u16()?,
        };
        Ok(header)
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.to_be_bytes());
        out.extend_from_slice(&self.flags().to_be_bytes());
        out.extend_from_slice(&self.qd_count.to_be_bytes());
        out.extend_from_slice(&self.an_count.to_be_bytes());
        out.extend_from_slice(&self.ns_count.to_be_bytes());
        out.extend_from_slice(&self.ar_count.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(header: Header) -> Header {
        let mut out = Vec::new();
        header.encode(&mut out);
        assert_eq!(out.len(), HEADER_LEN);
        Header::decode(&mut Reader::new(&out)).unwrap()
    }

    #[test]
    fn round_trips_every_flag_combination() {
        for bits in 0..32u8 {
            for opcode in 0..16 {
                for rcode in 0..16 {
                    let id = u16::from(opcode) * 4099 + u16::from(rcode);
                    let seed = u16::from(bits) << 8 | u16::from(opcode) << 4 | u16::from(rcode);
                    let header = Header {
                        id,
                        qr: bits & 1 != 0,
                        opcode,
                        aa: bits & 2 != 0,
                        tc: bits & 4 != 0,
                        rd: bits & 8 != 0,
                        ra: bits & 16 != 0,
                        rcode,
                        qd_count: seed,
                        an_count: !seed,
                        ns_count: seed.wrapping_mul(40_503),
                        ar_count: seed.rotate_left(7) ^ id,
                    };
                    assert_eq!(round_trip(header), header);
                }
            }
        }
    }

    #[test]
    fn flag_bit_positions() {
        let header = Header {
            qr: true,
            opcode: 0b1010,
            aa: true,
            rcode: 3,
            ..Header::default()
        };
        assert_eq!(header.flags(), 0b1101_0100_0000_0011);

        let rd_ra = Header {
            rd: true,
            ra: true,
            ..Header::default()
        };
        assert_eq!(rd_ra.flags(), 0x0180);
    }

    #[test]
    fn reserved_bits_are_ignored() {
        let bytes = [0, 7, 0x00, 0x70, 0, 1, 0, 0, 0, 0, 0, 0];
        let header = Header::decode(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(header.flags(), 0);
        assert_eq!(header.id, 7);
        assert_eq!(header.qd_count, 1);
    }

    #[test]
    fn short_header_is_truncated() {
        let bytes = [0, 7, 0x01, 0x00, 0, 1];
        assert!(matches!(
            Header::decode(&mut Reader::new(&bytes)),
            Err(WireError::Truncated { offset: 6, .. })
        ));
    }

    #[test]
    fn response_header_echoes_request() {
        let request = Header {
            id: 0xbeef,
            opcode: 2,
            rd: true,
            qd_count: 1,
            ..Header::default()
        };
        let mut response = Header::response_to(&request);
        response.set_response_code(ResponseCode::NameError);
        assert_eq!(response.id, 0xbeef);
        assert!(response.qr && response.rd && !response.aa);
        assert_eq!(response.opcode, 2);
        assert_eq!(response.rcode, 3);
        assert_eq!(response.qd_count, 0);
    }

    #[test]
    fn partial_request_headers() {
        let h = Header::response_to_partial(&[0x12, 0x34, 0x11]);
        assert_eq!(h.id, 0x1234);
        assert_eq!(h.opcode, 2);
        assert!(h.qr && h.rd);
        assert_eq!(h.qd_count, 0);

        let h = Header::response_to_partial(&[0x12, 0x34]);
        assert_eq!((h.id, h.opcode, h.rd), (0x1234, 0, false));
        assert_eq!(Header::response_to_partial(&[0x12]).id, 0);
        assert!(Header::response_to_partial(&[]).qr);
    }
}
