//! Master-file style zone parsing ([RFC-1035 §5][RFC-1035], loosely).
//!
//! ```text
//! $ORIGIN example.com.
//! $TTL 3600
//! @   IN SOA ns1.example.com. admin.example.com. (
//!         2023031201 ; serial
//!         7200       ; refresh
//!         3600       ; retry
//!         1209600    ; expire
//!         3600 )     ; minimum
//! @        3600 IN A    93.184.216.34
//! www           IN CNAME @
//! ipv6     3600 IN AAAA 16 2606:2800:220:1:248:1893:25c8:1946
//! ```
//!
//! Records are `<name> [<ttl>] <class> <type> [<rdlength>] <rdata>`. A parenthesised block may
//! span lines and is read as one line. Lines that don't parse are logged and skipped.
//!
//! [RFC-1035]: https://www.rfc-editor.org/rfc/rfc1035#section-5
use crate::record_store::zones::{canonical, qualify, Zone};
use crate::record_store::{LineError, RData, Record, Soa};
use crate::wire::name::encoded_len;
use crate::wire::{class_from_mnemonic, RecordType};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    fn is(&self, s: &str) -> bool {
        !self.quoted && self.text == s
    }

    fn is_number(&self) -> bool {
        !self.quoted && !self.text.is_empty() && self.text.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Split a line into tokens. `;` outside quotes ends the line; parentheses are tokens of their
/// own; double quotes group text and support `\` escapes.
fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ';' => break,
            '(' | ')' => {
                chars.next();
                tokens.push(Token {
                    text: c.to_string(),
                    quoted: false,
                });
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => text.extend(chars.next()),
                        c => text.push(c),
                    }
                }
                tokens.push(Token { text, quoted: true });
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, ';' | '(' | ')' | '"') {
                        break;
                    }
                    text.push(c);
                    chars.next();
                }
                tokens.push(Token {
                    text,
                    quoted: false,
                });
            }
        }
    }
    tokens
}

/// A parenthesised block being collected across lines.
struct Block {
    line_no: usize,
    depth: usize,
    tokens: Vec<Token>,
}

impl Block {
    /// Feed tokens into the block, returning `true` once every parenthesis is closed.
    fn feed(&mut self, tokens: Vec<Token>) -> bool {
        for token in tokens {
            if token.is("(") {
                self.depth += 1;
            } else if token.is(")") {
                self.depth = self.depth.saturating_sub(1);
            } else {
                self.tokens.push(token);
            }
        }
        self.depth == 0
    }
}

#[derive(Default)]
struct Parser<'a> {
    source: &'a str,
    origin: Option<String>,
    zone_origin: Option<String>,
    default_ttl: Option<u32>,
    records: Vec<(usize, Record)>,
}

/// Parse a master file into a [`Zone`]. The zone is keyed by the first `$ORIGIN`, else the owner
/// of its SOA record, else `fallback_origin`. `source` only labels log messages.
pub fn parse(contents: &str, source: &str, fallback_origin: &str) -> Zone {
    let mut parser = Parser {
        source,
        ..Parser::default()
    };
    let mut block: Option<Block> = None;

    for (idx, line) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let tokens = tokenize(line);

        if let Some(open) = block.as_mut() {
            if open.feed(tokens) {
                if let Some(done) = block.take() {
                    parser.record(done.line_no, done.tokens);
                }
            }
            continue;
        }

        match tokens.first() {
            None => continue,
            Some(first) if !first.quoted && first.text.starts_with('$') => {
                parser.directive(line_no, &tokens);
            }
            Some(_) if tokens.iter().any(|t| t.is("(")) => {
                let mut open = Block {
                    line_no,
                    depth: 0,
                    tokens: Vec::new(),
                };
                if open.feed(tokens) {
                    parser.record(line_no, open.tokens);
                } else {
                    block = Some(open);
                }
            }
            Some(_) => parser.record(line_no, tokens),
        }
    }

    if let Some(open) = block {
        parser.skip(open.line_no, &LineError::UnterminatedBlock);
    }
    parser.into_zone(fallback_origin)
}

impl Parser<'_> {
    fn skip(&self, line_no: usize, err: &LineError) {
        warn!(source = self.source, line_no, %err, "skipping zone line");
    }

    fn directive(&mut self, line_no: usize, tokens: &[Token]) {
        if let Err(err) = self.try_directive(tokens) {
            self.skip(line_no, &err);
        }
    }

    fn try_directive(&mut self, tokens: &[Token]) -> Result<(), LineError> {
        let [key, value] = tokens else {
            return Err(LineError::MalformedDirective);
        };
        match key.text.to_ascii_uppercase().as_str() {
            "$ORIGIN" => {
                let origin = qualify(&value.text, self.origin.as_deref())?;
                encoded_len(&origin)?;
                if self.zone_origin.is_none() {
                    self.zone_origin = Some(origin.clone());
                }
                self.origin = Some(origin);
            }
            "$TTL" => {
                let ttl = value
                    .text
                    .parse()
                    .map_err(|_| LineError::InvalidTtl(value.text.clone()))?;
                self.default_ttl = Some(ttl);
            }
            other => {
                return Err(LineError::UnsupportedDirective(
                    other.trim_start_matches('$').to_string(),
                ))
            }
        }
        Ok(())
    }

    fn record(&mut self, line_no: usize, tokens: Vec<Token>) {
        match self.try_record(&tokens) {
            Ok(record) => self.records.push((line_no, record)),
            Err(err) => self.skip(line_no, &err),
        }
    }

    fn try_record(&self, tokens: &[Token]) -> Result<Record, LineError> {
        let mut fields = tokens.iter().peekable();
        let owner = fields.next().ok_or(LineError::MissingField("name"))?;

        let ttl = match fields.next_if(|t| t.is_number()) {
            Some(t) => t
                .text
                .parse()
                .map_err(|_| LineError::InvalidTtl(t.text.clone()))?,
            None => self.default_ttl.unwrap_or(0),
        };

        let class_token = fields.next().ok_or(LineError::MissingField("class"))?;
        let class = class_from_mnemonic(&class_token.text)
            .ok_or_else(|| LineError::UnknownClass(class_token.text.clone()))?;

        let type_token = fields.next().ok_or(LineError::MissingField("type"))?;
        let rtype = RecordType::from_mnemonic(&type_token.text)
            .ok_or_else(|| LineError::UnsupportedType(type_token.text.clone()))?;

        let mut rest: Vec<&Token> = fields.collect();
        let declared_rdlength = match rest.first() {
            Some(first) if first.is_number() && has_rdlength(rtype, &rest) => {
                let declared = first.text.parse::<u16>().map_err(|_| LineError::InvalidRdata {
                    rtype,
                    value: first.text.clone(),
                })?;
                rest.remove(0);
                Some(declared)
            }
            _ => None,
        };

        let rdata = self.rdata(rtype, &rest)?;
        let wire_len = rdata.to_wire()?.len();
        if let Some(declared) = declared_rdlength {
            if usize::from(declared) != wire_len {
                return Err(LineError::RdLengthMismatch {
                    declared,
                    actual: wire_len,
                });
            }
        }

        let name = qualify(&owner.text, self.origin.as_deref())?;
        encoded_len(&name)?;
        Ok(Record {
            name,
            ttl,
            class,
            rdata,
        })
    }

    fn name(&self, token: &Token) -> Result<String, LineError> {
        qualify(&token.text, self.origin.as_deref())
    }

    fn rdata(&self, rtype: RecordType, fields: &[&Token]) -> Result<RData, LineError> {
        let invalid = |t: &Token| LineError::InvalidRdata {
            rtype,
            value: t.text.clone(),
        };
        let arity = |expected: usize| {
            if fields.len() == expected {
                Ok(())
            } else {
                Err(LineError::RdataArity {
                    rtype,
                    expected,
                    found: fields.len(),
                })
            }
        };
        let number = |t: &Token| t.text.parse::<u32>().map_err(|_| invalid(t));

        let rdata = match rtype {
            RecordType::A => {
                arity(1)?;
                RData::A(fields[0].text.parse().map_err(|_| invalid(fields[0]))?)
            }
            RecordType::AAAA => {
                arity(1)?;
                RData::AAAA(fields[0].text.parse().map_err(|_| invalid(fields[0]))?)
            }
            RecordType::NS => {
                arity(1)?;
                RData::NS(self.name(fields[0])?)
            }
            RecordType::CNAME => {
                arity(1)?;
                RData::CNAME(self.name(fields[0])?)
            }
            RecordType::PTR => {
                arity(1)?;
                RData::PTR(self.name(fields[0])?)
            }
            RecordType::MX => {
                arity(2)?;
                RData::MX {
                    preference: fields[0].text.parse().map_err(|_| invalid(fields[0]))?,
                    exchange: self.name(fields[1])?,
                }
            }
            RecordType::TXT => {
                if fields.is_empty() {
                    return Err(LineError::MissingField("text"));
                }
                RData::TXT(fields.iter().map(|t| t.text.clone()).collect())
            }
            RecordType::SOA => {
                arity(7)?;
                RData::SOA(Soa {
                    mname: self.name(fields[0])?,
                    rname: self.name(fields[1])?,
                    serial: number(fields[2])?,
                    refresh: number(fields[3])?,
                    retry: number(fields[4])?,
                    expire: number(fields[5])?,
                    minimum: number(fields[6])?,
                })
            }
            RecordType::ANY | RecordType::Unknown(_) => {
                return Err(LineError::UnsupportedType(rtype.to_string()))
            }
        };
        Ok(rdata)
    }

    fn into_zone(self, fallback_origin: &str) -> Zone {
        let soa_owner = self
            .records
            .iter()
            .find(|(_, r)| r.record_type() == RecordType::SOA)
            .map(|(_, r)| r.name.clone());
        let origin = self
            .zone_origin
            .clone()
            .or(soa_owner)
            .unwrap_or_else(|| canonical(fallback_origin).to_string());

        let mut zone = Zone::new(&origin);
        for (line_no, record) in self.records {
            if let Err(err) = zone.insert(record) {
                warn!(source = self.source, line_no, %err, "skipping zone line");
            }
        }
        zone
    }
}

/// Whether the first of the rdata `fields` is an explicit rdlength. It is when there is exactly
/// one more field than the type's rdata takes. TXT takes any number of strings, so there the
/// leading number only counts when it equals the encoded length of the strings after it.
fn has_rdlength(rtype: RecordType, fields: &[&Token]) -> bool {
    match rtype {
        RecordType::A
        | RecordType::AAAA
        | RecordType::NS
        | RecordType::CNAME
        | RecordType::PTR => fields.len() == 2,
        RecordType::MX => fields.len() == 3,
        RecordType::SOA => fields.len() == 8,
        RecordType::TXT => match fields.split_first() {
            Some((length, strings)) if !strings.is_empty() => {
                let text = RData::TXT(strings.iter().map(|t| t.text.clone()).collect());
                match (length.text.parse::<usize>(), text.to_wire()) {
                    (Ok(declared), Ok(wire)) => declared == wire.len(),
                    _ => false,
                }
            }
            _ => false,
        },
        RecordType::ANY | RecordType::Unknown(_) => false,
    }
}
