//! Minimal BER reader and DER writer.
//!
//! Only what key loading needs: identifier and length octets, definite-length
//! elements, nested descent and the canonical (shortest) length form on output.
//! Every read is bounds-checked against the remaining input.

use crate::error::DecodeError;
use std::fmt;

/// Length octets beyond this many cannot describe any input we accept.
const MAX_LENGTH_OCTETS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl Class {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::ContextSpecific,
            _ => Class::Private,
        }
    }

    fn bits(self) -> u8 {
        match self {
            Class::Universal => 0,
            Class::Application => 1,
            Class::ContextSpecific => 2,
            Class::Private => 3,
        }
    }
}

/// Identifier octets of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    pub class: Class,
    pub constructed: bool,
    pub number: u32,
}

impl Tag {
    pub const OBJECT_IDENTIFIER: Tag = Tag::universal(false, 6);
    pub const SEQUENCE: Tag = Tag::universal(true, 16);

    pub const fn universal(constructed: bool, number: u32) -> Self {
        Self {
            class: Class::Universal,
            constructed,
            number,
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let leading = (self.class.bits() << 6) | if self.constructed { 0x20 } else { 0 };

        if self.number < 0x1f {
            out.push(leading | self.number as u8);
            return;
        }

        out.push(leading | 0x1f);
        let mut groups = Vec::new();
        let mut number = self.number;
        loop {
            groups.push((number & 0x7f) as u8);
            number >>= 7;
            if number == 0 {
                break;
            }
        }
        for (idx, group) in groups.iter().enumerate().rev() {
            out.push(if idx == 0 { *group } else { group | 0x80 });
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Tag::SEQUENCE => f.write_str("SEQUENCE"),
            Tag::OBJECT_IDENTIFIER => f.write_str("OBJECT IDENTIFIER"),
            Tag {
                class,
                constructed,
                number,
            } => {
                let class = match class {
                    Class::Universal => "UNIVERSAL",
                    Class::Application => "APPLICATION",
                    Class::ContextSpecific => "CONTEXT",
                    Class::Private => "PRIVATE",
                };
                let form = if constructed { "constructed" } else { "primitive" };
                write!(f, "[{} {}] {}", class, number, form)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Definite(usize),
    Indefinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: Tag,
    pub length: Length,
    /// Offset of the identifier octets.
    pub offset: usize,
}

/// A definite-length element whose contents lie entirely within the input.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    pub tag: Tag,
    pub contents: &'a [u8],
    /// Offset of the first contents octet.
    pub offset: usize,
}

impl<'a> Element<'a> {
    /// Reader over the contents, for descending into constructed elements.
    pub fn reader(&self) -> Reader<'a> {
        Reader {
            input: self.contents,
            pos: 0,
            base: self.offset,
        }
    }
}

/// Sequential reader over BER-encoded elements.
pub struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            base: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let byte = *self.input.get(self.pos).ok_or(DecodeError::Truncated {
            offset: self.offset(),
        })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read identifier and length octets.
    pub fn read_header(&mut self) -> Result<Header, DecodeError> {
        let offset = self.offset();
        let tag = self.read_tag()?;
        let length = self.read_length()?;
        Ok(Header {
            tag,
            length,
            offset,
        })
    }

    fn read_tag(&mut self) -> Result<Tag, DecodeError> {
        let offset = self.offset();
        let first = self.read_byte()?;

        // 0x00 only appears as an end-of-contents marker.
        if first == 0 {
            return Err(DecodeError::InvalidTag { offset });
        }

        let class = Class::from_bits(first >> 6);
        let constructed = first & 0x20 != 0;
        let mut number = u32::from(first & 0x1f);

        if number == 0x1f {
            number = 0;
            let mut first_group = true;
            loop {
                let b = self.read_byte()?;
                if first_group && b == 0x80 {
                    return Err(DecodeError::InvalidTag { offset });
                }
                first_group = false;
                if number > (u32::MAX >> 7) {
                    return Err(DecodeError::InvalidTag { offset });
                }
                number = (number << 7) | u32::from(b & 0x7f);
                if b & 0x80 == 0 {
                    break;
                }
            }
            // Numbers below 31 have a single-octet identifier.
            if number < 0x1f {
                return Err(DecodeError::InvalidTag { offset });
            }
        }

        Ok(Tag {
            class,
            constructed,
            number,
        })
    }

    fn read_length(&mut self) -> Result<Length, DecodeError> {
        let offset = self.offset();
        let first = self.read_byte()?;

        match first {
            b if b < 0x80 => Ok(Length::Definite(usize::from(b))),
            0x80 => Ok(Length::Indefinite),
            0xff => Err(DecodeError::InvalidLength { offset }),
            b => {
                let count = usize::from(b & 0x7f);
                if count > MAX_LENGTH_OCTETS {
                    return Err(DecodeError::InvalidLength { offset });
                }
                let mut length = 0usize;
                for _ in 0..count {
                    length = (length << 8) | usize::from(self.read_byte()?);
                }
                Ok(Length::Definite(length))
            }
        }
    }

    /// Read one definite-length element.
    pub fn read_element(&mut self) -> Result<Element<'a>, DecodeError> {
        let header = self.read_header()?;

        let length = match header.length {
            Length::Definite(length) => length,
            Length::Indefinite => {
                return Err(DecodeError::IndefiniteLength {
                    offset: header.offset,
                })
            }
        };

        if length > self.remaining() {
            return Err(DecodeError::LengthOverrun {
                offset: header.offset,
                length,
                remaining: self.remaining(),
            });
        }

        let offset = self.offset();
        let contents = &self.input[self.pos..self.pos + length];
        self.pos += length;

        Ok(Element {
            tag: header.tag,
            contents,
            offset,
        })
    }

    /// Read one definite-length element that must carry `expected`.
    pub fn read_expected(&mut self, expected: Tag) -> Result<Element<'a>, DecodeError> {
        let element = self.read_element()?;
        if element.tag != expected {
            return Err(DecodeError::UnexpectedTag {
                expected,
                found: element.tag,
            });
        }
        Ok(element)
    }

    /// Fail unless all input has been consumed.
    pub fn finish(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            count => Err(DecodeError::TrailingData { count }),
        }
    }
}

/// Append `tag`, the shortest definite length and `contents` to `out`.
pub fn write_element(tag: Tag, contents: &[u8], out: &mut Vec<u8>) {
    tag.encode(out);
    write_length(contents.len(), out);
    out.extend_from_slice(contents);
}

fn write_length(length: usize, out: &mut Vec<u8>) {
    if length < 0x80 {
        out.push(length as u8);
        return;
    }

    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let significant = &bytes[skip..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}
