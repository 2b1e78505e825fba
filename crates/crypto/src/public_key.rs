//! Public key blobs.
//!
//! Keys travel as DER `SubjectPublicKeyInfo`:
//!
//! ```text
//! SubjectPublicKeyInfo ::= SEQUENCE {
//!     algorithm           AlgorithmIdentifier,
//!     keybits             BIT STRING }
//!
//! AlgorithmIdentifier ::= SEQUENCE {
//!     algorithm           OBJECT IDENTIFIER,
//!     parameters          ANY OPTIONAL }
//! ```
//!
//! Decoding runs in two passes over owned buffers: the outer sequence is first
//! re-encoded with a canonical definite length, then the canonical bytes are
//! parsed again to check the algorithm. Only RSA keys are accepted.

use crate::ber::{self, Reader, Tag};
use crate::error::{DecodeError, KeyError, KeyResult};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use tracing::debug;
use x509_parser::oid_registry::{Oid, OID_PKCS1_RSAENCRYPTION};

/// Column at which rendered base64 text is wrapped.
pub const RENDER_LINE_WIDTH: usize = 64;

/// Supported key algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum KeyType {
    Rsa,
}

/// Digest algorithms available for key fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DigestAlgorithm {
    Sha256,
}

/// A validated, canonically encoded RSA `SubjectPublicKeyInfo`.
///
/// Only [`KeyBlobCodec::decode`] creates blobs, so holding one means the bytes
/// passed structural and algorithm checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct KeyBlob {
    der: Vec<u8>,
}

impl KeyBlob {
    /// Canonical DER bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    pub fn key_type(&self) -> KeyType {
        KeyType::Rsa
    }

    /// Digest of the canonical bytes.
    pub fn digest(&self, algorithm: DigestAlgorithm) -> Vec<u8> {
        match algorithm {
            DigestAlgorithm::Sha256 => Sha256::digest(&self.der).to_vec(),
        }
    }
}

impl TryFrom<&[u8]> for KeyBlob {
    type Error = KeyError;

    fn try_from(raw: &[u8]) -> KeyResult<Self> {
        KeyBlobCodec::decode(raw)
    }
}

impl TryFrom<Vec<u8>> for KeyBlob {
    type Error = KeyError;

    fn try_from(raw: Vec<u8>) -> KeyResult<Self> {
        KeyBlobCodec::decode(&raw)
    }
}

impl From<KeyBlob> for Vec<u8> {
    fn from(key: KeyBlob) -> Self {
        key.der
    }
}

impl fmt::Display for KeyBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&KeyBlobCodec::render(self))
    }
}

/// Stateless codec between raw key bytes and [`KeyBlob`]s.
pub struct KeyBlobCodec;

impl KeyBlobCodec {
    /// Parse and validate an untrusted `SubjectPublicKeyInfo`.
    pub fn decode(raw: &[u8]) -> KeyResult<KeyBlob> {
        let canonical = canonicalize(raw)?;
        check_algorithm(&canonical)?;

        debug!(
            input_len = raw.len(),
            canonical_len = canonical.len(),
            "decoded RSA public key"
        );
        Ok(KeyBlob { der: canonical })
    }

    /// Canonical bytes of `key`. No re-validation is performed.
    pub fn encode(key: &KeyBlob) -> Vec<u8> {
        key.der.clone()
    }

    /// Write the canonical bytes of `key` to `out`.
    pub fn encode_to<W: Write>(key: &KeyBlob, out: &mut W) -> io::Result<()> {
        out.write_all(&key.der)
    }

    /// Base64 text of the canonical bytes, wrapped at [`RENDER_LINE_WIDTH`]
    /// columns, each line newline-terminated.
    pub fn render(key: &KeyBlob) -> String {
        let encoded = general_purpose::STANDARD.encode(&key.der);
        let mut out = String::with_capacity(encoded.len() + encoded.len() / RENDER_LINE_WIDTH + 1);

        for (idx, c) in encoded.chars().enumerate() {
            if idx > 0 && idx % RENDER_LINE_WIDTH == 0 {
                out.push('\n');
            }
            out.push(c);
        }
        out.push('\n');
        out
    }
}

/// Pass one: copy the outer sequence's contents under a minimal length header.
fn canonicalize(raw: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut reader = Reader::new(raw);
    let spki = reader.read_expected(Tag::SEQUENCE)?;
    reader.finish()?;

    let mut canonical = Vec::with_capacity(spki.contents.len() + 6);
    ber::write_element(Tag::SEQUENCE, spki.contents, &mut canonical);
    Ok(canonical)
}

/// Pass two: walk the canonical bytes and require the RSA algorithm.
fn check_algorithm(canonical: &[u8]) -> KeyResult<()> {
    let mut reader = Reader::new(canonical);
    let spki = reader.read_expected(Tag::SEQUENCE)?;
    let mut fields = spki.reader();

    if fields.is_empty() {
        return Err(unsupported("no AlgorithmIdentifier"));
    }
    let algorithm_info = fields.read_element()?;
    // The remaining fields must still be well-formed elements.
    while !fields.is_empty() {
        fields.read_element()?;
    }

    if algorithm_info.tag != Tag::SEQUENCE {
        return Err(unsupported(format!(
            "{} in place of AlgorithmIdentifier",
            algorithm_info.tag
        )));
    }

    let mut algorithm_fields = algorithm_info.reader();
    if algorithm_fields.is_empty() {
        return Err(unsupported("empty AlgorithmIdentifier"));
    }
    let oid = algorithm_fields.read_element()?;
    if oid.tag != Tag::OBJECT_IDENTIFIER {
        return Err(unsupported(format!("{} in place of algorithm OID", oid.tag)));
    }

    let algorithm = parse_oid(oid.contents)?;
    if algorithm != OID_PKCS1_RSAENCRYPTION {
        return Err(KeyError::UnsupportedAlgorithm {
            found: algorithm.to_id_string(),
        });
    }

    Ok(())
}

fn parse_oid(contents: &[u8]) -> Result<Oid<'_>, DecodeError> {
    // The last subidentifier octet never has its continuation bit set.
    match contents.last() {
        Some(last) if last & 0x80 == 0 => Ok(Oid::new(Cow::Borrowed(contents))),
        _ => Err(DecodeError::InvalidObjectIdentifier),
    }
}

fn unsupported(found: impl Into<String>) -> KeyError {
    KeyError::UnsupportedAlgorithm {
        found: found.into(),
    }
}
