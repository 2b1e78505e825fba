//! Public key handling for the NDN trust stack.
//!
//! This crate loads the public keys that trust anchors and certificates carry:
//!
//! # Core Capabilities
//!
//! - **Key decoding**: Validate untrusted DER `SubjectPublicKeyInfo` blobs
//! - **Canonical encoding**: Re-emit keys with a shortest-form outer length
//! - **Text rendering**: Wrapped base64 for logs and configuration files
//! - **Fingerprints**: SHA-256 digests over the canonical bytes
//!
//! # Supported Algorithms
//!
//! - **Keys**: RSA (`rsaEncryption`, 1.2.840.113549.1.1.1)
//! - **Digests**: SHA-256
//!
//! Keys for any other algorithm are rejected while decoding.

pub mod ber;
pub mod error;
pub mod public_key;

pub use error::{DecodeError, KeyError, KeyResult};
pub use public_key::{DigestAlgorithm, KeyBlob, KeyBlobCodec, KeyType, RENDER_LINE_WIDTH};
