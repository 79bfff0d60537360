//! Common types and utilities shared by every OGC protocol binding.
//!
//! Provides the pieces that do not depend on a particular operation or
//! protocol version:
//! - the error taxonomy and the aggregated validation report
//! - the case-insensitive KVP parameter map
//! - a path-addressed XML element facade over quick-xml
//! - GML envelope and time primitives

pub mod bbox;
pub mod error;
pub mod kvp;
pub mod namespaces;
pub mod report;
pub mod time;
pub mod xml;

pub use bbox::{Envelope, EnvelopeParseError};
pub use error::{CodecError, CodecResult, Encoding, ReadError, ReadResult};
pub use kvp::KvpParams;
pub use report::{ExceptionCode, ValidationFailure, ValidationReport, Violation};
pub use time::{TimeParseError, TimeValue};
pub use xml::{NamespaceContext, XmlAttribute, XmlElement};
