//! OGC SOS and WCS protocol bindings.
//!
//! Converts between a canonical, version-independent request/response model
//! and the KVP and XML encodings of each supported operation and version:
//! - [`model`]: requests, responses and filters
//! - [`codec`]: reader and writer contracts plus type-erased [`Binding`]s
//! - [`bindings`]: the codecs for SOS 1.0.0, SOS 2.0.0, WCS 1.0.0 and WCS 2.0.1
//! - [`registry`]: codec lookup by (service, operation, version) and dispatch
//! - [`capabilities`]: service capabilities with offering-level inheritance
//! - [`swe`]: SWE Common data components and definition-based pruning

pub mod bindings;
pub mod capabilities;
pub mod codec;
pub mod model;
pub mod registry;
pub mod swe;

pub use capabilities::{
    CapabilityLists, OfferingCapabilities, OfferingExtent, OperationMetadata, OperationParameter,
    ServiceCapabilities, ServiceIdentification,
};
pub use codec::{Binding, Codec, Reader, Writer};
pub use model::{Message, MessageEnvelope, Request, RequestCommon, Response};
pub use registry::{BindingConfig, BindingKey, CodecRegistry, ServiceBindings};
pub use swe::{prune, DataComponent, DefinitionSet};
