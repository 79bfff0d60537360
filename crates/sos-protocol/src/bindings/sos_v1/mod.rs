//! SOS 1.0.0 bindings (OGC 06-009r6).
//!
//! Filters are OGC Filter 1.1 over GML 3.1.1. The XML schemas have no
//! extension point, so XML writers refuse requests carrying vendor
//! extensions; KVP keeps them as plain parameters.

mod describe_sensor;
mod get_capabilities;
mod get_observation;

pub use describe_sensor::{DescribeSensorV1, SENSORML_101, SENSORML_101_FORMAT};
pub use get_capabilities::GetCapabilitiesV1;
pub use get_observation::GetObservationV1;

use ows_common::namespaces::{SOS_10, XLINK};
use ows_common::NamespaceContext;

use super::common::EnvelopeSpec;
use crate::model::SOS;

pub(crate) const ENVELOPE: EnvelopeSpec = EnvelopeSpec::new(SOS);

fn register(ns: &mut NamespaceContext) {
    ns.register("sos", SOS_10);
    ns.register("xlink", XLINK);
}
