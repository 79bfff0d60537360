//! Concrete codecs for each supported (service, operation, version).

pub(crate) mod common;
pub(crate) mod filters;
pub(crate) mod ows;
pub mod sos_v1;
pub mod sos_v2;
pub mod wcs;

use crate::codec::Binding;
use crate::model::{
    operations, versions, DescribeCoverageRequest, DescribeCoverageResponse,
    DescribeSensorRequest, DescribeSensorResponse, GetCapabilitiesRequest,
    GetCapabilitiesResponse, GetObservationRequest, GetObservationResponse, GetResultRequest,
    GetResultResponse, GetResultTemplateRequest, GetResultTemplateResponse, InsertSensorRequest,
    InsertSensorResponse, SOS, WCS,
};

/// One row of the built-in binding table.
#[derive(Clone, Copy)]
pub struct BindingEntry {
    pub service: &'static str,
    pub operation: &'static str,
    pub version: &'static str,
    pub build: fn() -> Binding,
}

impl std::fmt::Debug for BindingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.service, self.operation, self.version)
    }
}

macro_rules! entry {
    ($service:expr, $operation:expr, $version:expr, $codec:expr, $request:ty, $response:ty) => {
        BindingEntry {
            service: $service,
            operation: $operation,
            version: $version,
            build: || Binding::new::<_, $request, $response>($codec),
        }
    };
}

/// Every binding this crate ships.
pub const DEFAULT_BINDINGS: &[BindingEntry] = &[
    // SOS 1.0.0
    entry!(SOS, operations::GET_CAPABILITIES, versions::SOS_100, sos_v1::GetCapabilitiesV1,
        GetCapabilitiesRequest, GetCapabilitiesResponse),
    entry!(SOS, operations::GET_OBSERVATION, versions::SOS_100, sos_v1::GetObservationV1,
        GetObservationRequest, GetObservationResponse),
    entry!(SOS, operations::DESCRIBE_SENSOR, versions::SOS_100, sos_v1::DescribeSensorV1,
        DescribeSensorRequest, DescribeSensorResponse),
    // SOS 2.0.0
    entry!(SOS, operations::GET_CAPABILITIES, versions::SOS_200, sos_v2::GetCapabilitiesV2,
        GetCapabilitiesRequest, GetCapabilitiesResponse),
    entry!(SOS, operations::GET_OBSERVATION, versions::SOS_200, sos_v2::GetObservationV2,
        GetObservationRequest, GetObservationResponse),
    entry!(SOS, operations::GET_RESULT, versions::SOS_200, sos_v2::GetResultV2,
        GetResultRequest, GetResultResponse),
    entry!(SOS, operations::GET_RESULT_TEMPLATE, versions::SOS_200, sos_v2::GetResultTemplateV2,
        GetResultTemplateRequest, GetResultTemplateResponse),
    entry!(SOS, operations::DESCRIBE_SENSOR, versions::SOS_200, sos_v2::DescribeSensorV2,
        DescribeSensorRequest, DescribeSensorResponse),
    entry!(SOS, operations::INSERT_SENSOR, versions::SOS_200, sos_v2::InsertSensorV2,
        InsertSensorRequest, InsertSensorResponse),
    // WCS
    entry!(WCS, operations::DESCRIBE_COVERAGE, versions::WCS_100, wcs::DescribeCoverageV1,
        DescribeCoverageRequest, DescribeCoverageResponse),
    entry!(WCS, operations::DESCRIBE_COVERAGE, versions::WCS_201, wcs::DescribeCoverageV2,
        DescribeCoverageRequest, DescribeCoverageResponse),
];
