//! Request types.

use ows_common::{TimeValue, XmlElement};
use serde::Serialize;

use super::filter::{SpatialFilter, TemporalFilter};
use super::{RequestCommon, SOS, WCS};

/// GetCapabilities. The envelope version is the version the request was
/// dispatched to; clients negotiate through `accept_versions`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GetCapabilitiesRequest {
    pub common: RequestCommon,
    pub sections: Vec<String>,
    pub accept_versions: Vec<String>,
    pub accept_formats: Vec<String>,
    pub update_sequence: Option<String>,
}

impl GetCapabilitiesRequest {
    pub fn new(version: &str) -> Self {
        Self {
            common: RequestCommon::new(SOS, version),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GetObservationRequest {
    pub common: RequestCommon,
    pub offerings: Vec<String>,
    pub procedures: Vec<String>,
    pub observed_properties: Vec<String>,
    pub features_of_interest: Vec<String>,
    pub spatial_filter: Option<SpatialFilter>,
    pub temporal_filter: Option<TemporalFilter>,
    pub response_format: Option<String>,
    /// SOS 1.0 only.
    pub result_model: Option<String>,
    /// SOS 1.0 only.
    pub response_mode: Option<String>,
    /// SOS 1.0 only.
    pub srs_name: Option<String>,
}

impl GetObservationRequest {
    pub fn new(version: &str) -> Self {
        Self {
            common: RequestCommon::new(SOS, version),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GetResultRequest {
    pub common: RequestCommon,
    pub offering: Option<String>,
    pub observed_property: Option<String>,
    pub features_of_interest: Vec<String>,
    pub spatial_filter: Option<SpatialFilter>,
    pub temporal_filter: Option<TemporalFilter>,
}

impl GetResultRequest {
    pub fn new(version: &str) -> Self {
        Self {
            common: RequestCommon::new(SOS, version),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GetResultTemplateRequest {
    pub common: RequestCommon,
    pub offering: Option<String>,
    pub observed_property: Option<String>,
}

impl GetResultTemplateRequest {
    pub fn new(version: &str) -> Self {
        Self {
            common: RequestCommon::new(SOS, version),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DescribeSensorRequest {
    pub common: RequestCommon,
    pub procedure: Option<String>,
    /// `outputFormat` in SOS 1.0.
    pub procedure_description_format: Option<String>,
    /// SOS 2.0 only.
    pub valid_time: Option<TimeValue>,
}

impl DescribeSensorRequest {
    pub fn new(version: &str) -> Self {
        Self {
            common: RequestCommon::new(SOS, version),
            ..Default::default()
        }
    }
}

/// InsertSensor. The procedure description is carried as an opaque document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InsertSensorRequest {
    pub common: RequestCommon,
    pub procedure_description_format: Option<String>,
    pub procedure_description: Option<XmlElement>,
    pub observable_properties: Vec<String>,
    pub observation_types: Vec<String>,
    pub feature_of_interest_types: Vec<String>,
}

impl InsertSensorRequest {
    pub fn new(version: &str) -> Self {
        Self {
            common: RequestCommon::new(SOS, version),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DescribeCoverageRequest {
    pub common: RequestCommon,
    pub coverage_ids: Vec<String>,
}

impl DescribeCoverageRequest {
    pub fn new(version: &str) -> Self {
        Self {
            common: RequestCommon::new(WCS, version),
            ..Default::default()
        }
    }
}
