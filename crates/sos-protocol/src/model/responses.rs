//! Response types.

use ows_common::{Envelope, XmlElement};
use serde::Serialize;

use crate::capabilities::ServiceCapabilities;
use crate::swe::DataComponent;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetCapabilitiesResponse {
    pub capabilities: ServiceCapabilities,
}

/// Observations are opaque O&M documents produced elsewhere.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GetObservationResponse {
    pub observations: Vec<XmlElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GetResultResponse {
    /// Encoded values, laid out by the result template's text encoding.
    pub result_values: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetResultTemplateResponse {
    pub result_structure: DataComponent,
    pub result_encoding: TextEncoding,
}

/// `swe:TextEncoding` separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEncoding {
    pub token_separator: String,
    pub block_separator: String,
    pub decimal_separator: Option<String>,
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self {
            token_separator: ",".to_string(),
            block_separator: "#".to_string(),
            decimal_separator: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DescribeSensorResponse {
    pub procedure_description_format: String,
    /// One opaque sensor description per valid time.
    pub descriptions: Vec<XmlElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InsertSensorResponse {
    pub assigned_procedure: String,
    pub assigned_offering: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DescribeCoverageResponse {
    pub descriptions: Vec<CoverageDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageDescription {
    pub id: String,
    pub envelope: Option<Envelope>,
    /// Range type as a SWE record; only WCS 2.0 can carry it.
    pub range_type: Option<DataComponent>,
}

impl CoverageDescription {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            envelope: None,
            range_type: None,
        }
    }
}
