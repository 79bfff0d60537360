//! Canonical, version-independent request and response model.
//!
//! Every binding reads into and writes from these types, so a request read
//! with one version's reader can be written with another version's writer
//! whenever the target version can express it.

pub mod filter;
pub mod requests;
pub mod responses;

use std::collections::BTreeMap;

use serde::Serialize;

pub use filter::{BinaryFilter, SpatialFilter, SpatialOperator, TemporalFilter, TemporalOperator};
pub use requests::{
    DescribeCoverageRequest, DescribeSensorRequest, GetCapabilitiesRequest, GetObservationRequest,
    GetResultRequest, GetResultTemplateRequest, InsertSensorRequest,
};
pub use responses::{
    CoverageDescription, DescribeCoverageResponse, DescribeSensorResponse, GetCapabilitiesResponse,
    GetObservationResponse, GetResultResponse, GetResultTemplateResponse, InsertSensorResponse,
    TextEncoding,
};

/// Service type names.
pub const SOS: &str = "SOS";
pub const WCS: &str = "WCS";

/// Protocol versions with a registered binding.
pub mod versions {
    pub const SOS_100: &str = "1.0.0";
    pub const SOS_200: &str = "2.0.0";
    pub const WCS_100: &str = "1.0.0";
    pub const WCS_201: &str = "2.0.1";
}

/// Operation names as they appear in `request=` and XML root elements.
pub mod operations {
    pub const GET_CAPABILITIES: &str = "GetCapabilities";
    pub const GET_OBSERVATION: &str = "GetObservation";
    pub const GET_RESULT: &str = "GetResult";
    pub const GET_RESULT_TEMPLATE: &str = "GetResultTemplate";
    pub const DESCRIBE_SENSOR: &str = "DescribeSensor";
    pub const INSERT_SENSOR: &str = "InsertSensor";
    pub const DESCRIBE_COVERAGE: &str = "DescribeCoverage";
}

/// Vendor extension parameters, keyed by name (KVP) or definition (XML).
pub type Extensions = BTreeMap<String, String>;

/// Envelope fields shared by every request.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RequestCommon {
    pub service: String,
    pub version: String,
    pub extensions: Extensions,
}

impl RequestCommon {
    pub fn new(service: &str, version: &str) -> Self {
        Self {
            service: service.to_string(),
            version: version.to_string(),
            extensions: Extensions::new(),
        }
    }
}

/// Add `value` to a set-like list unless it is already there.
pub fn push_unique(list: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Drop repeated entries, keeping the first occurrence of each.
pub fn dedup_list(values: Vec<String>) -> Vec<String> {
    let mut unique = Vec::with_capacity(values.len());
    for value in values {
        push_unique(&mut unique, value);
    }
    unique
}

/// A sum type over every message of one direction.
pub trait MessageEnvelope {
    /// Operation name of the wrapped message.
    fn operation(&self) -> &'static str;
}

/// A concrete request or response type that can be carried in its envelope.
pub trait Message: Sized + Send + Sync + 'static {
    type Envelope: MessageEnvelope;

    const OPERATION: &'static str;

    fn wrap(self) -> Self::Envelope;

    fn unwrap_ref(envelope: &Self::Envelope) -> Option<&Self>;
}

/// Any parsed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "request")]
pub enum Request {
    GetCapabilities(GetCapabilitiesRequest),
    GetObservation(GetObservationRequest),
    GetResult(GetResultRequest),
    GetResultTemplate(GetResultTemplateRequest),
    DescribeSensor(DescribeSensorRequest),
    InsertSensor(InsertSensorRequest),
    DescribeCoverage(DescribeCoverageRequest),
}

impl Request {
    pub fn common(&self) -> &RequestCommon {
        match self {
            Request::GetCapabilities(r) => &r.common,
            Request::GetObservation(r) => &r.common,
            Request::GetResult(r) => &r.common,
            Request::GetResultTemplate(r) => &r.common,
            Request::DescribeSensor(r) => &r.common,
            Request::InsertSensor(r) => &r.common,
            Request::DescribeCoverage(r) => &r.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut RequestCommon {
        match self {
            Request::GetCapabilities(r) => &mut r.common,
            Request::GetObservation(r) => &mut r.common,
            Request::GetResult(r) => &mut r.common,
            Request::GetResultTemplate(r) => &mut r.common,
            Request::DescribeSensor(r) => &mut r.common,
            Request::InsertSensor(r) => &mut r.common,
            Request::DescribeCoverage(r) => &mut r.common,
        }
    }

    pub fn service(&self) -> &str {
        &self.common().service
    }

    pub fn version(&self) -> &str {
        &self.common().version
    }
}

impl MessageEnvelope for Request {
    fn operation(&self) -> &'static str {
        match self {
            Request::GetCapabilities(_) => operations::GET_CAPABILITIES,
            Request::GetObservation(_) => operations::GET_OBSERVATION,
            Request::GetResult(_) => operations::GET_RESULT,
            Request::GetResultTemplate(_) => operations::GET_RESULT_TEMPLATE,
            Request::DescribeSensor(_) => operations::DESCRIBE_SENSOR,
            Request::InsertSensor(_) => operations::INSERT_SENSOR,
            Request::DescribeCoverage(_) => operations::DESCRIBE_COVERAGE,
        }
    }
}

/// Any parsed response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "response")]
pub enum Response {
    GetCapabilities(GetCapabilitiesResponse),
    GetObservation(GetObservationResponse),
    GetResult(GetResultResponse),
    GetResultTemplate(GetResultTemplateResponse),
    DescribeSensor(DescribeSensorResponse),
    InsertSensor(InsertSensorResponse),
    DescribeCoverage(DescribeCoverageResponse),
}

impl MessageEnvelope for Response {
    fn operation(&self) -> &'static str {
        match self {
            Response::GetCapabilities(_) => operations::GET_CAPABILITIES,
            Response::GetObservation(_) => operations::GET_OBSERVATION,
            Response::GetResult(_) => operations::GET_RESULT,
            Response::GetResultTemplate(_) => operations::GET_RESULT_TEMPLATE,
            Response::DescribeSensor(_) => operations::DESCRIBE_SENSOR,
            Response::InsertSensor(_) => operations::INSERT_SENSOR,
            Response::DescribeCoverage(_) => operations::DESCRIBE_COVERAGE,
        }
    }
}

macro_rules! impl_message {
    ($ty:ty, $envelope:ident :: $variant:ident, $operation:expr) => {
        impl Message for $ty {
            type Envelope = $envelope;

            const OPERATION: &'static str = $operation;

            fn wrap(self) -> $envelope {
                $envelope::$variant(self)
            }

            fn unwrap_ref(envelope: &$envelope) -> Option<&Self> {
                match envelope {
                    $envelope::$variant(message) => Some(message),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}

impl_message!(GetCapabilitiesRequest, Request::GetCapabilities, operations::GET_CAPABILITIES);
impl_message!(GetObservationRequest, Request::GetObservation, operations::GET_OBSERVATION);
impl_message!(GetResultRequest, Request::GetResult, operations::GET_RESULT);
impl_message!(GetResultTemplateRequest, Request::GetResultTemplate, operations::GET_RESULT_TEMPLATE);
impl_message!(DescribeSensorRequest, Request::DescribeSensor, operations::DESCRIBE_SENSOR);
impl_message!(InsertSensorRequest, Request::InsertSensor, operations::INSERT_SENSOR);
impl_message!(DescribeCoverageRequest, Request::DescribeCoverage, operations::DESCRIBE_COVERAGE);

impl_message!(GetCapabilitiesResponse, Response::GetCapabilities, operations::GET_CAPABILITIES);
impl_message!(GetObservationResponse, Response::GetObservation, operations::GET_OBSERVATION);
impl_message!(GetResultResponse, Response::GetResult, operations::GET_RESULT);
impl_message!(GetResultTemplateResponse, Response::GetResultTemplate, operations::GET_RESULT_TEMPLATE);
impl_message!(DescribeSensorResponse, Response::DescribeSensor, operations::DESCRIBE_SENSOR);
impl_message!(InsertSensorResponse, Response::InsertSensor, operations::INSERT_SENSOR);
impl_message!(DescribeCoverageResponse, Response::DescribeCoverage, operations::DESCRIBE_COVERAGE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_and_unwrap() {
        let request = GetResultRequest::new(versions::SOS_200).wrap();
        assert_eq!(request.operation(), operations::GET_RESULT);
        assert!(GetResultRequest::unwrap_ref(&request).is_some());
        assert!(GetObservationRequest::unwrap_ref(&request).is_none());
    }

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let values = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup_list(values), vec!["b", "a"]);
    }

    #[test]
    fn test_request_serializes_with_operation_tag() {
        let mut request = GetResultRequest::new(versions::SOS_200);
        request.common.extensions.insert("vendorFlag".to_string(), "1".to_string());
        let value = serde_json::to_value(request.wrap()).unwrap();
        assert_eq!(value["request"], "GetResult");
        assert_eq!(value["common"]["service"], "SOS");
        assert_eq!(value["common"]["extensions"]["vendorFlag"], "1");
    }
}
