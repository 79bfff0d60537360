use ows_common::namespaces::SOS_10;
use ows_common::{CodecError, CodecResult, KvpParams, NamespaceContext, ReadResult, ValidationReport, XmlElement};

use super::{register, ENVELOPE};
use crate::bindings::common::{self, refuse_extensions, required_param, required_text, unrepresentable};
use crate::codec::{Codec, Reader, Writer};
use crate::model::{operations, versions, DescribeSensorRequest, DescribeSensorResponse};

const PROCEDURE: &str = "procedure";
const OUTPUT_FORMAT: &str = "outputFormat";

const KNOWN: &[&str] = &[PROCEDURE, OUTPUT_FORMAT];

/// SensorML 1.0.1, the description format SOS 1.0 services return.
pub const SENSORML_101: &str = "http://www.opengis.net/sensorML/1.0.1";
pub const SENSORML_101_FORMAT: &str = "text/xml;subtype=\"sensorML/1.0.1\"";

/// SOS 1.0 DescribeSensor. The response is the sensor description itself,
/// without a wrapper element.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescribeSensorV1;

impl Codec for DescribeSensorV1 {
    fn operation(&self) -> &'static str {
        operations::DESCRIBE_SENSOR
    }

    fn version(&self) -> &'static str {
        versions::SOS_100
    }
}

impl Reader<DescribeSensorRequest> for DescribeSensorV1 {
    fn read_kvp(&self, params: &KvpParams) -> ReadResult<DescribeSensorRequest> {
        let mut report = ValidationReport::new();
        let request = DescribeSensorRequest {
            common: common::read_kvp_common(self, ENVELOPE, params, KNOWN, &mut report),
            procedure: required_param(params, PROCEDURE, &mut report),
            procedure_description_format: required_param(params, OUTPUT_FORMAT, &mut report),
            valid_time: None,
        };
        report.process()?;
        Ok(request)
    }

    fn read_xml(&self, element: &XmlElement) -> ReadResult<DescribeSensorRequest> {
        let mut report = ValidationReport::new();
        let common = common::read_xml_common(self, ENVELOPE, SOS_10, element, &mut report)?;
        let procedure = required_text(element, "sos:procedure", PROCEDURE, &mut report);
        let format = element
            .attribute(OUTPUT_FORMAT)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        report.require(format.is_some(), OUTPUT_FORMAT);
        report.process()?;

        Ok(DescribeSensorRequest {
            common,
            procedure,
            procedure_description_format: format,
            valid_time: None,
        })
    }
}

impl Writer<DescribeSensorRequest> for DescribeSensorV1 {
    fn write_kvp(&self, request: &DescribeSensorRequest) -> CodecResult<KvpParams> {
        if request.valid_time.is_some() {
            return Err(unrepresentable(self, "validTime", "SOS 1.0 has no validTime"));
        }
        let mut params = common::write_kvp_common(self, ENVELOPE, &request.common);
        params.insert_opt(PROCEDURE, request.procedure.as_deref());
        params.insert_opt(OUTPUT_FORMAT, request.procedure_description_format.as_deref());
        common::write_kvp_extensions(ENVELOPE, &mut params, &request.common.extensions, KNOWN)?;
        Ok(params)
    }

    fn write_xml(
        &self,
        ns: &mut NamespaceContext,
        request: &DescribeSensorRequest,
    ) -> CodecResult<XmlElement> {
        if request.valid_time.is_some() {
            return Err(unrepresentable(self, "validTime", "SOS 1.0 has no validTime"));
        }
        refuse_extensions(self, &request.common.extensions)?;

        register(ns);
        let mut root = common::write_xml_common(self, ENVELOPE, ns, "sos", SOS_10, &request.common);
        if let Some(format) = &request.procedure_description_format {
            root.set_attribute(OUTPUT_FORMAT, format.as_str());
        }
        if let Some(procedure) = &request.procedure {
            root.add_text("sos:procedure", procedure.as_str());
        }
        Ok(root)
    }
}

impl Reader<DescribeSensorResponse> for DescribeSensorV1 {
    /// The format is inferred from the document's namespace.
    fn read_xml(&self, element: &XmlElement) -> ReadResult<DescribeSensorResponse> {
        let format = match element.namespace() {
            Some(SENSORML_101) => SENSORML_101_FORMAT.to_string(),
            Some(namespace) => namespace.to_string(),
            None => {
                return Err(CodecError::Malformed(format!(
                    "Sensor description '{}' has no namespace",
                    element.name()
                ))
                .into())
            }
        };
        Ok(DescribeSensorResponse {
            procedure_description_format: format,
            descriptions: vec![element.clone()],
        })
    }
}

impl Writer<DescribeSensorResponse> for DescribeSensorV1 {
    fn write_xml(
        &self,
        _ns: &mut NamespaceContext,
        response: &DescribeSensorResponse,
    ) -> CodecResult<XmlElement> {
        match response.descriptions.as_slice() {
            [description] => Ok(description.clone()),
            descriptions => Err(unrepresentable(
                self,
                "descriptions",
                format!(
                    "SOS 1.0 returns exactly one description, got {}",
                    descriptions.len()
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ows_common::TimeValue;

    const SENSOR_ML: &str = r#"<sml:SensorML xmlns:sml="http://www.opengis.net/sensorML/1.0.1" version="1.0.1">
        <sml:member>
            <sml:System>
                <sml:identification/>
            </sml:System>
        </sml:member>
    </sml:SensorML>"#;

    #[test]
    fn test_kvp_uses_output_format() {
        let params = KvpParams::parse(
            "service=SOS&version=1.0.0&request=DescribeSensor\
             &procedure=urn:ogc:object:feature:Sensor:IFGI:ifgi-sensor-1\
             &outputFormat=text/xml;subtype=\"sensorML/1.0.1\"",
        )
        .unwrap();
        let request: DescribeSensorRequest = DescribeSensorV1.read_kvp(&params).unwrap();
        assert_eq!(
            request.procedure_description_format.as_deref(),
            Some(SENSORML_101_FORMAT)
        );
        assert_eq!(DescribeSensorV1.write_kvp(&request).unwrap(), params);
    }

    #[test]
    fn test_xml_roundtrip() {
        let mut request = DescribeSensorRequest::new(versions::SOS_100);
        request.procedure = Some("urn:ogc:object:feature:Sensor:IFGI:ifgi-sensor-1".to_string());
        request.procedure_description_format = Some(SENSORML_101_FORMAT.to_string());

        let mut ns = NamespaceContext::new();
        let xml = DescribeSensorV1
            .write_xml(&mut ns, &request)
            .unwrap()
            .to_xml_string(&ns)
            .unwrap();
        let reread: DescribeSensorRequest =
            DescribeSensorV1.read_xml(&XmlElement::parse(&xml).unwrap()).unwrap();
        assert_eq!(reread, request);
    }

    #[test]
    fn test_valid_time_is_unrepresentable() {
        let mut request = DescribeSensorRequest::new(versions::SOS_100);
        request.procedure = Some("p".to_string());
        request.valid_time = Some(TimeValue::parse("2012-11-19T13:00:00Z").unwrap());
        assert!(matches!(
            DescribeSensorV1.write_kvp(&request),
            Err(CodecError::Unrepresentable { field, .. }) if field == "validTime"
        ));
    }

    #[test]
    fn test_response_is_the_description() {
        let element = XmlElement::parse(SENSOR_ML).unwrap();
        let response: DescribeSensorResponse = DescribeSensorV1.read_xml(&element).unwrap();
        assert_eq!(response.procedure_description_format, SENSORML_101_FORMAT);

        let mut ns = NamespaceContext::new();
        let written = DescribeSensorV1.write_xml(&mut ns, &response).unwrap();
        assert_eq!(written, element);

        let mut two = response.clone();
        two.descriptions.push(element);
        assert!(DescribeSensorV1.write_xml(&mut ns, &two).is_err());
    }
}
