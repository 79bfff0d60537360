//! Service capabilities with offering-level inheritance.
//!
//! An offering lists the response formats, observation types, feature of
//! interest types and procedure description formats it supports. An empty
//! list means "same as the service": readers copy the service-level list into
//! it with [`ServiceCapabilities::resolve`], so a parsed offering always
//! carries its effective lists. Writers leave out offering lists equal to the
//! service-level ones.

use ows_common::{Envelope, TimeValue};
use serde::Serialize;

/// The four inheritable capability lists.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CapabilityLists {
    pub response_formats: Vec<String>,
    pub observation_types: Vec<String>,
    pub feature_of_interest_types: Vec<String>,
    /// Procedure description formats.
    pub encodings: Vec<String>,
}

impl CapabilityLists {
    /// Each list that is empty here takes the corresponding list of
    /// `defaults`; non-empty lists are kept as they are.
    pub fn inherit(&self, defaults: &CapabilityLists) -> CapabilityLists {
        fn pick(own: &[String], inherited: &[String]) -> Vec<String> {
            if own.is_empty() {
                inherited.to_vec()
            } else {
                own.to_vec()
            }
        }

        CapabilityLists {
            response_formats: pick(&self.response_formats, &defaults.response_formats),
            observation_types: pick(&self.observation_types, &defaults.observation_types),
            feature_of_interest_types: pick(
                &self.feature_of_interest_types,
                &defaults.feature_of_interest_types,
            ),
            encodings: pick(&self.encodings, &defaults.encodings),
        }
    }

    /// In-place form of [`CapabilityLists::inherit`].
    pub fn inherit_in_place(&mut self, defaults: &CapabilityLists) {
        fn fill(own: &mut Vec<String>, inherited: &[String]) {
            if own.is_empty() {
                own.extend_from_slice(inherited);
            }
        }

        fill(&mut self.response_formats, &defaults.response_formats);
        fill(&mut self.observation_types, &defaults.observation_types);
        fill(
            &mut self.feature_of_interest_types,
            &defaults.feature_of_interest_types,
        );
        fill(&mut self.encodings, &defaults.encodings);
    }

    pub fn is_empty(&self) -> bool {
        self.response_formats.is_empty()
            && self.observation_types.is_empty()
            && self.feature_of_interest_types.is_empty()
            && self.encodings.is_empty()
    }
}

/// Spatial and temporal extent of an offering.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OfferingExtent {
    pub envelope: Option<Envelope>,
    pub phenomenon_time: Option<TimeValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OfferingCapabilities {
    pub identifier: String,
    pub name: Option<String>,
    pub procedures: Vec<String>,
    pub observable_properties: Vec<String>,
    pub extent: OfferingExtent,
    /// Lists of this offering; empty lists inherit until resolved.
    pub lists: CapabilityLists,
    /// Disabled offerings are kept in the model but never written.
    pub disabled: bool,
}

impl OfferingCapabilities {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Default::default()
        }
    }

    /// Fill every empty list from `defaults`. Idempotent.
    pub fn resolve(&mut self, defaults: &CapabilityLists) {
        self.lists.inherit_in_place(defaults);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ServiceIdentification {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub service_type: String,
    pub service_type_versions: Vec<String>,
    pub profiles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OperationParameter {
    pub name: String,
    pub allowed_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OperationMetadata {
    pub name: String,
    pub get_url: Option<String>,
    pub post_url: Option<String>,
    pub parameters: Vec<OperationParameter>,
}

impl OperationMetadata {
    pub fn parameter(&self, name: &str) -> Option<&OperationParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ServiceCapabilities {
    pub version: String,
    pub update_sequence: Option<String>,
    pub identification: Option<ServiceIdentification>,
    pub provider_name: Option<String>,
    pub operations: Vec<OperationMetadata>,
    /// Service-level lists offerings inherit from.
    pub defaults: CapabilityLists,
    pub offerings: Vec<OfferingCapabilities>,
}

impl ServiceCapabilities {
    pub fn operation(&self, name: &str) -> Option<&OperationMetadata> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn offering(&self, identifier: &str) -> Option<&OfferingCapabilities> {
        self.offerings.iter().find(|o| o.identifier == identifier)
    }

    /// Materialize inherited lists into every offering.
    pub fn resolve(&mut self) {
        let defaults = &self.defaults;
        for offering in &mut self.offerings {
            offering.resolve(defaults);
        }
    }

    /// Enabled offerings paired with their effective lists.
    pub fn resolve_offerings(&self) -> Vec<(&OfferingCapabilities, CapabilityLists)> {
        self.offerings
            .iter()
            .filter(|offering| {
                if offering.disabled {
                    tracing::warn!(offering = %offering.identifier, "Skipping disabled offering");
                }
                !offering.disabled
            })
            .map(|offering| (offering, offering.lists.inherit(&self.defaults)))
            .collect()
    }
}
