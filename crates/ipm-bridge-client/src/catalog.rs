// crates/ipm-bridge-client/src/catalog.rs
// ============================================================================
// Module: Platform Catalog
// Description: Typed access to the platform's source and model catalogs.
// Purpose: Fetch descriptors and normalize their encoded payloads.
// Dependencies: ipm-bridge-core, serde, serde_json, url
// ============================================================================

//! ## Overview
//! The platform publishes two catalogs: weather data sources under the
//! weather service and decision support systems (each carrying its models)
//! under the DSS service. This module fetches both over a [`Transport`]
//! and lifts them into the typed descriptors the rest of the crate works
//! with. The platform ships model input schemas as JSON-encoded strings
//! inside the catalog document; [`PlatformCatalog::model`] decodes them so
//! downstream code only ever sees a real schema object. Lookups fail
//! closed with the known identifiers embedded in the error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ipm_bridge_core::AccessType;
use ipm_bridge_core::AuthenticationType;
use ipm_bridge_core::DataSourceDescriptor;
use ipm_bridge_core::ModelDescriptor;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::transport::Transport;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Production platform base URL.
pub const DEFAULT_BASE_URL: &str = "https://platform.ipmdecisions.net";

/// Weather service path listing cataloged data sources.
const WEATHER_SOURCE_PATH: &str = "api/wx/rest/weatherdatasource";

/// Weather service path listing known parameter codes.
const WEATHER_PARAMETER_PATH: &str = "api/wx/rest/parameter";

/// Weather service path listing quality control codes.
const WEATHER_QC_PATH: &str = "api/wx/rest/qc";

/// Weather service path publishing the weather data exchange schema.
const WEATHER_SCHEMA_PATH: &str = "api/wx/rest/schema/weatherdata";

/// Weather service path validating documents against the exchange schema.
const WEATHER_VALIDATE_PATH: &str = "api/wx/rest/schema/weatherdata/validate";

/// DSS service path listing decision support systems and their models.
const DSS_PATH: &str = "api/dss/rest/dss";

/// DSS service path listing crop codes covered by cataloged systems.
const DSS_CROP_PATH: &str = "api/dss/rest/crop";

/// DSS service path listing pest codes covered by cataloged systems.
const DSS_PEST_PATH: &str = "api/dss/rest/pest";

/// DSS service path publishing the field observation schema.
const FIELD_OBSERVATION_SCHEMA_PATH: &str = "api/dss/rest/schema/fieldobservation";

/// DSS service path publishing the model output schema.
const MODEL_OUTPUT_SCHEMA_PATH: &str = "api/dss/rest/schema/modeloutput";

/// DSS service path validating documents against the model output schema.
const MODEL_OUTPUT_VALIDATE_PATH: &str = "api/dss/rest/schema/modeloutput/validate";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why a catalog operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The configured base URL does not parse.
    #[error("invalid platform base url `{url}`: {detail}")]
    InvalidBaseUrl {
        /// The offending URL text.
        url: String,
        /// Parse failure detail.
        detail: String,
    },
    /// A catalog document did not match the expected shape.
    #[error("malformed catalog payload from `{path}`: {detail}")]
    MalformedPayload {
        /// Catalog path the payload came from.
        path: String,
        /// Decode failure detail.
        detail: String,
    },
    /// No cataloged weather data source carries the requested id.
    #[error("unknown weather data source `{source_id}`; known: [{}]", known.join(", "))]
    UnknownDataSource {
        /// The requested source id.
        source_id: String,
        /// All source ids the catalog currently lists.
        known: Vec<String>,
    },
    /// No cataloged decision support system carries the requested id.
    #[error("unknown decision support system `{dss_id}`; known: [{}]", known.join(", "))]
    UnknownDss {
        /// The requested DSS id.
        dss_id: String,
        /// All DSS ids the catalog currently lists.
        known: Vec<String>,
    },
    /// The DSS exists but lists no model with the requested id.
    #[error("unknown model `{model_id}` in dss `{dss_id}`; known: [{}]", known.join(", "))]
    UnknownModel {
        /// The DSS that was searched.
        dss_id: String,
        /// The requested model id.
        model_id: String,
        /// All model ids the DSS currently lists.
        known: Vec<String>,
    },
    /// The underlying HTTP exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// ============================================================================
// SECTION: Source Filter
// ============================================================================

/// Optional criteria for narrowing a weather source listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    /// Keep only sources with this access type.
    pub access_type: Option<AccessType>,
    /// Keep only sources with this authentication type.
    pub authentication_type: Option<AuthenticationType>,
}

impl SourceFilter {
    /// Returns true when the source satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, source: &DataSourceDescriptor) -> bool {
        let access_ok =
            self.access_type.as_ref().is_none_or(|wanted| *wanted == source.access_type);
        let auth_ok = self
            .authentication_type
            .as_ref()
            .is_none_or(|wanted| *wanted == source.authentication_type);
        access_ok && auth_ok
    }
}

// ============================================================================
// SECTION: DSS Descriptor
// ============================================================================

/// Platform metadata describing one decision support system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DssDescriptor {
    /// DSS identifier, e.g. `no.nibio.vips`.
    pub id: String,
    /// Human-readable DSS name.
    #[serde(default)]
    pub name: Option<String>,
    /// Models the DSS publishes.
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

// ============================================================================
// SECTION: Catalog Client
// ============================================================================

/// Typed client for the platform's weather and DSS catalogs.
#[derive(Debug, Clone)]
pub struct PlatformCatalog<T> {
    /// Transport used for catalog fetches.
    transport: T,
    /// Platform base URL, guaranteed to end with a slash.
    base: Url,
}

impl<T: Transport> PlatformCatalog<T> {
    /// Creates a catalog client against the production platform.
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidBaseUrl`] only if the built-in
    /// default stops parsing, which indicates a build defect.
    pub fn new(transport: T) -> Result<Self, CatalogError> {
        Self::with_base_url(transport, DEFAULT_BASE_URL)
    }

    /// Creates a catalog client against an alternate platform deployment.
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidBaseUrl`] when `base_url` does not
    /// parse as an absolute URL.
    pub fn with_base_url(transport: T, base_url: &str) -> Result<Self, CatalogError> {
        let normalized =
            if base_url.ends_with('/') { base_url.to_string() } else { format!("{base_url}/") };
        let base = Url::parse(&normalized).map_err(|err| CatalogError::InvalidBaseUrl {
            url: base_url.to_string(),
            detail: err.to_string(),
        })?;
        Ok(Self { transport, base })
    }

    /// Returns the absolute URL of the weather service, for adapter
    /// endpoint token substitution.
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidBaseUrl`] when the join fails.
    pub fn weather_api_base(&self) -> Result<Url, CatalogError> {
        self.endpoint("api/wx")
    }

    /// Fetches the platform's weather parameter catalog unmodified.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on transport failure.
    pub fn weather_parameters(&self) -> Result<Value, CatalogError> {
        self.fetch(WEATHER_PARAMETER_PATH)
    }

    /// Fetches the platform's quality control code list unmodified.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on transport failure.
    pub fn qc_codes(&self) -> Result<Value, CatalogError> {
        self.fetch(WEATHER_QC_PATH)
    }

    /// Fetches the weather data exchange schema unmodified.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on transport failure.
    pub fn weather_data_schema(&self) -> Result<Value, CatalogError> {
        self.fetch(WEATHER_SCHEMA_PATH)
    }

    /// Validates a document against the platform's weather data schema.
    ///
    /// # Errors
    /// Returns [`CatalogError::MalformedPayload`] when the platform's
    /// answer carries no `isValid` verdict.
    pub fn validate_weather_data(&self, document: &Value) -> Result<bool, CatalogError> {
        let url = self.endpoint(WEATHER_VALIDATE_PATH)?;
        let payload = self.transport.post_json(&url, document)?;
        verdict(&payload, WEATHER_VALIDATE_PATH)
    }

    /// Fetches the crop code list unmodified.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on transport failure.
    pub fn crops(&self) -> Result<Value, CatalogError> {
        self.fetch(DSS_CROP_PATH)
    }

    /// Fetches the pest code list unmodified.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on transport failure.
    pub fn pests(&self) -> Result<Value, CatalogError> {
        self.fetch(DSS_PEST_PATH)
    }

    /// Fetches the field observation schema unmodified.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on transport failure.
    pub fn field_observation_schema(&self) -> Result<Value, CatalogError> {
        self.fetch(FIELD_OBSERVATION_SCHEMA_PATH)
    }

    /// Fetches the model output schema unmodified.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on transport failure.
    pub fn model_output_schema(&self) -> Result<Value, CatalogError> {
        self.fetch(MODEL_OUTPUT_SCHEMA_PATH)
    }

    /// Validates a document against the platform's model output schema.
    ///
    /// # Errors
    /// Returns [`CatalogError::MalformedPayload`] when the platform's
    /// answer carries no `isValid` verdict.
    pub fn validate_model_output(&self, document: &Value) -> Result<bool, CatalogError> {
        let url = self.endpoint(MODEL_OUTPUT_VALIDATE_PATH)?;
        let payload = self.transport.post_json(&url, document)?;
        verdict(&payload, MODEL_OUTPUT_VALIDATE_PATH)
    }

    /// Fetches all cataloged weather data sources.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on transport failure or a payload that is
    /// not a list of source descriptors.
    pub fn weather_data_sources(&self) -> Result<Vec<DataSourceDescriptor>, CatalogError> {
        let url = self.endpoint(WEATHER_SOURCE_PATH)?;
        let payload = self.transport.get_json(&url)?;
        decode(payload, WEATHER_SOURCE_PATH)
    }

    /// Fetches the weather data sources matching a filter.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on transport failure or a payload that is
    /// not a list of source descriptors.
    pub fn weather_data_sources_matching(
        &self,
        filter: &SourceFilter,
    ) -> Result<Vec<DataSourceDescriptor>, CatalogError> {
        let sources = self.weather_data_sources()?;
        Ok(sources.into_iter().filter(|source| filter.matches(source)).collect())
    }

    /// Fetches one weather data source by id.
    ///
    /// # Errors
    /// Returns [`CatalogError::UnknownDataSource`] when no cataloged
    /// source carries `source_id`, embedding the ids that do exist.
    pub fn weather_data_source(
        &self,
        source_id: &str,
    ) -> Result<DataSourceDescriptor, CatalogError> {
        let sources = self.weather_data_sources()?;
        let known: Vec<String> = sources.iter().map(|source| source.id.clone()).collect();
        sources.into_iter().find(|source| source.id == source_id).ok_or_else(|| {
            CatalogError::UnknownDataSource { source_id: source_id.to_string(), known }
        })
    }

    /// Fetches all cataloged decision support systems.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on transport failure or a payload that is
    /// not a list of DSS descriptors.
    pub fn dss_catalog(&self) -> Result<Vec<DssDescriptor>, CatalogError> {
        let url = self.endpoint(DSS_PATH)?;
        let payload = self.transport.get_json(&url)?;
        decode(payload, DSS_PATH)
    }

    /// Fetches one decision support system by id.
    ///
    /// # Errors
    /// Returns [`CatalogError::UnknownDss`] when no cataloged system
    /// carries `dss_id`, embedding the ids that do exist.
    pub fn dss(&self, dss_id: &str) -> Result<DssDescriptor, CatalogError> {
        let catalog = self.dss_catalog()?;
        let known: Vec<String> = catalog.iter().map(|dss| dss.id.clone()).collect();
        catalog
            .into_iter()
            .find(|dss| dss.id == dss_id)
            .ok_or_else(|| CatalogError::UnknownDss { dss_id: dss_id.to_string(), known })
    }

    /// Fetches one model's input schema, decoded.
    ///
    /// # Errors
    /// Propagates the same errors as [`PlatformCatalog::model`].
    pub fn input_schema(&self, dss_id: &str, model_id: &str) -> Result<Value, CatalogError> {
        Ok(self.model(dss_id, model_id)?.execution.input_schema)
    }

    /// Fetches one model by DSS and model id, decoding its input schema.
    ///
    /// # Errors
    /// Returns [`CatalogError::UnknownDss`] or
    /// [`CatalogError::UnknownModel`] for missing identifiers, and
    /// [`CatalogError::MalformedPayload`] when the model's input schema
    /// string does not decode as JSON.
    pub fn model(&self, dss_id: &str, model_id: &str) -> Result<ModelDescriptor, CatalogError> {
        let catalog = self.dss_catalog()?;
        let known_dss: Vec<String> = catalog.iter().map(|dss| dss.id.clone()).collect();
        let dss = catalog.into_iter().find(|dss| dss.id == dss_id).ok_or_else(|| {
            CatalogError::UnknownDss { dss_id: dss_id.to_string(), known: known_dss }
        })?;
        let known_models: Vec<String> = dss.models.iter().map(|model| model.id.clone()).collect();
        let mut model =
            dss.models.into_iter().find(|model| model.id == model_id).ok_or_else(|| {
                CatalogError::UnknownModel {
                    dss_id: dss_id.to_string(),
                    model_id: model_id.to_string(),
                    known: known_models,
                }
            })?;
        model.execution.input_schema = decode_input_schema(model.execution.input_schema)?;
        Ok(model)
    }

    /// Fetches a catalog document unmodified.
    fn fetch(&self, path: &str) -> Result<Value, CatalogError> {
        let url = self.endpoint(path)?;
        Ok(self.transport.get_json(&url)?)
    }

    /// Joins a catalog path onto the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base.join(path).map_err(|err| CatalogError::InvalidBaseUrl {
            url: format!("{}{path}", self.base),
            detail: err.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a catalog payload into its typed form.
fn decode<D: for<'de> Deserialize<'de>>(payload: Value, path: &str) -> Result<D, CatalogError> {
    serde_json::from_value(payload).map_err(|err| CatalogError::MalformedPayload {
        path: path.to_string(),
        detail: err.to_string(),
    })
}

/// Extracts the `isValid` verdict from a validation response.
fn verdict(payload: &Value, path: &str) -> Result<bool, CatalogError> {
    payload.get("isValid").and_then(Value::as_bool).ok_or_else(|| {
        CatalogError::MalformedPayload {
            path: path.to_string(),
            detail: "validation response carries no `isValid` flag".to_string(),
        }
    })
}

/// Decodes a model input schema that may arrive JSON-encoded as a string.
fn decode_input_schema(schema: Value) -> Result<Value, CatalogError> {
    match schema {
        Value::String(encoded) => {
            serde_json::from_str(&encoded).map_err(|err| CatalogError::MalformedPayload {
                path: DSS_PATH.to_string(),
                detail: format!("input schema string is not JSON: {err}"),
            })
        }
        decoded => Ok(decoded),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn input_schemas_shipped_as_strings_are_decoded() {
        let schema = decode_input_schema(json!("{\"type\":\"object\"}")).unwrap();
        assert_eq!(schema, json!({"type": "object"}));
    }

    #[test]
    fn input_schemas_shipped_decoded_pass_through() {
        let schema = decode_input_schema(json!({"type": "object"})).unwrap();
        assert_eq!(schema, json!({"type": "object"}));
    }

    #[test]
    fn undecodable_input_schema_strings_fail_closed() {
        let error = decode_input_schema(json!("not json")).unwrap_err();
        assert!(matches!(error, CatalogError::MalformedPayload { .. }));
    }

    #[test]
    fn validation_verdicts_require_an_is_valid_flag() {
        assert!(verdict(&json!({"isValid": true}), "p").unwrap());
        assert!(!verdict(&json!({"isValid": false}), "p").unwrap());
        assert!(verdict(&json!({"status": "ok"}), "p").is_err());
    }

    #[test]
    fn source_filters_apply_each_set_criterion() {
        let source = DataSourceDescriptor {
            id: "no.nibio.lmt".to_string(),
            name: None,
            access_type: AccessType::Stations,
            authentication_type: AuthenticationType::None,
            endpoint: "{WEATHER_API_URL}/rest/weatheradapter/lmt/".to_string(),
            temporal: None,
            parameters: None,
            spatial: None,
        };
        assert!(SourceFilter::default().matches(&source));
        let stations =
            SourceFilter { access_type: Some(AccessType::Stations), ..SourceFilter::default() };
        assert!(stations.matches(&source));
        let credentialed = SourceFilter {
            authentication_type: Some(AuthenticationType::Credentials),
            ..SourceFilter::default()
        };
        assert!(!credentialed.matches(&source));
    }
}
