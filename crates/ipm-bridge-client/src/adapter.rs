// crates/ipm-bridge-client/src/adapter.rs
// ============================================================================
// Module: Source Adapter Invocation
// Description: Fetches weather data from a cataloged source's adapter.
// Purpose: Substitute endpoint tokens, attach credentials, decode the data.
// Dependencies: ipm-bridge-core, serde, serde_json, url
// ============================================================================

//! ## Overview
//! Each weather data source descriptor names its adapter endpoint, often
//! with a `{WEATHER_API_URL}` token standing in for the deployment's
//! weather service base. [`fetch_weather_data`] substitutes the token,
//! encodes the resolved request parameters, and invokes the adapter:
//! sources without authentication get a GET with query parameters,
//! credentialed sources get a form POST carrying the parameters plus a
//! JSON-encoded `credentials` field. The response is decoded into the
//! platform weather exchange format.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ipm_bridge_core::AuthenticationType;
use ipm_bridge_core::DataSourceDescriptor;
use ipm_bridge_core::RequestParameterSet;
use ipm_bridge_core::WeatherData;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::transport::Transport;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Token in adapter endpoints standing in for the weather service base URL.
pub const WEATHER_API_URL_TOKEN: &str = "{WEATHER_API_URL}";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why an adapter invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The source requires credentials the caller did not supply.
    #[error("source `{source_id}` requires credentials")]
    MissingCredentials {
        /// The credentialed source.
        source_id: String,
    },
    /// The source advertises an authentication scheme this crate cannot
    /// satisfy.
    #[error("source `{source_id}` uses unsupported authentication `{scheme}`")]
    UnsupportedAuthentication {
        /// The source in question.
        source_id: String,
        /// The advertised scheme.
        scheme: String,
    },
    /// The substituted adapter endpoint does not parse as a URL.
    #[error("source `{source_id}` endpoint `{url}` is invalid: {detail}")]
    InvalidEndpoint {
        /// The source in question.
        source_id: String,
        /// The substituted endpoint text.
        url: String,
        /// Parse failure detail.
        detail: String,
    },
    /// The adapter answered with something other than weather data.
    #[error("source `{source_id}` returned a malformed weather payload: {detail}")]
    MalformedPayload {
        /// The source in question.
        source_id: String,
        /// Decode failure detail.
        detail: String,
    },
    /// The underlying HTTP exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Caller credentials for sources that require authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account user name at the source.
    pub username: String,
    /// Account password at the source.
    pub password: String,
}

// ============================================================================
// SECTION: Adapter Invocation
// ============================================================================

/// Fetches weather data from a source's adapter endpoint.
///
/// `weather_api_base` replaces the [`WEATHER_API_URL_TOKEN`] in the
/// descriptor's endpoint, so the call targets the same deployment the
/// descriptor came from.
///
/// # Errors
/// Returns [`AdapterError::MissingCredentials`] when the source requires
/// authentication and `credentials` is `None`,
/// [`AdapterError::UnsupportedAuthentication`] for schemes this crate
/// does not implement, [`AdapterError::InvalidEndpoint`] when the
/// substituted endpoint does not parse, and
/// [`AdapterError::MalformedPayload`] when the response is not weather
/// data in the exchange format.
pub fn fetch_weather_data<T: Transport>(
    transport: &T,
    source: &DataSourceDescriptor,
    request: &RequestParameterSet,
    weather_api_base: &Url,
    credentials: Option<&Credentials>,
) -> Result<WeatherData, AdapterError> {
    let substituted =
        source.endpoint.replace(WEATHER_API_URL_TOKEN, weather_api_base.as_str().trim_end_matches('/'));
    let mut url = Url::parse(&substituted).map_err(|err| AdapterError::InvalidEndpoint {
        source_id: source.id.clone(),
        url: substituted.clone(),
        detail: err.to_string(),
    })?;

    let payload = match &source.authentication_type {
        AuthenticationType::None => {
            append_query(&mut url, request);
            transport.get_json(&url)?
        }
        AuthenticationType::Credentials => {
            let credentials = credentials.ok_or_else(|| AdapterError::MissingCredentials {
                source_id: source.id.clone(),
            })?;
            let form = credentialed_form(request, credentials, &source.id)?;
            transport.post_form(&url, &form)?
        }
        AuthenticationType::Other(scheme) => {
            return Err(AdapterError::UnsupportedAuthentication {
                source_id: source.id.clone(),
                scheme: scheme.clone(),
            });
        }
    };

    serde_json::from_value(payload).map_err(|err| AdapterError::MalformedPayload {
        source_id: source.id.clone(),
        detail: err.to_string(),
    })
}

/// Appends resolved request parameters as query pairs.
fn append_query(url: &mut Url, request: &RequestParameterSet) {
    let mut pairs = url.query_pairs_mut();
    for (name, value) in request.as_pairs() {
        pairs.append_pair(&name, &value);
    }
}

/// Builds the form body for a credentialed adapter call: the request
/// parameters plus a JSON-encoded `credentials` field.
fn credentialed_form(
    request: &RequestParameterSet,
    credentials: &Credentials,
    source_id: &str,
) -> Result<Vec<(String, String)>, AdapterError> {
    let encoded =
        serde_json::to_string(credentials).map_err(|err| AdapterError::MalformedPayload {
            source_id: source_id.to_string(),
            detail: format!("credentials encoding failed: {err}"),
        })?;
    let mut form = request.as_pairs();
    form.push(("credentials".to_string(), encoded));
    Ok(form)
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
    use super::*;

    #[test]
    fn credentialed_forms_carry_an_encoded_credentials_field() {
        let credentials =
            Credentials { username: "grower".to_string(), password: "hunter2".to_string() };
        let form =
            credentialed_form(&RequestParameterSet::default(), &credentials, "info.fruitweb")
                .unwrap();
        assert_eq!(form.len(), 1);
        assert_eq!(form[0].0, "credentials");
        assert_eq!(form[0].1, "{\"username\":\"grower\",\"password\":\"hunter2\"}");
    }
}
