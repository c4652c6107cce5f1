//! The seam between per-resource requests and the transport.
//!
//! Each resource request describes itself (method, resource, query, payload,
//! optional pagination) and how to decode its response. The transport does
//! the signing, sending and status classification.

use serde::de::DeserializeOwned;

use crate::envelope::{QueryParams, RequestEnvelope};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::pagination::{PaginatedResult, Pagination};

pub trait Endpoint {
    type Response: DeserializeOwned;

    fn method(&self) -> HttpMethod;

    fn resource(&self) -> String;

    /// Endpoint-specific query parameters (pagination excluded).
    fn query(&self) -> QueryParams {
        QueryParams::new()
    }

    /// Serialized request body; empty by default.
    fn payload(&self) -> Result<Vec<u8>, ApiError> {
        Ok(Vec::new())
    }

    /// Present for list endpoints; makes the transport use the paginated path.
    fn pagination(&self) -> Option<&Pagination> {
        None
    }

    fn decode(&self, body: &[u8]) -> Result<Self::Response, ApiError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Fresh envelope for one call of this endpoint.
    fn envelope(&self) -> Result<RequestEnvelope, ApiError> {
        let mut envelope = RequestEnvelope::new(self.method(), &self.resource())
            .with_body(self.payload()?);
        for (key, value) in self.query() {
            envelope.set_query(&key, &value);
        }
        Ok(envelope)
    }
}

/// A paginated endpoint that can be re-issued for following pages.
pub trait ListEndpoint: Endpoint + Sized {
    fn set_pagination(&mut self, pagination: Pagination);

    /// The page header embedded in a decoded response.
    fn page(response: &Self::Response) -> PaginatedResult;

    fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.set_pagination(pagination);
        self
    }
}
