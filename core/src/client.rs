//! Stateless HTTP request builder and response parser for the address API.
//!
//! # Design
//! `AddressClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Link collections travel as `text/uri-list` through
//! `UriListCodec`; address payloads travel as JSON.

use url::Url;
use uuid::Uuid;

use crate::carrier::{Carrier, CarrierKind};
use crate::codec::UriListCodec;
use crate::error::ApiError;
use crate::http::{
    Headers, HttpMethod, HttpRequest, HttpResponse, ACCEPT, CONTENT_TYPE, URILIST_REL_HEADER,
    URI_LIST,
};
use crate::link::Links;
use crate::types::{Address, CreateAddress};

/// Whether a uri-list association replaces or extends the current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    Replace,
    Append,
}

/// Synchronous, stateless client for the address API.
#[derive(Debug, Clone)]
pub struct AddressClient {
    base_url: String,
    codec: UriListCodec,
}

impl AddressClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            codec: UriListCodec::new(),
        }
    }

    /// Absolute URI of an address resource, as the server links it.
    pub fn address_href(&self, id: Uuid) -> Result<Url, ApiError> {
        Url::parse(&format!("{}/addresses/{id}", self.base_url))
            .map_err(|e| ApiError::SerializationError(e.to_string()))
    }

    pub fn build_list_addresses(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/addresses", self.base_url),
            headers: [(ACCEPT, URI_LIST)].into_iter().collect(),
            body: None,
        }
    }

    pub fn build_create_address(&self, input: &CreateAddress) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/addresses", self.base_url),
            headers: [(CONTENT_TYPE, "application/json")].into_iter().collect(),
            body: Some(body),
        })
    }

    pub fn build_get_person_addresses(&self, person: Uuid) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/people/{person}/addresses", self.base_url),
            headers: [(ACCEPT, URI_LIST)].into_iter().collect(),
            body: None,
        }
    }

    /// Associate the addresses named by `links` with `person`. When `rel` is
    /// given it is sent as the relation override header.
    pub fn build_link_addresses(
        &self,
        person: Uuid,
        links: &Links,
        mode: LinkMode,
        rel: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = self.codec.write_to_string(&Carrier::Links(links.clone()))?;
        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE, URI_LIST);
        if let Some(rel) = rel {
            headers.insert(URILIST_REL_HEADER, rel);
        }
        let method = match mode {
            LinkMode::Replace => HttpMethod::Put,
            LinkMode::Append => HttpMethod::Post,
        };
        Ok(HttpRequest {
            method,
            path: format!("{}/people/{person}/addresses", self.base_url),
            headers,
            body: Some(body),
        })
    }

    pub fn parse_list_addresses(&self, response: HttpResponse) -> Result<Links, ApiError> {
        check_status(&response, 200)?;
        self.parse_uri_list(&response)
    }

    pub fn parse_create_address(&self, response: HttpResponse) -> Result<Address, ApiError> {
        check_status(&response, 201)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_person_addresses(&self, response: HttpResponse) -> Result<Links, ApiError> {
        check_status(&response, 200)?;
        self.parse_uri_list(&response)
    }

    pub fn parse_link_addresses(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)?;
        Ok(())
    }

    fn parse_uri_list(&self, response: &HttpResponse) -> Result<Links, ApiError> {
        let content_type = response.headers.first(CONTENT_TYPE);
        if !self.codec.can_read(CarrierKind::Links, content_type) {
            return Err(ApiError::DeserializationError(format!(
                "expected {URI_LIST}, got {}",
                content_type.unwrap_or_default()
            )));
        }
        let carrier = self
            .codec
            .read_str(&response.headers, None, &response.body, CarrierKind::Links)?;
        Ok(carrier.into_links())
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
