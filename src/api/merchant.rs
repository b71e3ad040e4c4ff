use actix_web::{dev::Payload, http::header::HeaderMap, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use super::error::ApiError;

/// Header carrying the authenticated merchant, set by the gateway.
pub const MERCHANT_ID_HEADER: &str = "x-merchant-id";

/// The merchant on whose behalf a request is made.
///
/// Rejects the request with 401 when the header is missing or is not a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerchantContext {
    pub merchant_id: Uuid,
}

impl MerchantContext {
    fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let raw = headers
            .get(MERCHANT_ID_HEADER)
            .ok_or(ApiError::Unauthenticated("merchant id not found in request"))?
            .to_str()
            .map_err(|_| ApiError::Unauthenticated("invalid merchant id format"))?;

        let merchant_id = Uuid::parse_str(raw.trim())
            .map_err(|_| ApiError::Unauthenticated("invalid merchant id format"))?;

        Ok(Self { merchant_id })
    }
}

impl FromRequest for MerchantContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req.headers()))
    }
}
