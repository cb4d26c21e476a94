use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, ServiceError};

/// Tokens are issued elsewhere; `sub` may be a number or a string.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    exp: usize,
}

pub struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn from_env() -> Self {
        Self::new(&read_or_generate_secret())
    }
}

fn read_or_generate_secret() -> Vec<u8> {
    if let Ok(secret) = std::env::var("FIFA_JWT_SECRET") {
        secret.as_bytes().to_vec()
    } else {
        info!("JWT secret not found, generating a random one...");
        Uuid::new_v4().as_bytes().to_vec()
    }
}

impl FromRequestParts<AppState> for Claims {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ServiceError::Unauthorized("Missing bearer token".to_string()))?;
        let token_data =
            decode::<Claims>(bearer.token(), &state.keys.decoding, &Validation::default())
                .map_err(|e| {
                    log::debug!("Rejected bearer token: {}", e);
                    ServiceError::Unauthorized("Invalid token".to_string())
                })?;
        Ok(token_data.claims)
    }
}

pub fn generate_jwt(
    keys: &Keys,
    sub: serde_json::Value,
    username: Option<String>,
    valid_for: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub,
        username,
        exp: (chrono::Utc::now() + valid_for).timestamp().max(0) as usize,
    };
    encode(&Header::default(), &claims, &keys.encoding)
}
