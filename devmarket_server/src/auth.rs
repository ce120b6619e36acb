//! Access token handling.
//!
//! Users authenticate with an external identity provider, which issues HS256-signed JWTs. The `sub` claim carries the
//! DevMarket user id and `exp` the expiry time as a unix timestamp. Once the signature and expiry check out, the
//! subject is trusted as-is.
//!
//! Tokens are accepted from, in order of preference:
//! 1. The `Authorization: Bearer <token>` header.
//! 2. The `access_token` cookie.
//! 3. The `token` query parameter. Browsers cannot set headers on WebSocket upgrade requests, so `/ws` relies on this.
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use devmarket_engine::db_types::UserId;
use dm_common::Secret;
use futures::future::{ready, Ready};
use hmac::{Hmac, Mac};
use log::*;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

type HmacSha256 = Hmac<Sha256>;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
const JWT_ALGORITHM: &str = "HS256";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: UserId,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn sign(secret: &Secret<String>, message: &str) -> Result<Vec<u8>, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.reveal().as_bytes())
        .map_err(|e| AuthError::ValidationError(format!("Invalid signing key. {e}")))?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    base64::decode_config(segment, base64::URL_SAFE_NO_PAD).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))
}

fn encode_segment<T: AsRef<[u8]>>(data: T) -> String {
    base64::encode_config(data, base64::URL_SAFE_NO_PAD)
}

//-------------------------------------------------  TokenVerifier  ----------------------------------------------------
pub struct TokenVerifier {
    secret: Secret<String>,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self { secret: config.jwt_secret.clone() }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let segments = token.trim().split('.').collect::<Vec<_>>();
        let [header, payload, signature] = segments.as_slice() else {
            return Err(AuthError::PoorlyFormattedToken("A JWT has exactly three segments".into()));
        };
        let jwt_header = serde_json::from_slice::<JwtHeader>(&decode_segment(header)?)
            .map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        if jwt_header.alg != JWT_ALGORITHM {
            return Err(AuthError::ValidationError(format!("Unsupported algorithm {}", jwt_header.alg)));
        }
        let signature = decode_segment(signature)?;
        let mut mac = HmacSha256::new_from_slice(self.secret.reveal().as_bytes())
            .map_err(|e| AuthError::ValidationError(format!("Invalid signing key. {e}")))?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| AuthError::ValidationError("signature has failed verification".into()))?;
        let claims = serde_json::from_slice::<JwtClaims>(&decode_segment(payload)?)
            .map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}

//-------------------------------------------------  TokenIssuer  ------------------------------------------------------
/// Signs access tokens with the shared secret. Production tokens come from the identity provider; this exists for
/// tooling and tests.
pub struct TokenIssuer {
    secret: Secret<String>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { secret: config.jwt_secret.clone() }
    }

    pub fn issue_token(&self, user_id: UserId, valid_for: Duration) -> Result<String, ServerError> {
        let claims = JwtClaims { sub: user_id, exp: (Utc::now() + valid_for).timestamp() };
        self.sign_claims(&claims)
    }

    pub fn sign_claims(&self, claims: &JwtClaims) -> Result<String, ServerError> {
        let header = JwtHeader { alg: JWT_ALGORITHM.into(), typ: Some("JWT".into()) };
        let header = serde_json::to_vec(&header).map_err(|e| ServerError::Unspecified(e.to_string()))?;
        let payload = serde_json::to_vec(claims).map_err(|e| ServerError::Unspecified(e.to_string()))?;
        let message = format!("{}.{}", encode_segment(header), encode_segment(payload));
        let signature = sign(&self.secret, &message)?;
        Ok(format!("{message}.{}", encode_segment(signature)))
    }
}

//-------------------------------------------------  Extractor  --------------------------------------------------------
fn token_from_request(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string());
    bearer.or_else(|| req.cookie(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string())).or_else(|| {
        web::Query::<TokenQuery>::from_query(req.query_string()).ok().and_then(|q| q.into_inner().token)
    })
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let verifier = req.app_data::<web::Data<TokenVerifier>>().ok_or_else(|| {
        error!("🔐️ No token verifier has been configured. All authenticated requests will fail.");
        ServerError::ConfigurationError("No token verifier".into())
    })?;
    let token = token_from_request(req).ok_or(AuthError::MissingToken)?;
    let claims = verifier.verify(&token).map_err(|e| {
        debug!("🔐️ Rejected access token. {e}");
        e
    })?;
    trace!("🔐️ Authenticated request for {}", claims.sub);
    Ok(claims)
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}
