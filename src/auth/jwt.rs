//! JWT token generation and validation
//! Implements the access token + refresh token pattern. Neither token is
//! persisted; validity is a function of signature and expiry alone.

use crate::{config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the two token kinds a claim set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    pub token_type: TokenType,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

impl Claims {
    /// Parses the subject back into a user id.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// True once `exp` lies in the past, checked against the wall clock
    /// rather than left to the decoder.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Freshly issued token pair
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the refresh token (and its cookie) expires
    pub refresh_expires_in: u64,
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_exp_secs: u64,
    refresh_token_exp_secs: u64,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_exp_secs: config.security.access_token_ttl_secs(),
            refresh_token_exp_secs: config.security.refresh_token_ttl_secs(),
        })
    }

    fn sign(&self, user_id: &Uuid, token_type: TokenType, ttl_secs: u64) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(ttl_secs as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            token_type,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode {:?} token: {:?}", token_type, e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    /// Generate access token
    pub fn generate_access_token(&self, user_id: &Uuid) -> Result<String, AppError> {
        self.sign(user_id, TokenType::Access, self.access_token_exp_secs)
    }

    /// Generate refresh token
    pub fn generate_refresh_token(&self, user_id: &Uuid) -> Result<String, AppError> {
        self.sign(user_id, TokenType::Refresh, self.refresh_token_exp_secs)
    }

    /// Generate token pair
    pub fn generate_token_pair(&self, user_id: &Uuid) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.generate_access_token(user_id)?,
            refresh_token: self.generate_refresh_token(user_id)?,
            refresh_expires_in: self.refresh_token_exp_secs,
        })
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> Result<Claims, AppError> {
        Ok(decode::<Claims>(token, &self.decoding_key, validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::from(e)
            })?
            .claims)
    }

    /// Full validation: signature and expiry.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_with(token, &Validation::new(Algorithm::HS256))
    }

    /// Signature-only validation. Proves the claims were issued by us without
    /// saying anything about freshness.
    pub fn decode_signature_only(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        self.decode_with(token, &validation)
    }

    /// Validate access token specifically
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.validate_token(token)?;
        expect_type(claims, TokenType::Access)
    }

    /// Decode an access token that may already have expired.
    pub fn decode_access_token_allow_expired(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_signature_only(token)?;
        expect_type(claims, TokenType::Access)
    }

    /// Decode a refresh token's signature. Callers check expiry themselves
    /// via [`Claims::is_expired`].
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_signature_only(token)?;
        expect_type(claims, TokenType::Refresh)
    }
}

fn expect_type(claims: Claims, expected: TokenType) -> Result<Claims, AppError> {
    if claims.token_type != expected {
        tracing::debug!(
            "Token type mismatch: expected {:?}, got {:?}",
            expected,
            claims.token_type
        );
        return Err(AppError::InvalidToken);
    }
    Ok(claims)
}
