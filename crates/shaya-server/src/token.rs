//! Session tokens: HS256 JWTs naming a user id.

use chrono::{Duration, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  /// The user id, as a decimal string.
  pub sub: String,
  pub iat: i64,
  /// Absolute expiry, seconds since the epoch.
  pub exp: i64,
}

impl Claims {
  pub fn user_id(&self) -> Option<i64> { self.sub.parse().ok() }
}

/// Signs and verifies session tokens with one shared secret.
pub struct TokenSigner {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl TokenSigner {
  pub fn new(secret: &[u8]) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
    }
  }

  /// Issue a token for `user_id` that expires `ttl` from now.
  pub fn issue(
    &self,
    user_id: i64,
    ttl: Duration,
  ) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
      sub: user_id.to_string(),
      iat: now.timestamp(),
      exp: (now + ttl).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
  }

  /// The token's claims, or `None` for a bad signature, a malformed token or
  /// an expired one.
  pub fn validate(&self, token: &str) -> Option<Claims> {
    match decode::<Claims>(token, &self.decoding, &self.validation) {
      Ok(data) => Some(data.claims),
      Err(e) => {
        tracing::debug!(error = %e, "rejected session token");
        None
      }
    }
  }
}
