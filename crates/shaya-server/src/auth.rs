//! Credential checks and session token issue.

use chrono::Duration;
use shaya_core::{
  Error, password::verify_password, store::CredentialStore, user::User,
};

use crate::token::{Claims, TokenSigner};

/// Authentication over a credential store, borrowed for one request.
pub struct AuthService<'a, S> {
  store:  &'a S,
  tokens: &'a TokenSigner,
}

impl<'a, S: CredentialStore> AuthService<'a, S> {
  pub fn new(store: &'a S, tokens: &'a TokenSigner) -> Self {
    Self { store, tokens }
  }

  /// The user whose username and password match, or `None`. An unknown
  /// username and a wrong password are indistinguishable.
  pub async fn authenticate(
    &self,
    username: &str,
    password: &str,
  ) -> shaya_core::Result<Option<User>> {
    let Some(user) = self
      .store
      .find_by_username(username)
      .await
      .map_err(Into::<Error>::into)?
    else {
      return Ok(None);
    };

    if verify_password(password, &user.hashed_password) {
      Ok(Some(user))
    } else {
      tracing::info!(username, "password mismatch");
      Ok(None)
    }
  }

  pub fn issue_token(
    &self,
    user_id: i64,
    ttl: Duration,
  ) -> Result<String, jsonwebtoken::errors::Error> {
    self.tokens.issue(user_id, ttl)
  }

  pub fn validate_token(&self, token: &str) -> Option<Claims> {
    self.tokens.validate(token)
  }
}
