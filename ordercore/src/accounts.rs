//! Account registration and login.
//!
//! Passwords are never stored: registration derives a salted digest and
//! keeps only that. Login recomputes the digest and compares. Token issue
//! and session handling belong to the transport layer; this service only
//! answers "who is this and did they prove it".

use std::sync::Arc;

use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::domain::{PasswordCredential, ShippingAddress, User};
use crate::errors::{AccountError, AccountResult};
use crate::store::{ExpectedRevision, ShopStore, WriteBatch};
use crate::types::{EmailAddress, Password, PersonName, PhoneNumber};

/// Fields required to register an account.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Display name.
    pub name: PersonName,
    /// Login email; must be unused.
    pub email: EmailAddress,
    /// Contact phone; must be unused.
    pub phone: PhoneNumber,
    /// Raw password; hashed immediately, never stored.
    pub password: Password,
    /// Saved shipping addresses, possibly empty.
    pub addresses: Vec<ShippingAddress>,
}

/// The account service.
#[derive(Debug)]
pub struct AccountService<S> {
    store: Arc<S>,
}

impl<S> Clone for AccountService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: ShopStore> AccountService<S> {
    /// Creates an account service over a store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a new customer account.
    ///
    /// Email and phone are checked for uniqueness up front; a racing
    /// duplicate insert is still caught by the store's unique keys and
    /// surfaces as [`AccountError::Conflict`].
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> AccountResult<User> {
        if self
            .store
            .find_user_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(AccountError::EmailTaken);
        }
        if self
            .store
            .find_user_by_phone(&registration.phone)
            .await?
            .is_some()
        {
            return Err(AccountError::PhoneTaken);
        }

        let credential = derive_credential(&registration.password);
        let user = User::new(
            registration.name,
            registration.email,
            registration.phone,
            credential,
            registration.addresses,
        );

        self.store
            .commit(WriteBatch::new().put_user(user.clone(), ExpectedRevision::New))
            .await?;
        Ok(user)
    }

    /// Verify credentials, returning the user on success.
    ///
    /// Unknown email and wrong password both answer
    /// [`AccountError::InvalidCredentials`]; callers cannot probe for
    /// registered addresses.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &EmailAddress, password: &Password) -> AccountResult<User> {
        let Some(versioned) = self.store.find_user_by_email(email).await? else {
            return Err(AccountError::InvalidCredentials);
        };
        let user = versioned.document;

        if !verify_credential(&user.credential, password) {
            return Err(AccountError::InvalidCredentials);
        }
        Ok(user)
    }
}

/// Derive stored password material from a raw password.
pub fn derive_credential(password: &Password) -> PasswordCredential {
    let mut salt = [0u8; 16];
    rand::rng().fill_bytes(&mut salt);
    let salt = hex_encode(&salt);
    let hash = digest_password(&salt, password);
    PasswordCredential { salt, hash }
}

/// Check a raw password against stored material.
pub fn verify_credential(credential: &PasswordCredential, password: &Password) -> bool {
    // Byte-for-byte comparison of equal-length hex digests.
    digest_password(&credential.salt, password) == credential.hash
}

fn digest_password(salt: &str, password: &Password) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_ref().as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_credentials_verify_and_salts_differ() {
        let password = Password::try_new("correct horse battery".to_string()).unwrap();
        let a = derive_credential(&password);
        let b = derive_credential(&password);

        assert!(verify_credential(&a, &password));
        assert!(verify_credential(&b, &password));
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn wrong_password_fails_verification() {
        let password = Password::try_new("correct horse battery".to_string()).unwrap();
        let wrong = Password::try_new("incorrect horse battery".to_string()).unwrap();
        let credential = derive_credential(&password);
        assert!(!verify_credential(&credential, &wrong));
    }

    #[test]
    fn hex_encoding_is_lowercase_and_double_width() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0x1a]), "00ff1a");
    }
}
