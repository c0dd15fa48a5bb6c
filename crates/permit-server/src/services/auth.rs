//! Authentication service.
//!
//! Password registration and login against the credential store.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use permit_core::{CredentialStore, NewUser, StoreError, User, UserId, is_valid_email};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0:?}")]
    InvalidEmail(String),

    /// First or last name left blank.
    #[error("missing name")]
    MissingName,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Credential store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Message safe to show on the login and registration forms
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Invalid or missing email address.".into(),
            Self::MissingName => "First and last name are required.".into(),
            Self::InvalidCredentials => "Incorrect email address or password.".into(),
            Self::UserAlreadyExists => "User already exists.".into(),
            Self::WeakPassword(reason) => format!("Password {reason}."),
            Self::PasswordHash | Self::Store(_) => {
                "An error occurred processing your request.".into()
            }
        }
    }
}

/// Registration form fields, untrimmed
#[derive(Debug)]
pub struct Registration<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub permit_type: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn CredentialStore,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn CredentialStore) -> Self {
        Self { store }
    }

    /// Register a new member.
    ///
    /// The permit type is stored verbatim; an unrecognized one prices at zero.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingName`, `InvalidEmail` or `WeakPassword` for
    /// bad input, `UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, form: &Registration<'_>) -> Result<UserId, AuthError> {
        let first_name = form.first_name.trim();
        let last_name = form.last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(AuthError::MissingName);
        }

        let email = form.email.trim();
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail(email.to_owned()));
        }

        validate_password(form.password)?;
        let password_hash = hash_password(form.password)?;

        self.store
            .insert(NewUser {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                email: email.to_owned(),
                password_hash,
                permit_type: form.permit_type.to_owned(),
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Store(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong; the two are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .find_by_email(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
