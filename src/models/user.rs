//! Caller identity carried in bearer tokens
//!
//! Accounts and login live in the portal; this server only verifies the
//! token and hands an explicit identity to the services.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Portal role of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Staff,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Student number or staff id
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Student id of the caller, if the caller is a student
    pub fn require_student(&self) -> Result<&str, AppError> {
        match self.role {
            Role::Student => Ok(&self.sub),
            Role::Staff => Err(AppError::Authorization(
                "Only students can perform this action".to_string(),
            )),
        }
    }

    /// Staff id of the caller, if the caller is staff
    pub fn require_staff(&self) -> Result<&str, AppError> {
        match self.role {
            Role::Staff => Ok(&self.sub),
            Role::Student => Err(AppError::Authorization(
                "Staff access required".to_string(),
            )),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }
}
