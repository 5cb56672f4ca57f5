//! Authentication for the record book API
//!
//! A single session mechanism: `Authorization: Bearer <JWT>`. The validated
//! claims become an [`Identity`], and that identity's `user_id` is the only
//! partition any handler reads or writes.

pub mod jwt;

pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenInput, TokenValidationResult};

use crate::types::RecordError;

/// Caller identity derived from a validated token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub first_name: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            first_name: claims.first_name,
        }
    }
}

/// Resolve the caller from a raw `Authorization` header value
pub fn authenticate(
    validator: &JwtValidator,
    auth_header: Option<&str>,
) -> Result<Identity, RecordError> {
    let token = extract_token_from_header(auth_header)
        .ok_or_else(|| RecordError::Unauthorized("No token provided".into()))?;

    validator
        .verify_token(token)
        .into_claims()
        .map(Identity::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate_resolves_identity() {
        let validator = JwtValidator::new_dev();
        let token = validator
            .generate_token(TokenInput {
                id: "u-1".into(),
                first_name: "Sam".into(),
            })
            .unwrap();

        let header = format!("Bearer {token}");
        let identity = authenticate(&validator, Some(&header)).unwrap();
        assert_eq!(identity.user_id, "u-1");
        assert_eq!(identity.first_name, "Sam");
    }

    #[test]
    fn test_authenticate_rejects_missing_header() {
        let validator = JwtValidator::new_dev();
        let err = authenticate(&validator, None).unwrap_err();
        assert!(matches!(err, RecordError::Unauthorized(_)));
    }

    #[test]
    fn test_authenticate_rejects_garbage() {
        let validator = JwtValidator::new_dev();
        let err = authenticate(&validator, Some("Bearer not.a.jwt")).unwrap_err();
        assert_eq!(err.status_code().as_u16(), 401);
    }
}
