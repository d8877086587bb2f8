use crate::errors::ServiceError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by the out-of-band approval link: which payment order the
/// capability applies to and which user it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionClaims {
    pub payment_order_id: i64,
    pub user_id: i64,
    pub exp: usize,
}

/// Issues and verifies the signed, expiring tokens embedded in approval
/// request emails. Verification failures (bad signature, expiry) surface as
/// `AuthError`; the state-machine guards still apply afterwards.
#[derive(Clone)]
pub struct ApprovalTokenService {
    secret: String,
    expiry_secs: i64,
}

impl ApprovalTokenService {
    pub fn new(secret: impl Into<String>, expiry_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            expiry_secs,
        }
    }

    pub fn issue(&self, payment_order_id: i64, user_id: i64) -> Result<String, ServiceError> {
        let exp = (Utc::now() + Duration::seconds(self.expiry_secs)).timestamp() as usize;
        let claims = RejectionClaims {
            payment_order_id,
            user_id,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("failed to sign approval token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<RejectionClaims, ServiceError> {
        decode::<RejectionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| ServiceError::AuthError(format!("invalid approval token: {e}")))
    }
}
