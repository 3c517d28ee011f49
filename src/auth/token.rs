use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DataAccessor;
use crate::domain::User;
use crate::error::{CoreError, CoreResult};

/// Payload of a signed bearer token: `{email, password_version, sub,
/// uuid}`. The `uuid` is a per-issuance nonce with no replay cache behind
/// it — tokens are invalidated wholesale by bumping a user's
/// `password_version`, not by tracking individual nonces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub password_version: i32,
    pub sub: String,
    pub uuid: String,
    exp: usize,
}

/// RS256 key material. Grounded in SpacetimeDB's `client-api::auth`
/// signer/validator split, narrowed to the single claim shape this core
/// signs.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_pem(private_key_pem: &[u8], public_key_pem: &[u8]) -> CoreResult<Self> {
        let encoding = EncodingKey::from_rsa_pem(private_key_pem)
            .map_err(|e| CoreError::Other(anyhow::anyhow!("invalid RSA private key: {e}")))?;
        let decoding = DecodingKey::from_rsa_pem(public_key_pem)
            .map_err(|e| CoreError::Other(anyhow::anyhow!("invalid RSA public key: {e}")))?;
        Ok(Self { encoding, decoding })
    }
}

const TOKEN_LIFETIME_SECS: i64 = 60 * 60 * 24 * 30;

pub fn generate_token(user: &User, keys: &TokenKeys) -> CoreResult<String> {
    let claims = Claims {
        email: user.email.clone(),
        password_version: user.password_version,
        sub: user.id.to_string(),
        uuid: Uuid::new_v4().to_string(),
        exp: (chrono::Utc::now().timestamp() + TOKEN_LIFETIME_SECS) as usize,
    };

    encode(&Header::new(jsonwebtoken::Algorithm::RS256), &claims, &keys.encoding)
        .map_err(|_| CoreError::InvalidToken)
}

/// Verifies signature and claims, then resolves `sub` against the data
/// store. Signature/claim failure is always `InvalidToken`; a user that
/// vanished between issuance and verification surfaces as
/// `ObjectNotFound`.
pub async fn user_from_token(token: &str, keys: &TokenKeys, data: &DataAccessor) -> CoreResult<User> {
    let validation = Validation::new(jsonwebtoken::Algorithm::RS256);

    let decoded =
        decode::<Claims>(token, &keys.decoding, &validation).map_err(|_| CoreError::InvalidToken)?;

    let user_id: i64 = decoded.claims.sub.parse().map_err(|_| CoreError::InvalidToken)?;
    data.get_user(user_id).await
}
