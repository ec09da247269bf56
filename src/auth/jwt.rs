use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

/// Claims embedded in the session cookie. The token is the only session
/// state there is; no server-side session store exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub name: String,
    pub role: String,
    pub exp: i64,
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: SessionClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, &claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<SessionClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;

    fn claims(exp: i64) -> SessionClaims {
        SessionClaims {
            sub: uuid::Uuid::new_v4().to_string(),
            name: "Test Student".into(),
            role: "student".into(),
            exp,
        }
    }

    #[test]
    fn token_roundtrip() {
        let exp = (chrono::Utc::now() + chrono::Duration::days(30)).timestamp();
        let claims = claims(exp);
        let token = generate_token(claims.clone(), "key").unwrap();
        let decoded = process_token(&token, "key").unwrap();
        assert_eq!(decoded.claims.sub, claims.sub);
        assert_eq!(decoded.claims.role, "student");
    }

    #[test]
    fn expired_token_is_rejected() {
        let exp = (chrono::Utc::now() - chrono::Duration::days(1)).timestamp();
        let token = generate_token(claims(exp), "key").unwrap();
        assert!(process_token(&token, "key").is_err());
    }

    #[test]
    fn wrong_key_is_rejected() {
        let exp = (chrono::Utc::now() + chrono::Duration::days(1)).timestamp();
        let token = generate_token(claims(exp), "key").unwrap();
        assert!(process_token(&token, "other-key").is_err());
    }
}
