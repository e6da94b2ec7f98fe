//! Issued-at override hook.
//!
//! Holds at most one pending `iat` and writes it into the claim set of the
//! next envelope it sees. One instance serves exactly one issuance call.

use crate::errors::InterceptorError;
use crate::jwt::{BeforeCreateHook, EncryptionSettings, IssuedAt, Jwe, Jws, Jwt, Payload};

#[derive(Debug, Default)]
pub struct IssuedAtOverride {
    pending: Option<IssuedAt>,
}

impl IssuedAtOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the override, replacing any earlier one.
    pub fn set_pending_issued_at(&mut self, issued_at: IssuedAt) -> &mut Self {
        self.pending = Some(issued_at);
        self
    }
}

impl BeforeCreateHook for IssuedAtOverride {
    fn before_create(
        &self,
        jwt: Jwt,
        settings: EncryptionSettings,
    ) -> Result<(Jwt, EncryptionSettings), InterceptorError> {
        let Some(issued_at) = self.pending else {
            return Ok((jwt, settings));
        };

        let jwt = match jwt {
            Jwt::Jws(jws) => Jwt::Jws(Jws {
                payload: with_issued_at(jws.payload, issued_at)?,
                ..jws
            }),
            Jwt::Jwe(jwe) => Jwt::Jwe(Jwe {
                payload: with_issued_at(jwe.payload, issued_at)?,
                ..jwe
            }),
            Jwt::Unsecured(_) => return Err(InterceptorError::UnsupportedTokenKind),
        };

        Ok((jwt, settings))
    }
}

fn with_issued_at(payload: Payload, issued_at: IssuedAt) -> Result<Payload, InterceptorError> {
    let Payload::Claims(mut claims) = payload else {
        return Err(InterceptorError::MalformedPayload);
    };
    claims.set(issued_at);
    Ok(Payload::Claims(claims))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::crypto::{generate_content_key, generate_signing_key};
    use crate::jwt::{Claim, ClaimSet, IssuedAtFactory, JoseHeader, Unsecured};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn claims(iat: i64) -> Payload {
        let mut claims = ClaimSet::new();
        claims.insert(Claim::new("uid", 7)).unwrap();
        claims.insert(Claim::new("iat", iat)).unwrap();
        claims.insert(Claim::new("exp", iat + 3600)).unwrap();
        Payload::Claims(claims)
    }

    fn jws_settings() -> EncryptionSettings {
        EncryptionSettings::Jws {
            key: Arc::new(generate_signing_key("sig-01").unwrap()),
        }
    }

    fn jwe_settings() -> EncryptionSettings {
        EncryptionSettings::Jwe {
            key: Arc::new(generate_content_key("enc-01").unwrap()),
        }
    }

    fn override_at(seconds: i64) -> IssuedAtOverride {
        let mut hook = IssuedAtOverride::new();
        hook.set_pending_issued_at(
            IssuedAtFactory.create(Utc.timestamp_opt(seconds, 0).unwrap(), true),
        );
        hook
    }

    fn iat_of(jwt: &Jwt) -> Option<i64> {
        jwt.claims()?.get("iat")?.as_i64()
    }

    #[test]
    fn test_no_pending_override_passes_through() {
        let jwt = Jwt::Unsecured(Unsecured {
            header: JoseHeader::new().with("alg", "none"),
            payload: Payload::Raw(b"x".to_vec()),
        });

        let (out, settings) = IssuedAtOverride::new()
            .before_create(jwt.clone(), EncryptionSettings::Unsecured)
            .unwrap();

        assert_eq!(out, jwt);
        assert_eq!(settings.kind(), "unsecured");
    }

    #[test]
    fn test_jws_iat_overwritten_and_headers_kept() {
        let protected = JoseHeader::new().with("alg", "EdDSA").with("kid", "sig-01");
        let unprotected = JoseHeader::new().with("x-trace", "abc");
        let jwt = Jwt::Jws(Jws {
            protected: protected.clone(),
            payload: claims(5000),
            unprotected: Some(unprotected.clone()),
        });

        let (out, settings) = override_at(1000).before_create(jwt, jws_settings()).unwrap();

        let Jwt::Jws(jws) = &out else {
            panic!("expected JWS, got {}", out.kind());
        };
        assert_eq!(jws.protected, protected);
        assert_eq!(jws.unprotected, Some(unprotected));
        assert_eq!(iat_of(&out), Some(1000));
        assert_eq!(out.claims().unwrap().get("exp"), Some(&8600.into()));
        assert_eq!(settings.kind(), "jws");
    }

    #[test]
    fn test_jwe_iat_overwritten_and_all_headers_kept() {
        let protected = JoseHeader::new().with("alg", "dir").with("enc", "A256GCM");
        let shared = JoseHeader::new().with("jku", "https://keys.example");
        let recipients = vec![
            JoseHeader::new().with("kid", "r1"),
            JoseHeader::new().with("kid", "r2"),
        ];
        let jwt = Jwt::Jwe(Jwe {
            protected: protected.clone(),
            shared_unprotected: Some(shared.clone()),
            per_recipient_unprotected: recipients.clone(),
            payload: claims(5000),
        });

        let (out, settings) = override_at(1000).before_create(jwt, jwe_settings()).unwrap();

        let Jwt::Jwe(jwe) = &out else {
            panic!("expected JWE, got {}", out.kind());
        };
        assert_eq!(jwe.protected, protected);
        assert_eq!(jwe.shared_unprotected, Some(shared));
        assert_eq!(jwe.per_recipient_unprotected, recipients);
        assert_eq!(iat_of(&out), Some(1000));
        assert_eq!(settings.kind(), "jwe");
    }

    #[test]
    fn test_missing_iat_is_inserted() {
        let mut claim_set = ClaimSet::new();
        claim_set.insert(Claim::new("uid", 7)).unwrap();
        let jwt = Jwt::Jws(Jws {
            protected: JoseHeader::new(),
            payload: Payload::Claims(claim_set),
            unprotected: None,
        });

        let (out, _) = override_at(1000).before_create(jwt, jws_settings()).unwrap();
        assert_eq!(iat_of(&out), Some(1000));
    }

    #[test]
    fn test_unsecured_envelope_is_rejected() {
        let jwt = Jwt::Unsecured(Unsecured {
            header: JoseHeader::new().with("alg", "none"),
            payload: claims(5000),
        });

        let err = override_at(1000)
            .before_create(jwt, EncryptionSettings::Unsecured)
            .unwrap_err();
        assert_eq!(err, InterceptorError::UnsupportedTokenKind);
    }

    #[test]
    fn test_raw_payload_is_rejected() {
        let jwt = Jwt::Jws(Jws {
            protected: JoseHeader::new(),
            payload: Payload::Raw(b"opaque".to_vec()),
            unprotected: None,
        });

        let err = override_at(1000).before_create(jwt, jws_settings()).unwrap_err();
        assert_eq!(err, InterceptorError::MalformedPayload);
    }

    #[test]
    fn test_latest_pending_value_wins() {
        let factory = IssuedAtFactory;
        let mut hook = IssuedAtOverride::new();
        hook.set_pending_issued_at(factory.create(Utc.timestamp_opt(1000, 0).unwrap(), true))
            .set_pending_issued_at(factory.create(Utc.timestamp_opt(2000, 0).unwrap(), true));

        let jwt = Jwt::Jws(Jws {
            protected: JoseHeader::new(),
            payload: claims(5000),
            unprotected: None,
        });
        let (out, _) = hook.before_create(jwt, jws_settings()).unwrap();

        assert_eq!(iat_of(&out), Some(2000));
    }
}
