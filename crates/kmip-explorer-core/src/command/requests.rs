// ── Typed requests ──
//
// Two layers: what the forms collect (`CreateRequest`, `RegisterRequest`,
// `RevokeRequest`, `RekeyRequest`) and what the client receives
// (`SymmetricKeySpec`, `KeyPairSpec`, `RegisterSpec`). Converting the former
// into the latter is where text input gets decoded and validated.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::codec;
use crate::error::CoreError;
use crate::model::{
    CryptographicAlgorithm, KeyBlock, KeyFormatType, ManagedObject, RecommendedCurve,
    RevocationReason, SecretDataType, UsageMask,
};

// ── Client-facing specs ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetricKeySpec {
    pub name: Option<String>,
    pub algorithm: CryptographicAlgorithm,
    pub length: i32,
    pub usage: UsageMask,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairSpec {
    pub algorithm: CryptographicAlgorithm,
    pub length: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<RecommendedCurve>,
    pub private_name: Option<String>,
    pub public_name: Option<String>,
    pub private_usage: UsageMask,
    pub public_usage: UsageMask,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterSpec {
    pub object: ManagedObject,
    pub name: Option<String>,
    pub usage: Option<UsageMask>,
}

// ── Create ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum AesKeySize {
    #[strum(serialize = "128")]
    Bits128,
    #[strum(serialize = "192")]
    Bits192,
    #[strum(serialize = "256")]
    Bits256,
}

impl AesKeySize {
    pub fn bits(self) -> i32 {
        match self {
            Self::Bits128 => 128,
            Self::Bits192 => 192,
            Self::Bits256 => 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum RsaModulus {
    #[strum(serialize = "2048")]
    Bits2048,
    #[strum(serialize = "3072")]
    Bits3072,
    #[strum(serialize = "4096")]
    Bits4096,
}

impl RsaModulus {
    pub fn bits(self) -> i32 {
        match self {
            Self::Bits2048 => 2048,
            Self::Bits3072 => 3072,
            Self::Bits4096 => 4096,
        }
    }
}

/// Key type and size chosen in the create form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTemplate {
    Aes(AesKeySize),
    Rsa(RsaModulus),
    Ec(RecommendedCurve),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateSpec {
    Symmetric(SymmetricKeySpec),
    KeyPair(KeyPairSpec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub template: KeyTemplate,
}

impl CreateRequest {
    pub fn into_spec(self) -> CreateSpec {
        let name = non_empty(self.name);
        let pair = |algorithm, length, curve| {
            CreateSpec::KeyPair(KeyPairSpec {
                algorithm,
                length,
                curve,
                private_name: name.as_ref().map(|n| format!("{n}-Private")),
                public_name: name.as_ref().map(|n| format!("{n}-Public")),
                private_usage: UsageMask::SIGN,
                public_usage: UsageMask::VERIFY,
            })
        };
        match self.template {
            KeyTemplate::Aes(size) => CreateSpec::Symmetric(SymmetricKeySpec {
                name: name.clone(),
                algorithm: CryptographicAlgorithm::Aes,
                length: size.bits(),
                usage: UsageMask::symmetric_default(),
            }),
            KeyTemplate::Rsa(modulus) => pair(CryptographicAlgorithm::Rsa, modulus.bits(), None),
            KeyTemplate::Ec(curve) => pair(CryptographicAlgorithm::Ec, curve.bits(), Some(curve)),
        }
    }
}

// ── Register ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum KeyEncoding {
    Hex,
    #[strum(serialize = "Base 64")]
    Base64,
}

#[derive(Debug, Clone)]
pub enum RegisterPayload {
    Secret { value: SecretString, base64: bool },
    Certificate { pem: String },
    AesKey { text: String, encoding: KeyEncoding },
    PrivateKey { pem: String },
    PublicKey { pem: String },
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub payload: RegisterPayload,
}

impl RegisterRequest {
    /// Decode the collected text into a managed object ready to register.
    pub fn into_spec(self) -> Result<RegisterSpec, CoreError> {
        let (object, usage) = match self.payload {
            RegisterPayload::Secret { value, base64 } => {
                let bytes = if base64 {
                    codec::base64_decode(value.expose_secret())?
                } else {
                    value.expose_secret().as_bytes().to_vec()
                };
                let object = ManagedObject::SecretData {
                    secret_type: SecretDataType::Password,
                    key_block: KeyBlock::new(KeyFormatType::Opaque, bytes),
                };
                (object, None)
            }
            RegisterPayload::Certificate { pem } => {
                let block = codec::pem_decode(&pem)?;
                if block.label != "CERTIFICATE" {
                    return Err(CoreError::decode(
                        "certificate",
                        format!("unexpected PEM block {}", block.label),
                    ));
                }
                (ManagedObject::Certificate { der: block.der }, None)
            }
            RegisterPayload::AesKey { text, encoding } => {
                let bytes = match encoding {
                    KeyEncoding::Hex => codec::hex_decode(&text)?,
                    KeyEncoding::Base64 => codec::base64_decode(&text)?,
                };
                let length = aes_length(bytes.len())?;
                let key_block = KeyBlock::new(KeyFormatType::Raw, bytes)
                    .with_algorithm(CryptographicAlgorithm::Aes, length);
                (
                    ManagedObject::SymmetricKey { key_block },
                    Some(UsageMask::symmetric_default()),
                )
            }
            RegisterPayload::PrivateKey { pem } => {
                let block = codec::pem_decode(&pem)?;
                let format = match block.label.as_str() {
                    "PRIVATE KEY" => KeyFormatType::Pkcs8,
                    "RSA PRIVATE KEY" => KeyFormatType::Pkcs1,
                    "EC PRIVATE KEY" => KeyFormatType::ECPrivateKey,
                    other => {
                        return Err(CoreError::decode(
                            "private key",
                            format!("unexpected PEM block {other}"),
                        ));
                    }
                };
                let key_block = KeyBlock::new(format, block.der);
                (
                    ManagedObject::PrivateKey { key_block },
                    Some(UsageMask::SIGN),
                )
            }
            RegisterPayload::PublicKey { pem } => {
                let block = codec::pem_decode(&pem)?;
                let format = match block.label.as_str() {
                    "PUBLIC KEY" => KeyFormatType::X509,
                    "RSA PUBLIC KEY" => KeyFormatType::Pkcs1,
                    other => {
                        return Err(CoreError::decode(
                            "public key",
                            format!("unexpected PEM block {other}"),
                        ));
                    }
                };
                let key_block = KeyBlock::new(format, block.der);
                (
                    ManagedObject::PublicKey { key_block },
                    Some(UsageMask::VERIFY),
                )
            }
        };
        Ok(RegisterSpec {
            object,
            name: non_empty(self.name),
            usage,
        })
    }
}

fn aes_length(bytes: usize) -> Result<i32, CoreError> {
    match bytes {
        16 => Ok(128),
        24 => Ok(192),
        32 => Ok(256),
        other => Err(CoreError::decode(
            "AES key",
            format!("{other} bytes, expected 16, 24 or 32"),
        )),
    }
}

// ── Revoke / rekey ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeRequest {
    pub reason: RevocationReason,
    pub message: Option<String>,
}

impl RevokeRequest {
    pub fn new(reason: RevocationReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: non_empty(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RekeyRequest {
    pub offset_days: Option<u32>,
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn aes_create_keeps_name_and_symmetric_usage() {
        let spec = CreateRequest {
            name: "k1".into(),
            template: KeyTemplate::Aes(AesKeySize::Bits256),
        }
        .into_spec();
        assert_eq!(
            spec,
            CreateSpec::Symmetric(SymmetricKeySpec {
                name: Some("k1".into()),
                algorithm: CryptographicAlgorithm::Aes,
                length: 256,
                usage: UsageMask::symmetric_default(),
            })
        );
    }

    #[test]
    fn key_pair_names_get_suffixes() {
        let CreateSpec::KeyPair(spec) = (CreateRequest {
            name: "tls".into(),
            template: KeyTemplate::Ec(RecommendedCurve::P384),
        })
        .into_spec() else {
            panic!("expected a key pair");
        };
        assert_eq!(spec.private_name.as_deref(), Some("tls-Private"));
        assert_eq!(spec.public_name.as_deref(), Some("tls-Public"));
        assert_eq!(spec.curve, Some(RecommendedCurve::P384));
        assert_eq!(spec.length, 384);
        assert_eq!(spec.private_usage, UsageMask::SIGN);
        assert_eq!(spec.public_usage, UsageMask::VERIFY);
    }

    #[test]
    fn unnamed_key_pair_has_no_names() {
        let CreateSpec::KeyPair(spec) = (CreateRequest {
            name: "  ".into(),
            template: KeyTemplate::Rsa(RsaModulus::Bits2048),
        })
        .into_spec() else {
            panic!("expected a key pair");
        };
        assert_eq!(spec.private_name, None);
        assert_eq!(spec.length, 2048);
    }

    #[test]
    fn aes_key_from_hex() {
        let spec = RegisterRequest {
            name: "imported".into(),
            payload: RegisterPayload::AesKey {
                text: "00112233445566778899aabbccddeeff".into(),
                encoding: KeyEncoding::Hex,
            },
        }
        .into_spec()
        .unwrap();
        let ManagedObject::SymmetricKey { key_block } = &spec.object else {
            panic!("expected a symmetric key");
        };
        assert_eq!(key_block.length, Some(128));
        assert_eq!(spec.usage, Some(UsageMask::symmetric_default()));
        assert_eq!(spec.name.as_deref(), Some("imported"));
    }

    #[test]
    fn aes_key_with_wrong_length_is_rejected() {
        let err = RegisterRequest {
            name: String::new(),
            payload: RegisterPayload::AesKey {
                text: "0011".into(),
                encoding: KeyEncoding::Hex,
            },
        }
        .into_spec()
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid AES key: 2 bytes, expected 16, 24 or 32");
    }

    #[test]
    fn base64_secret_is_decoded() {
        let spec = RegisterRequest {
            name: String::new(),
            payload: RegisterPayload::Secret {
                value: SecretString::from(String::from("cGFzc3dvcmQ=")),
                base64: true,
            },
        }
        .into_spec()
        .unwrap();
        assert_eq!(spec.object.render_decoded().unwrap(), "password");
        assert_eq!(spec.name, None);
    }

    #[test]
    fn certificate_requires_certificate_block() {
        let pem = codec::pem_encode("PUBLIC KEY", &[1, 2, 3]);
        let err = RegisterRequest {
            name: String::new(),
            payload: RegisterPayload::Certificate { pem },
        }
        .into_spec()
        .unwrap_err();
        assert!(matches!(err, CoreError::Decode { field: "certificate", .. }));
    }

    #[test]
    fn private_key_format_follows_pem_label() {
        let pem = codec::pem_encode("RSA PRIVATE KEY", &[1, 2, 3]);
        let spec = RegisterRequest {
            name: String::new(),
            payload: RegisterPayload::PrivateKey { pem },
        }
        .into_spec()
        .unwrap();
        let ManagedObject::PrivateKey { key_block } = spec.object else {
            panic!("expected a private key");
        };
        assert_eq!(key_block.format, KeyFormatType::Pkcs1);
        assert_eq!(spec.usage, Some(UsageMask::SIGN));
    }

    #[test]
    fn empty_revoke_message_is_dropped() {
        let req = RevokeRequest::new(RevocationReason::Superseded, "");
        assert_eq!(req.message, None);
    }
}
