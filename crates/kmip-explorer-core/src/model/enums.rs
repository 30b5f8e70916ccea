// ── KMIP enumerations ──
//
// Closed enumerations carried in attribute values and object payloads.
// `Display` yields the KMIP specification name (e.g. `SymmetricKey`,
// `PreActive`, `AES`), which is what the directory table shows.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Kind of managed object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum ObjectType {
    Certificate,
    SymmetricKey,
    PublicKey,
    PrivateKey,
    SplitKey,
    Template,
    SecretData,
    OpaqueObject,
    #[strum(serialize = "PGPKey")]
    PgpKey,
}

/// Lifecycle state of a managed object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum State {
    PreActive,
    Active,
    Deactivated,
    Compromised,
    Destroyed,
    DestroyedCompromised,
}

impl State {
    /// The state an object moves to once destroyed.
    pub fn destroyed(self) -> Self {
        match self {
            Self::Compromised | Self::DestroyedCompromised => Self::DestroyedCompromised,
            _ => Self::Destroyed,
        }
    }

    pub fn is_destroyed(self) -> bool {
        matches!(self, Self::Destroyed | Self::DestroyedCompromised)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum CryptographicAlgorithm {
    #[strum(serialize = "DES3")]
    Des3,
    #[strum(serialize = "AES")]
    Aes,
    #[strum(serialize = "RSA")]
    Rsa,
    #[strum(serialize = "DSA")]
    Dsa,
    #[strum(serialize = "ECDSA")]
    Ecdsa,
    #[strum(serialize = "HMACSHA256")]
    HmacSha256,
    #[strum(serialize = "HMACSHA512")]
    HmacSha512,
    #[strum(serialize = "EC")]
    Ec,
    #[strum(serialize = "ChaCha20")]
    ChaCha20,
}

/// NIST curves offered when creating EC key pairs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum RecommendedCurve {
    #[strum(serialize = "P-256")]
    P256,
    #[strum(serialize = "P-384")]
    P384,
    #[strum(serialize = "P-521")]
    P521,
}

impl RecommendedCurve {
    /// Field size in bits, reported as the key's cryptographic length.
    pub fn bits(self) -> i32 {
        match self {
            Self::P256 => 256,
            Self::P384 => 384,
            Self::P521 => 521,
        }
    }
}

/// Revocation reason codes, in KMIP order (code 1 = `Unspecified`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum RevocationReason {
    Unspecified,
    KeyCompromise,
    CACompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    PrivilegeWithdrawn,
}

impl RevocationReason {
    /// KMIP wire code.
    pub fn code(self) -> u32 {
        match self {
            Self::Unspecified => 1,
            Self::KeyCompromise => 2,
            Self::CACompromise => 3,
            Self::AffiliationChanged => 4,
            Self::Superseded => 5,
            Self::CessationOfOperation => 6,
            Self::PrivilegeWithdrawn => 7,
        }
    }

    /// Human label used by the revoke form.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::KeyCompromise => "Key Compromise",
            Self::CACompromise => "CA Compromise",
            Self::AffiliationChanged => "Affiliation Change",
            Self::Superseded => "Superseded",
            Self::CessationOfOperation => "Cessation Of Operation",
            Self::PrivilegeWithdrawn => "Privilege Withdraw",
        }
    }

    /// Whether revoking for this reason marks the object compromised.
    pub fn compromises(self) -> bool {
        matches!(self, Self::KeyCompromise | Self::CACompromise)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SecretDataType {
    Password,
    Seed,
}

/// Encoding of key material inside a key block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum KeyFormatType {
    Raw,
    Opaque,
    #[strum(serialize = "PKCS_1")]
    Pkcs1,
    #[strum(serialize = "PKCS_8")]
    Pkcs8,
    #[strum(serialize = "X_509")]
    X509,
    ECPrivateKey,
    TransparentSymmetricKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum NameType {
    UninterpretedTextString,
    #[strum(serialize = "URI")]
    Uri,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum LinkType {
    CertificateLink,
    PublicKeyLink,
    PrivateKeyLink,
    ParentLink,
    ChildLink,
    PreviousLink,
    NextLink,
    ReplacementObjectLink,
    ReplacedObjectLink,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_kmip_names() {
        assert_eq!(ObjectType::SymmetricKey.to_string(), "SymmetricKey");
        assert_eq!(ObjectType::PgpKey.to_string(), "PGPKey");
        assert_eq!(State::PreActive.to_string(), "PreActive");
        assert_eq!(CryptographicAlgorithm::Aes.to_string(), "AES");
        assert_eq!(RecommendedCurve::P384.to_string(), "P-384");
    }

    #[test]
    fn revocation_codes_follow_form_order() {
        use strum::IntoEnumIterator;
        let codes: Vec<u32> = RevocationReason::iter().map(RevocationReason::code).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn destroying_compromised_object_keeps_compromise() {
        assert_eq!(State::Compromised.destroyed(), State::DestroyedCompromised);
        assert_eq!(State::Deactivated.destroyed(), State::Destroyed);
    }
}
