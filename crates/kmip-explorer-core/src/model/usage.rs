// ── Cryptographic usage mask ──

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// KMIP Cryptographic Usage Mask bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageMask(u32);

impl UsageMask {
    pub const SIGN: Self = Self(0x0000_0001);
    pub const VERIFY: Self = Self(0x0000_0002);
    pub const ENCRYPT: Self = Self(0x0000_0004);
    pub const DECRYPT: Self = Self(0x0000_0008);
    pub const WRAP_KEY: Self = Self(0x0000_0010);
    pub const UNWRAP_KEY: Self = Self(0x0000_0020);
    pub const MAC_GENERATE: Self = Self(0x0000_0080);
    pub const MAC_VERIFY: Self = Self(0x0000_0100);
    pub const DERIVE_KEY: Self = Self(0x0000_0200);

    const NAMES: [(Self, &'static str); 9] = [
        (Self::SIGN, "Sign"),
        (Self::VERIFY, "Verify"),
        (Self::ENCRYPT, "Encrypt"),
        (Self::DECRYPT, "Decrypt"),
        (Self::WRAP_KEY, "WrapKey"),
        (Self::UNWRAP_KEY, "UnwrapKey"),
        (Self::MAC_GENERATE, "MACGenerate"),
        (Self::MAC_VERIFY, "MACVerify"),
        (Self::DERIVE_KEY, "DeriveKey"),
    ];

    /// Usage granted to symmetric keys created or registered from the UI.
    pub fn symmetric_default() -> Self {
        Self::ENCRYPT | Self::DECRYPT | Self::WRAP_KEY | Self::UNWRAP_KEY
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for UsageMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl From<u32> for UsageMask {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Display for UsageMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut known = 0u32;
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                known |= flag.0;
                first = false;
            }
        }
        let unknown = self.0 & !known;
        if unknown != 0 {
            if !first {
                f.write_str(" | ")?;
            }
            write!(f, "0x{unknown:08X}")?;
        } else if first {
            f.write_str("None")?;
        }
        Ok(())
    }
}
