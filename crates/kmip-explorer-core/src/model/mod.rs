// ── Domain model ──
//
// Attribute sets as listed by the directory, managed object payloads as
// returned by `get`, and the KMIP enumerations both are built from.

pub mod attribute;
pub mod enums;
pub mod object;
pub mod usage;

pub use attribute::{Attribute, AttributeSet, AttributeValue, Link, Name, ValuePart, names};
pub use enums::{
    CryptographicAlgorithm, KeyFormatType, LinkType, NameType, ObjectType, RecommendedCurve,
    RevocationReason, SecretDataType, State,
};
pub use object::{KeyBlock, ManagedObject};
pub use usage::UsageMask;
