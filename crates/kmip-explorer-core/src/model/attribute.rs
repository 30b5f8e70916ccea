// ── Attribute model ──
//
// An object as seen by the directory is an opaque id plus the ordered
// attribute list returned by the server. Values form a closed union so the
// row projection can match exhaustively.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{
    CryptographicAlgorithm, LinkType, NameType, ObjectType, RecommendedCurve, RevocationReason,
    State,
};
use super::usage::UsageMask;
use crate::codec;

/// Well-known KMIP attribute names.
pub mod names {
    pub const UNIQUE_IDENTIFIER: &str = "Unique Identifier";
    pub const NAME: &str = "Name";
    pub const OBJECT_TYPE: &str = "Object Type";
    pub const CRYPTOGRAPHIC_ALGORITHM: &str = "Cryptographic Algorithm";
    pub const CRYPTOGRAPHIC_LENGTH: &str = "Cryptographic Length";
    pub const CRYPTOGRAPHIC_USAGE_MASK: &str = "Cryptographic Usage Mask";
    pub const RECOMMENDED_CURVE: &str = "Recommended Curve";
    pub const STATE: &str = "State";
    pub const INITIAL_DATE: &str = "Initial Date";
    pub const ACTIVATION_DATE: &str = "Activation Date";
    pub const DEACTIVATION_DATE: &str = "Deactivation Date";
    pub const COMPROMISE_DATE: &str = "Compromise Date";
    pub const DESTROY_DATE: &str = "Destroy Date";
    pub const LAST_CHANGE_DATE: &str = "Last Change Date";
    pub const REVOCATION_REASON: &str = "Revocation Reason";
    pub const LINK: &str = "Link";
    pub const DIGEST: &str = "Digest";
}

/// A KMIP `Name` structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub value: String,
    pub kind: NameType,
}

impl Name {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: NameType::UninterpretedTextString,
        }
    }
}

/// A KMIP `Link` structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub kind: LinkType,
    pub linked_id: String,
}

/// Attribute value, one variant per KMIP item kind the explorer understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum AttributeValue {
    Text(String),
    Integer(i32),
    LongInteger(i64),
    Boolean(bool),
    Bytes(#[serde(with = "codec::hex_serde")] Vec<u8>),
    DateTime(DateTime<Utc>),
    Interval(u32),
    ObjectType(ObjectType),
    State(State),
    Algorithm(CryptographicAlgorithm),
    Curve(RecommendedCurve),
    RevocationReason {
        reason: RevocationReason,
        message: Option<String>,
    },
    UsageMask(UsageMask),
    Name(Name),
    Link(Link),
    Structure(Vec<(String, AttributeValue)>),
}

/// One labelled fragment of a rendered value. Scalars render as a single
/// unlabelled part; structures render one part per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePart {
    pub field: Option<String>,
    pub text: String,
}

impl AttributeValue {
    /// Split the value into display parts for the attribute pane.
    pub fn parts(&self) -> Vec<ValuePart> {
        let field = |name: &str, text: String| ValuePart {
            field: Some(name.to_owned()),
            text,
        };
        match self {
            Self::Name(name) => vec![
                field("Name Value", name.value.clone()),
                field("Name Type", name.kind.to_string()),
            ],
            Self::Link(link) => vec![
                field("Link Type", link.kind.to_string()),
                field("Linked Object Identifier", link.linked_id.clone()),
            ],
            Self::RevocationReason { reason, message } => {
                let mut parts = vec![field("Revocation Reason Code", reason.to_string())];
                if let Some(message) = message {
                    parts.push(field("Revocation Message", message.clone()));
                }
                parts
            }
            Self::Structure(fields) => fields
                .iter()
                .map(|(name, value)| field(name, value.to_string()))
                .collect(),
            scalar => vec![ValuePart {
                field: None,
                text: scalar.to_string(),
            }],
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(v) => write!(f, "{v}"),
            Self::LongInteger(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Bytes(bytes) => f.write_str(&codec::hex_encode(bytes)),
            Self::DateTime(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S UTC")),
            Self::Interval(secs) => write!(f, "{secs}s"),
            Self::ObjectType(t) => write!(f, "{t}"),
            Self::State(s) => write!(f, "{s}"),
            Self::Algorithm(a) => write!(f, "{a}"),
            Self::Curve(c) => write!(f, "{c}"),
            Self::UsageMask(m) => write!(f, "{m}"),
            Self::RevocationReason { reason, .. } => write!(f, "{reason}"),
            Self::Name(name) => f.write_str(&name.value),
            Self::Link(link) => write!(f, "{} -> {}", link.kind, link.linked_id),
            Self::Structure(fields) => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect();
                f.write_str(&rendered.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub index: Option<u32>,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            index: None,
            value,
        }
    }

    pub fn indexed(name: impl Into<String>, index: u32, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
            value,
        }
    }

    /// Whether this entry is the primary holder of its name (no index or 0).
    pub fn is_primary(&self) -> bool {
        matches!(self.index, None | Some(0))
    }
}

/// A managed object as listed by the directory: id plus attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    pub id: String,
    pub attributes: Vec<Attribute>,
}

impl AttributeSet {
    pub fn new(id: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// Value of the primary entry for `name`. Later primary entries win.
    pub fn primary(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .filter(|a| a.name == name && a.is_primary())
            .map(|a| &a.value)
            .last()
    }

    pub fn object_type(&self) -> Option<ObjectType> {
        match self.primary(names::OBJECT_TYPE) {
            Some(AttributeValue::ObjectType(t)) => Some(*t),
            _ => None,
        }
    }

    pub fn state(&self) -> Option<State> {
        match self.primary(names::STATE) {
            Some(AttributeValue::State(s)) => Some(*s),
            _ => None,
        }
    }

    /// Replace every entry named `name` with a single unindexed value.
    pub fn set(&mut self, name: &str, value: AttributeValue) {
        match self.attributes.iter().position(|a| a.name == name) {
            Some(pos) => {
                self.attributes[pos] = Attribute::new(name, value);
                let mut i = 0;
                self.attributes.retain(|a| {
                    let keep = i <= pos || a.name != name;
                    i += 1;
                    keep
                });
            }
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Append an entry at the next free index for `name`.
    pub fn push_indexed(&mut self, name: &str, value: AttributeValue) {
        let next = self
            .attributes
            .iter()
            .filter(|a| a.name == name)
            .map(|a| a.index.unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);
        self.attributes.push(Attribute::indexed(name, next, value));
    }
}
