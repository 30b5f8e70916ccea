// ── Object type filter ──

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

use crate::model::ObjectType;

/// Object categories the directory can be narrowed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Category {
    #[default]
    All,
    SymmetricKey,
    PrivateKey,
    PublicKey,
    Secret,
    Certificate,
    Opaque,
    Template,
}

impl Category {
    /// Cycle order.
    pub const ALL: [Self; 8] = [
        Self::All,
        Self::SymmetricKey,
        Self::PrivateKey,
        Self::PublicKey,
        Self::Secret,
        Self::Certificate,
        Self::Opaque,
        Self::Template,
    ];

    /// Descriptive label, used as the table title.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Objects",
            Self::SymmetricKey => "Symmetric Keys",
            Self::PrivateKey => "Private Keys",
            Self::PublicKey => "Public Keys",
            Self::Secret => "Secrets",
            Self::Certificate => "Certificates",
            Self::Opaque => "Opaque Objects",
            Self::Template => "Templates",
        }
    }

    /// Short tab caption.
    pub fn caption(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Opaque => "Opaque",
            other => other.label(),
        }
    }

    /// Server-side locate constraint. `All` applies none.
    pub fn object_type(self) -> Option<ObjectType> {
        match self {
            Self::All => None,
            Self::SymmetricKey => Some(ObjectType::SymmetricKey),
            Self::PrivateKey => Some(ObjectType::PrivateKey),
            Self::PublicKey => Some(ObjectType::PublicKey),
            Self::Secret => Some(ObjectType::SecretData),
            Self::Certificate => Some(ObjectType::Certificate),
            Self::Opaque => Some(ObjectType::OpaqueObject),
            Self::Template => Some(ObjectType::Template),
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Notification emitted when the active category changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterChange {
    pub category: Category,
    pub label: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct TypeFilter {
    current: Category,
}

impl TypeFilter {
    pub fn new(initial: Category) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> Category {
        self.current
    }

    pub fn label(&self) -> &'static str {
        self.current.label()
    }

    pub fn object_type(&self) -> Option<ObjectType> {
        self.current.object_type()
    }

    /// Advance to the next category, wrapping after the last one.
    pub fn next(&mut self) -> Option<FilterChange> {
        self.select(self.current.next())
    }

    pub fn prev(&mut self) -> Option<FilterChange> {
        self.select(self.current.prev())
    }

    /// Switch to `category`. Returns the change notification, or `None`
    /// when `category` is already active.
    pub fn select(&mut self, category: Category) -> Option<FilterChange> {
        if category == self.current {
            return None;
        }
        self.current = category;
        Some(FilterChange {
            category,
            label: category.label(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn next_cycles_back_to_start() {
        let mut filter = TypeFilter::new(Category::Secret);
        let mut changes = 0;
        for _ in 0..Category::ALL.len() {
            changes += usize::from(filter.next().is_some());
        }
        assert_eq!(filter.current(), Category::Secret);
        assert_eq!(changes, Category::ALL.len());
    }

    #[test]
    fn prev_inverts_next() {
        for start in Category::ALL {
            let mut filter = TypeFilter::new(start);
            filter.next();
            filter.prev();
            assert_eq!(filter.current(), start);
        }
        let mut filter = TypeFilter::default();
        filter.prev();
        assert_eq!(filter.current(), Category::Template);
    }

    #[test]
    fn selecting_active_category_is_silent() {
        let mut filter = TypeFilter::new(Category::Certificate);
        assert_eq!(filter.select(Category::Certificate), None);
        assert_eq!(
            filter.select(Category::SymmetricKey),
            Some(FilterChange {
                category: Category::SymmetricKey,
                label: "Symmetric Keys",
            })
        );
    }

    #[test]
    fn all_has_no_server_constraint() {
        assert_eq!(Category::All.object_type(), None);
        assert_eq!(Category::Secret.object_type(), Some(ObjectType::SecretData));
        assert_eq!(Category::Opaque.caption(), "Opaque");
        assert_eq!(Category::Opaque.label(), "Opaque Objects");
    }

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!(Category::from_str("symmetric-key").unwrap(), Category::SymmetricKey);
        assert_eq!(Category::from_str("ALL").unwrap(), Category::All);
    }
}
