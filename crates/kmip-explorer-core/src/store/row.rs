// ── Row projection ──
//
// The table row for an object is derived from its attribute list in a
// single pass. Nothing here is stored beyond the next rebuild.

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::{AttributeSet, AttributeValue, State, names};

/// Visual treatment of a row, a pure function of the object state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowStyle {
    #[default]
    Default,
    Active,
    Deactivated,
    Compromised,
    Destroyed,
    DestroyedCompromised,
}

impl RowStyle {
    pub fn for_state(state: Option<State>) -> Self {
        match state {
            Some(State::Active) => Self::Active,
            Some(State::Deactivated) => Self::Deactivated,
            Some(State::Compromised) => Self::Compromised,
            Some(State::Destroyed) => Self::Destroyed,
            Some(State::DestroyedCompromised) => Self::DestroyedCompromised,
            Some(State::PreActive) | None => Self::Default,
        }
    }
}

/// One line of the directory table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryRow {
    pub id: String,
    pub object_type: String,
    pub name: String,
    pub algorithm: String,
    pub size: String,
    pub state: String,
    pub age: String,
    pub style: RowStyle,
}

impl DirectoryRow {
    /// Case-insensitive search over the identifying columns. `needle` must
    /// already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        [
            &self.id,
            &self.name,
            &self.object_type,
            &self.algorithm,
            &self.state,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Project `object` onto a table row, computing ages relative to `now`.
pub fn project(object: &AttributeSet, now: DateTime<Utc>) -> DirectoryRow {
    let mut row = DirectoryRow {
        id: object.id.clone(),
        ..DirectoryRow::default()
    };
    let mut state = None;
    let mut created = None;

    for attribute in object.attributes.iter().filter(|a| a.is_primary()) {
        let value = &attribute.value;
        match attribute.name.as_str() {
            names::OBJECT_TYPE => row.object_type = value.to_string(),
            names::NAME => {
                row.name = match value {
                    AttributeValue::Name(name) => name.value.clone(),
                    other => other.to_string(),
                };
            }
            names::CRYPTOGRAPHIC_ALGORITHM => row.algorithm = value.to_string(),
            names::CRYPTOGRAPHIC_LENGTH => row.size = value.to_string(),
            names::STATE => {
                row.state = value.to_string();
                state = match value {
                    AttributeValue::State(s) => Some(*s),
                    _ => None,
                };
            }
            names::INITIAL_DATE => {
                if let AttributeValue::DateTime(ts) = value {
                    created = Some(*ts);
                }
            }
            _ => {}
        }
    }

    row.style = RowStyle::for_state(state);
    row.age = created.map(|ts| format_age(now - ts)).unwrap_or_default();
    row
}

/// Compact age: `<1m`, `{m}m`, `{h}h{m}m` or `{d}d`.
pub fn format_age(elapsed: TimeDelta) -> String {
    if elapsed < TimeDelta::minutes(1) {
        "<1m".to_owned()
    } else if elapsed < TimeDelta::hours(1) {
        format!("{}m", elapsed.num_minutes())
    } else if elapsed < TimeDelta::days(1) {
        format!(
            "{}h{}m",
            elapsed.num_hours(),
            elapsed.num_minutes() % 60
        )
    } else {
        format!("{}d", elapsed.num_days())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Attribute, CryptographicAlgorithm, Name, ObjectType};

    fn object(created: Option<DateTime<Utc>>) -> AttributeSet {
        let mut attributes = vec![
            Attribute::new(
                names::OBJECT_TYPE,
                AttributeValue::ObjectType(ObjectType::SymmetricKey),
            ),
            Attribute::indexed(names::NAME, 0, AttributeValue::Name(Name::text("k1"))),
            Attribute::indexed(names::NAME, 1, AttributeValue::Name(Name::text("alias"))),
            Attribute::new(
                names::CRYPTOGRAPHIC_ALGORITHM,
                AttributeValue::Algorithm(CryptographicAlgorithm::Aes),
            ),
            Attribute::new(names::CRYPTOGRAPHIC_LENGTH, AttributeValue::Integer(256)),
            Attribute::new(names::STATE, AttributeValue::State(State::Active)),
        ];
        if let Some(ts) = created {
            attributes.push(Attribute::new(
                names::INITIAL_DATE,
                AttributeValue::DateTime(ts),
            ));
        }
        AttributeSet::new("A", attributes)
    }

    #[test]
    fn projects_handled_attributes() {
        let now = Utc::now();
        let row = project(&object(Some(now - TimeDelta::minutes(5))), now);
        assert_eq!(
            row,
            DirectoryRow {
                id: "A".into(),
                object_type: "SymmetricKey".into(),
                name: "k1".into(),
                algorithm: "AES".into(),
                size: "256".into(),
                state: "Active".into(),
                age: "5m".into(),
                style: RowStyle::Active,
            }
        );
    }

    #[test]
    fn missing_initial_date_gives_empty_age() {
        let row = project(&object(None), Utc::now());
        assert_eq!(row.age, "");
    }

    #[test]
    fn age_buckets() {
        assert_eq!(format_age(TimeDelta::seconds(59)), "<1m");
        assert_eq!(format_age(TimeDelta::seconds(-30)), "<1m");
        assert_eq!(format_age(TimeDelta::minutes(1)), "1m");
        assert_eq!(format_age(TimeDelta::minutes(59)), "59m");
        assert_eq!(format_age(TimeDelta::minutes(60)), "1h0m");
        assert_eq!(format_age(TimeDelta::minutes(23 * 60 + 59)), "23h59m");
        assert_eq!(format_age(TimeDelta::hours(24)), "1d");
        assert_eq!(format_age(TimeDelta::days(400)), "400d");
    }

    #[test]
    fn style_follows_state() {
        assert_eq!(RowStyle::for_state(None), RowStyle::Default);
        assert_eq!(RowStyle::for_state(Some(State::PreActive)), RowStyle::Default);
        assert_eq!(
            RowStyle::for_state(Some(State::DestroyedCompromised)),
            RowStyle::DestroyedCompromised
        );
    }

    #[test]
    fn search_is_case_insensitive() {
        let row = project(&object(None), Utc::now());
        assert!(row.matches("aes"));
        assert!(row.matches("symmetric"));
        assert!(!row.matches("rsa"));
    }
}
