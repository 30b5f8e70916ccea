// ── In-memory KMIP server ──
//
// A `KmipClient` backed by a mutex-guarded object store. It follows the KMIP
// lifecycle closely enough to exercise the explorer end to end: objects are
// created pre-active, destroy refuses active objects, rekey links old and
// new keys. Every request is recorded, and individual operations can be
// made to fail, which is what the controller tests build on.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use strum::{Display, EnumDiscriminants};
use tracing::debug;
use uuid::Uuid;

use super::{ClientError, KeyPairIds, KmipClient, ProtocolVersion, ResultReason, ServerInfo};
use crate::command::requests::{KeyPairSpec, RegisterSpec, SymmetricKeySpec};
use crate::model::{
    Attribute, AttributeSet, AttributeValue, CryptographicAlgorithm, KeyBlock, KeyFormatType,
    Link, LinkType, ManagedObject, Name, ObjectType, RecommendedCurve, RevocationReason,
    SecretDataType, State, UsageMask, names,
};

const DEFAULT_ADDRESS: &str = "sandbox";

/// A request as received by the sandbox.
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(CallKind), derive(Hash, Display))]
pub enum Call {
    Locate(Option<ObjectType>),
    GetAttributes(String),
    Activate(String),
    Revoke {
        id: String,
        reason: RevocationReason,
    },
    Destroy(String),
    Rekey {
        id: String,
        offset_days: Option<u32>,
    },
    RekeyKeyPair {
        id: String,
        offset_days: Option<u32>,
    },
    Create(SymmetricKeySpec),
    CreateKeyPair(KeyPairSpec),
    Register(ObjectType),
    Get(String),
}

struct Entry {
    attributes: AttributeSet,
    /// Dropped once the object is destroyed.
    object: Option<ManagedObject>,
}

#[derive(Default)]
struct Store {
    entries: Vec<Entry>,
    calls: Vec<Call>,
    failures: HashMap<CallKind, (ResultReason, String)>,
}

impl Store {
    fn entry(&self, id: &str) -> Result<&Entry, ClientError> {
        self.entries
            .iter()
            .find(|e| e.attributes.id == id)
            .ok_or_else(|| ClientError::not_found(id))
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut Entry, ClientError> {
        self.entries
            .iter_mut()
            .find(|e| e.attributes.id == id)
            .ok_or_else(|| ClientError::not_found(id))
    }

    fn insert(&mut self, attributes: AttributeSet, object: ManagedObject) -> String {
        let id = attributes.id.clone();
        let destroyed = attributes.state().is_some_and(State::is_destroyed);
        self.entries.push(Entry {
            attributes,
            object: (!destroyed).then_some(object),
        });
        id
    }
}

pub struct SandboxClient {
    store: Mutex<Store>,
    address: String,
    version: ProtocolVersion,
    correlation: bool,
}

impl Default for SandboxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxClient {
    /// An empty sandbox.
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
            address: DEFAULT_ADDRESS.to_owned(),
            version: ProtocolVersion { major: 1, minor: 4 },
            correlation: true,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Disable correlation values on requests.
    pub fn without_correlation(mut self) -> Self {
        self.correlation = false;
        self
    }

    /// A sandbox pre-populated with a representative set of objects.
    pub fn demo() -> Self {
        let sandbox = Self::new();
        {
            let mut store = sandbox.lock();
            let now = Utc::now();
            let mut seed = |object_type, name: &str, state, age: TimeDelta| {
                let (object, usage) = generate(object_type);
                let mut attributes = base_attributes(&object, Some(name), usage, now - age);
                set_state(&mut attributes, state, now);
                store.insert(attributes, object);
            };
            seed(ObjectType::SymmetricKey, "payments-dek", State::Active, TimeDelta::days(42));
            seed(ObjectType::SymmetricKey, "backup-kek", State::PreActive, TimeDelta::hours(5));
            seed(ObjectType::SymmetricKey, "legacy-dek", State::Deactivated, TimeDelta::days(400));
            seed(ObjectType::SymmetricKey, "leaked-key", State::Compromised, TimeDelta::days(12));
            seed(ObjectType::SymmetricKey, "old-session", State::Destroyed, TimeDelta::days(90));
            seed(ObjectType::SecretData, "db-password", State::Active, TimeDelta::minutes(30));
            seed(ObjectType::Certificate, "root-ca", State::Active, TimeDelta::days(365));
            seed(ObjectType::OpaqueObject, "license-blob", State::PreActive, TimeDelta::seconds(20));
        }
        for (name, algorithm, length, curve) in [
            ("tls-signing", CryptographicAlgorithm::Rsa, 2048, None),
            ("code-signing", CryptographicAlgorithm::Ec, 256, Some(RecommendedCurve::P256)),
        ] {
            let spec = KeyPairSpec {
                algorithm,
                length,
                curve,
                private_name: Some(format!("{name}-Private")),
                public_name: Some(format!("{name}-Public")),
                private_usage: UsageMask::SIGN,
                public_usage: UsageMask::VERIFY,
            };
            let mut store = sandbox.lock();
            let pair = create_pair(&mut store, &spec, Utc::now());
            if let Ok(entry) = store.entry_mut(&pair.private) {
                set_state(&mut entry.attributes, State::Active, Utc::now());
            }
        }
        sandbox
    }

    /// Insert an object directly, bypassing request recording.
    pub fn add(&self, object_type: ObjectType, name: &str, state: State) -> String {
        let now = Utc::now();
        let (object, usage) = generate(object_type);
        let mut attributes = base_attributes(&object, Some(name), usage, now);
        set_state(&mut attributes, state, now);
        self.lock().insert(attributes, object)
    }

    /// Requests received so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make every subsequent request of `kind` fail.
    pub fn fail(&self, kind: CallKind, reason: ResultReason, message: impl Into<String>) {
        self.lock().failures.insert(kind, (reason, message.into()));
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `call`, apply any injected failure and hand back the store.
    fn begin(&self, call: Call) -> Result<MutexGuard<'_, Store>, ClientError> {
        let kind = CallKind::from(&call);
        if self.correlation {
            let correlation = Uuid::new_v4();
            debug!(%correlation, operation = %kind, "kmip request");
        } else {
            debug!(operation = %kind, "kmip request");
        }
        let mut store = self.lock();
        store.calls.push(call);
        if let Some((reason, message)) = store.failures.get(&kind) {
            return Err(ClientError::operation(*reason, message.clone()));
        }
        Ok(store)
    }
}

impl KmipClient for SandboxClient {
    fn server_info(&self) -> ServerInfo {
        ServerInfo {
            address: self.address.clone(),
            protocol_version: self.version,
        }
    }

    fn locate(&self, object_type: Option<ObjectType>) -> Result<Vec<String>, ClientError> {
        let store = self.begin(Call::Locate(object_type))?;
        Ok(store
            .entries
            .iter()
            .filter(|e| object_type.is_none() || e.attributes.object_type() == object_type)
            .map(|e| e.attributes.id.clone())
            .collect())
    }

    fn get_attributes(&self, id: &str, names: &[&str]) -> Result<AttributeSet, ClientError> {
        let store = self.begin(Call::GetAttributes(id.to_owned()))?;
        let entry = store.entry(id)?;
        if names.is_empty() {
            return Ok(entry.attributes.clone());
        }
        let attributes = entry
            .attributes
            .attributes
            .iter()
            .filter(|a| names.contains(&a.name.as_str()))
            .cloned()
            .collect();
        Ok(AttributeSet::new(id, attributes))
    }

    fn activate(&self, id: &str) -> Result<(), ClientError> {
        let mut store = self.begin(Call::Activate(id.to_owned()))?;
        let entry = store.entry_mut(id)?;
        if entry.attributes.state() != Some(State::PreActive) {
            return Err(ClientError::operation(
                ResultReason::WrongKeyLifecycleState,
                "only pre-active objects can be activated",
            ));
        }
        set_state(&mut entry.attributes, State::Active, Utc::now());
        Ok(())
    }

    fn revoke(
        &self,
        id: &str,
        reason: RevocationReason,
        message: Option<&str>,
    ) -> Result<(), ClientError> {
        let mut store = self.begin(Call::Revoke {
            id: id.to_owned(),
            reason,
        })?;
        let entry = store.entry_mut(id)?;
        let state = entry.attributes.state();
        if state.is_some_and(State::is_destroyed) {
            return Err(ClientError::operation(
                ResultReason::WrongKeyLifecycleState,
                "object is destroyed",
            ));
        }
        let next = if reason.compromises() {
            State::Compromised
        } else if state == Some(State::Active) {
            State::Deactivated
        } else {
            return Err(ClientError::operation(
                ResultReason::WrongKeyLifecycleState,
                "only active objects can be deactivated",
            ));
        };
        entry.attributes.set(
            names::REVOCATION_REASON,
            AttributeValue::RevocationReason {
                reason,
                message: message.map(str::to_owned),
            },
        );
        set_state(&mut entry.attributes, next, Utc::now());
        Ok(())
    }

    fn destroy(&self, id: &str) -> Result<(), ClientError> {
        let mut store = self.begin(Call::Destroy(id.to_owned()))?;
        let entry = store.entry_mut(id)?;
        let state = entry.attributes.state().unwrap_or(State::PreActive);
        if state == State::Active {
            return Err(ClientError::operation(
                ResultReason::WrongKeyLifecycleState,
                "active objects must be revoked before being destroyed",
            ));
        }
        if state.is_destroyed() {
            return Err(ClientError::operation(
                ResultReason::WrongKeyLifecycleState,
                "object is already destroyed",
            ));
        }
        entry.object = None;
        set_state(&mut entry.attributes, state.destroyed(), Utc::now());
        Ok(())
    }

    fn rekey(&self, id: &str, offset_days: Option<u32>) -> Result<String, ClientError> {
        let mut store = self.begin(Call::Rekey {
            id: id.to_owned(),
            offset_days,
        })?;
        let now = Utc::now();
        let old = store.entry(id)?;
        if old.attributes.object_type() != Some(ObjectType::SymmetricKey) {
            return Err(ClientError::operation(
                ResultReason::IllegalOperation,
                "rekey applies to symmetric keys only",
            ));
        }
        let Some(ManagedObject::SymmetricKey { key_block }) = &old.object else {
            return Err(ClientError::operation(
                ResultReason::WrongKeyLifecycleState,
                "object is destroyed",
            ));
        };
        let length = key_block.length.unwrap_or(256);
        let object = symmetric(length);
        let usage = match old.attributes.primary(names::CRYPTOGRAPHIC_USAGE_MASK) {
            Some(AttributeValue::UsageMask(mask)) => *mask,
            _ => UsageMask::symmetric_default(),
        };
        let name = display_name(&old.attributes);
        let mut attributes = base_attributes(&object, name.as_deref(), Some(usage), now);
        activate_after(&mut attributes, offset_days, now);
        let new_id = attributes.id.clone();

        link_replacement(&mut store, id, &mut attributes)?;
        store.insert(attributes, object);
        Ok(new_id)
    }

    fn rekey_key_pair(
        &self,
        id: &str,
        offset_days: Option<u32>,
    ) -> Result<KeyPairIds, ClientError> {
        let mut store = self.begin(Call::RekeyKeyPair {
            id: id.to_owned(),
            offset_days,
        })?;
        let now = Utc::now();
        let old = store.entry(id)?;
        if old.attributes.object_type() != Some(ObjectType::PrivateKey) {
            return Err(ClientError::operation(
                ResultReason::IllegalOperation,
                "rekey key pair applies to private keys only",
            ));
        }
        let Some(ManagedObject::PrivateKey { key_block }) = &old.object else {
            return Err(ClientError::operation(
                ResultReason::WrongKeyLifecycleState,
                "object is destroyed",
            ));
        };
        let algorithm = key_block.algorithm.unwrap_or(CryptographicAlgorithm::Rsa);
        let length = key_block.length.unwrap_or(2048);
        let curve = match old.attributes.primary(names::RECOMMENDED_CURVE) {
            Some(AttributeValue::Curve(curve)) => Some(*curve),
            _ => None,
        };
        let private_name = display_name(&old.attributes);
        let public_id = linked(&old.attributes, LinkType::PublicKeyLink);
        let public_name = public_id
            .as_deref()
            .and_then(|p| store.entry(p).ok())
            .and_then(|e| display_name(&e.attributes));

        let spec = KeyPairSpec {
            algorithm,
            length,
            curve,
            private_name,
            public_name,
            private_usage: UsageMask::SIGN,
            public_usage: UsageMask::VERIFY,
        };
        let pair = create_pair(&mut store, &spec, now);
        let replaced = [
            (Some(id.to_owned()), &pair.private),
            (public_id, &pair.public),
        ];
        for (old_id, new_id) in replaced {
            let mut attributes = store.entry(new_id)?.attributes.clone();
            activate_after(&mut attributes, offset_days, now);
            if let Some(old_id) = old_id {
                link_replacement(&mut store, &old_id, &mut attributes)?;
            }
            store.entry_mut(new_id)?.attributes = attributes;
        }
        Ok(pair)
    }

    fn create(&self, spec: &SymmetricKeySpec) -> Result<String, ClientError> {
        let mut store = self.begin(Call::Create(spec.clone()))?;
        if spec.algorithm != CryptographicAlgorithm::Aes || ![128, 192, 256].contains(&spec.length)
        {
            return Err(ClientError::operation(
                ResultReason::InvalidField,
                format!("unsupported key {} {}", spec.algorithm, spec.length),
            ));
        }
        let object = symmetric(spec.length);
        let attributes =
            base_attributes(&object, spec.name.as_deref(), Some(spec.usage), Utc::now());
        Ok(store.insert(attributes, object))
    }

    fn create_key_pair(&self, spec: &KeyPairSpec) -> Result<KeyPairIds, ClientError> {
        let mut store = self.begin(Call::CreateKeyPair(spec.clone()))?;
        Ok(create_pair(&mut store, spec, Utc::now()))
    }

    fn register(&self, spec: &RegisterSpec) -> Result<String, ClientError> {
        let mut store = self.begin(Call::Register(spec.object.object_type()))?;
        let attributes =
            base_attributes(&spec.object, spec.name.as_deref(), spec.usage, Utc::now());
        Ok(store.insert(attributes, spec.object.clone()))
    }

    fn get(&self, id: &str) -> Result<ManagedObject, ClientError> {
        let store = self.begin(Call::Get(id.to_owned()))?;
        store.entry(id)?.object.clone().ok_or_else(|| {
            ClientError::operation(ResultReason::WrongKeyLifecycleState, "object is destroyed")
        })
    }
}

// ── Object construction ─────────────────────────────────────────────

fn random_bytes(len: usize) -> Vec<u8> {
    std::iter::repeat_with(|| Uuid::new_v4().into_bytes())
        .flatten()
        .take(len)
        .collect()
}

fn symmetric(bits: i32) -> ManagedObject {
    let len = usize::try_from(bits / 8).unwrap_or(32);
    ManagedObject::SymmetricKey {
        key_block: KeyBlock::new(KeyFormatType::Raw, random_bytes(len))
            .with_algorithm(CryptographicAlgorithm::Aes, bits),
    }
}

/// A fresh object of `object_type` with random content and its default usage.
fn generate(object_type: ObjectType) -> (ManagedObject, Option<UsageMask>) {
    match object_type {
        ObjectType::SymmetricKey => (symmetric(256), Some(UsageMask::symmetric_default())),
        ObjectType::PrivateKey => (
            ManagedObject::PrivateKey {
                key_block: KeyBlock::new(KeyFormatType::Pkcs8, random_bytes(1190))
                    .with_algorithm(CryptographicAlgorithm::Rsa, 2048),
            },
            Some(UsageMask::SIGN),
        ),
        ObjectType::PublicKey => (
            ManagedObject::PublicKey {
                key_block: KeyBlock::new(KeyFormatType::X509, random_bytes(294))
                    .with_algorithm(CryptographicAlgorithm::Rsa, 2048),
            },
            Some(UsageMask::VERIFY),
        ),
        ObjectType::Certificate => (
            ManagedObject::Certificate {
                der: random_bytes(870),
            },
            None,
        ),
        ObjectType::SecretData => (
            ManagedObject::SecretData {
                secret_type: SecretDataType::Password,
                key_block: KeyBlock::new(KeyFormatType::Opaque, b"correct horse battery".to_vec()),
            },
            None,
        ),
        ObjectType::Template => (ManagedObject::Template { attributes: vec![] }, None),
        ObjectType::OpaqueObject | ObjectType::SplitKey | ObjectType::PgpKey => (
            ManagedObject::OpaqueObject {
                value: random_bytes(64),
            },
            None,
        ),
    }
}

fn base_attributes(
    object: &ManagedObject,
    name: Option<&str>,
    usage: Option<UsageMask>,
    created: DateTime<Utc>,
) -> AttributeSet {
    let id = Uuid::new_v4().to_string();
    let mut attributes = vec![
        Attribute::new(names::UNIQUE_IDENTIFIER, AttributeValue::Text(id.clone())),
        Attribute::new(
            names::OBJECT_TYPE,
            AttributeValue::ObjectType(object.object_type()),
        ),
    ];
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        attributes.push(Attribute::indexed(
            names::NAME,
            0,
            AttributeValue::Name(Name::text(name)),
        ));
    }
    let key_block = match object {
        ManagedObject::SymmetricKey { key_block }
        | ManagedObject::PrivateKey { key_block }
        | ManagedObject::PublicKey { key_block } => Some(key_block),
        _ => None,
    };
    if let Some(KeyBlock {
        algorithm: Some(algorithm),
        length,
        ..
    }) = key_block
    {
        attributes.push(Attribute::new(
            names::CRYPTOGRAPHIC_ALGORITHM,
            AttributeValue::Algorithm(*algorithm),
        ));
        if let Some(length) = length {
            attributes.push(Attribute::new(
                names::CRYPTOGRAPHIC_LENGTH,
                AttributeValue::Integer(*length),
            ));
        }
    }
    if let Some(usage) = usage {
        attributes.push(Attribute::new(
            names::CRYPTOGRAPHIC_USAGE_MASK,
            AttributeValue::UsageMask(usage),
        ));
    }
    attributes.extend([
        Attribute::new(names::STATE, AttributeValue::State(State::PreActive)),
        Attribute::new(names::INITIAL_DATE, AttributeValue::DateTime(created)),
        Attribute::new(names::LAST_CHANGE_DATE, AttributeValue::DateTime(created)),
    ]);
    AttributeSet::new(id, attributes)
}

fn create_pair(store: &mut Store, spec: &KeyPairSpec, now: DateTime<Utc>) -> KeyPairIds {
    let bits = spec.length;
    // Roughly the DER sizes of real keys of that strength.
    let (private_len, public_len) = match spec.algorithm {
        CryptographicAlgorithm::Rsa => (bits / 2 + 150, bits / 8 + 38),
        _ => (bits / 4 + 60, bits / 4 + 26),
    };
    let private_len = usize::try_from(private_len).unwrap_or(1190);
    let public_len = usize::try_from(public_len).unwrap_or(294);
    let private_object = ManagedObject::PrivateKey {
        key_block: KeyBlock::new(KeyFormatType::Pkcs8, random_bytes(private_len))
            .with_algorithm(spec.algorithm, bits),
    };
    let public_object = ManagedObject::PublicKey {
        key_block: KeyBlock::new(KeyFormatType::X509, random_bytes(public_len))
            .with_algorithm(spec.algorithm, bits),
    };
    let mut private = base_attributes(
        &private_object,
        spec.private_name.as_deref(),
        Some(spec.private_usage),
        now,
    );
    let mut public = base_attributes(
        &public_object,
        spec.public_name.as_deref(),
        Some(spec.public_usage),
        now,
    );
    if let Some(curve) = spec.curve {
        for attrs in [&mut private, &mut public] {
            attrs.set(names::RECOMMENDED_CURVE, AttributeValue::Curve(curve));
        }
    }
    private.push_indexed(
        names::LINK,
        AttributeValue::Link(Link {
            kind: LinkType::PublicKeyLink,
            linked_id: public.id.clone(),
        }),
    );
    public.push_indexed(
        names::LINK,
        AttributeValue::Link(Link {
            kind: LinkType::PrivateKeyLink,
            linked_id: private.id.clone(),
        }),
    );
    let ids = KeyPairIds {
        public: public.id.clone(),
        private: private.id.clone(),
    };
    store.insert(private, private_object);
    store.insert(public, public_object);
    ids
}

// ── Attribute helpers ───────────────────────────────────────────────

fn set_state(attributes: &mut AttributeSet, state: State, now: DateTime<Utc>) {
    let date = match state {
        State::PreActive => None,
        State::Active => Some(names::ACTIVATION_DATE),
        State::Deactivated => Some(names::DEACTIVATION_DATE),
        State::Compromised => Some(names::COMPROMISE_DATE),
        State::Destroyed | State::DestroyedCompromised => Some(names::DESTROY_DATE),
    };
    if let Some(date) = date {
        attributes.set(date, AttributeValue::DateTime(now));
    }
    attributes.set(names::STATE, AttributeValue::State(state));
    attributes.set(names::LAST_CHANGE_DATE, AttributeValue::DateTime(now));
}

/// Activate now, or schedule activation `offset_days` ahead.
fn activate_after(attributes: &mut AttributeSet, offset_days: Option<u32>, now: DateTime<Utc>) {
    match offset_days.filter(|d| *d > 0) {
        None => set_state(attributes, State::Active, now),
        Some(days) => attributes.set(
            names::ACTIVATION_DATE,
            AttributeValue::DateTime(now + TimeDelta::days(i64::from(days))),
        ),
    }
}

fn link_replacement(
    store: &mut Store,
    old_id: &str,
    replacement: &mut AttributeSet,
) -> Result<(), ClientError> {
    replacement.push_indexed(
        names::LINK,
        AttributeValue::Link(Link {
            kind: LinkType::ReplacedObjectLink,
            linked_id: old_id.to_owned(),
        }),
    );
    let old = store.entry_mut(old_id)?;
    old.attributes.push_indexed(
        names::LINK,
        AttributeValue::Link(Link {
            kind: LinkType::ReplacementObjectLink,
            linked_id: replacement.id.clone(),
        }),
    );
    old.attributes
        .set(names::LAST_CHANGE_DATE, AttributeValue::DateTime(Utc::now()));
    Ok(())
}

fn display_name(attributes: &AttributeSet) -> Option<String> {
    match attributes.primary(names::NAME) {
        Some(AttributeValue::Name(name)) => Some(name.value.clone()),
        _ => None,
    }
}

fn linked(attributes: &AttributeSet, kind: LinkType) -> Option<String> {
    attributes.attributes.iter().find_map(|a| match &a.value {
        AttributeValue::Link(link) if a.name == names::LINK && link.kind == kind => {
            Some(link.linked_id.clone())
        }
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn locate_filters_by_type_in_insertion_order() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        sandbox.add(ObjectType::SecretData, "s", State::Active);
        let b = sandbox.add(ObjectType::SymmetricKey, "b", State::PreActive);

        assert_eq!(sandbox.locate(Some(ObjectType::SymmetricKey)).unwrap(), vec![a, b]);
        assert_eq!(sandbox.locate(None).unwrap().len(), 3);
    }

    #[test]
    fn get_attributes_honours_requested_names() {
        let sandbox = SandboxClient::new();
        let id = sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        let set = sandbox.get_attributes(&id, &[names::OBJECT_TYPE]).unwrap();
        assert_eq!(set.attributes.len(), 1);
        assert_eq!(set.object_type(), Some(ObjectType::SymmetricKey));
    }

    #[test]
    fn lifecycle_activate_revoke_destroy() {
        let sandbox = SandboxClient::new();
        let id = sandbox.add(ObjectType::SymmetricKey, "a", State::PreActive);

        sandbox.activate(&id).unwrap();
        assert!(sandbox.destroy(&id).is_err(), "active objects cannot be destroyed");

        sandbox
            .revoke(&id, RevocationReason::CessationOfOperation, Some("retired"))
            .unwrap();
        sandbox.destroy(&id).unwrap();

        let attrs = sandbox.get_attributes(&id, &[]).unwrap();
        assert_eq!(attrs.state(), Some(State::Destroyed));
        assert!(sandbox.get(&id).is_err());
    }

    #[test]
    fn compromise_survives_destroy() {
        let sandbox = SandboxClient::new();
        let id = sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        sandbox.revoke(&id, RevocationReason::KeyCompromise, None).unwrap();
        sandbox.destroy(&id).unwrap();
        let attrs = sandbox.get_attributes(&id, &[]).unwrap();
        assert_eq!(attrs.state(), Some(State::DestroyedCompromised));
    }

    #[test]
    fn rekey_links_old_and_new_keys() {
        let sandbox = SandboxClient::new();
        let old = sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        let new = sandbox.rekey(&old, None).unwrap();

        let old_attrs = sandbox.get_attributes(&old, &[]).unwrap();
        let new_attrs = sandbox.get_attributes(&new, &[]).unwrap();
        assert_eq!(linked(&old_attrs, LinkType::ReplacementObjectLink), Some(new.clone()));
        assert_eq!(linked(&new_attrs, LinkType::ReplacedObjectLink), Some(old));
        assert_eq!(new_attrs.state(), Some(State::Active));
        assert_eq!(display_name(&new_attrs).as_deref(), Some("a"));
    }

    #[test]
    fn rekey_with_offset_stays_pre_active() {
        let sandbox = SandboxClient::new();
        let old = sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        let new = sandbox.rekey(&old, Some(7)).unwrap();
        let attrs = sandbox.get_attributes(&new, &[]).unwrap();
        assert_eq!(attrs.state(), Some(State::PreActive));
        assert!(attrs.primary(names::ACTIVATION_DATE).is_some());
    }

    #[test]
    fn key_pair_rekey_replaces_both_halves() {
        let sandbox = SandboxClient::new();
        let spec = KeyPairSpec {
            algorithm: CryptographicAlgorithm::Rsa,
            length: 2048,
            curve: None,
            private_name: Some("p-Private".into()),
            public_name: Some("p-Public".into()),
            private_usage: UsageMask::SIGN,
            public_usage: UsageMask::VERIFY,
        };
        let pair = sandbox.create_key_pair(&spec).unwrap();
        let rekeyed = sandbox.rekey_key_pair(&pair.private, None).unwrap();

        let old_public = sandbox.get_attributes(&pair.public, &[]).unwrap();
        assert_eq!(
            linked(&old_public, LinkType::ReplacementObjectLink),
            Some(rekeyed.public.clone())
        );
        let new_public = sandbox.get_attributes(&rekeyed.public, &[]).unwrap();
        assert_eq!(display_name(&new_public).as_deref(), Some("p-Public"));
        assert!(sandbox.rekey_key_pair(&pair.public, None).is_err());
    }

    #[test]
    fn injected_failures_are_recorded_and_returned() {
        let sandbox = SandboxClient::new();
        let id = sandbox.add(ObjectType::SymmetricKey, "a", State::Deactivated);
        sandbox.fail(CallKind::Destroy, ResultReason::PermissionDenied, "nope");

        let err = sandbox.destroy(&id).unwrap_err();
        assert_eq!(err.to_string(), "PermissionDenied: nope");
        assert_eq!(sandbox.calls(), vec![Call::Destroy(id.clone())]);

        sandbox.clear_failures();
        sandbox.destroy(&id).unwrap();
    }

    #[test]
    fn registered_object_round_trips_through_get() {
        let sandbox = SandboxClient::new();
        let object = ManagedObject::Certificate { der: vec![1, 2, 3] };
        let id = sandbox
            .register(&RegisterSpec {
                object: object.clone(),
                name: Some("ca".into()),
                usage: None,
            })
            .unwrap();
        assert_eq!(sandbox.get(&id).unwrap(), object);
        assert_eq!(
            sandbox.get_attributes(&id, &[]).unwrap().state(),
            Some(State::PreActive)
        );
    }

    #[test]
    fn demo_contains_every_listed_category() {
        let sandbox = SandboxClient::demo();
        for object_type in [
            ObjectType::SymmetricKey,
            ObjectType::PrivateKey,
            ObjectType::PublicKey,
            ObjectType::SecretData,
            ObjectType::Certificate,
            ObjectType::OpaqueObject,
        ] {
            assert!(!sandbox.locate(Some(object_type)).unwrap().is_empty());
        }
    }
}
