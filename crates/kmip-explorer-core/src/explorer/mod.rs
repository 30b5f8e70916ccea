// ── Explorer controller ──
//
// Composes the directory, the type filter and the action protocol. All
// client calls happen on blocking background tasks; their results come
// back through the update queue and are applied by `apply` on the UI loop,
// one at a time, in arrival order. Concurrent refreshes are not cancelled:
// whichever result arrives last overwrites the directory.

pub mod state;
pub mod update;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::{KmipClient, ServerInfo};
use crate::command::{ActionRequest, Effect, Operation, Prompt, Reconciliation, Target};
use crate::error::CoreError;
use crate::model::{AttributeSet, ManagedObject, ObjectType};
use crate::store::{Category, Directory, DirectoryEvent, FilterChange, TypeFilter};

pub use state::ExplorerState;
pub use update::{Patch, Update};

/// Settings fixed when the controller is built.
#[derive(Debug, Clone, Default)]
pub struct ExplorerConfig {
    pub initial_category: Category,
}

/// Notification for the view layer.
#[derive(Debug)]
pub enum ExplorerEvent {
    Directory(DirectoryEvent),
    FilterChanged(FilterChange),
    /// Content requested with `fetch_material` is ready.
    Material { id: String, object: ManagedObject },
    /// A recoverable error was raised and is now displayed.
    Error(String),
}

pub struct ExplorerController {
    client: Arc<dyn KmipClient>,
    updates: mpsc::UnboundedSender<Update>,
    directory: Directory,
    filter: TypeFilter,
    /// Operation whose form is open, with the object it was opened on.
    soliciting: Option<(Operation, Target)>,
    /// Request waiting for a yes/no answer.
    pending: Option<ActionRequest>,
    error: Option<String>,
    loads_in_flight: usize,
    actions_in_flight: usize,
    events: Vec<ExplorerEvent>,
}

impl ExplorerController {
    pub fn new(
        client: Arc<dyn KmipClient>,
        config: &ExplorerConfig,
        updates: mpsc::UnboundedSender<Update>,
    ) -> Self {
        Self {
            client,
            updates,
            directory: Directory::new(),
            filter: TypeFilter::new(config.initial_category),
            soliciting: None,
            pending: None,
            error: None,
            loads_in_flight: 0,
            actions_in_flight: 0,
            events: Vec::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> ExplorerState {
        if self.error.is_some() {
            ExplorerState::ErrorShown
        } else if self.soliciting.is_some() || self.pending.is_some() || self.actions_in_flight > 0
        {
            ExplorerState::ActionPending
        } else if self.loads_in_flight > 0 {
            ExplorerState::Loading
        } else {
            ExplorerState::Idle
        }
    }

    /// Background tasks whose update has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.loads_in_flight + self.actions_in_flight
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Direct access for view-only changes (selection, search).
    pub fn directory_mut(&mut self) -> &mut Directory {
        &mut self.directory
    }

    pub fn filter(&self) -> &TypeFilter {
        &self.filter
    }

    pub fn server_info(&self) -> ServerInfo {
        self.client.server_info()
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.pending.as_ref().and_then(|p| p.prompt.as_ref())
    }

    pub fn soliciting(&self) -> Option<Operation> {
        self.soliciting.as_ref().map(|(op, _)| *op)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Drain notifications accumulated since the last call.
    pub fn take_events(&mut self) -> Vec<ExplorerEvent> {
        self.collect_directory_events();
        std::mem::take(&mut self.events)
    }

    // ── Refresh / filter ─────────────────────────────────────────────

    /// Re-run the locate query for the active filter in the background.
    pub fn refresh(&mut self, reset_selection: bool) {
        let object_type = self.filter.object_type();
        debug!(?object_type, reset_selection, "refreshing directory");
        self.loads_in_flight += 1;
        let client = Arc::clone(&self.client);
        self.spawn(move || match load(client.as_ref(), object_type) {
            Ok(objects) => Update::Loaded {
                objects,
                reset_selection,
            },
            Err(error) => Update::LoadFailed(error),
        });
    }

    pub fn next_filter(&mut self) {
        let change = self.filter.next();
        self.filter_changed(change);
    }

    pub fn prev_filter(&mut self) {
        let change = self.filter.prev();
        self.filter_changed(change);
    }

    pub fn select_filter(&mut self, category: Category) {
        let change = self.filter.select(category);
        self.filter_changed(change);
    }

    fn filter_changed(&mut self, change: Option<FilterChange>) {
        let Some(change) = change else { return };
        info!(category = change.label, "type filter changed");
        self.events.push(ExplorerEvent::FilterChanged(change));
        self.directory.clear();
        self.refresh(true);
    }

    // ── Action protocol ──────────────────────────────────────────────

    /// Start soliciting parameters for `operation`. Targeted operations
    /// bind to the current selection.
    pub fn begin(&mut self, operation: Operation) -> Result<(), CoreError> {
        let target = if operation.is_targeted() {
            let object = self.directory.selection().ok_or(CoreError::NoSelection)?;
            Target::object(object.id.clone(), object.object_type())
        } else {
            Target::none()
        };
        debug!(%operation, id = ?target.id, "soliciting action");
        self.soliciting = Some((operation, target));
        Ok(())
    }

    /// The form was dismissed without producing an effect.
    pub fn cancel(&mut self) {
        if let Some((operation, _)) = self.soliciting.take() {
            debug!(%operation, "action cancelled");
        }
    }

    /// Hand over the effect produced by the open form. Destructive
    /// operations wait for `confirm`; the others start immediately.
    pub fn submit(&mut self, effect: Effect) -> Result<(), CoreError> {
        let operation = effect.operation();
        let target = match self.soliciting.take() {
            Some((solicited, target)) if solicited == operation => target,
            _ => return Err(CoreError::NoPendingAction(operation)),
        };
        let request = ActionRequest::new(target, effect);
        if operation.needs_confirmation() {
            self.pending = Some(request);
        } else {
            self.execute(request);
        }
        Ok(())
    }

    /// Answer the pending prompt. Anything but `true` discards the effect.
    pub fn confirm(&mut self, accepted: bool) {
        let Some(request) = self.pending.take() else {
            return;
        };
        if accepted {
            self.execute(request);
        } else {
            debug!(operation = %request.operation(), "action declined");
        }
    }

    pub fn activate_selected(&mut self) -> Result<(), CoreError> {
        self.begin(Operation::Activate)?;
        self.submit(Effect::activate())
    }

    pub fn destroy_selected(&mut self) -> Result<(), CoreError> {
        self.begin(Operation::Destroy)?;
        self.submit(Effect::destroy())
    }

    /// Fetch the selected object's content for the material viewer.
    pub fn fetch_material(&mut self) -> Result<(), CoreError> {
        let id = self
            .directory
            .selection()
            .ok_or(CoreError::NoSelection)?
            .id
            .clone();
        self.loads_in_flight += 1;
        let client = Arc::clone(&self.client);
        self.spawn(move || {
            let result = client.get(&id).map_err(CoreError::from);
            Update::Material { id, result }
        });
        Ok(())
    }

    pub fn acknowledge_error(&mut self) {
        self.error = None;
    }

    fn execute(&mut self, request: ActionRequest) {
        let ActionRequest { target, effect, .. } = request;
        let operation = effect.operation();
        let object_type = self.filter.object_type();
        info!(%operation, id = ?target.id, "executing action");
        self.actions_in_flight += 1;
        let client = Arc::clone(&self.client);
        self.spawn(move || {
            let client = client.as_ref();
            let result = effect
                .run(client, &target)
                .and_then(|()| reconcile(client, operation, &target, object_type));
            match result {
                Ok(patch) => Update::Reconciled { operation, patch },
                Err(error) => Update::ActionFailed { operation, error },
            }
        });
    }

    // ── Update queue ─────────────────────────────────────────────────

    /// Apply one background result.
    pub fn apply(&mut self, update: Update) {
        match update {
            Update::Loaded {
                objects,
                reset_selection,
            } => {
                self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
                debug!(count = objects.len(), "directory loaded");
                self.directory.set_objects(objects, reset_selection);
            }
            Update::LoadFailed(error) => {
                self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
                self.raise(&error);
            }
            Update::Reconciled { operation, patch } => {
                self.actions_in_flight = self.actions_in_flight.saturating_sub(1);
                info!(%operation, "action succeeded");
                match patch {
                    Patch::Remove(id) => {
                        self.directory.remove_object(&id);
                    }
                    Patch::Update(attributes) => {
                        self.directory.update_object(attributes);
                    }
                    Patch::Replace(objects) => self.directory.set_objects(objects, false),
                }
            }
            Update::ActionFailed { operation, error } => {
                self.actions_in_flight = self.actions_in_flight.saturating_sub(1);
                warn!(%operation, "action failed");
                self.raise(&error);
            }
            Update::Material { id, result } => {
                self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
                match result {
                    Ok(object) => self.events.push(ExplorerEvent::Material { id, object }),
                    Err(error) => self.raise(&error),
                }
            }
        }
        self.collect_directory_events();
    }

    fn raise(&mut self, error: &CoreError) {
        warn!(%error, "surfacing error");
        let message = error.to_string();
        self.events.push(ExplorerEvent::Error(message.clone()));
        self.error = Some(message);
    }

    fn collect_directory_events(&mut self) {
        self.events.extend(
            self.directory
                .take_events()
                .into_iter()
                .map(ExplorerEvent::Directory),
        );
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> Update + Send + 'static,
    {
        let updates = self.updates.clone();
        tokio::task::spawn_blocking(move || {
            if updates.send(job()).is_err() {
                debug!("update queue closed, dropping result");
            }
        });
    }
}

/// Locate the objects of `object_type` and fetch all their attributes.
fn load(
    client: &dyn KmipClient,
    object_type: Option<ObjectType>,
) -> Result<Vec<AttributeSet>, CoreError> {
    let ids = client.locate(object_type)?;
    ids.iter()
        .map(|id| client.get_attributes(id, &[]).map_err(CoreError::from))
        .collect()
}

fn reconcile(
    client: &dyn KmipClient,
    operation: Operation,
    target: &Target,
    object_type: Option<ObjectType>,
) -> Result<Patch, CoreError> {
    match operation.reconciliation() {
        Reconciliation::Remove => Ok(Patch::Remove(target.require_id()?.to_owned())),
        Reconciliation::Refetch => {
            let attributes = client.get_attributes(target.require_id()?, &[])?;
            Ok(Patch::Update(attributes))
        }
        Reconciliation::FullRefresh => Ok(Patch::Replace(load(client, object_type)?)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::client::{Call, CallKind, ResultReason, SandboxClient};
    use crate::command::{
        AesKeySize, CreateRequest, KeyTemplate, RegisterPayload, RegisterRequest, RekeyRequest,
        RevokeRequest, SymmetricKeySpec,
    };
    use crate::model::{
        AttributeValue, CryptographicAlgorithm, LinkType, RevocationReason, State, UsageMask,
        names,
    };

    struct Harness {
        sandbox: Arc<SandboxClient>,
        controller: ExplorerController,
        updates: UnboundedReceiver<Update>,
    }

    impl Harness {
        fn new(sandbox: SandboxClient) -> Self {
            let sandbox = Arc::new(sandbox);
            let (tx, updates) = mpsc::unbounded_channel();
            let client: Arc<dyn KmipClient> = sandbox.clone();
            let controller = ExplorerController::new(client, &ExplorerConfig::default(), tx);
            Self {
                sandbox,
                controller,
                updates,
            }
        }

        /// Apply updates until no background task is outstanding.
        async fn settle(&mut self) {
            while self.controller.in_flight() > 0 {
                let update = self.updates.recv().await.unwrap();
                self.controller.apply(update);
            }
        }

        async fn loaded(sandbox: SandboxClient) -> Self {
            let mut harness = Self::new(sandbox);
            harness.controller.refresh(true);
            harness.settle().await;
            harness.controller.take_events();
            harness.sandbox.clear_calls();
            harness
        }

        fn ids(&self) -> Vec<String> {
            self.controller
                .directory()
                .objects()
                .iter()
                .map(|o| o.id.clone())
                .collect()
        }

        fn select(&mut self, id: &str) {
            let row = self
                .controller
                .directory()
                .rows()
                .position(|r| r.id == id)
                .unwrap();
            self.controller.directory_mut().select(row + 1);
        }
    }

    #[tokio::test]
    async fn refresh_loads_objects_and_selects_first() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        let mut h = Harness::new(sandbox);

        h.controller.refresh(true);
        assert_eq!(h.controller.state(), ExplorerState::Loading);
        h.settle().await;

        assert_eq!(h.controller.state(), ExplorerState::Idle);
        assert_eq!(h.controller.directory().selection().unwrap().id, a);
    }

    #[tokio::test]
    async fn symmetric_filter_queries_by_type() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        sandbox.add(ObjectType::PrivateKey, "b", State::Active);
        let c = sandbox.add(ObjectType::SymmetricKey, "c", State::PreActive);
        let mut h = Harness::loaded(sandbox).await;

        h.controller.select_filter(Category::SymmetricKey);
        h.settle().await;

        assert_eq!(h.ids(), vec![a, c]);
        assert_eq!(
            h.sandbox.calls().first(),
            Some(&Call::Locate(Some(ObjectType::SymmetricKey)))
        );
        let filter_events = h
            .controller
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, ExplorerEvent::FilterChanged(_)))
            .count();
        assert_eq!(filter_events, 1);

        h.controller.select_filter(Category::SymmetricKey);
        assert_eq!(h.controller.in_flight(), 0);
    }

    #[tokio::test]
    async fn all_filter_omits_type_constraint() {
        let mut h = Harness::loaded(SandboxClient::new()).await;
        h.controller.select_filter(Category::Secret);
        h.settle().await;
        h.controller.select_filter(Category::All);
        h.settle().await;
        assert_eq!(
            h.sandbox.calls(),
            vec![
                Call::Locate(Some(ObjectType::SecretData)),
                Call::Locate(None)
            ]
        );
    }

    #[tokio::test]
    async fn confirmed_destroy_removes_row() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SymmetricKey, "a", State::Deactivated);
        let b = sandbox.add(ObjectType::SymmetricKey, "b", State::Active);
        let mut h = Harness::loaded(sandbox).await;

        h.controller.destroy_selected().unwrap();
        assert_eq!(h.controller.state(), ExplorerState::ActionPending);
        assert_eq!(
            h.controller.prompt().unwrap().question,
            format!("Destroy object {a} ?")
        );
        assert!(h.sandbox.calls().is_empty());

        h.controller.confirm(true);
        h.settle().await;

        assert_eq!(h.ids(), vec![b]);
        assert_eq!(h.controller.state(), ExplorerState::Idle);
        assert_eq!(h.sandbox.calls(), vec![Call::Destroy(a)]);
    }

    #[tokio::test]
    async fn failed_destroy_keeps_row_and_shows_error() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SymmetricKey, "a", State::Deactivated);
        sandbox.fail(CallKind::Destroy, ResultReason::PermissionDenied, "denied");
        let mut h = Harness::loaded(sandbox).await;

        h.controller.destroy_selected().unwrap();
        h.controller.confirm(true);
        h.settle().await;

        assert_eq!(h.ids(), vec![a]);
        assert_eq!(h.controller.state(), ExplorerState::ErrorShown);
        assert_eq!(h.controller.error(), Some("PermissionDenied: denied"));
        let errors = h
            .controller
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, ExplorerEvent::Error(_)))
            .count();
        assert_eq!(errors, 1);

        h.controller.acknowledge_error();
        assert_eq!(h.controller.state(), ExplorerState::Idle);
    }

    #[tokio::test]
    async fn declined_destroy_never_runs() {
        let sandbox = SandboxClient::new();
        sandbox.add(ObjectType::SymmetricKey, "a", State::Deactivated);
        let mut h = Harness::loaded(sandbox).await;

        h.controller.destroy_selected().unwrap();
        h.controller.confirm(false);

        assert_eq!(h.controller.in_flight(), 0);
        assert_eq!(h.controller.state(), ExplorerState::Idle);
        assert!(h.sandbox.calls().is_empty());
        assert_eq!(h.ids().len(), 1);
    }

    #[tokio::test]
    async fn create_aes_key_triggers_full_refresh() {
        let mut h = Harness::loaded(SandboxClient::new()).await;

        h.controller.begin(Operation::Create).unwrap();
        assert_eq!(h.controller.state(), ExplorerState::ActionPending);
        h.controller
            .submit(Effect::create(CreateRequest {
                name: "k1".into(),
                template: KeyTemplate::Aes(AesKeySize::Bits256),
            }))
            .unwrap();
        assert!(h.controller.prompt().is_none());
        h.settle().await;

        let calls = h.sandbox.calls();
        assert_eq!(
            calls[0],
            Call::Create(SymmetricKeySpec {
                name: Some("k1".into()),
                algorithm: CryptographicAlgorithm::Aes,
                length: 256,
                usage: UsageMask::ENCRYPT
                    | UsageMask::DECRYPT
                    | UsageMask::WRAP_KEY
                    | UsageMask::UNWRAP_KEY,
            })
        );
        assert_eq!(calls[1], Call::Locate(None));
        let row = h.controller.directory().rows().next().unwrap().clone();
        assert_eq!(row.name, "k1");
        assert_eq!(row.size, "256");
    }

    #[tokio::test]
    async fn public_key_rekey_fails_without_calls() {
        let sandbox = SandboxClient::new();
        let public = sandbox.add(ObjectType::PublicKey, "pub", State::Active);
        let mut h = Harness::loaded(sandbox).await;
        h.select(&public);

        h.controller.begin(Operation::Rekey).unwrap();
        h.controller
            .submit(Effect::rekey(RekeyRequest::default()))
            .unwrap();
        assert_eq!(
            h.controller.prompt().unwrap().title,
            "Confirm Rekeying"
        );
        h.controller.confirm(true);
        h.settle().await;

        assert_eq!(
            h.controller.error(),
            Some("Cannot rekey a public-key. Please rekey the private-key instead.")
        );
        assert!(h.sandbox.calls().is_empty());
        assert_eq!(h.ids(), vec![public]);
    }

    #[tokio::test]
    async fn activate_refetches_single_object() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SymmetricKey, "a", State::PreActive);
        let mut h = Harness::loaded(sandbox).await;

        h.controller.activate_selected().unwrap();
        h.settle().await;

        assert_eq!(
            h.sandbox.calls(),
            vec![Call::Activate(a.clone()), Call::GetAttributes(a)]
        );
        assert_eq!(h.controller.directory().selected_row().unwrap().state, "Active");
    }

    /// Whether `object` now points at a replacement key.
    fn has_replacement(object: &AttributeSet) -> bool {
        object.attributes.iter().any(|a| {
            matches!(
                &a.value,
                AttributeValue::Link(link) if link.kind == LinkType::ReplacementObjectLink
            )
        })
    }

    #[tokio::test]
    async fn revoke_refetches_and_patches_state() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        let b = sandbox.add(ObjectType::SymmetricKey, "b", State::Active);
        let mut h = Harness::loaded(sandbox).await;

        h.controller.begin(Operation::Revoke).unwrap();
        h.controller
            .submit(Effect::revoke(RevokeRequest::new(
                RevocationReason::CessationOfOperation,
                "retired",
            )))
            .unwrap();
        assert!(h.controller.prompt().is_some());
        h.controller.confirm(true);
        h.settle().await;

        assert_eq!(
            h.sandbox.calls(),
            vec![
                Call::Revoke {
                    id: a.clone(),
                    reason: RevocationReason::CessationOfOperation,
                },
                Call::GetAttributes(a.clone()),
            ]
        );
        assert_eq!(h.ids(), vec![a, b]);
        let row = h.controller.directory().selected_row().unwrap();
        assert_eq!(row.state, "Deactivated");
        assert!(
            h.controller
                .directory()
                .selection()
                .unwrap()
                .primary(names::REVOCATION_REASON)
                .is_some()
        );
        assert_eq!(h.controller.state(), ExplorerState::Idle);
    }

    #[tokio::test]
    async fn symmetric_rekey_refetches_old_key_only() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        let mut h = Harness::loaded(sandbox).await;
        assert!(!has_replacement(h.controller.directory().selection().unwrap()));

        h.controller.begin(Operation::Rekey).unwrap();
        h.controller
            .submit(Effect::rekey(RekeyRequest::default()))
            .unwrap();
        h.controller.confirm(true);
        h.settle().await;

        assert_eq!(
            h.sandbox.calls(),
            vec![
                Call::Rekey {
                    id: a.clone(),
                    offset_days: None,
                },
                Call::GetAttributes(a.clone()),
            ]
        );
        // The replacement only shows up on the next full refresh.
        assert_eq!(h.ids(), vec![a]);
        assert!(has_replacement(h.controller.directory().selection().unwrap()));
    }

    #[tokio::test]
    async fn private_key_rekey_replaces_the_pair() {
        let sandbox = SandboxClient::new();
        let private = sandbox.add(ObjectType::PrivateKey, "signer", State::Active);
        let mut h = Harness::loaded(sandbox).await;

        h.controller.begin(Operation::Rekey).unwrap();
        h.controller
            .submit(Effect::rekey(RekeyRequest {
                offset_days: Some(3),
            }))
            .unwrap();
        h.controller.confirm(true);
        h.settle().await;

        assert_eq!(
            h.sandbox.calls(),
            vec![
                Call::RekeyKeyPair {
                    id: private.clone(),
                    offset_days: Some(3),
                },
                Call::GetAttributes(private.clone()),
            ]
        );
        assert_eq!(h.ids(), vec![private]);
        assert!(has_replacement(h.controller.directory().selection().unwrap()));
        assert_eq!(h.controller.error(), None);
    }

    #[tokio::test]
    async fn register_triggers_full_refresh() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        let mut h = Harness::loaded(sandbox).await;

        h.controller.begin(Operation::Register).unwrap();
        h.controller
            .submit(Effect::register(RegisterRequest {
                name: "db-password".into(),
                payload: RegisterPayload::Secret {
                    value: SecretString::from(String::from("hunter2")),
                    base64: false,
                },
            }))
            .unwrap();
        assert!(h.controller.prompt().is_none());
        h.settle().await;

        let calls = h.sandbox.calls();
        assert_eq!(calls[0], Call::Register(ObjectType::SecretData));
        assert_eq!(calls[1], Call::Locate(None));

        let ids = h.ids();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], a);
        let names: Vec<String> = h
            .controller
            .directory()
            .rows()
            .map(|r| r.name.clone())
            .collect();
        assert!(names.contains(&"db-password".to_owned()));
        assert_eq!(h.controller.directory().selection().unwrap().id, a);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_row_and_shows_error() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SymmetricKey, "a", State::PreActive);
        let mut h = Harness::loaded(sandbox).await;
        let before = h.controller.directory().objects().to_vec();
        h.sandbox
            .fail(CallKind::GetAttributes, ResultReason::ItemNotFound, "gone");

        h.controller.activate_selected().unwrap();
        h.settle().await;

        assert_eq!(
            h.sandbox.calls(),
            vec![Call::Activate(a.clone()), Call::GetAttributes(a)]
        );
        assert_eq!(h.controller.directory().objects(), before.as_slice());
        assert_eq!(
            h.controller.directory().selected_row().unwrap().state,
            "PreActive"
        );
        assert_eq!(h.controller.state(), ExplorerState::ErrorShown);
        assert_eq!(h.controller.error(), Some("ItemNotFound: gone"));
    }

    #[tokio::test]
    async fn cancelled_form_returns_to_idle() {
        let sandbox = SandboxClient::new();
        sandbox.add(ObjectType::SymmetricKey, "a", State::Active);
        let mut h = Harness::loaded(sandbox).await;

        h.controller.begin(Operation::Revoke).unwrap();
        assert_eq!(h.controller.soliciting(), Some(Operation::Revoke));
        h.controller.cancel();
        assert_eq!(h.controller.state(), ExplorerState::Idle);
        assert!(matches!(
            h.controller.submit(Effect::destroy()),
            Err(CoreError::NoPendingAction(Operation::Destroy))
        ));
    }

    #[tokio::test]
    async fn targeted_action_requires_selection() {
        let mut h = Harness::loaded(SandboxClient::new()).await;
        assert!(matches!(
            h.controller.destroy_selected(),
            Err(CoreError::NoSelection)
        ));
        assert!(matches!(
            h.controller.fetch_material(),
            Err(CoreError::NoSelection)
        ));
        assert_eq!(h.controller.state(), ExplorerState::Idle);
    }

    #[tokio::test]
    async fn material_is_delivered_as_event() {
        let sandbox = SandboxClient::new();
        let a = sandbox.add(ObjectType::SecretData, "pw", State::Active);
        let mut h = Harness::loaded(sandbox).await;

        h.controller.fetch_material().unwrap();
        h.settle().await;

        let material = h.controller.take_events().into_iter().find_map(|e| match e {
            ExplorerEvent::Material { id, object } => Some((id, object)),
            _ => None,
        });
        let (id, object) = material.unwrap();
        assert_eq!(id, a);
        assert_eq!(object.object_type(), ObjectType::SecretData);
        assert_eq!(h.ids().len(), 1);
    }

    #[test]
    fn latest_arriving_refresh_wins() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut controller =
            ExplorerController::new(Arc::new(SandboxClient::new()), &ExplorerConfig::default(), tx);
        let object = |id: &str| AttributeSet::new(id, vec![]);

        controller.apply(Update::Loaded {
            objects: vec![object("new")],
            reset_selection: true,
        });
        controller.apply(Update::Loaded {
            objects: vec![object("stale-1"), object("stale-2")],
            reset_selection: true,
        });

        let ids: Vec<&str> = controller
            .directory()
            .objects()
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["stale-1", "stale-2"]);
    }
}
