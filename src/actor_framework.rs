use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::error::{EngineError, EngineResult};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any stored record must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    // --- Custom Actions ---
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Record kind used in logs and `NotFound` messages
    const KIND: &'static str;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and Payload
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> EngineResult<Self>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> EngineResult<()> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> EngineResult<()>;
    fn on_delete(&self) -> EngineResult<()> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a record-local domain action.
    ///
    /// Runs inside the owning actor, so the read-check-write it performs is
    /// atomic with respect to every other request for the same store.
    /// Mutations made before returning an error are kept.
    fn handle_action(&mut self, action: Self::Action) -> EngineResult<Self::ActionResult>;
}

/// Filter passed to `find`. Evaluated inside the actor against every record.
pub struct Predicate<T>(Box<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Predicate<T> {
    pub fn new(f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.0)(item)
    }
}

impl<T> Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<EngineResult<T>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Find {
        filter: Predicate<T>,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Serves requests until every client handle has been dropped.
    #[instrument(name = "resource_actor", fields(kind = T::KIND), skip(self))]
    pub async fn run(mut self) {
        info!("Resource actor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_create(payload));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::Find { filter, respond_to } => {
                    let items: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| filter.matches(item))
                        .cloned()
                        .collect();
                    debug!(matched = items.len(), "Find completed");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let result = match self.store.get_mut(&id) {
                        Some(item) => item.on_update(patch).map(|_| item.clone()),
                        None => Err(EngineError::not_found(T::KIND, &id)),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let result = match self.store.get_mut(&id) {
                        Some(item) => item.handle_action(action),
                        None => Err(EngineError::not_found(T::KIND, &id)),
                    };
                    let _ = respond_to.send(result);
                }
            }
        }

        info!("Resource actor stopped");
    }

    fn handle_create(&mut self, payload: T::CreatePayload) -> EngineResult<T> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create(id.clone(), payload)?;
        item.on_create()?;
        self.store.insert(id.clone(), item.clone());
        debug!(id = %id, "Record created");
        Ok(item)
    }

    fn handle_delete(&mut self, id: T::Id) -> EngineResult<()> {
        let Some(item) = self.store.get(&id) else {
            return Err(EngineError::not_found(T::KIND, &id));
        };
        item.on_delete()?;
        self.store.remove(&id);
        warn!(id = %id, "Record deleted");
        Ok(())
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Debug)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> EngineResult<R> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| EngineError::Storage(format!("{} actor closed", T::KIND)))?;
        response
            .await
            .map_err(|_| EngineError::Storage(format!("{} actor dropped", T::KIND)))?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> EngineResult<T> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> EngineResult<Option<T>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    /// Like `get`, but an unknown id is a `NotFound` error.
    pub async fn fetch(&self, id: T::Id) -> EngineResult<T> {
        let missing = EngineError::not_found(T::KIND, &id);
        self.get(id).await?.ok_or(missing)
    }

    pub async fn find(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> EngineResult<Vec<T>> {
        let filter = Predicate::new(filter);
        self.request(|respond_to| ResourceRequest::Find { filter, respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> EngineResult<T> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await
    }

    pub async fn delete(&self, id: T::Id) -> EngineResult<()> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> EngineResult<T::ActionResult> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to })
            .await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        id: String,
        label: String,
        hits: u32,
        limit: u32,
    }

    #[derive(Debug)]
    struct CounterCreate {
        label: String,
        limit: u32,
    }

    #[derive(Debug)]
    struct CounterPatch {
        label: Option<String>,
    }

    #[derive(Debug)]
    enum CounterAction {
        Hit,
    }

    impl Entity for Counter {
        type Id = String;
        type CreatePayload = CounterCreate;
        type Patch = CounterPatch;
        type Action = CounterAction;
        type ActionResult = u32;

        const KIND: &'static str = "counter";

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create(id: String, payload: CounterCreate) -> EngineResult<Self> {
            if payload.label.is_empty() {
                return Err(EngineError::ValidationFailed("label required".into()));
            }
            Ok(Self {
                id,
                label: payload.label,
                hits: 0,
                limit: payload.limit,
            })
        }

        fn on_update(&mut self, patch: CounterPatch) -> EngineResult<()> {
            if let Some(label) = patch.label {
                self.label = label;
            }
            Ok(())
        }

        fn handle_action(&mut self, action: CounterAction) -> EngineResult<u32> {
            match action {
                CounterAction::Hit if self.hits < self.limit => {
                    self.hits += 1;
                    Ok(self.hits)
                }
                CounterAction::Hit => Err(EngineError::ValidationFailed("limit reached".into())),
            }
        }
    }

    fn start() -> ResourceClient<Counter> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("counter_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_crud_and_find() {
        let client = start();

        let a = client.create(CounterCreate { label: "a".into(), limit: 1 }).await.unwrap();
        let b = client.create(CounterCreate { label: "b".into(), limit: 5 }).await.unwrap();
        assert_eq!(a.id, "counter_1");
        assert_eq!(b.id, "counter_2");

        let big = client.find(|c: &Counter| c.limit > 2).await.unwrap();
        assert_eq!(big.len(), 1);
        assert_eq!(big[0].label, "b");

        let renamed = client
            .update(a.id.clone(), CounterPatch { label: Some("renamed".into()) })
            .await
            .unwrap();
        assert_eq!(renamed.label, "renamed");

        client.delete(a.id.clone()).await.unwrap();
        assert!(client.get(a.id.clone()).await.unwrap().is_none());
        assert!(matches!(client.fetch(a.id).await, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_validation_is_propagated() {
        let client = start();
        let result = client.create(CounterCreate { label: String::new(), limit: 1 }).await;
        assert_eq!(result, Err(EngineError::ValidationFailed("label required".into())));
    }

    #[tokio::test]
    async fn test_concurrent_actions_are_serialized() {
        let client = start();
        let counter = client.create(CounterCreate { label: "c".into(), limit: 3 }).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let client = client.clone();
            let id = counter.id.clone();
            tasks.push(tokio::spawn(async move {
                client.perform_action(id, CounterAction::Hit).await
            }));
        }

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 3);
        assert_eq!(client.fetch(counter.id).await.unwrap().hits, 3);
    }

    #[tokio::test]
    async fn test_unknown_action_target() {
        let client = start();
        let result = client.perform_action("missing".into(), CounterAction::Hit).await;
        assert_eq!(result, Err(EngineError::NotFound("counter missing".into())));
    }
}
