//! Time-based UUID generator and its configuration.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    node::{HardwareAddress, NodeResolver},
    random::{self, ErrorPolicy, RandomSource},
    sequence::{self, State},
    store::{PersistedState, StateStore},
    timestamp::{self, Spinner, TimeSource},
    Domain, Error, Node, Uuid,
};

/// Collaborators of a [`Generator`], fixed when the generator is created.
///
/// Every setting has a default: the system clock behind a [`Spinner`], the first hardware address
/// of the host, the operating system CSPRNG, a policy that panics on CSPRNG failure and no state
/// store.
///
/// # Examples
///
/// ```rust
/// use rfc4122::{store::MemoryStore, Generator, GeneratorConfig, Node};
///
/// let g = Generator::new(
///     GeneratorConfig::default()
///         .with_resolution(512)
///         .with_node(Node::from_bytes([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6]))
///         .with_store(MemoryStore::default()),
/// );
/// println!("{}", g.new_v1());
/// ```
pub struct GeneratorConfig {
    time: Option<Box<dyn TimeSource>>,
    resolution: u32,
    nodes: Box<dyn NodeResolver>,
    random: Box<dyn RandomSource>,
    policy: ErrorPolicy,
    store: Option<Box<dyn StateStore>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            time: None,
            resolution: timestamp::DEFAULT_RESOLUTION,
            nodes: Box::new(HardwareAddress),
            random: Box::new(random::os_random()),
            policy: Box::new(random::abort_on_error),
            store: None,
        }
    }
}

impl GeneratorConfig {
    /// Replaces the default [`Spinner`] with another time source; the resolution is then ignored.
    pub fn with_time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.time = Some(Box::new(time));
        self
    }

    /// Sets the spin resolution of the default [`Spinner`]. Zero selects the default.
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = match resolution {
            0 => timestamp::DEFAULT_RESOLUTION,
            n => n,
        };
        self
    }

    /// Replaces the hardware address lookup.
    pub fn with_node_resolver(mut self, nodes: impl NodeResolver + 'static) -> Self {
        self.nodes = Box::new(nodes);
        self
    }

    /// Uses a fixed node.
    pub fn with_node(self, node: Node) -> Self {
        self.with_node_resolver(crate::node::FixedNode(Some(node)))
    }

    /// Replaces the operating system CSPRNG.
    pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    /// Replaces the policy consulted when the random source fails; returning `true` retries the
    /// read once.
    pub fn with_error_policy(
        mut self,
        policy: impl FnMut(&rand::Error) -> bool + Send + 'static,
    ) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Persists the generator state to `store`.
    pub fn with_store(mut self, store: impl StateStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }
}

/// Represents a generator of time-based (version 1), DCE security (version 2) and random (version
/// 4) UUIDs that share one node, clock sequence and timestamp history.
///
/// The generator initializes itself once, on [`init`](Generator::init) or the first time-based
/// UUID. It loads the saved state from the configured store, looks up the node and settles the
/// clock sequence: a fresh random sequence if nothing was saved or the node changed, the saved
/// sequence plus one if the clock is behind the saved timestamp, or the saved sequence otherwise.
/// Each time-based UUID then takes the next timestamp and increments the clock sequence whenever
/// that timestamp does not exceed the previous one.
///
/// Initialization failures do not stop generation. They are kept until read with
/// [`take_error`](Generator::take_error), and the generator goes on with an all-zero node and
/// sequence. A store that fails to load is dropped and reported the same way, with the generator
/// otherwise initialized as if nothing was saved.
///
/// The generator is `Sync`; share it by reference or in an `Arc` to get process-wide uniqueness.
///
/// # Examples
///
/// ```rust
/// use rfc4122::{Domain, Generator, GeneratorConfig};
///
/// let g = Generator::new(GeneratorConfig::default());
/// g.init()?;
/// println!("{}", g.new_v1());
/// println!("{}", g.new_v2(Domain::User, Domain::User.local_id()));
/// # Ok::<(), rfc4122::Error>(())
/// ```
pub struct Generator {
    inner: Mutex<Inner>,

    /// Locked before `inner` whenever both are needed.
    store: Mutex<Option<Box<dyn StateStore>>>,
}

struct Inner {
    state: State,
    initialized: bool,
    error: Option<Error>,
    time: Box<dyn TimeSource>,
    nodes: Box<dyn NodeResolver>,
    random: Box<dyn RandomSource>,
    policy: ErrorPolicy,
}

impl Generator {
    /// Creates a generator instance. Nothing is read until the generator initializes.
    pub fn new(config: GeneratorConfig) -> Self {
        let time: Box<dyn TimeSource> = match config.time {
            Some(time) => time,
            None => Box::new(Spinner::new(config.resolution)),
        };
        Self {
            inner: Mutex::new(Inner {
                state: State::default(),
                initialized: false,
                error: None,
                time,
                nodes: config.nodes,
                random: config.random,
                policy: config.policy,
            }),
            store: Mutex::new(config.store),
        }
    }

    /// Initializes the generator if it has not been initialized yet, returning the pending
    /// initialization error, if any.
    pub fn init(&self) -> Result<(), Error> {
        self.initialize();
        match self.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns and clears the error recorded during initialization.
    pub fn take_error(&self) -> Option<Error> {
        self.lock_inner().error.take()
    }

    /// Returns `true` once the generator has gone through initialization, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.lock_inner().initialized
    }

    /// Returns the timestamp, clock sequence and node of the last time-based UUID.
    pub fn state(&self) -> State {
        self.lock_inner().state
    }

    /// Generates a new UUIDv1 object.
    pub fn new_v1(&self) -> Uuid {
        let state = self.read();
        Uuid::from_fields_v1(state.timestamp, state.sequence, &state.node)
    }

    /// Generates a new UUIDv2 object for the local identifier `id` in `domain`.
    ///
    /// Use [`Domain::local_id`] to obtain the POSIX user or group ID of the current process.
    pub fn new_v2(&self, domain: Domain, id: u32) -> Uuid {
        let state = self.read();
        Uuid::from_fields_v2(domain, id, state.timestamp, state.sequence, &state.node)
    }

    /// Generates a new UUIDv4 object utilizing the random source inside.
    pub fn new_v4(&self) -> Result<Uuid, Error> {
        let mut bytes = [0u8; 16];
        let mut guard = self.lock_inner();
        let inner = &mut *guard;
        random::fill_with_policy(inner.random.as_mut(), inner.policy.as_mut(), &mut bytes)?;
        Ok(Uuid::from_random_bytes(bytes))
    }

    /// Advances the state under the lock and saves it after releasing the lock.
    fn read(&self) -> State {
        let state = {
            let mut inner = self.lock_inner();
            if !inner.initialized {
                drop(inner);
                self.initialize();
                inner = self.lock_inner();
            }
            let now = inner.time.next();
            inner.state.advance(now);
            inner.state
        };
        self.save();
        state
    }

    /// Runs the one-time initialization. The gate closes only after the work completes; a panic
    /// raised by the error policy leaves the generator uninitialized.
    fn initialize(&self) {
        let mut store = self.lock_store();
        let mut guard = self.lock_inner();
        if guard.initialized {
            return;
        }

        let mut notice = None;
        let persisted = match store.as_mut().map(|s| s.load()) {
            Some(Ok(persisted)) => persisted,
            Some(Err(err)) => {
                log::warn!("rfc4122: could not load saved state; persistence disabled: {}", err);
                notice = Some(Error::Persistence(err));
                None
            }
            None => None,
        };
        let load_failed = notice.is_some();

        let inner = &mut *guard;
        let now = inner.time.next();
        let node = inner.nodes.resolve();
        let result = sequence::initialize(
            persisted.as_ref(),
            now,
            node,
            inner.random.as_mut(),
            inner.policy.as_mut(),
        );
        inner.error = match result {
            Ok(state) => {
                inner.state = state;
                notice
            }
            Err(err) => {
                log::error!("rfc4122: could not initialise generator: {}", err);
                Some(err)
            }
        };
        inner.initialized = true;
        if load_failed {
            *store = None;
        }
    }

    /// Saves the current state, which may already include advances made by other callers.
    fn save(&self) {
        let mut store = self.lock_store();
        if let Some(s) = store.as_mut() {
            let snapshot = PersistedState::from(self.lock_inner().state);
            if let Err(err) = s.save(&snapshot) {
                log::warn!("rfc4122: could not save generator state: {}", err);
            }
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_store(&self) -> MutexGuard<'_, Option<Box<dyn StateStore>>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock_inner();
        f.debug_struct("Generator")
            .field("state", &inner.state)
            .field("initialized", &inner.initialized)
            .field("error", &inner.error)
            .finish_non_exhaustive()
    }
}
