//! Capability discovery.
//!
//! The [`CapabilityRegistry`] is built once at startup from a list of
//! resource roots and the factories registered in code. Manifests under
//! each root select which registered implementations take part, and in
//! which order. Every entry is instantiated independently: an entry that
//! cannot be instantiated is reported as an [`InstantiationFailure`] and
//! never prevents the remaining entries from being produced.
//!
//! ```ignore
//! let mut builder = RegistryBuilder::new().resource_root("plugins");
//! builder.register::<dyn Greeter, _>("com.x.FooGreeter", || Ok(Box::new(FooGreeter)));
//! let registry = builder.build()?;
//!
//! for greeter in registry.discover::<dyn Greeter>().lenient() {
//!     println!("{}", greeter.greet());
//! }
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use crate::domain::errors::{DiscoveryError, InstantiationCause, InstantiationFailure};
use crate::domain::models::{
    DiscoveryConfig, DiscoveryPolicy, ImplementationId, ManifestCandidate, ManifestOrigin,
};
use crate::domain::ports::{Capability, Factory};
use crate::services::manifest_index::{ManifestIndex, UnreadableManifest};

type ErasedBox = Box<dyn Any + Send + Sync>;

/// (capability name, canonical implementation identity)
type ImplementationKey = (String, String);

/// Collects resource roots, options and factories for a [`CapabilityRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    roots: Vec<PathBuf>,
    options: DiscoveryConfig,
    factories: HashMap<ImplementationKey, ErasedBox>,
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("roots", &self.roots)
            .field("options", &self.options)
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RegistryBuilder {
    /// Builder with no roots, default options and no factories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource root; roots are scanned in the order added.
    #[must_use]
    pub fn resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Append several resource roots.
    #[must_use]
    pub fn resource_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots.extend(roots.into_iter().map(Into::into));
        self
    }

    /// Discovery options (cache, failure policy, timeout).
    #[must_use]
    pub fn options(mut self, options: DiscoveryConfig) -> Self {
        self.options = options;
        self
    }

    /// Register the factory for `implementation` of capability `C`.
    ///
    /// `implementation` is matched against manifest lines; `a.b.C` and
    /// `a::b::C` name the same implementation. Registering the same
    /// implementation again replaces the earlier factory.
    pub fn register<C, F>(&mut self, implementation: &str, factory: F) -> &mut Self
    where
        C: Capability + ?Sized,
        F: Fn() -> anyhow::Result<Box<C>> + Send + Sync + 'static,
    {
        let key = (C::NAME.to_string(), implementation.trim().replace("::", "."));
        let factory: Factory<C> = Arc::new(factory);
        if self.factories.insert(key, Box::new(factory)).is_some() {
            tracing::debug!(
                capability = C::NAME,
                implementation,
                "Replacing registered factory"
            );
        }
        self
    }

    /// Scan the resource roots and build the registry.
    pub fn build(self) -> Result<CapabilityRegistry, DiscoveryError> {
        let index = ManifestIndex::scan(&self.roots)?;

        tracing::info!(
            roots = self.roots.len(),
            factories = self.factories.len(),
            capabilities = index.capabilities().count(),
            cache = self.options.cache,
            "Capability registry built"
        );

        Ok(CapabilityRegistry {
            roots: self.roots,
            options: self.options,
            factories: self.factories,
            index: RwLock::new(Arc::new(index)),
            cache: Mutex::new(HashMap::new()),
        })
    }
}

/// Discovers and instantiates capability implementations.
pub struct CapabilityRegistry {
    roots: Vec<PathBuf>,
    options: DiscoveryConfig,
    factories: HashMap<ImplementationKey, ErasedBox>,
    index: RwLock<Arc<ManifestIndex>>,
    cache: Mutex<HashMap<ImplementationKey, ErasedBox>>,
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("roots", &self.roots)
            .field("options", &self.options)
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl CapabilityRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Lazily discover every implementation of `C`.
    ///
    /// Each step of the returned iterator instantiates one manifest entry.
    /// The sequence is finite and can be restarted by calling `discover`
    /// again; without caching every run builds fresh instances.
    pub fn discover<C: Capability + ?Sized>(&self) -> Discovery<'_, C> {
        Discovery {
            registry: self,
            index: self.snapshot(),
            position: 0,
            _capability: PhantomData,
        }
    }

    /// Discover `C` applying the configured failure policy.
    pub fn providers<C: Capability + ?Sized>(&self) -> Result<Vec<Provider<C>>, DiscoveryError> {
        self.discover::<C>().with_policy(self.options.policy)
    }

    /// Run `f` over a discovery of `C` on the blocking pool, giving up
    /// after `timeout`.
    ///
    /// A discovery that overruns keeps running on its worker thread; its
    /// result is discarded.
    pub async fn discover_within<C, T, F>(
        self: &Arc<Self>,
        timeout: Duration,
        f: F,
    ) -> Result<T, DiscoveryError>
    where
        C: Capability + ?Sized,
        F: FnOnce(Discovery<'_, C>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let registry = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || f(registry.discover::<C>()));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(join_error)) => Err(DiscoveryError::Worker(join_error.to_string())),
            Err(_) => {
                tracing::warn!(
                    capability = C::NAME,
                    after = ?timeout,
                    "Capability discovery timed out"
                );
                Err(DiscoveryError::TimedOut {
                    capability: C::NAME.to_string(),
                    after: timeout,
                })
            }
        }
    }

    /// [`providers`](Self::providers) bounded by `timeout`.
    pub async fn providers_within<C: Capability + ?Sized>(
        self: &Arc<Self>,
        timeout: Duration,
    ) -> Result<Vec<Provider<C>>, DiscoveryError> {
        let policy = self.options.policy;
        self.discover_within::<C, _, _>(timeout, move |discovery| discovery.with_policy(policy))
            .await?
    }

    /// Deadline configured for [`providers_within`](Self::providers_within).
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.options.timeout_ms)
    }

    /// Re-walk the resource roots and replace the manifest index.
    ///
    /// Discoveries already in progress keep the index they started with.
    pub fn refresh(&self) -> Result<(), DiscoveryError> {
        let index = Arc::new(ManifestIndex::scan(&self.roots)?);
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = index;
        tracing::debug!(roots = self.roots.len(), "Capability manifests refreshed");
        Ok(())
    }

    /// Capability names that have at least one manifest.
    pub fn capabilities(&self) -> Vec<String> {
        self.snapshot().capabilities().map(str::to_string).collect()
    }

    /// Resource roots in scan order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Discovery options.
    pub fn options(&self) -> &DiscoveryConfig {
        &self.options
    }

    fn snapshot(&self) -> Arc<ManifestIndex> {
        Arc::clone(&self.index.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn instantiate<C: Capability + ?Sized>(
        &self,
        candidate: &ManifestCandidate,
    ) -> Result<Provider<C>, InstantiationFailure> {
        let failure = |cause| InstantiationFailure {
            capability: C::NAME.to_string(),
            implementation: candidate.raw.clone(),
            origin: candidate.origin.clone(),
            cause,
        };

        let Some(id) = &candidate.id else {
            return Err(failure(InstantiationCause::MalformedIdentity));
        };
        let key = (C::NAME.to_string(), id.canonical());
        let provider = |instance: Arc<C>| Provider {
            implementation: id.clone(),
            origin: candidate.origin.clone(),
            instance,
        };

        if self.options.cache {
            if let Some(instance) = self.cached::<C>(&key) {
                return Ok(provider(instance));
            }
        }

        let factory = self
            .factories
            .get(&key)
            .and_then(|erased| erased.downcast_ref::<Factory<C>>())
            .ok_or_else(|| failure(InstantiationCause::UnknownImplementation))?;

        let instance: Arc<C> = match panic::catch_unwind(AssertUnwindSafe(factory.as_ref())) {
            Ok(Ok(instance)) => Arc::from(instance),
            Ok(Err(e)) => {
                return Err(failure(InstantiationCause::ConstructorFailed(format!("{e:#}"))));
            }
            Err(payload) => {
                return Err(failure(InstantiationCause::Panicked(panic_message(&*payload))));
            }
        };

        let instance = if self.options.cache {
            self.cache_instance(key, instance)
        } else {
            instance
        };

        tracing::debug!(capability = C::NAME, implementation = %id, "Instantiated provider");
        Ok(provider(instance))
    }

    fn cached<C: Capability + ?Sized>(&self, key: &ImplementationKey) -> Option<Arc<C>> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(key)
            .and_then(|erased| erased.downcast_ref::<Arc<C>>())
            .cloned()
    }

    /// Keep `instance` unless another discovery cached one first.
    fn cache_instance<C: Capability + ?Sized>(
        &self,
        key: ImplementationKey,
        instance: Arc<C>,
    ) -> Arc<C> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let erased = cache
            .entry(key)
            .or_insert_with(|| Box::new(Arc::clone(&instance)) as ErasedBox);
        erased.downcast_ref::<Arc<C>>().cloned().unwrap_or(instance)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// An instantiated implementation together with where it was declared.
pub struct Provider<C: ?Sized> {
    implementation: ImplementationId,
    origin: ManifestOrigin,
    instance: Arc<C>,
}

impl<C: ?Sized> Provider<C> {
    /// Implementation identity as written in the manifest.
    pub fn implementation(&self) -> &ImplementationId {
        &self.implementation
    }

    /// Manifest file and line that selected this implementation.
    pub fn origin(&self) -> &ManifestOrigin {
        &self.origin
    }

    /// Shared handle to the instance.
    pub fn instance(&self) -> &Arc<C> {
        &self.instance
    }

    /// Take the instance, dropping the metadata.
    pub fn into_instance(self) -> Arc<C> {
        self.instance
    }
}

impl<C: ?Sized> Deref for Provider<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.instance
    }
}

impl<C: ?Sized> Clone for Provider<C> {
    fn clone(&self) -> Self {
        Self {
            implementation: self.implementation.clone(),
            origin: self.origin.clone(),
            instance: Arc::clone(&self.instance),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Provider<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("implementation", &self.implementation)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Lazy discovery of one capability; see [`CapabilityRegistry::discover`].
pub struct Discovery<'a, C: ?Sized> {
    registry: &'a CapabilityRegistry,
    index: Arc<ManifestIndex>,
    position: usize,
    _capability: PhantomData<fn() -> Box<C>>,
}

impl<C: ?Sized> Clone for Discovery<'_, C> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry,
            index: Arc::clone(&self.index),
            position: self.position,
            _capability: PhantomData,
        }
    }
}

impl<C: ?Sized> fmt::Debug for Discovery<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discovery")
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl<C: Capability + ?Sized> Iterator for Discovery<'_, C> {
    type Item = Result<Provider<C>, InstantiationFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        let unreadable = self.index.unreadable(C::NAME);
        let position = self.position;

        let item = match unreadable.get(position) {
            Some(manifest) => Err(unreadable_failure::<C>(manifest)),
            None => {
                let candidate = self
                    .index
                    .candidates(C::NAME)
                    .get(position - unreadable.len())?;
                self.registry.instantiate::<C>(candidate)
            }
        };
        self.position += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = self.index.unreadable(C::NAME).len() + self.index.candidates(C::NAME).len();
        let remaining = total.saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

/// Unreadable manifests are reported ahead of the entries that could be read.
fn unreadable_failure<C: Capability + ?Sized>(
    manifest: &UnreadableManifest,
) -> InstantiationFailure {
    InstantiationFailure {
        capability: C::NAME.to_string(),
        implementation: String::new(),
        origin: ManifestOrigin {
            path: manifest.path.clone(),
            line: 0,
        },
        cause: InstantiationCause::UnreadableManifest(manifest.reason.clone()),
    }
}

impl<C: Capability + ?Sized> ExactSizeIterator for Discovery<'_, C> {}

impl<'a, C: Capability + ?Sized> Discovery<'a, C> {
    /// Skip entries that fail, logging each with `tracing::warn!`.
    pub fn lenient(self) -> impl Iterator<Item = Provider<C>> + 'a {
        self.filter_map(|result| match result {
            Ok(provider) => Some(provider),
            Err(failure) => {
                tracing::warn!(
                    capability = %failure.capability,
                    implementation = %failure.implementation,
                    origin = %failure.origin,
                    error = %failure.cause,
                    "Skipping capability implementation"
                );
                None
            }
        })
    }

    /// Collect every provider, stopping at the first failure.
    pub fn strict(self) -> Result<Vec<Provider<C>>, DiscoveryError> {
        self.collect::<Result<Vec<_>, _>>().map_err(DiscoveryError::from)
    }

    /// Lenient or strict collection, as `policy` says.
    pub fn with_policy(self, policy: DiscoveryPolicy) -> Result<Vec<Provider<C>>, DiscoveryError> {
        match policy {
            DiscoveryPolicy::Lenient => Ok(self.lenient().collect()),
            DiscoveryPolicy::Strict => self.strict(),
        }
    }

    /// Run the whole discovery, keeping successes and failures apart.
    pub fn report(self) -> DiscoveryReport<C> {
        let mut report = DiscoveryReport {
            providers: Vec::new(),
            failures: Vec::new(),
        };
        for result in self {
            match result {
                Ok(provider) => report.providers.push(provider),
                Err(failure) => report.failures.push(failure),
            }
        }
        report
    }
}

/// Outcome of a full discovery run.
pub struct DiscoveryReport<C: ?Sized> {
    /// Successfully instantiated implementations, in discovery order.
    pub providers: Vec<Provider<C>>,
    /// Entries that could not be instantiated, in discovery order.
    pub failures: Vec<InstantiationFailure>,
}

impl<C: ?Sized> fmt::Debug for DiscoveryReport<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryReport")
            .field("providers", &self.providers)
            .field("failures", &self.failures)
            .finish()
    }
}
