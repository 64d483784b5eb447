//! Integration tests for manifest-driven capability discovery.

mod common;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use husky::{
    Capability, CapabilityRegistry, DiscoveryConfig, DiscoveryError, DiscoveryPolicy,
    InstantiationCause, RegistryBuilder,
};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

impl Capability for dyn Greeter {
    const NAME: &'static str = "Greeter";
}

struct FooGreeter;

impl Greeter for FooGreeter {
    fn greet(&self) -> String {
        "foo".to_string()
    }
}

struct BarGreeter;

impl Greeter for BarGreeter {
    fn greet(&self) -> String {
        "bar".to_string()
    }
}

fn greeters(root: &Path) -> RegistryBuilder {
    let mut builder = RegistryBuilder::new().resource_root(root);
    builder
        .register::<dyn Greeter, _>("com.x.FooGreeter", || Ok(Box::new(FooGreeter)))
        .register::<dyn Greeter, _>("com.x.BarGreeter", || Ok(Box::new(BarGreeter)))
        .register::<dyn Greeter, _>("com.x.BrokenGreeter", || {
            anyhow::bail!("constructor refused to run")
        })
        .register::<dyn Greeter, _>(
            "com.x.PanickingGreeter",
            || -> anyhow::Result<Box<dyn Greeter>> { panic!("constructor panicked") },
        );
    builder
}

fn greetings(registry: &CapabilityRegistry) -> Vec<String> {
    registry
        .discover::<dyn Greeter>()
        .lenient()
        .map(|provider| provider.greet())
        .collect()
}

#[test]
fn test_no_manifest_yields_nothing() {
    let dir = common::temp_dir();
    let registry = greeters(dir.path()).build().unwrap();

    assert_eq!(registry.discover::<dyn Greeter>().count(), 0);
    assert!(registry.providers::<dyn Greeter>().unwrap().is_empty());
}

#[test]
fn test_single_implementation() {
    let dir = common::temp_dir();
    common::write_manifest(dir.path(), "Greeter", &["com.x.FooGreeter"]);
    let registry = greeters(dir.path()).build().unwrap();

    let providers = registry.providers::<dyn Greeter>().unwrap();

    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].implementation().as_str(), "com.x.FooGreeter");
    assert_eq!(providers[0].origin().line, 1);
    assert_eq!(providers[0].greet(), "foo");
}

#[test]
fn test_broken_entry_is_skipped() {
    common::setup_test_logging();
    let dir = common::temp_dir();
    common::write_manifest(
        dir.path(),
        "Greeter",
        &["com.x.FooGreeter", "com.x.BrokenGreeter"],
    );
    let registry = greeters(dir.path()).build().unwrap();

    assert_eq!(greetings(&registry), vec!["foo"]);
}

#[test]
fn test_every_failure_kind_is_isolated() {
    let dir = common::temp_dir();
    common::write_manifest(
        dir.path(),
        "Greeter",
        &[
            "com.x.Missing",
            "com.x.BrokenGreeter",
            "com.x.PanickingGreeter",
            "not a valid identity",
            "com.x.BarGreeter",
        ],
    );
    let registry = greeters(dir.path()).build().unwrap();

    let report = registry.discover::<dyn Greeter>().report();

    assert_eq!(report.providers.len(), 1);
    assert_eq!(report.providers[0].greet(), "bar");
    let causes: Vec<&InstantiationCause> = report.failures.iter().map(|f| &f.cause).collect();
    assert_eq!(causes.len(), 4);
    assert_eq!(causes[0], &InstantiationCause::UnknownImplementation);
    assert!(
        matches!(causes[1], InstantiationCause::ConstructorFailed(msg) if msg.contains("refused"))
    );
    assert!(matches!(causes[2], InstantiationCause::Panicked(msg) if msg.contains("panicked")));
    assert_eq!(causes[3], &InstantiationCause::MalformedIdentity);
    assert_eq!(report.failures[3].origin.line, 4);
}

#[test]
fn test_strict_stops_at_first_failure() {
    let dir = common::temp_dir();
    common::write_manifest(
        dir.path(),
        "Greeter",
        &["com.x.FooGreeter", "com.x.BrokenGreeter", "com.x.BarGreeter"],
    );
    let registry = greeters(dir.path()).build().unwrap();

    let err = registry.discover::<dyn Greeter>().strict().unwrap_err();

    match err {
        DiscoveryError::Instantiation(failure) => {
            assert_eq!(failure.implementation, "com.x.BrokenGreeter");
            assert_eq!(failure.capability, "Greeter");
        }
        other => panic!("expected instantiation failure, got {other:?}"),
    }
}

#[test]
fn test_configured_strict_policy() {
    let dir = common::temp_dir();
    common::write_manifest(dir.path(), "Greeter", &["com.x.Missing"]);
    let options = DiscoveryConfig {
        policy: DiscoveryPolicy::Strict,
        ..DiscoveryConfig::default()
    };
    let registry = greeters(dir.path()).options(options).build().unwrap();

    assert!(registry.providers::<dyn Greeter>().is_err());
}

#[test]
fn test_repeated_discoveries_build_fresh_instances() {
    let dir = common::temp_dir();
    common::write_manifest(dir.path(), "Greeter", &["com.x.FooGreeter", "com.x.BarGreeter"]);
    let registry = greeters(dir.path()).build().unwrap();

    let first = registry.providers::<dyn Greeter>().unwrap();
    let second = registry.providers::<dyn Greeter>().unwrap();

    let ids = |providers: &[husky::Provider<dyn Greeter>]| {
        providers
            .iter()
            .map(|p| p.implementation().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
    for (a, b) in first.iter().zip(&second) {
        assert!(!Arc::ptr_eq(a.instance(), b.instance()));
    }
}

#[test]
fn test_cache_shares_instances() {
    let dir = common::temp_dir();
    common::write_manifest(dir.path(), "Counter", &["t.Counted"]);
    let built = Arc::new(AtomicUsize::new(0));

    let mut builder = RegistryBuilder::new()
        .resource_root(dir.path())
        .options(DiscoveryConfig {
            cache: true,
            ..DiscoveryConfig::default()
        });
    let counter = Arc::clone(&built);
    builder.register::<dyn Greeter, _>("t.Counted", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FooGreeter))
    });
    let registry = builder.build().unwrap();

    // The manifest is for a different capability name
    assert_eq!(registry.discover::<dyn Greeter>().count(), 0);

    common::write_manifest(dir.path(), "Greeter", &["t.Counted"]);
    registry.refresh().unwrap();

    let first = registry.providers::<dyn Greeter>().unwrap();
    let second = registry.providers::<dyn Greeter>().unwrap();

    assert!(Arc::ptr_eq(first[0].instance(), second[0].instance()));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_roots_scanned_in_order_with_dedupe() {
    let first = common::temp_dir();
    let second = common::temp_dir();
    common::write_manifest(first.path(), "Greeter", &["com.x.BarGreeter"]);
    common::write_manifest(
        second.path(),
        "Greeter",
        &["com.x.FooGreeter", "com::x::BarGreeter"],
    );

    let mut builder = RegistryBuilder::new().resource_roots([first.path(), second.path()]);
    builder
        .register::<dyn Greeter, _>("com.x.FooGreeter", || Ok(Box::new(FooGreeter)))
        .register::<dyn Greeter, _>("com.x.BarGreeter", || Ok(Box::new(BarGreeter)));
    let registry = builder.build().unwrap();

    assert_eq!(greetings(&registry), vec!["bar", "foo"]);
}

#[test]
fn test_refresh_picks_up_new_entries() {
    let dir = common::temp_dir();
    common::write_manifest(dir.path(), "Greeter", &["com.x.FooGreeter"]);
    let registry = greeters(dir.path()).build().unwrap();
    assert_eq!(greetings(&registry), vec!["foo"]);

    common::write_manifest(dir.path(), "Greeter", &["com.x.FooGreeter", "com.x.BarGreeter"]);
    assert_eq!(greetings(&registry), vec!["foo"]);

    registry.refresh().unwrap();
    assert_eq!(greetings(&registry), vec!["foo", "bar"]);
}

#[test]
fn test_undecodable_line_is_isolated() {
    let dir = common::temp_dir();
    common::write_file(
        dir.path(),
        "services/Greeter",
        b"com.x.Bar\xffGreeter\ncom.x.FooGreeter\n",
    );
    common::write_file(dir.path(), "services/Other", b"com.x.Caf\xe9\ncom.x.Fine\n");

    let registry = greeters(dir.path()).build().unwrap();
    let report = registry.discover::<dyn Greeter>().report();

    assert_eq!(report.providers.len(), 1);
    assert_eq!(report.providers[0].greet(), "foo");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].cause, InstantiationCause::MalformedIdentity);
    assert_eq!(report.failures[0].origin.line, 1);
    assert_eq!(registry.capabilities(), vec!["Greeter", "Other"]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_manifest_only_affects_its_capability() {
    let dir = common::temp_dir();
    common::write_manifest(dir.path(), "Greeter", &["com.x.FooGreeter"]);
    // Dangling link: listed, but reading it fails
    std::os::unix::fs::symlink(
        dir.path().join("missing-target"),
        dir.path().join("services/Other"),
    )
    .unwrap();

    let registry = greeters(dir.path()).build().unwrap();

    assert_eq!(greetings(&registry), vec!["foo"]);
    assert!(registry.providers::<dyn Greeter>().is_ok());
    registry.refresh().unwrap();
    assert_eq!(greetings(&registry), vec!["foo"]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_manifest_is_reported_for_its_capability() {
    let broken = common::temp_dir();
    let valid = common::temp_dir();
    std::fs::create_dir_all(broken.path().join("services")).unwrap();
    std::os::unix::fs::symlink(
        broken.path().join("missing-target"),
        broken.path().join("services/Greeter"),
    )
    .unwrap();
    common::write_manifest(valid.path(), "Greeter", &["com.x.BarGreeter"]);

    let registry = greeters(valid.path())
        .resource_root(broken.path())
        .build()
        .unwrap();

    assert_eq!(registry.discover::<dyn Greeter>().len(), 2);

    let report = registry.discover::<dyn Greeter>().report();
    assert_eq!(report.providers.len(), 1);
    assert_eq!(report.providers[0].greet(), "bar");
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].cause,
        InstantiationCause::UnreadableManifest(_)
    ));
    assert_eq!(greetings(&registry), vec!["bar"]);

    let err = registry.discover::<dyn Greeter>().strict().unwrap_err();
    assert!(matches!(
        err,
        DiscoveryError::Instantiation(ref failure)
            if matches!(failure.cause, InstantiationCause::UnreadableManifest(_))
    ));
}

#[tokio::test]
async fn test_providers_within_deadline() {
    let dir = common::temp_dir();
    common::write_manifest(dir.path(), "Greeter", &["com.x.FooGreeter"]);
    let registry = Arc::new(greeters(dir.path()).build().unwrap());

    let providers = registry
        .providers_within::<dyn Greeter>(Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(providers.len(), 1);
}

#[tokio::test]
async fn test_providers_within_times_out() {
    let dir = common::temp_dir();
    common::write_manifest(dir.path(), "Greeter", &["t.Slow"]);
    let release = Arc::new(Barrier::new(2));

    let mut builder = RegistryBuilder::new().resource_root(dir.path());
    let gate = Arc::clone(&release);
    builder.register::<dyn Greeter, _>("t.Slow", move || {
        gate.wait();
        Ok(Box::new(FooGreeter))
    });
    let registry = Arc::new(builder.build().unwrap());

    let err = registry
        .providers_within::<dyn Greeter>(Duration::from_millis(50))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DiscoveryError::TimedOut { ref capability, .. } if capability == "Greeter"
    ));
    // Let the abandoned worker finish
    release.wait();
}
