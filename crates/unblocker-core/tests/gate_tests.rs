//! Integration tests for bypass decisions

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::time::Instant;
use unblocker_core::{
    AllowSets, Config, Decision, Error, Gate, Metadata, NoopResolver, ReverseResolver, HOSTNAME_KEY,
};

mod test_helpers {
    use super::*;

    /// What a stub resolver answers with
    #[derive(Clone)]
    pub enum Answer {
        Names(Vec<&'static str>),
        Fail,
        Hang,
    }

    /// Resolver with a canned answer that counts calls
    pub struct StubResolver {
        answer: Answer,
        pub calls: AtomicUsize,
    }

    impl StubResolver {
        pub fn new(answer: Answer) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReverseResolver for StubResolver {
        async fn reverse_lookup(&self, ip: IpAddr) -> unblocker_core::Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.answer {
                Answer::Names(names) => Ok(names.iter().map(|n| n.to_string()).collect()),
                Answer::Fail => Err(Error::reverse_lookup(ip, "SERVFAIL")),
                Answer::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    pub const ALLOWLIST: &str = "\
# bypass devices
203.0.113.5
2001:db8::5
AA:BB:CC:DD:EE:FF
laptop.local
";

    pub fn gate(resolver: Arc<StubResolver>) -> Gate {
        Gate::with_allowlist(AllowSets::parse(ALLOWLIST), resolver)
    }

    pub fn v4(d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(203, 0, 113, d))
    }
}

use test_helpers::*;

// ============ Disabled gate ============

#[tokio::test]
async fn test_disabled_gate_always_continues() {
    let resolver = StubResolver::new(Answer::Names(vec!["laptop.local."]));
    let gate = Gate::new(None, resolver.clone()).unwrap();

    let md = Metadata::new()
        .with_mac("aa:bb:cc:dd:ee:ff")
        .with_hostname("laptop.local");
    assert_eq!(gate.decide(v4(5), &md).await, Decision::Continue);
    assert_eq!(gate.decide(v4(77), &()).await, Decision::Continue);
    assert_eq!(resolver.calls(), 0);
}

// ============ Direct attributes ============

#[tokio::test]
async fn test_allowlisted_ip_bypasses_without_hints() {
    let resolver = StubResolver::new(Answer::Fail);
    let gate = gate(resolver.clone());

    assert_eq!(gate.decide(v4(5), &()).await, Decision::Bypass);
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_allowlisted_ipv6_bypasses() {
    let resolver = StubResolver::new(Answer::Fail);
    let gate = gate(resolver);

    let ip = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 5));
    assert_eq!(gate.decide(ip, &()).await, Decision::Bypass);
}

#[tokio::test]
async fn test_ipv4_mapped_client_bypasses() {
    let resolver = StubResolver::new(Answer::Fail);
    let gate = gate(resolver.clone());

    let mapped = IpAddr::V6(Ipv4Addr::new(203, 0, 113, 5).to_ipv6_mapped());
    assert_eq!(gate.decide(mapped, &()).await, Decision::Bypass);
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_mixed_case_mac_bypasses() {
    let resolver = StubResolver::new(Answer::Fail);
    let gate = gate(resolver.clone());

    let md = Metadata::new().with_mac("Aa:Bb:Cc:Dd:Ee:Ff");
    assert_eq!(gate.decide(v4(77), &md).await, Decision::Bypass);
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_upper_case_metadata_hostname_bypasses() {
    let resolver = StubResolver::new(Answer::Fail);
    let gate = gate(resolver.clone());

    let mut md = HashMap::new();
    md.insert(HOSTNAME_KEY.to_string(), "LAPTOP.LOCAL".to_string());
    assert_eq!(gate.decide(v4(77), &md).await, Decision::Bypass);
    assert_eq!(resolver.calls(), 0);
}

// ============ Reverse lookup fallback ============

#[tokio::test]
async fn test_root_dotted_ptr_bypasses() {
    let resolver = StubResolver::new(Answer::Names(vec!["laptop.local."]));
    let gate = gate(resolver.clone());

    assert_eq!(gate.decide(v4(77), &()).await, Decision::Bypass);
    assert_eq!(resolver.calls(), 1);
}

#[tokio::test]
async fn test_only_first_ptr_name_counts() {
    let resolver = StubResolver::new(Answer::Names(vec!["other.lan.", "laptop.local."]));
    let gate = gate(resolver);

    assert_eq!(gate.decide(v4(77), &()).await, Decision::Continue);
}

#[tokio::test]
async fn test_lookup_failure_does_not_surface() {
    let resolver = StubResolver::new(Answer::Fail);
    let gate = gate(resolver.clone());

    assert_eq!(gate.decide(v4(77), &()).await, Decision::Continue);
    assert_eq!(resolver.calls(), 1);

    // IP and MAC checks still decide
    let md = Metadata::new().with_mac("aa:bb:cc:dd:ee:ff");
    assert_eq!(gate.decide(v4(78), &md).await, Decision::Bypass);
}

#[tokio::test]
async fn test_empty_lookup_does_not_surface() {
    let resolver = StubResolver::new(Answer::Names(vec![]));
    let gate = gate(resolver);

    assert_eq!(gate.decide(v4(77), &()).await, Decision::Continue);
}

#[tokio::test]
async fn test_unknown_identity_continues() {
    let resolver = StubResolver::new(Answer::Names(vec!["stranger.lan."]));
    let gate = gate(resolver);

    let md = Metadata::new().with_mac("00:00:5e:00:53:01");
    assert_eq!(gate.decide(v4(99), &md).await, Decision::Continue);
}

#[tokio::test]
async fn test_at_most_one_lookup_per_decision() {
    let resolver = StubResolver::new(Answer::Fail);
    let gate = gate(resolver.clone());

    for _ in 0..3 {
        gate.decide(v4(77), &()).await;
    }
    assert_eq!(resolver.calls(), 3);
}

// ============ Deadlines and timeouts ============

#[tokio::test]
async fn test_deadline_aborts_hanging_lookup() {
    let resolver = StubResolver::new(Answer::Hang);
    let gate = gate(resolver.clone());

    let started = std::time::Instant::now();
    let deadline = Instant::now() + Duration::from_millis(50);
    assert_eq!(
        gate.decide_until(v4(77), &(), deadline).await,
        Decision::Continue
    );
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(resolver.calls(), 1);
}

#[tokio::test]
async fn test_lookup_timeout_bounds_decision() {
    let resolver = StubResolver::new(Answer::Hang);
    let gate = gate(resolver).with_lookup_timeout(Duration::from_millis(50));

    let started = std::time::Instant::now();
    assert_eq!(gate.decide(v4(77), &()).await, Decision::Continue);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_passed_deadline_skips_lookup() {
    let resolver = StubResolver::new(Answer::Names(vec!["laptop.local."]));
    let gate = gate(resolver.clone());

    let deadline = Instant::now();
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(
        gate.decide_until(v4(77), &(), deadline).await,
        Decision::Continue
    );
    assert_eq!(resolver.calls(), 0);
}

// ============ Concurrency ============

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_decisions() {
    let resolver = StubResolver::new(Answer::Names(vec!["laptop.local."]));
    let gate = Arc::new(gate(resolver.clone()));

    let handles: Vec<_> = (0..32u8)
        .map(|i| {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.decide(v4(100 + i), &()).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Decision::Bypass);
    }
    assert_eq!(resolver.calls(), 32);
}

// ============ Construction ============

#[test]
fn test_construction_fails_on_missing_allowlist() {
    let err = Gate::new(
        Some(std::path::Path::new("/nonexistent/allow.txt")),
        Arc::new(NoopResolver),
    )
    .unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("/nonexistent/allow.txt"));
}

#[tokio::test]
async fn test_from_config_without_reverse_lookup() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"10.1.1.1\nlaptop.local\n").unwrap();

    let mut config = Config::default();
    config.allowlist.path = Some(file.path().to_path_buf());
    config.resolver.reverse_lookup = false;

    let gate = Gate::from_config(&config).unwrap();
    assert!(gate.is_enabled());
    assert_eq!(gate.allowlist().map(AllowSets::len), Some(2));

    let ip = IpAddr::V4(Ipv4Addr::new(10, 1, 1, 1));
    assert_eq!(gate.decide(ip, &()).await, Decision::Bypass);

    let other = IpAddr::V4(Ipv4Addr::new(10, 1, 1, 2));
    assert_eq!(gate.decide(other, &()).await, Decision::Continue);
}

#[test]
fn test_from_config_without_path_is_disabled() {
    let mut config = Config::default();
    config.resolver.reverse_lookup = false;

    let gate = Gate::from_config(&config).unwrap();
    assert!(!gate.is_enabled());
}
