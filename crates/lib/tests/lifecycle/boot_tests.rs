use std::error::Error;

use bootreg_lib::{
  ActivationState, BootState, CoreCall, ErrorKind, HookPhase, MemoryCore, OrderingResolver, ProviderId, RebootPolicy,
  Registry, RegistryConfig, RegistryError, SortError, SortNode, Subject,
};

use super::common::{Calls, Hook, PickyCore, Recorder, ids, strings};

#[test]
fn registers_everything_before_booting_anything() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);

  registry.register(Recorder::new("app", &calls).requires(&["db", "cache"])).unwrap();
  registry.register(Recorder::new("db", &calls).requires(&["config"])).unwrap();
  registry.register(Recorder::new("cache", &calls)).unwrap();
  registry.register(Recorder::new("config", &calls)).unwrap();

  registry.boot().unwrap();

  let order = strings(&["cache", "config", "db", "app"]);
  let expected: Vec<(String, Hook)> = order
    .iter()
    .map(|id| (id.clone(), Hook::Register))
    .chain(order.iter().map(|id| (id.clone(), Hook::Boot)))
    .collect();
  assert_eq!(calls.all(), expected);
  assert_eq!(registry.get_providers(), ids(&["cache", "config", "db", "app"]));
  assert!(registry.is_booted());
  assert_eq!(registry.boot_state(), BootState::Booted);
}

#[test]
fn cycle_fails_before_any_hook() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);

  registry.register(Recorder::new("a", &calls).requires(&["b"])).unwrap();
  registry.register(Recorder::new("b", &calls).requires(&["a"])).unwrap();
  registry.register_alias("db", "mysql").unwrap();

  let err = registry.boot().unwrap_err();

  assert_eq!(err.kind(), ErrorKind::Overflow);
  assert!(matches!(
    &err,
    RegistryError::Overflow(SortError::Cycle { members }) if *members == ids(&["a", "b"])
  ));
  assert!(calls.is_empty());
  assert!(registry.core().calls().is_empty());
  assert_eq!(registry.boot_state(), BootState::Pending);
  assert_eq!(registry.state_of(&ProviderId::from("a")), Some(ActivationState::Unregistered));
}

#[test]
fn unsatisfied_requirement_is_an_overflow() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register(Recorder::new("app", &calls).requires(&["db"])).unwrap();

  let err = registry.boot().unwrap_err();

  assert_eq!(err.kind(), ErrorKind::Overflow);
  assert_eq!(err.to_string(), "providers cannot be ordered");
  assert_eq!(
    err.source().map(|cause| cause.to_string()),
    Some("provider app requires db, which no provider supplies".to_string())
  );
  assert!(calls.is_empty());
}

fn five_with_third_failing(calls: &Calls, hook: Hook) -> Vec<Recorder> {
  (1..=5)
    .map(|n| {
      let recorder = Recorder::new(&format!("p{}", n), calls);
      if n == 3 { recorder.failing(hook) } else { recorder }
    })
    .collect()
}

#[test]
fn boot_failure_is_not_rolled_back() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  for recorder in five_with_third_failing(&calls, Hook::Boot) {
    registry.register(recorder).unwrap();
  }

  let err = registry.boot().unwrap_err();

  assert_eq!(err.kind(), ErrorKind::Execution);
  assert!(matches!(
    &err,
    RegistryError::Execution { subject: Subject::Provider(id), phase: HookPhase::Boot, .. } if id.as_str() == "p3"
  ));
  assert_eq!(err.to_string(), "provider p3 failed during boot");
  assert_eq!(
    std::error::Error::source(&err).unwrap().to_string(),
    "p3 exploded during Boot"
  );

  assert_eq!(calls.of(Hook::Register), strings(&["p1", "p2", "p3", "p4", "p5"]));
  assert_eq!(calls.of(Hook::Boot), strings(&["p1", "p2", "p3"]));
  assert!(calls.of(Hook::Unregister).is_empty());

  let states: Vec<_> = ids(&["p1", "p2", "p3", "p4", "p5"])
    .iter()
    .map(|id| registry.state_of(id).unwrap())
    .collect();
  assert_eq!(
    states,
    vec![
      ActivationState::Booted,
      ActivationState::Booted,
      ActivationState::Registered,
      ActivationState::Registered,
      ActivationState::Registered,
    ]
  );
  assert!(!registry.is_booted());
  assert_eq!(
    registry.boot_state(),
    BootState::PartiallyActivated {
      failed: Subject::Provider(ProviderId::from("p3"))
    }
  );
}

#[test]
fn register_failure_stops_before_boot_phase() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  for recorder in five_with_third_failing(&calls, Hook::Register) {
    registry.register(recorder).unwrap();
  }

  let err = registry.boot().unwrap_err();

  assert!(matches!(
    &err,
    RegistryError::Execution { phase: HookPhase::Register, .. }
  ));
  assert_eq!(calls.of(Hook::Register), strings(&["p1", "p2", "p3"]));
  assert!(calls.of(Hook::Boot).is_empty());
  assert_eq!(registry.state_of(&ProviderId::from("p2")), Some(ActivationState::Registered));
  assert_eq!(registry.state_of(&ProviderId::from("p3")), Some(ActivationState::Unregistered));
  assert_eq!(registry.state_of(&ProviderId::from("p5")), Some(ActivationState::Unregistered));
}

#[test]
fn retry_after_partial_boot_resumes() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  for recorder in five_with_third_failing(&calls, Hook::Boot) {
    registry.register(recorder).unwrap();
  }
  assert!(registry.boot().is_err());

  registry.unregister_provider("p3").unwrap();
  registry.boot().unwrap();

  assert_eq!(calls.of(Hook::Register), strings(&["p1", "p2", "p3", "p4", "p5"]));
  assert_eq!(calls.of(Hook::Boot), strings(&["p1", "p2", "p3", "p4", "p5"]));
  assert_eq!(registry.boot_state(), BootState::Booted);
}

#[test]
fn second_boot_is_rejected_by_default() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register(Recorder::new("db", &calls)).unwrap();
  registry.boot().unwrap();

  let err = registry.boot().unwrap_err();

  assert_eq!(err.kind(), ErrorKind::IllegalState);
  assert_eq!(err.to_string(), "boot cannot be called after boot");
  assert_eq!(calls.all().len(), 2);
}

#[test]
fn rerun_policy_boots_again_without_registering_again() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let config = RegistryConfig {
    reboot: RebootPolicy::Rerun,
    ..RegistryConfig::default()
  };
  let mut registry = Registry::with_config(&mut core, config);
  registry.register(Recorder::new("config", &calls)).unwrap();
  registry.register(Recorder::new("db", &calls).requires(&["config"])).unwrap();
  registry.register_alias("database", "db.mysql").unwrap();

  registry.boot().unwrap();
  registry.boot().unwrap();

  assert_eq!(calls.of(Hook::Register), strings(&["config", "db"]));
  assert_eq!(calls.of(Hook::Boot), strings(&["config", "db", "config", "db"]));
  let alias_calls = registry
    .core()
    .calls()
    .iter()
    .filter(|call| matches!(call, CoreCall::Alias { .. }))
    .count();
  assert_eq!(alias_calls, 2);
}

#[test]
fn failed_rerun_is_reported_as_partial() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let config = RegistryConfig {
    reboot: RebootPolicy::Rerun,
    ..RegistryConfig::default()
  };
  let mut registry = Registry::with_config(&mut core, config);
  registry.register(Recorder::new("flaky", &calls).failing_on(Hook::Boot, 2)).unwrap();
  registry.register(Recorder::new("after", &calls).requires(&["flaky"])).unwrap();
  registry.boot().unwrap();

  let err = registry.boot().unwrap_err();

  assert_eq!(err.to_string(), "provider flaky failed during boot");
  assert_eq!(calls.of(Hook::Boot), strings(&["flaky", "after", "flaky"]));
  assert_eq!(
    registry.boot_state(),
    BootState::PartiallyActivated {
      failed: Subject::Provider(ProviderId::from("flaky")),
    }
  );

  registry.boot().unwrap();
  assert_eq!(registry.boot_state(), BootState::Booted);
  assert_eq!(calls.of(Hook::Boot), strings(&["flaky", "after", "flaky", "flaky", "after"]));
}

#[test]
fn provider_already_registered_is_only_booted() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register(Recorder::new("warm", &calls).already_registered()).unwrap();
  registry.register(Recorder::new("cold", &calls)).unwrap();

  assert_eq!(registry.state_of(&ProviderId::from("warm")), Some(ActivationState::Registered));
  registry.boot().unwrap();

  assert_eq!(calls.of(Hook::Register), strings(&["cold"]));
  assert_eq!(calls.of(Hook::Boot), strings(&["warm", "cold"]));
}

#[test]
fn aliases_are_committed_after_providers_boot() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register(Recorder::new("db", &calls)).unwrap();
  registry.register_alias("queue", "amqp.default").unwrap();
  registry.register_alias("db", "mysql.default").unwrap();

  assert!(registry.core().calls().is_empty());
  registry.boot().unwrap();

  assert_eq!(
    registry.core().calls(),
    &[
      CoreCall::Alias {
        name: "db".to_string(),
        target: "mysql.default".to_string(),
      },
      CoreCall::Alias {
        name: "queue".to_string(),
        target: "amqp.default".to_string(),
      },
    ]
  );
  assert_eq!(registry.core().resolve("db"), Some("mysql.default"));
}

#[test]
fn alias_commit_failure_names_the_alias() {
  let calls = Calls::new();
  let mut core = PickyCore::refusing(&["db"]);
  let mut registry = Registry::new(&mut core);
  registry.register(Recorder::new("mysql", &calls)).unwrap();
  registry.register_alias("cache", "redis").unwrap();
  registry.register_alias("db", "mysql.default").unwrap();

  let err = registry.boot().unwrap_err();

  assert_eq!(err.to_string(), "alias [db] failed during alias commit");
  assert_eq!(err.subject(), Some(&Subject::Alias("db".to_string())));
  assert_eq!(registry.state_of(&ProviderId::from("mysql")), Some(ActivationState::Booted));
  assert_eq!(registry.core().inner.resolve("cache"), Some("redis"));
  assert!(!registry.is_booted());
}

#[test]
fn late_registration_runs_register_hook_immediately() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register(Recorder::new("db", &calls)).unwrap();
  registry.boot().unwrap();

  registry.register(Recorder::new("cache", &calls)).unwrap();

  assert_eq!(calls.of(Hook::Register), strings(&["db", "cache"]));
  assert_eq!(calls.of(Hook::Boot), strings(&["db"]));
  assert_eq!(registry.state_of(&ProviderId::from("cache")), Some(ActivationState::Registered));
}

#[test]
fn late_registration_failure_is_wrapped_and_not_recorded() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.boot().unwrap();

  let err = registry
    .register(Recorder::new("cache", &calls).failing(Hook::Register))
    .unwrap_err();

  assert_eq!(err.to_string(), "provider cache failed during registration");
  assert!(registry.get_provider(&ProviderId::from("cache")).is_none());
}

/// Activates providers in reverse registration order.
struct Reversed;

impl OrderingResolver for Reversed {
  fn order(&self, nodes: &[SortNode<'_>]) -> Result<Vec<usize>, SortError> {
    Ok((0..nodes.len()).rev().collect())
  }
}

/// Returns the same position for every node.
struct Broken;

impl OrderingResolver for Broken {
  fn order(&self, nodes: &[SortNode<'_>]) -> Result<Vec<usize>, SortError> {
    Ok(vec![0; nodes.len()])
  }
}

#[test]
fn custom_resolver_decides_the_order() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core).with_resolver(Reversed);
  registry.register(Recorder::new("a", &calls)).unwrap();
  registry.register(Recorder::new("b", &calls)).unwrap();

  registry.boot().unwrap();

  assert_eq!(calls.of(Hook::Boot), strings(&["b", "a"]));
}

#[test]
fn invalid_resolver_output_is_rejected() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core).with_resolver(Broken);
  registry.register(Recorder::new("a", &calls)).unwrap();
  registry.register(Recorder::new("b", &calls)).unwrap();

  let err = registry.boot().unwrap_err();

  assert!(matches!(err, RegistryError::Overflow(SortError::InvalidOrdering(_))));
  assert!(calls.is_empty());
  assert_eq!(registry.get_providers(), ids(&["a", "b"]));
}
