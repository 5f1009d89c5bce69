use bootreg_lib::{MemoryCore, ProviderId, Registry};

use super::common::{Calls, Hook, Recorder, ids, strings};

#[test]
fn dispose_removes_failing_and_succeeding_providers() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register(Recorder::new("flaky", &calls).failing(Hook::Unregister)).unwrap();
  registry.register(Recorder::new("steady", &calls)).unwrap();

  let report = registry.shutdown();

  assert_eq!(report.unregistered, ids(&["steady"]));
  assert_eq!(report.failures.len(), 1);
  assert_eq!(report.failures[0].id, ProviderId::from("flaky"));
  assert_eq!(report.failures[0].error.to_string(), "flaky exploded during Unregister");
  assert!(registry.get_providers().is_empty());
  assert_eq!(calls.of(Hook::Unregister), strings(&["flaky", "steady"]));
}

#[test]
fn drop_attempts_every_provider() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  {
    let mut registry = Registry::new(&mut core);
    registry.register(Recorder::new("a", &calls).failing(Hook::Unregister)).unwrap();
    registry.register(Recorder::new("b", &calls).failing(Hook::Unregister)).unwrap();
    registry.register(Recorder::new("c", &calls)).unwrap();
    registry.boot().unwrap();
  }

  assert_eq!(calls.of(Hook::Unregister), strings(&["a", "b", "c"]));
}

#[test]
fn shutdown_after_failed_boot() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register(Recorder::new("a", &calls)).unwrap();
  registry.register(Recorder::new("b", &calls).failing(Hook::Boot)).unwrap();
  registry.register(Recorder::new("c", &calls)).unwrap();
  assert!(registry.boot().is_err());

  let report = registry.shutdown();

  assert!(report.is_clean());
  assert_eq!(report.unregistered, ids(&["a", "b", "c"]));
}

#[test]
fn shutdown_after_cycle_still_reaches_everyone() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register(Recorder::new("a", &calls).requires(&["b"])).unwrap();
  registry.register(Recorder::new("b", &calls).requires(&["a"])).unwrap();
  assert!(registry.boot().is_err());

  let report = registry.shutdown();

  assert_eq!(report.attempted(), 2);
  assert_eq!(calls.of(Hook::Unregister), strings(&["a", "b"]));
}

#[test]
fn second_shutdown_has_nothing_to_do() {
  let calls = Calls::new();
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register(Recorder::new("a", &calls)).unwrap();

  assert_eq!(registry.shutdown().attempted(), 1);
  assert_eq!(registry.shutdown().attempted(), 0);
}
