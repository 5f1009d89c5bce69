use bootreg_lib::{CoreCall, ErrorKind, HookPhase, MemoryCore, Registry, RegistryError, Subject};

use super::common::PickyCore;

#[test]
fn register_then_get() {
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);

  registry.register_alias("db", "mysql.default").unwrap();

  assert_eq!(registry.get_alias("db"), Some("mysql.default"));
  assert_eq!(registry.get_alias("cache"), None);

  let err = registry.register_alias("db", "postgres.default").unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert_eq!(err.to_string(), "alias [db] is already registered");
  assert_eq!(registry.get_alias("db"), Some("mysql.default"));
}

#[test]
fn aliases_are_not_committed_before_boot() {
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);

  registry.register_alias("db", "mysql.default").unwrap();

  assert!(registry.core().calls().is_empty());
  assert_eq!(registry.get_aliases().len(), 1);
}

#[test]
fn unregister_missing_alias_is_not_found() {
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register_alias("db", "mysql").unwrap();

  let err = registry.unregister_alias("cache").unwrap_err();

  assert!(matches!(&err, RegistryError::AliasNotFound(name) if name == "cache"));
  assert_eq!(registry.get_aliases().len(), 1);
  assert!(registry.core().calls().is_empty());
}

#[test]
fn unregister_always_reaches_the_host() {
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register_alias("db", "mysql").unwrap();

  registry.unregister_alias("db").unwrap();

  assert_eq!(registry.get_alias("db"), None);
  assert_eq!(
    registry.core().calls(),
    &[CoreCall::Remove {
      name: "db".to_string()
    }]
  );
}

#[test]
fn host_removal_failure_is_unwrapped_and_keeps_alias() {
  let mut core = PickyCore::refusing(&["db"]);
  let mut registry = Registry::new(&mut core);
  registry.register_alias("db", "mysql").unwrap();

  let err = registry.unregister_alias("db").unwrap_err();

  assert_eq!(err.kind(), ErrorKind::Hook);
  assert_eq!(err.to_string(), "host refused removal of db");
  assert_eq!(registry.get_alias("db"), Some("mysql"));
}

#[test]
fn late_alias_is_committed_immediately() {
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.boot().unwrap();

  registry.register_alias("db", "mysql").unwrap();

  assert_eq!(registry.core().resolve("db"), Some("mysql"));
}

#[test]
fn late_alias_failure_is_wrapped_and_kept_in_table() {
  let mut core = PickyCore::refusing(&["db"]);
  let mut registry = Registry::new(&mut core);
  registry.boot().unwrap();

  let err = registry.register_alias("db", "mysql").unwrap_err();

  assert!(matches!(
    &err,
    RegistryError::Execution { subject: Subject::Alias(name), phase: HookPhase::Alias, .. } if name == "db"
  ));
  assert_eq!(
    std::error::Error::source(&err).unwrap().to_string(),
    "host refused alias db"
  );
  assert_eq!(registry.get_alias("db"), Some("mysql"));
}

#[test]
fn flush_aliases_only_before_boot() {
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register_alias("db", "mysql").unwrap();
  registry.register_alias("cache", "redis").unwrap();

  registry.flush_aliases().unwrap();
  assert!(registry.get_aliases().is_empty());

  registry.register_alias("queue", "amqp").unwrap();
  registry.boot().unwrap();

  let err = registry.flush_aliases().unwrap_err();
  assert_eq!(err.kind(), ErrorKind::IllegalState);
  assert_eq!(registry.get_alias("queue"), Some("amqp"));
}

#[test]
fn self_referencing_alias_fails_boot() {
  let mut core = MemoryCore::new();
  let mut registry = Registry::new(&mut core);
  registry.register_alias("db", "db").unwrap();

  let err = registry.boot().unwrap_err();

  assert_eq!(err.kind(), ErrorKind::Execution);
  assert_eq!(err.subject(), Some(&Subject::Alias("db".to_string())));
}
