use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use mars_events::{EventError, SysEvent, SysEventListener, SysEventManager};
use mars_sh2::CpuId;
use parking_lot::Mutex;

type Log = Arc<Mutex<Vec<(&'static str, CpuId, SysEvent)>>>;

fn recorder(tag: &'static str, log: &Log) -> Arc<dyn SysEventListener> {
    let log = log.clone();
    Arc::new(move |cpu: CpuId, event: SysEvent| log.lock().push((tag, cpu, event)))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

#[test]
fn fire_reaches_only_the_named_cpu() {
    init_tracing();
    let manager = SysEventManager::new();
    let log = Log::default();
    manager
        .register_listener(CpuId::Master, "x", recorder("x", &log))
        .unwrap();

    assert_eq!(manager.fire_event(CpuId::Master, SysEvent::Comm), 1);
    assert_eq!(*log.lock(), vec![("x", CpuId::Master, SysEvent::Comm)]);

    assert_eq!(manager.fire_event(CpuId::Slave, SysEvent::Comm), 0);
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn remove_reports_presence_once() {
    let manager = SysEventManager::new();
    let log = Log::default();
    manager
        .register_listener(CpuId::Master, "x", recorder("x", &log))
        .unwrap();

    assert!(manager.remove_listener(CpuId::Master, "x"));
    assert!(!manager.remove_listener(CpuId::Master, "x"));
    assert_eq!(manager.fire_event(CpuId::Master, SysEvent::Int), 0);
    assert!(log.lock().is_empty());
}

#[test]
fn remove_on_other_cpu_leaves_registration() {
    let manager = SysEventManager::new();
    let log = Log::default();
    manager
        .register_listener(CpuId::Master, "x", recorder("x", &log))
        .unwrap();
    assert!(!manager.remove_listener(CpuId::Slave, "x"));
    assert!(manager.is_registered(CpuId::Master, "x"));
}

#[test]
fn broadcast_register_and_remove_counts_both_sides() {
    let manager = SysEventManager::new();
    let log = Log::default();
    manager.register_listener_all("y", recorder("y", &log)).unwrap();
    assert_eq!(manager.fire_event_all(SysEvent::Vdp), 2);
    assert_eq!(
        *log.lock(),
        vec![
            ("y", CpuId::Master, SysEvent::Vdp),
            ("y", CpuId::Slave, SysEvent::Vdp)
        ]
    );
    assert_eq!(manager.remove_listener_all("y"), 2);
    assert_eq!(manager.remove_listener_all("y"), 0);
}

#[test]
fn broadcast_remove_counts_only_existing_sides() {
    let manager = SysEventManager::new();
    let log = Log::default();
    manager.register_listener_all("y", recorder("y", &log)).unwrap();
    assert!(manager.remove_listener(CpuId::Slave, "y"));
    assert_eq!(manager.remove_listener_all("y"), 1);
}

#[test]
fn duplicate_name_is_an_error_in_every_build() {
    let manager = SysEventManager::new();
    let log = Log::default();
    manager
        .register_listener(CpuId::Slave, "pwm", recorder("a", &log))
        .unwrap();
    let err = manager
        .register_listener(CpuId::Slave, "pwm", recorder("b", &log))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "listener \"pwm\" is already registered for SLAVE"
    );
    assert!(matches!(err, EventError::AlreadyRegistered { cpu: CpuId::Slave, .. }));

    manager.fire_event(CpuId::Slave, SysEvent::Pwm);
    assert_eq!(*log.lock(), vec![("a", CpuId::Slave, SysEvent::Pwm)]);
}

/// Listener that removes itself the first time it hears anything.
struct SelfRemoving {
    manager: Weak<SysEventManager>,
    calls: Mutex<u32>,
}

impl SysEventListener for SelfRemoving {
    fn on_sys_event(&self, cpu: CpuId, _event: SysEvent) {
        *self.calls.lock() += 1;
        if let Some(manager) = self.manager.upgrade() {
            assert!(manager.remove_listener(cpu, "once"));
        }
    }
}

#[test]
fn listener_can_remove_itself_during_fire() {
    let manager = Arc::new(SysEventManager::new());
    let once = Arc::new(SelfRemoving {
        manager: Arc::downgrade(&manager),
        calls: Mutex::new(0),
    });
    let log = Log::default();
    manager
        .register_listener(CpuId::Master, "once", once.clone())
        .unwrap();
    manager
        .register_listener(CpuId::Master, "other", recorder("other", &log))
        .unwrap();

    assert_eq!(manager.fire_event(CpuId::Master, SysEvent::Dma), 2);
    assert_eq!(*once.calls.lock(), 1);
    assert_eq!(log.lock().len(), 1);
    assert!(!manager.is_registered(CpuId::Master, "once"));

    assert_eq!(manager.fire_event(CpuId::Master, SysEvent::Dma), 1);
    assert_eq!(*once.calls.lock(), 1);
    assert_eq!(log.lock().len(), 2);
}

#[test]
fn listener_added_during_fire_runs_from_next_event() {
    let manager = Arc::new(SysEventManager::new());
    let log = Log::default();
    let weak = Arc::downgrade(&manager);
    let late = recorder("late", &log);
    let adder: Arc<dyn SysEventListener> = Arc::new(move |cpu: CpuId, _event: SysEvent| {
        if let Some(manager) = weak.upgrade() {
            // Only the first call succeeds; later ones hit the duplicate check.
            let _ = manager.register_listener(cpu, "late", late.clone());
        }
    });
    manager.register_listener(CpuId::Slave, "adder", adder).unwrap();

    assert_eq!(manager.fire_event(CpuId::Slave, SysEvent::Sdram), 1);
    assert!(log.lock().is_empty());
    assert_eq!(manager.fire_event(CpuId::Slave, SysEvent::Sdram), 2);
    assert_eq!(*log.lock(), vec![("late", CpuId::Slave, SysEvent::Sdram)]);
}

#[test]
fn panicking_listener_unwinds_to_caller() {
    let manager = SysEventManager::new();
    let bomb: Arc<dyn SysEventListener> = Arc::new(|_cpu: CpuId, event: SysEvent| {
        if event == SysEvent::Sys {
            panic!("listener failure");
        }
    });
    manager.register_listener(CpuId::Master, "bomb", bomb).unwrap();

    let result = catch_unwind(AssertUnwindSafe(|| {
        manager.fire_event(CpuId::Master, SysEvent::Sys)
    }));
    assert!(result.is_err());

    // The registry is not left locked by the unwind.
    assert_eq!(manager.fire_event(CpuId::Master, SysEvent::Int), 1);
}

#[test]
fn event_names_match_wire_names() {
    let names: Vec<&str> = SysEvent::ALL.iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        ["NONE", "INT", "SYS", "SDRAM", "COMM", "DMA", "PWM", "VDP", "START_POLLING"]
    );
    assert_eq!(SysEvent::StartPolling.to_string(), "START_POLLING");
}
