// End-to-end scenarios against the public registry API
use observable_registry::{
    Observable, Observe, Observer, ObserverId, ObserverRef, RegistryConfig, RegistryError,
    SubjectKind,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Error,
    Info,
}

#[derive(Debug, Default)]
struct Board {
    details: RefCell<Option<(Severity, String)>>,
}

impl Board {
    fn set(&self, severity: Severity, message: &str) {
        *self.details.borrow_mut() = Some((severity, message.to_string()));
    }
}

/// Remembers every message it was notified with, tagged by the kind it saw
#[derive(Default)]
struct Inbox {
    received: RefCell<Vec<(SubjectKind, String)>>,
}

impl Observe<Board> for Inbox {
    fn notify(&self, kind: SubjectKind, subject: &Board) {
        if let Some((_, message)) = subject.details.borrow().as_ref() {
            self.received.borrow_mut().push((kind, message.clone()));
        }
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn inbox_observer() -> (Rc<Inbox>, ObserverRef<Board>) {
    let inbox = Rc::new(Inbox::default());
    let observer = Observer::shared(Rc::clone(&inbox));
    (inbox, observer)
}

#[test]
fn capacity_two_scenario() {
    init_logging();

    let board = Rc::new(Board::default());
    let mut observable: Observable<Board> = Observable::new(
        Rc::clone(&board),
        SubjectKind::CustomFirst,
        RegistryConfig::new().with_capacity(2),
    )
    .unwrap();

    let (inbox_a, a) = inbox_observer();
    let (inbox_b, b) = inbox_observer();
    let (_inbox_c, c) = inbox_observer();

    assert_eq!(observable.register(&a).map(ObserverId::get), Ok(1));
    assert_eq!(observable.register(&b).map(ObserverId::get), Ok(2));
    assert_eq!(
        observable.register(&c),
        Err(RegistryError::CapacityExceeded { capacity: 2 })
    );

    board.set(Severity::Error, "x");
    let broadcast = observable.notify_all();
    assert_eq!(broadcast.delivered, 2);
    assert_eq!(
        *inbox_a.received.borrow(),
        vec![(SubjectKind::CustomFirst, "x".to_string())]
    );
    assert_eq!(
        *inbox_b.received.borrow(),
        vec![(SubjectKind::CustomFirst, "x".to_string())]
    );

    assert_eq!(observable.unregister(&a), Ok(()));
    let broadcast = observable.notify_all();
    assert_eq!(broadcast.delivered, 1);
    assert_eq!(inbox_a.received.borrow().len(), 1);
    assert_eq!(inbox_b.received.borrow().len(), 2);

    assert!(observable.find_by_id(ObserverId::FIRST).is_none());
    assert!(observable.find_by_id(ObserverId::new(2).unwrap()).is_some());
}

#[test]
fn registration_order_is_notification_order_without_churn() {
    init_logging();

    let order = Rc::new(RefCell::new(Vec::new()));
    let board = Rc::new(Board::default());
    let mut observable: Observable<Board> =
        Observable::new(Rc::clone(&board), SubjectKind::Trigger, RegistryConfig::default())
            .unwrap();

    let observers: Vec<ObserverRef<Board>> = (0..5)
        .map(|n| {
            let order = Rc::clone(&order);
            Observer::new(move |kind: SubjectKind, _: &Board| {
                order.borrow_mut().push((n, kind));
            })
        })
        .collect();

    let ids: Vec<u64> = observers
        .iter()
        .map(|observer| observable.register(observer).unwrap().get())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    board.set(Severity::Info, "tick");
    observable.notify_all();
    assert_eq!(
        *order.borrow(),
        (0..5).map(|n| (n, SubjectKind::Trigger)).collect::<Vec<_>>()
    );
}

#[test]
fn notify_one_reaches_only_the_target() {
    init_logging();

    let board = Rc::new(Board::default());
    let mut observable: Observable<Board> =
        Observable::new(Rc::clone(&board), SubjectKind::CustomFirst, RegistryConfig::default())
            .unwrap();
    let (first_inbox, first) = inbox_observer();
    let (second_inbox, second) = inbox_observer();
    observable.register(&first).unwrap();
    observable.register(&second).unwrap();

    board.set(Severity::Error, "only for the first");
    assert_eq!(observable.notify_one(&first), Ok(()));

    assert_eq!(first_inbox.received.borrow().len(), 1);
    assert!(second_inbox.received.borrow().is_empty());
}

#[test]
fn release_lifecycle() {
    let (_inbox, observer) = inbox_observer();
    assert_eq!(observer.release(), Ok(()));
    assert_eq!(observer.release(), Err(RegistryError::AlreadyReleased));
}
