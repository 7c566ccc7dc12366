//! Observer record
//!
//! An [`Observer`] wraps the caller's handler together with the id a registry assigns
//! to it. The handler owns whatever private state the concrete observer needs; the
//! registry never looks inside it, it only forwards the subject and its kind.
//!
//! Observers are shared through [`ObserverRef`]. The registry keeps one clone in its
//! slot table and the caller keeps another to address the observer later
//! (unregister, notify one). Identity is the allocation, not the value.

use crate::types::{ObserverId, RegistryError, Result, SubjectKind};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Shared handle to an observer
pub type ObserverRef<S> = Rc<Observer<S>>;

/// Reaction to a subject notification
///
/// Implemented by concrete observer types, or by any `Fn(SubjectKind, &S)` closure.
pub trait Observe<S> {
    /// Called when the subject this observer is registered with notifies it.
    fn notify(&self, kind: SubjectKind, subject: &S);
}

impl<S, F> Observe<S> for F
where
    F: Fn(SubjectKind, &S),
{
    fn notify(&self, kind: SubjectKind, subject: &S) {
        self(kind, subject)
    }
}

/// A subscriber record: handler plus registry-assigned identity
pub struct Observer<S> {
    id: Cell<Option<ObserverId>>,
    /// `None` once released
    handler: RefCell<Option<Rc<dyn Observe<S>>>>,
}

impl<S> Observer<S> {
    /// Wrap a handler in a new, unregistered observer
    pub fn new<H>(handler: H) -> ObserverRef<S>
    where
        H: Observe<S> + 'static,
    {
        Self::shared(Rc::new(handler))
    }

    /// Wrap a handler the caller keeps a handle to
    ///
    /// Useful when the caller wants to inspect the handler's state after
    /// notifications, e.g. a counter or a log of received messages.
    pub fn shared<H>(handler: Rc<H>) -> ObserverRef<S>
    where
        H: Observe<S> + 'static,
    {
        let handler: Rc<dyn Observe<S>> = handler;
        Rc::new(Self {
            id: Cell::new(None),
            handler: RefCell::new(Some(handler)),
        })
    }

    /// Id assigned at registration, `None` before that
    pub fn id(&self) -> Option<ObserverId> {
        self.id.get()
    }

    /// True once the observer has been released
    pub fn is_released(&self) -> bool {
        self.handler.borrow().is_none()
    }

    /// True while the observer carries an id and has not been released
    ///
    /// This reflects the observer's own state, not slot occupancy. An observer its
    /// owner released keeps its slot until [`Observable::unregister`] clears it: the
    /// registry still finds it by id and counts it in [`Observable::len`], while this
    /// returns false.
    ///
    /// [`Observable::unregister`]: crate::Observable::unregister
    /// [`Observable::len`]: crate::Observable::len
    pub fn is_registered(&self) -> bool {
        self.id().is_some() && !self.is_released()
    }

    /// Invoke the handler with the subject and its kind
    ///
    /// A panic inside the handler is caught and returned as
    /// [`RegistryError::HandlerPanicked`]. The process panic hook still runs
    /// first, so the default hook prints its `thread '...' panicked at` line to
    /// stderr even though the panic goes no further.
    pub fn notify(&self, subject: &S, kind: SubjectKind) -> Result<()> {
        // Clone the handle out so the handler may release this observer while running.
        let handler = self
            .handler
            .borrow()
            .clone()
            .ok_or(RegistryError::AlreadyReleased)?;

        log::trace!("Notifying observer {} ({})", self.label(), kind);

        panic::catch_unwind(AssertUnwindSafe(|| handler.notify(kind, subject))).map_err(
            |payload| {
                let message = panic_message(payload.as_ref());
                log::error!("Handler of observer {} panicked: {}", self.label(), message);
                RegistryError::HandlerPanicked {
                    observer: self.label(),
                    message,
                }
            },
        )
    }

    /// Drop the handler and mark the observer released
    ///
    /// Fails with [`RegistryError::AlreadyReleased`] on the second call.
    pub fn release(&self) -> Result<()> {
        let handler = self.handler.borrow_mut().take();
        match handler {
            Some(_) => {
                log::debug!("Released observer {}", self.label());
                Ok(())
            }
            None => Err(RegistryError::AlreadyReleased),
        }
    }

    pub(crate) fn assign_id(&self, id: ObserverId) {
        self.id.set(Some(id));
    }

    fn label(&self) -> String {
        match self.id() {
            Some(id) => id.to_string(),
            None => "(unregistered)".to_string(),
        }
    }
}

impl<S> fmt::Debug for Observer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("id", &self.id())
            .field("released", &self.is_released())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
