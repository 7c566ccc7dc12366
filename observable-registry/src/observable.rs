//! Observable registry
//!
//! [`Observable`] is the subject side of the pattern. It owns a fixed-capacity slot
//! table of [`ObserverRef`]s and dispatches notifications to them, forwarding a shared
//! reference to the caller's subject value and the [`SubjectKind`] it was built with.
//!
//! # Slot table
//!
//! - Registration takes the lowest empty slot; nothing is ever compacted or reordered.
//! - `notify_all` visits occupied slots in ascending index order. After unregister and
//!   register churn this is not necessarily registration order.
//! - Ids come from a counter that starts at 1 and only increases.
//!
//! # Re-entrancy
//!
//! Mutating operations take `&mut self`, so a handler can only reach the registry
//! through a cell owned by the caller, and that cell refuses a mutable borrow while a
//! broadcast holds a shared one. `notify_all` also works on a snapshot of the occupied
//! slots: an observer released by another handler mid-broadcast is skipped and reported
//! in [`Broadcast::failed`].

use crate::config::RegistryConfig;
use crate::observer::ObserverRef;
use crate::types::{ObserverId, RegistryError, Result, SubjectKind};
use std::fmt;
use std::rc::Rc;

/// Out-of-band callback run on demand through [`Observable::run_custom_action`]
pub type CustomAction<A> = Box<dyn FnMut(Option<&A>) -> Result<()>>;

/// Outcome of one [`Observable::notify_all`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Broadcast {
    /// Number of observers whose handler ran to completion
    pub delivered: usize,
    /// Observers that could not be notified, in visiting order
    pub failed: Vec<(ObserverId, RegistryError)>,
}

impl Broadcast {
    /// True when every visited observer was notified
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of observers visited
    pub fn visited(&self) -> usize {
        self.delivered + self.failed.len()
    }
}

/// Subject registry holding a bounded set of observers
pub struct Observable<S, A = ()> {
    subject: Rc<S>,
    kind: SubjectKind,
    slots: Vec<Option<ObserverRef<S>>>,
    /// `None` once the id space is used up
    next_id: Option<ObserverId>,
    custom_action: Option<CustomAction<A>>,
}

impl<S, A> Observable<S, A> {
    /// Create a registry for `subject` with all slots empty
    ///
    /// # Example
    /// ```
    /// use observable_registry::{Observable, Observer, RegistryConfig, SubjectKind};
    /// use std::rc::Rc;
    ///
    /// let mut observable: Observable<String> = Observable::new(
    ///     Rc::new("disk almost full".to_string()),
    ///     SubjectKind::CustomFirst,
    ///     RegistryConfig::new().with_capacity(2),
    /// )
    /// .unwrap();
    ///
    /// let observer = Observer::new(|kind: SubjectKind, message: &String| {
    ///     println!("{}: {}", kind, message);
    /// });
    /// let id = observable.register(&observer).unwrap();
    /// assert_eq!(id.get(), 1);
    ///
    /// let broadcast = observable.notify_all();
    /// assert_eq!(broadcast.delivered, 1);
    /// ```
    pub fn new(subject: Rc<S>, kind: SubjectKind, config: RegistryConfig) -> Result<Self> {
        config.validate()?;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(config.capacity)
            .map_err(|e| {
                RegistryError::AllocationFailed(format!(
                    "{} observer slots: {}",
                    config.capacity, e
                ))
            })?;
        slots.resize_with(config.capacity, || None);

        log::debug!(
            "Created {} observable with {} observer slots",
            kind,
            config.capacity
        );

        Ok(Self {
            subject,
            kind,
            slots,
            next_id: Some(ObserverId::FIRST),
            custom_action: None,
        })
    }

    /// Builder method: attach the custom action
    pub fn with_custom_action<F>(mut self, action: F) -> Self
    where
        F: FnMut(Option<&A>) -> Result<()> + 'static,
    {
        self.custom_action = Some(Box::new(action));
        self
    }

    /// Register an observer in the lowest empty slot and assign it the next id
    ///
    /// On failure the observer is left untouched and the registry keeps no handle
    /// to it.
    pub fn register(&mut self, observer: &ObserverRef<S>) -> Result<ObserverId> {
        if observer.is_released() {
            return Err(RegistryError::AlreadyReleased);
        }
        if let Some(id) = observer.id() {
            return Err(RegistryError::AlreadyRegistered(id));
        }

        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(RegistryError::CapacityExceeded {
                capacity: self.slots.len(),
            })?;
        let id = self.next_id.ok_or(RegistryError::IdsExhausted)?;

        observer.assign_id(id);
        self.slots[index] = Some(Rc::clone(observer));
        self.next_id = id.next();

        log::debug!("Registered observer {} in slot {}", id, index);
        Ok(id)
    }

    /// Remove an observer and release it
    ///
    /// An observer its owner already released is still removed.
    pub fn unregister(&mut self, observer: &ObserverRef<S>) -> Result<()> {
        let index = self.position(observer).ok_or(RegistryError::NotFound)?;

        if let Some(removed) = self.slots[index].take() {
            if removed.release().is_err() {
                log::debug!(
                    "Observer in slot {} was already released by its owner",
                    index
                );
            }
            if let Some(id) = removed.id() {
                log::debug!("Unregistered observer {} from slot {}", id, index);
            }
        }
        Ok(())
    }

    /// Notify a single registered observer
    pub fn notify_one(&self, observer: &ObserverRef<S>) -> Result<()> {
        self.slots
            .iter()
            .flatten()
            .find(|stored| Rc::ptr_eq(stored, observer))
            .ok_or(RegistryError::NotFound)?
            .notify(&self.subject, self.kind)
    }

    /// Notify every registered observer in ascending slot order
    ///
    /// Never fails as a whole: a failed delivery is logged, recorded in the returned
    /// [`Broadcast`] and the remaining observers are still notified.
    pub fn notify_all(&self) -> Broadcast {
        let snapshot: Vec<(ObserverId, ObserverRef<S>)> = self
            .slots
            .iter()
            .flatten()
            .filter_map(|observer| observer.id().map(|id| (id, Rc::clone(observer))))
            .collect();

        log::trace!(
            "Broadcasting {} notification to {} observers",
            self.kind,
            snapshot.len()
        );

        let mut broadcast = Broadcast::default();
        for (id, observer) in snapshot {
            match observer.notify(&self.subject, self.kind) {
                Ok(()) => broadcast.delivered += 1,
                Err(e) => {
                    log::warn!("Failed to notify observer {}: {}", id, e);
                    broadcast.failed.push((id, e));
                }
            }
        }
        broadcast
    }

    /// Look up a registered observer by id
    pub fn find_by_id(&self, id: ObserverId) -> Option<&ObserverRef<S>> {
        self.slots
            .iter()
            .flatten()
            .find(|observer| observer.id() == Some(id))
    }

    /// Run the custom action with an optional payload
    ///
    /// Returns the action's own result, or [`RegistryError::NoCustomAction`] when
    /// none was attached.
    pub fn run_custom_action(&mut self, payload: Option<&A>) -> Result<()> {
        let action = self
            .custom_action
            .as_mut()
            .ok_or(RegistryError::NoCustomAction)?;

        log::debug!(
            "Running custom action ({} payload)",
            if payload.is_some() { "with" } else { "without" }
        );
        action(payload)
    }

    /// Kind this observable was created with
    pub fn kind(&self) -> SubjectKind {
        self.kind
    }

    /// Subject forwarded to observers
    pub fn subject(&self) -> &Rc<S> {
        &self.subject
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// True when no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every slot is occupied; the next register fails
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// True when a custom action was attached
    pub fn has_custom_action(&self) -> bool {
        self.custom_action.is_some()
    }

    /// Id the next successful registration will receive
    pub fn next_id(&self) -> Option<ObserverId> {
        self.next_id
    }

    /// Ids of registered observers, in slot order
    pub fn ids(&self) -> impl Iterator<Item = ObserverId> + '_ {
        self.slots.iter().flatten().filter_map(|observer| observer.id())
    }

    fn position(&self, observer: &ObserverRef<S>) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|stored| Rc::ptr_eq(stored, observer))
        })
    }
}

impl<S, A> Drop for Observable<S, A> {
    fn drop(&mut self) {
        let mut released = 0;
        for observer in self.slots.iter_mut().filter_map(Option::take) {
            if observer.release().is_ok() {
                released += 1;
            }
        }
        if released > 0 {
            log::debug!("Released {} observers on {} observable teardown", released, self.kind);
        }
    }
}

impl<S, A> fmt::Debug for Observable<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("kind", &self.kind)
            .field("capacity", &self.capacity())
            .field("registered", &self.ids().collect::<Vec<_>>())
            .field("next_id", &self.next_id)
            .field("custom_action", &self.has_custom_action())
            .finish()
    }
}
