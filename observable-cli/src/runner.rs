//! Script execution
//!
//! Builds the notice board, its observable and the declared observers, then runs the
//! script steps in order. Registry errors are part of the demo: they are reported as
//! failed steps, never abort the run.

use anyhow::{Context, Result};
use observable_registry::{Observable, Observer, ObserverId, ObserverRef, RegistryError};
use std::cell::Cell;
use std::rc::Rc;

use crate::config::{DemoScript, ObserverConfig, ObserverType, Step};
use crate::console::{ConsoleObserver, TallyObserver};
use crate::notice::NoticeBoard;
use crate::report::{ObserverSummary, RunReport, StepOutcome};

enum Handler {
    Console(Rc<ConsoleObserver>),
    Tally(Rc<TallyObserver>),
}

struct NamedObserver {
    name: String,
    kind: ObserverType,
    observer: ObserverRef<NoticeBoard>,
    handler: Handler,
}

impl NamedObserver {
    fn new(config: &ObserverConfig, echo: bool) -> Self {
        let (observer, handler) = match config.kind {
            ObserverType::Console => {
                let console = Rc::new(ConsoleObserver::new(&config.name, echo));
                (Observer::shared(Rc::clone(&console)), Handler::Console(console))
            }
            ObserverType::Tally => {
                let tally = Rc::new(TallyObserver::new(&config.name));
                (Observer::shared(Rc::clone(&tally)), Handler::Tally(tally))
            }
        };
        Self {
            name: config.name.clone(),
            kind: config.kind,
            observer,
            handler,
        }
    }

    fn received(&self) -> usize {
        match &self.handler {
            Handler::Console(console) => console.printed().len(),
            Handler::Tally(tally) => tally.total(),
        }
    }

    fn summary(&self) -> ObserverSummary {
        ObserverSummary {
            name: self.name.clone(),
            kind: self.kind,
            id: self.observer.id(),
            released: self.observer.is_released(),
            received: self.received(),
        }
    }
}

/// Executes a [`DemoScript`] against a fresh notice board
pub struct Runner {
    board: Rc<NoticeBoard>,
    observable: Observable<NoticeBoard, String>,
    observers: Vec<NamedObserver>,
    action_runs: Rc<Cell<usize>>,
}

impl Runner {
    /// `echo` makes console observers print to stdout
    pub fn new(script: &DemoScript, echo: bool) -> Result<Self> {
        let board = Rc::new(NoticeBoard::new());
        let action_runs = Rc::new(Cell::new(0));

        let runs = Rc::clone(&action_runs);
        let observable = Observable::new(
            Rc::clone(&board),
            script.registry.kind,
            script.registry.registry_config(),
        )
        .context("Failed to create observable")?
        .with_custom_action(move |payload: Option<&String>| {
            runs.set(runs.get() + 1);
            match payload {
                Some(payload) => log::info!("Custom action ran with payload: {}", payload),
                None => log::info!("Custom action ran without payload"),
            }
            Ok(())
        });

        let observers = script
            .observers
            .iter()
            .map(|config| NamedObserver::new(config, echo))
            .collect();

        Ok(Self {
            board,
            observable,
            observers,
            action_runs,
        })
    }

    /// Run every step and collect the outcome
    pub fn run(mut self, steps: &[Step]) -> RunReport {
        let mut report = RunReport::new(self.observable.kind(), self.observable.capacity());

        for (index, step) in steps.iter().enumerate() {
            let outcome = self.execute(step);
            if outcome.ok {
                log::debug!("Step {} ({}): {}", index + 1, outcome.step, outcome.detail);
            } else {
                log::warn!("Step {} ({}) failed: {}", index + 1, outcome.step, outcome.detail);
            }
            report.steps.push(outcome);
        }

        report.observers = self.observers.iter().map(NamedObserver::summary).collect();
        report.custom_action_runs = self.action_runs.get();
        report
    }

    fn execute(&mut self, step: &Step) -> StepOutcome {
        match step {
            Step::Register { observer } => {
                let label = format!("register {}", observer);
                let Some(handle) = self.handle(observer) else {
                    return StepOutcome::undeclared(label, observer);
                };
                match self.observable.register(&handle) {
                    Ok(id) => StepOutcome::success(label, format!("assigned {}", id)),
                    Err(e) => StepOutcome::failure(label, e.to_string()),
                }
            }
            Step::Unregister { observer } => {
                let label = format!("unregister {}", observer);
                let Some(handle) = self.handle(observer) else {
                    return StepOutcome::undeclared(label, observer);
                };
                match self.observable.unregister(&handle) {
                    Ok(()) => StepOutcome::success(label, "unregistered"),
                    Err(RegistryError::NotFound) => {
                        StepOutcome::failure(label, "observer not found")
                    }
                    Err(e) => StepOutcome::failure(label, e.to_string()),
                }
            }
            Step::Publish {
                severity,
                message,
                target,
            } => {
                self.board.post(*severity, message.as_str());
                match target {
                    Some(name) => {
                        let label = format!("publish {} to {}", severity, name);
                        let Some(handle) = self.handle(name) else {
                            return StepOutcome::undeclared(label, name);
                        };
                        match self.observable.notify_one(&handle) {
                            Ok(()) => StepOutcome::success(label, "delivered"),
                            Err(RegistryError::NotFound) => {
                                StepOutcome::failure(label, "observer not found")
                            }
                            Err(e) => StepOutcome::failure(label, e.to_string()),
                        }
                    }
                    None => {
                        let label = format!("publish {} to all", severity);
                        let broadcast = self.observable.notify_all();
                        let detail = format!(
                            "delivered to {} of {} observers",
                            broadcast.delivered,
                            broadcast.visited()
                        );
                        if broadcast.is_complete() {
                            StepOutcome::success(label, detail)
                        } else {
                            StepOutcome::failure(label, detail)
                        }
                    }
                }
            }
            Step::RunAction { payload } => {
                let label = "run custom action".to_string();
                match self.observable.run_custom_action(payload.as_ref()) {
                    Ok(()) => StepOutcome::success(label, "done"),
                    Err(e) => StepOutcome::failure(label, e.to_string()),
                }
            }
            Step::Find { id } => {
                let label = format!("find #{}", id);
                let Some(id) = ObserverId::new(*id) else {
                    return StepOutcome::failure(label, "0 is not a valid observer id");
                };
                match self.observable.find_by_id(id) {
                    Some(found) => {
                        let name = self
                            .observers
                            .iter()
                            .find(|named| Rc::ptr_eq(&named.observer, found))
                            .map_or("?", |named| named.name.as_str());
                        StepOutcome::success(label, format!("observer was found: {}", name))
                    }
                    None => StepOutcome::failure(label, "requested observer was not found"),
                }
            }
        }
    }

    fn handle(&self, name: &str) -> Option<ObserverRef<NoticeBoard>> {
        self.observers
            .iter()
            .find(|named| named.name == name)
            .map(|named| Rc::clone(&named.observer))
    }
}
