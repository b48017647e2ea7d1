//! Drives resolution runs and keeps only the latest one.

use super::{Geolocator, Resolution, WeatherResolver, WeatherServices};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

/// What the weather card should show
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherState {
    Loading,
    Ready(Resolution),
}

/// Owns the resolver and the displayed state. Every refresh takes a ticket;
/// a finished run is committed only if no newer refresh started meanwhile.
pub struct WeatherController<S, G> {
    resolver: WeatherResolver<S, G>,
    latest_ticket: Cell<u64>,
    state: RefCell<WeatherState>,
    on_state_changed_callbacks: RefCell<Vec<Rc<dyn Fn(&WeatherState)>>>,
}

impl<S: WeatherServices + 'static, G: Geolocator + 'static> WeatherController<S, G> {
    pub fn new(resolver: WeatherResolver<S, G>) -> Rc<Self> {
        Rc::new(Self {
            resolver,
            latest_ticket: Cell::new(0),
            state: RefCell::new(WeatherState::Loading),
            on_state_changed_callbacks: RefCell::new(Vec::new()),
        })
    }

    pub fn state(&self) -> WeatherState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn connect_state_changed<F: Fn(&WeatherState) + 'static>(&self, callback: F) {
        self.on_state_changed_callbacks
            .borrow_mut()
            .push(Rc::new(callback));
    }

    fn set_state(&self, state: WeatherState) {
        *self.state.borrow_mut() = state.clone();
        let callbacks: Vec<_> = self.on_state_changed_callbacks.borrow().iter().cloned().collect();
        for callback in callbacks {
            callback(&state);
        }
    }

    /// Start a run for `city` (blank means device location).
    ///
    /// The ticket is taken and the state switched to loading before this
    /// returns; the returned future performs the lookups and commits.
    pub fn refresh(self: &Rc<Self>, city: &str) -> impl Future<Output = ()> + 'static {
        let ticket = self.latest_ticket.get() + 1;
        self.latest_ticket.set(ticket);
        self.set_state(WeatherState::Loading);
        log::debug!("Weather run {} started for {:?}", ticket, city);

        let this = Rc::clone(self);
        let city = city.to_string();
        async move {
            let resolution = this.resolver.resolve(&city).await;
            if this.latest_ticket.get() != ticket {
                log::debug!("Dropping stale weather run {} for {:?}", ticket, city);
                return;
            }
            match &resolution {
                Resolution::Success(report) => log::info!("Weather: {}°C in {}", report.temperature_c, report.city),
                Resolution::Partial(report, warning) => {
                    log::info!("Weather: {}°C in {} ({})", report.temperature_c, report.city, warning)
                }
                Resolution::Failure(message) => log::warn!("Weather unavailable: {}", message),
            }
            this.set_state(WeatherState::Ready(resolution));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::testing::{FakeLocator, FakeServices};
    use crate::weather::{Coordinates, LookupError};
    use futures::executor::block_on;
    use futures::join;

    fn controller(services: FakeServices) -> Rc<WeatherController<FakeServices, FakeLocator>> {
        WeatherController::new(WeatherResolver::new(
            services,
            FakeLocator(Err(LookupError::Unsupported)),
        ))
    }

    #[test]
    fn test_initial_state_is_loading() {
        let controller = controller(FakeServices::default());
        assert_eq!(controller.state(), WeatherState::Loading);
    }

    #[test]
    fn test_single_run_commits() {
        let controller = controller(FakeServices::default().with_place("Oslo", 59.9, 10.7));
        block_on(controller.refresh("Oslo"));
        match controller.state() {
            WeatherState::Ready(Resolution::Success(report)) => assert_eq!(report.city, "Oslo"),
            other => panic!("Expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_latest_run_wins_when_earlier_is_slower() {
        let services = FakeServices::default()
            .with_place("Alpha", 10.0, 0.0)
            .with_place("Beta", 20.0, 0.0);
        let release_alpha = services.gate("Alpha");
        let controller = controller(services);

        let committed = Rc::new(RefCell::new(Vec::new()));
        let committed_clone = Rc::clone(&committed);
        controller.connect_state_changed(move |state| {
            if let WeatherState::Ready(resolution) = state {
                let city = resolution.report().map(|r| r.city.clone());
                committed_clone.borrow_mut().push(city);
            }
        });

        let run_a = controller.refresh("Alpha");
        let run_b = controller.refresh("Beta");

        // B completes while A is still waiting on geocoding, then A finishes
        let finish_b_then_release_a = async {
            run_b.await;
            let _ = release_alpha.send(());
        };
        block_on(async { join!(run_a, finish_b_then_release_a) });

        assert_eq!(*committed.borrow(), [Some("Beta".to_string())]);
        match controller.state() {
            WeatherState::Ready(resolution) => {
                assert_eq!(resolution.report().unwrap().temperature_c, 20)
            }
            other => panic!("Expected ready state, got {:?}", other),
        }
    }

    #[test]
    fn test_refresh_reports_loading_first() {
        let controller = controller(FakeServices::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        controller.connect_state_changed(move |state| seen_clone.borrow_mut().push(state.clone()));

        let run = controller.refresh("");
        assert_eq!(*seen.borrow(), [WeatherState::Loading]);
        block_on(run);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        match &seen[1] {
            WeatherState::Ready(Resolution::Partial(report, _)) => {
                assert_eq!(report.city, "New York");
                assert_eq!(report.temperature_c, 41);
            }
            other => panic!("Expected partial result, got {:?}", other),
        }
    }

    #[test]
    fn test_located_run_uses_locator() {
        let controller = WeatherController::new(WeatherResolver::new(
            FakeServices {
                reverse_name: Some("Quito".to_string()),
                ..Default::default()
            },
            FakeLocator(Ok(Coordinates::new(-0.2, -78.5))),
        ));
        block_on(controller.refresh(""));
        assert_eq!(
            controller.state(),
            WeatherState::Ready(Resolution::Success(crate::weather::WeatherReport {
                temperature_c: 0,
                city: "Quito".to_string(),
                icon: crate::weather::WeatherIcon::Clear,
            }))
        );
    }
}
