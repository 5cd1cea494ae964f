//! Ticket checkout: guarded entry, event load, booking submission.

use serde::Serialize;
use thiserror::Error;

use crate::api::errors::ApiError;
use crate::api::{BookingWriter, EventReader};
use crate::domain::booking::Booking;
use crate::domain::event::Event;
use crate::domain::types::EventId;
use crate::forms::checkout::{CheckoutForm, CheckoutPayload};
use crate::forms::state::{FormState, SubmitOutcome};
use crate::forms::{FormError, FormFields};
use crate::services::countdown::Countdown;
use crate::services::events::select_quantity;
use crate::session::Role;
use crate::toast::ToastLevel;

pub const EVENTS_PATH: &str = "/events";
pub const ADMIN_CANNOT_BOOK: &str = "Admins cannot book tickets. Please login as a user.";
pub const LOGIN_TO_BOOK: &str = "Please login to book tickets";
pub const LOAD_FAILED: &str = "Failed to load event";
pub const BOOKING_FAILED: &str = "Booking failed";
pub const BOOKING_CONFIRMED: &str = "Booking confirmed!";
pub const SOLD_OUT: &str = "This event is sold out";
pub const INVALID_QUANTITY: &str = "Please select a valid quantity";

/// Toast raised by a state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: ToastLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutState {
    LoadingEvent { event_id: EventId, quantity: i64 },
    Ready { event: Event, quantity: u32 },
    Submitting { event: Event, quantity: u32 },
    Success { booking: Booking, countdown: Countdown },
    Redirect { to: String, notice: Notice },
}

#[derive(Debug, Error)]
enum BookingError {
    #[error("admin session")]
    Admin,
    #[error("anonymous session")]
    Anonymous,
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of a submission attempt: the form to redisplay and an optional toast.
#[derive(Debug)]
pub struct SubmitReport {
    pub form: FormState,
    pub notice: Option<Notice>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CheckoutFlow {
    state: CheckoutState,
    /// Set when the requested quantity had to be adjusted on load.
    adjustment: Option<Notice>,
}

fn redirect_to_events(notice: Notice) -> CheckoutState {
    CheckoutState::Redirect {
        to: EVENTS_PATH.to_string(),
        notice,
    }
}

impl CheckoutFlow {
    /// Applies the role guard before anything is fetched.
    pub fn enter(role: Role, event_id: &str, requested: Option<i64>) -> Self {
        let state = match role {
            Role::Admin => redirect_to_events(Notice::error(ADMIN_CANNOT_BOOK)),
            Role::Anonymous => redirect_to_events(Notice::error(LOGIN_TO_BOOK)),
            Role::User => match EventId::new(event_id) {
                Ok(event_id) => CheckoutState::LoadingEvent {
                    event_id,
                    quantity: requested.unwrap_or(1),
                },
                Err(_) => redirect_to_events(Notice::error(LOAD_FAILED)),
            },
        };
        Self {
            state,
            adjustment: None,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Warning raised when the requested quantity was clamped.
    pub fn adjustment(&self) -> Option<&Notice> {
        self.adjustment.as_ref()
    }

    pub fn into_state(self) -> CheckoutState {
        self.state
    }

    /// Fetches the event and clamps the carried quantity to what is left.
    /// A sold-out event sends the user back to its details page.
    pub async fn load<R>(&mut self, repo: &R)
    where
        R: EventReader + ?Sized,
    {
        let CheckoutState::LoadingEvent { event_id, quantity } = &self.state else {
            return;
        };
        let requested = *quantity;

        self.state = match repo.get_event(event_id).await {
            Ok(event) => {
                let selection = select_quantity(requested, event.available_seats);
                if selection.is_bookable(event.available_seats) {
                    self.adjustment = selection.error.map(Notice::warning);
                    CheckoutState::Ready {
                        quantity: selection.quantity,
                        event,
                    }
                } else {
                    let message = if event.available_seats == 0 {
                        SOLD_OUT.to_string()
                    } else {
                        selection.error.unwrap_or_else(|| INVALID_QUANTITY.to_string())
                    };
                    CheckoutState::Redirect {
                        to: format!("{EVENTS_PATH}/{}", event.id),
                        notice: Notice::error(message),
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to load event {event_id} for checkout: {e}");
                redirect_to_events(Notice::error(e.user_message(LOAD_FAILED)))
            }
        };
    }

    /// Price times quantity while an event is loaded.
    pub fn total_amount(&self) -> Option<f64> {
        match &self.state {
            CheckoutState::Ready { event, quantity }
            | CheckoutState::Submitting { event, quantity } => Some(event.total_for(*quantity)),
            CheckoutState::Success { booking, .. } => Some(booking.total_amount),
            _ => None,
        }
    }

    /// Validates contact details, re-checks the role and posts the booking.
    pub async fn submit<R>(&mut self, repo: &R, role: Role, form: CheckoutForm) -> SubmitReport
    where
        R: BookingWriter + ?Sized,
    {
        let mut form_state = form.state();

        let CheckoutState::Ready { event, quantity } = &self.state else {
            return SubmitReport {
                form: form_state,
                notice: None,
            };
        };
        let (event, quantity) = (event.clone(), *quantity);

        if quantity == 0 || quantity > event.available_seats {
            return SubmitReport {
                form: form_state,
                notice: Some(Notice::error(INVALID_QUANTITY)),
            };
        }

        if !form_state.validate_all() {
            return SubmitReport {
                form: form_state,
                notice: None,
            };
        }

        self.state = CheckoutState::Submitting {
            event: event.clone(),
            quantity,
        };

        let event_id = event.id.clone();
        let outcome = form_state
            .submit(move |_| async move {
                match role {
                    Role::Admin => return Err(BookingError::Admin),
                    Role::Anonymous => return Err(BookingError::Anonymous),
                    Role::User => {}
                }
                let booking = CheckoutPayload::try_from(form)?.into_booking(event_id, quantity);
                Ok::<Booking, BookingError>(repo.create_booking(&booking).await?)
            })
            .await;

        let ready = CheckoutState::Ready { event, quantity };
        let notice = match outcome {
            SubmitOutcome::Completed(booking) => {
                log::info!("Booking {} confirmed", booking.id);
                self.state = CheckoutState::Success {
                    booking,
                    countdown: Countdown::default(),
                };
                Some(Notice::success(BOOKING_CONFIRMED))
            }
            SubmitOutcome::Failed(BookingError::Anonymous) => {
                self.state = redirect_to_events(Notice::error(LOGIN_TO_BOOK));
                None
            }
            SubmitOutcome::Failed(BookingError::Admin) => {
                self.state = ready;
                Some(Notice::error("Admins cannot book tickets."))
            }
            SubmitOutcome::Failed(BookingError::Api(e)) => {
                log::error!("Failed to create booking: {e}");
                self.state = ready;
                Some(Notice::error(e.user_message(BOOKING_FAILED)))
            }
            SubmitOutcome::Failed(BookingError::Form(e)) => {
                self.state = ready;
                Some(Notice::error(e.to_string()))
            }
            SubmitOutcome::Invalid | SubmitOutcome::Busy => {
                self.state = ready;
                None
            }
        };

        SubmitReport {
            form: form_state,
            notice,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::api::fixtures;
    use crate::api::mock::MockBackend;

    fn contact() -> CheckoutForm {
        CheckoutForm {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            mobile: "9876543210".to_string(),
            quantity: 2,
        }
    }

    fn ready_flow(backend: &mut MockBackend) -> CheckoutFlow {
        let date = Utc::now() + Duration::days(7);
        backend
            .expect_get_event()
            .times(1)
            .returning(move |_| Ok(fixtures::event("ev1", date)));
        CheckoutFlow::enter(Role::User, "ev1", Some(2))
    }

    #[test]
    fn anonymous_is_redirected_before_fetch() {
        let flow = CheckoutFlow::enter(Role::Anonymous, "ev1", None);
        assert_eq!(
            flow.into_state(),
            CheckoutState::Redirect {
                to: "/events".to_string(),
                notice: Notice::error(LOGIN_TO_BOOK),
            }
        );
    }

    #[actix_web::test]
    async fn admin_entry_never_fetches() {
        let mut backend = MockBackend::new();
        backend.expect_get_event().times(0);

        let mut flow = CheckoutFlow::enter(Role::Admin, "ev1", None);
        flow.load(&backend).await;

        assert!(matches!(
            flow.state(),
            CheckoutState::Redirect { notice, .. } if notice.message == ADMIN_CANNOT_BOOK
        ));
    }

    #[actix_web::test]
    async fn load_failure_redirects_with_backend_message() {
        let mut backend = MockBackend::new();
        backend.expect_get_event().times(1).returning(|_| {
            Err(ApiError::Backend {
                status: 500,
                message: String::new(),
            })
        });

        let mut flow = CheckoutFlow::enter(Role::User, "ev1", None);
        flow.load(&backend).await;

        assert_eq!(
            flow.into_state(),
            CheckoutState::Redirect {
                to: "/events".to_string(),
                notice: Notice::error(LOAD_FAILED),
            }
        );
    }

    #[actix_web::test]
    async fn quantity_two_at_five_hundred_totals_one_thousand() {
        let mut backend = MockBackend::new();
        let mut flow = ready_flow(&mut backend);
        backend
            .expect_create_booking()
            .withf(|booking| booking.event_id.as_str() == "ev1" && booking.quantity == 2)
            .times(1)
            .returning(|_| Ok(fixtures::booking("b1", "ev1", 2)));

        flow.load(&backend).await;
        assert_eq!(flow.total_amount(), Some(1000.0));

        let report = flow.submit(&backend, Role::User, contact()).await;

        assert_eq!(report.notice, Some(Notice::success(BOOKING_CONFIRMED)));
        match flow.state() {
            CheckoutState::Success { booking, countdown } => {
                assert_eq!(booking.total_amount, 1000.0);
                assert!(booking.qr.is_some());
                assert_eq!(countdown.remaining(), 5);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[actix_web::test]
    async fn quantity_is_clamped_to_available_seats() {
        let mut backend = MockBackend::new();
        let date = Utc::now() + Duration::days(7);
        backend
            .expect_get_event()
            .returning(move |_| Ok(fixtures::event("ev1", date)));

        let mut flow = CheckoutFlow::enter(Role::User, "ev1", Some(9));
        flow.load(&backend).await;

        assert!(matches!(flow.state(), CheckoutState::Ready { quantity: 3, .. }));
        assert_eq!(
            flow.adjustment(),
            Some(&Notice::warning("Only 3 seats available"))
        );
    }

    #[actix_web::test]
    async fn negative_quantity_starts_at_one_with_warning() {
        let mut backend = MockBackend::new();
        let date = Utc::now() + Duration::days(7);
        backend
            .expect_get_event()
            .returning(move |_| Ok(fixtures::event("ev1", date)));

        let mut flow = CheckoutFlow::enter(Role::User, "ev1", Some(-1));
        flow.load(&backend).await;

        assert!(matches!(flow.state(), CheckoutState::Ready { quantity: 1, .. }));
        assert_eq!(
            flow.adjustment(),
            Some(&Notice::warning("Quantity must be at least 1"))
        );
    }

    #[actix_web::test]
    async fn sold_out_event_never_posts_a_booking() {
        let mut backend = MockBackend::new();
        let date = Utc::now() + Duration::days(7);
        backend.expect_get_event().times(1).returning(move |_| {
            let mut event = fixtures::event("ev1", date);
            event.available_seats = 0;
            Ok(event)
        });
        backend.expect_create_booking().times(0);

        let mut flow = CheckoutFlow::enter(Role::User, "ev1", Some(1));
        flow.load(&backend).await;
        let report = flow.submit(&backend, Role::User, contact()).await;

        assert_eq!(report.notice, None);
        assert_eq!(
            flow.into_state(),
            CheckoutState::Redirect {
                to: "/events/ev1".to_string(),
                notice: Notice::error(SOLD_OUT),
            }
        );
    }

    #[actix_web::test]
    async fn admin_submission_never_posts() {
        let mut backend = MockBackend::new();
        let mut flow = ready_flow(&mut backend);
        backend.expect_create_booking().times(0);

        flow.load(&backend).await;
        let report = flow.submit(&backend, Role::Admin, contact()).await;

        assert_eq!(report.notice, Some(Notice::error("Admins cannot book tickets.")));
        assert!(matches!(flow.state(), CheckoutState::Ready { .. }));
    }

    #[actix_web::test]
    async fn anonymous_submission_redirects() {
        let mut backend = MockBackend::new();
        let mut flow = ready_flow(&mut backend);
        backend.expect_create_booking().times(0);

        flow.load(&backend).await;
        flow.submit(&backend, Role::Anonymous, contact()).await;

        assert!(matches!(flow.state(), CheckoutState::Redirect { .. }));
    }

    #[actix_web::test]
    async fn invalid_contact_stays_ready_with_field_errors() {
        let mut backend = MockBackend::new();
        let mut flow = ready_flow(&mut backend);
        backend.expect_create_booking().times(0);

        flow.load(&backend).await;
        let report = flow
            .submit(
                &backend,
                Role::User,
                CheckoutForm {
                    mobile: "12345".to_string(),
                    ..contact()
                },
            )
            .await;

        assert_eq!(report.notice, None);
        assert!(report.form.visible_error("mobile").is_some());
        assert!(matches!(flow.state(), CheckoutState::Ready { .. }));
    }

    #[actix_web::test]
    async fn backend_failure_returns_to_ready() {
        let mut backend = MockBackend::new();
        let mut flow = ready_flow(&mut backend);
        backend
            .expect_create_booking()
            .times(1)
            .returning(|_| Err(ApiError::Rejected("Not enough seats".to_string())));

        flow.load(&backend).await;
        let report = flow.submit(&backend, Role::User, contact()).await;

        assert_eq!(report.notice, Some(Notice::error("Not enough seats")));
        assert!(matches!(flow.state(), CheckoutState::Ready { quantity: 2, .. }));
    }
}
