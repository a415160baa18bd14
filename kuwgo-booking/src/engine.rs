use kuwgo_core::events::publish_event;
use kuwgo_core::{
    BookingRepository, Clock, EventPublisher, MessagingSender, NotificationRepository, PaymentDetails,
    RedemptionRepository, Reservation, SeatClaim, SeatConflict, SeatLedger, StoreResult, TripCatalog,
};
use kuwgo_shared::models::events::{
    BookingCancelledEvent, BookingConfirmedEvent, TripStatusChangedEvent, BOOKING_CANCELLED_TOPIC,
    BOOKING_CONFIRMED_TOPIC, TRIP_STATUS_TOPIC,
};
use kuwgo_shared::pii::Masked;
use kuwgo_shared::{Booking, BookingStatus, Notification, PointRedemption, Trip, TripStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dispatcher::{DispatchReport, NotificationDispatcher};
use crate::error::{BookingError, BookingResult};
use crate::locks::KeyedLocks;
use crate::loyalty::{LoyaltyLedger, LoyaltySummary};
use crate::refund::{self, RefundQuote};
use crate::state_machine::{transition, BookingAction, Outcome};
use crate::sweeper::TripCleanupSweeper;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Flat price charged for every seat
    pub seat_price: Decimal,
    pub lock_timeout: Duration,
    /// Receipt address used when the payer supplies none
    pub default_receipt_email: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            seat_price: Decimal::new(2000, 3),
            lock_timeout: Duration::from_millis(2000),
            default_receipt_email: "receipts@kuwgo.local".to_string(),
        }
    }
}

/// Collaborators the engine is wired with
#[derive(Clone)]
pub struct EngineDeps {
    pub catalog: Arc<dyn TripCatalog>,
    pub bookings: Arc<dyn BookingRepository>,
    pub redemptions: Arc<dyn RedemptionRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub seats: Arc<dyn SeatLedger>,
    pub sender: Arc<dyn MessagingSender>,
    pub events: Arc<dyn EventPublisher>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub trip_id: Uuid,
    pub seat_number: u32,
    pub passenger_name: String,
    pub passenger_phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cancellation {
    pub booking: Booking,
    pub refund: RefundQuote,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripStatusUpdate {
    pub trip: Trip,
    pub notifications: DispatchReport,
}

/// Entry point for every booking lifecycle operation
pub struct BookingEngine {
    catalog: Arc<dyn TripCatalog>,
    bookings: Arc<dyn BookingRepository>,
    seats: Arc<dyn SeatLedger>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    dispatcher: Arc<NotificationDispatcher>,
    loyalty: LoyaltyLedger,
    settings: EngineSettings,
    booking_locks: KeyedLocks<Uuid>,
    seat_locks: KeyedLocks<(Uuid, u32)>,
}

impl BookingEngine {
    pub fn new(deps: EngineDeps, settings: EngineSettings) -> Self {
        let dispatcher = Arc::new(NotificationDispatcher::new(
            deps.bookings.clone(),
            deps.notifications.clone(),
            deps.sender.clone(),
            deps.clock.clone(),
        ));
        let loyalty = LoyaltyLedger::new(deps.bookings.clone(), deps.redemptions.clone(), settings.lock_timeout);

        Self {
            catalog: deps.catalog,
            bookings: deps.bookings,
            seats: deps.seats,
            events: deps.events,
            clock: deps.clock,
            dispatcher,
            loyalty,
            booking_locks: KeyedLocks::new("booking", settings.lock_timeout),
            seat_locks: KeyedLocks::new("seat", settings.lock_timeout),
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn sweeper(&self) -> TripCleanupSweeper {
        TripCleanupSweeper::new(self.catalog.clone(), self.dispatcher.clone(), self.clock.clone())
    }

    /// Reserve the seat and persist a PendingPayment booking. The seat claim is
    /// rolled back if the booking cannot be stored.
    pub async fn create(&self, request: NewBooking, user_id: Option<String>) -> BookingResult<Booking> {
        let trip = self.load_trip(request.trip_id).await?;
        let train = self.catalog.get_train(trip.train_id).await?.ok_or_else(|| BookingError::NotFound {
            entity: "Train",
            id: trip.train_id.to_string(),
        })?;

        if !train.has_seat(request.seat_number) {
            return Err(BookingError::InvalidSeat {
                seat_number: request.seat_number,
                total_seats: train.total_seats,
            });
        }

        let booking = Booking::new(
            trip.id,
            request.seat_number,
            request.passenger_name,
            request.passenger_phone,
            self.settings.seat_price,
            user_id,
            self.clock.now(),
        );

        let _seat = self.seat_locks.acquire(&(trip.id, booking.seat_number)).await?;

        if self.seats.try_reserve(trip.id, booking.seat_number, booking.id).await? == Reservation::AlreadyTaken {
            warn!(trip_id = %trip.id, seat = booking.seat_number, "Seat already taken");
            return Err(BookingError::SeatTaken { trip_id: trip.id, seat_number: booking.seat_number });
        }

        if let Err(e) = self.bookings.insert_booking(&booking).await {
            if let Err(release_err) = self.seats.release(trip.id, booking.seat_number).await {
                error!("Failed to roll back seat claim for booking {}: {}", booking.id, release_err);
            }
            if e.downcast_ref::<SeatConflict>().is_some() {
                warn!(trip_id = %trip.id, seat = booking.seat_number, "Seat already held in storage");
                return Err(BookingError::SeatTaken { trip_id: trip.id, seat_number: booking.seat_number });
            }
            error!("Failed to store booking {}: {}", booking.id, e);
            return Err(e.into());
        }

        info!(
            booking_id = %booking.id,
            trip_id = %trip.id,
            seat = booking.seat_number,
            phone = %Masked(&booking.passenger_phone),
            "Booking created, awaiting payment"
        );
        Ok(booking)
    }

    /// PendingPayment → Confirmed. Receipts go out after the transition is stored.
    pub async fn confirm_payment(&self, id: Uuid, user_id: &str, payment: PaymentDetails) -> BookingResult<Booking> {
        let booking = {
            let _guard = self.booking_locks.acquire(&id).await?;
            let mut booking = self.load_owned(id, user_id).await?;

            let Outcome::Becomes(next) = transition(booking.status, BookingAction::Confirm)? else {
                return Err(BookingError::InvalidState { from: booking.status, action: "confirm" });
            };
            payment.validate()?;

            self.bookings.update_booking_status(id, next).await?;
            booking.status = next;
            booking
        };

        info!(booking_id = %id, method = %payment.method, "Payment confirmed");

        let receipt_to = payment
            .receipt_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(self.settings.default_receipt_email.as_str());
        let subject = format!("KuwGo Rail booking {} confirmed", booking.short_id());
        let body = format!(
            "Dear {}, your booking {} for seat {} is confirmed. Amount paid: {} KWD via {}.",
            booking.passenger_name,
            booking.short_id(),
            booking.seat_number,
            booking.price,
            payment.method
        );
        self.dispatcher.send_email(receipt_to, &subject, &body, Some(booking.id)).await;

        let sms = format!(
            "KuwGo Rail: booking {} confirmed, seat {}. Paid {} KWD.",
            booking.short_id(),
            booking.seat_number,
            booking.price
        );
        self.dispatcher.send_sms(&booking.passenger_phone, &sms, Some(booking.trip_id), Some(booking.id)).await;

        let event = BookingConfirmedEvent {
            booking_id: booking.id,
            trip_id: booking.trip_id,
            seat_number: booking.seat_number,
            user_id: booking.user_id.clone(),
            price: booking.price,
            payment_method: payment.method.to_string(),
            timestamp: self.clock.now().timestamp(),
        };
        publish_event(self.events.as_ref(), BOOKING_CONFIRMED_TOPIC, &booking.id.to_string(), &event).await;

        Ok(booking)
    }

    /// Cancel before departure, free the seat and report the refund
    pub async fn cancel(&self, id: Uuid, user_id: &str) -> BookingResult<Cancellation> {
        let (booking, refund) = {
            let _guard = self.booking_locks.acquire(&id).await?;
            let mut booking = self.load_owned(id, user_id).await?;

            let Outcome::Becomes(next) = transition(booking.status, BookingAction::Cancel)? else {
                return Err(BookingError::InvalidState { from: booking.status, action: "cancel" });
            };
            let trip = self.load_trip(booking.trip_id).await?;
            let now = self.clock.now();
            if trip.has_departed(now) {
                return Err(BookingError::TripAlreadyDeparted(trip.id));
            }

            // Confirmed bookings carry points; keep redemptions out until the status lands
            let _points = match booking.status {
                BookingStatus::Confirmed => Some(self.loyalty.lock_user(&booking.user_id).await?),
                _ => None,
            };
            self.release_then(&booking, self.bookings.update_booking_status(id, next)).await?;
            booking.status = next;

            let refund = refund::quote(booking.id, booking.price, trip.departure_time, now);
            (booking, refund)
        };

        info!(
            booking_id = %id,
            deduction = %refund.deduction_percent,
            refund = %refund.refund_amount,
            "Booking cancelled"
        );

        let sms = format!(
            "KuwGo Rail: booking {} cancelled. Refund {} KWD ({}% deducted).",
            booking.short_id(),
            refund.display_amount(),
            refund.deduction_percent
        );
        self.dispatcher.send_sms(&booking.passenger_phone, &sms, Some(booking.trip_id), Some(booking.id)).await;

        let event = BookingCancelledEvent {
            booking_id: booking.id,
            trip_id: booking.trip_id,
            seat_number: booking.seat_number,
            deduction_percent: refund.deduction_percent,
            refund_amount: refund.refund_amount,
            timestamp: self.clock.now().timestamp(),
        };
        publish_event(self.events.as_ref(), BOOKING_CANCELLED_TOPIC, &booking.id.to_string(), &event).await;

        Ok(Cancellation { booking, refund })
    }

    /// What a cancellation would refund right now; nothing is changed
    pub async fn refund_quote(&self, id: Uuid, user_id: &str) -> BookingResult<RefundQuote> {
        let booking = self.load_owned(id, user_id).await?;
        transition(booking.status, BookingAction::Cancel)?;

        let trip = self.load_trip(booking.trip_id).await?;
        let now = self.clock.now();
        if trip.has_departed(now) {
            return Err(BookingError::TripAlreadyDeparted(trip.id));
        }
        Ok(refund::quote(booking.id, booking.price, trip.departure_time, now))
    }

    /// Remove an unpaid or cancelled booking; an unpaid one gives its seat back
    pub async fn delete(&self, id: Uuid, user_id: &str) -> BookingResult<()> {
        let _guard = self.booking_locks.acquire(&id).await?;
        let booking = self.load_owned(id, user_id).await?;

        transition(booking.status, BookingAction::Delete)?;

        let removed = if booking.status.holds_seat() {
            self.release_then(&booking, self.bookings.delete_booking(id)).await?
        } else {
            self.bookings.delete_booking(id).await?
        };
        if !removed {
            return Err(BookingError::booking_not_found(id));
        }

        info!(booking_id = %id, status = %booking.status, "Booking deleted");
        Ok(())
    }

    /// Free the booking's seat, then commit `change`. A failed release leaves
    /// everything untouched; a failed commit puts the claim back.
    async fn release_then<T>(
        &self,
        booking: &Booking,
        change: impl Future<Output = StoreResult<T>>,
    ) -> BookingResult<T> {
        let _seat = self.seat_locks.acquire(&(booking.trip_id, booking.seat_number)).await?;
        self.seats.release(booking.trip_id, booking.seat_number).await?;

        match change.await {
            Ok(value) => Ok(value),
            Err(e) => {
                error!("Failed to store change for booking {}: {}", booking.id, e);
                match self.seats.try_reserve(booking.trip_id, booking.seat_number, booking.id).await {
                    Ok(Reservation::Reserved) => {}
                    Ok(Reservation::AlreadyTaken) => {
                        error!(booking_id = %booking.id, seat = booking.seat_number, "Seat claimed while restoring it")
                    }
                    Err(restore_err) => error!("Failed to restore seat claim for booking {}: {}", booking.id, restore_err),
                }
                Err(e.into())
            }
        }
    }

    pub async fn get(&self, id: Uuid, user_id: &str) -> BookingResult<Booking> {
        self.load_owned(id, user_id).await
    }

    pub async fn list_user_bookings(&self, user_id: &str) -> BookingResult<Vec<Booking>> {
        Ok(self.bookings.list_by_user(user_id).await?)
    }

    pub async fn taken_seats(&self, trip_id: Uuid) -> BookingResult<BTreeSet<u32>> {
        self.load_trip(trip_id).await?;
        Ok(self.seats.list_taken(trip_id).await?)
    }

    /// Operator status edit: store it, notify affected passengers, then announce it
    pub async fn update_trip_status(
        &self,
        trip_id: Uuid,
        status: TripStatus,
        delay_minutes: Option<u32>,
    ) -> BookingResult<TripStatusUpdate> {
        let trip = self
            .catalog
            .update_trip_status(trip_id, status, delay_minutes)
            .await?
            .ok_or_else(|| BookingError::trip_not_found(trip_id))?;

        info!(trip_id = %trip_id, status = %trip.status, delay = ?trip.delay_minutes, "Trip status updated");

        let notifications = self.dispatcher.on_trip_status_changed(&trip).await?;

        let event = TripStatusChangedEvent {
            trip_id,
            status: trip.status.to_string(),
            delay_minutes: trip.delay_minutes,
            notifications_attempted: notifications.attempted,
            timestamp: self.clock.now().timestamp(),
        };
        publish_event(self.events.as_ref(), TRIP_STATUS_TOPIC, &trip_id.to_string(), &event).await;

        Ok(TripStatusUpdate { trip, notifications })
    }

    /// Rebuild the seat ledger from stored bookings; returns the number of claims
    pub async fn restore_seat_ledger(&self) -> BookingResult<usize> {
        let holding = self.bookings.list_seat_holding().await?;
        let claims: Vec<SeatClaim> = holding.iter().map(SeatClaim::from).collect();
        self.seats.restore(&claims).await?;

        info!("Seat ledger restored with {} claim(s)", claims.len());
        Ok(claims.len())
    }

    pub async fn list_notifications(&self) -> BookingResult<Vec<Notification>> {
        self.dispatcher.list_notifications().await
    }

    pub async fn points_balance(&self, user_id: &str) -> BookingResult<i64> {
        self.loyalty.balance(user_id).await
    }

    pub async fn redeem_points(&self, user_id: &str) -> BookingResult<PointRedemption> {
        self.loyalty.redeem(user_id, self.clock.now()).await
    }

    pub async fn loyalty_summary(&self, user_id: &str) -> BookingResult<LoyaltySummary> {
        self.loyalty.summary(user_id).await
    }

    async fn load_trip(&self, trip_id: Uuid) -> BookingResult<Trip> {
        self.catalog.get_trip(trip_id).await?.ok_or_else(|| BookingError::trip_not_found(trip_id))
    }

    async fn load_owned(&self, id: Uuid, user_id: &str) -> BookingResult<Booking> {
        let booking = self.bookings.get_booking(id).await?.ok_or_else(|| BookingError::booking_not_found(id))?;
        if !booking.is_owned_by(user_id) {
            return Err(BookingError::NotOwner(id));
        }
        Ok(booking)
    }
}
