use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::time::Timestamp;

/// Operational status of a trip as set by operators or the cleanup sweeper
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    OnTime,
    Delayed,
    Cancelled,
    Arrived,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::OnTime => "ON_TIME",
            TripStatus::Delayed => "DELAYED",
            TripStatus::Cancelled => "CANCELLED",
            TripStatus::Arrived => "ARRIVED",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON_TIME" => Ok(TripStatus::OnTime),
            "DELAYED" => Ok(TripStatus::Delayed),
            "CANCELLED" => Ok(TripStatus::Cancelled),
            "ARRIVED" => Ok(TripStatus::Arrived),
            other => Err(format!("unknown trip status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Train {
    pub id: Uuid,
    pub train_number: String,
    pub train_type: String,
    pub total_seats: u32,
}

impl Train {
    /// Seats are numbered from 1 up to the train's capacity
    pub fn has_seat(&self, seat_number: u32) -> bool {
        seat_number >= 1 && seat_number <= self.total_seats
    }
}

/// A scheduled run of a train between two stations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trip {
    pub id: Uuid,
    pub train_id: Uuid,
    pub from_station_id: Uuid,
    pub to_station_id: Uuid,
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
    pub status: TripStatus,
    /// Only meaningful while `status` is `Delayed`
    pub delay_minutes: Option<u32>,
}

impl Trip {
    pub fn new(
        train_id: Uuid,
        from_station_id: Uuid,
        to_station_id: Uuid,
        departure_time: Timestamp,
        arrival_time: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            train_id,
            from_station_id,
            to_station_id,
            departure_time,
            arrival_time,
            status: TripStatus::OnTime,
            delay_minutes: None,
        }
    }

    pub fn has_valid_schedule(&self) -> bool {
        self.arrival_time > self.departure_time
    }

    pub fn has_departed(&self, now: Timestamp) -> bool {
        self.departure_time <= now
    }

    pub fn has_arrived(&self, now: Timestamp) -> bool {
        self.arrival_time <= now
    }

    /// Short reference printed in passenger-facing messages
    pub fn short_id(&self) -> String {
        self.id.to_string()[..5].to_string()
    }

    /// Apply an operator status edit; delay minutes are dropped unless the trip is delayed.
    pub fn set_status(&mut self, status: TripStatus, delay_minutes: Option<u32>) {
        self.status = status;
        self.delay_minutes = match status {
            TripStatus::Delayed => delay_minutes,
            _ => None,
        };
    }
}
