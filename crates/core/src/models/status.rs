use serde::{Deserialize, Serialize};

/// Lifecycle states of a service booking.
///
/// The declaration order is the seed order of the `service_statuses` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    PendingConfirmation,
    CancelConfirmed,
    ArrivalConfirmed,
    NoShow,
    Arrived,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::PendingConfirmation,
        BookingStatus::CancelConfirmed,
        BookingStatus::ArrivalConfirmed,
        BookingStatus::NoShow,
        BookingStatus::Arrived,
    ];

    /// Status given to every newly admitted booking.
    pub const INITIAL: BookingStatus = BookingStatus::PendingConfirmation;

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PendingConfirmation => "PENDING_CONFIRMATION",
            BookingStatus::CancelConfirmed => "CANCEL_CONFIRMED",
            BookingStatus::ArrivalConfirmed => "ARRIVAL_CONFIRMED",
            BookingStatus::NoShow => "NO_SHOW",
            BookingStatus::Arrived => "ARRIVED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
    }

    /// Whether a booking in this status holds one unit of its schedule's quota.
    pub fn is_quota_consuming(&self) -> bool {
        !matches!(self, BookingStatus::CancelConfirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `service_statuses` reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    pub id: i32,
    pub name: String,
}
