//! Status Registry: the resolved `service_statuses` table and the quota rule
//! attached to every status transition.

use std::collections::HashMap;

use crate::errors::{ServiceError, ServiceResult};
use crate::models::{BookingStatus, StatusRow};

/// Immutable mapping between [`BookingStatus`] variants and their row ids.
///
/// Built once at startup from the seeded table; construction fails when any
/// variant has no row, so request paths never look statuses up by name.
#[derive(Debug, Clone)]
pub struct StatusTable {
    ids: HashMap<BookingStatus, i32>,
    statuses: HashMap<i32, BookingStatus>,
}

impl StatusTable {
    pub fn load(rows: &[StatusRow]) -> ServiceResult<Self> {
        let mut ids = HashMap::new();
        let mut statuses = HashMap::new();

        for row in rows {
            if let Some(status) = BookingStatus::parse(&row.name) {
                ids.insert(status, row.id);
                statuses.insert(row.id, status);
            } else {
                tracing::warn!(id = row.id, name = %row.name, "ignoring unknown booking status row");
            }
        }

        let missing: Vec<&str> = BookingStatus::ALL
            .iter()
            .filter(|status| !ids.contains_key(*status))
            .map(|status| status.as_str())
            .collect();

        if !missing.is_empty() {
            return Err(ServiceError::Configuration(format!(
                "booking status rows missing: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { ids, statuses })
    }

    /// Row id of `status`. Every variant is present once loaded.
    pub fn id_of(&self, status: BookingStatus) -> i32 {
        self.ids[&status]
    }

    pub fn status_of(&self, id: i32) -> ServiceResult<BookingStatus> {
        self.statuses.get(&id).copied().ok_or_else(|| {
            ServiceError::Configuration(format!("booking references unknown status id {id}"))
        })
    }

    /// Rows in seed order, as written by schema initialization.
    pub fn seed_rows() -> Vec<StatusRow> {
        BookingStatus::ALL
            .iter()
            .zip(1..)
            .map(|(status, id)| StatusRow {
                id,
                name: status.as_str().to_string(),
            })
            .collect()
    }
}

/// What a status transition does to the schedule's remaining quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaEffect {
    /// The booking stops holding a unit; give it back.
    Release,
    /// The booking starts holding a unit again; take one.
    Reserve,
    Unchanged,
}

impl QuotaEffect {
    pub fn of_transition(previous: BookingStatus, next: BookingStatus) -> Self {
        match (previous.is_quota_consuming(), next.is_quota_consuming()) {
            (true, false) => QuotaEffect::Release,
            (false, true) => QuotaEffect::Reserve,
            _ => QuotaEffect::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn loads_seed_rows() {
        let table = StatusTable::load(&StatusTable::seed_rows()).unwrap();
        assert_eq!(table.id_of(BookingStatus::PendingConfirmation), 1);
        assert_eq!(table.id_of(BookingStatus::CancelConfirmed), 2);
        assert_eq!(table.status_of(5).unwrap(), BookingStatus::Arrived);
    }

    #[test]
    fn missing_rows_are_a_configuration_error() {
        let mut rows = StatusTable::seed_rows();
        rows.retain(|row| row.name != "PENDING_CONFIRMATION");

        let err = StatusTable::load(&rows).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
        assert!(err.to_string().contains("PENDING_CONFIRMATION"));
    }

    #[test]
    fn unknown_status_id_is_reported() {
        let table = StatusTable::load(&StatusTable::seed_rows()).unwrap();
        assert!(matches!(table.status_of(42), Err(ServiceError::Configuration(_))));
    }

    #[test]
    fn only_cancellation_frees_quota() {
        let consuming: Vec<_> = BookingStatus::ALL
            .into_iter()
            .filter(|s| !s.is_quota_consuming())
            .collect();
        assert_eq!(consuming, vec![BookingStatus::CancelConfirmed]);
    }

    #[rstest]
    #[case(BookingStatus::PendingConfirmation, BookingStatus::CancelConfirmed, QuotaEffect::Release)]
    #[case(BookingStatus::Arrived, BookingStatus::CancelConfirmed, QuotaEffect::Release)]
    #[case(BookingStatus::CancelConfirmed, BookingStatus::Arrived, QuotaEffect::Reserve)]
    #[case(BookingStatus::CancelConfirmed, BookingStatus::NoShow, QuotaEffect::Reserve)]
    #[case(BookingStatus::CancelConfirmed, BookingStatus::CancelConfirmed, QuotaEffect::Unchanged)]
    #[case(BookingStatus::PendingConfirmation, BookingStatus::ArrivalConfirmed, QuotaEffect::Unchanged)]
    fn transition_effects(
        #[case] previous: BookingStatus,
        #[case] next: BookingStatus,
        #[case] expected: QuotaEffect,
    ) {
        assert_eq!(QuotaEffect::of_transition(previous, next), expected);
    }

    #[rstest]
    #[case("PENDING_CONFIRMATION", Some(BookingStatus::PendingConfirmation))]
    #[case("cancel_confirmed", Some(BookingStatus::CancelConfirmed))]
    #[case(" NO_SHOW ", Some(BookingStatus::NoShow))]
    #[case("COMPLETED", None)]
    fn parses_wire_names(#[case] raw: &str, #[case] expected: Option<BookingStatus>) {
        assert_eq!(BookingStatus::parse(raw), expected);
    }
}
