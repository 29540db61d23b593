//! Need lifecycle core: status transitions and quantity bookkeeping for the
//! two fulfillment workflows (direct stock fulfillment and dispatch
//! tracking). Pure functions over the current record values; the handlers
//! own the database reads and writes.

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedStatus {
    // direct stock fulfillment
    Pending,
    InProgress,
    Resolved,
    // dispatch tracking
    ResourcesDispatched,
    Completed,
}

impl NeedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeedStatus::Pending => "pending",
            NeedStatus::InProgress => "in-progress",
            NeedStatus::Resolved => "resolved",
            NeedStatus::ResourcesDispatched => "resources-dispatched",
            NeedStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<NeedStatus> {
        match s {
            "pending" => Some(NeedStatus::Pending),
            "in-progress" => Some(NeedStatus::InProgress),
            "resolved" => Some(NeedStatus::Resolved),
            "resources-dispatched" => Some(NeedStatus::ResourcesDispatched),
            "completed" => Some(NeedStatus::Completed),
            _ => None,
        }
    }

    /// Terminal states accept no further dispatches.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NeedStatus::Resolved | NeedStatus::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Dispatched,
    Reached,
    Cancelled,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Dispatched => "dispatched",
            DispatchStatus::Reached => "reached",
            DispatchStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<DispatchStatus> {
        match s {
            "dispatched" => Some(DispatchStatus::Dispatched),
            "reached" => Some(DispatchStatus::Reached),
            "cancelled" => Some(DispatchStatus::Cancelled),
            _ => None,
        }
    }
}

/// Result of applying a direct stock fulfillment to a need.
#[derive(Debug, PartialEq, Eq)]
pub struct FulfillOutcome {
    pub status: NeedStatus,
    pub fulfilled_quantity: i32,
    pub stock_quantity: i32,
}

/// Direct stock fulfillment (pending -> in-progress -> resolved).
///
/// Rejects non-positive quantities, fails with `InsufficientStock` when the
/// on-hand stock cannot cover the request, and otherwise moves `quantity`
/// units from stock onto the need. The need resolves once the fulfilled
/// quantity reaches the requirement.
pub fn apply_fulfillment(
    status: NeedStatus,
    required_quantity: i32,
    fulfilled_quantity: i32,
    stock_quantity: i32,
    quantity: i32,
) -> Result<FulfillOutcome, ApiError> {
    if quantity <= 0 {
        return Err(ApiError::Validation(
            "Quantity must be greater than zero".to_string(),
        ));
    }
    if stock_quantity < quantity {
        return Err(ApiError::InsufficientStock);
    }

    let fulfilled = fulfilled_quantity + quantity;
    let status = if fulfilled >= required_quantity {
        NeedStatus::Resolved
    } else if status == NeedStatus::Pending {
        NeedStatus::InProgress
    } else {
        status
    };

    Ok(FulfillOutcome {
        status,
        fulfilled_quantity: fulfilled,
        stock_quantity: stock_quantity - quantity,
    })
}

/// Status transition for a newly created dispatch (pending ->
/// resources-dispatched). One-directional: a need already past pending keeps
/// its current status. Terminal needs reject the dispatch outright.
pub fn apply_dispatch(status: NeedStatus) -> Result<NeedStatus, ApiError> {
    if status.is_terminal() {
        return Err(ApiError::NeedCompleted);
    }
    Ok(match status {
        NeedStatus::Pending => NeedStatus::ResourcesDispatched,
        other => other,
    })
}

/// Bookkeeping for a dispatch arriving at its need. The dispatched amount is
/// credited unconditionally; marking the same dispatch reached twice
/// double-counts, matching the behavior this service replaces. The need
/// completes once the fulfilled quantity reaches the requirement.
pub fn apply_reached(
    status: NeedStatus,
    required_quantity: i32,
    fulfilled_quantity: i32,
    resource_amount: i32,
) -> (NeedStatus, i32) {
    let fulfilled = fulfilled_quantity + resource_amount;
    let status = if fulfilled >= required_quantity {
        NeedStatus::Completed
    } else {
        status
    };
    (status, fulfilled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fulfill_rejects_zero_quantity() {
        let err = apply_fulfillment(NeedStatus::Pending, 10, 0, 5, 0).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn fulfill_rejects_negative_quantity() {
        let err = apply_fulfillment(NeedStatus::Pending, 10, 0, 5, -3).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn fulfill_fails_when_stock_is_short() {
        // Stock of 5 cannot cover a request for 6; nothing changes.
        let err = apply_fulfillment(NeedStatus::Pending, 10, 0, 5, 6).unwrap_err();
        assert!(matches!(err, ApiError::InsufficientStock));
    }

    #[test]
    fn partial_fulfillment_moves_pending_to_in_progress() {
        let outcome = apply_fulfillment(NeedStatus::Pending, 10, 0, 20, 4).unwrap();
        assert_eq!(outcome.status, NeedStatus::InProgress);
        assert_eq!(outcome.fulfilled_quantity, 4);
        assert_eq!(outcome.stock_quantity, 16);
    }

    #[test]
    fn fulfillment_keeps_in_progress_until_requirement_met() {
        let outcome = apply_fulfillment(NeedStatus::InProgress, 10, 4, 20, 5).unwrap();
        assert_eq!(outcome.status, NeedStatus::InProgress);
        assert_eq!(outcome.fulfilled_quantity, 9);
    }

    #[test]
    fn fulfillment_resolves_exactly_when_requirement_met() {
        let outcome = apply_fulfillment(NeedStatus::InProgress, 10, 4, 20, 6).unwrap();
        assert_eq!(outcome.status, NeedStatus::Resolved);
        assert_eq!(outcome.fulfilled_quantity, 10);
        assert_eq!(outcome.stock_quantity, 14);
    }

    #[test]
    fn stock_and_need_change_by_exactly_the_fulfilled_amount() {
        let outcome = apply_fulfillment(NeedStatus::Pending, 100, 7, 50, 13).unwrap();
        assert_eq!(outcome.fulfilled_quantity, 7 + 13);
        assert_eq!(outcome.stock_quantity, 50 - 13);
    }

    #[test]
    fn dispatch_moves_pending_to_resources_dispatched() {
        assert_eq!(
            apply_dispatch(NeedStatus::Pending).unwrap(),
            NeedStatus::ResourcesDispatched
        );
    }

    #[test]
    fn dispatch_does_not_reset_a_later_status() {
        assert_eq!(
            apply_dispatch(NeedStatus::ResourcesDispatched).unwrap(),
            NeedStatus::ResourcesDispatched
        );
    }

    #[test]
    fn dispatch_against_completed_need_fails() {
        let err = apply_dispatch(NeedStatus::Completed).unwrap_err();
        assert!(matches!(err, ApiError::NeedCompleted));
    }

    #[test]
    fn dispatch_against_resolved_need_fails() {
        let err = apply_dispatch(NeedStatus::Resolved).unwrap_err();
        assert!(matches!(err, ApiError::NeedCompleted));
    }

    #[test]
    fn reached_credits_amount_and_completes_at_requirement() {
        // Need requires 10. First dispatch of 6 arrives: still open.
        let (status, fulfilled) = apply_reached(NeedStatus::ResourcesDispatched, 10, 0, 6);
        assert_eq!(status, NeedStatus::ResourcesDispatched);
        assert_eq!(fulfilled, 6);

        // Second dispatch of 4 arrives: requirement met, need completes.
        let (status, fulfilled) = apply_reached(status, 10, fulfilled, 4);
        assert_eq!(status, NeedStatus::Completed);
        assert_eq!(fulfilled, 10);
    }

    #[test]
    fn reached_can_overshoot_the_requirement() {
        // No over-dispatch guard: overlapping dispatches may exceed the
        // requirement.
        let (status, fulfilled) = apply_reached(NeedStatus::ResourcesDispatched, 10, 8, 5);
        assert_eq!(status, NeedStatus::Completed);
        assert_eq!(fulfilled, 13);
    }

    #[test]
    fn fulfilled_quantity_never_decreases() {
        let mut fulfilled = 0;
        let mut status = NeedStatus::Pending;
        for amount in [3, 1, 4, 1, 5] {
            let (next_status, next_fulfilled) = apply_reached(status, 20, fulfilled, amount);
            assert!(next_fulfilled >= fulfilled);
            status = next_status;
            fulfilled = next_fulfilled;
        }
        assert_eq!(fulfilled, 14);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            NeedStatus::Pending,
            NeedStatus::InProgress,
            NeedStatus::Resolved,
            NeedStatus::ResourcesDispatched,
            NeedStatus::Completed,
        ] {
            assert_eq!(NeedStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(NeedStatus::parse("bogus"), None);
    }
}
