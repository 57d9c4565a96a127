/// Request state definitions for tracking crawl progress
///
/// Every listing or detail request walks this machine from its pending state
/// to a terminal one. Moves outside the allowed edges are rejected.
use crate::{HarvestError, Result};
use std::fmt;

/// Represents the current state of one scheduled request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    // ===== Listing States =====
    /// Listing page is queued and waiting for a worker
    PendingListing,

    /// Listing page is being fetched and admitted
    ProcessingListing,

    /// Surviving jobs were handed to detail requests
    EnqueueDetails,

    /// The next listing page was scheduled
    EnqueueNextListing,

    /// Listing page finished; no more follow-up work
    Done,

    // ===== Detail States =====
    /// Detail page is queued and waiting for a worker
    PendingDetail,

    /// Detail page is being fetched and merged
    ProcessingDetail,

    /// Detail record was finalized
    DoneItem,

    // ===== Terminal Error State =====
    /// Fetch failed or the run budget stopped the request
    Failed,
}

impl RequestState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::DoneItem | Self::Failed)
    }

    /// Returns true if `self -> next` is an edge of the machine
    pub fn can_transition_to(&self, next: RequestState) -> bool {
        use RequestState::*;

        matches!(
            (self, next),
            (PendingListing, ProcessingListing)
                | (PendingListing, Failed)
                | (ProcessingListing, EnqueueDetails)
                | (ProcessingListing, EnqueueNextListing)
                | (ProcessingListing, Done)
                | (ProcessingListing, Failed)
                | (EnqueueDetails, EnqueueNextListing)
                | (EnqueueDetails, Done)
                | (EnqueueNextListing, Done)
                | (PendingDetail, ProcessingDetail)
                | (PendingDetail, Failed)
                | (ProcessingDetail, DoneItem)
                | (ProcessingDetail, Failed)
        )
    }

    /// Moves to `next`, or fails with [`HarvestError::InvalidTransition`]
    pub fn advance(self, next: RequestState) -> Result<RequestState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingListing => "pending_listing",
            Self::ProcessingListing => "processing_listing",
            Self::EnqueueDetails => "enqueue_details",
            Self::EnqueueNextListing => "enqueue_next_listing",
            Self::Done => "done",
            Self::PendingDetail => "pending_detail",
            Self::ProcessingDetail => "processing_detail",
            Self::DoneItem => "done_item",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible request states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::PendingListing,
            Self::ProcessingListing,
            Self::EnqueueDetails,
            Self::EnqueueNextListing,
            Self::Done,
            Self::PendingDetail,
            Self::ProcessingDetail,
            Self::DoneItem,
            Self::Failed,
        ]
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(RequestState::Done.is_terminal());
        assert!(RequestState::DoneItem.is_terminal());
        assert!(RequestState::Failed.is_terminal());

        assert!(!RequestState::PendingListing.is_terminal());
        assert!(!RequestState::EnqueueDetails.is_terminal());
        assert!(!RequestState::ProcessingDetail.is_terminal());
    }

    #[test]
    fn test_listing_paths() {
        let state = RequestState::PendingListing
            .advance(RequestState::ProcessingListing)
            .unwrap()
            .advance(RequestState::EnqueueDetails)
            .unwrap()
            .advance(RequestState::EnqueueNextListing)
            .unwrap()
            .advance(RequestState::Done)
            .unwrap();
        assert_eq!(state, RequestState::Done);

        let short = RequestState::ProcessingListing.advance(RequestState::Done);
        assert!(short.is_ok());
    }

    #[test]
    fn test_detail_path() {
        let state = RequestState::PendingDetail
            .advance(RequestState::ProcessingDetail)
            .unwrap()
            .advance(RequestState::DoneItem)
            .unwrap();
        assert_eq!(state, RequestState::DoneItem);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_invalid_transitions() {
        let err = RequestState::PendingListing
            .advance(RequestState::DoneItem)
            .unwrap_err();
        assert!(matches!(
            err,
            HarvestError::InvalidTransition {
                from: RequestState::PendingListing,
                to: RequestState::DoneItem
            }
        ));

        assert!(!RequestState::Done.can_transition_to(RequestState::ProcessingListing));
        assert!(!RequestState::EnqueueNextListing.can_transition_to(RequestState::EnqueueDetails));
        assert!(!RequestState::PendingDetail.can_transition_to(RequestState::ProcessingListing));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in RequestState::all_states().into_iter().filter(|s| s.is_terminal()) {
            for to in RequestState::all_states() {
                assert!(!from.can_transition_to(to), "{} -> {} allowed", from, to);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RequestState::PendingListing), "pending_listing");
        assert_eq!(format!("{}", RequestState::DoneItem), "done_item");
    }
}
