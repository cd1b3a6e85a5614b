use serde::Serialize;
use skillswap_types::{
    ParticipantSnapshot, RequestDirection, Side, SwapRequest, SwapStatus, UserId,
};

/// A swap request as one participant sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub request: SwapRequest,
    pub direction: RequestDirection,
    pub counterpart: ParticipantSnapshot,
    pub can_accept: bool,
    pub can_reject: bool,
    pub can_complete: bool,
    pub can_chat: bool,
    pub can_rate: bool,
}

impl RequestView {
    /// `None` when `viewer` is not a participant
    pub fn for_viewer(request: SwapRequest, viewer: &UserId) -> Option<Self> {
        let side = request.side_of(viewer)?;
        let direction = request.direction_for(viewer)?;
        let counterpart = request.counterpart_snapshot(viewer)?;
        let status = request.status;
        let decides = side == Side::To && status == SwapStatus::Pending;

        Some(Self {
            direction,
            counterpart,
            can_accept: decides,
            can_reject: decides,
            can_complete: status.can_transition_to(SwapStatus::Completed),
            can_chat: status.is_session_open(),
            can_rate: status == SwapStatus::Completed && !request.has_rated(side),
            request,
        })
    }
}
