use crate::models::mission::MissionStatus;

/// Legal targets for a status update, keyed by the mission's current status.
///
/// Acceptance is not listed here: it has its own operation with its own
/// guard. `matched` is reserved for automated trip-matching and is never
/// produced by a status update either. `disputed` only resolves to
/// `cancelled`; anything richer belongs to claim handling.
pub fn allowed_targets(current: MissionStatus) -> &'static [MissionStatus] {
    use MissionStatus::*;

    match current {
        Pending => &[Cancelled, Disputed],
        Matched => &[Cancelled, Disputed],
        Accepted => &[PickedUp, Cancelled, Disputed],
        PickedUp => &[InTransit, Cancelled, Disputed],
        // customs is optional on the delivery path
        InTransit => &[InCustoms, OutForDelivery, Cancelled, Disputed],
        InCustoms => &[OutForDelivery, Cancelled, Disputed],
        OutForDelivery => &[Delivered, Cancelled, Disputed],
        Disputed => &[Cancelled],
        Delivered | Cancelled => &[],
    }
}

/// Statuses that may ever appear as the target of a status update.
pub fn is_update_target(status: MissionStatus) -> bool {
    use MissionStatus::*;
    !matches!(status, Pending | Matched | Accepted)
}

pub fn is_legal(current: MissionStatus, next: MissionStatus) -> bool {
    allowed_targets(current).contains(&next)
}
