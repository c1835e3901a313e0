/// Track lifecycle state.
///
/// Tracks start `Tentative` until enough consecutive matches confirm them.
/// `Deleted` tracks are removed from the live set at the end of the frame
/// cycle and their identities are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Newly created track awaiting confirmation
    #[default]
    Tentative,
    /// Confirmed, actively tracked object
    Confirmed,
    /// Marked for removal from the live set
    Deleted,
}
