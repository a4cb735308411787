use crate::position::Position;

/// A `//` or `/* */` comment, kept so the emitter can re-attach it:
/// comments must be preserved and re-attachable during emission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    pub pos: Position,
    pub text: String,
    /// Whether another token appeared on the same source line before this
    /// comment — used by the emitter to decide between a trailing comment
    /// and one that owns its own line.
    pub trailing: bool,
}
