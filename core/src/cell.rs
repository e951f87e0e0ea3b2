use serde::{Deserialize, Serialize};

/// Player-visible state of a single board cell.
///
/// `Hidden`, `Revealed` and `Flagged` are the states reachable during play.
/// `Exploded`, `Mine` and `Misflagged` only appear after the game ends, when
/// the board is rewritten so every mine and every wrong flag is shown.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Hidden,
    Revealed(u8),
    Flagged,
    Exploded,
    Mine,
    Misflagged,
}

impl Cell {
    /// Whether the cell contents are visible to the player.
    pub const fn is_revealed(self) -> bool {
        use Cell::*;
        match self {
            Hidden | Flagged => false,
            Revealed(_) | Exploded | Mine | Misflagged => true,
        }
    }

    /// Whether the cell carries a flag marker, right or wrong.
    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged | Self::Misflagged)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Hidden
    }
}
