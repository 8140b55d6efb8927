/// How many moves to look at in a node
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SearchWidth {
    /// Every legal move
    All,
    /// Only critical moves, the static value of the node is also an option unless in check
    Critical,
    /// Don't search, take the static value
    Stop,
}

/// What the pruning policy knows about a node
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PlyInfo {
    /// Plies made since the root, the root move included
    pub depth: u8,
    /// Side to move is in check
    pub in_check: bool,
    /// Previous move of the side to move gave check
    pub gave_check: bool,
    /// Last move was a capture
    pub last_capture: bool,
    /// Last move was a capture or a pawn move
    pub last_irreversible: bool,
}

pub trait PrunePolicy: Send + Sync {
    fn width(&self, info: &PlyInfo) -> SearchWidth;
}

/// Radii, in plies, within which moves of a given kind are searched
///
/// Up to `all_moves` plies everything is searched. Deeper, the search goes on with critical
/// moves only while it follows captures (`taking_moves`), pawn moves (`pawn_moves`) or checks
/// (`check`). A side in check sees all its evasions within the `check` radius.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PruneConfig {
    pub all_moves: u8,
    pub taking_moves: u8,
    pub check: u8,
    pub pawn_moves: u8,
}

impl PruneConfig {
    pub const MAX_RADIUS: u8 = 16;

    pub const fn new(all_moves: u8, taking_moves: u8, check: u8, pawn_moves: u8) -> PruneConfig {
        PruneConfig {
            all_moves,
            taking_moves,
            check,
            pawn_moves,
        }
    }
}

impl Default for PruneConfig {
    fn default() -> Self {
        PruneConfig::new(2, 4, 5, 3)
    }
}

impl PrunePolicy for PruneConfig {
    fn width(&self, info: &PlyInfo) -> SearchWidth {
        let depth = info.depth;
        if depth < self.all_moves || (info.in_check && depth < self.check) {
            return SearchWidth::All;
        }
        let critical = (info.last_capture && depth < self.taking_moves)
            || (info.last_irreversible && depth < self.pawn_moves)
            || (info.gave_check && depth < self.check);
        if critical {
            SearchWidth::Critical
        } else {
            SearchWidth::Stop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width() {
        let config = PruneConfig::new(2, 4, 6, 3);
        let info = |depth| PlyInfo {
            depth,
            ..PlyInfo::default()
        };
        assert_eq!(config.width(&info(1)), SearchWidth::All);
        assert_eq!(config.width(&info(2)), SearchWidth::Stop);
        assert_eq!(
            config.width(&PlyInfo {
                last_capture: true,
                last_irreversible: true,
                ..info(3)
            }),
            SearchWidth::Critical
        );
        assert_eq!(
            config.width(&PlyInfo {
                last_capture: true,
                last_irreversible: true,
                ..info(4)
            }),
            SearchWidth::Stop
        );
        assert_eq!(
            config.width(&PlyInfo {
                last_irreversible: true,
                ..info(2)
            }),
            SearchWidth::Critical
        );
        assert_eq!(
            config.width(&PlyInfo {
                in_check: true,
                ..info(5)
            }),
            SearchWidth::All
        );
        assert_eq!(
            config.width(&PlyInfo {
                gave_check: true,
                ..info(5)
            }),
            SearchWidth::Critical
        );
        assert_eq!(
            config.width(&PlyInfo {
                in_check: true,
                ..info(6)
            }),
            SearchWidth::Stop
        );
    }
}
