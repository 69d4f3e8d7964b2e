/// The export policy of a save pass, selected by a numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// `0`, every record.
    All,
    /// `1`, records worth a delta export. State is cleared after the export is confirmed.
    Delta,
    /// `2`, records worth a base export. State is cleared while deciding.
    Base,
    /// `3`, every record, already decayed by a shrink pass.
    Decayed,
    /// `5`, every record, used to revert a batch model.
    Revert,
    /// Any other code, treated as permissively as `All`.
    Other(i32),
}

impl From<i32> for SaveMode {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::All,
            1 => Self::Delta,
            2 => Self::Base,
            3 => Self::Decayed,
            5 => Self::Revert,
            other => Self::Other(other),
        }
    }
}

impl From<SaveMode> for i32 {
    fn from(value: SaveMode) -> Self {
        match value {
            SaveMode::All => 0,
            SaveMode::Delta => 1,
            SaveMode::Base => 2,
            SaveMode::Decayed => 3,
            SaveMode::Revert => 5,
            SaveMode::Other(code) => code,
        }
    }
}

/// The stage a record is about to be created at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// `0`, a reader asked for a missing key.
    Pull,
    /// `1`, a writer pushed statistics for a missing key.
    Push,
    Other(i32),
}

impl From<i32> for Stage {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Pull,
            1 => Self::Push,
            other => Self::Other(other),
        }
    }
}
