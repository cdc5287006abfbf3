use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("plate edge must be positive")]
    EmptyPlate,
    #[error("plate edge {edge} exceeds the maximum of {max}")]
    PlateTooLarge { edge: usize, max: usize },
    #[error("{steps} steps exceeds the maximum of {max}")]
    TooManySteps { steps: usize, max: usize },
    #[error("image edge {edge} x scale {scale} exceeds the maximum of {max} pixels")]
    ImageTooLarge { edge: usize, scale: usize, max: usize },
    #[error("unknown rule {0:?} (expected white_right or white_left)")]
    UnknownRule(String),
    #[error("unknown color {0:?} (expected white or black)")]
    UnknownColor(String),
    #[error("unknown fill {0:?} (expected 0, 1 or rand)")]
    UnknownFill(String),
    #[error("unknown heading {0:?} (expected N, E, S or O)")]
    UnknownHeading(String),
}
