use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `integrate_image` was called before a source image was set.
    MissingSource,
    /// `integrate_image` was called before a target image was set.
    MissingTarget,
    ZeroThreads,
    ThreadsOutOfRange { requested: usize, available: usize },
    SizeMismatch { expected: usize, actual: usize },
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    InvalidChannelCount,
}

impl Error {
    /// True for errors caused by calling the integrator in an unconfigured state.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::MissingSource | Self::MissingTarget)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSource => write!(f, "no source image"),
            Self::MissingTarget => write!(f, "no target image"),
            Self::ZeroThreads => write!(f, "thread budget must be at least 1"),
            Self::ThreadsOutOfRange {
                requested,
                available,
            } => write!(
                f,
                "impossible number of threads: {requested} (available: {available})"
            ),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "shape mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::InvalidChannelCount => write!(f, "invalid channel count"),
        }
    }
}

impl std::error::Error for Error {}
