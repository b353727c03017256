/// Result alias that carries the custom [`LightPaintError`] type.
pub type Result<T> = std::result::Result<T, LightPaintError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum LightPaintError {
    /// A non-finite value reached the pose transform. Rejected before any
    /// motion command is built from it.
    #[error("invalid coordinate {axis}={value} ({context})")]
    InvalidCoordinate {
        axis: &'static str,
        value: f64,
        context: String,
    },
    /// Caller supplied an argument outside the accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The motion planner could not reach a pose or plan a path.
    #[error("motion failure: {0}")]
    MotionFailure(String),
    /// The actuator transport reported a dispatch problem.
    #[error("actuator error: {0}")]
    Actuator(String),
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed configuration or frame JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl LightPaintError {
    pub fn invalid_argument<T: Into<String>>(msg: T) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn motion<T: Into<String>>(msg: T) -> Self {
        Self::MotionFailure(msg.into())
    }

    pub fn actuator<T: Into<String>>(msg: T) -> Self {
        Self::Actuator(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_coordinate(axis: &'static str, value: f64, context: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            axis,
            value,
            context: context.into(),
        }
    }
}
