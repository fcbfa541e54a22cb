use std::fmt::Display;

/// Errors raised when the input data does not satisfy the shape contract
/// expected by the feature finder.
#[derive(Debug, Clone, PartialEq)]
pub enum DataProcessingError {
    ExpectedNonEmptyData {
        context: Option<String>,
    },
    ExpectedSlicesSameLength {
        expected: usize,
        other: usize,
        context: String,
    },
    ExpectedFiniteData {
        index: usize,
        context: String,
    },
    ExpectedSortedData {
        index: usize,
        context: String,
    },
}

impl DataProcessingError {
    pub fn append_to_context(mut self, context: &str) -> Self {
        match &mut self {
            DataProcessingError::ExpectedNonEmptyData {
                context: owned_context,
            } => match owned_context {
                Some(x) => x.push_str(context),
                None => *owned_context = Some(context.to_string()),
            },
            DataProcessingError::ExpectedSlicesSameLength {
                context: owned_context,
                ..
            }
            | DataProcessingError::ExpectedFiniteData {
                context: owned_context,
                ..
            }
            | DataProcessingError::ExpectedSortedData {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
        }
        self
    }
}

impl Display for DataProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpectedNonEmptyData { context } => match context {
                Some(ctx) => write!(f, "Expected non-empty data ({})", ctx),
                None => write!(f, "Expected non-empty data"),
            },
            Self::ExpectedSlicesSameLength {
                expected,
                other,
                context,
            } => write!(
                f,
                "Expected slices of the same length, got {} and {} ({})",
                expected, other, context
            ),
            Self::ExpectedFiniteData { index, context } => {
                write!(f, "Non-finite value at index {} ({})", index, context)
            }
            Self::ExpectedSortedData { index, context } => {
                write!(f, "Data is not sorted at index {} ({})", index, context)
            }
        }
    }
}

/// Errors raised when a configuration cannot be used by the feature finder.
///
/// These are checked once, before any data is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidChargeRange { min: i32, max: i32 },
    UnsupportedTolerance { unit: &'static str, context: String },
    InvalidParameter { name: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidChargeRange { min, max } => write!(
                f,
                "Invalid charge range [{}, {}], charges must be positive and min <= max",
                min, max
            ),
            Self::UnsupportedTolerance { unit, context } => {
                write!(f, "Tolerance unit '{}' is not supported: {}", unit, context)
            }
            Self::InvalidParameter { name, reason } => {
                write!(f, "Invalid value for '{}': {}", name, reason)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureFinderError {
    DataProcessing(DataProcessingError),
    Config(ConfigError),
}

impl Display for FeatureFinderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataProcessing(e) => write!(f, "Data processing error: {}", e),
            Self::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for FeatureFinderError {}

impl From<DataProcessingError> for FeatureFinderError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessing(x)
    }
}

impl From<ConfigError> for FeatureFinderError {
    fn from(x: ConfigError) -> Self {
        Self::Config(x)
    }
}

pub type Result<T> = std::result::Result<T, FeatureFinderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_appended() {
        let err = DataProcessingError::ExpectedNonEmptyData { context: None }
            .append_to_context("scan 3");
        assert_eq!(
            err,
            DataProcessingError::ExpectedNonEmptyData {
                context: Some("scan 3".to_string())
            }
        );
        let err = DataProcessingError::ExpectedSlicesSameLength {
            expected: 2,
            other: 3,
            context: "mz vs intensity".to_string(),
        }
        .append_to_context(" in scan 3");
        assert_eq!(
            err.to_string(),
            "Expected slices of the same length, got 2 and 3 (mz vs intensity in scan 3)"
        );
    }
}
