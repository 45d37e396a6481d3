use thiserror::Error;

/// Records all errors reported by this library.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Errors encountered while parsing a [`Version`](crate::Version)
    /// or a list of version specifiers.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Errors encountered while parsing a [`Requirement`](crate::Requirement).
    #[error(transparent)]
    Requirement(#[from] RequirementError),

    /// Errors encountered while parsing a [`WheelFilename`](crate::wheel::WheelFilename).
    #[error(transparent)]
    Wheel(#[from] WheelFilenameError),
}

/// Errors encountered when parsing PEP 440 versions and specifiers.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum VersionError {
    /// The input is not a PEP 440 version.
    #[error("invalid version {version:?}: {message}")]
    InvalidVersion {
        /// The version being parsed.
        version: String,

        /// The error message.
        message: String,
    },

    /// The input is not a comma separated list of version specifiers.
    #[error("invalid specifiers {specifiers:?}: {message}")]
    InvalidSpecifiers {
        /// The specifiers being parsed.
        specifiers: String,

        /// The error message.
        message: String,
    },
}

/// Errors encountered when parsing a PEP 508 requirement string.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum RequirementError {
    /// The input did not match the requirement grammar.
    #[error("input did not match requirement syntax at offset {offset} ({message}): {input}")]
    Syntax {
        /// The input originally provided to the parser.
        input: String,

        /// Byte offset into the input at which parsing stopped.
        offset: usize,

        /// Description of what the parser expected.
        message: String,
    },

    /// A marker expression referenced a variable that is not an environment marker.
    #[error("unknown marker variable '{variable}' in input: {input}")]
    UnknownMarkerVariable {
        /// The input originally provided to the parser.
        input: String,

        /// The unrecognized variable.
        variable: String,
    },
}

/// Errors encountered when parsing a wheel filename.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum WheelFilenameError {
    /// The filename does not follow `{name}-{version}(-{build})?-{python}-{abi}-{platform}.whl`.
    #[error("invalid wheel filename {filename:?}: {message}")]
    InvalidFilename {
        /// The filename being parsed.
        filename: String,

        /// The error message.
        message: String,
    },

    /// The URL could not be parsed or has no final path segment.
    #[error("invalid wheel url {url:?}: {message}")]
    InvalidUrl {
        /// The URL being parsed.
        url: String,

        /// The error message.
        message: String,
    },
}

/// Construct a [`RequirementError::Syntax`] from the original input and the unparsed remainder.
///
/// ```ignore
/// error::syntax!(input, remaining, "expected a version");
/// ```
macro_rules! syntax {
    ($input:expr, $remaining:expr, $message:expr) => {
        $crate::RequirementError::Syntax {
            input: $input.to_string(),
            offset: $input.len().saturating_sub($remaining.len()),
            message: $message.to_string(),
        }
    };
}
pub(crate) use syntax;
