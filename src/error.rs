//! Error types produced by the panic boundary and the retry loop.

use std::fmt;

/// Fixed marker that prefixes the short form of every [`PanicError`].
pub const ERROR_PREFIX: &str = "panicretry";

/// Maximum number of call-site lines kept in a [`PanicError`].
pub const MAX_FRAMES: usize = 8;

/// A panic intercepted by the boundary, turned into an error value.
///
/// The short form (`{}`) is the panic message behind the [`ERROR_PREFIX`]
/// marker. The alternate form (`{:#}`) appends the captured call-site
/// lines, one per line. `{:?}` quotes the short form; `{:#?}` shows every
/// field.
///
/// # Examples
///
/// ```rust
/// use panicretry::boundary::catch_panic;
///
/// let caught = catch_panic(|| -> () { panic!("oops") });
/// let err = caught.unwrap_err();
///
/// assert_eq!(err.message(), "oops");
/// assert_eq!(err.to_string(), "panicretry: oops");
/// assert!(format!("{:#}", err).starts_with("panicretry: oops"));
/// assert_eq!(format!("{:?}", err), r#""panicretry: oops""#);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PanicError {
    message: String,
    frames: Vec<String>,
    location: Option<String>,
}

impl PanicError {
    /// Create a panic error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frames: Vec::new(),
            location: None,
        }
    }

    /// Attach call-site lines. Anything past [`MAX_FRAMES`] is dropped.
    pub fn with_frames<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frames = frames.into_iter().take(MAX_FRAMES).map(Into::into).collect();
        self
    }

    /// Attach the `file:line:column` the panic was raised at.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// The rendered panic payload.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Captured call-site lines, innermost first.
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Where the panic was raised, when the panic hook saw it.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", ERROR_PREFIX, self.message)?;
        if f.alternate() {
            for frame in &self.frames {
                write!(f, "\n{}", frame)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("PanicError")
                .field("message", &self.message)
                .field("frames", &self.frames)
                .field("location", &self.location)
                .finish()
        } else {
            fmt::Debug::fmt(&self.to_string(), f)
        }
    }
}

impl std::error::Error for PanicError {}

/// Outcome of a retry run that did not succeed.
///
/// Ordinary errors returned by the operation come back untouched in
/// [`RetryError::Operation`]. A panic that kept recurring until the attempt
/// budget ran out comes back as [`RetryError::Exhausted`].
///
/// # Examples
///
/// ```rust
/// use panicretry::{logger, Retrier, RetryError};
///
/// let retrier = Retrier::with_max_retries(2).with_logger(logger::discard);
/// let result = retrier.run(|| -> Result<(), &str> { panic!("oops") });
///
/// match result {
///     Err(RetryError::Exhausted { error, attempts }) => {
///         assert_eq!(error.to_string(), "panicretry: oops");
///         assert_eq!(attempts, 3); // 1 initial + 2 retries
///     }
///     other => panic!("unexpected outcome: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The operation returned an error of its own. Never retried.
    Operation(E),
    /// The operation panicked on every permitted attempt.
    Exhausted {
        /// The panic from the final attempt.
        error: PanicError,
        /// Total number of attempts made (initial + retries).
        attempts: u32,
    },
}

impl<E> RetryError<E> {
    /// Returns true if the operation itself returned this error.
    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }

    /// Returns true if the attempt budget ran out.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Get the operation's own error, if that is what ended the run.
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(e) => Some(e),
            Self::Exhausted { .. } => None,
        }
    }

    /// Get the final panic, if the budget ran out.
    pub fn panic_error(&self) -> Option<&PanicError> {
        match self {
            Self::Operation(_) => None,
            Self::Exhausted { error, .. } => Some(error),
        }
    }

    /// Number of attempts made before giving up.
    ///
    /// `None` for [`RetryError::Operation`]: an ordinary error ends the run
    /// on the attempt that returned it.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Operation(_) => None,
            Self::Exhausted { attempts, .. } => Some(*attempts),
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(e) => fmt::Display::fmt(e, f),
            Self::Exhausted { error, .. } => fmt::Display::fmt(error, f),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Operation(e) => Some(e),
            Self::Exhausted { error, .. } => Some(error),
        }
    }
}
