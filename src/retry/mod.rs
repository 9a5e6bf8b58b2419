//! Retrying operations that panic.
//!
//! - **Policy**: [`RetryPolicy`] is just data: how many attempts, and what
//!   to do when they run out
//! - **Loop**: [`Retrier`] runs the operation through the panic boundary,
//!   logs every panic, and consults the policy
//!
//! # Quick Start
//!
//! ```rust
//! use panicretry::{logger, Retrier, RetryError};
//!
//! let retrier = Retrier::with_max_retries(10).with_logger(logger::discard);
//!
//! let mut calls = 0;
//! let result = retrier.run(|| -> Result<(), String> {
//!     calls += 1;
//!     panic!("oops");
//! });
//!
//! assert_eq!(calls, 11);
//! assert!(matches!(result, Err(RetryError::Exhausted { attempts: 11, .. })));
//! assert_eq!(result.unwrap_err().to_string(), "panicretry: oops");
//! ```
//!
//! # Outcomes
//!
//! | Attempt result      | Action                                         |
//! |---------------------|------------------------------------------------|
//! | `Ok(value)`         | return `Ok(value)`                             |
//! | `Err(e)`            | return `Err(RetryError::Operation(e))`         |
//! | panic, budget left  | log, run again                                 |
//! | panic, budget spent | log, then return `Exhausted` or panic again    |

mod policy;
mod retrier;

pub use policy::{OnExhausted, RetryPolicy};
pub use retrier::Retrier;
