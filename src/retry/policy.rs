//! Retry policy types and configuration.

/// How many times a panicking operation is run, and what happens when the
/// budget runs out.
///
/// Policies are pure data: they describe retry behavior but don't execute
/// it. There is no delay between attempts.
///
/// # Unlimited retries
///
/// `max_retries == 0` means "retry forever", which is also the default. An
/// operation that panics on every call then keeps the caller blocked
/// indefinitely. Prefer [`RetryPolicy::with_max_retries`] unless the
/// operation is known to recover.
///
/// # Examples
///
/// ```rust
/// use panicretry::{OnExhausted, RetryPolicy};
///
/// let policy = RetryPolicy::with_max_retries(3);
/// assert_eq!(policy.max_retries(), 3);
/// assert_eq!(policy.max_attempts(), Some(4)); // 1 initial + 3 retries
///
/// let forever = RetryPolicy::unlimited();
/// assert!(forever.is_unlimited());
/// assert_eq!(forever.max_attempts(), None);
///
/// let loud = RetryPolicy::with_max_retries(1).on_exhausted(OnExhausted::Repanic);
/// assert_eq!(loud.exhaustion(), OnExhausted::Repanic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryPolicy {
    max_retries: u32,
    on_exhausted: OnExhausted,
}

/// What the retry loop does with the last panic once the budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OnExhausted {
    /// Return the panic as [`RetryError::Exhausted`](crate::RetryError::Exhausted).
    #[default]
    Return,
    /// Panic again with the original message as a `String` payload.
    Repanic,
}

impl RetryPolicy {
    /// Retry every panic, never give up.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Allow up to `n` retries after the initial attempt.
    ///
    /// `n == 0` is the unlimited policy, not "no retries". Attempts are
    /// counted in a `u32`, so `u32::MAX` retries permit `u32::MAX` attempts
    /// in total rather than one more.
    pub fn with_max_retries(n: u32) -> Self {
        Self {
            max_retries: n,
            ..Self::default()
        }
    }

    /// Choose what happens when the budget is spent.
    pub fn on_exhausted(mut self, action: OnExhausted) -> Self {
        self.on_exhausted = action;
        self
    }

    /// The configured retry ceiling, `0` meaning unlimited.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Get the exhaustion behavior.
    pub fn exhaustion(&self) -> OnExhausted {
        self.on_exhausted
    }

    /// Returns true if this policy never gives up.
    pub fn is_unlimited(&self) -> bool {
        self.max_retries == 0
    }

    /// Total attempts permitted, or `None` when unlimited.
    ///
    /// Capped at `u32::MAX`.
    pub fn max_attempts(&self) -> Option<u32> {
        if self.is_unlimited() {
            None
        } else {
            Some(self.max_retries.saturating_add(1))
        }
    }

    /// Whether a panic on attempt `attempts` (1-indexed) ends the run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use panicretry::RetryPolicy;
    ///
    /// let policy = RetryPolicy::with_max_retries(2);
    /// assert!(!policy.is_exhausted(1));
    /// assert!(!policy.is_exhausted(2));
    /// assert!(policy.is_exhausted(3));
    ///
    /// assert!(!RetryPolicy::unlimited().is_exhausted(u32::MAX));
    /// ```
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        match self.max_attempts() {
            Some(limit) => attempts >= limit,
            None => false,
        }
    }
}

#[cfg(test)]
mod policy_tests {
    use super::*;

    #[test]
    fn test_default_is_unlimited_and_returns() {
        let policy = RetryPolicy::default();
        assert!(policy.is_unlimited());
        assert_eq!(policy.max_retries(), 0);
        assert_eq!(policy.exhaustion(), OnExhausted::Return);
        assert_eq!(policy, RetryPolicy::unlimited());
    }

    #[test]
    fn test_zero_max_retries_is_unlimited() {
        assert_eq!(RetryPolicy::with_max_retries(0), RetryPolicy::unlimited());
    }

    #[test]
    fn test_max_attempts_counts_initial_attempt() {
        assert_eq!(RetryPolicy::with_max_retries(1).max_attempts(), Some(2));
        assert_eq!(RetryPolicy::with_max_retries(10).max_attempts(), Some(11));
        assert_eq!(
            RetryPolicy::with_max_retries(u32::MAX).max_attempts(),
            Some(u32::MAX)
        );
    }

    #[test]
    fn test_exhaustion_boundary() {
        let policy = RetryPolicy::with_max_retries(10);
        assert!(!policy.is_exhausted(10));
        assert!(policy.is_exhausted(11));
    }

    #[test]
    fn test_largest_budget_still_exhausts() {
        let policy = RetryPolicy::with_max_retries(u32::MAX);
        assert!(!policy.is_exhausted(u32::MAX - 1));
        assert!(policy.is_exhausted(u32::MAX));
        assert_eq!(policy.max_attempts(), Some(u32::MAX));
    }

    #[test]
    fn test_exhaustion_agrees_with_max_attempts() {
        for n in [1, 2, 10, 1000] {
            let policy = RetryPolicy::with_max_retries(n);
            let limit = policy.max_attempts().expect("bounded policy");
            assert!(!policy.is_exhausted(limit - 1));
            assert!(policy.is_exhausted(limit));
        }
    }

    #[test]
    fn test_on_exhausted_builder() {
        let policy = RetryPolicy::with_max_retries(3).on_exhausted(OnExhausted::Repanic);
        assert_eq!(policy.exhaustion(), OnExhausted::Repanic);
        assert_eq!(policy.max_retries(), 3);
    }

    #[test]
    fn test_policy_is_copy_and_debug() {
        let policy = RetryPolicy::with_max_retries(3);
        let copied = policy;
        assert_eq!(policy, copied);
        assert!(format!("{:?}", policy).contains("RetryPolicy"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_policy_from_json() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{"max_retries": 5, "on_exhausted": "repanic"}"#).unwrap();
        assert_eq!(
            policy,
            RetryPolicy::with_max_retries(5).on_exhausted(OnExhausted::Repanic)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_empty_json_is_default_policy() {
        let policy: RetryPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_policy_serializes_field_names() {
        let json = serde_json::to_string(&RetryPolicy::with_max_retries(2)).unwrap();
        assert_eq!(json, r#"{"max_retries":2,"on_exhausted":"return"}"#);
    }
}
