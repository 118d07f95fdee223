//! Utility macros shared by the codec implementations.

/// Returns early with an error if a condition is not met.
///
/// Like `assert!`, but returns the error instead of panicking.
///
/// ```ignore
/// ensure!(body.len() <= MAX_FRAME_BODY, SendError::too_large_frame(body.len(), MAX_FRAME_BODY));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
