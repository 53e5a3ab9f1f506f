use std::fmt::Display;

/// Log a failed result instead of propagating it
pub trait OrLog {
    /// Returns whether the result was `Ok`
    fn or_log(&self, context: impl Display) -> bool;
}

impl<T, E: Display> OrLog for Result<T, E> {
    fn or_log(&self, context: impl Display) -> bool {
        match self {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Error {}: {}", context, e);
                false
            }
        }
    }
}
