//! Loading of supplementary data where failure means "use the default".

use std::fmt::Display;
use tracing::warn;

/// A loaded value, or the default plus the reason the load failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered<T> {
    pub value: T,
    pub diagnostic: Option<String>,
}

impl<T> Recovered<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Unwraps `result`, substituting `T::default()` on error.
///
/// `what` names the data being loaded and prefixes the diagnostic.
pub fn recover<T, E>(result: Result<T, E>, what: &str) -> Recovered<T>
where
    T: Default,
    E: Display,
{
    match result {
        Ok(value) => Recovered {
            value,
            diagnostic: None,
        },
        Err(e) => {
            warn!(error = %e, "Could not load {what}, using default");
            Recovered {
                value: T::default(),
                diagnostic: Some(format!("{what}: {e}")),
            }
        }
    }
}
