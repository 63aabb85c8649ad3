use std::fmt;

/// Wrapper for gateway secret keys and webhook signing keys. Both `Debug` and `Display`
/// render a fixed mask, so a `Secret` can live inside a config struct that derives `Debug`
/// without the key ending up in log output.
#[derive(Clone, Default)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Hands back the wrapped value. Keep the result short-lived and out of log statements.
    pub fn reveal(&self) -> &T {
        &self.0
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
