use std::error::Error;
use std::fmt;

/// Errors collected across repeated attempts at one operation, oldest first.
#[derive(Debug)]
pub struct MultiError<E> {
    errors: Vec<E>,
}

impl<E> MultiError<E> {
    pub fn new(errors: Vec<E>) -> Self {
        Self { errors }
    }

    pub fn push(&mut self, error: E) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// The most recent error, which is the one reported as the cause.
    pub fn last(&self) -> Option<&E> {
        self.errors.last()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<E> Default for MultiError<E> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<E: fmt::Display> fmt::Display for MultiError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no errors recorded");
        }
        match self.errors() {
            [only] => write!(f, "{}", only),
            errors => {
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "#{}: {}", i + 1, error)?;
                }
                Ok(())
            }
        }
    }
}

impl<E: Error + 'static> Error for MultiError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.last().map(|e| e as &dyn Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_display_single_error_is_unadorned() {
        let err = MultiError::new(vec![io::Error::other("connection reset")]);
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn test_display_numbers_each_attempt() {
        let mut err = MultiError::default();
        err.push(io::Error::other("timed out"));
        err.push(io::Error::other("HTTP 503"));

        assert_eq!(err.len(), 2);
        assert_eq!(err.to_string(), "#1: timed out; #2: HTTP 503");
    }

    #[test]
    fn test_source_is_last_error() {
        let err = MultiError::new(vec![io::Error::other("first"), io::Error::other("second")]);
        assert_eq!(err.source().unwrap().to_string(), "second");
        assert_eq!(err.last().unwrap().to_string(), "second");
    }

    #[test]
    fn test_empty() {
        let err: MultiError<io::Error> = MultiError::default();
        assert!(err.is_empty());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "no errors recorded");
    }
}
