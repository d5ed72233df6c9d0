use crate::common::error::GitherdError;

/// Result alias used across the crate.
pub type GitherdResult<T> = Result<T, GitherdError>;

/// Conversion helpers from `Option` into [`GitherdResult`].
pub trait OptionExt<T> {
    /// Convert an `Option` into a [`GitherdResult`], producing an internal
    /// error with the given message when the value is `None`.
    fn ok_or_internal_error(self, message: impl Into<String>) -> GitherdResult<T>;

    /// Convert an `Option` into a [`GitherdResult`], producing a validation
    /// error for the given field when the value is `None`.
    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> GitherdResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_internal_error(self, message: impl Into<String>) -> GitherdResult<T> {
        self.ok_or_else(|| GitherdError::internal_error(message))
    }

    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> GitherdResult<T> {
        self.ok_or_else(|| GitherdError::validation_error(field, message, None))
    }
}

/// Conversion helpers from plain `Result` into [`GitherdResult`].
pub trait ResultExt<T, E> {
    /// Map the error into an internal error carrying the original as source.
    fn with_internal_error(self, message: impl Into<String>) -> GitherdResult<T>
    where
        E: std::error::Error + Send + Sync + 'static;

    /// Map the error into a file system error with an optional path context.
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> GitherdResult<T>
    where
        E: Into<std::io::Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn with_internal_error(self, message: impl Into<String>) -> GitherdResult<T>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.map_err(|e| GitherdError::internal_error_with_source(message, e))
    }

    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> GitherdResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| GitherdError::filesystem_error_with_source(message, path, e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_ok_or_internal_error() {
        let some_value: Option<i32> = Some(42);
        assert_eq!(some_value.ok_or_internal_error("missing").unwrap(), 42);

        let none_value: Option<i32> = None;
        let result = none_value.ok_or_internal_error("missing");
        assert!(matches!(result, Err(GitherdError::Internal { .. })));
    }

    #[test]
    fn test_option_ok_or_validation_error() {
        let none_value: Option<String> = None;
        let result = none_value.ok_or_validation_error("remote", "required");
        assert!(matches!(result, Err(GitherdError::Validation { .. })));
    }

    #[test]
    fn test_result_with_filesystem_error() {
        let io_err: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let result = io_err.with_filesystem_error("read failed", None);
        assert!(matches!(result, Err(GitherdError::FileSystem { .. })));
    }

    #[test]
    fn test_result_with_internal_error() {
        let parse_err: Result<i32, std::num::ParseIntError> = "x".parse::<i32>();
        let result = parse_err.with_internal_error("parse failed");
        assert!(matches!(result, Err(GitherdError::Internal { .. })));
    }
}
