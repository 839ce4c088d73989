use std::fmt::Display;

pub trait ResultExt<T, InitialError> {
    /// Map an error to a string-based error variant
    ///
    /// Converts `Result<T, InitialError>` into `Result<T, FinalError>` where `FinalError` has a
    /// variant holding a `String`, built from the `Display` of the initial error.
    ///
    /// # Example
    /// ```rust
    /// use scanner_util::result_ext::ResultExt;
    ///
    /// #[derive(Debug, thiserror::Error)]
    /// enum DecodeError {
    ///     #[error("bad payload: {0}")]
    ///     Payload(String),
    /// }
    ///
    /// fn payload(bytes: Vec<u8>) -> Result<String, DecodeError> {
    ///     String::from_utf8(bytes).map_err_str(DecodeError::Payload)
    /// }
    ///
    /// assert!(payload(vec![0xff, 0xfe]).is_err());
    /// assert_eq!(payload(b"ABC123".to_vec()).unwrap(), "ABC123");
    /// ```
    fn map_err_str<FinalError, F>(self, f: F) -> Result<T, FinalError>
    where
        InitialError: Display,
        F: FnOnce(String) -> FinalError;
}

impl<Type, InitialError> ResultExt<Type, InitialError> for Result<Type, InitialError> {
    fn map_err_str<FinalError, F>(self, f: F) -> Result<Type, FinalError>
    where
        InitialError: Display,
        F: FnOnce(String) -> FinalError,
    {
        self.map_err(|e| f(e.to_string()))
    }
}
