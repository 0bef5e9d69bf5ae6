/// Terminal outcome of a failed authentication attempt.
///
/// The carried messages are libpam's own descriptions of the terminal
/// status code. They are for logging and display only; callers must not
/// parse them for semantics.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("credential contains an interior NUL byte")]
    InvalidCredential,
    #[error("could not start PAM session: {message}")]
    SessionStart { message: String },
    #[error("authentication failed: {message}")]
    Authentication { message: String },
    #[error("account not permitted to log in: {message}")]
    Authorization { message: String },
}
