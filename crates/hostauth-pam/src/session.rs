//! Session driver: owns the PAM handle lifecycle.
//!
//! One attempt is a linear walk: start the transaction, authenticate,
//! validate the account, end. The handle is closed exactly once on
//! every path that produced one; the diagnostic for a failed step is
//! copied out of libpam before the handle is torn down.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::ptr;

use libc::c_int;
use tracing::{debug, instrument};

use crate::conv::{conversation, Credentials};
use crate::error::AuthError;
use crate::ffi;

/// One open PAM transaction. `end` consumes the value, so no exit path
/// can close it twice; dropping without `end` still closes it with the
/// last observed status.
pub(crate) trait Transaction {
    fn authenticate(&mut self) -> c_int;
    fn validate_account(&mut self) -> c_int;
    /// Human-readable description of `code`, copied out while the
    /// transaction is still alive.
    fn describe(&self, code: c_int) -> String;
    fn end(self, code: c_int);
}

pub(crate) trait Stack {
    type Session<'c>: Transaction
    where
        Self: 'c;

    /// Opens a transaction for `service` with the conversation bound to
    /// `credentials`. On failure there is no handle to close; the error
    /// is the best available diagnostic.
    fn start<'c>(
        &'c self,
        service: &CStr,
        credentials: &'c Credentials,
    ) -> Result<Self::Session<'c>, String>;
}

/// Checks `username`/`password` against the host PAM stack.
///
/// `service` names a PAM policy on the host (usually a file under
/// `/etc/pam.d`). Both credential tokens are passed through opaque;
/// empty passwords are rejected rather than treated as valid. The call
/// blocks for as long as the configured modules take (directory-backed
/// stacks can be slow), so async callers should run it on a
/// blocking-friendly worker. Each call owns its own transaction; there
/// is no shared state between concurrent calls.
///
/// On failure the returned [`AuthError`] names the stage that failed
/// and carries libpam's own description of the terminal status.
#[instrument(level = "debug", skip(password))]
pub fn authenticate(service: &str, username: &str, password: &str) -> Result<(), AuthError> {
    run(&LibPam, service, username, password)
}

enum Stage {
    Authenticate,
    Authorize,
}

fn run<S: Stack>(
    stack: &S,
    service: &str,
    username: &str,
    password: &str,
) -> Result<(), AuthError> {
    let credentials =
        Credentials::new(username, password).map_err(|_| AuthError::InvalidCredential)?;
    let service = CString::new(service).map_err(|_| AuthError::InvalidCredential)?;

    let mut transaction = stack
        .start(&service, &credentials)
        .map_err(|message| AuthError::SessionStart { message })?;

    let mut code = transaction.authenticate();
    let stage = if code == ffi::PAM_SUCCESS {
        code = transaction.validate_account();
        Stage::Authorize
    } else {
        Stage::Authenticate
    };

    if code == ffi::PAM_SUCCESS {
        transaction.end(code);
        debug!("authentication succeeded");
        return Ok(());
    }

    // Copied before end: closing the transaction may invalidate the
    // stack's error context.
    let message = transaction.describe(code);
    transaction.end(code);
    debug!(code, "authentication failed");
    Err(match stage {
        Stage::Authenticate => AuthError::Authentication { message },
        Stage::Authorize => AuthError::Authorization { message },
    })
}

/// The host libpam.
struct LibPam;

struct PamTransaction<'c> {
    handle: *mut ffi::pam_handle_t,
    status: c_int,
    // The conversation appdata pointer handed to pam_start borrows the
    // credentials; keep that borrow alive for the whole transaction.
    _credentials: PhantomData<&'c Credentials>,
}

impl Stack for LibPam {
    type Session<'c> = PamTransaction<'c>
    where
        Self: 'c;

    fn start<'c>(
        &'c self,
        service: &CStr,
        credentials: &'c Credentials,
    ) -> Result<PamTransaction<'c>, String> {
        let conv = ffi::pam_conv {
            conv: Some(conversation),
            appdata_ptr: (credentials as *const Credentials).cast_mut().cast(),
        };
        let mut handle: *mut ffi::pam_handle_t = ptr::null_mut();
        let code = unsafe {
            ffi::pam_start(
                service.as_ptr(),
                credentials.username().as_ptr(),
                &conv,
                &mut handle,
            )
        };
        if code != ffi::PAM_SUCCESS {
            return Err(describe_code(code));
        }
        if handle.is_null() {
            return Err("PAM reported success without a transaction handle".to_string());
        }
        Ok(PamTransaction {
            handle,
            status: code,
            _credentials: PhantomData,
        })
    }
}

impl Transaction for PamTransaction<'_> {
    fn authenticate(&mut self) -> c_int {
        self.status =
            unsafe { ffi::pam_authenticate(self.handle, ffi::PAM_DISALLOW_NULL_AUTHTOK) };
        self.status
    }

    fn validate_account(&mut self) -> c_int {
        self.status = unsafe { ffi::pam_acct_mgmt(self.handle, ffi::PAM_DISALLOW_NULL_AUTHTOK) };
        self.status
    }

    fn describe(&self, code: c_int) -> String {
        let text = unsafe { ffi::pam_strerror(self.handle, code) };
        if text.is_null() {
            format!("PAM error {code}")
        } else {
            unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
        }
    }

    fn end(mut self, code: c_int) {
        self.status = code;
    }
}

impl Drop for PamTransaction<'_> {
    fn drop(&mut self) {
        // The terminal status lets the modules do step-specific cleanup.
        let _ = unsafe { ffi::pam_end(self.handle, self.status) };
    }
}

/// Start failures have no handle to query; Linux-PAM's `pam_strerror`
/// ignores the handle argument, with a generic fallback in case the
/// host implementation does not.
fn describe_code(code: c_int) -> String {
    let text = unsafe { ffi::pam_strerror(ptr::null(), code) };
    if text.is_null() {
        format!("failed to start PAM transaction (code {code})")
    } else {
        unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
    }
}
