//! Conversation responder: answers libpam's prompts from pre-supplied
//! credentials instead of a terminal.
//!
//! libpam inverts control during `pam_authenticate`: it hands the
//! application a batch of prompts and expects one response per prompt.
//! The responder here never renders prompts; it only classifies their
//! style and copies the matching credential field back.

use std::ffi::{CString, NulError};
use std::fmt;

use libc::{c_int, c_void};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ffi;

/// Username/password pair bound to one authentication attempt.
///
/// Owned by the session driver; the conversation callback borrows it
/// through the `pam_conv` appdata pointer. Both fields are wiped on
/// drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    username: CString,
    password: CString,
}

impl Credentials {
    /// Fails if either token carries an interior NUL byte, which a C
    /// string cannot represent.
    pub fn new(username: &str, password: &str) -> Result<Self, NulError> {
        Ok(Self {
            username: CString::new(username)?,
            password: CString::new(password)?,
        })
    }

    pub(crate) fn username(&self) -> &std::ffi::CStr {
        &self.username
    }

    pub(crate) fn password(&self) -> &std::ffi::CStr {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"REDACTED")
            .finish()
    }
}

/// The `pam_conv` callback. `appdata_ptr` must point at the
/// [`Credentials`] owned by the driver for the duration of the call.
///
/// Produces either a complete response batch or nothing: on an
/// unsupported prompt style or a failed allocation, every response
/// already built for this batch is released and the batch is rejected
/// with `PAM_CONV_ERR`. Responses are allocated with the C allocator
/// because ownership transfers to libpam, which releases them with
/// `free(3)`.
pub(crate) extern "C" fn conversation(
    num_msg: c_int,
    msg: *const *const ffi::pam_message,
    resp: *mut *mut ffi::pam_response,
    appdata_ptr: *mut c_void,
) -> c_int {
    if msg.is_null() || resp.is_null() || appdata_ptr.is_null() || num_msg <= 0 {
        return ffi::PAM_CONV_ERR;
    }
    // Valid for the whole callback: the driver keeps the credentials
    // alive until pam_end returns.
    let credentials = unsafe { &*appdata_ptr.cast_const().cast::<Credentials>() };

    let count = num_msg as usize;
    let responses: *mut ffi::pam_response =
        unsafe { libc::calloc(count, std::mem::size_of::<ffi::pam_response>()) }.cast();
    if responses.is_null() {
        return ffi::PAM_CONV_ERR;
    }

    for i in 0..count {
        let message = unsafe { *msg.add(i) };
        if message.is_null() {
            return unsafe { reject(responses, i) };
        }
        let source = match unsafe { (*message).msg_style } {
            ffi::PAM_PROMPT_ECHO_ON => credentials.username(),
            ffi::PAM_PROMPT_ECHO_OFF => credentials.password(),
            _ => return unsafe { reject(responses, i) },
        };
        let copy = unsafe { libc::strdup(source.as_ptr()) };
        if copy.is_null() {
            return unsafe { reject(responses, i) };
        }
        unsafe { (*responses.add(i)).resp = copy };
    }

    unsafe { *resp = responses };
    ffi::PAM_SUCCESS
}

/// Releases the first `produced` responses and the batch itself, then
/// signals rejection. Only the prefix is owned at this point; the input
/// prompts belong to libpam and are left alone.
unsafe fn reject(responses: *mut ffi::pam_response, produced: usize) -> c_int {
    for i in 0..produced {
        libc::free((*responses.add(i)).resp.cast());
    }
    libc::free(responses.cast());
    ffi::PAM_CONV_ERR
}
