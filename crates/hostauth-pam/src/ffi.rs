//! Raw bindings to the host libpam.

#![allow(non_camel_case_types)]
#![allow(dead_code)]

use libc::{c_char, c_int, c_void};

/// Opaque per-transaction state owned by libpam.
pub type pam_handle_t = c_void;

#[repr(C)]
pub struct pam_message {
    pub msg_style: c_int,
    pub msg: *const c_char,
}

#[repr(C)]
pub struct pam_response {
    pub resp: *mut c_char,
    pub resp_retcode: c_int,
}

pub type conv_fn = extern "C" fn(
    num_msg: c_int,
    msg: *const *const pam_message,
    resp: *mut *mut pam_response,
    appdata_ptr: *mut c_void,
) -> c_int;

#[repr(C)]
pub struct pam_conv {
    pub conv: Option<conv_fn>,
    pub appdata_ptr: *mut c_void,
}

pub const PAM_SUCCESS: c_int = 0;
pub const PAM_BUF_ERR: c_int = 5;
pub const PAM_CONV_ERR: c_int = 19;

pub const PAM_PROMPT_ECHO_OFF: c_int = 1;
pub const PAM_PROMPT_ECHO_ON: c_int = 2;
pub const PAM_ERROR_MSG: c_int = 3;
pub const PAM_TEXT_INFO: c_int = 4;

pub const PAM_DISALLOW_NULL_AUTHTOK: c_int = 0x0001;

extern "C" {
    pub fn pam_start(
        service: *const c_char,
        user: *const c_char,
        conversation: *const pam_conv,
        handle: *mut *mut pam_handle_t,
    ) -> c_int;
    pub fn pam_end(handle: *mut pam_handle_t, status: c_int) -> c_int;
    pub fn pam_authenticate(handle: *mut pam_handle_t, flags: c_int) -> c_int;
    pub fn pam_acct_mgmt(handle: *mut pam_handle_t, flags: c_int) -> c_int;
    pub fn pam_strerror(handle: *const pam_handle_t, errnum: c_int) -> *const c_char;
}
