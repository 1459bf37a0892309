use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::{c_char, c_int, c_uint, c_void, CStr, CString};
use std::rc::Rc;

use log::warn;

use crate::emscripten_h::emscripten_async_wget2_data;
use crate::error::TransportError;
use crate::transport::Transport;

type Inbox = RefCell<VecDeque<Result<String, TransportError>>>;

/// Browser transport on top of emscripten's asynchronous XHR wrapper.
///
/// Each request hands one strong reference to the inbox over to the
/// callbacks; exactly one of them fires and takes it back.
pub struct FetchTransport {
    base_url: String,
    inbox: Rc<Inbox>,
}

impl FetchTransport {
    /// `base_url` may be empty to talk to the page's own origin.
    pub fn new(base_url: &str) -> FetchTransport {
        FetchTransport {
            base_url: base_url.trim_end_matches('/').to_string(),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
        }
    }
}

extern "C" fn on_load(_handle: c_uint, arg: *mut c_void, data: *mut c_void, size: c_uint) {
    let inbox = unsafe { Rc::from_raw(arg as *const Inbox) };
    let bytes = if data.is_null() {
        &[][..]
    } else {
        unsafe { std::slice::from_raw_parts(data as *const u8, size as usize) }
    };
    let response = String::from_utf8(bytes.to_vec())
        .map_err(|err| TransportError::MalformedResponse(err.to_string()));
    inbox.borrow_mut().push_back(response);
}

extern "C" fn on_error(_handle: c_uint, arg: *mut c_void, status: c_int, status_text: *const c_char) {
    let inbox = unsafe { Rc::from_raw(arg as *const Inbox) };
    let error = if status > 0 {
        TransportError::Status(status as u16)
    } else if status_text.is_null() {
        TransportError::Request("request failed".to_string())
    } else {
        let text = unsafe { CStr::from_ptr(status_text) };
        TransportError::Request(text.to_string_lossy().into_owned())
    };
    inbox.borrow_mut().push_back(Err(error));
}

impl Transport for FetchTransport {
    fn send(&mut self, path: &str, body: String) {
        let (Ok(url), Ok(body)) = (
            CString::new(format!("{}{path}", self.base_url)),
            CString::new(body),
        ) else {
            warn!("request contains a NUL byte, dropping it");
            return;
        };
        let arg = Rc::into_raw(Rc::clone(&self.inbox)) as *mut c_void;
        unsafe {
            emscripten_async_wget2_data(
                url.as_ptr(),
                c"PUT".as_ptr(),
                body.as_ptr(),
                arg,
                1,
                Some(on_load),
                Some(on_error),
                None,
            );
        }
    }

    fn poll(&mut self) -> Option<Result<String, TransportError>> {
        self.inbox.borrow_mut().pop_front()
    }
}
