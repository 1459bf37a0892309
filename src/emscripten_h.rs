use core::ffi::{c_char, c_int, c_uint, c_void};

pub fn set_main_loop(func: EmCallbackFunc) -> ! {
    unsafe { emscripten_set_main_loop(func, 0, 1) };
    // emscripten_set_main_loop with simulate_infinite_loop set to true will
    // throw an exception to stop execution of the caller, i.e. we never end up
    // here. The loop {} here just reflects the actual "return value" of
    // emscripten_set_main_loop, which would in this case be "!".
    loop {}
}

pub type EmCallbackFunc = extern "C" fn();
pub type EmWget2DataOnload =
    extern "C" fn(handle: c_uint, arg: *mut c_void, data: *mut c_void, size: c_uint);
pub type EmWget2DataOnerror =
    extern "C" fn(handle: c_uint, arg: *mut c_void, status: c_int, status_text: *const c_char);
pub type EmWget2DataOnprogress =
    extern "C" fn(handle: c_uint, arg: *mut c_void, loaded: c_int, total: c_int);

extern "C" {
    /// https://emscripten.org/docs/api_reference/emscripten.h.html#c.emscripten_set_main_loop
    pub fn emscripten_set_main_loop(
        func: EmCallbackFunc,
        fps: c_int,
        simulate_infinite_loop: c_int,
    );

    /// https://emscripten.org/docs/api_reference/emscripten.h.html#c.emscripten_async_wget2_data
    pub fn emscripten_async_wget2_data(
        url: *const c_char,
        requesttype: *const c_char,
        param: *const c_char,
        arg: *mut c_void,
        free: c_int,
        onload: Option<EmWget2DataOnload>,
        onerror: Option<EmWget2DataOnerror>,
        onprogress: Option<EmWget2DataOnprogress>,
    ) -> c_int;
}
