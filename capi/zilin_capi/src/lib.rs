use std::ffi::{CStr, CString};
use std::path::PathBuf;
use std::ptr;

use libc::c_char;
use zilin_rs::Zilin;

/// Borrow a C string as UTF-8; null or invalid input yields `None`.
unsafe fn borrow_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).map_or(ptr::null_mut(), CString::into_raw)
}

fn boxed(result: zilin_rs::Result<Zilin>) -> *mut Zilin {
    result.map_or(ptr::null_mut(), |zilin| Box::into_raw(Box::new(zilin)))
}

/// Load a corpus directory. Returns null when the corpus cannot be loaded.
#[no_mangle]
pub extern "C" fn zilin_new_from_dir(dir: *const c_char) -> *mut Zilin {
    match unsafe { borrow_str(dir) } {
        Some(dir) => boxed(Zilin::from_dir(PathBuf::from(dir))),
        None => ptr::null_mut(),
    }
}

/// Load a bundle written by `zilin-pack`. Returns null on failure.
#[no_mangle]
pub extern "C" fn zilin_new_from_bundle(path: *const c_char) -> *mut Zilin {
    match unsafe { borrow_str(path) } {
        Some(path) => boxed(Zilin::from_bundle(PathBuf::from(path))),
        None => ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn zilin_free(instance: *mut Zilin) {
    if !instance.is_null() {
        unsafe {
            let _ = Box::from_raw(instance);
        };
    }
}

/// Run a JSON request such as `{"fn":"getWord","args":{"word":"你好"}}`.
///
/// Returns the JSON result, or `{"error":"..."}` when the request does not
/// parse. The caller frees the result with `zilin_string_free`.
#[no_mangle]
pub extern "C" fn zilin_dispatch(
    instance: *const Zilin,
    request: *const c_char,
) -> *mut c_char {
    if instance.is_null() {
        return ptr::null_mut();
    }
    let zilin = unsafe { &*instance };
    let request = unsafe { borrow_str(request) }.unwrap_or("");

    let response = zilin.dispatch_json(request).unwrap_or_else(|err| {
        serde_json::json!({ "error": err.to_string() }).to_string()
    });
    into_c_string(response)
}

/// Tokenize `input` and return the tokens as a JSON array.
#[no_mangle]
pub extern "C" fn zilin_tokenize(instance: *const Zilin, input: *const c_char) -> *mut c_char {
    if instance.is_null() {
        return ptr::null_mut();
    }
    let zilin = unsafe { &*instance };
    let input = unsafe { borrow_str(input) }.unwrap_or("");

    match serde_json::to_string(&zilin.tokenize(input)) {
        Ok(json) => into_c_string(json),
        Err(_) => ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn zilin_string_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CEDICT: &str = "你好 你好 [ni3 hao3] /hello/hi/\n嗎 吗 [ma5] /(question particle)/\n";

    fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        unsafe { CString::from_raw(ptr).to_string_lossy().into_owned() }
    }

    #[test]
    fn test_zilin_tokenize() {
        let zilin = Zilin::from_texts(CEDICT, "", None, None).unwrap();
        let c_input = CString::new("你好吗").expect("CString conversion failed");

        let result = take_string(zilin_tokenize(&zilin as *const Zilin, c_input.as_ptr()));
        assert_eq!(
            result,
            r#"[{"value":"你好","offset":0,"hasEntries":true},{"value":"吗","offset":2,"hasEntries":true}]"#
        );
    }

    #[test]
    fn test_zilin_dispatch() {
        let zilin = Zilin::from_texts(CEDICT, "", None, None).unwrap();
        let c_request = CString::new(r#"{"fn":"getWord","args":{"word":"嗎","script":"traditional"}}"#)
            .expect("CString conversion failed");

        let result = take_string(zilin_dispatch(&zilin as *const Zilin, c_request.as_ptr()));
        assert_eq!(
            result,
            r#"[{"traditional":"嗎","simplified":"吗","pinyin":"ma5","english":"(question particle)"}]"#
        );

        let c_request = CString::new("not json").expect("CString conversion failed");
        let result = take_string(zilin_dispatch(&zilin as *const Zilin, c_request.as_ptr()));
        assert!(result.starts_with(r#"{"error":"#));
    }

    #[test]
    fn test_null_handles() {
        assert!(zilin_new_from_dir(ptr::null()).is_null());
        assert!(zilin_tokenize(ptr::null(), ptr::null()).is_null());
        zilin_free(ptr::null_mut());
        zilin_string_free(ptr::null_mut());

        let c_dir = CString::new("/no/such/zilin/data").expect("CString conversion failed");
        assert!(zilin_new_from_dir(c_dir.as_ptr()).is_null());
    }
}
