use crate::error::HeapError;

pub fn exit_code_for_error(err: &HeapError) -> i32 {
    match err {
        HeapError::InvalidUrl(_) => 3,
        HeapError::Config(_) => 2,
        HeapError::Unsupported(_) => 4,
        HeapError::EmptyBuffer => 5,
        HeapError::Transport(_) => 6,
        HeapError::ActiveTab(_) => 7,
        HeapError::Clipboard(_) => 8,
        HeapError::Io(_) => 23,
        HeapError::Json(_) => 26,
        HeapError::FileNotFound(_) => 37,
        HeapError::BrowserCookie(message) => browser_cookie_exit_code(message),
    }
}

fn browser_cookie_exit_code(message: &str) -> i32 {
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission") || lower.contains("locked") {
        return 77;
    }
    43
}

#[cfg(test)]
mod tests {
    use super::exit_code_for_error;
    use crate::error::HeapError;

    #[test]
    fn exit_code_maps_invalid_url() {
        let err = HeapError::InvalidUrl("bad".to_string());
        assert_eq!(exit_code_for_error(&err), 3);
    }

    #[test]
    fn exit_code_maps_empty_buffer() {
        assert_eq!(exit_code_for_error(&HeapError::EmptyBuffer), 5);
    }

    #[test]
    fn exit_code_distinguishes_locked_databases() {
        let err = HeapError::BrowserCookie("database is locked".to_string());
        assert_eq!(exit_code_for_error(&err), 77);
        let err = HeapError::BrowserCookie("no cookies table".to_string());
        assert_eq!(exit_code_for_error(&err), 43);
    }
}
