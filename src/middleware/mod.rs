pub mod access_log;
pub mod panic;
pub mod rate_limit;
pub mod security_headers;
