// HTTP middleware implementations

pub mod allowed_hosts; // Host header and client network filtering
pub mod auth; // Bearer token decoding into AuthContext
