//! Middleware for Web API.

pub mod audit;
pub mod auth;
pub mod client_ip;
pub mod guard;

pub use audit::{request_audit, RequestAuditScope};
pub use auth::CurrentUser;
pub use client_ip::{client_ip, ClientInfo, ClientIp};
pub use guard::brute_force_gate;
