//! Request audit middleware.
//!
//! Opens an audit scope before the rest of the stack runs. The scope writes
//! exactly one request record: with the response status when the response
//! comes back, or with 500 when the request future is dropped first.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::USER_AGENT, StatusCode},
    middleware::Next,
    response::Response,
};
use tokio::runtime::Handle;

use super::client_ip::{client_ip, ClientIp};
use crate::audit::AuditLogger;
use crate::web::handlers::AppState;

struct PendingRecord {
    ip: String,
    method: String,
    path: String,
    user_agent: Option<String>,
}

/// Guarantees a request record on every exit path.
pub struct RequestAuditScope {
    audit: AuditLogger,
    pending: Option<PendingRecord>,
}

impl RequestAuditScope {
    /// Open a scope for one request.
    pub fn open(
        audit: AuditLogger,
        ip: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            audit,
            pending: Some(PendingRecord {
                ip: ip.into(),
                method: method.into(),
                path: path.into(),
                user_agent,
            }),
        }
    }

    /// Write the record with the final status.
    ///
    /// The write runs on its own task, so dropping this future part way
    /// through does not lose the record.
    pub async fn finish(mut self, status: StatusCode) {
        let Some(record) = self.pending.take() else {
            return;
        };
        let audit = self.audit.clone();
        let write = tokio::spawn(async move {
            write_record(&audit, record, status.as_u16()).await;
        });
        if let Err(e) = write.await {
            tracing::warn!(error = %e, "Request record task failed");
        }
    }
}

impl Drop for RequestAuditScope {
    fn drop(&mut self) {
        let Some(record) = self.pending.take() else {
            return;
        };
        match Handle::try_current() {
            Ok(handle) => {
                let audit = self.audit.clone();
                handle.spawn(async move {
                    write_record(&audit, record, StatusCode::INTERNAL_SERVER_ERROR.as_u16()).await;
                });
            }
            Err(_) => {
                tracing::warn!(ip = %record.ip, path = %record.path, "Request record lost: no runtime");
            }
        }
    }
}

// Best-effort: a failed write never changes the response.
async fn write_record(audit: &AuditLogger, record: PendingRecord, status: u16) {
    if let Err(e) = audit
        .record_request(
            &record.ip,
            &record.method,
            &record.path,
            status,
            record.user_agent.as_deref(),
        )
        .await
    {
        tracing::warn!(
            ip = %record.ip,
            path = %record.path,
            error = %e,
            "Failed to record request"
        );
    }
}

/// Outermost middleware: attributes the request to a client and audits it.
pub async fn request_audit(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&req, state.trust_forwarded_for);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let scope = RequestAuditScope::open(
        state.audit.clone(),
        ip.clone(),
        req.method().as_str(),
        req.uri().path(),
        user_agent,
    );
    req.extensions_mut().insert(ClientIp(ip));

    let response = next.run(req).await;
    scope.finish(response.status()).await;
    response
}
