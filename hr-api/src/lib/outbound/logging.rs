use std::error::Error;

use crate::domain::user::ports::AuditLogger;

/// [`AuditLogger`] backed by `tracing`, under the `hr_api::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

impl TracingAuditLogger {
    pub fn new() -> Self {
        Self
    }
}

impl AuditLogger for TracingAuditLogger {
    fn info(&self, message: &str, fields: &[(&str, &str)]) {
        let context = render_fields(fields);
        tracing::info!(target: "hr_api::audit", context = %context, "{}", message);
    }

    fn error(&self, message: &str, error: &dyn Error) {
        tracing::error!(target: "hr_api::audit", error = %error, "{}", message);
    }
}

fn render_fields(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
