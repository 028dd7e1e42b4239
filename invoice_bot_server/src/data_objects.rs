use serde::{Deserialize, Serialize};

/// The body returned to the gateway for every authenticated notification: `{"ok":true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpnAck {
    pub ok: bool,
}

impl IpnAck {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok".into(), service: env!("CARGO_PKG_NAME").into() }
    }
}
