mod ipn_signature;

pub use ipn_signature::{IpnSignatureMiddlewareFactory, IpnSignatureMiddlewareService};
