//! IPN signature middleware for Actix Web.
//!
//! The payment gateway signs every instant payment notification (IPN) with HMAC-SHA512, keyed with the IPN secret
//! from the merchant dashboard. The signature covers the canonical form of the JSON body (see
//! [`crate::helpers::canonical_json`]) and arrives hex-encoded in the `x-nowpayments-sig` header.
//!
//! Wrap the IPN route with this middleware. Requests that fail the check never reach the handler; they get a 401 with
//! a JSON error body. Requests that pass are forwarded with their body intact.
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use ipn_common::Secret;
use log::{trace, warn};

use crate::{
    errors::{ServerError, SignatureError},
    helpers::verify_ipn_signature,
};

pub struct IpnSignatureMiddlewareFactory {
    header: String,
    secret: Secret<String>,
    // If false, then the middleware will not check the signature and always allow the call
    enabled: bool,
}

impl IpnSignatureMiddlewareFactory {
    pub fn new(header: &str, secret: Secret<String>, enabled: bool) -> Self {
        Self { header: header.into(), secret, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IpnSignatureMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = IpnSignatureMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IpnSignatureMiddlewareService {
            header: self.header.clone(),
            secret: self.secret.clone(),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct IpnSignatureMiddlewareService<S> {
    header: String,
    secret: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for IpnSignatureMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.secret.clone();
        let header = self.header.clone();
        let enabled = self.enabled;
        Box::pin(async move {
            if !enabled {
                trace!("🔐️ IPN signature checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            let signature = req
                .headers()
                .get(&header)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    warn!("🔐️ No IPN signature found in request. Denying access.");
                    ServerError::from(SignatureError::MissingSignature)
                })?;
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {e:?}");
                ServerError::InvalidRequestBody(e.to_string())
            })?;
            let body = serde_json::from_slice::<serde_json::Value>(&data).map_err(|e| {
                warn!("🔐️ IPN body is not valid JSON. {e}. Denying access.");
                ServerError::from(SignatureError::InvalidJson)
            })?;
            if verify_ipn_signature(secret.reveal(), &body, &signature) {
                trace!("🔐️ IPN signature check ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid IPN signature found in request. Denying access.");
                Err(ServerError::from(SignatureError::InvalidSignature).into())
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
