use actix_service::{self, Transform};
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse},
    Error,
};
use futures::{
    future::{ready, LocalBoxFuture, Ready},
    FutureExt,
};
use std::{rc::Rc, time::Instant};

/// Logs one line per request with its outcome and latency.
pub struct RequestTracingFactory;

pub struct RequestTracing<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestTracing<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv: Rc<S> = self.service.clone();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let started = Instant::now();

        async move {
            let res: ServiceResponse<B> = srv.call(req).await?;
            let status = res.status().as_u16();
            let elapsed_ms = started.elapsed().as_millis() as u64;
            if res.status().is_server_error() {
                tracing::warn!(%method, %path, status, elapsed_ms, "request failed");
            } else {
                tracing::info!(%method, %path, status, elapsed_ms, "request served");
            }
            Ok(res)
        }
        .boxed_local()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestTracingFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestTracing<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTracing {
            service: Rc::new(service),
        }))
    }
}
