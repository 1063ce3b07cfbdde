use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use actix_web::http::header::CONTENT_TYPE;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::json;

pub const GATEWAY_PATH: &str = "/ipfs/";

/// Response the fake gateway serves for a single content reference.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub delay: Duration,
}

impl CannedResponse {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Metadata document pointing to the given image reference
    pub fn metadata(image_ref: &str) -> Self {
        Self::json(json!({ "name": "Bonanza", "description": "test token", "image": image_ref }).to_string())
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self { status, content_type: None, body: String::new(), delay: Duration::ZERO }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct Route {
    /// Served once each, in order, before `steady`
    queued: VecDeque<CannedResponse>,
    steady: Option<CannedResponse>,
    hits: usize,
}

type Routes = Arc<RwLock<HashMap<String, Route>>>;

/// In-process HTTP server imitating a content-addressed store gateway.
/// Should be started inside an actix runtime, i.e. from `#[actix_web::test]`.
pub struct FakeGateway {
    addr: SocketAddr,
    routes: Routes,
}

impl FakeGateway {
    pub async fn start() -> anyhow::Result<FakeGateway> {
        let routes: Routes = Default::default();
        let routes_for_app = routes.clone();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(routes_for_app.clone()))
                .default_service(web::to(serve_canned))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))?;

        let addr = *server
            .addrs()
            .first()
            .ok_or_else(|| anyhow::anyhow!("Fake gateway isn't bound to any address"))?;

        actix_web::rt::spawn(server.run());

        Ok(FakeGateway { addr, routes })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, GATEWAY_PATH)
    }

    /// Full URL of the reference, the way a resolver would produce it
    pub fn url_of(&self, reference: &str) -> String {
        format!("{}{}", self.base_url(), reference)
    }

    pub fn put(&self, reference: &str, response: CannedResponse) {
        self.routes.write().unwrap().entry(reference.to_string()).or_default().steady = Some(response);
    }

    /// Serves `response` for the next `times` requests of the reference, then whatever was `put`
    pub fn put_times(&self, reference: &str, response: CannedResponse, times: usize) {
        let mut routes = self.routes.write().unwrap();
        let route = routes.entry(reference.to_string()).or_default();
        route.queued.extend(std::iter::repeat(response).take(times));
    }

    /// Number of requests the reference received so far
    pub fn hits(&self, reference: &str) -> usize {
        self.routes.read().unwrap().get(reference).map_or(0, |r| r.hits)
    }
}

async fn serve_canned(req: HttpRequest, routes: web::Data<Routes>) -> HttpResponse {
    let reference = req.path().strip_prefix(GATEWAY_PATH).unwrap_or(req.path());
    let canned = {
        let mut routes = routes.write().unwrap();
        let route = routes.entry(reference.to_string()).or_default();
        route.hits += 1;
        route.queued.pop_front().or_else(|| route.steady.clone())
    };

    let Some(canned) = canned else {
        return HttpResponse::NotFound().finish();
    };

    if !canned.delay.is_zero() {
        actix_web::rt::time::sleep(canned.delay).await;
    }

    let mut builder = HttpResponse::build(StatusCode::from_u16(canned.status).unwrap());
    if let Some(content_type) = canned.content_type {
        builder.insert_header((CONTENT_TYPE, content_type));
    }
    builder.body(canned.body)
}
