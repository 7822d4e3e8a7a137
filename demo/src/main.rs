//! Demo server for the choice-with-other field
//!
//! Settings come from `waff.toml` (or the file named by `WAFF_SETTINGS`) and
//! `WAFF_*` environment variables; log output is controlled by `RUST_LOG`.

mod forms;
mod models;
mod settings;
mod views;

use anyhow::Context;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use models::TemplateStore;
use settings::DemoSettings;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing_subscriber::EnvFilter;
use views::{App, collect_body};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let settings = DemoSettings::load().context("failed to load settings")?;
	let app = Arc::new(App::new(settings, Arc::new(TemplateStore::seeded())));
	let bind = app.settings().bind;

	let listener = TcpListener::bind(bind)
		.await
		.with_context(|| format!("failed to bind {}", bind))?;
	tracing::info!(%bind, "listening on http://{}", bind);

	loop {
		let (stream, remote_addr) = listener.accept().await?;
		let app = app.clone();

		tokio::task::spawn(async move {
			if let Err(error) = serve_connection(stream, remote_addr, app).await {
				tracing::warn!(%remote_addr, %error, "error handling connection");
			}
		});
	}
}

async fn serve_connection(
	stream: TcpStream,
	remote_addr: SocketAddr,
	app: Arc<App>,
) -> Result<(), hyper::Error> {
	let io = TokioIo::new(stream);
	let service = service_fn(move |request: hyper::Request<Incoming>| {
		let app = app.clone();
		async move { Ok::<_, Infallible>(dispatch(&app, remote_addr, request).await) }
	});

	http1::Builder::new().serve_connection(io, service).await
}

async fn dispatch(
	app: &App,
	remote_addr: SocketAddr,
	request: hyper::Request<Incoming>,
) -> hyper::Response<Full<Bytes>> {
	let response = match collect_body(request, app.settings().max_body_size).await {
		Ok(request) => app.handle(request),
		Err(response) => {
			tracing::info!(%remote_addr, status = response.status().as_u16(), "rejected request body");
			response
		}
	};
	response.map(Full::new)
}
