//! Request handling for the demo
//!
//! Routes:
//! - `GET /` renders the document form
//! - `POST /` validates a submitted form and shows the cleaned data or errors
//! - `GET /autocomplete/?q=&page=` returns matching templates as select2 JSON
//! - `GET <static_url>waff/choice_with_other.js` serves the companion script
//!
//! Bodies are read through [`collect_body`], which answers 413 past the
//! configured limit.

use crate::forms::document_form;
use crate::models::TemplateStore;
use crate::settings::DemoSettings;
use bytes::Bytes;
use http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use waff::forms::field::escape_html;
use waff::forms::{CHOICE_WITH_OTHER_JS, CHOICE_WITH_OTHER_JS_PATH, Form, Media};

pub const AUTOCOMPLETE_URL: &str = "/autocomplete/";

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json";
const JAVASCRIPT: &str = "application/javascript; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";

#[derive(Debug, Default, Deserialize)]
struct AutocompleteQuery {
	#[serde(default)]
	q: String,
	#[serde(default)]
	page: Option<usize>,
}

#[derive(Debug, Serialize)]
struct AutocompleteResult<'a> {
	id: String,
	text: &'a str,
}

#[derive(Debug, Serialize)]
struct Pagination {
	more: bool,
}

#[derive(Debug, Serialize)]
struct AutocompleteResponse<'a> {
	results: Vec<AutocompleteResult<'a>>,
	pagination: Pagination,
}

/// The demo application
pub struct App {
	settings: DemoSettings,
	store: Arc<TemplateStore>,
}

impl App {
	pub fn new(settings: DemoSettings, store: Arc<TemplateStore>) -> Self {
		Self { settings, store }
	}

	pub fn settings(&self) -> &DemoSettings {
		&self.settings
	}

	fn script_path(&self) -> String {
		Media::absolute_path(CHOICE_WITH_OTHER_JS_PATH, &self.settings.static_url)
	}

	/// Dispatch one request
	pub fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
		let method = request.method().clone();
		let path = request.uri().path().to_string();

		let response = match (&method, path.as_str()) {
			(&Method::GET, "/") => self.form_page(None),
			(&Method::POST, "/") => self.submit(request.body()),
			(_, "/") => text(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
			(&Method::GET, "/autocomplete" | AUTOCOMPLETE_URL) => {
				self.autocomplete(request.uri().query().unwrap_or_default())
			}
			(&Method::GET, script) if script == self.script_path() => {
				respond(StatusCode::OK, JAVASCRIPT, CHOICE_WITH_OTHER_JS)
			}
			_ => text(StatusCode::NOT_FOUND, "Not found"),
		};

		tracing::info!(%method, %path, status = response.status().as_u16(), "handled request");
		response
	}

	fn build_form(&self) -> Result<Form, Response<Bytes>> {
		document_form(&self.store, AUTOCOMPLETE_URL).map_err(|error| {
			tracing::error!(%error, "cannot build document form");
			text(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
		})
	}

	fn form_page(&self, data: Option<HashMap<String, Value>>) -> Response<Bytes> {
		let mut form = match self.build_form() {
			Ok(form) => form,
			Err(response) => return response,
		};

		let mut result = String::new();
		if let Some(data) = data {
			form.bind(data);
			if form.is_valid() {
				let cleaned = serde_json::to_string_pretty(form.cleaned_data()).unwrap_or_default();
				result = format!(
					"<h2>Cleaned data</h2>\n<pre id=\"cleaned-data\">{}</pre>\n",
					escape_html(&cleaned)
				);
			}
		}

		let fields = match form.as_p() {
			Ok(fields) => fields,
			Err(error) => {
				tracing::error!(%error, "cannot render document form");
				return text(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
			}
		};

		let page = format!(
			"<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>Document templates</title>\n{}\n</head>\n<body>\n<form method=\"post\" action=\"/\">\n{}\n<input type=\"submit\" value=\"Submit\" />\n</form>\n{}</body>\n</html>\n",
			form.media().render(&self.settings.static_url),
			fields,
			result
		);
		respond(StatusCode::OK, HTML, page)
	}

	fn submit(&self, body: &Bytes) -> Response<Bytes> {
		let pairs: Vec<(String, String)> = match serde_urlencoded::from_bytes(body) {
			Ok(pairs) => pairs,
			Err(error) => {
				tracing::debug!(%error, "malformed form body");
				return text(StatusCode::BAD_REQUEST, "Malformed form data");
			}
		};
		let data = pairs
			.into_iter()
			.map(|(key, value)| (key, Value::String(value)))
			.collect();
		self.form_page(Some(data))
	}

	fn autocomplete(&self, query: &str) -> Response<Bytes> {
		let query: AutocompleteQuery = match serde_urlencoded::from_str(query) {
			Ok(query) => query,
			Err(error) => {
				tracing::debug!(%error, "malformed autocomplete query");
				return text(StatusCode::BAD_REQUEST, "Malformed query");
			}
		};

		let page_size = self.settings.autocomplete_page_size;
		let page = query.page.unwrap_or(1).max(1);
		let matches = self.store.search(&query.q);
		let start = (page - 1).saturating_mul(page_size);

		let results = matches
			.iter()
			.skip(start)
			.take(page_size)
			.map(|template| AutocompleteResult {
				id: template.id.to_string(),
				text: &template.name,
			})
			.collect();
		let body = AutocompleteResponse {
			results,
			pagination: Pagination {
				more: matches.len() > start.saturating_add(page_size),
			},
		};

		match serde_json::to_vec(&body) {
			Ok(json) => {
				let mut response = respond(StatusCode::OK, JSON, json);
				response
					.headers_mut()
					.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
				response
			}
			Err(error) => {
				tracing::error!(%error, "cannot serialize autocomplete results");
				text(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
			}
		}
	}
}

/// Read the whole body of `request`, refusing more than `limit` bytes
///
/// The Content-Length header is checked before anything is read; a body
/// without one is cut off by [`Limited`] as soon as it crosses the limit.
pub async fn collect_body<B>(request: Request<B>, limit: usize) -> Result<Request<Bytes>, Response<Bytes>>
where
	B: Body<Data = Bytes>,
	B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
	if let Some(length) = request.headers().get(CONTENT_LENGTH)
		&& let Ok(length) = length.to_str()
		&& let Ok(length) = length.parse::<u64>()
		&& length > limit as u64
	{
		tracing::debug!(length, limit, "declared request body too large");
		return Err(text(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"));
	}

	let (parts, body) = request.into_parts();
	match Limited::new(body, limit).collect().await {
		Ok(collected) => Ok(Request::from_parts(parts, collected.to_bytes())),
		Err(error) if error.is::<LengthLimitError>() => {
			tracing::debug!(limit, "request body crossed the limit");
			Err(text(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"))
		}
		Err(error) => {
			tracing::warn!(%error, "failed to read request body");
			Err(text(StatusCode::BAD_REQUEST, "Bad request"))
		}
	}
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Bytes> {
	let mut response = Response::new(body.into());
	*response.status_mut() = status;
	response
		.headers_mut()
		.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
	response
}

fn text(status: StatusCode, message: &'static str) -> Response<Bytes> {
	respond(status, TEXT, message)
}

#[cfg(test)]
mod tests {
	use super::*;
	use http_body_util::Full;
	use rstest::{fixture, rstest};

	#[fixture]
	fn app() -> App {
		App::new(
			DemoSettings {
				autocomplete_page_size: 2,
				..DemoSettings::default()
			},
			Arc::new(TemplateStore::seeded()),
		)
	}

	fn get(uri: &str) -> Request<Bytes> {
		Request::builder()
			.method(Method::GET)
			.uri(uri)
			.body(Bytes::new())
			.unwrap()
	}

	fn post(body: &str) -> Request<Bytes> {
		Request::builder()
			.method(Method::POST)
			.uri("/")
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(Bytes::from(body.to_string()))
			.unwrap()
	}

	fn body_text(response: &Response<Bytes>) -> &str {
		std::str::from_utf8(response.body()).unwrap()
	}

	#[rstest]
	fn test_form_page(app: App) {
		// Act
		let response = app.handle(get("/"));

		// Assert
		assert_eq!(response.status(), StatusCode::OK);
		let html = body_text(&response);
		assert!(html.contains(
			"<script type=\"text/javascript\" src=\"/static/waff/choice_with_other.js\"></script>"
		));
		assert_eq!(html.matches("class=\"choice_with_other_wrapper\"").count(), 5);
		assert!(html.contains("data-autocomplete-url=\"/autocomplete/\""));
		assert!(!html.contains("{other_form_field}"));
	}

	#[rstest]
	fn test_post_invalid_shows_errors(app: App) {
		// Act
		let response = app.handle(post("document_template_0=__other__&document_template_1="));

		// Assert
		assert_eq!(response.status(), StatusCode::OK);
		let html = body_text(&response);
		assert!(html.contains("<ul class=\"errorlist\"><li>This field is required.</li></ul>"));
		assert!(!html.contains("cleaned-data"));
	}

	#[rstest]
	fn test_post_valid_shows_cleaned_data(app: App) {
		// Arrange
		let body = "document_template_0=choice1\
			&document_template2_0=__other__&document_template2_1=4\
			&document_template3_0=__other__&document_template3_1=Hello+world\
			&document_template4_0=choice2\
			&document_template5_0=choice1\
			&maria=1&teste=choice1";

		// Act
		let response = app.handle(post(body));

		// Assert
		let html = body_text(&response);
		assert!(html.contains("<pre id=\"cleaned-data\">"));
		assert!(html.contains("Hello world"));
		assert!(!html.contains("errorlist"));
	}

	#[rstest]
	fn test_autocomplete_pages_results(app: App) {
		// Act
		let first = app.handle(get("/autocomplete/?q=note"));
		let all = app.handle(get("/autocomplete/?page=3"));

		// Assert
		assert_eq!(first.headers()[CACHE_CONTROL], "no-cache");
		assert_eq!(first.headers()[CONTENT_TYPE], JSON);
		let first: Value = serde_json::from_slice(first.body()).unwrap();
		assert_eq!(
			first,
			serde_json::json!({
				"results": [
					{"id": "3", "text": "Delivery note"},
					{"id": "4", "text": "Credit note"}
				],
				"pagination": {"more": false}
			})
		);
		let all: Value = serde_json::from_slice(all.body()).unwrap();
		assert_eq!(all["results"].as_array().map(Vec::len), Some(1));
		assert_eq!(all["pagination"]["more"], false);
	}

	#[rstest]
	fn test_autocomplete_reports_more(app: App) {
		// Act
		let response = app.handle(get("/autocomplete/"));

		// Assert
		let json: Value = serde_json::from_slice(response.body()).unwrap();
		assert_eq!(json["pagination"]["more"], true);
	}

	#[rstest]
	fn test_static_script(app: App) {
		// Act
		let response = app.handle(get("/static/waff/choice_with_other.js"));

		// Assert
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(response.headers()[CONTENT_TYPE], JAVASCRIPT);
		assert_eq!(response.body().as_ref(), CHOICE_WITH_OTHER_JS.as_bytes());
	}

	#[rstest]
	#[tokio::test]
	async fn test_collect_body_within_limit() {
		// Arrange
		let request = Request::builder()
			.method(Method::POST)
			.uri("/")
			.body(Full::new(Bytes::from_static(b"teste=choice1")))
			.unwrap();

		// Act
		let request = collect_body(request, 64).await.unwrap();

		// Assert
		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.body().as_ref(), b"teste=choice1");
	}

	#[rstest]
	#[tokio::test]
	async fn test_collect_body_rejects_declared_length() {
		// Arrange
		let request = Request::builder()
			.method(Method::POST)
			.uri("/")
			.header(CONTENT_LENGTH, "65")
			.body(Full::new(Bytes::new()))
			.unwrap();

		// Act
		let response = collect_body(request, 64).await.unwrap_err();

		// Assert
		assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
	}

	#[rstest]
	#[tokio::test]
	async fn test_collect_body_rejects_oversized_body_without_length() {
		// Arrange
		let request = Request::builder()
			.method(Method::POST)
			.uri("/")
			.body(Full::new(Bytes::from(vec![b'a'; 65])))
			.unwrap();

		// Act
		let response = collect_body(request, 64).await.unwrap_err();

		// Assert
		assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
		assert_eq!(body_text(&response), "Request body too large");
	}

	#[rstest]
	#[case(Method::GET, "/missing", StatusCode::NOT_FOUND)]
	#[case(Method::DELETE, "/", StatusCode::METHOD_NOT_ALLOWED)]
	#[case(Method::GET, "/autocomplete/?page=x", StatusCode::BAD_REQUEST)]
	fn test_error_statuses(
		app: App,
		#[case] method: Method,
		#[case] uri: &str,
		#[case] expected: StatusCode,
	) {
		// Arrange
		let request = Request::builder()
			.method(method)
			.uri(uri)
			.body(Bytes::new())
			.unwrap();

		// Act
		let response = app.handle(request);

		// Assert
		assert_eq!(response.status(), expected);
	}
}
