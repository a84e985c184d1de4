use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use catena_config::HttpConfig;
use indexmap::IndexMap;
use reqwest::Method;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::context::ExecutionContext;
use crate::error::{ParseError, TaskError};
use crate::payload::Payload;
use crate::registry::TaskRegistry;
use crate::task::{Task, TaskFactory};
use crate::template::TemplateContext;

/// Payload key holding a non-object response body.
const VALUE_KEY: &str = "_value";
const STATUS_CODE_KEY: &str = "_status_code";
const HEADERS_KEY: &str = "_headers";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
  Http,
  Https,
}

impl fmt::Display for Scheme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Http => f.write_str("http"),
      Self::Https => f.write_str("https"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
  #[serde(alias = "GET")]
  Get,
  #[serde(alias = "POST")]
  Post,
  #[serde(alias = "PUT")]
  Put,
  #[serde(alias = "DELETE")]
  Delete,
  #[serde(alias = "PATCH")]
  Patch,
  #[serde(alias = "HEAD")]
  Head,
  #[serde(alias = "OPTIONS")]
  Options,
}

impl From<HttpMethod> for Method {
  fn from(method: HttpMethod) -> Self {
    match method {
      HttpMethod::Get => Method::GET,
      HttpMethod::Post => Method::POST,
      HttpMethod::Put => Method::PUT,
      HttpMethod::Delete => Method::DELETE,
      HttpMethod::Patch => Method::PATCH,
      HttpMethod::Head => Method::HEAD,
      HttpMethod::Options => Method::OPTIONS,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpAuth {
  Basic { username: String, password: String },
}

/// How to turn the response body into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseContentType {
  /// Parse as JSON; failure is an error.
  Json,
  /// Keep the raw text under `_value`.
  Text,
}

/// The request to send. `path`, `params` values, `headers` values and
/// `body` are templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpRequestTemplate {
  /// Defaults to `http`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scheme: Option<Scheme>,
  pub host: String,
  pub port: u16,
  /// Defaults to `get`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub method: Option<HttpMethod>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub params: IndexMap<String, String>,
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub headers: IndexMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub auth: Option<HttpAuth>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub connection_timeout_ms: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub read_timeout_ms: Option<u64>,
}

impl HttpRequestTemplate {
  pub fn new(host: impl Into<String>, port: u16) -> Self {
    Self {
      scheme: None,
      host: host.into(),
      port,
      method: None,
      path: None,
      params: IndexMap::new(),
      headers: IndexMap::new(),
      auth: None,
      body: None,
      connection_timeout_ms: None,
      read_timeout_ms: None,
    }
  }

  pub fn method(mut self, method: HttpMethod) -> Self {
    self.method = Some(method);
    self
  }

  pub fn path(mut self, path: impl Into<String>) -> Self {
    self.path = Some(path.into());
    self
  }

  pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.params.insert(key.into(), value.into());
    self
  }

  pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.insert(key.into(), value.into());
    self
  }

  pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
    self.auth = Some(HttpAuth::Basic {
      username: username.into(),
      password: password.into(),
    });
    self
  }

  pub fn body(mut self, body: impl Into<String>) -> Self {
    self.body = Some(body.into());
    self
  }
}

/// Body of an `http` chain entry.
///
/// ```json
/// { "http": {
///     "request": { "host": "localhost", "port": 9200, "path": "/{{ ctx.payload.first.index }}/_search" },
///     "extract": ["hits.total"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpTaskDef {
  pub request: HttpRequestTemplate,
  /// Dotted paths to keep from the response body; empty keeps everything.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub extract: Vec<String>,
  /// If not specified, JSON is tried first and text is the fallback.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub response_content_type: Option<ResponseContentType>,
}

/// A request rendered against one execution.
#[derive(Debug, Clone, PartialEq)]
struct RenderedRequest {
  method: Method,
  url: Url,
  headers: Vec<(String, String)>,
  body: Option<String>,
}

/// Task that performs an HTTP request and returns the response as payload.
///
/// The request blocks until the response is read or a timeout fires.
#[derive(Debug, Clone)]
pub struct HttpTask {
  def: HttpTaskDef,
  defaults: HttpConfig,
}

impl HttpTask {
  pub const TYPE: &'static str = "http";

  pub fn new(def: HttpTaskDef) -> Self {
    Self {
      def,
      defaults: HttpConfig::default(),
    }
  }

  /// A task with no extraction and auto-detected response content.
  pub fn from_request(request: HttpRequestTemplate) -> Self {
    Self::new(HttpTaskDef {
      request,
      extract: Vec::new(),
      response_content_type: None,
    })
  }

  pub fn with_defaults(mut self, defaults: HttpConfig) -> Self {
    self.defaults = defaults;
    self
  }

  fn render(&self, templates: &TemplateContext) -> Result<RenderedRequest, TaskError> {
    let request = &self.def.request;
    let scheme = request.scheme.unwrap_or(Scheme::Http);
    let mut url = Url::parse(&format!("{}://{}:{}", scheme, request.host, request.port)).map_err(
      |e| TaskError::InvalidInput {
        field: "request.host".to_string(),
        message: e.to_string(),
      },
    )?;

    if let Some(path) = &request.path {
      url.set_path(&templates.render("request.path", path)?);
    }

    if !request.params.is_empty() {
      let mut rendered = Vec::with_capacity(request.params.len());
      for (key, template) in &request.params {
        let value = templates.render(&format!("request.params.{}", key), template)?;
        rendered.push((key, value));
      }
      url.query_pairs_mut().extend_pairs(rendered);
    }

    let mut headers = Vec::with_capacity(request.headers.len());
    for (key, template) in &request.headers {
      let value = templates.render(&format!("request.headers.{}", key), template)?;
      headers.push((key.clone(), value));
    }

    let body = request
      .body
      .as_deref()
      .map(|template| templates.render("request.body", template))
      .transpose()?;

    Ok(RenderedRequest {
      method: request.method.unwrap_or(HttpMethod::Get).into(),
      url,
      headers,
      body,
    })
  }

  fn client(&self) -> Result<Client, TaskError> {
    let request = &self.def.request;
    let connect_timeout = request
      .connection_timeout_ms
      .map(Duration::from_millis)
      .unwrap_or_else(|| self.defaults.connection_timeout());
    let timeout = request
      .read_timeout_ms
      .map(Duration::from_millis)
      .unwrap_or_else(|| self.defaults.read_timeout());

    Ok(
      Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(timeout)
        .user_agent(self.defaults.user_agent())
        .build()?,
    )
  }

  /// Turn a response into a payload.
  fn response_payload(
    &self,
    status: u16,
    headers: Map<String, Value>,
    body: String,
  ) -> Result<Payload, TaskError> {
    let value = match self.def.response_content_type {
      Some(ResponseContentType::Json) => {
        serde_json::from_str(&body).map_err(|e| TaskError::InvalidInput {
          field: "response".to_string(),
          message: format!("expected a JSON body: {}", e),
        })?
      }
      Some(ResponseContentType::Text) => Value::String(body),
      // Try to parse body as JSON, fall back to string
      None => serde_json::from_str(&body).unwrap_or(Value::String(body)),
    };

    let mut payload = match Payload::try_from(value) {
      Ok(object) if self.def.extract.is_empty() => object,
      Ok(object) => extract_paths(object.data(), &self.def.extract),
      Err(other) => {
        let mut payload = Payload::new();
        payload.insert(VALUE_KEY, other);
        payload
      }
    };

    payload.insert(STATUS_CODE_KEY, status);
    payload.insert(HEADERS_KEY, headers);
    Ok(payload)
  }
}

impl PartialEq for HttpTask {
  fn eq(&self, other: &Self) -> bool {
    self.def == other.def
  }
}

impl Task for HttpTask {
  fn type_name(&self) -> &str {
    Self::TYPE
  }

  fn to_value(&self) -> Value {
    // plain strings, integers and enums with string keys only
    serde_json::to_value(&self.def).expect("http task definition is always valid JSON")
  }

  fn execute(&self, ctx: &ExecutionContext, input: &Payload) -> Result<Payload, TaskError> {
    let templates = TemplateContext::new(ctx, input);
    let rendered = self.render(&templates)?;
    info!(method = %rendered.method, url = %rendered.url, "sending http request");

    let client = self.client()?;
    let mut request = client.request(rendered.method, rendered.url);
    for (key, value) in &rendered.headers {
      request = request.header(key, value);
    }
    if let Some(HttpAuth::Basic { username, password }) = &self.def.request.auth {
      request = request.basic_auth(username, Some(password));
    }
    if let Some(body) = rendered.body {
      request = request.body(body);
    }

    let response = request.send()?;
    let status = response.status().as_u16();

    let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
    for (name, value) in response.headers() {
      if let Ok(value) = value.to_str() {
        grouped
          .entry(name.as_str().to_string())
          .or_default()
          .push(Value::String(value.to_string()));
      }
    }
    let mut names: Vec<String> = grouped.keys().cloned().collect();
    names.sort_unstable();
    let headers: Map<String, Value> = names
      .into_iter()
      .map(|name| {
        let values = grouped.remove(&name).unwrap_or_default();
        (name, Value::Array(values))
      })
      .collect();

    let body = response.text()?;
    debug!(status, bytes = body.len(), "received http response");

    self.response_payload(status, headers, body)
  }
}

/// Keep only the dotted `paths` of `data`, preserving their nesting.
fn extract_paths(data: &Map<String, Value>, paths: &[String]) -> Payload {
  let mut extracted = Map::new();
  for path in paths {
    let segments: Vec<&str> = path.split('.').collect();
    if let Some(value) = lookup_path(data, &segments) {
      insert_path(&mut extracted, &segments, value.clone());
    }
  }
  Payload::from(extracted)
}

fn lookup_path<'a>(data: &'a Map<String, Value>, segments: &[&str]) -> Option<&'a Value> {
  let (first, rest) = segments.split_first()?;
  let value = data.get(*first)?;
  if rest.is_empty() {
    Some(value)
  } else {
    lookup_path(value.as_object()?, rest)
  }
}

fn insert_path(target: &mut Map<String, Value>, segments: &[&str], value: Value) {
  let Some((first, rest)) = segments.split_first() else {
    return;
  };
  if rest.is_empty() {
    target.insert(first.to_string(), value);
    return;
  }
  let child = target
    .entry(first.to_string())
    .or_insert_with(|| Value::Object(Map::new()));
  if let Value::Object(child) = child {
    insert_path(child, rest, value);
  }
}

/// Parses `http` bodies, applying the configured defaults to every task.
#[derive(Debug, Clone, Default)]
pub struct HttpTaskFactory {
  defaults: HttpConfig,
}

impl HttpTaskFactory {
  pub fn new(defaults: HttpConfig) -> Self {
    Self { defaults }
  }
}

impl TaskFactory for HttpTaskFactory {
  fn parse(&self, body: &Value, _registry: &TaskRegistry) -> Result<Box<dyn Task>, ParseError> {
    let def: HttpTaskDef = serde_json::from_value(body.clone())
      .map_err(|e| ParseError::invalid_body(HttpTask::TYPE, e.to_string()))?;
    Ok(Box::new(
      HttpTask::new(def).with_defaults(self.defaults.clone()),
    ))
  }
}
