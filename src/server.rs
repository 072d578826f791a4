//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use base64::prelude::{Engine as _, BASE64_STANDARD};
use bytes::Bytes;
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde_json::{json, Value};

use crate::error::{fm_err, ia_err, ia_error, user_agent};
use crate::error::FMError;
use crate::params::filename_from_url;
use crate::server_builder::ServerBuilder;

use std::result::Result;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use url::Url;

type JsonMap = serde_json::Map<String, Value>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RELOGIN_TIMEOUT: Duration = Duration::from_secs(14 * 60);

/// Result of a script run as part of a request: the script error code (`0`
/// on success) and the value the script returned, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptResult {
    pub error: i32,
    pub result: Option<String>,
}

/// **A connection to one database on a FileMaker Server**.
///
/// This should be created once and used throughout the application
/// lifetime, across all tasks. All requests are sent through it:
/// ```no_run
/// use filemaker_data_api::{GetRecordsRequest, Server};
/// # #[tokio::main]
/// # pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let server = Server::builder()
///     .url("https://fms.example.com")?
///     .database("Contacts")?
///     .credentials("admin", "admin")?
///     .build()?;
/// server.login().await?;
/// let foundset = GetRecordsRequest::new("Contacts").limit(10).execute(&server).await?;
/// for record in &foundset {
///     println!("{}", record.get("name")?);
/// }
/// server.logout().await?;
/// # Ok(())
/// # }
/// ```
///
/// Note: there is no need to enclose this struct in an `Rc` or [`Arc`], as it uses an
/// [`Arc`] internally, so calling `.clone()` on this struct will always return the
/// same underlying connection and session.
#[derive(Clone, Debug)]
pub struct Server {
    // Use an inner Arc so cloning keeps the same session
    pub(crate) inner: Arc<ServerRef>,
}

#[derive(Debug)]
pub(crate) struct ServerRef {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) builder: ServerBuilder,
    // std Mutexes are never held across awaits
    session: Mutex<Session>,
    last_error: Mutex<Option<i32>>,
    last_script_result: Mutex<IndexMap<String, ScriptResult>>,
    // serializes logins, so concurrent requests do not each start a session
    login_lock: tokio::sync::Mutex<()>,
    timeout: Duration,
    relogin_timeout: Duration,
}

#[derive(Default)]
struct Session {
    token: Option<String>,
    started: Option<Instant>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("started", &self.started)
            .finish()
    }
}

/// A file downloaded with [`Server::fetch_file()`].
#[derive(Debug, Clone)]
pub struct FetchedFile {
    /// File name, taken from the last path segment of the url.
    pub name: String,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub data: Bytes,
}

impl Server {
    /// Create a new [`ServerBuilder`].
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    // Create the new Server based on builder configuration
    pub(crate) fn new(builder: ServerBuilder) -> Result<Server, FMError> {
        if builder.url.is_empty() {
            if builder.from_environment {
                return ia_err!("cannot build server: no url given. set FMREST_URL environment.");
            }
            return ia_err!("cannot build server: no url given, call ServerBuilder::url()");
        }
        if builder.database.is_empty() {
            if builder.from_environment {
                return ia_err!("cannot build server: no database given. set FMREST_DATABASE environment.");
            }
            return ia_err!("cannot build server: no database given, call ServerBuilder::database()");
        }
        let base_url = Url::parse(&builder.url)?;
        if base_url.cannot_be_a_base() {
            return ia_err!("cannot build server: invalid url {}", builder.url);
        }
        let timeout = builder.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let relogin_timeout = builder.auto_relogin_timeout.unwrap_or(DEFAULT_RELOGIN_TIMEOUT);
        let client = match &builder.client {
            Some(c) => c.clone(),
            None => {
                let mut cb = reqwest::Client::builder()
                    .timeout(timeout)
                    .connect_timeout(timeout);
                if let Some(cert) = &builder.add_cert {
                    cb = cb.add_root_certificate(cert.clone());
                }
                if builder.accept_invalid_certs {
                    cb = cb.danger_accept_invalid_certs(true);
                }
                cb.build()?
            }
        };
        debug!(
            "Creating new Server: url={}, database={}, auto_relogin={}",
            base_url, builder.database, builder.auto_relogin
        );
        Ok(Server {
            inner: Arc::new(ServerRef {
                client,
                base_url,
                builder,
                session: Mutex::new(Session::default()),
                last_error: Mutex::new(None),
                last_script_result: Mutex::new(IndexMap::new()),
                login_lock: tokio::sync::Mutex::new(()),
                timeout,
                relogin_timeout,
            }),
        })
    }

    /// Log in to the database and start a new session.
    ///
    /// Authentication happens with HTTP Basic auth; later requests use the
    /// session token returned by the server. Returns the token.
    pub async fn login(&self) -> Result<String, FMError> {
        let _guard = self.inner.login_lock.lock().await;
        self.login_locked().await
    }

    // must be called with login_lock held
    async fn login_locked(&self) -> Result<String, FMError> {
        let b = &self.inner.builder;
        let opts = SendOptions {
            method: Method::POST,
            segments: vec!["sessions".to_string()],
            body: Some(json!({ "fmDataSource": b.data_sources })),
            basic_auth: true,
            timeout: self.inner.timeout,
            ..Default::default()
        };
        let response = self.send_once(&opts).await?;
        let token = match response.get("token").and_then(|t| t.as_str()) {
            Some(t) => t.to_string(),
            None => return fm_err!(BadResponse, "login response contains no token"),
        };
        {
            let mut s = self.session();
            s.token = Some(token.clone());
            s.started = Some(Instant::now());
        }
        debug!("Logged in to database {}", b.database);
        Ok(token)
    }

    /// End the current session. Returns true if the server confirmed it.
    ///
    /// The session is only dropped locally once the server answered; if the
    /// request fails, the token is kept and logout can be tried again.
    pub async fn logout(&self) -> Result<bool, FMError> {
        let Some(token) = self.token() else {
            return ia_err!("cannot log out: not logged in");
        };
        // the token is part of the path; no Authorization header is sent
        let opts = SendOptions {
            method: Method::DELETE,
            segments: vec!["sessions".to_string(), token.clone()],
            timeout: self.inner.timeout,
            no_auth: true,
            ..Default::default()
        };
        self.send_once(&opts).await?;
        {
            let mut s = self.session();
            // a concurrent login may have started a new session meanwhile
            if s.token.as_deref() == Some(token.as_str()) {
                s.token = None;
                s.started = None;
            }
        }
        debug!("Logged out of database {}", self.inner.builder.database);
        Ok(self.last_error() == Some(0))
    }

    /// Returns true if a session token is held.
    pub fn is_logged_in(&self) -> bool {
        self.session().token.is_some()
    }

    /// The database this server connects to.
    pub fn database(&self) -> &str {
        &self.inner.builder.database
    }

    /// The last error code returned by FileMaker Server.
    ///
    /// `None` if no request has been answered yet, `Some(-1)` if the last
    /// response carried no error code.
    pub fn last_error(&self) -> Option<i32> {
        *lock(&self.inner.last_error)
    }

    /// The script results of the last request, keyed by `prerequest`,
    /// `presort` and `after`. Only scripts that ran (i.e. reported an error
    /// code) are present.
    pub fn last_script_result(&self) -> IndexMap<String, ScriptResult> {
        lock(&self.inner.last_script_result).clone()
    }

    /// Download a file from a container url as returned in a record.
    ///
    /// Container urls carry their own authorization, so no session is needed.
    pub async fn fetch_file(&self, file_url: &str) -> Result<FetchedFile, FMError> {
        let resp = self
            .inner
            .client
            .get(file_url)
            .header(USER_AGENT, HeaderValue::from_str(user_agent())?)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        if !resp.status().is_success() {
            return fm_err!(
                RequestError,
                "got unexpected http status {} fetching {}",
                resp.status(),
                file_url
            );
        }
        let content_type = header_str(resp.headers(), CONTENT_TYPE.as_str());
        let content_length =
            header_str(resp.headers(), CONTENT_LENGTH.as_str()).and_then(|l| l.parse().ok());
        let data = resp.bytes().await?;
        trace!("fetched {} bytes from container url", data.len());
        Ok(FetchedFile {
            name: filename_from_url(file_url),
            content_type,
            content_length,
            data,
        })
    }

    pub(crate) fn get_timeout(&self, t: &Option<Duration>) -> Duration {
        // if t is given, use that. If not, use server's timeout
        if let Some(d) = t {
            return *d;
        }
        self.inner.timeout
    }

    pub(crate) fn type_conversion(&self) -> bool {
        self.inner.builder.type_conversion
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        lock(&self.inner.session)
    }

    fn token(&self) -> Option<String> {
        self.session().token.clone()
    }

    #[cfg(test)]
    pub(crate) fn set_token(&self, token: &str) {
        let mut s = self.session();
        s.token = Some(token.to_string());
        s.started = Some(Instant::now());
    }

    // Log in when there is no token, or when the session is older than the
    // relogin timeout
    async fn ensure_session(&self) -> Result<(), FMError> {
        if !self.session_expired() {
            return Ok(());
        }
        let _guard = self.inner.login_lock.lock().await;
        // another task may have logged in while we waited
        if self.session_expired() {
            trace!("no valid session, logging in");
            self.login_locked().await?;
        }
        Ok(())
    }

    fn session_expired(&self) -> bool {
        let s = self.session();
        match (&s.token, s.started) {
            (Some(_), Some(started)) => started.elapsed() > self.inner.relogin_timeout,
            _ => true,
        }
    }

    async fn relogin(&self, rejected: Option<String>) -> Result<(), FMError> {
        let _guard = self.inner.login_lock.lock().await;
        // only start a new session if nobody replaced the rejected token yet
        if self.token() == rejected {
            self.session().token = None;
            self.login_locked().await?;
        }
        Ok(())
    }

    /// Send a request and return the `response` object of the answer.
    ///
    /// With auto re-login, a session is started first if needed, and a
    /// retryable request rejected with an invalid token error is sent once more
    /// with a new session.
    pub(crate) async fn send(&self, opts: &SendOptions) -> Result<JsonMap, FMError> {
        if !self.inner.builder.auto_relogin {
            return self.send_once(opts).await;
        }
        self.ensure_session().await?;
        let sent_token = self.token();
        match self.send_once(opts).await {
            Err(e) if e.is_invalid_token() && opts.retryable => {
                debug!("session token was rejected, logging in again");
                self.relogin(sent_token).await?;
                self.send_once(opts).await
            }
            r => r,
        }
    }

    pub(crate) async fn send_once(&self, opts: &SendOptions) -> Result<JsonMap, FMError> {
        let url = self.endpoint(&opts.segments)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent())?);
        if opts.basic_auth {
            let b = &self.inner.builder;
            let creds = BASE64_STANDARD.encode(format!("{}:{}", b.user, b.password));
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Basic {}", creds))?);
        } else if !opts.no_auth {
            if let Some(t) = self.token() {
                headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", t))?);
            }
        }
        trace!("{} {}", opts.method, url.path());
        let mut rb = self
            .inner
            .client
            .request(opts.method.clone(), url)
            .headers(headers)
            .timeout(opts.timeout);
        if !opts.query.is_empty() {
            rb = rb.query(&opts.query);
        }
        if let Some(body) = &opts.body {
            rb = rb.body(serde_json::to_vec(body)?);
        }
        let resp = rb.send().await?;
        self.handle_response(resp).await
    }

    /// Send a multipart form (container upload). Uploads are never repeated.
    pub(crate) async fn send_multipart(
        &self,
        segments: Vec<String>,
        form: reqwest::multipart::Form,
        timeout: Duration,
    ) -> Result<JsonMap, FMError> {
        if self.inner.builder.auto_relogin {
            self.ensure_session().await?;
        }
        let url = self.endpoint(&segments)?;
        // reqwest sets the multipart Content-Type, including the boundary
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent())?);
        if let Some(t) = self.token() {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", t))?);
        }
        trace!("POST multipart {}", url.path());
        let resp = self
            .inner
            .client
            .post(url)
            .headers(headers)
            .multipart(form)
            .timeout(timeout)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<JsonMap, FMError> {
        let status = resp.status();
        let content_type = header_str(resp.headers(), CONTENT_TYPE.as_str()).unwrap_or_default();
        let bytes = resp.bytes().await?;
        let data: Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => {
                // no FileMaker code is available for this request
                *lock(&self.inner.last_error) = Some(-1);
                return fm_err!(
                    BadJSON,
                    "could not decode response as json: {} (http status {}, content type '{}')",
                    e,
                    status,
                    content_type
                );
            }
        };
        self.handle_response_data(data)
    }

    // Record error code and script results, then fail on a non-zero code
    pub(crate) fn handle_response_data(&self, data: Value) -> Result<JsonMap, FMError> {
        let parsed = parse_response_data(data)?;
        *lock(&self.inner.last_error) = Some(parsed.code);
        *lock(&self.inner.last_script_result) = parsed.script_results;
        if parsed.code != 0 {
            return Err(FMError::from_server(parsed.code, &parsed.message));
        }
        Ok(parsed.response)
    }

    // Build {base}/fmi/data/v1/databases/{database}/{segments...}, percent-encoding each segment
    pub(crate) fn endpoint(&self, segments: &[String]) -> Result<Url, FMError> {
        let mut url = self.inner.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ia_error!("invalid server url {}", self.inner.base_url))?;
            path.pop_if_empty()
                .extend(["fmi", "data", "v1", "databases"])
                .push(&self.inner.builder.database)
                .extend(segments);
        }
        Ok(url)
    }
}

impl std::fmt::Display for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "<Server logged_in={} database={}>",
            self.is_logged_in(),
            self.inner.builder.database
        )
    }
}

#[derive(Debug)]
pub(crate) struct SendOptions {
    pub(crate) method: Method,
    // path below the database, not yet encoded
    pub(crate) segments: Vec<String>,
    pub(crate) body: Option<Value>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) timeout: Duration,
    pub(crate) retryable: bool,
    pub(crate) basic_auth: bool,
    // send no Authorization header at all
    pub(crate) no_auth: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        SendOptions {
            method: Method::GET,
            segments: Vec::new(),
            body: None,
            query: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            retryable: false,
            basic_auth: false,
            no_auth: false,
        }
    }
}

/// The parts of a decoded Data API answer.
#[derive(Debug)]
pub(crate) struct ParsedResponse {
    pub(crate) code: i32,
    pub(crate) message: String,
    pub(crate) script_results: IndexMap<String, ScriptResult>,
    pub(crate) response: JsonMap,
}

/// Split a decoded answer into its first message code/text, the script
/// results and the `response` object.
pub(crate) fn parse_response_data(data: Value) -> Result<ParsedResponse, FMError> {
    let Value::Object(mut data) = data else {
        return fm_err!(BadResponse, "response is not a json object");
    };
    let first = match data.get("messages") {
        Some(Value::Array(msgs)) if !msgs.is_empty() => msgs[0].clone(),
        _ => return fm_err!(BadResponse, "response has no 'messages' block"),
    };
    let code = first.get("code").and_then(code_value).unwrap_or(-1);
    let message = first
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error")
        .to_string();
    let response = match data.remove("response") {
        Some(Value::Object(o)) => o,
        _ => JsonMap::new(),
    };
    let mut script_results = IndexMap::new();
    for (kind, suffix) in [("prerequest", ".prerequest"), ("presort", ".presort"), ("after", "")] {
        let error = response
            .get(&format!("scriptError{}", suffix))
            .and_then(code_value);
        if let Some(error) = error {
            let result = response
                .get(&format!("scriptResult{}", suffix))
                .and_then(|r| r.as_str())
                .map(|r| r.to_string());
            script_results.insert(kind.to_string(), ScriptResult { error, result });
        }
    }
    Ok(ParsedResponse {
        code,
        message,
        script_results,
        response,
    })
}

// FileMaker sends codes as strings ("0"), older versions as numbers
pub(crate) fn code_value(v: &Value) -> Option<i32> {
    match v {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
        _ => None,
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
