//! Canvas REST client and the content-object adapter over its JSON records
//!
//! The client owns all transport concerns: bearer-token auth, `Link`-header
//! pagination, and the one-request-per-object write-back. Fetched records
//! come back as [`CanvasObject`]s, JSON-map-backed values that implement
//! [`ContentObject`] so the processor can read and stage text fields by
//! name without knowing anything about the wire format.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{FetchError, PersistError};
use crate::processor::ContentObject;

/// Canvas paginates at 10 per page by default; ask for bigger pages to keep
/// the request count down.
const PER_PAGE: u32 = 50;

/// Synchronous client for one Canvas instance.
pub struct CanvasClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

/// Course metadata for the startup banner.
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: u64,
    pub course_code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub term: Option<Term>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Term {
    pub name: String,
}

impl CanvasClient {
    /// Create a client for `base_url` (e.g. `https://canvas.example.edu`)
    /// authenticating with `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("coursesed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    /// Look up a course, including its enrollment term for display.
    pub fn get_course(&self, course_id: u64) -> Result<Course, FetchError> {
        let url = format!(
            "{}/api/v1/courses/{}?include[]=term",
            self.base_url, course_id
        );
        let (value, _) = self.get_json(&url)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch every assignment in the course, in service order.
    pub fn fetch_assignments(&self, course_id: u64) -> Result<Vec<CanvasObject<'_>>, FetchError> {
        let items = self.get_paginated(format!(
            "{}/api/v1/courses/{}/assignments?per_page={}",
            self.base_url, course_id, PER_PAGE
        ))?;
        Ok(self.adopt_by_id(items, course_id, "assignments", "assignment"))
    }

    /// Fetch every quiz in the course, in service order.
    pub fn fetch_quizzes(&self, course_id: u64) -> Result<Vec<CanvasObject<'_>>, FetchError> {
        let items = self.get_paginated(format!(
            "{}/api/v1/courses/{}/quizzes?per_page={}",
            self.base_url, course_id, PER_PAGE
        ))?;
        Ok(self.adopt_by_id(items, course_id, "quizzes", "quiz"))
    }

    /// Fetch every wiki page in the course.
    ///
    /// The pages listing omits `body`, so each page is re-fetched
    /// individually to materialize its text. This is the slow path; a
    /// progress bar on stderr tracks the per-page requests.
    pub fn fetch_pages(&self, course_id: u64) -> Result<Vec<CanvasObject<'_>>, FetchError> {
        let listing = self.get_paginated(format!(
            "{}/api/v1/courses/{}/pages?per_page={}",
            self.base_url, course_id, PER_PAGE
        ))?;

        let pb = ProgressBar::new(listing.len() as u64);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} pages {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        let mut pages = Vec::with_capacity(listing.len());
        for entry in listing {
            let Some(slug) = entry.get("url").and_then(Value::as_str) else {
                log::warn!("skipping page listing entry without a url slug");
                pb.inc(1);
                continue;
            };
            pb.set_message(slug.to_string());
            let endpoint = format!(
                "{}/api/v1/courses/{}/pages/{}",
                self.base_url, course_id, slug
            );
            let (full, _) = self.get_json(&endpoint)?;
            match full {
                Value::Object(fields) => pages.push(CanvasObject {
                    client: self,
                    endpoint,
                    wrapper: "wiki_page",
                    fields,
                    staged: Map::new(),
                }),
                _ => log::warn!("page {} did not decode to an object; skipping", slug),
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(pages)
    }

    /// Wrap listing items that carry a numeric `id` into adapters addressed
    /// at `{collection}/{id}`. Entries without an id cannot be written back,
    /// so they are dropped with a warning.
    fn adopt_by_id(
        &self,
        items: Vec<Value>,
        course_id: u64,
        collection: &str,
        wrapper: &'static str,
    ) -> Vec<CanvasObject<'_>> {
        let mut objects = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(fields) = item else {
                log::warn!("skipping non-object {} listing entry", wrapper);
                continue;
            };
            let Some(id) = fields.get("id").and_then(Value::as_u64) else {
                log::warn!("skipping {} listing entry without an id", wrapper);
                continue;
            };
            objects.push(CanvasObject {
                client: self,
                endpoint: format!(
                    "{}/api/v1/courses/{}/{}/{}",
                    self.base_url, course_id, collection, id
                ),
                wrapper,
                fields,
                staged: Map::new(),
            });
        }
        objects
    }

    /// GET a single JSON document, returning it together with the
    /// `rel="next"` pagination link when present.
    fn get_json(&self, url: &str) -> Result<(Value, Option<String>), FetchError> {
        log::debug!("GET {}", url);
        let response = self.http.get(url).bearer_auth(&self.token).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        let next = next_page_url(response.headers());
        let value = response.json()?;
        Ok((value, next))
    }

    /// Follow `rel="next"` links until the collection is exhausted,
    /// concatenating the page arrays in service order.
    fn get_paginated(&self, first_url: String) -> Result<Vec<Value>, FetchError> {
        let mut items = Vec::new();
        let mut url = Some(first_url);
        while let Some(current) = url {
            let (value, next) = self.get_json(&current)?;
            match value {
                Value::Array(page) => items.extend(page),
                other => items.push(other),
            }
            url = next;
        }
        Ok(items)
    }

    fn put_update(&self, url: &str, body: &Value) -> Result<(), PersistError> {
        log::debug!("PUT {}", url);
        let response = self.http.put(url).bearer_auth(&self.token).json(body).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PersistError::Rejected {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        Ok(())
    }
}

/// One fetched Canvas record: its raw JSON fields plus the endpoint and
/// wrapper key needed to write it back.
///
/// Borrows the client for the duration of a single processing pass.
pub struct CanvasObject<'c> {
    client: &'c CanvasClient,
    endpoint: String,
    /// Canvas update APIs nest parameters under a type key, e.g.
    /// `{"wiki_page": {"body": ...}}`.
    wrapper: &'static str,
    fields: Map<String, Value>,
    staged: Map<String, Value>,
}

impl ContentObject for CanvasObject<'_> {
    fn get(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(Value::String(text)) => Some(text),
            // Canvas serves empty rich-text fields as JSON null
            Some(Value::Null) => Some(""),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: String) {
        self.fields
            .insert(field.to_string(), Value::String(value.clone()));
        self.staged.insert(field.to_string(), Value::String(value));
    }

    fn persist(&mut self) -> Result<(), PersistError> {
        let mut body = Map::new();
        body.insert(
            self.wrapper.to_string(),
            Value::Object(self.staged.clone()),
        );
        self.client
            .put_update(&self.endpoint, &Value::Object(body))?;
        self.staged.clear();
        Ok(())
    }
}

/// Extract the `rel="next"` target from an RFC 5988 `Link` header, the
/// pagination scheme Canvas uses:
///
/// `Link: <https://.../assignments?page=2>; rel="next", <...>; rel="last"`
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    for entry in link.split(',') {
        let mut parts = entry.trim().splitn(2, ';');
        let target = parts.next().unwrap_or("").trim();
        let params = parts.next().unwrap_or("");
        if !(target.starts_with('<') && target.ends_with('>')) {
            continue;
        }
        if params.split(';').any(|p| p.trim() == "rel=\"next\"") {
            return Some(target[1..target.len() - 1].to_string());
        }
    }
    None
}
