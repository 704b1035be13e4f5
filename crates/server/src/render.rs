use std::path::{Path, PathBuf};

use axum::http::HeaderMap;
use minijinja::{path_loader, Environment};
use serde::Serialize;
use thiserror::Error;

use crate::{helpers, view_model::ViewModel};

const FORWARDED_PREFIX: &str = "x-forwarded-prefix";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Index,
    Latest,
    Search,
    Results,
    Event,
}

impl View {
    pub fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Latest => "latest",
            Self::Search => "search",
            Self::Results => "results",
            Self::Event => "event",
        }
    }

    pub fn template(self) -> String {
        format!("{}.html", self.name())
    }
}

/// Per-request rendering inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub base_path: String,
}

impl RenderRequest {
    /// Uses the proxy-supplied `X-Forwarded-Prefix` when present, else `default_base`.
    pub fn from_headers(headers: &HeaderMap, default_base: &str) -> Self {
        let base_path = headers
            .get(FORWARDED_PREFIX)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or(default_base);
        Self {
            base_path: helpers::url_join(base_path, ""),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to render template {template}: {source}")]
    Template {
        template: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Turns a view model into a complete page body.
///
/// Implementations must return the whole page or an error; callers write nothing
/// to the response until this returns.
pub trait PageRenderer: Send + Sync {
    fn render(
        &self,
        view: View,
        model: &ViewModel,
        request: &RenderRequest,
    ) -> Result<String, RenderError>;
}

#[derive(Serialize)]
struct Frame<'a> {
    #[serde(flatten)]
    model: &'a ViewModel,
    // Must stay equal to `helpers::BASE_PATH_KEY`.
    #[serde(rename = "BasePath")]
    base_path: &'a str,
}

/// Renders `<view>.html` templates from a directory. Views extend `layout.html`.
pub struct TemplateRenderer {
    dir: PathBuf,
    cached: Option<Environment<'static>>,
}

impl TemplateRenderer {
    /// With `reload` set, templates are read from disk on every render.
    pub fn new(dir: impl Into<PathBuf>, reload: bool) -> Self {
        let dir = dir.into();
        let cached = (!reload).then(|| environment(&dir));
        Self { dir, cached }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn reloads(&self) -> bool {
        self.cached.is_none()
    }
}

fn environment(dir: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(path_loader(dir.to_path_buf()));
    helpers::register(&mut env);
    env
}

impl PageRenderer for TemplateRenderer {
    fn render(
        &self,
        view: View,
        model: &ViewModel,
        request: &RenderRequest,
    ) -> Result<String, RenderError> {
        let fresh;
        let env = match &self.cached {
            Some(env) => env,
            None => {
                fresh = environment(&self.dir);
                &fresh
            }
        };

        let template = view.template();
        let frame = Frame {
            model,
            base_path: &request.base_path,
        };
        env.get_template(&template)
            .and_then(|tpl| tpl.render(&frame))
            .map_err(|source| RenderError::Template { template, source })
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
