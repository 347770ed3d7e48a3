use std::collections::HashMap;

use serde::Serialize;
use shared::{
    error::{ApiError, ErrorCode},
    path::{Destination, Path, Query},
};
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Decoded `application/x-www-form-urlencoded` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(HashMap<String, Vec<String>>);

impl FormValues {
    pub fn parse(body: &str) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in form_urlencoded::parse(body.as_bytes()) {
            values
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self(values)
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            values
                .entry((*key).to_string())
                .or_default()
                .push((*value).to_string());
        }
        Self(values)
    }

    /// First value for `name`, trimmed; empty when absent.
    pub fn get(&self, name: &str) -> &str {
        self.0
            .get(name)
            .and_then(|values| values.first())
            .map(|value| value.trim())
            .unwrap_or_default()
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.0
            .get(name)
            .map(|values| values.iter().map(|value| value.trim()).collect())
            .unwrap_or_default()
    }

    pub fn has(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PageRequest {
    pub method: Method,
    pub path: Path,
    pub query: Query,
    pub form: FormValues,
}

impl PageRequest {
    pub fn get(path: Path) -> Self {
        Self {
            method: Method::Get,
            path,
            query: Query::default(),
            form: FormValues::default(),
        }
    }

    pub fn post(path: Path, form: FormValues) -> Self {
        Self {
            method: Method::Post,
            path,
            query: Query::default(),
            form,
        }
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::Post
    }
}

/// What a step decided to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<V> {
    Render(V),
    Redirect(Destination),
}

impl<V> Outcome<V> {
    pub fn redirect_url(&self) -> Option<String> {
        match self {
            Outcome::Redirect(destination) => Some(destination.to_url()),
            Outcome::Render(_) => None,
        }
    }

    pub fn rendered(self) -> Option<V> {
        match self {
            Outcome::Render(data) => Some(data),
            Outcome::Redirect(_) => None,
        }
    }
}

/// A step outcome with its view data flattened to JSON, ready for the
/// HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Render {
        page: Path,
        data: serde_json::Value,
    },
    Redirect(String),
}

pub(crate) fn erase<V: Serialize>(page: Path, outcome: Outcome<V>) -> Result<PageOutcome, ApiError> {
    Ok(match outcome {
        Outcome::Render(data) => PageOutcome::Render {
            page,
            data: serde_json::to_value(data)
                .map_err(|err| ApiError::new(ErrorCode::Internal, err.to_string()))?,
        },
        Outcome::Redirect(destination) => PageOutcome::Redirect(destination.to_url()),
    })
}
