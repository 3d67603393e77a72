//! Parse a comparison request from a URL query string

use crate::snapshot::{DEFAULT_SOURCE, PackageIdentity};
use std::{borrow::Cow, str::FromStr, string::FromUtf8Error};
use thiserror::Error;

/// An error returned when parsing a [`ComparisonRequest`] fails
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("missing required parameter `{0}`")]
    MissingField(&'static str),
    #[error("invalid percent-encoding in `{input}`")]
    InvalidEncoding {
        input: String,
        #[source]
        source: FromUtf8Error,
    },
}

/// Which two package versions to compare.
///
/// The new side defaults to the old side's package name and registry, so comparing two versions
/// of the same package only needs `name`, `version` and `newVersion`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComparisonRequest {
    pub name: String,
    pub new_name: Option<String>,
    pub version: String,
    pub new_version: String,
    pub source: String,
    pub new_source: Option<String>,
}

impl ComparisonRequest {
    /// Parse a query string such as `?name=Foo&version=1.0.0&newVersion=2.0.0`.
    ///
    /// Recognized keys are `name`, `newName`, `version`, `newVersion`, `source` and `newSource`.
    /// Unknown keys are ignored, empty values count as absent and the last occurrence of a key
    /// wins.
    pub fn from_query(query: &str) -> Result<Self, RequestError> {
        let query = query.strip_prefix('?').unwrap_or(query);

        let mut name = None;
        let mut new_name = None;
        let mut version = None;
        let mut new_version = None;
        let mut source = None;
        let mut new_source = None;

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode(value)?;
            if value.is_empty() {
                continue;
            }

            let slot = match decode(key)?.as_str() {
                "name" => &mut name,
                "newName" => &mut new_name,
                "version" => &mut version,
                "newVersion" => &mut new_version,
                "source" => &mut source,
                "newSource" => &mut new_source,
                _ => continue,
            };
            *slot = Some(value);
        }

        Ok(Self {
            name: name.ok_or(RequestError::MissingField("name"))?,
            new_name,
            version: version.ok_or(RequestError::MissingField("version"))?,
            new_version: new_version.ok_or(RequestError::MissingField("newVersion"))?,
            source: source.unwrap_or_else(|| DEFAULT_SOURCE.to_owned()),
            new_source,
        })
    }

    pub fn old_identity(&self) -> PackageIdentity {
        PackageIdentity::new(&self.name, &self.version).with_source(&self.source)
    }

    pub fn new_identity(&self) -> PackageIdentity {
        let name = self.new_name.as_ref().unwrap_or(&self.name);
        let source = self.new_source.as_ref().unwrap_or(&self.source);
        PackageIdentity::new(name, &self.new_version).with_source(source)
    }
}

impl FromStr for ComparisonRequest {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_query(s)
    }
}

fn decode(input: &str) -> Result<String, RequestError> {
    // Form encoding writes spaces as `+`
    let input = input.replace('+', " ");
    urlencoding::decode(&input)
        .map(Cow::into_owned)
        .map_err(|source| RequestError::InvalidEncoding {
            input: input.clone(),
            source,
        })
}
