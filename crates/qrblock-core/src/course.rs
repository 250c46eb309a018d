use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Identifier of a course on the host platform. Always positive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct CourseId(u64);

impl CourseId {
    pub fn new(raw: i64) -> CoreResult<Self> {
        if raw <= 0 {
            return Err(CoreError::InvalidCourseId(raw));
        }
        Ok(Self(raw as u64))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for CourseId {
    type Error = CoreError;

    fn try_from(raw: i64) -> CoreResult<Self> {
        Self::new(raw)
    }
}

impl From<CourseId> for i64 {
    fn from(id: CourseId) -> Self {
        id.0 as i64
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub shortname: String,
    #[serde(default)]
    pub fullname: String,
}

impl Course {
    pub fn new(id: CourseId) -> Self {
        Self {
            id,
            shortname: String::new(),
            fullname: String::new(),
        }
    }

    pub fn with_names(mut self, shortname: impl Into<String>, fullname: impl Into<String>) -> Self {
        self.shortname = shortname.into();
        self.fullname = fullname.into();
        self
    }

    pub fn url(&self, wwwroot: &str) -> CoreResult<Url> {
        course_url(wwwroot, self.id)
    }
}

/// Canonical link of a course: `{wwwroot}/course/view.php?id={id}`.
pub fn course_url(wwwroot: &str, id: CourseId) -> CoreResult<Url> {
    // Url::join replaces the last path segment unless the base ends with '/'.
    let base = if wwwroot.ends_with('/') {
        wwwroot.to_string()
    } else {
        format!("{wwwroot}/")
    };
    let mut url = Url::parse(&base)?.join("course/view.php")?;
    url.query_pairs_mut().append_pair("id", &id.to_string());
    Ok(url)
}
