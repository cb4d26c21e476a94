use thiserror::Error;

pub mod catalog;
pub mod import;
pub mod player;
pub mod skill_value;
pub mod snapshot;
pub mod version;
pub mod yearly;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub i64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkillId(pub i64);

pub type Year = i32;

#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct PaginatedResponse<T> {
    pub total_count: usize,
    pub items: Vec<T>,
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("storage error: {0}")]
    StorageError(String),
}

#[derive(Debug, Error)]
pub enum RepoRetrieveError {
    #[error("resource not found")]
    NotFound,
    #[error("storage error: {0}")]
    StorageError(String),
}

#[derive(Debug, Error)]
pub enum RepoUpdateError {
    #[error("resource not found")]
    NotFound,
    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<RepoError> for RepoRetrieveError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::StorageError(e) => RepoRetrieveError::StorageError(e),
        }
    }
}

impl From<RepoError> for RepoUpdateError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::StorageError(e) => RepoUpdateError::StorageError(e),
        }
    }
}

/// Lenient integer parsing shared by the CSV importer and the JSON boundary.
/// Surrounding whitespace is ignored and integral decimals such as `80.0`
/// are accepted. Blank cells are absent values, not zero.
pub fn parse_loose_int(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<i32>() {
        return Some(v);
    }
    let float = trimmed.parse::<f64>().ok()?;
    if float.is_finite() && float.fract() == 0.0 && float.abs() <= i32::MAX as f64 {
        Some(float as i32)
    } else {
        None
    }
}
