//! Async-state wrapper for values fetched from the catalog.
//!
//! RemoteData-style enum: a level's option set is NotAsked until its
//! parent is chosen, Loading while the cascade fetch is in flight, then
//! Success or Failure. Replaces separate `loading: bool` / `Option<T>`
//! fields.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource<T, E = String> {
    /// No request has been made yet.
    NotAsked,

    /// Request is in progress.
    Loading,

    /// Request succeeded with data.
    Success(T),

    /// Request failed with error.
    Failure(E),
}

impl<T, E> Resource<T, E> {
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Resource::Success(data),
            Err(e) => Resource::Failure(e),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Resource::Failure(_))
    }

    pub fn is_not_asked(&self) -> bool {
        matches!(self, Resource::NotAsked)
    }

    /// Get a reference to the data if successful.
    pub fn success(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Map the success value to a new type.
    pub fn map<U, F>(self, f: F) -> Resource<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Resource::NotAsked => Resource::NotAsked,
            Resource::Loading => Resource::Loading,
            Resource::Success(data) => Resource::Success(f(data)),
            Resource::Failure(e) => Resource::Failure(e),
        }
    }
}
