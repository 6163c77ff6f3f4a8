//! Request actor resolution
//!
//! Amber sits behind a fronting proxy that authenticates users and
//! forwards the resolved identity in the `x-user-id` header. The
//! gateway itself never handles credentials; a request without the
//! header is simply anonymous.
//!
//! Every handler resolves the actor once and passes it down explicitly.
//! Nothing below the HTTP boundary reaches for ambient identity.

use std::fmt;

use hyper::header::HeaderMap;

use crate::types::{AmberError, Result};

/// Header carrying the authenticated user id, set by the fronting proxy
pub const USER_ID_HEADER: &str = "x-user-id";

/// The identity a request acts as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// No authenticated identity
    Anonymous,
    /// An authenticated user, by opaque user id
    User(String),
}

impl Actor {
    /// Resolve the actor from request headers.
    ///
    /// A missing, empty, or non-UTF-8 header yields `Anonymous`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok()) {
            Some(raw) => {
                let id = raw.trim();
                if id.is_empty() {
                    Actor::Anonymous
                } else {
                    Actor::User(id.to_string())
                }
            }
            None => Actor::Anonymous,
        }
    }

    /// The user id, if authenticated
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Actor::User(id) => Some(id),
            Actor::Anonymous => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Actor::Anonymous)
    }

    /// The user id, or `PermissionDenied` for anonymous actors
    pub fn require_user(&self) -> Result<&str> {
        self.user_id().ok_or_else(|| {
            AmberError::PermissionDenied("authentication required".to_string())
        })
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Anonymous => write!(f, "anonymous"),
            Actor::User(id) => write!(f, "{}", id),
        }
    }
}
