//! Users, sessions, password hashing and course enrollment.

pub mod db;
pub mod handlers;
pub mod middleware;
pub mod password;

pub use handlers::*;
pub use middleware::{
    AdminContext, AuthContext, Learner, OptionalAuth, OptionalLearner, SESSION_COOKIE_NAME,
};
