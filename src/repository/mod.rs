//! User datastore boundary.
//!
//! The library never owns user storage. It needs one capability from the
//! application: "find the first record of type `T` whose login field equals
//! a value". Implement [`UserRepository`] over your database to provide it.
//!
//! # Types
//!
//! | Item | Description |
//! |------|-------------|
//! | [`AuthRecord`] | A record with a salt, a hash and login fields |
//! | [`User`] | Bundled record type |
//! | [`LookupField`] | Which field a login identifier is matched against |
//! | [`UserRepository`] | The lookup capability |
//!
//! Enable the `mocks` feature for [`MockUserRepository`], an in-memory
//! implementation useful for testing.

mod user;
#[cfg(any(test, feature = "mocks"))]
mod user_mock;

pub use user::{AuthRecord, LookupField, User, UserRepository};
#[cfg(any(test, feature = "mocks"))]
pub use user_mock::MockUserRepository;
