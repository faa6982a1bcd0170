//! Salesforce API client and authentication.
//!
//! This module provides the [`SalesforceClient`] for the REST API, the OAuth
//! password grant ([`PasswordGrant`]) and the HTTP [`Transport`] seam.

mod auth;
mod salesforce;
pub mod transport;

pub use auth::{AccessToken, PasswordGrant};
pub use salesforce::{
    HISTORY_SUFFIX, NON_HISTORY_ENTITIES, SalesforceClient, filter_candidates,
    is_history_candidate,
};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
