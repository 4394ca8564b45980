// Copyright 2025 The MakerRepo Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations, missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use async_trait::async_trait;
pub use makerrepo_base::{
    DynSessionStore, FileStore, LinkedRfid, MemoryStore, Role, Session, SessionStore,
    SessionStoreExt, StoreError, UserProfile,
};
pub use reqwest;

pub mod account;
mod authentication;
mod client;
pub mod config;
mod deduplicating_handler;
mod error;
mod http_client;
pub mod printers;
pub mod rfid;
pub mod shifts;
pub mod staff_dashboard;
pub mod training;

pub use account::Account;
pub use authentication::{AuthState, HomeView, Navigation, Route, RouteGuard, WhoamiResponse};
pub use client::{Client, ClientBuilder};
pub use error::{ClientBuildError, Error, HttpError, HttpResult, Result};
pub use printers::Printers;
pub use rfid::{NfcReader, RfidTapHandler, TapOutcome, TapStatus};
pub use shifts::Shifts;
pub use staff_dashboard::StaffDashboard;
pub use training::TrainingSessions;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

#[cfg(test)]
makerrepo_test::init_tracing_for_tests!();
