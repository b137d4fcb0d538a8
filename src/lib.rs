//! persondesk: a terminal form for capturing and managing personal details
//! records stored behind the `/api/PersonalDetails` REST resource.

pub mod api;
pub mod app;
pub mod config;
pub mod form;
pub mod theme;
pub mod ui;
