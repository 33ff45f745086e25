#![allow(dead_code)]

pub mod factories;
pub mod fake_catalog;

pub use factories::CardFactory;
pub use fake_catalog::FakeCatalog;
