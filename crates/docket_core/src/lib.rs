pub mod db;
pub mod demo;
pub mod domain;
pub mod error;
pub mod repo;
pub mod report;
pub mod validate;
