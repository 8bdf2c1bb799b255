//! Pressroom - Articles API with real-time mutation broadcast.
//!
//! This crate provides an HTTP service exposing a single mutable resource
//! collection (articles), gated by token authentication and role-based
//! authorization, with every successful mutation broadcast in real time to
//! connected subscribers.
//!
//! # Architecture
//!
//! A request flows through a fixed pipeline: authentication gate →
//! authorization policy (which consults the identity store for
//! administrator-only operations) → article store → event broadcast. The
//! first failing stage short-circuits the rest; only successful mutations
//! broadcast, and always before the response is produced.

pub mod auth;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod store;
pub mod token;
pub mod types;
