//! # Progeny Telegram Bot
//!
//! A Telegram bot that walks a couple through uploading two parent photos
//! and choosing child count, gender split and per-child ages, then asks an
//! external image-generation service for a photo of their future children.

pub mod bot;
pub mod config;
pub mod dialogue;
pub mod gateway;
pub mod health;
pub mod session;
