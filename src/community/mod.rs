//! # Community Module
//!
//! Channel-based chat: categories group channels, each channel owns an
//! independent message list under its own store key.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       COMMUNITY MODULE                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────────────────────────┐     │
//! │  │ Categories  │  │  Channels   │  │         Messaging            │     │
//! │  │             │  │             │  │                              │     │
//! │  │ - Seeded    │  │ - Create    │  │ - Seed example messages      │     │
//! │  │ - Create    │  │ - Delete    │  │ - Send (announcement gate,   │     │
//! │  │ - Rename    │  │ - Slug ids  │  │   image allowlist)           │     │
//! │  │             │  │ - Announce  │  │ - Delete one (admin)         │     │
//! │  │             │  │   flag      │  │ - Rebuild-all by key scan    │     │
//! │  └──────┬──────┘  └──────┬──────┘  └──────────────┬───────────────┘     │
//! │         │                │                        │                     │
//! │         ▼                ▼                        ▼                     │
//! │   `categories`     `categories`          `messages_{channelId}`         │
//! │    (one list)     (nested lists)           (one key per channel)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting a channel removes its message key; nothing else references it,
//! so cross-channel views (the moderation listing) are rebuilt by scanning
//! every `messages_` key rather than following references.

mod categories;
mod channels;
mod messaging;
mod service;

pub use categories::Category;
pub use channels::{slugify, Channel};
pub use messaging::{ChannelMessage, Message, MessageAuthor};
pub use service::CommunityService;
