//! Cardbuff - card catalog harvester and price-rank query bot
//!
//! Two cooperating processes over one SQLite store: a sequential crawler
//! that harvests card pages (name, art, user comments) from mangabuff.ru,
//! and a Telegram bot that answers "what is card N worth" by frequency-voting
//! price tokens found in the stored comments.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;
