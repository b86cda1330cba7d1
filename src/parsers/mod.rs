//! Transcript parsers.
//!
//! - [`WhatsAppParser`] - WhatsApp `.txt` exports (iOS and Android)

mod whatsapp;

pub use whatsapp::WhatsAppParser;
