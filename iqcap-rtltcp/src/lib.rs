//! Клиент протокола rtl_tcp
//!
//! Тонкий адаптер над TCP-соединением с rtl_tcp сервером: приветственный
//! dongle-info блок, кадры команд настройки тюнера и непрерывный поток
//! сырых 8-битных IQ выборок, читаемый через [`std::io::Read`].

pub mod client;
pub mod error;
pub mod proto;

pub use client::*;
pub use error::*;
pub use proto::*;
