//! Вычислительное ядро iqcap
//!
//! Чистые компоненты конвейера захвата: таблица магнитуд для 8-битных
//! IQ выборок, поблочная статистика и парсер человекочитаемых размеров.
//! Ввод/вывод и оркестрация живут в `iqcap-recorder`.

pub mod bytesize;
pub mod error;
pub mod mag;
pub mod stats;

pub use bytesize::*;
pub use error::*;
pub use mag::*;
pub use stats::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
