use thiserror::Error;

/// Результат для операций ядра
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Типы ошибок ядра.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Число в размере не разобрано
    #[error("Invalid size '{0}'")]
    InvalidSize(String),

    /// Неизвестный суффикс размера
    #[error("Invalid size suffix '{0}' (use k, M, G, T, P, E, Z, Y)")]
    InvalidSuffix(String),
}
