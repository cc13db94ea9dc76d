use thiserror::Error;

/// Результат для операций клиента rtl_tcp
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Типы ошибок клиента rtl_tcp.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Не удалось подключиться к серверу
    #[error("Connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// Сервер прислал не rtl_tcp приветствие
    #[error("Invalid dongle magic {0:02X?} (expected \"RTL0\")")]
    InvalidMagic([u8; 4]),

    /// Ошибка ввода/вывода на соединении
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
