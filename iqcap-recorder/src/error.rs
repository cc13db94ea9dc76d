use thiserror::Error;

pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Ошибка клиента rtl_tcp (подключение, настройка тюнера)
    #[error("rtl_tcp client error: {0}")]
    Client(#[from] iqcap_rtltcp::ClientError),

    /// Не удалось создать выходной файл
    #[error("Error creating output file: {0}")]
    SinkCreate(std::io::Error),

    /// Поток выборок оборвался или чтение блока не удалось
    #[error("Error reading sample block: {0}")]
    SourceRead(std::io::Error),

    /// Запись блока в сток не удалась
    #[error("Error writing sample block: {0}")]
    SinkWrite(std::io::Error),
}
