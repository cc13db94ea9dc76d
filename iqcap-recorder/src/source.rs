use std::io::{self, Read};

use crossbeam_channel::{Receiver, Sender};

/// Размер чанка фоновой пересылки (байт).
pub const FORWARD_CHUNK: usize = 16_384;

/// Переливает байты источника в канал до EOF, ошибки чтения или ухода
/// приёмника.
///
/// Канал с ёмкостью даёт backpressure: при заполнении producer
/// блокируется, TCP-окно сужается и сервер сам притормаживает.
/// Отдельного протокола завершения нет: поток живёт, пока жива сессия,
/// и завершается сам при закрытии любой из сторон.
pub fn forward_stream(
    mut source: Box<dyn Read + Send>,
    tx: Sender<Vec<u8>>,
) -> io::Result<()> {
    let mut chunk = vec![0u8; FORWARD_CHUNK];

    loop {
        let n = match source.read(&mut chunk) {
            // EOF: источник закрыл поток
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        if tx.send(chunk[..n].to_vec()).is_err() {
            // Приёмник ушёл — сессия завершена
            return Ok(());
        }
    }
}

/// Собирает блоки фиксированного размера из чанков канала пересылки.
///
/// Порядок байт сохраняется one-to-one: текущий чанк дочитывается до
/// конца, прежде чем берётся следующий.
pub struct BlockReader {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    pos: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl BlockReader {
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            pending: Vec::new(),
            pos: 0,
        }
    }

    /// Заполняет `block` целиком.
    ///
    /// Блокируется, пока канал не отдаст достаточно байт; закрытие
    /// канала до заполнения блока — ошибка `UnexpectedEof`.
    pub fn read_block(
        &mut self,
        block: &mut [u8],
    ) -> io::Result<()> {
        let mut filled = 0;

        while filled < block.len() {
            if self.pos == self.pending.len() {
                match self.rx.recv() {
                    Ok(chunk) => {
                        self.pending = chunk;
                        self.pos = 0;
                    }
                    Err(_) => {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "sample stream closed",
                        ));
                    }
                }
            }

            let take = (block.len() - filled).min(self.pending.len() - self.pos);
            block[filled..filled + take]
                .copy_from_slice(&self.pending[self.pos..self.pos + take]);
            self.pos += take;
            filled += take;
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
