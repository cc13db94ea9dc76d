use std::{
    io::{Read, Write},
    net::TcpStream,
};

use crate::{
    proto::{Command, DongleInfo, DONGLE_INFO_SIZE},
    ClientError, ClientResult,
};

/// Клиент rtl_tcp: подключение, настройка тюнера и поток IQ байт.
///
/// Сразу после подключения сервер отдаёт dongle-info и начинает слать
/// сырые IQ байты; [`SdrClient`] реализует [`std::io::Read`] поверх
/// этого потока. Команды настройки можно отправлять в любой момент,
/// конвейер захвата применяет их один раз до первого чтения.
#[derive(Debug)]
pub struct SdrClient {
    stream: TcpStream,
    info: DongleInfo,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SdrClient {
    /// Подключается к серверу и читает приветственный dongle-info блок.
    pub fn connect(addr: &str) -> ClientResult<Self> {
        let mut stream = TcpStream::connect(addr).map_err(|e| ClientError::Connect {
            addr: addr.to_string(),
            source: e,
        })?;

        // Кадры команд по 5 байт — без Нейгла
        stream.set_nodelay(true)?;

        let mut buf = [0u8; DONGLE_INFO_SIZE];
        stream.read_exact(&mut buf)?;

        let info = DongleInfo::deserialize(&buf)?;

        Ok(Self { stream, info })
    }

    /// Информация о подключённом приёмнике.
    pub fn info(&self) -> DongleInfo {
        self.info
    }

    /// Несущая частота (Гц).
    pub fn set_center_freq(
        &mut self,
        hz: u32,
    ) -> ClientResult<()> {
        self.send(Command::CenterFreq, hz)
    }

    /// Частота дискретизации (Гц).
    pub fn set_sample_rate(
        &mut self,
        hz: u32,
    ) -> ClientResult<()> {
        self.send(Command::SampleRate, hz)
    }

    /// Режим усиления тюнера: ручной (`true`) или авто.
    pub fn set_tuner_gain_mode(
        &mut self,
        manual: bool,
    ) -> ClientResult<()> {
        self.send(Command::TunerGainMode, manual as u32)
    }

    /// Усиление тюнера в десятых долях дБ (402 = 40.2 дБ).
    pub fn set_tuner_gain(
        &mut self,
        tenths_db: u32,
    ) -> ClientResult<()> {
        self.send(Command::TunerGain, tenths_db)
    }

    /// Коррекция частоты (ppm); отрицательные значения уходят
    /// дополнительным кодом.
    pub fn set_freq_correction(
        &mut self,
        ppm: i32,
    ) -> ClientResult<()> {
        self.send(Command::FreqCorrection, ppm as u32)
    }

    /// Усиление IF-ступени: номер ступени в старших 16 битах.
    pub fn set_tuner_if_gain(
        &mut self,
        stage: u16,
        tenths_db: i16,
    ) -> ClientResult<()> {
        let param = ((stage as u32) << 16) | (tenths_db as u16 as u32);

        self.send(Command::TunerIfGain, param)
    }

    /// Тестовый режим: сервер шлёт счётчик вместо выборок.
    pub fn set_test_mode(
        &mut self,
        on: bool,
    ) -> ClientResult<()> {
        self.send(Command::TestMode, on as u32)
    }

    /// Аппаратный AGC чипа RTL2832.
    pub fn set_agc_mode(
        &mut self,
        on: bool,
    ) -> ClientResult<()> {
        self.send(Command::AgcMode, on as u32)
    }

    /// Прямая оцифровка с ветки I (1) или Q (2); 0 — выключена.
    pub fn set_direct_sampling(
        &mut self,
        mode: u32,
    ) -> ClientResult<()> {
        self.send(Command::DirectSampling, mode)
    }

    /// Offset tuning (актуально для E4000).
    pub fn set_offset_tuning(
        &mut self,
        on: bool,
    ) -> ClientResult<()> {
        self.send(Command::OffsetTuning, on as u32)
    }

    /// Частота опорного кварца RTL2832 (Гц).
    pub fn set_rtl_xtal_freq(
        &mut self,
        hz: u32,
    ) -> ClientResult<()> {
        self.send(Command::RtlXtalFreq, hz)
    }

    /// Частота кварца тюнера (Гц).
    pub fn set_tuner_xtal_freq(
        &mut self,
        hz: u32,
    ) -> ClientResult<()> {
        self.send(Command::TunerXtalFreq, hz)
    }

    /// Усиление тюнера по индексу ступени (0..gain_count).
    pub fn set_tuner_gain_by_index(
        &mut self,
        index: u32,
    ) -> ClientResult<()> {
        self.send(Command::TunerGainByIndex, index)
    }

    fn send(
        &mut self,
        cmd: Command,
        param: u32,
    ) -> ClientResult<()> {
        self.stream.write_all(&cmd.encode(param))?;

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SdrClient
////////////////////////////////////////////////////////////////////////////////

impl Read for SdrClient {
    /// Читает очередную порцию сырых IQ байт потока сервера.
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> std::io::Result<usize> {
        self.stream.read(buf)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
