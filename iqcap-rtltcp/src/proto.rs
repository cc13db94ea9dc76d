use byteorder::{BigEndian, ByteOrder};

use crate::{ClientError, ClientResult};

/// Магическая сигнатура dongle-info блока.
pub const DONGLE_MAGIC: [u8; 4] = *b"RTL0";

/// Размер dongle-info блока (байты).
pub const DONGLE_INFO_SIZE: usize = 12;

/// Размер кадра команды: код + аргумент.
pub const COMMAND_FRAME_SIZE: usize = 5;

/// Команда настройки rtl_tcp.
///
/// Формат кадра (big-endian):
/// ```text
/// [0]    CODE   u8  — код команды
/// [1..5] PARAM  u32 — аргумент команды
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    CenterFreq = 0x01,
    SampleRate = 0x02,
    TunerGainMode = 0x03,
    TunerGain = 0x04,
    FreqCorrection = 0x05,
    TunerIfGain = 0x06,
    TestMode = 0x07,
    AgcMode = 0x08,
    DirectSampling = 0x09,
    OffsetTuning = 0x0A,
    RtlXtalFreq = 0x0B,
    TunerXtalFreq = 0x0C,
    TunerGainByIndex = 0x0D,
}

/// Тип тюнера, сообщаемый сервером в dongle-info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunerType {
    Unknown,
    E4000,
    Fc0012,
    Fc0013,
    Fc2580,
    R820T,
    R828D,
}

/// 12-байтовый приветственный блок сервера rtl_tcp.
///
/// Формат (big-endian):
/// ```text
/// [0..4]  MAGIC       [u8;4] — сигнатура "RTL0"
/// [4..8]  TUNER_TYPE  u32    — тип тюнера
/// [8..12] GAIN_COUNT  u32    — число ступеней усиления тюнера
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DongleInfo {
    pub tuner: TunerType,
    pub gain_count: u32,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Command {
    /// Кодирует кадр команды.
    pub fn encode(
        self,
        param: u32,
    ) -> [u8; COMMAND_FRAME_SIZE] {
        let mut frame = [0u8; COMMAND_FRAME_SIZE];

        frame[0] = self as u8;
        BigEndian::write_u32(&mut frame[1..], param);

        frame
    }
}

impl TunerType {
    pub fn from_u32(v: u32) -> Self {
        match v {
            1 => TunerType::E4000,
            2 => TunerType::Fc0012,
            3 => TunerType::Fc0013,
            4 => TunerType::Fc2580,
            5 => TunerType::R820T,
            6 => TunerType::R828D,
            _ => TunerType::Unknown,
        }
    }
}

impl DongleInfo {
    /// Десериализует dongle-info, проверяя сигнатуру.
    pub fn deserialize(buf: &[u8; DONGLE_INFO_SIZE]) -> ClientResult<Self> {
        if buf[0..4] != DONGLE_MAGIC {
            return Err(ClientError::InvalidMagic([buf[0], buf[1], buf[2], buf[3]]));
        }

        Ok(Self {
            tuner: TunerType::from_u32(BigEndian::read_u32(&buf[4..8])),
            gain_count: BigEndian::read_u32(&buf[8..12]),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для TunerType
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for TunerType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let name = match self {
            TunerType::Unknown => "unknown",
            TunerType::E4000 => "E4000",
            TunerType::Fc0012 => "FC0012",
            TunerType::Fc0013 => "FC0013",
            TunerType::Fc2580 => "FC2580",
            TunerType::R820T => "R820T",
            TunerType::R828D => "R828D",
        };

        write!(f, "{name}")
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
