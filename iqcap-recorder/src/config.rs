use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use iqcap_core::ByteSize;

/// Путь, при котором выборки считаются, но не сохраняются.
pub const DISCARD_PATH: &str = "/dev/null";

/// Максимальная длительность, принимаемая [`parse_duration`]: 366 суток.
/// Большие значения переполняют арифметику дедлайна `Instant + Duration`.
const MAX_CAPTURE_SECS: f64 = 366.0 * 24.0 * 3_600.0;

/// Бюджет сессии: условия завершения и порог шумоподавления.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureBudget {
    /// Лимит записанных байт (0 = без лимита)
    pub byte_limit: ByteSize,
    /// Ограничение по времени (None = до Ctrl+C)
    pub time_limit: Option<Duration>,
    /// Squelch: блоки со средней магнитудой ниже порога
    /// отбрасываются (0 = выключено)
    pub squelch: f64,
}

/// Полная конфигурация сессии захвата.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Бюджет завершения сессии
    pub budget: CaptureBudget,
    /// Путь к выходному файлу; [`DISCARD_PATH`] — discard-сток
    pub output_path: PathBuf,
    /// IQ пар в одном блоке (байт в блоке — вдвое больше)
    pub block_samples: usize,
    /// Ёмкость канала пересылки (chunks; 1 chunk = 16384 байт)
    pub ring_capacity: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl CaptureConfig {
    /// Длина сырого блока в байтах (IQ пара = I байт + Q байт).
    pub fn block_bytes(&self) -> usize {
        self.block_samples * 2
    }

    /// `true`, если вывод направлен в discard-сток.
    pub fn is_discard(&self) -> bool {
        self.output_path == Path::new(DISCARD_PATH)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для CaptureConfig
////////////////////////////////////////////////////////////////////////////////

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            budget: CaptureBudget::default(),
            output_path: PathBuf::from(DISCARD_PATH),
            block_samples: 4_096,
            ring_capacity: 64, // 64 * 16384 ~ 1 Мб буфер пересылки
        }
    }
}

/// Парсит строку частоты в герцы.
///
/// Поддерживает суффиксы: `GHz`, `MHz`, `kHz`, `Hz` (регистронезависимо).
///
/// # Примеры
/// ```
/// use iqcap_recorder::config::parse_freq_hz;
/// assert_eq!(parse_freq_hz("100MHz").unwrap(), 100_000_000);
/// assert_eq!(parse_freq_hz("1.602GHz").unwrap(), 1_602_000_000);
/// assert_eq!(parse_freq_hz("2400000").unwrap(), 2_400_000);
/// ```
pub fn parse_freq_hz(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let lower = s.to_lowercase();

    let (num_str, mult) = if let Some(v) = lower.strip_suffix("ghz") {
        (v.trim(), 1_000_000_000_f64)
    } else if let Some(v) = lower.strip_suffix("mhz") {
        (v.trim(), 1_000_000_f64)
    } else if let Some(v) = lower.strip_suffix("khz") {
        (v.trim(), 1_000_f64)
    } else if let Some(v) = lower.strip_suffix("hz") {
        (v.trim(), 1_f64)
    } else {
        // Без суффикса — число в герцах
        return s
            .parse::<u64>()
            .map_err(|e| format!("Invalid frequency '{s}': {e}"));
    };

    let n: f64 = num_str
        .parse()
        .map_err(|e| format!("Invalid frequency value '{num_str}': {e}"))?;

    Ok((n * mult).round() as u64)
}

/// Парсит строку длительности.
///
/// Без суффикса — секунды; поддерживаются `ms`, `s`, `m`, `h`
/// (регистронезависимо). Дробные значения допустимы; длительность
/// свыше 366 суток отклоняется.
///
/// # Примеры
/// ```
/// use std::time::Duration;
/// use iqcap_recorder::config::parse_duration;
/// assert_eq!(parse_duration("90").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let lower = s.to_lowercase();

    // "ms" проверяется раньше "s" и "m"
    let (num_str, unit_secs) = if let Some(v) = lower.strip_suffix("ms") {
        (v.trim(), 1e-3)
    } else if let Some(v) = lower.strip_suffix('h') {
        (v.trim(), 3_600.0)
    } else if let Some(v) = lower.strip_suffix('m') {
        (v.trim(), 60.0)
    } else if let Some(v) = lower.strip_suffix('s') {
        (v.trim(), 1.0)
    } else {
        (lower.as_str(), 1.0)
    };

    let n: f64 = num_str
        .parse()
        .map_err(|e| format!("Invalid duration '{s}': {e}"))?;

    if !n.is_finite() || n < 0.0 {
        return Err(format!("Invalid duration '{s}': must be non-negative"));
    }

    let secs = n * unit_secs;
    if secs > MAX_CAPTURE_SECS {
        return Err(format!("Invalid duration '{s}': longer than 366 days"));
    }

    Ok(Duration::from_secs_f64(secs))
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_freq_hz() {
        assert_eq!(parse_freq_hz("100MHz").unwrap(), 100_000_000);
        assert_eq!(parse_freq_hz("1.602GHz").unwrap(), 1_602_000_000);
        assert_eq!(parse_freq_hz("868300kHz").unwrap(), 868_300_000);
        assert_eq!(parse_freq_hz("2400000Hz").unwrap(), 2_400_000);
        assert_eq!(parse_freq_hz("2400000").unwrap(), 2_400_000);
        assert!(parse_freq_hz("abc").is_err());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("90").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5_400));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_oversized_values() {
        // Значения, переполняющие Duration::from_secs_f64 либо
        // сложение Instant + Duration при взводе дедлайна
        assert!(parse_duration("2e19").is_err());
        assert!(parse_duration("1e19").is_err());
        assert!(parse_duration("9000000000h").is_err());
        assert!(parse_duration("1e308").is_err());

        // Ровно 366 суток — верхняя допустимая граница
        assert_eq!(
            parse_duration("8784h").unwrap(),
            Duration::from_secs(31_622_400)
        );
    }

    #[test]
    fn test_block_bytes_is_twice_samples() {
        let config = CaptureConfig {
            block_samples: 4_096,
            ..CaptureConfig::default()
        };

        assert_eq!(config.block_bytes(), 8_192);
    }

    #[test]
    fn test_discard_path_detection() {
        let config = CaptureConfig::default();
        assert!(config.is_discard(), "по умолчанию вывода в файл нет");

        let config = CaptureConfig {
            output_path: PathBuf::from("capture.iq"),
            ..CaptureConfig::default()
        };
        assert!(!config.is_discard());
    }
}
