use std::{fmt, str::FromStr};

use crate::CoreError;

/// Лимит в байтах (знаковое 64-битное значение).
///
/// `0` означает «без лимита». Значение неизменяемо после парсинга и
/// используется только как порог завершения сессии.
///
/// # Примеры
/// ```
/// use iqcap_core::ByteSize;
/// assert_eq!("8192".parse::<ByteSize>().unwrap(), ByteSize(8192));
/// assert_eq!("1.5k".parse::<ByteSize>().unwrap(), ByteSize(1536));
/// assert_eq!("2M".parse::<ByteSize>().unwrap(), ByteSize(2 << 20));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(pub i64);

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ByteSize {
    /// Значение в байтах.
    pub fn bytes(&self) -> i64 {
        self.0
    }

    /// `true`, если лимит не задан.
    pub fn is_unlimited(&self) -> bool {
        self.0 == 0
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для ByteSize
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for ByteSize {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ByteSize {
    type Err = CoreError;

    /// Парсит голое число или число с бинарным суффиксом.
    ///
    /// Суффиксы (регистронезависимо): `k`=2^10, `M`=2^20, `G`=2^30,
    /// `T`=2^40, `P`=2^50, `E`=2^60, `Z`=2^70, `Y`=2^80. Дробная
    /// мантисса допустима («1.5k» → 1536); значения за пределами
    /// i64 насыщаются.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();

        // Голое число, включая дроби и экспоненты: "8192", "1.5", "2e6"
        if let Ok(v) = t.parse::<f64>() {
            return Ok(ByteSize(v as i64));
        }

        let suffix = t
            .chars()
            .last()
            .ok_or_else(|| CoreError::InvalidSize(s.to_string()))?;
        let num_str = &t[..t.len() - suffix.len_utf8()];

        let shift: i32 = match suffix.to_ascii_lowercase() {
            'k' => 10,
            'm' => 20,
            'g' => 30,
            't' => 40,
            'p' => 50,
            'e' => 60,
            'z' => 70,
            'y' => 80,
            _ => return Err(CoreError::InvalidSuffix(suffix.to_string())),
        };

        let mantissa: f64 = num_str
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidSize(s.to_string()))?;

        // Каст f64 → i64 насыщается на границах диапазона (важно для z/y)
        Ok(ByteSize((mantissa * (shift as f64).exp2()) as i64))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
