/// Размер таблицы магнитуд: по записи на каждое значение байта.
pub const MAG_LUT_SIZE: usize = 256;

/// Характерное DC-смещение 8-битных выборок rtl-sdr.
pub const DC_OFFSET: f64 = 127.4;

/// Максимальное отклонение от смещения (255 − DC_OFFSET); нормирует
/// записи таблицы в [0, 1].
pub const FULL_SCALE: f64 = 127.6;

/// Таблица квадратов нормированных отклонений для байтов 0..=255.
///
/// Запись `i` равна `((127.4 − i) / 127.6)²`. Строится один раз при
/// старте и дальше только читается, поэтому свободно используется всеми
/// вызовами преобразования без синхронизации.
pub struct MagLut {
    table: [f64; MAG_LUT_SIZE],
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl MagLut {
    /// Строит таблицу. Входов и ошибок нет: домен — все значения байта.
    pub fn new() -> Self {
        let mut table = [0.0; MAG_LUT_SIZE];

        for (i, entry) in table.iter_mut().enumerate() {
            let dev = (DC_OFFSET - i as f64) / FULL_SCALE;
            *entry = dev * dev;
        }

        Self { table }
    }

    /// Запись таблицы для одного байта.
    #[inline]
    pub fn level(&self, byte: u8) -> f64 {
        self.table[byte as usize]
    }

    /// Преобразует блок сырых IQ байт в магнитуды.
    ///
    /// `raw` — чередующиеся пары (I, Q); `out` получает по одному
    /// значению на пару: `out[k] = sqrt(lut[raw[2k]] + lut[raw[2k+1]])`.
    /// Длины буферов согласует конструктор конвейера: `raw.len()` чётна
    /// и равна `2 * out.len()`.
    pub fn apply(
        &self,
        raw: &[u8],
        out: &mut [f64],
    ) {
        for (mag, pair) in out.iter_mut().zip(raw.chunks_exact(2)) {
            *mag = (self.level(pair[0]) + self.level(pair[1])).sqrt();
        }
    }
}

impl Default for MagLut {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
