//! Пример: магнитуды и статистика синтетического IQ блока
//!
//! Демонстрирует:
//! - построение таблицы магнитуд
//! - преобразование блока сырых 8-битных IQ байт
//! - поблочное среднее и окно min/max

use iqcap_core::{mean, MagLut, RunningExtrema};

fn main() {
    let lut = MagLut::new();

    // --- Синтетический сигнал: комплексная синусоида вокруг DC-смещения ---
    let block_samples = 4_096;
    let mut raw = Vec::with_capacity(block_samples * 2);

    for k in 0..block_samples {
        let phase = 2.0 * std::f64::consts::PI * k as f64 / 64.0;
        let i_val = (127.4 + 100.0 * phase.cos()).round() as u8;
        let q_val = (127.4 + 100.0 * phase.sin()).round() as u8;
        raw.push(i_val);
        raw.push(q_val);
    }

    // --- Преобразование и статистика ---
    let mut magnitudes = vec![0.0; block_samples];
    lut.apply(&raw, &mut magnitudes);

    let block_mean = mean(&magnitudes);

    let mut extrema = RunningExtrema::new();
    for chunk in magnitudes.chunks(256) {
        extrema.observe(mean(chunk));
    }

    println!("✓ Обработано : {block_samples} IQ пар");
    println!("  Среднее    : {block_mean:.3}");
    println!(
        "  Окно       : min {:.3} / max {:.3}",
        extrema.min, extrema.max
    );
}
