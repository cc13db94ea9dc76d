use std::{path::PathBuf, sync::atomic::Ordering, time::Instant};

use clap::Parser;
use iqcap_core::ByteSize;
use iqcap_recorder::{
    parse_duration, parse_freq_hz, CaptureBudget, CaptureConfig, CapturePipeline, DISCARD_PATH,
};
use iqcap_rtltcp::{ClientResult, SdrClient};
use log::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "iqcap-recorder",
    version = env!("CARGO_PKG_VERSION"),
    about = "Capture raw IQ samples from an rtl_tcp server",
    long_about = None,
)]
struct Cli {
    /// Адрес rtl_tcp сервера (host:port)
    #[arg(short, long, default_value = "127.0.0.1:1234")]
    server: String,
    /// Несущая частота (100MHz, 1.602GHz, 100000000)
    #[arg(short = 'f', long, default_value = "100MHz")]
    freq: String,
    /// Частота дискретизации (2.4MHz, 2400000)
    #[arg(short = 'r', long, default_value = "2.4MHz")]
    rate: String,
    /// Усиление тюнера, дБ. Без флага — аппаратный автовыбор
    #[arg(short, long)]
    gain: Option<f32>,
    /// Коррекция частоты, ppm
    #[arg(long, default_value = "0")]
    ppm: i32,
    /// Включить AGC чипа RTL2832
    #[arg(long)]
    agc: bool,
    /// Лимит записи в байтах; суффиксы k/M/G/T — степени 1024
    /// (0 = без лимита)
    #[arg(short, long, default_value = "0")]
    bytes: String,
    /// Лимит записи по времени (90, 90s, 5m, 1.5h; 0 = до Ctrl+C)
    #[arg(short, long, default_value = "0")]
    duration: String,
    /// Squelch: минимальная средняя магнитуда блока (0 = выключен)
    #[arg(long, default_value = "0")]
    squelch: f64,
    /// Путь к выходному файлу; /dev/null — считать, но не сохранять
    #[arg(short, long, default_value = DISCARD_PATH)]
    output: PathBuf,
    /// IQ пар в одном блоке
    #[arg(long, default_value = "4096")]
    blocksize: usize,
    /// Ёмкость канала пересылки (кол-во chunk-слотов, 1 chunk = 16 KB)
    #[arg(long, default_value = "64")]
    ring_capacity: usize,
    /// Тихий режим (только ошибки)
    #[arg(short, long)]
    quiet: bool,
}

/// Применяет настройки тюнера в порядке, ожидаемом rtl_tcp.
fn apply_tuning(
    client: &mut SdrClient,
    center_freq_hz: u32,
    sample_rate_hz: u32,
    gain_db: Option<f32>,
    ppm: i32,
    agc: bool,
) -> ClientResult<()> {
    // Частота дискретизации первой, затем несущая
    client.set_sample_rate(sample_rate_hz)?;
    client.set_center_freq(center_freq_hz)?;

    match gain_db {
        Some(db) => {
            client.set_tuner_gain_mode(true)?;
            client.set_tuner_gain((db * 10.0).round() as i32 as u32)?;
        }
        None => client.set_tuner_gain_mode(false)?,
    }

    if ppm != 0 {
        client.set_freq_correction(ppm)?;
    }

    if agc {
        client.set_agc_mode(true)?;
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet { "error" } else { "info" };

    env_logger::Builder::new()
        .filter_level(level.parse().unwrap())
        .format_target(false)
        .format_timestamp_micros()
        .init();

    let byte_limit: ByteSize = match cli.bytes.parse() {
        Ok(b) => b,
        Err(e) => {
            error!("--bytes: {e}");
            std::process::exit(1);
        }
    };

    let time_limit = match parse_duration(&cli.duration) {
        Ok(d) if d.is_zero() => None,
        Ok(d) => Some(d),
        Err(e) => {
            error!("--duration: {e}");
            std::process::exit(1);
        }
    };

    let center_freq_hz = match parse_freq_hz(&cli.freq) {
        Ok(f) if f <= u32::MAX as u64 => f as u32,
        Ok(f) => {
            error!("--freq {f} Hz exceeds u32::MAX (rtl_tcp parameter width)");
            std::process::exit(1);
        }
        Err(e) => {
            error!("--freq: {e}");
            std::process::exit(1);
        }
    };

    let sample_rate_hz = match parse_freq_hz(&cli.rate) {
        Ok(r) if r <= u32::MAX as u64 => r as u32,
        Ok(r) => {
            error!("--rate {r} Hz exceeds u32::MAX");
            std::process::exit(1);
        }
        Err(e) => {
            error!("--rate: {e}");
            std::process::exit(1);
        }
    };

    if cli.blocksize == 0 {
        error!("--blocksize must be at least 1 IQ pair");
        std::process::exit(1);
    }

    if cli.ring_capacity == 0 {
        error!("--ring-capacity must be at least 1 chunk");
        std::process::exit(1);
    }

    let config = CaptureConfig {
        budget: CaptureBudget {
            byte_limit,
            time_limit,
            squelch: cli.squelch,
        },
        output_path: cli.output.clone(),
        block_samples: cli.blocksize,
        ring_capacity: cli.ring_capacity,
    };

    // Подключаемся и настраиваем приёмник до старта конвейера
    let mut client = match SdrClient::connect(&cli.server) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to connect to rtl_tcp server: {e}");
            std::process::exit(1);
        }
    };

    let dongle = client.info();

    if let Err(e) = apply_tuning(
        &mut client,
        center_freq_hz,
        sample_rate_hz,
        cli.gain,
        cli.ppm,
        cli.agc,
    ) {
        error!("Failed to configure tuner: {e}");
        std::process::exit(1);
    }

    let (pipeline, metrics) = CapturePipeline::new(config);
    let stop_ctrlc = pipeline.stop_flag();

    if let Err(e) = ctrlc::set_handler(move || {
        if stop_ctrlc.swap(true, Ordering::SeqCst) {
            // Второй Ctrl+C — принудительный выход
            warn!("Force exit");
            std::process::exit(130);
        }
        warn!("Ctrl+C received — finishing current block and finalizing...");
    }) {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    // Выводим конфигурацию
    let data_rate_mbs = sample_rate_hz as f64 * 2.0 / 1_000_000.0;

    let byte_limit_str = if byte_limit.is_unlimited() {
        "none".to_string()
    } else {
        format!("{} B", byte_limit.bytes())
    };

    let time_limit_str = match time_limit {
        Some(d) => format!("{d:?}"),
        None => "until Ctrl+C".to_string(),
    };

    let squelch_str = if cli.squelch != 0.0 {
        format!("{:.3}", cli.squelch)
    } else {
        "off".to_string()
    };

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Server        : {}", cli.server);
    info!(
        "  Tuner         : {} ({} gain steps)",
        dongle.tuner, dongle.gain_count
    );
    info!("  Center freq   : {:.3} MHz", center_freq_hz as f64 / 1e6);
    info!("  Sample rate   : {:.3} Msps", sample_rate_hz as f64 / 1e6);
    info!("  Data rate     : {:.1} MB/s", data_rate_mbs);
    info!(
        "  Block         : {} IQ pairs ({} B)",
        cli.blocksize,
        cli.blocksize * 2
    );
    info!("  Byte limit    : {byte_limit_str}");
    info!("  Time limit    : {time_limit_str}");
    info!("  Squelch       : {squelch_str}");
    info!("  Output        : {:?}", cli.output);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let session_start = Instant::now();

    match pipeline.run(Box::new(client)) {
        Ok(()) => {}
        Err(e) => {
            error!("Capture failed: {e}");
            std::process::exit(1);
        }
    }

    // --- Итоговая статистика ---
    let summary = metrics.summary(&session_start);
    info!("\n{summary}");

    if metrics.blocks_squelched.load(Ordering::Relaxed) > 0 {
        warn!(
            "⚠ {} blocks below squelch threshold ({:.2}% of stream)",
            metrics.blocks_squelched.load(Ordering::Relaxed),
            summary.squelch_rate_pct
        );
    }

    info!("✓ Capture complete: {:?}", cli.output);
}
