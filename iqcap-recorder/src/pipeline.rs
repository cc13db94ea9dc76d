use std::{
    fs::File,
    io::{self, Read, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use iqcap_core::{mean, MagLut, RunningExtrema};
use log::{info, warn};

use crate::{
    metrics::CaptureMetrics,
    source::{forward_stream, BlockReader},
    CaptureConfig, CaptureError, CaptureResult,
};

/// Интервал окна статистики Min/Max.
const STATS_TICK: Duration = Duration::from_secs(1);

/// Оркестрирует сессию захвата.
pub struct CapturePipeline {
    config: CaptureConfig,
    metrics: Arc<CaptureMetrics>,
    stop_flag: Arc<AtomicBool>,
}

impl CapturePipeline {
    /// Создаёт пайплайн. Возвращает также shared-ссылку на метрики.
    pub fn new(config: CaptureConfig) -> (Self, Arc<CaptureMetrics>) {
        let metrics = CaptureMetrics::new();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let p = Self {
            config,
            metrics: metrics.clone(),
            stop_flag,
        };

        (p, metrics)
    }

    /// Флаг остановки. Установить в `true` для graceful shutdown.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Запускает захват. Блокируется до завершения сессии.
    pub fn run(
        self,
        source: Box<dyn Read + Send>,
    ) -> CaptureResult<()> {
        let cfg = &self.config;

        info!(
            "Starting capture: block={} IQ pairs ({} bytes), ring={} chunks",
            cfg.block_samples,
            cfg.block_bytes(),
            cfg.ring_capacity
        );

        info!(
            "Output: {:?}, byte limit: {}, time limit: {:?}, squelch: {}",
            cfg.output_path, cfg.budget.byte_limit, cfg.budget.time_limit, cfg.budget.squelch
        );

        let sink = open_sink(cfg)?;
        let (tx, rx) = crossbeam_channel::bounded::<Vec<u8>>(cfg.ring_capacity);

        // Фоновая пересылка. Поток не join-ится: уход приёмника
        // (drop BlockReader при выходе из capture_loop) закрывает
        // канал, и пересылка завершается сама
        std::thread::spawn(move || {
            if let Err(e) = forward_stream(source, tx) {
                warn!("Sample stream error: {e}");
            }
        });

        self.capture_loop(BlockReader::new(rx), sink)
    }

    fn capture_loop(
        &self,
        mut reader: BlockReader,
        mut sink: Box<dyn Write>,
    ) -> CaptureResult<()> {
        let cfg = &self.config;
        let budget = cfg.budget;
        let metrics = &self.metrics;

        let lut = MagLut::new();
        let mut raw = vec![0u8; cfg.block_bytes()];
        let mut magnitudes = vec![0f64; cfg.block_samples];
        let mut extrema = RunningExtrema::new();
        let mut progress: i64 = 0;

        // Дедлайн за пределами Instant недостижим: лимит не взводится
        let deadline = budget.time_limit.and_then(|d| Instant::now().checked_add(d));
        let mut last_tick = Instant::now();

        loop {
            // Проверяем внешний stop_flag (Ctrl+C)
            if self.stop_flag.load(Ordering::Relaxed) {
                info!("Stop signal received. Finalizing...");
                break;
            }

            // Проверяем ограничение по времени
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    info!("Duration limit reached. Finalizing...");
                    break;
                }
            }

            // Тик статистики: окно Min/Max сбрасывается, итерация
            // блок не читает
            if last_tick.elapsed() >= STATS_TICK {
                info!("Min: {:.3} Max: {:.3}", extrema.min, extrema.max);
                extrema.reset();
                last_tick = Instant::now();
                continue;
            }

            // Лимит байт: строго больше, перелёт в один блок допустим
            if !budget.byte_limit.is_unlimited() && progress > budget.byte_limit.bytes() {
                info!("Byte limit reached ({progress} bytes). Finalizing...");
                break;
            }

            // Читаем следующий блок; обрыв потока — фатальная ошибка
            reader
                .read_block(&mut raw)
                .map_err(CaptureError::SourceRead)?;

            metrics.blocks_read.fetch_add(1, Ordering::Relaxed);
            metrics
                .samples_read
                .fetch_add(cfg.block_samples as u64, Ordering::Relaxed);

            lut.apply(&raw, &mut magnitudes);
            let block_mean = mean(&magnitudes);
            extrema.observe(block_mean);

            // Squelch: тихий блок не пишется и прогресс не двигает
            if budget.squelch != 0.0 && block_mean < budget.squelch {
                metrics.blocks_squelched.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            // Блок пишется целиком; неполная запись — ошибка стока
            sink.write_all(&raw).map_err(CaptureError::SinkWrite)?;
            progress += raw.len() as i64;
            metrics.blocks_written.fetch_add(1, Ordering::Relaxed);
            metrics.bytes_written.fetch_add(raw.len() as u64, Ordering::Relaxed);
        }

        sink.flush().map_err(CaptureError::SinkWrite)?;

        info!("Capture finished: {progress} bytes written");
        Ok(())
    }
}

/// Открывает сток вывода: discard-сток либо новый файл из конфигурации.
fn open_sink(config: &CaptureConfig) -> CaptureResult<Box<dyn Write>> {
    if config.is_discard() {
        return Ok(Box::new(io::sink()));
    }

    let file = File::create(&config.output_path).map_err(CaptureError::SinkCreate)?;

    Ok(Box::new(file))
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, path::PathBuf, sync::Mutex};

    use iqcap_core::ByteSize;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::{CaptureBudget, DISCARD_PATH};

    /// Бесконечный источник с постоянным значением байта.
    ///
    /// Байт 0 даёт максимальную магнитуду (≈1.412 на выборку),
    /// байт 127 — почти нулевую (≈0.004).
    struct ConstSource(u8);

    impl Read for ConstSource {
        fn read(
            &mut self,
            buf: &mut [u8],
        ) -> io::Result<usize> {
            buf.fill(self.0);
            Ok(buf.len())
        }
    }

    /// Сток, принимающий не более 1000 байт за один вызов `write`.
    struct TrickleSink(Arc<Mutex<Vec<u8>>>);

    impl Write for TrickleSink {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            let take = buf.len().min(1_000);
            self.0.lock().unwrap().extend_from_slice(&buf[..take]);
            Ok(take)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn test_config(path: PathBuf) -> CaptureConfig {
        CaptureConfig {
            budget: CaptureBudget {
                byte_limit: ByteSize(0),
                // Страховка от зависания, если лимит в тесте не сработает
                time_limit: Some(Duration::from_secs(5)),
                squelch: 0.0,
            },
            output_path: path,
            block_samples: 4_096,
            ring_capacity: 8,
        }
    }

    #[test]
    fn test_byte_limit_allows_one_block_overrun() {
        // Лимит равен ровно одному блоку: progress=8192 ещё не
        // строго больше 8192, поэтому пишется и второй блок
        let mut config = test_config(PathBuf::from(DISCARD_PATH));
        config.budget.byte_limit = ByteSize(8_192);

        let (pipeline, metrics) = CapturePipeline::new(config);
        pipeline.run(Box::new(ConstSource(0))).unwrap();

        assert_eq!(metrics.blocks_written.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.bytes_written.load(Ordering::Relaxed), 16_384);
    }

    #[test]
    fn test_byte_limit_below_block_stops_after_first() {
        let mut config = test_config(PathBuf::from(DISCARD_PATH));
        config.budget.byte_limit = ByteSize(8_191);

        let (pipeline, metrics) = CapturePipeline::new(config);
        pipeline.run(Box::new(ConstSource(0))).unwrap();

        assert_eq!(metrics.blocks_written.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.bytes_written.load(Ordering::Relaxed), 8_192);
    }

    #[test]
    fn test_time_limit_stops_session() {
        let mut config = test_config(PathBuf::from(DISCARD_PATH));
        config.budget.time_limit = Some(Duration::from_millis(300));

        let (pipeline, metrics) = CapturePipeline::new(config);

        let started = Instant::now();
        pipeline.run(Box::new(ConstSource(0))).unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_secs(3), "дедлайн сильно просрочен");
        assert!(metrics.blocks_read.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn test_oversized_time_limit_does_not_overflow() {
        // time_limit, не представимый как Instant + Duration:
        // дедлайн не взводится, сессию завершает лимит байт
        let mut config = test_config(PathBuf::from(DISCARD_PATH));
        config.budget.byte_limit = ByteSize(8_191);
        config.budget.time_limit = Some(Duration::from_secs(10_000_000_000_000_000_000));

        let (pipeline, metrics) = CapturePipeline::new(config);
        pipeline.run(Box::new(ConstSource(0))).unwrap();

        assert_eq!(metrics.blocks_written.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_pipeline_stop_flag_works() {
        let mut config = test_config(PathBuf::from(DISCARD_PATH));
        config.budget.time_limit = None; // без ограничения по времени

        let (pipeline, _metrics) = CapturePipeline::new(config);
        let stop = pipeline.stop_flag();

        // Останавливаем через 200 мс из отдельного потока
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            stop.store(true, Ordering::Relaxed);
        });

        let result = pipeline.run(Box::new(ConstSource(0)));
        assert!(result.is_ok(), "graceful stop не должен быть ошибкой");
    }

    #[test]
    fn test_squelch_discards_quiet_blocks() {
        let tmp = NamedTempFile::new().unwrap();
        let mut config = test_config(tmp.path().to_path_buf());
        config.budget.time_limit = Some(Duration::from_millis(300));
        config.budget.squelch = 1.0;

        let (pipeline, metrics) = CapturePipeline::new(config);

        // Байт 127: средняя магнитуда ≈0.004, ниже порога 1.0
        pipeline.run(Box::new(ConstSource(127))).unwrap();

        assert!(metrics.blocks_read.load(Ordering::Relaxed) > 0);
        assert!(metrics.blocks_squelched.load(Ordering::Relaxed) > 0);
        assert_eq!(metrics.blocks_written.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.bytes_written.load(Ordering::Relaxed), 0);

        // Файл создан, но пуст
        let written = std::fs::metadata(tmp.path()).unwrap().len();
        assert_eq!(written, 0, "тихие блоки не должны попадать в файл");
    }

    #[test]
    fn test_squelch_passes_loud_blocks() {
        let mut config = test_config(PathBuf::from(DISCARD_PATH));
        config.budget.byte_limit = ByteSize(8_191);
        config.budget.squelch = 1.0;

        let (pipeline, metrics) = CapturePipeline::new(config);

        // Байт 0: средняя магнитуда ≈1.412, выше порога 1.0
        pipeline.run(Box::new(ConstSource(0))).unwrap();

        assert_eq!(metrics.blocks_squelched.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.blocks_written.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_sink_receives_source_bytes_verbatim() {
        let tmp = NamedTempFile::new().unwrap();
        let mut config = test_config(tmp.path().to_path_buf());
        config.budget.byte_limit = ByteSize(8_191);

        let pattern: Vec<u8> = (0..65_536usize).map(|i| (i % 256) as u8).collect();

        let (pipeline, _metrics) = CapturePipeline::new(config);
        pipeline.run(Box::new(Cursor::new(pattern.clone()))).unwrap();

        let written = std::fs::read(tmp.path()).unwrap();
        assert_eq!(written.len(), 8_192);
        assert_eq!(written, pattern[..8_192], "байты источника искажены");
    }

    #[test]
    fn test_source_eof_is_fatal() {
        // Источник выдаёт меньше одного блока и закрывается
        let config = test_config(PathBuf::from(DISCARD_PATH));
        let (pipeline, _metrics) = CapturePipeline::new(config);

        let result = pipeline.run(Box::new(Cursor::new(vec![0u8; 1_000])));

        assert!(matches!(result, Err(CaptureError::SourceRead(_))));
    }

    #[test]
    fn test_discard_sink_still_counts_progress() {
        let mut config = test_config(PathBuf::from(DISCARD_PATH));
        config.budget.byte_limit = ByteSize(16_383);
        assert!(config.is_discard());

        let (pipeline, metrics) = CapturePipeline::new(config);
        pipeline.run(Box::new(ConstSource(0))).unwrap();

        // io::sink() подтверждает записи полностью, лимит работает
        assert_eq!(metrics.bytes_written.load(Ordering::Relaxed), 16_384);
        assert_eq!(metrics.blocks_written.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_short_writing_sink_gets_full_block() {
        // Сток принимает блок кусками по 1000 байт: write_all обязан
        // дописать хвост, учёт ведётся полными блоками
        let mut config = test_config(PathBuf::from(DISCARD_PATH));
        config.budget.byte_limit = ByteSize(8_191);

        let collected = Arc::new(Mutex::new(Vec::new()));

        let (tx, rx) = crossbeam_channel::bounded::<Vec<u8>>(8);
        std::thread::spawn(move || {
            let _ = forward_stream(Box::new(ConstSource(0)), tx);
        });

        let (pipeline, metrics) = CapturePipeline::new(config);
        pipeline
            .capture_loop(
                BlockReader::new(rx),
                Box::new(TrickleSink(collected.clone())),
            )
            .unwrap();

        assert_eq!(collected.lock().unwrap().len(), 8_192, "хвост блока потерян");
        assert_eq!(metrics.bytes_written.load(Ordering::Relaxed), 8_192);
        assert_eq!(metrics.blocks_written.load(Ordering::Relaxed), 1);
    }
}
