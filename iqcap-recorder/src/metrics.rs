use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// Метрики сессии, обновляемые lock-free из нескольких потоков.
#[derive(Debug, Default)]
pub struct CaptureMetrics {
    pub samples_read: AtomicU64,
    pub blocks_read: AtomicU64,
    pub blocks_written: AtomicU64,
    pub blocks_squelched: AtomicU64,
    pub bytes_written: AtomicU64,
}

/// Snapshot метрик для отображения / тестирования.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub duration_secs: f64,
    pub samples_read: u64,
    pub blocks_read: u64,
    pub blocks_written: u64,
    pub blocks_squelched: u64,
    pub bytes_written: u64,
    pub throughput_msps: f64,
    pub write_speed_mbps: f64,
    pub squelch_rate_pct: f64,
}

impl CaptureMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn throughput_msps(
        &self,
        start: &Instant,
    ) -> f64 {
        let secs = start.elapsed().as_secs_f64();

        if secs < 1e-9 {
            return 0.0;
        }

        self.samples_read.load(Ordering::Relaxed) as f64 / secs / 1_000_000.0
    }

    /// Скорость записи в МБ/с.
    pub fn write_speed_mbps(
        &self,
        start: &Instant,
    ) -> f64 {
        let secs = start.elapsed().as_secs_f64();

        if secs < 1e-9 {
            return 0.0;
        }

        self.bytes_written.load(Ordering::Relaxed) as f64 / secs / 1_000_000.0
    }

    /// Процент блоков, отброшенных squelch-порогом (0.0-100.0).
    pub fn squelch_rate_pct(&self) -> f64 {
        let read = self.blocks_read.load(Ordering::Relaxed);
        let squelched = self.blocks_squelched.load(Ordering::Relaxed);

        if read == 0 {
            0.0
        } else {
            squelched as f64 / read as f64 * 100.0
        }
    }

    /// Итоговая сводка для вывода в конце сессии.
    pub fn summary(
        &self,
        start: &Instant,
    ) -> MetricsSummary {
        MetricsSummary {
            duration_secs: start.elapsed().as_secs_f64(),
            samples_read: self.samples_read.load(Ordering::Relaxed),
            blocks_read: self.blocks_read.load(Ordering::Relaxed),
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
            blocks_squelched: self.blocks_squelched.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            throughput_msps: self.throughput_msps(start),
            write_speed_mbps: self.write_speed_mbps(start),
            squelch_rate_pct: self.squelch_rate_pct(),
        }
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration      : {:.1}s", self.duration_secs)?;
        writeln!(f, "  Samples       : {}", self.samples_read)?;
        writeln!(
            f,
            "  Blocks        : {} written / {} read",
            self.blocks_written, self.blocks_read
        )?;
        writeln!(
            f,
            "  Squelched     : {} ({:.2}%)",
            self.blocks_squelched, self.squelch_rate_pct
        )?;
        writeln!(
            f,
            "  Bytes written : {:.1} MB",
            self.bytes_written as f64 / 1e6
        )?;
        writeln!(f, "  Throughput    : {:.3} Msps", self.throughput_msps)?;
        writeln!(f, "  Write speed   : {:.1} MB/s", self.write_speed_mbps)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}
