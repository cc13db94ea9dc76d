/// Среднее арифметическое блока магнитуд.
///
/// Пустой блок не определён: длина блока ≥ 1 по построению конвейера.
pub fn mean(block: &[f64]) -> f64 {
    block.iter().sum::<f64>() / block.len() as f64
}

/// Бегущие min/max среднего по блоку за одно окно отчёта.
///
/// Окно сбрасывается раз в секунду сразу после вывода строки статистики;
/// свежесозданное значение уже находится в сброшенном состоянии, так что
/// инвариант min ≤ max выполняется с первого учтённого блока.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningExtrema {
    pub min: f64,
    pub max: f64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RunningExtrema {
    /// Создаёт окно в сброшенном состоянии: min = +∞, max = −∞.
    pub fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Учитывает среднее очередного блока.
    pub fn observe(
        &mut self,
        mean: f64,
    ) {
        if mean > self.max {
            self.max = mean;
        }
        if mean < self.min {
            self.min = mean;
        }
    }

    /// Начинает новое окно.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for RunningExtrema {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_identical_values_is_exact() {
        let block = vec![2.5; 100];
        assert_eq!(mean(&block), 2.5);

        let block = vec![0.0; 17];
        assert_eq!(mean(&block), 0.0);
    }

    #[test]
    fn test_mean_simple() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(mean(&[4.0]), 4.0);
    }

    #[test]
    fn test_new_starts_in_reset_state() {
        let e = RunningExtrema::new();

        assert_eq!(e.min, f64::INFINITY);
        assert_eq!(e.max, f64::NEG_INFINITY);
    }

    #[test]
    fn test_observe_is_idempotent() {
        let mut e = RunningExtrema::new();

        e.observe(1.25);
        e.observe(1.25);

        assert_eq!(e.min, 1.25);
        assert_eq!(e.max, 1.25);
    }

    #[test]
    fn test_observe_tracks_window_extrema() {
        let mut e = RunningExtrema::new();

        e.observe(3.0);
        e.observe(1.0);
        e.observe(2.0);

        assert_eq!(e.min, 1.0);
        assert_eq!(e.max, 3.0);
        assert!(e.min <= e.max, "инвариант окна нарушен");
    }

    #[test]
    fn test_reset_opens_fresh_window() {
        let mut e = RunningExtrema::new();

        e.observe(5.0);
        e.reset();

        assert_eq!(e, RunningExtrema::new());

        e.observe(0.5);
        assert_eq!(e.min, 0.5);
        assert_eq!(e.max, 0.5);
    }
}
