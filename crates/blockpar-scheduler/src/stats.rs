//! Improvement ratios against fully serial execution

use blockpar_primitives::Gas;

/// `makespan` as a percentage of `serial`; lower is better.
///
/// A block with nothing to run cannot improve, so it reports 100.
pub fn percentage_of_serial(serial: Gas, makespan: Gas) -> f64 {
    if serial == 0 {
        return 100.0;
    }
    makespan as f64 * 100.0 / serial as f64
}

/// How many times faster than serial execution; 1.0 for an empty schedule
pub fn speedup(serial: Gas, makespan: Gas) -> f64 {
    if makespan == 0 {
        return 1.0;
    }
    serial as f64 / makespan as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_of_serial() {
        assert_eq!(percentage_of_serial(300, 200), 200.0 * 100.0 / 300.0);
        assert_eq!(percentage_of_serial(300, 300), 100.0);
        assert_eq!(percentage_of_serial(0, 0), 100.0);
    }

    #[test]
    fn test_speedup() {
        assert_eq!(speedup(300, 150), 2.0);
        assert_eq!(speedup(0, 0), 1.0);
    }
}
