//! Cardinality estimation from a dense register array (HLL++ figure 6):
//! linear counting below the per-precision threshold, otherwise an
//! alpha-normalized harmonic-mean raw estimate with a bias correction.

use super::tables;

/// Estimates cardinality from a dense register array at precision `p`.
pub fn estimate(registers: &[u8], p: u8) -> f64 {
    let m = registers.len() as f64;

    let mut sum = 0.0f64;
    let mut zeros: u32 = 0;
    for &r in registers {
        // 2^(-r) computed by shifting and reciprocating rather than calling
        // a floating-point exp2, so every conforming implementation agrees
        // to the last bit.
        sum += 1.0 / ((1u64 << r) as f64);
        if r == 0 {
            zeros += 1;
        }
    }

    if zeros > 0 {
        let n_lc = (m * (m / zeros as f64).ln()).round();
        if n_lc <= tables::threshold(p) {
            return n_lc;
        }
    }

    let raw = tables::alpha(p) * m * m / sum;
    (raw - tables::bias(raw, p)).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registers_estimate_to_zero() {
        let registers = vec![0u8; 1 << 14];
        assert_eq!(estimate(&registers, 14), 0.0);
    }

    #[test]
    fn single_register_estimates_to_about_one() {
        let mut registers = vec![0u8; 1 << 14];
        registers[0] = 5;
        let est = estimate(&registers, 14);
        assert!(est >= 0.0 && est < 5.0, "got {est}");
    }

    #[test]
    fn saturated_registers_use_raw_branch_without_panicking() {
        let registers = vec![30u8; 1 << 10];
        let est = estimate(&registers, 10);
        assert!(est.is_finite());
    }
}
