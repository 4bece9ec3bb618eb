pub trait Drive {
    /// Apply the phase voltage references [V] and return the voltages the
    /// drive actually realizes.
    fn drive(&mut self, v_abc_ref: [f64; 3], v_bus: f64) -> [f64; 3];
}

/// Ideal averaged-voltage inverter.
///
/// Each phase is clamped independently to `[-v_bus/2, v_bus/2]` relative
/// to the DC-link midpoint; there is no switching or dead-time model.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inverter;

impl Inverter {
    pub fn new() -> Self {
        Self
    }

    pub fn step(&self, v_abc_ref: [f64; 3], v_bus: f64) -> [f64; 3] {
        let limit = (v_bus / 2.).max(0.);
        v_abc_ref.map(|v| v.clamp(-limit, limit))
    }
}

impl Drive for Inverter {
    fn drive(&mut self, v_abc_ref: [f64; 3], v_bus: f64) -> [f64; 3] {
        self.step(v_abc_ref, v_bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_clamp_independently() {
        let v = Inverter::new().step([200., -10., -190.], 311.);
        assert_eq!(v, [155.5, -10., -155.5]);
    }

    #[test]
    fn references_within_bus_pass_through() {
        let v = [100., -40., -60.];
        assert_eq!(Inverter::new().step(v, 311.), v);
    }

    #[test]
    fn zero_bus_outputs_zero() {
        assert_eq!(Inverter::new().step([5., -3., -2.], 0.), [0.; 3]);
    }
}
