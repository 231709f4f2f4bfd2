//! Linear mapper implementation

use super::Mapper;

/// Linear interpolation mapper.
///
/// The input is normalized against `in_min..in_max` and clamped to 0..1
/// before it is scaled into the output range, so values outside the input
/// range saturate instead of extrapolating. A degenerate input range maps
/// everything to the output midpoint.
pub struct LinearMapper {
    name: String,
    in_min: f64,
    in_max: f64,
    out_min: f64,
    out_max: f64,
}

impl LinearMapper {
    /// Create a new linear mapper
    pub fn new(
        name: impl Into<String>,
        in_min: f64,
        in_max: f64,
        out_min: f64,
        out_max: f64,
    ) -> Self {
        Self {
            name: name.into(),
            in_min,
            in_max,
            out_min,
            out_max,
        }
    }

    /// A mapper taking an already-normalized input
    pub fn unit(name: impl Into<String>, range: [f64; 2]) -> Self {
        Self::new(name, 0.0, 1.0, range[0], range[1])
    }
}

impl Mapper for LinearMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        let in_range = self.in_max - self.in_min;
        let normalized = if in_range.abs() < f64::EPSILON {
            0.5
        } else {
            ((input - self.in_min) / in_range).clamp(0.0, 1.0)
        };

        lerp(normalized, [self.out_min, self.out_max])
    }
}

/// Interpolate `t` (clamped to 0..1) into `range`
pub fn lerp(t: f64, range: [f64; 2]) -> f64 {
    let t = t.clamp(0.0, 1.0);
    range[0] + t * (range[1] - range[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_mapper_basic() {
        let mapper = LinearMapper::new("test", 0.0, 100.0, 0.0, 1.0);

        assert_eq!(mapper.map(0.0), 0.0);
        assert_eq!(mapper.map(50.0), 0.5);
        assert_eq!(mapper.map(100.0), 1.0);
    }

    #[test]
    fn test_linear_mapper_inverted() {
        let mapper = LinearMapper::new("test", 0.0, 100.0, 1.0, 0.0);

        assert_eq!(mapper.map(0.0), 1.0);
        assert_eq!(mapper.map(50.0), 0.5);
        assert_eq!(mapper.map(100.0), 0.0);
    }

    #[test]
    fn test_linear_mapper_saturates() {
        let mapper = LinearMapper::new("test", 0.0, 100.0, 0.4, 0.7);

        assert_eq!(mapper.map(-50.0), 0.4);
        assert_eq!(mapper.map(150.0), 0.7);
    }

    #[test]
    fn test_linear_mapper_degenerate_input() {
        let mapper = LinearMapper::new("flat", 5.0, 5.0, 100.0, 400.0);
        assert_eq!(mapper.map(5.0), 250.0);
        assert_eq!(mapper.map(1000.0), 250.0);
    }

    #[test]
    fn test_unit_mapper() {
        let mapper = LinearMapper::unit("continuous", [200.0, 800.0]);
        assert_eq!(mapper.name(), "continuous");
        assert_eq!(mapper.map(0.5), 500.0);
        assert_eq!(mapper.map(2.0), 800.0);
    }

    #[test]
    fn test_lerp_clamps() {
        assert_eq!(lerp(-1.0, [-1.0, 1.0]), -1.0);
        assert_eq!(lerp(0.5, [-1.0, 1.0]), 0.0);
        assert_eq!(lerp(3.0, [-1.0, 1.0]), 1.0);
    }
}
