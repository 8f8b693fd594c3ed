use catalog::ScenarioYearIndex;

pub const DEFAULT_DIVIDER_PERCENT: f64 = 50.0;

/// Comparison divider position as a percentage of the map width.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Divider(f64);

impl Divider {
    /// Clamps to `[0, 100]`; non-finite input keeps the centre.
    pub fn new(percent: f64) -> Self {
        if percent.is_finite() {
            Self(percent.clamp(0.0, 100.0))
        } else {
            Self(DEFAULT_DIVIDER_PERCENT)
        }
    }

    pub fn percent(self) -> f64 {
        self.0
    }

    pub fn px(self, width: f64) -> f64 {
        width * self.0 / 100.0
    }
}

impl Default for Divider {
    fn default() -> Self {
        Self(DEFAULT_DIVIDER_PERCENT)
    }
}

/// Which year and which two scenarios are on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Position on the dataset's year axis.
    pub year_index: usize,
    pub left: String,
    pub right: String,
}

impl Selection {
    /// First year, with the preferred scenarios when the dataset has them.
    ///
    /// Otherwise falls back to the first two scenarios in sorted order, or
    /// the single scenario on both sides. `None` for an empty index.
    pub fn initial(index: &ScenarioYearIndex, preferred_left: &str, preferred_right: &str) -> Option<Self> {
        if index.years().is_empty() {
            return None;
        }
        let names = index.scenario_names();
        let first = names.first()?.clone();

        let left = if index.has_scenario(preferred_left) {
            preferred_left.to_string()
        } else {
            first.clone()
        };
        let right = if index.has_scenario(preferred_right) {
            preferred_right.to_string()
        } else {
            names
                .iter()
                .find(|name| **name != left)
                .cloned()
                .unwrap_or(first)
        };

        Some(Self {
            year_index: 0,
            left,
            right,
        })
    }

    pub fn year(&self, axis: &[i32]) -> Option<i32> {
        axis.get(self.year_index).copied()
    }

    /// Jumps to `index`, clamped to the last year. Returns whether it moved.
    pub fn set_year_index(&mut self, index: usize, axis_len: usize) -> bool {
        if axis_len == 0 {
            return false;
        }
        self.move_to(index.min(axis_len - 1))
    }

    /// Moves `delta` years along the axis, stopping at either end.
    pub fn step(&mut self, delta: i32, axis_len: usize) -> bool {
        if axis_len == 0 {
            return false;
        }
        let last = (axis_len - 1) as i64;
        let target = (self.year_index as i64 + i64::from(delta)).clamp(0, last);
        self.move_to(target as usize)
    }

    /// Next year, wrapping to the first after the last.
    pub fn advance(&mut self, axis_len: usize) -> bool {
        if axis_len == 0 {
            return false;
        }
        self.move_to((self.year_index + 1) % axis_len)
    }

    pub fn can_step_back(&self) -> bool {
        self.year_index > 0
    }

    pub fn can_step_forward(&self, axis_len: usize) -> bool {
        self.year_index + 1 < axis_len
    }

    pub fn set_scenarios(&mut self, left: &str, right: &str) -> bool {
        let (left, right) = (left.trim(), right.trim());
        if left.is_empty() || right.is_empty() || (self.left == left && self.right == right) {
            return false;
        }
        self.left = left.to_string();
        self.right = right.to_string();
        true
    }

    fn move_to(&mut self, index: usize) -> bool {
        let moved = index != self.year_index;
        self.year_index = index;
        moved
    }
}
