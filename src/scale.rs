//! Axis scales and colour assignment.
//!
//! Scales are plain values built per chart per render; two charts never share
//! one even when their domains match.

use std::collections::HashMap;

use crate::format;

/// A scale that can be drawn as an axis.
pub trait AxisScale {
    /// Tick positions in range space with their labels.
    fn ticks(&self) -> Vec<(f64, String)>;
    fn range(&self) -> (f64, f64);
}

// =============================================================================
// Band
// =============================================================================

/// Categorical axis with uniform inner and outer padding, centred in its range.
#[derive(Debug, Clone)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Repeated categories collapse onto their first band.
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(domain.len());
        for d in domain {
            if !unique.contains(&d) {
                unique.push(d);
            }
        }
        let domain = unique;
        let padding = padding.clamp(0.0, 1.0);
        let n = domain.len() as f64;
        let (r0, r1) = range;
        let step = (r1 - r0) / (n - padding + 2.0 * padding).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
        Self { domain, range, start, step, bandwidth: step * (1.0 - padding) }
    }

    pub fn map(&self, key: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == key)
            .map(|i| self.start + self.step * i as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

}

impl AxisScale for BandScale {
    fn ticks(&self) -> Vec<(f64, String)> {
        self.domain
            .iter()
            .enumerate()
            .map(|(i, d)| (self.start + self.step * i as f64 + self.bandwidth / 2.0, d.clone()))
            .collect()
    }

    fn range(&self) -> (f64, f64) {
        self.range
    }
}

// =============================================================================
// Point
// =============================================================================

/// Evenly spaced categorical positions; a single value sits mid-range.
#[derive(Debug, Clone)]
pub struct PointScale {
    domain: Vec<String>,
    range: (f64, f64),
    start: f64,
    step: f64,
}

impl PointScale {
    pub fn new(domain: Vec<String>, range: (f64, f64)) -> Self {
        let (r0, r1) = range;
        let gaps = domain.len().saturating_sub(1) as f64;
        let step = (r1 - r0) / gaps.max(1.0);
        let start = r0 + (r1 - r0 - step * gaps) * 0.5;
        Self { domain, range, start, step }
    }

    pub fn map(&self, key: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == key)
            .map(|i| self.start + self.step * i as f64)
    }

    pub fn at(&self, index: usize) -> f64 {
        self.start + self.step * index as f64
    }
}

impl AxisScale for PointScale {
    fn ticks(&self) -> Vec<(f64, String)> {
        self.domain.iter().enumerate().map(|(i, d)| (self.at(i), d.clone())).collect()
    }

    fn range(&self) -> (f64, f64) {
        self.range
    }
}

// =============================================================================
// Linear
// =============================================================================

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

/// Positive: the tick step. Negative: the reciprocal of a sub-unit step.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / (count.max(1) as f64);
    if step <= 0.0 || !step.is_finite() {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

#[derive(Debug, Clone)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Extends the domain outward to round tick boundaries.
    pub fn nice(mut self) -> Self {
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }
        let mut prev = 0.0;
        for _ in 0..10 {
            let step = tick_increment(start, stop, 10);
            if step == prev {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * -step).floor() / -step;
                stop = (stop * -step).ceil() / -step;
            } else {
                break;
            }
            prev = step;
        }
        self.domain = if reversed { (stop, start) } else { (start, stop) };
        self
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn tick_values(&self, count: usize) -> Vec<f64> {
        let (a, b) = self.domain;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let inc = tick_increment(lo, hi, count);
        if inc > 0.0 {
            let (i0, i1) = ((lo / inc).ceil() as i64, (hi / inc).floor() as i64);
            (i0..=i1).map(|i| i as f64 * inc).collect()
        } else if inc < 0.0 {
            let (i0, i1) = ((lo * -inc).ceil() as i64, (hi * -inc).floor() as i64);
            (i0..=i1).map(|i| i as f64 / -inc).collect()
        } else if lo == hi {
            vec![lo]
        } else {
            Vec::new()
        }
    }
}

impl AxisScale for LinearScale {
    fn ticks(&self) -> Vec<(f64, String)> {
        let values = self.tick_values(10);
        let decimals = match values.as_slice() {
            [a, b, ..] => (-(b - a).abs().log10().floor()).max(0.0) as usize,
            _ => 0,
        };
        values.into_iter().map(|v| (self.map(v), format::fixed(v, decimals))).collect()
    }

    fn range(&self) -> (f64, f64) {
        self.range
    }
}

// =============================================================================
// Colours
// =============================================================================

pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// Green / amber / red, for risk levels listed low to high.
pub const RISK: [&str; 3] = ["#2ca02c", "#ff7f0e", "#d62728"];

/// Palette colours assigned by category insertion order, never by value.
#[derive(Debug, Clone)]
pub struct OrdinalColors {
    palette: &'static [&'static str],
    assigned: HashMap<String, &'static str>,
    next: usize,
}

impl OrdinalColors {
    pub fn new(palette: &'static [&'static str]) -> Self {
        Self { palette, assigned: HashMap::new(), next: 0 }
    }

    pub fn with_domain<I, S>(palette: &'static [&'static str], domain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut colors = Self::new(palette);
        for key in domain {
            colors.color(key.as_ref());
        }
        colors
    }

    pub fn color(&mut self, key: &str) -> &'static str {
        if let Some(c) = self.assigned.get(key) {
            return *c;
        }
        let c = if self.palette.is_empty() { "#000" } else { self.palette[self.next % self.palette.len()] };
        self.next += 1;
        self.assigned.insert(key.to_string(), c);
        c
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerfLevel {
    High,
    Medium,
    Low,
}

impl PerfLevel {
    pub fn color(&self) -> &'static str {
        match self {
            PerfLevel::High => "#2ca02c",
            PerfLevel::Medium => "#ff7f0e",
            PerfLevel::Low => "#d62728",
        }
    }
}

/// Score breakpoints, inclusive, checked high then medium.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceBands {
    pub high: f64,
    pub medium: f64,
}

impl Default for PerformanceBands {
    fn default() -> Self {
        Self { high: 7.5, medium: 5.0 }
    }
}

impl PerformanceBands {
    pub fn level(&self, v: f64) -> PerfLevel {
        if v >= self.high {
            PerfLevel::High
        } else if v >= self.medium {
            PerfLevel::Medium
        } else {
            PerfLevel::Low
        }
    }
}
