use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Evenly spaced, endpoint-inclusive sampling domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Domain of the quadratic demo: wider than the visible x-range so the curve
/// never ends inside the chart.
pub const QUADRATIC_DOMAIN: Domain = Domain {
    start: -50.0,
    end: 50.0,
    count: 500,
};

pub const TRANSFORM_DOMAIN: Domain = Domain {
    start: -10.0,
    end: 10.0,
    count: 400,
};

impl Domain {
    pub const fn new(start: f64, end: f64, count: usize) -> Self {
        Self { start, end, count }
    }

    pub fn step(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.end - self.start) / (self.count - 1) as f64
        }
    }

    /// The x-coordinates of the domain. The last sample is exactly `end`.
    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        let step = self.step();
        (0..self.count).map(move |i| {
            if i + 1 == self.count && self.count > 1 {
                self.end
            } else {
                self.start + i as f64 * step
            }
        })
    }
}

/// Anything that can be evaluated at a point.
pub trait Curve {
    fn eval(&self, x: f64) -> f64;
}

impl<F: Fn(f64) -> f64> Curve for F {
    fn eval(&self, x: f64) -> f64 {
        self(x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

/// Discretized curve, regenerated on every render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    points: Vec<Sample>,
}

impl SampleSeries {
    pub fn sample<C: Curve + ?Sized>(domain: &Domain, curve: &C) -> Self {
        let points = domain
            .xs()
            .map(|x| Sample {
                x,
                y: curve.eval(x),
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.points
    }

    pub fn first(&self) -> Option<&Sample> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.points.last()
    }

    /// Splits the series into polylines clipped to the chart window.
    ///
    /// Each segment between consecutive samples is clipped to the rectangle
    /// spanned by `x_axis` and `y_axis`; a new run starts wherever the curve
    /// re-enters the window. Segments touching a non-finite sample are
    /// dropped.
    pub fn visible_runs(&self, x_axis: &AxisSpec, y_axis: &AxisSpec) -> Vec<Vec<(f64, f64)>> {
        let mut runs = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();

        for pair in self.points.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let Some((t0, t1)) = clip_segment(a, b, x_axis, y_axis) else {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
                continue;
            };
            let continues = t0 == 0.0 && !current.is_empty();
            if !continues {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
                current.push(lerp(a, b, t0));
            }
            current.push(lerp(a, b, t1));
            if t1 < 1.0 {
                runs.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

fn lerp(a: &Sample, b: &Sample, t: f64) -> (f64, f64) {
    if t == 0.0 {
        (a.x, a.y)
    } else if t == 1.0 {
        (b.x, b.y)
    } else {
        (a.x + t * (b.x - a.x), a.y + t * (b.y - a.y))
    }
}

/// Liang-Barsky: parameter interval `[t0, t1]` of the segment `a -> b` that
/// lies inside the window, or `None` when the segment misses it.
fn clip_segment(a: &Sample, b: &Sample, x: &AxisSpec, y: &AxisSpec) -> Option<(f64, f64)> {
    if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let edges = [
        (-dx, a.x - x.min),
        (dx, x.max - a.x),
        (-dy, a.y - y.min),
        (dy, y.max - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

/// `f(x) = a·x² + b·x + c`, the fixed form of the quadratic demo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadratic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Curve for Quadratic {
    fn eval(&self, x: f64) -> f64 {
        self.a * x * x + self.b * x + self.c
    }
}

impl Quadratic {
    /// Annotation shown next to the chart, two decimals per coefficient.
    pub fn label(&self) -> String {
        format!(
            "f(x) = {:.2}x² + {:.2}x + {:.2}",
            self.a, self.b, self.c
        )
    }
}

/// Base function family offered by the transformation demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BaseKind {
    #[default]
    Linear,
    Quadratic,
    Cubic,
}

impl BaseKind {
    pub const ALL: [BaseKind; 3] = [BaseKind::Linear, BaseKind::Quadratic, BaseKind::Cubic];

    pub fn name(&self) -> &'static str {
        match self {
            BaseKind::Linear => "Linear",
            BaseKind::Quadratic => "Quadratic",
            BaseKind::Cubic => "Cubic",
        }
    }
}

/// Parses a kind name, case-insensitive.
impl FromStr for BaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(BaseKind::Linear),
            "quadratic" => Ok(BaseKind::Quadratic),
            "cubic" => Ok(BaseKind::Cubic),
            _ => Err(format!("unknown base function kind: {s}")),
        }
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A base function with its coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BaseFunction {
    Linear { m: f64, b: f64 },
    Quadratic { a: f64, b: f64, c: f64 },
    Cubic { a: f64, b: f64, c: f64, d: f64 },
}

impl BaseFunction {
    pub fn kind(&self) -> BaseKind {
        match self {
            BaseFunction::Linear { .. } => BaseKind::Linear,
            BaseFunction::Quadratic { .. } => BaseKind::Quadratic,
            BaseFunction::Cubic { .. } => BaseKind::Cubic,
        }
    }

    /// Right-hand side of `f(x) = …` with one decimal per coefficient.
    pub fn label(&self) -> String {
        match *self {
            BaseFunction::Linear { m, b } => format!("{m:.1}x + {b:.1}"),
            BaseFunction::Quadratic { a, b, c } => format!("{a:.1}x² + {b:.1}x + {c:.1}"),
            BaseFunction::Cubic { a, b, c, d } => {
                format!("{a:.1}x³ + {b:.1}x² + {c:.1}x + {d:.1}")
            }
        }
    }
}

impl Curve for BaseFunction {
    fn eval(&self, x: f64) -> f64 {
        match *self {
            BaseFunction::Linear { m, b } => m * x + b,
            BaseFunction::Quadratic { a, b, c } => a * x * x + b * x + c,
            BaseFunction::Cubic { a, b, c, d } => a * x * x * x + b * x * x + c * x + d,
        }
    }
}

/// `g(x) = a·f(b·(x + c)) + d`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 1.0,
        c: 0.0,
        d: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply<C: Curve + ?Sized>(&self, base: &C, x: f64) -> f64 {
        self.a * base.eval(self.b * (x + self.c)) + self.d
    }

    /// Binds the transform to a base curve.
    pub fn of<'a, C: Curve + ?Sized>(&'a self, base: &'a C) -> Transformed<'a, C> {
        Transformed {
            transform: self,
            base,
        }
    }

    /// Right-hand side of `g(x) = …`; identity parts are omitted.
    pub fn label(&self) -> String {
        let mut out = String::new();
        if self.a != 1.0 {
            out.push_str(&format!("{:.1} · ", self.a));
        }
        out.push_str("f(");
        if self.b != 1.0 {
            out.push_str(&format!("{:.1}", self.b));
        }
        out.push('x');
        if self.c != 0.0 {
            out.push_str(&format!(" {} {:.1}", sign(self.c), self.c.abs()));
        }
        out.push(')');
        if self.d != 0.0 {
            out.push_str(&format!(" {} {:.1}", sign(self.d), self.d.abs()));
        }
        out
    }
}

fn sign(v: f64) -> char {
    if v > 0.0 {
        '+'
    } else {
        '-'
    }
}

pub struct Transformed<'a, C: ?Sized> {
    transform: &'a Transform,
    base: &'a C,
}

impl<C: Curve + ?Sized> Curve for Transformed<'_, C> {
    fn eval(&self, x: f64) -> f64 {
        self.transform.apply(self.base, x)
    }
}

/// Fixed axis range with linear major/minor tick spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub min: f64,
    pub max: f64,
    pub tick0: f64,
    pub dtick: f64,
    pub minor_dtick: f64,
}

impl AxisSpec {
    pub const fn new(min: f64, max: f64, dtick: f64, minor_dtick: f64) -> Self {
        Self {
            min,
            max,
            tick0: 0.0,
            dtick,
            minor_dtick,
        }
    }

    pub fn range(&self) -> std::ops::Range<f64> {
        self.min..self.max
    }

    pub fn major_ticks(&self) -> Vec<f64> {
        ticks(self.min, self.max, self.tick0, self.dtick)
    }

    /// Minor ticks that do not coincide with a major tick.
    pub fn minor_ticks(&self) -> Vec<f64> {
        let major = self.major_ticks();
        let tol = self.minor_dtick.abs() * 1e-6;
        ticks(self.min, self.max, self.tick0, self.minor_dtick)
            .into_iter()
            .filter(|t| !major.iter().any(|m| (m - t).abs() <= tol))
            .collect()
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

fn ticks(min: f64, max: f64, tick0: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step <= 0.0 || max < min {
        return Vec::new();
    }
    let eps = step * 1e-9;
    let first = ((min - tick0 - eps) / step).ceil() as i64;
    let last = ((max - tick0 + eps) / step).floor() as i64;
    (first..=last).map(|k| tick0 + k as f64 * step).collect()
}
