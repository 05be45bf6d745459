use fn_core::{BaseFunction, BaseKind, Quadratic, Transform};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub mod session;

pub use session::{SessionId, SessionRegistry, SessionState};

/// One self-contained visualization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoId {
    #[default]
    Quadratic,
    Transformation,
}

impl DemoId {
    pub const ALL: [DemoId; 2] = [DemoId::Quadratic, DemoId::Transformation];

    /// URL/form identifier.
    pub fn slug(&self) -> &'static str {
        match self {
            DemoId::Quadratic => "quadratic",
            DemoId::Transformation => "transformation",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.slug() == slug)
    }

    /// Label of the demo in the sidebar selector.
    pub fn title(&self) -> &'static str {
        match self {
            DemoId::Quadratic => "Quadratic Function",
            DemoId::Transformation => "Function Transformations",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            DemoId::Quadratic => "Quadratic Function Visualization",
            DemoId::Transformation => "Function Transformations Visualization",
        }
    }

    /// Group cleared by the demo's reset button. Base-function coefficients of
    /// the transformation demo survive a reset.
    pub fn reset_group(&self) -> ParamGroup {
        match self {
            DemoId::Quadratic => ParamGroup::Quadratic,
            DemoId::Transformation => ParamGroup::Transform,
        }
    }

    pub fn reset_label(&self) -> &'static str {
        match self {
            DemoId::Quadratic => "Reset to Default Values",
            DemoId::Transformation => "Reset Transformation Parameters",
        }
    }
}

/// Declared bounds of a single widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
    /// Decimals shown by the widget.
    pub decimals: usize,
    pub integer: bool,
}

impl ParamSpec {
    const fn float(
        key: &'static str,
        label: &'static str,
        (min, max, step): (f64, f64, f64),
        default: f64,
        decimals: usize,
    ) -> Self {
        Self {
            key,
            label,
            min,
            max,
            step,
            default,
            decimals,
            integer: false,
        }
    }

    const fn int(key: &'static str, label: &'static str, (min, max): (f64, f64), default: f64) -> Self {
        Self {
            key,
            label,
            min,
            max,
            step: 1.0,
            default,
            decimals: 0,
            integer: true,
        }
    }

    /// Brings a submitted value inside the declared bounds. Non-finite input
    /// has no meaningful clamp and yields `None`.
    pub fn sanitize(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let v = if self.integer { value.round() } else { value };
        Some(v.clamp(self.min, self.max))
    }

    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.decimals, value)
    }
}

pub static QUADRATIC_PARAMS: [ParamSpec; 3] = [
    ParamSpec::float("a", "a", (-5.0, 5.0, 0.1), 1.0, 1),
    ParamSpec::float("b", "b", (-20.0, 20.0, 1.0), 0.0, 1),
    ParamSpec::int("c", "c", (-100.0, 100.0), 0.0),
];

pub static TRANSFORM_PARAMS: [ParamSpec; 4] = [
    ParamSpec::float("a_trans", "Vertical Stretch (a)", (-5.0, 5.0, 0.1), 1.0, 1),
    ParamSpec::float("b_trans", "Horizontal Stretch (b)", (0.1, 5.0, 0.1), 1.0, 1),
    ParamSpec::float("c_trans", "Horizontal Shift (c)", (-10.0, 10.0, 0.5), 0.0, 1),
    ParamSpec::float("d_trans", "Vertical Shift (d)", (-10.0, 10.0, 0.5), 0.0, 1),
];

pub static LINEAR_PARAMS: [ParamSpec; 2] = [
    ParamSpec::float("lin_m", "Slope (M)", (-5.0, 5.0, 0.1), 1.0, 1),
    ParamSpec::float("lin_b", "y-intercept (B)", (-10.0, 10.0, 0.1), 0.0, 1),
];

pub static QUADRATIC_BASE_PARAMS: [ParamSpec; 3] = [
    ParamSpec::float("quad_a", "A", (-2.0, 2.0, 0.1), 1.0, 1),
    ParamSpec::float("quad_b", "B", (-10.0, 10.0, 0.5), 0.0, 1),
    ParamSpec::float("quad_c", "C", (-10.0, 10.0, 0.5), 0.0, 1),
];

pub static CUBIC_PARAMS: [ParamSpec; 4] = [
    ParamSpec::float("cubic_a", "A", (-2.0, 2.0, 0.1), 1.0, 1),
    ParamSpec::float("cubic_b", "B", (-10.0, 10.0, 0.15), 0.0, 1),
    ParamSpec::float("cubic_c", "C", (-10.0, 10.0, 0.5), 0.0, 1),
    ParamSpec::float("cubic_d", "D", (-10.0, 10.0, 0.5), 0.0, 1),
];

/// Store key of one parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamGroup {
    Quadratic,
    Transform,
    Base(BaseKind),
}

impl ParamGroup {
    pub const ALL: [ParamGroup; 5] = [
        ParamGroup::Quadratic,
        ParamGroup::Transform,
        ParamGroup::Base(BaseKind::Linear),
        ParamGroup::Base(BaseKind::Quadratic),
        ParamGroup::Base(BaseKind::Cubic),
    ];

    pub fn specs(&self) -> &'static [ParamSpec] {
        match self {
            ParamGroup::Quadratic => &QUADRATIC_PARAMS,
            ParamGroup::Transform => &TRANSFORM_PARAMS,
            ParamGroup::Base(BaseKind::Linear) => &LINEAR_PARAMS,
            ParamGroup::Base(BaseKind::Quadratic) => &QUADRATIC_BASE_PARAMS,
            ParamGroup::Base(BaseKind::Cubic) => &CUBIC_PARAMS,
        }
    }

    pub fn spec(&self, key: &str) -> Option<&'static ParamSpec> {
        self.specs().iter().find(|s| s.key == key)
    }

    pub fn defaults(&self) -> ParameterSet {
        self.specs().iter().map(|s| (s.key, s.default)).collect()
    }
}

/// Named numeric inputs of one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, f64>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Value for `spec`, or its default when absent.
    pub fn value(&self, spec: &ParamSpec) -> f64 {
        self.get(spec.key).unwrap_or(spec.default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Current parameter sets, keyed by group. Absent groups read as defaults.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    sets: HashMap<ParamGroup, ParameterSet>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_default(&self, group: ParamGroup) -> ParameterSet {
        self.sets
            .get(&group)
            .cloned()
            .unwrap_or_else(|| group.defaults())
    }

    /// Overwrites the group's values. Values are clamped to their declared
    /// bounds; undeclared keys and non-finite values are dropped, keeping the
    /// current value.
    pub fn update(&mut self, group: ParamGroup, incoming: ParameterSet) {
        let mut next = self.get_or_default(group);
        for (key, value) in incoming.iter() {
            let Some(spec) = group.spec(key) else {
                continue;
            };
            if let Some(v) = spec.sanitize(value) {
                next.set(spec.key, v);
            }
        }
        self.sets.insert(group, next);
    }

    pub fn reset(&mut self, group: ParamGroup) {
        self.sets.insert(group, group.defaults());
    }

    /// Partial update from submitted form fields. Returns true when any
    /// declared key of the group was present and parsed.
    pub fn merge_form<'a, I>(&mut self, group: ParamGroup, fields: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let incoming: ParameterSet = fields
            .into_iter()
            .filter(|(k, _)| group.spec(k).is_some())
            .filter_map(|(k, v)| v.trim().parse::<f64>().ok().map(|v| (k, v)))
            .collect();
        if incoming.is_empty() {
            return false;
        }
        self.update(group, incoming);
        true
    }

    pub fn quadratic(&self) -> Quadratic {
        let set = self.get_or_default(ParamGroup::Quadratic);
        let [a, b, c] = values_of(&set, &QUADRATIC_PARAMS);
        Quadratic { a, b, c }
    }

    pub fn transform(&self) -> Transform {
        let set = self.get_or_default(ParamGroup::Transform);
        let [a, b, c, d] = values_of(&set, &TRANSFORM_PARAMS);
        Transform { a, b, c, d }
    }

    pub fn base_function(&self, kind: BaseKind) -> BaseFunction {
        let set = self.get_or_default(ParamGroup::Base(kind));
        match kind {
            BaseKind::Linear => {
                let [m, b] = values_of(&set, &LINEAR_PARAMS);
                BaseFunction::Linear { m, b }
            }
            BaseKind::Quadratic => {
                let [a, b, c] = values_of(&set, &QUADRATIC_BASE_PARAMS);
                BaseFunction::Quadratic { a, b, c }
            }
            BaseKind::Cubic => {
                let [a, b, c, d] = values_of(&set, &CUBIC_PARAMS);
                BaseFunction::Cubic { a, b, c, d }
            }
        }
    }
}

fn values_of<const N: usize>(set: &ParameterSet, specs: &[ParamSpec; N]) -> [f64; N] {
    std::array::from_fn(|i| set.value(&specs[i]))
}
