use app_shell::{DemoId, ParamGroup, ParameterSet, ParameterStore, SessionState};
use chart_render::{palette, render_svg, ChartSpec, RenderError, Trace};
use fn_core::{
    BaseFunction, BaseKind, Quadratic, SampleSeries, Transform, QUADRATIC_DOMAIN,
    TRANSFORM_DOMAIN,
};
use serde::Serialize;

pub fn quadratic_series(q: &Quadratic) -> SampleSeries {
    SampleSeries::sample(&QUADRATIC_DOMAIN, q)
}

/// Base series `f` and transformed series `g` over the same domain.
pub fn transformation_series(
    base: &BaseFunction,
    transform: &Transform,
) -> (SampleSeries, SampleSeries) {
    (
        SampleSeries::sample(&TRANSFORM_DOMAIN, base),
        SampleSeries::sample(&TRANSFORM_DOMAIN, &transform.of(base)),
    )
}

/// Everything one re-run of a demo produces, detached from the session so
/// the chart can be drawn after the session lock is released.
#[derive(Debug, Clone)]
pub struct DemoFrame {
    pub demo: DemoId,
    pub base_kind: Option<BaseKind>,
    /// Parameter sets shown by the demo's widgets, in display order.
    pub groups: Vec<(ParamGroup, ParameterSet)>,
    pub formulas: Vec<String>,
    pub traces: Vec<Trace>,
    pub chart: ChartSpec,
}

impl DemoFrame {
    pub fn build(demo: DemoId, state: &SessionState) -> Self {
        match demo {
            DemoId::Quadratic => quadratic_frame(state.store()),
            DemoId::Transformation => transformation_frame(state.base_kind(), state.store()),
        }
    }

    pub fn params(&self, group: ParamGroup) -> ParameterSet {
        self.groups
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, set)| set.clone())
            .unwrap_or_else(|| group.defaults())
    }

    pub fn render_chart(&self) -> Result<String, RenderError> {
        render_svg(&self.chart, &self.traces)
    }

    pub fn payload(&self) -> SeriesPayload {
        SeriesPayload {
            demo: self.demo,
            kind: self.base_kind,
            params: self
                .groups
                .iter()
                .flat_map(|(_, set)| set.iter())
                .collect(),
            series: self
                .traces
                .iter()
                .map(|t| NamedSeries {
                    name: t.name.clone(),
                    series: t.series.clone(),
                })
                .collect(),
        }
    }
}

pub fn quadratic_frame(store: &ParameterStore) -> DemoFrame {
    let q = store.quadratic();
    let label = q.label();
    DemoFrame {
        demo: DemoId::Quadratic,
        base_kind: None,
        groups: vec![(
            ParamGroup::Quadratic,
            store.get_or_default(ParamGroup::Quadratic),
        )],
        formulas: vec![label.clone()],
        traces: vec![Trace::new(
            label.clone(),
            quadratic_series(&q),
            palette::LINE_BLUE,
        )],
        chart: ChartSpec::quadratic(vec![label]),
    }
}

pub fn transformation_frame(kind: BaseKind, store: &ParameterStore) -> DemoFrame {
    let base = store.base_function(kind);
    let transform = store.transform();
    let (f, g) = transformation_series(&base, &transform);
    let f_label = format!("f(x) = {}", base.label());
    let g_label = format!("g(x) = {}", transform.label());
    let base_group = ParamGroup::Base(kind);
    DemoFrame {
        demo: DemoId::Transformation,
        base_kind: Some(kind),
        groups: vec![
            (base_group, store.get_or_default(base_group)),
            (
                ParamGroup::Transform,
                store.get_or_default(ParamGroup::Transform),
            ),
        ],
        formulas: vec![f_label.clone(), g_label.clone()],
        traces: vec![
            Trace::new(f_label.clone(), f, palette::LINE_BLUE),
            Trace::new(g_label.clone(), g, palette::LINE_RED),
        ],
        chart: ChartSpec::transformation(vec![f_label, g_label]),
    }
}

/// JSON body of `/api/demos/<slug>/series`.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesPayload {
    pub demo: DemoId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<BaseKind>,
    pub params: ParameterSet,
    pub series: Vec<NamedSeries>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedSeries {
    pub name: String,
    #[serde(flatten)]
    pub series: SampleSeries,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_quadratic_frame_is_x_squared() {
        let frame = DemoFrame::build(DemoId::Quadratic, &SessionState::default());
        assert_eq!(frame.formulas, vec!["f(x) = 1.00x² + 0.00x + 0.00"]);
        assert_eq!(frame.traces.len(), 1);
        let series = &frame.traces[0].series;
        assert_eq!(series.len(), 500);
        assert_eq!(series.first().map(|s| (s.x, s.y)), Some((-50.0, 2500.0)));
    }

    #[test]
    fn identity_transformation_overlays_base() {
        let mut state = SessionState::default();
        state.set_base_kind(BaseKind::Cubic);
        state
            .store_mut()
            .merge_form(ParamGroup::Base(BaseKind::Cubic), [("cubic_d", "2")]);
        let frame = DemoFrame::build(DemoId::Transformation, &state);
        assert_eq!(frame.traces.len(), 2);
        assert_eq!(frame.traces[0].series, frame.traces[1].series);
        assert_eq!(frame.formulas[0], "f(x) = 1.0x³ + 0.0x² + 0.0x + 2.0");
        assert_eq!(frame.formulas[1], "g(x) = f(x)");
        assert_eq!(frame.base_kind, Some(BaseKind::Cubic));
    }

    #[test]
    fn transformation_frame_reflects_store() {
        let mut store = ParameterStore::new();
        store.merge_form(
            ParamGroup::Transform,
            [("a_trans", "2"), ("d_trans", "-1.5")],
        );
        let frame = transformation_frame(BaseKind::Linear, &store);
        assert_eq!(frame.formulas[1], "g(x) = 2.0 · f(x) - 1.5");
        let g = &frame.traces[1].series;
        // g(x) = 2x - 1.5 at x = 10
        assert_eq!(g.last().map(|s| s.y), Some(18.5));
        assert_eq!(frame.params(ParamGroup::Transform).get("a_trans"), Some(2.0));
    }

    #[test]
    fn payload_lists_params_and_named_series() {
        let frame = quadratic_frame(&ParameterStore::new());
        let json = serde_json::to_value(frame.payload()).unwrap();
        assert_eq!(json["demo"], "quadratic");
        assert!(json.get("kind").is_none());
        assert_eq!(json["params"]["a"], 1.0);
        assert_eq!(json["series"][0]["name"], "f(x) = 1.00x² + 0.00x + 0.00");
        assert_eq!(json["series"][0]["points"].as_array().map(Vec::len), Some(500));

        let frame = transformation_frame(BaseKind::Quadratic, &ParameterStore::new());
        let json = serde_json::to_value(frame.payload()).unwrap();
        assert_eq!(json["kind"], "Quadratic");
        assert_eq!(json["params"]["quad_a"], 1.0);
        assert_eq!(json["params"]["b_trans"], 1.0);
        assert_eq!(json["series"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn chart_renders_for_both_demos() {
        let state = SessionState::default();
        for demo in DemoId::ALL {
            let svg = DemoFrame::build(demo, &state).render_chart().unwrap();
            assert!(svg.contains("<svg"));
        }
    }
}
