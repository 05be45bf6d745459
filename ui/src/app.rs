use crate::demos::DemoFrame;
use app_shell::{DemoId, ParamGroup, ParamSpec, ParameterSet};
use fn_core::BaseKind;
use leptos::*;

/// Any widget change re-runs the page. `submit()` bypasses step validation,
/// which fails values like 0.15 on a step-0.15 input starting at -10.
const SUBMIT_ON_CHANGE: &str = "this.form.submit()";

pub const TRANSFORM_EXPLANATIONS: [(&str, &str); 4] = [
    (
        "Vertical Stretch/Compression (a)",
        "This parameter scales the output of the function. If |a| > 1, the graph stretches \
         vertically, making it narrower. If 0 < |a| < 1, the graph compresses vertically, \
         making it wider. If a is negative, it also reflects the graph across the x-axis.",
    ),
    (
        "Horizontal Stretch/Compression (b)",
        "This parameter scales the input of the function. If |b| > 1, the graph compresses \
         horizontally, making it narrower. If 0 < |b| < 1, the graph stretches horizontally, \
         making it wider. If b is negative, it also reflects the graph across the y-axis.",
    ),
    (
        "Horizontal Shift (c)",
        "This parameter shifts the graph horizontally. If c is positive, the graph shifts to \
         the left by c units. If c is negative, the graph shifts to the right by |c| units.",
    ),
    (
        "Vertical Shift (d)",
        "This parameter shifts the graph vertically. If d is positive, the graph shifts up by \
         d units. If d is negative, the graph shifts down by |d| units.",
    ),
];

#[component]
pub fn App(frame: DemoFrame, chart_svg: String) -> impl IntoView {
    let active = frame.demo;
    let body = match active {
        DemoId::Quadratic => {
            view! { <QuadraticDemo frame=frame chart_svg=chart_svg/> }.into_view()
        }
        DemoId::Transformation => {
            view! { <TransformationDemo frame=frame chart_svg=chart_svg/> }.into_view()
        }
    };

    view! {
        <div class="app-shell">
            <Sidebar active=Some(active)/>
            <main class="main">
                <h1>{active.heading()}</h1>
                {body}
            </main>
        </div>
    }
}

/// Shown for a demo name that has no implementation.
#[component]
pub fn NotImplemented(name: String) -> impl IntoView {
    view! {
        <div class="app-shell">
            <Sidebar active=None/>
            <main class="main">
                <h2>{format!("{name} Demo")}</h2>
                <p>"This demo is not implemented yet."</p>
            </main>
        </div>
    }
}

#[component]
pub fn Sidebar(active: Option<DemoId>) -> impl IntoView {
    let options = DemoId::ALL
        .into_iter()
        .map(|demo| {
            view! {
                <label>
                    <input
                        type="radio"
                        name="demo"
                        value=demo.slug()
                        checked={active == Some(demo)}
                        onchange=SUBMIT_ON_CHANGE
                    />
                    {demo.title()}
                </label>
            }
        })
        .collect_view();

    view! {
        <aside class="sidebar">
            <p class="sidebar-title">"TOPICS"</p>
            <details open=true>
                <summary>"Pure Mathematics"</summary>
                <form method="get" action="/">{options}</form>
            </details>
            <div class="sidebar-separator"></div>
        </aside>
    }
}

#[component]
pub fn QuadraticDemo(frame: DemoFrame, chart_svg: String) -> impl IntoView {
    let values = frame.params(ParamGroup::Quadratic);

    view! {
        <h2>"Explore the Quadratic Function: f(x) = ax² + bx + c"</h2>
        <ResetButton demo=DemoId::Quadratic/>
        <form method="get" action="/">
            <input type="hidden" name="demo" value=DemoId::Quadratic.slug()/>
            <div class="columns">{sliders(ParamGroup::Quadratic, &values, true)}</div>
        </form>
        <div class="chart" inner_html=chart_svg></div>
    }
}

#[component]
pub fn TransformationDemo(frame: DemoFrame, chart_svg: String) -> impl IntoView {
    let kind = frame.base_kind.unwrap_or_default();
    let base_group = ParamGroup::Base(kind);
    let base_values = frame.params(base_group);
    let transform_values = frame.params(ParamGroup::Transform);
    let f_label = frame.formulas.first().cloned().unwrap_or_default();
    let g_label = frame.formulas.get(1).cloned().unwrap_or_default();
    let slug = DemoId::Transformation.slug();

    let kind_options = BaseKind::ALL
        .into_iter()
        .map(|k| view! { <option value=k.name() selected={k == kind}>{k.name()}</option> })
        .collect_view();
    let number_fields = base_group
        .specs()
        .iter()
        .map(|spec| view! { <NumberField spec=spec value=base_values.value(spec)/> })
        .collect_view();

    view! {
        <h2>"Base Function Parameters"</h2>
        <form method="get" action="/">
            <input type="hidden" name="demo" value=slug/>
            <div class="field">
                <label for="base-kind">"Select base function"</label>
                <select id="base-kind" name="kind" onchange=SUBMIT_ON_CHANGE>
                    {kind_options}
                </select>
            </div>
            <div class="columns">{number_fields}</div>
        </form>
        <div class="big-math-label">{f_label}</div>
        <hr/>
        <h2>"Transformation Parameters"</h2>
        <ResetButton demo=DemoId::Transformation/>
        <form method="get" action="/">
            <input type="hidden" name="demo" value=slug/>
            <div class="columns">{sliders(ParamGroup::Transform, &transform_values, false)}</div>
        </form>
        <div class="big-math-label">{g_label}</div>
        <hr/>
        <div class="chart" inner_html=chart_svg></div>
        <Explanations/>
    }
}

fn sliders(group: ParamGroup, values: &ParameterSet, big_title: bool) -> View {
    group
        .specs()
        .iter()
        .map(|spec| view! { <SliderField spec=spec value=values.value(spec) big_title=big_title/> })
        .collect_view()
}

#[component]
pub fn SliderField(
    spec: &'static ParamSpec,
    value: f64,
    /// Render the label as a large heading above the slider.
    #[prop(optional)]
    big_title: bool,
) -> impl IntoView {
    let id = format!("param-{}", spec.key);
    let title = if big_title {
        view! { <p class="big-title-slider">{spec.label}</p> }.into_view()
    } else {
        view! { <label for=id.clone()>{spec.label}</label> }.into_view()
    };

    view! {
        <div class="field">
            {title}
            <input
                type="range"
                id=id
                name=spec.key
                min=spec.min.to_string()
                max=spec.max.to_string()
                step=spec.step.to_string()
                value=value.to_string()
                onchange=SUBMIT_ON_CHANGE
            />
            <span class="value">{spec.format_value(value)}</span>
        </div>
    }
}

/// No `min` attribute: the spinner steps from the current value. Out-of-range
/// entries are clamped server side.
#[component]
pub fn NumberField(spec: &'static ParamSpec, value: f64) -> impl IntoView {
    let id = format!("param-{}", spec.key);

    view! {
        <div class="field">
            <label for=id.clone()>{spec.label}</label>
            <input
                type="number"
                id=id
                name=spec.key
                max=spec.max.to_string()
                step=spec.step.to_string()
                value=value.to_string()
                onchange=SUBMIT_ON_CHANGE
            />
        </div>
    }
}

#[component]
pub fn ResetButton(demo: DemoId) -> impl IntoView {
    view! {
        <form method="post" action="/reset" class="reset-form">
            <input type="hidden" name="demo" value=demo.slug()/>
            <button type="submit">{demo.reset_label()}</button>
        </form>
    }
}

#[component]
pub fn Explanations() -> impl IntoView {
    let items = TRANSFORM_EXPLANATIONS
        .into_iter()
        .map(|(term, text)| {
            view! {
                <li>
                    <strong>{term}</strong>
                    ": "
                    {text}
                </li>
            }
        })
        .collect_view();

    view! {
        <section class="explanations">
            <h3>"Transformation Explanations:"</h3>
            <ul>{items}</ul>
            <p>"The combined transformation is: g(x) = a * f(b(x + c)) + d"</p>
        </section>
    }
}
