pub mod app;
pub mod demos;
pub mod theme;

pub use app::{App, NotImplemented};
pub use demos::{DemoFrame, SeriesPayload};

use leptos::*;

pub const PAGE_TITLE: &str = "Math Visualizations";

/// Wraps a rendered body in the HTML document shell. `stylesheet` is inlined
/// after the built-in theme so it can override it.
pub fn render_document(body: &str, stylesheet: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\"/>\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>\n\
         <title>{PAGE_TITLE}</title>\n\
         <style>{css}</style>\n\
         <style>{stylesheet}</style>\n\
         </head>\n<body>{body}</body>\n</html>\n",
        css = theme::GLOBAL_CSS,
    )
}

/// Full page for one demo re-run.
pub fn render_demo_page(frame: DemoFrame, chart_svg: String, stylesheet: &str) -> String {
    let body = leptos::ssr::render_to_string(move || view! { <App frame=frame chart_svg=chart_svg/> });
    render_document(&body, stylesheet)
}

pub fn render_not_implemented_page(name: &str, stylesheet: &str) -> String {
    let name = name.to_string();
    let body = leptos::ssr::render_to_string(move || view! { <NotImplemented name=name/> });
    render_document(&body, stylesheet)
}
