use serde::Serialize;
use tera::{Context, Tera};

pub const PAGE_TEMPLATE: &str = "index.html";

/// Everything the landing page depends on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub result_message: String,
    pub authenticated: bool,
    pub authorization_url: String,
}

pub fn init_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(PAGE_TEMPLATE, include_str!("../../../templates/index.html"))?;
    Ok(tera)
}

pub fn render_page(tera: &Tera, view: &PageView) -> Result<String, tera::Error> {
    let context = Context::from_serialize(view)?;
    tera.render(PAGE_TEMPLATE, &context)
}
