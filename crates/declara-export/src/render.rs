use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ExportError;

const PROSE_TEMPLATE_NAME: &str = "prose";

/// Expand the signature-page prose against composer settings.
///
/// The prose is fixed at compile time with a handful of placeholders
/// (clinic name, patient name), so a one-off Tera instance per expansion is
/// fine. Failures surface as export errors: a bad template must not take
/// the submission flow down.
pub fn render_prose<C: Serialize>(template: &str, context: &C) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(PROSE_TEMPLATE_NAME, template)
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let context = Context::from_serialize(context)
        .map_err(|e| ExportError::TemplateRender(e.to_string()))?;

    Ok(tera.render(PROSE_TEMPLATE_NAME, &context)?)
}
