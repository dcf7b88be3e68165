use async_graphql::{Context, Json, Object, Result, SimpleObject};
use serde_json::Value;

use crate::{api::load_form, template};

#[derive(Default)]
pub(super) struct TemplateQuery {}

/// A form exported as a reusable template.
#[derive(SimpleObject)]
struct Template {
    /// Suggested download name, `<slug>.template.json`.
    file_name: String,
    document: Json<Value>,
}

#[Object]
impl TemplateQuery {
    #[allow(clippy::unused_async)]
    async fn form_template(&self, ctx: &Context<'_>, form_id: i64) -> Result<Template> {
        let (form, _) = load_form(ctx, form_id)?;
        Ok(Template {
            file_name: template::template_file_name(&form.title),
            document: Json(template::to_template(&form)),
        })
    }

    /// Normalizes an uploaded template document into a well-formed form.
    #[allow(clippy::unused_async)]
    async fn normalize_template(&self, document: String) -> Result<Template> {
        let form = template::parse_template(&document).map_err(|_| "invalid template file")?;
        Ok(Template {
            file_name: template::template_file_name(&form.title),
            document: Json(template::to_template(&form)),
        })
    }
}
