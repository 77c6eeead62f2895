// ---------------------------------------------------------------------------
// vue_cdn — single-file components mounted against the CDN runtime.
// ---------------------------------------------------------------------------

use std::sync::LazyLock;

use regex::Regex;

use super::{base_document, escape_script};
use crate::tree::FolderNode;

const VUE_CDN: &str = "https://unpkg.com/vue@3/dist/vue.global.js";

// Deliberately lightweight SFC handling: a single top-level occurrence of
// each section tag, extracted by pattern. Nested or repeated same-named tags
// are not supported; the product scope does not warrant a real SFC compiler.
static TEMPLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<template>(.*?)</template>").expect("static regex"));
static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<script>(.*?)</script>").expect("static regex"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<style>(.*?)</style>").expect("static regex"));
static EXPORT_DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export default\s*\{").expect("static regex"));

fn section(re: &Regex, source: &str) -> Option<String> {
    re.captures(source)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Locates `App.vue` anywhere in the tree, splits it into template/script/
/// style sections, rewrites the script's default export into a plain options
/// object, attaches the template string, and mounts it with the CDN runtime.
pub fn document(tree: &FolderNode) -> String {
    let Some(vue_file) = tree.find_file_named("App.vue") else {
        return base_document("", "<h2>App.vue not found</h2>");
    };

    let template = section(&TEMPLATE_RE, &vue_file.content)
        .unwrap_or_else(|| "<div>Template not found</div>".to_string());
    let script = match section(&SCRIPT_RE, &vue_file.content) {
        Some(s) => EXPORT_DEFAULT_RE.replace(&s, "{").into_owned(),
        None => "{}".to_string(),
    };
    let style = section(&STYLE_RE, &vue_file.content).unwrap_or_default();

    let render_script = format!(
        r#"
const App = {script}
App.template = `{template}`;
Vue.createApp(App).mount('#app');
"#,
        template = template.replace('`', "\\`"),
    );

    let head = format!(
        r#"<script src="{VUE_CDN}"></script>
    <style>{style}</style>"#
    );
    let body = format!(
        r#"<div id="app"></div>
    <script>{}</script>"#,
        escape_script(&render_script)
    );
    base_document(&head, &body)
}
