// ---------------------------------------------------------------------------
// react_babel — in-browser JSX/TypeScript compilation via Babel standalone.
// ---------------------------------------------------------------------------

use super::{base_document, escape_script};
use crate::tree::FolderNode;

const REACT_CDN: &str = "https://unpkg.com/react@18/umd/react.development.js";
const REACT_DOM_CDN: &str = "https://unpkg.com/react-dom@18/umd/react-dom.development.js";
const BABEL_CDN: &str = "https://unpkg.com/@babel/standalone/babel.min.js";

/// The component must live at `src/App.tsx` and be a global function
/// literally named `App` — there is no module system in the sandbox. Raw
/// source is shipped into a `text/babel` script and compiled at load time;
/// any error during evaluation or mount is forwarded to the host instead of
/// crashing silently.
pub fn document(tree: &FolderNode) -> String {
    let code = tree
        .file_at("src/App.tsx")
        .unwrap_or("// src/App.tsx not found");

    let render_script = format!(
        r#"
try {{
    {code}
    const rootEl = document.getElementById('root');
    if (typeof App === 'undefined') throw new ReferenceError("Component 'App' is not defined in src/App.tsx.");
    const root = ReactDOM.createRoot(rootEl);
    root.render(React.createElement(App));
}} catch (err) {{
    window.parent.postMessage({{ type: 'console', level: 'error', message: `Render Error: ${{err.message}}${{err.stack ? '\n' + err.stack : ''}}` }}, '*');
}}
"#
    );

    let head = format!(
        r#"<script crossorigin src="{REACT_CDN}"></script>
    <script crossorigin src="{REACT_DOM_CDN}"></script>
    <script crossorigin src="{BABEL_CDN}"></script>"#
    );
    let body = format!(
        r#"<div id="root"></div>
    <script type="text/babel" data-presets="react,typescript">{}</script>"#,
        escape_script(&render_script)
    );
    base_document(&head, &body)
}

#[cfg(test)]
mod tests {
    use super::super::tests::tree_of;
    use super::*;

    #[test]
    fn document_embeds_literal_component_source() {
        let tree = tree_of(&[("src/App.tsx", "function App(){return null}")]);
        let doc = document(&tree);
        assert!(doc.contains("function App(){return null}"));
        assert!(doc.contains(REACT_CDN));
        assert!(doc.contains(REACT_DOM_CDN));
        assert!(doc.contains(BABEL_CDN));
        assert!(doc.contains(r#"data-presets="react,typescript""#));
    }

    #[test]
    fn missing_component_degrades_to_a_placeholder_comment() {
        let doc = document(&FolderNode::default());
        assert!(doc.contains("// src/App.tsx not found"));
    }

    #[test]
    fn component_must_be_found_at_the_exact_path() {
        // Not src/App.tsx, so the react strategy ignores it.
        let tree = tree_of(&[("App.tsx", "function App(){return 1}")]);
        let doc = document(&tree);
        assert!(doc.contains("// src/App.tsx not found"));
    }

    #[test]
    fn embedded_closing_script_tags_are_escaped() {
        let tree = tree_of(&[("src/App.tsx", "const s = '</script>';")]);
        let doc = document(&tree);
        assert!(doc.contains("<\\/script>"));
    }
}
