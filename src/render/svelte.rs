// ---------------------------------------------------------------------------
// svelte_cdn — component compiled at preview load time, in the sandbox.
// ---------------------------------------------------------------------------

use super::base_document;
use crate::tree::FolderNode;

const SVELTE_COMPILER_CDN: &str = "https://unpkg.com/svelte@3/compiler.js";

/// Ships the raw `App.svelte` source into the document as a string and runs
/// the browser compiler on load (DOM target, ESM output). The compiled
/// module's default export is rewritten into a live instantiation against
/// the root element; compile errors are forwarded to the host as structured
/// runtime errors.
pub fn document(tree: &FolderNode) -> String {
    let Some(svelte_file) = tree.find_file_named("App.svelte") else {
        return base_document("", "<h2>App.svelte not found</h2>");
    };

    let source = svelte_file.content.replace('`', "\\`");
    let head = format!(
        r#"<script src="{SVELTE_COMPILER_CDN}"></script>
    <script>
        window.addEventListener('load', () => {{
            const svelteCode = `{source}`;
            try {{
                const {{ js }} = svelte.compile(svelteCode, {{
                    filename: 'App.svelte',
                    format: 'esm',
                    generate: 'dom'
                }});

                const scriptEl = document.createElement('script');
                scriptEl.setAttribute('type', 'module');
                scriptEl.innerHTML = js.code.replace('export default Component', 'new Component({{ target: document.getElementById("app") }});');
                document.body.appendChild(scriptEl);

            }} catch(e) {{
                window.parent.postMessage({{ type: 'console', level: 'error', message: `Svelte Compile Error: ${{e.message}}` }}, '*');
            }}
        }});
    </script>"#
    );
    base_document(&head, r#"<div id="app"></div>"#)
}
