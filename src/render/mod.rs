// ---------------------------------------------------------------------------
// Preview rendering — turns a file tree into one self-contained HTML
// document per environment family. No bundler, no server: component
// frameworks are compiled in the sandbox via CDN tooling, backend
// environments are simulated.
// ---------------------------------------------------------------------------

mod backend;
mod react;
mod svelte;
mod vue;
mod web;

use crate::detect::PreviewEnvironment;
use crate::tree::FolderNode;

/// Synthesize the renderable document for a concrete environment. Total:
/// unknown or non-concrete environments degrade to a placeholder shell, and
/// every strategy falls back to an inline placeholder when its expected
/// files are missing. Shell-based strategies always emit a `</head>` tag so
/// that instrumentation can be spliced in downstream; html_css_js passes the
/// user's HTML through untouched.
pub fn render(environment: PreviewEnvironment, tree: &FolderNode) -> String {
    match environment {
        PreviewEnvironment::ReactBabel => react::document(tree),
        PreviewEnvironment::HtmlCssJs => web::document(tree),
        PreviewEnvironment::VueCdn => vue::document(tree),
        PreviewEnvironment::SvelteCdn => svelte::document(tree),
        PreviewEnvironment::Nodejs => backend::nodejs_document(tree),
        PreviewEnvironment::Python => backend::python_document(tree),
        PreviewEnvironment::Go => backend::go_document(tree),
        PreviewEnvironment::Java => backend::java_document(tree),
        PreviewEnvironment::Auto => base_document("", "<h2>Unsupported Environment</h2>"),
    }
}

/// Shared HTML shell: UTF-8, viewport meta, Tailwind from CDN, the Fira Code
/// web font, and a loading placeholder shown while the mount point is empty.
pub(crate) fn base_document(head_content: &str, body_content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <script src="https://cdn.tailwindcss.com"></script>
    <link rel="preconnect" href="https://fonts.googleapis.com" />
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin />
    <link href="https://fonts.googleapis.com/css2?family=Fira+Code&display=swap" rel="stylesheet" />
    <style>
        body {{ background-color: #ffffff; color: #111827; padding: 0; margin: 0; }}
        #root:empty::before, #app:empty::before {{
            content: 'Loading Preview...';
            position: absolute;
            top: 50%; left: 50%;
            transform: translate(-50%, -50%);
            color: #9ca3af;
            font-family: sans-serif;
        }}
    </style>
    {head_content}
</head>
<body>
    {body_content}
</body>
</html>
"#
    )
}

/// Keep inlined user code from terminating the surrounding script tag.
pub(crate) fn escape_script(script: &str) -> String {
    script.replace("</script>", "<\\/script>")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
