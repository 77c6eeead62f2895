// ---------------------------------------------------------------------------
// html_css_js — static web projects, passed through with assets inlined.
// ---------------------------------------------------------------------------

use crate::tree::FolderNode;

/// `index.html`, `style.css` and `script.js` are located by filename
/// anywhere in the tree. The HTML is the document; CSS is inlined before
/// `</head>`, JS as a module script before `</body>`. Missing HTML degrades
/// to an inline placeholder, and missing head/body tags simply skip the
/// corresponding inline step.
pub fn document(tree: &FolderNode) -> String {
    let mut content = match tree.find_file_named("index.html") {
        Some(html) => html.content,
        None => r#"<div id="root">index.html not found</div>"#.to_string(),
    };

    if let Some(css) = tree.find_file_named("style.css") {
        content = content.replacen(
            "</head>",
            &format!("<style>{}</style></head>", css.content),
            1,
        );
    }
    if let Some(js) = tree.find_file_named("script.js") {
        content = content.replacen(
            "</body>",
            &format!(r#"<script type="module">{}</script></body>"#, js.content),
            1,
        );
    }

    content
}
