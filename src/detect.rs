// ---------------------------------------------------------------------------
// Environment detection — infers which preview strategy applies to a tree.
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::tree::FolderNode;

/// A named strategy for turning a file tree into a renderable document.
/// `Auto` is a UI-level request, resolved to a concrete environment by
/// [`detect`] before rendering; it is never itself a render target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewEnvironment {
    #[default]
    Auto,
    ReactBabel,
    HtmlCssJs,
    VueCdn,
    SvelteCdn,
    Nodejs,
    Python,
    Go,
    Java,
}

impl PreviewEnvironment {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::ReactBabel => "react_babel",
            Self::HtmlCssJs => "html_css_js",
            Self::VueCdn => "vue_cdn",
            Self::SvelteCdn => "svelte_cdn",
            Self::Nodejs => "nodejs",
            Self::Python => "python",
            Self::Go => "go",
            Self::Java => "java",
        }
    }
}

/// Explicit context for the preview pipeline, replacing what the host UI
/// used to pull from ambient browser storage: the user's environment
/// override and the installed extensions list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewConfig {
    pub environment: PreviewEnvironment,
    pub installed_extensions: Vec<String>,
}

/// Ordered priority scan: the first marker family with a hit wins, so e.g.
/// a tree holding both `go.mod` and `package.json` detects as Go. Markers are
/// matched by filename anywhere in the tree.
const MARKER_PRIORITY: &[(PreviewEnvironment, &[&str])] = &[
    (
        PreviewEnvironment::Java,
        &["pom.xml", "Main.java", "Application.java"],
    ),
    (PreviewEnvironment::Go, &["main.go", "go.mod"]),
    (
        PreviewEnvironment::Python,
        &["main.py", "app.py", "requirements.txt"],
    ),
    (
        PreviewEnvironment::Nodejs,
        &["server.js", "app.js", "package.json"],
    ),
    (PreviewEnvironment::VueCdn, &["App.vue"]),
    (PreviewEnvironment::SvelteCdn, &["App.svelte"]),
    (PreviewEnvironment::HtmlCssJs, &["index.html"]),
    (PreviewEnvironment::ReactBabel, &["App.tsx"]),
];

/// Deterministically resolve a tree to a concrete environment. Never returns
/// `Auto`; trees with no markers fall back to `ReactBabel`.
pub fn detect(tree: &FolderNode) -> PreviewEnvironment {
    for (environment, markers) in MARKER_PRIORITY {
        if markers
            .iter()
            .any(|name| tree.find_file_named(name).is_some())
        {
            return *environment;
        }
    }
    PreviewEnvironment::ReactBabel
}

/// The environment a render should actually use: the configured override,
/// or the detected one when the config says `Auto`.
pub fn effective_environment(config: &PreviewConfig, tree: &FolderNode) -> PreviewEnvironment {
    match config.environment {
        PreviewEnvironment::Auto => detect(tree),
        concrete => concrete,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
