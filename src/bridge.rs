// ---------------------------------------------------------------------------
// Sandbox bridge: instrumentation injected into every rendered document, and
// the message protocol spoken across the sandbox boundary.
//
// The rendered document runs in an isolated frame; the only channel back to
// the host is postMessage. Two scripts are spliced into the document head:
// a console patch that mirrors all console output (plus uncaught errors and
// unhandled rejections) to the host, and an element selector that lets the
// host point at DOM nodes by CSS selector.
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token replaced with the surface generation when the scripts are spliced
/// into a document. Sandbox messages echo the generation back so the host
/// can drop events from frames that have since been re-rendered.
const GENERATION_TOKEN: &str = "__PREVIEW_GENERATION__";

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Console severity as reported by the sandbox. Unknown levels collapse to
/// `log`, mirroring the patch's behavior for nonstandard console methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    #[serde(other)]
    Log,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Log => "log",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// A console line captured from the sandbox, timestamped on receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMessage {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// An element picked with the selector tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedElement {
    pub selector: String,
    pub text: String,
}

/// Message posted from the sandbox to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SandboxMessage {
    #[serde(rename = "console")]
    Console { level: LogLevel, message: String },
    #[serde(rename = "element-selected")]
    ElementSelected { selector: String, text: String },
}

/// Message posted from the host into the sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostMessage {
    #[serde(rename = "toggle-selector")]
    ToggleSelector { enabled: bool },
    #[serde(rename = "clear-selection")]
    ClearSelection,
}

// ---------------------------------------------------------------------------
// Injected scripts
// ---------------------------------------------------------------------------

const CONSOLE_SCRIPT: &str = r##"
        const hostGeneration = __PREVIEW_GENERATION__;
        const originalConsole = { ...window.console };
        const serialize = (arg) => {
            if (arg instanceof Error) {
                return `Error: ${arg.message}\n${arg.stack}`;
            }
            if (typeof arg === 'function') {
                return `[Function: ${arg.name || 'anonymous'}]`;
            }
            if (typeof arg === 'undefined') return 'undefined';
            if (arg === null) return 'null';
            if (typeof arg === 'object') {
                try {
                    const seen = new WeakSet();
                    return JSON.stringify(arg, (key, value) => {
                        if (typeof value === 'object' && value !== null) {
                            if (seen.has(value)) return '[Circular]';
                            seen.add(value);
                        }
                        return value;
                    }, 2);
                } catch (e) {
                    return '[Unserializable Object]';
                }
            }
            return String(arg);
        };

        Object.keys(originalConsole).forEach(level => {
            window.console[level] = (...args) => {
                window.parent.postMessage({
                    type: 'console',
                    level: level,
                    message: args.map(serialize).join(' '),
                    generation: hostGeneration,
                }, '*');
                originalConsole[level].apply(window.console, args);
            };
        });

        const showErrorOverlay = (error) => {
            if (document.getElementById('qstudio-error-overlay')) return;
            const rootEl = document.getElementById('root') || document.getElementById('app') || document.body;
            rootEl.innerHTML = '';

            const overlay = document.createElement('div');
            overlay.id = 'qstudio-error-overlay';
            overlay.style.cssText = 'position:fixed;inset:0;background:rgba(10,0,0,0.85);z-index:9999;display:flex;align-items:center;justify-content:center;padding:1rem;font-family:"Fira Code",monospace;';

            const container = document.createElement('div');
            container.style.cssText = 'background:#1E1E1E;color:#ef4444;border:1px solid #ef4444;border-radius:8px;padding:1.5rem 2rem;max-width:90%;width:900px;max-height:90vh;overflow-y:auto;';

            const title = document.createElement('h3');
            title.style.cssText = 'margin:0 0 1rem;font-size:1.5rem;font-weight:600;color:#f87171;';
            title.textContent = error.message;

            const stack = document.createElement('pre');
            stack.style.cssText = 'font-size:0.9rem;color:#d1d5db;white-space:pre-wrap;word-break:break-word;';
            stack.textContent = error.stack || 'No stack trace available.';

            container.appendChild(title);
            container.appendChild(stack);
            overlay.appendChild(container);
            document.body.appendChild(overlay);
        };

        window.addEventListener('error', (event) => {
            const error = event.error || new Error(event.message);
            showErrorOverlay(error);
            window.parent.postMessage({
                type: 'console',
                level: 'error',
                message: `Uncaught Error: ${error.message}${error.stack ? '\n' + error.stack : ''}`,
                generation: hostGeneration,
            }, '*');
        });

        window.addEventListener('unhandledrejection', event => {
            const error = event.reason instanceof Error ? event.reason : new Error(String(event.reason));
            showErrorOverlay(error);
            window.parent.postMessage({
                type: 'console',
                level: 'error',
                message: `Unhandled Promise Rejection: ${error.message}`,
                generation: hostGeneration,
            }, '*');
        });
"##;

const SELECTOR_SCRIPT: &str = r##"
        let selectorActive = false;
        let transientHighlightedElement = null;
        let permanentHighlightedElement = null;

        const transientHighlightStyle = '2px solid #3b82f6';
        const permanentHighlightStyle = '3px solid #f59e0b';

        const getSelector = (el) => {
            if (!el || !(el instanceof Element)) return '';
            let path = [];
            while (el.nodeType === Node.ELEMENT_NODE) {
                let selector = el.nodeName.toLowerCase();
                if (el.id) {
                    selector += '#' + el.id.trim().replace(/ /g, '\\ ');
                    path.unshift(selector);
                    break;
                } else {
                    let sib = el, nth = 1;
                    while (sib = sib.previousElementSibling) {
                        if (sib.nodeName.toLowerCase() === selector) nth++;
                    }
                    if (nth !== 1) selector += ":nth-of-type("+nth+")";
                }
                path.unshift(selector);
                el = el.parentNode;
            }
            return path.join(" > ");
        };

        const clearHighlights = () => {
            if (transientHighlightedElement) {
                transientHighlightedElement.style.outline = '';
                transientHighlightedElement = null;
            }
            if (permanentHighlightedElement) {
                permanentHighlightedElement.style.outline = '';
                permanentHighlightedElement = null;
            }
        };

        window.addEventListener('message', (event) => {
            if (event.data.type === 'toggle-selector') {
                selectorActive = event.data.enabled;
                document.body.style.cursor = selectorActive ? 'crosshair' : 'default';
                if (!selectorActive) {
                    clearHighlights();
                }
            }
            if (event.data.type === 'clear-selection') {
                if (permanentHighlightedElement) {
                    permanentHighlightedElement.style.outline = '';
                    permanentHighlightedElement = null;
                }
            }
        });

        document.addEventListener('mouseover', (e) => {
            if (!selectorActive || e.target === permanentHighlightedElement) return;
            if (e.target !== transientHighlightedElement) {
                if (transientHighlightedElement) transientHighlightedElement.style.outline = '';
                transientHighlightedElement = e.target;
                transientHighlightedElement.style.outline = transientHighlightStyle;
                transientHighlightedElement.style.outlineOffset = '-2px';
            }
        }, true);

        document.addEventListener('mouseout', (e) => {
            if (!selectorActive || !transientHighlightedElement) return;
            transientHighlightedElement.style.outline = '';
            transientHighlightedElement = null;
        }, true);

        document.addEventListener('click', (e) => {
            if (!selectorActive) return;
            e.preventDefault();
            e.stopPropagation();

            const target = e.target;
            const selector = getSelector(target);
            const textContent = target.textContent || '';

            window.parent.postMessage({ type: 'element-selected', selector: selector, text: textContent.trim(), generation: hostGeneration }, '*');

            clearHighlights();
            permanentHighlightedElement = target;
            permanentHighlightedElement.style.outline = permanentHighlightStyle;
            permanentHighlightedElement.style.outlineOffset = '-3px';

            selectorActive = false;
            document.body.style.cursor = 'default';
        }, true);
"##;

/// Splices the console and selector scripts into a rendered document,
/// stamping it with `generation`. Injection goes just before `</head>` so
/// the console patch is live before any user script runs; documents without
/// a head (raw html_css_js passthrough) get the scripts appended instead.
pub fn instrument(document: &str, generation: u64) -> String {
    let script = format!("<script>{CONSOLE_SCRIPT}\n{SELECTOR_SCRIPT}</script>")
        .replace(GENERATION_TOKEN, &generation.to_string());

    if document.contains("</head>") {
        document.replacen("</head>", &format!("{script}</head>"), 1)
    } else {
        let mut instrumented = document.to_string();
        instrumented.push_str(&script);
        instrumented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_are_spliced_before_head_close() {
        let doc = instrument("<html><head></head><body></body></html>", 3);
        let script_pos = doc.find("originalConsole").unwrap();
        let head_pos = doc.find("</head>").unwrap();
        assert!(script_pos < head_pos);
        assert!(doc.contains("getSelector"));
    }

    #[test]
    fn headless_documents_get_scripts_appended() {
        let doc = instrument("<p>bare</p>", 1);
        assert!(doc.starts_with("<p>bare</p>"));
        assert!(doc.contains("originalConsole"));
        assert!(doc.ends_with("</script>"));
    }

    #[test]
    fn generation_is_stamped_into_the_scripts() {
        let doc = instrument("<head></head>", 42);
        assert!(doc.contains("const hostGeneration = 42;"));
        assert!(!doc.contains(GENERATION_TOKEN));
    }

    #[test]
    fn only_the_first_head_close_is_targeted() {
        let doc = instrument("<head></head><iframe srcdoc=\"</head>\"></iframe>", 1);
        assert_eq!(doc.matches("const hostGeneration").count(), 1);
        assert!(doc.ends_with("<iframe srcdoc=\"</head>\"></iframe>"));
    }

    #[test]
    fn sandbox_messages_round_trip_the_wire_format() {
        let msg: SandboxMessage =
            serde_json::from_str(r#"{"type":"console","level":"error","message":"boom"}"#).unwrap();
        match msg {
            SandboxMessage::Console { level, message } => {
                assert_eq!(level, LogLevel::Error);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected message: {other:?}"),
        }

        let msg: SandboxMessage = serde_json::from_str(
            r#"{"type":"element-selected","selector":"div#app > p","text":"hi"}"#,
        )
        .unwrap();
        match msg {
            SandboxMessage::ElementSelected { selector, text } => {
                assert_eq!(selector, "div#app > p");
                assert_eq!(text, "hi");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn unknown_console_levels_collapse_to_log() {
        let level: LogLevel = serde_json::from_str(r#""table""#).unwrap();
        assert_eq!(level, LogLevel::Log);
        assert_eq!(level.as_str(), "log");
    }

    #[test]
    fn host_messages_serialize_with_kebab_case_tags() {
        let json = serde_json::to_string(&HostMessage::ToggleSelector { enabled: true }).unwrap();
        assert_eq!(json, r#"{"type":"toggle-selector","enabled":true}"#);
        let json = serde_json::to_string(&HostMessage::ClearSelection).unwrap();
        assert_eq!(json, r#"{"type":"clear-selection"}"#);
    }
}
