// ---------------------------------------------------------------------------
// Backend simulation: nodejs / python / go / java previews.
//
// No backend code is ever executed. The document shows a cosmetic terminal
// pane playing back a fixed boot sequence (install, build, serve, request)
// with small randomized delays, above a nested frame rendering the
// project's framework-conventional HTML entry point.
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::base_document;
use crate::tree::FolderNode;

#[derive(Debug, Clone, Serialize)]
struct LogLine {
    time: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    msg: &'static str,
}

const fn log(time: &'static str, kind: &'static str, msg: &'static str) -> LogLine {
    LogLine { time, kind, msg }
}

const TERMINAL_STYLE: &str = r#"<style>
        body { display: flex; flex-direction: column; height: 100vh; overflow: hidden; background: #111827; }

        .terminal-container {
            display: flex;
            flex-direction: column;
            height: 40%; /* initial height */
            min-height: 30px; /* header height */
            background: #000;
            overflow: hidden;
            flex-shrink: 0;
        }
        .terminal-header {
            background: #1f2937;
            padding: 0.25rem 0.75rem;
            font-family: sans-serif;
            font-size: 0.8rem;
            color: #9ca3af;
            display: flex;
            justify-content: space-between;
            align-items: center;
            flex-shrink: 0;
            height: 30px;
            box-sizing: border-box;
        }
        #toggle-terminal-btn {
            background: none;
            border: 1px solid #4b5563;
            color: #9ca3af;
            cursor: pointer;
            width: 20px;
            height: 20px;
            border-radius: 4px;
            font-weight: bold;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 0;
            line-height: 1;
        }
        #toggle-terminal-btn:hover { background: #374151; }

        .terminal {
            flex-grow: 1;
            overflow-y: auto;
            padding: 1rem;
            font-family: 'Fira Code', monospace;
            color: #d1d5db;
            background: #000;
        }
        .resizer {
            background: #374151;
            height: 6px;
            cursor: row-resize;
            flex-shrink: 0;
            transition: background-color 0.2s;
        }
        .resizer:hover { background: #4b5563; }

        .terminal-line { display: flex; gap: 1rem; font-size: 0.8rem; white-space: pre; transition: opacity 0.3s ease-out; }
        .time { color: #6b7280; }
        .type-INFO { color: #3b82f6; font-weight: bold; }
        .type-CMD { color: #a78bfa; }
        .type-OK { color: #22c55e; }
        .type-WARN { color: #f59e0b; }
        .type-REQ { color: #9ca3af; }
        .type-BUILD { color: #eab308; }

        .preview-pane { flex-grow: 1; display: flex; flex-direction: column; }
        .preview-header { padding: 0.5rem 1rem; background: #1f2937; color: #9ca3af; font-family: sans-serif; font-size: 0.8rem; border-bottom: 1px solid #374151; flex-shrink: 0; }
        .preview-content { flex-grow: 1; background: white; }
        .preview-content iframe { width: 100%; height: 100%; border: none; }
    </style>"#;

const TERMINAL_SCRIPT: &str = r#"<script>
        const terminalContainer = document.getElementById('terminal-container');
        const resizer = document.getElementById('resizer');
        const toggleBtn = document.getElementById('toggle-terminal-btn');
        const terminal = document.getElementById('terminal');

        // --- Resizing ---
        let isResizing = false;
        const handleMouseMove = (e) => {
            if (!isResizing) return;
            const newHeight = e.clientY;
            if (newHeight > 50 && newHeight < window.innerHeight - 100) {
                terminalContainer.style.height = newHeight + 'px';
            }
        };
        const stopResizing = () => {
            isResizing = false;
            document.removeEventListener('mousemove', handleMouseMove);
            document.removeEventListener('mouseup', stopResizing);
        };
        resizer.addEventListener('mousedown', (e) => {
            e.preventDefault();
            isResizing = true;
            document.addEventListener('mousemove', handleMouseMove);
            document.addEventListener('mouseup', stopResizing);
        });

        // --- Minimize / restore ---
        let isMinimized = false;
        let lastHeight = '40%';
        toggleBtn.addEventListener('click', () => {
            isMinimized = !isMinimized;
            if (isMinimized) {
                const currentHeight = terminalContainer.style.height;
                if (currentHeight && currentHeight !== '30px') {
                    lastHeight = currentHeight;
                }
                terminalContainer.style.height = '30px';
                resizer.style.display = 'none';
                toggleBtn.innerHTML = '&#9633;';
                toggleBtn.title = 'Restore Terminal';
            } else {
                terminalContainer.style.height = lastHeight;
                resizer.style.display = 'block';
                toggleBtn.innerHTML = '_';
                toggleBtn.title = 'Minimize Terminal';
            }
        });

        // --- Scripted boot log playback ---
        const logs = __LOGS__;
        let i = 0;
        function printLog() {
            if (i < logs.length) {
                const log = logs[i];
                const line = document.createElement('div');
                line.className = 'terminal-line';
                line.style.opacity = 0;
                line.innerHTML = '<span class="time">' + log.time + '</span>' +
                                 '<span class="type type-' + log.type + '">[' + log.type + ']</span>' +
                                 '<span>' + log.msg + '</span>';
                terminal.appendChild(line);
                terminal.scrollTop = terminal.scrollHeight;

                setTimeout(() => line.style.opacity = 1, 10);

                i++;
                const delay = i > 4 ? Math.floor(Math.random() * 200) + 25 : 75;
                setTimeout(printLog, delay);
            }
        }
        printLog();
    </script>"#;

/// Shared scaffolding for all four simulated backends. `entry_paths` are
/// tried in order as exact paths; the first hit becomes the nested preview
/// frame's content.
fn simulation_document(tree: &FolderNode, entry_paths: &[&str], logs: &[LogLine]) -> String {
    let entry = entry_paths
        .iter()
        .find_map(|path| tree.file_at(path).map(|content| (*path, content)));
    let (entry_label, rendered_html) = match entry {
        Some((path, content)) => (path, content.to_string()),
        None => (
            "N/A",
            r#"<p style="color: #a0aec0;">No compatible HTML file found for this backend type.</p>"#
                .to_string(),
        ),
    };

    let logs_json = serde_json::to_string(logs).unwrap_or_else(|_| "[]".to_string());
    let body = format!(
        r#"<div class="terminal-container" id="terminal-container">
        <div class="terminal-header">
            <span>Terminal &amp; Output</span>
            <button id="toggle-terminal-btn" title="Minimize Terminal">_</button>
        </div>
        <div class="terminal" id="terminal"></div>
    </div>
    <div class="resizer" id="resizer"></div>
    <div class="preview-pane">
        <div class="preview-header">Rendered output from {entry_label}:</div>
        <div class="preview-content">
            <iframe srcdoc="{srcdoc}"></iframe>
        </div>
    </div>
    {script}"#,
        srcdoc = rendered_html.replace('"', "&quot;"),
        script = TERMINAL_SCRIPT.replacen("__LOGS__", &logs_json, 1),
    );

    base_document(TERMINAL_STYLE, &body)
}

pub fn nodejs_document(tree: &FolderNode) -> String {
    const LOGS: &[LogLine] = &[
        log("14:02:10", "INFO", "Starting Node.js server..."),
        log("14:02:10", "INFO", "Detected package.json. Running installer."),
        log("14:02:11", "CMD", "npm install"),
        log("14:02:13", "OK", "Dependencies installed."),
        log("14:02:13", "CMD", "node server.js"),
        log("14:02:14", "INFO", "Server listening on http://localhost:8080"),
        log("14:02:15", "REQ", "GET / 200"),
    ];
    simulation_document(tree, &["public/index.html", "views/index.html"], LOGS)
}

pub fn python_document(tree: &FolderNode) -> String {
    const LOGS: &[LogLine] = &[
        log("14:03:01", "INFO", "Starting Python server..."),
        log("14:03:01", "INFO", "Found requirements.txt. Creating virtual environment."),
        log("14:03:02", "CMD", "python -m venv .venv"),
        log("14:03:03", "CMD", "source .venv/bin/activate"),
        log("14:03:04", "CMD", "pip install -r requirements.txt"),
        log("14:03:06", "OK", "Dependencies installed successfully."),
        log("14:03:07", "CMD", "flask run --host=0.0.0.0"),
        log("14:03:08", "INFO", " * Serving Flask app \"app.py\""),
        log("14:03:08", "INFO", " * Running on http://0.0.0.0:5000/"),
        log("14:03:10", "REQ", "127.0.0.1 - \"GET / HTTP/1.1\" 200 -"),
    ];
    simulation_document(tree, &["templates/index.html"], LOGS)
}

pub fn go_document(tree: &FolderNode) -> String {
    const LOGS: &[LogLine] = &[
        log("14:04:10", "INFO", "Starting Go server..."),
        log("14:04:10", "INFO", "Found go.mod. Tidying modules."),
        log("14:04:11", "CMD", "go mod tidy"),
        log("14:04:12", "INFO", "Building binary..."),
        log("14:04:13", "CMD", "go build -o /tmp/main"),
        log("14:04:15", "OK", "Build successful."),
        log("14:04:15", "CMD", "/tmp/main"),
        log("14:04:16", "INFO", "Server starting on port 8080"),
        log("14:04:18", "REQ", "Received request for /"),
    ];
    simulation_document(tree, &["public/index.html", "templates/index.html"], LOGS)
}

pub fn java_document(tree: &FolderNode) -> String {
    const LOGS: &[LogLine] = &[
        log("14:05:20", "INFO", "Starting Java server..."),
        log("14:05:20", "INFO", "Found pom.xml. Running Maven build."),
        log("14:05:21", "CMD", "mvn clean install"),
        log("14:05:22", "BUILD", "[INFO] Scanning for projects..."),
        log("14:05:25", "BUILD", "[INFO] Downloading from central: ..."),
        log("14:05:28", "BUILD", "[INFO] BUILD SUCCESS"),
        log("14:05:29", "CMD", "java -jar target/app.jar"),
        log("14:05:30", "INFO", "o.s.b.w.e.t.TomcatWebServer : Tomcat started on port(s): 8080 (http)"),
        log("14:05:31", "INFO", "Started Application in 5.123 seconds"),
    ];
    simulation_document(tree, &["src/main/resources/templates/index.html"], LOGS)
}

#[cfg(test)]
mod tests {
    use super::super::tests::tree_of;
    use super::*;

    #[test]
    fn nodejs_prefers_public_over_views() {
        let tree = tree_of(&[
            ("public/index.html", "<b>public</b>"),
            ("views/index.html", "<b>views</b>"),
        ]);
        let doc = nodejs_document(&tree);
        assert!(doc.contains("Rendered output from public/index.html:"));
        assert!(doc.contains("&quot;")); // attribute-safe srcdoc embedding
        assert!(doc.contains("<b>public</b>"));
    }

    #[test]
    fn entry_point_is_matched_by_exact_path_only() {
        // index.html exists, but not at a framework-conventional location.
        let tree = tree_of(&[("index.html", "<b>root</b>")]);
        let doc = python_document(&tree);
        assert!(doc.contains("Rendered output from N/A:"));
        assert!(doc.contains("No compatible HTML file found"));
    }

    #[test]
    fn boot_log_sequence_is_embedded_as_json() {
        let doc = go_document(&FolderNode::default());
        assert!(doc.contains(r#""type":"CMD""#));
        assert!(doc.contains("go mod tidy"));
        assert!(doc.contains("printLog();"));
    }

    #[test]
    fn java_uses_jsp_style_resource_path() {
        let tree = tree_of(&[("src/main/resources/templates/index.html", "<i>jsp</i>")]);
        let doc = java_document(&tree);
        assert!(doc.contains("Rendered output from src/main/resources/templates/index.html:"));
        assert!(doc.contains("mvn clean install"));
    }

    #[test]
    fn terminal_pane_is_resizable_and_toggleable() {
        let doc = nodejs_document(&FolderNode::default());
        assert!(doc.contains("id=\"resizer\""));
        assert!(doc.contains("toggle-terminal-btn"));
        assert!(doc.contains("Math.random()"));
    }
}
