// ---------------------------------------------------------------------------
// Preview surface: the host-side twin of the sandbox frame.
// ---------------------------------------------------------------------------

use serde::Serialize;
use tracing::debug;

use crate::bridge::{self, LogLevel, LogMessage, SandboxMessage, SelectedElement};
use crate::detect::{self, PreviewConfig, PreviewEnvironment};
use crate::render;
use crate::tree::FolderNode;

/// Lifecycle of the rendered frame as the host sees it. `Loading` is
/// entered whenever a re-render begins, from any state; document synthesis
/// is synchronous, so over RPC it is only ever observed if a render fails
/// to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceState {
    Idle,
    Loading,
    Rendered,
    ErrorOverlay,
}

/// A fully instrumented document, stamped with the generation it belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub document: String,
    pub environment: PreviewEnvironment,
    pub generation: u64,
}

/// Something a rendered frame reported that the embedder should act on.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SurfaceEvent {
    Console { log: LogMessage },
    ElementSelected { element: SelectedElement },
}

/// Tracks the current frame generation and the console log accumulated
/// against it. Every render invalidates the previous frame: the generation
/// is bumped, logs are cleared, and any message still in flight from the old
/// frame is dropped on arrival.
#[derive(Debug)]
pub struct PreviewSurface {
    state: SurfaceState,
    generation: u64,
    environment: Option<PreviewEnvironment>,
    logs: Vec<LogMessage>,
}

impl Default for PreviewSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSurface {
    pub fn new() -> Self {
        PreviewSurface {
            state: SurfaceState::Idle,
            generation: 0,
            environment: None,
            logs: Vec::new(),
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn environment(&self) -> Option<PreviewEnvironment> {
        self.environment
    }

    pub fn logs(&self) -> &[LogMessage] {
        &self.logs
    }

    /// Renders a fresh document for the tree under the configured
    /// environment and adopts it as the current frame.
    pub fn render(&mut self, config: &PreviewConfig, tree: &FolderNode) -> RenderedDocument {
        self.generation += 1;
        self.logs.clear();
        self.state = SurfaceState::Loading;

        let environment = detect::effective_environment(config, tree);
        self.environment = Some(environment);

        let document = bridge::instrument(&render::render(environment, tree), self.generation);
        self.state = SurfaceState::Rendered;
        RenderedDocument {
            document,
            environment,
            generation: self.generation,
        }
    }

    /// Ingests a message reported by a sandbox frame. Messages stamped with
    /// a generation other than the current one belong to a torn-down frame
    /// and are discarded.
    pub fn handle_event(
        &mut self,
        generation: u64,
        message: SandboxMessage,
    ) -> Option<SurfaceEvent> {
        if generation != self.generation {
            debug!(
                reported = generation,
                current = self.generation,
                "dropping message from stale frame"
            );
            return None;
        }

        match message {
            SandboxMessage::Console { level, message } => {
                let log = LogMessage {
                    level,
                    message,
                    timestamp: chrono::Utc::now(),
                };
                // The wire format cannot tell an uncaught error relayed by
                // the frame's error handler from a plain console.error call.
                // Both arrive as level "error", so both raise the overlay.
                if level == LogLevel::Error {
                    self.state = SurfaceState::ErrorOverlay;
                }
                self.logs.push(log.clone());
                Some(SurfaceEvent::Console { log })
            }
            SandboxMessage::ElementSelected { selector, text } => {
                Some(SurfaceEvent::ElementSelected {
                    element: SelectedElement { selector, text },
                })
            }
        }
    }
}
