// ---------------------------------------------------------------------------
// JSON-RPC server: stdin NDJSON in, stdout NDJSON out.
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::info;

use crate::detect::{self, PreviewConfig};
use crate::error::PreviewError;
use crate::ops;
use crate::protocol::{
    self, ActivateParams, ApplyOperationsParams, ApplyOperationsResult, CheckpointParams,
    CheckpointResult, DetectResult, DuplicateParams, EventParams, EventResult, InitializeParams,
    InitializeResult, JsonRpcRequest, ListingResult, LoadParams, ReadParams, ReadResult,
    RenderParams, RevertParams, ShareResult, StateResult, WorkspaceSummary,
};
use crate::share;
use crate::surface::{PreviewSurface, SurfaceEvent};
use crate::transport::EngineTransport;
use crate::workspace::Workspace;

/// Preview engine server: one active workspace tree, one preview surface,
/// dispatching incoming requests to the core modules.
pub struct PreviewServer {
    transport: EngineTransport,
    workspaces: Vec<Workspace>,
    active: usize,
    config: PreviewConfig,
    surface: PreviewSurface,
}

impl Default for PreviewServer {
    fn default() -> Self {
        Self::new(EngineTransport::new())
    }
}

impl PreviewServer {
    pub fn new(transport: EngineTransport) -> Self {
        Self {
            transport,
            workspaces: vec![Workspace::new("My First Project")],
            active: 0,
            config: PreviewConfig::default(),
            surface: PreviewSurface::new(),
        }
    }

    fn active_workspace(&self) -> &Workspace {
        &self.workspaces[self.active]
    }

    fn active_workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspaces[self.active]
    }

    /// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
    pub fn run(&mut self) -> Result<(), PreviewError> {
        use std::io::BufRead;

        let stdin = std::io::stdin();
        let reader = stdin.lock();

        for line_result in reader.lines() {
            let line = line_result?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                Ok(req) => self.dispatch(req),
                Err(e) => {
                    tracing::warn!("Parse error: {}", e);
                    self.transport.reply_error(
                        0,
                        protocol::INTERNAL_ERROR,
                        "Parse error: invalid JSON",
                        None,
                    );
                }
            }
        }

        Ok(())
    }

    fn dispatch(&mut self, req: JsonRpcRequest) {
        let JsonRpcRequest { id, method, params } = req;
        let outcome = match method.as_str() {
            "initialize" => self.handle_initialize(params),
            "fs/applyOperations" => self.handle_apply_operations(params),
            "fs/read" => self.handle_read(params),
            "fs/tree" => self.handle_tree(),
            "fs/listing" => self.handle_listing(),
            "preview/detect" => self.handle_detect(),
            "preview/render" => self.handle_render(params),
            "preview/event" => self.handle_event(params),
            "preview/state" => self.handle_state(),
            "workspace/checkpoint" => self.handle_checkpoint(params),
            "workspace/revert" => self.handle_revert(params),
            "workspace/duplicate" => self.handle_duplicate(params),
            "workspace/activate" => self.handle_activate(params),
            "workspace/list" => self.handle_list(),
            "workspace/share" => self.handle_share(),
            "workspace/load" => self.handle_load(params),
            _ => {
                self.transport.reply_error(
                    id,
                    protocol::METHOD_NOT_FOUND,
                    format!("Method not found: {}", method),
                    None,
                );
                return;
            }
        };

        match outcome {
            Ok(result) => self.transport.reply(id, result),
            Err(Dispatch::BadParams(e)) => self.transport.reply_error(
                id,
                protocol::INVALID_PARAMS,
                format!("Invalid params for {}: {}", method, e),
                None,
            ),
            Err(Dispatch::Engine(e)) => self.transport.reply_error(
                id,
                protocol::ENGINE_ERROR,
                e.to_string(),
                Some(e.to_json_rpc_error()),
            ),
        }
    }

    // ── Handlers ────────────────────────────────────────────────────────────

    fn handle_initialize(&mut self, params: Value) -> DispatchResult {
        let params: InitializeParams = parse_params(params)?;
        if let Some(config) = params.config {
            self.config = config;
        }
        info!(environment = self.config.environment.as_str(), "initialized");
        to_result(&InitializeResult {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            config: self.config.clone(),
            workspace_id: self.active_workspace().id,
        })
    }

    fn handle_apply_operations(&mut self, params: Value) -> DispatchResult {
        let params: ApplyOperationsParams = parse_params(params)?;
        let (new_tree, outcome) =
            ops::apply_operations(&self.active_workspace().file_system, &params.operations);
        self.active_workspace_mut().file_system = new_tree;
        to_result(&ApplyOperationsResult {
            applied: outcome.applied,
            failed: outcome.failed,
        })
    }

    fn handle_read(&mut self, params: Value) -> DispatchResult {
        let params: ReadParams = parse_params(params)?;
        let tree = &self.active_workspace().file_system;
        match tree.node_at(&params.path) {
            Some(node) if node.is_file() => to_result(&ReadResult {
                content: node.as_file().map(|f| f.content.clone()).unwrap_or_default(),
            }),
            Some(_) => Err(Dispatch::Engine(PreviewError::NotAFile(params.path))),
            None => Err(Dispatch::Engine(PreviewError::NotFound(params.path))),
        }
    }

    fn handle_tree(&mut self) -> DispatchResult {
        serde_json::to_value(&self.active_workspace().file_system)
            .map_err(|e| Dispatch::Engine(e.into()))
    }

    fn handle_listing(&mut self) -> DispatchResult {
        to_result(&ListingResult {
            listing: self.active_workspace().file_system.listing(),
        })
    }

    fn handle_detect(&mut self) -> DispatchResult {
        to_result(&DetectResult {
            environment: detect::detect(&self.active_workspace().file_system),
        })
    }

    fn handle_render(&mut self, params: Value) -> DispatchResult {
        let params: RenderParams = parse_params(params)?;
        let mut config = self.config.clone();
        if let Some(environment) = params.environment {
            config.environment = environment;
        }
        let rendered = self
            .surface
            .render(&config, &self.workspaces[self.active].file_system);
        to_result(&rendered)
    }

    fn handle_event(&mut self, params: Value) -> DispatchResult {
        let params: EventParams = parse_params(params)?;
        let event = self.surface.handle_event(params.generation, params.message);
        let accepted = event.is_some();
        if let Some(event) = event {
            // Forward accepted events so an embedder tailing stdout can
            // mirror the sandbox console without polling preview/state.
            let method = match &event {
                SurfaceEvent::Console { .. } => "preview/log",
                SurfaceEvent::ElementSelected { .. } => "preview/selection",
            };
            if let Ok(payload) = serde_json::to_value(&event) {
                self.transport.defer_notification(method, payload);
            }
        }
        to_result(&EventResult { accepted })
    }

    fn handle_state(&mut self) -> DispatchResult {
        to_result(&StateResult {
            state: self.surface.state(),
            generation: self.surface.generation(),
            environment: self.surface.environment(),
            logs: self.surface.logs().to_vec(),
        })
    }

    fn handle_checkpoint(&mut self, params: Value) -> DispatchResult {
        let params: CheckpointParams = parse_params(params)?;
        let checkpoint = self.active_workspace_mut().create_checkpoint(params.name);
        to_result(&CheckpointResult {
            id: checkpoint.id,
            name: checkpoint.name.clone(),
        })
    }

    fn handle_revert(&mut self, params: Value) -> DispatchResult {
        let params: RevertParams = parse_params(params)?;
        self.active_workspace_mut()
            .revert_to(params.id)
            .map_err(Dispatch::Engine)?;
        Ok(json!({ "reverted": params.id }))
    }

    fn handle_duplicate(&mut self, params: Value) -> DispatchResult {
        let params: DuplicateParams = parse_params(params)?;
        let copy = self.active_workspace().duplicate(params.name);
        let summary = WorkspaceSummary {
            id: copy.id,
            name: copy.name.clone(),
            active: true,
            checkpoints: copy.checkpoints.len(),
        };
        self.workspaces.push(copy);
        self.active = self.workspaces.len() - 1;
        to_result(&summary)
    }

    fn handle_activate(&mut self, params: Value) -> DispatchResult {
        let params: ActivateParams = parse_params(params)?;
        match self.workspaces.iter().position(|ws| ws.id == params.id) {
            Some(index) => {
                self.active = index;
                Ok(json!({ "activated": params.id }))
            }
            None => Err(Dispatch::Engine(PreviewError::UnknownWorkspace(
                params.id.to_string(),
            ))),
        }
    }

    fn handle_list(&mut self) -> DispatchResult {
        let summaries: Vec<WorkspaceSummary> = self
            .workspaces
            .iter()
            .enumerate()
            .map(|(index, ws)| WorkspaceSummary {
                id: ws.id,
                name: ws.name.clone(),
                active: index == self.active,
                checkpoints: ws.checkpoints.len(),
            })
            .collect();
        to_result(&summaries)
    }

    fn handle_share(&mut self) -> DispatchResult {
        let data = share::encode_share_link(self.active_workspace()).map_err(Dispatch::Engine)?;
        to_result(&ShareResult { data })
    }

    fn handle_load(&mut self, params: Value) -> DispatchResult {
        let params: LoadParams = parse_params(params)?;
        let workspace = share::decode_share_link(&params.data).map_err(Dispatch::Engine)?;
        let summary = WorkspaceSummary {
            id: workspace.id,
            name: workspace.name.clone(),
            active: true,
            checkpoints: workspace.checkpoints.len(),
        };
        self.workspaces.push(workspace);
        self.active = self.workspaces.len() - 1;
        to_result(&summary)
    }
}

// ── Dispatch plumbing ───────────────────────────────────────────────────────

enum Dispatch {
    BadParams(serde_json::Error),
    Engine(PreviewError),
}

type DispatchResult = Result<Value, Dispatch>;

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, Dispatch> {
    // Absent params arrive as Null; treat that as an empty object so that
    // methods with all-optional params work without one, while methods with
    // required fields still fail with a field-level message.
    let params = match params {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(params).map_err(Dispatch::BadParams)
}

fn to_result(value: &impl serde::Serialize) -> DispatchResult {
    serde_json::to_value(value).map_err(|e| Dispatch::Engine(e.into()))
}
