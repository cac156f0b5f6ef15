//! Command dispatch.
//!
//! [`CommandHandler`] executes one command line against a [`Directory`]:
//! parse, resolve, decode the verb, run the matching CRUD entry point and
//! build the response envelope. The resolved resource is held only for the
//! duration of the call.

use super::command::{split_token, Command, Verb};
use super::error::CommandError;
use super::response::Response;
use crate::directory::{Directory, Resolved};
use crate::framework::{
    Batch, Formatter, JsonFormatter, Property, Resource, ResourceError, Value,
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Something that answers command lines.
///
/// The front end only talks to this seam, so tests can substitute a canned
/// service for the real handler.
#[async_trait]
pub trait CommandService: Send + Sync + 'static {
    async fn execute(&self, line: &str) -> Response;
}

/// Dispatches commands to resources found through a [`Directory`].
#[derive(Clone)]
pub struct CommandHandler {
    directory: Arc<dyn Directory>,
}

/// Outcome of a dispatched verb: either a value for the envelope, or an
/// error optionally carrying a partial result.
type Dispatch = Result<Option<JsonValue>, (CommandError, Option<JsonValue>)>;

impl CommandHandler {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Executes a single command line.
    pub fn handle(&self, line: &str) -> Response {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                error!(error = %e, "Unable to parse command");
                return Response::error(&e);
            }
        };
        debug!(verb = command.verb, uri = command.uri, args = command.args, "Received command");

        let resolved = match self.directory.resolve(command.uri) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(uri = command.uri, error = %e, "Unable to resolve resource");
                return Response::error(&CommandError::from(e));
            }
        };

        let verb = match command.verb() {
            Ok(verb) => verb,
            Err(e) => {
                error!(verb = command.verb, uri = command.uri, "Unknown command");
                return Response::error(&e);
            }
        };

        match dispatch(verb, resolved, command.args) {
            Ok(response) => {
                info!(%verb, uri = command.uri, "Command completed");
                Response::success(response)
            }
            Err((e, partial)) => {
                warn!(%verb, uri = command.uri, code = e.code(), error = %e, "Command failed");
                match partial {
                    Some(partial) => Response::partial(&e, partial),
                    None => Response::error(&e),
                }
            }
        }
    }
}

#[async_trait]
impl CommandService for CommandHandler {
    async fn execute(&self, line: &str) -> Response {
        let handler = self.clone();
        let line = line.to_string();
        // Creators and Deleters may block, so commands run on the blocking pool.
        match tokio::task::spawn_blocking(move || handler.handle(&line)).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Command task failed");
                Response::error(&CommandError::Internal(e.to_string()))
            }
        }
    }
}

fn dispatch(verb: Verb, resolved: Resolved, args: &str) -> Dispatch {
    let Resolved { resource, property } = resolved;
    match (verb, property) {
        (Verb::Read, Some(property)) => read_property(&resource, &property).map_err(plain),
        (Verb::Read, None) if args.is_empty() => Ok(Some(describe(&resource))),
        (Verb::Read, None) => read_batch(&resource, args),
        (Verb::Update, Some(property)) => update_property(&resource, &property, args).map_err(plain),
        (Verb::Update, None) => update_batch(&resource, args),
        (Verb::Create, None) => create(&resource, args).map_err(plain),
        (Verb::Delete, None) => delete(&resource, args).map_err(plain),
        (Verb::Create | Verb::Delete, Some(property)) => Err(plain(
            ResourceError::NoResource(format!("{}/{}", resource.name(), property)).into(),
        )),
    }
}

fn plain(error: CommandError) -> (CommandError, Option<JsonValue>) {
    (error, None)
}

fn describe(resource: &Resource) -> JsonValue {
    let mut formatter = JsonFormatter::new();
    resource.describe(&mut formatter);
    formatter.into_value().unwrap_or(JsonValue::Null)
}

fn read_property(resource: &Arc<Resource>, property: &str) -> Result<Option<JsonValue>, CommandError> {
    let reflector = Property::new(property, Arc::clone(resource))?;
    let mut formatter = JsonFormatter::new();
    reflector.serialize(&mut formatter)?;
    Ok(formatter.into_value())
}

fn read_batch(resource: &Resource, args: &str) -> Dispatch {
    let names: Vec<&str> = args.split_whitespace().collect();
    let batch = resource.read(&names);
    let values = batch_values(resource, &batch);
    match batch.error() {
        Some(e) => Err((CommandError::from(e.clone()), Some(values))),
        None => Ok(Some(values)),
    }
}

/// Renders each value the way a single-property read would.
fn batch_values(resource: &Resource, batch: &Batch<Value>) -> JsonValue {
    let properties = resource.kind().properties();
    let mut formatter = JsonFormatter::new();
    formatter.begin_object();
    for (name, value) in batch.successes() {
        formatter.set_member_name(name);
        match properties.get(name) {
            Some(spec) => spec.renderer().add_value(&mut formatter, value),
            None => formatter.set_value(value),
        }
    }
    formatter.end_object();
    formatter.into_value().unwrap_or(JsonValue::Null)
}

fn update_property(resource: &Resource, property: &str, args: &str) -> Result<Option<JsonValue>, CommandError> {
    if args.is_empty() {
        return Err(ResourceError::NullArgument("value".into()).into());
    }
    resource.update_one(property, Value::from(args))?;
    Ok(None)
}

fn update_batch(resource: &Resource, args: &str) -> Dispatch {
    let mut pairs = Vec::new();
    for pair in args.split_whitespace() {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| plain(CommandError::Malformed(format!("expected name=value, got {pair}"))))?;
        pairs.push((name, Value::from(value)));
    }

    let batch = resource.update(pairs);
    let updated: Vec<JsonValue> = batch
        .successes()
        .map(|(name, _)| JsonValue::String(name.to_string()))
        .collect();
    match batch.error() {
        Some(e) => Err((CommandError::from(e.clone()), Some(JsonValue::Array(updated)))),
        None => Ok(None),
    }
}

fn create(resource: &Resource, args: &str) -> Result<Option<JsonValue>, CommandError> {
    let (name, description) = split_token(args);
    let created = resource.create(name, description)?;
    Ok(Some(describe(&created)))
}

fn delete(resource: &Resource, args: &str) -> Result<Option<JsonValue>, CommandError> {
    let (name, _) = split_token(args);
    resource.delete(name)?;
    Ok(None)
}
