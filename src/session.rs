//! Engine sessions: `open`, `close`, `eval`, `get`, `put`.
//!
//! The foreign engine itself sits behind the [`Engine`] trait. A
//! [`Session`] validates arguments before any engine call, converts
//! values through [`crate::convert`], and maps engine refusals onto
//! [`MarshalError`] variants.

use tracing::{debug, warn};

use crate::convert::{char_array_to_text, to_engine_value, to_host_array, HostValue};
use crate::error::{MarshalError, Result};
use crate::host::HostArray;
use crate::matrix::EngineValue;
use crate::{DEFAULT_OUTPUT_BUFFER_SIZE, ERROR_MARKER, MAX_VARIABLE_NAME_LEN, PROMPT};

/// Failure reported by an [`Engine`] or [`EngineLauncher`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineFailure {
    /// The engine rejected the request.
    #[error("{0}")]
    Refused(String),
    /// The engine (or a subsystem it needs) is not available at all.
    #[error("{0}")]
    Unavailable(String),
}

/// The foreign numeric engine.
///
/// Implementations need not be reentrant; a [`Session`] takes `&mut self`
/// for every call, so one engine is never driven concurrently.
pub trait Engine {
    /// Evaluate `command`, returning the raw output transcript.
    fn eval(&mut self, command: &str) -> std::result::Result<String, EngineFailure>;

    /// Fetch a copy of a workspace variable.
    fn get_variable(&mut self, name: &str) -> std::result::Result<EngineValue, EngineFailure>;

    /// Assign a workspace variable, taking ownership of `value`.
    fn put_variable(
        &mut self,
        name: &str,
        value: EngineValue,
    ) -> std::result::Result<(), EngineFailure>;

    /// Shut the engine down.
    fn close(&mut self) -> std::result::Result<(), EngineFailure>;
}

/// Starts engines.
pub trait EngineLauncher {
    type Engine: Engine;

    /// Start an engine. `startup` is an implementation-defined startup
    /// command (host name, executable path, flags).
    fn launch(&self, startup: Option<&str>) -> std::result::Result<Self::Engine, EngineFailure>;
}

/// Runtime options of a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Largest transcript, in bytes, that `eval` accepts.
    pub output_buffer_size: usize,
    /// Transcript prefix marking an engine error banner.
    pub error_marker: String,
    /// Prompt stripped from the front of a successful transcript.
    pub prompt: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            output_buffer_size: DEFAULT_OUTPUT_BUFFER_SIZE,
            error_marker: ERROR_MARKER.to_owned(),
            prompt: PROMPT.to_owned(),
        }
    }
}

/// Result of [`Session::get`].
#[derive(Debug, Clone)]
pub enum Fetched {
    Array(HostArray),
    Text(String),
}

impl Fetched {
    pub fn into_array(self) -> Option<HostArray> {
        match self {
            Fetched::Array(a) => Some(a),
            Fetched::Text(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Fetched::Text(t) => Some(t),
            Fetched::Array(_) => None,
        }
    }
}

/// Check that `name` is a legal workspace variable name.
pub fn validate_variable_name(name: &str) -> Result<()> {
    let invalid = |reason| MarshalError::InvalidVariableName {
        name: name.to_owned(),
        reason,
    };
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("name is empty")),
        Some(c) if !c.is_ascii_alphabetic() => {
            return Err(invalid("name must start with an ASCII letter"))
        }
        Some(_) => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("name may only contain ASCII letters, digits and '_'"));
    }
    if name.len() > MAX_VARIABLE_NAME_LEN {
        return Err(invalid("name is too long"));
    }
    Ok(())
}

/// Cut `transcript` to at most `capacity` bytes, backing off to the
/// nearest char boundary.
fn truncate_to_capacity(transcript: &str, capacity: usize) -> &str {
    if transcript.len() <= capacity {
        return transcript;
    }
    let mut end = capacity;
    while !transcript.is_char_boundary(end) {
        end -= 1;
    }
    debug!(
        len = transcript.len(),
        capacity, "transcript truncated to output buffer"
    );
    &transcript[..end]
}

/// Apply the transcript conventions to raw `eval` output.
///
/// The transcript is first cut to `output_buffer_size` bytes, as the
/// engine's fixed output buffer would. An error banner at position 0 then
/// becomes [`MarshalError::Evaluation`] carrying the text after the
/// marker. Otherwise a leading prompt is stripped.
pub fn interpret_transcript(transcript: &str, options: &SessionOptions) -> Result<String> {
    let transcript = truncate_to_capacity(transcript, options.output_buffer_size);
    if let Some(message) = transcript.strip_prefix(options.error_marker.as_str()) {
        return Err(MarshalError::Evaluation {
            message: message.to_owned(),
        });
    }
    Ok(transcript
        .strip_prefix(options.prompt.as_str())
        .unwrap_or(transcript)
        .to_owned())
}

/// Check that `name` is a legal function name: identifiers joined by `.`
/// (package functions).
pub fn validate_function_name(name: &str) -> Result<()> {
    if name.split('.').all(|part| validate_variable_name(part).is_ok()) {
        Ok(())
    } else {
        Err(MarshalError::InvalidVariableName {
            name: name.to_owned(),
            reason: "function name must be identifiers separated by '.'",
        })
    }
}

fn argument_name(i: usize) -> String {
    format!("arg{i}__")
}

fn result_name(i: usize) -> String {
    format!("RES{i}__")
}

/// Command text for a call of `function` on `args` bound to `results`.
fn call_command(function: &str, args: &[String], results: &[String]) -> String {
    let call = if args.is_empty() {
        function.to_owned()
    } else {
        format!("{function}({})", args.join(", "))
    };
    if results.is_empty() {
        call
    } else {
        format!("[{}]={call}", results.join(", "))
    }
}

/// Command text clearing `names` from the workspace.
fn clear_command(names: &[String]) -> String {
    format!("clear('{}')", names.join("', '"))
}

/// One open engine session.
pub struct Session<E: Engine> {
    engine: Option<E>,
    options: SessionOptions,
}

impl<E: Engine> std::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.engine.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl<E: Engine> Session<E> {
    /// Start a session with default options.
    pub fn open<L>(launcher: &L, startup: Option<&str>) -> Result<Self>
    where
        L: EngineLauncher<Engine = E>,
    {
        Self::open_with(launcher, startup, SessionOptions::default())
    }

    /// Start a session with explicit options.
    pub fn open_with<L>(
        launcher: &L,
        startup: Option<&str>,
        options: SessionOptions,
    ) -> Result<Self>
    where
        L: EngineLauncher<Engine = E>,
    {
        debug!(?startup, "opening engine session");
        let engine = launcher.launch(startup).map_err(|e| match e {
            EngineFailure::Refused(msg) => MarshalError::SessionStart(msg),
            EngineFailure::Unavailable(msg) => MarshalError::Environment(msg),
        })?;
        Ok(Self::from_engine(engine, options))
    }

    /// Wrap an already running engine.
    pub fn from_engine(engine: E, options: SessionOptions) -> Self {
        Self {
            engine: Some(engine),
            options,
        }
    }

    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn engine_mut(&mut self) -> Result<&mut E> {
        self.engine.as_mut().ok_or(MarshalError::SessionClosed)
    }

    /// Close the session. Closing twice fails with
    /// [`MarshalError::SessionClosed`].
    pub fn close(&mut self) -> Result<()> {
        let mut engine = self.engine.take().ok_or(MarshalError::SessionClosed)?;
        debug!("closing engine session");
        engine
            .close()
            .map_err(|e| MarshalError::CloseRefused(e.to_string()))
    }

    /// Evaluate `command` and return its transcript.
    pub fn eval(&mut self, command: &str) -> Result<String> {
        debug!(command, "eval");
        let transcript = self
            .engine_mut()?
            .eval(command)
            .map_err(|e| MarshalError::EvalRefused(e.to_string()))?;
        interpret_transcript(&transcript, &self.options)
    }

    /// Fetch variable `name` from the workspace.
    pub fn get(&mut self, name: &str) -> Result<Fetched> {
        validate_variable_name(name)?;
        let value = self
            .engine_mut()?
            .get_variable(name)
            .map_err(|e| MarshalError::GetRefused {
                name: name.to_owned(),
                reason: e.to_string(),
            })?;
        debug!(name, class = value.class(), "get");
        match value {
            EngineValue::Matrix(m) => to_host_array(&m).map(Fetched::Array),
            EngineValue::Char(c) => char_array_to_text(&c).map(Fetched::Text),
            EngineValue::Other { class } => Err(MarshalError::UnsupportedVariableKind {
                name: name.to_owned(),
                class,
            }),
        }
    }

    /// Convert `value` and assign it to `name` in the workspace.
    ///
    /// Conversion happens before the engine is touched, so a rejected
    /// value leaves the workspace unchanged.
    pub fn put<'v>(&mut self, name: &str, value: impl Into<HostValue<'v>>) -> Result<()> {
        validate_variable_name(name)?;
        let engine = self.engine_mut()?;
        let converted = to_engine_value(&value.into())?;
        debug!(name, class = converted.class(), "put");
        engine
            .put_variable(name, converted)
            .map_err(|e| MarshalError::PutRefused {
                name: name.to_owned(),
                reason: e.to_string(),
            })
    }

    /// Call engine function `function` on `args`, fetching `nout` results.
    ///
    /// Each argument is put into a temporary `arg{i}__` variable and the
    /// results are bound to `RES{i}__` before being fetched through
    /// [`Session::get`], which rejects result classes other than char and
    /// double. With `nout == 0` the function runs as a procedure and an
    /// empty vector is returned. All temporaries are cleared on every exit
    /// path.
    pub fn call<'v, I, V>(
        &mut self,
        function: &str,
        args: I,
        nout: usize,
    ) -> Result<Vec<Fetched>>
    where
        I: IntoIterator<Item = V>,
        V: Into<HostValue<'v>>,
    {
        validate_function_name(function)?;
        self.engine_mut()?;
        let mut temporaries = Vec::new();
        let outcome = self.call_inner(function, args, nout, &mut temporaries);
        if temporaries.is_empty() {
            return outcome;
        }
        let cleared = self.eval(&clear_command(&temporaries)).map(drop);
        match (outcome, cleared) {
            (Ok(results), Ok(())) => Ok(results),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(clear_err)) => {
                warn!(%clear_err, "failed to clear call temporaries");
                Err(err)
            }
        }
    }

    fn call_inner<'v, I, V>(
        &mut self,
        function: &str,
        args: I,
        nout: usize,
        temporaries: &mut Vec<String>,
    ) -> Result<Vec<Fetched>>
    where
        I: IntoIterator<Item = V>,
        V: Into<HostValue<'v>>,
    {
        let mut arg_names = Vec::new();
        for (i, arg) in args.into_iter().enumerate() {
            let name = argument_name(i);
            let converted = to_engine_value(&arg.into())?;
            // recorded before the put: a refused put may still leave a value
            temporaries.push(name.clone());
            self.engine_mut()?
                .put_variable(&name, converted)
                .map_err(|e| MarshalError::PutRefused {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            arg_names.push(name);
        }
        let result_names: Vec<String> = (0..nout).map(result_name).collect();
        temporaries.extend(result_names.iter().cloned());
        debug!(function, nargs = arg_names.len(), nout, "call");
        self.eval(&call_command(function, &arg_names, &result_names))?;
        result_names.iter().map(|name| self.get(name)).collect()
    }
}

impl<E: Engine> Drop for Session<E> {
    fn drop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            if let Err(err) = engine.close() {
                warn!(%err, "engine refused to close while dropping session");
            }
        }
    }
}
