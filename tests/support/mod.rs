//! In-memory engine double for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use matbridge::{Engine, EngineFailure, EngineLauncher, EngineValue, Session, SessionOptions};

/// An engine-side function: arguments in, results out, or an error message.
pub type EngineFunction = fn(&[EngineValue]) -> Result<Vec<EngineValue>, String>;

/// State shared between a [`ScriptedEngine`] and the test that drives it.
#[derive(Default)]
pub struct EngineState {
    pub workspace: HashMap<String, EngineValue>,
    pub functions: HashMap<String, EngineFunction>,
    pub transcripts: VecDeque<String>,
    pub calls: Vec<String>,
    pub refuse_eval: bool,
    pub refuse_put: bool,
    pub refuse_close: bool,
    pub closed: bool,
}

impl std::fmt::Debug for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineState")
            .field("workspace", &self.workspace.keys().collect::<Vec<_>>())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("calls", &self.calls)
            .field("closed", &self.closed)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SharedState(Arc<Mutex<EngineState>>);

impl SharedState {
    pub fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.0.lock().unwrap()
    }
}

/// Engine whose `eval` output is scripted and whose workspace is a map.
#[derive(Debug)]
pub struct ScriptedEngine {
    state: SharedState,
}

impl Engine for ScriptedEngine {
    fn eval(&mut self, command: &str) -> Result<String, EngineFailure> {
        let mut state = self.state.lock();
        state.calls.push(format!("eval {command}"));
        if state.refuse_eval {
            return Err(EngineFailure::Refused("engine is busy".into()));
        }
        if let Some(names) = parse_clear(command) {
            for name in names {
                state.workspace.remove(name);
            }
            return Ok(">> ".to_owned());
        }
        if let Some(call) = parse_call(command) {
            if let Some(&function) = state.functions.get(call.function) {
                return Ok(run_function(&mut state, function, &call));
            }
        }
        Ok(state
            .transcripts
            .pop_front()
            .unwrap_or_else(|| ">> ".to_owned()))
    }

    fn get_variable(&mut self, name: &str) -> Result<EngineValue, EngineFailure> {
        let mut state = self.state.lock();
        state.calls.push(format!("get {name}"));
        state
            .workspace
            .get(name)
            .cloned()
            .ok_or_else(|| EngineFailure::Refused(format!("undefined variable {name}")))
    }

    fn put_variable(&mut self, name: &str, value: EngineValue) -> Result<(), EngineFailure> {
        let mut state = self.state.lock();
        state.calls.push(format!("put {name}"));
        if state.refuse_put {
            return Err(EngineFailure::Refused("out of engine memory".into()));
        }
        state.workspace.insert(name.to_owned(), value);
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineFailure> {
        let mut state = self.state.lock();
        state.calls.push("close".to_owned());
        if state.refuse_close {
            return Err(EngineFailure::Refused("engine hung".into()));
        }
        state.closed = true;
        Ok(())
    }
}

/// `clear('a', 'b')` -> `["a", "b"]`.
fn parse_clear(command: &str) -> Option<Vec<&str>> {
    let inner = command.strip_prefix("clear(")?.strip_suffix(')')?;
    Some(inner.split(", ").map(|name| name.trim_matches('\'')).collect())
}

struct Call<'c> {
    results: Vec<&'c str>,
    function: &'c str,
    args: Vec<&'c str>,
}

/// `[R0, R1]=f(a, b)`, `f(a)` or `f`.
fn parse_call(command: &str) -> Option<Call<'_>> {
    let (results, rest) = match command.split_once('=') {
        Some((lhs, rhs)) => {
            let lhs = lhs.strip_prefix('[')?.strip_suffix(']')?;
            (lhs.split(", ").collect(), rhs)
        }
        None => (Vec::new(), command),
    };
    let (function, args) = match rest.split_once('(') {
        Some((function, args)) => {
            let args = args.strip_suffix(')')?;
            (function, args.split(", ").collect())
        }
        None => (rest, Vec::new()),
    };
    Some(Call {
        results,
        function,
        args,
    })
}

fn run_function(state: &mut EngineState, function: EngineFunction, call: &Call<'_>) -> String {
    let mut args = Vec::new();
    for name in &call.args {
        match state.workspace.get(*name) {
            Some(value) => args.push(value.clone()),
            None => return format!(">> ??? Undefined function or variable '{name}'.\n"),
        }
    }
    match function(&args) {
        Ok(values) if values.len() >= call.results.len() => {
            for (name, value) in call.results.iter().zip(values) {
                state.workspace.insert((*name).to_owned(), value);
            }
            ">> ".to_owned()
        }
        Ok(_) => ">> ??? Too many output arguments.\n".to_owned(),
        Err(message) => format!(">> ??? {message}\n"),
    }
}

/// Launcher handing out [`ScriptedEngine`]s over one shared state.
#[derive(Debug, Default)]
pub struct ScriptedLauncher {
    pub state: SharedState,
    pub failure: Option<EngineFailure>,
}

impl EngineLauncher for ScriptedLauncher {
    type Engine = ScriptedEngine;

    fn launch(&self, startup: Option<&str>) -> Result<ScriptedEngine, EngineFailure> {
        self.state
            .lock()
            .calls
            .push(format!("launch {}", startup.unwrap_or("")));
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(ScriptedEngine {
                state: self.state.clone(),
            }),
        }
    }
}

/// Open a session on a fresh scripted engine.
pub fn open_session() -> (Session<ScriptedEngine>, SharedState) {
    init_tracing();
    let launcher = ScriptedLauncher::default();
    let session = Session::open_with(&launcher, None, SessionOptions::default()).unwrap();
    (session, launcher.state)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
