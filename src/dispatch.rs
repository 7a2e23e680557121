//! Action dispatch with pre-run and post-run hooks.
//!
//! Hooks and handlers all receive the same [`Invocation`]. Execution is a
//! plain sequence: the first error stops it and nothing already run is
//! undone.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::cmd_abstraction::CommandExecutor;
use crate::config::Config;
use crate::enforcer::ToggleEngine;
use crate::error::PfError;
use crate::fs_abstraction::FileSystem;

/// What the user asked pfcut to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Enable,
    Disable,
    Backup,
    Status,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Enable => "enable",
            Action::Disable => "disable",
            Action::Backup => "backup",
            Action::Status => "status",
        };
        f.write_str(name)
    }
}

/// Everything a handler needs for one run of the tool.
pub struct Invocation<'a> {
    pub config: Config,
    /// Restore the network this long after enabling
    pub restore_after: Option<Duration>,
    /// Directory receiving backups
    pub work_dir: PathBuf,
    pub exec: &'a dyn CommandExecutor,
    pub fs: &'a dyn FileSystem,
}

impl<'a> Invocation<'a> {
    pub fn new(config: Config, exec: &'a dyn CommandExecutor, fs: &'a dyn FileSystem) -> Self {
        Self {
            config,
            restore_after: None,
            work_dir: PathBuf::from("."),
            exec,
            fs,
        }
    }

    /// A fresh toggle engine for the configured pf file.
    pub fn engine(&self) -> Result<ToggleEngine<'a>, PfError> {
        ToggleEngine::from_config(&self.config, self.exec, self.fs)
    }
}

pub type Handler = Box<dyn Fn(&Invocation<'_>) -> Result<()>>;

#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<Action, Handler>,
    pre_run: Vec<Handler>,
    post_run: Vec<Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler for `action`, replacing any previous one.
    pub fn register<F>(mut self, action: Action, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<()> + 'static,
    {
        self.handlers.insert(action, Box::new(handler));
        self
    }

    pub fn register_pre_run<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<()> + 'static,
    {
        self.pre_run.push(Box::new(hook));
        self
    }

    pub fn register_post_run<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<()> + 'static,
    {
        self.post_run.push(Box::new(hook));
        self
    }

    /// Run pre-run hooks, the handler for `action`, then post-run hooks.
    pub fn handle(&self, action: Action, invocation: &Invocation<'_>) -> Result<()> {
        let handler = self
            .handlers
            .get(&action)
            .ok_or(PfError::HandlerNotFound(action))?;

        for hook in &self.pre_run {
            hook(invocation)?;
        }

        debug!("Running {} handler", action);
        handler(invocation)?;

        for hook in &self.post_run {
            hook(invocation)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd_abstraction::MockCommandExecutor;
    use crate::fs_abstraction::MockFileSystem;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn recorder(log: &Log, label: &'static str) -> impl Fn(&Invocation<'_>) -> Result<()> {
        let log = Rc::clone(log);
        move |_| {
            log.borrow_mut().push(label);
            Ok(())
        }
    }

    fn failing(log: &Log, label: &'static str) -> impl Fn(&Invocation<'_>) -> Result<()> {
        let log = Rc::clone(log);
        move |_| {
            log.borrow_mut().push(label);
            anyhow::bail!("{} failed", label)
        }
    }

    #[test]
    fn test_handle_runs_hooks_in_order() {
        let log: Log = Rc::default();
        let dispatcher = Dispatcher::new()
            .register_pre_run(recorder(&log, "A1"))
            .register_pre_run(recorder(&log, "A2"))
            .register(Action::Enable, recorder(&log, "B"))
            .register_post_run(recorder(&log, "C"));

        let exec = MockCommandExecutor::new();
        let fs = MockFileSystem::new();
        let invocation = Invocation::new(Config::default(), &exec, &fs);

        dispatcher.handle(Action::Enable, &invocation).unwrap();
        assert_eq!(*log.borrow(), vec!["A1", "A2", "B", "C"]);
    }

    #[test]
    fn test_handler_error_skips_post_run() {
        let log: Log = Rc::default();
        let dispatcher = Dispatcher::new()
            .register_pre_run(recorder(&log, "A"))
            .register(Action::Disable, failing(&log, "B"))
            .register_post_run(recorder(&log, "C"));

        let exec = MockCommandExecutor::new();
        let fs = MockFileSystem::new();
        let invocation = Invocation::new(Config::default(), &exec, &fs);

        let err = dispatcher.handle(Action::Disable, &invocation).unwrap_err();
        assert_eq!(err.to_string(), "B failed");
        assert_eq!(*log.borrow(), vec!["A", "B"]);
    }

    #[test]
    fn test_pre_run_error_skips_handler() {
        let log: Log = Rc::default();
        let dispatcher = Dispatcher::new()
            .register_pre_run(failing(&log, "A"))
            .register_pre_run(recorder(&log, "A2"))
            .register(Action::Enable, recorder(&log, "B"));

        let exec = MockCommandExecutor::new();
        let fs = MockFileSystem::new();
        let invocation = Invocation::new(Config::default(), &exec, &fs);

        assert!(dispatcher.handle(Action::Enable, &invocation).is_err());
        assert_eq!(*log.borrow(), vec!["A"]);
    }

    #[test]
    fn test_post_run_error_stops_remaining_hooks() {
        let log: Log = Rc::default();
        let dispatcher = Dispatcher::new()
            .register(Action::Enable, recorder(&log, "B"))
            .register_post_run(failing(&log, "C1"))
            .register_post_run(recorder(&log, "C2"));

        let exec = MockCommandExecutor::new();
        let fs = MockFileSystem::new();
        let invocation = Invocation::new(Config::default(), &exec, &fs);

        let err = dispatcher.handle(Action::Enable, &invocation).unwrap_err();
        assert_eq!(err.to_string(), "C1 failed");
        assert_eq!(*log.borrow(), vec!["B", "C1"]);
    }

    #[test]
    fn test_missing_handler() {
        let log: Log = Rc::default();
        let dispatcher = Dispatcher::new()
            .register_pre_run(recorder(&log, "A"))
            .register(Action::Enable, recorder(&log, "B"));

        let exec = MockCommandExecutor::new();
        let fs = MockFileSystem::new();
        let invocation = Invocation::new(Config::default(), &exec, &fs);

        let err = dispatcher.handle(Action::Backup, &invocation).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PfError>(),
            Some(PfError::HandlerNotFound(Action::Backup))
        ));
        // Nothing runs for an unknown action
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_register_replaces_handler() {
        let log: Log = Rc::default();
        let dispatcher = Dispatcher::new()
            .register(Action::Status, recorder(&log, "old"))
            .register(Action::Status, recorder(&log, "new"));

        let exec = MockCommandExecutor::new();
        let fs = MockFileSystem::new();
        let invocation = Invocation::new(Config::default(), &exec, &fs);

        dispatcher.handle(Action::Status, &invocation).unwrap();
        assert_eq!(*log.borrow(), vec!["new"]);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Enable.to_string(), "enable");
        assert_eq!(Action::Backup.to_string(), "backup");
    }
}
