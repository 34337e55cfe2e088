//! Event handling and progress display

use console::style;
use tinybrew_events::{AppEvent, BuildEvent, FailureContext, GeneralEvent};

/// Event handler for progress display and user feedback
pub struct EventHandler {
    /// Whether styled output is enabled
    colors_enabled: bool,
    /// Whether debug-level events are shown
    debug: bool,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, debug: bool) -> Self {
        Self {
            colors_enabled,
            debug,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Build(event) => self.handle_build_event(event),
            AppEvent::General(event) => self.handle_general_event(event),
        }
    }

    fn handle_build_event(&mut self, event: BuildEvent) {
        match event {
            BuildEvent::Started { package } => {
                self.show_status(&format!("Building {package}"));
            }
            BuildEvent::FetchStarted { source, .. } => {
                self.show_status(&format!("Fetching {source}"));
            }
            BuildEvent::FetchCompleted { path, .. } => {
                self.show_debug(&format!("Source ready at {}", path.display()));
            }
            BuildEvent::VersionResolved { version, .. } => {
                self.show_status(&format!("Version {version}"));
            }
            BuildEvent::PhaseChanged { package, phase } => {
                self.show_debug(&format!("{package}: phase {phase}"));
            }
            BuildEvent::CommandStarted { command, .. } => {
                self.show_dim(&format!("  > {command}"));
            }
            BuildEvent::CommandCompleted {
                command,
                exit_code,
                duration,
                ..
            } => {
                self.show_debug(&format!(
                    "  < {command} exited {exit_code:?} after {:.1}s",
                    duration.as_secs_f64()
                ));
            }
            BuildEvent::VerifyStarted {
                binary_path,
                expected,
                ..
            } => {
                self.show_status(&format!(
                    "Verifying {} (expecting {expected})",
                    binary_path.display()
                ));
            }
            BuildEvent::VerifyCompleted { output, .. } => {
                self.show_debug(&format!("Smoke test output: {}", output.trim_end()));
            }
            BuildEvent::Completed {
                package,
                version,
                binary_path,
                duration,
            } => {
                self.show_success(&format!(
                    "Built {package} {version} in {:.1}s -> {}",
                    duration.as_secs_f64(),
                    binary_path.display()
                ));
            }
            BuildEvent::Failed {
                package,
                phase,
                failure,
            } => {
                self.show_error(&format!("{package} failed during {phase}"));
                self.show_failure(&failure);
            }
        }
    }

    fn handle_general_event(&mut self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => {
                match context {
                    Some(context) => self.show_warning(&format!("{message} ({context})")),
                    None => self.show_warning(&message),
                }
            }
            GeneralEvent::Error { message, details } => {
                match details {
                    Some(details) => self.show_error(&format!("{message}: {details}")),
                    None => self.show_error(&message),
                }
            }
            GeneralEvent::DebugLog { message, .. } => {
                self.show_debug(&message);
            }
            GeneralEvent::OperationStarted { operation } => {
                self.show_debug(&format!("Started: {operation}"));
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                if success {
                    self.show_debug(&format!("Completed: {operation}"));
                } else {
                    self.show_warning(&format!("Completed with issues: {operation}"));
                }
            }
            GeneralEvent::OperationFailed { operation, error } => {
                self.show_error(&format!("{operation}: {error}"));
            }
        }
    }

    fn show_failure(&self, failure: &FailureContext) {
        if let Some(code) = &failure.code {
            self.show_dim(&format!("  Code: {code}"));
        }
        if let Some(hint) = &failure.hint {
            self.show_dim(&format!("  Hint: {hint}"));
        }
        if failure.retryable {
            self.show_dim("  Retry: safe to retry this operation.");
        }
    }

    fn show_status(&self, message: &str) {
        println!("{message}");
    }

    fn show_success(&self, message: &str) {
        if self.colors_enabled {
            println!("{}", style(message).green());
        } else {
            println!("{message}");
        }
    }

    fn show_warning(&self, message: &str) {
        if self.colors_enabled {
            eprintln!("{}", style(message).yellow());
        } else {
            eprintln!("{message}");
        }
    }

    fn show_error(&self, message: &str) {
        if self.colors_enabled {
            eprintln!("{}", style(message).red());
        } else {
            eprintln!("{message}");
        }
    }

    fn show_dim(&self, message: &str) {
        if self.colors_enabled {
            println!("{}", style(message).dim());
        } else {
            println!("{message}");
        }
    }

    fn show_debug(&self, message: &str) {
        if !self.debug {
            return;
        }
        self.show_dim(message);
    }
}
