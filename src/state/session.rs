use crate::net::InputMode;
use crate::state::interactive::AuthFlow;

/// Per-conversation state. Credentials live in the shared store, not here.
#[derive(Debug)]
pub struct Session {
    // When is the session started/created
    pub session_started: std::time::Instant,

    /// Login or signup dialogue in progress
    flow: AuthFlow,
    /// Echo mode requested for the next line of input
    input_mode: InputMode,
    /// Set by `quit`
    closing: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            session_started: std::time::Instant::now(),
            flow: AuthFlow::Idle,
            input_mode: InputMode::Normal,
            closing: false,
        }
    }

    pub fn flow(&self) -> &AuthFlow {
        &self.flow
    }

    /// Takes the flow out for advancing; the caller must put the returned flow back.
    pub fn take_flow(&mut self) -> AuthFlow {
        std::mem::take(&mut self.flow)
    }

    /// Stores the new flow and returns the input mode it needs.
    pub fn set_flow(&mut self, flow: AuthFlow) -> InputMode {
        self.input_mode = if flow.expects_secret() {
            InputMode::Hidden('*')
        } else {
            InputMode::Normal
        };
        self.flow = flow;
        self.input_mode
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn in_dialogue(&self) -> bool {
        self.flow.is_active()
    }

    pub fn close(&mut self) {
        self.closing = true;
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }
}
