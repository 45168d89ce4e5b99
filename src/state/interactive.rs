//! Turn-by-turn login / signup dialogue.
//!
//! Pure and synchronous: every call consumes the current flow and hands back the next one.
//! The caller stores whatever comes back and never mutates a flow in place.
//!
//!   login:  username -> password                         -> complete
//!   signup: username -> password -> confirm -> passkey   -> complete
//!
//! A confirmation that does not match sends signup back to the password step.

use std::collections::BTreeMap;

pub const PROMPT_USERNAME: &str = "Enter username:";
pub const PROMPT_PASSWORD: &str = "Enter password:";
pub const PROMPT_CONFIRM: &str = "Confirm password:";
pub const PROMPT_PASSKEY: &str = "Enter invite passkey:";
pub const PROMPT_MISMATCH: &str = "Passwords do not match. Enter password:";

pub type FlowData = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Idle,
    Login,
    Signup,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Idle => "idle",
            AuthMode::Login => "login",
            AuthMode::Signup => "signup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    Username,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupStep {
    Username,
    Password,
    Confirm,
    Passkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthFlow {
    #[default]
    Idle,
    Login { step: LoginStep, data: FlowData },
    Signup { step: SignupStep, data: FlowData },
}

impl AuthFlow {
    pub fn mode(&self) -> AuthMode {
        match self {
            AuthFlow::Idle => AuthMode::Idle,
            AuthFlow::Login { .. } => AuthMode::Login,
            AuthFlow::Signup { .. } => AuthMode::Signup,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, AuthFlow::Idle)
    }

    /// Name of the field the next input fills, `None` while idle.
    pub fn step(&self) -> Option<&'static str> {
        match self {
            AuthFlow::Idle => None,
            AuthFlow::Login { step, .. } => Some(match step {
                LoginStep::Username => "username",
                LoginStep::Password => "password",
            }),
            AuthFlow::Signup { step, .. } => Some(match step {
                SignupStep::Username => "username",
                SignupStep::Password => "password",
                SignupStep::Confirm => "confirm",
                SignupStep::Passkey => "passkey",
            }),
        }
    }

    pub fn data(&self) -> Option<&FlowData> {
        match self {
            AuthFlow::Idle => None,
            AuthFlow::Login { data, .. } | AuthFlow::Signup { data, .. } => Some(data),
        }
    }

    /// Prompt asking for the field the current step collects.
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            AuthFlow::Idle => None,
            AuthFlow::Login { step: LoginStep::Username, .. }
            | AuthFlow::Signup { step: SignupStep::Username, .. } => Some(PROMPT_USERNAME),
            AuthFlow::Login { step: LoginStep::Password, .. }
            | AuthFlow::Signup { step: SignupStep::Password, .. } => Some(PROMPT_PASSWORD),
            AuthFlow::Signup { step: SignupStep::Confirm, .. } => Some(PROMPT_CONFIRM),
            AuthFlow::Signup { step: SignupStep::Passkey, .. } => Some(PROMPT_PASSKEY),
        }
    }

    /// True when the next input is a secret and should not be echoed.
    pub fn expects_secret(&self) -> bool {
        matches!(
            self,
            AuthFlow::Login { step: LoginStep::Password, .. }
                | AuthFlow::Signup {
                    step: SignupStep::Password | SignupStep::Confirm | SignupStep::Passkey,
                    ..
                }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    PasswordMismatch,
}

impl FlowError {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowError::PasswordMismatch => "password_mismatch",
        }
    }
}

/// Credentials collected by a finished dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub kind: AuthMode,
    pub data: FlowData,
}

impl Completion {
    pub fn get(&self, field: &str) -> &str {
        self.data.get(field).map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Begin {
    pub flow: AuthFlow,
    pub prompt: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub flow: AuthFlow,
    pub prompt: Option<&'static str>,
    pub complete: Option<Completion>,
    pub error: Option<FlowError>,
}

impl Advance {
    fn prompt(flow: AuthFlow, prompt: &'static str) -> Self {
        Self { flow, prompt: Some(prompt), complete: None, error: None }
    }

    fn unchanged(flow: AuthFlow) -> Self {
        Self { flow, prompt: None, complete: None, error: None }
    }

    fn complete(kind: AuthMode, data: FlowData) -> Self {
        Self {
            flow: AuthFlow::Idle,
            prompt: None,
            complete: Some(Completion { kind, data }),
            error: None,
        }
    }
}

pub fn begin(mode: AuthMode) -> Begin {
    match mode {
        AuthMode::Idle => Begin { flow: AuthFlow::Idle, prompt: None },
        AuthMode::Login => Begin {
            flow: AuthFlow::Login { step: LoginStep::Username, data: FlowData::new() },
            prompt: Some(PROMPT_USERNAME),
        },
        AuthMode::Signup => Begin {
            flow: AuthFlow::Signup { step: SignupStep::Username, data: FlowData::new() },
            prompt: Some(PROMPT_USERNAME),
        },
    }
}

pub fn advance(flow: AuthFlow, input: &str) -> Advance {
    let value = input.trim();
    if value.is_empty() {
        return Advance::unchanged(flow);
    }

    match flow {
        AuthFlow::Idle => Advance::unchanged(AuthFlow::Idle),
        AuthFlow::Login { step, mut data } => match step {
            LoginStep::Username => {
                data.insert("username".into(), value.into());
                Advance::prompt(AuthFlow::Login { step: LoginStep::Password, data }, PROMPT_PASSWORD)
            }
            LoginStep::Password => {
                data.insert("password".into(), value.into());
                Advance::complete(AuthMode::Login, data)
            }
        },
        AuthFlow::Signup { step, mut data } => match step {
            SignupStep::Username => {
                data.insert("username".into(), value.into());
                Advance::prompt(AuthFlow::Signup { step: SignupStep::Password, data }, PROMPT_PASSWORD)
            }
            SignupStep::Password => {
                data.insert("password".into(), value.into());
                Advance::prompt(AuthFlow::Signup { step: SignupStep::Confirm, data }, PROMPT_CONFIRM)
            }
            SignupStep::Confirm => {
                if data.get("password").map(String::as_str) != Some(value) {
                    data.remove("password");
                    return Advance {
                        flow: AuthFlow::Signup { step: SignupStep::Password, data },
                        prompt: Some(PROMPT_MISMATCH),
                        complete: None,
                        error: Some(FlowError::PasswordMismatch),
                    };
                }
                Advance::prompt(AuthFlow::Signup { step: SignupStep::Passkey, data }, PROMPT_PASSKEY)
            }
            SignupStep::Passkey => {
                data.insert("passkey".into(), value.into());
                Advance::complete(AuthMode::Signup, data)
            }
        },
    }
}
