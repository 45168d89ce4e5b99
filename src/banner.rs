pub const BANNER: &str = r#"  ___                        ___         _
 / __|__ _ _ _ ___ ___ _ _  |   \ ___ __| |__
| (__/ _` | '_/ -_) -_) '_| | |) / -_|_-< / /
 \___\__,_|_| \___\___|_|   |___/\___/__/_\_\
"#;

pub const PROMPT_LOGGED_OUT: &str = "Ask a question, or type 'login' or 'signup'.";
pub const AUTH_REQUIRED: &str = "Please login or signup to continue.";
pub const LOGIN_FAILED: &str = "We do not recognize that username and password. Please try again.";
pub const SIGNUP_FAILED: &str =
    "Signup could not be completed. Please verify your invite passkey and credentials, or try 'login'.";
pub const NOT_AUTHORIZED: &str = "Not authorized.";
pub const UNKNOWN_COMMAND: &str = "Command not recognized. Type 'help' for the available options.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please login again.";
pub const SERVER_UNREACHABLE: &str = "The server could not be reached. Please try again later.";

pub const HELP: &str = r#"
Available commands
------------------
  help                      Show this help
  login                     Log in with your username and password
  signup                    Create an account with an invite passkey
  logout                    End the current session
  whoami                    Show the signed-in user
  status                    Show the status bar
  quit                      Leave the chat
"#;

pub const ADMIN_HELP: &str = r#"
Admin commands
--------------
  create passkey [key=value ...]          e.g. tenant=2 max_uses=3 expires=2025-01-01
  list users [key=value ...]              e.g. search=alice is_active=true
  search users <term>
  view user <term>
  enable user <id>
  disable user <id> [reason="..."]
  reset password <id> <new password>
  update user <id> key=value ...
"#;
