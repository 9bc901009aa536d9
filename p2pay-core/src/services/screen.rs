//! Screen view-state
//!
//! The whole front-end is one screen: four forms, the activity feed and a
//! status line. `Screen` keeps that state and applies one action at a time;
//! front-ends (CLI prompts, tests) only edit fields and render.

use std::fmt;
use std::sync::Arc;

use crate::domain::result::Error;
use crate::domain::{AuthForm, DepositForm, FeedEntry, TransferForm, UserForm};
use crate::services::PaymentService;

/// Something the user can trigger on the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateUser,
    Signup,
    Login,
    Logout,
    Deposit,
    Transfer,
    RefreshFeed,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::CreateUser,
        Action::Signup,
        Action::Login,
        Action::Logout,
        Action::Deposit,
        Action::Transfer,
        Action::RefreshFeed,
    ];

    /// Short name used for event logging
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateUser => "create_user",
            Action::Signup => "signup",
            Action::Login => "login",
            Action::Logout => "logout",
            Action::Deposit => "deposit",
            Action::Transfer => "transfer",
            Action::RefreshFeed => "feed",
        }
    }

    /// Backend endpoint the action calls, if any
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            Action::CreateUser => Some("/users"),
            Action::Signup => Some("/signup"),
            Action::Login => Some("/login"),
            Action::Logout => None,
            Action::Deposit => Some("/deposit"),
            Action::Transfer => Some("/transfer"),
            Action::RefreshFeed => Some("/feed"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::CreateUser => "Create user",
            Action::Signup => "Sign up",
            Action::Login => "Log in",
            Action::Logout => "Log out",
            Action::Deposit => "Deposit funds",
            Action::Transfer => "Transfer funds",
            Action::RefreshFeed => "Refresh feed",
        };
        f.write_str(label)
    }
}

/// Result of one action
#[derive(Debug)]
pub enum Outcome {
    /// The call succeeded and the form was cleared
    Completed,
    /// Input was incomplete or invalid; nothing was sent
    Skipped,
    /// The call failed; fields were kept
    Failed(Error),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

/// State of the payment screen
pub struct Screen {
    service: Arc<PaymentService>,
    pub user_form: UserForm,
    pub auth_form: AuthForm,
    pub deposit_form: DepositForm,
    pub transfer_form: TransferForm,
    feed: Vec<FeedEntry>,
    status: Option<String>,
}

impl Screen {
    /// Build the screen and load the feed once
    pub fn open(service: Arc<PaymentService>) -> Self {
        let mut screen = Self {
            service,
            user_form: UserForm::default(),
            auth_form: AuthForm::default(),
            deposit_form: DepositForm::default(),
            transfer_form: TransferForm::default(),
            feed: Vec::new(),
            status: None,
        };
        screen.refresh_feed();
        screen
    }

    pub fn feed(&self) -> &[FeedEntry] {
        &self.feed
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.service.is_authenticated()
    }

    /// Apply one action
    pub fn submit(&mut self, action: Action) -> Outcome {
        match action {
            Action::CreateUser => {
                let result = self.service.create_user(&self.user_form);
                self.settle(result, |s| s.user_form.clear())
            }
            Action::Signup => {
                let result = self.service.signup(&self.auth_form);
                self.settle(result, |s| s.auth_form.clear())
            }
            Action::Login => {
                let result = self.service.login(&self.auth_form);
                self.settle(result, |s| s.auth_form.password.clear())
            }
            Action::Logout => match self.service.logout() {
                Ok(true) => {
                    self.status = Some("Logged out".to_string());
                    Outcome::Completed
                }
                Ok(false) => {
                    self.status = Some("Not logged in".to_string());
                    Outcome::Skipped
                }
                Err(e) => self.fail(e),
            },
            Action::Deposit => {
                let result = self.service.deposit(&self.deposit_form);
                self.settle(result, |s| s.deposit_form.clear())
            }
            Action::Transfer => {
                let result = self.service.transfer(&self.transfer_form);
                let outcome = self.settle(result, |s| s.transfer_form.clear());
                if outcome.is_completed() {
                    self.refresh_feed();
                }
                outcome
            }
            Action::RefreshFeed => self.refresh_feed(),
        }
    }

    /// Replace the feed wholesale; a failure keeps the old one
    fn refresh_feed(&mut self) -> Outcome {
        match self.service.feed() {
            Ok(feed) => {
                self.feed = feed;
                Outcome::Completed
            }
            Err(e) => {
                self.status = Some(format!("Failed to load feed: {}", e));
                Outcome::Failed(e)
            }
        }
    }

    fn settle(
        &mut self,
        result: crate::Result<String>,
        on_success: impl FnOnce(&mut Self),
    ) -> Outcome {
        match result {
            Ok(message) => {
                self.status = Some(message);
                on_success(self);
                Outcome::Completed
            }
            Err(e) if e.is_input_error() => {
                self.status = Some(e.to_string());
                Outcome::Skipped
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: Error) -> Outcome {
        self.status = Some(error.to_string());
        Outcome::Failed(error)
    }
}
