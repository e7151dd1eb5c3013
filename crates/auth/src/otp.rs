//! One-time password entry, verification and resend.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use hireloop_api::ApiClient;
use hireloop_session::{Route, Session};

use crate::error::{user_message, AuthError, AuthResult};
use crate::flow::FlowState;
use crate::validation::{validate_otp, FieldErrors, OTP_LENGTH};

/// Six single-digit cells with a focus cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpInput {
    cells: [Option<char>; OTP_LENGTH],
    focus: usize,
}

impl OtpInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn set_focus(&mut self, index: usize) {
        self.focus = index.min(OTP_LENGTH - 1);
    }

    pub fn cells(&self) -> &[Option<char>; OTP_LENGTH] {
        &self.cells
    }

    /// Type into the focused cell. Anything but an ASCII digit is ignored.
    /// Focus advances unless this was the last cell.
    pub fn type_char(&mut self, ch: char) -> bool {
        if !ch.is_ascii_digit() {
            return false;
        }
        self.cells[self.focus] = Some(ch);
        if self.focus + 1 < OTP_LENGTH {
            self.focus += 1;
        }
        true
    }

    /// Clear the focused cell, or step back when it is already empty.
    pub fn backspace(&mut self) {
        if self.cells[self.focus].take().is_none() && self.focus > 0 {
            self.focus -= 1;
        }
    }

    /// A pasted complete code fills every cell. Other pastes are rejected.
    pub fn paste(&mut self, text: &str) -> bool {
        let code = text.trim();
        if validate_otp(code).is_err() {
            return false;
        }
        for (cell, ch) in self.cells.iter_mut().zip(code.chars()) {
            *cell = Some(ch);
        }
        self.focus = OTP_LENGTH - 1;
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The code once every cell holds a digit.
    pub fn code(&self) -> Option<String> {
        self.cells.iter().copied().collect()
    }
}

/// Countdown gating the resend action. Only one deadline exists per instance;
/// restarting replaces it.
#[derive(Debug, Clone)]
pub struct ResendCooldown {
    period: Duration,
    deadline: Instant,
}

impl ResendCooldown {
    pub fn start(period: Duration) -> Self {
        Self {
            period,
            deadline: Instant::now() + period,
        }
    }

    pub fn restart(&mut self) {
        self.deadline = Instant::now() + self.period;
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whole seconds left, rounded up for display.
    pub fn remaining_secs(&self) -> u64 {
        let remaining = self.remaining();
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }

    pub fn is_ready(&self) -> bool {
        self.remaining().is_zero()
    }

    pub async fn ready(&self) {
        tokio::time::sleep_until(self.deadline).await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent(String),
    CoolingDown { remaining_secs: u64 },
    Failed(String),
}

pub struct OtpFlow {
    api: ApiClient,
    session: Session,
    input: OtpInput,
    cooldown: ResendCooldown,
    state: FlowState,
}

impl OtpFlow {
    /// The cooldown starts with the flow: the code was just sent by sign-up.
    pub fn new(api: ApiClient, session: Session, cooldown: Duration) -> Self {
        Self {
            api,
            session,
            input: OtpInput::new(),
            cooldown: ResendCooldown::start(cooldown),
            state: FlowState::default(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn input(&self) -> &OtpInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut OtpInput {
        &mut self.input
    }

    pub fn cooldown(&self) -> &ResendCooldown {
        &self.cooldown
    }

    pub async fn submit(&mut self) -> &FlowState {
        let Some(code) = self.input.code() else {
            let mut fields = FieldErrors::default();
            fields.insert(
                crate::validation::Field::Otp,
                format!("Enter the {OTP_LENGTH}-digit code"),
            );
            self.state = FlowState::Idle {
                error: None,
                fields,
            };
            return &self.state;
        };

        self.state = FlowState::Submitting;
        self.state = match self.verify(&code).await {
            Ok(()) => FlowState::Completed {
                redirect: Route::SignIn,
            },
            Err(err) => {
                warn!(error = %err, "otp verification failed");
                FlowState::failed(&err)
            }
        };
        &self.state
    }

    async fn verify(&self, code: &str) -> AuthResult<()> {
        let response = self.api.verify_otp(code).await?;
        self.session.clear_signup_token()?;
        info!(message = %response.message, "account verified");
        Ok(())
    }

    /// Ask for a new code. Unavailable until the countdown reaches zero; a
    /// successful resend starts it again.
    pub async fn resend(&mut self) -> ResendOutcome {
        if !self.cooldown.is_ready() {
            return ResendOutcome::CoolingDown {
                remaining_secs: self.cooldown.remaining_secs(),
            };
        }

        match self.api.resend_otp().await {
            Ok(response) => {
                self.cooldown.restart();
                self.input.clear();
                info!("otp resent");
                ResendOutcome::Sent(response.message)
            }
            Err(err) => {
                let err = AuthError::from(err);
                warn!(error = %err, "otp resend failed");
                ResendOutcome::Failed(user_message(&err))
            }
        }
    }
}
