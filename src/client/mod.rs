// src/client/mod.rs

//! Client side of the grading API: a typed HTTP client and the state
//! machines a quiz screen is driven by.

pub mod api;
pub mod controller;
pub mod practice;
pub mod session;
pub mod state;

pub use api::{ApiClient, ClientError};
pub use controller::{DiagnosticController, ExamController};
pub use practice::{PracticeError, PracticeSession};
pub use session::{
    Navigation, QuizSession, SUBMISSION_CANCELLED, SessionError, SubmitGuard, Ticket,
};
pub use state::{LoadState, StateCell};
