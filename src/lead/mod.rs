use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::{CoverageBreakdown, CoverageParams};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Contact details captured when the user asks to save a quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadForm {
    pub full_name: String,
    pub birth_date: String,
    pub gender: Gender,
    pub is_smoker: bool,
    pub phone: String,
    pub email: String,
}

/// Parameter set merged with its derived breakdown, exactly the flat
/// `coverageDetails` object the webhook consumer expects.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct CoverageDetails {
    #[serde(flatten)]
    pub params: CoverageParams,
    #[serde(flatten)]
    pub breakdown: CoverageBreakdown,
}

/// The full webhook body: contact fields, a snapshot of inputs and results,
/// and the submission timestamp. Transient; not retained after handoff.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    pub form_data: LeadForm,
    pub coverage_details: CoverageDetails,
    pub timestamp: DateTime<Utc>,
}

impl QuotePayload {
    pub fn new(form_data: LeadForm, params: CoverageParams, breakdown: CoverageBreakdown) -> Self {
        Self {
            form_data,
            coverage_details: CoverageDetails { params, breakdown },
            timestamp: Utc::now(),
        }
    }
}

/// Observable submission lifecycle. Exactly one submission can be in the
/// `Submitting` state at a time; every attempt ends in `Success` or `Error`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitState {
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// The webhook acknowledged the payload.
    Delivered,
    /// The webhook call failed but failure masking is configured, so the
    /// caller should present success. Only reachable with `mask_failures`.
    MaskedFailure,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook rejected the payload with status {status}")]
    Rejected { status: u16 },
}

/// Forwards saved quotes to the configured webhook endpoint.
///
/// Duplicate submissions are refused while one is in flight; the request
/// carries a timeout so every attempt reaches a terminal state. Whether a
/// failed webhook call is surfaced or masked as success is an explicit
/// configuration choice (`mask_failures`), never silent default behavior.
pub struct LeadSubmitter {
    client: reqwest::Client,
    webhook_url: String,
    mask_failures: bool,
    in_flight: AtomicBool,
    state: Mutex<SubmitState>,
}

impl LeadSubmitter {
    pub fn new(webhook_url: String, mask_failures: bool) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            webhook_url,
            mask_failures,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SubmitState::Idle),
        })
    }

    pub fn state(&self) -> SubmitState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn submit(&self, payload: &QuotePayload) -> Result<SubmitOutcome, SubmitError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::InFlight);
        }
        // Releases the gate however this future ends, including being
        // dropped mid-await when the caller disconnects; the manual store
        // alone would leave the gate stuck on cancellation.
        let _gate = InFlightGuard(self);

        self.set_state(SubmitState::Submitting);
        info!(
            webhook_url = %self.webhook_url,
            grand_total = payload.coverage_details.breakdown.grand_total,
            "submitting lead"
        );

        match self.post(payload).await {
            Ok(()) => {
                self.set_state(SubmitState::Success);
                info!("lead delivered");
                Ok(SubmitOutcome::Delivered)
            }
            Err(err) if self.mask_failures => {
                warn!(error = %err, "webhook call failed; masking as success");
                self.set_state(SubmitState::Success);
                Ok(SubmitOutcome::MaskedFailure)
            }
            Err(err) => {
                warn!(error = %err, "webhook call failed");
                self.set_state(SubmitState::Error);
                Err(err)
            }
        }
    }

    async fn post(&self, payload: &QuotePayload) -> Result<(), SubmitError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SubmitError::Rejected {
                status: status.as_u16(),
            })
        }
    }

    fn set_state(&self, next: SubmitState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }
}

/// Holds the in-flight gate for the duration of one submission attempt.
/// Dropping while still `Submitting` means the attempt was cancelled before
/// reaching a verdict; it still ends terminal so later submissions proceed.
struct InFlightGuard<'a>(&'a LeadSubmitter);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.0.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state == SubmitState::Submitting {
                *state = SubmitState::Error;
            }
        }
        self.0.in_flight.store(false, Ordering::Release);
    }
}
