//! Advisory text for a projection.
//!
//! Builds a natural-language prompt from the current projection state and hands it to a hosted
//! text-generation service. Only the most recently issued request is ever surfaced; see
//! [`AdviceTracker`].

mod gemini;

use std::fmt::Write as _;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::core::{ContributionSchedule, ProjectionParameters};

pub use gemini::GeminiClient;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisorError {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("advisor is not configured: set GEMINI_API_KEY")]
    MissingApiKey,
    #[error("the model returned no usable answer")]
    NoContent,
    #[error("could not reach the advisor service: {0}")]
    TransportFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdviceResponse {
    pub text: String,
}

/// A hosted model that turns a prompt into plain text.
pub trait TextGenerator {
    fn generate(
        &self,
        request: AdviceRequest,
    ) -> impl Future<Output = Result<AdviceResponse, AdvisorError>> + Send;
}

/// Everything the prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct AdviceContext<'a> {
    pub params: &'a ProjectionParameters,
    pub schedule: &'a ContributionSchedule,
    pub final_capital: Decimal,
    pub question: &'a str,
}

pub fn build_prompt(context: &AdviceContext<'_>) -> String {
    let params = context.params;
    let extras = if context.schedule.is_empty() {
        "none".to_string()
    } else {
        context
            .schedule
            .iter()
            .map(|entry| {
                format!(
                    "Year {} Month {}: {:.2}",
                    entry.year, entry.month, entry.amount
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    };

    let mut prompt = String::new();
    prompt.push_str(
        "You are an expert financial assistant. Based on the following investment parameters:\n",
    );
    let _ = writeln!(prompt, "- Initial investment: {:.2}", params.initial_capital());
    let _ = writeln!(
        prompt,
        "- Monthly contribution: {:.2}",
        params.monthly_contribution()
    );
    let _ = writeln!(prompt, "- Additional contributions: {extras}");
    let _ = writeln!(prompt, "- Annual return: {}%", params.annual_return_percent());
    let _ = writeln!(
        prompt,
        "- Time horizon: {} years",
        params.time_horizon_years()
    );
    let _ = writeln!(
        prompt,
        "- Projected final capital: {:.2}",
        context.final_capital
    );
    prompt.push('\n');
    prompt.push_str(
        "Answer the following user question concisely and helpfully, considering the principles \
         of compound interest and long-term investing in index funds. If the question is very \
         general, give a general perspective on the parameters above.\n\n",
    );
    let _ = write!(prompt, "User question: '{}'", context.question.trim());
    prompt
}

/// Ticket for one in-flight advice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Hands out increasing tickets and only lets the newest one through.
///
/// A completion whose ticket has been superseded is dropped, whatever order the responses
/// arrive in.
#[derive(Debug, Default)]
pub struct AdviceTracker {
    latest: AtomicU64,
}

impl AdviceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn settle<T>(&self, ticket: Ticket, outcome: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(outcome)
        } else {
            tracing::debug!(ticket = ticket.0, "dropping superseded advice result");
            None
        }
    }
}

/// Issues a ticket, asks `generator`, and returns the outcome only if no newer request was
/// issued in the meantime.
pub async fn ask<G: TextGenerator>(
    generator: &G,
    tracker: &AdviceTracker,
    context: &AdviceContext<'_>,
) -> Option<Result<AdviceResponse, AdvisorError>> {
    let ticket = tracker.issue();
    if context.question.trim().is_empty() {
        return tracker.settle(ticket, Err(AdvisorError::EmptyQuestion));
    }

    let request = AdviceRequest {
        prompt: build_prompt(context),
    };
    let outcome = generator.generate(request).await;
    if let Err(err) = &outcome {
        tracing::warn!(error = %err, "advice request failed");
    }
    tracker.settle(ticket, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContributionEntry;
    use rust_decimal_macros::dec;
    use std::future::poll_fn;
    use std::sync::Mutex;
    use std::task::Poll;
    use tokio::sync::oneshot;

    struct Canned(Result<AdviceResponse, AdvisorError>);

    impl TextGenerator for Canned {
        fn generate(
            &self,
            _request: AdviceRequest,
        ) -> impl Future<Output = Result<AdviceResponse, AdvisorError>> + Send {
            let outcome = self.0.clone();
            async move { outcome }
        }
    }

    /// Blocks until the test releases it, so request ordering can be controlled.
    struct Gated {
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        text: &'static str,
    }

    impl TextGenerator for Gated {
        fn generate(
            &self,
            _request: AdviceRequest,
        ) -> impl Future<Output = Result<AdviceResponse, AdvisorError>> + Send {
            let gate = self.gate.lock().expect("gate lock").take();
            let text = self.text.to_string();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                Ok(AdviceResponse { text })
            }
        }
    }

    fn sample_params() -> ProjectionParameters {
        ProjectionParameters::new(dec!(1000), dec!(100), dec!(7), 20).expect("valid")
    }

    #[test]
    fn prompt_embeds_parameters_schedule_and_question() {
        let params = sample_params();
        let mut schedule = ContributionSchedule::new();
        schedule
            .add(ContributionEntry::new(2, 5, dec!(100)), 20)
            .expect("valid");
        schedule
            .add(ContributionEntry::new(3, 1, dec!(2500.5)), 20)
            .expect("valid");

        let prompt = build_prompt(&AdviceContext {
            params: &params,
            schedule: &schedule,
            final_capital: dec!(57321.4),
            question: "  Is this enough to retire?  ",
        });

        assert!(prompt.contains("- Initial investment: 1000.00"));
        assert!(prompt.contains("- Monthly contribution: 100.00"));
        assert!(prompt.contains("Year 2 Month 5: 100.00; Year 3 Month 1: 2500.50"));
        assert!(prompt.contains("- Annual return: 7%"));
        assert!(prompt.contains("- Time horizon: 20 years"));
        assert!(prompt.contains("- Projected final capital: 57321.40"));
        assert!(prompt.ends_with("User question: 'Is this enough to retire?'"));
    }

    #[test]
    fn prompt_marks_empty_schedule() {
        let params = sample_params();
        let prompt = build_prompt(&AdviceContext {
            params: &params,
            schedule: &ContributionSchedule::new(),
            final_capital: params.initial_capital(),
            question: "?",
        });
        assert!(prompt.contains("- Additional contributions: none"));
        assert!(prompt.contains("- Projected final capital: 1000.00"));
    }

    #[test]
    fn tracker_only_accepts_latest_ticket() {
        let tracker = AdviceTracker::new();
        let first = tracker.issue();
        let second = tracker.issue();

        assert!(!tracker.is_current(first));
        assert_eq!(tracker.settle(first, "old"), None);
        assert_eq!(tracker.settle(second, "new"), Some("new"));
    }

    #[tokio::test]
    async fn ask_rejects_blank_question_without_calling_generator() {
        let params = sample_params();
        let schedule = ContributionSchedule::new();
        let tracker = AdviceTracker::new();
        let generator = Canned(Err(AdvisorError::TransportFailure("unreachable".into())));

        let outcome = ask(
            &generator,
            &tracker,
            &AdviceContext {
                params: &params,
                schedule: &schedule,
                final_capital: dec!(0),
                question: "   ",
            },
        )
        .await;
        assert_eq!(outcome, Some(Err(AdvisorError::EmptyQuestion)));
    }

    #[tokio::test]
    async fn ask_passes_generator_errors_through() {
        let params = sample_params();
        let schedule = ContributionSchedule::new();
        let tracker = AdviceTracker::new();
        let context = AdviceContext {
            params: &params,
            schedule: &schedule,
            final_capital: dec!(0),
            question: "why?",
        };

        let outcome = ask(&Canned(Err(AdvisorError::NoContent)), &tracker, &context).await;
        assert_eq!(outcome, Some(Err(AdvisorError::NoContent)));

        let ok = Canned(Ok(AdviceResponse {
            text: "Stay the course.".into(),
        }));
        let outcome = ask(&ok, &tracker, &context).await;
        assert_eq!(
            outcome,
            Some(Ok(AdviceResponse {
                text: "Stay the course.".into()
            }))
        );
    }

    #[tokio::test]
    async fn slow_earlier_request_does_not_override_newer_one() {
        let params = sample_params();
        let schedule = ContributionSchedule::new();
        let tracker = AdviceTracker::new();
        let context = AdviceContext {
            params: &params,
            schedule: &schedule,
            final_capital: dec!(0),
            question: "which wins?",
        };

        let (release, gate) = oneshot::channel();
        let slow = Gated {
            gate: Mutex::new(Some(gate)),
            text: "first",
        };
        let fast = Gated {
            gate: Mutex::new(None),
            text: "second",
        };

        let first = ask(&slow, &tracker, &context);
        tokio::pin!(first);
        let parked = poll_fn(|cx| Poll::Ready(first.as_mut().poll(cx).is_pending())).await;
        assert!(parked, "first request should be waiting on its gate");

        let second = ask(&fast, &tracker, &context).await;
        let _ = release.send(());
        let first = first.await;

        assert_eq!(first, None);
        assert_eq!(
            second,
            Some(Ok(AdviceResponse {
                text: "second".into()
            }))
        );
    }
}
