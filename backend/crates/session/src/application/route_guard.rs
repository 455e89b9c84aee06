//! Route Guard Use Case
//!
//! Validation + classification + decision for one request. Independent of
//! any web framework; the middleware adapts the verdict to axum.

use std::sync::Arc;

use crate::application::config::{FailurePolicy, SessionConfig};
use crate::application::validate_session::ValidateSessionUseCase;
use crate::domain::client::SessionClient;
use crate::domain::cookie::{CookieStage, RequestCookie};
use crate::domain::decision::{Decision, decide};
use crate::domain::route::{RouteClass, RouteClassifier};

/// Response the gate settles on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    /// Run the next handler
    Continue,
    /// 307 to `location`
    Redirect { location: String },
    /// Auth service unusable and the policy is fail-closed
    Unavailable,
}

/// Verdict plus the cookies that must ride on whatever response is sent
#[derive(Debug)]
pub struct GuardOutcome {
    pub verdict: GuardVerdict,
    pub route: RouteClass,
    pub decision: Decision,
    pub authenticated: bool,
    pub cookies: CookieStage,
}

/// Route guard use case
pub struct RouteGuardUseCase<C>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    validate: ValidateSessionUseCase<C>,
    classifier: RouteClassifier,
    config: Arc<SessionConfig>,
}

impl<C> RouteGuardUseCase<C>
where
    C: SessionClient + Clone + Send + Sync + 'static,
{
    pub fn new(client: Arc<C>, config: Arc<SessionConfig>) -> Self {
        Self {
            validate: ValidateSessionUseCase::new(client, config.clone()),
            classifier: config.classifier(),
            config,
        }
    }

    /// Decide what to do with a request for `path`
    ///
    /// The session is always validated first, even for public paths, so that
    /// refreshed cookies reach the browser on every page view.
    pub async fn execute(&self, path: &str, request_cookies: Vec<RequestCookie>) -> GuardOutcome {
        let outcome = self.validate.execute(request_cookies).await;
        let authenticated = outcome.is_authenticated();
        let route = self.classifier.classify(path);

        if let Some(failure) = &outcome.failure {
            failure.log();

            if self.config.failure_policy == FailurePolicy::FailClosed
                && route != RouteClass::Public
            {
                return GuardOutcome {
                    verdict: GuardVerdict::Unavailable,
                    route,
                    decision: Decision::Continue,
                    authenticated,
                    cookies: outcome.cookies,
                };
            }
        }

        let decision = decide(authenticated, route);
        let verdict = match self.config.redirect_location(decision) {
            Some(location) => GuardVerdict::Redirect {
                location: location.to_string(),
            },
            None => GuardVerdict::Continue,
        };

        GuardOutcome {
            verdict,
            route,
            decision,
            authenticated,
            cookies: outcome.cookies,
        }
    }
}
