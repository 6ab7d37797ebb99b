//! Compile orchestrator
//!
//! Turns the current source text into a compile request, runs it on a worker
//! thread and, once the response is back, resolves the display into exactly
//! one of Output-visible or Error-visible.
//!
//! Overlapping submissions are allowed. Under `ResolutionPolicy::LastResponseWins`
//! the display follows whichever response arrives last, regardless of issue
//! order. `LatestRequestWins` discards responses older than the newest one
//! already applied.

use super::job_runner::{Finished, JobRunner};
use super::transport::CompileTransport;
use crate::error::CompileError;
use crate::model::{CompileRequest, CompileResponse, DisplayBinding, RequestId, SourceText};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which of several overlapping responses decides the display state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    #[default]
    LastResponseWins,
    LatestRequestWins,
}

impl ResolutionPolicy {
    pub fn name(&self) -> &str {
        match self {
            ResolutionPolicy::LastResponseWins => "last response wins",
            ResolutionPolicy::LatestRequestWins => "latest request wins",
        }
    }
}

/// Returned by `submit`; callers are free to ignore it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileTicket {
    pub id: RequestId,
}

/// What happened to one request once its response arrived
#[derive(Debug)]
pub struct Resolution {
    pub id: RequestId,
    pub outcome: Result<CompileResponse, CompileError>,
    pub elapsed: Duration,
    /// Whether the display state was changed by this response
    pub applied: bool,
}

type CompileResult = Result<CompileResponse, CompileError>;

pub struct CompileOrchestrator {
    transport: Arc<dyn CompileTransport>,
    policy: ResolutionPolicy,
    runner: JobRunner<RequestId, CompileResult>,
    next_id: u64,
    cancelled: HashSet<RequestId>,
    /// Newest request whose response changed the display
    latest_applied: Option<RequestId>,
}

impl CompileOrchestrator {
    pub fn new(transport: Arc<dyn CompileTransport>, policy: ResolutionPolicy) -> Self {
        Self {
            transport,
            policy,
            runner: JobRunner::new(),
            next_id: 1,
            cancelled: HashSet::new(),
            latest_applied: None,
        }
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ResolutionPolicy) {
        self.policy = policy;
    }

    /// Submit `source` verbatim and return immediately.
    ///
    /// The display is only touched later, from `poll` or `wait_next`.
    pub fn submit(&mut self, source: &SourceText) -> CompileTicket {
        let id = RequestId(self.next_id);
        self.next_id += 1;

        let request = CompileRequest::new(id, source);
        let transport = Arc::clone(&self.transport);
        self.runner.spawn(id, move || {
            transport
                .send(&request)
                .and_then(CompileResponse::from_raw)
        });

        tracing::info!(request = %id, bytes = source.len(), "compile submitted");
        CompileTicket { id }
    }

    /// Drop the response of an in-flight request when it arrives.
    ///
    /// Returns `false` if the request is not in flight. The network call
    /// itself is not interrupted.
    pub fn cancel(&mut self, id: RequestId) -> bool {
        if !self.runner.is_running(id) {
            return false;
        }
        tracing::info!(request = %id, "compile cancelled");
        self.cancelled.insert(id)
    }

    /// Cancel everything in flight, returning how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let pending: Vec<RequestId> = self
            .runner
            .running()
            .filter(|id| !self.cancelled.contains(id))
            .collect();
        pending.into_iter().filter(|id| self.cancel(*id)).count()
    }

    /// Requests still waiting for a response, cancelled ones excluded
    pub fn in_flight(&self) -> usize {
        self.runner.in_flight().saturating_sub(self.cancelled.len())
    }

    pub fn is_pending(&self, id: RequestId) -> bool {
        self.runner.is_running(id) && !self.cancelled.contains(&id)
    }

    /// Apply every response that has arrived since the last poll, in arrival order
    pub fn poll(&mut self, binding: &mut dyn DisplayBinding) -> Vec<Resolution> {
        self.runner
            .poll()
            .into_iter()
            .filter_map(|finished| self.resolve(finished, binding))
            .collect()
    }

    /// Block until the next non-cancelled response arrives and apply it.
    ///
    /// Returns `None` when nothing is in flight or `timeout` elapses.
    pub fn wait_next(
        &mut self,
        binding: &mut dyn DisplayBinding,
        timeout: Option<Duration>,
    ) -> Option<Resolution> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            let finished = self.runner.wait(remaining)?;
            if let Some(resolution) = self.resolve(finished, binding) {
                return Some(resolution);
            }
        }
    }

    fn resolve(
        &mut self,
        finished: Finished<RequestId, CompileResult>,
        binding: &mut dyn DisplayBinding,
    ) -> Option<Resolution> {
        let Finished {
            key: id,
            value,
            elapsed,
        } = finished;
        // A worker that panicked reports no value
        let outcome = value.unwrap_or(Err(CompileError::Disconnected));

        if self.cancelled.remove(&id) {
            tracing::debug!(request = %id, "dropping response of cancelled compile");
            return None;
        }

        let stale = self.policy == ResolutionPolicy::LatestRequestWins
            && self.latest_applied.is_some_and(|latest| latest > id);

        let applied = match &outcome {
            Ok(_) if stale => {
                tracing::debug!(request = %id, "discarding superseded compile response");
                false
            }
            Ok(CompileResponse::Success { output }) => {
                binding.show_output(output);
                tracing::info!(request = %id, ms = elapsed.as_millis() as u64, "compile succeeded");
                true
            }
            Ok(CompileResponse::Failure { detail }) => {
                binding.show_error(detail);
                tracing::info!(request = %id, ms = elapsed.as_millis() as u64, "compile failed");
                true
            }
            Err(err) => {
                tracing::error!(request = %id, kind = err.kind(), error = %err, "compile request did not resolve");
                false
            }
        };

        if applied {
            self.latest_applied = Some(id);
        }

        Some(Resolution {
            id,
            outcome,
            elapsed,
            applied,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{DisplayState, RawResponse, Surfaces};
    use std::collections::HashMap;
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::Mutex;

    pub(crate) const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

    /// Answers immediately with a canned response
    pub(crate) struct FixedTransport(pub Result<RawResponse, u16>);

    impl CompileTransport for FixedTransport {
        fn send(&self, _request: &CompileRequest) -> Result<RawResponse, CompileError> {
            match &self.0 {
                Ok(raw) => Ok(raw.clone()),
                Err(status) => Err(CompileError::HttpStatus {
                    status: *status,
                    body: String::new(),
                }),
            }
        }
    }

    /// Holds each request until the test releases a response for its source
    #[derive(Default)]
    pub(crate) struct GatedTransport {
        gates: Mutex<HashMap<String, Receiver<RawResponse>>>,
    }

    impl GatedTransport {
        pub(crate) fn gate(&self, source: &str) -> Sender<RawResponse> {
            let (tx, rx) = channel();
            self.gates
                .lock()
                .expect("gates lock")
                .insert(source.to_string(), rx);
            tx
        }
    }

    impl CompileTransport for GatedTransport {
        fn send(&self, request: &CompileRequest) -> Result<RawResponse, CompileError> {
            let rx = self
                .gates
                .lock()
                .expect("gates lock")
                .remove(request.source().as_str())
                .expect("no gate registered for source");
            rx.recv().map_err(|_| CompileError::Disconnected)
        }
    }

    pub(crate) fn ok_body(asm: &str) -> RawResponse {
        RawResponse::ok(serde_json::json!({"asm": asm, "message": "Ok"}).to_string())
    }

    pub(crate) fn err_body(message: &str) -> RawResponse {
        RawResponse::ok(serde_json::json!({"asm": "", "message": message}).to_string())
    }

    fn orchestrator(transport: impl CompileTransport, policy: ResolutionPolicy) -> CompileOrchestrator {
        CompileOrchestrator::new(Arc::new(transport), policy)
    }

    #[test]
    fn test_success_enters_output_visible() {
        let artifact = "main:\n  <b>mov</b> r0, #1 & r1";
        let mut orch = orchestrator(FixedTransport(Ok(ok_body(artifact))), ResolutionPolicy::default());
        let mut surfaces = Surfaces::new();
        surfaces.show_error("previous error");

        let ticket = orch.submit(&SourceText::new("func main() {}"));
        let resolution = orch.wait_next(&mut surfaces, TIMEOUT).expect("resolution");

        assert_eq!(resolution.id, ticket.id);
        assert!(resolution.applied);
        // Stored verbatim, markup included
        assert_eq!(surfaces.display, DisplayState::Output(artifact.to_string()));
        assert!(!surfaces.display.is_error_visible());
    }

    #[test]
    fn test_non_ok_tags_enter_error_visible() {
        for (body, detail) in [
            (err_body("Syntax error <i>line 2</i>"), "Syntax error <i>line 2</i>"),
            (err_body(""), ""),
            (err_body("Ok?"), "Ok?"),
            (err_body("not Ok"), "not Ok"),
            (RawResponse::ok(r#"{"asm": "x", "message": null}"#), ""),
        ] {
            let mut orch = orchestrator(FixedTransport(Ok(body)), ResolutionPolicy::default());
            let mut surfaces = Surfaces::new();
            surfaces.show_output("stale output");

            orch.submit(&SourceText::new("x"));
            let resolution = orch.wait_next(&mut surfaces, TIMEOUT).expect("resolution");

            assert!(resolution.applied);
            assert_eq!(surfaces.display, DisplayState::Error(detail.to_string()));
            assert_eq!(surfaces.display.output(), None);
        }
    }

    #[test]
    fn test_malformed_response_leaves_display_untouched() {
        let mut orch = orchestrator(
            FixedTransport(Ok(RawResponse::ok("<html>502 Bad Gateway</html>"))),
            ResolutionPolicy::default(),
        );
        let mut surfaces = Surfaces::new();
        surfaces.show_output("previous output");

        orch.submit(&SourceText::new("x"));
        let resolution = orch.wait_next(&mut surfaces, TIMEOUT).expect("resolution");

        assert!(!resolution.applied);
        assert!(matches!(
            resolution.outcome,
            Err(CompileError::MalformedResponse { .. })
        ));
        // No graceful Error-visible state for malformed bodies
        assert_eq!(surfaces.display, DisplayState::Output("previous output".to_string()));
    }

    #[test]
    fn test_transport_failure_does_not_change_display() {
        let mut orch = orchestrator(FixedTransport(Err(502)), ResolutionPolicy::default());
        let mut surfaces = Surfaces::new();

        orch.submit(&SourceText::default());
        let resolution = orch.wait_next(&mut surfaces, TIMEOUT).expect("resolution");

        assert!(!resolution.applied);
        assert!(matches!(
            resolution.outcome,
            Err(CompileError::HttpStatus { status: 502, .. })
        ));
        assert_eq!(surfaces.display, DisplayState::Idle);
    }

    #[test]
    fn test_display_unchanged_while_in_flight() {
        let transport = Arc::new(GatedTransport::default());
        let release = transport.gate("slow");
        let mut orch = CompileOrchestrator::new(transport.clone(), ResolutionPolicy::default());
        let mut surfaces = Surfaces::new();

        let ticket = orch.submit(&SourceText::new("slow"));
        assert!(orch.is_pending(ticket.id));
        assert_eq!(orch.in_flight(), 1);
        assert!(orch.poll(&mut surfaces).is_empty());
        assert_eq!(surfaces.display, DisplayState::Idle);

        release.send(ok_body("done")).expect("release");
        orch.wait_next(&mut surfaces, TIMEOUT).expect("resolution");
        assert_eq!(surfaces.display.output(), Some("done"));
        assert_eq!(orch.in_flight(), 0);
    }

    #[test]
    fn test_last_response_wins_over_issue_order() {
        let transport = Arc::new(GatedTransport::default());
        let release_first = transport.gate("first");
        let release_second = transport.gate("second");
        let mut orch = CompileOrchestrator::new(transport.clone(), ResolutionPolicy::LastResponseWins);
        let mut surfaces = Surfaces::new();

        let first = orch.submit(&SourceText::new("first"));
        let second = orch.submit(&SourceText::new("second"));

        // Second-issued request answers first
        release_second.send(err_body("second failed")).expect("release");
        let resolution = orch.wait_next(&mut surfaces, TIMEOUT).expect("second");
        assert_eq!(resolution.id, second.id);
        assert_eq!(surfaces.display.error(), Some("second failed"));

        release_first.send(ok_body("first output")).expect("release");
        let resolution = orch.wait_next(&mut surfaces, TIMEOUT).expect("first");
        assert_eq!(resolution.id, first.id);
        assert!(resolution.applied);

        // The UI reflects the first-issued request
        assert_eq!(surfaces.display, DisplayState::Output("first output".to_string()));
    }

    #[test]
    fn test_latest_request_wins_discards_stale_response() {
        let transport = Arc::new(GatedTransport::default());
        let release_first = transport.gate("first");
        let release_second = transport.gate("second");
        let mut orch = CompileOrchestrator::new(transport.clone(), ResolutionPolicy::LatestRequestWins);
        let mut surfaces = Surfaces::new();

        orch.submit(&SourceText::new("first"));
        orch.submit(&SourceText::new("second"));

        release_second.send(err_body("second failed")).expect("release");
        orch.wait_next(&mut surfaces, TIMEOUT).expect("second");

        release_first.send(ok_body("first output")).expect("release");
        let resolution = orch.wait_next(&mut surfaces, TIMEOUT).expect("first");
        assert!(!resolution.applied);
        assert_eq!(surfaces.display, DisplayState::Error("second failed".to_string()));
    }

    #[test]
    fn test_cancelled_response_is_dropped() {
        let transport = Arc::new(GatedTransport::default());
        let release_first = transport.gate("first");
        let release_second = transport.gate("second");
        let mut orch = CompileOrchestrator::new(transport.clone(), ResolutionPolicy::default());
        let mut surfaces = Surfaces::new();

        let first = orch.submit(&SourceText::new("first"));
        let second = orch.submit(&SourceText::new("second"));
        assert!(orch.cancel(first.id));
        assert!(!orch.is_pending(first.id));
        assert_eq!(orch.in_flight(), 1);

        release_first.send(ok_body("cancelled output")).expect("release");
        release_second.send(ok_body("kept output")).expect("release");

        let resolution = orch.wait_next(&mut surfaces, TIMEOUT).expect("second");
        assert_eq!(resolution.id, second.id);
        assert_eq!(surfaces.display.output(), Some("kept output"));
        assert!(orch.wait_next(&mut surfaces, Some(Duration::from_millis(50))).is_none());
        assert!(!orch.cancel(second.id));
    }

    #[test]
    fn test_cancel_all() {
        let transport = Arc::new(GatedTransport::default());
        let _a = transport.gate("a");
        let _b = transport.gate("b");
        let mut orch = CompileOrchestrator::new(transport.clone(), ResolutionPolicy::default());

        orch.submit(&SourceText::new("a"));
        orch.submit(&SourceText::new("b"));
        assert_eq!(orch.cancel_all(), 2);
        assert_eq!(orch.in_flight(), 0);
        assert_eq!(orch.cancel_all(), 0);
    }

    #[test]
    fn test_request_ids_increase() {
        let mut orch = orchestrator(FixedTransport(Ok(ok_body(""))), ResolutionPolicy::default());
        let a = orch.submit(&SourceText::default());
        let b = orch.submit(&SourceText::default());
        assert!(b.id > a.id);
    }

    struct PanickingTransport;

    impl CompileTransport for PanickingTransport {
        fn send(&self, _request: &CompileRequest) -> Result<RawResponse, CompileError> {
            panic!("transport bug");
        }
    }

    #[test]
    fn test_panicked_worker_resolves_as_disconnected() {
        let mut orch = orchestrator(PanickingTransport, ResolutionPolicy::default());
        let mut surfaces = Surfaces::new();
        surfaces.show_output("previous output");

        let ticket = orch.submit(&SourceText::new("func main() {}"));
        let resolution = orch.wait_next(&mut surfaces, TIMEOUT).expect("resolution");

        assert_eq!(resolution.id, ticket.id);
        assert!(matches!(resolution.outcome, Err(CompileError::Disconnected)));
        assert!(!resolution.applied);
        assert_eq!(orch.in_flight(), 0);
        assert!(!orch.is_pending(ticket.id));
        assert_eq!(surfaces.display.output(), Some("previous output"));
        assert!(orch.wait_next(&mut surfaces, None).is_none());
    }
}
