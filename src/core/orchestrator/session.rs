//=========================================================================
// Loading Session
//=========================================================================
//
// State owned by the orchestrator for the lifetime of one request.
//
// Created when a request starts fading in; dropped when it finishes,
// fails or is cancelled.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::scene::{LoadOutcome, LoadReport, LoadRequest, LoadUnit, SceneId};

//=== Session =============================================================

pub(crate) struct Session {
    /// Stamped onto every signal armed for this session.
    pub(crate) id: u64,
    pub(crate) request: LoadRequest,
    pub(crate) units: Vec<LoadUnit>,
    pub(crate) skipped: Vec<SceneId>,
    pub(crate) min_visible_duration: f64,

    /// Set when the loads are issued.
    pub(crate) start_time: Option<f64>,

    /// Last tick at which any unit's progress increased.
    pub(crate) last_progress_at: f64,

    /// Tick at which the last unit was observed complete.
    pub(crate) completed_at: Option<f64>,

    /// Activation was forced after a stall.
    pub(crate) forced: bool,
}

impl Session {
    pub(crate) fn new(id: u64, request: LoadRequest, min_visible_duration: f64) -> Self {
        Self {
            id,
            units: Vec::with_capacity(request.len()),
            request,
            skipped: Vec::new(),
            min_visible_duration,
            start_time: None,
            last_progress_at: 0.0,
            completed_at: None,
            forced: false,
        }
    }

    /// Marks the loads as issued at `now`.
    pub(crate) fn begin(&mut self, now: f64) {
        self.start_time = Some(now);
        self.last_progress_at = now;
    }

    /// Seconds since the loads were issued, or `0.0` before that.
    pub(crate) fn elapsed(&self, now: f64) -> f64 {
        self.start_time.map_or(0.0, |start| (now - start).max(0.0))
    }

    pub(crate) fn last_unit(&self) -> Option<&LoadUnit> {
        self.units.last()
    }

    pub(crate) fn scenes(&self) -> Vec<SceneId> {
        self.units.iter().map(|unit| unit.scene().clone()).collect()
    }

    /// Cancels every issued unit.
    pub(crate) fn cancel_units(&mut self) {
        for unit in &mut self.units {
            unit.cancel();
        }
    }

    /// Consumes the session, delivering `outcome` to its callback.
    pub(crate) fn resolve(mut self, outcome: LoadOutcome) {
        self.request.resolve(outcome);
    }

    /// Successful outcome for a session finishing at `now`.
    pub(crate) fn report(&self, now: f64) -> LoadReport {
        LoadReport {
            scenes: self.scenes(),
            skipped: self.skipped.clone(),
            elapsed: self.elapsed(now),
            forced: self.forced,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_zero_before_loads_issue() {
        let session = Session::new(1, LoadRequest::new(["A"], false), 2.0);
        assert_eq!(session.elapsed(10.0), 0.0);
    }

    #[test]
    fn elapsed_counts_from_begin() {
        let mut session = Session::new(1, LoadRequest::new(["A"], false), 2.0);
        session.begin(4.0);
        assert_eq!(session.elapsed(5.5), 1.5);
        assert_eq!(session.last_progress_at, 4.0);
    }

    #[test]
    fn report_of_empty_session() {
        let mut session = Session::new(1, LoadRequest::new(["A"], false), 2.0);
        session.begin(0.0);
        session.skipped.push(SceneId::from("A"));

        let report = session.report(1.0);
        assert!(report.scenes.is_empty());
        assert_eq!(report.skipped, vec![SceneId::from("A")]);
        assert_eq!(report.elapsed, 1.0);
        assert!(!report.forced);
    }
}
