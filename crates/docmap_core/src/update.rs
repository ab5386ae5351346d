use crawl_logging::crawl_warn;

use crate::{CrawlState, Effect, Msg, RunPhase};

/// Pure update function: applies a message to the run state and returns the
/// effects the driver must execute next.
///
/// While running, every accepted message yields exactly one effect: either
/// the next `Fetch` or `Finished`.
pub fn update(mut state: CrawlState, msg: Msg) -> (CrawlState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start => {
            if state.phase() != RunPhase::Idle {
                return (state, Vec::new());
            }
            match state.start() {
                Ok(()) => advance(&mut state),
                Err(err) => vec![Effect::Abort(err)],
            }
        }
        Msg::PageFetched {
            target,
            final_url,
            page,
        } => {
            if !state.is_in_flight(&target) {
                crawl_warn!("ignoring result for {} (not in flight)", target.url);
                return (state, Vec::new());
            }
            state.accept_page(&final_url, page);
            advance(&mut state)
        }
        Msg::PageFailed { target, error } => {
            if !state.is_in_flight(&target) {
                crawl_warn!("ignoring failure for {} (not in flight)", target.url);
                return (state, Vec::new());
            }
            crawl_warn!("{} failed: {}", target.url, error.reason);
            state.record_error(error);
            advance(&mut state)
        }
        Msg::CancelRequested => {
            if state.phase() == RunPhase::Running {
                state.cancel();
                vec![Effect::Finished]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}

fn advance(state: &mut CrawlState) -> Vec<Effect> {
    match state.next_target() {
        Some(target) => vec![Effect::Fetch(target)],
        None => {
            state.complete();
            vec![Effect::Finished]
        }
    }
}
