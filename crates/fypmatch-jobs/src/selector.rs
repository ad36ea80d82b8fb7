//! Top-k selection over an accumulated score map.

use std::collections::HashMap;

use tracing::{debug, warn};

use fypmatch_core::{CandidateStore, Profile, Result, ScoreMap};

/// Rank `scores` by score descending and keep the first `k`.
///
/// The sort is stable over the map's id-ascending iteration order, so equal
/// scores rank by id. Pure: the map is not modified and repeated calls return
/// the same list.
pub fn select_top(scores: &ScoreMap, k: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = scores
        .iter()
        .map(|(id, score)| (id.to_string(), score))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}

/// Load full records for the first `k` of `ranked` that still exist, in
/// ranking order, each carrying its score.
///
/// Ids whose record disappeared since scoring are skipped and the gap is
/// backfilled from the next-ranked ids, so the result has
/// `min(k, surviving ids)` entries. One batched lookup per window; a window
/// only asks for as many ids as are still missing.
pub async fn hydrate(
    store: &dyn CandidateStore,
    ranked: &[(String, f64)],
    k: usize,
) -> Result<Vec<Profile>> {
    let mut out = Vec::with_capacity(k.min(ranked.len()));
    let mut rest = ranked;

    while out.len() < k && !rest.is_empty() {
        let (window, tail) = rest.split_at((k - out.len()).min(rest.len()));
        rest = tail;

        let ids: Vec<String> = window.iter().map(|(id, _)| id.clone()).collect();
        let mut by_id: HashMap<String, Profile> = store
            .fetch_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        for (id, score) in window {
            match by_id.remove(id) {
                Some(profile) => out.push(profile.with_score(*score)),
                None => warn!(
                    subsystem = "jobs",
                    component = "selector",
                    op = "hydrate",
                    profile_id = %id,
                    "Ranked candidate no longer in store, backfilling"
                ),
            }
        }
    }

    debug!(
        subsystem = "jobs",
        component = "selector",
        op = "hydrate",
        result_count = out.len(),
        "Hydrated top matches"
    );
    Ok(out)
}
