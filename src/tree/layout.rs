use futures::future::join_all;
use log::{error, info};

use super::context::TreeContext;
use crate::error::{StoreError, ValidationError};
use crate::model::{Position, ProfileId};
use crate::store::WhakapapaStore;

/// Outcome of a bulk layout save. Writes that succeeded stay written.
#[derive(Debug, Default)]
pub struct SaveReport {
	/// Positions written.
	pub saved: usize,
	/// Members whose position could not be written, with the reason.
	pub failed: Vec<(ProfileId, StoreError)>,
}

impl SaveReport {
	pub fn is_complete(&self) -> bool {
		self.failed.is_empty()
	}

	/// Status text for the save button.
	pub fn summary(&self) -> String {
		let total = self.saved + self.failed.len();
		if self.is_complete() {
			format!("Kua tiakina / Saved {total} positions.")
		} else {
			format!(
				"Saved {} of {total} positions; {} failed.",
				self.saved,
				self.failed.len()
			)
		}
	}
}

/// Upserts every position independently; one failure does not undo others.
pub async fn save_layout(
	store: &dyn WhakapapaStore,
	ctx: &TreeContext,
	positions: Vec<Position>,
) -> Result<SaveReport, ValidationError> {
	if ctx.needs_sign_in() {
		return Err(ValidationError::NotSignedIn);
	}
	if !ctx.authorized {
		return Err(ValidationError::NotAuthorized);
	}

	let results = join_all(positions.iter().map(|p| store.save_position(&ctx.scope, p))).await;

	let mut report = SaveReport::default();
	for (position, result) in positions.into_iter().zip(results) {
		match result {
			Ok(()) => report.saved += 1,
			Err(err) => {
				error!("Saving position of {} failed: {err}", position.profile_id);
				report.failed.push((position.profile_id, err));
			}
		}
	}
	info!("Layout save for {}: {}", ctx.scope, report.summary());
	Ok(report)
}
