//! Errors

// Imports
use crate::loc::Loc;

/// Signal error
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum SignalError {
	/// The value was borrowed while trying to write it
	#[error("Primary signal defined at {defined_loc} is borrowed and cannot be written")]
	Borrowed {
		/// Where the signal was defined
		defined_loc: Loc,
	},
}
