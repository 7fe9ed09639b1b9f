pub use crate::config::*;
use crate::{VotingSession, DEFAULT_COUNTDOWN_SECONDS};

/// A builder for assembling a voting session.
///
/// ```
/// pub use voting_session::builder::Builder;
/// # use voting_session::SessionErrors;
///
/// let session = Builder::new()
///     .candidates(&[
///         ("c1".to_string(), "Anna".to_string()),
///         ("c2".to_string(), "Bob".to_string()),
///     ])?
///     .countdown_seconds(60)
///     .build()?;
///
/// assert_eq!(session.remaining_seconds(), 60);
/// # Ok::<(), SessionErrors>(())
/// ```
pub struct Builder {
    pub(crate) _candidates: Option<Vec<Candidate>>,
    pub(crate) _countdown_seconds: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _candidates: None,
            _countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
        }
    }

    /// The roster, as (id, display name) pairs. Exactly two are expected;
    /// the count is checked when building.
    pub fn candidates(self, cands: &[(String, String)]) -> Result<Builder, SessionErrors> {
        Ok(Builder {
            _candidates: Some(
                cands
                    .iter()
                    .map(|(id, name)| Candidate {
                        id: id.clone(),
                        name: name.clone(),
                    })
                    .collect(),
            ),
            _countdown_seconds: self._countdown_seconds,
        })
    }

    pub fn countdown_seconds(self, seconds: u32) -> Builder {
        Builder {
            _candidates: self._candidates,
            _countdown_seconds: seconds,
        }
    }

    pub fn build(self) -> Result<VotingSession, SessionErrors> {
        let candidates = self._candidates.unwrap_or_default();
        VotingSession::new(&candidates, self._countdown_seconds)
    }
}
